//! Serde helpers that write big integers as decimal strings tagged with an `n`
//! suffix (`"340282366920938463463374607431768211455n"`), the same shape JS
//! callers use for `BigInt`. Nothing is ever routed through a native number.

use std::str::FromStr;

use num_bigint::{BigInt, BigUint};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serializer};

pub fn encode(n: &BigUint) -> String {
    format!("{n}n")
}

pub fn decode(s: &str) -> Result<BigUint, String> {
    let digits = s
        .strip_suffix('n')
        .ok_or_else(|| format!("missing `n` tag in big integer {s:?}"))?;
    BigUint::from_str(digits).map_err(|e| format!("invalid big integer {s:?}: {e}"))
}

pub fn serialize<S: Serializer>(n: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&encode(n))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigUint, D::Error> {
    let s = String::deserialize(deserializer)?;
    decode(&s).map_err(D::Error::custom)
}

pub mod vec {
    use super::*;
    use serde::ser::SerializeSeq;

    pub fn serialize<S: Serializer>(v: &[BigUint], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(v.len()))?;
        for n in v {
            seq.serialize_element(&encode(n))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<BigUint>, D::Error> {
        Vec::<String>::deserialize(deserializer)?
            .iter()
            .map(|s| decode(s).map_err(D::Error::custom))
            .collect()
    }
}

pub mod signed {
    use super::*;

    pub fn serialize<S: Serializer>(n: &BigInt, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{n}n"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigInt, D::Error> {
        let s = String::deserialize(deserializer)?;
        let digits = s
            .strip_suffix('n')
            .ok_or_else(|| D::Error::custom(format!("missing `n` tag in big integer {s:?}")))?;
        BigInt::from_str(digits).map_err(D::Error::custom)
    }
}
