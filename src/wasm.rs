//! JS bindings. Big integers cross the boundary as `BigInt`; integral
//! `Number`s and decimal strings (optionally `n`-tagged) are accepted on input.

use std::str::FromStr;

use num_bigint::BigUint;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::console;

use crate::calldata::{self, CalldataOptions};
use crate::curves::registry;
use crate::error::{MsmError, Result};
use crate::utils::tagged;

/// Largest integer a JS `Number` holds exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let msg = JsValue::from_str(&format!("[{}] {}: {}", record.level(), record.target(), record.args()));
        match record.level() {
            log::Level::Error => console::error_1(&msg),
            log::Level::Warn => console::warn_1(&msg),
            log::Level::Info => console::info_1(&msg),
            log::Level::Debug | log::Level::Trace => console::debug_1(&msg),
        }
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;

/// Routes `log` records to the browser console. Later calls are no-ops.
pub fn init_console_logging(level: log::LevelFilter) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

fn to_js_error(e: MsmError) -> JsValue {
    js_sys::Error::new(&e.to_string()).into()
}

pub fn number_to_biguint(n: f64) -> Result<BigUint> {
    if n.is_finite() && n.fract() == 0.0 && (0.0..=MAX_SAFE_INTEGER).contains(&n) {
        Ok(BigUint::from(n as u64))
    } else {
        Err(MsmError::InvalidEncoding(format!("{n} is not a non-negative safe integer")))
    }
}

/// Decimal digits, with or without the `n` tag.
pub fn str_to_biguint(s: &str) -> Result<BigUint> {
    let digits = s.trim();
    if digits.ends_with('n') {
        return tagged::decode(digits).map_err(MsmError::InvalidEncoding);
    }
    BigUint::from_str(digits).map_err(|e| MsmError::InvalidEncoding(format!("invalid integer {s:?}: {e}")))
}

fn js_to_biguint(v: &JsValue) -> Result<BigUint> {
    if v.is_bigint() {
        let big = v.unchecked_ref::<js_sys::BigInt>();
        let digits: String = big
            .to_string(10)
            .map_err(|_| MsmError::InvalidEncoding("unprintable BigInt".to_string()))?
            .into();
        return str_to_biguint(&digits);
    }
    if let Some(n) = v.as_f64() {
        return number_to_biguint(n);
    }
    if let Some(s) = v.as_string() {
        return str_to_biguint(&s);
    }
    Err(MsmError::InvalidEncoding(format!("{v:?} is not an integer")))
}

fn js_to_biguints(values: &[JsValue], what: &str) -> Result<Vec<BigUint>> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            js_to_biguint(v).map_err(|e| match e {
                MsmError::InvalidEncoding(msg) => MsmError::InvalidEncoding(format!("{what}[{i}]: {msg}")),
                other => other,
            })
        })
        .collect()
}

fn biguint_to_js(n: &BigUint) -> std::result::Result<JsValue, JsValue> {
    js_sys::BigInt::new(&JsValue::from_str(&n.to_string())).map(JsValue::from).map_err(JsValue::from)
}

/// Loads the curve tables. Must run before [`msm_calldata_builder`].
#[wasm_bindgen]
pub fn init() -> std::result::Result<(), JsValue> {
    init_console_logging(log::LevelFilter::Info);
    registry::init().map_err(to_js_error)?;
    log::info!("msm calldata builder initialized");
    Ok(())
}

#[wasm_bindgen]
pub fn is_initialized() -> bool {
    registry::is_initialized()
}

/// `values = [x0, y0, x1, y1, ...]`. Returns the calldata felts as `BigInt`s.
#[wasm_bindgen]
pub fn msm_calldata_builder(
    values: Vec<JsValue>,
    scalars: Vec<JsValue>,
    curve_id: usize,
    include_digits_decomposition: Option<bool>,
    include_points_and_scalars: Option<bool>,
    serialize_as_pure_felt252_array: Option<bool>,
) -> std::result::Result<Vec<JsValue>, JsValue> {
    let defaults = CalldataOptions::default();
    let options = CalldataOptions {
        include_digits_decomposition: include_digits_decomposition.unwrap_or(defaults.include_digits_decomposition),
        include_points_and_scalars: include_points_and_scalars.unwrap_or(defaults.include_points_and_scalars),
        serialize_as_pure_felt252_array: serialize_as_pure_felt252_array
            .unwrap_or(defaults.serialize_as_pure_felt252_array),
        ..defaults
    };
    let values = js_to_biguints(&values, "values").map_err(to_js_error)?;
    let scalars = js_to_biguints(&scalars, "scalars").map_err(to_js_error)?;
    let felts = calldata::msm_calldata_builder(&values, &scalars, curve_id, &options).map_err(to_js_error)?;
    felts.iter().map(biguint_to_js).collect()
}
