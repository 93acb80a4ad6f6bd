use std::ops::{Add, Mul, Neg, Sub};

use ff::Field;

/// Dense univariate polynomial, coefficients little-endian by degree.
/// Trailing zeros are always trimmed, so the zero polynomial has no coefficients.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Polynomial<F: Field> {
    coeffs: Vec<F>,
}

impl<F: Field> Polynomial<F> {
    pub fn new(mut coeffs: Vec<F>) -> Self {
        while coeffs.last().is_some_and(|c| bool::from(c.is_zero())) {
            coeffs.pop();
        }
        Self { coeffs }
    }

    pub fn zero() -> Self {
        Self { coeffs: vec![] }
    }

    pub fn one() -> Self {
        Self::constant(F::ONE)
    }

    pub fn constant(c: F) -> Self {
        Self::new(vec![c])
    }

    /// `x - root`
    pub fn linear_root(root: F) -> Self {
        Self::new(vec![-root, F::ONE])
    }

    pub fn coefficients(&self) -> &[F] {
        &self.coeffs
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// `None` for the zero polynomial.
    pub fn degree(&self) -> Option<usize> {
        self.coeffs.len().checked_sub(1)
    }

    pub fn leading_coefficient(&self) -> F {
        self.coeffs.last().copied().unwrap_or(F::ZERO)
    }

    pub fn evaluate(&self, x: &F) -> F {
        self.coeffs.iter().rev().fold(F::ZERO, |acc, c| acc * x + c)
    }

    pub fn derivative(&self) -> Self {
        let mut k = F::ZERO;
        let coeffs = self
            .coeffs
            .iter()
            .skip(1)
            .map(|c| {
                k += F::ONE;
                *c * k
            })
            .collect();
        Self::new(coeffs)
    }

    pub fn scale(&self, c: &F) -> Self {
        Self::new(self.coeffs.iter().map(|x| *x * c).collect())
    }

    /// Euclidean division. `None` when dividing by zero.
    pub fn div_rem(&self, divisor: &Self) -> Option<(Self, Self)> {
        let d_deg = divisor.degree()?;
        let inv_lc = Option::<F>::from(divisor.leading_coefficient().invert())?;
        let Some(n_deg) = self.degree() else {
            return Some((Self::zero(), Self::zero()));
        };
        if n_deg < d_deg {
            return Some((Self::zero(), self.clone()));
        }

        let mut rem = self.coeffs.clone();
        let mut quot = vec![F::ZERO; n_deg - d_deg + 1];
        for i in (0..quot.len()).rev() {
            let coef = rem[i + d_deg] * inv_lc;
            quot[i] = coef;
            for (j, d) in divisor.coeffs.iter().enumerate() {
                rem[i + j] -= coef * d;
            }
        }
        rem.truncate(d_deg);
        Some((Self::new(quot), Self::new(rem)))
    }

    /// Exact quotient, `None` if `divisor` does not divide `self`.
    pub fn exact_div(&self, divisor: &Self) -> Option<Self> {
        let (q, r) = self.div_rem(divisor)?;
        r.is_zero().then_some(q)
    }

    /// Scales to a monic polynomial; returns it with the removed leading coefficient.
    pub fn monic(&self) -> (Self, F) {
        let lc = self.leading_coefficient();
        match Option::<F>::from(lc.invert()) {
            Some(inv) => (self.scale(&inv), lc),
            None => (Self::zero(), F::ZERO),
        }
    }

    /// Monic greatest common divisor; zero only if both inputs are zero.
    pub fn gcd(a: &Self, b: &Self) -> Self {
        let mut a = a.clone();
        let mut b = b.clone();
        while !b.is_zero() {
            let r = match a.div_rem(&b) {
                Some((_, r)) => r,
                None => break,
            };
            a = std::mem::replace(&mut b, r);
        }
        a.monic().0
    }
}

impl<F: Field> Add for &Polynomial<F> {
    type Output = Polynomial<F>;

    fn add(self, rhs: Self) -> Polynomial<F> {
        let (long, short) = if self.coeffs.len() >= rhs.coeffs.len() {
            (self, rhs)
        } else {
            (rhs, self)
        };
        let mut coeffs = long.coeffs.clone();
        for (c, s) in coeffs.iter_mut().zip(short.coeffs.iter()) {
            *c += s;
        }
        Polynomial::new(coeffs)
    }
}

impl<F: Field> Neg for &Polynomial<F> {
    type Output = Polynomial<F>;

    fn neg(self) -> Polynomial<F> {
        Polynomial::new(self.coeffs.iter().map(|c| -*c).collect())
    }
}

impl<F: Field> Sub for &Polynomial<F> {
    type Output = Polynomial<F>;

    fn sub(self, rhs: Self) -> Polynomial<F> {
        self + &(-rhs)
    }
}

impl<F: Field> Mul for &Polynomial<F> {
    type Output = Polynomial<F>;

    fn mul(self, rhs: Self) -> Polynomial<F> {
        if self.is_zero() || rhs.is_zero() {
            return Polynomial::zero();
        }
        let mut coeffs = vec![F::ZERO; self.coeffs.len() + rhs.coeffs.len() - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            for (j, b) in rhs.coeffs.iter().enumerate() {
                coeffs[i + j] += *a * b;
            }
        }
        Polynomial::new(coeffs)
    }
}
