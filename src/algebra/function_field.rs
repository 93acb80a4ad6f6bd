//! Functions on a short Weierstrass curve `y^2 = x^3 + a·x + b`.
//!
//! Every polynomial function reduces to `a(x) + y·b(x)` once `y^2` is replaced
//! by the right hand side of the curve equation.

use ff::Field;

use super::polynomial::Polynomial;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurveEquation<F: Field> {
    pub a: F,
    pub b: F,
}

impl<F: Field> CurveEquation<F> {
    pub fn new(a: F, b: F) -> Self {
        Self { a, b }
    }

    /// `x^3 + a·x + b`
    pub fn rhs(&self) -> Polynomial<F> {
        Polynomial::new(vec![self.b, self.a, F::ZERO, F::ONE])
    }

    /// `3x^2 + a`, the derivation of `y`.
    pub fn rhs_derivative(&self) -> Polynomial<F> {
        Polynomial::new(vec![self.a, F::ZERO, F::ONE.double() + F::ONE])
    }

    pub fn contains(&self, x: &F, y: &F) -> bool {
        y.square() == self.rhs().evaluate(x)
    }
}

/// `a(x) + y·b(x)`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurveFunction<F: Field> {
    pub a: Polynomial<F>,
    pub b: Polynomial<F>,
}

impl<F: Field> CurveFunction<F> {
    pub fn new(a: Polynomial<F>, b: Polynomial<F>) -> Self {
        Self { a, b }
    }

    pub fn one() -> Self {
        Self::new(Polynomial::one(), Polynomial::zero())
    }

    pub fn is_zero(&self) -> bool {
        self.a.is_zero() && self.b.is_zero()
    }

    /// `y - λ·x - μ`
    pub fn line(lambda: F, mu: F) -> Self {
        Self::new(Polynomial::new(vec![-mu, -lambda]), Polynomial::one())
    }

    /// `x - x0`
    pub fn vertical(x0: F) -> Self {
        Self::new(Polynomial::linear_root(x0), Polynomial::zero())
    }

    pub fn mul(&self, other: &Self, eq: &CurveEquation<F>) -> Self {
        let bb = &(&self.b * &other.b) * &eq.rhs();
        let a = &(&self.a * &other.a) + &bb;
        let b = &(&self.a * &other.b) + &(&other.a * &self.b);
        Self::new(a, b)
    }

    /// Divides both components by `den`, `None` unless the division is exact.
    pub fn exact_div(&self, den: &Polynomial<F>) -> Option<Self> {
        Some(Self::new(self.a.exact_div(den)?, self.b.exact_div(den)?))
    }

    pub fn evaluate(&self, x: &F, y: &F) -> F {
        self.a.evaluate(x) + *y * self.b.evaluate(x)
    }

    /// Logarithmic derivative `D(f)/f` with `D(x) = 2y`, `D(y) = 3x^2 + a`.
    /// `None` for the zero function.
    pub fn dlog(&self, eq: &CurveEquation<F>) -> Option<RationalFunction<F>> {
        if self.is_zero() {
            return None;
        }
        let g = eq.rhs();
        let dg = eq.rhs_derivative();
        let two = F::ONE.double();
        let two_g = g.scale(&two);
        let da = self.a.derivative();
        let db = self.b.derivative();
        let ab = &self.a * &self.b;

        // D(f)·conj(f) = U + y·V over the norm N = a^2 - g·b^2.
        let u = &(&(&dg * &ab) - &(&two_g * &(&da * &self.b))) + &(&two_g * &(&self.a * &db));
        let v = &(&(&self.a * &da).scale(&two) - &(&dg * &(&self.b * &self.b)))
            - &(&two_g * &(&self.b * &db));
        let norm = &(&self.a * &self.a) - &(&g * &(&self.b * &self.b));

        Some(RationalFunction::new(u, norm.clone(), v, norm))
    }
}

/// `A(x) + y·B(x)` with `A = a_num / a_den` and `B = b_num / b_den`.
///
/// Kept reduced: each fraction is in lowest terms with a monic denominator,
/// a zero numerator carries the denominator `1`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RationalFunction<F: Field> {
    pub a_num: Polynomial<F>,
    pub a_den: Polynomial<F>,
    pub b_num: Polynomial<F>,
    pub b_den: Polynomial<F>,
}

fn reduce_fraction<F: Field>(num: Polynomial<F>, den: Polynomial<F>) -> (Polynomial<F>, Polynomial<F>) {
    if num.is_zero() || den.is_zero() {
        return (Polynomial::zero(), Polynomial::one());
    }
    let g = Polynomial::gcd(&num, &den);
    let (num, den) = match (num.exact_div(&g), den.exact_div(&g)) {
        (Some(n), Some(d)) => (n, d),
        _ => (num, den),
    };
    let (den, lc) = den.monic();
    let inv = Option::<F>::from(lc.invert()).unwrap_or(F::ONE);
    (num.scale(&inv), den)
}

/// `a/b + c/d` for reduced fractions with monic denominators.
///
/// Any common factor of the sum and `lcm(b, d)` divides `gcd(b, d)`, so the
/// only gcd taken against the numerator is against that.
fn add_fractions<F: Field>(
    a: &Polynomial<F>,
    b: &Polynomial<F>,
    c: &Polynomial<F>,
    d: &Polynomial<F>,
) -> (Polynomial<F>, Polynomial<F>) {
    if a.is_zero() {
        return (c.clone(), d.clone());
    }
    if c.is_zero() {
        return (a.clone(), b.clone());
    }
    let g = Polynomial::gcd(b, d);
    let (Some(b_g), Some(d_g)) = (b.exact_div(&g), d.exact_div(&g)) else {
        return reduce_fraction(&(a * d) + &(c * b), b * d);
    };
    let num = &(a * &d_g) + &(c * &b_g);
    if num.is_zero() {
        return (Polynomial::zero(), Polynomial::one());
    }
    let den = &b_g * d;
    if g.degree() == Some(0) {
        return (num, den);
    }
    let h = Polynomial::gcd(&num, &g);
    match (num.exact_div(&h), den.exact_div(&h)) {
        (Some(n), Some(d)) => (n, d),
        _ => reduce_fraction(num, den),
    }
}

impl<F: Field> RationalFunction<F> {
    pub fn new(a_num: Polynomial<F>, a_den: Polynomial<F>, b_num: Polynomial<F>, b_den: Polynomial<F>) -> Self {
        let (a_num, a_den) = reduce_fraction(a_num, a_den);
        let (b_num, b_den) = reduce_fraction(b_num, b_den);
        Self {
            a_num,
            a_den,
            b_num,
            b_den,
        }
    }

    pub fn zero() -> Self {
        Self::new(Polynomial::zero(), Polynomial::one(), Polynomial::zero(), Polynomial::one())
    }

    pub fn is_zero(&self) -> bool {
        self.a_num.is_zero() && self.b_num.is_zero()
    }

    pub fn add(&self, other: &Self) -> Self {
        let (a_num, a_den) = add_fractions(&self.a_num, &self.a_den, &other.a_num, &other.a_den);
        let (b_num, b_den) = add_fractions(&self.b_num, &self.b_den, &other.b_num, &other.b_den);
        Self {
            a_num,
            a_den,
            b_num,
            b_den,
        }
    }

    pub fn scale(&self, c: &F) -> Self {
        Self::new(
            self.a_num.scale(c),
            self.a_den.clone(),
            self.b_num.scale(c),
            self.b_den.clone(),
        )
    }

    /// `None` when a denominator vanishes at `x`.
    pub fn evaluate(&self, x: &F, y: &F) -> Option<F> {
        let a_den = Option::<F>::from(self.a_den.evaluate(x).invert())?;
        let b_den = Option::<F>::from(self.b_den.evaluate(x).invert())?;
        Some(self.a_num.evaluate(x) * a_den + *y * self.b_num.evaluate(x) * b_den)
    }
}
