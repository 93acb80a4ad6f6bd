pub mod function_field;
pub mod polynomial;

pub use function_field::{CurveEquation, CurveFunction, RationalFunction};
pub use polynomial::Polynomial;
