pub mod scalar;

pub use scalar::{EPSILON, INT_TOL, fmt_scalar, fractional_part, is_integral, round3};
