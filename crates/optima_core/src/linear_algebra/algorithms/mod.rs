pub mod gaussian;
pub mod inverse;
