pub mod actions;
pub mod cache;
pub mod executor;

pub use executor::{Algorithm, SolveRequest, execute};
