// src/lib.rs

pub mod error;
pub mod formatting;
pub mod linear_algebra;
pub mod optimization;

// Re-export para fácil acceso
pub use error::OptimaError;
pub use linear_algebra::DenseMatrix;
pub use optimization::model::{Constraint, Model, OptimizationDirection, Relation, SignRestriction, Variable};
pub use optimization::result::{SolverResult, SolverStatus};
pub use optimization::settings::{CancelToken, SolverSettings};
