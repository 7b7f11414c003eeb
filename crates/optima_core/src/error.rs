#[derive(Debug, thiserror::Error)]
pub enum OptimaError {
    #[error(transparent)]
    Optimization(#[from] crate::optimization::error::OptimizationError),

    #[error(transparent)]
    Algebra(#[from] crate::linear_algebra::error::LinearAlgebraError),
}
