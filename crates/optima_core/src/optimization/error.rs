use thiserror::Error;

use crate::linear_algebra::error::LinearAlgebraError;

/// Los errores específicos del motor de Programación Lineal.
/// Infactibilidad, no acotamiento y límites de recursos NO son errores:
/// viajan como estado en `SolverResult`.
#[derive(Debug, Clone, Error)]
pub enum LinearOptimizationError {
    /// Error de validación previo al cálculo (ej. dimensiones incorrectas)
    #[error("Error de validación: {0}")]
    ValidationError(String),

    /// Error numérico (ej. pivote cercano a cero, fila redundante)
    #[error("Error numérico: {0}")]
    NumericalError(String),

    /// El modelo no tiene la forma que el algoritmo requiere
    #[error("Forma no soportada: {0}")]
    UnsupportedShape(String),
}

#[derive(Debug, Error)]
pub enum OptimizationError {
    /// Errores provenientes del motor de Programación Lineal
    #[error(transparent)]
    Linear(#[from] LinearOptimizationError),

    /// Errores del módulo de matrices (ej. base singular)
    #[error(transparent)]
    Algebra(#[from] LinearAlgebraError),
}
