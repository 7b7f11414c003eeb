use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LinearAlgebraError {
    #[error("[Error {operation}]: se esperaba {expected}, se encontró {found}.")]
    DimensionMismatch {
        operation: String,
        expected: usize,
        found: usize,
    },

    /// Protege a row_ops de accesos inválidos
    #[error("Error de índice: intento de acceder a {context} {index}, pero el límite es {max}.")]
    IndexOutOfBounds {
        context: String, // "Fila", "Columna"
        index: usize,
        max: usize,
    },

    /// La matriz no tiene inversa (rango deficiente)
    #[error("Matriz singular durante {operation}.")]
    Singular { operation: String },
}
