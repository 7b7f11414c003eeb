use crate::formatting::scalar::EPSILON;
use crate::linear_algebra::error::LinearAlgebraError;
use crate::linear_algebra::matrices::implementations::dense::DenseMatrix;

impl DenseMatrix<f64> {
    /// Calcula la inversa de la matriz utilizando el método de Gauss-Jordan.
    /// Retorna error si la matriz no es cuadrada o si es singular.
    pub fn inverse(&self) -> Result<DenseMatrix<f64>, LinearAlgebraError> {
        // 1. Validación: debe ser cuadrada
        if !self.is_square() {
            return Err(LinearAlgebraError::DimensionMismatch {
                operation: "Inverse".to_string(),
                expected: self.rows,
                found: self.cols,
            });
        }

        let n = self.rows;

        // 2. Construcción de la matriz aumentada [A | I]
        let mut augmented_data = Vec::with_capacity(n * (2 * n));

        for i in 0..n {
            // Parte izquierda (copia de A)
            for j in 0..n {
                augmented_data.push(self.get(i, j));
            }
            // Parte derecha (identidad)
            for j in 0..n {
                if i == j {
                    augmented_data.push(1.0);
                } else {
                    augmented_data.push(0.0);
                }
            }
        }

        let mut augmented = DenseMatrix::new(n, 2 * n, augmented_data);

        // 3. Gauss-Jordan
        augmented.rref()?;

        // 4. Extracción y verificación de singularidad
        // Si A es invertible, la parte izquierda quedó como identidad;
        // un cero en la diagonal tras RREF delata una matriz singular.
        let mut inverse_data = Vec::with_capacity(n * n);

        for i in 0..n {
            let diag_val = augmented.get(i, i);
            if diag_val.abs() <= EPSILON {
                return Err(LinearAlgebraError::Singular {
                    operation: "Inverse".to_string(),
                });
            }

            // Extraer parte derecha (columnas de n a 2n)
            for j in 0..n {
                inverse_data.push(augmented.get(i, n + j));
            }
        }

        Ok(DenseMatrix::new(n, n, inverse_data))
    }
}
