use crate::linear_algebra::error::LinearAlgebraError;
use crate::linear_algebra::matrices::implementations::dense::DenseMatrix;
use crate::linear_algebra::traits::Scalar;

impl<T> DenseMatrix<T>
where
    T: Scalar,
{
    /// Validador auxiliar privado
    fn check_row_bounds(&self, row: usize) -> Result<(), LinearAlgebraError> {
        if row >= self.rows {
            return Err(LinearAlgebraError::IndexOutOfBounds {
                context: "Fila".to_string(),
                index: row,
                max: self.rows,
            });
        }
        Ok(())
    }

    /// Operación 1: Intercambio de Filas (Swap)
    /// R_i <-> R_j
    pub fn swap_rows(&mut self, row1: usize, row2: usize) -> Result<(), LinearAlgebraError> {
        self.check_row_bounds(row1)?;
        self.check_row_bounds(row2)?;

        if row1 == row2 {
            return Ok(()); // No hacer nada es una operación válida
        }

        // Al ser un Vec plano, calculamos índices manualmente.
        for k in 0..self.cols {
            let idx1 = row1 * self.cols + k;
            let idx2 = row2 * self.cols + k;
            self.data.swap(idx1, idx2);
        }

        Ok(())
    }

    /// Operación 2: Escalar Fila (Scale)
    /// R_i -> k * R_i
    pub fn scale_row(&mut self, row: usize, scalar: T) -> Result<(), LinearAlgebraError> {
        self.check_row_bounds(row)?;

        for k in 0..self.cols {
            let idx = row * self.cols + k;
            self.data[idx] = self.data[idx] * scalar;
        }

        Ok(())
    }

    /// Operación 3: Sumar Fila Escalada (Add Scaled)
    /// R_target -> R_target + (scalar * R_source)
    /// Es la operación "workhorse" de la eliminación gaussiana.
    pub fn add_scaled_row(
        &mut self,
        target_row: usize,
        source_row: usize,
        scalar: T,
    ) -> Result<(), LinearAlgebraError> {
        self.check_row_bounds(target_row)?;
        self.check_row_bounds(source_row)?;

        for k in 0..self.cols {
            let src_idx = source_row * self.cols + k;
            let tgt_idx = target_row * self.cols + k;

            self.data[tgt_idx] = self.data[tgt_idx] + scalar * self.data[src_idx];
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_rows() {
        let mut m = crate::matrix![
            1.0, 2.0;
            3.0, 4.0
        ];
        m.swap_rows(0, 1).expect("Operación válida");
        assert_eq!(m.get(0, 0), 3.0);
        assert_eq!(m.get(1, 1), 2.0);
    }

    #[test]
    fn test_add_scaled_row() {
        // R0 = R0 - 2*R1 debe anular la primera fila
        let mut m = crate::matrix![
            2.0, 4.0;
            1.0, 2.0
        ];
        m.add_scaled_row(0, 1, -2.0).expect("Operación válida");
        assert_eq!(m.get(0, 0), 0.0);
        assert_eq!(m.get(0, 1), 0.0);
        // La fila fuente no se toca
        assert_eq!(m.get(1, 0), 1.0);
    }

    #[test]
    fn test_index_out_of_bounds() {
        let mut m: DenseMatrix<f64> = DenseMatrix::zeros(2, 2);
        let result = m.swap_rows(0, 5);

        match result {
            Err(LinearAlgebraError::IndexOutOfBounds { index, max, .. }) => {
                assert_eq!(index, 5);
                assert_eq!(max, 2);
            }
            _ => panic!("Debería dar error de índice"),
        }
    }
}
