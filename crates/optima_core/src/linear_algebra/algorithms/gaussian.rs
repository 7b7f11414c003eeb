use crate::formatting::scalar::EPSILON;
use crate::linear_algebra::error::LinearAlgebraError;
use crate::linear_algebra::matrices::implementations::dense::DenseMatrix;

impl DenseMatrix<f64> {
    /// Transforma la matriz a su Forma Escalonada Reducida por Filas (RREF)
    /// utilizando Gauss-Jordan con pivoteo parcial.
    pub fn rref(&mut self) -> Result<(), LinearAlgebraError> {
        let mut pivot_row = 0;

        // Iteramos sobre las columnas (j)
        for j in 0..self.cols {
            if pivot_row >= self.rows {
                break;
            }

            // 1. ESTRATEGIA DE PIVOTEO
            // Elegimos la fila (desde pivot_row hacia abajo) con mayor |valor|
            // en la columna j; con flotantes esto reduce el error acumulado.
            let mut best_row = pivot_row;
            let mut best_abs = self.get(pivot_row, j).abs();
            for k in (pivot_row + 1)..self.rows {
                let candidate = self.get(k, j).abs();
                if candidate > best_abs {
                    best_abs = candidate;
                    best_row = k;
                }
            }

            if best_abs <= EPSILON {
                // Columna sin pivote utilizable; seguimos con la siguiente
                continue;
            }

            self.swap_rows(pivot_row, best_row)?;

            // 2. Normalizar la fila pivote (pivote = 1)
            let pivot_val = self.get(pivot_row, j);
            self.scale_row(pivot_row, 1.0 / pivot_val)?;

            // 3. Anular el resto de la columna
            for i in 0..self.rows {
                if i != pivot_row {
                    let factor = self.get(i, j);
                    if factor.abs() > EPSILON {
                        self.add_scaled_row(i, pivot_row, -factor)?;
                    }
                }
            }

            pivot_row += 1;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    #[test]
    fn test_rref_simple_system() {
        // [ 2  4 | 6 ]      [ 1  0 | -1 ]
        // [ 1  3 | 5 ]  ->  [ 0  1 |  2 ]
        let mut m = crate::matrix![
            2.0, 4.0, 6.0;
            1.0, 3.0, 5.0
        ];
        m.rref().expect("Sistema regular");

        assert!(approx_eq!(f64, m.get(0, 2), -1.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, m.get(1, 2), 2.0, epsilon = 1e-9));
    }

    #[test]
    fn test_rref_rank_deficient() {
        // R1 = 2*R0: la segunda fila debe quedar en ceros
        let mut m = crate::matrix![
            1.0, 2.0;
            2.0, 4.0
        ];
        m.rref().expect("RREF no falla por rango deficiente");

        assert!(m.get(1, 0).abs() < 1e-9);
        assert!(m.get(1, 1).abs() < 1e-9);
    }
}
