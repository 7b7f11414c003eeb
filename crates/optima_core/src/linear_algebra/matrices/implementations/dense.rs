use crate::formatting::scalar::INT_TOL;
use crate::linear_algebra::traits::Scalar;

/// Matriz densa sobre un `Vec` plano, indexada por (fila, columna).
/// Suficiente para los tamaños de aula que maneja el motor.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix<T>
where
    T: Scalar,
{
    pub data: Vec<T>,
    pub rows: usize,
    pub cols: usize,
}

impl<T> DenseMatrix<T>
where
    T: Scalar,
{
    pub fn new(rows: usize, cols: usize, data: Vec<T>) -> Self {
        // Validación de tamaño
        assert_eq!(data.len(), rows * cols, "Data length mismatch");
        Self { data, rows, cols }
    }

    pub fn get(&self, row: usize, col: usize) -> T {
        self.data[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: T) {
        self.data[row * self.cols + col] = value;
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        let data = vec![T::zero(); rows * cols];
        Self { data, rows, cols }
    }

    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.set(i, i, T::one());
        }
        m
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Producto matriz × vector (longitud del vector = self.cols).
    pub fn mul_vec(&self, v: &[T]) -> Vec<T> {
        assert_eq!(v.len(), self.cols, "Vector length mismatch");
        let mut out = vec![T::zero(); self.rows];
        for i in 0..self.rows {
            let mut acc = T::zero();
            for j in 0..self.cols {
                acc = acc + self.get(i, j) * v[j];
            }
            out[i] = acc;
        }
        out
    }
}

impl DenseMatrix<f64> {
    /// Igualdad aproximada celda a celda (IEEE 754 no garantiza igualdad exacta).
    pub fn is_approx(&self, other: &DenseMatrix<f64>) -> bool {
        if self.rows != other.rows || self.cols != other.cols {
            return false;
        }
        self.data
            .iter()
            .zip(other.data.iter())
            .all(|(a, b)| (a - b).abs() < INT_TOL)
    }
}
