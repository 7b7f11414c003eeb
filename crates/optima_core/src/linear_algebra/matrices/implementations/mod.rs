pub mod dense;

pub use dense::DenseMatrix;
