// src/linear_algebra/traits.rs

use num_traits::Num;
use std::fmt::{Debug, Display};
use std::ops::Neg;

/// El Trait Maestro: agrupa todo lo que una matriz necesita de sus elementos.
/// `Num` aporta las operaciones aritméticas junto con `zero()` y `one()`.
pub trait Scalar: Num + Copy + PartialOrd + Neg<Output = Self> + Debug + Display {}

// Implementación automática: si cumple los requisitos, es un Scalar.
impl<T> Scalar for T where T: Num + Copy + PartialOrd + Neg<Output = T> + Debug + Display {}
