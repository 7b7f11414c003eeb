use std::fmt;

use crate::formatting::scalar::{INT_TOL, fmt_scalar};

/// Define la relación lógica entre el lado izquierdo (LHS) y el derecho (RHS).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    LessOrEqual,    // <=
    GreaterOrEqual, // >=
    Equal,          // =
}

impl Relation {
    /// Relación resultante de multiplicar la fila por -1
    pub fn flipped(self) -> Self {
        match self {
            Relation::LessOrEqual => Relation::GreaterOrEqual,
            Relation::GreaterOrEqual => Relation::LessOrEqual,
            Relation::Equal => Relation::Equal,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::LessOrEqual => write!(f, "<="),
            Relation::GreaterOrEqual => write!(f, ">="),
            Relation::Equal => write!(f, "="),
        }
    }
}

/// Representa una restricción lineal: coeficientes [Relación] RHS.
/// Los coeficientes van alineados con el orden de variables del modelo.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// Nombre opcional para identificar la restricción (ej: "c2")
    pub name: Option<String>,

    /// Un coeficiente por variable del modelo, en su orden
    pub coeffs: Vec<f64>,

    /// El tipo de comparación (<=, >=, =)
    pub relation: Relation,

    /// El valor constante del lado derecho
    pub rhs: f64,
}

impl Constraint {
    /// Crea una nueva restricción sin nombre
    pub fn new(coeffs: Vec<f64>, relation: Relation, rhs: f64) -> Self {
        Self {
            name: None,
            coeffs,
            relation,
            rhs,
        }
    }

    /// Asigna un nombre a la restricción (patrón Builder)
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.coeffs
            .iter()
            .zip(values.iter())
            .map(|(a, x)| a * x)
            .sum()
    }

    /// Verifica si un punto dado cumple esta restricción.
    /// Útil para validar resultados finales o candidatos redondeados.
    pub fn is_satisfied(&self, values: &[f64]) -> bool {
        let val = self.evaluate(values);
        // Tolerancia pequeña para evitar errores de punto flotante
        match self.relation {
            Relation::LessOrEqual => val <= self.rhs + INT_TOL,
            Relation::GreaterOrEqual => val >= self.rhs - INT_TOL,
            Relation::Equal => (val - self.rhs).abs() < INT_TOL,
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(n) = &self.name {
            write!(f, "[{}] ", n)?;
        }
        let lhs: Vec<String> = self.coeffs.iter().map(|v| fmt_scalar(*v)).collect();
        write!(f, "{} {} {}", lhs.join(" "), self.relation, fmt_scalar(self.rhs))
    }
}
