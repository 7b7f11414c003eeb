use std::fmt;

use super::{Constraint, Relation, SignRestriction, Variable};
use crate::formatting::scalar::fmt_scalar;
use crate::optimization::error::LinearOptimizationError;

/// Define la dirección de la optimización.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizationDirection {
    Maximize,
    Minimize,
}

impl fmt::Display for OptimizationDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimizationDirection::Maximize => write!(f, "max"),
            OptimizationDirection::Minimize => write!(f, "min"),
        }
    }
}

/// Estructura principal que agrupa todo el modelo de optimización lineal.
#[derive(Debug, Clone)]
pub struct Model {
    pub name: String,
    pub direction: OptimizationDirection,
    pub variables: Vec<Variable>,
    pub constraints: Vec<Constraint>,
}

impl Model {
    /// Crea un nuevo modelo vacío con un nombre y una dirección.
    pub fn new(name: &str, direction: OptimizationDirection) -> Self {
        Self {
            name: name.to_string(),
            direction,
            variables: Vec::new(),
            constraints: Vec::new(),
        }
    }

    pub fn add_variable(&mut self, variable: Variable) {
        self.variables.push(variable);
    }

    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn objective_coeffs(&self) -> Vec<f64> {
        self.variables.iter().map(|v| v.objective_coeff).collect()
    }

    /// Invariante estructural: cada restricción trae exactamente un
    /// coeficiente por variable.
    pub fn validate(&self) -> Result<(), LinearOptimizationError> {
        if self.variables.is_empty() {
            return Err(LinearOptimizationError::ValidationError(
                "el modelo no tiene variables".to_string(),
            ));
        }
        for (i, c) in self.constraints.iter().enumerate() {
            if c.coeffs.len() != self.variables.len() {
                return Err(LinearOptimizationError::ValidationError(format!(
                    "la restricción {} tiene {} coeficientes, se esperaban {}",
                    i + 1,
                    c.coeffs.len(),
                    self.variables.len()
                )));
            }
        }
        Ok(())
    }

    pub fn has_integer_vars(&self) -> bool {
        self.variables.iter().any(|v| v.restriction.is_integer())
    }

    /// Índices de las variables marcadas int/bin
    pub fn integer_indices(&self) -> Vec<usize> {
        self.variables
            .iter()
            .enumerate()
            .filter(|(_, v)| v.restriction.is_integer())
            .map(|(i, _)| i)
            .collect()
    }

    /// Índices de las variables binarias
    pub fn binary_indices(&self) -> Vec<usize> {
        self.variables
            .iter()
            .enumerate()
            .filter(|(_, v)| v.restriction == SignRestriction::Binary)
            .map(|(i, _)| i)
            .collect()
    }

    /// Mochila 0-1: maximizar, una sola restricción <= y todo binario.
    pub fn is_knapsack_shape(&self) -> bool {
        self.direction == OptimizationDirection::Maximize
            && self.constraints.len() == 1
            && self.constraints[0].relation == Relation::LessOrEqual
            && self
                .variables
                .iter()
                .all(|v| v.restriction == SignRestriction::Binary)
    }

    /// Forma apta para planos cortantes: maximizar, todo <= con RHS >= 0
    /// y todas las variables enteras o binarias.
    pub fn is_cutting_plane_shape(&self) -> bool {
        self.direction == OptimizationDirection::Maximize
            && !self.constraints.is_empty()
            && self
                .constraints
                .iter()
                .all(|c| c.relation == Relation::LessOrEqual && c.rhs >= 0.0)
            && self.variables.iter().all(|v| v.restriction.is_integer())
    }

    /// Forma canónica para dualidad: MAX con todo <= y x >= 0,
    /// o MIN con todo >= y x >= 0.
    pub fn canonical_dual_shape(&self) -> bool {
        let nonneg = self.variables.iter().all(|v| {
            matches!(
                v.restriction,
                SignRestriction::NonNegative | SignRestriction::Integer | SignRestriction::Binary
            )
        });
        if !nonneg {
            return false;
        }
        match self.direction {
            OptimizationDirection::Maximize => self
                .constraints
                .iter()
                .all(|c| c.relation == Relation::LessOrEqual),
            OptimizationDirection::Minimize => self
                .constraints
                .iter()
                .all(|c| c.relation == Relation::GreaterOrEqual),
        }
    }

    /// Reproduce el modelo en el formato textual de entrada
    /// (línea objetivo, restricciones, línea de signos).
    pub fn to_model_text(&self) -> String {
        let mut lines = Vec::new();

        let coeffs: Vec<String> = self
            .variables
            .iter()
            .map(|v| fmt_scalar(v.objective_coeff))
            .collect();
        lines.push(format!("{} {}", self.direction, coeffs.join(" ")));

        for c in &self.constraints {
            let lhs: Vec<String> = c.coeffs.iter().map(|v| fmt_scalar(*v)).collect();
            lines.push(format!(
                "{} {} {}",
                lhs.join(" "),
                c.relation,
                fmt_scalar(c.rhs)
            ));
        }

        let signs: Vec<String> = self
            .variables
            .iter()
            .map(|v| v.restriction.to_string())
            .collect();
        lines.push(signs.join(" "));

        lines.join("\n")
    }
}
