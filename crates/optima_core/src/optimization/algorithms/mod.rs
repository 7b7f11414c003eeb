pub mod branch_bound;
pub mod dual_simplex;
pub mod gomory;
pub mod knapsack;
pub mod primal_simplex;

use std::time::Instant;

use crate::formatting::scalar::fmt_scalar;
use crate::optimization::internal::SimplexTableau;
use crate::optimization::model::Model;
use crate::optimization::result::{SolverResult, SolverStatus};
use crate::optimization::sensitivity;
use crate::optimization::transformers::CanonicalForm;

/// Resultado de un lazo de pivoteo (primal o dual).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IterOutcome {
    Optimal,
    Unbounded,
    Infeasible,
    IterationLimit,
    Cancelled,
}

/// Estado interno de una corrida de LP: el tableau final junto con la
/// forma canónica que lo originó.
#[derive(Debug)]
pub(crate) struct LpOutcome {
    pub canonical: CanonicalForm,
    pub tableau: SimplexTableau,
    pub status: SolverStatus,
    pub iterations: usize,
    pub log: Vec<String>,
}

/// Nombre imprimible de una columna (las columnas inyectadas después
/// del canonicalizado no tienen nombre registrado).
pub(crate) fn col_name(names: &[String], j: usize) -> String {
    names
        .get(j)
        .cloned()
        .unwrap_or_else(|| format!("t{}", j + 1))
}

/// Valores por columna canónica de la solución básica actual.
pub(crate) fn column_values(tableau: &SimplexTableau) -> Vec<f64> {
    let mut values = vec![0.0; tableau.num_cols()];
    for r in 0..tableau.num_rows() {
        values[tableau.basic_vars[r]] = tableau.rhs(r);
    }
    values
}

/// Lee la solución del tableau y la traduce al espacio del usuario.
pub(crate) fn extract_solution(
    model: &Model,
    canonical: &CanonicalForm,
    tableau: &SimplexTableau,
) -> (Vec<(String, f64)>, f64) {
    let col_values = column_values(tableau);
    let x = canonical.recover_solution(&col_values);

    let variables: Vec<(String, f64)> = model
        .variables
        .iter()
        .zip(x.iter())
        .map(|(v, value)| (v.name.clone(), *value))
        .collect();

    let engine_z = tableau.objective_value();
    let objective = if canonical.flip_objective {
        -engine_z
    } else {
        engine_z
    };

    (variables, objective)
}

/// Convierte un `LpOutcome` en el resultado público, capturando la
/// sensibilidad sobre el tableau óptimo cuando aplica.
pub(crate) fn finish_lp(
    model: &Model,
    outcome: LpOutcome,
    start: Instant,
    want_sensitivity: bool,
) -> SolverResult {
    let LpOutcome {
        canonical,
        tableau,
        status,
        iterations,
        mut log,
    } = outcome;

    let elapsed_ms = start.elapsed().as_millis() as u64;

    match status {
        SolverStatus::Optimal => {
            let (variables, objective) = extract_solution(model, &canonical, &tableau);

            let sensitivity = if want_sensitivity {
                match sensitivity::capture(&canonical, &tableau, model.canonical_dual_shape()) {
                    Ok(payload) => Some(payload),
                    Err(e) => {
                        log.push(format!("Sensibilidad no disponible: {}", e));
                        None
                    }
                }
            } else {
                None
            };

            log.push(format!("Óptimo: z = {}", fmt_scalar(objective)));

            SolverResult {
                status,
                objective: Some(objective),
                variables,
                iterations,
                nodes_explored: 0,
                cuts_added: 0,
                elapsed_ms,
                log,
                sensitivity,
            }
        }
        other => {
            let line = match other {
                SolverStatus::Infeasible => "El problema no tiene solución factible.",
                SolverStatus::Unbounded => "El problema es no acotado (solución infinita).",
                SolverStatus::IterationLimit => "Límite de iteraciones alcanzado.",
                SolverStatus::Timeout => "Corrida cancelada por tiempo.",
                _ => "Corrida detenida.",
            };
            log.push(line.to_string());

            SolverResult {
                status: other,
                objective: None,
                variables: Vec::new(),
                iterations,
                nodes_explored: 0,
                cuts_added: 0,
                elapsed_ms,
                log,
                sensitivity: None,
            }
        }
    }
}
