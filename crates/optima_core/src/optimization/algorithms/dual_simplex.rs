// src/optimization/algorithms/dual_simplex.rs
//
// Simplex dual: parte de una base dual-factible (costos reducidos >= 0)
// y primal-infactible (algún RHS < 0). Primero elige la fila que sale,
// después la columna que entra. Es el motor de re-optimización tras
// inyectar filas en B&B y tras agregar cortes de Gomory.

use std::time::Instant;

use super::{IterOutcome, LpOutcome, col_name, finish_lp};
use crate::formatting::scalar::{EPSILON, fmt_scalar};
use crate::optimization::error::OptimizationError;
use crate::optimization::internal::SimplexTableau;
use crate::optimization::model::Model;
use crate::optimization::result::{SolverResult, SolverStatus};
use crate::optimization::settings::SolverSettings;
use crate::optimization::transformers::to_dual_start_form;

/// Resuelve desde cero con arranque dual: todas las filas se llevan a <=
/// (RHS negativo permitido) y la base inicial son las holguras. Aplica a
/// modelos MIN con costos no negativos; si el arranque no es dual-factible
/// o hay igualdades, se delega en el simplex primal de dos fases.
pub fn solve(model: &Model, settings: &SolverSettings) -> Result<SolverResult, OptimizationError> {
    let start = Instant::now();

    let Some(canonical) = to_dual_start_form(model) else {
        return fallback_to_primal(model, settings, "el modelo trae igualdades");
    };

    // Factibilidad dual del arranque: fila z = -c >= 0 en todas las columnas
    if canonical.c.iter().any(|&v| v > EPSILON) {
        return fallback_to_primal(model, settings, "el arranque no es dual-factible");
    }

    let mut tableau = SimplexTableau::from_canonical(&canonical, false);
    let mut log = vec![
        "Arranque dual: filas >= multiplicadas por -1, base de holguras".to_string(),
    ];
    if settings.verbose {
        log.extend(tableau.render(&canonical.names.column_names));
    }
    let mut iterations = 0usize;

    let outcome = iterate_dual(
        &mut tableau,
        settings,
        &mut log,
        &mut iterations,
        &canonical.names.column_names,
    )?;

    let status = match outcome {
        IterOutcome::Optimal => SolverStatus::Optimal,
        IterOutcome::Infeasible => SolverStatus::Infeasible,
        IterOutcome::IterationLimit => SolverStatus::IterationLimit,
        IterOutcome::Cancelled => SolverStatus::Timeout,
        IterOutcome::Unbounded => unreachable!("el lazo dual no emite Unbounded"),
    };

    Ok(finish_lp(
        model,
        LpOutcome {
            canonical,
            tableau,
            status,
            iterations,
            log,
        },
        start,
        true,
    ))
}

fn fallback_to_primal(
    model: &Model,
    settings: &SolverSettings,
    reason: &str,
) -> Result<SolverResult, OptimizationError> {
    let mut result = super::primal_simplex::solve(model, settings)?;
    result.log.insert(
        0,
        format!("Arranque dual no aplicable ({}): simplex primal de dos fases", reason),
    );
    Ok(result)
}

/// Lazo de pivoteo dual. Sale la fila con RHS más negativo; entra la
/// columna que minimiza costo_reducido / (-coeficiente) entre los
/// coeficientes negativos de esa fila, prefiriendo el índice menor en
/// empates. Sin candidata entrante, la fila delata infactibilidad.
pub(crate) fn iterate_dual(
    tableau: &mut SimplexTableau,
    settings: &SolverSettings,
    log: &mut Vec<String>,
    iterations: &mut usize,
    names: &[String],
) -> Result<IterOutcome, OptimizationError> {
    loop {
        if settings.cancel.is_cancelled() {
            return Ok(IterOutcome::Cancelled);
        }
        if *iterations >= settings.max_iterations {
            return Ok(IterOutcome::IterationLimit);
        }

        // Fila saliente
        let mut leaving = None;
        let mut most_negative = -EPSILON;
        for r in 0..tableau.num_rows() {
            let rhs = tableau.rhs(r);
            if rhs < most_negative {
                most_negative = rhs;
                leaving = Some(r);
            }
        }
        let Some(leave) = leaving else {
            // Todos los RHS >= 0: primal y dual factibles, óptimo
            return Ok(IterOutcome::Optimal);
        };

        // Columna entrante
        let mut entering: Option<(usize, f64)> = None;
        for j in 0..tableau.num_cols() {
            let coeff = tableau.coeff(leave, j);
            if coeff < -EPSILON {
                // Un costo reducido apenas negativo se trata como 0
                let rc = tableau.reduced_cost(j).max(0.0);
                let ratio = rc / (-coeff);
                entering = match entering {
                    None => Some((j, ratio)),
                    Some((bj, brat)) => {
                        if ratio < brat - EPSILON {
                            Some((j, ratio))
                        } else {
                            // Empates a favor del índice menor: j crece, se conserva
                            Some((bj, brat))
                        }
                    }
                };
            }
        }
        let Some((enter, ratio)) = entering else {
            return Ok(IterOutcome::Infeasible);
        };

        *iterations += 1;
        if settings.verbose {
            log.push(format!(
                "Dual {}: sale {}, entra {} (razón {})",
                iterations,
                col_name(names, tableau.basic_vars[leave]),
                col_name(names, enter),
                fmt_scalar(ratio)
            ));
        }
        tableau.pivot(leave, enter)?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::model::{
        Constraint, OptimizationDirection, Relation, Variable,
    };

    fn settings() -> SolverSettings {
        SolverSettings::default()
    }

    #[test]
    fn test_min_cover_via_dual_start() {
        // min 6x1 + 8x2; 3x1 + x2 >= 4; x1 + 2x2 >= 4
        let mut model = Model::new("Dieta", OptimizationDirection::Minimize);
        model.add_variable(Variable::new("x1", 6.0));
        model.add_variable(Variable::new("x2", 8.0));
        model.add_constraint(Constraint::new(vec![3.0, 1.0], Relation::GreaterOrEqual, 4.0));
        model.add_constraint(Constraint::new(vec![1.0, 2.0], Relation::GreaterOrEqual, 4.0));

        let result = solve(&model, &settings()).expect("Resuelve");

        assert_eq!(result.status, SolverStatus::Optimal);
        assert!((result.objective.unwrap() - 17.6).abs() < 1e-6);
        assert!((result.value_of("x1").unwrap() - 0.8).abs() < 1e-6);
        assert!((result.value_of("x2").unwrap() - 1.6).abs() < 1e-6);
        // Nada de Fase I en el camino dual
        assert!(result.log.iter().any(|l| l.contains("Arranque dual")));
    }

    #[test]
    fn test_dual_detects_infeasible() {
        // x1 <= -1 con x1 >= 0 es infactible; la fila queda sin columna entrante
        let mut model = Model::new("Imposible", OptimizationDirection::Minimize);
        model.add_variable(Variable::new("x1", 1.0));
        model.add_constraint(Constraint::new(vec![1.0], Relation::LessOrEqual, -1.0));

        let result = solve(&model, &settings()).expect("Corre");
        assert_eq!(result.status, SolverStatus::Infeasible);
    }

    #[test]
    fn test_fallback_when_not_dual_feasible() {
        // MAX con costos positivos: el arranque dual no sirve y se delega
        let mut model = Model::new("Prod", OptimizationDirection::Maximize);
        model.add_variable(Variable::new("x1", 3.0));
        model.add_variable(Variable::new("x2", 5.0));
        model.add_constraint(Constraint::new(vec![1.0, 0.0], Relation::LessOrEqual, 4.0));
        model.add_constraint(Constraint::new(vec![0.0, 2.0], Relation::LessOrEqual, 12.0));
        model.add_constraint(Constraint::new(vec![3.0, 2.0], Relation::LessOrEqual, 18.0));

        let result = solve(&model, &settings()).expect("Resuelve");

        assert_eq!(result.status, SolverStatus::Optimal);
        assert!((result.objective.unwrap() - 36.0).abs() < 1e-6);
        assert!(result.log[0].contains("no aplicable"));
    }

    #[test]
    fn test_fallback_on_equalities() {
        let mut model = Model::new("ConIgualdad", OptimizationDirection::Minimize);
        model.add_variable(Variable::new("x1", 2.0));
        model.add_constraint(Constraint::new(vec![1.0], Relation::Equal, 3.0));

        let result = solve(&model, &settings()).expect("Resuelve");
        assert_eq!(result.status, SolverStatus::Optimal);
        assert!((result.objective.unwrap() - 6.0).abs() < 1e-6);
        assert!(result.log[0].contains("igualdades"));
    }
}
