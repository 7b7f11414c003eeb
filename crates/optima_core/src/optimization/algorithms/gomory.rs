// src/optimization/algorithms/gomory.rs
//
// Planos cortantes fraccionarios de Gomory sobre el mismo tableau de la
// relajación: cada corte agrega una fila con RHS negativo y una columna
// de holgura básica, y el simplex dual restaura la factibilidad primal.
// Aplica a modelos MAX con todo <= (RHS >= 0) y variables int/bin;
// cualquier otra forma se delega en ramificación y acotación.

use std::time::Instant;

use super::{IterOutcome, branch_bound, column_values, dual_simplex, primal_simplex};
use crate::formatting::scalar::{fmt_scalar, fractional_part};
use crate::optimization::error::OptimizationError;
use crate::optimization::model::{Constraint, Model, Relation};
use crate::optimization::result::{SolverResult, SolverStatus};
use crate::optimization::settings::SolverSettings;
use crate::optimization::transformers::to_canonical_form;

pub fn solve(model: &Model, settings: &SolverSettings) -> Result<SolverResult, OptimizationError> {
    let start = Instant::now();
    model.validate()?;

    if !model.is_cutting_plane_shape() {
        let mut result = branch_bound::solve(model, settings)?;
        result.log.insert(
            0,
            "Forma no apta para cortes de Gomory: se usa ramificación y acotación".to_string(),
        );
        return Ok(result);
    }

    // Cota x_j <= 1 antepuesta por cada binaria
    let mut work = model.clone();
    for (k, &j) in model.binary_indices().iter().enumerate() {
        let mut coeffs = vec![0.0; model.num_variables()];
        coeffs[j] = 1.0;
        work.constraints.insert(
            k,
            Constraint::new(coeffs, Relation::LessOrEqual, 1.0).with_name(&format!("b{}", j + 1)),
        );
    }

    let canonical = to_canonical_form(&work)?;
    let root = primal_simplex::solve_canonical(canonical, settings)?;
    let mut log = root.log;
    let canonical = root.canonical;
    let mut tableau = root.tableau;
    let mut iterations = root.iterations;

    if root.status != SolverStatus::Optimal {
        log.push("La relajación lineal no llegó a óptimo".to_string());
        return Ok(SolverResult {
            status: root.status,
            objective: None,
            variables: Vec::new(),
            iterations,
            nodes_explored: 0,
            cuts_added: 0,
            elapsed_ms: start.elapsed().as_millis() as u64,
            log,
            sensitivity: None,
        });
    }

    let names = canonical.names.column_names.clone();
    let mut cuts = 0usize;

    // Última solución primal-factible observada, para el cierre de
    // mejor esfuerzo si el proceso de cortes se estanca.
    let mut last_feasible = snapshot(&canonical, &tableau, model);

    let (status, objective, variables) = loop {
        // Fila fuente: variable de decisión básica con RHS fraccionario,
        // parte fraccionaria más cercana a 0.5 (empate: columna menor)
        let mut pick: Option<(usize, usize, f64)> = None;
        for r in 0..tableau.num_rows() {
            let j = tableau.basic_vars[r];
            if j >= canonical.num_decision_cols {
                continue;
            }
            let f = fractional_part(tableau.rhs(r));
            if f > 0.0 {
                let score = (f - 0.5).abs();
                let better = match &pick {
                    None => true,
                    Some((_, bj, bscore)) => {
                        score < bscore - 1e-12 || ((score - bscore).abs() <= 1e-12 && j < *bj)
                    }
                };
                if better {
                    pick = Some((r, j, score));
                }
            }
        }

        let Some((row, col, _)) = pick else {
            // Todas las variables de decisión básicas son enteras
            let (x, z) = integral_solution(&canonical, &tableau, model);
            log.push(format!("Solución entera alcanzada con {} cortes", cuts));
            break (SolverStatus::Optimal, Some(z), x);
        };

        if settings.cancel.is_cancelled() {
            break (SolverStatus::Timeout, None, Vec::new());
        }
        if cuts >= settings.max_cuts {
            log.push(format!("Tope de {} cortes alcanzado", settings.max_cuts));
            break best_effort(last_feasible, model, SolverStatus::CutLimit, &mut log);
        }

        let f0 = fractional_part(tableau.rhs(row));
        let cut_row = tableau.append_gomory_cut(row);
        cuts += 1;
        log.push(format!(
            "Corte {}: fila de {} con f0 = {} (RHS del corte = {})",
            cuts,
            names
                .get(col)
                .cloned()
                .unwrap_or_else(|| format!("t{}", col + 1)),
            fmt_scalar(f0),
            fmt_scalar(tableau.rhs(cut_row))
        ));

        match dual_simplex::iterate_dual(
            &mut tableau,
            settings,
            &mut log,
            &mut iterations,
            &names,
        )? {
            IterOutcome::Optimal => {
                last_feasible = snapshot(&canonical, &tableau, model);
            }
            IterOutcome::Infeasible | IterOutcome::IterationLimit => {
                log.push("El simplex dual se estancó tras el corte".to_string());
                break best_effort(last_feasible, model, SolverStatus::BestEffort, &mut log);
            }
            IterOutcome::Cancelled => {
                break (SolverStatus::Timeout, None, Vec::new());
            }
            IterOutcome::Unbounded => unreachable!("el lazo dual no emite Unbounded"),
        }
    };

    Ok(SolverResult {
        status,
        objective,
        variables,
        iterations,
        nodes_explored: 0,
        cuts_added: cuts,
        elapsed_ms: start.elapsed().as_millis() as u64,
        log,
        sensitivity: None,
    })
}

/// Valores del usuario en la solución básica actual (sin redondear).
fn snapshot(
    canonical: &crate::optimization::transformers::CanonicalForm,
    tableau: &crate::optimization::internal::SimplexTableau,
    model: &Model,
) -> Vec<f64> {
    let cols = column_values(tableau);
    let mut x = canonical.recover_solution(&cols);
    x.truncate(model.num_variables());
    x
}

/// Solución entera final: valores ajustados al entero más próximo.
fn integral_solution(
    canonical: &crate::optimization::transformers::CanonicalForm,
    tableau: &crate::optimization::internal::SimplexTableau,
    model: &Model,
) -> (Vec<(String, f64)>, f64) {
    let cols = column_values(tableau);
    let x = canonical.recover_solution(&cols);

    let variables: Vec<(String, f64)> = model
        .variables
        .iter()
        .zip(x.iter())
        .map(|(v, value)| (v.name.clone(), value.round()))
        .collect();

    let z = tableau.objective_value();
    (variables, z)
}

/// Cierre de mejor esfuerzo: redondea la última solución factible y la
/// acepta solo si respeta las restricciones originales.
fn best_effort(
    last_feasible: Vec<f64>,
    model: &Model,
    status: SolverStatus,
    log: &mut Vec<String>,
) -> (SolverStatus, Option<f64>, Vec<(String, f64)>) {
    let rounded: Vec<f64> = last_feasible.iter().map(|v| v.round()).collect();

    let feasible = model.constraints.iter().all(|c| c.is_satisfied(&rounded));
    if !feasible {
        log.push("El candidato redondeado viola restricciones: sin solución entera".to_string());
        return (status, None, Vec::new());
    }

    let z: f64 = model
        .variables
        .iter()
        .zip(rounded.iter())
        .map(|(v, x)| v.objective_coeff * x)
        .sum();

    log.push(format!(
        "Candidato redondeado factible con z = {} (mejor esfuerzo)",
        fmt_scalar(z)
    ));

    let variables = model
        .variables
        .iter()
        .zip(rounded.iter())
        .map(|(v, x)| (v.name.clone(), *x))
        .collect();

    (status, Some(z), variables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::model::{OptimizationDirection, SignRestriction, Variable};

    fn settings() -> SolverSettings {
        SolverSettings::default()
    }

    #[test]
    fn test_small_integer_program() {
        // max 3x1 + 4x2; x1 + 2x2 <= 6; 3x1 + x2 <= 9; enteras.
        // Relajación en (2.4, 1.8); el óptimo entero es (2, 2) con z = 14.
        let mut model = Model::new("Cortes", OptimizationDirection::Maximize);
        model.add_variable(Variable::new("x1", 3.0).with_restriction(SignRestriction::Integer));
        model.add_variable(Variable::new("x2", 4.0).with_restriction(SignRestriction::Integer));
        model.add_constraint(Constraint::new(vec![1.0, 2.0], Relation::LessOrEqual, 6.0));
        model.add_constraint(Constraint::new(vec![3.0, 1.0], Relation::LessOrEqual, 9.0));

        let result = solve(&model, &settings()).expect("Resuelve");

        assert_eq!(result.status, SolverStatus::Optimal);
        assert!((result.objective.unwrap() - 14.0).abs() < 1e-6);
        assert!((result.value_of("x1").unwrap() - 2.0).abs() < 1e-6);
        assert!((result.value_of("x2").unwrap() - 2.0).abs() < 1e-6);
        assert!(result.cuts_added >= 1);

        // Toda solución entregada respeta las restricciones originales
        let x: Vec<f64> = result.variables.iter().map(|(_, v)| *v).collect();
        for c in &model.constraints {
            assert!(c.is_satisfied(&x));
        }
    }

    #[test]
    fn test_integral_relaxation_needs_no_cuts() {
        // El óptimo de la relajación ya es entero
        let mut model = Model::new("YaEntero", OptimizationDirection::Maximize);
        model.add_variable(Variable::new("x1", 2.0).with_restriction(SignRestriction::Integer));
        model.add_constraint(Constraint::new(vec![1.0], Relation::LessOrEqual, 3.0));

        let result = solve(&model, &settings()).expect("Resuelve");

        assert_eq!(result.status, SolverStatus::Optimal);
        assert_eq!(result.cuts_added, 0);
        assert!((result.objective.unwrap() - 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_binary_bound_rows_are_prepended() {
        // max x1 + x2 binarias con x1 + x2 <= 5: el óptimo es (1, 1)
        let mut model = Model::new("Bin", OptimizationDirection::Maximize);
        model.add_variable(Variable::new("x1", 1.0).with_restriction(SignRestriction::Binary));
        model.add_variable(Variable::new("x2", 1.0).with_restriction(SignRestriction::Binary));
        model.add_constraint(Constraint::new(vec![1.0, 1.0], Relation::LessOrEqual, 5.0));

        let result = solve(&model, &settings()).expect("Resuelve");

        assert_eq!(result.status, SolverStatus::Optimal);
        assert!((result.objective.unwrap() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_fallback_to_branch_and_bound() {
        // Una fila >= rompe la forma de cortes: se delega en B&B
        let mut model = Model::new("NoApta", OptimizationDirection::Maximize);
        model.add_variable(Variable::new("x1", 5.0).with_restriction(SignRestriction::Integer));
        model.add_variable(Variable::new("x2", 4.0).with_restriction(SignRestriction::Integer));
        model.add_constraint(Constraint::new(vec![6.0, 4.0], Relation::LessOrEqual, 24.0));
        model.add_constraint(Constraint::new(vec![1.0, 2.0], Relation::LessOrEqual, 6.0));
        model.add_constraint(Constraint::new(
            vec![1.0, 0.0],
            Relation::GreaterOrEqual,
            0.0,
        ));

        let result = solve(&model, &settings()).expect("Resuelve");

        assert_eq!(result.status, SolverStatus::Optimal);
        assert!((result.objective.unwrap() - 20.0).abs() < 1e-6);
        assert!(result.log[0].contains("ramificación"));
    }

    #[test]
    fn test_cut_cap_yields_best_effort_report() {
        let mut model = Model::new("TopeCortes", OptimizationDirection::Maximize);
        model.add_variable(Variable::new("x1", 3.0).with_restriction(SignRestriction::Integer));
        model.add_variable(Variable::new("x2", 4.0).with_restriction(SignRestriction::Integer));
        model.add_constraint(Constraint::new(vec![1.0, 2.0], Relation::LessOrEqual, 6.0));
        model.add_constraint(Constraint::new(vec![3.0, 1.0], Relation::LessOrEqual, 9.0));

        let settings = SolverSettings {
            max_cuts: 0,
            ..SolverSettings::default()
        };
        let result = solve(&model, &settings).expect("Corre");

        assert_eq!(result.status, SolverStatus::CutLimit);
        // El candidato redondeado de (2.4, 1.8) es (2, 2): factible
        if let Some(z) = result.objective {
            let x: Vec<f64> = result.variables.iter().map(|(_, v)| *v).collect();
            for c in &model.constraints {
                assert!(c.is_satisfied(&x));
            }
            assert!(z <= 14.0 + 1e-6);
        }
    }
}
