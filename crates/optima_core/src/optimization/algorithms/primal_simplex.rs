// src/optimization/algorithms/primal_simplex.rs
//
// Simplex primal de dos fases sobre el tableau. Fase I maximiza
// -Σ artificiales; si el óptimo auxiliar queda en 0 se retiran las
// columnas artificiales y Fase II continúa con el objetivo original
// sobre la misma base.

use std::collections::HashSet;
use std::time::Instant;

use super::{IterOutcome, LpOutcome, col_name, finish_lp};
use crate::formatting::scalar::{EPSILON, INT_TOL, fmt_scalar};
use crate::linear_algebra::DenseMatrix;
use crate::optimization::error::{LinearOptimizationError, OptimizationError};
use crate::optimization::internal::SimplexTableau;
use crate::optimization::model::Model;
use crate::optimization::result::{SolverResult, SolverStatus};
use crate::optimization::settings::SolverSettings;
use crate::optimization::transformers::{CanonicalForm, to_canonical_form};

pub fn solve(model: &Model, settings: &SolverSettings) -> Result<SolverResult, OptimizationError> {
    let start = Instant::now();
    let canonical = to_canonical_form(model)?;
    let outcome = solve_canonical(canonical, settings)?;
    Ok(finish_lp(model, outcome, start, true))
}

/// Corrida completa de dos fases sobre una forma canónica ya armada.
/// Deja el tableau final a disposición de B&B y planos cortantes.
pub(crate) fn solve_canonical(
    canonical: CanonicalForm,
    settings: &SolverSettings,
) -> Result<LpOutcome, OptimizationError> {
    let mut log = Vec::new();
    let mut iterations = 0usize;
    let mut canonical = canonical;
    let mut tableau;

    if canonical.needs_phase_one {
        log.push(format!(
            "Fase I: maximizar -Σ artificiales ({} columnas auxiliares)",
            canonical.artificial_cols.len()
        ));
        tableau = SimplexTableau::from_canonical(&canonical, true);

        match iterate_primal(
            &mut tableau,
            settings,
            &mut log,
            &mut iterations,
            &canonical.names.column_names,
        )? {
            IterOutcome::Optimal => {}
            IterOutcome::Unbounded => {
                return Err(LinearOptimizationError::NumericalError(
                    "el objetivo auxiliar de Fase I no puede ser no acotado".to_string(),
                )
                .into());
            }
            IterOutcome::IterationLimit => {
                return Ok(LpOutcome {
                    canonical,
                    tableau,
                    status: SolverStatus::IterationLimit,
                    iterations,
                    log,
                });
            }
            IterOutcome::Cancelled => {
                return Ok(LpOutcome {
                    canonical,
                    tableau,
                    status: SolverStatus::Timeout,
                    iterations,
                    log,
                });
            }
            IterOutcome::Infeasible => unreachable!("el lazo primal no emite Infeasible"),
        }

        let aux = tableau.objective_value();
        if aux.abs() > INT_TOL {
            log.push(format!(
                "Fase I: óptimo auxiliar {} distinto de 0, el problema es infactible",
                fmt_scalar(aux)
            ));
            return Ok(LpOutcome {
                canonical,
                tableau,
                status: SolverStatus::Infeasible,
                iterations,
                log,
            });
        }
        log.push("Fase I: base factible encontrada (auxiliar en 0)".to_string());

        pivot_out_artificials(&mut tableau, &canonical, &mut log)?;
        let (stripped, rebuilt) = strip_artificials(canonical, tableau);
        canonical = stripped;
        tableau = rebuilt;
        log.push("Fase II: objetivo original restaurado sobre la base de Fase I".to_string());
    } else {
        tableau = SimplexTableau::from_canonical(&canonical, false);
        if !tableau.detect_identity_basis() {
            log.push("No hay base identidad inicial: se reporta infactible".to_string());
            return Ok(LpOutcome {
                canonical,
                tableau,
                status: SolverStatus::Infeasible,
                iterations,
                log,
            });
        }
    }

    if settings.verbose {
        log.extend(tableau.render(&canonical.names.column_names));
    }

    let status = match iterate_primal(
        &mut tableau,
        settings,
        &mut log,
        &mut iterations,
        &canonical.names.column_names,
    )? {
        IterOutcome::Optimal => SolverStatus::Optimal,
        IterOutcome::Unbounded => SolverStatus::Unbounded,
        IterOutcome::IterationLimit => SolverStatus::IterationLimit,
        IterOutcome::Cancelled => SolverStatus::Timeout,
        IterOutcome::Infeasible => unreachable!("el lazo primal no emite Infeasible"),
    };

    if settings.verbose && status == SolverStatus::Optimal {
        log.extend(tableau.render(&canonical.names.column_names));
    }

    Ok(LpOutcome {
        canonical,
        tableau,
        status,
        iterations,
        log,
    })
}

/// Lazo de pivoteo primal (regla de Dantzig).
/// Entra la columna con costo reducido más negativo; sale la fila de
/// razón mínima, con empates resueltos a favor del índice básico mayor.
pub(crate) fn iterate_primal(
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

        // Columna entrante
        let n = tableau.num_cols();
        let mut entering = None;
        let mut best = -EPSILON;
        for j in 0..n {
            let rc = tableau.reduced_cost(j);
            if rc < best {
                best = rc;
                entering = Some(j);
            }
        }
        let Some(enter) = entering else {
            return Ok(IterOutcome::Optimal);
        };

        // Fila saliente: prueba de la razón mínima
        let mut leaving: Option<(usize, f64)> = None;
        for r in 0..tableau.num_rows() {
            let coeff = tableau.coeff(r, enter);
            if coeff > EPSILON {
                let ratio = tableau.rhs(r) / coeff;
                leaving = match leaving {
                    None => Some((r, ratio)),
                    Some((br, brat)) => {
                        if ratio < brat - EPSILON {
                            Some((r, ratio))
                        } else if (ratio - brat).abs() <= EPSILON
                            && tableau.basic_vars[r] > tableau.basic_vars[br]
                        {
                            // Empate: el índice básico mayor estabiliza la degeneración
                            Some((r, ratio))
                        } else {
                            Some((br, brat))
                        }
                    }
                };
            }
        }
        let Some((leave, ratio)) = leaving else {
            return Ok(IterOutcome::Unbounded);
        };

        *iterations += 1;
        if settings.verbose {
            log.push(format!(
                "Iteración {}: entra {}, sale {} (razón {})",
                iterations,
                col_name(names, enter),
                col_name(names, tableau.basic_vars[leave]),
                fmt_scalar(ratio)
            ));
        }
        tableau.pivot(leave, enter)?;
    }
}

/// Saca de la base toda artificial que haya quedado básica al cierre de
/// Fase I, pivoteando sobre cualquier columna estructural con coeficiente
/// no nulo en su fila.
fn pivot_out_artificials(
    tableau: &mut SimplexTableau,
    canonical: &CanonicalForm,
    log: &mut Vec<String>,
) -> Result<(), OptimizationError> {
    let artificial: HashSet<usize> = canonical.artificial_cols.iter().copied().collect();

    for r in 0..tableau.num_rows() {
        let j = tableau.basic_vars[r];
        if !artificial.contains(&j) {
            continue;
        }

        let target = (0..tableau.num_cols())
            .find(|k| !artificial.contains(k) && tableau.coeff(r, *k).abs() > EPSILON);

        match target {
            Some(k) => {
                log.push(format!(
                    "Fase I: artificial {} sale de la base por {}",
                    col_name(&canonical.names.column_names, j),
                    col_name(&canonical.names.column_names, k)
                ));
                tableau.pivot(r, k)?;
            }
            None => {
                return Err(LinearOptimizationError::NumericalError(format!(
                    "fila {} redundante o degenerada al retirar artificiales",
                    r + 1
                ))
                .into());
            }
        }
    }
    Ok(())
}

/// Elimina las columnas artificiales, remapea los índices y reconstruye
/// la fila z con el objetivo de Fase II sobre la base vigente.
fn strip_artificials(
    canonical: CanonicalForm,
    tableau: SimplexTableau,
) -> (CanonicalForm, SimplexTableau) {
    let m = canonical.num_rows();
    let n = canonical.num_cols();
    let artificial: HashSet<usize> = canonical.artificial_cols.iter().copied().collect();

    let keep: Vec<usize> = (0..n).filter(|j| !artificial.contains(j)).collect();
    let mut remap = vec![usize::MAX; n];
    for (new_j, &old_j) in keep.iter().enumerate() {
        remap[old_j] = new_j;
    }
    let new_n = keep.len();

    // Forma canónica sin artificiales
    let mut a = DenseMatrix::zeros(m, new_n);
    for i in 0..m {
        for (new_j, &old_j) in keep.iter().enumerate() {
            a.set(i, new_j, canonical.a.get(i, old_j));
        }
    }
    let c: Vec<f64> = keep.iter().map(|&j| canonical.c[j]).collect();
    let column_names: Vec<String> = keep
        .iter()
        .map(|&j| canonical.names.column_names[j].clone())
        .collect();
    let slack_cols: Vec<usize> = canonical.slack_cols.iter().map(|&j| remap[j]).collect();
    let surplus_cols: Vec<usize> = canonical.surplus_cols.iter().map(|&j| remap[j]).collect();
    let row_added_columns: Vec<Vec<usize>> = canonical
        .names
        .row_added_columns
        .iter()
        .map(|cols| {
            cols.iter()
                .filter(|j| !artificial.contains(j))
                .map(|&j| remap[j])
                .collect()
        })
        .collect();

    let basic_idx: Vec<usize> = tableau.basic_vars.iter().map(|&j| remap[j]).collect();

    // Tableau sin las columnas retiradas
    let mut matrix = DenseMatrix::zeros(m + 1, new_n + 1);
    for r in 1..=m {
        for (new_j, &old_j) in keep.iter().enumerate() {
            matrix.set(r, new_j, tableau.matrix.get(r, old_j));
        }
        matrix.set(r, new_n, tableau.matrix.get(r, n));
    }

    let mut new_tableau = SimplexTableau {
        matrix,
        basic_vars: basic_idx.clone(),
        non_basic_vars: Vec::new(),
    };
    new_tableau.refresh_non_basic();
    new_tableau.price_out(&c, canonical.z0);

    let new_canonical = CanonicalForm {
        a,
        b: canonical.b,
        c,
        z0: canonical.z0,
        basic_idx,
        non_basic_idx: new_tableau.non_basic_vars.clone(),
        needs_phase_one: false,
        c_phase_one: vec![0.0; new_n],
        slack_cols,
        surplus_cols,
        artificial_cols: Vec::new(),
        num_decision_cols: canonical.num_decision_cols,
        flip_objective: canonical.flip_objective,
        names: crate::optimization::transformers::NameMap {
            column_names,
            row_names: canonical.names.row_names,
            variable_columns: canonical.names.variable_columns,
            row_added_columns,
        },
    };

    (new_canonical, new_tableau)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::model::{
        Constraint, OptimizationDirection, Relation, SignRestriction, Variable,
    };

    fn settings() -> SolverSettings {
        SolverSettings::default()
    }

    #[test]
    fn test_production_example() {
        // max 3x1 + 5x2; x1 <= 4; 2x2 <= 12; 3x1 + 2x2 <= 18
        let mut model = Model::new("Prod", OptimizationDirection::Maximize);
        model.add_variable(Variable::new("x1", 3.0));
        model.add_variable(Variable::new("x2", 5.0));
        model.add_constraint(Constraint::new(vec![1.0, 0.0], Relation::LessOrEqual, 4.0));
        model.add_constraint(Constraint::new(vec![0.0, 2.0], Relation::LessOrEqual, 12.0));
        model.add_constraint(Constraint::new(vec![3.0, 2.0], Relation::LessOrEqual, 18.0));

        let result = solve(&model, &settings()).expect("Resuelve");

        assert_eq!(result.status, SolverStatus::Optimal);
        assert!((result.objective.unwrap() - 36.0).abs() < 1e-6);
        assert!((result.value_of("x1").unwrap() - 2.0).abs() < 1e-6);
        assert!((result.value_of("x2").unwrap() - 6.0).abs() < 1e-6);
        assert!(result.sensitivity.is_some());
    }

    #[test]
    fn test_min_model_with_phase_one() {
        // min 6x1 + 8x2; 3x1 + x2 >= 4; x1 + 2x2 >= 4
        let mut model = Model::new("Dieta", OptimizationDirection::Minimize);
        model.add_variable(Variable::new("x1", 6.0));
        model.add_variable(Variable::new("x2", 8.0));
        model.add_constraint(Constraint::new(vec![3.0, 1.0], Relation::GreaterOrEqual, 4.0));
        model.add_constraint(Constraint::new(vec![1.0, 2.0], Relation::GreaterOrEqual, 4.0));

        let result = solve(&model, &settings()).expect("Resuelve");

        assert_eq!(result.status, SolverStatus::Optimal);
        // Óptimo en la intersección: x = (4/5, 8/5), z = 88/5
        assert!((result.objective.unwrap() - 17.6).abs() < 1e-6);
        assert!((result.value_of("x1").unwrap() - 0.8).abs() < 1e-6);
        assert!((result.value_of("x2").unwrap() - 1.6).abs() < 1e-6);
    }

    #[test]
    fn test_equality_constraint_goes_through_phase_one() {
        // max x1 + x2 con x1 + x2 = 5 y x1 <= 3
        let mut model = Model::new("Igualdad", OptimizationDirection::Maximize);
        model.add_variable(Variable::new("x1", 1.0));
        model.add_variable(Variable::new("x2", 1.0));
        model.add_constraint(Constraint::new(vec![1.0, 1.0], Relation::Equal, 5.0));
        model.add_constraint(Constraint::new(vec![1.0, 0.0], Relation::LessOrEqual, 3.0));

        let result = solve(&model, &settings()).expect("Resuelve");

        assert_eq!(result.status, SolverStatus::Optimal);
        assert!((result.objective.unwrap() - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_unbounded_problem() {
        // max x1 sin cota superior en su dirección de crecimiento
        let mut model = Model::new("Unbounded", OptimizationDirection::Maximize);
        model.add_variable(Variable::new("x1", 1.0));
        model.add_variable(Variable::new("x2", 0.0));
        model.add_constraint(Constraint::new(vec![0.0, 1.0], Relation::LessOrEqual, 5.0));

        let result = solve(&model, &settings()).expect("Corre sin error");
        assert_eq!(result.status, SolverStatus::Unbounded);
        assert!(result.objective.is_none());
    }

    #[test]
    fn test_infeasible_problem() {
        // x1 <= 2 junto con x1 >= 5
        let mut model = Model::new("Infeasible", OptimizationDirection::Maximize);
        model.add_variable(Variable::new("x1", 1.0));
        model.add_constraint(Constraint::new(vec![1.0], Relation::LessOrEqual, 2.0));
        model.add_constraint(Constraint::new(vec![1.0], Relation::GreaterOrEqual, 5.0));

        let result = solve(&model, &settings()).expect("Corre sin error");
        assert_eq!(result.status, SolverStatus::Infeasible);
    }

    #[test]
    fn test_degenerate_lp_terminates() {
        // Dos cotas activas en el origen (b = 0): el desempate por índice
        // básico mayor debe evitar el ciclo.
        let mut model = Model::new("Degenerado", OptimizationDirection::Maximize);
        model.add_variable(Variable::new("x1", 1.0));
        model.add_variable(Variable::new("x2", 2.0));
        model.add_constraint(Constraint::new(vec![1.0, -1.0], Relation::LessOrEqual, 0.0));
        model.add_constraint(Constraint::new(vec![1.0, 1.0], Relation::LessOrEqual, 0.0));
        model.add_constraint(Constraint::new(vec![0.0, 1.0], Relation::LessOrEqual, 4.0));

        let result = solve(&model, &settings()).expect("Resuelve");
        assert_eq!(result.status, SolverStatus::Optimal);
        assert!((result.objective.unwrap() - 0.0).abs() < 1e-6);
    }

    #[test]
    fn test_free_variable_can_go_negative() {
        // min x con x >= -7 (x libre)
        let mut model = Model::new("Libre", OptimizationDirection::Minimize);
        model.add_variable(Variable::new("x1", 1.0).with_restriction(SignRestriction::Free));
        model.add_constraint(Constraint::new(vec![1.0], Relation::GreaterOrEqual, -7.0));

        let result = solve(&model, &settings()).expect("Resuelve");

        assert_eq!(result.status, SolverStatus::Optimal);
        assert!((result.objective.unwrap() + 7.0).abs() < 1e-6);
        assert!((result.value_of("x1").unwrap() + 7.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_constraint_set_is_trivial_or_unbounded() {
        // Sin restricciones y costo positivo: no acotado
        let mut model = Model::new("SinFilas", OptimizationDirection::Maximize);
        model.add_variable(Variable::new("x1", 2.0));
        let result = solve(&model, &settings()).expect("Corre");
        assert_eq!(result.status, SolverStatus::Unbounded);

        // Sin restricciones y costo desfavorable: óptimo trivial en 0
        let mut model = Model::new("SinFilasMin", OptimizationDirection::Minimize);
        model.add_variable(Variable::new("x1", 2.0));
        let result = solve(&model, &settings()).expect("Corre");
        assert_eq!(result.status, SolverStatus::Optimal);
        assert!((result.objective.unwrap() - 0.0).abs() < 1e-6);
    }

    #[test]
    fn test_iteration_cap_is_reported() {
        let mut model = Model::new("Tope", OptimizationDirection::Maximize);
        model.add_variable(Variable::new("x1", 3.0));
        model.add_variable(Variable::new("x2", 5.0));
        model.add_constraint(Constraint::new(vec![1.0, 0.0], Relation::LessOrEqual, 4.0));
        model.add_constraint(Constraint::new(vec![0.0, 2.0], Relation::LessOrEqual, 12.0));
        model.add_constraint(Constraint::new(vec![3.0, 2.0], Relation::LessOrEqual, 18.0));

        let settings = SolverSettings {
            max_iterations: 1,
            ..SolverSettings::default()
        };
        let result = solve(&model, &settings).expect("Corre");
        assert_eq!(result.status, SolverStatus::IterationLimit);
    }

    #[test]
    fn test_verbose_log_carries_pivots_and_tableau() {
        let mut model = Model::new("Verbose", OptimizationDirection::Maximize);
        model.add_variable(Variable::new("x1", 3.0));
        model.add_variable(Variable::new("x2", 5.0));
        model.add_constraint(Constraint::new(vec![1.0, 0.0], Relation::LessOrEqual, 4.0));
        model.add_constraint(Constraint::new(vec![0.0, 2.0], Relation::LessOrEqual, 12.0));
        model.add_constraint(Constraint::new(vec![3.0, 2.0], Relation::LessOrEqual, 18.0));

        let settings = SolverSettings {
            verbose: true,
            ..SolverSettings::default()
        };
        let result = solve(&model, &settings).expect("Resuelve");

        assert!(result.log.iter().any(|l| l.contains("Iteración")));
        assert!(result.log.iter().any(|l| l.contains("base")));
        assert!(result.log.iter().any(|l| l.contains("RHS")));
    }

    #[test]
    fn test_cancelled_run_reports_timeout() {
        let mut model = Model::new("Cancelado", OptimizationDirection::Maximize);
        model.add_variable(Variable::new("x1", 1.0));
        model.add_constraint(Constraint::new(vec![1.0], Relation::LessOrEqual, 4.0));

        let settings = SolverSettings::default();
        settings.cancel.cancel();

        let result = solve(&model, &settings).expect("Corre");
        assert_eq!(result.status, SolverStatus::Timeout);
    }
}
