// src/optimization/algorithms/branch_bound.rs
//
// Ramificación y acotación en profundidad sobre relajaciones lineales.
// Cada nodo clona el tableau óptimo de su padre, inyecta UNA fila de
// ramificación (x_j <= piso o x_j >= techo) y re-optimiza con el
// simplex dual; nunca se reconstruye el problema desde cero.

use std::time::Instant;

use super::{IterOutcome, col_name, column_values, dual_simplex, primal_simplex};
use crate::formatting::scalar::{INT_TOL, fmt_scalar, fractional_part};
use crate::optimization::error::OptimizationError;
use crate::optimization::internal::SimplexTableau;
use crate::optimization::model::{Constraint, Model, Relation};
use crate::optimization::result::{SolverResult, SolverStatus};
use crate::optimization::settings::SolverSettings;
use crate::optimization::transformers::to_canonical_form;

/// Cota de ramificación pendiente de inyectar en el nodo.
#[derive(Debug, Clone, Copy)]
struct Branch {
    col: usize,
    bound: f64,
    upper: bool,
}

#[derive(Debug)]
struct Node {
    tableau: SimplexTableau,
    pending: Option<Branch>,
    depth: usize,
}

pub fn solve(model: &Model, settings: &SolverSettings) -> Result<SolverResult, OptimizationError> {
    let start = Instant::now();
    model.validate()?;

    let mut log = Vec::new();

    // Variables a forzar enteras; sin marcas int/bin se toman todas,
    // consistente con la lectura de mochila del modelo.
    let mut int_vars = model.integer_indices();
    if int_vars.is_empty() {
        log.push("Sin variables int/bin: todas las variables se tratan como enteras".to_string());
        int_vars = (0..model.num_variables()).collect();
    }

    // Raíz: cota x_j <= 1 por cada binaria antes de resolver la relajación
    let mut root_model = model.clone();
    for &j in &model.binary_indices() {
        let mut coeffs = vec![0.0; model.num_variables()];
        coeffs[j] = 1.0;
        root_model.add_constraint(
            Constraint::new(coeffs, Relation::LessOrEqual, 1.0)
                .with_name(&format!("b{}", j + 1)),
        );
    }

    let canonical = to_canonical_form(&root_model)?;
    let root = primal_simplex::solve_canonical(canonical, settings)?;
    log.extend(root.log);
    let canonical = root.canonical;
    let mut iterations = root.iterations;

    match root.status {
        SolverStatus::Optimal => {}
        other => {
            log.push("La relajación raíz no llegó a óptimo".to_string());
            return Ok(assemble(
                model, &canonical, other, None, iterations, 0, log, start,
            ));
        }
    }
    log.push(format!(
        "Raíz: relajación lineal con z = {}",
        fmt_scalar(root.tableau.objective_value())
    ));

    let names = canonical.names.column_names.clone();
    let mut stack = vec![Node {
        tableau: root.tableau,
        pending: None,
        depth: 0,
    }];

    // Incumbente: (valores del usuario, objetivo interno de maximización)
    let mut incumbent: Option<(Vec<f64>, f64)> = None;
    let mut nodes = 0usize;
    let mut capped = false;
    let mut cancelled = false;

    while let Some(mut node) = stack.pop() {
        if settings.cancel.is_cancelled() {
            cancelled = true;
            break;
        }
        if nodes >= settings.max_nodes {
            capped = true;
            break;
        }
        nodes += 1;

        // Inyección de la fila de ramificación y re-optimización dual
        if let Some(branch) = node.pending {
            let relation = if branch.upper { "<=" } else { ">=" };
            log.push(format!(
                "Nodo {} (prof. {}): se agrega {} {} {}",
                nodes,
                node.depth,
                col_name(&names, branch.col),
                relation,
                fmt_scalar(branch.bound)
            ));

            node.tableau
                .inject_bound_row(branch.col, branch.bound, branch.upper)?;

            match dual_simplex::iterate_dual(
                &mut node.tableau,
                settings,
                &mut log,
                &mut iterations,
                &names,
            )? {
                IterOutcome::Optimal => {}
                IterOutcome::Infeasible => {
                    log.push(format!("Nodo {}: infactible, se poda", nodes));
                    continue;
                }
                IterOutcome::IterationLimit => {
                    log.push(format!("Nodo {}: tope de iteraciones, se poda", nodes));
                    continue;
                }
                IterOutcome::Cancelled => {
                    cancelled = true;
                    break;
                }
                IterOutcome::Unbounded => unreachable!("el lazo dual no emite Unbounded"),
            }
        }

        let z_node = node.tableau.objective_value();

        // Poda por cota: la relajación ya no puede mejorar a la incumbente
        if settings.bound_pruning {
            if let Some((_, best)) = &incumbent {
                if z_node <= best + INT_TOL {
                    log.push(format!(
                        "Nodo {}: cota {} no mejora la incumbente, se poda",
                        nodes,
                        fmt_scalar(z_node)
                    ));
                    continue;
                }
            }
        }

        // Variable fraccionaria con parte más cercana a 0.5
        let mut fractional: Option<(usize, f64, f64)> = None;
        for &vi in &int_vars {
            let Some(col) = canonical.decision_column(vi) else {
                continue;
            };
            let value = node.tableau.column_value(col);
            let f = fractional_part(value);
            if f > 0.0 {
                let score = (f - 0.5).abs();
                let better = match &fractional {
                    None => true,
                    Some((bcol, _, bscore)) => {
                        score < bscore - 1e-12 || ((score - bscore).abs() <= 1e-12 && col < *bcol)
                    }
                };
                if better {
                    fractional = Some((col, value, score));
                }
            }
        }

        match fractional {
            None => {
                // Candidato entero: todas las variables marcadas son enteras
                let cols = column_values(&node.tableau);
                let mut x = canonical.recover_solution(&cols);
                for &vi in &int_vars {
                    x[vi] = x[vi].round();
                }

                let improves = match &incumbent {
                    None => true,
                    Some((_, best)) => z_node > best + INT_TOL,
                };
                if improves {
                    log.push(format!(
                        "Nodo {}: candidato entero con z = {} (nueva incumbente)",
                        nodes,
                        fmt_scalar(user_objective(&canonical, z_node))
                    ));
                    incumbent = Some((x, z_node));
                } else {
                    log.push(format!(
                        "Nodo {}: candidato entero sin mejora (z = {})",
                        nodes,
                        fmt_scalar(user_objective(&canonical, z_node))
                    ));
                }
            }
            Some((col, value, _)) => {
                let lo = value.floor();
                let hi = value.ceil();
                log.push(format!(
                    "Nodo {}: rama en {} = {} -> {} <= {} | {} >= {}",
                    nodes,
                    col_name(&names, col),
                    fmt_scalar(value),
                    col_name(&names, col),
                    fmt_scalar(lo),
                    col_name(&names, col),
                    fmt_scalar(hi)
                ));

                // Derecha primero a la pila: la rama izquierda se explora antes
                stack.push(Node {
                    tableau: node.tableau.clone(),
                    pending: Some(Branch {
                        col,
                        bound: hi,
                        upper: false,
                    }),
                    depth: node.depth + 1,
                });
                stack.push(Node {
                    tableau: node.tableau,
                    pending: Some(Branch {
                        col,
                        bound: lo,
                        upper: true,
                    }),
                    depth: node.depth + 1,
                });
            }
        }
    }

    let status = if cancelled {
        SolverStatus::Timeout
    } else if capped {
        SolverStatus::NodeLimit
    } else if incumbent.is_some() {
        SolverStatus::Optimal
    } else {
        SolverStatus::Infeasible
    };

    if status == SolverStatus::Infeasible {
        log.push("Búsqueda agotada sin candidato entero: infactible".to_string());
    }

    Ok(assemble(
        model, &canonical, status, incumbent, iterations, nodes, log, start,
    ))
}

fn user_objective(
    canonical: &crate::optimization::transformers::CanonicalForm,
    engine_z: f64,
) -> f64 {
    if canonical.flip_objective {
        -engine_z
    } else {
        engine_z
    }
}

#[allow(clippy::too_many_arguments)]
fn assemble(
    model: &Model,
    canonical: &crate::optimization::transformers::CanonicalForm,
    status: SolverStatus,
    incumbent: Option<(Vec<f64>, f64)>,
    iterations: usize,
    nodes: usize,
    mut log: Vec<String>,
    start: Instant,
) -> SolverResult {
    let (objective, variables) = match incumbent {
        Some((x, engine_z)) => {
            let objective = user_objective(canonical, engine_z);
            let variables = model
                .variables
                .iter()
                .zip(x.iter())
                .map(|(v, value)| (v.name.clone(), *value))
                .collect();
            (Some(objective), variables)
        }
        None => (None, Vec::new()),
    };

    if let Some(z) = objective {
        log.push(format!("Mejor solución entera: z = {}", fmt_scalar(z)));
    }

    SolverResult {
        status,
        objective,
        variables,
        iterations,
        nodes_explored: nodes,
        cuts_added: 0,
        elapsed_ms: start.elapsed().as_millis() as u64,
        log,
        sensitivity: None,
    }
}
