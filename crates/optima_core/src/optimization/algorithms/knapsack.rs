// src/optimization/algorithms/knapsack.rs
//
// Especialización 0-1 de la mochila: ramificación y acotación en
// profundidad con cota superior fraccionaria por llenado voraz en orden
// de razón v/w. Se ramifica sobre el primer artículo fraccionario de la
// cota: una rama lo prohíbe y la otra lo fuerza.

use std::time::Instant;

use ordered_float::OrderedFloat;

use crate::formatting::scalar::{EPSILON, fmt_scalar};
use crate::optimization::error::{LinearOptimizationError, OptimizationError};
use crate::optimization::model::Model;
use crate::optimization::result::{SolverResult, SolverStatus};
use crate::optimization::settings::SolverSettings;

struct BoundInfo {
    upper: f64,
    frac_item: Option<usize>,
    taken: Vec<usize>,
    feasible: bool,
}

pub fn solve(model: &Model, settings: &SolverSettings) -> Result<SolverResult, OptimizationError> {
    let start = Instant::now();
    model.validate()?;

    if !model.is_knapsack_shape() {
        return Err(LinearOptimizationError::UnsupportedShape(
            "la mochila 0-1 requiere MAX, una sola restricción <= y variables binarias".to_string(),
        )
        .into());
    }

    let n = model.num_variables();
    let values = model.objective_coeffs();
    let weights = model.constraints[0].coeffs.clone();
    let capacity = model.constraints[0].rhs;

    let mut log = Vec::new();

    if capacity < 0.0 {
        log.push("Capacidad negativa: no hay asignación factible".to_string());
        let mut result = SolverResult::empty(SolverStatus::Infeasible);
        result.log = log;
        result.elapsed_ms = start.elapsed().as_millis() as u64;
        return Ok(result);
    }

    // Un peso nulo cuenta como razón infinita: el artículo entra gratis
    let ratio = |i: usize| -> f64 {
        if weights[i] <= EPSILON {
            f64::INFINITY
        } else {
            values[i] / weights[i]
        }
    };

    // Orden por razón descendente, empates por índice original
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| {
        OrderedFloat(ratio(j))
            .cmp(&OrderedFloat(ratio(i)))
            .then(i.cmp(&j))
    });

    log.push(format!("Tabla de razones (capacidad {}):", fmt_scalar(capacity)));
    for &i in &order {
        log.push(format!(
            "  {}: v = {}, w = {}, v/w = {}",
            model.variables[i].name,
            fmt_scalar(values[i]),
            fmt_scalar(weights[i]),
            if ratio(i).is_infinite() {
                "inf".to_string()
            } else {
                fmt_scalar(ratio(i))
            }
        ));
    }

    // Cota superior fraccionaria de una asignación parcial
    let bound = |fixed: &[Option<bool>]| -> BoundInfo {
        let mut weight = 0.0;
        let mut value = 0.0;
        let mut taken = Vec::new();

        for i in 0..n {
            if fixed[i] == Some(true) {
                weight += weights[i];
                value += values[i];
                taken.push(i);
            }
        }

        if weight > capacity + EPSILON {
            return BoundInfo {
                upper: 0.0,
                frac_item: None,
                taken,
                feasible: false,
            };
        }

        let mut remaining = capacity - weight;
        let mut upper = value;
        let mut frac_item = None;

        for &i in &order {
            if fixed[i].is_some() {
                continue;
            }
            if weights[i] <= remaining + EPSILON {
                upper += values[i];
                remaining -= weights[i];
                taken.push(i);
            } else if remaining > EPSILON {
                // Último artículo fraccionario permitido en la cota
                upper += values[i] * remaining / weights[i];
                frac_item = Some(i);
                break;
            } else {
                break;
            }
        }

        BoundInfo {
            upper,
            frac_item,
            taken,
            feasible: true,
        }
    };

    let mut stack: Vec<Vec<Option<bool>>> = vec![vec![None; n]];
    let mut best: Option<(Vec<usize>, f64)> = None;
    let mut nodes = 0usize;
    let mut capped = false;
    let mut cancelled = false;

    while let Some(fixed) = stack.pop() {
        if settings.cancel.is_cancelled() {
            cancelled = true;
            break;
        }
        if nodes >= settings.max_nodes {
            capped = true;
            break;
        }
        nodes += 1;

        let info = bound(&fixed);
        if !info.feasible {
            log.push(format!("Nodo {}: los forzados exceden la capacidad, se poda", nodes));
            continue;
        }

        if settings.bound_pruning {
            if let Some((_, best_value)) = &best {
                if info.upper <= best_value + EPSILON {
                    log.push(format!(
                        "Nodo {}: cota {} no mejora {}, se poda",
                        nodes,
                        fmt_scalar(info.upper),
                        fmt_scalar(*best_value)
                    ));
                    continue;
                }
            }
        }

        match info.frac_item {
            None => {
                // La cota voraz es entera: candidato
                let improves = match &best {
                    None => true,
                    Some((_, best_value)) => info.upper > best_value + EPSILON,
                };
                if improves {
                    log.push(format!(
                        "Nodo {}: candidato entero con valor {} (nueva incumbente)",
                        nodes,
                        fmt_scalar(info.upper)
                    ));
                    best = Some((info.taken, info.upper));
                }
            }
            Some(item) => {
                log.push(format!(
                    "Nodo {}: cota {} fraccionaria en {}, se ramifica",
                    nodes,
                    fmt_scalar(info.upper),
                    model.variables[item].name
                ));
                let mut forbid = fixed.clone();
                forbid[item] = Some(false);
                let mut force = fixed;
                force[item] = Some(true);
                // Se apila primero la prohibición: la rama que fuerza se explora antes
                stack.push(forbid);
                stack.push(force);
            }
        }
    }

    let status = if cancelled {
        SolverStatus::Timeout
    } else if capped {
        SolverStatus::NodeLimit
    } else if best.is_some() {
        SolverStatus::Optimal
    } else {
        SolverStatus::Infeasible
    };

    let (objective, variables) = match &best {
        Some((taken, value)) => {
            let mut x = vec![0.0; n];
            for &i in taken {
                x[i] = 1.0;
            }
            let variables: Vec<(String, f64)> = model
                .variables
                .iter()
                .zip(x.iter())
                .map(|(v, val)| (v.name.clone(), *val))
                .collect();
            log.push(format!("Mejor asignación: valor {}", fmt_scalar(*value)));
            (Some(*value), variables)
        }
        None => (None, Vec::new()),
    };

    Ok(SolverResult {
        status,
        objective,
        variables,
        iterations: 0,
        nodes_explored: nodes,
        cuts_added: 0,
        elapsed_ms: start.elapsed().as_millis() as u64,
        log,
        sensitivity: None,
    })
}
