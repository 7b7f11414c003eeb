// src/engine/actions.rs
//
// Acciones de seguimiento sobre la última resolución en caché: editar el
// RHS de una restricción, agregar una restricción, aplicar dualidad y
// consultar sensibilidad. Todas leen una instantánea de la caché y las
// que re-resuelven vuelven a escribirla vía `execute`.

use serde::Serialize;
use thiserror::Error;

use optima_core::formatting::scalar::{fmt_scalar, round3};
use optima_core::optimization::algorithms::primal_simplex;
use optima_core::optimization::error::OptimizationError;
use optima_core::optimization::sensitivity::{
    self, CostRange, NonBasicEntry, ShadowPrice, strong_duality_holds,
};
use optima_core::optimization::settings::SolverSettings;

use crate::domains::linear_program::parser::ParseError;
use crate::engine::cache;
use crate::engine::executor::{Algorithm, SolveRequest, execute};
use crate::outputs::SolveResponse;

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("No hay una resolución previa en caché")]
    NoCachedSolve,

    #[error("Índice de restricción fuera de rango: {0}")]
    BadConstraintIndex(usize),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Core(#[from] OptimizationError),

    #[error("La última resolución no trae análisis de sensibilidad")]
    NoSensitivity,
}

/// Evaluación de dualidad sobre el modelo en caché.
#[derive(Debug, Clone, Serialize)]
pub struct DualityReport {
    pub dual_model_text: String,
    pub primal_objective: Option<f64>,
    pub dual_objective: Option<f64>,
    pub strong_duality: bool,
}

/// Relaciones reconocidas al escanear el texto crudo, con ancho en bytes.
const RELATION_TOKENS: [&str; 5] = ["<=", ">=", "≤", "≥", "="];

fn find_relation(line: &str) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize)> = None;
    for token in RELATION_TOKENS {
        if let Some(pos) = line.find(token) {
            let candidate = (pos, token.len());
            best = match best {
                None => Some(candidate),
                Some((bpos, blen)) => {
                    if pos < bpos {
                        Some(candidate)
                    } else {
                        Some((bpos, blen))
                    }
                }
            };
        }
    }
    best
}

fn strip_comment(line: &str) -> &str {
    let cut = line
        .find('#')
        .into_iter()
        .chain(line.find("//"))
        .min()
        .unwrap_or(line.len());
    &line[..cut]
}

fn is_constraint_line(line: &str) -> bool {
    find_relation(strip_comment(line)).is_some()
}

/// Reescribe el RHS de la restricción `index` (base 0) en el texto crudo,
/// conservando el espaciado y cualquier comentario al final de la línea.
fn rewrite_rhs(text: &str, index: usize, new_rhs: f64) -> Result<String, ActionError> {
    let mut seen = 0usize;
    let mut rewritten = false;

    let lines: Vec<String> = text
        .lines()
        .map(|line| {
            if rewritten || !is_constraint_line(line) {
                return line.to_string();
            }
            if seen != index {
                seen += 1;
                return line.to_string();
            }
            seen += 1;
            rewritten = true;
            rewrite_rhs_in_line(line, new_rhs)
        })
        .collect();

    if !rewritten {
        return Err(ActionError::BadConstraintIndex(index));
    }
    Ok(lines.join("\n"))
}

fn rewrite_rhs_in_line(line: &str, new_rhs: f64) -> String {
    let visible = strip_comment(line);
    let Some((pos, len)) = find_relation(visible) else {
        return line.to_string();
    };

    let head = &line[..pos + len];
    let tail = &line[pos + len..];

    // Espaciado previo al número, luego el número mismo
    let ws_end = tail
        .char_indices()
        .find(|(_, c)| !c.is_whitespace())
        .map(|(i, _)| i)
        .unwrap_or(tail.len());
    let (ws, rest) = tail.split_at(ws_end);

    let num_end = rest
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_digit() || matches!(c, '.' | ',' | '+' | '-' | 'e' | 'E')))
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    let remainder = &rest[num_end..];

    format!("{}{}{}{}", head, ws, fmt_scalar(new_rhs), remainder)
}

/// Cambiar RHS: localiza la k-ésima línea con relación (saltando
/// comentarios y la línea de signos), reescribe el número y re-resuelve
/// con el simplex primal.
pub fn change_rhs(index: usize, new_rhs: f64) -> Result<SolveResponse, ActionError> {
    let last = cache::snapshot().ok_or(ActionError::NoCachedSolve)?;
    let updated = rewrite_rhs(&last.model_text, index, new_rhs)?;

    let request = SolveRequest {
        algorithm: Some(Algorithm::PrimalSimplex),
        model_text: updated,
        settings: Default::default(),
    };
    Ok(execute(&request))
}

/// Agregar restricción: el texto nuevo se inserta justo antes de la
/// línea de signos (o al final si no la hay) y se re-resuelve.
pub fn add_constraint(constraint_line: &str) -> Result<SolveResponse, ActionError> {
    let last = cache::snapshot().ok_or(ActionError::NoCachedSolve)?;

    let lines: Vec<&str> = last.model_text.lines().collect();
    // La línea de signos es la última no vacía sin relación
    let sign_line_idx = lines
        .iter()
        .rposition(|l| {
            let visible = strip_comment(l);
            !visible.trim().is_empty() && find_relation(visible).is_none()
        })
        // La línea objetivo (índice 0) nunca es la de signos
        .filter(|&i| i > 0);

    let mut updated: Vec<&str> = Vec::with_capacity(lines.len() + 1);
    match sign_line_idx {
        Some(idx) => {
            updated.extend(&lines[..idx]);
            updated.push(constraint_line);
            updated.extend(&lines[idx..]);
        }
        None => {
            updated.extend(&lines);
            updated.push(constraint_line);
        }
    }

    let request = SolveRequest {
        algorithm: Some(Algorithm::PrimalSimplex),
        model_text: updated.join("\n"),
        settings: Default::default(),
    };
    Ok(execute(&request))
}

/// Construye y resuelve el dual del modelo en caché; reporta el texto
/// del dual y la evaluación de dualidad fuerte. Ambos lados se resuelven
/// con el simplex primal de dos fases.
pub fn apply_duality() -> Result<DualityReport, ActionError> {
    let last = cache::snapshot().ok_or(ActionError::NoCachedSolve)?;

    let dual_model = sensitivity::build_dual(&last.model).map_err(OptimizationError::from)?;
    let dual_model_text = dual_model.to_model_text();

    let settings = SolverSettings::default();
    let primal_result = primal_simplex::solve(&last.model, &settings)?;
    let dual_result = primal_simplex::solve(&dual_model, &settings)?;

    let strong = match (primal_result.objective, dual_result.objective) {
        (Some(zp), Some(zd)) => strong_duality_holds(zp, zd),
        _ => false,
    };

    Ok(DualityReport {
        dual_model_text,
        primal_objective: primal_result.objective.map(round3),
        dual_objective: dual_result.objective.map(round3),
        strong_duality: strong,
    })
}

/// Variables de decisión no básicas con su costo reducido.
pub fn nonbasic_list() -> Result<Vec<NonBasicEntry>, ActionError> {
    let last = cache::snapshot().ok_or(ActionError::NoCachedSolve)?;
    let payload = last
        .result
        .sensitivity
        .as_ref()
        .ok_or(ActionError::NoSensitivity)?;
    Ok(sensitivity::nonbasic_variables(payload))
}

/// Rango de costo de la variable no básica `j` (base 0).
pub fn range_for(column: usize) -> Result<CostRange, ActionError> {
    let last = cache::snapshot().ok_or(ActionError::NoCachedSolve)?;
    let payload = last
        .result
        .sensitivity
        .as_ref()
        .ok_or(ActionError::NoSensitivity)?;
    let range = sensitivity::range_for(payload, column).map_err(OptimizationError::from)?;
    Ok(range)
}

/// Una entrada {nombre, RHS, precio sombra} por restricción.
pub fn shadow_prices() -> Result<Vec<ShadowPrice>, ActionError> {
    let last = cache::snapshot().ok_or(ActionError::NoCachedSolve)?;
    let payload = last
        .result
        .sensitivity
        .as_ref()
        .ok_or(ActionError::NoSensitivity)?;
    Ok(sensitivity::shadow_prices(payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_rhs_preserves_spacing_and_comments() {
        let text = "max 3 5\n1 0 <= 4\n0 2 <=  12 # holgura\n3 2 <=18\n+ +";

        let updated = rewrite_rhs(text, 1, 14.0).expect("Índice válido");
        assert!(updated.contains("0 2 <=  14 # holgura"));

        let updated = rewrite_rhs(text, 2, 20.0).expect("Índice válido");
        assert!(updated.contains("3 2 <=20"));
    }

    #[test]
    fn test_rewrite_rhs_skips_comment_and_sign_lines() {
        let text = "# cabecera\nmax 1 1\n1 1 <= 10\n+ +";
        let updated = rewrite_rhs(text, 0, 9.0).expect("Índice válido");
        assert!(updated.contains("1 1 <= 9"));
        assert!(updated.contains("# cabecera"));
        assert!(updated.ends_with("+ +"));
    }

    #[test]
    fn test_rewrite_rhs_bad_index() {
        let text = "max 1 1\n1 1 <= 10\n+ +";
        match rewrite_rhs(text, 5, 1.0) {
            Err(ActionError::BadConstraintIndex(5)) => {}
            other => panic!("Esperaba índice inválido, obtuve {:?}", other),
        }
    }

    #[test]
    fn test_rewrite_rhs_with_unicode_relation() {
        let text = "max 1 1\n1 1 ≤ 10\n+ +";
        let updated = rewrite_rhs(text, 0, 8.0).expect("Índice válido");
        assert!(updated.contains("1 1 ≤ 8"));
    }
}
