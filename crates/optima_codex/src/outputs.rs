// src/outputs.rs
//
// Cargas de respuesta serializables del motor. El CLI (o cualquier otra
// superficie) decide cómo pintarlas; aquí solo viven los datos.

use serde::Serialize;

use optima_core::formatting::scalar::round3;
use optima_core::optimization::result::{SolverResult, SolverStatus};

/// Semántica de salida de una petición de resolución.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitStatus {
    Ok,
    Timeout,
    BadInput,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SolveResponse {
    pub success: bool,
    pub unbounded: bool,
    pub infeasible: bool,
    /// Redondeado a 3 decimales; None cuando no hay candidato
    pub objective: Option<f64>,
    pub solution_summary: String,
    /// La bitácora completa, separada por saltos de línea
    pub output_text: String,
    pub runtime_ms: u64,
    pub status: ExitStatus,
}

impl SolveResponse {
    pub fn from_result(result: &SolverResult, runtime_ms: u64) -> Self {
        let status = match result.status {
            SolverStatus::Timeout => ExitStatus::Timeout,
            _ => ExitStatus::Ok,
        };

        Self {
            success: result.is_success(),
            unbounded: result.status == SolverStatus::Unbounded,
            infeasible: result.status == SolverStatus::Infeasible,
            objective: result.objective.map(round3),
            solution_summary: result.solution_summary(),
            output_text: result.log.join("\n"),
            runtime_ms,
            status,
        }
    }

    /// JSON estable para superficies externas.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Falla de entrada: se adjunta el diagnóstico (con el texto
    /// normalizado) para poder reproducir el error.
    pub fn bad_input(diagnostic: &str, runtime_ms: u64) -> Self {
        Self {
            success: false,
            unbounded: false,
            infeasible: false,
            objective: None,
            solution_summary: String::new(),
            output_text: diagnostic.to_string(),
            runtime_ms,
            status: ExitStatus::BadInput,
        }
    }
}
