// src/engine/executor.rs
//
// Punto de entrada del motor: una petición trae el texto del modelo, el
// algoritmo (opcional) y la configuración. El despacho es un match sobre
// el enum de algoritmos; cada resolución exitosa actualiza la caché.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use optima_core::optimization::algorithms::{
    branch_bound, dual_simplex, gomory, knapsack, primal_simplex,
};
use optima_core::optimization::error::OptimizationError;
use optima_core::optimization::model::{Model, OptimizationDirection};
use optima_core::optimization::result::SolverResult;
use optima_core::optimization::settings::{CancelToken, SolverSettings};

use crate::domains::linear_program::parser::parse_model;
use crate::engine::cache::{self, LastSolve};
use crate::outputs::SolveResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Algorithm {
    PrimalSimplex,
    /// Variante opcional con el mismo contrato; delega en el simplex
    /// de tableau y lo deja registrado en la bitácora.
    RevisedSimplex,
    DualSimplex,
    BranchAndBound,
    Knapsack01,
    CuttingPlane,
}

/// Configuración que viaja en la petición; los None caen a los valores
/// por defecto del núcleo.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestSettings {
    pub max_iterations: Option<usize>,
    pub max_nodes: Option<usize>,
    pub verbose: bool,
    pub time_limit_seconds: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct SolveRequest {
    pub algorithm: Option<Algorithm>,
    pub model_text: String,
    pub settings: RequestSettings,
}

impl SolveRequest {
    pub fn new(model_text: &str) -> Self {
        Self {
            algorithm: None,
            model_text: model_text.to_string(),
            settings: RequestSettings::default(),
        }
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = Some(algorithm);
        self
    }
}

/// Sin algoritmo explícito: la mochila y los modelos enteros van a sus
/// especializaciones; para LP continuo, MIN arranca por el simplex dual.
fn choose_algorithm(model: &Model) -> Algorithm {
    if model.is_knapsack_shape() {
        Algorithm::Knapsack01
    } else if model.has_integer_vars() {
        Algorithm::BranchAndBound
    } else if model.direction == OptimizationDirection::Minimize {
        Algorithm::DualSimplex
    } else {
        Algorithm::PrimalSimplex
    }
}

fn build_settings(request: &RequestSettings) -> SolverSettings {
    let cancel = match request.time_limit_seconds {
        Some(seconds) if seconds > 0.0 => CancelToken::with_deadline(Duration::from_secs_f64(seconds)),
        _ => CancelToken::new(),
    };

    let defaults = SolverSettings::default();
    SolverSettings {
        max_iterations: request.max_iterations.unwrap_or(defaults.max_iterations),
        max_nodes: request.max_nodes.unwrap_or(defaults.max_nodes),
        verbose: request.verbose,
        cancel,
        ..defaults
    }
}

pub(crate) fn run_solver(
    algorithm: Algorithm,
    model: &Model,
    settings: &SolverSettings,
) -> Result<SolverResult, OptimizationError> {
    match algorithm {
        Algorithm::PrimalSimplex => primal_simplex::solve(model, settings),
        Algorithm::RevisedSimplex => {
            let mut result = primal_simplex::solve(model, settings)?;
            result.log.insert(
                0,
                "Variante revisada: delegada al simplex de tableau".to_string(),
            );
            Ok(result)
        }
        Algorithm::DualSimplex => dual_simplex::solve(model, settings),
        Algorithm::BranchAndBound => branch_bound::solve(model, settings),
        Algorithm::Knapsack01 => knapsack::solve(model, settings),
        Algorithm::CuttingPlane => gomory::solve(model, settings),
    }
}

pub fn execute(request: &SolveRequest) -> SolveResponse {
    let started = Instant::now();

    let model = match parse_model(&request.model_text) {
        Ok(model) => model,
        Err(e) => {
            return SolveResponse::bad_input(
                &e.to_string(),
                started.elapsed().as_millis() as u64,
            );
        }
    };

    let algorithm = request.algorithm.unwrap_or_else(|| choose_algorithm(&model));
    let settings = build_settings(&request.settings);

    let result = match run_solver(algorithm, &model, &settings) {
        Ok(result) => result,
        Err(e) => {
            return SolveResponse::bad_input(
                &e.to_string(),
                started.elapsed().as_millis() as u64,
            );
        }
    };

    let response = SolveResponse::from_result(&result, started.elapsed().as_millis() as u64);

    // Solo las resoluciones exitosas alimentan la caché de seguimiento
    if result.is_success() {
        cache::store(LastSolve {
            model_text: request.model_text.clone(),
            model,
            result,
        });
    }

    response
}
