use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::*;

use optima_codex::{ExitStatus, RequestSettings, SolveRequest, SolveResponse};

use crate::cli::AlgorithmArg;

pub fn execute_request(
    file: &PathBuf,
    algorithm: Option<AlgorithmArg>,
    max_iterations: Option<usize>,
    max_nodes: Option<usize>,
    time_limit: Option<f64>,
    verbose: bool,
) -> Result<SolveResponse> {
    if verbose {
        println!(">> Leyendo modelo: {:?}", file);
    }

    let model_text = fs::read_to_string(file)
        .with_context(|| format!("No se pudo leer el archivo '{}'", file.display()))?;

    let request = SolveRequest {
        algorithm: algorithm.map(Into::into),
        model_text,
        settings: RequestSettings {
            max_iterations,
            max_nodes,
            verbose,
            time_limit_seconds: time_limit,
        },
    };

    Ok(optima_codex::execute(&request))
}

pub fn print_response(response: &SolveResponse, verbose: bool) {
    match response.status {
        ExitStatus::BadInput => {
            println!("{}", "[ENTRADA INVÁLIDA]".red().bold());
            println!("{}", response.output_text);
            return;
        }
        ExitStatus::Timeout => {
            println!(
                "{} ({} ms)",
                "[TIEMPO AGOTADO]".yellow().bold(),
                response.runtime_ms
            );
        }
        ExitStatus::Ok => {}
    }

    if response.success {
        println!("{}", "[ÓPTIMO]".green().bold());
    } else if response.unbounded {
        println!("{}", "[NO ACOTADO]".yellow().bold());
    } else if response.infeasible {
        println!("{}", "[INFACTIBLE]".yellow().bold());
    }

    if let Some(z) = response.objective {
        println!("z = {}", z);
    }
    if !response.solution_summary.is_empty() {
        println!("{}", response.solution_summary);
    }
    println!("{} ms", response.runtime_ms);

    if verbose && !response.output_text.is_empty() {
        println!("{}", "-- Bitácora --".blue());
        println!("{}", response.output_text);
    }
}

#[allow(clippy::too_many_arguments)]
pub fn execute(
    file: &PathBuf,
    algorithm: Option<AlgorithmArg>,
    max_iterations: Option<usize>,
    max_nodes: Option<usize>,
    time_limit: Option<f64>,
    json: bool,
    verbose: bool,
) -> Result<()> {
    let response = execute_request(file, algorithm, max_iterations, max_nodes, time_limit, verbose)?;
    if json {
        println!("{}", response.to_json());
    } else {
        print_response(&response, verbose);
    }
    Ok(())
}
