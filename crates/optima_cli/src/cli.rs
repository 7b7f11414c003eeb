use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use optima_codex::Algorithm;

/// Envoltura local para exponer el enum del motor como argumento de clap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AlgorithmArg {
    Primal,
    Revised,
    Dual,
    Bb,
    Knapsack,
    Cuts,
}

impl From<AlgorithmArg> for Algorithm {
    fn from(arg: AlgorithmArg) -> Self {
        match arg {
            AlgorithmArg::Primal => Algorithm::PrimalSimplex,
            AlgorithmArg::Revised => Algorithm::RevisedSimplex,
            AlgorithmArg::Dual => Algorithm::DualSimplex,
            AlgorithmArg::Bb => Algorithm::BranchAndBound,
            AlgorithmArg::Knapsack => Algorithm::Knapsack01,
            AlgorithmArg::Cuts => Algorithm::CuttingPlane,
        }
    }
}

#[derive(Parser)]
#[command(name = "optima")]
#[command(about = "Motor académico de Programación Lineal y Entera", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Activar modo verbose (bitácora completa de pivotes)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resuelve un modelo en formato textual
    Solve {
        /// Ruta al archivo del modelo
        #[arg(required = true)]
        file: PathBuf,

        /// Algoritmo; sin especificar se elige por la forma del modelo
        #[arg(short, long, value_enum)]
        algorithm: Option<AlgorithmArg>,

        /// Tope de iteraciones de simplex
        #[arg(long)]
        max_iterations: Option<usize>,

        /// Tope de nodos de ramificación
        #[arg(long)]
        max_nodes: Option<usize>,

        /// Límite de tiempo en segundos
        #[arg(long)]
        time_limit: Option<f64>,

        /// Emitir la respuesta como JSON en lugar del formato de consola
        #[arg(long)]
        json: bool,
    },

    /// Precios sombra del óptimo (resuelve y consulta)
    Shadow {
        #[arg(required = true)]
        file: PathBuf,
    },

    /// Construye y resuelve el dual; evalúa dualidad fuerte
    Dual {
        #[arg(required = true)]
        file: PathBuf,
    },

    /// Reescribe el RHS de la restricción k (base 0) y re-resuelve
    ChangeRhs {
        #[arg(required = true)]
        file: PathBuf,

        #[arg(required = true)]
        index: usize,

        #[arg(required = true, allow_hyphen_values = true)]
        value: f64,
    },

    /// Inserta una restricción antes de la línea de signos y re-resuelve
    AddConstraint {
        #[arg(required = true)]
        file: PathBuf,

        /// Texto de la restricción, ej: "1 1 <= 5"
        #[arg(required = true)]
        constraint: String,
    },

    /// Rango de costo de la variable no básica j (base 0)
    Range {
        #[arg(required = true)]
        file: PathBuf,

        #[arg(required = true)]
        column: usize,
    },

    /// Información del sistema y sus módulos
    Info,
}
