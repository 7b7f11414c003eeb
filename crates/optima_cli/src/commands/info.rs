use anyhow::Result;
use colored::*;

pub fn execute() -> Result<()> {
    println!("{}", "OPTIMA - Motor académico de Investigación de Operaciones".bold());
    println!("Versión: {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Solvers disponibles:");
    println!("  - primal    Simplex primal de dos fases (tableau)");
    println!("  - revised   Variante opcional, delega en el de tableau");
    println!("  - dual      Simplex dual (arranque para MIN, re-optimización)");
    println!("  - bb        Ramificación y acotación (DFS, filas inyectadas)");
    println!("  - knapsack  Mochila 0-1 con cota fraccionaria");
    println!("  - cuts      Planos cortantes fraccionarios de Gomory");
    println!();
    println!("Acciones de seguimiento: shadow, dual, change-rhs, add-constraint, range");
    Ok(())
}
