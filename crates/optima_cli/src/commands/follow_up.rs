// Comandos de seguimiento: cada uno resuelve el modelo del archivo para
// poblar la caché de proceso y después ejecuta la acción correspondiente
// (la caché vive solo dentro de la invocación del binario).

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use colored::*;

use optima_codex::engine::actions;

use super::solve;

/// Resuelve el archivo con la política por defecto para dejar la caché lista.
fn prime_cache(file: &PathBuf, verbose: bool) -> Result<()> {
    let response = solve::execute_request(file, None, None, None, None, verbose)?;
    if !response.success {
        bail!(
            "El modelo de '{}' no llegó a óptimo; no hay sobre qué consultar",
            file.display()
        );
    }
    Ok(())
}

pub fn shadow_prices(file: &PathBuf, verbose: bool) -> Result<()> {
    prime_cache(file, verbose)?;

    let prices = actions::shadow_prices().context("Sin análisis de sensibilidad disponible")?;
    println!("{}", "Precios sombra".bold());
    for entry in prices {
        println!("  {}: RHS = {}, y = {}", entry.name, entry.rhs, entry.price);
    }
    Ok(())
}

pub fn duality(file: &PathBuf, verbose: bool) -> Result<()> {
    prime_cache(file, verbose)?;

    let report = actions::apply_duality().context("El modelo no tiene forma canónica dual")?;
    println!("{}", "Modelo dual".bold());
    println!("{}", report.dual_model_text);
    println!();
    match (report.primal_objective, report.dual_objective) {
        (Some(zp), Some(zd)) => {
            println!("z primal = {}, z dual = {}", zp, zd);
            if report.strong_duality {
                println!("{}", "Dualidad fuerte verificada".green());
            } else {
                println!("{}", "Brecha de dualidad fuera de tolerancia".yellow());
            }
        }
        _ => println!("{}", "Alguno de los dos lados no llegó a óptimo".yellow()),
    }
    Ok(())
}

pub fn change_rhs(file: &PathBuf, index: usize, value: f64, verbose: bool) -> Result<()> {
    prime_cache(file, verbose)?;

    let response = actions::change_rhs(index, value)
        .with_context(|| format!("No se pudo reescribir la restricción {}", index))?;
    solve::print_response(&response, verbose);
    Ok(())
}

pub fn add_constraint(file: &PathBuf, constraint: &str, verbose: bool) -> Result<()> {
    prime_cache(file, verbose)?;

    let response = actions::add_constraint(constraint)
        .context("No se pudo insertar la restricción nueva")?;
    solve::print_response(&response, verbose);
    Ok(())
}

pub fn range(file: &PathBuf, column: usize, verbose: bool) -> Result<()> {
    prime_cache(file, verbose)?;

    let range = actions::range_for(column)
        .with_context(|| format!("Sin rango disponible para la columna {}", column))?;

    println!("{} {}", "Rango de costo de".bold(), range.column.bold());
    println!("  c = {}, r = {}, y'a = {}", range.cost, range.reduced_cost, range.y_dot_a);
    match (range.allowable_increase, range.upper) {
        (Some(delta), Some(upper)) => {
            println!("  aumento permitido: {} (hasta {})", delta, upper)
        }
        _ => println!("  aumento permitido: sin límite"),
    }
    match (range.allowable_decrease, range.lower) {
        (Some(delta), Some(lower)) => {
            println!("  disminución permitida: {} (hasta {})", delta, lower)
        }
        _ => println!("  disminución permitida: sin límite"),
    }
    if let Some(note) = &range.note {
        println!("  nota: {}", note);
    }
    Ok(())
}
