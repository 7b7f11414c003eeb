mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, Commands};

fn main() -> Result<()> {
    // 1. Parsear argumentos
    let args = Cli::parse();

    // 2. Despachar al comando correspondiente
    match &args.command {
        Commands::Info => {
            commands::info::execute()?;
        }
        Commands::Solve {
            file,
            algorithm,
            max_iterations,
            max_nodes,
            time_limit,
            json,
        } => {
            commands::solve::execute(
                file,
                *algorithm,
                *max_iterations,
                *max_nodes,
                *time_limit,
                *json,
                args.verbose,
            )?;
        }
        Commands::Shadow { file } => {
            commands::follow_up::shadow_prices(file, args.verbose)?;
        }
        Commands::Dual { file } => {
            commands::follow_up::duality(file, args.verbose)?;
        }
        Commands::ChangeRhs {
            file,
            index,
            value,
        } => {
            commands::follow_up::change_rhs(file, *index, *value, args.verbose)?;
        }
        Commands::AddConstraint { file, constraint } => {
            commands::follow_up::add_constraint(file, constraint, args.verbose)?;
        }
        Commands::Range { file, column } => {
            commands::follow_up::range(file, *column, args.verbose)?;
        }
    }

    Ok(())
}
