//! Codelens CLI entry point.

use clap::Parser;
use codelens::cli::{self, Cli, Commands, EXIT_ERROR};

fn main() {
    let cli = Cli::parse();
    codelens::init();

    let result = match &cli.command {
        Commands::Analyze(args) => cli::run_analyze(&cli.global, args),
        Commands::Quick(args) => cli::run_quick(&cli.global, args),
        Commands::Batch(args) => cli::run_batch(&cli.global, args),
        Commands::Languages => cli::run_languages(&cli.global),
        Commands::Hint(args) => cli::run_hint(&cli.global, args),
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}
