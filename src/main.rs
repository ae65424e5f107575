//! pagesync CLI entry point.

use clap::Parser;
use pagesync::cli::commands;
use pagesync::cli::{Cli, Commands};
use pagesync::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    // Set up tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                eprintln!("{}", e.to_structured_json());
            } else if !cli.quiet {
                if let Some(hint) = e.hint() {
                    eprintln!("Error: {e}\n  Hint: {hint}");
                } else {
                    eprintln!("Error: {e}");
                }
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // Honor RUST_LOG if set, otherwise use verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug,reqwest=info,hyper=info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli) -> Result<(), Error> {
    match &cli.command {
        Commands::Push { path, force, ext, language } => commands::push::execute(
            path.as_deref(),
            *force,
            ext,
            language.as_deref(),
            cli.json,
            cli.quiet,
        ),

        Commands::Pull { path, out, overwrite, language } => commands::pull::execute(
            path.as_deref(),
            out,
            *overwrite,
            language.as_deref(),
            cli.json,
            cli.quiet,
        ),

        Commands::Stats { path } => commands::stats::execute(path.as_deref(), cli.json, cli.quiet),

        Commands::Clean { path, archive_duplicates, yes } => {
            commands::clean::execute(path.as_deref(), *archive_duplicates, *yes, cli.json, cli.quiet)
        }

        Commands::Completions { shell } => commands::completions::execute(shell),
    }
}
