#![forbid(unsafe_code)]
use anyhow::{Context, Result};
use clap::Parser;
use gardes::{
    compile, io,
    report::{ReportRenderer, TextReport},
    SearchDriver, SolveError,
};
use std::path::PathBuf;
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// Résout une spécification de planning (YAML) et affiche l'affectation
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Fichier YAML de spécification
    spec: PathBuf,

    /// Active les logs (feature `logging`)
    #[arg(long)]
    log: bool,

    /// N'affiche pas le tableau croisé jours × gardes
    #[arg(long)]
    no_table: bool,

    /// Export JSON du planning retenu
    #[arg(long)]
    out_json: Option<PathBuf>,

    /// Export CSV du planning retenu
    #[arg(long)]
    out_csv: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let spec = io::load_spec(&cli.spec)?;
    let compiled = compile(&spec).context("building constraint model")?;

    let solved = match SearchDriver::new().run(compiled, &spec) {
        Ok(solved) => solved,
        Err(SolveError::NoFeasibleSolution(status)) => {
            println!("No solution found ({status}).");
            std::process::exit(1);
        }
        Err(err) => return Err(err.into()),
    };

    let renderer = TextReport {
        table: !cli.no_table,
    };
    print!("{}", renderer.render(&solved));

    if let Some(path) = cli.out_json {
        io::export_assignment_json(&path, &solved.assignment)?;
    }
    if let Some(path) = cli.out_csv {
        io::export_assignment_csv(&path, &solved.assignment)
            .with_context(|| format!("writing {}", path.display()))?;
    }

    Ok(())
}
