#![forbid(unsafe_code)]
//! Gardes : compilateur de règles de planning vers un modèle de contraintes.
//!
//! - Spécification YAML : horizon (jours, gardes), personnes, règles dures/souples.
//! - Cinq règles : couverture, exclusion, équilibre de charge, égalisation
//!   d'un type de garde, égalité des jours travaillés.
//! - Objectif unique, somme pondérée des règles souples.
//! - Recherche bornée (limite de solutions, limite de temps) via un moteur
//!   interchangeable.

pub mod compiler;
pub mod driver;
pub mod engine;
pub mod io;
pub mod model;
pub mod report;
pub mod spec;

pub use compiler::{compile, CompileError, CompiledModel, Grid, Objective};
pub use driver::{SearchDriver, SolutionLimit, SolveError, Solved};
pub use engine::{Engine, EngineError, PumpkinEngine, SolveStatus};
pub use model::{Assignment, Dimension, Rule, RuleKind, Severity, ShiftId, SlotAssignment};
pub use report::{ReportRenderer, TextReport};
pub use spec::{ScheduleSpec, SpecError};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Spec(#[from] SpecError),
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Solve(#[from] SolveError),
}

/// Compile puis résout une spécification avec le moteur embarqué.
pub fn solve(spec: &ScheduleSpec) -> Result<Solved, Error> {
    let compiled = compile(spec)?;
    Ok(SearchDriver::new().run(compiled, spec)?)
}
