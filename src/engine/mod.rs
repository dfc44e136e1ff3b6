//! Moteur de contraintes.
//!
//! Le reste de la crate ne parle au moteur qu'à travers [`CpModel`] (variables
//! booléennes/entières bornées, contraintes linéaires, max-égalité, objectif à
//! minimiser) et le trait [`Engine`]. [`PumpkinEngine`] délègue la recherche
//! au solveur CP Pumpkin.

mod model;
mod params;
mod pumpkin;

pub use model::{BoolVar, CpModel, IntVar, LinExpr, VarId};
pub use params::{ParamError, SearchParameters};
pub use pumpkin::PumpkinEngine;

use serde::Serialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Statut final d'une recherche.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolveStatus {
    Optimal,
    Feasible,
    Infeasible,
    Unknown,
}

impl SolveStatus {
    pub fn is_success(self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SolveStatus::Optimal => "OPTIMAL",
            SolveStatus::Feasible => "FEASIBLE",
            SolveStatus::Infeasible => "INFEASIBLE",
            SolveStatus::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    pub solutions: u64,
    /// Appels au solveur (un par solution améliorante ou énumérée, plus le dernier).
    pub solver_calls: u64,
    pub wall_time: Duration,
}

/// Affectation complète d'un modèle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    values: Vec<i64>,
    objective: Option<i64>,
}

impl Solution {
    pub(crate) fn new(values: Vec<i64>, objective: Option<i64>) -> Self {
        Self { values, objective }
    }

    pub fn value(&self, var: VarId) -> i64 {
        self.values[var.index()]
    }

    pub fn bool_value(&self, var: BoolVar) -> bool {
        self.value(var.id()) != 0
    }

    pub fn int_value(&self, var: IntVar) -> i64 {
        self.value(var.id())
    }

    pub fn objective(&self) -> Option<i64> {
        self.objective
    }

    pub fn values(&self) -> &[i64] {
        &self.values
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchControl {
    Continue,
    Stop,
}

/// Appelé de façon synchrone à chaque solution trouvée.
///
/// L'observateur ne voit que la solution courante ; il ne peut que demander
/// l'arrêt de la recherche.
pub trait SolutionObserver {
    fn on_solution(&mut self, solution: &Solution) -> SearchControl;
}

#[derive(Debug, Clone)]
pub struct SolveResponse {
    pub status: SolveStatus,
    /// Dernière solution rapportée.
    pub solution: Option<Solution>,
    pub stats: SearchStats,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("{what} {value} does not fit the solver's 32-bit integers")]
    OutOfRange { what: &'static str, value: i64 },
}

/// Un moteur capable de résoudre un [`CpModel`].
pub trait Engine {
    fn solve(
        &self,
        model: &CpModel,
        params: &SearchParameters,
        observer: Option<&mut dyn SolutionObserver>,
    ) -> Result<SolveResponse, EngineError>;
}
