//! Compilation d'une [`ScheduleSpec`] en modèle de contraintes.
//!
//! La grille est créée d'abord, puis chaque règle dure, puis chaque règle
//! souple est appliquée dans l'ordre de déclaration. Les règles souples
//! n'écrivent jamais l'objectif du modèle directement : elles ajoutent des
//! termes à l'[`Objective`], installé une seule fois par le pilote.

mod grid;
mod objective;
mod rules;
mod types;

pub use grid::Grid;
pub use objective::{Objective, ObjectiveTerm};
pub use rules::workload_band;
pub use types::CompileError;

use crate::engine::CpModel;
use crate::model::{Rule, RuleKind};
use crate::spec::ScheduleSpec;
use rules::RuleContext;

/// Modèle compilé, prêt pour le pilote de recherche qui en prend possession.
#[derive(Debug, Clone)]
pub struct CompiledModel {
    pub(crate) model: CpModel,
    pub(crate) grid: Grid,
    pub(crate) objective: Objective,
}

impl CompiledModel {
    pub fn model(&self) -> &CpModel {
        &self.model
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn objective(&self) -> &Objective {
        &self.objective
    }
}

pub fn compile(spec: &ScheduleSpec) -> Result<CompiledModel, CompileError> {
    let mut model = CpModel::new();
    let grid = Grid::build(
        &mut model,
        spec.nurses.len(),
        spec.horizon.days,
        &spec.horizon.shifts,
    );
    let mut objective = Objective::new();

    for rule in spec.rules() {
        apply_rule(&mut model, &grid, &mut objective, rule)?;
    }

    Ok(CompiledModel {
        model,
        grid,
        objective,
    })
}

fn apply_rule(
    model: &mut CpModel,
    grid: &Grid,
    objective: &mut Objective,
    rule: &Rule,
) -> Result<(), CompileError> {
    #[cfg(feature = "logging")]
    tracing::debug!(rule = rule.kind.name(), severity = ?rule.severity, weight = rule.weight, "posting rule");

    if rule.weight < 0 {
        return Err(CompileError::NegativeWeight {
            rule: rule.kind.name(),
            weight: rule.weight,
        });
    }

    let mut ctx = RuleContext {
        model,
        grid,
        objective,
        severity: rule.severity,
        weight: rule.weight,
    };
    match &rule.kind {
        RuleKind::AssignExactlyOne => rules::assign_exactly_one(&mut ctx),
        RuleKind::AtMostOne { dimension } => rules::at_most_one(&mut ctx, *dimension),
        RuleKind::WorkloadBalance { tolerance } => rules::workload_balance(&mut ctx, *tolerance),
        RuleKind::EqualizedShiftType { shift_ids } => {
            rules::equalized_shift_type(&mut ctx, shift_ids)
        }
        RuleKind::EqualDaysWorked => rules::equal_days_worked(&mut ctx),
    }
}
