use super::{CompileError, Grid, Objective};
use crate::engine::{CpModel, IntVar, LinExpr};
use crate::model::{Dimension, Severity, ShiftId};

/// Accès accordé à une règle pendant son seul appel.
pub(crate) struct RuleContext<'a> {
    pub(crate) model: &'a mut CpModel,
    pub(crate) grid: &'a Grid,
    pub(crate) objective: &'a mut Objective,
    pub(crate) severity: Severity,
    pub(crate) weight: i64,
}

impl RuleContext<'_> {
    fn hard_only(&self, rule: &'static str) -> Result<(), CompileError> {
        if self.severity.is_soft() {
            return Err(CompileError::UnsupportedSoftVariant { rule });
        }
        Ok(())
    }

    /// Écart absolu entre deux expressions, via deux variables d'écart
    /// dirigées : `left - right == over - under`, pénalité `over + under`.
    fn penalize_gap(&mut self, rule: &'static str, label: String, left: IntVar, right: IntVar, bound: i64) {
        let over = self.model.new_int_var(0, bound, format!("{label}_over"));
        let under = self.model.new_int_var(0, bound, format!("{label}_under"));
        self.model.add_equality(
            LinExpr::from(left) - right,
            LinExpr::from(over) - under,
        );
        self.objective
            .add(rule, label, self.weight, LinExpr::from(over) + under);
    }
}

/// Chaque créneau (jour, garde) est tenu par exactement une personne.
pub(crate) fn assign_exactly_one(ctx: &mut RuleContext<'_>) -> Result<(), CompileError> {
    ctx.hard_only("assign_exactly_one")?;
    let grid = ctx.grid;
    for d in 0..grid.days() {
        for s in 0..grid.shifts().len() {
            ctx.model.add_exactly_one(grid.slot(d, s));
        }
    }
    Ok(())
}

pub(crate) fn at_most_one(ctx: &mut RuleContext<'_>, dimension: Dimension) -> Result<(), CompileError> {
    ctx.hard_only("at_most_one")?;
    let grid = ctx.grid;
    match dimension {
        Dimension::Shift => {
            for n in 0..grid.nurses() {
                for d in 0..grid.days() {
                    ctx.model.add_at_most_one(grid.nurse_day(n, d));
                }
            }
        }
        Dimension::NurseDay => {
            #[cfg(feature = "logging")]
            tracing::warn!("at_most_one with dimension nurse_day posts nothing");
        }
    }
    Ok(())
}

/// Bande de charge `[lo, hi]` autour de la moyenne, élargie de `tolerance`.
pub fn workload_band(days: usize, shifts: usize, nurses: usize, tolerance: i64) -> (i64, i64) {
    let total = (days * shifts) as i64;
    let n = nurses.max(1) as i64;
    let lo = total / n;
    let hi = lo + i64::from(total % n != 0);
    (lo - tolerance, hi + tolerance)
}

pub(crate) fn workload_balance(ctx: &mut RuleContext<'_>, tolerance: i64) -> Result<(), CompileError> {
    let grid = ctx.grid;
    let total = (grid.days() * grid.shifts().len()) as i64;
    let (lo, hi) = workload_band(grid.days(), grid.shifts().len(), grid.nurses(), tolerance);

    for n in 0..grid.nurses() {
        let assigned = LinExpr::sum(grid.nurse(n));
        match ctx.severity {
            Severity::Hard => ctx.model.add_linear_range(assigned, Some(lo), Some(hi)),
            Severity::Soft => {
                let surplus = ctx.model.new_int_var(0, total, format!("surplus_{n}"));
                let deficit = ctx.model.new_int_var(0, total, format!("deficit_{n}"));
                // assigned - hi <= surplus ; lo - assigned <= deficit
                ctx.model.add_le(assigned.clone() - surplus, hi);
                ctx.model.add_ge(assigned + deficit, lo);
                ctx.objective.add(
                    "workload_balance",
                    format!("workload_balance[{n}]"),
                    ctx.weight,
                    LinExpr::from(surplus) + deficit,
                );
            }
        }
    }
    Ok(())
}

pub(crate) fn equalized_shift_type(
    ctx: &mut RuleContext<'_>,
    shift_ids: &[ShiftId],
) -> Result<(), CompileError> {
    let grid = ctx.grid;
    let targets = shift_ids
        .iter()
        .map(|id| {
            grid.shift_index(id).ok_or_else(|| CompileError::UnknownShift {
                rule: "equalized_shift_type",
                shift: id.to_string(),
            })
        })
        .collect::<Result<Vec<usize>, _>>()?;
    let bound = (grid.days() * targets.len()) as i64;

    let counts: Vec<IntVar> = (0..grid.nurses())
        .map(|n| {
            let count = ctx.model.new_int_var(0, bound, format!("cnt_n{n}"));
            ctx.model.add_equality(count, LinExpr::sum(grid.nurse_in(n, &targets)));
            count
        })
        .collect();

    equalize(ctx, "equalized_shift_type", &counts, bound);
    Ok(())
}

pub(crate) fn equal_days_worked(ctx: &mut RuleContext<'_>) -> Result<(), CompileError> {
    let grid = ctx.grid;
    let days = grid.days() as i64;

    let mut counts = Vec::with_capacity(grid.nurses());
    for n in 0..grid.nurses() {
        let mut worked = Vec::with_capacity(grid.days());
        for d in 0..grid.days() {
            let wd = ctx.model.new_bool_var(format!("wd_{n}_{d}"));
            ctx.model.add_max_equality(wd, grid.nurse_day(n, d));
            worked.push(wd);
        }
        let count = ctx.model.new_int_var(0, days, format!("cnt_days_{n}"));
        ctx.model.add_equality(count, LinExpr::sum(worked));
        counts.push(count);
    }

    equalize(ctx, "equal_days_worked", &counts, days);
    Ok(())
}

/// Aligne chaque compteur sur celui de la personne 0 (pivot).
fn equalize(ctx: &mut RuleContext<'_>, rule: &'static str, counts: &[IntVar], bound: i64) {
    let Some((&pivot, others)) = counts.split_first() else {
        return;
    };
    for (i, &count) in others.iter().enumerate() {
        match ctx.severity {
            Severity::Hard => ctx.model.add_equality(count, pivot),
            Severity::Soft => {
                ctx.penalize_gap(rule, format!("{rule}[{}]", i + 1), pivot, count, bound)
            }
        }
    }
}
