use crate::engine::{BoolVar, CpModel};
use crate::model::ShiftId;

/// Grille des variables de décision : une variable booléenne par
/// (personne, jour, garde). Créée une fois avant toute règle, jamais
/// redimensionnée.
#[derive(Debug, Clone)]
pub struct Grid {
    nurses: usize,
    days: usize,
    shifts: Vec<ShiftId>,
    vars: Vec<BoolVar>,
}

impl Grid {
    pub fn build(model: &mut CpModel, nurses: usize, days: usize, shifts: &[ShiftId]) -> Self {
        let mut vars = Vec::with_capacity(nurses * days * shifts.len());
        for n in 0..nurses {
            for d in 0..days {
                for s in shifts {
                    vars.push(model.new_bool_var(format!("x_{n}_{d}_{s}")));
                }
            }
        }
        Self {
            nurses,
            days,
            shifts: shifts.to_vec(),
            vars,
        }
    }

    fn offset(&self, nurse: usize, day: usize, shift: usize) -> usize {
        (nurse * self.days + day) * self.shifts.len() + shift
    }

    /// Variable par index de garde.
    pub fn var(&self, nurse: usize, day: usize, shift: usize) -> BoolVar {
        self.vars[self.offset(nurse, day, shift)]
    }

    /// Variable par identifiant de garde.
    pub fn get(&self, nurse: usize, day: usize, shift: &ShiftId) -> Option<BoolVar> {
        if nurse >= self.nurses || day >= self.days {
            return None;
        }
        let s = self.shift_index(shift)?;
        Some(self.var(nurse, day, s))
    }

    pub fn shift_index(&self, shift: &ShiftId) -> Option<usize> {
        self.shifts.iter().position(|s| s == shift)
    }

    pub fn nurses(&self) -> usize {
        self.nurses
    }

    pub fn days(&self) -> usize {
        self.days
    }

    pub fn shifts(&self) -> &[ShiftId] {
        &self.shifts
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Toutes les personnes pour un créneau (jour, garde).
    pub fn slot(&self, day: usize, shift: usize) -> impl Iterator<Item = BoolVar> + '_ {
        (0..self.nurses).map(move |n| self.var(n, day, shift))
    }

    /// Toutes les gardes d'une personne sur un jour.
    pub fn nurse_day(&self, nurse: usize, day: usize) -> impl Iterator<Item = BoolVar> + '_ {
        (0..self.shifts.len()).map(move |s| self.var(nurse, day, s))
    }

    /// Toutes les variables d'une personne sur l'horizon.
    pub fn nurse(&self, nurse: usize) -> impl Iterator<Item = BoolVar> + '_ {
        (0..self.days).flat_map(move |d| self.nurse_day(nurse, d))
    }

    /// Variables d'une personne restreintes à un sous-ensemble de gardes.
    pub fn nurse_in<'a>(
        &'a self,
        nurse: usize,
        shifts: &'a [usize],
    ) -> impl Iterator<Item = BoolVar> + 'a {
        (0..self.days).flat_map(move |d| shifts.iter().map(move |&s| self.var(nurse, d, s)))
    }
}
