use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifiant fort pour un type de garde (`"M"`, `"0"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShiftId(String);

impl ShiftId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShiftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Hard,
    Soft,
}

impl Severity {
    pub fn is_soft(self) -> bool {
        self == Severity::Soft
    }
}

/// Axe de la règle `at_most_one`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    /// Au plus une garde par (personne, jour).
    Shift,
    /// Sans effet : l'unicité (personne, jour, garde) est déjà structurelle.
    NurseDay,
}

impl Dimension {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "shift" => Some(Dimension::Shift),
            "nurse_day" => Some(Dimension::NurseDay),
            _ => None,
        }
    }
}

/// Les cinq règles connues, chacune avec ses paramètres typés.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleKind {
    AssignExactlyOne,
    AtMostOne { dimension: Dimension },
    WorkloadBalance { tolerance: i64 },
    EqualizedShiftType { shift_ids: Vec<ShiftId> },
    EqualDaysWorked,
}

impl RuleKind {
    /// Nom de la règle dans le document YAML.
    pub fn name(&self) -> &'static str {
        match self {
            RuleKind::AssignExactlyOne => "assign_exactly_one",
            RuleKind::AtMostOne { .. } => "at_most_one",
            RuleKind::WorkloadBalance { .. } => "workload_balance",
            RuleKind::EqualizedShiftType { .. } => "equalized_shift_type",
            RuleKind::EqualDaysWorked => "equal_days_worked",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub kind: RuleKind,
    pub severity: Severity,
    /// Poids dans l'objectif (règles souples), >= 0.
    pub weight: i64,
}

impl Rule {
    pub fn hard(kind: RuleKind) -> Self {
        Self {
            kind,
            severity: Severity::Hard,
            weight: 1,
        }
    }

    pub fn soft(kind: RuleKind, weight: i64) -> Self {
        Self {
            kind,
            severity: Severity::Soft,
            weight,
        }
    }
}

/// Personnes affectées à un créneau (jour, garde).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAssignment {
    pub day: usize,
    pub shift: ShiftId,
    pub nurses: Vec<String>,
}

/// Planning retenu, un créneau par (jour, garde) dans l'ordre de l'horizon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub days: usize,
    pub shifts: Vec<ShiftId>,
    pub nurses: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    pub slots: Vec<SlotAssignment>,
}

impl Assignment {
    pub fn slot(&self, day: usize, shift: &ShiftId) -> Option<&SlotAssignment> {
        self.slots.iter().find(|s| s.day == day && &s.shift == shift)
    }

    /// Nombre de créneaux tenus par une personne.
    pub fn workload(&self, nurse: &str) -> usize {
        self.slots
            .iter()
            .filter(|s| s.nurses.iter().any(|n| n == nurse))
            .count()
    }

    /// Date calendaire du jour `day`, si l'horizon en porte une.
    pub fn date_of(&self, day: usize) -> Option<NaiveDate> {
        let offset = chrono::Days::new(u64::try_from(day).ok()?);
        self.start_date?.checked_add_days(offset)
    }
}
