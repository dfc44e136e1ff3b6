use crate::model::{Dimension, Rule, RuleKind, Severity, ShiftId};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpecError {
    #[error("reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("unknown rule: {0}")]
    UnknownRule(String),
    #[error("unsupported dimension for at_most_one: {0}")]
    UnsupportedDimension(String),
    #[error("invalid parameter for {rule}: {reason}")]
    InvalidParam { rule: String, reason: String },
    #[error("negative weight {weight} for rule {rule}")]
    NegativeWeight { rule: String, weight: i64 },
    #[error("unknown shift id: {0}")]
    UnknownShift(String),
    #[error("duplicate shift id: {0}")]
    DuplicateShift(String),
    #[error("invalid horizon: {0}")]
    InvalidHorizon(&'static str),
    #[error("no resources: give resources.nurses.list or a positive resources.nurses.count")]
    NoResources,
}

/// Horizon de planification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Horizon {
    pub days: usize,
    pub shifts: Vec<ShiftId>,
    pub start_date: Option<NaiveDate>,
}

/// Section `solver` : `solution_limit` est extrait, le reste est transmis tel quel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolverSettings {
    pub solution_limit: Option<u64>,
    pub parameters: Vec<(String, Value)>,
}

/// Spécification complète, en lecture seule après chargement.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleSpec {
    pub horizon: Horizon,
    pub nurses: Vec<String>,
    pub hard: Vec<Rule>,
    pub soft: Vec<Rule>,
    pub solver: SolverSettings,
}

impl ScheduleSpec {
    /// Spécification sans règle, pratique pour construire un modèle à la main.
    pub fn new<S: AsRef<str>>(days: usize, shifts: &[S], nurses: Vec<String>) -> Self {
        Self {
            horizon: Horizon {
                days,
                shifts: shifts.iter().map(ShiftId::new).collect(),
                start_date: None,
            },
            nurses,
            hard: Vec::new(),
            soft: Vec::new(),
            solver: SolverSettings::default(),
        }
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        match rule.severity {
            Severity::Hard => self.hard.push(rule),
            Severity::Soft => self.soft.push(rule),
        }
        self
    }

    pub fn with_parameter<S: Into<String>>(mut self, name: S, value: Value) -> Self {
        self.solver.parameters.push((name.into(), value));
        self
    }

    pub fn with_solution_limit(mut self, limit: u64) -> Self {
        self.solver.solution_limit = Some(limit);
        self
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, SpecError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| SpecError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, SpecError> {
        let raw: RawSpec = serde_yaml::from_str(s)?;
        raw.into_spec()
    }

    /// Règles dans l'ordre d'application : dures puis souples.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.hard.iter().chain(self.soft.iter())
    }
}

#[derive(Debug, Deserialize)]
struct RawSpec {
    horizon: RawHorizon,
    resources: RawResources,
    #[serde(default)]
    constraints: RawConstraints,
    #[serde(default)]
    solver: RawSolver,
}

#[derive(Debug, Deserialize)]
struct RawHorizon {
    days: usize,
    shifts: Vec<RawShift>,
    #[serde(default)]
    start_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawShift {
    Record { id: ScalarId },
    Bare(ScalarId),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ScalarId {
    Int(i64),
    Text(String),
}

impl From<ScalarId> for ShiftId {
    fn from(raw: ScalarId) -> Self {
        match raw {
            ScalarId::Int(i) => ShiftId::new(i.to_string()),
            ScalarId::Text(s) => ShiftId::new(s),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawResources {
    nurses: RawNurses,
}

#[derive(Debug, Deserialize)]
struct RawNurses {
    #[serde(default)]
    list: Option<Vec<String>>,
    #[serde(default)]
    count: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct RawConstraints {
    #[serde(default)]
    hard: Vec<RawRule>,
    #[serde(default)]
    soft: Vec<RawRule>,
}

#[derive(Debug, Deserialize)]
struct RawRule {
    rule: String,
    #[serde(default)]
    params: Mapping,
    #[serde(default)]
    weight: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSolver {
    #[serde(default)]
    parameters: Mapping,
}

impl RawSpec {
    fn into_spec(self) -> Result<ScheduleSpec, SpecError> {
        let horizon = self.horizon.into_horizon()?;

        let nurses = match (self.resources.nurses.list, self.resources.nurses.count) {
            (Some(list), _) if !list.is_empty() => list,
            (_, Some(count)) if count > 0 => (0..count).map(|i| format!("N{i}")).collect(),
            _ => return Err(SpecError::NoResources),
        };

        let hard = self
            .constraints
            .hard
            .into_iter()
            .map(|r| r.into_rule(Severity::Hard, &horizon))
            .collect::<Result<Vec<_>, _>>()?;
        let soft = self
            .constraints
            .soft
            .into_iter()
            .map(|r| r.into_rule(Severity::Soft, &horizon))
            .collect::<Result<Vec<_>, _>>()?;

        let solver = self.solver.into_settings()?;

        Ok(ScheduleSpec {
            horizon,
            nurses,
            hard,
            soft,
            solver,
        })
    }
}

impl RawHorizon {
    fn into_horizon(self) -> Result<Horizon, SpecError> {
        if self.days == 0 {
            return Err(SpecError::InvalidHorizon("days must be > 0"));
        }
        if self.shifts.is_empty() {
            return Err(SpecError::InvalidHorizon("at least one shift is required"));
        }
        let mut shifts: Vec<ShiftId> = Vec::with_capacity(self.shifts.len());
        for raw in self.shifts {
            let id: ShiftId = match raw {
                RawShift::Record { id } | RawShift::Bare(id) => id.into(),
            };
            if shifts.contains(&id) {
                return Err(SpecError::DuplicateShift(id.as_str().to_string()));
            }
            shifts.push(id);
        }
        Ok(Horizon {
            days: self.days,
            shifts,
            start_date: self.start_date,
        })
    }
}

impl RawRule {
    fn into_rule(self, severity: Severity, horizon: &Horizon) -> Result<Rule, SpecError> {
        let invalid = |reason: &str| SpecError::InvalidParam {
            rule: self.rule.clone(),
            reason: reason.to_string(),
        };

        let kind = match self.rule.as_str() {
            "assign_exactly_one" => RuleKind::AssignExactlyOne,
            "at_most_one" => {
                let raw = match self.params.get("dimension") {
                    None => "shift",
                    Some(v) => v.as_str().ok_or_else(|| invalid("dimension must be a string"))?,
                };
                let dimension = Dimension::parse(raw)
                    .ok_or_else(|| SpecError::UnsupportedDimension(raw.to_string()))?;
                RuleKind::AtMostOne { dimension }
            }
            "workload_balance" => {
                let tolerance = match self.params.get("tolerance") {
                    None => 1,
                    Some(v) => v
                        .as_i64()
                        .filter(|t| *t >= 0)
                        .ok_or_else(|| invalid("tolerance must be a non-negative integer"))?,
                };
                RuleKind::WorkloadBalance { tolerance }
            }
            "equalized_shift_type" => {
                let raw = self
                    .params
                    .get("shift_ids")
                    .and_then(Value::as_sequence)
                    .ok_or_else(|| invalid("shift_ids must be a list of shift ids"))?;
                let mut shift_ids = Vec::with_capacity(raw.len());
                for v in raw {
                    let id = scalar_shift_id(v)
                        .ok_or_else(|| invalid("shift_ids entries must be scalars"))?;
                    if !horizon.shifts.contains(&id) {
                        return Err(SpecError::UnknownShift(id.as_str().to_string()));
                    }
                    shift_ids.push(id);
                }
                RuleKind::EqualizedShiftType { shift_ids }
            }
            "equal_days_worked" => RuleKind::EqualDaysWorked,
            other => return Err(SpecError::UnknownRule(other.to_string())),
        };

        let weight = self.weight.unwrap_or(1);
        if weight < 0 {
            return Err(SpecError::NegativeWeight {
                rule: self.rule,
                weight,
            });
        }

        Ok(Rule {
            kind,
            severity,
            weight,
        })
    }
}

fn scalar_shift_id(v: &Value) -> Option<ShiftId> {
    match v {
        Value::String(s) => Some(ShiftId::new(s)),
        Value::Number(n) => n.as_i64().map(|i| ShiftId::new(i.to_string())),
        _ => None,
    }
}

impl RawSolver {
    fn into_settings(self) -> Result<SolverSettings, SpecError> {
        let mut settings = SolverSettings::default();
        for (key, value) in self.parameters {
            let Some(name) = key.as_str() else {
                return Err(SpecError::InvalidParam {
                    rule: "solver".into(),
                    reason: format!("parameter names must be strings, got {key:?}"),
                });
            };
            if name == "solution_limit" {
                let limit = value.as_u64().filter(|l| *l >= 1).ok_or_else(|| {
                    SpecError::InvalidParam {
                        rule: "solver".into(),
                        reason: "solution_limit must be an integer >= 1".into(),
                    }
                })?;
                settings.solution_limit = Some(limit);
            } else {
                settings.parameters.push((name.to_string(), value));
            }
        }
        Ok(settings)
    }
}
