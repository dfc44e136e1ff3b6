use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("soft variant of {rule} is not supported")]
    UnsupportedSoftVariant { rule: &'static str },
    #[error("{rule} refers to unknown shift id {shift}")]
    UnknownShift { rule: &'static str, shift: String },
    #[error("negative weight {weight} for rule {rule}")]
    NegativeWeight { rule: &'static str, weight: i64 },
}
