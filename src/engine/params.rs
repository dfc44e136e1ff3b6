use serde_yaml::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamError {
    #[error("invalid value for solver parameter {name}: expected {expected}")]
    InvalidValue { name: String, expected: &'static str },
}

/// Paramètres de recherche transmis au moteur.
///
/// Les noms connus du moteur embarqué sont typés ; les autres sont conservés
/// tels quels dans `passthrough`.
#[derive(Debug, Clone, Default)]
pub struct SearchParameters {
    pub max_time: Option<Duration>,
    pub enumerate_all_solutions: bool,
    pub log_search_progress: bool,
    pub num_workers: Option<usize>,
    passthrough: BTreeMap<String, Value>,
}

impl SearchParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Setter générique, appliqué clé par clé depuis la spécification.
    pub fn set(&mut self, name: &str, value: &Value) -> Result<(), ParamError> {
        match name {
            "max_time_in_seconds" => {
                let limit = value
                    .as_f64()
                    .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
                    .ok_or_else(|| invalid(name, "a non-negative number of seconds"))?;
                self.max_time = Some(limit);
            }
            "enumerate_all_solutions" => {
                self.enumerate_all_solutions =
                    value.as_bool().ok_or_else(|| invalid(name, "a boolean"))?;
            }
            "log_search_progress" => {
                self.log_search_progress =
                    value.as_bool().ok_or_else(|| invalid(name, "a boolean"))?;
            }
            "num_workers" | "num_search_workers" => {
                let n = value
                    .as_u64()
                    .ok_or_else(|| invalid(name, "a non-negative integer"))?;
                self.num_workers = Some(n as usize);
            }
            _ => {
                #[cfg(feature = "logging")]
                tracing::warn!(parameter = name, "solver parameter not interpreted by the engine");
                self.passthrough.insert(name.to_string(), value.clone());
            }
        }
        Ok(())
    }

    pub fn passthrough(&self) -> &BTreeMap<String, Value> {
        &self.passthrough
    }
}

fn invalid(name: &str, expected: &'static str) -> ParamError {
    ParamError::InvalidValue {
        name: name.to_string(),
        expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn huge_time_limit_is_an_error_not_a_panic() {
        let mut params = SearchParameters::new();
        let err = params
            .set("max_time_in_seconds", &Value::from(1.0e20))
            .unwrap_err();
        assert!(matches!(err, ParamError::InvalidValue { .. }));
        assert!(params.set("max_time_in_seconds", &Value::from(-1.0)).is_err());
        assert_eq!(params.max_time, None);
    }

    #[test]
    fn known_names_are_typed_and_others_kept() {
        let mut params = SearchParameters::new();
        params.set("max_time_in_seconds", &Value::from(2.5)).unwrap();
        params.set("num_search_workers", &Value::from(8u64)).unwrap();
        params.set("linearization_level", &Value::from(2u64)).unwrap();

        assert_eq!(params.max_time, Some(Duration::from_millis(2500)));
        assert_eq!(params.num_workers, Some(8));
        assert!(params.passthrough().contains_key("linearization_level"));
        assert!(params.set("enumerate_all_solutions", &Value::from(1)).is_err());
    }
}
