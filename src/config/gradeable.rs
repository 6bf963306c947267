// src/config/gradeable.rs

use serde::{Serialize, Deserialize};
use crate::error::{Error, Result};

fn default_hash_size() -> usize { 1 }
fn default_threshold() -> usize { 5 }
fn default_provided_code_enabled() -> bool { true }

/// Per-run settings read from `<gradeable_root>/config.json`.
///
/// The same file carries keys for the tokenizer and hasher stages, which
/// are ignored here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeableConfig {
    pub semester: String,
    pub course: String,
    pub gradeable: String,
    /// Tokens folded into one fingerprint.
    #[serde(default = "default_hash_size")]
    pub hash_size: usize,
    /// Largest number of students that may share a fingerprint before it is common.
    #[serde(default = "default_threshold")]
    pub threshold: usize,
    #[serde(default = "default_provided_code_enabled")]
    pub provided_code_enabled: bool,
}

impl GradeableConfig {
    pub fn validate(&self) -> Result<()> {
        if self.gradeable.trim().is_empty() {
            return Err(Error::config("gradeable must not be empty"));
        }
        if self.hash_size < 1 {
            return Err(Error::Config(
                format!("Invalid hash_size (must be at least 1): {}", self.hash_size)
            ));
        }
        if self.threshold < 2 {
            return Err(Error::Config(
                format!("Invalid threshold (must be at least 2): {}", self.threshold)
            ));
        }
        Ok(())
    }

    /// Source label stamped on locations from the current gradeable.
    pub fn source_label(&self) -> String {
        format!("{}__{}__{}", self.semester, self.course, self.gradeable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> GradeableConfig {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn defaults_apply_when_keys_are_missing() {
        let config = parse(r#"{"semester":"f24","course":"csci1200","gradeable":"hw01","language":"cpp"}"#);
        assert_eq!(config.hash_size, 1);
        assert_eq!(config.threshold, 5);
        assert!(config.provided_code_enabled);
        assert!(config.validate().is_ok());
        assert_eq!(config.source_label(), "f24__csci1200__hw01");
    }

    #[test]
    fn rejects_out_of_range_values() {
        let zero_hash = parse(r#"{"semester":"s","course":"c","gradeable":"g","hash_size":0}"#);
        assert!(matches!(zero_hash.validate(), Err(Error::Config(_))));

        let low_threshold = parse(r#"{"semester":"s","course":"c","gradeable":"g","threshold":1}"#);
        assert!(matches!(low_threshold.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn missing_gradeable_is_a_parse_error() {
        assert!(serde_json::from_str::<GradeableConfig>(r#"{"semester":"s","course":"c"}"#).is_err());
    }
}
