//! JSON configuration parsing for headless encounter runs
//!
//! Parses JSON encounter configurations: which script to run, the party
//! composition, and the simulation parameters.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::encounter::INCITER_SCRIPT_NAME;

/// Headless encounter configuration loaded from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadlessEncounterConfig {
    /// Encounter script to run (default: "the-inciter")
    #[serde(default = "default_encounter")]
    pub encounter: String,
    /// Party member names (1-5)
    pub party: Vec<String>,
    /// Custom output path for the encounter log (optional)
    #[serde(default)]
    pub output_path: Option<String>,
    /// Maximum encounter duration in seconds (default: 300)
    #[serde(default = "default_max_duration")]
    pub max_duration_secs: f32,
    /// Random seed for deterministic encounter reproduction
    /// If provided, the run will use a seeded RNG for reproducible results
    #[serde(default)]
    pub random_seed: Option<u64>,
}

fn default_encounter() -> String {
    INCITER_SCRIPT_NAME.to_string()
}

fn default_max_duration() -> f32 {
    300.0
}

impl HeadlessEncounterConfig {
    /// Convenience constructor with defaults for everything but the party.
    pub fn with_party(party: Vec<String>) -> Self {
        Self {
            encounter: default_encounter(),
            party,
            output_path: None,
            max_duration_secs: default_max_duration(),
            random_seed: None,
        }
    }

    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let config: HeadlessEncounterConfig =
            serde_json::from_str(&contents).map_err(|e| format!("Failed to parse JSON: {}", e))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.party.is_empty() || self.party.len() > 5 {
            return Err("party must have 1-5 members".to_string());
        }

        for name in &self.party {
            if name.trim().is_empty() {
                return Err("party member names must not be empty".to_string());
            }
        }

        if self.encounter.trim().is_empty() {
            return Err("encounter name must not be empty".to_string());
        }

        if self.max_duration_secs <= 0.0 {
            return Err("max_duration_secs must be positive".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config_passes_validation() {
        let config = HeadlessEncounterConfig::with_party(vec![
            "Aldric".to_string(),
            "Brenna".to_string(),
            "Corvin".to_string(),
        ]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_party_is_rejected() {
        let config = HeadlessEncounterConfig::with_party(vec![]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_oversized_party_is_rejected() {
        let party = (0..6).map(|i| format!("Player{}", i)).collect();
        let config = HeadlessEncounterConfig::with_party(party);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_positive_duration_is_rejected() {
        let mut config = HeadlessEncounterConfig::with_party(vec!["Aldric".to_string()]);
        config.max_duration_secs = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_defaults() {
        let config: HeadlessEncounterConfig =
            serde_json::from_str(r#"{"party": ["Aldric", "Brenna"]}"#).unwrap();
        assert_eq!(config.encounter, INCITER_SCRIPT_NAME);
        assert_eq!(config.max_duration_secs, 300.0);
        assert!(config.random_seed.is_none());
        assert!(config.output_path.is_none());
    }
}
