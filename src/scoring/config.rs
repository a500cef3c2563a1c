use serde::{Deserialize, Serialize};

use super::rules::RuleSet;
use crate::error::ScoreError;
use crate::records::{IdentityMode, UNASSIGNED_LABEL};

/// Scoring configuration.
///
/// Every field is optional; unset fields fall back to the defaults below.
///
/// Example YAML:
/// ```yaml
/// scoring:
///   analyses_enabled: true
///   include_unassigned: false
///   identity: id
///   unassigned_label: "No owner"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    /// Score analyses as well as actions (default: true).
    /// `false` gives the action-only rule set.
    #[serde(default)]
    pub analyses_enabled: Option<bool>,

    /// Keep the bucket of records without a champion in the leaderboard
    /// (default: true).
    #[serde(default)]
    pub include_unassigned: Option<bool>,

    /// Champion keying: "id" (stable id, label fallback) or "label".
    #[serde(default)]
    pub identity: Option<String>,

    /// Display label of the unassigned bucket (default: "Unassigned").
    #[serde(default)]
    pub unassigned_label: Option<String>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            analyses_enabled: Some(true),
            include_unassigned: Some(true),
            identity: Some("id".to_string()),
            unassigned_label: Some(UNASSIGNED_LABEL.to_string()),
        }
    }
}

impl ScoringConfig {
    pub fn rule_set(&self) -> RuleSet {
        RuleSet {
            analyses_enabled: self.analyses_enabled.unwrap_or(true),
        }
    }

    pub fn include_unassigned(&self) -> bool {
        self.include_unassigned.unwrap_or(true)
    }

    pub fn identity_mode(&self) -> Result<IdentityMode, ScoreError> {
        match self.identity.as_deref() {
            Some(mode) => mode.parse(),
            None => Ok(IdentityMode::default()),
        }
    }

    pub fn unassigned_label(&self) -> &str {
        self.unassigned_label
            .as_deref()
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .unwrap_or(UNASSIGNED_LABEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scoring_config() {
        let config = ScoringConfig::default();
        assert_eq!(config.rule_set(), RuleSet::default());
        assert!(config.include_unassigned());
        assert_eq!(config.identity_mode().unwrap(), IdentityMode::Id);
        assert_eq!(config.unassigned_label(), "Unassigned");
    }

    #[test]
    fn test_scoring_config_serde_roundtrip() {
        let config = ScoringConfig::default();
        let yaml = serde_saphyr::to_string(&config).unwrap();
        let parsed: ScoringConfig = serde_saphyr::from_str(&yaml).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_scoring_config_parse() {
        let yaml = r#"
analyses_enabled: false
identity: label
"#;
        let config: ScoringConfig = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.rule_set(), RuleSet::actions_only());
        assert_eq!(config.identity_mode().unwrap(), IdentityMode::Label);
        assert!(config.include_unassigned());
        assert_eq!(config.unassigned_label(), "Unassigned");
    }

    #[test]
    fn test_empty_scoring_config_parse() {
        let config: ScoringConfig = serde_saphyr::from_str("{}").unwrap();
        assert!(config.analyses_enabled.is_none());
        assert_eq!(config.identity_mode().unwrap(), IdentityMode::Id);
    }

    #[test]
    fn test_unknown_identity_mode_is_misuse() {
        let config = ScoringConfig {
            identity: Some("email".to_string()),
            ..ScoringConfig::default()
        };
        assert!(matches!(
            config.identity_mode(),
            Err(ScoreError::UnsupportedMode { .. })
        ));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result: Result<ScoringConfig, _> = serde_saphyr::from_str("base_score: 100");
        assert!(result.is_err());
    }

    #[test]
    fn test_blank_unassigned_label_falls_back() {
        let config = ScoringConfig {
            unassigned_label: Some("  ".to_string()),
            ..ScoringConfig::default()
        };
        assert_eq!(config.unassigned_label(), "Unassigned");
    }
}
