use anyhow::{Context, Result};
use gradcpt_analysis::{FeatureConfig, LabelConfig, ReconcileConfig};
use gradcpt_experiment::{SessionConfig, SimulatedParticipant};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub session: SessionConfig,
    pub reconcile: ReconcileConfig,
    pub label: LabelConfig,
    pub features: FeatureConfig,
    pub participant: SimulatedParticipant,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config: AppConfig = serde_json::from_str(
            r#"{ "session": { "trial_count": 10 }, "label": { "fwhm": 5.0 } }"#,
        )
        .unwrap();
        assert_eq!(config.session.trial_count, 10);
        assert_eq!(config.session.trial_window_ms, 800);
        assert_eq!(config.label.fwhm, 5.0);
        assert_eq!(config.reconcile, ReconcileConfig::default());
    }

    #[test]
    fn missing_file_is_reported() {
        let err = AppConfig::load(Path::new("/nonexistent/gradcpt.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read config"));
        assert_eq!(AppConfig::load_or_default(None).unwrap(), AppConfig::default());
    }
}
