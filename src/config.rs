use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure for the wave orchestrator
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WaveOrchestratorConfig {
    /// State document settings
    pub state: StateConfig,
    /// Wave progression settings
    pub workflow: WorkflowConfig,
    /// Logging settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StateConfig {
    /// Path to the orchestrator state document
    pub file_path: PathBuf,
    /// How long to wait for another invocation to release the state lock
    pub lock_timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct WorkflowConfig {
    /// Final wave of the workflow; unbounded when unset
    pub max_wave: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level used when RUST_LOG is not set
    pub log_level: String,
    /// Emit logs as JSON lines instead of human-readable text
    pub json_logs: bool,
}

impl Default for WaveOrchestratorConfig {
    fn default() -> Self {
        Self {
            state: StateConfig {
                file_path: PathBuf::from("orchestrator-state.json"),
                lock_timeout_ms: 5000,
            },
            workflow: WorkflowConfig { max_wave: None },
            observability: ObservabilityConfig {
                log_level: "warn".to_string(),
                json_logs: false,
            },
        }
    }
}

impl StateConfig {
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

impl WaveOrchestratorConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (wave-orchestrator.toml)
    /// 3. Environment variables (prefixed with WAVE_ORCHESTRATOR__)
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("wave-orchestrator.toml"))
    }

    pub fn load_from(config_file: &Path) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if config_file.exists() {
            builder = builder.add_source(File::from(config_file));
        }

        // Double underscore so keys like lock_timeout_ms keep their own underscores
        builder = builder.add_source(
            Environment::with_prefix("WAVE_ORCHESTRATOR")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = WaveOrchestratorConfig::load_from(&temp_dir.path().join("absent.toml")).unwrap();

        assert_eq!(config.state.file_path, PathBuf::from("orchestrator-state.json"));
        assert_eq!(config.state.lock_timeout(), Duration::from_secs(5));
        assert_eq!(config.workflow.max_wave, None);
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("wave-orchestrator.toml");
        fs::write(
            &path,
            r#"
            [state]
            file_path = "build/orchestrator-state.yaml"

            [workflow]
            max_wave = 4
            "#,
        )
        .unwrap();

        let config = WaveOrchestratorConfig::load_from(&path).unwrap();
        assert_eq!(config.state.file_path, PathBuf::from("build/orchestrator-state.yaml"));
        assert_eq!(config.state.lock_timeout_ms, 5000);
        assert_eq!(config.workflow.max_wave, Some(4));
        assert_eq!(config.observability.log_level, "warn");
    }
}
