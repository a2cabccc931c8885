use super::types::{
    ChoicelabConfig, DEFAULT_HOST, DEFAULT_PORT, ExperimentSection, RawChoicelabConfig,
    RawExperimentConfig, RawServerConfig, ServerConfig,
};
use anyhow::{Context, Result};
use choicelab_core::{ExperimentConfig, QuizProfile};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Environment variables consulted after the config files
pub const ENV_HOST: &str = "HOST";
pub const ENV_PORT: &str = "PORT";
pub const ENV_QUIZ_LENGTH: &str = "CHOICELAB_QUIZ_LENGTH";
pub const ENV_PROFILE: &str = "CHOICELAB_PROFILE";
pub const ENV_PROJECT_CONFIG_DIR: &str = "CHOICELAB_PROJECT_CONFIG_DIR";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project + environment)
    pub fn load() -> Result<ChoicelabConfig> {
        Self::load_with_overrides(RawChoicelabConfig::default())
    }

    /// Load merged configuration with command-line values layered on top
    pub fn load_with_overrides(overrides: RawChoicelabConfig) -> Result<ChoicelabConfig> {
        let env = Self::env_overrides(|key| std::env::var(key).ok())?;
        Self::load_layers(
            Self::user_config_path().as_deref(),
            &Self::project_config_path(),
            env,
            overrides,
        )
    }

    /// Merge every layer in precedence order, lowest first
    fn load_layers(
        user_path: Option<&Path>,
        project_path: &Path,
        env: RawChoicelabConfig,
        overrides: RawChoicelabConfig,
    ) -> Result<ChoicelabConfig> {
        let mut raw = RawChoicelabConfig::default();

        // Layer 1: User config
        if let Some(user_path) = user_path
            && user_path.exists()
        {
            raw = Self::merge_raw(raw, Self::read_raw(user_path)?);
        }

        // Layer 2: Project config
        if project_path.exists() {
            raw = Self::merge_raw(raw, Self::read_raw(project_path)?);
        }

        // Layer 3: Environment
        raw = Self::merge_raw(raw, env);

        // Layer 4: Command line
        raw = Self::merge_raw(raw, overrides);

        Self::finalize(raw)
    }

    fn read_raw(path: &Path) -> Result<RawChoicelabConfig> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("Invalid config in {}", path.display()))
    }

    /// Get user config path (platform-specific)
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "choicelab").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get project config path
    /// Can be overridden with CHOICELAB_PROJECT_CONFIG_DIR (useful for isolated e2e tests)
    pub fn project_config_path() -> PathBuf {
        if let Ok(dir) = std::env::var(ENV_PROJECT_CONFIG_DIR) {
            PathBuf::from(dir).join("config.toml")
        } else {
            PathBuf::from(".choicelab/config.toml")
        }
    }

    /// Read the environment layer through `lookup`
    ///
    /// Unset variables leave the layer empty; set but unparsable ones are
    /// errors rather than silently ignored.
    fn env_overrides(lookup: impl Fn(&str) -> Option<String>) -> Result<RawChoicelabConfig> {
        let port = lookup(ENV_PORT)
            .map(|v| v.parse::<u16>())
            .transpose()
            .with_context(|| format!("{ENV_PORT} must be a port number"))?;
        let quiz_length = lookup(ENV_QUIZ_LENGTH)
            .map(|v| v.parse::<usize>())
            .transpose()
            .with_context(|| format!("{ENV_QUIZ_LENGTH} must be a positive integer"))?;
        let profile = lookup(ENV_PROFILE)
            .map(|v| v.parse::<QuizProfile>())
            .transpose()
            .with_context(|| format!("{ENV_PROFILE} is not a known profile"))?;

        Ok(RawChoicelabConfig {
            server: RawServerConfig {
                host: lookup(ENV_HOST),
                port,
            },
            experiment: RawExperimentConfig {
                quiz_length,
                profile,
            },
        })
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawChoicelabConfig, overlay: RawChoicelabConfig) -> RawChoicelabConfig {
        RawChoicelabConfig {
            server: RawServerConfig {
                host: overlay.server.host.or(base.server.host),
                port: overlay.server.port.or(base.server.port),
            },
            experiment: RawExperimentConfig {
                quiz_length: overlay.experiment.quiz_length.or(base.experiment.quiz_length),
                profile: overlay.experiment.profile.or(base.experiment.profile),
            },
        }
    }

    /// Convert raw config to final config with defaults applied
    ///
    /// An explicit quiz length wins over the profile's preset.
    fn finalize(raw: RawChoicelabConfig) -> Result<ChoicelabConfig> {
        let profile = raw.experiment.profile.unwrap_or_default();
        let quiz_length = raw
            .experiment
            .quiz_length
            .unwrap_or_else(|| profile.quiz_length());
        // Validate once here so `serve` never starts with a bad length
        ExperimentConfig::new(quiz_length)?;

        Ok(ChoicelabConfig {
            server: ServerConfig {
                host: raw.server.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port: raw.server.port.unwrap_or(DEFAULT_PORT),
            },
            experiment: ExperimentSection {
                profile,
                quiz_length,
            },
        })
    }

    /// Load config from a specific path (for testing)
    #[cfg(test)]
    pub fn load_from_path(path: &Path) -> Result<ChoicelabConfig> {
        if path.exists() {
            Self::finalize(Self::read_raw(path)?)
        } else {
            Ok(ChoicelabConfig::default())
        }
    }
}

impl ChoicelabConfig {
    /// Settings for the session coordinator
    pub fn experiment_config(&self) -> Result<ExperimentConfig> {
        Ok(ExperimentConfig::new(self.experiment.quiz_length)?)
    }

    /// Settings for the HTTP/WebSocket listener
    pub fn server_config(&self) -> choicelab_server::ServerConfig {
        choicelab_server::ServerConfig::new(self.server.host.clone(), self.server.port)
    }
}
