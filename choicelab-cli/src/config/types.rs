use choicelab_core::{DEFAULT_QUIZ_LENGTH, QuizProfile};
use serde::{Deserialize, Serialize};

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct RawChoicelabConfig {
    #[serde(default)]
    pub server: RawServerConfig,

    #[serde(default)]
    pub experiment: RawExperimentConfig,
}

/// Server config as stored in TOML (optional fields for proper merging)
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct RawServerConfig {
    /// Host address to bind to
    pub host: Option<String>,

    /// Port for the choicelab server
    pub port: Option<u16>,
}

/// Experiment config as stored in TOML
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct RawExperimentConfig {
    /// Questions per participant; wins over `profile` when both are set
    pub quiz_length: Option<usize>,

    /// Named quiz-length preset
    pub profile: Option<QuizProfile>,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ChoicelabConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub experiment: ExperimentSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,

    /// Port for the choicelab server
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExperimentSection {
    /// Profile the quiz length was derived from
    pub profile: QuizProfile,

    /// Questions each participant answers before the final choice
    pub quiz_length: usize,
}

impl Default for ExperimentSection {
    fn default() -> Self {
        Self {
            profile: QuizProfile::default(),
            quiz_length: DEFAULT_QUIZ_LENGTH,
        }
    }
}

/// Default port for the choicelab server
pub const DEFAULT_PORT: u16 = choicelab_server::DEFAULT_PORT;

/// Default host for the choicelab server
pub const DEFAULT_HOST: &str = choicelab_server::DEFAULT_HOST;
