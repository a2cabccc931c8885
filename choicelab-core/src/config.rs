//! Experiment configuration
//!
//! The quiz length is the only knob that differs between deployments. It is
//! carried as a single value in [`ExperimentConfig`]; [`QuizProfile`] names the
//! two deployment presets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Questions per participant in the standard profile
pub const DEFAULT_QUIZ_LENGTH: usize = 5;

/// Questions per participant in the extended profile
pub const EXTENDED_QUIZ_LENGTH: usize = 10;

/// Number of answer options attached to every question
pub const OPTION_COUNT: usize = 4;

/// Named deployment presets for the quiz length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizProfile {
    #[default]
    Standard,
    Extended,
}

impl QuizProfile {
    pub fn quiz_length(self) -> usize {
        match self {
            QuizProfile::Standard => DEFAULT_QUIZ_LENGTH,
            QuizProfile::Extended => EXTENDED_QUIZ_LENGTH,
        }
    }
}

impl fmt::Display for QuizProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuizProfile::Standard => write!(f, "standard"),
            QuizProfile::Extended => write!(f, "extended"),
        }
    }
}

impl FromStr for QuizProfile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(QuizProfile::Standard),
            "extended" => Ok(QuizProfile::Extended),
            other => Err(ConfigError::UnknownProfile(other.to_string())),
        }
    }
}

/// Settings the session coordinator runs with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Questions each participant answers before the final-choice prompt
    pub quiz_length: usize,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            quiz_length: DEFAULT_QUIZ_LENGTH,
        }
    }
}

impl ExperimentConfig {
    /// Create a config with an explicit quiz length
    pub fn new(quiz_length: usize) -> Result<Self, ConfigError> {
        if quiz_length == 0 {
            return Err(ConfigError::InvalidQuizLength(quiz_length));
        }
        Ok(Self { quiz_length })
    }

    /// Create a config from a deployment preset
    pub fn for_profile(profile: QuizProfile) -> Self {
        Self {
            quiz_length: profile.quiz_length(),
        }
    }
}
