//! Bot configuration: robot identity and speech preferences.
//!
//! Loaded from TOML (or built inline by a script). Every field has a
//! default, so an empty document is a valid configuration.

use serde::{Deserialize, Serialize};

/// Nested configuration for one bot instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BotConfiguration {
    #[serde(default)]
    pub robot: RobotConfig,
    #[serde(default)]
    pub speak: SpeakConfig,
}

/// The robot's identity, used for voice selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotConfig {
    #[serde(default = "default_robot_name")]
    pub name: String,
    /// Matched against the voice catalog's `gender` field.
    #[serde(default = "default_gender")]
    pub gender: String,
}

fn default_robot_name() -> String {
    "tjbot".to_string()
}

fn default_gender() -> String {
    "male".to_string()
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            name: default_robot_name(),
            gender: default_gender(),
        }
    }
}

/// Speech output preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeakConfig {
    /// Matched against the voice catalog's `language` field.
    #[serde(default = "default_language")]
    pub language: String,
    /// Explicit voice identifier; overrides catalog matching when set.
    #[serde(default)]
    pub voice: Option<String>,
}

fn default_language() -> String {
    "en-US".to_string()
}

impl Default for SpeakConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            voice: None,
        }
    }
}
