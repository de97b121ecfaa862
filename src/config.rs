//! Hand subsystem configuration
//!
//! Tuning constants with profile support: a base file, a profile-specific
//! override file, and `HAND_` environment variables. Everything has a
//! compiled-in default so the subsystem runs with no config files at all.

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::hand::gesture::GestureThresholds;

/// Error raised when configuration files exist but cannot be parsed
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to load hand input config: {0}")]
    Load(#[from] config::ConfigError),
}

/// Gesture detector tuning
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GestureConfig {
    pub pinch: GestureThresholds,
    pub grip: GestureThresholds,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            pinch: GestureThresholds::PINCH,
            grip: GestureThresholds::GRIP,
        }
    }
}

/// Pose simulation tuning
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SimConfig {
    /// Seconds a template switch takes to blend to completion
    pub blend_window: f32,
    /// Base distance from the camera for the mouse-simulated hand, meters
    pub mouse_hand_distance: f32,
    /// Meters of depth change per scroll-wheel unit
    pub mouse_scroll_depth: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            blend_window: 0.1,
            mouse_hand_distance: 0.6,
            mouse_scroll_depth: 0.00025,
        }
    }
}

/// Full hand subsystem configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandInputConfig {
    /// The active profile (debug, release, etc.)
    pub profile: String,
    pub gesture: GestureConfig,
    pub sim: SimConfig,
    /// Seconds between hand-size recomputes
    pub size_update_interval: f32,
}

impl HandInputConfig {
    /// Loads configuration for the given profile
    ///
    /// Sources, in order:
    /// 1. config/hands.toml (base)
    /// 2. config/hands-{profile}.toml (profile overrides)
    /// 3. Environment variables with prefix HAND_ (e.g. HAND_SIM__BLEND_WINDOW)
    pub fn load(profile: &str) -> Result<Self, ConfigLoadError> {
        let defaults = Config::try_from(&Self::default())?;
        let config = Config::builder()
            .add_source(defaults)
            .add_source(File::with_name("config/hands").required(false))
            .add_source(File::with_name(&format!("config/hands-{}", profile)).required(false))
            .add_source(
                Environment::with_prefix("HAND")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override("profile", profile)?
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Loads configuration using the HAND_PROFILE environment variable,
    /// defaulting to "debug" if not set
    pub fn load_from_env() -> Result<Self, ConfigLoadError> {
        let profile = std::env::var("HAND_PROFILE").unwrap_or_else(|_| "debug".to_string());
        Self::load(&profile)
    }
}

impl Default for HandInputConfig {
    fn default() -> Self {
        Self {
            profile: "debug".to_string(),
            gesture: GestureConfig::default(),
            sim: SimConfig::default(),
            size_update_interval: 1.0,
        }
    }
}
