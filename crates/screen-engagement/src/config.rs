//! Tracker configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::EngagementError;
use crate::warehouse::{ScreenEntity, WarehouseConfig};

/// Configuration for a [`ScreenTracker`](crate::ScreenTracker)
///
/// Every field has a default, so a partial JSON document is accepted:
///
/// ```
/// # use screen_engagement::TrackerConfig;
/// let config = TrackerConfig::from_json(r#"{ "border_correction_px": 12 }"#).unwrap();
/// assert_eq!(config.border_correction_px, 12.0);
/// assert_eq!(config.refresh_interval_ms, 1000);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Thickness of the decorative top border of the scroll view in pixels
    pub border_correction_px: f64,
    /// Display refresh cadence for hosts that poll `refresh()`
    pub refresh_interval_ms: u64,
    pub screen: ScreenEntity,
    pub warehouse: WarehouseConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            border_correction_px: 30.0,
            refresh_interval_ms: 1000,
            screen: ScreenEntity::default(),
            warehouse: WarehouseConfig::default(),
        }
    }
}

impl TrackerConfig {
    /// Parse and validate a JSON configuration document
    pub fn from_json(s: &str) -> Result<Self, EngagementError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngagementError> {
        if !self.border_correction_px.is_finite() || self.border_correction_px < 0.0 {
            return Err(EngagementError::Config(format!(
                "border_correction_px must be a non-negative number, got {}",
                self.border_correction_px
            )));
        }
        if self.refresh_interval_ms == 0 {
            return Err(EngagementError::Config(
                "refresh_interval_ms must be greater than zero".to_owned(),
            ));
        }
        if self.screen.id.is_empty() {
            return Err(EngagementError::Config("screen.id must not be empty".to_owned()));
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }
}
