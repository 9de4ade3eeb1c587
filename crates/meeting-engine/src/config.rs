//! Engine configuration, loadable from TOML.
//!
//! Every section has defaults, so an empty file (or none at all) yields the
//! documented behavior:
//!
//! ```toml
//! [business_hours]
//! utc_offset_minutes = 330
//! regular_start = "09:00:00"
//! regular_end = "18:00:00"
//!
//! [[classifier.rules]]
//! tier = "HIGH"
//! keywords = ["client", "investor"]
//!
//! [resolution]
//! max_restarts = 3
//! relocation_retry_days = 1
//! search_horizon_days = 14
//! ```

use std::path::Path;

use chrono::{FixedOffset, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::policy::{BusinessHours, BusinessHoursPolicy};
use crate::priority::KeywordTable;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub business_hours: BusinessHoursConfig,
    pub classifier: KeywordTable,
    pub resolution: ResolutionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessHoursConfig {
    /// Offset of the reference wall clock from UTC, in minutes (IST is 330).
    pub utc_offset_minutes: i32,
    pub regular_start: NaiveTime,
    pub regular_end: NaiveTime,
    pub workshop_start: NaiveTime,
    pub workshop_end: NaiveTime,
}

impl Default for BusinessHoursConfig {
    fn default() -> Self {
        let regular = BusinessHours::regular();
        let workshop = BusinessHours::workshop();
        Self {
            utc_offset_minutes: 0,
            regular_start: regular.start,
            regular_end: regular.end,
            workshop_start: workshop.start,
            workshop_end: workshop.end,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionConfig {
    /// How many times the new meeting may be moved before giving up.
    ///
    /// A moved candidate avoids every busy event of every attendee, so the
    /// first move normally converges; the bound matters for custom
    /// classifiers and strict configurations such as `max_restarts = 0`.
    pub max_restarts: usize,
    /// Extra calendar days a displaced event may move to.
    pub relocation_retry_days: u32,
    /// Days searched when the new meeting itself must move.
    pub search_horizon_days: u32,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            max_restarts: 3,
            relocation_retry_days: 1,
            search_horizon_days: 14,
        }
    }
}

impl EngineConfig {
    /// Load and validate a TOML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("failed to read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a TOML configuration string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig =
            toml::from_str(content).map_err(|e| EngineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let hours = &self.business_hours;
        if hours.regular_start >= hours.regular_end {
            return Err(EngineError::Config(
                "business_hours.regular_start must be before regular_end".to_string(),
            ));
        }
        if hours.workshop_start >= hours.workshop_end {
            return Err(EngineError::Config(
                "business_hours.workshop_start must be before workshop_end".to_string(),
            ));
        }
        self.utc_offset()?;
        if self.resolution.search_horizon_days == 0 {
            return Err(EngineError::Config(
                "resolution.search_horizon_days must be at least 1".to_string(),
            ));
        }
        if self.classifier.rules.iter().any(|r| r.keywords.is_empty()) {
            return Err(EngineError::Config(
                "classifier rules must list at least one keyword".to_string(),
            ));
        }
        Ok(())
    }

    pub fn utc_offset(&self) -> Result<FixedOffset> {
        let minutes = self.business_hours.utc_offset_minutes;
        FixedOffset::east_opt(minutes.saturating_mul(60)).ok_or_else(|| {
            EngineError::Config(format!("utc_offset_minutes out of range: {}", minutes))
        })
    }

    pub fn with_utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.business_hours.utc_offset_minutes = minutes;
        self
    }

    pub fn policy(&self) -> Result<BusinessHoursPolicy> {
        let hours = &self.business_hours;
        Ok(BusinessHoursPolicy::new(
            BusinessHours::new(hours.regular_start, hours.regular_end),
            BusinessHours::new(hours.workshop_start, hours.workshop_end),
            Some(self.utc_offset()?),
        ))
    }
}
