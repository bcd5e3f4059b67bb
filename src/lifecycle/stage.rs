//! Growth-stage classification.

use chrono::Duration;
use serde::Serialize;

use crate::config::TwinConfig;
use crate::error::ConfigError;

/// Discrete growth bucket, ordered from empty slot to ripe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GrowthStage {
    Empty,
    Seedling,
    Mature,
    Fruiting,
    Ripe,
}

/// Three ascending age bounds splitting planted slots into stages.
///
/// ```text
///   0 ── seedling ──▶ mature ──▶ fruit ──▶ ∞
///   [ Seedling )[  Mature  )[ Fruiting )[ Ripe
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageThresholds {
    seedling: Duration,
    mature: Duration,
    fruit: Duration,
}

impl StageThresholds {
    pub fn new(seedling: Duration, mature: Duration, fruit: Duration) -> Result<Self, ConfigError> {
        if seedling <= Duration::zero() || seedling >= mature || mature >= fruit {
            return Err(ConfigError::ValidationFailed(
                "stage thresholds must be strictly ascending",
            ));
        }
        Ok(Self {
            seedling,
            mature,
            fruit,
        })
    }

    pub fn from_config(config: &TwinConfig) -> Result<Self, ConfigError> {
        Self::new(
            config.seedling_bound(),
            config.mature_bound(),
            config.fruit_bound(),
        )
    }

    /// Classify an age. An age equal to a bound belongs to the later stage.
    pub fn classify(&self, age: Option<Duration>) -> GrowthStage {
        match age {
            None => GrowthStage::Empty,
            Some(a) if a < self.seedling => GrowthStage::Seedling,
            Some(a) if a < self.mature => GrowthStage::Mature,
            Some(a) if a < self.fruit => GrowthStage::Fruiting,
            Some(_) => GrowthStage::Ripe,
        }
    }
}
