//! Engine configuration: economy constants plus the catalog.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{Catalog, COMBO_SIZE};
use crate::time::Millis;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("reward track is empty")]
    EmptyRewardTrack,
    #[error("cipher word pool is empty")]
    EmptyCipherPool,
    #[error("no combo sets defined")]
    EmptyComboSets,
    #[error("combo set #{index} must have {} distinct cards", COMBO_SIZE)]
    BadComboSet { index: usize },
    #[error("combo card `{0}` is not in the upgrade catalog")]
    UnknownComboCard(String),
    #[error("level table must start at 0 and strictly increase")]
    ThresholdsNotIncreasing,
    #[error("duplicate upgrade id `{0}`")]
    DuplicateUpgradeId(String),
    #[error("duplicate task id `{0}`")]
    DuplicateTaskId(String),
    #[error("upgrade `{card}` requires unknown card `{required}`")]
    UnknownPrerequisite { card: String, required: String },
    #[error("daily reset hour {0} is not in 0..24")]
    BadResetHour(u32),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub points_per_tap: u64,
    pub initial_points: u64,
    pub initial_energy: u64,
    pub max_energy: u64,
    pub energy_recovery_per_second: f64,
    pub initial_profit_per_hour: u64,
    pub referral_bonus: u64,
    pub cipher_reward: u64,
    pub combo_reward: u64,
    /// Hour (UTC) at which cipher and combo roll over.
    pub daily_reset_hour_utc: u32,
    pub autosave_interval_ms: Millis,
    /// Display name used when the host supplies no identity.
    pub placeholder_name: String,
    pub invite_base_url: String,
    pub catalog: Catalog,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            points_per_tap: 1,
            initial_points: 0,
            initial_energy: 1_000,
            max_energy: 1_000,
            energy_recovery_per_second: 1.0,
            initial_profit_per_hour: 0,
            referral_bonus: 5_000,
            cipher_reward: 1_000_000,
            combo_reward: 5_000_000,
            daily_reset_hour_utc: 0,
            autosave_interval_ms: 30_000,
            placeholder_name: "CEO".into(),
            invite_base_url: "https://t.me/FXUniversebot?start=".into(),
            catalog: Catalog::default(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let catalog = &self.catalog;

        if catalog.reward_track.is_empty() {
            return Err(ConfigError::EmptyRewardTrack);
        }
        if catalog.cipher_words.is_empty() {
            return Err(ConfigError::EmptyCipherPool);
        }
        if catalog.combo_sets.is_empty() {
            return Err(ConfigError::EmptyComboSets);
        }
        if self.daily_reset_hour_utc >= 24 {
            return Err(ConfigError::BadResetHour(self.daily_reset_hour_utc));
        }

        let thresholds = catalog.level_thresholds();
        if thresholds.first() != Some(&0) || thresholds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::ThresholdsNotIncreasing);
        }

        let mut ids = HashSet::new();
        for u in &catalog.upgrades {
            if !ids.insert(u.id.as_str()) {
                return Err(ConfigError::DuplicateUpgradeId(u.id.clone()));
            }
        }
        for u in &catalog.upgrades {
            if let Some(req) = &u.requires {
                if !ids.contains(req.card_id.as_str()) {
                    return Err(ConfigError::UnknownPrerequisite {
                        card: u.id.clone(),
                        required: req.card_id.clone(),
                    });
                }
            }
        }

        let mut task_ids = HashSet::new();
        for t in &catalog.tasks {
            if !task_ids.insert(t.id.as_str()) {
                return Err(ConfigError::DuplicateTaskId(t.id.clone()));
            }
        }

        for (index, set) in catalog.combo_sets.iter().enumerate() {
            let distinct: HashSet<&String> = set.iter().collect();
            if set.len() != COMBO_SIZE || distinct.len() != COMBO_SIZE {
                return Err(ConfigError::BadComboSet { index });
            }
            if let Some(unknown) = set.iter().find(|id| !ids.contains(id.as_str())) {
                return Err(ConfigError::UnknownComboCard(unknown.clone()));
            }
        }

        Ok(())
    }
}
