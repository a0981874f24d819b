use serde::{Deserialize, Serialize};

use crate::constants::UNIT_INFORMATION_LEN;
use crate::error::FrameError;
use crate::units::UnitCatalog;

/// Game configuration sent by the engine as the first line of a match.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    pub unit_information: Vec<UnitInformation>,
    #[serde(default)]
    pub resources: ResourceConfig,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitInformation {
    #[serde(default)]
    pub shorthand: String,
    #[serde(default)]
    pub display: Option<String>,
    #[serde(flatten)]
    pub stats: UnitStatBlock,
    #[serde(default)]
    pub upgrade: Option<UnitStatBlock>,
}

/// Numeric unit stats. Every field is optional on the wire; the base block
/// treats a missing field as zero, an upgrade block as "unchanged".
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitStatBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost1: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_health: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attack_damage_walker: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attack_damage_tower: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attack_range: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shield_range: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shield_per_unit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shield_bonus_per_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceConfig {
    #[serde(default = "default_bits_per_round")]
    pub bits_per_round: f64,
    #[serde(default)]
    pub cores_per_round: f64,
    #[serde(default = "default_bit_decay")]
    pub bit_decay_per_round: f64,
    #[serde(default = "default_bit_schedule_interval")]
    pub turn_interval_for_bit_schedule: u32,
    #[serde(default = "default_bit_growth")]
    pub bit_growth_rate: f64,
}

fn default_bits_per_round() -> f64 {
    5.0
}

fn default_bit_decay() -> f64 {
    0.25
}

fn default_bit_schedule_interval() -> u32 {
    10
}

fn default_bit_growth() -> f64 {
    1.0
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            bits_per_round: default_bits_per_round(),
            cores_per_round: 0.0,
            bit_decay_per_round: default_bit_decay(),
            turn_interval_for_bit_schedule: default_bit_schedule_interval(),
            bit_growth_rate: default_bit_growth(),
        }
    }
}

impl GameConfig {
    pub fn from_json(line: &str) -> Result<Self, FrameError> {
        let config: GameConfig =
            serde_json::from_str(line).map_err(|err| FrameError::Json {
                context: "game config",
                message: err.to_string(),
            })?;
        if config.unit_information.len() < UNIT_INFORMATION_LEN {
            return Err(FrameError::UnitInformationTooShort {
                actual: config.unit_information.len(),
                min: UNIT_INFORMATION_LEN,
            });
        }
        Ok(config)
    }
}

/// Everything fixed for the whole match: the resolved unit catalog and the
/// resource schedule.
#[derive(Clone, Debug)]
pub struct GameRules {
    pub catalog: UnitCatalog,
    pub resources: ResourceConfig,
}

impl GameRules {
    pub fn from_config(config: &GameConfig) -> Result<Self, FrameError> {
        Ok(Self {
            catalog: UnitCatalog::from_config(config)?,
            resources: config.resources.clone(),
        })
    }

    pub fn from_json(line: &str) -> Result<Self, FrameError> {
        Self::from_config(&GameConfig::from_json(line)?)
    }
}
