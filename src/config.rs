//! Boss configuration record, consumed once at spawn.
//!
//! Mirrors the designer-facing data asset: identity, health pool, movement
//! tuning, default attack numbers, phase thresholds and AI distances. Loadable
//! from RON or JSON; always validated before a boss is built from it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fatal configuration problems. Everything here disables the boss instance
/// rather than crashing the process; expected combat rejections are never
/// represented as errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("phase thresholds invalid: need 0 <= phase2 ({phase2}) < phase1 ({phase1}) <= 1")]
    InvalidThresholds { phase1: f32, phase2: f32 },
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },
    #[error("failed to parse boss config: {detail}")]
    Parse { detail: String },
}

/// Spawn-time configuration for one boss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BossConfig {
    pub name: String,
    pub max_health: f32,
    pub move_speed: f32,
    pub jump_force: f32,
    /// Damage of the default melee swing.
    pub attack_damage: f32,
    /// Reach of the default melee swing (its max range).
    pub attack_range: f32,
    /// Cooldown of the default melee swing.
    pub attack_cooldown: f32,
    /// Phase 1 lasts while health pct > phase1_threshold.
    pub phase1_threshold: f32,
    /// Phase 2 lasts while health pct > phase2_threshold; phase 3 below.
    pub phase2_threshold: f32,
    /// Aggro radius; data for the encounter trigger, not read by the AI loop.
    pub chase_distance: f32,
    /// Inside this distance the boss stands and waits for an attack window.
    pub attack_distance: f32,
    /// Retreat runs until the target is at least this far away.
    pub retreat_distance: f32,
    /// Tag used for friendly-fire filtering by damage dealers.
    pub tag: String,
}

impl Default for BossConfig {
    fn default() -> Self {
        Self {
            name: "Boss".into(),
            max_health: 1000.0,
            move_speed: 3.0,
            jump_force: 5.0,
            attack_damage: 20.0,
            attack_range: 2.0,
            attack_cooldown: 2.0,
            phase1_threshold: 0.7,
            phase2_threshold: 0.4,
            chase_distance: 10.0,
            attack_distance: 2.0,
            retreat_distance: 5.0,
            tag: "Boss".into(),
        }
    }
}

impl BossConfig {
    /// Validate the record. Called by [`crate::boss::BossOrchestrator::new`];
    /// a failing config disables the boss instance.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("max_health", self.max_health),
            ("move_speed", self.move_speed),
            ("attack_range", self.attack_range),
            ("attack_distance", self.attack_distance),
        ];
        for (field, value) in positive {
            if value <= 0.0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        let non_negative = [
            ("jump_force", self.jump_force),
            ("attack_damage", self.attack_damage),
            ("attack_cooldown", self.attack_cooldown),
            ("chase_distance", self.chase_distance),
            ("retreat_distance", self.retreat_distance),
        ];
        for (field, value) in non_negative {
            if value < 0.0 {
                return Err(ConfigError::Negative { field, value });
            }
        }
        let (p1, p2) = (self.phase1_threshold, self.phase2_threshold);
        if !(0.0..=1.0).contains(&p1) || p2 < 0.0 || p2 >= p1 {
            return Err(ConfigError::InvalidThresholds {
                phase1: p1,
                phase2: p2,
            });
        }
        Ok(())
    }

    pub fn from_ron_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(s).map_err(|e| ConfigError::Parse {
            detail: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s).map_err(|e| ConfigError::Parse {
            detail: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(BossConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_health() {
        let config = BossConfig {
            max_health: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive {
                field: "max_health",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_inverted_thresholds() {
        let config = BossConfig {
            phase1_threshold: 0.4,
            phase2_threshold: 0.7,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidThresholds { .. })
        ));
    }

    #[test]
    fn test_rejects_equal_thresholds() {
        let config = BossConfig {
            phase1_threshold: 0.5,
            phase2_threshold: 0.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_threshold_above_one() {
        let config = BossConfig {
            phase1_threshold: 1.2,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_ron_roundtrip() {
        let config = BossConfig {
            name: "Warden".into(),
            max_health: 500.0,
            ..Default::default()
        };
        let text = ron::to_string(&config).unwrap();
        let back = BossConfig::from_ron_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_ron_partial_record_uses_defaults() {
        let config = BossConfig::from_ron_str(r#"(name: "Warden", max_health: 250.0)"#).unwrap();
        assert_eq!(config.name, "Warden");
        assert_eq!(config.max_health, 250.0);
        assert_eq!(config.move_speed, BossConfig::default().move_speed);
    }

    #[test]
    fn test_json_invalid_is_parse_error() {
        assert!(matches!(
            BossConfig::from_json_str("{not json"),
            Err(ConfigError::Parse { .. })
        ));
    }
}
