//! Health-driven phase derivation.
//!
//! The phase is never stored authoritatively by anyone else: it is a pure
//! function of the health percentage over two ordered thresholds, recomputed
//! on every health change. There is deliberately no hysteresis - a health
//! value oscillating across a threshold fires one notification per crossing,
//! matching the tuning data's intent that phase effects are cheap to
//! re-apply.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Ordered thresholds: phase 1 above `phase1`, phase 2 above `phase2`,
/// phase 3 below. Invariant: `0 <= phase2 < phase1 <= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseThresholds {
    phase1: f32,
    phase2: f32,
}

impl PhaseThresholds {
    pub fn new(phase1: f32, phase2: f32) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&phase1) || phase2 < 0.0 || phase2 >= phase1 {
            return Err(ConfigError::InvalidThresholds { phase1, phase2 });
        }
        Ok(Self { phase1, phase2 })
    }

    pub fn phase_for(&self, health_percentage: f32) -> u8 {
        if health_percentage > self.phase1 {
            1
        } else if health_percentage > self.phase2 {
            2
        } else {
            3
        }
    }
}

/// Tracks the last derived phase so changes are reported exactly once.
#[derive(Debug, Clone)]
pub struct PhaseController {
    thresholds: PhaseThresholds,
    current: u8,
}

impl PhaseController {
    pub fn new(thresholds: PhaseThresholds) -> Self {
        Self {
            thresholds,
            current: 1,
        }
    }

    pub fn current_phase(&self) -> u8 {
        self.current
    }

    /// Recompute the phase from a health change. Returns `Some((old, new))`
    /// only when the derived phase actually differs; repeated changes within
    /// the same band return `None`.
    pub fn on_health_changed(&mut self, current: f32, max: f32) -> Option<(u8, u8)> {
        let pct = if max > 0.0 { current / max } else { 0.0 };
        let new = self.thresholds.phase_for(pct);
        if new == self.current {
            return None;
        }
        let old = self.current;
        self.current = new;
        tracing::debug!(old, new, pct, "phase changed");
        Some((old, new))
    }
}
