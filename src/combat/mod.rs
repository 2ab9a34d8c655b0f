//! Damage data model: request records, damage kinds, knockback derivation.
//!
//! A [`DamageRequest`] is an immutable value created per hit; the resolver in
//! [`resolver`] applies filtering and cooldown before any of it reaches a
//! health pool.

use bevy::prelude::Vec2;
use serde::{Deserialize, Serialize};

use crate::collaborators::TargetId;
use crate::constants::DEFAULT_CRITICAL_MULTIPLIER;

pub mod resolver;

pub use resolver::{DamageFilter, DamageResolver, LayerMask};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageKind {
    Physical,
    Magic,
    /// Ignores defenses (none modelled here; kept for dealers that care).
    True,
    Fire,
    Ice,
    Lightning,
}

/// One hit, fully described.
#[derive(Debug, Clone, PartialEq)]
pub struct DamageRequest {
    pub amount: f32,
    pub source: TargetId,
    pub kind: DamageKind,
    /// Explicit knockback; zero means "derive from dealer->target direction".
    pub knockback: Vec2,
    pub is_critical: bool,
    pub critical_multiplier: f32,
    pub ignore_invincibility: bool,
}

impl DamageRequest {
    pub fn new(amount: f32, source: TargetId) -> Self {
        Self {
            amount: amount.max(0.0),
            source,
            kind: DamageKind::Physical,
            knockback: Vec2::ZERO,
            is_critical: false,
            critical_multiplier: DEFAULT_CRITICAL_MULTIPLIER,
            ignore_invincibility: false,
        }
    }

    pub fn with_kind(mut self, kind: DamageKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_knockback(mut self, knockback: Vec2) -> Self {
        self.knockback = knockback;
        self
    }

    pub fn critical(mut self, multiplier: f32) -> Self {
        self.is_critical = true;
        self.critical_multiplier = multiplier;
        self
    }

    pub fn ignoring_invincibility(mut self) -> Self {
        self.ignore_invincibility = true;
        self
    }

    /// Damage after the critical multiplier.
    pub fn final_damage(&self) -> f32 {
        if self.is_critical {
            self.amount * self.critical_multiplier
        } else {
            self.amount
        }
    }

    /// Knockback direction for this hit, scaled by `multiplier`: the explicit
    /// vector's direction when one was set, otherwise the dealer->target
    /// displacement. Advisory output for the physics collaborator.
    pub fn knockback_direction(&self, dealer_pos: Vec2, target_pos: Vec2, multiplier: f32) -> Vec2 {
        if self.knockback != Vec2::ZERO {
            return self.knockback.normalize() * multiplier;
        }
        (target_pos - dealer_pos).normalize_or_zero() * multiplier
    }
}
