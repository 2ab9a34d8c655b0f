//! Damage resolution: target filtering, per-target cooldown, delegation to
//! the target's health pool.
//!
//! The resolver owns a monotonic clock (advanced in the sample phase) and a
//! cooldown ledger keyed by stable [`TargetId`]. Ledger entries are never
//! pruned automatically: the map is bounded by the number of distinct targets
//! this dealer ever hit, and a stale generational key can't dangle. Drivers
//! that despawn targets call [`DamageResolver::forget_target`] from their
//! despawn path; [`DamageResolver::clear_all_cooldowns`] resets between
//! encounters.

use std::collections::HashMap;

use bevy::prelude::Vec2;

use crate::collaborators::{TargetId, TargetView};
use crate::constants::{DEFAULT_DAMAGE_COOLDOWN, DEFAULT_KNOCKBACK_MULTIPLIER};

use super::DamageRequest;

/// Layer bitmask, `ALL` being the match-everything sentinel that bypasses
/// layer filtering entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const ALL: LayerMask = LayerMask(u32::MAX);

    pub fn contains(self, layer: u32) -> bool {
        self == Self::ALL || self.0 & (1u32 << (layer & 31)) != 0
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// Who this dealer is allowed to hurt.
#[derive(Debug, Clone)]
pub struct DamageFilter {
    /// Allow-list of target tags; empty accepts any tag.
    pub target_tags: Vec<String>,
    pub target_layers: LayerMask,
    /// Friendly fire prevention: reject targets sharing the dealer's tag.
    pub ignore_self_tag: bool,
}

impl Default for DamageFilter {
    fn default() -> Self {
        Self {
            target_tags: vec!["Player".into()],
            target_layers: LayerMask::ALL,
            ignore_self_tag: true,
        }
    }
}

pub struct DamageResolver {
    dealer: TargetId,
    dealer_tag: String,
    filter: DamageFilter,
    use_cooldown: bool,
    cooldown: f32,
    knockback_multiplier: f32,
    clock: f32,
    ledger: HashMap<TargetId, f32>,
}

impl DamageResolver {
    pub fn new(dealer: TargetId, dealer_tag: impl Into<String>, filter: DamageFilter) -> Self {
        Self {
            dealer,
            dealer_tag: dealer_tag.into(),
            filter,
            use_cooldown: true,
            cooldown: DEFAULT_DAMAGE_COOLDOWN,
            knockback_multiplier: DEFAULT_KNOCKBACK_MULTIPLIER,
            clock: 0.0,
            ledger: HashMap::new(),
        }
    }

    pub fn with_cooldown(mut self, enabled: bool, duration: f32) -> Self {
        self.use_cooldown = enabled;
        self.cooldown = duration.max(0.0);
        self
    }

    pub fn with_knockback_multiplier(mut self, multiplier: f32) -> Self {
        self.knockback_multiplier = multiplier;
        self
    }

    pub fn dealer(&self) -> TargetId {
        self.dealer
    }

    /// A despawned dealer's id may be recycled; keep the ledger key current.
    pub fn set_dealer(&mut self, dealer: TargetId) {
        self.dealer = dealer;
    }

    /// Advance the cooldown clock. Sample-phase only.
    pub fn tick(&mut self, dt: f32) {
        self.clock += dt;
    }

    /// Whether a hit on `target` could land right now, ignoring cooldown and
    /// the per-request invincibility override.
    pub fn can_damage(&self, target: &TargetView<'_>) -> bool {
        self.can_damage_with(target, false)
    }

    fn can_damage_with(&self, target: &TargetView<'_>, ignore_invincibility: bool) -> bool {
        target.health.can_take_damage_with(ignore_invincibility) && self.is_valid_target(target)
    }

    /// Filtering, in order: self, tag allow-list, own-tag friendly fire,
    /// layer mask.
    fn is_valid_target(&self, target: &TargetView<'_>) -> bool {
        if target.id == self.dealer {
            return false;
        }
        if !self.filter.target_tags.is_empty()
            && !self.filter.target_tags.iter().any(|t| t == target.tag)
        {
            return false;
        }
        if self.filter.ignore_self_tag && !self.dealer_tag.is_empty() && target.tag == self.dealer_tag
        {
            return false;
        }
        self.filter.target_layers.contains(target.layer)
    }

    /// Try to land `request` on `target`. Returns false, with no side
    /// effects, when the target is filtered out, cannot take damage, or is
    /// still on cooldown for this dealer. On a landed hit (actual damage
    /// > 0) the cooldown timestamp is recorded.
    pub fn deal_damage(&mut self, target: &mut TargetView<'_>, request: &DamageRequest) -> bool {
        if !self.can_damage_with(target, request.ignore_invincibility) {
            tracing::debug!(target = target.id.to_raw(), "deal_damage rejected by filter");
            return false;
        }
        if self.use_cooldown && self.on_cooldown(target.id) {
            tracing::debug!(target = target.id.to_raw(), "deal_damage rejected: on cooldown");
            return false;
        }

        let actual = target.health.take_damage(
            request.final_damage(),
            self.dealer,
            request.ignore_invincibility,
        );
        if actual > 0.0 && self.use_cooldown {
            self.ledger.insert(target.id, self.clock);
        }
        actual > 0.0
    }

    /// Knockback vector for a hit on a target at `target_pos`, per the
    /// request's explicit-vector-else-displacement rule. Advisory output.
    pub fn knockback_for(&self, dealer_pos: Vec2, target_pos: Vec2, request: &DamageRequest) -> Vec2 {
        request.knockback_direction(dealer_pos, target_pos, self.knockback_multiplier)
    }

    pub fn on_cooldown(&self, target: TargetId) -> bool {
        match self.ledger.get(&target) {
            Some(last_hit) => self.clock - last_hit < self.cooldown,
            None => false,
        }
    }

    /// Drop one target's cooldown entry.
    pub fn clear_cooldown(&mut self, target: TargetId) {
        self.ledger.remove(&target);
    }

    /// Drop every cooldown entry, e.g. when resetting an encounter.
    pub fn clear_all_cooldowns(&mut self) {
        self.ledger.clear();
    }

    /// Pruning hook for the driver's despawn path: the ledger never forgets
    /// on its own.
    pub fn forget_target(&mut self, target: TargetId) {
        self.ledger.remove(&target);
    }

    pub fn ledger_len(&self) -> usize {
        self.ledger.len()
    }
}

impl std::fmt::Debug for DamageResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DamageResolver")
            .field("dealer", &self.dealer)
            .field("dealer_tag", &self.dealer_tag)
            .field("ledger_entries", &self.ledger.len())
            .finish()
    }
}
