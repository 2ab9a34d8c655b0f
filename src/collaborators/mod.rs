//! Capabilities the combat core consumes from its host.
//!
//! The core never performs spatial broad-phase, camera work or entity lookup
//! itself. A driver (see [`crate::plugin`] for the Bevy one) implements these
//! traits and hands them to the orchestrator at tick time. Everything here is
//! synchronous; no trait method may block.

use bevy::prelude::{Entity, Vec2};
use serde::{Deserialize, Serialize};

use crate::health::HealthResource;

/// Stable identity for a damageable entity.
///
/// Wraps a generational id (on the Bevy side, [`Entity::to_bits`]), so a
/// cooldown-ledger entry keyed by it can never dangle: once the underlying
/// entity is despawned the id simply stops matching anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetId(u64);

impl TargetId {
    pub const fn from_raw(bits: u64) -> Self {
        Self(bits)
    }

    pub const fn to_raw(self) -> u64 {
        self.0
    }
}

impl From<Entity> for TargetId {
    fn from(entity: Entity) -> Self {
        Self(entity.to_bits())
    }
}

/// Position snapshot of the boss's current chase/attack target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetSnapshot {
    pub id: TargetId,
    pub position: Vec2,
}

/// Result of a downward ground probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundHit {
    /// Surface normal at the hit point.
    pub normal: Vec2,
    /// Distance from the probe origin to the surface.
    pub distance: f32,
}

/// Mutable view of one damageable entity inside an overlap query.
///
/// Borrowed per callback invocation; the resolver writes through `health` and
/// reads the rest for filtering.
pub struct TargetView<'a> {
    pub id: TargetId,
    pub tag: &'a str,
    pub layer: u32,
    pub position: Vec2,
    pub health: &'a mut HealthResource,
}

/// Downward geometric probe, excluding the probing entity's own collider.
pub trait GroundProbe {
    fn probe_ground(&self, origin: Vec2, max_distance: f32) -> Option<GroundHit>;
}

/// Overlap queries and target access, backed by the host's physics/ECS.
pub trait CombatWorld {
    /// The entity the boss chases and attacks, if one exists.
    fn primary_target(&self) -> Option<TargetSnapshot>;

    /// Invoke `f` for every damageable entity within `radius` of `center`,
    /// excluding the boss itself.
    fn for_each_in_circle(
        &mut self,
        center: Vec2,
        radius: f32,
        f: &mut dyn FnMut(&mut TargetView<'_>),
    );

    /// Hand a knockback impulse to the physics collaborator. Advisory: the
    /// core computes the vector, the host decides how to apply it.
    fn apply_impulse(&mut self, target: TargetId, impulse: Vec2);
}

/// Camera framing collaborator.
pub trait CameraService {
    fn switch_to_boss_battle(&mut self, target: TargetId);
    fn switch_to_exploration(&mut self);
}
