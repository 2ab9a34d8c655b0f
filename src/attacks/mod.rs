//! Attack strategies and the catalog that selects between them.
//!
//! Every attack is a self-contained capability: range window, cooldown,
//! execution duration, phase eligibility and an effect that fires exactly
//! once at activation. Strategies are independent values behind
//! [`AttackStrategy`] in a strategy table, not a class hierarchy; the
//! catalog picks uniformly among eligible ones with an injected seedable RNG
//! so tests are deterministic.

use bevy::prelude::Vec2;
use serde::{Deserialize, Serialize};

use crate::collaborators::CombatWorld;
use crate::combat::DamageResolver;

pub mod catalog;
pub mod melee;

pub use catalog::AttackCatalog;
pub use melee::MeleeAttack;

/// Static tuning of one attack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackSpec {
    pub name: String,
    pub damage: f32,
    pub min_range: f32,
    pub max_range: f32,
    pub cooldown: f32,
    pub duration: f32,
    /// Phases this attack may be selected in; empty means all.
    pub phases: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackState {
    Ready,
    Executing,
}

/// Everything an attack effect may touch when it fires.
pub struct AttackContext<'a> {
    pub resolver: &'a mut DamageResolver,
    pub world: &'a mut dyn CombatWorld,
    pub boss_position: Vec2,
    pub facing_right: bool,
}

/// Shared timer/state plumbing embedded by every strategy.
#[derive(Debug, Clone)]
pub struct AttackBase {
    spec: AttackSpec,
    state: AttackState,
    cooldown_remaining: f32,
    execution_remaining: f32,
}

impl AttackBase {
    pub fn new(spec: AttackSpec) -> Self {
        Self {
            spec,
            state: AttackState::Ready,
            cooldown_remaining: 0.0,
            execution_remaining: 0.0,
        }
    }

    pub fn spec(&self) -> &AttackSpec {
        &self.spec
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn is_executing(&self) -> bool {
        self.state == AttackState::Executing
    }

    pub fn on_cooldown(&self) -> bool {
        self.cooldown_remaining > 0.0
    }

    pub fn can_execute(&self, distance: f32) -> bool {
        !self.on_cooldown()
            && self.state == AttackState::Ready
            && (self.spec.min_range..=self.spec.max_range).contains(&distance)
    }

    pub fn is_available_in_phase(&self, phase: u8) -> bool {
        self.spec.phases.is_empty() || self.spec.phases.contains(&phase)
    }

    /// Enter Executing and arm both timers.
    pub fn arm(&mut self) {
        self.state = AttackState::Executing;
        self.execution_remaining = self.spec.duration;
        self.cooldown_remaining = self.spec.cooldown;
    }

    /// Forcibly clear execution. Idempotent; does not refund the cooldown.
    pub fn stop(&mut self) {
        self.state = AttackState::Ready;
        self.execution_remaining = 0.0;
    }

    /// Count down timers; execution expiring clears Executing on its own.
    pub fn tick(&mut self, dt: f32) {
        if self.cooldown_remaining > 0.0 {
            self.cooldown_remaining = (self.cooldown_remaining - dt).max(0.0);
        }
        if self.is_executing() {
            self.execution_remaining -= dt;
            if self.execution_remaining <= 0.0 {
                self.execution_remaining = 0.0;
                self.state = AttackState::Ready;
            }
        }
    }
}

/// Capability interface every attack variant implements.
pub trait AttackStrategy: Send + Sync {
    fn base(&self) -> &AttackBase;
    fn base_mut(&mut self) -> &mut AttackBase;

    /// The attack's effect, invoked exactly once at activation - a melee
    /// swing performs its one overlap query here, not per tick.
    fn execute(&mut self, ctx: &mut AttackContext<'_>);

    fn name(&self) -> &str {
        self.base().name()
    }

    fn is_executing(&self) -> bool {
        self.base().is_executing()
    }

    fn can_execute(&self, distance: f32) -> bool {
        self.base().can_execute(distance)
    }

    fn is_available_in_phase(&self, phase: u8) -> bool {
        self.base().is_available_in_phase(phase)
    }

    fn start(&mut self, ctx: &mut AttackContext<'_>) {
        tracing::debug!(attack = self.name(), "attack started");
        self.base_mut().arm();
        self.execute(ctx);
    }

    fn stop(&mut self) {
        self.base_mut().stop();
    }

    fn tick(&mut self, dt: f32) {
        self.base_mut().tick(dt);
    }
}
