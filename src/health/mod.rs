//! Health pool with an invincibility window and an event outbox.
//!
//! All mutation goes through `take_damage` / `heal` / `revive` /
//! `set_max_health` / `reset`; the invariants `0 <= current <= max` and
//! `max > 0` hold after every call. Emitted events queue in an internal
//! outbox instead of invoking listeners directly - the owner drains the
//! outbox between mutations, so no listener ever runs inside `take_damage`
//! (see the re-entrancy rule on [`crate::events::EventBus`]).

use bevy::prelude::Component;

use crate::collaborators::TargetId;
use crate::constants::DEFAULT_INVINCIBILITY_DURATION;

/// Queued health notification, in emission order. `Revived` always precedes
/// the `Changed` from the same revival.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HealthEvent {
    Changed { current: f32, max: f32 },
    Healed { current: f32, max: f32 },
    Revived { current: f32, max: f32 },
    Died,
}

#[derive(Debug, Component)]
pub struct HealthResource {
    current: f32,
    max: f32,
    invincibility_enabled: bool,
    invincibility_duration: f32,
    invincibility_timer: f32,
    death_signaled: bool,
    outbox: Vec<HealthEvent>,
}

impl HealthResource {
    /// Full health pool of `max` (must be positive; enforced upstream by
    /// [`crate::config::BossConfig::validate`]).
    pub fn new(max: f32) -> Self {
        debug_assert!(max > 0.0, "health pool must be positive");
        Self {
            current: max,
            max,
            invincibility_enabled: true,
            invincibility_duration: DEFAULT_INVINCIBILITY_DURATION,
            invincibility_timer: 0.0,
            death_signaled: false,
            outbox: Vec::new(),
        }
    }

    pub fn with_invincibility(mut self, enabled: bool, duration: f32) -> Self {
        self.invincibility_enabled = enabled;
        self.invincibility_duration = duration.max(0.0);
        self
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn percentage(&self) -> f32 {
        self.current / self.max
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }

    pub fn is_alive(&self) -> bool {
        !self.is_dead()
    }

    /// Consumers poll this; the timer expiring produces no event.
    pub fn is_invincible(&self) -> bool {
        self.invincibility_enabled && self.invincibility_timer > 0.0
    }

    pub fn can_take_damage(&self) -> bool {
        self.can_take_damage_with(false)
    }

    pub(crate) fn can_take_damage_with(&self, ignore_invincibility: bool) -> bool {
        !self.is_dead() && (ignore_invincibility || !self.is_invincible())
    }

    /// Apply up to `amount` damage. Returns the damage actually dealt: 0 when
    /// already dead, or invincible without the override. A damaging hit opens
    /// the invincibility window; reaching 0 emits `Died` exactly once.
    pub fn take_damage(&mut self, amount: f32, source: TargetId, ignore_invincibility: bool) -> f32 {
        if !self.can_take_damage_with(ignore_invincibility) {
            tracing::debug!(
                dead = self.is_dead(),
                invincible = self.is_invincible(),
                "damage rejected"
            );
            return 0.0;
        }

        let actual = amount.max(0.0).min(self.current);
        self.current = (self.current - actual).max(0.0);
        tracing::debug!(source = source.to_raw(), actual, current = self.current, "took damage");

        if self.invincibility_enabled && actual > 0.0 {
            self.invincibility_timer = self.invincibility_duration;
        }

        self.outbox.push(HealthEvent::Changed {
            current: self.current,
            max: self.max,
        });
        if self.is_dead() && !self.death_signaled {
            self.death_signaled = true;
            self.outbox.push(HealthEvent::Died);
        }
        actual
    }

    /// Restore up to `amount`, clamped to max. Rejected entirely while dead.
    pub fn heal(&mut self, amount: f32) -> f32 {
        if self.is_dead() {
            tracing::debug!("heal rejected: dead");
            return 0.0;
        }
        let actual = amount.max(0.0).min(self.max - self.current);
        self.current = (self.current + actual).min(self.max);

        self.outbox.push(HealthEvent::Healed {
            current: self.current,
            max: self.max,
        });
        self.outbox.push(HealthEvent::Changed {
            current: self.current,
            max: self.max,
        });
        actual
    }

    /// Return from death at `max * clamp01(percentage)` health, at least 1.
    /// No-op unless currently dead. Clears invincibility. Emits `Revived`
    /// strictly before the matching `Changed`.
    pub fn revive(&mut self, percentage: f32) {
        if !self.is_dead() {
            tracing::debug!("revive rejected: not dead");
            return;
        }
        let pct = percentage.clamp(0.0, 1.0);
        self.current = (self.max * pct).max(1.0);
        self.invincibility_timer = 0.0;
        self.death_signaled = false;

        self.outbox.push(HealthEvent::Revived {
            current: self.current,
            max: self.max,
        });
        self.outbox.push(HealthEvent::Changed {
            current: self.current,
            max: self.max,
        });
    }

    /// Rescale the pool, preserving the current health percentage. Rejects
    /// non-positive values.
    pub fn set_max_health(&mut self, new_max: f32) {
        if new_max <= 0.0 {
            tracing::warn!(new_max, "set_max_health rejected: must be positive");
            return;
        }
        let pct = self.percentage();
        self.max = new_max;
        self.current = self.max * pct;
        self.outbox.push(HealthEvent::Changed {
            current: self.current,
            max: self.max,
        });
    }

    /// Back to full health, e.g. at encounter reset.
    pub fn reset(&mut self) {
        self.current = self.max;
        self.death_signaled = false;
        self.outbox.push(HealthEvent::Changed {
            current: self.current,
            max: self.max,
        });
    }

    /// Count down the invincibility window. Sample-phase only.
    pub fn tick(&mut self, dt: f32) {
        if self.invincibility_timer > 0.0 {
            self.invincibility_timer = (self.invincibility_timer - dt).max(0.0);
        }
    }

    /// Take every queued event, in emission order.
    pub fn drain_events(&mut self) -> Vec<HealthEvent> {
        std::mem::take(&mut self.outbox)
    }
}
