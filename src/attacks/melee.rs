//! Melee swing: one overlap circle at activation, damage plus knockback for
//! every valid hit found at that instant.

use bevy::prelude::Vec2;

use crate::combat::DamageRequest;
use crate::constants::{DEFAULT_MELEE_KNOCKBACK, DEFAULT_MELEE_OFFSET_X, DEFAULT_MELEE_RADIUS};

use super::{AttackBase, AttackContext, AttackSpec, AttackStrategy};

pub struct MeleeAttack {
    base: AttackBase,
    /// Offset of the swing circle from the boss position; x flips with facing.
    offset: Vec2,
    radius: f32,
    knockback_force: f32,
}

impl MeleeAttack {
    pub fn new(spec: AttackSpec) -> Self {
        Self {
            base: AttackBase::new(spec),
            offset: Vec2::new(DEFAULT_MELEE_OFFSET_X, 0.0),
            radius: DEFAULT_MELEE_RADIUS,
            knockback_force: DEFAULT_MELEE_KNOCKBACK,
        }
    }

    pub fn with_shape(mut self, offset: Vec2, radius: f32) -> Self {
        self.offset = offset;
        self.radius = radius;
        self
    }

    pub fn with_knockback_force(mut self, force: f32) -> Self {
        self.knockback_force = force;
        self
    }
}

impl AttackStrategy for MeleeAttack {
    fn base(&self) -> &AttackBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AttackBase {
        &mut self.base
    }

    fn execute(&mut self, ctx: &mut AttackContext<'_>) {
        let mut offset = self.offset;
        if !ctx.facing_right {
            offset.x = -offset.x;
        }
        let center = ctx.boss_position + offset;
        let boss_position = ctx.boss_position;
        let damage = self.base.spec().damage;
        let knockback_force = self.knockback_force;

        let resolver = &mut *ctx.resolver;
        let world = &mut *ctx.world;
        let mut impulses = Vec::new();
        world.for_each_in_circle(center, self.radius, &mut |target| {
            let request = DamageRequest::new(damage, resolver.dealer());
            let impulse =
                (target.position - boss_position).normalize_or_zero() * knockback_force;
            if resolver.deal_damage(target, &request) {
                tracing::debug!(target = target.id.to_raw(), damage, "melee hit");
                impulses.push((target.id, impulse));
            }
        });
        for (target, impulse) in impulses {
            world.apply_impulse(target, impulse);
        }
    }
}
