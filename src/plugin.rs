//! Bevy driver for the combat core.
//!
//! The core stays engine-agnostic; this module adapts it to an ECS schedule.
//! Update hosts the sample phase (timers, events, decision loop) and
//! FixedUpdate the physics phase (velocity intent, integration, knockback).
//! The boss's `Entity::to_bits` doubles as its stable [`TargetId`].

use bevy::prelude::*;

use crate::boss::{BattleState, BossOrchestrator, TickContext};
use crate::collaborators::{
    CameraService, CombatWorld, GroundHit, GroundProbe, TargetId, TargetSnapshot, TargetView,
};
use crate::config::{BossConfig, ConfigError};
use crate::health::HealthResource;
use crate::logging::init_tracing_default;

pub struct BossAiPlugin;

impl Plugin for BossAiPlugin {
    fn build(&self, app: &mut App) {
        init_tracing_default();
        app.init_resource::<CameraDirector>()
            .init_resource::<GroundGeometry>()
            .add_event::<KnockbackEvent>()
            .add_systems(Update, (battle_trigger_system, boss_sample_system).chain())
            .add_systems(
                FixedUpdate,
                (boss_fixed_system, knockback_system, apply_velocity_system).chain(),
            );
    }
}

#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct Position(pub Vec2);

#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct Velocity(pub Vec2);

/// Damage-filtering identity of an entity.
#[derive(Component, Debug, Clone)]
pub struct Combatant {
    pub tag: String,
    pub layer: u32,
}

/// Marks the entity the boss chases and attacks.
#[derive(Component, Debug, Default)]
pub struct PrimaryTarget;

/// The orchestrator, carried as a component on the boss entity.
#[derive(Component)]
pub struct BossHandle(pub BossOrchestrator);

/// Knockback computed by the core, applied to velocities a system later.
#[derive(Event, Debug, Clone, Copy)]
pub struct KnockbackEvent {
    pub target: TargetId,
    pub impulse: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraMode {
    #[default]
    Exploration,
    BossBattle,
}

/// Minimal camera collaborator: records the requested mode and focus; a
/// rendering host reads this resource to drive the real camera rig.
#[derive(Resource, Debug, Default)]
pub struct CameraDirector {
    pub mode: CameraMode,
    pub focus: Option<TargetId>,
}

impl CameraService for CameraDirector {
    fn switch_to_boss_battle(&mut self, target: TargetId) {
        self.mode = CameraMode::BossBattle;
        self.focus = Some(target);
    }

    fn switch_to_exploration(&mut self) {
        self.mode = CameraMode::Exploration;
        self.focus = None;
    }
}

/// Flat-floor ground collaborator. Hosts with real level geometry insert
/// their own probe-backed resource instead.
#[derive(Resource, Debug, Clone, Copy)]
pub struct GroundGeometry {
    pub floor_height: f32,
}

impl Default for GroundGeometry {
    fn default() -> Self {
        Self { floor_height: 0.0 }
    }
}

impl GroundProbe for GroundGeometry {
    fn probe_ground(&self, origin: Vec2, max_distance: f32) -> Option<GroundHit> {
        let distance = origin.y - self.floor_height;
        (distance <= max_distance).then_some(GroundHit {
            normal: Vec2::Y,
            distance: distance.max(0.0),
        })
    }
}

/// Spawn a boss entity from a validated config.
pub fn spawn_boss(
    commands: &mut Commands,
    config: &BossConfig,
    position: Vec2,
    seed: u64,
) -> Result<Entity, ConfigError> {
    let entity = commands.spawn_empty().id();
    let orchestrator = BossOrchestrator::new(entity.into(), config, seed)?;
    commands.entity(entity).insert((
        Position(position),
        Velocity(Vec2::ZERO),
        Combatant {
            tag: config.tag.clone(),
            layer: 0,
        },
        BossHandle(orchestrator),
    ));
    Ok(entity)
}

type TargetQuery<'w, 's> = Query<
    'w,
    's,
    (
        Entity,
        &'static Position,
        &'static Combatant,
        &'static mut HealthResource,
        Option<&'static PrimaryTarget>,
    ),
    Without<BossHandle>,
>;

/// [`CombatWorld`] over the live ECS queries of one sample tick.
struct EcsWorld<'a, 'w, 's, 'e> {
    targets: &'a mut TargetQuery<'w, 's>,
    knockback: &'a mut EventWriter<'e, KnockbackEvent>,
}

impl CombatWorld for EcsWorld<'_, '_, '_, '_> {
    fn primary_target(&self) -> Option<TargetSnapshot> {
        self.targets
            .iter()
            .find(|(_, _, _, health, primary)| primary.is_some() && health.is_alive())
            .map(|(entity, position, _, _, _)| TargetSnapshot {
                id: entity.into(),
                position: position.0,
            })
    }

    fn for_each_in_circle(
        &mut self,
        center: Vec2,
        radius: f32,
        f: &mut dyn FnMut(&mut TargetView<'_>),
    ) {
        for (entity, position, combatant, mut health, _) in self.targets.iter_mut() {
            if position.0.distance(center) <= radius {
                f(&mut TargetView {
                    id: entity.into(),
                    tag: &combatant.tag,
                    layer: combatant.layer,
                    position: position.0,
                    health: health.as_mut(),
                });
            }
        }
    }

    fn apply_impulse(&mut self, target: TargetId, impulse: Vec2) {
        self.knockback.send(KnockbackEvent { target, impulse });
    }
}

/// Encounter trigger: a primary target entering the aggro radius of an idle
/// boss starts the battle.
fn battle_trigger_system(
    mut camera: ResMut<CameraDirector>,
    mut bosses: Query<(&Position, &mut BossHandle)>,
    targets: Query<&Position, (With<PrimaryTarget>, Without<BossHandle>)>,
) {
    let Ok(target) = targets.get_single() else {
        return;
    };
    for (position, mut handle) in &mut bosses {
        let boss = &mut handle.0;
        if boss.state() == BattleState::Idle
            && position.0.distance(target.0) <= boss.aggro_distance()
        {
            boss.start_battle(camera.as_mut());
        }
    }
}

fn boss_sample_system(
    time: Res<Time>,
    mut camera: ResMut<CameraDirector>,
    mut knockback: EventWriter<KnockbackEvent>,
    mut bosses: Query<(&Position, &mut BossHandle)>,
    mut targets: TargetQuery,
) {
    let dt = time.delta_secs();
    for (position, mut handle) in &mut bosses {
        let mut world = EcsWorld {
            targets: &mut targets,
            knockback: &mut knockback,
        };
        let mut ctx = TickContext {
            world: &mut world,
            camera: camera.as_mut(),
            boss_position: position.0,
        };
        handle.0.tick(dt, &mut ctx);
    }
}

fn boss_fixed_system(
    time: Res<Time>,
    ground: Res<GroundGeometry>,
    mut bosses: Query<(&Position, &mut Velocity, &mut BossHandle)>,
    targets: Query<&Position, (With<PrimaryTarget>, Without<BossHandle>)>,
) {
    let dt = time.delta_secs();
    let target = targets.get_single().ok().map(|p| p.0);
    for (position, mut velocity, mut handle) in &mut bosses {
        velocity.0.x = handle.0.fixed_tick(dt, position.0, target, &*ground);
    }
}

fn knockback_system(
    mut events: EventReader<KnockbackEvent>,
    mut velocities: Query<&mut Velocity>,
) {
    for event in events.read() {
        let Ok(entity) = Entity::try_from_bits(event.target.to_raw()) else {
            continue;
        };
        if let Ok(mut velocity) = velocities.get_mut(entity) {
            velocity.0 += event.impulse;
        }
    }
}

/// Minimal integrator so the headless driver is self-contained; a host with
/// its own physics replaces this system.
fn apply_velocity_system(time: Res<Time>, mut movers: Query<(&mut Position, &Velocity)>) {
    let dt = time.delta_secs();
    for (mut position, velocity) in &mut movers {
        position.0 += velocity.0 * dt;
    }
}
