//! Battle lifecycle and the per-tick decision loop.
//!
//! The orchestrator owns every combat component and is the only writer of
//! [`BattleState`]. All collaborators arrive through [`TickContext`] at tick
//! time, never at construction, so tests drive it with plain stubs and the
//! Bevy plugin with real ECS queries.
//!
//! Lifecycle: Idle -> Battle (`start_battle`, idempotent) -> Idle
//! (`end_battle`) or -> Dead on lethal damage. Dead is terminal: battle
//! resources (camera, movement, executing attacks) are released on the spot,
//! but the state never reverts to Idle.

use bevy::prelude::Vec2;

use crate::attacks::{AttackCatalog, AttackContext, AttackSpec, AttackStrategy, MeleeAttack};
use crate::collaborators::{CameraService, CombatWorld, GroundProbe, TargetId};
use crate::combat::{DamageFilter, DamageResolver};
use crate::config::{BossConfig, ConfigError};
use crate::constants::{
    DEFAULT_ATTACK_DECISION_INTERVAL, DEFAULT_MELEE_DURATION, PHASE_SPEED_BONUS,
};
use crate::events::{BossEvent, EventBus, SubscriberId};
use crate::health::{HealthEvent, HealthResource};
use crate::movement::{MovementController, MovementParams};
use crate::phase::{PhaseController, PhaseThresholds};

/// Top-level boss state. Gates whether the decision loop runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleState {
    Idle,
    Battle,
    Dead,
}

/// Collaborators handed to the orchestrator each sample tick.
pub struct TickContext<'a> {
    pub world: &'a mut dyn CombatWorld,
    pub camera: &'a mut dyn CameraService,
    pub boss_position: Vec2,
}

pub struct BossOrchestrator {
    name: String,
    attack_distance: f32,
    chase_distance: f32,
    state: BattleState,
    health: HealthResource,
    phase: PhaseController,
    resolver: DamageResolver,
    catalog: AttackCatalog,
    movement: MovementController,
    events: EventBus,
    decision_interval: f32,
    decision_timer: f32,
}

impl BossOrchestrator {
    /// Build a boss from a validated config. The default melee swing is
    /// registered from the config's attack numbers; further strategies go
    /// through [`BossOrchestrator::register_attack`]. `seed` fixes the attack
    /// selection sequence.
    pub fn new(boss_id: TargetId, config: &BossConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let thresholds = PhaseThresholds::new(config.phase1_threshold, config.phase2_threshold)?;

        let mut catalog = AttackCatalog::new(seed);
        catalog.register(Box::new(MeleeAttack::new(AttackSpec {
            name: "melee".into(),
            damage: config.attack_damage,
            min_range: 0.0,
            max_range: config.attack_range,
            cooldown: config.attack_cooldown,
            duration: DEFAULT_MELEE_DURATION,
            phases: vec![],
        })));

        let movement = MovementController::new(MovementParams {
            move_speed: config.move_speed,
            jump_force: config.jump_force,
            retreat_distance: config.retreat_distance,
            ..Default::default()
        });

        tracing::info!(name = %config.name, max_health = config.max_health, "boss created");
        Ok(Self {
            name: config.name.clone(),
            attack_distance: config.attack_distance,
            chase_distance: config.chase_distance,
            state: BattleState::Idle,
            health: HealthResource::new(config.max_health),
            phase: PhaseController::new(thresholds),
            resolver: DamageResolver::new(boss_id, config.tag.clone(), DamageFilter::default()),
            catalog,
            movement,
            events: EventBus::new(),
            decision_interval: DEFAULT_ATTACK_DECISION_INTERVAL,
            decision_timer: DEFAULT_ATTACK_DECISION_INTERVAL,
        })
    }

    pub fn state(&self) -> BattleState {
        self.state
    }

    pub fn current_phase(&self) -> u8 {
        self.phase.current_phase()
    }

    /// Aggro radius; encounter triggers compare target distance against this.
    pub fn aggro_distance(&self) -> f32 {
        self.chase_distance
    }

    pub fn health(&self) -> &HealthResource {
        &self.health
    }

    /// Incoming damage (the player hitting the boss) goes straight through
    /// this; resulting events are published on the next sample tick.
    pub fn health_mut(&mut self) -> &mut HealthResource {
        &mut self.health
    }

    pub fn movement(&self) -> &MovementController {
        &self.movement
    }

    pub fn resolver_mut(&mut self) -> &mut DamageResolver {
        &mut self.resolver
    }

    pub fn register_attack(&mut self, attack: Box<dyn AttackStrategy>) {
        self.catalog.register(attack);
    }

    pub fn subscribe(
        &mut self,
        handler: impl FnMut(&BossEvent) + Send + Sync + 'static,
    ) -> SubscriberId {
        self.events.subscribe(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Enter Battle. Idempotent while already fighting; rejected once dead.
    pub fn start_battle(&mut self, camera: &mut dyn CameraService) {
        match self.state {
            BattleState::Battle => return,
            BattleState::Dead => {
                tracing::warn!(name = %self.name, "start_battle rejected: boss is dead");
                return;
            }
            BattleState::Idle => {}
        }
        tracing::info!(name = %self.name, "battle started");
        self.state = BattleState::Battle;
        self.decision_timer = self.decision_interval;
        camera.switch_to_boss_battle(self.resolver.dealer());
        self.events.publish(&BossEvent::BattleStarted {
            name: self.name.clone(),
        });
    }

    /// Leave Battle back to Idle. No-op from any other state.
    pub fn end_battle(&mut self, camera: &mut dyn CameraService) {
        if self.state != BattleState::Battle {
            return;
        }
        tracing::info!(name = %self.name, "battle ended");
        self.state = BattleState::Idle;
        self.release_battle_resources(camera);
        self.events.publish(&BossEvent::BattleEnded {
            name: self.name.clone(),
        });
    }

    /// Stop every executing attack, halt movement, hand the camera back.
    fn release_battle_resources(&mut self, camera: &mut dyn CameraService) {
        self.catalog.stop_all();
        self.movement.stop();
        camera.switch_to_exploration();
    }

    /// Sample-phase tick: advance timers, publish pending health events, run
    /// the decision loop. Call once per variable-dt frame.
    pub fn tick(&mut self, dt: f32, ctx: &mut TickContext<'_>) {
        if self.state == BattleState::Dead {
            return;
        }

        self.health.tick(dt);
        self.resolver.tick(dt);
        self.catalog.tick(dt);

        self.publish_health_events(ctx.camera);

        if self.state == BattleState::Battle {
            self.run_decision_loop(dt, ctx);
        }
    }

    /// Fixed-phase tick: one horizontal velocity intent for the physics step.
    pub fn fixed_tick(
        &mut self,
        dt: f32,
        position: Vec2,
        target: Option<Vec2>,
        probe: &dyn GroundProbe,
    ) -> f32 {
        if self.state == BattleState::Dead {
            return 0.0;
        }
        self.movement.fixed_tick(dt, position, target, probe)
    }

    fn publish_health_events(&mut self, camera: &mut dyn CameraService) {
        for event in self.health.drain_events() {
            match event {
                HealthEvent::Changed { current, max } => {
                    self.events.publish(&BossEvent::HealthChanged { current, max });
                    if let Some((old_phase, new_phase)) = self.phase.on_health_changed(current, max)
                    {
                        self.movement
                            .set_speed_multiplier(1.0 + PHASE_SPEED_BONUS * (new_phase - 1) as f32);
                        self.events
                            .publish(&BossEvent::PhaseChanged { old_phase, new_phase });
                    }
                }
                HealthEvent::Healed { current, max } => {
                    self.events.publish(&BossEvent::Healed { current, max });
                }
                HealthEvent::Revived { current, max } => {
                    self.events.publish(&BossEvent::Revived { current, max });
                }
                HealthEvent::Died => {
                    self.events.publish(&BossEvent::Death);
                    self.handle_death(camera);
                }
            }
        }
    }

    /// Dead is terminal, but battle resources are still released so the
    /// camera and movement never stay captured by a corpse.
    fn handle_death(&mut self, camera: &mut dyn CameraService) {
        tracing::info!(name = %self.name, "boss defeated");
        let was_in_battle = self.state == BattleState::Battle;
        self.state = BattleState::Dead;
        self.release_battle_resources(camera);
        if was_in_battle {
            self.events.publish(&BossEvent::BattleEnded {
                name: self.name.clone(),
            });
        }
        self.events.publish(&BossEvent::Defeated {
            name: self.name.clone(),
        });
    }

    /// Attacks are never interrupted by movement: while one executes the boss
    /// stands still and no new attack is selected.
    fn run_decision_loop(&mut self, dt: f32, ctx: &mut TickContext<'_>) {
        if self.catalog.any_executing() {
            self.movement.stop();
            return;
        }

        let Some(target) = ctx.world.primary_target() else {
            self.movement.stop();
            return;
        };
        let distance = ctx.boss_position.distance(target.position);

        self.decision_timer -= dt;
        if self.decision_timer <= 0.0 {
            self.decision_timer = self.decision_interval;
            let mut attack_ctx = AttackContext {
                resolver: &mut self.resolver,
                world: &mut *ctx.world,
                boss_position: ctx.boss_position,
                facing_right: self.movement.facing_right(),
            };
            if let Some(name) = self
                .catalog
                .try_select(distance, self.phase.current_phase(), &mut attack_ctx)
            {
                tracing::debug!(attack = name, distance, "attack selected");
                self.movement.stop();
                return;
            }
        }

        if distance > self.attack_distance {
            self.movement.start_chase();
        } else {
            self.movement.stop();
        }
    }
}

impl std::fmt::Debug for BossOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BossOrchestrator")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("phase", &self.phase.current_phase())
            .field("health", &self.health.current())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::collaborators::{GroundHit, TargetSnapshot, TargetView};
    use crate::movement::MoveState;

    const BOSS: TargetId = TargetId::from_raw(1);
    const PLAYER: TargetId = TargetId::from_raw(2);

    struct StubWorld {
        player_position: Option<Vec2>,
        player_health: HealthResource,
        impulses: Vec<(TargetId, Vec2)>,
    }

    impl StubWorld {
        fn with_player_at(position: Vec2) -> Self {
            Self {
                player_position: Some(position),
                player_health: HealthResource::new(100.0).with_invincibility(false, 0.0),
                impulses: vec![],
            }
        }

        fn empty() -> Self {
            Self {
                player_position: None,
                player_health: HealthResource::new(100.0),
                impulses: vec![],
            }
        }

        fn primary_position(&self) -> Option<Vec2> {
            self.player_position
        }
    }

    impl CombatWorld for StubWorld {
        fn primary_target(&self) -> Option<TargetSnapshot> {
            self.player_position.map(|position| TargetSnapshot {
                id: PLAYER,
                position,
            })
        }

        fn for_each_in_circle(
            &mut self,
            center: Vec2,
            radius: f32,
            f: &mut dyn FnMut(&mut TargetView<'_>),
        ) {
            if let Some(position) = self.player_position {
                if position.distance(center) <= radius {
                    f(&mut TargetView {
                        id: PLAYER,
                        tag: "Player",
                        layer: 0,
                        position,
                        health: &mut self.player_health,
                    });
                }
            }
        }

        fn apply_impulse(&mut self, target: TargetId, impulse: Vec2) {
            self.impulses.push((target, impulse));
        }
    }

    #[derive(Default)]
    struct StubCamera {
        calls: Vec<&'static str>,
    }

    impl CameraService for StubCamera {
        fn switch_to_boss_battle(&mut self, _target: TargetId) {
            self.calls.push("battle");
        }

        fn switch_to_exploration(&mut self) {
            self.calls.push("exploration");
        }
    }

    struct NoGround;

    impl GroundProbe for NoGround {
        fn probe_ground(&self, _origin: Vec2, _max_distance: f32) -> Option<GroundHit> {
            None
        }
    }

    fn boss() -> BossOrchestrator {
        BossOrchestrator::new(BOSS, &BossConfig::default(), 42).unwrap()
    }

    fn recording(boss: &mut BossOrchestrator) -> Arc<Mutex<Vec<BossEvent>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        boss.subscribe(move |ev| sink.lock().unwrap().push(ev.clone()));
        log
    }

    #[test]
    fn test_invalid_config_disables_boss() {
        let config = BossConfig {
            max_health: -5.0,
            ..Default::default()
        };
        assert!(BossOrchestrator::new(BOSS, &config, 0).is_err());
    }

    #[test]
    fn test_start_battle_is_idempotent() {
        let mut boss = boss();
        let log = recording(&mut boss);
        let mut camera = StubCamera::default();
        boss.start_battle(&mut camera);
        boss.start_battle(&mut camera);
        assert_eq!(boss.state(), BattleState::Battle);
        assert_eq!(camera.calls, vec!["battle"]);
        let started = log
            .lock()
            .unwrap()
            .iter()
            .filter(|e| matches!(e, BossEvent::BattleStarted { .. }))
            .count();
        assert_eq!(started, 1);
    }

    #[test]
    fn test_end_battle_returns_to_idle_and_releases_camera() {
        let mut boss = boss();
        let log = recording(&mut boss);
        let mut camera = StubCamera::default();
        boss.start_battle(&mut camera);
        boss.end_battle(&mut camera);
        assert_eq!(boss.state(), BattleState::Idle);
        assert_eq!(camera.calls, vec!["battle", "exploration"]);
        assert!(log
            .lock()
            .unwrap()
            .iter()
            .any(|e| matches!(e, BossEvent::BattleEnded { .. })));
    }

    #[test]
    fn test_lethal_damage_makes_dead_terminal() {
        let mut boss = boss();
        let log = recording(&mut boss);
        let mut world = StubWorld::with_player_at(Vec2::new(1.0, 0.0));
        let mut camera = StubCamera::default();
        boss.start_battle(&mut camera);

        boss.health_mut().take_damage(10_000.0, PLAYER, true);
        boss.tick(0.02, &mut TickContext {
            world: &mut world,
            camera: &mut camera,
            boss_position: Vec2::ZERO,
        });

        assert_eq!(boss.state(), BattleState::Dead);
        assert_eq!(camera.calls, vec!["battle", "exploration"]);

        // Lifecycle order: Death, then BattleEnded, then Defeated.
        let tail: Vec<BossEvent> = log
            .lock()
            .unwrap()
            .iter()
            .filter(|e| {
                matches!(
                    e,
                    BossEvent::Death | BossEvent::BattleEnded { .. } | BossEvent::Defeated { .. }
                )
            })
            .cloned()
            .collect();
        assert!(matches!(tail[0], BossEvent::Death));
        assert!(matches!(tail[1], BossEvent::BattleEnded { .. }));
        assert!(matches!(tail[2], BossEvent::Defeated { .. }));

        // Terminal: no restart, no further ticks do anything.
        boss.start_battle(&mut camera);
        assert_eq!(boss.state(), BattleState::Dead);
    }

    #[test]
    fn test_decision_loop_chases_distant_target() {
        let mut boss = boss();
        let mut world = StubWorld::with_player_at(Vec2::new(8.0, 0.0));
        let mut camera = StubCamera::default();
        boss.start_battle(&mut camera);
        boss.tick(0.02, &mut TickContext {
            world: &mut world,
            camera: &mut camera,
            boss_position: Vec2::ZERO,
        });
        assert_eq!(*boss.movement().state(), MoveState::Chase);
    }

    #[test]
    fn test_decision_loop_waits_inside_attack_distance() {
        let mut boss = boss();
        let mut world = StubWorld::with_player_at(Vec2::new(1.0, 0.0));
        let mut camera = StubCamera::default();
        boss.start_battle(&mut camera);
        // Small dt: decision timer has not elapsed, so no attack starts.
        boss.tick(0.02, &mut TickContext {
            world: &mut world,
            camera: &mut camera,
            boss_position: Vec2::ZERO,
        });
        assert_eq!(*boss.movement().state(), MoveState::Idle);
    }

    #[test]
    fn test_attack_fires_after_decision_interval() {
        let mut boss = boss();
        let mut world = StubWorld::with_player_at(Vec2::new(1.0, 0.0));
        let mut camera = StubCamera::default();
        boss.start_battle(&mut camera);

        boss.tick(1.1, &mut TickContext {
            world: &mut world,
            camera: &mut camera,
            boss_position: Vec2::ZERO,
        });
        assert_eq!(
            world.player_health.current(),
            80.0,
            "default melee swing landed"
        );
        assert_eq!(world.impulses.len(), 1);
    }

    #[test]
    fn test_executing_attack_freezes_movement() {
        let mut boss = boss();
        let mut world = StubWorld::with_player_at(Vec2::new(1.0, 0.0));
        let mut camera = StubCamera::default();
        boss.start_battle(&mut camera);

        // Start the melee swing, then pull the player far away mid-swing.
        boss.tick(1.1, &mut TickContext {
            world: &mut world,
            camera: &mut camera,
            boss_position: Vec2::ZERO,
        });
        world.player_position = Some(Vec2::new(20.0, 0.0));
        boss.tick(0.1, &mut TickContext {
            world: &mut world,
            camera: &mut camera,
            boss_position: Vec2::ZERO,
        });
        assert_eq!(
            *boss.movement().state(),
            MoveState::Idle,
            "no chase while an attack is executing"
        );
    }

    #[test]
    fn test_no_target_stops_decision_loop() {
        let mut boss = boss();
        let mut world = StubWorld::empty();
        let mut camera = StubCamera::default();
        boss.start_battle(&mut camera);
        boss.tick(1.1, &mut TickContext {
            world: &mut world,
            camera: &mut camera,
            boss_position: Vec2::ZERO,
        });
        assert_eq!(*boss.movement().state(), MoveState::Idle);
    }

    #[test]
    fn test_phase_change_published_and_speeds_up_movement() {
        let mut boss = boss();
        let log = recording(&mut boss);
        let mut world = StubWorld::with_player_at(Vec2::new(8.0, 0.0));
        let mut camera = StubCamera::default();
        boss.start_battle(&mut camera);

        // 1000 -> 650 crosses the 0.7 threshold into phase 2.
        boss.health_mut().take_damage(350.0, PLAYER, true);
        boss.tick(0.02, &mut TickContext {
            world: &mut world,
            camera: &mut camera,
            boss_position: Vec2::ZERO,
        });
        assert_eq!(boss.current_phase(), 2);
        assert!(log.lock().unwrap().iter().any(|e| matches!(
            e,
            BossEvent::PhaseChanged {
                old_phase: 1,
                new_phase: 2
            }
        )));

        // Chase velocity now carries the +20% phase bonus.
        let target = world.primary_position();
        let vx = boss.fixed_tick(0.02, Vec2::ZERO, target, &NoGround);
        assert!((vx - 3.0 * 1.2).abs() < 1e-5);
    }

    #[test]
    fn test_fixed_tick_is_inert_when_dead() {
        let mut boss = boss();
        let mut world = StubWorld::with_player_at(Vec2::new(8.0, 0.0));
        let mut camera = StubCamera::default();
        boss.start_battle(&mut camera);
        boss.health_mut().take_damage(10_000.0, PLAYER, true);
        boss.tick(0.02, &mut TickContext {
            world: &mut world,
            camera: &mut camera,
            boss_position: Vec2::ZERO,
        });
        assert_eq!(boss.fixed_tick(0.02, Vec2::ZERO, world.primary_position(), &NoGround), 0.0);
    }
}
