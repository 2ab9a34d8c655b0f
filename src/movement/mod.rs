//! Boss steering state machine.
//!
//! One variant is active at a time and a transition replaces it wholesale.
//! `fixed_tick` computes exactly one horizontal velocity intent per fixed
//! tick - the driver applies it, keeping chase speed frame-rate-independent
//! no matter how many sample ticks ran in between. This is a steering policy,
//! not a planner: no pathfinding, no navmesh.

use bevy::prelude::Vec2;

use crate::collaborators::GroundProbe;
use crate::constants::{
    DEFAULT_ARRIVE_THRESHOLD, DEFAULT_GROUND_CHECK_DISTANCE, DEFAULT_MAX_GROUND_ANGLE_DEG,
    DEFAULT_PATROL_RANGE, DEFAULT_PATROL_WAIT, DEFAULT_STOPPING_DISTANCE, PATROL_SPEED_FACTOR,
};

/// Active steering variant.
#[derive(Debug, Clone, PartialEq)]
pub enum MoveState {
    Idle,
    Patrol {
        center: Vec2,
        direction: f32,
        wait_timer: f32,
    },
    Chase,
    Retreat,
    MoveTo {
        destination: Vec2,
    },
}

/// Movement tuning, fixed at construction from the boss config.
#[derive(Debug, Clone)]
pub struct MovementParams {
    pub move_speed: f32,
    pub jump_force: f32,
    pub stopping_distance: f32,
    pub patrol_range: f32,
    pub patrol_wait: f32,
    pub retreat_distance: f32,
    pub arrive_threshold: f32,
    pub ground_check_distance: f32,
    pub max_ground_angle_deg: f32,
}

impl Default for MovementParams {
    fn default() -> Self {
        Self {
            move_speed: 3.0,
            jump_force: 5.0,
            stopping_distance: DEFAULT_STOPPING_DISTANCE,
            patrol_range: DEFAULT_PATROL_RANGE,
            patrol_wait: DEFAULT_PATROL_WAIT,
            retreat_distance: 5.0,
            arrive_threshold: DEFAULT_ARRIVE_THRESHOLD,
            ground_check_distance: DEFAULT_GROUND_CHECK_DISTANCE,
            max_ground_angle_deg: DEFAULT_MAX_GROUND_ANGLE_DEG,
        }
    }
}

type ArriveCallback = Box<dyn FnOnce() + Send + Sync>;

pub struct MovementController {
    params: MovementParams,
    state: MoveState,
    speed_multiplier: f32,
    facing_right: bool,
    grounded: bool,
    on_arrive: Option<ArriveCallback>,
}

impl MovementController {
    pub fn new(params: MovementParams) -> Self {
        Self {
            params,
            state: MoveState::Idle,
            speed_multiplier: 1.0,
            facing_right: true,
            grounded: false,
            on_arrive: None,
        }
    }

    pub fn state(&self) -> &MoveState {
        &self.state
    }

    pub fn facing_right(&self) -> bool {
        self.facing_right
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// Hook for phase transitions: scales chase/patrol/retreat speed.
    pub fn set_speed_multiplier(&mut self, multiplier: f32) {
        self.speed_multiplier = multiplier.max(0.0);
    }

    pub fn start_chase(&mut self) {
        self.transition(MoveState::Chase);
    }

    /// Patrol oscillates around `center`, starting rightward.
    pub fn start_patrol(&mut self, center: Vec2) {
        self.transition(MoveState::Patrol {
            center,
            direction: 1.0,
            wait_timer: 0.0,
        });
    }

    pub fn stop(&mut self) {
        self.transition(MoveState::Idle);
    }

    pub fn retreat(&mut self) {
        self.transition(MoveState::Retreat);
    }

    /// Walk to `destination`; `on_arrive` fires exactly once on completion.
    pub fn move_to(&mut self, destination: Vec2, on_arrive: Option<ArriveCallback>) {
        self.on_arrive = on_arrive;
        self.transition(MoveState::MoveTo { destination });
    }

    fn transition(&mut self, new_state: MoveState) {
        if self.state == new_state {
            return;
        }
        tracing::debug!(from = ?self.state, to = ?new_state, "move state changed");
        // An abandoned MoveTo never fires its callback.
        if !matches!(new_state, MoveState::MoveTo { .. }) {
            self.on_arrive = None;
        }
        self.state = new_state;
    }

    /// Jump impulse if grounded; airborne requests are silently rejected.
    pub fn jump(&mut self) -> Option<f32> {
        if self.grounded {
            Some(self.params.jump_force)
        } else {
            tracing::debug!("jump rejected: airborne");
            None
        }
    }

    fn speed(&self) -> f32 {
        self.params.move_speed * self.speed_multiplier
    }

    fn face(&mut self, from: Vec2, toward: Vec2) {
        if toward.x != from.x {
            self.facing_right = toward.x > from.x;
        }
    }

    /// Compute this fixed tick's horizontal velocity intent from the current
    /// state, and refresh the grounded flag from a downward probe.
    pub fn fixed_tick(
        &mut self,
        dt: f32,
        position: Vec2,
        target: Option<Vec2>,
        probe: &dyn GroundProbe,
    ) -> f32 {
        self.check_ground(position, probe);

        match &mut self.state {
            MoveState::Idle => 0.0,

            MoveState::Patrol {
                center,
                direction,
                wait_timer,
            } => {
                let offset = position.x - center.x;
                let at_bound = offset.abs() >= self.params.patrol_range && offset * *direction > 0.0;
                if at_bound {
                    *wait_timer += dt;
                    if *wait_timer >= self.params.patrol_wait {
                        *direction = -*direction;
                        *wait_timer = 0.0;
                    }
                    0.0
                } else {
                    *wait_timer = 0.0;
                    let dir = *direction;
                    self.facing_right = dir > 0.0;
                    dir * self.speed() * PATROL_SPEED_FACTOR
                }
            }

            MoveState::Chase => {
                let Some(target) = target else {
                    self.transition(MoveState::Idle);
                    return 0.0;
                };
                self.face(position, target);
                if position.distance(target) <= self.params.stopping_distance {
                    return 0.0;
                }
                let dir = if target.x > position.x { 1.0 } else { -1.0 };
                dir * self.speed()
            }

            MoveState::Retreat => {
                let Some(target) = target else {
                    self.transition(MoveState::Idle);
                    return 0.0;
                };
                self.face(position, target);
                if position.distance(target) >= self.params.retreat_distance {
                    self.transition(MoveState::Idle);
                    return 0.0;
                }
                let dir = if target.x > position.x { -1.0 } else { 1.0 };
                dir * self.speed()
            }

            MoveState::MoveTo { destination } => {
                let destination = *destination;
                if position.distance(destination) <= self.params.arrive_threshold {
                    self.transition(MoveState::Idle);
                    if let Some(callback) = self.on_arrive.take() {
                        callback();
                    }
                    return 0.0;
                }
                self.face(position, destination);
                let dir = if destination.x > position.x { 1.0 } else { -1.0 };
                dir * self.speed()
            }
        }
    }

    /// A surface counts as ground only when its normal is within
    /// `max_ground_angle_deg` of vertical - floors, not near-vertical walls.
    fn check_ground(&mut self, position: Vec2, probe: &dyn GroundProbe) {
        let min_normal_y = self.params.max_ground_angle_deg.to_radians().cos();
        self.grounded = probe
            .probe_ground(position, self.params.ground_check_distance)
            .is_some_and(|hit| hit.normal.y >= min_normal_y);
    }
}

impl std::fmt::Debug for MovementController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MovementController")
            .field("state", &self.state)
            .field("speed_multiplier", &self.speed_multiplier)
            .field("grounded", &self.grounded)
            .finish()
    }
}
