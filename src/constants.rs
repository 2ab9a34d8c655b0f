//! Centralized tuning constants for the boss combat core.
//!
//! Eliminates magic numbers duplicated across combat, movement and the
//! orchestrator. Per-module defaults that only one module cares about stay in
//! that module as the single source of truth.

// =====================================================
// Health / damage
// =====================================================

/// Invincibility window after a damaging hit (seconds)
pub const DEFAULT_INVINCIBILITY_DURATION: f32 = 0.5;

/// Per-(dealer,target) damage cooldown - suppresses repeat contact damage
pub const DEFAULT_DAMAGE_COOLDOWN: f32 = 0.5;

/// Critical multiplier applied when a request is flagged critical
pub const DEFAULT_CRITICAL_MULTIPLIER: f32 = 2.0;

/// Scale applied to derived knockback directions
pub const DEFAULT_KNOCKBACK_MULTIPLIER: f32 = 1.0;

// =====================================================
// Attacks
// =====================================================

/// Cadence of the orchestrator's attack-decision timer (seconds)
pub const DEFAULT_ATTACK_DECISION_INTERVAL: f32 = 1.0;

/// Execution window of the default melee swing (seconds)
pub const DEFAULT_MELEE_DURATION: f32 = 0.5;

/// Radius of the melee overlap query
pub const DEFAULT_MELEE_RADIUS: f32 = 1.5;

/// Forward offset of the melee overlap query from the boss position
pub const DEFAULT_MELEE_OFFSET_X: f32 = 1.0;

/// Impulse magnitude handed to the physics collaborator per melee hit
pub const DEFAULT_MELEE_KNOCKBACK: f32 = 5.0;

// =====================================================
// Movement
// =====================================================

/// Chase stops (and the boss faces the target) inside this distance
pub const DEFAULT_STOPPING_DISTANCE: f32 = 1.5;

/// Patrol oscillation half-width around the recorded center
pub const DEFAULT_PATROL_RANGE: f32 = 3.0;

/// Pause at a patrol bound before flipping direction (seconds)
pub const DEFAULT_PATROL_WAIT: f32 = 2.0;

/// Patrol moves at this fraction of base speed
pub const PATROL_SPEED_FACTOR: f32 = 0.5;

/// MoveTo counts as arrived within this distance of the destination
pub const DEFAULT_ARRIVE_THRESHOLD: f32 = 0.5;

/// Length of the downward ground probe from the collider base
pub const DEFAULT_GROUND_CHECK_DISTANCE: f32 = 0.3;

/// Steepest surface still classified as ground (normal angle from vertical)
pub const DEFAULT_MAX_GROUND_ANGLE_DEG: f32 = 60.0;

// =====================================================
// Phases
// =====================================================

/// Chase/patrol speed bonus per phase past the first: 1.0 + (phase-1) * bonus
pub const PHASE_SPEED_BONUS: f32 = 0.2;
