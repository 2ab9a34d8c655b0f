//! Boss Combat Core Library
//!
//! This crate provides the boss combat AI for a 2D action platformer:
//! - Health and damage resolution (invincibility windows, damage cooldown ledger)
//! - Phase state machine driven by health percentage
//! - Attack strategy catalog with seeded random selection
//! - Movement steering state machine (patrol/chase/retreat)
//! - Battle lifecycle orchestration (Idle/Battle/Dead)
//! - Bevy plugin driver for headless or hosted use

pub mod attacks;
pub mod boss;
pub mod collaborators;
pub mod combat;
pub mod config;
pub mod constants;
pub mod events;
pub mod health;
pub mod logging;
pub mod movement;
pub mod phase;
pub mod plugin;
