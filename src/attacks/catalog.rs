//! The boss's set of attacks and the uniform-random selection policy.

use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;

use super::{AttackContext, AttackStrategy};

pub struct AttackCatalog {
    attacks: Vec<Box<dyn AttackStrategy>>,
    rng: Xoshiro256StarStar,
}

impl AttackCatalog {
    /// Empty catalog with a seeded RNG; the same seed reproduces the same
    /// selection sequence.
    pub fn new(seed: u64) -> Self {
        Self {
            attacks: Vec::new(),
            rng: Xoshiro256StarStar::seed_from_u64(seed),
        }
    }

    pub fn register(&mut self, attack: Box<dyn AttackStrategy>) {
        self.attacks.push(attack);
    }

    pub fn len(&self) -> usize {
        self.attacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attacks.is_empty()
    }

    pub fn any_executing(&self) -> bool {
        self.attacks.iter().any(|a| a.is_executing())
    }

    /// Count down every attack's timers. Sample-phase only.
    pub fn tick(&mut self, dt: f32) {
        for attack in &mut self.attacks {
            attack.tick(dt);
        }
    }

    /// Force-stop every executing attack. Idempotent.
    pub fn stop_all(&mut self) {
        for attack in &mut self.attacks {
            attack.stop();
        }
    }

    /// Collect every attack eligible at this distance and phase and start one
    /// chosen uniformly at random. Returns the started attack's name. Never
    /// selects while any attack is executing.
    pub fn try_select(
        &mut self,
        distance: f32,
        phase: u8,
        ctx: &mut AttackContext<'_>,
    ) -> Option<&str> {
        if self.any_executing() {
            return None;
        }
        let eligible: Vec<usize> = self
            .attacks
            .iter()
            .enumerate()
            .filter(|(_, a)| a.can_execute(distance) && a.is_available_in_phase(phase))
            .map(|(i, _)| i)
            .collect();
        if eligible.is_empty() {
            return None;
        }
        let pick = eligible[self.rng.gen_range(0..eligible.len())];
        self.attacks[pick].start(ctx);
        Some(self.attacks[pick].name())
    }
}

impl std::fmt::Debug for AttackCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttackCatalog")
            .field("attacks", &self.attacks.len())
            .finish()
    }
}
