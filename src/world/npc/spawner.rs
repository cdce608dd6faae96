//! Grid spawner for AI drivers.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{NpcDifficulty, NpcDriver, NpcSettings};
use crate::racing::RacerId;

const DRIVER_NAMES: [&str; 8] = [
    "Team Blue",
    "Team Red",
    "Team Green",
    "Team Yellow",
    "Team Orange",
    "Team Purple",
    "Team Pink",
    "Team Black",
];

/// Places drivers on the starting grid behind the finish line.
pub struct NpcSpawner {
    difficulty: NpcDifficulty,
    base_speed_mps: f64,
    /// Gap between grid slots (meters)
    grid_spacing: f64,
    seed: u64,
}

impl NpcSpawner {
    /// Create a spawner from settings
    pub fn new(settings: &NpcSettings) -> Self {
        Self {
            difficulty: settings.difficulty,
            base_speed_mps: settings.base_speed_mps,
            grid_spacing: 8.0,
            seed: settings.seed,
        }
    }

    /// Spawn `count` drivers with ids starting at `first_id`.
    ///
    /// Slot 0 sits on the line; later slots are further back. Each driver's
    /// pace is spread ±8% around the difficulty target.
    pub fn spawn(&self, count: u8, first_id: u64) -> Vec<NpcDriver> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let target = self.target_speed();

        (0..count)
            .map(|i| {
                let pace = 1.0 + rng.gen_range(-0.08..=0.08);
                let name = format!(
                    "{} {}",
                    DRIVER_NAMES[i as usize % DRIVER_NAMES.len()],
                    i as usize / DRIVER_NAMES.len() + 1
                );
                NpcDriver::new(
                    RacerId(first_id + i as u64),
                    name,
                    -(i as f64) * self.grid_spacing,
                    target * pace,
                )
            })
            .collect()
    }

    /// Cruising speed for this difficulty
    pub fn target_speed(&self) -> f64 {
        self.base_speed_mps * self.difficulty.pace_multiplier()
    }
}
