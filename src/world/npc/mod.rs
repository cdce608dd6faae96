//! AI drivers for simulated races.
//!
//! Drivers move along a [`Circuit`] at a difficulty-scaled pace with a
//! little seeded variation. Each update turns their movement into the
//! checkpoint and finish-line crossings the race engine consumes, and the
//! manager answers path-progress queries for the ranking tie-break.

pub mod spawner;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::circuit::{Circuit, GateKind};
use crate::racing::{PathProgress, RacerId, TriggerEvent};

/// NPC difficulty level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NpcDifficulty {
    /// 80% of base pace
    Easy,
    #[default]
    /// 90% of base pace
    Medium,
    /// Base pace
    Hard,
    /// 110% of base pace
    VeryHard,
}

impl NpcDifficulty {
    /// Get pace multiplier for this difficulty
    pub fn pace_multiplier(&self) -> f64 {
        match self {
            Self::Easy => 0.8,
            Self::Medium => 0.9,
            Self::Hard => 1.0,
            Self::VeryHard => 1.1,
        }
    }
}

/// NPC system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NpcSettings {
    /// Number of drivers to spawn
    pub count: u8,
    /// Difficulty level
    pub difficulty: NpcDifficulty,
    /// Pace of a `Hard` driver in m/s
    pub base_speed_mps: f64,
    /// Seed for pace variation; equal seeds replay equal races
    pub seed: u64,
}

impl Default for NpcSettings {
    fn default() -> Self {
        Self {
            count: 6,
            difficulty: NpcDifficulty::Medium,
            base_speed_mps: 40.0,
            seed: 7,
        }
    }
}

/// Runtime state of an AI driver
#[derive(Debug, Clone)]
pub struct NpcDriver {
    /// Racer handle registered with the race session
    pub id: RacerId,
    /// Display name
    pub name: String,
    /// Cumulative distance from the finish line; negative on the grid
    pub distance_meters: f64,
    /// Current speed in m/s
    pub speed_mps: f64,
    /// Cruising speed
    pub target_speed_mps: f64,
    /// Stops moving once the race engine reports a finish
    pub parked: bool,
}

impl NpcDriver {
    /// Create a new driver
    pub fn new(id: RacerId, name: String, distance: f64, target_speed: f64) -> Self {
        Self {
            id,
            name,
            distance_meters: distance,
            speed_mps: 0.0,
            target_speed_mps: target_speed,
            parked: false,
        }
    }

    /// Advance the driver and return the distance covered.
    pub fn update(&mut self, delta_time: f64, rng: &mut StdRng) -> f64 {
        if self.parked {
            self.speed_mps = 0.0;
            return 0.0;
        }

        // Pace wobbles within ±5% of target
        let variation = rng.gen_range(-0.05..=0.05);
        self.speed_mps = (self.target_speed_mps * (1.0 + variation)).max(0.0);
        let covered = self.speed_mps * delta_time.max(0.0);
        self.distance_meters += covered;
        covered
    }
}

/// Owns the AI field for one race.
pub struct NpcManager {
    drivers: Vec<NpcDriver>,
    circuit: Circuit,
    rng: StdRng,
}

impl NpcManager {
    /// Create a manager for `drivers` on `circuit`.
    pub fn new(drivers: Vec<NpcDriver>, circuit: Circuit, seed: u64) -> Self {
        Self {
            drivers,
            circuit,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Get all drivers
    pub fn drivers(&self) -> &[NpcDriver] {
        &self.drivers
    }

    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// Stop a driver once it has taken the flag.
    pub fn park(&mut self, id: RacerId) {
        if let Some(driver) = self.drivers.iter_mut().find(|d| d.id == id) {
            driver.parked = true;
        }
    }

    /// Move every driver by `delta_time` seconds starting at race-clock time
    /// `clock`, returning the crossings ordered by when they happened.
    pub fn update(&mut self, clock: f64, delta_time: f64) -> Vec<TriggerEvent> {
        let mut timed: Vec<(f64, TriggerEvent)> = Vec::new();

        for driver in &mut self.drivers {
            let from = driver.distance_meters;
            driver.update(delta_time, &mut self.rng);
            let to = driver.distance_meters;

            for crossing in self.circuit.crossings(from, to) {
                let timestamp = clock + crossing.at * delta_time;
                let event = match crossing.kind {
                    GateKind::Checkpoint(checkpoint) => TriggerEvent::CheckpointCrossed {
                        racer: driver.id,
                        checkpoint,
                    },
                    GateKind::FinishLine => TriggerEvent::FinishLineCrossed {
                        racer: driver.id,
                        timestamp,
                    },
                };
                timed.push((timestamp, event));
            }
        }

        // stable: simultaneous crossings keep driver order
        timed.sort_by(|a, b| a.0.total_cmp(&b.0));
        timed.into_iter().map(|(_, event)| event).collect()
    }
}

impl PathProgress for NpcManager {
    fn path_progress(&self, racer: RacerId) -> Option<f32> {
        self.drivers
            .iter()
            .find(|d| d.id == racer)
            .map(|d| self.circuit.lap_fraction(d.distance_meters))
    }
}
