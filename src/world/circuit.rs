//! Closed-loop circuit geometry used to turn movement into trigger events.

use serde::{Deserialize, Serialize};

use crate::racing::{CheckpointId, CheckpointSet, RacingError};

/// A gate at a fixed distance along the lap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    pub id: CheckpointId,
    /// Distance from the finish line, in `(0, length)`
    pub distance_meters: f64,
}

/// Which gate was crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateKind {
    Checkpoint(CheckpointId),
    FinishLine,
}

/// One gate crossing during a movement step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateCrossing {
    pub kind: GateKind,
    /// Fraction of the step at which the crossing happened, in `(0, 1]`
    pub at: f64,
}

/// Circuit with the finish line at distance 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Circuit {
    pub name: String,
    pub length_meters: f64,
    pub gates: Vec<Gate>,
    pub finish_line: CheckpointId,
}

impl Circuit {
    /// Evenly spaced checkpoints around a loop of `length_meters`.
    pub fn oval(name: &str, length_meters: f64, checkpoints: u32) -> Self {
        let spacing = length_meters / (checkpoints as f64 + 1.0);
        let gates = (1..=checkpoints)
            .map(|i| Gate {
                id: CheckpointId(i),
                distance_meters: spacing * i as f64,
            })
            .collect();

        Self {
            name: name.to_string(),
            length_meters,
            gates,
            finish_line: CheckpointId(0),
        }
    }

    /// Checkpoint layout for the race engine, in lap order.
    pub fn checkpoint_set(&self) -> Result<CheckpointSet, RacingError> {
        if !self.length_meters.is_finite() || self.length_meters <= 0.0 {
            return Err(RacingError::InvalidTrack(format!(
                "circuit length must be positive, got {}",
                self.length_meters
            )));
        }
        for gate in &self.gates {
            let d = gate.distance_meters;
            if !d.is_finite() || d <= 0.0 || d >= self.length_meters {
                return Err(RacingError::InvalidTrack(format!(
                    "gate {} at {d} m is outside the lap (0, {})",
                    gate.id, self.length_meters
                )));
            }
        }

        let mut gates = self.gates.clone();
        gates.sort_by(|a, b| a.distance_meters.total_cmp(&b.distance_meters));
        CheckpointSet::new(gates.iter().map(|g| g.id).collect(), self.finish_line)
            .map(|set| set.with_name(self.name.clone()))
    }

    /// Fraction of the current lap covered at cumulative `distance`.
    pub fn lap_fraction(&self, distance: f64) -> f32 {
        if distance <= 0.0 || self.length_meters <= 0.0 {
            return 0.0;
        }
        (distance.rem_euclid(self.length_meters) / self.length_meters) as f32
    }

    /// Gates crossed moving from cumulative distance `from` to `to`, in
    /// crossing order.
    pub fn crossings(&self, from: f64, to: f64) -> Vec<GateCrossing> {
        let mut crossings = Vec::new();
        if to <= from || self.length_meters <= 0.0 {
            return crossings;
        }

        let span = to - from;
        let mut push = |kind: GateKind, offset: f64| {
            // every lap copy of the gate inside (from, to]
            let mut k = ((from - offset) / self.length_meters).floor() + 1.0;
            loop {
                let at = offset + k * self.length_meters;
                if at > to {
                    break;
                }
                if at > from {
                    crossings.push(GateCrossing {
                        kind,
                        at: (at - from) / span,
                    });
                }
                k += 1.0;
            }
        };

        push(GateKind::FinishLine, 0.0);
        for gate in &self.gates {
            push(GateKind::Checkpoint(gate.id), gate.distance_meters);
        }

        crossings.sort_by(|a, b| a.at.total_cmp(&b.at));
        crossings
    }
}
