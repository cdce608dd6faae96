//! Race results.
//!
//! Built from a session once it is finished (or at any time for a
//! provisional table).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::events::RaceStatus;
use super::record::RacerId;
use super::session::RaceSession;

/// Racer who completed every lap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceFinisher {
    pub position: u32,
    pub racer_id: RacerId,
    /// Race clock at the final crossing
    pub finish_time: f64,
    pub best_lap: Option<f64>,
    pub gap_to_winner: f64,
}

/// Racer still on track when the race ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DidNotFinish {
    pub position: u32,
    pub racer_id: RacerId,
    pub laps_completed: u32,
    pub race_time: f64,
}

/// Fastest single lap of the race.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FastestLap {
    pub racer_id: RacerId,
    pub lap: u32,
    pub lap_time: f64,
}

/// Race results summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceResults {
    pub session_id: Uuid,
    pub status: RaceStatus,
    pub total_laps: u32,
    pub winner: Option<RacerId>,
    pub finishers: Vec<RaceFinisher>,
    pub did_not_finish: Vec<DidNotFinish>,
    pub fastest_lap: Option<FastestLap>,
    pub total_participants: u32,
}

impl RaceResults {
    /// Summarise the current standings of `session`.
    pub fn from_session(session: &RaceSession) -> Self {
        let standings = session.standings();
        let winner_time = standings
            .iter()
            .filter_map(|r| r.finish_time())
            .fold(None, |best: Option<f64>, t| Some(best.map_or(t, |b| b.min(t))));

        let mut finishers = Vec::new();
        let mut did_not_finish = Vec::new();
        let mut fastest_lap: Option<FastestLap> = None;

        for record in &standings {
            for (i, &lap_time) in record.lap_times().iter().enumerate() {
                if fastest_lap.map_or(true, |f| lap_time < f.lap_time) {
                    fastest_lap = Some(FastestLap {
                        racer_id: record.racer_id(),
                        lap: i as u32 + 1,
                        lap_time,
                    });
                }
            }

            match record.finish_time() {
                Some(finish_time) => finishers.push(RaceFinisher {
                    position: record.position(),
                    racer_id: record.racer_id(),
                    finish_time,
                    best_lap: record.best_lap(),
                    gap_to_winner: winner_time.map_or(0.0, |w| finish_time - w),
                }),
                None => did_not_finish.push(DidNotFinish {
                    position: record.position(),
                    racer_id: record.racer_id(),
                    laps_completed: record.laps_completed(),
                    race_time: record.total_race_time(),
                }),
            }
        }

        Self {
            session_id: session.id(),
            status: session.status(),
            total_laps: session.total_laps(),
            winner: session.winner(),
            finishers,
            did_not_finish,
            fastest_lap,
            total_participants: standings.len() as u32,
        }
    }

    /// Whether the race ran to completion with everyone finishing.
    pub fn is_complete(&self) -> bool {
        self.status == RaceStatus::Finished && self.did_not_finish.is_empty()
    }

    pub fn dnf_count(&self) -> u32 {
        self.did_not_finish.len() as u32
    }

    pub fn finisher(&self, racer: RacerId) -> Option<&RaceFinisher> {
        self.finishers.iter().find(|f| f.racer_id == racer)
    }
}

/// Format seconds as `MM:SS.s`.
pub fn format_time(seconds: f64) -> String {
    let tenths = (seconds.max(0.0) * 10.0).round() as u64;
    let minutes = tenths / 600;
    let secs = (tenths % 600) as f64 / 10.0;
    format!("{:02}:{:04.1}", minutes, secs)
}

/// Format a time gap with sign.
pub fn format_delta(seconds: f64) -> String {
    let sign = if seconds < 0.0 { "-" } else { "+" };
    format!("{}{}", sign, format_time(seconds.abs()))
}
