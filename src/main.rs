//! RustRace - headless race simulator
//!
//! Runs a field of AI drivers around a demo oval through the race engine
//! and prints the results table.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::sync::broadcast::error::TryRecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use rustrace::racing::results::{format_delta, format_time};
use rustrace::racing::{
    CheckpointOrder, PathProgress, RaceEvent, RaceResults, RaceSession, RaceStatus, RacerId,
};
use rustrace::storage::config::{load_config, load_config_from};
use rustrace::storage::snapshots::save_snapshot;
use rustrace::world::npc::spawner::NpcSpawner;
use rustrace::world::{Circuit, NpcManager};

const DEMO_TRACK_LENGTH: f64 = 1200.0;
const DEMO_CHECKPOINTS: u32 = 4;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Laps to race
    #[arg(long)]
    laps: Option<u32>,
    /// Number of AI drivers
    #[arg(long)]
    racers: Option<u8>,
    /// Simulation step in milliseconds
    #[arg(long)]
    tick_ms: Option<u64>,
    /// Config file to use instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,
    /// Require checkpoints in track order
    #[arg(long)]
    sequential: bool,
    /// Seed for driver pace
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting RustRace v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => load_config_from(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => load_config().context("loading config")?,
    };

    if let Some(laps) = cli.laps {
        config.race.total_laps = laps;
    }
    if let Some(racers) = cli.racers {
        config.npc.count = racers;
    }
    if let Some(tick_ms) = cli.tick_ms {
        config.simulation.tick_ms = tick_ms;
    }
    if let Some(seed) = cli.seed {
        config.npc.seed = seed;
    }
    if cli.sequential {
        config.race.checkpoint_order = CheckpointOrder::Sequential;
    }
    config.validate()?;

    let circuit = Circuit::oval("Demo Oval", DEMO_TRACK_LENGTH, DEMO_CHECKPOINTS);
    let track = circuit.checkpoint_set()?;
    let drivers = NpcSpawner::new(&config.npc).spawn(config.npc.count, 1);
    let names: HashMap<_, _> = drivers.iter().map(|d| (d.id, d.name.clone())).collect();

    let (mut session, mut events) = RaceSession::new(track, &config.race)?;
    for driver in &drivers {
        session.register_racer(driver.id)?;
    }
    session.start_race()?;

    let mut npc = NpcManager::new(drivers, circuit, config.npc.seed);
    let dt = config.simulation.tick_ms as f64 / 1000.0;

    while !session.is_race_finished() {
        let crossings = if session.status() == RaceStatus::Racing {
            npc.update(session.race_clock(), dt)
        } else {
            Vec::new()
        };
        session.process_tick(dt, &crossings, Some(&npc as &dyn PathProgress));

        loop {
            match events.try_recv() {
                Ok(RaceEvent::RacerFinished { racer, finish_time }) => {
                    tracing::info!(%racer, finish_time = %format_time(finish_time), "racer finished");
                    npc.park(racer);
                }
                Ok(RaceEvent::LapCompleted { racer, lap, lap_time }) => {
                    tracing::debug!(%racer, lap, lap_time = %format_time(lap_time), "lap completed");
                }
                Ok(RaceEvent::CountdownTick { seconds }) => {
                    tracing::info!("{}...", seconds);
                }
                Ok(_) => {}
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event receiver lagged");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }

        if session.race_clock() > config.simulation.max_race_seconds {
            tracing::warn!(
                limit = config.simulation.max_race_seconds,
                "race time limit reached, aborting"
            );
            session.abort_race();
        }
    }

    let results = RaceResults::from_session(&session);
    let name_of = |id: RacerId| names.get(&id).cloned().unwrap_or_else(|| id.to_string());

    println!();
    println!(
        "{} - {} laps, {} racers",
        session.track().name,
        results.total_laps,
        results.total_participants
    );
    println!("{:>3}  {:<16} {:>9} {:>10} {:>9}", "Pos", "Driver", "Time", "Gap", "Best");
    for finisher in &results.finishers {
        println!(
            "{:>3}  {:<16} {:>9} {:>10} {:>9}",
            finisher.position,
            name_of(finisher.racer_id),
            format_time(finisher.finish_time),
            format_delta(finisher.gap_to_winner),
            finisher.best_lap.map(format_time).unwrap_or_default(),
        );
    }
    for dnf in &results.did_not_finish {
        println!(
            "{:>3}  {:<16} {:>9} {:>10}",
            dnf.position,
            name_of(dnf.racer_id),
            "DNF",
            format!("{} laps", dnf.laps_completed),
        );
    }
    if let Some(fastest) = results.fastest_lap {
        println!(
            "Fastest lap: {} on lap {} ({})",
            name_of(fastest.racer_id),
            fastest.lap,
            format_time(fastest.lap_time)
        );
    }

    if config.simulation.save_snapshot {
        let path = save_snapshot(&config.data_dir, &session.snapshot())?;
        tracing::info!(path = %path.display(), "snapshot written");
    }

    Ok(())
}
