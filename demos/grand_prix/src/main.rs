//! grand_prix: a mixed field of cars and drones on an open circuit.
//!
//! Builds a synthetic starting grid (or loads one from a roster CSV), runs
//! the race for a fixed number of ticks and prints the final standings.
//!
//! ```text
//! cargo run -p grand_prix -- --agents 24 --ticks 3600
//! RUST_LOG=race_sim=debug cargo run -p grand_prix -- --realtime --ticks 300
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use race_agent::{AgentConfig, AgentKind, BehaviorMode, load_agents_csv};
use race_core::{AgentId, SimConfig, SimRng, Tick, Vec3};
use race_events::EventPayload;
use race_leaderboard::{Criterion, SortOrder, names};
use race_sim::{Scenario, SimBuilder, SimObserver, SimState, SimStats, TickReport, topics};

// ── Constants ─────────────────────────────────────────────────────────────────

const GRID_COLUMNS:   usize = 4;
const GRID_SPACING:   f64   = 12.0;
const DRONE_ALTITUDE: f64   = 20.0;
const PROGRESS_EVERY: u64   = 600; // ticks between progress lines

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "grand_prix")]
#[command(about = "Run a race simulation and print the final leaderboard", long_about = None)]
struct Args {
    /// Number of agents on the synthetic grid (ignored with --roster)
    #[arg(short, long, default_value = "12")]
    agents: usize,

    /// Ticks to simulate
    #[arg(short, long, default_value = "3600")]
    ticks: u64,

    /// Master seed
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Target tick rate in Hz
    #[arg(long, default_value = "60")]
    tick_rate: f64,

    /// Track length of one lap in metres
    #[arg(short, long, default_value = "400")]
    lap_length: f64,

    /// Random incidents per second at full aggression
    #[arg(long, default_value = "0.0005")]
    incident_rate: f64,

    /// Load the starting grid from a CSV roster instead
    #[arg(short, long)]
    roster: Option<PathBuf>,

    /// Run in wall-clock time instead of as fast as possible
    #[arg(long)]
    realtime: bool,

    /// Rows to print per ranking
    #[arg(long, default_value = "5")]
    top: usize,
}

// ── Starting grid ─────────────────────────────────────────────────────────────

/// Corners of the patrol circuit, inset from the world walls.
fn circuit() -> Vec<Vec3> {
    vec![
        Vec3::new(150.0, 0.0, 150.0),
        Vec3::new(-150.0, 0.0, 150.0),
        Vec3::new(-150.0, 0.0, -150.0),
        Vec3::new(150.0, 0.0, -150.0),
    ]
}

fn synthetic_grid(count: usize, seed: u64) -> Vec<AgentConfig> {
    let mut rng = SimRng::new(seed);
    (0..count)
        .map(|i| {
            let row = (i / GRID_COLUMNS) as f64;
            let col = (i % GRID_COLUMNS) as f64;
            let kind = if i % 5 == 4 { AgentKind::Drone } else { AgentKind::Vehicle };
            let behavior = BehaviorMode::ALL[rng.gen_range(0..BehaviorMode::ALL.len())];
            let altitude = if kind == AgentKind::Drone { DRONE_ALTITUDE } else { 0.0 };

            AgentConfig {
                name:             format!("{}-{i:02}", kind.as_str()),
                kind,
                position:         Vec3::new(col * GRID_SPACING, altitude, -row * GRID_SPACING),
                heading:          std::f64::consts::FRAC_PI_2,
                mass:             if kind == AgentKind::Drone { 25.0 } else { 900.0 + rng.gen_range(0.0..300.0) },
                radius:           if kind == AgentKind::Drone { 0.8 } else { 2.0 },
                gravity_affected: kind != AgentKind::Drone,
                max_speed:        rng.gen_range(60.0..90.0),
                acceleration:     rng.gen_range(6.0..10.0),
                aggression:       rng.unit(),
                fuel_efficiency:  rng.gen_range(0.6..0.95),
                behavior,
                target:           (behavior == BehaviorMode::Follow && i > 0).then(|| AgentId(i as u32 - 1)),
                waypoints:        if behavior == BehaviorMode::Patrol { circuit() } else { Vec::new() },
                ..AgentConfig::default()
            }
        })
        .collect()
}

// ── Observer ──────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Progress {
    ticks:   u64,
    crashes: usize,
}

impl SimObserver for Progress {
    fn on_tick_end(&mut self, tick: Tick, report: &TickReport) {
        self.ticks += 1;
        self.crashes += report.crashes;
        if tick.0 % PROGRESS_EVERY == 0 {
            info!(
                %tick,
                time = format_args!("{:.1}s", report.time),
                collisions = report.collisions,
                laps = report.laps,
                "progress"
            );
        }
    }

    fn on_stopped(&mut self, stats: &SimStats) {
        info!(ticks = stats.tick_count, fps = format_args!("{:.1}", stats.fps), "race stopped");
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    // 1. Starting grid.
    let grid = match &args.roster {
        Some(path) => load_agents_csv(path).with_context(|| format!("loading roster {}", path.display()))?,
        None => synthetic_grid(args.agents, args.seed),
    };

    // 2. Config and scenario.
    let config = SimConfig {
        tick_rate_hz:  args.tick_rate,
        max_agents:    grid.len().max(1),
        seed:          args.seed,
        max_ticks:     Some(args.ticks),
        incident_rate: args.incident_rate,
        ..SimConfig::default()
    };
    let scenario = Scenario::default().with_agents(grid).with_lap_length(args.lap_length);

    println!("=== grand_prix ===");
    println!(
        "Agents: {}  |  Ticks: {}  |  Rate: {} Hz  |  Seed: {}",
        scenario.agents.len(),
        args.ticks,
        args.tick_rate,
        args.seed
    );
    println!();

    // 3. Build, with one extra ranking.
    let mut sim = SimBuilder::new(config)
        .criterion(Criterion::new("clean_driving", SortOrder::Ascending, |a| {
            f64::from(a.metrics.collisions + a.metrics.incidents)
        }))
        .scenario(scenario)
        .build()
        .context("building simulation")?;

    // 4. Event taps.
    let laps = Arc::new(AtomicU64::new(0));
    let lap_counter = Arc::clone(&laps);
    sim.on_event(
        topics::LAP_COMPLETE,
        move |event| {
            lap_counter.fetch_add(1, Ordering::Relaxed);
            if let EventPayload::LapComplete { agent, lap, lap_time, .. } = &event.payload {
                info!(%agent, lap, lap_time = format_args!("{lap_time:.2}s"), "lap complete");
            }
            Ok(())
        },
        0,
    );
    sim.on_event(
        topics::INCIDENT,
        |event| {
            if let EventPayload::Incident { agent, crashed: true, cause, .. } = &event.payload {
                warn!(%agent, cause = %cause, "agent out of the race");
            }
            Ok(())
        },
        0,
    );

    // 5. Race.
    let mut progress = Progress::default();
    let t0 = Instant::now();
    if args.realtime {
        sim.run(&mut progress)?;
    } else {
        sim.start();
        sim.run_for(args.ticks, &mut progress)?;
        if sim.state() == SimState::Running {
            sim.stop();
        }
    }
    let elapsed = t0.elapsed();

    // 6. Summary.
    let stats = sim.get_stats();
    println!("Race complete in {:.3} s wall, {:.1} s simulated", elapsed.as_secs_f64(), stats.current_time);
    println!(
        "  ticks {}  |  collisions {}  |  crashes {}  |  laps {}  |  avg tick {:.3} ms",
        stats.tick_count,
        stats.collisions,
        progress.crashes,
        laps.load(Ordering::Relaxed),
        stats.average_tick_time_ms
    );
    println!("  still racing {}/{}", stats.agents_active, stats.agents_total);
    println!();

    for (criterion, standings) in sim.get_leaderboard(Some(args.top)) {
        println!("{criterion}");
        println!("{:<5} {:<14} {:>12}", "Rank", "Agent", "Value");
        println!("{}", "-".repeat(33));
        for entry in standings {
            let name = sim.agent(entry.agent).map_or("?", |a| a.name.as_str());
            let value = if criterion == names::LAP_TIME && entry.value.is_infinite() {
                "-".to_owned()
            } else {
                format!("{:.2}", entry.value)
            };
            println!("{:<5} {:<14} {:>12}", entry.rank, name, value);
        }
        println!();
    }
    Ok(())
}
