use anyhow::{ensure, Result};
use clap::Parser;
use race_autopilot::{
    physics::ArcadeCar, ring_track::RingTrack, Autopilot, AutopilotInit, TickOutcome, Track,
    Vehicle, VehicleState,
};
use rand::prelude::*;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
struct Opts {
    /// Autopilot tuning in TOML. Defaults are used when omitted.
    #[clap(long)]
    pub config: Option<PathBuf>,
    #[clap(long, default_value = "1000")]
    pub width: f64,
    #[clap(long, default_value = "800")]
    pub height: f64,
    /// Simulated seconds.
    #[clap(long, default_value = "60")]
    pub duration: f64,
    #[clap(long, default_value = "60")]
    pub tick_rate: f64,
    /// Random offset applied to the start position.
    #[clap(long, default_value = "10")]
    pub jitter: f64,
    /// Seconds at a standstill before the car is put back on the grid.
    #[clap(long, default_value = "5")]
    pub stuck_timeout: f64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let Opts {
        config,
        width,
        height,
        duration,
        tick_rate,
        jitter,
        stuck_timeout,
    } = Opts::parse();

    let init = match config {
        Some(path) => AutopilotInit::from_toml_file(path)?,
        None => AutopilotInit::default(),
    };

    let track = RingTrack::for_screen(width, height);
    let grid = track.start_pose();

    ensure!(
        tick_rate.is_finite() && tick_rate > 0.0,
        "--tick-rate must be a positive number, got {tick_rate}"
    );
    let start = jittered_start(grid, jitter, &mut rand::thread_rng())?;

    let mut autopilot: Autopilot<ArcadeCar, &RingTrack> = init.build();
    autopilot.attach(ArcadeCar::new(start), &track);

    let delta_time = tick_rate.recip();
    let ticks = (duration * tick_rate).round() as u64;
    let waypoints = track.path().len();

    let mut fallbacks = 0;
    let mut off_track_ticks = 0;
    let mut stuck_time = 0.0;
    let mut progress = 0;
    let mut last_nearest = 0;

    for tick in 0..ticks {
        match autopilot.tick(delta_time) {
            TickOutcome::Applied(report) => {
                if !report.on_track {
                    off_track_ticks += 1;
                }
                if let Some(nearest) = report.nearest_index {
                    // forward steps only, a lap is `waypoints` steps
                    let step = (nearest + waypoints - last_nearest) % waypoints;
                    if step < waypoints / 2 {
                        progress += step;
                    }
                    last_nearest = nearest;
                }
            }
            TickOutcome::Fallback(fault) => {
                fallbacks += 1;
                warn!(%fault, tick, "fallback command applied");
            }
            TickOutcome::Unattached => anyhow::bail!("autopilot lost its vehicle"),
        }

        let Some(car) = autopilot.vehicle_mut() else {
            anyhow::bail!("autopilot lost its vehicle");
        };
        let state = car.state();

        stuck_time = if state.speed() < 0.1 {
            stuck_time + delta_time
        } else {
            0.0
        };
        if stuck_time > stuck_timeout {
            warn!(x = state.x, y = state.y, "car stuck, returning it to the grid");
            car.set_pose(grid.x, grid.y, grid.angle);
            car.set_velocity(10.0);
            stuck_time = 0.0;
        }

        if tick % (tick_rate as u64 * 10).max(1) == 0 {
            info!(
                time = tick as f64 * delta_time,
                x = state.x.round(),
                y = state.y.round(),
                velocity = state.velocity.round(),
                target = autopilot.target_index(),
                "progress"
            );
        }
    }

    info!(
        laps = progress as f64 / waypoints as f64,
        off_track_share = off_track_ticks as f64 / ticks.max(1) as f64,
        fallbacks,
        "run finished"
    );

    Ok(())
}

/// Places the car near the first waypoint, up to `jitter` away on each axis.
fn jittered_start<R>(grid: VehicleState, jitter: f64, rng: &mut R) -> Result<VehicleState>
where
    R: Rng,
{
    ensure!(
        jitter.is_finite() && jitter >= 0.0,
        "--jitter must be a finite, non-negative distance, got {jitter}"
    );

    Ok(VehicleState {
        x: grid.x + rng.gen_range(-jitter..=jitter),
        y: grid.y + rng.gen_range(-jitter..=jitter),
        ..grid
    })
}
