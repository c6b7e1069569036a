use crate::{
    constants::{COMMAND_DEADBAND, TICK_STALL_SPEED},
    error::ControlFault,
    path::Path,
    speed_control::{SpeedControl, SpeedController, SpeedControllerInit, SpeedStatus},
    steer_control::{SteerController, SteerControllerInit},
    target_control::{TargetSelection, TargetTracker, TargetTrackerInit},
    track::Track,
    vehicle::{ControlCommand, Vehicle, VehicleState},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutopilotInit {
    pub target: TargetTrackerInit,
    pub steer: SteerControllerInit,
    pub speed: SpeedControllerInit,
    /// Continuous outputs at or below this magnitude leave their flag unset.
    pub deadband: f64,
    /// Below this speed the car is always told to accelerate.
    pub stall_speed: f64,
}

impl Default for AutopilotInit {
    fn default() -> Self {
        Self {
            target: TargetTrackerInit::default(),
            steer: SteerControllerInit::default(),
            speed: SpeedControllerInit::default(),
            deadband: COMMAND_DEADBAND,
            stall_speed: TICK_STALL_SPEED,
        }
    }
}

impl AutopilotInit {
    pub fn build<V, T>(&self) -> Autopilot<V, T> {
        let Self {
            ref target,
            ref steer,
            ref speed,
            deadband,
            stall_speed,
        } = *self;

        Autopilot {
            attachment: None,
            idle_warned: false,
            pipeline: Pipeline {
                target_tracker: target.build(),
                steer_controller: steer.build(),
                speed_controller: speed.build(),
                deadband,
                stall_speed,
            },
        }
    }
}

#[derive(Debug)]
struct Attachment<V, T> {
    vehicle: V,
    track: T,
    /// `None` when the track's path could not be used.
    path: Option<Path>,
}

/// Drives one vehicle around one track, one tick at a time.
#[derive(Debug)]
pub struct Autopilot<V, T> {
    attachment: Option<Attachment<V, T>>,
    /// Set once an idle tick has been reported; cleared on attach and detach.
    idle_warned: bool,
    pipeline: Pipeline,
}

#[derive(Debug, Clone)]
struct Pipeline {
    target_tracker: TargetTracker,
    steer_controller: SteerController,
    speed_controller: SpeedController,
    deadband: f64,
    stall_speed: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub status: SpeedStatus,
    pub command: ControlCommand,
    pub steering: f64,
    pub throttle: f64,
    pub brake: f64,
    pub target_index: usize,
    pub nearest_index: Option<usize>,
    pub target_speed: f64,
    pub max_curvature: f64,
    pub on_track: bool,
    /// The near-standstill rule forced the accelerator on.
    pub stall_override: bool,
}

#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// The computed command was handed to the vehicle.
    Applied(Report),
    /// The pipeline failed and [`ControlCommand::FALLBACK`] was applied instead.
    Fallback(ControlFault),
    /// No vehicle, or no usable path. Nothing was updated.
    Unattached,
}

impl TickOutcome {
    pub fn report(&self) -> Option<&Report> {
        match self {
            Self::Applied(report) => Some(report),
            _ => None,
        }
    }

    pub fn command(&self) -> Option<ControlCommand> {
        match self {
            Self::Applied(report) => Some(report.command),
            Self::Fallback(_) => Some(ControlCommand::FALLBACK),
            Self::Unattached => None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

impl<V, T> Default for Autopilot<V, T> {
    fn default() -> Self {
        AutopilotInit::default().build()
    }
}

impl<V, T> Autopilot<V, T>
where
    V: Vehicle,
    T: Track,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes control of `vehicle` on `track`, replacing any previous pair and
    /// restarting from the first waypoint.
    pub fn attach(&mut self, vehicle: V, track: T) {
        let path = match Path::new(track.path().to_vec()) {
            Ok(path) => {
                info!(waypoints = path.len(), "autopilot attached");
                Some(path)
            }
            Err(err) => {
                warn!(%err, "track path is unusable, autopilot stays idle");
                None
            }
        };

        self.pipeline.target_tracker.reset();
        self.idle_warned = false;
        self.attachment = Some(Attachment {
            vehicle,
            track,
            path,
        });
    }

    pub fn detach(&mut self) -> Option<(V, T)> {
        self.pipeline.target_tracker.reset();
        self.idle_warned = false;
        self.attachment
            .take()
            .map(|Attachment { vehicle, track, .. }| (vehicle, track))
    }

    /// Attached with a usable path.
    pub fn is_ready(&self) -> bool {
        self.path().is_some()
    }

    pub fn target_index(&self) -> usize {
        self.pipeline.target_tracker.target_index()
    }

    pub fn path(&self) -> Option<&Path> {
        self.attachment.as_ref()?.path.as_ref()
    }

    pub fn vehicle(&self) -> Option<&V> {
        self.attachment.as_ref().map(|attachment| &attachment.vehicle)
    }

    pub fn vehicle_mut(&mut self) -> Option<&mut V> {
        self.attachment
            .as_mut()
            .map(|attachment| &mut attachment.vehicle)
    }

    pub fn track(&self) -> Option<&T> {
        self.attachment.as_ref().map(|attachment| &attachment.track)
    }

    /// Runs target selection, steering and speed control, then advances the
    /// vehicle by `delta_time` seconds with the resulting command.
    pub fn tick(&mut self, delta_time: f64) -> TickOutcome {
        let Self {
            attachment,
            idle_warned,
            pipeline,
        } = self;

        let Some(Attachment {
            vehicle,
            track,
            path: Some(path),
        }) = attachment.as_mut()
        else {
            if *idle_warned {
                debug!("autopilot idle");
            } else {
                warn!("autopilot is missing a vehicle or a usable track");
                *idle_warned = true;
            }
            return TickOutcome::Unattached;
        };

        let state = vehicle.state();
        match pipeline.decide(path, &*track, &state, delta_time) {
            Ok(report) => {
                trace!(
                    x = state.x,
                    y = state.y,
                    velocity = state.velocity,
                    target = report.target_index,
                    steering = report.steering,
                    throttle = report.throttle,
                    brake = report.brake,
                    status = ?report.status,
                    "autopilot tick"
                );
                vehicle.update(delta_time, report.command);
                TickOutcome::Applied(report)
            }
            Err(fault) => {
                warn!(%fault, "autopilot fault, applying fallback command");
                let delta_time = if delta_time.is_finite() && delta_time >= 0.0 {
                    delta_time
                } else {
                    0.0
                };
                vehicle.update(delta_time, ControlCommand::FALLBACK);
                TickOutcome::Fallback(fault)
            }
        }
    }
}

impl Pipeline {
    fn decide<T>(
        &mut self,
        path: &Path,
        track: &T,
        state: &VehicleState,
        delta_time: f64,
    ) -> Result<Report, ControlFault>
    where
        T: Track + ?Sized,
    {
        let Self {
            target_tracker,
            steer_controller,
            speed_controller,
            deadband,
            stall_speed,
        } = self;

        if !delta_time.is_finite() || delta_time < 0.0 {
            return Err(ControlFault::InvalidDeltaTime(delta_time));
        }
        check_state(state)?;

        let position = state.position();
        let on_track = track.is_on_track(position);
        let nearest = track.nearest_path_point(position);

        let TargetSelection { nearest_index, .. } =
            target_tracker.step(path, state, on_track, nearest.as_ref());
        let steering = steer_controller.step(path, state, on_track, target_tracker);
        let SpeedControl {
            throttle,
            brake,
            target_speed,
            max_curvature,
            status,
        } = speed_controller.step(path, state, on_track, nearest.as_ref(), target_tracker);

        if !(steering.is_finite() && throttle.is_finite() && brake.is_finite()) {
            return Err(ControlFault::NonFiniteOutput {
                steering,
                throttle,
                brake,
            });
        }

        let mut command = ControlCommand::from_levels(steering, throttle, brake, *deadband);

        if !on_track {
            debug!(
                x = state.x,
                y = state.y,
                target = target_tracker.target_index(),
                "off track, steering back to the path"
            );
        }

        let stall_override = state.speed() < *stall_speed;
        if stall_override {
            debug!(velocity = state.velocity, "stalled, forcing acceleration");
            command.accelerate = true;
            command.brake = false;
        }
        let status = if stall_override {
            SpeedStatus::Stalled
        } else {
            status
        };

        Ok(Report {
            status,
            command,
            steering,
            throttle,
            brake,
            target_index: target_tracker.target_index(),
            nearest_index,
            target_speed,
            max_curvature,
            on_track,
            stall_override,
        })
    }
}

fn check_state(state: &VehicleState) -> Result<(), ControlFault> {
    let VehicleState {
        x,
        y,
        angle,
        velocity,
    } = *state;

    [("x", x), ("y", y), ("angle", angle), ("velocity", velocity)]
        .into_iter()
        .find(|(_, value)| !value.is_finite())
        .map_or(Ok(()), |(field, value)| {
            Err(ControlFault::NonFiniteState { field, value })
        })
}
