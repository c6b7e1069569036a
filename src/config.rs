//! Loading and validation of autopilot tuning.
//!
//! Every field has a default, so a TOML file only needs the values it
//! changes:
//!
//! ```toml
//! deadband = 0.1
//!
//! [speed]
//! base_speed = 180.0
//! min_speed = 70.0
//! ```

use crate::{autopilot::AutopilotInit, error::ConfigError};
use std::{fs, path::Path};

impl AutopilotInit {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let init: Self = toml::from_str(text)?;
        init.validate()?;
        Ok(init)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let Self {
            target,
            steer,
            speed,
            deadband,
            stall_speed,
        } = self;

        positive("target.speed_per_look_ahead_step", target.speed_per_look_ahead_step)?;

        non_negative("steer.arrival_radius", steer.arrival_radius)?;
        positive("steer.full_lock_angle", steer.full_lock_angle)?;
        positive("steer.reference_speed", steer.reference_speed)?;
        within("steer.high_speed_damping", steer.high_speed_damping, 0.0, 1.0)?;
        positive("steer.off_track_sensitivity", steer.off_track_sensitivity)?;
        within("steer.off_track_gain", steer.off_track_gain, 1.0, f64::MAX)?;
        // on-track sensitivity peaks at 1.0 when standing still
        if steer.off_track_sensitivity * steer.off_track_gain < 1.0 {
            return Err(ConfigError::WeakOffTrackSteering {
                sensitivity: steer.off_track_sensitivity,
                gain: steer.off_track_gain,
            });
        }

        if speed.curvature_samples == 0 {
            return Err(ConfigError::ZeroCount {
                field: "speed.curvature_samples",
            });
        }
        positive("speed.base_speed", speed.base_speed)?;
        positive("speed.min_speed", speed.min_speed)?;
        if speed.min_speed > speed.base_speed {
            return Err(ConfigError::SpeedBounds {
                min_speed: speed.min_speed,
                base_speed: speed.base_speed,
            });
        }
        non_negative("speed.curve_slowdown", speed.curve_slowdown)?;
        within("speed.hysteresis", speed.hysteresis, 0.0, 1.0)?;
        non_negative("speed.throttle_response", speed.throttle_response)?;
        non_negative("speed.brake_response", speed.brake_response)?;
        within("speed.cruise_throttle", speed.cruise_throttle, 0.0, 1.0)?;
        within("speed.min_drive_throttle", speed.min_drive_throttle, 0.0, 1.0)?;
        within("speed.off_track_brake", speed.off_track_brake, 0.0, 1.0)?;
        within("speed.default_throttle", speed.default_throttle, 0.0, 1.0)?;
        non_negative("speed.stall_speed", speed.stall_speed)?;

        below("deadband", *deadband, 0.0, 1.0)?;
        non_negative("stall_speed", *stall_speed)?;
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    within(field, value, 0.0, f64::MAX)
}

fn within(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            min,
            max,
            value,
        })
    }
}

/// Half-open variant of [`within`]: `min <= value < max`.
fn below(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if (min..max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            min,
            max,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steer_control::SteerControllerInit;
    use approx::assert_abs_diff_eq;

    #[test]
    fn defaults_are_valid() {
        AutopilotInit::default().validate().unwrap();
        assert_eq!(AutopilotInit::from_toml_str("").unwrap(), AutopilotInit::default());
    }

    #[test]
    fn partial_file_overrides_named_fields() {
        let init = AutopilotInit::from_toml_str(
            r#"
            deadband = 0.1

            [speed]
            base_speed = 180.0
            min_speed = 70.0

            [target]
            min_look_ahead_steps = 6
            "#,
        )
        .unwrap();
        assert_abs_diff_eq!(init.deadband, 0.1);
        assert_abs_diff_eq!(init.speed.base_speed, 180.0);
        assert_abs_diff_eq!(init.speed.min_speed, 70.0);
        assert_abs_diff_eq!(init.speed.brake_response, 0.9);
        assert_eq!(init.target.min_look_ahead_steps, 6);
        assert_eq!(init.steer, SteerControllerInit::default());
    }

    #[test]
    fn rejects_inverted_speed_bounds() {
        let err = AutopilotInit::from_toml_str("[speed]\nmin_speed = 200.0").unwrap_err();
        assert!(matches!(err, ConfigError::SpeedBounds { .. }));
    }

    #[test]
    fn rejects_out_of_range_fields() {
        let err = AutopilotInit::from_toml_str("[steer]\noff_track_gain = 0.5").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange {
                field: "steer.off_track_gain",
                ..
            }
        ));

        let err = AutopilotInit::from_toml_str("deadband = 1.0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange {
                field: "deadband",
                ..
            }
        ));
        AutopilotInit::from_toml_str("deadband = 0.0").unwrap();

        let err = AutopilotInit::from_toml_str("[speed]\ncurvature_samples = 0").unwrap_err();
        assert!(matches!(err, ConfigError::ZeroCount { .. }));

        let err = AutopilotInit::from_toml_str("[steer]\nfull_lock_angle = -1.0").unwrap_err();
        assert!(matches!(err, ConfigError::NotPositive { .. }));
    }

    #[test]
    fn rejects_off_track_steering_weaker_than_on_track() {
        let err = AutopilotInit::from_toml_str(
            "[steer]\noff_track_sensitivity = 0.2\noff_track_gain = 1.0",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::WeakOffTrackSteering { .. }));

        // a low sensitivity is fine when the gain makes up for it
        AutopilotInit::from_toml_str("[steer]\noff_track_sensitivity = 0.5\noff_track_gain = 2.0")
            .unwrap();
    }

    #[test]
    fn validated_steering_never_weaker_off_track() {
        use crate::{
            geometry::Point2, path::Path, target_control::TargetTrackerInit,
            vehicle::VehicleState,
        };

        let path = Path::new((0..10).map(|i| Point2::new(i as f64 * 100.0, 0.0)).collect())
            .unwrap();
        for (sensitivity, gain) in [(1.0, 1.0), (0.5, 2.0), (0.8, 1.5), (1.2, 1.0)] {
            let mut init = AutopilotInit::default();
            init.steer.off_track_sensitivity = sensitivity;
            init.steer.off_track_gain = gain;
            init.validate().unwrap();

            let controller = init.steer.build();
            for (step, velocity) in (0..60).flat_map(|step| [0.0, 90.0].map(|v| (step, v))) {
                let state = VehicleState {
                    x: 0.0,
                    y: 0.0,
                    angle: -3.0 + step as f64 * 0.1,
                    velocity,
                };
                let mut tracker = TargetTrackerInit::default().build();
                tracker.set_target_index(&path, 5);
                let on = controller.step(&path, &state, true, &mut tracker.clone());
                let off = controller.step(&path, &state, false, &mut tracker);
                assert!(
                    off.abs() >= on.abs() - 1e-12,
                    "sensitivity {sensitivity} gain {gain}: on {on} off {off}"
                );
            }
        }
    }

    #[test]
    fn reports_parse_and_io_errors() {
        let err = AutopilotInit::from_toml_str("deadband = \"wide\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        let err = AutopilotInit::from_toml_file("/nonexistent/autopilot.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
