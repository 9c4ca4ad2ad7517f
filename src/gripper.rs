// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//!  Contains the teleop::RemoteGripper trait.

#[cfg(test)]
use mockall::automock;

use crate::exception::{TeleopException, TeleopResult};
use crate::gripper::gripper_state::GripperState;

pub mod gripper_state;

/// Commands for the gripper mounted at the end of the remote robot of a teleoperation pair.
#[cfg_attr(test, automock)]
pub trait RemoteGripper {
    /// Initializes the gripper. Blocks until the initialization is finished.
    /// # Errors
    /// * [`GripperException`](`crate::exception::TeleopException::GripperException`) if no
    /// gripper is mounted.
    fn init_gripper(&mut self) -> TeleopResult<()>;

    /// Grasps with direct force control.
    /// # Arguments
    /// * `force` - Target gripping force. Positive: closing force, negative: opening force. \[N\]
    fn grasp(&mut self, force: f64) -> TeleopResult<()>;

    /// Moves the gripper fingers with position control.
    /// # Arguments
    /// * `width` - Target opening width. \[m\]
    /// * `velocity` - Closing/opening velocity, cannot be 0. \[m/s\]
    /// * `force_limit` - Maximum output force during movement. \[N\]
    /// If not specified, the default force limit of the mounted gripper is used.
    /// # Errors
    /// * [`GripperException`](`crate::exception::TeleopException::GripperException`) if the
    /// velocity is zero or not finite.
    fn move_gripper(&mut self, width: f64, velocity: f64, force_limit: Option<f64>)
        -> TeleopResult<()>;

    /// Stops the gripper. Blocks until the gripper control is handed back.
    fn stop_gripper(&mut self) -> TeleopResult<()>;

    /// Current gripper state.
    fn gripper_state(&self) -> TeleopResult<GripperState>;

    /// Whether the gripper fingers are moving.
    fn is_gripper_moving(&self) -> bool;
}

/// Validates the arguments of a [`move_gripper`](RemoteGripper::move_gripper) request.
pub fn check_move_request(width: f64, velocity: f64, force_limit: Option<f64>) -> TeleopResult<()> {
    if !width.is_finite() {
        return Err(create_gripper_exception("teleop gripper: Width has to be finite!"));
    }
    if velocity == 0. || !velocity.is_finite() {
        return Err(create_gripper_exception(
            "teleop gripper: Velocity cannot be 0!",
        ));
    }
    if let Some(limit) = force_limit {
        if limit < 0. || !limit.is_finite() {
            return Err(create_gripper_exception(
                "teleop gripper: Force limit has to be positive!",
            ));
        }
    }
    Ok(())
}

/// Saturates a target width into the valid range `[0, max_width]`.
pub fn saturate_width(width: f64, max_width: f64) -> f64 {
    width.max(0.).min(max_width)
}

fn create_gripper_exception(message: &'static str) -> TeleopException {
    TeleopException::GripperException {
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_requests_are_validated() {
        assert!(check_move_request(0.05, 0.1, None).is_ok());
        assert!(check_move_request(0.05, -0.1, Some(20.)).is_ok());
        assert!(check_move_request(0.05, 0., None).is_err());
        assert!(check_move_request(f64::NAN, 0.1, None).is_err());
        match check_move_request(0.05, 0.1, Some(-1.)) {
            Err(TeleopException::GripperException { message }) => {
                assert!(message.contains("Force limit"))
            }
            other => panic!("expected gripper exception, got {:?}", other),
        }
    }

    #[test]
    fn widths_are_saturated() {
        assert_eq!(saturate_width(0.2, 0.1), 0.1);
        assert_eq!(saturate_width(-0.01, 0.1), 0.);
        assert_eq!(saturate_width(0.04, 0.1), 0.04);
    }
}
