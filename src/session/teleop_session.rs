// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains the [`TeleopSession`] trait, the narrow interface to a robot-to-robot teleoperation
//! session.
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::axis_lock::AxisLockState;
use crate::exception::TeleopResult;
use crate::utils::{CARTESIAN_DOF, JOINT_DOF};

/// General information about one robot of a teleoperation pair.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Default)]
pub struct TeleopRobotInfo {
    /// Lower limits of joint positions. Unit: \[rad\].
    pub q_min: [f64; JOINT_DOF],
    /// Upper limits of joint positions. Unit: \[rad\].
    pub q_max: [f64; JOINT_DOF],
    /// Measured joint positions using the link-side encoders. Unit: \[rad\].
    pub q_current: [f64; JOINT_DOF],
}

/// A bound local-robot/remote-robot control relationship enforcing force-feedback coupling.
///
/// The remote robot imitates the motion of the local robot and feeds the external wrench back to
/// the local robot. The control law itself lives behind this interface.
///
/// None of the methods may block indefinitely. An implementation which cannot guarantee a
/// bounded duration has to report
/// [`Timeout`](`crate::exception::TeleopException::Timeout`) instead,
/// see [`BoundedSession`](`crate::session::BoundedSession`).
#[cfg_attr(test, automock)]
pub trait TeleopSession {
    /// Enables the teleoperation. If all E-stops are released and there is no fault, both robots
    /// release their brakes and become operational a few seconds later.
    /// # Errors
    /// * [`SessionError`](`crate::exception::TeleopException::SessionError`) if the request failed.
    fn enable(&mut self) -> TeleopResult<()>;

    /// Initializes the teleoperation robots. Requires [`enable`](Self::enable) first.
    /// # Errors
    /// * [`SessionError`](`crate::exception::TeleopException::SessionError`) if the request failed.
    fn init(&mut self) -> TeleopResult<()>;

    /// Stops teleoperation and waits until both robots came to a complete stop.
    fn stop(&mut self) -> TeleopResult<()>;

    /// Whether the teleoperation is in a fault state.
    fn is_fault(&self) -> bool;

    /// Tries to clear a minor fault on both robots.
    /// # Return
    /// True if the fault was cleared, false otherwise.
    fn clear_fault(&mut self) -> TeleopResult<bool>;

    /// Whether both robots are enabled, brakes released, fault free and not in a reduced state.
    /// Has to be polled before every control tick; false indicates an unrecoverable fault.
    fn is_operational(&self) -> bool;

    /// Advances teleoperation by one control step.
    /// # Errors
    /// * [`SessionError`](`crate::exception::TeleopException::SessionError`) if the step failed.
    fn run(&mut self) -> TeleopResult<()>;

    /// Sets the preferred joint positions for the null-space posture control of the local robot.
    ///
    /// This is a preference, the robot is pulled towards it without affecting the Cartesian task.
    /// # Errors
    /// * [`SessionError`](`crate::exception::TeleopException::SessionError`) if a value lies
    /// outside the joint limits of [`local_info`](Self::local_info).
    fn set_local_null_space_posture(&mut self, posture: [f64; JOINT_DOF]) -> TeleopResult<()>;

    /// Sets the preferred joint positions for the null-space posture control of the remote robot.
    /// # Errors
    /// * [`SessionError`](`crate::exception::TeleopException::SessionError`) if a value lies
    /// outside the joint limits of [`remote_info`](Self::remote_info).
    fn set_remote_null_space_posture(&mut self, posture: [f64; JOINT_DOF]) -> TeleopResult<()>;

    /// Sets the maximum contact wrench `[f_x, f_y, f_z, m_x, m_y, m_z]` of the remote robot.
    /// Unit: \[N\] \[Nm\].
    /// # Errors
    /// * [`SessionError`](`crate::exception::TeleopException::SessionError`) if any value is
    /// negative.
    fn set_remote_max_wrench(&mut self, wrench: [f64; CARTESIAN_DOF]) -> TeleopResult<()>;

    fn local_info(&self) -> TeleopRobotInfo;

    fn remote_info(&self) -> TeleopRobotInfo;

    /// Commands which axes of the local robot are locked.
    fn set_local_axis_lock_cmd(&mut self, state: AxisLockState) -> TeleopResult<()>;

    /// Reads which axes of the local robot are currently locked.
    fn get_local_axis_lock_state(&self) -> TeleopResult<AxisLockState>;
}
