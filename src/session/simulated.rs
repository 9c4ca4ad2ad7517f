// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains the [`SimulatedTeleop`] session which runs the whole teleoperation pipeline without
//! robots attached.
use std::path::Path;

use tracing::debug;

use crate::axis_lock::AxisLockState;
use crate::exception::{create_session_error, TeleopException, TeleopResult};
use crate::gripper::gripper_state::GripperState;
use crate::gripper::{check_move_request, saturate_width, RemoteGripper};
use crate::session::teleop_session::{TeleopRobotInfo, TeleopSession};
use crate::utils::{
    is_valid_wrench_limit, is_within_joint_limits, Vector7, CARTESIAN_DOF, JOINT_DOF,
};

/// Lower joint limits of the simulated arms. Unit: \[rad\].
pub const SIMULATED_Q_MIN: [f64; JOINT_DOF] =
    [-2.7925, -2.2689, -2.9671, -1.8675, -2.9671, -1.3963, -2.9671];
/// Upper joint limits of the simulated arms. Unit: \[rad\].
pub const SIMULATED_Q_MAX: [f64; JOINT_DOF] =
    [2.7925, 2.2689, 2.9671, 2.6878, 2.9671, 4.5379, 2.9671];
/// Joint positions both simulated arms start in. Unit: \[rad\].
pub const SIMULATED_Q_START: [f64; JOINT_DOF] = [0., -0.698, 0., 1.571, 0., 0.698, 0.];

/// Duration of one simulated control step. Unit: \[s\].
const SIMULATED_STEP: f64 = 0.001;
/// Fraction of the remaining null-space posture error removed per step.
const POSTURE_GAIN: f64 = 0.002;
const GRIPPER_MAX_WIDTH: f64 = 0.1;
const GRIPPER_DEFAULT_VELOCITY: f64 = 0.1;

/// In-process stand-in for a robot-to-robot teleoperation session.
///
/// Enforces the enable -> init order, keeps the commanded axis locks, postures and wrench limit,
/// pulls both arms towards their null-space postures on every [`run`](TeleopSession::run) and
/// optionally turns non-operational after a given number of steps.
pub struct SimulatedTeleop {
    local_serial: String,
    remote_serial: String,
    enabled: bool,
    initialized: bool,
    fault: bool,
    fault_after: Option<u64>,
    ticks: u64,
    local_q: Vector7,
    remote_q: Vector7,
    local_posture: Vector7,
    remote_posture: Vector7,
    max_wrench: [f64; CARTESIAN_DOF],
    axis_lock: AxisLockState,
    gripper: Option<SimulatedGripper>,
}

struct SimulatedGripper {
    state: GripperState,
    target: Option<f64>,
    velocity: f64,
}

impl SimulatedTeleop {
    /// Creates a simulated session for a local/remote robot pair.
    /// # Arguments
    /// * `local_serial` - serial number of the local robot
    /// * `remote_serial` - serial number of the remote robot
    /// * `license_path` - path to the license config file. Only its existence is checked.
    /// # Errors
    /// * [`SessionError`](`crate::exception::TeleopException::SessionError`) if a serial number
    /// is empty or the license file does not exist.
    pub fn new(
        local_serial: &str,
        remote_serial: &str,
        license_path: &Path,
    ) -> TeleopResult<SimulatedTeleop> {
        if local_serial.is_empty() || remote_serial.is_empty() {
            return Err(create_session_error(
                "teleop: serial numbers of local and remote robot are required",
            ));
        }
        if !license_path.is_file() {
            return Err(TeleopException::SessionError {
                message: format!(
                    "teleop: license config file {} does not exist",
                    license_path.display()
                ),
            });
        }
        let start = Vector7::from_row_slice(&SIMULATED_Q_START);
        Ok(SimulatedTeleop {
            local_serial: local_serial.to_string(),
            remote_serial: remote_serial.to_string(),
            enabled: false,
            initialized: false,
            fault: false,
            fault_after: None,
            ticks: 0,
            local_q: start,
            remote_q: start,
            local_posture: start,
            remote_posture: start,
            max_wrench: [f64::INFINITY; CARTESIAN_DOF],
            axis_lock: AxisLockState::default(),
            gripper: None,
        })
    }

    /// Lets the session report a fault once `ticks` control steps have been run.
    pub fn with_fault_after(mut self, ticks: u64) -> Self {
        self.fault_after = Some(ticks);
        self
    }

    /// Number of control steps run so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn serial_numbers(&self) -> (&str, &str) {
        (&self.local_serial, &self.remote_serial)
    }

    pub fn remote_max_wrench(&self) -> [f64; CARTESIAN_DOF] {
        self.max_wrench
    }

    fn robot_info(q: &Vector7) -> TeleopRobotInfo {
        TeleopRobotInfo {
            q_min: SIMULATED_Q_MIN,
            q_max: SIMULATED_Q_MAX,
            q_current: (*q).into(),
        }
    }

    fn checked_posture(posture: &[f64; JOINT_DOF]) -> TeleopResult<Vector7> {
        if !is_within_joint_limits(posture, &SIMULATED_Q_MIN, &SIMULATED_Q_MAX) {
            return Err(create_session_error(
                "teleop: null-space posture outside of the joint limits",
            ));
        }
        Ok(Vector7::from_row_slice(posture))
    }

    fn gripper_mut(&mut self) -> TeleopResult<&mut SimulatedGripper> {
        self.gripper
            .as_mut()
            .ok_or_else(|| TeleopException::GripperException {
                message: "teleop gripper: Gripper is not initialized!".to_string(),
            })
    }
}

impl TeleopSession for SimulatedTeleop {
    fn enable(&mut self) -> TeleopResult<()> {
        self.enabled = true;
        debug!(
            local = %self.local_serial,
            remote = %self.remote_serial,
            "simulated teleop enabled"
        );
        Ok(())
    }

    fn init(&mut self) -> TeleopResult<()> {
        if !self.enabled {
            return Err(create_session_error("teleop: robots are not enabled"));
        }
        self.initialized = true;
        Ok(())
    }

    fn stop(&mut self) -> TeleopResult<()> {
        self.enabled = false;
        self.initialized = false;
        if let Some(gripper) = self.gripper.as_mut() {
            gripper.target = None;
        }
        Ok(())
    }

    fn is_fault(&self) -> bool {
        self.fault
    }

    fn clear_fault(&mut self) -> TeleopResult<bool> {
        self.fault = false;
        self.fault_after = None;
        Ok(true)
    }

    fn is_operational(&self) -> bool {
        self.enabled && self.initialized && !self.fault
    }

    fn run(&mut self) -> TeleopResult<()> {
        if !self.initialized {
            return Err(create_session_error("teleop: robots are not initialized"));
        }
        self.ticks += 1;
        self.local_q += (self.local_posture - self.local_q) * POSTURE_GAIN;
        self.remote_q += (self.remote_posture - self.remote_q) * POSTURE_GAIN;
        if let Some(gripper) = self.gripper.as_mut() {
            if let Some(target) = gripper.target {
                let step = gripper.velocity.abs() * SIMULATED_STEP;
                let error = target - gripper.state.width;
                if error.abs() <= step {
                    gripper.state.width = target;
                    gripper.target = None;
                } else {
                    gripper.state.width += step * error.signum();
                }
            }
        }
        if self.fault_after.map_or(false, |limit| self.ticks >= limit) {
            self.fault = true;
        }
        Ok(())
    }

    fn set_local_null_space_posture(&mut self, posture: [f64; JOINT_DOF]) -> TeleopResult<()> {
        self.local_posture = SimulatedTeleop::checked_posture(&posture)?;
        Ok(())
    }

    fn set_remote_null_space_posture(&mut self, posture: [f64; JOINT_DOF]) -> TeleopResult<()> {
        self.remote_posture = SimulatedTeleop::checked_posture(&posture)?;
        Ok(())
    }

    fn set_remote_max_wrench(&mut self, wrench: [f64; CARTESIAN_DOF]) -> TeleopResult<()> {
        if !is_valid_wrench_limit(&wrench) {
            return Err(create_session_error(
                "teleop: maximum wrench has to be finite and non-negative",
            ));
        }
        self.max_wrench = wrench;
        Ok(())
    }

    fn local_info(&self) -> TeleopRobotInfo {
        SimulatedTeleop::robot_info(&self.local_q)
    }

    fn remote_info(&self) -> TeleopRobotInfo {
        SimulatedTeleop::robot_info(&self.remote_q)
    }

    fn set_local_axis_lock_cmd(&mut self, state: AxisLockState) -> TeleopResult<()> {
        if !self.enabled {
            return Err(TeleopException::SessionCommandRejected {
                message: "teleop: robots are not enabled".to_string(),
            });
        }
        self.axis_lock = state;
        Ok(())
    }

    fn get_local_axis_lock_state(&self) -> TeleopResult<AxisLockState> {
        Ok(self.axis_lock)
    }
}

impl RemoteGripper for SimulatedTeleop {
    fn init_gripper(&mut self) -> TeleopResult<()> {
        if !self.initialized {
            return Err(create_session_error("teleop: robots are not initialized"));
        }
        self.gripper = Some(SimulatedGripper {
            state: GripperState {
                width: GRIPPER_MAX_WIDTH,
                force: 0.,
                max_width: GRIPPER_MAX_WIDTH,
            },
            target: None,
            velocity: GRIPPER_DEFAULT_VELOCITY,
        });
        Ok(())
    }

    fn grasp(&mut self, force: f64) -> TeleopResult<()> {
        let gripper = self.gripper_mut()?;
        gripper.state.force = force;
        gripper.velocity = GRIPPER_DEFAULT_VELOCITY;
        gripper.target = Some(if force > 0. {
            0.
        } else {
            gripper.state.max_width
        });
        Ok(())
    }

    fn move_gripper(
        &mut self,
        width: f64,
        velocity: f64,
        force_limit: Option<f64>,
    ) -> TeleopResult<()> {
        check_move_request(width, velocity, force_limit)?;
        let gripper = self.gripper_mut()?;
        gripper.velocity = velocity;
        gripper.target = Some(saturate_width(width, gripper.state.max_width));
        Ok(())
    }

    fn stop_gripper(&mut self) -> TeleopResult<()> {
        self.gripper_mut()?.target = None;
        Ok(())
    }

    fn gripper_state(&self) -> TeleopResult<GripperState> {
        self.gripper
            .as_ref()
            .map(|gripper| gripper.state)
            .ok_or_else(|| TeleopException::GripperException {
                message: "teleop gripper: Gripper is not initialized!".to_string(),
            })
    }

    fn is_gripper_moving(&self) -> bool {
        self.gripper
            .as_ref()
            .map_or(false, |gripper| gripper.target.is_some())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::axis_lock::{Axis, CoordinateFrame};
    use std::path::PathBuf;

    /// A license path which exists on every test machine.
    pub(crate) fn license_path() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml")
    }

    pub(crate) fn ready_session() -> SimulatedTeleop {
        let mut session =
            SimulatedTeleop::new("Rizon4s-123456", "Rizon4s-654321", &license_path()).unwrap();
        session.enable().unwrap();
        session.init().unwrap();
        session
    }

    #[test]
    fn construction_checks_arguments() {
        assert!(SimulatedTeleop::new("", "Rizon4s-654321", &license_path()).is_err());
        match SimulatedTeleop::new("a", "b", Path::new("/nonexistent/licenseCfg.json")) {
            Err(TeleopException::SessionError { message }) => {
                assert!(message.contains("licenseCfg.json"))
            }
            other => panic!("expected session error, got {:?}", other.map(|_| ())),
        }
        let session = SimulatedTeleop::new("a", "b", &license_path()).unwrap();
        assert_eq!(session.serial_numbers(), ("a", "b"));
    }

    #[test]
    fn init_requires_enable() {
        let mut session = SimulatedTeleop::new("a", "b", &license_path()).unwrap();
        assert!(session.init().is_err());
        assert!(session.run().is_err());
        assert!(!session.is_operational());
        session.enable().unwrap();
        session.init().unwrap();
        assert!(session.is_operational());
        session.run().unwrap();
        assert_eq!(session.ticks(), 1);
        session.stop().unwrap();
        assert!(!session.is_operational());
    }

    #[test]
    fn fault_injection() {
        let mut session = ready_session().with_fault_after(3);
        for _ in 0..2 {
            session.run().unwrap();
            assert!(session.is_operational());
        }
        session.run().unwrap();
        assert!(session.is_fault());
        assert!(!session.is_operational());
        assert!(session.clear_fault().unwrap());
        assert!(session.is_operational());
    }

    #[test]
    fn postures_and_wrench_are_validated() {
        let mut session = ready_session();
        let preferred = [-0.67, -0.98, 0.89, 1.55, -0.85, 0.54, 0.46];
        session.set_local_null_space_posture(preferred).unwrap();
        let mut outside = preferred;
        outside[0] = 3.;
        assert!(session.set_remote_null_space_posture(outside).is_err());
        session
            .set_remote_max_wrench([80., 80., 80., 24., 24., 24.])
            .unwrap();
        assert!(session
            .set_remote_max_wrench([80., 80., -80., 24., 24., 24.])
            .is_err());
        assert_eq!(session.remote_max_wrench(), [80., 80., 80., 24., 24., 24.]);
    }

    #[test]
    fn local_arm_moves_towards_posture() {
        let mut session = ready_session();
        let preferred = [-0.67, -0.98, 0.89, 1.55, -0.85, 0.54, 0.46];
        session.set_local_null_space_posture(preferred).unwrap();
        let error_before = (session.local_info().q_current[0] - preferred[0]).abs();
        for _ in 0..100 {
            session.run().unwrap();
        }
        let error_after = (session.local_info().q_current[0] - preferred[0]).abs();
        assert!(error_after < error_before);
        assert_eq!(session.remote_info().q_current, SIMULATED_Q_START);
    }

    #[test]
    fn axis_lock_requires_enabled_robots() {
        let mut session = SimulatedTeleop::new("a", "b", &license_path()).unwrap();
        let state = AxisLockState::only_floating(CoordinateFrame::Tcp, Axis::TranslationX);
        match session.set_local_axis_lock_cmd(state) {
            Err(TeleopException::SessionCommandRejected { .. }) => {}
            other => panic!("expected rejected command, got {:?}", other),
        }
        session.enable().unwrap();
        session.set_local_axis_lock_cmd(state).unwrap();
        assert_eq!(session.get_local_axis_lock_state().unwrap(), state);
    }

    #[test]
    fn gripper_moves_to_saturated_target() {
        let mut session = ready_session();
        assert!(session.gripper_state().is_err());
        session.init_gripper().unwrap();
        session.move_gripper(0.5, 0.1, None).unwrap();
        session.run().unwrap();
        assert!(!session.is_gripper_moving());
        assert_eq!(session.gripper_state().unwrap().width, 0.1);
        session.move_gripper(0.0995, 0.1, Some(20.)).unwrap();
        assert!(session.is_gripper_moving());
        for _ in 0..10 {
            session.run().unwrap();
        }
        assert!(!session.is_gripper_moving());
        assert!((session.gripper_state().unwrap().width - 0.0995).abs() < 1e-9);
        assert!(session.move_gripper(0.05, 0., None).is_err());
        session.grasp(30.).unwrap();
        assert!(session.is_gripper_moving());
        session.stop_gripper().unwrap();
        assert!(!session.is_gripper_moving());
        assert_eq!(session.gripper_state().unwrap().force, 30.);
    }
}
