// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains the startup sequence which has to complete before a session is scheduled.
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::exception::TeleopResult;
use crate::session::teleop_session::TeleopSession;
use crate::utils::{CARTESIAN_DOF, JOINT_DOF};

/// Preferred joint positions which keep both arms in a comfortable elbow-up configuration.
/// Unit: \[rad\].
pub const PREFERRED_JOINT_POSITIONS: [f64; JOINT_DOF] =
    [-0.67, -0.98, 0.89, 1.55, -0.85, 0.54, 0.46];
/// Maximum contact wrench of the remote robot, low enough to be handled by a human hand.
/// Unit: \[N\] \[Nm\].
pub const DEFAULT_MAX_REMOTE_WRENCH: [f64; CARTESIAN_DOF] = [80.0, 80.0, 80.0, 24.0, 24.0, 24.0];
/// Time the arms need to reach their null-space posture before teleoperation starts.
pub const DEFAULT_READY_DELAY: Duration = Duration::from_secs(3);

/// Where the null-space posture of an arm comes from.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub enum NullSpacePosture {
    /// Fixed joint positions. Unit: \[rad\].
    Preferred([f64; JOINT_DOF]),
    /// The joint positions the arm is in when the session is prepared.
    Current,
}

/// Configuration applied to a session by [`prepare_session`].
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct SetupParameters {
    pub local_null_space_posture: NullSpacePosture,
    pub remote_null_space_posture: NullSpacePosture,
    /// Maximum contact wrench of the remote robot. Unit: \[N\] \[Nm\].
    pub remote_max_wrench: [f64; CARTESIAN_DOF],
    /// Grace delay between configuration and the first control tick.
    pub ready_delay: Duration,
}

impl Default for SetupParameters {
    fn default() -> Self {
        SetupParameters {
            local_null_space_posture: NullSpacePosture::Preferred(PREFERRED_JOINT_POSITIONS),
            remote_null_space_posture: NullSpacePosture::Preferred(PREFERRED_JOINT_POSITIONS),
            remote_max_wrench: DEFAULT_MAX_REMOTE_WRENCH,
            ready_delay: DEFAULT_READY_DELAY,
        }
    }
}

impl SetupParameters {
    /// Parameters which keep both arms in the posture they are in.
    pub fn hold_current_posture() -> Self {
        SetupParameters {
            local_null_space_posture: NullSpacePosture::Current,
            remote_null_space_posture: NullSpacePosture::Current,
            ..SetupParameters::default()
        }
    }
}

/// Enables, initializes and configures a session.
///
/// The calls are issued in the order enable, init, local null-space posture, remote null-space
/// posture, remote maximum wrench. The first error aborts the sequence.
/// The [`ready_delay`](SetupParameters::ready_delay) is not waited here.
pub fn prepare_session<S: TeleopSession + ?Sized>(
    session: &mut S,
    parameters: &SetupParameters,
) -> TeleopResult<()> {
    session.enable()?;
    session.init()?;
    info!("teleop robots enabled and initialized");

    let local_posture = match parameters.local_null_space_posture {
        NullSpacePosture::Preferred(q) => q,
        NullSpacePosture::Current => session.local_info().q_current,
    };
    session.set_local_null_space_posture(local_posture)?;
    let remote_posture = match parameters.remote_null_space_posture {
        NullSpacePosture::Preferred(q) => q,
        NullSpacePosture::Current => session.remote_info().q_current,
    };
    session.set_remote_null_space_posture(remote_posture)?;
    session.set_remote_max_wrench(parameters.remote_max_wrench)?;
    info!(
        ?local_posture,
        ?remote_posture,
        max_wrench = ?parameters.remote_max_wrench,
        "teleop session configured"
    );
    Ok(())
}
