// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains the teleop::GripperState type.

use serde::Deserialize;
use serde::Serialize;

/// Describes the state of the gripper mounted on the remote robot.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Default)]
pub struct GripperState {
    /// Measured finger opening width. Unit: \[m\].
    pub width: f64,

    /// Measured finger force. Positive: opening force, negative: closing force.
    /// Reads 0 if the mounted gripper has no force sensing capability. Unit: \[N\].
    pub force: f64,

    /// Maximum finger opening width of the mounted gripper. Unit: \[m\].
    pub max_width: f64,
}
