// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains everything needed for locking the motion of the local robot along or about single
//! Cartesian axes during teleoperation.

pub mod command;
pub mod controller;
pub mod script;
pub mod state;

pub use command::{parse_command, AxisCommand, HELP_KEY};
pub use controller::AxisLockController;
pub use script::scripted_state;
pub use state::{Axis, AxisCategory, AxisLockState, CoordinateFrame};
