// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! # teleop-rs
//! teleop-rs is a library to run robot-to-robot teleoperation sessions with axis locking.
//! A local robot is guided by an operator while a remote robot follows it. Single translation or
//! rotation axes of the local robot can be locked in the TCP or WORLD frame.
//!
//! **ALWAYS HAVE THE USER STOP BUTTON OF BOTH ROBOTS AT
//! HAND WHILE TELEOPERATING!**
//!
//!
//! ## Design
//! The library is divided into these main Modules:
//! * [axis_lock](`crate::axis_lock`) - lock state, console commands, the timed test sequence and
//! the controller which pushes lock changes to a session.
//! * [session](`crate::session`) - the [`TeleopSession`] facade, the startup sequence, a time
//! bounded wrapper and a simulated session.
//! * [scheduler](`crate::scheduler`) - a cooperative periodic scheduler which advances sessions
//! at a high rate and stops on the first fault.
//! * [console](`crate::console`) - console and test sequence tasks for the scheduler.
//! * [gripper](`crate::gripper`) - the remote gripper interface.
//!
//! # Example:
//!```no_run
//! use std::path::Path;
//! use std::thread::sleep;
//! use teleop::scheduler::{PeriodicScheduler, StopReason};
//! use teleop::session::{share, prepare_session, SetupParameters, SimulatedTeleop};
//! use teleop::TeleopResult;
//! fn main() -> TeleopResult<()> {
//!     let mut session =
//!         SimulatedTeleop::new("Rizon4s-123456", "Rizon4s-654321", Path::new("license.json"))?;
//!     let parameters = SetupParameters::default();
//!     prepare_session(&mut session, &parameters)?;
//!     sleep(parameters.ready_delay);
//!
//!     let mut scheduler = PeriodicScheduler::new(None);
//!     let priority = scheduler.max_priority();
//!     scheduler.add_control_task("control", 1, priority, vec![("teleop".to_string(), share(session))])?;
//!     match scheduler.start()? {
//!         StopReason::Cancelled => Ok(()),
//!         StopReason::TaskFailed { error, .. } => Err(error),
//!     }
//! }
//!   ```
//!
//! Every session has to be enabled, initialized and configured before the scheduler is started.
//! [`prepare_session`](`crate::session::prepare_session`) issues these calls in the required
//! order. The control task checks all of its sessions for faults and then runs them once per
//! millisecond. The first fault or error signals the [`StopToken`](`crate::scheduler::StopToken`)
//! and [`start`](`crate::scheduler::PeriodicScheduler::start`) returns.
pub mod axis_lock;
pub mod console;
pub mod exception;
pub mod gripper;
pub mod scheduler;
pub mod session;
pub mod termination;
pub mod utils;

pub use axis_lock::{AxisLockController, AxisLockState, CoordinateFrame};
pub use exception::{TeleopException, TeleopResult};
pub use gripper::gripper_state::GripperState;
pub use gripper::RemoteGripper;
pub use scheduler::{PeriodicScheduler, RealtimeConfig, StopReason, StopToken};
pub use session::{BoundedSession, SimulatedTeleop, TeleopSession};
pub use utils::*;
