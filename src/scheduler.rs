// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains the periodic scheduler which drives teleoperation sessions and console tasks.
pub mod cancellation;
pub mod control_task;
pub mod control_tools;
pub mod periodic;
pub mod task;

pub use cancellation::StopToken;
pub use control_task::ControlTask;
pub use control_tools::RealtimeConfig;
pub use periodic::{PeriodicScheduler, SchedulerState, StopReason};
pub use task::{ScheduledTask, TaskKind, TaskStats};
