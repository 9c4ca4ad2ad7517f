// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains the deterministic axis-lock test sequence.
//!
//! Every five seconds a different single axis is left floating while the other five are locked,
//! first in the TCP frame, then in the WORLD frame. Each window is half-open, an instant on a
//! boundary belongs to the later window.
use std::time::Duration;

use crate::axis_lock::state::{Axis, AxisLockState, CoordinateFrame};

/// Length of one window of the test sequence.
pub const SCRIPT_WINDOW: Duration = Duration::from_secs(5);
/// Time after which every axis stays free in the WORLD frame.
pub const SCRIPT_DURATION: Duration = Duration::from_secs(65);

struct ScriptStep {
    start: Duration,
    frame: CoordinateFrame,
    /// `None` unlocks every axis.
    floating: Option<Axis>,
}

const fn step(start_secs: u64, frame: CoordinateFrame, floating: Option<Axis>) -> ScriptStep {
    ScriptStep {
        start: Duration::from_secs(start_secs),
        frame,
        floating,
    }
}

// sorted by start
static TIMED_SCRIPT: [ScriptStep; 14] = [
    step(0, CoordinateFrame::Tcp, Some(Axis::TranslationX)),
    step(5, CoordinateFrame::Tcp, Some(Axis::TranslationY)),
    step(10, CoordinateFrame::Tcp, Some(Axis::TranslationZ)),
    step(15, CoordinateFrame::Tcp, Some(Axis::RotationX)),
    step(20, CoordinateFrame::Tcp, Some(Axis::RotationY)),
    step(25, CoordinateFrame::Tcp, Some(Axis::RotationZ)),
    step(30, CoordinateFrame::Tcp, None),
    step(35, CoordinateFrame::World, Some(Axis::TranslationX)),
    step(40, CoordinateFrame::World, Some(Axis::TranslationY)),
    step(45, CoordinateFrame::World, Some(Axis::TranslationZ)),
    step(50, CoordinateFrame::World, Some(Axis::RotationX)),
    step(55, CoordinateFrame::World, Some(Axis::RotationY)),
    step(60, CoordinateFrame::World, Some(Axis::RotationZ)),
    step(65, CoordinateFrame::World, None),
];

/// Computes the axis-lock state the test sequence prescribes `elapsed` after its start.
pub fn scripted_state(elapsed: Duration) -> AxisLockState {
    let windows_started = TIMED_SCRIPT.partition_point(|step| step.start <= elapsed);
    // the first step starts at zero, so at least one window has started
    let step = &TIMED_SCRIPT[windows_started.max(1) - 1];
    match step.floating {
        Some(axis) => AxisLockState::only_floating(step.frame, axis),
        None => AxisLockState::free(step.frame),
    }
}
