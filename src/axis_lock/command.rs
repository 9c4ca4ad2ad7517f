// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Parsing of console keys into axis-lock commands.
//!
//! Lowercase keys address the WORLD frame, uppercase keys the TCP frame:
//!
//! | key       | axis                       |
//! |-----------|----------------------------|
//! | `x` / `X` | translation along X        |
//! | `y` / `Y` | translation along Y        |
//! | `z` / `Z` | translation along Z        |
//! | `q` / `Q` | rotation about X           |
//! | `w` / `W` | rotation about Y           |
//! | `e` / `E` | rotation about Z           |
use crate::axis_lock::state::{Axis, CoordinateFrame};
use crate::exception::{TeleopException, TeleopResult};

/// Key which prints the console help menu.
pub const HELP_KEY: char = 'm';

/// Toggles the lock of one axis in one frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AxisCommand {
    pub axis: Axis,
    pub frame: CoordinateFrame,
}

/// Maps a console key to an [`AxisCommand`].
///
/// # Errors
/// * [`InvalidCommand`](`crate::exception::TeleopException::InvalidCommand`) if the key is not
/// one of the twelve axis keys.
pub fn parse_command(key: char) -> TeleopResult<AxisCommand> {
    let frame = if key.is_ascii_uppercase() {
        CoordinateFrame::Tcp
    } else {
        CoordinateFrame::World
    };
    let axis = match key.to_ascii_lowercase() {
        'x' => Axis::TranslationX,
        'y' => Axis::TranslationY,
        'z' => Axis::TranslationZ,
        'q' => Axis::RotationX,
        'w' => Axis::RotationY,
        'e' => Axis::RotationZ,
        _ => return Err(TeleopException::InvalidCommand { key }),
    };
    Ok(AxisCommand { axis, frame })
}

/// Returns the console key bound to `command`.
pub fn command_key(command: &AxisCommand) -> char {
    let key = match command.axis {
        Axis::TranslationX => 'x',
        Axis::TranslationY => 'y',
        Axis::TranslationZ => 'z',
        Axis::RotationX => 'q',
        Axis::RotationY => 'w',
        Axis::RotationZ => 'e',
    };
    match command.frame {
        CoordinateFrame::World => key,
        CoordinateFrame::Tcp => key.to_ascii_uppercase(),
    }
}

/// Lines of the console help menu.
pub fn help_lines() -> Vec<String> {
    let mut lines = vec![">>> Simple command line GUI for teleop robot axis lock <<<".to_string()];
    for frame in [CoordinateFrame::World, CoordinateFrame::Tcp].iter() {
        for axis in Axis::ALL.iter() {
            let command = AxisCommand {
                axis: *axis,
                frame: *frame,
            };
            let motion = if *axis as usize > 2 {
                "rotational motion about"
            } else {
                "translational motion along"
            };
            lines.push(format!(
                "- {}: lock/unlock {} {} axis in {} frame.",
                command_key(&command),
                motion,
                axis,
                frame
            ));
        }
    }
    lines.push("please input command >> ".to_string());
    lines
}
