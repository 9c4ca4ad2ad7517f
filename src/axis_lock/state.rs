// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains the [`AxisLockState`] type and the axis and frame definitions it is built from.
use std::fmt;

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

/// Reference frame in which the axes are locked.
#[derive(Serialize_repr, Deserialize_repr, Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CoordinateFrame {
    /// Tool center point frame of the local robot.
    Tcp = 1,
    /// World frame of the local robot.
    World = 2,
}

impl Default for CoordinateFrame {
    fn default() -> Self {
        CoordinateFrame::World
    }
}

impl fmt::Display for CoordinateFrame {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CoordinateFrame::Tcp => write!(f, "TCP"),
            CoordinateFrame::World => write!(f, "WORLD"),
        }
    }
}

/// Whether an axis constrains translation or rotation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AxisCategory {
    Translation,
    Rotation,
}

/// One of the six Cartesian motion axes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, FromPrimitive)]
pub enum Axis {
    TranslationX = 0,
    TranslationY = 1,
    TranslationZ = 2,
    RotationX = 3,
    RotationY = 4,
    RotationZ = 5,
}

impl Axis {
    /// All axes, translational ones first.
    pub const ALL: [Axis; 6] = [
        Axis::TranslationX,
        Axis::TranslationY,
        Axis::TranslationZ,
        Axis::RotationX,
        Axis::RotationY,
        Axis::RotationZ,
    ];

    /// Returns the axis at position `index` of [`ALL`](Self::ALL), if any.
    pub fn from_index(index: usize) -> Option<Axis> {
        Axis::from_usize(index)
    }

    pub fn category(&self) -> AxisCategory {
        if self.position() < 3 {
            AxisCategory::Translation
        } else {
            AxisCategory::Rotation
        }
    }

    /// Index of the axis inside its category list (X = 0, Y = 1, Z = 2).
    pub fn index(&self) -> usize {
        self.position() % 3
    }

    fn position(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Axis::TranslationX => "X",
            Axis::TranslationY => "Y",
            Axis::TranslationZ => "Z",
            Axis::RotationX => "Rx",
            Axis::RotationY => "Ry",
            Axis::RotationZ => "Rz",
        };
        write!(f, "{}", name)
    }
}

/// Axis locking command and state of the local robot.
///
/// Holds the reference frame and which of the translational \[X, Y, Z\] and rotational
/// \[Rx, Ry, Rz\] axes are locked in it. `true` means locked, `false` means floating.
/// Exactly one frame is active per snapshot.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct AxisLockState {
    /// Reference frame the lock lists apply to.
    pub frame: CoordinateFrame,
    /// Translational axis locks in order \[X, Y, Z\].
    pub translation_locks: [bool; 3],
    /// Rotational axis locks in order \[Rx, Ry, Rz\].
    pub rotation_locks: [bool; 3],
}

impl AxisLockState {
    /// Creates a state where every axis of `frame` floats freely.
    pub fn free(frame: CoordinateFrame) -> Self {
        AxisLockState {
            frame,
            translation_locks: [false; 3],
            rotation_locks: [false; 3],
        }
    }

    /// Creates a state where only `axis` floats and the other five axes are locked.
    pub fn only_floating(frame: CoordinateFrame, axis: Axis) -> Self {
        let mut state = AxisLockState {
            frame,
            translation_locks: [true; 3],
            rotation_locks: [true; 3],
        };
        state.set_locked(axis, false);
        state
    }

    pub fn is_locked(&self, axis: Axis) -> bool {
        match axis.category() {
            AxisCategory::Translation => self.translation_locks[axis.index()],
            AxisCategory::Rotation => self.rotation_locks[axis.index()],
        }
    }

    pub fn set_locked(&mut self, axis: Axis, locked: bool) {
        match axis.category() {
            AxisCategory::Translation => self.translation_locks[axis.index()] = locked,
            AxisCategory::Rotation => self.rotation_locks[axis.index()] = locked,
        }
    }

    /// Number of locked axes.
    pub fn locked_count(&self) -> usize {
        self.translation_locks
            .iter()
            .chain(self.rotation_locks.iter())
            .filter(|x| **x)
            .count()
    }
}

impl fmt::Display for AxisLockState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}]", self.frame)?;
        for axis in Axis::ALL.iter() {
            write!(
                f,
                " {}:{}",
                axis,
                if self.is_locked(*axis) { "locked" } else { "free" }
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bincode::{deserialize, serialize, serialized_size};

    #[test]
    fn lock_state_encoding() {
        let state = AxisLockState::only_floating(CoordinateFrame::Tcp, Axis::RotationZ);
        assert_eq!(serialized_size(&state).unwrap(), 7);
        let bytes = serialize(&state).unwrap();
        assert_eq!(bytes, vec![1, 1, 1, 1, 1, 1, 0]);
        let decoded: AxisLockState = deserialize(&bytes).unwrap();
        assert_eq!(decoded, state);

        assert_eq!(serialize(&CoordinateFrame::World).unwrap(), vec![2]);
        assert!(deserialize::<CoordinateFrame>(&[3]).is_err());
    }

    #[test]
    fn axis_categories_and_indices() {
        for (i, axis) in Axis::ALL.iter().enumerate() {
            assert_eq!(Axis::from_index(i), Some(*axis));
            assert_eq!(axis.index(), i % 3);
        }
        assert_eq!(Axis::TranslationZ.category(), AxisCategory::Translation);
        assert_eq!(Axis::RotationX.category(), AxisCategory::Rotation);
        assert_eq!(Axis::from_index(6), None);
    }

    #[test]
    fn default_state_is_free_in_world() {
        let state = AxisLockState::default();
        assert_eq!(state, AxisLockState::free(CoordinateFrame::World));
        assert_eq!(state.locked_count(), 0);
    }

    #[test]
    fn only_floating_locks_five_axes() {
        for axis in Axis::ALL.iter() {
            let state = AxisLockState::only_floating(CoordinateFrame::Tcp, *axis);
            assert_eq!(state.frame, CoordinateFrame::Tcp);
            assert_eq!(state.locked_count(), 5);
            assert!(!state.is_locked(*axis));
        }
    }

    #[test]
    fn display_lists_every_axis() {
        let state = AxisLockState::only_floating(CoordinateFrame::World, Axis::RotationZ);
        assert_eq!(
            state.to_string(),
            "[WORLD] X:locked Y:locked Z:locked Rx:locked Ry:locked Rz:free"
        );
    }
}
