// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains the [`AxisLockController`] which turns console commands and the timed test sequence
//! into axis-lock commands for a session.
use std::time::Duration;

use tracing::debug;

use crate::axis_lock::command::{parse_command, AxisCommand};
use crate::axis_lock::script::scripted_state;
use crate::axis_lock::state::{AxisLockState, CoordinateFrame};
use crate::exception::{TeleopException, TeleopResult};
use crate::session::{SharedSession, TeleopSession};

/// Shadow of the local robot's axis-lock state, bound to one session.
///
/// Every change is pushed to the session with
/// [`set_local_axis_lock_cmd`](`crate::session::TeleopSession::set_local_axis_lock_cmd`).
/// A toggle flips one flag of the current lock lists and makes the key's frame the active one.
pub struct AxisLockController<S: TeleopSession> {
    session: SharedSession<S>,
    state: AxisLockState,
}

impl<S: TeleopSession> AxisLockController<S> {
    /// Creates a controller with every axis free in the WORLD frame.
    pub fn new(session: SharedSession<S>) -> Self {
        AxisLockController {
            session,
            state: AxisLockState::free(CoordinateFrame::World),
        }
    }

    /// Current shadow state.
    pub fn current_state(&self) -> AxisLockState {
        self.state
    }

    /// Toggles the axis bound to a console key.
    ///
    /// # Errors
    /// * [`InvalidCommand`](`crate::exception::TeleopException::InvalidCommand`) if the key is
    /// unknown. Nothing is pushed and the state is unchanged.
    /// * [`SessionCommandRejected`](`crate::exception::TeleopException::SessionCommandRejected`)
    /// if the session refused the new state. The state is unchanged.
    pub fn apply_toggle(&mut self, key: char) -> TeleopResult<AxisLockState> {
        let command = parse_command(key)?;
        self.apply_command(command)
    }

    /// Flips the lock of `command.axis` in the current state and makes `command.frame` active.
    pub fn apply_command(&mut self, command: AxisCommand) -> TeleopResult<AxisLockState> {
        let mut next = self.state;
        next.frame = command.frame;
        next.set_locked(command.axis, !next.is_locked(command.axis));
        self.commit(next)
    }

    /// Applies the state the timed test sequence prescribes `elapsed` after its start.
    ///
    /// See [`scripted_state`](`crate::axis_lock::script::scripted_state`) for the sequence.
    pub fn apply_timed_script(&mut self, elapsed: Duration) -> TeleopResult<AxisLockState> {
        self.commit(scripted_state(elapsed))
    }

    /// Replaces the shadow state with the state reported by the session.
    ///
    /// Used after a rejected command, when the shadow state and the session may disagree.
    pub fn resync(&mut self) -> TeleopResult<AxisLockState> {
        let state = self.session.borrow().get_local_axis_lock_state()?;
        debug!(%state, "axis lock state resynchronized from session");
        self.state = state;
        Ok(state)
    }

    fn commit(&mut self, next: AxisLockState) -> TeleopResult<AxisLockState> {
        self.session
            .borrow_mut()
            .set_local_axis_lock_cmd(next)
            .map_err(|error| match error {
                rejected @ TeleopException::SessionCommandRejected { .. } => rejected,
                other => TeleopException::SessionCommandRejected {
                    message: other.to_string(),
                },
            })?;
        self.state = next;
        Ok(next)
    }
}
