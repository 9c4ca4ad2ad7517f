// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains exception and Result definitions
use std::time::Duration;
use thiserror::Error;

/// Represents all kind of errors which can occur while configuring or running a teleoperation
/// session.
#[derive(Error, Debug)]
pub enum TeleopException {
    /// InvalidCommand is returned if a console key does not map to an axis-lock command.
    /// The axis-lock state is left untouched.
    #[error("Invalid axis lock command {key:?}, please enter 'm' for help")]
    InvalidCommand {
        /// The rejected key.
        key: char,
    },

    /// SessionCommandRejected is returned if the session refused an axis-lock command.
    /// The local shadow state is not changed, so it may diverge from the session until
    /// it is re-synchronized.
    #[error("Session rejected axis lock command: {message}")]
    SessionCommandRejected { message: String },

    /// SessionError is returned if enabling, initializing, configuring or running a session failed.
    #[error("{message}")]
    SessionError { message: String },

    /// FaultDetected is returned by a control tick if a bound session is no longer operational.
    #[error("Fault occurred during teleoperation on session {session}, exiting ...")]
    FaultDetected {
        /// Label of the session which reported the fault.
        session: String,
    },

    /// Timeout is returned if a session operation took longer than its allowed bound.
    #[error("Session operation {operation} exceeded its bound of {bound:?}")]
    Timeout {
        operation: &'static str,
        bound: Duration,
    },

    /// SchedulerException is returned if a task is registered or started in an invalid state.
    #[error("{message}")]
    SchedulerException { message: String },

    /// RealTimeException is returned if the real-time priority cannot be set
    #[error("{message}")]
    RealTimeException { message: String },

    /// GripperException is returned if a remote gripper command cannot be executed.
    #[error("{message}")]
    GripperException { message: String },
}

impl TeleopException {
    /// Whether the error can be reported and looped past without stopping teleoperation.
    ///
    /// Only console level errors are recoverable. A [`Timeout`](Self::Timeout) is treated like
    /// a [`SessionError`](Self::SessionError).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TeleopException::InvalidCommand { .. } | TeleopException::SessionCommandRejected { .. }
        )
    }
}

/// creates a SessionError from a static string slice
pub(crate) fn create_session_error(message: &'static str) -> TeleopException {
    TeleopException::SessionError {
        message: message.to_string(),
    }
}

/// creates a SchedulerException from a static string slice
pub(crate) fn create_scheduler_exception(message: &'static str) -> TeleopException {
    TeleopException::SchedulerException {
        message: message.to_string(),
    }
}

/// Result type which can have TeleopException as Error
pub type TeleopResult<T> = Result<T, TeleopException>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_errors() {
        assert!(TeleopException::InvalidCommand { key: 'k' }.is_recoverable());
        assert!(TeleopException::SessionCommandRejected {
            message: "busy".to_string()
        }
        .is_recoverable());
        assert!(!create_session_error("init failed").is_recoverable());
        assert!(!TeleopException::FaultDetected {
            session: "left".to_string()
        }
        .is_recoverable());
        assert!(!TeleopException::Timeout {
            operation: "run",
            bound: Duration::from_millis(1)
        }
        .is_recoverable());
    }

    #[test]
    fn invalid_command_hints_at_help() {
        let message = TeleopException::InvalidCommand { key: 'k' }.to_string();
        assert!(message.contains("'k'"));
        assert!(message.contains("'m' for help"));
    }
}
