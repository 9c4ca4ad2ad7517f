// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Turns SIGINT and SIGTERM into a cancelled [`StopToken`].
use std::sync::atomic::{AtomicBool, Ordering};

use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use tracing::info;

use crate::exception::TeleopException;
use crate::scheduler::{ScheduledTask, StopToken, TaskKind};
use crate::TeleopResult;

static TERMINATION_REQUESTED: AtomicBool = AtomicBool::new(false);

extern "C" fn request_termination(_: libc::c_int) {
    TERMINATION_REQUESTED.store(true, Ordering::SeqCst);
}

/// Installs a handler for SIGINT and SIGTERM which only records that a signal arrived.
///
/// Use [`termination_watch_task`] to forward the request to a scheduler.
/// # Errors
/// * SchedulerException if a handler cannot be installed.
pub fn install_termination_handler() -> TeleopResult<()> {
    let action = SigAction::new(
        SigHandler::Handler(request_termination),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    for signal in [Signal::SIGINT, Signal::SIGTERM].iter() {
        unsafe { sigaction(*signal, &action) }.map_err(|error| {
            TeleopException::SchedulerException {
                message: format!("teleop: unable to install {:?} handler: {}", signal, error),
            }
        })?;
    }
    Ok(())
}

/// Whether SIGINT or SIGTERM was received since [`install_termination_handler`].
pub fn termination_requested() -> bool {
    TERMINATION_REQUESTED.load(Ordering::SeqCst)
}

/// Creates an [`Auxiliary`](TaskKind::Auxiliary) task which signals `stop` once a termination
/// signal was received.
pub fn termination_watch_task<'a>(
    stop: StopToken,
    period_ms: u64,
    priority: i32,
) -> TeleopResult<ScheduledTask<'a>> {
    ScheduledTask::new(
        "termination",
        period_ms,
        priority,
        TaskKind::Auxiliary,
        move || {
            if termination_requested() && stop.signal() {
                info!("termination signal received, stopping");
            }
            Ok(())
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::sys::signal::raise;

    #[test]
    fn signal_cancels_the_token() {
        install_termination_handler().unwrap();
        let stop = StopToken::new();
        let mut task = termination_watch_task(stop.clone(), 10, 1).unwrap();
        raise(Signal::SIGTERM).unwrap();
        assert!(termination_requested());
        (task.callback)().unwrap();
        assert!(stop.is_cancelled());
    }
}
