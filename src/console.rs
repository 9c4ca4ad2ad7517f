// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains the console and timed-sequence tasks which drive an [`AxisLockController`].
//!
//! Blocking reads of user input happen on a separate thread and reach the scheduler through a
//! channel, so a waiting console never delays a control tick.
use std::io::BufRead;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::axis_lock::command::{help_lines, HELP_KEY};
use crate::axis_lock::controller::AxisLockController;
use crate::exception::TeleopException;
use crate::scheduler::{ScheduledTask, StopToken, TaskKind};
use crate::session::TeleopSession;
use crate::TeleopResult;

/// Keys typed on the console, one per input line.
pub struct ConsoleInput {
    receiver: Receiver<char>,
}

impl ConsoleInput {
    /// Starts a thread which reads `reader` line by line and forwards the first non-blank
    /// character of each line.
    ///
    /// The thread ends on end of input, on a read error, or at the next line once `stop` is
    /// cancelled.
    /// # Errors
    /// * SchedulerException if the thread cannot be spawned.
    pub fn spawn<R: BufRead + Send + 'static>(reader: R, stop: StopToken) -> TeleopResult<Self> {
        let (sender, receiver) = mpsc::channel();
        thread::Builder::new()
            .name("console-input".to_string())
            .spawn(move || {
                for line in reader.lines() {
                    if stop.is_cancelled() {
                        break;
                    }
                    match line {
                        Ok(line) => {
                            if let Some(key) = line.trim().chars().next() {
                                if sender.send(key).is_err() {
                                    break;
                                }
                            }
                        }
                        Err(error) => {
                            warn!(%error, "reading console input failed");
                            break;
                        }
                    }
                }
            })
            .map_err(|error| TeleopException::SchedulerException {
                message: format!("teleop: unable to spawn console reader: {}", error),
            })?;
        Ok(ConsoleInput { receiver })
    }

    /// Takes every key received so far without blocking.
    pub fn drain(&self) -> Vec<char> {
        self.receiver.try_iter().collect()
    }

    /// Waits up to `timeout` for the next key.
    /// Returns `None` on timeout or once the reader thread has ended.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<char> {
        match self.receiver.recv_timeout(timeout) {
            Ok(key) => Some(key),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

/// Applies one console key. Recoverable errors are logged here, a rejected command additionally
/// re-synchronizes the controller with the session.
fn handle_key<S: TeleopSession>(
    controller: &mut AxisLockController<S>,
    key: char,
) -> TeleopResult<()> {
    if key == HELP_KEY {
        for line in help_lines() {
            info!("{}", line);
        }
        return Ok(());
    }
    match controller.apply_toggle(key) {
        Ok(state) => info!(%state, "axis lock state updated"),
        Err(error) if error.is_recoverable() => {
            warn!(%error);
            if let TeleopException::SessionCommandRejected { .. } = error {
                let state = controller.resync()?;
                info!(%state, "axis lock state after re-synchronization");
            }
        }
        Err(error) => return Err(error),
    }
    Ok(())
}

/// Creates an [`Auxiliary`](TaskKind::Auxiliary) task which applies the keys typed on the console.
///
/// The controller adopts the session's current axis-lock state before the task is created.
/// Unknown keys and rejected commands are logged and never stop the scheduler. Every key received
/// in one period is applied; the first unrecoverable error, such as a failed re-synchronization,
/// is returned afterwards and logged by the scheduler.
/// # Errors
/// * The error of the initial [`resync`](AxisLockController::resync).
/// * SchedulerException if `period_ms` is zero.
pub fn console_task<'a, S: TeleopSession + 'a>(
    mut controller: AxisLockController<S>,
    input: ConsoleInput,
    period_ms: u64,
    priority: i32,
) -> TeleopResult<ScheduledTask<'a>> {
    let state = controller.resync()?;
    info!(%state, "initial axis lock state");
    ScheduledTask::new("console", period_ms, priority, TaskKind::Auxiliary, move || {
        let mut result = Ok(());
        for key in input.drain() {
            if let Err(error) = handle_key(&mut controller, key) {
                if result.is_ok() {
                    result = Err(error);
                }
            }
        }
        result
    })
}

/// Creates an [`Auxiliary`](TaskKind::Auxiliary) task which walks through the timed axis-lock
/// test sequence, measured from the first invocation.
pub fn script_task<'a, S: TeleopSession + 'a>(
    mut controller: AxisLockController<S>,
    period_ms: u64,
    priority: i32,
) -> TeleopResult<ScheduledTask<'a>> {
    let mut started: Option<Instant> = None;
    let mut last_state = None;
    ScheduledTask::new("script", period_ms, priority, TaskKind::Auxiliary, move || {
        let elapsed = started.get_or_insert_with(Instant::now).elapsed();
        let state = controller.apply_timed_script(elapsed)?;
        if last_state != Some(state) {
            info!(%state, elapsed = ?elapsed, "axis lock test sequence advanced");
            last_state = Some(state);
        }
        Ok(())
    })
}
