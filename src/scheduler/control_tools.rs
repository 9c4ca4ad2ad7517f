// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains helpers for running the scheduler thread with realtime priority.
use crate::exception::TeleopException;
use crate::TeleopResult;
use std::path::Path;

/// Used to decide whether to enforce realtime mode for the scheduler thread.
/// see [`PeriodicScheduler`](`crate::scheduler::PeriodicScheduler`)
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum RealtimeConfig {
    Enforce,
    Ignore,
}

/// Determines whether the current OS kernel is a realtime kernel.
///
/// On Linux, this checks for the existence of `/sys/kernel/realtime`.
pub fn has_realtime_kernel() -> bool {
    Path::new("/sys/kernel/realtime").exists()
}

/// Highest priority a task may be registered with.
///
/// One below the maximum `SCHED_FIFO` priority, see
/// <https://rt.wiki.kernel.org/index.php/HOWTO:_Build_an_RT-application>
pub fn max_priority() -> i32 {
    let max = unsafe { libc::sched_get_priority_max(libc::SCHED_FIFO) };
    if max <= 1 {
        return 98;
    }
    max - 1
}

/// Lowest priority a task may be registered with.
pub fn min_priority() -> i32 {
    let min = unsafe { libc::sched_get_priority_min(libc::SCHED_FIFO) };
    if min < 1 {
        return 1;
    }
    min
}

/// Sets the current thread to `SCHED_FIFO` with the given priority and locks its memory.
///
/// # Errors
/// * RealtimeException if realtime priority cannot be set for the current thread.
///
/// If the method returns an Error please check your /etc/security/limits.conf file
/// There should be a line like this:
/// ```text
///marco            -       rtprio          99
/// ```
pub fn set_current_thread_priority(priority: i32) -> TeleopResult<()> {
    unsafe {
        let thread_param = libc::sched_param {
            sched_priority: priority,
        };
        if libc::pthread_setschedparam(libc::pthread_self(), libc::SCHED_FIFO, &thread_param) != 0 {
            return Err(TeleopException::RealTimeException {
                message: "teleop: unable to set realtime scheduling".to_string(),
            });
        }
        // keeps the control tick from page faults
        if libc::mlockall(libc::MCL_CURRENT | libc::MCL_FUTURE) != 0 {
            return Err(TeleopException::RealTimeException {
                message: "teleop: unable to lock memory".to_string(),
            });
        }
    }
    Ok(())
}

/// Prepares the current thread for realtime scheduling according to `config`.
///
/// # Errors
/// * RealtimeException if `config` is [`Enforce`](RealtimeConfig::Enforce) and the kernel has no
/// realtime capabilities or the priority cannot be set.
pub fn apply_realtime_config(config: RealtimeConfig, priority: i32) -> TeleopResult<()> {
    if config == RealtimeConfig::Ignore {
        return Ok(());
    }
    if !has_realtime_kernel() {
        return Err(TeleopException::RealTimeException {
            message: "teleop: Running kernel does not have realtime capabilities.".to_string(),
        });
    }
    set_current_thread_priority(priority)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_range_is_ordered() {
        assert!(min_priority() >= 1);
        assert!(max_priority() > min_priority());
    }

    #[test]
    fn ignore_never_touches_the_thread() {
        assert!(apply_realtime_config(RealtimeConfig::Ignore, max_priority()).is_ok());
    }
}
