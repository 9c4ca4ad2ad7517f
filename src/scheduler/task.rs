// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains the [`ScheduledTask`] unit of work and its runtime statistics.
use std::fmt;
use std::time::{Duration, Instant};

use crate::exception::create_scheduler_exception;
use crate::TeleopResult;

type TaskCallback<'a> = Box<dyn FnMut() -> TeleopResult<()> + 'a>;

/// Decides how the scheduler reacts to an error returned by a task.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum TaskKind {
    /// Advances teleoperation sessions. An error stops the whole scheduler.
    Control,
    /// Console input, test sequences and housekeeping. Errors are logged and the task keeps
    /// running.
    Auxiliary,
}

/// A named callback which is invoked once per period.
pub struct ScheduledTask<'a> {
    pub(crate) name: String,
    pub(crate) period: Duration,
    pub(crate) priority: i32,
    pub(crate) kind: TaskKind,
    pub(crate) callback: TaskCallback<'a>,
}

impl<'a> ScheduledTask<'a> {
    /// Creates a task.
    /// # Arguments
    /// * `name` - identifier used in log messages and [`task_stats`](`crate::scheduler::PeriodicScheduler::task_stats`)
    /// * `period_ms` - period in milliseconds, must be greater than zero
    /// * `priority` - higher values run first when several tasks are due
    /// # Errors
    /// * SchedulerException if `period_ms` is zero
    pub fn new<F>(
        name: &str,
        period_ms: u64,
        priority: i32,
        kind: TaskKind,
        callback: F,
    ) -> TeleopResult<Self>
    where
        F: FnMut() -> TeleopResult<()> + 'a,
    {
        if period_ms == 0 {
            return Err(create_scheduler_exception(
                "teleop: task period has to be greater than zero",
            ));
        }
        Ok(ScheduledTask {
            name: name.to_string(),
            period: Duration::from_millis(period_ms),
            priority,
            kind,
            callback: Box::new(callback),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn kind(&self) -> TaskKind {
        self.kind
    }
}

impl fmt::Debug for ScheduledTask<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledTask")
            .field("name", &self.name)
            .field("period", &self.period)
            .field("priority", &self.priority)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Timing statistics of one task.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct TaskStats {
    /// Number of completed invocations.
    pub ticks: u64,
    /// Invocations which started one or more periods after their release time.
    pub overruns: u64,
    /// Longest observed execution time of the callback.
    pub max_execution: Duration,
}

impl TaskStats {
    pub(crate) fn record(&mut self, started: Instant, release: Instant, period: Duration) {
        let execution = started.elapsed();
        self.ticks += 1;
        if started.saturating_duration_since(release) >= period {
            self.overruns += 1;
        }
        if execution > self.max_execution {
            self.max_execution = execution;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_period_is_rejected() {
        assert!(ScheduledTask::new("control", 0, 98, TaskKind::Control, || Ok(())).is_err());
    }

    #[test]
    fn task_keeps_its_parameters() {
        let task = ScheduledTask::new("console", 1000, 1, TaskKind::Auxiliary, || Ok(())).unwrap();
        assert_eq!(task.name(), "console");
        assert_eq!(task.period(), Duration::from_secs(1));
        assert_eq!(task.priority(), 1);
        assert_eq!(task.kind(), TaskKind::Auxiliary);
    }

    #[test]
    fn late_start_counts_as_overrun() {
        let mut stats = TaskStats::default();
        let period = Duration::from_millis(1);
        let now = Instant::now();
        stats.record(now, now, period);
        assert_eq!(stats.ticks, 1);
        assert_eq!(stats.overruns, 0);
        let release = now - Duration::from_millis(5);
        stats.record(now, release, period);
        assert_eq!(stats.ticks, 2);
        assert_eq!(stats.overruns, 1);
    }
}
