// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains the [`PeriodicScheduler`].
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::exception::{create_scheduler_exception, TeleopException};
use crate::scheduler::cancellation::StopToken;
use crate::scheduler::control_task::ControlTask;
use crate::scheduler::control_tools::{
    apply_realtime_config, max_priority, min_priority, RealtimeConfig,
};
use crate::scheduler::task::{ScheduledTask, TaskKind, TaskStats};
use crate::session::{SharedSession, TeleopSession};
use crate::TeleopResult;

/// Lifecycle of a [`PeriodicScheduler`]. `Stopped` is terminal.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum SchedulerState {
    Idle,
    Running,
    Stopped,
}

/// Why [`start`](PeriodicScheduler::start) returned.
#[derive(Debug)]
pub enum StopReason {
    /// The stop token was signaled.
    Cancelled,
    /// A control task returned an error.
    TaskFailed {
        task: String,
        error: TeleopException,
    },
}

/// Cooperative runner for periodic tasks on the calling thread.
///
/// Task bodies never run concurrently. When several tasks are due, they run in descending
/// priority order, tasks with equal priority in the order they were added. The [`StopToken`] is
/// checked before every task invocation.
pub struct PeriodicScheduler<'a> {
    tasks: Vec<ScheduledTask<'a>>,
    stats: Vec<TaskStats>,
    bound_sessions: Vec<usize>,
    stop: StopToken,
    state: SchedulerState,
    realtime_config: RealtimeConfig,
}

impl<'a> PeriodicScheduler<'a> {
    /// Creates an idle scheduler.
    /// # Arguments
    /// * `realtime_config` - whether the scheduler thread has to run with realtime priority.
    /// Defaults to [`Enforce`](RealtimeConfig::Enforce) if `None` is passed.
    pub fn new<R: Into<Option<RealtimeConfig>>>(realtime_config: R) -> Self {
        PeriodicScheduler {
            tasks: Vec::new(),
            stats: Vec::new(),
            bound_sessions: Vec::new(),
            stop: StopToken::new(),
            state: SchedulerState::Idle,
            realtime_config: realtime_config.into().unwrap_or(RealtimeConfig::Enforce),
        }
    }

    /// Handle to the stop flag observed by this scheduler.
    pub fn stop_token(&self) -> StopToken {
        self.stop.clone()
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Highest priority accepted by [`add_task`](Self::add_task).
    pub fn max_priority(&self) -> i32 {
        max_priority()
    }

    /// Lowest priority accepted by [`add_task`](Self::add_task).
    pub fn min_priority(&self) -> i32 {
        min_priority()
    }

    /// Registers a task.
    /// # Errors
    /// * SchedulerException if the scheduler was already started, if the name is taken or if
    /// the priority is outside of [`min_priority`](Self::min_priority) and
    /// [`max_priority`](Self::max_priority).
    pub fn add_task(&mut self, task: ScheduledTask<'a>) -> TeleopResult<()> {
        self.ensure_idle()?;
        if task.priority < min_priority() || task.priority > max_priority() {
            return Err(TeleopException::SchedulerException {
                message: format!(
                    "teleop: priority {} of task {} is outside of [{}, {}]",
                    task.priority,
                    task.name,
                    min_priority(),
                    max_priority()
                ),
            });
        }
        if self.tasks.iter().any(|existing| existing.name == task.name) {
            return Err(TeleopException::SchedulerException {
                message: format!("teleop: task {} is already registered", task.name),
            });
        }
        debug!(
            task = %task.name,
            period = ?task.period,
            priority = task.priority,
            kind = ?task.kind,
            "task added"
        );
        self.tasks.push(task);
        self.stats.push(TaskStats::default());
        Ok(())
    }

    /// Registers a [`Control`](TaskKind::Control) task advancing `sessions` in the given order.
    ///
    /// Each entry pairs a label used in fault reports with the session.
    /// # Errors
    /// * SchedulerException if `sessions` is empty or one of them is already bound to a control
    /// task, as well as every error of [`add_task`](Self::add_task).
    pub fn add_control_task<S: TeleopSession + 'a>(
        &mut self,
        name: &str,
        period_ms: u64,
        priority: i32,
        sessions: Vec<(String, SharedSession<S>)>,
    ) -> TeleopResult<()> {
        self.ensure_idle()?;
        if sessions.is_empty() {
            return Err(create_scheduler_exception(
                "teleop: a control task needs at least one session",
            ));
        }
        let mut control = ControlTask::new();
        let mut addresses = Vec::with_capacity(sessions.len());
        for (label, session) in sessions {
            let address = Rc::as_ptr(&session) as *const () as usize;
            if self.bound_sessions.contains(&address) || addresses.contains(&address) {
                return Err(TeleopException::SchedulerException {
                    message: format!(
                        "teleop: session {} is already bound to a control task",
                        label
                    ),
                });
            }
            addresses.push(address);
            control.bind(&label, session);
        }
        let task = ScheduledTask::new(name, period_ms, priority, TaskKind::Control, move || {
            control.tick()
        })?;
        self.add_task(task)?;
        self.bound_sessions.extend(addresses);
        Ok(())
    }

    /// Statistics of the task called `name`, if such a task exists.
    pub fn task_stats(&self, name: &str) -> Option<TaskStats> {
        self.tasks
            .iter()
            .position(|task| task.name == name)
            .map(|index| self.stats[index])
    }

    /// Runs the registered tasks on the calling thread until the stop token is signaled or a
    /// control task fails.
    ///
    /// A failing control task signals the stop token before this method returns, so every other
    /// holder of the token observes the shutdown.
    /// # Errors
    /// * SchedulerException if the scheduler is not idle or has no tasks.
    /// * RealTimeException if realtime mode is enforced but cannot be set up.
    pub fn start(&mut self) -> TeleopResult<StopReason> {
        self.ensure_idle()?;
        if self.tasks.is_empty() {
            return Err(create_scheduler_exception(
                "teleop: cannot start a scheduler without tasks",
            ));
        }
        self.state = SchedulerState::Running;
        let highest_priority = self
            .tasks
            .iter()
            .map(|task| task.priority)
            .max()
            .unwrap_or_else(max_priority);
        if let Err(error) = apply_realtime_config(self.realtime_config, highest_priority) {
            self.state = SchedulerState::Stopped;
            return Err(error);
        }

        // stable, so equal priorities keep their insertion order
        self.tasks.sort_by(|a, b| b.priority.cmp(&a.priority));
        info!(
            tasks = ?self.tasks.iter().map(|task| task.name.as_str()).collect::<Vec<_>>(),
            "scheduler started"
        );

        let reason = self.run_until_stopped();
        self.state = SchedulerState::Stopped;
        for (task, stats) in self.tasks.iter().zip(self.stats.iter()) {
            info!(
                task = %task.name,
                ticks = stats.ticks,
                overruns = stats.overruns,
                max_execution = ?stats.max_execution,
                "task statistics"
            );
        }
        Ok(reason)
    }

    fn run_until_stopped(&mut self) -> StopReason {
        let start = Instant::now();
        let mut releases = vec![start; self.tasks.len()];
        loop {
            let now = Instant::now();
            for (index, task) in self.tasks.iter_mut().enumerate() {
                if self.stop.is_cancelled() {
                    info!("stop requested, scheduler exiting");
                    return StopReason::Cancelled;
                }
                if releases[index] > now {
                    continue;
                }
                let begin = Instant::now();
                let result = (task.callback)();
                self.stats[index].record(begin, releases[index], task.period);
                releases[index] = next_release(releases[index], begin, task.period);

                if let Err(error) = result {
                    match task.kind {
                        TaskKind::Control => {
                            error!(task = %task.name, %error, "control task failed, stopping");
                            self.stop.signal();
                            return StopReason::TaskFailed {
                                task: task.name.clone(),
                                error,
                            };
                        }
                        TaskKind::Auxiliary => {
                            warn!(task = %task.name, %error, "task failed");
                        }
                    }
                }
            }
            if let Some(next) = releases.iter().min() {
                let now = Instant::now();
                if *next > now {
                    thread::sleep(*next - now);
                }
            }
        }
    }

    fn ensure_idle(&self) -> TeleopResult<()> {
        match self.state {
            SchedulerState::Idle => Ok(()),
            SchedulerState::Running => Err(create_scheduler_exception(
                "teleop: tasks cannot be changed while the scheduler is running",
            )),
            SchedulerState::Stopped => Err(create_scheduler_exception(
                "teleop: scheduler was stopped, create a new one",
            )),
        }
    }
}

/// First release after `begin` on the grid `release + k * period`. Missed periods are skipped.
fn next_release(release: Instant, begin: Instant, period: Duration) -> Instant {
    let behind = begin.saturating_duration_since(release).as_nanos();
    let skipped = behind / period.as_nanos() + 1;
    let offset = period.as_nanos() * skipped;
    release + Duration::from_nanos(offset as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exception::create_session_error;
    use crate::session::teleop_session::MockTeleopSession;
    use std::cell::{Cell, RefCell};

    fn shared(mock: MockTeleopSession) -> SharedSession<MockTeleopSession> {
        Rc::new(RefCell::new(mock))
    }

    fn scheduler<'a>() -> PeriodicScheduler<'a> {
        PeriodicScheduler::new(RealtimeConfig::Ignore)
    }

    #[test]
    fn fault_stops_the_scheduler_once() {
        let mut session = MockTeleopSession::new();
        session.expect_is_operational().times(1).return_const(false);
        session.expect_run().times(0);
        let mut scheduler = scheduler();
        let max = scheduler.max_priority();
        scheduler
            .add_control_task("control", 1, max, vec![("teleop".to_string(), shared(session))])
            .unwrap();
        let stop = scheduler.stop_token();

        match scheduler.start().unwrap() {
            StopReason::TaskFailed { task, error } => {
                assert_eq!(task, "control");
                assert!(matches!(error, TeleopException::FaultDetected { .. }));
            }
            other => panic!("expected a failed task, got {:?}", other),
        }
        assert!(stop.is_cancelled());
        assert!(!stop.signal());
        assert_eq!(scheduler.state(), SchedulerState::Stopped);
        assert_eq!(scheduler.task_stats("control").unwrap().ticks, 1);
    }

    #[test]
    fn run_error_stops_all_further_ticks() {
        let mut session = MockTeleopSession::new();
        session.expect_is_operational().return_const(true);
        session
            .expect_run()
            .times(1)
            .returning(|| Err(create_session_error("teleop: run failed")));
        let console_calls = Rc::new(Cell::new(0));
        let calls = console_calls.clone();

        let mut scheduler = scheduler();
        let (max, min) = (scheduler.max_priority(), scheduler.min_priority());
        scheduler
            .add_control_task("control", 1, max, vec![("teleop".to_string(), shared(session))])
            .unwrap();
        scheduler
            .add_task(
                ScheduledTask::new("console", 1, min, TaskKind::Auxiliary, move || {
                    calls.set(calls.get() + 1);
                    Ok(())
                })
                .unwrap(),
            )
            .unwrap();

        assert!(matches!(
            scheduler.start().unwrap(),
            StopReason::TaskFailed { .. }
        ));
        assert_eq!(console_calls.get(), 0);
        assert_eq!(scheduler.state(), SchedulerState::Stopped);
    }

    #[test]
    fn stop_token_ends_the_run_and_auxiliary_errors_are_survived() {
        let mut session = MockTeleopSession::new();
        session.expect_is_operational().return_const(true);
        session.expect_run().returning(|| Ok(()));

        let mut scheduler = scheduler();
        let (max, min) = (scheduler.max_priority(), scheduler.min_priority());
        let stop = scheduler.stop_token();
        let mut console_calls = 0;
        scheduler
            .add_control_task("control", 1, max, vec![("teleop".to_string(), shared(session))])
            .unwrap();
        scheduler
            .add_task(
                ScheduledTask::new("console", 1, min, TaskKind::Auxiliary, move || {
                    console_calls += 1;
                    if console_calls == 1 {
                        return Err(TeleopException::InvalidCommand { key: 'k' });
                    }
                    stop.signal();
                    Ok(())
                })
                .unwrap(),
            )
            .unwrap();

        assert!(matches!(scheduler.start().unwrap(), StopReason::Cancelled));
        assert_eq!(scheduler.task_stats("console").unwrap().ticks, 2);
        assert!(scheduler.task_stats("control").unwrap().ticks >= 2);
    }

    #[test]
    fn tasks_cannot_be_added_after_start() {
        let mut scheduler = scheduler();
        let min = scheduler.min_priority();
        let stop = scheduler.stop_token();
        scheduler
            .add_task(
                ScheduledTask::new("stopper", 1, min, TaskKind::Auxiliary, move || {
                    stop.signal();
                    Ok(())
                })
                .unwrap(),
            )
            .unwrap();
        scheduler.start().unwrap();

        let late = ScheduledTask::new("late", 1, min, TaskKind::Auxiliary, || Ok(())).unwrap();
        assert!(matches!(
            scheduler.add_task(late),
            Err(TeleopException::SchedulerException { .. })
        ));
        assert!(scheduler.start().is_err());
    }

    #[test]
    fn session_can_only_be_bound_once() {
        let session = shared(MockTeleopSession::new());
        let mut scheduler = scheduler();
        let max = scheduler.max_priority();
        assert!(scheduler
            .add_control_task(
                "dual",
                1,
                max,
                vec![
                    ("local".to_string(), session.clone()),
                    ("remote".to_string(), session.clone())
                ],
            )
            .is_err());
        scheduler
            .add_control_task("first", 1, max, vec![("local".to_string(), session.clone())])
            .unwrap();
        assert!(scheduler
            .add_control_task("second", 1, max, vec![("local".to_string(), session)])
            .is_err());
    }

    #[test]
    fn invalid_registrations_are_rejected() {
        let mut scheduler = scheduler();
        let max = scheduler.max_priority();
        let too_high = ScheduledTask::new("a", 1, max + 1, TaskKind::Auxiliary, || Ok(())).unwrap();
        assert!(scheduler.add_task(too_high).is_err());
        let first = ScheduledTask::new("a", 1, max, TaskKind::Auxiliary, || Ok(())).unwrap();
        let duplicate = ScheduledTask::new("a", 5, max, TaskKind::Auxiliary, || Ok(())).unwrap();
        scheduler.add_task(first).unwrap();
        assert!(scheduler.add_task(duplicate).is_err());
        assert!(scheduler
            .add_control_task::<MockTeleopSession>("control", 1, max, vec![])
            .is_err());
    }

    #[test]
    fn simulated_dual_sessions_stop_on_first_fault() {
        use crate::session::simulated::tests::ready_session;
        use crate::session::SimulatedTeleop;

        let first = Rc::new(RefCell::new(ready_session()));
        let second = Rc::new(RefCell::new(ready_session().with_fault_after(3)));
        let mut scheduler = scheduler();
        let max = scheduler.max_priority();
        scheduler
            .add_control_task::<SimulatedTeleop>(
                "control",
                1,
                max,
                vec![
                    ("first".to_string(), first.clone()),
                    ("second".to_string(), second.clone()),
                ],
            )
            .unwrap();

        match scheduler.start().unwrap() {
            StopReason::TaskFailed {
                error: TeleopException::FaultDetected { session },
                ..
            } => assert_eq!(session, "second"),
            other => panic!("expected a fault, got {:?}", other),
        }
        assert_eq!(first.borrow().ticks(), 3);
        assert_eq!(second.borrow().ticks(), 3);
        assert_eq!(scheduler.task_stats("control").unwrap().ticks, 4);
    }

    #[test]
    fn next_release_skips_missed_periods() {
        let release = Instant::now();
        let period = Duration::from_millis(10);
        assert_eq!(next_release(release, release, period), release + period);
        let late = release + Duration::from_millis(25);
        assert_eq!(
            next_release(release, late, period),
            release + Duration::from_millis(30)
        );
    }
}
