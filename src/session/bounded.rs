// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains the [`BoundedSession`] wrapper.
use std::time::{Duration, Instant};

use crate::axis_lock::AxisLockState;
use crate::exception::{TeleopException, TeleopResult};
use crate::session::teleop_session::{TeleopRobotInfo, TeleopSession};
use crate::utils::{CARTESIAN_DOF, JOINT_DOF};

/// Default bound for a single session operation during teleoperation.
pub const DEFAULT_OPERATION_BOUND: Duration = Duration::from_millis(1);

/// Wraps a session whose operations may take arbitrarily long and reports every fallible
/// operation that exceeded its bound as [`Timeout`](`TeleopException::Timeout`).
///
/// Blocking setup operations ([`enable`](TeleopSession::enable), [`init`](TeleopSession::init)
/// and [`stop`](TeleopSession::stop)) use a separate, usually much longer, bound.
/// Infallible queries such as [`is_operational`](TeleopSession::is_operational) are forwarded
/// unchanged.
pub struct BoundedSession<S: TeleopSession> {
    inner: S,
    bound: Duration,
    setup_bound: Duration,
}

impl<S: TeleopSession> BoundedSession<S> {
    /// Wraps `inner`.
    /// # Arguments
    /// * `bound` - Maximum duration of a runtime operation. Default is
    /// [`DEFAULT_OPERATION_BOUND`].
    /// * `setup_bound` - Maximum duration of enable, init and stop. Default is 30 seconds.
    pub fn new<B: Into<Option<Duration>>, SB: Into<Option<Duration>>>(
        inner: S,
        bound: B,
        setup_bound: SB,
    ) -> Self {
        BoundedSession {
            inner,
            bound: bound.into().unwrap_or(DEFAULT_OPERATION_BOUND),
            setup_bound: setup_bound.into().unwrap_or(Duration::from_secs(30)),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

fn bounded<T, F: FnOnce() -> TeleopResult<T>>(
    operation: &'static str,
    bound: Duration,
    call: F,
) -> TeleopResult<T> {
    let start = Instant::now();
    let result = call()?;
    if start.elapsed() > bound {
        return Err(TeleopException::Timeout { operation, bound });
    }
    Ok(result)
}

impl<S: TeleopSession> TeleopSession for BoundedSession<S> {
    fn enable(&mut self) -> TeleopResult<()> {
        let inner = &mut self.inner;
        bounded("enable", self.setup_bound, || inner.enable())
    }

    fn init(&mut self) -> TeleopResult<()> {
        let inner = &mut self.inner;
        bounded("init", self.setup_bound, || inner.init())
    }

    fn stop(&mut self) -> TeleopResult<()> {
        let inner = &mut self.inner;
        bounded("stop", self.setup_bound, || inner.stop())
    }

    fn is_fault(&self) -> bool {
        self.inner.is_fault()
    }

    fn clear_fault(&mut self) -> TeleopResult<bool> {
        let inner = &mut self.inner;
        bounded("clear_fault", self.setup_bound, || inner.clear_fault())
    }

    fn is_operational(&self) -> bool {
        self.inner.is_operational()
    }

    fn run(&mut self) -> TeleopResult<()> {
        let inner = &mut self.inner;
        bounded("run", self.bound, || inner.run())
    }

    fn set_local_null_space_posture(&mut self, posture: [f64; JOINT_DOF]) -> TeleopResult<()> {
        let inner = &mut self.inner;
        bounded("set_local_null_space_posture", self.bound, || {
            inner.set_local_null_space_posture(posture)
        })
    }

    fn set_remote_null_space_posture(&mut self, posture: [f64; JOINT_DOF]) -> TeleopResult<()> {
        let inner = &mut self.inner;
        bounded("set_remote_null_space_posture", self.bound, || {
            inner.set_remote_null_space_posture(posture)
        })
    }

    fn set_remote_max_wrench(&mut self, wrench: [f64; CARTESIAN_DOF]) -> TeleopResult<()> {
        let inner = &mut self.inner;
        bounded("set_remote_max_wrench", self.bound, || {
            inner.set_remote_max_wrench(wrench)
        })
    }

    fn local_info(&self) -> TeleopRobotInfo {
        self.inner.local_info()
    }

    fn remote_info(&self) -> TeleopRobotInfo {
        self.inner.remote_info()
    }

    fn set_local_axis_lock_cmd(&mut self, state: AxisLockState) -> TeleopResult<()> {
        let inner = &mut self.inner;
        bounded("set_local_axis_lock_cmd", self.bound, || {
            inner.set_local_axis_lock_cmd(state)
        })
    }

    fn get_local_axis_lock_state(&self) -> TeleopResult<AxisLockState> {
        let inner = &self.inner;
        bounded("get_local_axis_lock_state", self.bound, || {
            inner.get_local_axis_lock_state()
        })
    }
}
