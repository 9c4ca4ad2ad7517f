// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains the [`ControlTask`] which advances one or more sessions per tick.
use crate::exception::TeleopException;
use crate::session::{SharedSession, TeleopSession};
use crate::TeleopResult;

/// Sessions advanced together by one high-rate task.
///
/// Sessions are advanced in the order they were bound.
pub struct ControlTask<S: TeleopSession> {
    sessions: Vec<(String, SharedSession<S>)>,
}

impl<S: TeleopSession> Default for ControlTask<S> {
    fn default() -> Self {
        ControlTask {
            sessions: Vec::new(),
        }
    }
}

impl<S: TeleopSession> ControlTask<S> {
    pub fn new() -> Self {
        ControlTask::default()
    }

    /// Appends a session. `label` names the session in a
    /// [`FaultDetected`](`crate::exception::TeleopException::FaultDetected`) error.
    pub fn bind(&mut self, label: &str, session: SharedSession<S>) {
        self.sessions.push((label.to_string(), session));
    }

    pub fn labels(&self) -> Vec<&str> {
        self.sessions.iter().map(|(label, _)| label.as_str()).collect()
    }

    /// Advances every bound session by one step.
    ///
    /// All sessions are checked before any of them is run, so a tick either advances every
    /// session or none.
    /// # Errors
    /// * FaultDetected if a session is not operational. No session is run in that tick.
    /// * Any error returned by [`run`](`crate::session::TeleopSession::run`). Sessions bound
    /// after the failing one are not run.
    pub fn tick(&mut self) -> TeleopResult<()> {
        for (label, session) in &self.sessions {
            if !session.borrow().is_operational() {
                return Err(TeleopException::FaultDetected {
                    session: label.clone(),
                });
            }
        }
        for (_, session) in &self.sessions {
            session.borrow_mut().run()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exception::create_session_error;
    use crate::session::teleop_session::MockTeleopSession;
    use mockall::Sequence;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn local_session_runs_before_remote_session() {
        let mut seq = Sequence::new();
        let mut local = MockTeleopSession::new();
        let mut remote = MockTeleopSession::new();
        local
            .expect_is_operational()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(true);
        remote
            .expect_is_operational()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(true);
        local
            .expect_run()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(()));
        remote
            .expect_run()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(()));

        let mut task = ControlTask::new();
        task.bind("local", Rc::new(RefCell::new(local)));
        task.bind("remote", Rc::new(RefCell::new(remote)));
        assert_eq!(task.labels(), vec!["local", "remote"]);
        task.tick().unwrap();
    }

    #[test]
    fn faulty_second_session_blocks_the_whole_tick() {
        let mut local = MockTeleopSession::new();
        let mut remote = MockTeleopSession::new();
        local.expect_is_operational().return_const(true);
        local.expect_run().times(0);
        remote.expect_is_operational().times(1).return_const(false);
        remote.expect_run().times(0);

        let mut task = ControlTask::new();
        task.bind("left", Rc::new(RefCell::new(local)));
        task.bind("right", Rc::new(RefCell::new(remote)));
        match task.tick() {
            Err(TeleopException::FaultDetected { session }) => assert_eq!(session, "right"),
            other => panic!("expected FaultDetected, got {:?}", other),
        }
    }

    #[test]
    fn run_error_is_returned() {
        let mut session = MockTeleopSession::new();
        session.expect_is_operational().return_const(true);
        session
            .expect_run()
            .times(1)
            .returning(|| Err(create_session_error("teleop: connection lost")));
        let mut task = ControlTask::new();
        task.bind("teleop", Rc::new(RefCell::new(session)));
        assert!(matches!(
            task.tick(),
            Err(TeleopException::SessionError { .. })
        ));
    }
}
