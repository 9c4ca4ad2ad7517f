// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains the teleop::TeleopSession facade and its implementations.
use std::cell::RefCell;
use std::rc::Rc;

pub mod bounded;
pub mod setup;
pub mod simulated;
pub mod teleop_session;

pub use bounded::BoundedSession;
pub use setup::{prepare_session, NullSpacePosture, SetupParameters};
pub use simulated::SimulatedTeleop;
pub use teleop_session::{TeleopRobotInfo, TeleopSession};

/// Handle to a session shared between the tasks of one scheduler thread.
pub type SharedSession<S> = Rc<RefCell<S>>;

/// Wraps a session into a [`SharedSession`].
pub fn share<S: TeleopSession>(session: S) -> SharedSession<S> {
    Rc::new(RefCell::new(session))
}
