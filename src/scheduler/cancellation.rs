// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains the [`StopToken`] shared by all tasks of a scheduler.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Process-wide cancellation flag.
///
/// Cloning a token yields a handle to the same flag. Once signaled a token stays cancelled.
#[derive(Debug, Clone, Default)]
pub struct StopToken {
    cancelled: Arc<AtomicBool>,
}

impl StopToken {
    pub fn new() -> Self {
        StopToken::default()
    }

    /// Requests every task observing this token to stop.
    /// # Return
    /// True if this call cancelled the token, false if it was already cancelled.
    pub fn signal(&self) -> bool {
        !self.cancelled.swap(true, Ordering::SeqCst)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
