//! Per-call deadlines.
//!
//! # Invariants
//! - A [`DeadlineGuard`] interrupts the running statement once its deadline
//!   passes and always clears the progress handler on drop, so pooled
//!   connections go back clean.

use rusqlite::Connection;
use std::time::{Duration, Instant};

/// VM instructions between deadline checks.
const PROGRESS_CHECK_INTERVAL: i32 = 1_000;

#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started_at: Instant,
    timeout: Duration,
}

impl Deadline {
    pub fn start(timeout: Duration) -> Self {
        Self {
            started_at: Instant::now(),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Time left, or `None` once the deadline has passed.
    pub fn remaining(&self) -> Option<Duration> {
        self.timeout
            .checked_sub(self.elapsed())
            .filter(|left| !left.is_zero())
    }

    fn expires_at(&self) -> Option<Instant> {
        self.started_at.checked_add(self.timeout)
    }
}

/// Interrupts statements on `conn` that outlive `deadline`.
pub struct DeadlineGuard<'conn> {
    conn: &'conn Connection,
}

impl<'conn> DeadlineGuard<'conn> {
    pub fn install(conn: &'conn Connection, deadline: &Deadline) -> Self {
        // An unrepresentable expiry is far enough away to never fire.
        if let Some(expires_at) = deadline.expires_at() {
            conn.progress_handler(
                PROGRESS_CHECK_INTERVAL,
                Some(move || Instant::now() >= expires_at),
            );
        }
        Self { conn }
    }
}

impl Drop for DeadlineGuard<'_> {
    fn drop(&mut self) {
        self.conn.progress_handler(0, None::<fn() -> bool>);
    }
}
