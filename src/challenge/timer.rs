//! Cancellable, generation-checked timers on a virtual clock.
//!
//! The session never sleeps. It arms timers here and the caller moves the
//! clock forward with [`TimerSchedule::pop_due`]. Every arm bumps a
//! generation counter, so a token that was superseded or cancelled is
//! recognised as stale and dropped instead of firing late.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

/// The logical timers a challenge session uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimerKind {
    /// One-second tick of the challenge's elapsed-time clock.
    SessionClock,
    /// One-second tick of the between-rounds countdown.
    Countdown,
    /// Delayed opponent move.
    OpponentMove,
}

/// Handle to one arming of a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken {
    kind: TimerKind,
    generation: u64,
}

impl TimerToken {
    /// Which timer this token belongs to.
    pub fn kind(&self) -> TimerKind {
        self.kind
    }

    /// Generation the token was armed with.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy)]
struct Scheduled {
    token: TimerToken,
    due: Duration,
}

/// At most one pending timer per [`TimerKind`], on a virtual clock.
#[derive(Debug, Clone, Default)]
pub struct TimerSchedule {
    now: Duration,
    next_generation: u64,
    pending: Vec<Scheduled>,
    /// Latest live generation per kind; zero when cancelled.
    live: [u64; 3],
}

impl TimerSchedule {
    /// Creates an empty schedule at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Arms `kind` to fire after `delay`, replacing any pending timer of
    /// the same kind.
    #[instrument(skip(self))]
    pub fn arm(&mut self, kind: TimerKind, delay: Duration) -> TimerToken {
        self.cancel(kind);
        self.next_generation += 1;
        let token = TimerToken {
            kind,
            generation: self.next_generation,
        };
        self.live[slot(kind)] = token.generation;
        self.pending.push(Scheduled {
            token,
            due: self.now + delay,
        });
        trace!(generation = token.generation, "Timer armed");
        token
    }

    /// Cancels the pending timer of `kind`, if any.
    pub fn cancel(&mut self, kind: TimerKind) {
        self.live[slot(kind)] = 0;
        let before = self.pending.len();
        self.pending.retain(|s| s.token.kind != kind);
        if self.pending.len() != before {
            trace!(?kind, "Timer cancelled");
        }
    }

    /// Cancels every pending timer.
    #[instrument(skip(self))]
    pub fn cancel_all(&mut self) {
        debug!(count = self.pending.len(), "Cancelling all timers");
        self.pending.clear();
        self.live = [0; 3];
    }

    /// Whether a timer of `kind` is pending.
    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.pending(kind) > 0
    }

    /// Number of pending timers of `kind` (never more than one).
    pub fn pending(&self, kind: TimerKind) -> usize {
        self.pending.iter().filter(|s| s.token.kind == kind).count()
    }

    /// Token of the pending timer of `kind`.
    pub fn token(&self, kind: TimerKind) -> Option<TimerToken> {
        self.pending
            .iter()
            .find(|s| s.token.kind == kind)
            .map(|s| s.token)
    }

    /// Time remaining until the earliest pending deadline.
    pub fn next_due(&self) -> Option<Duration> {
        self.pending
            .iter()
            .map(|s| s.due.saturating_sub(self.now))
            .min()
    }

    /// Removes and returns the earliest timer due at or before `until`,
    /// moving the clock to its deadline.
    ///
    /// Returns `None` once nothing else is due; the clock then stays where
    /// it was, so callers finish with [`TimerSchedule::settle`].
    pub fn pop_due(&mut self, until: Duration) -> Option<TimerToken> {
        let (idx, scheduled) = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, s)| s.due <= until)
            .min_by_key(|(_, s)| (s.due, s.token.generation))
            .map(|(i, s)| (i, *s))?;
        self.pending.remove(idx);
        self.now = self.now.max(scheduled.due);
        Some(scheduled.token)
    }

    /// Moves the clock to `until` once every due timer has fired.
    pub fn settle(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }

    /// Whether `token` is the most recent arming of its kind.
    ///
    /// Tokens handed out before a later `arm`, a `cancel` or a `cancel_all`
    /// of the same kind are stale. A popped token stays current until its
    /// kind is armed again.
    pub fn is_current(&self, token: TimerToken) -> bool {
        token.generation != 0 && self.live[slot(token.kind)] == token.generation
    }
}

fn slot(kind: TimerKind) -> usize {
    match kind {
        TimerKind::SessionClock => 0,
        TimerKind::Countdown => 1,
        TimerKind::OpponentMove => 2,
    }
}
