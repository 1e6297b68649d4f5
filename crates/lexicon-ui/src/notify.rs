//! Notification channel shared by every page controller.
//!
//! # Design
//! - Controllers only see the [`Notifier`] trait; the shells decide how to show messages.
//! - [`NotificationCenter`] holds the visible queue with a bounded length and a TTL,
//!   and is driven by an injectable [`Clock`] so expiry is testable.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// Neutral status message.
    Info,
    /// Completed action.
    Success,
    /// Recoverable user mistake.
    Warning,
    /// Failed request or rejected edit.
    Error,
}

impl NotificationKind {
    /// CSS class / log label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// One message on the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Monotonic identifier used for dismissal.
    pub id: u64,
    /// Severity.
    pub kind: NotificationKind,
    /// Text shown to the user.
    pub message: String,
    /// Clock reading when the message was raised.
    pub raised_at_ms: u64,
}

/// Sink for user-facing messages.
pub trait Notifier {
    /// Publish `message` and return its identifier.
    fn notify(&self, kind: NotificationKind, message: &str) -> u64;
}

/// Millisecond clock.
pub trait Clock {
    /// Current time in milliseconds.
    fn now_ms(&self) -> u64;
}

/// Bounded queue of visible notifications with timed expiry.
pub struct NotificationCenter<C> {
    clock: C,
    ttl_ms: u64,
    capacity: usize,
    next_id: Cell<u64>,
    active: RefCell<VecDeque<Notification>>,
}

impl<C: Clock> NotificationCenter<C> {
    /// Build a centre showing at most `capacity` messages for `ttl_ms` each.
    #[must_use]
    pub fn new(clock: C, ttl_ms: u64, capacity: usize) -> Self {
        Self {
            clock,
            ttl_ms,
            capacity: capacity.max(1),
            next_id: Cell::new(1),
            active: RefCell::new(VecDeque::new()),
        }
    }

    /// Queue a message, evicting the oldest when full.
    pub fn push(&self, kind: NotificationKind, message: &str) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        match kind {
            NotificationKind::Error => tracing::warn!(id, text = message, "error notification"),
            NotificationKind::Warning => tracing::info!(id, text = message, "warning notification"),
            NotificationKind::Info | NotificationKind::Success => {
                tracing::debug!(id, kind = kind.as_str(), text = message, "notification");
            }
        }
        let mut active = self.active.borrow_mut();
        while active.len() >= self.capacity {
            active.pop_front();
        }
        active.push_back(Notification {
            id,
            kind,
            message: message.to_string(),
            raised_at_ms: self.clock.now_ms(),
        });
        id
    }

    /// Remove expired messages and return their identifiers.
    pub fn sweep(&self) -> Vec<u64> {
        let now = self.clock.now_ms();
        let mut expired = Vec::new();
        self.active.borrow_mut().retain(|notification| {
            let alive = now.saturating_sub(notification.raised_at_ms) < self.ttl_ms;
            if !alive {
                expired.push(notification.id);
            }
            alive
        });
        expired
    }

    /// Drop one message; returns whether it was visible.
    pub fn dismiss(&self, id: u64) -> bool {
        let mut active = self.active.borrow_mut();
        let before = active.len();
        active.retain(|notification| notification.id != id);
        active.len() != before
    }

    /// Visible messages, oldest first.
    #[must_use]
    pub fn active(&self) -> Vec<Notification> {
        self.active.borrow().iter().cloned().collect()
    }

    /// Configured lifetime.
    #[must_use]
    pub const fn ttl_ms(&self) -> u64 {
        self.ttl_ms
    }
}

impl<C: Clock> Notifier for NotificationCenter<C> {
    fn notify(&self, kind: NotificationKind, message: &str) -> u64 {
        self.push(kind, message)
    }
}
