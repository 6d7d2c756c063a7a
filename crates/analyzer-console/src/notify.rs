//! Transient notifications shown over the console.

use std::time::{Duration, Instant};

use chrono::{DateTime, Local};

/// Keep at most this many notifications, oldest dropped first.
const MAX_NOTIFICATIONS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub created: Instant,
    /// Wall-clock time shown next to the message.
    pub stamped: DateTime<Local>,
}

/// Messages that disappear on their own after `ttl`.
#[derive(Debug, Clone)]
pub struct NotificationCenter {
    ttl: Duration,
    items: Vec<Notification>,
}

impl NotificationCenter {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, level: NotificationLevel, message: impl Into<String>, now: Instant) {
        let message = message.into();
        match level {
            NotificationLevel::Error => tracing::warn!(message = %message, "notification"),
            _ => tracing::info!(message = %message, "notification"),
        }
        self.items.push(Notification {
            level,
            message,
            created: now,
            stamped: Local::now(),
        });
        if self.items.len() > MAX_NOTIFICATIONS {
            self.items.remove(0);
        }
    }

    pub fn success(&mut self, message: impl Into<String>, now: Instant) {
        self.push(NotificationLevel::Success, message, now);
    }

    pub fn error(&mut self, message: impl Into<String>, now: Instant) {
        self.push(NotificationLevel::Error, message, now);
    }

    pub fn info(&mut self, message: impl Into<String>, now: Instant) {
        self.push(NotificationLevel::Info, message, now);
    }

    /// Drop everything older than the TTL.
    pub fn prune(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.items
            .retain(|n| now.saturating_duration_since(n.created) < ttl);
    }

    /// Notifications still visible at `now`, oldest first.
    pub fn active(&self, now: Instant) -> impl Iterator<Item = &Notification> {
        let ttl = self.ttl;
        self.items
            .iter()
            .filter(move |n| now.saturating_duration_since(n.created) < ttl)
    }

    pub fn latest(&self, now: Instant) -> Option<&Notification> {
        self.active(now).last()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
