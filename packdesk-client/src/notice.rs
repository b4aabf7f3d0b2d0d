//! Transient operator notices (snackbar messages)

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;

/// Keep at most this many notices around
const MAX_NOTICES: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
    pub expires_at: Instant,
}

/// Notices that dismiss themselves after a fixed lifetime
#[derive(Debug)]
pub struct NoticeBoard {
    ttl: Duration,
    notices: VecDeque<Notice>,
}

impl NoticeBoard {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            notices: VecDeque::new(),
        }
    }

    pub fn push(&mut self, severity: Severity, message: impl Into<String>) {
        self.push_at(severity, message, Instant::now());
    }

    pub fn push_at(&mut self, severity: Severity, message: impl Into<String>, now: Instant) {
        self.prune(now);
        if self.notices.len() == MAX_NOTICES {
            self.notices.pop_front();
        }
        self.notices.push_back(Notice {
            severity,
            message: message.into(),
            expires_at: now + self.ttl,
        });
    }

    /// Notices still visible at `now`, oldest first
    pub fn active(&self, now: Instant) -> impl Iterator<Item = &Notice> {
        self.notices.iter().filter(move |n| n.expires_at > now)
    }

    /// Most recent visible notice
    pub fn latest(&self, now: Instant) -> Option<&Notice> {
        self.active(now).last()
    }

    pub fn prune(&mut self, now: Instant) {
        self.notices.retain(|n| n.expires_at > now);
    }
}
