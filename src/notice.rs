use std::time::{Duration, Instant};

use ratatui::style::Color;

/// How long a notice stays up before self-dismissing.
pub const NOTICE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Danger,
}

impl Severity {
    pub fn color(&self) -> Color {
        match self {
            Severity::Info => Color::Cyan,
            Severity::Success => Color::Green,
            Severity::Warning => Color::Yellow,
            Severity::Danger => Color::Red,
        }
    }
}

/// A transient status message. There is never more than one: emitting a
/// new notice replaces whatever is showing.
#[derive(Debug, Clone)]
pub struct Notice {
    pub message: String,
    pub severity: Severity,
    shown_at: Instant,
}

impl Notice {
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
            shown_at: Instant::now(),
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.shown_at) >= NOTICE_TIMEOUT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_expires_after_timeout() {
        let notice = Notice::new("saved", Severity::Success);
        let now = Instant::now();
        assert!(!notice.is_expired(now));
        assert!(notice.is_expired(now + NOTICE_TIMEOUT));
    }
}
