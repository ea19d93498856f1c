/// Host notification sink
///
/// The audio system reports to the host through this narrow interface: local
/// messages for the user, and broadcasts for other components.
use std::fmt;

/// Severity of a user-facing message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for NotifyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifyLevel::Info => write!(f, "info"),
            NotifyLevel::Warning => write!(f, "warning"),
            NotifyLevel::Error => write!(f, "error"),
        }
    }
}

pub trait Notifier {
    /// Show a message to the user
    fn notify(&self, level: NotifyLevel, message: &str);

    /// Send a payload to every component listening on `channel`
    fn broadcast(&self, channel: &str, payload: &str);
}

/// Notifier that only logs
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, level: NotifyLevel, message: &str) {
        tracing::debug!("[{}] {}", level, message);
    }

    fn broadcast(&self, channel: &str, payload: &str) {
        tracing::debug!("broadcast {}: {}", channel, payload);
    }
}
