/// Event types for the audio host
///
/// Events represent things that have happened (past tense).
/// They are broadcast to all subscribers.
use super::notifier::NotifyLevel;

/// Channel carrying volume changes of the active group
pub const VOLUME_CHANNEL: &str = "audio.volume";

/// Host events
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// User-facing message
    Notification { level: NotifyLevel, message: String },

    /// Cross-component broadcast
    Broadcast { channel: String, payload: String },

    /// A command could not be parsed or applied
    CommandRejected { input: String, reason: String },

    /// The executor tore the audio system down and stopped
    Shutdown,
}

impl Event {
    /// Get a human-readable description of the event
    pub fn description(&self) -> String {
        match self {
            Event::Notification { level, message } => format!("[{}] {}", level, message),
            Event::Broadcast { channel, payload } => format!("{} <- {}", channel, payload),
            Event::CommandRejected { input, reason } => {
                format!("Rejected '{}': {}", input, reason)
            }
            Event::Shutdown => "Shutting down".to_string(),
        }
    }
}
