/// Stream handle and engine contracts
///
/// The decode/mix/output engine is an external collaborator. It hands out
/// owned stream handles that the registry keeps until they are released.
use std::fmt;
use std::path::Path;

use crate::error::EngineError;

/// Playback status reported by a live handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStatus {
    /// Finished or stopped. Terminal.
    Stopped,

    /// Currently rendering
    Active,

    /// Starved of data, may resume on its own
    Stalled,

    /// Paused, resumes on `play`
    Paused,
}

impl StreamStatus {
    /// Only a stopped stream may be reclaimed
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamStatus::Stopped)
    }
}

impl fmt::Display for StreamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamStatus::Stopped => write!(f, "stopped"),
            StreamStatus::Active => write!(f, "active"),
            StreamStatus::Stalled => write!(f, "stalled"),
            StreamStatus::Paused => write!(f, "paused"),
        }
    }
}

/// Attribute that can be set on a live handle, in native units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamAttribute {
    /// 0.0 to 1.0
    Volume,

    /// -1.0 (left) to 1.0 (right)
    Pan,
}

/// Flags passed to the engine at creation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamFlags {
    /// Engine releases its decoder once playback ends
    pub auto_free: bool,

    /// Restart from the beginning when the end is reached
    pub looping: bool,
}

/// Owned playback resource for one sound instance
///
/// `free` consumes the handle, so a handle can be released at most once.
pub trait StreamHandle: Send {
    fn play(&self);
    fn pause(&self);
    fn stop(&self);
    fn free(self: Box<Self>);
    fn set_attribute(&self, attribute: StreamAttribute, value: f32);

    /// Current status, or `None` once the handle is no longer valid
    fn status(&self) -> Option<StreamStatus>;
}

/// Factory for stream handles
pub trait StreamEngine {
    fn create(&self, path: &Path, flags: StreamFlags) -> Result<Box<dyn StreamHandle>, EngineError>;
}
