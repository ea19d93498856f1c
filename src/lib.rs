//! Grouped sound playback
//!
//! A stream group manager: sounds are started into named groups ("ambiance",
//! "music", ...), each holding a bounded list of live streams with shared
//! volume and pan. Groups react to window focus, global mute and interrupt
//! requests. The `messaging` module wraps the manager in a command thread.

pub mod audio_system;
pub mod config;
pub mod error;
pub mod messaging;

pub use audio_system::{AudioSystem, GroupAttribute, PlayRequest, Playback, StopOutcome};
pub use config::Config;
pub use error::{AudioError, CommandError, ConfigError, EngineError};
