/// Audio system module
///
/// Manages concurrently playing sound streams organized into named groups:
/// - Per-group registries with a capacity bound and lazy cleanup
/// - Interrupt semantics, with ambiance only restarting for a different sound
/// - Focus-aware pausing of ambiance and destruction of other groups
/// - Per-group volume and pan, global mute, timed fades
///
/// ## Architecture
///
/// ```text
/// AudioSystem
///   ├── GroupRegistry
///   │     ├── "ambiance" → [StreamEntry, ...]  ─┐
///   │     ├── "music"    → [StreamEntry, ...]  ─┤ at most 10 each
///   │     └── "other"    → [StreamEntry, ...]  ─┘
///   ├── FileResolver  (reference → file on disk)
///   ├── StreamEngine  (file → StreamHandle)
///   └── Notifier      (user-visible messages, broadcasts)
/// ```
///
/// ## Usage
///
/// ```rust,ignore
/// use sound_groups::audio_system::{AudioSystem, DirectoryResolver, PlayRequest, RodioEngine};
///
/// let mut audio = AudioSystem::new(
///     config,
///     Box::new(RodioEngine::new()?),
///     Box::new(DirectoryResolver::new("sounds")),
///     Box::new(NullNotifier),
/// );
///
/// audio.play(&PlayRequest::new("rain.ogg", "ambiance").interrupt().looping())?;
/// audio.play(&PlayRequest::new("battle.mp3", "music").interrupt())?;
///
/// audio.on_focus_lost();
/// audio.stop(Some("music"), false, Some(Duration::from_secs(2)));
/// ```
pub mod attributes;
pub mod fade;
pub mod focus;
pub mod group;
pub mod manager;
pub mod memory;
pub mod playback;
pub mod registry;
pub mod resolver;
pub mod rodio_engine;
pub mod stop;
pub mod stream;

// Re-export commonly used types
pub use fade::Ramp;
pub use focus::FocusState;
pub use group::{GroupAttribute, AMBIANCE, GROUP_CAPACITY, OTHER};
pub use manager::AudioSystem;
pub use memory::MemoryEngine;
pub use playback::{PlayRequest, Playback, SkipReason};
pub use registry::{GroupRegistry, StreamEntry};
pub use resolver::{DirectoryResolver, FileResolver};
pub use rodio_engine::RodioEngine;
pub use stop::StopOutcome;
pub use stream::{StreamAttribute, StreamEngine, StreamFlags, StreamHandle, StreamStatus};
