/// Starting sounds
///
/// `play` walks a fixed sequence of gates (mute, focus, resolution, file
/// presence), applies the interrupt policy, then creates, configures, starts
/// and registers a stream.
use std::path::PathBuf;
use std::time::{Duration, Instant};

use super::fade::Ramp;
use super::group::{is_ambiance, GroupAttribute};
use super::manager::AudioSystem;
use super::registry::StreamEntry;
use super::resolver::candidates;
use super::stream::{StreamAttribute, StreamFlags};
use crate::error::{AudioError, AudioResult};
use crate::messaging::notifier::NotifyLevel;

/// Parameters of a `play` call
#[derive(Debug, Clone, PartialEq)]
pub struct PlayRequest {
    pub reference: String,
    pub group: String,
    /// Stop what the group is playing first
    pub interrupt: bool,
    /// Explicit pan, -100..100. Falls back to the group's pan.
    pub pan: Option<i32>,
    pub looping: bool,
    pub fade_in: Option<Duration>,
    /// Start even while the window is unfocused
    pub ignore_focus: bool,
}

impl PlayRequest {
    pub fn new(reference: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            group: group.into(),
            interrupt: false,
            pan: None,
            looping: false,
            fade_in: None,
            ignore_focus: false,
        }
    }

    pub fn interrupt(mut self) -> Self {
        self.interrupt = true;
        self
    }

    pub fn looping(mut self) -> Self {
        self.looping = true;
        self
    }

    pub fn with_pan(mut self, pan: i32) -> Self {
        self.pan = Some(GroupAttribute::Pan.clamp(pan));
        self
    }

    pub fn with_fade_in(mut self, duration: Duration) -> Self {
        self.fade_in = Some(duration).filter(|d| !d.is_zero());
        self
    }

    pub fn ignore_focus(mut self) -> Self {
        self.ignore_focus = true;
        self
    }
}

/// Successful outcome of `play`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    Started,
    Skipped(SkipReason),
}

/// Why a `play` call did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Audio is globally muted
    Muted,

    /// Window unfocused and the foreground-sound policy is on
    Unfocused,

    /// Ambiance never starts while unfocused
    AmbianceUnfocused,
}

impl AudioSystem {
    /// Start a sound in a group
    pub fn play(&mut self, request: &PlayRequest) -> AudioResult<Playback> {
        if let Some(reason) = self.skip_reason(request) {
            tracing::debug!("Skipping {} in {}: {:?}", request.reference, request.group, reason);
            return Ok(Playback::Skipped(reason));
        }

        let path = self.resolve(&request.reference)?;

        // The file may vanish between resolution and creation
        if !path.is_file() {
            let err = AudioError::MissingFile { path };
            tracing::warn!("{}", err);
            self.notify(NotifyLevel::Error, &err.to_string());
            return Err(err);
        }

        if request.interrupt && self.should_interrupt(request) {
            tracing::debug!("Interrupting {} for {}", request.group, request.reference);
            self.stop(Some(request.group.as_str()), false, None);
        }

        let flags = StreamFlags {
            auto_free: true,
            looping: request.looping,
        };
        let handle = match self.engine.create(&path, flags) {
            Ok(handle) => handle,
            Err(source) => {
                let err = AudioError::StreamCreation { path, source };
                let code = err.engine_code().unwrap_or_default();
                tracing::error!("{}: {}", err, code);
                self.notify(
                    NotifyLevel::Error,
                    &format!("Cannot play {} (error {})", request.reference, code),
                );
                return Err(err);
            }
        };

        let volume = self.group_volume(&request.group);
        let pan = request
            .pan
            .unwrap_or_else(|| self.config.attribute_or_default(&request.group, GroupAttribute::Pan));

        let mut entry = StreamEntry::new(handle, request.reference.clone());
        match request.fade_in {
            Some(duration) => {
                entry.set_attribute(StreamAttribute::Volume, 0.0);
                entry = entry.with_fade_in(Ramp::fade_in(volume, Instant::now(), duration));
            }
            None => entry.set_attribute(StreamAttribute::Volume, volume),
        }
        if pan != 0 {
            entry.set_attribute(StreamAttribute::Pan, GroupAttribute::Pan.to_native(pan as f32));
        }

        entry.handle().play();
        self.registry.register(&request.group, entry);

        tracing::info!("Playing {} in {} ({})", request.reference, request.group, path.display());
        Ok(Playback::Started)
    }

    fn skip_reason(&self, request: &PlayRequest) -> Option<SkipReason> {
        if self.config.muted {
            return Some(SkipReason::Muted);
        }
        if self.focus.is_focused() || request.ignore_focus {
            return None;
        }
        if self.config.foreground_only {
            Some(SkipReason::Unfocused)
        } else if is_ambiance(&request.group) {
            Some(SkipReason::AmbianceUnfocused)
        } else {
            None
        }
    }

    /// Resolve a reference, trying its classic forms
    fn resolve(&self, reference: &str) -> AudioResult<PathBuf> {
        let resolved = candidates(reference, self.config.classic_audio)
            .iter()
            .find_map(|candidate| self.resolver.resolve(candidate));

        resolved.ok_or_else(|| {
            let err = AudioError::Unresolved {
                reference: reference.to_string(),
            };
            tracing::debug!("{}", err);
            if self.config.debug {
                self.notify(NotifyLevel::Warning, &err.to_string());
            }
            err
        })
    }

    /// Ambiance is only restarted for a different sound
    fn should_interrupt(&mut self, request: &PlayRequest) -> bool {
        if !self.registry.is_playing(&request.group) {
            return false;
        }
        if !is_ambiance(&request.group) {
            return true;
        }
        self.registry
            .entries(&request.group)
            .iter()
            .any(|entry| entry.source() != request.reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_system::focus::FocusState;
    use crate::audio_system::memory::MemoryEngine;
    use crate::audio_system::resolver::DirectoryResolver;
    use crate::audio_system::stream::StreamStatus;
    use crate::config::Config;
    use crate::messaging::bus::EventBus;
    use crate::messaging::events::Event;
    use std::fs::{self, File};
    use std::path::Path;

    struct Fixture {
        dir: tempfile::TempDir,
        engine: MemoryEngine,
        bus: EventBus,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            for name in ["wind.ogg", "rain.ogg", "theme.ogg", "hit.wav", "classic/hit.wav"] {
                let path = dir.path().join(name);
                fs::create_dir_all(path.parent().unwrap()).unwrap();
                File::create(path).unwrap();
            }
            Self {
                dir,
                engine: MemoryEngine::new(),
                bus: EventBus::new(),
            }
        }

        fn system(&self, config: Config) -> AudioSystem {
            AudioSystem::new(
                config,
                Box::new(self.engine.clone()),
                Box::new(DirectoryResolver::new(self.dir.path())),
                Box::new(self.bus.clone()),
            )
        }

        fn path(&self, name: &str) -> std::path::PathBuf {
            self.dir.path().join(name)
        }
    }

    #[test]
    fn test_play_registers_and_starts() {
        let fx = Fixture::new();
        let mut audio = fx.system(Config::default());

        let outcome = audio.play(&PlayRequest::new("theme.ogg", "music").looping()).unwrap();
        assert_eq!(outcome, Playback::Started);
        assert!(audio.is_group_playing("music"));

        let record = fx.engine.record(fx.engine.last_id().unwrap()).unwrap();
        assert_eq!(record.path, fx.path("theme.ogg"));
        assert_eq!(record.status, Some(StreamStatus::Active));
        assert!(record.flags.auto_free);
        assert!(record.flags.looping);
    }

    #[test]
    fn test_muted_skips() {
        let fx = Fixture::new();
        let mut config = Config::default();
        config.muted = true;
        let mut audio = fx.system(config);

        let outcome = audio.play(&PlayRequest::new("theme.ogg", "music")).unwrap();
        assert_eq!(outcome, Playback::Skipped(SkipReason::Muted));
        assert_eq!(fx.engine.created_count(), 0);
    }

    #[test]
    fn test_unfocused_with_foreground_policy_skips_everything() {
        let fx = Fixture::new();
        let mut audio = fx.system(Config::default());
        audio.focus = FocusState::Unfocused;

        assert_eq!(
            audio.play(&PlayRequest::new("hit.wav", "other")).unwrap(),
            Playback::Skipped(SkipReason::Unfocused)
        );
        assert_eq!(
            audio.play(&PlayRequest::new("hit.wav", "other").ignore_focus()).unwrap(),
            Playback::Started
        );
    }

    #[test]
    fn test_unfocused_without_policy_only_skips_ambiance() {
        let fx = Fixture::new();
        let mut config = Config::default();
        config.foreground_only = false;
        let mut audio = fx.system(config);
        audio.focus = FocusState::Unfocused;

        assert_eq!(
            audio.play(&PlayRequest::new("wind.ogg", "ambiance")).unwrap(),
            Playback::Skipped(SkipReason::AmbianceUnfocused)
        );
        assert_eq!(
            audio.play(&PlayRequest::new("theme.ogg", "music")).unwrap(),
            Playback::Started
        );
    }

    #[test]
    fn test_unresolved_reference() {
        let fx = Fixture::new();
        let (rx, _) = fx.bus.subscribe();
        let mut audio = fx.system(Config::default());

        let err = audio.play(&PlayRequest::new("thunder.ogg", "other")).unwrap_err();
        assert!(matches!(err, AudioError::Unresolved { .. }));
        assert!(!audio.is_group_playing("other"));

        // Only reported to the user in debug mode
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_unresolved_reference_reported_in_debug_mode() {
        let fx = Fixture::new();
        let (rx, _) = fx.bus.subscribe();
        let mut config = Config::default();
        config.debug = true;
        let mut audio = fx.system(config);

        assert!(audio.play(&PlayRequest::new("thunder.ogg", "other")).is_err());
        match rx.try_recv().unwrap() {
            Event::Notification { level, message } => {
                assert_eq!(level, NotifyLevel::Warning);
                assert!(message.contains("thunder.ogg"));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_classic_audio_prefers_classic_variant() {
        let fx = Fixture::new();
        let mut config = Config::default();
        config.classic_audio = true;
        let mut audio = fx.system(config);

        audio.play(&PlayRequest::new("hit.wav", "other")).unwrap();
        let record = fx.engine.record(fx.engine.last_id().unwrap()).unwrap();
        assert_eq!(record.path, fx.path("classic/hit.wav"));

        // Falls back to the plain reference when no classic file exists
        audio.play(&PlayRequest::new("rain.ogg", "other")).unwrap();
        let record = fx.engine.record(fx.engine.last_id().unwrap()).unwrap();
        assert_eq!(record.path, fx.path("rain.ogg"));
    }

    #[test]
    fn test_classic_reference_reverse_maps() {
        let fx = Fixture::new();
        let mut audio = fx.system(Config::default());

        audio.play(&PlayRequest::new("classic/theme.ogg", "music")).unwrap();
        let record = fx.engine.record(fx.engine.last_id().unwrap()).unwrap();
        assert_eq!(record.path, fx.path("theme.ogg"));
    }

    #[test]
    fn test_engine_failure_registers_nothing() {
        let fx = Fixture::new();
        let (rx, _) = fx.bus.subscribe();
        let mut audio = fx.system(Config::default());
        fx.engine.fail_next_create(41);

        let err = audio.play(&PlayRequest::new("theme.ogg", "music")).unwrap_err();
        assert_eq!(err.engine_code(), Some(41));
        assert!(!audio.is_group_playing("music"));

        match rx.try_recv().unwrap() {
            Event::Notification { level, message } => {
                assert_eq!(level, NotifyLevel::Error);
                assert!(message.contains("41"));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_volume_and_pan_applied() {
        let fx = Fixture::new();
        let mut config = Config::default();
        config.set_group_attribute("music", GroupAttribute::Volume, 60);
        config.set_group_attribute("music", GroupAttribute::Pan, -20);
        let mut audio = fx.system(config);

        audio.play(&PlayRequest::new("theme.ogg", "music")).unwrap();
        let record = fx.engine.record(fx.engine.last_id().unwrap()).unwrap();
        assert!((record.volume - 0.6).abs() < 1e-6);
        assert!((record.pan + 0.2).abs() < 1e-6);

        // Explicit pan wins over the group's
        audio.play(&PlayRequest::new("rain.ogg", "music").with_pan(50)).unwrap();
        let record = fx.engine.record(fx.engine.last_id().unwrap()).unwrap();
        assert!((record.pan - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_zero_pan_is_not_written() {
        let fx = Fixture::new();
        let mut audio = fx.system(Config::default());

        audio.play(&PlayRequest::new("theme.ogg", "music")).unwrap();
        let record = fx.engine.record(fx.engine.last_id().unwrap()).unwrap();
        let pan_writes = record
            .calls
            .iter()
            .filter(|c| matches!(c, crate::audio_system::memory::StreamCall::SetAttribute(StreamAttribute::Pan, _)))
            .count();
        assert_eq!(pan_writes, 0);
    }

    #[test]
    fn test_interrupt_other_group_always_stops() {
        let fx = Fixture::new();
        let mut audio = fx.system(Config::default());

        audio.play(&PlayRequest::new("theme.ogg", "music")).unwrap();
        let first = fx.engine.last_id().unwrap();
        audio.play(&PlayRequest::new("theme.ogg", "music").interrupt()).unwrap();

        assert!(fx.engine.record(first).unwrap().stopped_before_free());
        assert_eq!(audio.group_len("music"), 1);
    }

    #[test]
    fn test_without_interrupt_sounds_stack() {
        let fx = Fixture::new();
        let mut audio = fx.system(Config::default());

        audio.play(&PlayRequest::new("hit.wav", "other")).unwrap();
        audio.play(&PlayRequest::new("hit.wav", "other")).unwrap();
        assert_eq!(audio.group_len("other"), 2);
    }

    #[test]
    fn test_ambiance_interrupt_only_for_different_sound() {
        let fx = Fixture::new();
        let mut audio = fx.system(Config::default());

        audio.play(&PlayRequest::new("wind.ogg", "ambiance").interrupt()).unwrap();
        let wind = fx.engine.last_id().unwrap();

        audio.play(&PlayRequest::new("wind.ogg", "ambiance").interrupt()).unwrap();
        assert!(!fx.engine.record(wind).unwrap().is_freed());

        audio.play(&PlayRequest::new("rain.ogg", "ambiance").interrupt()).unwrap();
        assert!(fx.engine.record(wind).unwrap().stopped_before_free());
        assert_eq!(audio.group_sources("ambiance"), vec!["rain.ogg".to_string()]);
    }

    #[test]
    fn test_fade_in_starts_silent() {
        let fx = Fixture::new();
        let mut audio = fx.system(Config::default());

        audio
            .play(&PlayRequest::new("wind.ogg", "ambiance").with_fade_in(Duration::from_secs(2)))
            .unwrap();
        let id = fx.engine.last_id().unwrap();
        assert_eq!(fx.engine.record(id).unwrap().volume, 0.0);

        audio.tick(Instant::now() + Duration::from_secs(3));
        assert_eq!(fx.engine.record(id).unwrap().volume, 1.0);
    }

    #[test]
    fn test_missing_file_at_play_time() {
        struct StaleResolver(std::path::PathBuf);
        impl crate::audio_system::resolver::FileResolver for StaleResolver {
            fn resolve(&self, _: &str) -> Option<std::path::PathBuf> {
                Some(self.0.clone())
            }
        }

        let fx = Fixture::new();
        let engine = MemoryEngine::new();
        let mut audio = AudioSystem::new(
            Config::default(),
            Box::new(engine.clone()),
            Box::new(StaleResolver(Path::new("/nonexistent/gone.ogg").to_path_buf())),
            Box::new(fx.bus.clone()),
        );

        let err = audio.play(&PlayRequest::new("gone.ogg", "other")).unwrap_err();
        assert!(matches!(err, AudioError::MissingFile { .. }));
        assert_eq!(engine.created_count(), 0);
    }
}
