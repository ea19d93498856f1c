/// Audio system
///
/// Owns the group registry together with the focus flag and the active-group
/// cursor. All state is mutated through `&mut self`; a host that shares the
/// system across threads serializes access (see `CommandExecutor`).
use std::path::PathBuf;
use std::time::Instant;

use super::focus::FocusState;
use super::registry::GroupRegistry;
use super::resolver::FileResolver;
use super::stop::FadingStream;
use super::stream::{StreamAttribute, StreamEngine};
use super::group::GroupAttribute;
use crate::config::Config;
use crate::messaging::notifier::{Notifier, NotifyLevel};

/// Stream group manager
pub struct AudioSystem {
    pub(super) config: Config,
    pub(super) config_path: Option<PathBuf>,
    pub(super) engine: Box<dyn StreamEngine>,
    pub(super) resolver: Box<dyn FileResolver>,
    pub(super) notifier: Box<dyn Notifier>,
    pub(super) registry: GroupRegistry,
    pub(super) fading: Vec<FadingStream>,
    pub(super) focus: FocusState,
    /// 1-based index into the configured group list
    pub(super) active_group: usize,
}

impl AudioSystem {
    /// Create an audio system with an empty registry, focused
    pub fn new(
        config: Config,
        engine: Box<dyn StreamEngine>,
        resolver: Box<dyn FileResolver>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        tracing::debug!(
            "Audio system ready with groups {:?} (muted={}, foreground_only={})",
            config.audio_groups(),
            config.muted,
            config.foreground_only
        );

        Self {
            config,
            config_path: None,
            engine,
            resolver,
            notifier,
            registry: GroupRegistry::new(),
            fading: Vec::new(),
            focus: FocusState::Focused,
            active_group: 1,
        }
    }

    /// Persist configuration changes to `path`
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn focus(&self) -> FocusState {
        self.focus
    }

    /// Check whether a group has live streams
    pub fn is_group_playing(&mut self, group: &str) -> bool {
        self.registry.is_playing(group)
    }

    /// Number of entries registered in a group
    pub fn group_len(&self, group: &str) -> usize {
        self.registry.group_len(group)
    }

    /// Source references of a group's entries, oldest first
    pub fn group_sources(&self, group: &str) -> Vec<String> {
        self.registry
            .entries(group)
            .iter()
            .map(|entry| entry.source().to_string())
            .collect()
    }

    /// Names of groups with registered entries
    pub fn active_groups(&self) -> Vec<String> {
        self.registry.group_names()
    }

    /// Number of streams still fading out
    pub fn fading_count(&self) -> usize {
        self.fading.len()
    }

    pub fn pause_group(&self, group: &str) {
        tracing::debug!("Pausing group {}", group);
        self.registry.pause_group(group);
    }

    pub fn resume_group(&self, group: &str) {
        tracing::debug!("Resuming group {}", group);
        self.registry.resume_group(group);
    }

    pub fn pause_all(&self) {
        for group in self.registry.group_names() {
            self.registry.pause_group(&group);
        }
        for fading in &self.fading {
            fading.pause();
        }
        tracing::debug!("Paused all groups");
    }

    pub fn resume_all(&self) {
        for group in self.registry.group_names() {
            self.registry.resume_group(&group);
        }
        for fading in &self.fading {
            fading.resume();
        }
        tracing::debug!("Resumed all groups");
    }

    /// Stop and release every stream, including ones fading out
    pub fn teardown_all(&mut self) {
        let mut released = self.registry.teardown_all();
        for fading in self.fading.drain(..) {
            fading.release();
            released += 1;
        }
        if released > 0 {
            tracing::info!("Audio system torn down, released {} stream(s)", released);
        }
    }

    /// Advance fade-in and fade-out ramps
    pub fn tick(&mut self, now: Instant) {
        let muted = self.config.muted;
        for (_, entry) in self.registry.iter_mut() {
            if let Some(level) = entry.advance_fade_in(now) {
                if !muted {
                    entry.set_attribute(StreamAttribute::Volume, level);
                }
            }
        }
        self.advance_fade_outs(now);
    }

    /// Configured volume of a group in native units
    pub(super) fn group_volume(&self, group: &str) -> f32 {
        GroupAttribute::Volume.to_native(
            self.config.attribute_or_default(group, GroupAttribute::Volume) as f32,
        )
    }

    pub(super) fn notify(&self, level: NotifyLevel, message: &str) {
        self.notifier.notify(level, message);
    }

    /// Write the configuration back, if it came from a file
    pub(super) fn persist_config(&self) {
        let Some(path) = &self.config_path else {
            return;
        };
        if let Err(e) = self.config.save_to(path) {
            tracing::warn!("Failed to persist configuration: {}", e);
        }
    }
}

impl Drop for AudioSystem {
    fn drop(&mut self) {
        self.teardown_all();
    }
}
