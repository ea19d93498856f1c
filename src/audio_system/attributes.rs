/// Live volume and pan control
///
/// Attribute values are configured per group on a 0-100 scale (pan is
/// signed, -100..100) and converted to native units when applied to handles.
use super::group::{GroupAttribute, OTHER};
use super::manager::AudioSystem;
use super::playback::PlayRequest;
use super::stream::StreamAttribute;
use crate::messaging::events::VOLUME_CHANNEL;
use crate::messaging::notifier::NotifyLevel;

fn native(attribute: GroupAttribute) -> StreamAttribute {
    match attribute {
        GroupAttribute::Volume => StreamAttribute::Volume,
        GroupAttribute::Pan => StreamAttribute::Pan,
    }
}

impl AudioSystem {
    /// Set an attribute on every live entry of a group, instantly
    ///
    /// Cancels pending fade-ins in the group. Volume writes are held back
    /// while muted so unmuting restores the configured level.
    pub fn slide_group(&mut self, group: &str, attribute: GroupAttribute, value: f32) {
        self.registry.cleanup(group);
        let muted = self.config.muted;
        let Some(entries) = self.registry.entries_mut(group) else {
            return;
        };

        let level = attribute.to_native(value);
        for entry in entries.iter_mut() {
            if attribute == GroupAttribute::Volume {
                entry.cancel_fade_in();
                if muted {
                    continue;
                }
            }
            entry.set_attribute(native(attribute), level);
        }
        tracing::debug!("Set {} of {} to {}", attribute, group, value);
    }

    /// Name of the group targeted by `adjust_attribute`
    pub fn active_group(&self) -> Option<&str> {
        let groups = self.config.audio_groups();
        if groups.is_empty() {
            return None;
        }
        let index = (self.active_group.max(1) - 1) % groups.len();
        Some(groups[index])
    }

    /// Nudge an attribute of the active group by `delta`
    ///
    /// Returns the new configured value, or `None` without groups.
    pub fn adjust_attribute(&mut self, attribute: GroupAttribute, delta: i32) -> Option<i32> {
        let group = self.active_group()?.to_string();
        let current = self.config.attribute_or_default(&group, attribute);
        let value = attribute.clamp(current.saturating_add(delta));

        self.config.set_group_attribute(&group, attribute, value);
        self.persist_config();
        self.slide_group(&group, attribute, value as f32);

        match attribute {
            GroupAttribute::Volume => {
                self.play_click();
                let payload = serde_json::json!({ "group": group, "volume": value });
                self.notifier.broadcast(VOLUME_CHANNEL, &payload.to_string());
            }
            GroupAttribute::Pan => {
                self.notify(NotifyLevel::Info, &format!("{} {}: {}", group, attribute, value));
            }
        }
        Some(value)
    }

    /// Flip global mute, returning the new state
    ///
    /// Muting zeroes the volume of live streams without stopping them, so
    /// unmuting is instant. Streams fading out are released at once.
    pub fn toggle_mute(&mut self) -> bool {
        let was_muted = self.config.is_muted();
        let muted = self.config.toggle_mute();
        self.persist_config();

        if muted {
            let released = self.release_fading(|_| true);
            if released > 0 {
                tracing::debug!("Released {} fading stream(s) on mute", released);
            }
        }

        for group in self.registry.group_names() {
            let level = if was_muted { self.group_volume(&group) } else { 0.0 };
            if let Some(entries) = self.registry.entries_mut(&group) {
                for entry in entries.iter_mut() {
                    entry.cancel_fade_in();
                    entry.set_attribute(StreamAttribute::Volume, level);
                }
            }
        }

        tracing::info!("Sound {}", if muted { "muted" } else { "unmuted" });
        self.notify(
            NotifyLevel::Info,
            if muted { "Sound muted" } else { "Sound unmuted" },
        );
        muted
    }

    /// Make the next configured group active
    pub fn cycle_group_forward(&mut self) -> Option<String> {
        let count = self.config.groups.len();
        if count == 0 {
            return None;
        }
        self.active_group = self.active_group % count + 1;
        self.announce_active_group()
    }

    /// Make the previous configured group active
    pub fn cycle_group_backward(&mut self) -> Option<String> {
        let count = self.config.groups.len();
        if count == 0 {
            return None;
        }
        self.active_group = if self.active_group <= 1 || self.active_group > count {
            count
        } else {
            self.active_group - 1
        };
        self.announce_active_group()
    }

    fn announce_active_group(&mut self) -> Option<String> {
        let group = self.active_group()?.to_string();
        let volume = self.config.attribute_or_default(&group, GroupAttribute::Volume);

        self.play_click();
        self.notify(NotifyLevel::Info, &format!("{}: volume {}", group, volume));
        tracing::debug!("Active group is now {} ({})", group, self.active_group);
        Some(group)
    }

    /// Companion click, if one is configured
    fn play_click(&mut self) {
        let Some(click) = self.config.click_sound.clone() else {
            return;
        };
        if let Err(e) = self.play(&PlayRequest::new(click, OTHER).ignore_focus()) {
            tracing::debug!("Click sound failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_system::memory::MemoryEngine;
    use crate::audio_system::resolver::DirectoryResolver;
    use crate::config::Config;
    use crate::messaging::bus::EventBus;
    use crate::messaging::events::Event;
    use std::fs::File;
    use std::time::{Duration, Instant};

    fn system(dir: &tempfile::TempDir, engine: &MemoryEngine, bus: &EventBus, config: Config) -> AudioSystem {
        for name in ["wind.ogg", "theme.ogg", "click.wav"] {
            File::create(dir.path().join(name)).unwrap();
        }
        AudioSystem::new(
            config,
            Box::new(engine.clone()),
            Box::new(DirectoryResolver::new(dir.path())),
            Box::new(bus.clone()),
        )
    }

    fn volume_of(engine: &MemoryEngine, file: &str) -> f32 {
        engine.record(engine.ids_for(file)[0]).unwrap().volume
    }

    #[test]
    fn test_slide_group_sets_volume_and_pan() {
        let dir = tempfile::tempdir().unwrap();
        let engine = MemoryEngine::new();
        let mut audio = system(&dir, &engine, &EventBus::new(), Config::default());

        audio.play(&PlayRequest::new("theme.ogg", "music")).unwrap();
        audio.slide_group("music", GroupAttribute::Volume, 25.0);
        audio.slide_group("music", GroupAttribute::Pan, -40.0);

        let record = engine.record(engine.last_id().unwrap()).unwrap();
        assert_eq!(record.volume, 0.25);
        assert_eq!(record.pan, -0.4);
    }

    #[test]
    fn test_slide_cancels_fade_in() {
        let dir = tempfile::tempdir().unwrap();
        let engine = MemoryEngine::new();
        let mut audio = system(&dir, &engine, &EventBus::new(), Config::default());

        audio
            .play(&PlayRequest::new("wind.ogg", "ambiance").with_fade_in(Duration::from_secs(4)))
            .unwrap();
        audio.slide_group("ambiance", GroupAttribute::Volume, 30.0);
        audio.tick(Instant::now() + Duration::from_secs(10));

        assert_eq!(volume_of(&engine, "wind.ogg"), 0.3);
    }

    #[test]
    fn test_adjust_volume_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let engine = MemoryEngine::new();
        let mut config = Config::default();
        config.set_group_attribute("ambiance", GroupAttribute::Volume, 60);
        let mut audio = system(&dir, &engine, &EventBus::new(), config);

        assert_eq!(audio.active_group(), Some("ambiance"));
        assert_eq!(audio.adjust_attribute(GroupAttribute::Volume, 5), Some(65));
        assert_eq!(audio.adjust_attribute(GroupAttribute::Volume, -5), Some(60));
        assert_eq!(
            audio.config().group_attribute("ambiance", GroupAttribute::Volume),
            Some(60)
        );
    }

    #[test]
    fn test_adjust_clamps_at_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let engine = MemoryEngine::new();
        let mut audio = system(&dir, &engine, &EventBus::new(), Config::default());

        assert_eq!(audio.adjust_attribute(GroupAttribute::Volume, 5), Some(100));
        assert_eq!(audio.adjust_attribute(GroupAttribute::Volume, -5), Some(95));
        assert_eq!(audio.adjust_attribute(GroupAttribute::Pan, -250), Some(-100));
    }

    #[test]
    fn test_adjust_volume_applies_live_and_broadcasts() {
        let dir = tempfile::tempdir().unwrap();
        let engine = MemoryEngine::new();
        let bus = EventBus::new();
        let (rx, _) = bus.subscribe();
        let mut audio = system(&dir, &engine, &bus, Config::default());

        audio.play(&PlayRequest::new("wind.ogg", "ambiance")).unwrap();
        audio.adjust_attribute(GroupAttribute::Volume, -30);

        assert!((volume_of(&engine, "wind.ogg") - 0.7).abs() < 1e-6);
        let event = rx.try_recv().unwrap();
        match event {
            Event::Broadcast { channel, payload } => {
                assert_eq!(channel, VOLUME_CHANNEL);
                let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
                assert_eq!(value["group"], "ambiance");
                assert_eq!(value["volume"], 70);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_adjust_pan_notifies_locally() {
        let dir = tempfile::tempdir().unwrap();
        let engine = MemoryEngine::new();
        let bus = EventBus::new();
        let (rx, _) = bus.subscribe();
        let mut audio = system(&dir, &engine, &bus, Config::default());

        audio.adjust_attribute(GroupAttribute::Pan, 10);
        assert!(matches!(
            rx.try_recv().unwrap(),
            Event::Notification { level: NotifyLevel::Info, .. }
        ));
    }

    #[test]
    fn test_click_sound_on_volume_change() {
        let dir = tempfile::tempdir().unwrap();
        let engine = MemoryEngine::new();
        let mut config = Config::default();
        config.click_sound = Some("click.wav".to_string());
        let mut audio = system(&dir, &engine, &EventBus::new(), config);

        audio.adjust_attribute(GroupAttribute::Volume, -10);
        assert_eq!(engine.ids_for("click.wav").len(), 1);
        assert_eq!(audio.group_sources(OTHER), vec!["click.wav".to_string()]);
    }

    #[test]
    fn test_mute_round_trip_restores_volume() {
        let dir = tempfile::tempdir().unwrap();
        let engine = MemoryEngine::new();
        let mut config = Config::default();
        config.set_group_attribute("music", GroupAttribute::Volume, 45);
        let mut audio = system(&dir, &engine, &EventBus::new(), config);

        audio.play(&PlayRequest::new("theme.ogg", "music")).unwrap();
        audio.play(&PlayRequest::new("wind.ogg", "ambiance")).unwrap();
        let before_theme = volume_of(&engine, "theme.ogg");
        let before_wind = volume_of(&engine, "wind.ogg");

        assert!(audio.toggle_mute());
        assert_eq!(volume_of(&engine, "theme.ogg"), 0.0);
        assert_eq!(volume_of(&engine, "wind.ogg"), 0.0);
        // Muted streams keep playing
        assert!(audio.is_group_playing("music"));

        assert!(!audio.toggle_mute());
        assert_eq!(volume_of(&engine, "theme.ogg"), before_theme);
        assert_eq!(volume_of(&engine, "wind.ogg"), before_wind);
    }

    #[test]
    fn test_volume_slide_held_back_while_muted() {
        let dir = tempfile::tempdir().unwrap();
        let engine = MemoryEngine::new();
        let mut audio = system(&dir, &engine, &EventBus::new(), Config::default());

        audio.play(&PlayRequest::new("theme.ogg", "music")).unwrap();
        audio.toggle_mute();
        audio.slide_group("music", GroupAttribute::Volume, 80.0);
        assert_eq!(volume_of(&engine, "theme.ogg"), 0.0);
    }

    #[test]
    fn test_group_cycling_wraps() {
        let dir = tempfile::tempdir().unwrap();
        let engine = MemoryEngine::new();
        let mut audio = system(&dir, &engine, &EventBus::new(), Config::default());

        assert_eq!(audio.active_group(), Some("ambiance"));
        assert_eq!(audio.cycle_group_forward().as_deref(), Some("music"));
        assert_eq!(audio.cycle_group_forward().as_deref(), Some("other"));
        assert_eq!(audio.cycle_group_forward().as_deref(), Some("ambiance"));

        assert_eq!(audio.cycle_group_backward().as_deref(), Some("other"));
        assert_eq!(audio.cycle_group_backward().as_deref(), Some("music"));
    }

    #[test]
    fn test_cycling_announces_group() {
        let dir = tempfile::tempdir().unwrap();
        let engine = MemoryEngine::new();
        let bus = EventBus::new();
        let (rx, _) = bus.subscribe();
        let mut config = Config::default();
        config.set_group_attribute("music", GroupAttribute::Volume, 35);
        let mut audio = system(&dir, &engine, &bus, config);

        audio.cycle_group_forward();
        assert_eq!(
            rx.try_recv().unwrap(),
            Event::Notification {
                level: NotifyLevel::Info,
                message: "music: volume 35".to_string(),
            }
        );
    }

    #[test]
    fn test_no_groups_configured() {
        let dir = tempfile::tempdir().unwrap();
        let engine = MemoryEngine::new();
        let mut config = Config::default();
        config.groups.clear();
        let mut audio = system(&dir, &engine, &EventBus::new(), config);

        assert_eq!(audio.active_group(), None);
        assert_eq!(audio.cycle_group_forward(), None);
        assert_eq!(audio.adjust_attribute(GroupAttribute::Volume, 5), None);
    }
}
