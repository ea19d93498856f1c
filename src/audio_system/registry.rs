/// Group registry
///
/// Owns every live stream handle, keyed by group name. Each group is an
/// ordered sequence (oldest first) capped at `GROUP_CAPACITY` entries, and a
/// group with no entries is never kept.
use std::collections::HashMap;
use std::time::Instant;

use super::fade::Ramp;
use super::group::GROUP_CAPACITY;
use super::stream::{StreamAttribute, StreamHandle, StreamStatus};

/// One playing or recently-playing sound instance
pub struct StreamEntry {
    handle: Box<dyn StreamHandle>,
    source: String,
    fade_in: Option<Ramp>,
}

impl StreamEntry {
    pub fn new(handle: Box<dyn StreamHandle>, source: impl Into<String>) -> Self {
        Self {
            handle,
            source: source.into(),
            fade_in: None,
        }
    }

    /// Attach a fade-in ramp, advanced by `tick`
    pub fn with_fade_in(mut self, ramp: Ramp) -> Self {
        self.fade_in = Some(ramp);
        self
    }

    /// Sound reference as originally requested
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn handle(&self) -> &dyn StreamHandle {
        self.handle.as_ref()
    }

    pub fn status(&self) -> Option<StreamStatus> {
        self.handle.status()
    }

    pub fn set_attribute(&self, attribute: StreamAttribute, value: f32) {
        self.handle.set_attribute(attribute, value);
    }

    pub fn fade_in(&self) -> Option<&Ramp> {
        self.fade_in.as_ref()
    }

    pub fn cancel_fade_in(&mut self) {
        self.fade_in = None;
    }

    /// Advance the fade-in ramp. Returns the level to apply, if any.
    pub fn advance_fade_in(&mut self, now: Instant) -> Option<f32> {
        let ramp = self.fade_in?;
        if ramp.is_finished(now) {
            self.fade_in = None;
            return Some(ramp.target());
        }
        Some(ramp.level_at(now))
    }

    /// Stop then free the handle
    pub fn release(self) {
        tracing::trace!("Releasing stream for {}", self.source);
        self.handle.stop();
        self.handle.free();
    }
}

/// Mapping from group name to its ordered entries
#[derive(Default)]
pub struct GroupRegistry {
    groups: HashMap<String, Vec<StreamEntry>>,
}

impl GroupRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop finished entries from a group
    ///
    /// Scans newest to oldest. `Stopped` entries are freed and removed,
    /// entries whose handle is invalid are removed without a free. Paused and
    /// stalled entries may still resume, so they stay. Returns the number of
    /// entries removed.
    pub fn cleanup(&mut self, group: &str) -> usize {
        let Some(entries) = self.groups.get_mut(group) else {
            return 0;
        };

        let mut removed = 0;
        for index in (0..entries.len()).rev() {
            match entries[index].status() {
                Some(status) if status.is_terminal() => {
                    let entry = entries.remove(index);
                    entry.handle.free();
                    removed += 1;
                }
                None => {
                    let entry = entries.remove(index);
                    tracing::debug!("Dropping invalid handle for {} in {}", entry.source, group);
                    removed += 1;
                }
                Some(_) => {}
            }
        }

        if entries.is_empty() {
            self.groups.remove(group);
        }
        if removed > 0 {
            tracing::debug!("Cleaned up {} finished stream(s) in {}", removed, group);
        }
        removed
    }

    /// Run `cleanup` on every group
    pub fn cleanup_all(&mut self) -> usize {
        self.group_names()
            .iter()
            .map(|group| self.cleanup(group))
            .sum()
    }

    /// Append an entry, evicting the oldest one past capacity
    pub fn register(&mut self, group: &str, entry: StreamEntry) {
        self.cleanup(group);

        let entries = self.groups.entry(group.to_string()).or_default();
        entries.push(entry);

        while entries.len() > GROUP_CAPACITY {
            let oldest = entries.remove(0);
            tracing::debug!("Group {} over capacity, evicting {}", group, oldest.source);
            oldest.release();
        }
    }

    /// Check whether a group has live entries, cleaning it up first
    pub fn is_playing(&mut self, group: &str) -> bool {
        self.cleanup(group);
        self.groups.get(group).is_some_and(|entries| !entries.is_empty())
    }

    /// Remove entries without releasing them
    ///
    /// With a group name, takes the whole group or, if `last_only`, only its
    /// most recent entry. Without a group name, takes every entry of every
    /// group. Entries come back paired with their group name.
    pub fn detach(&mut self, group: Option<&str>, last_only: bool) -> Vec<(String, StreamEntry)> {
        let Some(group) = group else {
            return self
                .groups
                .drain()
                .flat_map(|(name, entries)| entries.into_iter().map(move |entry| (name.clone(), entry)))
                .collect();
        };

        if !last_only {
            return self
                .groups
                .remove(group)
                .unwrap_or_default()
                .into_iter()
                .map(|entry| (group.to_string(), entry))
                .collect();
        }

        let Some(entries) = self.groups.get_mut(group) else {
            return Vec::new();
        };
        let detached = entries.pop().map(|entry| (group.to_string(), entry));
        if entries.is_empty() {
            self.groups.remove(group);
        }
        detached.into_iter().collect()
    }

    /// Detach entries and release them. Returns how many were stopped.
    pub fn stop_group(&mut self, group: Option<&str>, last_only: bool) -> usize {
        let detached = self.detach(group, last_only);
        let count = detached.len();
        for (_, entry) in detached {
            entry.release();
        }
        count
    }

    /// Release every handle and empty the registry
    pub fn teardown_all(&mut self) -> usize {
        let count = self.stop_group(None, false);
        if count > 0 {
            tracing::debug!("Registry torn down, released {} stream(s)", count);
        }
        count
    }

    /// Entries of a group, oldest first
    pub fn entries(&self, group: &str) -> &[StreamEntry] {
        self.groups.get(group).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Mutable entries of a group
    pub fn entries_mut(&mut self, group: &str) -> Option<&mut Vec<StreamEntry>> {
        self.groups.get_mut(group)
    }

    /// Every entry, grouped by name
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut StreamEntry)> {
        self.groups.iter_mut().flat_map(|(group, entries)| {
            entries.iter_mut().map(move |entry| (group.as_str(), entry))
        })
    }

    /// Pause every entry of a group
    pub fn pause_group(&self, group: &str) {
        for entry in self.entries(group) {
            entry.handle.pause();
        }
    }

    /// Resume every entry of a group
    pub fn resume_group(&self, group: &str) {
        for entry in self.entries(group) {
            entry.handle.play();
        }
    }

    pub fn contains(&self, group: &str) -> bool {
        self.groups.contains_key(group)
    }

    pub fn group_len(&self, group: &str) -> usize {
        self.entries(group).len()
    }

    /// Names of groups with entries, sorted
    pub fn group_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.groups.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
