/// Stopping sounds
///
/// Stopped entries leave the registry at once. With a fade they are kept in
/// a side list and released by `tick` when their ramp reaches silence.
use std::time::{Duration, Instant};

use super::fade::Ramp;
use super::manager::AudioSystem;
use super::registry::StreamEntry;
use super::stream::StreamAttribute;

/// Outcome of a `stop` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// This many streams were stopped (or started fading out)
    Stopped(usize),

    /// No matching stream was registered
    NothingToStop,
}

/// Stream detached from the registry, fading to silence
pub struct FadingStream {
    group: String,
    entry: StreamEntry,
    ramp: Ramp,
}

impl FadingStream {
    pub(super) fn release(self) {
        self.entry.release();
    }

    pub(super) fn pause(&self) {
        self.entry.handle().pause();
    }

    pub(super) fn resume(&self) {
        self.entry.handle().play();
    }
}

impl AudioSystem {
    /// Stop streams in one group, or in every group
    ///
    /// `last_only` limits a group stop to its most recent entry; it is
    /// ignored when stopping every group. A non-zero `fade` ramps the
    /// volume down over that duration before releasing.
    pub fn stop(&mut self, group: Option<&str>, last_only: bool, fade: Option<Duration>) -> StopOutcome {
        let detached = self.registry.detach(group, last_only && group.is_some());
        if detached.is_empty() {
            return StopOutcome::NothingToStop;
        }
        let count = detached.len();

        match fade.filter(|d| !d.is_zero()) {
            Some(duration) if !self.config.muted => {
                let now = Instant::now();
                for (group, entry) in detached {
                    let from = match entry.fade_in() {
                        Some(ramp) => ramp.level_at(now),
                        None => self.group_volume(&group),
                    };
                    self.fading.push(FadingStream {
                        group,
                        entry,
                        ramp: Ramp::fade_out(from, now, duration),
                    });
                }
                tracing::info!(
                    "Fading out {} stream(s) in {} over {:?}",
                    count,
                    group.unwrap_or("all groups"),
                    duration
                );
            }
            _ => {
                for (_, entry) in detached {
                    entry.release();
                }
                tracing::info!("Stopped {} stream(s) in {}", count, group.unwrap_or("all groups"));
            }
        }

        StopOutcome::Stopped(count)
    }

    /// Release fading streams whose group matches, returning how many
    pub(super) fn release_fading(&mut self, matches: impl Fn(&str) -> bool) -> usize {
        let (released, kept): (Vec<_>, Vec<_>) = self
            .fading
            .drain(..)
            .partition(|fading| matches(&fading.group));
        self.fading = kept;

        let count = released.len();
        for fading in released {
            fading.release();
        }
        count
    }

    /// Advance fade-outs, releasing the ones that reached silence
    pub(super) fn advance_fade_outs(&mut self, now: Instant) {
        if self.fading.is_empty() {
            return;
        }

        let muted = self.config.muted;
        let (finished, pending): (Vec<_>, Vec<_>) = self
            .fading
            .drain(..)
            .partition(|fading| fading.ramp.is_finished(now));

        for fading in &pending {
            if !muted {
                fading
                    .entry
                    .set_attribute(StreamAttribute::Volume, fading.ramp.level_at(now));
            }
        }
        self.fading = pending;

        if !finished.is_empty() {
            tracing::debug!("Fade-out finished for {} stream(s)", finished.len());
        }
        for fading in finished {
            fading.release();
        }
    }
}
