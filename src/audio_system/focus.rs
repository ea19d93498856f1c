/// Window focus handling
///
/// Ambiance is paused on focus loss and resumed on focus gain. Other groups
/// are destroyed on focus loss when the foreground-sound policy is on, and
/// left alone otherwise.
use super::group::{is_ambiance, AMBIANCE};
use super::manager::AudioSystem;

/// Whether the host window has input focus
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum FocusState {
    #[default]
    Focused,
    Unfocused,
}

impl FocusState {
    pub fn is_focused(&self) -> bool {
        matches!(self, FocusState::Focused)
    }

    /// Get a human-readable description of the state
    pub fn description(&self) -> &'static str {
        match self {
            FocusState::Focused => "Focused",
            FocusState::Unfocused => "Unfocused",
        }
    }
}

impl AudioSystem {
    /// Handle the window losing focus
    ///
    /// Returns `false` if the window was already unfocused.
    pub fn on_focus_lost(&mut self) -> bool {
        if !self.focus.is_focused() {
            return false;
        }
        self.focus = FocusState::Unfocused;

        self.registry.cleanup_all();
        self.registry.pause_group(AMBIANCE);

        // Detached ambiance is never resumed
        let foreground_only = self.config.foreground_only;
        let released = self.release_fading(|group| foreground_only || is_ambiance(group));
        if released > 0 {
            tracing::debug!("Focus lost: released {} fading stream(s)", released);
        }

        if foreground_only {
            let others: Vec<String> = self
                .registry
                .group_names()
                .into_iter()
                .filter(|group| !is_ambiance(group))
                .collect();
            let stopped: usize = others
                .iter()
                .map(|group| self.registry.stop_group(Some(group.as_str()), false))
                .sum();
            tracing::info!("Focus lost: ambiance paused, {} other stream(s) stopped", stopped);
        } else {
            tracing::info!("Focus lost: ambiance paused");
        }
        true
    }

    /// Handle the window regaining focus
    ///
    /// Returns `false` if the window was already focused.
    pub fn on_focus_gained(&mut self) -> bool {
        if self.focus.is_focused() {
            return false;
        }
        self.focus = FocusState::Focused;

        self.registry.resume_group(AMBIANCE);
        tracing::info!(
            "Focus gained: resumed {} ambiance stream(s)",
            self.registry.group_len(AMBIANCE)
        );
        true
    }
}
