/// Command executor
///
/// Owns the audio system on a dedicated thread. Commands arrive over a
/// channel; between commands the loop ticks fades at a fixed interval.

use crossbeam_channel::{unbounded, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::bus::EventBus;
use super::commands::Command;
use super::events::Event;
use super::notifier::NotifyLevel;
use crate::audio_system::manager::AudioSystem;
use crate::audio_system::playback::Playback;
use crate::audio_system::stop::StopOutcome;
use crate::error::AppResult;

/// Interval between fade ticks while idle
pub const TICK_INTERVAL: Duration = Duration::from_millis(50);

/// Apply one command to the audio system
///
/// Returns a status line for `Command::Status`. `Command::Quit` is handled
/// by the executor loop and does nothing here.
pub fn apply(audio: &mut AudioSystem, command: Command) -> Option<String> {
    tracing::debug!("Executing command: {}", command.description());

    match command {
        Command::Play(request) => match audio.play(&request) {
            Ok(Playback::Started) => {}
            Ok(Playback::Skipped(reason)) => {
                tracing::debug!("{} skipped: {:?}", request.reference, reason);
            }
            Err(e) => tracing::warn!("Failed to play {}: {}", request.reference, e),
        },
        Command::Stop {
            group,
            last_only,
            fade,
        } => {
            if audio.stop(group.as_deref(), last_only, fade) == StopOutcome::NothingToStop {
                tracing::debug!("Nothing to stop in {}", group.as_deref().unwrap_or("any group"));
            }
        }
        Command::Pause { group: Some(group) } => audio.pause_group(&group),
        Command::Pause { group: None } => audio.pause_all(),
        Command::Resume { group: Some(group) } => audio.resume_group(&group),
        Command::Resume { group: None } => audio.resume_all(),
        Command::FocusLost => {
            audio.on_focus_lost();
        }
        Command::FocusGained => {
            audio.on_focus_gained();
        }
        Command::Adjust { attribute, delta } => {
            audio.adjust_attribute(attribute, delta);
        }
        Command::Slide {
            group,
            attribute,
            value,
        } => audio.slide_group(&group, attribute, value),
        Command::ToggleMute => {
            audio.toggle_mute();
        }
        Command::NextGroup => {
            audio.cycle_group_forward();
        }
        Command::PreviousGroup => {
            audio.cycle_group_backward();
        }
        Command::Status { group } => return Some(status_line(audio, group.as_deref())),
        Command::Quit => {}
    }
    None
}

fn status_line(audio: &mut AudioSystem, group: Option<&str>) -> String {
    if let Some(group) = group {
        let playing = audio.is_group_playing(group);
        let sources = audio.group_sources(group);
        return format!(
            "{}: {} ({} stream(s){})",
            group,
            if playing { "playing" } else { "idle" },
            sources.len(),
            if sources.is_empty() {
                String::new()
            } else {
                format!(": {}", sources.join(", "))
            }
        );
    }

    let groups: Vec<String> = audio
        .active_groups()
        .into_iter()
        .map(|name| format!("{} x{}", name, audio.group_len(&name)))
        .collect();
    format!(
        "{} | focus: {} | muted: {} | active group: {}",
        if groups.is_empty() {
            "nothing registered".to_string()
        } else {
            groups.join(", ")
        },
        audio.focus().description(),
        audio.config().is_muted(),
        audio.active_group().unwrap_or("none")
    )
}

/// Command executor that owns the audio system and emits events
pub struct CommandExecutor {
    command_tx: Sender<Command>,
    event_bus: EventBus,
    worker: Option<JoinHandle<()>>,
}

impl CommandExecutor {
    /// Start the executor thread
    ///
    /// `factory` runs on the executor thread, so the audio system (and its
    /// output device) never crosses threads.
    pub fn spawn<F>(event_bus: EventBus, factory: F) -> Self
    where
        F: FnOnce() -> AppResult<AudioSystem> + Send + 'static,
    {
        let (tx, rx) = unbounded::<Command>();
        let bus = event_bus.clone();

        let worker = thread::spawn(move || {
            let mut audio = match factory() {
                Ok(audio) => audio,
                Err(e) => {
                    tracing::error!("Failed to start audio system: {:#}", e);
                    bus.publish(Event::Notification {
                        level: NotifyLevel::Error,
                        message: format!("Audio unavailable: {:#}", e),
                    });
                    bus.publish(Event::Shutdown);
                    return;
                }
            };
            tracing::info!("Command executor thread started");

            loop {
                match rx.recv_timeout(TICK_INTERVAL) {
                    Ok(Command::Quit) => {
                        tracing::info!("Quit command received, stopping executor");
                        break;
                    }
                    Ok(command) => {
                        if let Some(status) = apply(&mut audio, command) {
                            bus.publish(Event::Notification {
                                level: NotifyLevel::Info,
                                message: status,
                            });
                        }
                    }
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => break,
                }
                audio.tick(Instant::now());
            }

            audio.teardown_all();
            bus.publish(Event::Shutdown);
            tracing::info!("Command executor thread stopped");
        });

        Self {
            command_tx: tx,
            event_bus,
            worker: Some(worker),
        }
    }

    /// Queue a command
    pub fn execute(&self, command: Command) {
        if self.command_tx.send(command).is_err() {
            tracing::warn!("Command executor is not running");
        }
    }

    /// Parse and queue a text command, publishing a rejection on failure
    pub fn submit_line(&self, line: &str) -> bool {
        let line = line.trim();
        if line.is_empty() {
            return false;
        }
        match line.parse::<Command>() {
            Ok(command) => {
                self.execute(command);
                true
            }
            Err(e) => {
                tracing::debug!("Rejected command '{}': {}", line, e);
                self.event_bus.publish(Event::CommandRejected {
                    input: line.to_string(),
                    reason: e.to_string(),
                });
                false
            }
        }
    }

    /// Send `Quit` and wait for the thread to tear down
    pub fn shutdown(mut self) -> AppResult<()> {
        self.execute(Command::Quit);
        self.join()
    }

    fn join(&mut self) -> AppResult<()> {
        if let Some(worker) = self.worker.take() {
            worker
                .join()
                .map_err(|_| anyhow::anyhow!("command executor thread panicked"))?;
        }
        Ok(())
    }
}

impl Drop for CommandExecutor {
    fn drop(&mut self) {
        if self.worker.is_some() {
            let _ = self.command_tx.send(Command::Quit);
            if let Err(e) = self.join() {
                tracing::error!("{}", e);
            }
        }
    }
}
