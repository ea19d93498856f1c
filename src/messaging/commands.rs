/// Command types for the audio host
///
/// Commands represent requests to perform actions (imperative).
/// They are parsed from text lines and executed by the command executor.
use std::str::FromStr;
use std::time::Duration;

use crate::audio_system::group::{GroupAttribute, OTHER};
use crate::audio_system::playback::PlayRequest;
use crate::error::CommandError;

/// Audio host commands
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Start a sound
    Play(PlayRequest),

    /// Stop one group, or every group
    Stop {
        group: Option<String>,
        last_only: bool,
        fade: Option<Duration>,
    },

    /// Pause one group, or every group
    Pause { group: Option<String> },

    /// Resume one group, or every group
    Resume { group: Option<String> },

    /// The host window lost input focus
    FocusLost,

    /// The host window regained input focus
    FocusGained,

    /// Nudge an attribute of the active group
    Adjust { attribute: GroupAttribute, delta: i32 },

    /// Set an attribute on a group's live streams
    Slide {
        group: String,
        attribute: GroupAttribute,
        value: f32,
    },

    /// Flip global mute
    ToggleMute,

    /// Select the next group for adjustments
    NextGroup,

    /// Select the previous group for adjustments
    PreviousGroup,

    /// Report what is playing
    Status { group: Option<String> },

    /// Tear down and quit
    Quit,
}

impl Command {
    /// Get a human-readable description of the command
    pub fn description(&self) -> String {
        match self {
            Command::Play(request) => format!("Play {} in {}", request.reference, request.group),
            Command::Stop { group, .. } => {
                format!("Stop {}", group.as_deref().unwrap_or("all groups"))
            }
            Command::Pause { group } => {
                format!("Pause {}", group.as_deref().unwrap_or("all groups"))
            }
            Command::Resume { group } => {
                format!("Resume {}", group.as_deref().unwrap_or("all groups"))
            }
            Command::FocusLost => "Focus lost".to_string(),
            Command::FocusGained => "Focus gained".to_string(),
            Command::Adjust { attribute, delta } => format!("Adjust {} by {:+}", attribute, delta),
            Command::Slide {
                group,
                attribute,
                value,
            } => format!("Set {} of {} to {}", attribute, group, value),
            Command::ToggleMute => "Toggle mute".to_string(),
            Command::NextGroup => "Next group".to_string(),
            Command::PreviousGroup => "Previous group".to_string(),
            Command::Status { group } => {
                format!("Status of {}", group.as_deref().unwrap_or("all groups"))
            }
            Command::Quit => "Quit".to_string(),
        }
    }
}

fn parse_seconds(name: &'static str, value: &str) -> Result<Duration, CommandError> {
    value
        .parse::<f32>()
        .ok()
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(Duration::from_secs_f32)
        .ok_or_else(|| CommandError::InvalidArgument {
            name,
            value: value.to_string(),
        })
}

fn parse_number<T: FromStr>(name: &'static str, value: &str) -> Result<T, CommandError> {
    value.parse().map_err(|_| CommandError::InvalidArgument {
        name,
        value: value.to_string(),
    })
}

fn parse_attribute(value: &str) -> Result<GroupAttribute, CommandError> {
    value.parse().map_err(|_| CommandError::InvalidArgument {
        name: "attribute",
        value: value.to_string(),
    })
}

fn parse_play<'a>(mut args: impl Iterator<Item = &'a str>) -> Result<Command, CommandError> {
    let reference = args.next().ok_or(CommandError::MissingArgument("sound"))?;
    let mut group = None;
    let mut request = PlayRequest::new(reference, OTHER);

    for arg in args {
        match arg {
            "interrupt" => request = request.interrupt(),
            "loop" => request = request.looping(),
            "force" => request = request.ignore_focus(),
            _ => {
                if let Some(value) = arg.strip_prefix("pan=") {
                    request = request.with_pan(parse_number("pan", value)?);
                } else if let Some(value) = arg.strip_prefix("fade=") {
                    request = request.with_fade_in(parse_seconds("fade", value)?);
                } else if group.is_none() {
                    group = Some(arg.to_string());
                } else {
                    return Err(CommandError::InvalidArgument {
                        name: "play",
                        value: arg.to_string(),
                    });
                }
            }
        }
    }

    if let Some(group) = group {
        request.group = group;
    }
    Ok(Command::Play(request))
}

fn parse_stop<'a>(args: impl Iterator<Item = &'a str>) -> Result<Command, CommandError> {
    let mut group = None;
    let mut last_only = false;
    let mut fade = None;

    for arg in args {
        if arg == "last" {
            last_only = true;
        } else if let Some(value) = arg.strip_prefix("fade=") {
            fade = Some(parse_seconds("fade", value)?);
        } else if group.is_none() {
            group = Some(arg.to_string());
        } else {
            return Err(CommandError::InvalidArgument {
                name: "stop",
                value: arg.to_string(),
            });
        }
    }

    Ok(Command::Stop {
        group,
        last_only,
        fade,
    })
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let verb = words
            .next()
            .ok_or(CommandError::Empty)?
            .to_ascii_lowercase();

        match verb.as_str() {
            "play" => parse_play(words),
            "stop" => parse_stop(words),
            "pause" => Ok(Command::Pause {
                group: words.next().map(str::to_string),
            }),
            "resume" => Ok(Command::Resume {
                group: words.next().map(str::to_string),
            }),
            "focus" => match words.next() {
                Some("lost") => Ok(Command::FocusLost),
                Some("gained") => Ok(Command::FocusGained),
                Some(other) => Err(CommandError::InvalidArgument {
                    name: "focus",
                    value: other.to_string(),
                }),
                None => Err(CommandError::MissingArgument("focus state")),
            },
            "volume" | "pan" => {
                let attribute = parse_attribute(&verb)?;
                let delta = words.next().ok_or(CommandError::MissingArgument("delta"))?;
                Ok(Command::Adjust {
                    attribute,
                    delta: parse_number("delta", delta)?,
                })
            }
            "slide" => {
                let group = words.next().ok_or(CommandError::MissingArgument("group"))?;
                let attribute = words.next().ok_or(CommandError::MissingArgument("attribute"))?;
                let value = words.next().ok_or(CommandError::MissingArgument("value"))?;
                Ok(Command::Slide {
                    group: group.to_string(),
                    attribute: parse_attribute(attribute)?,
                    value: parse_number("value", value)?,
                })
            }
            "mute" => Ok(Command::ToggleMute),
            "next" => Ok(Command::NextGroup),
            "prev" => Ok(Command::PreviousGroup),
            "status" => Ok(Command::Status {
                group: words.next().map(str::to_string),
            }),
            "quit" | "exit" => Ok(Command::Quit),
            _ => Err(CommandError::Unknown(verb)),
        }
    }
}
