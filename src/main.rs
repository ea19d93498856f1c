use std::io::BufRead;
use std::path::PathBuf;
use std::thread;

use anyhow::Context;

use sound_groups::audio_system::{AudioSystem, DirectoryResolver, MemoryEngine, RodioEngine, StreamEngine};
use sound_groups::config::Config;
use sound_groups::error::AppResult;
use sound_groups::messaging::{CommandExecutor, Event, EventBus};

const LOG_TARGET_STARTUP: &str = "sound_groups::startup";

/// Command line options
#[derive(Debug, Default)]
struct Options {
    config: Option<PathBuf>,
    sounds: Option<PathBuf>,
    dry_run: bool,
}

impl Options {
    fn parse(args: impl Iterator<Item = String>) -> AppResult<Self> {
        let mut options = Options::default();
        let mut args = args;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    let path = args.next().context("--config needs a path")?;
                    options.config = Some(PathBuf::from(path));
                }
                "--sounds" => {
                    let path = args.next().context("--sounds needs a directory")?;
                    options.sounds = Some(PathBuf::from(path));
                }
                "--dry-run" => options.dry_run = true,
                other => anyhow::bail!("Unknown argument: {}", other),
            }
        }
        Ok(options)
    }
}

/// Initialize tracing with file rotation
///
/// Logs are written to:
/// - macOS: ~/Library/Application Support/SoundGroups/logs/
/// - Windows: %APPDATA%/SoundGroups/logs/
/// - Linux: ~/.config/SoundGroups/logs/
///
/// Debug builds also log to stderr. Stdout carries host events.
fn initialize_tracing() {
    use tracing_appender::rolling;
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let log_dir = dirs::config_dir()
        .map(|dir| dir.join("SoundGroups").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"));

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Failed to create log directory: {}", e);
    }

    let file_appender = rolling::daily(&log_dir, "sound-groups.log");

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true);

    #[cfg(debug_assertions)]
    {
        let console_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .with(console_layer)
            .init();
    }

    #[cfg(not(debug_assertions))]
    {
        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();
    }

    tracing::info!("Log directory: {}", log_dir.display());
}

fn load_config(options: &Options) -> AppResult<(Config, PathBuf)> {
    let path = options.config.clone().unwrap_or_else(Config::config_path);
    let config = match &options.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    Ok((config, path))
}

fn main() -> AppResult<()> {
    initialize_tracing();

    let options = Options::parse(std::env::args().skip(1))?;
    let (mut config, config_path) = load_config(&options)?;
    if let Some(sounds) = &options.sounds {
        config.sound_dir = sounds.clone();
    }

    tracing::info!(
        target: LOG_TARGET_STARTUP,
        "Starting sound-groups v{} (sounds: {}, dry run: {})",
        env!("CARGO_PKG_VERSION"),
        config.sound_dir.display(),
        options.dry_run
    );

    let event_bus = EventBus::new();
    let (events, _id) = event_bus.subscribe();

    let notifier = event_bus.clone();
    let dry_run = options.dry_run;
    let executor = CommandExecutor::spawn(event_bus.clone(), move || {
        let engine: Box<dyn StreamEngine> = if dry_run {
            Box::new(MemoryEngine::new())
        } else {
            Box::new(RodioEngine::new().context("Failed to open audio output")?)
        };
        let resolver = DirectoryResolver::new(config.sound_dir.clone());
        Ok(AudioSystem::new(config, engine, Box::new(resolver), Box::new(notifier))
            .with_config_path(config_path))
    });

    let printer = thread::spawn(move || {
        while let Ok(event) = events.recv() {
            println!("{}", event.description());
            if event == Event::Shutdown {
                break;
            }
        }
    });

    println!("Type commands (play, stop, pause, resume, focus, volume, pan, slide, mute, next, prev, status, quit)");
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("Failed to read stdin")?;
        if line.trim().eq_ignore_ascii_case("quit") {
            break;
        }
        executor.submit_line(&line);
    }

    executor.shutdown()?;
    printer
        .join()
        .map_err(|_| anyhow::anyhow!("event printer thread panicked"))?;
    Ok(())
}
