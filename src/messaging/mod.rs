/// Messaging module for the Event/Command architecture
///
/// This module implements the Event/Command segregation pattern:
/// - **Commands**: Requests to perform actions (imperative, targeted)
/// - **Events**: Notifications of things that happened (past tense, broadcast)
///
/// ## Architecture
///
/// ```text
/// ┌─────────┐     Command      ┌──────────────────────┐     Event      ┌─────────────┐
/// │  stdin  │ ───────────────> │ Executor             │ ─────────────> │  Event Bus  │
/// │ (host)  │                  │   owns AudioSystem   │                │             │
/// └─────────┘                  └──────────────────────┘                └─────────────┘
///                                                                             │
///                                                                             │ Publishes
///                                                                             ▼
///                                                                       ┌──────────┐
///                                                                       │ Handlers │
///                                                                       └──────────┘
/// ```
///
/// The audio system reports through the `Notifier` trait, which the bus
/// implements, so user messages and volume broadcasts reach the same
/// subscribers as executor events.
///
/// ## Usage
///
/// ```rust,ignore
/// let event_bus = EventBus::new();
/// let (rx, _id) = event_bus.subscribe();
///
/// let bus = event_bus.clone();
/// let executor = CommandExecutor::spawn(event_bus.clone(), move || {
///     Ok(AudioSystem::new(config, engine, resolver, Box::new(bus)))
/// });
///
/// executor.submit_line("play rain.ogg ambiance interrupt loop");
///
/// while let Ok(event) = rx.recv() {
///     println!("{}", event.description());
/// }
/// ```

pub mod bus;
pub mod commands;
pub mod events;
pub mod executor;
pub mod notifier;

// Re-export commonly used types
pub use bus::{EventBus, SubscriberId};
pub use commands::Command;
pub use events::{Event, VOLUME_CHANNEL};
pub use executor::{apply, CommandExecutor};
pub use notifier::{Notifier, NotifyLevel, NullNotifier};
