use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::{Capability, LogHandler, LogLevel, Logger};

/// A logger that keeps every accepted message in memory.
///
/// Useful for tests and for applications that want to present collector output themselves. It
/// supports every optional [`Capability`]: the minimum level can be changed and attached
/// [`LogHandler`]s receive each accepted message after it has been stored.
///
/// # Examples
///
/// ```
/// use resource_meter::{LogLevel, Logger, MemoryLogger};
///
/// let logger = MemoryLogger::new();
/// logger.set_level(LogLevel::Warning);
///
/// logger.info("dropped");
/// logger.error("kept");
///
/// assert_eq!(logger.messages(), ["kept"]);
/// ```
#[derive(Debug)]
pub struct MemoryLogger {
    state: Mutex<MemoryLoggerState>,
}

#[derive(Debug)]
struct MemoryLoggerState {
    level: LogLevel,
    entries: Vec<(LogLevel, String)>,
    handlers: Vec<Box<dyn LogHandler>>,
}

impl MemoryLogger {
    /// Creates an empty logger that accepts messages at every level.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryLoggerState {
                level: LogLevel::Debug,
                entries: Vec::new(),
                handlers: Vec::new(),
            }),
        }
    }

    /// The current minimum level.
    #[must_use]
    pub fn level(&self) -> LogLevel {
        self.lock().level
    }

    /// Every accepted message with its level, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<(LogLevel, String)> {
        self.lock().entries.clone()
    }

    /// The text of every accepted message, oldest first.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.lock()
            .entries
            .iter()
            .map(|(_, message)| message.clone())
            .collect()
    }

    /// Forgets every stored message. Handlers and the level are kept.
    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    // Entries are pushed whole, so a poisoned lock still guards consistent state.
    fn lock(&self) -> MutexGuard<'_, MemoryLoggerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for MemoryLogger {
    fn supports(&self, _capability: Capability) -> bool {
        true
    }

    fn log(&self, level: LogLevel, message: &str) {
        let mut state = self.lock();

        if level < state.level {
            return;
        }

        state.entries.push((level, message.to_string()));

        for handler in &state.handlers {
            handler.handle(level, message);
        }
    }

    fn set_level(&self, level: LogLevel) {
        self.lock().level = level;
    }

    fn add_handler(&self, handler: Box<dyn LogHandler>) {
        self.lock().handlers.push(handler);
    }

    fn handlers(&self) -> Vec<String> {
        self.lock()
            .handlers
            .iter()
            .map(|handler| handler.name().to_string())
            .collect()
    }
}
