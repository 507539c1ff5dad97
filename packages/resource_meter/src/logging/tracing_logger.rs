use std::sync::atomic::{self, AtomicU8};

use crate::{Capability, LogLevel, Logger};

/// The default logging backend: emits `tracing` events under the `resource_meter` target.
///
/// Whether and where the events end up is decided by the subscriber the application installs.
/// The logger additionally drops messages below its own minimum level, which collectors set from
/// their configured log level.
#[derive(Debug)]
pub struct TracingLogger {
    threshold: AtomicU8,
}

impl TracingLogger {
    /// Creates a logger that forwards messages at every level.
    #[must_use]
    pub fn new() -> Self {
        Self {
            threshold: AtomicU8::new(LogLevel::Debug.as_number()),
        }
    }

    /// The current minimum level.
    #[must_use]
    pub fn level(&self) -> LogLevel {
        LogLevel::from_number(self.threshold.load(atomic::Ordering::Relaxed))
            .unwrap_or(LogLevel::Debug)
    }
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for TracingLogger {
    fn supports(&self, capability: Capability) -> bool {
        capability.is_required() || capability == Capability::SetLevel
    }

    #[cfg_attr(test, mutants::skip)] // Output only goes to the installed subscriber.
    fn log(&self, level: LogLevel, message: &str) {
        if level < self.level() {
            return;
        }

        match level {
            LogLevel::Debug => tracing::debug!(target: "resource_meter", "{message}"),
            LogLevel::Info => tracing::info!(target: "resource_meter", "{message}"),
            LogLevel::Warning => tracing::warn!(target: "resource_meter", "{message}"),
            LogLevel::Error => tracing::error!(target: "resource_meter", "{message}"),
            LogLevel::Critical => {
                tracing::error!(target: "resource_meter", critical = true, "{message}");
            }
        }
    }

    fn set_level(&self, level: LogLevel) {
        self.threshold
            .store(level.as_number(), atomic::Ordering::Relaxed);
    }
}
