use std::fmt::{self, Debug};

use crate::LogLevel;

/// A named operation a [`Logger`] may or may not offer.
///
/// The first five are required by [`LoggingFacade`](crate::LoggingFacade); the rest are optional
/// and the facade passes them through only when the logger declares them.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum Capability {
    /// Logging at info level.
    Info,

    /// Logging at error level.
    Error,

    /// Logging at debug level.
    Debug,

    /// Logging at warning level.
    Warning,

    /// Logging at an arbitrary level.
    Log,

    /// Changing the minimum level after construction.
    SetLevel,

    /// Attaching additional output handlers.
    AddHandler,

    /// Listing the attached output handlers.
    ListHandlers,
}

impl Capability {
    /// The capabilities every logger must declare, in the order the facade probes them.
    pub const REQUIRED: [Self; 5] = [
        Self::Info,
        Self::Error,
        Self::Debug,
        Self::Warning,
        Self::Log,
    ];

    /// Whether the facade refuses loggers that lack this capability.
    #[must_use]
    pub fn is_required(self) -> bool {
        Self::REQUIRED.contains(&self)
    }

    /// The lower-case operation name, e.g. `set_level`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Error => "error",
            Self::Debug => "debug",
            Self::Warning => "warning",
            Self::Log => "log",
            Self::SetLevel => "set_level",
            Self::AddHandler => "add_handler",
            Self::ListHandlers => "handlers",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A logging backend that collectors write their human-readable output to.
///
/// Only [`log()`](Self::log) must be implemented. The per-level methods forward to it by
/// default, and the optional operations do nothing by default.
///
/// A logger declares what it offers through [`supports()`](Self::supports). The default
/// declaration is exactly the required set, so a logger that implements
/// [`set_level()`](Self::set_level) or the handler operations must also override `supports()` for
/// the facade to use them. A logger that cannot honor one of the required operations (for example
/// a sink that has no error channel) overrides `supports()` to say so and is then rejected by
/// [`LoggingFacade::new()`](crate::LoggingFacade::new).
pub trait Logger: Debug + Send + Sync {
    /// Whether this logger offers the given operation.
    fn supports(&self, capability: Capability) -> bool {
        capability.is_required()
    }

    /// Writes `message` at `level`.
    fn log(&self, level: LogLevel, message: &str);

    /// Writes `message` at info level.
    fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    /// Writes `message` at debug level.
    fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    /// Writes `message` at warning level.
    fn warning(&self, message: &str) {
        self.log(LogLevel::Warning, message);
    }

    /// Writes `message` at error level.
    fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    /// Changes the minimum level below which messages are dropped.
    fn set_level(&self, _level: LogLevel) {}

    /// Attaches an additional output handler.
    fn add_handler(&self, _handler: Box<dyn LogHandler>) {}

    /// Names of the attached output handlers.
    fn handlers(&self) -> Vec<String> {
        Vec::new()
    }
}

/// An output sink that a [`Logger`] forwards accepted messages to.
pub trait LogHandler: Debug + Send + Sync {
    /// A name identifying the handler in [`Logger::handlers()`].
    fn name(&self) -> &str;

    /// Receives one accepted message.
    fn handle(&self, level: LogLevel, message: &str);
}
