use std::sync::Arc;

use crate::{Capability, Error, LogHandler, LogLevel, Logger, Result, TracingLogger};

/// One stable logging interface over an arbitrary [`Logger`].
///
/// The facade checks once, at construction, that the logger declares every required
/// [`Capability`]. After that the required operations forward verbatim and the optional ones
/// forward only if the logger declares them.
///
/// Cloning a facade is cheap; clones share the wrapped logger.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use resource_meter::{LogLevel, LoggingFacade, MemoryLogger};
///
/// let logger = Arc::new(MemoryLogger::new());
/// let facade =
///     LoggingFacade::new(Arc::<MemoryLogger>::clone(&logger), LogLevel::Info).unwrap();
///
/// facade.log_named("warning", "running low on disk").unwrap();
///
/// assert_eq!(logger.messages(), ["running low on disk"]);
/// ```
#[derive(Clone, Debug)]
pub struct LoggingFacade {
    logger: Arc<dyn Logger>,
    level: LogLevel,
}

impl LoggingFacade {
    /// Wraps `logger`, applying `level` as its minimum level if the logger supports that.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCapabilities`] naming every required capability the logger does
    /// not declare.
    pub fn new(logger: Arc<dyn Logger>, level: LogLevel) -> Result<Self> {
        let missing = Capability::REQUIRED
            .into_iter()
            .filter(|capability| !logger.supports(*capability))
            .collect::<Vec<_>>();

        if !missing.is_empty() {
            return Err(Error::MissingCapabilities { missing });
        }

        let facade = Self { logger, level };
        facade.set_level(level);

        Ok(facade)
    }

    /// A facade over a fresh [`TracingLogger`], which always satisfies the capability check.
    #[must_use]
    pub fn tracing(level: LogLevel) -> Self {
        let logger = TracingLogger::new();
        logger.set_level(level);

        Self {
            logger: Arc::new(logger),
            level,
        }
    }

    /// The minimum level the facade was constructed with.
    #[must_use]
    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Writes `message` at info level.
    pub fn info(&self, message: &str) {
        self.logger.info(message);
    }

    /// Writes `message` at debug level.
    pub fn debug(&self, message: &str) {
        self.logger.debug(message);
    }

    /// Writes `message` at warning level.
    pub fn warning(&self, message: &str) {
        self.logger.warning(message);
    }

    /// Writes `message` at error level.
    pub fn error(&self, message: &str) {
        self.logger.error(message);
    }

    /// Writes `message` at `level`.
    pub fn log(&self, level: LogLevel, message: &str) {
        self.logger.log(level, message);
    }

    /// Writes `message` at the level named by `level`, such as `"DEBUG"` or `"critical"`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLogLevel`] if the name is not one of the five known levels. Nothing
    /// is written in that case.
    pub fn log_named(&self, level: &str, message: &str) -> Result<()> {
        let level = level.parse::<LogLevel>()?;
        self.log(level, message);
        Ok(())
    }

    /// Changes the wrapped logger's minimum level. Does nothing if the logger does not support it.
    pub fn set_level(&self, level: LogLevel) {
        if self.logger.supports(Capability::SetLevel) {
            self.logger.set_level(level);
        }
    }

    /// Attaches a handler to the wrapped logger. Does nothing if the logger does not support it.
    pub fn add_handler(&self, handler: Box<dyn LogHandler>) {
        if self.logger.supports(Capability::AddHandler) {
            self.logger.add_handler(handler);
        }
    }

    /// Names of the wrapped logger's handlers, or nothing if the logger does not list them.
    #[must_use]
    pub fn handlers(&self) -> Vec<String> {
        if self.logger.supports(Capability::ListHandlers) {
            self.logger.handlers()
        } else {
            Vec::new()
        }
    }
}
