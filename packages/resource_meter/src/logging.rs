//! Pluggable logging for collector output.
//!
//! Collectors never talk to a logging library directly. They write through a [`LoggingFacade`],
//! which wraps any [`Logger`] implementation after checking its declared capabilities.

mod facade;
mod level;
mod logger;
mod memory_logger;
mod tracing_logger;

pub use facade::LoggingFacade;
pub use level::LogLevel;
pub use logger::{Capability, LogHandler, Logger};
pub use memory_logger::MemoryLogger;
pub use tracing_logger::TracingLogger;
