//! Shared services

pub mod filename_parser;
pub mod logging;
pub mod text_utils;

pub use logging::{LogEvent, LoggingConfig, RecentLogs, init_tracing};
