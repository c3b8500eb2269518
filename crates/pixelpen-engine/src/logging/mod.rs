//! Logger initialization.
//!
//! Everything else logs through the `log` facade; `env_logger` is only
//! configured here.

mod init;

pub use init::{init_logging, LoggingConfig, DEFAULT_FILTER};
