//! Logging utilities.
//!
//! Library code only uses the `log` facade; the `env_logger` backend is
//! installed once by the binary (or an integration test).

mod init;

pub use init::{init_logging, LoggingConfig};