//! Infrastructure layer providing external service integrations.
//!
//! This module contains the file-backed stores, configuration loading and
//! logging setup.

pub mod config;
pub mod logging;
pub mod persistence;

pub use config::Config;
pub use logging::{init_logging, LoggingHandle};
pub use persistence::*;
