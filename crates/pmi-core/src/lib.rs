//! PMI Core
//!
//! Core types and utilities shared across the PMI scoring plugin crates.
//!
//! This crate provides:
//! - Error types and result handling
//! - Minimal row and schema types (`Header`, `Instance`, `Instances`)
//! - The log sink abstraction passed from the host pipeline to wrapped models

pub mod error;
pub mod log;
pub mod types;

pub use error::{Error, Result};
pub use log::{LogLevel, LogSink, TracingLogSink};
pub use types::{Attribute, AttributeType, Header, Instance, Instances};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::log::{LogLevel, LogSink};
    pub use crate::types::{Attribute, Header, Instance, Instances};
}
