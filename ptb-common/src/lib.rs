//! Shared types for the ptbridge workspace
//!
//! Hosts the pieces both the bridge service and its HTTP consumers need:
//! the common error type, configuration resolution, and the resilient
//! request layer.

pub mod config;
pub mod error;
pub mod request;

pub use error::{Error, Result};
