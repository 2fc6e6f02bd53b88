//! Core types, configuration, and errors for LbGate.
//!
//! This crate provides the building blocks shared by every LbGate crate:
//! the environment-driven configuration, the construction-time error type,
//! and the AWS identifiers used to address the target function.

mod config;
mod error;
mod types;

pub use config::{InvokerConfig, LbGateConfig, StaticKeys};
pub use error::{LbGateError, LbGateResult};
pub use types::{AwsRegion, FunctionId};
