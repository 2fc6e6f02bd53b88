//! Invocation envelope types for LbGate.
//!
//! This crate defines the JSON envelopes exchanged with the invocation
//! backend, mirroring the contract of a load balancer's Lambda-target
//! integration:
//!
//! - [`envelope`] - [`InvocationRequest`] and [`InvocationResponse`]
//! - [`value`] - Coercion of query values into their canonical strings
//! - [`error`] - The per-request error taxonomy

pub mod envelope;
pub mod error;
pub mod value;

pub use envelope::{InvocationRequest, InvocationResponse};
pub use error::GatewayError;
pub use value::{QueryValue, Scalar};
