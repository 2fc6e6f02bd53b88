//! Invocation backend client for LbGate.
//!
//! - **Invoker trait**: [`FunctionInvoker`] is the raw
//!   `invoke(functionId, payload) -> (status, payload, error)` capability
//! - **Lambda client**: [`LambdaClient`] implements it with the AWS SDK
//!   `Invoke` operation and the default credential chain
//! - **Adapter**: [`InvocationClient`] turns envelopes into payloads and back

pub mod client;
pub mod invoker;
pub mod lambda;

pub use client::InvocationClient;
pub use invoker::{FunctionInvoker, InvokeFuture, InvokeOutput};
pub use lambda::LambdaClient;
