//! HTTP service layer for LbGate.
//!
//! This crate maps HTTP onto the load balancer Lambda-target protocol:
//!
//! - **Request**: Builds an [`InvocationRequest`](lbgate_model::InvocationRequest) from an inbound request
//! - **Response**: Projects an [`InvocationResponse`](lbgate_model::InvocationResponse) onto an outbound response
//! - **Service**: Hyper `Service` implementation tying both to an invoker
#![allow(missing_docs)]

pub mod body;
pub mod request;
pub mod response;
pub mod service;

pub use body::LbGateResponseBody;
pub use request::build_invocation_request;
pub use response::project_response;
pub use service::LbGateHttpService;
