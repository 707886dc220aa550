//! Bybit P2P REST API client.
//!
//! A call flows through the stages in this module in order:
//! - [`canonical`] - validates parameters and builds the exact payload that gets signed
//! - [`request`] - attaches the signing headers and produces a [`SignedRequest`]
//! - [`transport`] - sends the request once over a pooled HTTP client
//! - [`response`] - turns the status and envelope into a value or a [`P2pError`](crate::P2pError)
//!
//! [`P2pClient`] ties the stages together and exposes one method per operation.

pub mod canonical;
mod client;
pub mod endpoints;
mod methods;
pub mod request;
pub mod response;
pub mod transport;

pub use canonical::FilePart;
pub use client::{P2pClient, P2pClientBuilder};
pub use endpoints::{HttpVerb, Operation};
pub use request::SignedRequest;
pub use response::RawResponse;
