//! Authentication module for the Bybit API.
//!
//! This module provides:
//! - Credential management with secure secret storage
//! - Millisecond timestamps for the signed request headers
//! - HMAC-SHA256 and RSA-SHA256 signature generation

pub(crate) mod credentials;
mod signature;
mod timestamp;

pub use credentials::{
    Credentials, CredentialsProvider, EnvCredentials, SignatureScheme, SigningKey,
    StaticCredentials,
};
pub use signature::{sign, sign_hmac, sign_request, sign_rsa, signable_bytes};
pub use timestamp::{FixedTimestamp, SystemClock, TimestampProvider};
