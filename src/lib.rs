//! # Bybit P2P Client
//!
//! An async Rust client library for the Bybit P2P REST API.
//!
//! ## Features
//!
//! - Every P2P operation: account, advertisements, orders and order chat
//! - HMAC-SHA256 and RSA (PKCS#1 v1.5, SHA-256) request signing
//! - Byte-exact canonical payloads for GET, JSON POST and multipart uploads
//! - One error type covering missing parameters, HTTP status failures,
//!   undecodable bodies and non-zero `retCode` responses
//! - Mainnet, testnet and regional hosts
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use bybit_p2p::Params;
//! use bybit_p2p::auth::StaticCredentials;
//! use bybit_p2p::rest::P2pClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let credentials = Arc::new(StaticCredentials::new("api_key", "api_secret"));
//!     let client = P2pClient::builder()
//!         .testnet(true)
//!         .credentials(credentials)
//!         .build();
//!
//!     let ads = client
//!         .get_online_ads(
//!             Params::new()
//!                 .with("tokenId", "USDT")
//!                 .with("currencyId", "EUR")
//!                 .with("side", 0),
//!         )
//!         .await?;
//!     println!("Ads: {}", ads["result"]);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod error;
pub mod params;
pub mod rest;

// Re-export commonly used types at crate root
pub use error::{ApiError, P2pError, RequestContext};
pub use params::{ParamValue, Params};
pub use rest::P2pClient;

/// Result type alias using P2pError
pub type Result<T> = std::result::Result<T, P2pError>;
