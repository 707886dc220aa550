//! Example: Reading the account, listing ads and handling errors.
//!
//! Run with: cargo run --example quickstart
//!
//! Reads `BYBIT_API_KEY` and `BYBIT_API_SECRET` (plus `BYBIT_RSA=1` when the
//! secret is an RSA private key) from the environment or a `.env` file.
//! Set `BYBIT_TESTNET=1` to target the testnet.

use std::sync::Arc;

use bybit_p2p::auth::EnvCredentials;
use bybit_p2p::rest::P2pClient;
use bybit_p2p::{P2pError, Params};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenv::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let credentials = match EnvCredentials::try_from_env() {
        Some(creds) => Arc::new(creds),
        None => {
            println!("Set BYBIT_API_KEY and BYBIT_API_SECRET to run this example.");
            return Ok(());
        }
    };

    let testnet = std::env::var("BYBIT_TESTNET").ok().as_deref() == Some("1");
    let client = P2pClient::builder()
        .testnet(testnet)
        .credentials(credentials)
        .build();

    let info = client.get_account_information().await?;
    println!("Account: {}", info["result"]);

    let balance = client
        .get_current_balance(Params::new().with("accountType", "FUND").with("coin", "USDT"))
        .await?;
    println!("Funding balance: {}", balance["result"]);

    let ads = client
        .get_online_ads(
            Params::new()
                .with("tokenId", "USDT")
                .with("currencyId", "EUR")
                .with("side", 0),
        )
        .await?;
    println!("Online ads: {}", ads["result"]["count"]);

    // Missing parameters are caught before anything is sent.
    match client.mark_as_paid(Params::new().with("orderId", "0")).await {
        Err(P2pError::MissingParameter { missing, .. }) => {
            println!("mark_as_paid needs: {}", missing.join(", "));
        }
        Err(P2pError::Api { error, .. }) if error.is_invalid_signature() => {
            println!("Check the API secret: {error}");
        }
        other => println!("Unexpected result: {other:?}"),
    }

    Ok(())
}
