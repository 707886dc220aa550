//! Bybit P2P REST API client implementation.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use reqwest_middleware::ClientBuilder;
use reqwest_tracing::TracingMiddleware;
use serde_json::Value;

use crate::auth::{CredentialsProvider, SystemClock, TimestampProvider, sign_request};
use crate::error::P2pError;
use crate::params::Params;
use crate::rest::canonical::{FilePart, UPLOAD_FIELD, canonicalize, validate_required};
use crate::rest::endpoints::{
    DEFAULT_RECV_WINDOW, DOMAIN_MAIN, HttpVerb, MAINNET_SUBDOMAIN, Operation, TESTNET_SUBDOMAIN,
    TLD_MAIN,
};
use crate::rest::request::{AuthHeaders, build_request};
use crate::rest::response::interpret;
use crate::rest::transport::HttpTransport;

/// The Bybit P2P REST API client.
///
/// Every call runs the same pipeline: check required parameters, build the
/// canonical payload, sign it, send exactly one request, and classify the
/// response. No state is shared between calls apart from the credentials and
/// the connection pool, so a client can be cloned and used concurrently.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
///
/// use bybit_p2p::Params;
/// use bybit_p2p::auth::StaticCredentials;
/// use bybit_p2p::rest::P2pClient;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let credentials = Arc::new(StaticCredentials::new("api_key", "api_secret"));
///     let client = P2pClient::builder()
///         .testnet(true)
///         .credentials(credentials)
///         .build();
///
///     let balance = client
///         .get_current_balance(Params::new().with("accountType", "FUND"))
///         .await?;
///     println!("Balance: {balance}");
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct P2pClient {
    transport: HttpTransport,
    base_url: String,
    credentials: Option<Arc<dyn CredentialsProvider>>,
    timestamp_provider: Arc<dyn TimestampProvider>,
    recv_window: u64,
}

impl P2pClient {
    /// Create a mainnet client with the given credentials and default settings.
    pub fn new(credentials: Arc<dyn CredentialsProvider>) -> Self {
        Self::builder().credentials(credentials).build()
    }

    /// Create a new client builder.
    pub fn builder() -> P2pClientBuilder {
        P2pClientBuilder::new()
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Receive window sent with every request, in milliseconds.
    pub fn recv_window(&self) -> u64 {
        self.recv_window
    }

    /// Call an operation.
    ///
    /// Required parameters are checked against `params` before anything is
    /// signed or sent. For file uploads, `upload_file` must hold the path of
    /// the file to send.
    pub async fn call(&self, operation: &Operation, params: Params) -> Result<Value, P2pError> {
        validate_required(operation, &params)?;

        let upload = match operation.verb {
            HttpVerb::File => Some(Self::read_upload(&params).await?),
            HttpVerb::Get | HttpVerb::Post => None,
        };

        self.dispatch(operation, params, upload.as_ref()).await
    }

    /// Upload an in-memory file to a file operation.
    pub async fn call_with_file(
        &self,
        operation: &Operation,
        file: FilePart,
    ) -> Result<Value, P2pError> {
        self.dispatch(operation, Params::new(), Some(&file)).await
    }

    async fn read_upload(params: &Params) -> Result<FilePart, P2pError> {
        let path = params
            .get(UPLOAD_FIELD)
            .and_then(|value| value.as_str())
            .ok_or_else(|| P2pError::InvalidParameter {
                name: UPLOAD_FIELD.to_string(),
                reason: "expected the path of the file to upload".to_string(),
            })?;
        FilePart::from_path(path).await
    }

    async fn dispatch(
        &self,
        operation: &Operation,
        params: Params,
        upload: Option<&FilePart>,
    ) -> Result<Value, P2pError> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(P2pError::MissingCredentials)?
            .get_credentials();

        let payload = canonicalize(operation.verb, params, upload)?;

        let timestamp = self.timestamp_provider.now_millis();
        let signature =
            sign_request(credentials, timestamp, self.recv_window, payload.as_bytes())?;
        let auth = AuthHeaders {
            api_key: &credentials.api_key,
            signature,
            timestamp,
            recv_window: self.recv_window,
        };
        let request = build_request(&self.base_url, operation, payload, &auth)?;

        tracing::debug!(
            path = operation.path,
            verb = %operation.verb,
            timestamp,
            "Sending P2P request"
        );
        let response = self.transport.send(&request).await?;
        interpret(response, request.context())
    }
}

impl std::fmt::Debug for P2pClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("P2pClient")
            .field("base_url", &self.base_url)
            .field("recv_window", &self.recv_window)
            .field("has_credentials", &self.credentials.is_some())
            .finish()
    }
}

/// Builder for [`P2pClient`].
pub struct P2pClientBuilder {
    testnet: bool,
    domain: String,
    tld: String,
    base_url: Option<String>,
    credentials: Option<Arc<dyn CredentialsProvider>>,
    timestamp_provider: Option<Arc<dyn TimestampProvider>>,
    recv_window: u64,
    disable_ssl_checks: bool,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl P2pClientBuilder {
    /// Create a new builder targeting mainnet with default settings.
    pub fn new() -> Self {
        Self {
            testnet: false,
            domain: DOMAIN_MAIN.to_string(),
            tld: TLD_MAIN.to_string(),
            base_url: None,
            credentials: None,
            timestamp_provider: None,
            recv_window: DEFAULT_RECV_WINDOW,
            disable_ssl_checks: false,
            timeout: None,
            user_agent: None,
        }
    }

    /// Use the testnet (`api-testnet`) instead of mainnet.
    pub fn testnet(mut self, testnet: bool) -> Self {
        self.testnet = testnet;
        self
    }

    /// Set the domain, e.g. [`DOMAIN_ALT`](crate::rest::endpoints::DOMAIN_ALT)
    /// (`bytick`) where `bybit` is unreachable.
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Set the top-level domain, e.g. `nl` or `kz` for regional hosts.
    pub fn tld(mut self, tld: impl Into<String>) -> Self {
        self.tld = tld.into();
        self
    }

    /// Set the base URL directly (useful for testing with a mock server).
    ///
    /// Overrides `testnet`, `domain` and `tld`.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the credentials provider for signed requests.
    pub fn credentials(mut self, credentials: Arc<dyn CredentialsProvider>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set a custom timestamp provider.
    pub fn timestamp_provider(mut self, provider: Arc<dyn TimestampProvider>) -> Self {
        self.timestamp_provider = Some(provider);
        self
    }

    /// Set the receive window in milliseconds.
    pub fn recv_window(mut self, recv_window: u64) -> Self {
        self.recv_window = recv_window;
        self
    }

    /// Accept invalid TLS certificates.
    pub fn disable_ssl_checks(mut self, disable: bool) -> Self {
        self.disable_ssl_checks = disable;
        self
    }

    /// Set a timeout for each request. Expiry is reported as a network failure.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    fn resolve_base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => {
                let subdomain = if self.testnet {
                    TESTNET_SUBDOMAIN
                } else {
                    MAINNET_SUBDOMAIN
                };
                format!("https://{}.{}.{}", subdomain, self.domain, self.tld)
            }
        }
    }

    /// Build the client.
    pub fn build(self) -> P2pClient {
        let base_url = self.resolve_base_url();

        // Build default headers.
        let mut headers = HeaderMap::new();
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("bybit-p2p-client/{}", env!("CARGO_PKG_VERSION")));
        let header_value = HeaderValue::from_str(&user_agent)
            .unwrap_or_else(|_| HeaderValue::from_static("bybit-p2p-client"));
        headers.insert(USER_AGENT, header_value);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut http = reqwest::Client::builder()
            .default_headers(headers)
            .danger_accept_invalid_certs(self.disable_ssl_checks);
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }
        let reqwest_client = http.build().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Falling back to a default HTTP client");
            reqwest::Client::new()
        });

        let client = ClientBuilder::new(reqwest_client)
            .with(TracingMiddleware::default())
            .build();

        let timestamp_provider = self
            .timestamp_provider
            .unwrap_or_else(|| Arc::new(SystemClock::new()));

        tracing::debug!(%base_url, recv_window = self.recv_window, "Initialized P2P API session");

        P2pClient {
            transport: HttpTransport::new(client),
            base_url,
            credentials: self.credentials,
            timestamp_provider,
            recv_window: self.recv_window,
        }
    }
}

impl Default for P2pClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticCredentials;
    use crate::rest::endpoints::{DOMAIN_ALT, ads, chat};

    #[test]
    fn test_mainnet_and_testnet_urls() {
        let mainnet = P2pClient::builder().build();
        assert_eq!(mainnet.base_url(), "https://api.bybit.com");

        let testnet = P2pClient::builder().testnet(true).build();
        assert_eq!(testnet.base_url(), "https://api-testnet.bybit.com");
    }

    #[test]
    fn test_domain_and_tld_overrides() {
        let client = P2pClient::builder().domain(DOMAIN_ALT).build();
        assert_eq!(client.base_url(), "https://api.bytick.com");

        let client = P2pClient::builder().tld("nl").testnet(true).build();
        assert_eq!(client.base_url(), "https://api-testnet.bybit.nl");
    }

    #[test]
    fn test_base_url_override_wins() {
        let client = P2pClient::builder()
            .testnet(true)
            .base_url("http://127.0.0.1:8080/")
            .build();
        assert_eq!(client.base_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_defaults() {
        let client = P2pClient::new(Arc::new(StaticCredentials::new("k", "s")));
        assert_eq!(client.recv_window(), 5000);
        let debug = format!("{client:?}");
        assert!(debug.contains("has_credentials: true"));
        assert!(!debug.contains("\"s\""));
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_before_sending() {
        let client = P2pClient::builder().base_url("http://127.0.0.1:9").build();
        let err = client
            .call(&ads::GET_ADS_LIST, Params::new())
            .await
            .unwrap_err();
        assert!(matches!(err, P2pError::MissingCredentials));
    }

    #[tokio::test]
    async fn test_upload_requires_path_string() {
        let client = P2pClient::new(Arc::new(StaticCredentials::new("k", "s")));
        let err = client
            .call(&chat::UPLOAD_CHAT_FILE, Params::new().with(UPLOAD_FIELD, 5))
            .await
            .unwrap_err();
        assert!(matches!(err, P2pError::InvalidParameter { .. }));
    }
}
