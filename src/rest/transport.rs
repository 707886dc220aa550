//! HTTP transport over a shared, pooled client.

use reqwest_middleware::ClientWithMiddleware;

use crate::error::P2pError;
use crate::rest::request::SignedRequest;
use crate::rest::response::RawResponse;

/// Sends signed requests and reads back raw responses.
///
/// Cloning is cheap; clones share the same connection pool. Exactly one
/// attempt is made per request.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: ClientWithMiddleware,
}

impl HttpTransport {
    /// Wrap an HTTP client.
    pub fn new(client: ClientWithMiddleware) -> Self {
        Self { client }
    }

    /// Send a request.
    ///
    /// Connection, TLS and timeout failures are returned as
    /// [`P2pError::Network`] with the transport error attached unchanged.
    pub async fn send(&self, request: &SignedRequest) -> Result<RawResponse, P2pError> {
        let network_error = |source: reqwest_middleware::Error| P2pError::Network {
            context: Box::new(request.context()),
            source,
        };

        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(network_error)?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| network_error(reqwest_middleware::Error::Reqwest(e)))?;

        Ok(RawResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}
