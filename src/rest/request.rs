//! Assembly of signed, transport-ready requests.

use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use url::Url;

use crate::error::{P2pError, RequestContext};
use crate::rest::canonical::CanonicalPayload;
use crate::rest::endpoints::Operation;

/// `X-BAPI-API-KEY`: the public API key.
pub const X_BAPI_API_KEY: HeaderName = HeaderName::from_static("x-bapi-api-key");
/// `X-BAPI-SIGN`: the request signature.
pub const X_BAPI_SIGN: HeaderName = HeaderName::from_static("x-bapi-sign");
/// `X-BAPI-SIGN-TYPE`: signature scheme version.
pub const X_BAPI_SIGN_TYPE: HeaderName = HeaderName::from_static("x-bapi-sign-type");
/// `X-BAPI-TIMESTAMP`: the signed millisecond timestamp.
pub const X_BAPI_TIMESTAMP: HeaderName = HeaderName::from_static("x-bapi-timestamp");
/// `X-BAPI-RECV-WINDOW`: how long after the timestamp the server accepts the request.
pub const X_BAPI_RECV_WINDOW: HeaderName = HeaderName::from_static("x-bapi-recv-window");

/// Value of `X-BAPI-SIGN-TYPE`.
pub const SIGN_TYPE_V2: &str = "2";

/// Authentication values for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthHeaders<'a> {
    /// Public API key
    pub api_key: &'a str,
    /// Signature over the canonical payload
    pub signature: String,
    /// Timestamp folded into the signature
    pub timestamp: u64,
    /// Receive window folded into the signature
    pub recv_window: u64,
}

/// A request ready to hand to the transport.
#[derive(Debug, Clone)]
pub struct SignedRequest {
    /// Wire method; always POST for file uploads
    pub method: Method,
    /// Absolute URL, including the query string for GET
    pub url: Url,
    /// Signing headers and content type
    pub headers: HeaderMap,
    /// Body for POST and file uploads
    pub body: Option<Vec<u8>>,
    target: String,
    payload: String,
    timestamp: u64,
}

impl SignedRequest {
    /// Endpoint URL without the query string.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Timestamp sent with the request.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Reproduction details for error reports.
    pub fn context(&self) -> RequestContext {
        RequestContext::new(self.target.clone(), self.payload.clone(), self.timestamp)
    }
}

fn header_value(name: &HeaderName, value: &str) -> Result<HeaderValue, P2pError> {
    HeaderValue::from_str(value)
        .map_err(|_| P2pError::Config(format!("Invalid value for header {name}")))
}

/// Build the signing headers.
pub fn signing_headers(auth: &AuthHeaders<'_>, content_type: &str) -> Result<HeaderMap, P2pError> {
    let mut headers = HeaderMap::new();
    headers.insert(X_BAPI_API_KEY, header_value(&X_BAPI_API_KEY, auth.api_key)?);
    headers.insert(X_BAPI_SIGN, header_value(&X_BAPI_SIGN, &auth.signature)?);
    headers.insert(X_BAPI_SIGN_TYPE, HeaderValue::from_static(SIGN_TYPE_V2));
    headers.insert(X_BAPI_TIMESTAMP, HeaderValue::from(auth.timestamp));
    headers.insert(X_BAPI_RECV_WINDOW, HeaderValue::from(auth.recv_window));
    headers.insert(CONTENT_TYPE, header_value(&CONTENT_TYPE, content_type)?);
    Ok(headers)
}

/// Build a transport-ready request.
///
/// GET payloads become the query string when non-empty; POST and file
/// payloads become the body.
pub fn build_request(
    base_url: &str,
    operation: &Operation,
    payload: CanonicalPayload,
    auth: &AuthHeaders<'_>,
) -> Result<SignedRequest, P2pError> {
    let target = format!("{}{}", base_url.trim_end_matches('/'), operation.path);
    let headers = signing_headers(auth, &payload.content_type())?;
    let description = payload.describe();

    let (url, body) = match payload {
        CanonicalPayload::Query(query) if query.is_empty() => (Url::parse(&target)?, None),
        CanonicalPayload::Query(query) => (Url::parse(&format!("{target}?{query}"))?, None),
        CanonicalPayload::Json(json) => (Url::parse(&target)?, Some(json.into_bytes())),
        CanonicalPayload::Multipart(bytes) => (Url::parse(&target)?, Some(bytes)),
    };

    Ok(SignedRequest {
        method: operation.verb.wire_method(),
        url,
        headers,
        body,
        target,
        payload: description,
        timestamp: auth.timestamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::endpoints::{account, ads, chat};

    fn auth() -> AuthHeaders<'static> {
        AuthHeaders {
            api_key: "test-key",
            signature: "abc123".to_string(),
            timestamp: 1_700_000_000_000,
            recv_window: 5000,
        }
    }

    #[test]
    fn test_get_appends_query() {
        let request = build_request(
            "https://api.bybit.com",
            &account::GET_CURRENT_BALANCE,
            CanonicalPayload::Query("accountType=FUND".to_string()),
            &auth(),
        )
        .unwrap();

        assert_eq!(request.method, Method::GET);
        assert!(request.url.as_str().ends_with("?accountType=FUND"));
        assert_eq!(request.target(), "https://api.bybit.com/v5/account/wallet-balance");
        assert!(request.body.is_none());
    }

    #[test]
    fn test_get_without_params_has_no_query() {
        let request = build_request(
            "https://api.bybit.com/",
            &account::GET_CURRENT_BALANCE,
            CanonicalPayload::Query(String::new()),
            &auth(),
        )
        .unwrap();
        assert_eq!(request.url.as_str(), "https://api.bybit.com/v5/account/wallet-balance");
        assert!(request.url.query().is_none());
    }

    #[test]
    fn test_signing_headers() {
        let request = build_request(
            "https://api.bybit.com",
            &ads::GET_AD_DETAILS,
            CanonicalPayload::Json(r#"{"itemId":"1"}"#.to_string()),
            &auth(),
        )
        .unwrap();

        let headers = &request.headers;
        assert_eq!(headers["X-BAPI-API-KEY"], "test-key");
        assert_eq!(headers["X-BAPI-SIGN"], "abc123");
        assert_eq!(headers["X-BAPI-SIGN-TYPE"], "2");
        assert_eq!(headers["X-BAPI-TIMESTAMP"], "1700000000000");
        assert_eq!(headers["X-BAPI-RECV-WINDOW"], "5000");
        assert_eq!(headers[CONTENT_TYPE], "application/json");
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.body.as_deref(), Some(br#"{"itemId":"1"}"#.as_slice()));
    }

    #[test]
    fn test_file_is_posted_as_multipart() {
        let request = build_request(
            "https://api.bybit.com",
            &chat::UPLOAD_CHAT_FILE,
            CanonicalPayload::Multipart(vec![1, 2, 3]),
            &auth(),
        )
        .unwrap();

        assert_eq!(request.method, Method::POST);
        assert_eq!(
            request.headers[CONTENT_TYPE],
            "multipart/form-data; boundary=boundary-for-file"
        );
        assert_eq!(request.body, Some(vec![1, 2, 3]));
        assert_eq!(request.context().payload, "<multipart 3 bytes>");
    }

    #[test]
    fn test_context_carries_reproduction_details() {
        let request = build_request(
            "https://api-testnet.bybit.com",
            &ads::REMOVE_AD,
            CanonicalPayload::Json(r#"{"itemId":"9"}"#.to_string()),
            &auth(),
        )
        .unwrap();
        let context = request.context();
        assert_eq!(context.target, "https://api-testnet.bybit.com/v5/p2p/item/cancel");
        assert_eq!(context.payload, r#"{"itemId":"9"}"#);
        assert_eq!(context.timestamp, 1_700_000_000_000);
    }

    #[test]
    fn test_rejects_unprintable_api_key() {
        let mut bad = auth();
        bad.api_key = "key\nwith-newline";
        let err = signing_headers(&bad, "application/json").unwrap_err();
        assert!(matches!(err, P2pError::Config(_)));
    }
}
