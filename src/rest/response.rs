//! Classification of raw HTTP responses.
//!
//! Bybit reports failures in two places: the HTTP status (geo blocks, bad
//! credentials) and the JSON envelope (`retCode` / `retMsg`, or the older
//! `ret_code` / `ret_msg` spelling). Both end up as a [`P2pError`].

use reqwest::header::HeaderMap;
use serde_json::Value;

use crate::error::{ApiError, P2pError, RequestContext};

/// Message for HTTP 403.
pub const FORBIDDEN_MESSAGE: &str = "Access denied error. Possible causes: 1) your IP is located in the US or Mainland China, 2) IP banned due to ratelimit violation";

/// Message for HTTP 401.
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized. Possible causes: 1) incorrect API key and/or secret, 2) incorrect environment: Mainnet vs Testnet";

/// A response as read off the wire.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body
    pub body: Vec<u8>,
}

/// Human-readable explanation of a non-200 status.
pub fn status_message(status: u16) -> String {
    match status {
        403 => FORBIDDEN_MESSAGE.to_string(),
        401 => UNAUTHORIZED_MESSAGE.to_string(),
        other => format!("HTTP status code is: {other}, expected: 200"),
    }
}

/// Find the result code and message, tolerating both field spellings.
fn envelope_fields(body: &serde_json::Map<String, Value>) -> Option<(&Value, Option<&Value>)> {
    let code = body.get("retCode").or_else(|| body.get("ret_code"))?;
    let message = body.get("retMsg").or_else(|| body.get("ret_msg"));
    Some((code, message))
}

fn parse_code(code: &Value) -> Option<i64> {
    match code {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn message_text(message: Option<&Value>) -> String {
    match message {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Turn a raw response into the decoded body or a classified error.
pub fn interpret(response: RawResponse, context: RequestContext) -> Result<Value, P2pError> {
    let RawResponse {
        status,
        headers,
        body,
    } = response;

    if status != 200 {
        let message = status_message(status);
        if status != 401 && status != 403 {
            tracing::error!(status, url = %context.target, "{message}");
        }
        return Err(P2pError::HttpStatus {
            status,
            message,
            context: Box::new(context),
            headers,
        });
    }

    let decode_error = |reason: String, body: &[u8], context: RequestContext| {
        let body = String::from_utf8_lossy(body).into_owned();
        tracing::debug!(response_text = %body, "Could not decode JSON response");
        P2pError::Decode {
            status,
            reason,
            body,
            context: Box::new(context),
        }
    };

    let decoded: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => return Err(decode_error(e.to_string(), &body, context)),
    };

    let Some(object) = decoded.as_object() else {
        return Err(decode_error("response is not a JSON object".to_string(), &body, context));
    };

    let Some((code, message)) = envelope_fields(object) else {
        return Err(decode_error("response has no retCode field".to_string(), &body, context));
    };

    let Some(code) = parse_code(code) else {
        return Err(decode_error(format!("retCode {code} is not an integer"), &body, context));
    };

    if code != 0 {
        let error = ApiError::new(code, message_text(message));
        tracing::error!(code, url = %context.target, "{error}");
        return Err(P2pError::Api {
            error,
            context: Box::new(context),
            headers,
        });
    }

    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(status: u16, body: &str) -> RawResponse {
        RawResponse {
            status,
            headers: HeaderMap::new(),
            body: body.as_bytes().to_vec(),
        }
    }

    fn context() -> RequestContext {
        RequestContext::new("https://api.bybit.com/v5/p2p/item/info", r#"{"itemId":"1"}"#, 7)
    }

    #[test]
    fn test_success_returns_body() {
        let body = r#"{"retCode":0,"retMsg":"SUCCESS","result":{"id":"1"}}"#;
        let value = interpret(raw(200, body), context()).unwrap();
        assert_eq!(value["result"]["id"], "1");
    }

    #[test]
    fn test_snake_case_envelope() {
        let body = r#"{"ret_code":0,"ret_msg":"OK","result":{}}"#;
        assert!(interpret(raw(200, body), context()).is_ok());

        let body = r#"{"ret_code":10001,"ret_msg":"params error"}"#;
        let err = interpret(raw(200, body), context()).unwrap_err();
        assert_eq!(err.api_error(), Some(&ApiError::new(10001, "params error")));
    }

    #[test]
    fn test_non_zero_code_is_application_error() {
        let body = json!({"retCode": 10004, "retMsg": "error sign!", "result": {}}).to_string();
        let err = interpret(raw(200, &body), context()).unwrap_err();
        match err {
            P2pError::Api { error, context, .. } => {
                assert_eq!(error.code, 10004);
                assert_eq!(error.message, "error sign!");
                assert_eq!(context.payload, r#"{"itemId":"1"}"#);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_string_code_is_parsed() {
        let err = interpret(raw(200, r#"{"retCode":"912","retMsg":"x"}"#), context()).unwrap_err();
        assert_eq!(err.status(), Some(912));
        assert!(interpret(raw(200, r#"{"retCode":"0","retMsg":""}"#), context()).is_ok());
    }

    #[test]
    fn test_non_200_wins_over_valid_json() {
        let body = r#"{"retCode":0,"retMsg":"OK"}"#;
        let err = interpret(raw(403, body), context()).unwrap_err();
        match err {
            P2pError::HttpStatus { status, message, .. } => {
                assert_eq!(status, 403);
                assert_eq!(message, FORBIDDEN_MESSAGE);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_status_messages() {
        assert_eq!(status_message(401), UNAUTHORIZED_MESSAGE);
        assert_eq!(status_message(502), "HTTP status code is: 502, expected: 200");
        let err = interpret(raw(500, "oops"), context()).unwrap_err();
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn test_malformed_body_keeps_status() {
        let err = interpret(raw(200, "<html>gateway</html>"), context()).unwrap_err();
        match err {
            P2pError::Decode { status, body, .. } => {
                assert_eq!(status, 200);
                assert_eq!(body, "<html>gateway</html>");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_envelope_is_decode_error() {
        let err = interpret(raw(200, r#"{"result":{}}"#), context()).unwrap_err();
        assert!(matches!(err, P2pError::Decode { .. }));
        let err = interpret(raw(200, "[1,2]"), context()).unwrap_err();
        assert!(matches!(err, P2pError::Decode { .. }));
    }
}
