use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing_subscriber::EnvFilter;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bybit_p2p::auth::{FixedTimestamp, StaticCredentials};
use bybit_p2p::error::error_codes;
use bybit_p2p::rest::P2pClient;
use bybit_p2p::rest::response::{FORBIDDEN_MESSAGE, UNAUTHORIZED_MESSAGE};
use bybit_p2p::{P2pError, Params};

const TIMESTAMP: u64 = 1_700_000_000_000;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn build_client(base_url: impl Into<String>) -> P2pClient {
    init_tracing();
    let credentials = Arc::new(StaticCredentials::new("test-key", "test-secret"));
    P2pClient::builder()
        .base_url(base_url)
        .credentials(credentials)
        .timestamp_provider(Arc::new(FixedTimestamp(TIMESTAMP)))
        .build()
}

async fn mount_details(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/v5/p2p/order/info"))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

fn order_details() -> Params {
    Params::new().with("orderId", "1890")
}

#[tokio::test]
async fn test_forbidden_status() {
    let server = MockServer::start().await;
    mount_details(&server, ResponseTemplate::new(403).set_body_string("forbidden")).await;

    let client = build_client(server.uri());
    let err = client.get_order_details(order_details()).await.unwrap_err();

    match err {
        P2pError::HttpStatus {
            status,
            message,
            context,
            ..
        } => {
            assert_eq!(status, 403);
            assert_eq!(message, FORBIDDEN_MESSAGE);
            assert_eq!(context.target, format!("{}/v5/p2p/order/info", server.uri()));
            assert_eq!(context.payload, r#"{"orderId":"1890"}"#);
            assert_eq!(context.timestamp, TIMESTAMP);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_unauthorized_status() {
    let server = MockServer::start().await;
    mount_details(&server, ResponseTemplate::new(401)).await;

    let client = build_client(server.uri());
    let err = client.get_order_details(order_details()).await.unwrap_err();

    match err {
        P2pError::HttpStatus { status, message, .. } => {
            assert_eq!(status, 401);
            assert_eq!(message, UNAUTHORIZED_MESSAGE);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_other_status_is_reported_with_code() {
    let server = MockServer::start().await;
    let body = json!({"retCode": 0, "retMsg": "OK", "result": {}});
    mount_details(&server, ResponseTemplate::new(502).set_body_json(body)).await;

    let client = build_client(server.uri());
    let err = client.get_order_details(order_details()).await.unwrap_err();

    assert_eq!(err.status(), Some(502));
    assert!(err.to_string().contains("HTTP status code is: 502, expected: 200"));
}

#[tokio::test]
async fn test_application_error_on_200() {
    let server = MockServer::start().await;
    let body = json!({
        "retCode": 10004,
        "retMsg": "error sign!",
        "result": {},
        "time": 1700000000000u64
    });
    mount_details(&server, ResponseTemplate::new(200).set_body_json(body)).await;

    let client = build_client(server.uri());
    let err = client.get_order_details(order_details()).await.unwrap_err();

    let api_error = err.api_error().unwrap();
    assert_eq!(api_error.code, error_codes::INVALID_SIGNATURE);
    assert_eq!(api_error.message, "error sign!");
    assert!(api_error.is_invalid_signature());
    assert!(err.to_string().starts_with("error sign! (ErrCode: 10004)"));
    assert_eq!(err.context().unwrap().timestamp, TIMESTAMP);
}

#[tokio::test]
async fn test_legacy_envelope_error() {
    let server = MockServer::start().await;
    let body = json!({"ret_code": 10006, "ret_msg": "Too many visits!"});
    mount_details(&server, ResponseTemplate::new(200).set_body_json(body)).await;

    let client = build_client(server.uri());
    let err = client.get_order_details(order_details()).await.unwrap_err();

    assert!(err.api_error().unwrap().is_rate_limit());
}

#[tokio::test]
async fn test_malformed_body() {
    let server = MockServer::start().await;
    mount_details(
        &server,
        ResponseTemplate::new(200).set_body_string("<html>Bad gateway</html>"),
    )
    .await;

    let client = build_client(server.uri());
    let err = client.get_order_details(order_details()).await.unwrap_err();

    match err {
        P2pError::Decode { status, body, .. } => {
            assert_eq!(status, 200);
            assert_eq!(body, "<html>Bad gateway</html>");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    let client = build_client(format!("http://{address}"));
    let err = client.get_order_details(order_details()).await.unwrap_err();

    assert!(err.is_network());
    let context = err.context().unwrap();
    assert_eq!(context.target, format!("http://{address}/v5/p2p/order/info"));
    assert_eq!(context.payload, r#"{"orderId":"1890"}"#);
}

#[tokio::test]
async fn test_timeout_is_network_error() {
    let server = MockServer::start().await;
    let body = json!({"retCode": 0, "retMsg": "OK", "result": {}});
    mount_details(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(body)
            .set_delay(Duration::from_secs(2)),
    )
    .await;

    let client = P2pClient::builder()
        .base_url(server.uri())
        .credentials(Arc::new(StaticCredentials::new("test-key", "test-secret")))
        .timeout(Duration::from_millis(100))
        .build();
    let err = client.get_order_details(order_details()).await.unwrap_err();

    assert!(err.is_network());
}

#[tokio::test]
async fn test_invalid_integer_parameter_is_rejected_locally() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = build_client(server.uri());
    let err = client
        .get_ads_list(Params::new().with("positionIdx", "first"))
        .await
        .unwrap_err();

    assert!(
        matches!(err, P2pError::InvalidParameter { ref name, .. } if name == "positionIdx")
    );
}

#[tokio::test]
async fn test_missing_upload_file_is_reported() {
    let client = build_client("http://127.0.0.1:9");
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.png").to_string_lossy().into_owned();

    let err = client
        .upload_chat_file(Params::new().with("upload_file", missing))
        .await
        .unwrap_err();

    assert!(matches!(err, P2pError::Io(_)));
}

#[tokio::test]
async fn test_fragment_marker_in_query_is_rejected_locally() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = build_client(server.uri());
    let err = client
        .get_current_balance(Params::new().with("accountType", "FUND").with("coin", "a#b c"))
        .await
        .unwrap_err();

    assert!(matches!(err, P2pError::InvalidParameter { ref name, .. } if name == "coin"));
}
