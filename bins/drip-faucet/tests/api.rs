//! Handler tests: the real router wired to a scripted disbursement
//! collaborator, driven through `tower::ServiceExt::oneshot`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use drip_core::{parse_ether, Address, TxHash};
use drip_faucet::config::Config;
use drip_faucet::rate_limit::RateLimiter;
use drip_faucet::{routes, AppState};
use drip_wallet::{Sender, WalletError};

const VALID_ADDRESS: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

/// Scripted collaborator: fails the first `fail_first` sends, then
/// succeeds with a fixed hash. Optional latency to hold sends in flight.
struct MockSender {
    fail_first: AtomicUsize,
    delay: Duration,
    calls: AtomicUsize,
}

impl MockSender {
    fn ok() -> Self {
        Self::failing(0)
    }

    fn failing(n: usize) -> Self {
        Self {
            fail_first: AtomicUsize::new(n),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    fn slow(delay: Duration) -> Self {
        Self {
            fail_first: AtomicUsize::new(0),
            delay,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Sender for MockSender {
    fn address(&self) -> Address {
        Address::ZERO
    }

    async fn balance(&self) -> Result<u128, WalletError> {
        Ok(parse_ether("10").unwrap())
    }

    async fn send(&self, _to: Address, _amount_wei: u128) -> Result<TxHash, WalletError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.delay > Duration::ZERO {
            tokio::time::sleep(self.delay).await;
        }
        let should_fail = self
            .fail_first
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(WalletError::Rpc("insufficient funds for transfer".into()));
        }
        Ok(TxHash::from_bytes([0x11; 32]))
    }
}

fn test_config() -> Config {
    Config {
        rpc_url: "http://localhost:8545".into(),
        private_key: String::new(),
        amount_wei: parse_ether("0.1").unwrap(),
        bind_addr: "127.0.0.1:0".into(),
        window_secs: 86_400,
        confirm_timeout_secs: 60,
    }
}

fn app(sender: Arc<MockSender>) -> Router {
    let config = test_config();
    let state = AppState {
        sender,
        rate_limiter: Arc::new(RateLimiter::new(config.window())),
        config: Arc::new(config),
    };
    routes::router(state)
}

fn faucet_request(ip: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/request")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", ip)
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn valid_body() -> String {
    format!(r#"{{"address": "{VALID_ADDRESS}"}}"#)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Method and body validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_is_method_not_allowed() {
    let sender = Arc::new(MockSender::ok());
    let app = app(sender.clone());

    let request = Request::builder()
        .method("GET")
        .uri("/api/request")
        .header("x-forwarded-for", "1.2.3.4")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );
    let body = body_json(response).await;
    assert_eq!(body["error"], "Method not allowed");

    // The gate was never touched: the same client can still claim.
    let response = app
        .oneshot(faucet_request("1.2.3.4", &valid_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn malformed_json_is_rejected_without_consuming_quota() {
    let sender = Arc::new(MockSender::ok());
    let app = app(sender.clone());

    let response = app
        .clone()
        .oneshot(faucet_request("1.2.3.4", "not json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid JSON body.");
    assert_eq!(sender.calls(), 0);

    let response = app
        .oneshot(faucet_request("1.2.3.4", &valid_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn invalid_address_is_rejected_without_consuming_quota() {
    let sender = Arc::new(MockSender::ok());
    let app = app(sender.clone());

    let response = app
        .clone()
        .oneshot(faucet_request("1.2.3.4", r#"{"address": "not-an-address"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid address.");
    assert_eq!(sender.calls(), 0);

    let response = app
        .oneshot(faucet_request("1.2.3.4", &valid_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_address_field_is_invalid() {
    let app = app(Arc::new(MockSender::ok()));
    let response = app
        .oneshot(faucet_request("1.2.3.4", "{}"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid address.");
}

#[tokio::test]
async fn bad_checksum_is_invalid() {
    let app = app(Arc::new(MockSender::ok()));
    // One case-flipped letter in an otherwise valid checksummed address.
    let response = app
        .oneshot(faucet_request(
            "1.2.3.4",
            r#"{"address": "0x5aaeb6053F3E94C9b9A09f33669435E7Ef1BeAed"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid address.");
}

// ---------------------------------------------------------------------------
// Rate limiting
// ---------------------------------------------------------------------------

#[tokio::test]
async fn success_then_rate_limited() {
    let sender = Arc::new(MockSender::ok());
    let app = app(sender.clone());

    let response = app
        .clone()
        .oneshot(faucet_request("1.2.3.4", &valid_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["txHash"], format!("0x{}", "11".repeat(32)));

    let response = app
        .oneshot(faucet_request("1.2.3.4", &valid_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key(header::RETRY_AFTER));
    assert_eq!(
        body_json(response).await["error"],
        "Only one request per 24h allowed."
    );
    assert_eq!(sender.calls(), 1);
}

#[tokio::test]
async fn distinct_identities_have_independent_quotas() {
    let sender = Arc::new(MockSender::ok());
    let app = app(sender.clone());

    for ip in ["1.2.3.4", "5.6.7.8"] {
        let response = app
            .clone()
            .oneshot(faucet_request(ip, &valid_body()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
    assert_eq!(sender.calls(), 2);
}

#[tokio::test]
async fn missing_forwarded_for_shares_the_unknown_identity() {
    let app = app(Arc::new(MockSender::ok()));

    let bare = || {
        Request::builder()
            .method("POST")
            .uri("/api/request")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(valid_body()))
            .unwrap()
    };

    let response = app.clone().oneshot(bare()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(bare()).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn forwarded_for_uses_first_token_only() {
    let app = app(Arc::new(MockSender::ok()));

    let response = app
        .clone()
        .oneshot(faucet_request("1.2.3.4, 9.9.9.9", &valid_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Same first hop: limited, regardless of the rest of the chain.
    let response = app
        .clone()
        .oneshot(faucet_request("1.2.3.4", &valid_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    // The second hop was never the identity.
    let response = app
        .oneshot(faucet_request("9.9.9.9", &valid_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Collaborator failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_send_surfaces_reason_and_preserves_quota() {
    let sender = Arc::new(MockSender::failing(1));
    let app = app(sender.clone());

    let response = app
        .clone()
        .oneshot(faucet_request("1.2.3.4", &valid_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await["error"],
        "rpc: insufficient funds for transfer"
    );

    // Quota was not consumed; the retry goes through.
    let response = app
        .oneshot(faucet_request("1.2.3.4", &valid_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(sender.calls(), 2);
}

#[tokio::test]
async fn concurrent_same_identity_disburses_exactly_once() {
    let sender = Arc::new(MockSender::slow(Duration::from_millis(100)));
    let app = app(sender.clone());

    let (first, second) = tokio::join!(
        app.clone().oneshot(faucet_request("1.2.3.4", &valid_body())),
        app.clone().oneshot(faucet_request("1.2.3.4", &valid_body())),
    );

    let mut statuses = [first.unwrap().status(), second.unwrap().status()];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::OK, StatusCode::TOO_MANY_REQUESTS]);
    assert_eq!(sender.calls(), 1);
}

// ---------------------------------------------------------------------------
// Ancillary routes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn status_reports_operator_and_parameters() {
    let app = app(Arc::new(MockSender::ok()));
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["operator"], Address::ZERO.checksum());
    assert_eq!(body["balance_eth"], "10");
    assert_eq!(body["amount_per_request_eth"], "0.1");
    assert_eq!(body["cooldown_secs"], 86_400);
}

#[tokio::test]
async fn web_ui_is_served_at_root() {
    let app = app(Arc::new(MockSender::ok()));
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/html"));
}
