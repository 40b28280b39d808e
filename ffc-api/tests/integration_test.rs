use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use ffc_api::state::{AppState, AuthConfig};
use ffc_api::app;
use ffc_catalog::QuoteCalculator;
use ffc_chat::ChatEngine;
use ffc_core::{MockChatGateway, MockModelGenerator, MockPrintVendor, VendorQuote};
use ffc_order::{OrderAdmin, OrderPipeline, PipelineConfig};
use ffc_store::MemoryStore;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;

const CUSTOMER: &str = "15551230001";
const PASSPHRASE: &str = "open-sesame";

struct Harness {
    app: Router,
    gateway: Arc<MockChatGateway>,
    generator: Arc<MockModelGenerator>,
    vendor: Arc<MockPrintVendor>,
}

fn quote(id: &str, cents: i32) -> VendorQuote {
    VendorQuote {
        quote_id: id.to_string(),
        vendor_id: "craftcloud".to_string(),
        total_price_cents: cents,
        lead_days: 6,
        shipping_id: "ship-std".to_string(),
    }
}

fn harness() -> Harness {
    harness_with(false)
}

fn harness_with(auto_fulfill: bool) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let gateway = Arc::new(MockChatGateway::new());
    let generator = Arc::new(MockModelGenerator::new());
    let vendor = Arc::new(MockPrintVendor::with_quotes(vec![
        quote("q-40", 4000),
        quote("q-25", 2500),
        quote("q-60", 6000),
    ]));

    let engine = Arc::new(ChatEngine::new(
        store.clone(),
        store.clone(),
        store.clone(),
        gateway.clone(),
        QuoteCalculator::default(),
    ));
    let pipeline = Arc::new(OrderPipeline::new(
        store.clone(),
        generator.clone(),
        vendor.clone(),
        PipelineConfig {
            generation_retry_delay: Duration::from_millis(0),
            ..PipelineConfig::default()
        },
    ));
    let admin = Arc::new(OrderAdmin::new(store.clone()));

    let state = AppState {
        orders: store.clone(),
        messages: store,
        engine,
        pipeline,
        admin,
        vendor: vendor.clone(),
        auth: AuthConfig {
            secret: "test-secret".to_string(),
            expiration: 3600,
            operator_passphrase: PASSPHRASE.to_string(),
        },
        auto_fulfill,
    };

    Harness {
        app: app(state),
        gateway,
        generator,
        vendor,
    }
}

async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn login(app: &Router) -> String {
    let (status, body) = request(
        app,
        "POST",
        "/v1/auth/login",
        None,
        Some(json!({ "passphrase": PASSPHRASE })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

async fn send_chat(app: &Router, text: &str, image_url: Option<&str>) {
    let attachments = match image_url {
        Some(url) => json!([{ "type": "image", "url": url }]),
        None => json!([]),
    };
    let (status, _) = request(
        app,
        "POST",
        "/v1/webhooks/chat",
        None,
        Some(json!({
            "events": [{
                "customer_id": CUSTOMER,
                "text": text,
                "attachments": attachments,
                "sender_name": "Dana R"
            }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

/// Drive a whole conversation up to a confirmed CLOUD order.
async fn confirm_cloud_order(h: &Harness) -> String {
    send_chat(&h.app, "", Some("https://cdn.gw.example/media/drawer.jpg")).await;
    send_chat(&h.app, "PETG, red, small", None).await;
    send_chat(&h.app, "I'll do cloud printing", None).await;
    send_chat(&h.app, "YES", None).await;

    let token = login(&h.app).await;
    let (_, orders) = request(&h.app, "GET", "/v1/admin/orders", Some(&token), None).await;
    orders[0]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_photo_webhook_creates_order() {
    let h = harness();
    send_chat(&h.app, "hi, can you do this drawer?", Some("https://cdn.gw.example/media/drawer.jpg")).await;

    let token = login(&h.app).await;
    let (status, orders) = request(&h.app, "GET", "/v1/admin/orders", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(orders.as_array().unwrap().len(), 1);
    assert_eq!(orders[0]["status"], "new");
    assert_eq!(orders[0]["customer_id"], CUSTOMER);

    // The customer got asked for specs.
    let reply = h.gateway.last_message_to(CUSTOMER).unwrap();
    assert!(reply.contains("material"));
}

#[tokio::test]
async fn test_conversation_reaches_quote_with_total() {
    let h = harness();
    send_chat(&h.app, "", Some("https://cdn.gw.example/media/drawer.jpg")).await;
    send_chat(&h.app, "PETG, red, small", None).await;
    send_chat(&h.app, "I'll do cloud printing", None).await;

    let token = login(&h.app).await;
    let (_, orders) = request(&h.app, "GET", "/v1/admin/orders", Some(&token), None).await;
    assert_eq!(orders[0]["fulfillment"], "CLOUD");
    assert_eq!(orders[0]["total_cents"], 3050); // 1800 * 1.25 + 800 shipping

    let proposal = h.gateway.last_message_to(CUSTOMER).unwrap();
    assert!(proposal.contains("Total:"));
}

#[tokio::test]
async fn test_confirmed_order_fulfills_via_cheapest_vendor_quote() {
    let h = harness();
    let order_id = confirm_cloud_order(&h).await;
    let token = login(&h.app).await;

    let (status, report) = request(
        &h.app,
        "POST",
        &format!("/v1/admin/orders/{}/fulfill", order_id),
        Some(&token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["success"], true);
    assert_eq!(report["vendor_quote"]["quote_id"], "q-25");
    assert_eq!(h.generator.calls(), 1);

    let (_, order) = request(
        &h.app,
        "GET",
        &format!("/v1/admin/orders/{}", order_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(order["vendor_cost_cents"], 2500);
    assert_eq!(order["margin_cents"], 3050 - 2500);
    assert!(order["model_path"].as_str().is_some());

    // A second run skips the already-generated model.
    request(
        &h.app,
        "POST",
        &format!("/v1/admin/orders/{}/fulfill", order_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(h.generator.calls(), 1);
}

#[tokio::test]
async fn test_fulfillment_failure_surfaces_in_report() {
    let h = harness();
    let order_id = confirm_cloud_order(&h).await;
    let token = login(&h.app).await;

    h.generator.push_outcome(Err("automation crashed"));
    h.generator.push_outcome(Err("automation crashed again"));

    let (_, report) = request(
        &h.app,
        "POST",
        &format!("/v1/admin/orders/{}/fulfill", order_id),
        Some(&token),
        None,
    )
    .await;

    assert_eq!(report["success"], false);
    assert!(report["error"]
        .as_str()
        .unwrap()
        .starts_with("ModelGenerationFailed"));

    let (_, order) = request(
        &h.app,
        "GET",
        &format!("/v1/admin/orders/{}", order_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(order["status"], "error");
}

#[tokio::test]
async fn test_admin_routes_require_token() {
    let h = harness();
    let (status, _) = request(&h.app, "GET", "/v1/admin/orders", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = request(&h.app, "GET", "/v1/admin/orders", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_rejects_wrong_passphrase() {
    let h = harness();
    let (status, _) = request(
        &h.app,
        "POST",
        "/v1/auth/login",
        None,
        Some(json!({ "passphrase": "guess" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_status_gate_rejects_unknown_status() {
    let h = harness();
    let order_id = confirm_cloud_order(&h).await;
    let token = login(&h.app).await;

    let (status, body) = request(
        &h.app,
        "PUT",
        &format!("/v1/admin/orders/{}/status", order_id),
        Some(&token),
        Some(json!({ "status": "refunded" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("refunded"));

    let (status, order) = request(
        &h.app,
        "PUT",
        &format!("/v1/admin/orders/{}/status", order_id),
        Some(&token),
        Some(json!({ "status": "shipped" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["status"], "shipped");
}

#[tokio::test]
async fn test_stats_reflect_confirmed_revenue() {
    let h = harness();
    confirm_cloud_order(&h).await;
    let token = login(&h.app).await;

    let (status, stats) = request(&h.app, "GET", "/v1/admin/stats?days=7", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total"], 1);
    assert_eq!(stats["by_status"]["confirmed"], 1);
    assert_eq!(stats["revenue_cents"], 3050);
}

#[tokio::test]
async fn test_message_log_has_both_directions() {
    let h = harness();
    send_chat(&h.app, "hello there", None).await;

    let token = login(&h.app).await;
    let (_, messages) = request(
        &h.app,
        "GET",
        &format!("/v1/admin/customers/{}/messages", CUSTOMER),
        Some(&token),
        None,
    )
    .await;

    let messages = messages.as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["direction"], "inbound");
    assert_eq!(messages[1]["direction"], "outbound");
}

#[tokio::test]
async fn test_auto_fulfill_runs_pipeline_after_confirmation() {
    let h = harness_with(true);
    send_chat(&h.app, "", Some("https://cdn.gw.example/media/drawer.jpg")).await;
    send_chat(&h.app, "PETG, red, small", None).await;
    send_chat(&h.app, "cloud", None).await;
    send_chat(&h.app, "YES", None).await;

    // The pipeline runs on a spawned task; give it a moment.
    for _ in 0..100 {
        if h.generator.calls() > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(h.generator.calls(), 1);

    let token = login(&h.app).await;
    for _ in 0..100 {
        let (_, orders) = request(&h.app, "GET", "/v1/admin/orders", Some(&token), None).await;
        if orders[0]["vendor_cost_cents"] == 2500 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("pipeline never persisted the vendor quote");
}

#[tokio::test]
async fn test_fulfill_unknown_order_reports_not_found() {
    let h = harness();
    let token = login(&h.app).await;

    let (status, report) = request(
        &h.app,
        "POST",
        "/v1/admin/orders/FFC-00000/fulfill",
        Some(&token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["success"], false);
    assert!(report["error"].as_str().unwrap().starts_with("NotFound"));
    // Nothing external was touched.
    assert_eq!(h.generator.calls(), 0);
    assert!(h.vendor.placed_quote_ids().is_empty());
}
