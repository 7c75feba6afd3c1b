//! Integration tests for the shipping rate override endpoint.
//!
//! Standard carts are priced by a fake Cashier `shipping_lines` endpoint;
//! pick-up carts by a fake location dataset.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
    routing::any,
};
use cashier_bopis_integration_tests::{
    ACCESS_TOKEN, FakeUpstream, Recorder, SHOP_QUERY, TestApp, UNREACHABLE, body_json, body_text,
    respond_with, signed_json, test_config,
};
use serde_json::{Value, json};

const SHIPPING_LINES_PATH: &str = "/api/v1/{platform}/{shop}/shipping_lines";
const LOCATIONS_PATH: &str = "/resource/stores.json";

fn shipping_uri() -> String {
    format!("/shipping?{SHOP_QUERY}")
}

fn shipping_body(titles: &[&str]) -> Value {
    let cart: Vec<Value> = titles
        .iter()
        .map(|title| json!({ "title": title, "price": 1999, "quantity": 2, "weight": 450 }))
        .collect();

    json!({
        "cart": cart,
        "destination_address": {
            "address1": "123 Main St",
            "city": "Austin",
            "country_code": "US",
            "province_code": "TX",
            "postal_code": "78701"
        }
    })
}

async fn cashier_upstream(status: StatusCode, body: &'static str) -> (FakeUpstream, Recorder) {
    let recorder = Recorder::default();
    let upstream = FakeUpstream::spawn(
        Router::new().route(SHIPPING_LINES_PATH, respond_with(&recorder, status, body)),
    )
    .await;
    (upstream, recorder)
}

async fn location_upstream(status: StatusCode, body: &'static str) -> (FakeUpstream, Recorder) {
    let recorder = Recorder::default();
    let upstream = FakeUpstream::spawn(
        Router::new().route(LOCATIONS_PATH, respond_with(&recorder, status, body)),
    )
    .await;
    (upstream, recorder)
}

// =============================================================================
// Standard Orders
// =============================================================================

#[tokio::test]
async fn test_standard_cart_returns_cashier_rates_in_dollars() {
    let (cashier, recorder) = cashier_upstream(
        StatusCode::OK,
        r#"{"shipping_lines":{"L1":{"shipping":{"name":"Ground","price":599}}}}"#,
    )
    .await;
    let app = TestApp::new(&cashier.url(""), UNREACHABLE);

    let response = app
        .send(signed_json(&shipping_uri(), &shipping_body(&["Coffee Beans"])))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({
            "name": "My Custom Shipping Override",
            "rates": [{ "line_text": "Ground", "value": 5.99 }]
        })
    );

    let requests = recorder.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].uri.path(),
        "/api/v1/shopify/example.myshopify.com/shipping_lines"
    );
    assert_eq!(
        requests[0].headers["x-bold-checkout-access-token"],
        ACCESS_TOKEN
    );
    assert_eq!(
        requests[0].body,
        json!({
            "order": {
                "customer": {
                    "shipping_address": {
                        "address": "123 Main St",
                        "city": "Austin",
                        "country_code": "US",
                        "province_code": "TX",
                        "postal_code": "78701"
                    }
                },
                "items": [{ "price": 1999, "quantity": 2, "grams": 450 }]
            }
        })
    );
}

#[tokio::test]
async fn test_line_item_numbers_are_forwarded_unchanged() {
    let (cashier, recorder) =
        cashier_upstream(StatusCode::OK, r#"{"shipping_lines":{}}"#).await;
    let app = TestApp::new(&cashier.url(""), UNREACHABLE);

    let response = app
        .send(signed_json(
            &shipping_uri(),
            &json!({
                "cart": [{ "title": "Tea", "price": 1999, "quantity": 1.0, "weight": 12.5 }],
                "destination_address": {}
            }),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        recorder.requests()[0].body["order"]["items"],
        json!([{ "price": 1999, "quantity": 1, "grams": 12.5 }])
    );
}

#[tokio::test]
async fn test_standard_rates_keep_provider_order() {
    let (cashier, _recorder) = cashier_upstream(
        StatusCode::OK,
        r#"{"shipping_lines":{
            "zz":{"shipping":{"name":"Overnight","price":2500}},
            "aa":{"shipping":{"name":"Ground","price":599}},
            "mm":{"shipping":{"name":"Two Day","price":1250}}
        }}"#,
    )
    .await;
    let app = TestApp::new(&cashier.url(""), UNREACHABLE);

    let response = app
        .send(signed_json(&shipping_uri(), &shipping_body(&["Tea"])))
        .await;

    let body = body_json(response).await;
    let names: Vec<&str> = body["rates"]
        .as_array()
        .unwrap()
        .iter()
        .map(|rate| rate["line_text"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Overnight", "Ground", "Two Day"]);
    assert_eq!(body["rates"][2]["value"], json!(12.5));
}

#[tokio::test]
async fn test_standard_rates_accept_list_of_lines() {
    let (cashier, _recorder) = cashier_upstream(
        StatusCode::OK,
        r#"{"shipping_lines":[{"shipping":{"name":"Ground","price":1000}}]}"#,
    )
    .await;
    let app = TestApp::new(&cashier.url(""), UNREACHABLE);

    let response = app
        .send(signed_json(&shipping_uri(), &shipping_body(&["Tea"])))
        .await;

    let body = body_json(response).await;
    assert_eq!(body["rates"], json!([{ "line_text": "Ground", "value": 10.0 }]));
}

#[tokio::test]
async fn test_empty_cart_is_priced_as_standard() {
    let (cashier, recorder) =
        cashier_upstream(StatusCode::OK, r#"{"shipping_lines":{}}"#).await;
    let app = TestApp::new(&cashier.url(""), UNREACHABLE);

    let response = app
        .send(signed_json(&shipping_uri(), &shipping_body(&[])))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({ "name": "My Custom Shipping Override", "rates": [] })
    );
    assert_eq!(recorder.requests()[0].body["order"]["items"], json!([]));
}

// =============================================================================
// Pick-up Orders
// =============================================================================

#[tokio::test]
async fn test_pickup_cart_returns_free_location_rates() {
    let (locations, recorder) = location_upstream(
        StatusCode::OK,
        r#"[
            {"name":"Store A","id":"1","geolocation":{"latitude":"30.1","longitude":"-97.1"}},
            {"name":"Store B","id":"2"}
        ]"#,
    )
    .await;
    let app = TestApp::new(UNREACHABLE, &locations.url(LOCATIONS_PATH));

    let response = app
        .send(signed_json(
            &shipping_uri(),
            &shipping_body(&["Coffee Beans", "Grinder - pick up"]),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({
            "name": "Pick up: ",
            "rates": [
                { "line_text": "Store A", "value": 0.0 },
                { "line_text": "Store B", "value": 0.0 }
            ]
        })
    );

    let requests = recorder.requests();
    assert_eq!(requests.len(), 1);
    let (key, value) = url_query_pair(requests[0].uri.query().unwrap());
    assert_eq!(key, "$where");
    assert_eq!(value, "within_circle(GeoLocation,30.268466,-97.742811, 100000)");
}

fn url_query_pair(query: &str) -> (String, String) {
    let (key, value) = url::form_urlencoded::parse(query.as_bytes()).next().unwrap();
    (key.into_owned(), value.into_owned())
}

// =============================================================================
// Upstream Failures
// =============================================================================

#[tokio::test]
async fn test_cashier_error_status_is_bad_gateway() {
    let (cashier, _recorder) =
        cashier_upstream(StatusCode::INTERNAL_SERVER_ERROR, r#"{"error":"boom"}"#).await;
    let app = TestApp::new(&cashier.url(""), UNREACHABLE);

    let response = app
        .send(signed_json(&shipping_uri(), &shipping_body(&["Tea"])))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_text(response).await, "External service error");
}

#[tokio::test]
async fn test_malformed_location_body_is_bad_gateway() {
    let (locations, _recorder) =
        location_upstream(StatusCode::OK, r#"{"not":"a list"}"#).await;
    let app = TestApp::new(UNREACHABLE, &locations.url(LOCATIONS_PATH));

    let response = app
        .send(signed_json(&shipping_uri(), &shipping_body(&["Tea - pick up"])))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_unreachable_cashier_is_bad_gateway() {
    let app = TestApp::new(UNREACHABLE, UNREACHABLE);

    let response = app
        .send(signed_json(&shipping_uri(), &shipping_body(&["Tea"])))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_slow_location_provider_times_out() {
    let locations = FakeUpstream::spawn(Router::new().route(
        LOCATIONS_PATH,
        any(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            "[]"
        }),
    ))
    .await;
    let mut config = test_config(UNREACHABLE, &locations.url(LOCATIONS_PATH));
    config.upstream_timeout = Duration::from_millis(200);
    let app = TestApp::with_config(config);

    let response = app
        .send(signed_json(&shipping_uri(), &shipping_body(&["Tea - pick up"])))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_text(response).await, "External service error");
}

// =============================================================================
// Invalid Requests
// =============================================================================

#[tokio::test]
async fn test_missing_shop_is_bad_request() {
    let app = TestApp::new(UNREACHABLE, UNREACHABLE);

    let response = app
        .send(signed_json("/shipping?platform=shopify", &shipping_body(&["Tea"])))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_shop_with_path_characters_never_reaches_cashier() {
    let (cashier, recorder) =
        cashier_upstream(StatusCode::OK, r#"{"shipping_lines":{}}"#).await;
    let app = TestApp::new(&cashier.url(""), UNREACHABLE);

    let response = app
        .send(signed_json(
            "/shipping?platform=shopify&shop=a%2F..%2F..%2F..%2Fadmin%2Fsecret%3F",
            &shipping_body(&["Tea"]),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(recorder.requests().is_empty());
}

#[tokio::test]
async fn test_missing_title_is_bad_request() {
    let app = TestApp::new(UNREACHABLE, UNREACHABLE);

    let response = app
        .send(signed_json(
            &shipping_uri(),
            &json!({ "cart": [{ "price": 100 }], "destination_address": {} }),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_negative_weight_is_bad_request() {
    let app = TestApp::new(UNREACHABLE, UNREACHABLE);

    let response = app
        .send(signed_json(
            &shipping_uri(),
            &json!({ "cart": [{ "title": "Tea", "weight": -5 }] }),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unsigned_shipping_request_is_rejected() {
    let app = TestApp::new(UNREACHABLE, UNREACHABLE);
    let request = Request::post(shipping_uri())
        .header("content-type", "application/json")
        .body(Body::from(shipping_body(&["Tea"]).to_string()))
        .unwrap();

    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
