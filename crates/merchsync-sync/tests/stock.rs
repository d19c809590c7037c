//! Integration tests for the stock-sync engine: StoreGest rows resolved to
//! catalog variants by SKU, absolute quantity pushes, and the ok/miss/err
//! accounting.

use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use merchsync_shopify::{ClientOptions, ShopifyClient};
use merchsync_storegest::StoregestClient;
use merchsync_sync::{run_stock_sync, StockSummary, StockWindow};

fn shopify_client(server: &MockServer) -> ShopifyClient {
    let options = ClientOptions {
        timeout_secs: 5,
        user_agent: "merchsync-test/0.1".to_string(),
        max_retries: 0,
        backoff_base_ms: 0,
        inter_request_delay_ms: 0,
        dry_run: false,
    };
    ShopifyClient::with_base_url(&server.uri(), "shpat_test", &options)
        .expect("failed to build test ShopifyClient")
}

fn storegest_client(server: &MockServer) -> StoregestClient {
    StoregestClient::new(
        &server.uri(),
        "shop.example.it",
        "sg_test_key",
        5,
        "merchsync-test/0.1",
    )
    .expect("failed to build test StoregestClient")
}

fn variant_hit(variant_id: i64) -> serde_json::Value {
    json!({
        "data": {
            "productVariants": {
                "nodes": [{
                    "id": format!("gid://shopify/ProductVariant/{variant_id}"),
                    "sku": "X",
                    "product": { "id": "gid://shopify/Product/7" }
                }]
            }
        }
    })
}

async fn mount_variant_lookup(server: &MockServer, sku: &str, variant_id: i64) {
    Mock::given(method("POST"))
        .and(path("/graphql.json"))
        .and(body_partial_json(
            json!({"variables": {"q": format!("sku:\"{sku}\"")}}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(&variant_hit(variant_id)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn stock_sync_counts_ok_miss_and_err() {
    let shopify_server = MockServer::start().await;
    let storegest_server = MockServer::start().await;

    // Five rows: one blank SKU (skipped, uncounted), one resolvable (ok),
    // one with no catalog variant (miss), one whose variant has no
    // inventory item (miss), one whose variant read fails (err).
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "data": [
                { "SKU": "",         "Qta": 1 },
                { "SKU": "ab-12",    "Qta": 3 },
                { "SKU": "MISS-1",   "Qta": 1 },
                { "SKU": "NOITEM-1", "Qta": 2 },
                { "SKU": "ERR-1",    "Qta": 5 }
            ]
        })))
        .mount(&storegest_server)
        .await;

    // SKU lookups resolve against the normalized form.
    mount_variant_lookup(&shopify_server, "AB-12", 101).await;
    mount_variant_lookup(&shopify_server, "NOITEM-1", 303).await;
    mount_variant_lookup(&shopify_server, "ERR-1", 202).await;
    Mock::given(method("POST"))
        .and(path("/graphql.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            &json!({"data": {"productVariants": {"nodes": []}}}),
        ))
        .mount(&shopify_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/variants/101.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "variant": { "id": 101, "sku": "AB-12", "price": "19.90", "inventory_item_id": 9001 }
        })))
        .mount(&shopify_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/variants/303.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "variant": { "id": 303, "sku": "NOITEM-1", "price": "5.00", "inventory_item_id": null }
        })))
        .mount(&shopify_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/variants/202.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&shopify_server)
        .await;

    // Exactly one absolute push, for the resolvable row.
    Mock::given(method("POST"))
        .and(path("/inventory_levels/set.json"))
        .and(body_partial_json(json!({
            "inventory_item_id": 9001,
            "location_id": 555,
            "available": 3
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({"inventory_level": {}})))
        .expect(1)
        .mount(&shopify_server)
        .await;

    let shopify = shopify_client(&shopify_server);
    let storegest = storegest_client(&storegest_server);
    let summary = run_stock_sync(&shopify, &storegest, 555, StockWindow::Full)
        .await
        .unwrap();

    assert_eq!(
        summary,
        StockSummary {
            rows: 5,
            ok: 1,
            miss: 2,
            err: 1,
        }
    );
}

#[tokio::test]
async fn full_window_omits_time_parameter() {
    let shopify_server = MockServer::start().await;
    let storegest_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_string_contains("time="))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({ "data": [] })))
        .expect(0)
        .mount(&storegest_server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("act=qta"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({ "data": [] })))
        .expect(1)
        .mount(&storegest_server)
        .await;

    let shopify = shopify_client(&shopify_server);
    let storegest = storegest_client(&storegest_server);
    let summary = run_stock_sync(&shopify, &storegest, 555, StockWindow::Full)
        .await
        .unwrap();
    assert_eq!(summary.rows, 0);
}

#[tokio::test]
async fn windowed_pull_includes_epoch_lower_bound() {
    let shopify_server = MockServer::start().await;
    let storegest_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_string_contains("act=qta"))
        .and(body_string_contains("time="))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({ "data": [] })))
        .expect(1)
        .mount(&storegest_server)
        .await;

    let shopify = shopify_client(&shopify_server);
    let storegest = storegest_client(&storegest_server);
    let summary = run_stock_sync(&shopify, &storegest, 555, StockWindow::SinceMinutes(15))
        .await
        .unwrap();
    assert_eq!(summary.rows, 0);
}

#[tokio::test]
async fn failed_quantity_pull_aborts_the_run() {
    let shopify_server = MockServer::start().await;
    let storegest_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&storegest_server)
        .await;

    let shopify = shopify_client(&shopify_server);
    let storegest = storegest_client(&storegest_server);
    let result = run_stock_sync(&shopify, &storegest, 555, StockWindow::Full).await;
    assert!(result.is_err());
}
