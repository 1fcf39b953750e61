//! HTTP-contract tests for the API client, run against a mock backend.

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use stocklens::client::ApiClient;
use stocklens::config::AppConfig;
use stocklens::errors::ClientError;
use stocklens::models::{MovementType, PasswordChange, StockUpdate};
use stocklens::stock;

fn client_for(server: &MockServer) -> ApiClient {
    let cfg = AppConfig {
        api_base_url: format!("{}/api", server.uri()),
        ..AppConfig::default()
    };
    ApiClient::new(&cfg).unwrap()
}

fn product_json(id: i64, sku: &str, qty: i64, min: i64) -> serde_json::Value {
    json!({
        "product_id": id,
        "sku": sku,
        "product_name": format!("Product {}", sku),
        "description": null,
        "category": "Hardware",
        "supplier": "Acme",
        "unit_price": "2.50",
        "quantity_in_stock": qty,
        "min_stock_level": min,
        "unit_of_measure": "pcs",
        "is_low_stock": qty <= min,
        "created_at": "2026-01-15T10:30:00Z"
    })
}

#[tokio::test]
async fn list_products_unwraps_the_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "products": [product_json(1, "A1", 5, 10), product_json(2, "B2", 50, 10)],
            "total": 2
        })))
        .mount(&server)
        .await;

    let products = client_for(&server).list_products().await.unwrap();
    assert_eq!(products.len(), 2);
    assert_eq!(products[0].sku, "A1");
    assert!(products[0].is_low_stock);
    assert_eq!(products[1].quantity_in_stock, 50);
}

#[tokio::test]
async fn get_product_unwraps_the_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products/7"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "product": product_json(7, "G7", 3, 5) })),
        )
        .mount(&server)
        .await;

    let product = client_for(&server).get_product(7).await.unwrap();
    assert_eq!(product.product_id, 7);
    assert_eq!(product.sku, "G7");
}

#[tokio::test]
async fn backend_error_message_is_surfaced_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/products/1/stock"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "Insufficient stock. Current stock: 3, requested: 10"
        })))
        .mount(&server)
        .await;

    let update = StockUpdate::new(MovementType::StockOut, 10);
    let err = client_for(&server)
        .update_stock(1, &update)
        .await
        .unwrap_err();
    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status.as_u16(), 400);
            assert_eq!(message, "Insufficient stock. Current stock: 3, requested: 10");
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn stock_update_sends_kebab_case_movement_type() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/products/3/stock"))
        .and(body_json(json!({
            "movement_type": "stock-in",
            "quantity": 50,
            "notes": "Quick update from reports"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Stock updated successfully",
            "movement": {
                "movement_type": "stock-in",
                "quantity": 50,
                "previous_quantity": 10,
                "new_quantity": 60
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ack = stock::quick_update(&client_for(&server), 3, "+50")
        .await
        .unwrap();
    let movement = ack.movement.unwrap();
    assert_eq!(movement.movement_type, MovementType::StockIn);
    assert_eq!(movement.previous_quantity, 10);
    assert_eq!(movement.new_quantity, 60);
}

#[tokio::test]
async fn malformed_quick_token_never_reaches_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/products/3/stock"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = stock::quick_update(&client_for(&server), 3, "abc")
        .await
        .unwrap_err();
    assert!(err.is_client_side());
    server.verify().await;
}

#[tokio::test]
async fn movements_come_back_in_api_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products/5/movements"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "movements": [
                {
                    "movement_id": 12,
                    "product_id": 5,
                    "movement_type": "stock-out",
                    "quantity": 2,
                    "previous_quantity": 10,
                    "new_quantity": 8,
                    "created_at": "2026-02-02T08:00:00Z"
                },
                {
                    "movement_id": 11,
                    "product_id": 5,
                    "movement_type": "stock-in",
                    "quantity": 10,
                    "previous_quantity": 0,
                    "new_quantity": 10,
                    "reference_number": "PO-1001",
                    "notes": "Initial delivery",
                    "created_at": "2026-02-01T08:00:00Z"
                }
            ],
            "total": 2
        })))
        .mount(&server)
        .await;

    let movements = client_for(&server).list_movements(5).await.unwrap();
    // Newest-appearing-first as returned; no client-side re-sort
    assert_eq!(movements[0].movement_id, Some(12));
    assert_eq!(movements[1].reference_number.as_deref(), Some("PO-1001"));
}

#[tokio::test]
async fn categories_and_suppliers_are_plain_string_lists() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/categories"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "categories": ["Food", "Hardware"] })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/suppliers"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "suppliers": ["Acme"] })),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_eq!(client.list_categories().await.unwrap(), vec!["Food", "Hardware"]);
    assert_eq!(client.list_suppliers().await.unwrap(), vec!["Acme"]);
}

#[tokio::test]
async fn bearer_token_is_attached_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .and(header("authorization", "Bearer sekrit"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "products": [], "total": 0 })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let cfg = AppConfig {
        api_base_url: format!("{}/api", server.uri()),
        auth_token: Some("sekrit".to_string()),
        ..AppConfig::default()
    };
    let client = ApiClient::new(&cfg).unwrap();
    assert!(client.list_products().await.unwrap().is_empty());
}

#[tokio::test]
async fn change_password_puts_the_payload() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/auth/change-password"))
        .and(body_json(json!({
            "current_password": "0ldPass!word",
            "new_password": "Str0ng!pass"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Password changed successfully"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ack = client_for(&server)
        .change_password(&PasswordChange {
            current_password: "0ldPass!word".to_string(),
            new_password: "Str0ng!pass".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(ack.message, "Password changed successfully");
}

#[tokio::test]
async fn non_json_error_body_is_used_as_is() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(502).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let err = client_for(&server).list_products().await.unwrap_err();
    assert_eq!(err.user_message(), "upstream unavailable");
}
