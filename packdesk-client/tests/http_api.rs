// packdesk-client/tests/http_api.rs
// reqwest transport against a mock backend

use packdesk_client::{ClientConfig, ClientError, RestApi, WarehouseApi};
use rust_decimal::Decimal;
use serde_json::json;
use shared::{FulfillmentStatus, ItemPickUpdate, OrderStatusUpdate, PickStatus, SyncRequest};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer) -> ClientConfig {
    ClientConfig::new(format!("{}/api/v1/", server.uri()))
}

fn api(server: &MockServer) -> RestApi {
    RestApi::new(&config(server).with_csrf_token("tok123")).unwrap()
}

#[tokio::test]
async fn test_list_orders_decodes_wire_names() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/orders/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 4,
            "order_number": "O1042",
            "uma_status": "label_pending",
            "status": "Paid",
            "order_total": "59.90",
            "items": [{
                "id": 40,
                "code": "MUG-RED",
                "ean": "8590001",
                "quantity": "2.000",
                "uma_picked": "partially_picked"
            }],
            "uma_created_at": "2024-05-01T08:30:00Z"
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let orders = api(&server).list_orders().await.unwrap();

    assert_eq!(orders.len(), 1);
    let order = &orders[0];
    assert_eq!(order.number_suffix(), Some(1042));
    assert_eq!(order.fulfillment_status, FulfillmentStatus::LabelPending);
    assert_eq!(order.display_status.as_deref(), Some("Paid"));
    assert_eq!(order.items[0].quantity, Decimal::from(2));
    assert_eq!(order.items[0].pick_status, PickStatus::PartiallyPicked);
    assert!(order.created_at.is_some());
}

#[tokio::test]
async fn test_order_status_patch_carries_items_and_csrf() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/orders/4/"))
        .and(header("X-CSRFToken", "tok123"))
        .and(body_json(json!({
            "uma_status": "packed",
            "items": [{"id": 40, "uma_picked": "picked"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 4})))
        .expect(1)
        .mount(&server)
        .await;

    let update = OrderStatusUpdate::with_items(
        FulfillmentStatus::Packed,
        vec![ItemPickUpdate {
            id: 40,
            uma_picked: PickStatus::Picked,
        }],
    );
    api(&server).update_order_status(4, &update).await.unwrap();
}

#[tokio::test]
async fn test_item_status_patch() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/orders/4/items/40/status/"))
        .and(body_json(json!({"uma_picked": "not_picked"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    api(&server)
        .update_item_status(4, 40, PickStatus::NotPicked)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_sync_bodies() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/sync/"))
        .and(body_json(json!({"type": "orders_status", "orderids": [5, 6], "statusid": 21})))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/sync/"))
        .and(body_json(json!({"type": "orders", "creation_time_from": "2024-05-01"})))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let api = api(&server);
    api.trigger_sync(&SyncRequest::packed_orders(vec![5, 6])).await.unwrap();
    api.trigger_sync(&SyncRequest::Orders {
        creation_time_from: chrono::NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_get_requests_omit_csrf_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/stock-adjustments/"))
        .and(query_param("status", "pending"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 9,
            "variant": {"id": 11, "code": "MUG-RED", "product": 1},
            "adjustment_quantity": -3,
            "status": "pending"
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let adjustments = api(&server).list_pending_adjustments().await.unwrap();
    assert_eq!(adjustments[0].adjustment_quantity, -3);
    assert!(adjustments[0].is_pending());

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("X-CSRFToken").is_none());
}

#[tokio::test]
async fn test_stock_adjustment_endpoints() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/variants/MUG-RED/adjust_stock/"))
        .and(body_json(json!({"adjustment_quantity": 1})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"detail": "ok"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/products/MUG/adjust_stock/"))
        .and(body_json(json!({"adjustment_quantity": -2})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/stock-adjustments/9/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/stock-adjustments/sync/"))
        .and(header("X-CSRFToken", "tok123"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let api = api(&server);
    api.adjust_variant_stock("MUG-RED", 1).await.unwrap();
    api.adjust_product_stock("MUG", -2).await.unwrap();
    api.delete_adjustment(9).await.unwrap();
    api.sync_adjustments().await.unwrap();
}

#[tokio::test]
async fn test_stock_codes_are_path_escaped() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/variants/BOX%2F2%23A/adjust_stock/"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/products/50%25%3FOFF/adjust_stock/"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let api = api(&server);
    api.adjust_variant_stock("BOX/2#A", 1).await.unwrap();
    api.adjust_product_stock("50%?OFF", -1).await.unwrap();
}

#[tokio::test]
async fn test_status_codes_map_to_errors() {
    let server = MockServer::start().await;
    for (code, item) in [(401u16, 1), (403, 2), (404, 3), (400, 4), (500, 5)] {
        Mock::given(method("PATCH"))
            .and(path(format!("/api/v1/orders/1/items/{item}/status/")))
            .respond_with(ResponseTemplate::new(code).set_body_string("nope"))
            .mount(&server)
            .await;
    }

    let api = api(&server);
    let mut errors = Vec::new();
    for item in 1..=5 {
        errors.push(api.update_item_status(1, item, PickStatus::Picked).await.unwrap_err());
    }

    assert!(matches!(&errors[0], ClientError::Unauthorized));
    assert!(matches!(&errors[1], ClientError::Forbidden(body) if body == "nope"));
    assert!(matches!(&errors[2], ClientError::NotFound(_)));
    assert!(matches!(&errors[3], ClientError::Validation(_)));
    assert!(matches!(&errors[4], ClientError::Internal(msg) if msg.starts_with("500")));
}

#[tokio::test]
async fn test_malformed_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/products/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let err = api(&server).list_products().await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_csrf_token_read_from_cookie() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/orders/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Set-Cookie", "csrftoken=fromcookie; Path=/")
                .set_body_json(json!([])),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/stock-adjustments/sync/"))
        .and(header("X-CSRFToken", "fromcookie"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let api = RestApi::new(&config(&server).with_session_id("s1")).unwrap();
    api.list_orders().await.unwrap();
    api.sync_adjustments().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let cookies = requests[0]
        .headers
        .get("cookie")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(cookies.contains("sessionid=s1"));
}

#[test]
fn test_invalid_base_url_is_config_error() {
    let err = RestApi::new(&ClientConfig::new("not a url")).unwrap_err();
    assert!(matches!(err, ClientError::Config(_)));
}
