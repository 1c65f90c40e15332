//! 路由级测试：直接驱动 Router，不经过网络

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use product_catalog::{
    app::products::{
        handler::AppState, model::Product, page::IndexProps,
        repository::MemoryProductRepository, service::ProductService,
    },
    build_router,
    config::HttpConfig,
    core::{
        error::{ErrorResponse, ValidationResponse},
        response::PagePayload,
    },
};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    let state = AppState {
        product_service: ProductService::new(Arc::new(MemoryProductRepository::new())),
    };
    build_router(state, &HttpConfig::default())
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::ACCEPT, "application/json")
        .header(header::REFERER, "http://localhost:8080/products?page=1")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn delete_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .header(header::REFERER, "http://localhost:8080/products")
        .body(Body::empty())
        .unwrap()
}

async fn body_json<T: serde::de::DeserializeOwned>(response: Response) -> T {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn list(app: &Router, page: u32) -> PagePayload<IndexProps> {
    let request = Request::builder()
        .uri(format!("/products?page={page}"))
        .header("x-inertia", "true")
        .body(Body::empty())
        .unwrap();
    let response = send(app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

async fn create(app: &Router, name: &str, price: &str) -> Response {
    send(
        app,
        json_request(
            Method::POST,
            "/products",
            json!({"name": name, "description": "", "price": price}),
        ),
    )
    .await
}

fn find<'a>(payload: &'a PagePayload<IndexProps>, name: &str) -> Option<&'a Product> {
    payload.props.products.data.iter().find(|p| p.name == name)
}

#[tokio::test]
async fn end_to_end_product_lifecycle() {
    let app = app();

    let response = send(
        &app,
        json_request(
            Method::POST,
            "/products",
            json!({"name": "Laptop", "description": "A powerful device", "price": "999.99"}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/products?page=1");

    let payload = list(&app, 1).await;
    assert_eq!(payload.component, "Products/Index");
    let laptop = find(&payload, "Laptop").unwrap().clone();
    assert_eq!(laptop.description.as_deref(), Some("A powerful device"));
    assert_eq!(laptop.price.to_string(), "999.99");

    let response = send(
        &app,
        json_request(
            Method::PUT,
            &format!("/products/{}", laptop.id),
            json!({"name": "Laptop", "description": "A powerful device", "price": "899.99"}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let payload = list(&app, 1).await;
    let updated = find(&payload, "Laptop").unwrap();
    assert_eq!(updated.id, laptop.id);
    assert_eq!(updated.created_at, laptop.created_at);
    assert_eq!(updated.price.to_string(), "899.99");

    let response = send(&app, delete_request(&format!("/products/{}", laptop.id))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/products");
    assert!(find(&list(&app, 1).await, "Laptop").is_none());

    let response = send(&app, delete_request(&format!("/products/{}", laptop.id))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error: ErrorResponse = body_json(response).await;
    assert_eq!(error.code, 404);
}

#[tokio::test]
async fn create_reports_every_invalid_field() {
    let app = app();

    let response = send(
        &app,
        json_request(Method::POST, "/products", json!({"description": 5, "price": "abc"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: ValidationResponse = body_json(response).await;
    assert_eq!(body.errors["name"], "The name field is required.");
    assert_eq!(body.errors["description"], "The description field must be a string.");
    assert_eq!(body.errors["price"], "The price field must be a number.");

    assert_eq!(list(&app, 1).await.props.products.total, 0);
}

#[tokio::test]
async fn price_and_name_boundaries() {
    let app = app();

    for price in ["0", "499999.99"] {
        assert_eq!(create(&app, "ok", price).await.status(), StatusCode::SEE_OTHER);
    }
    for price in ["-0.01", "500000.00"] {
        assert_eq!(
            create(&app, "bad", price).await.status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
    assert_eq!(
        create(&app, &"n".repeat(255), "1").await.status(),
        StatusCode::SEE_OTHER
    );
    assert_eq!(
        create(&app, &"n".repeat(256), "1").await.status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );
    assert_eq!(
        create(&app, "", "1").await.status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );

    assert_eq!(list(&app, 1).await.props.products.total, 3);
}

#[tokio::test]
async fn update_of_missing_id_is_not_found_and_changes_nothing() {
    let app = app();
    create(&app, "Mouse", "25").await;

    for uri in ["/products/999", "/products/abc"] {
        let response = send(
            &app,
            json_request(Method::PUT, uri, json!({"name": "Ghost", "price": "1"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    let payload = list(&app, 1).await;
    assert_eq!(payload.props.products.total, 1);
    assert!(find(&payload, "Ghost").is_none());
}

#[tokio::test]
async fn delete_of_missing_id_leaves_other_products_alone() {
    let app = app();
    create(&app, "Mouse", "25").await;
    create(&app, "Keyboard", "49.5").await;

    for uri in ["/products/999", "/products/abc"] {
        let response = send(&app, delete_request(uri)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
    }

    let payload = list(&app, 1).await;
    assert_eq!(payload.props.products.total, 2);
    assert!(find(&payload, "Mouse").is_some());
    assert!(find(&payload, "Keyboard").is_some());
}

#[tokio::test]
async fn validation_message_names_the_first_rule_that_failed() {
    let app = app();
    let response = send(
        &app,
        json_request(
            Method::POST,
            "/products",
            json!({"name": "", "description": 5, "price": "1"}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: ValidationResponse = body_json(response).await;
    assert_eq!(body.message, "The name field is required.");
    assert_eq!(body.errors.len(), 2);
}

#[tokio::test]
async fn page_payload_is_marked_for_inertia_clients() {
    let app = app();
    let request = Request::builder()
        .uri("/products")
        .header("x-inertia", "true")
        .body(Body::empty())
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-inertia"], "true");
    assert_eq!(response.headers()[header::VARY], "X-Inertia");
}

#[tokio::test]
async fn update_validates_before_checking_existence() {
    let app = app();
    let response = send(
        &app,
        json_request(Method::PUT, "/products/999", json!({"name": "", "price": "1"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn update_replaces_all_editable_fields() {
    let app = app();
    send(
        &app,
        json_request(
            Method::POST,
            "/products",
            json!({"name": "Desk", "description": "Oak", "price": "150"}),
        ),
    )
    .await;
    let desk = find(&list(&app, 1).await, "Desk").unwrap().clone();

    send(
        &app,
        json_request(
            Method::PUT,
            &format!("/products/{}", desk.id),
            json!({"name": "Standing desk", "price": "300", "id": 12345}),
        ),
    )
    .await;

    let payload = list(&app, 1).await;
    let updated = find(&payload, "Standing desk").unwrap();
    assert_eq!(updated.id, desk.id);
    assert_eq!(updated.description, None);
    assert_eq!(updated.price.to_string(), "300.00");
    assert!(updated.updated_at >= desk.updated_at);
}

#[tokio::test]
async fn listing_pages_ten_newest_first() {
    let app = app();
    for i in 0..12 {
        create(&app, &format!("item-{i:02}"), "1").await;
    }

    let first = list(&app, 1).await.props.products;
    assert_eq!(first.data.len(), 10);
    assert_eq!(first.total, 12);
    assert_eq!(first.per_page, 10);
    assert_eq!(first.last_page, 2);
    assert_eq!(first.data[0].name, "item-11");

    let second = list(&app, 2).await.props.products;
    let names: Vec<_> = second.data.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["item-01", "item-00"]);

    let beyond = list(&app, 9).await.props.products;
    assert!(beyond.data.is_empty());
    assert_eq!(beyond.current_page, 9);
}

#[tokio::test]
async fn listing_renders_html_by_default() {
    let app = app();
    create(&app, "Keyboard", "49.5").await;

    let response = send(
        &app,
        Request::builder().uri("/products").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/html")));
    assert!(response.headers().contains_key("x-request-id"));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("Keyboard"));
    assert!(html.contains("49.50"));
    assert!(html.contains("Add Product"));
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/products")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app();
    let response = send(
        &app,
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = body_json(response).await;
    assert_eq!(body["status"], "healthy");
}
