//! Helpers shared by the integration suites

#![allow(dead_code)]

use apiary_server::{Config, DbService, ServerState};
use axum::body::Body;
use http::{Request, Response, header};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::Value;
use shared::models::{
    Customer, OrderCreate, OrderLineInput, PaymentMethod, Product, ProductCategory, ProductCreate,
    UnitOfMeasure,
};

pub const ADMIN_EMAIL: &str = "admin@apicola.com";
pub const ADMIN_PASSWORD: &str = "admin123";

/// Fresh in-memory state with the bootstrap admin
pub async fn test_state() -> ServerState {
    let db = DbService::in_memory().await.expect("in-memory database");
    let state = ServerState::new(Config::for_tests(), db);
    state.bootstrap().await.expect("bootstrap");
    state
}

pub async fn product(state: &ServerState, name: &str, price: i64, stock: i64) -> Product {
    apiary_server::catalog::create_product(
        &state.pool,
        ProductCreate {
            name: name.into(),
            description: String::new(),
            price: Decimal::from(price),
            stock,
            category: ProductCategory::Honey,
            unit: UnitOfMeasure::Kg,
            image: None,
        },
    )
    .await
    .expect("create product")
}

pub async fn stock_of(state: &ServerState, id: i64) -> i64 {
    apiary_server::catalog::get_product(&state.pool, id)
        .await
        .expect("product")
        .stock
}

pub fn customer() -> Customer {
    Customer {
        name: "Ana Gómez".into(),
        email: "ana@example.com".into(),
        phone: "3001234567".into(),
        address: "Calle 10 # 5-20".into(),
    }
}

pub fn order_payload(lines: &[(i64, i64)]) -> OrderCreate {
    OrderCreate {
        customer: customer(),
        items: lines
            .iter()
            .map(|&(product_id, quantity)| OrderLineInput {
                product_id,
                quantity,
            })
            .collect(),
        payment_method: PaymentMethod::Cash,
        notes: None,
    }
}

// ========== HTTP helpers ==========

pub fn json_request(method: &str, uri: &str, body: &Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("request")
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}
