//! 产品资源：模型、校验、仓储、服务、处理器，以及客户端页面组件

pub mod client;
pub mod handler;
pub mod model;
pub mod page;
pub mod repository;
pub mod service;
pub mod validation;

use axum::{
    routing::{get, put},
    Router,
};

use handler::{create_product, delete_product, list_products, update_product, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/:id", put(update_product).delete(delete_product))
}
