//! 产品资源处理器

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header::ACCEPT, header::REFERER, HeaderMap, Uri},
    response::{Html, IntoResponse, Json, Redirect, Response},
};
use serde::Deserialize;

use super::{
    page::{IndexProps, ProductsPage, COMPONENT},
    service::{parse_id, ProductService},
    validation::{rejected, ProductInput},
};
use crate::core::{error::CoreError, response::PagePayload};

/// 页面载荷响应的标记头
const INERTIA_HEADER: &str = "x-inertia";

/// 没有可用来源页时的重定向目标
const FALLBACK_LOCATION: &str = "/products";

#[derive(Clone)]
pub struct AppState {
    pub product_service: ProductService,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    page: Option<String>,
}

impl ListQuery {
    /// 缺失、非数字或 0 都按第 1 页处理
    fn page(&self) -> u32 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse::<u32>().ok())
            .filter(|p| *p > 0)
            .unwrap_or(1)
    }
}

pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Response, CoreError> {
    let listing = state.product_service.list(query.page()).await?;

    if wants_json(&headers) {
        let url = uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| FALLBACK_LOCATION.to_string());
        let payload = PagePayload::new(COMPONENT, IndexProps { products: listing }, url);
        let headers = [(INERTIA_HEADER, "true"), ("vary", "X-Inertia")];
        return Ok((headers, Json(payload)).into_response());
    }

    let html = ProductsPage::new(listing).render()?;
    Ok(Html(html).into_response())
}

pub async fn create_product(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ProductInput>, JsonRejection>,
) -> Result<Redirect, CoreError> {
    let Json(input) = payload.map_err(|e| CoreError::BadRequest(e.body_text()))?;
    state.product_service.create_product(input).await?;
    Ok(redirect_back(&headers))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    payload: Result<Json<ProductInput>, JsonRejection>,
) -> Result<Redirect, CoreError> {
    let Json(input) = payload.map_err(|e| CoreError::BadRequest(e.body_text()))?;

    // 校验先于 id 检查，非法 id 配非法载荷仍然是 422
    match parse_id(&id) {
        Ok(id) => {
            state.product_service.update_product(id, input).await?;
        }
        Err(not_found) => {
            input.into_fields().map_err(rejected)?;
            return Err(not_found);
        }
    }
    Ok(redirect_back(&headers))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Redirect, CoreError> {
    let id = parse_id(&id)?;
    state.product_service.delete_product(id).await?;
    Ok(redirect_back(&headers))
}

pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, CoreError> {
    state.product_service.health().await?;

    Ok(Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })))
}

fn wants_json(headers: &HeaderMap) -> bool {
    let inertia = headers
        .get(INERTIA_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("true"));
    let accepts_json = headers
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"));
    inertia || accepts_json
}

/// 303 回到来源页，只取 Referer 的 path + query，不会跳到站外
fn redirect_back(headers: &HeaderMap) -> Redirect {
    let target = headers
        .get(REFERER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<Uri>().ok())
        .and_then(|uri| uri.path_and_query().map(|pq| pq.as_str().to_string()))
        .filter(|path| path.starts_with('/') && !path.starts_with("//"))
        .unwrap_or_else(|| FALLBACK_LOCATION.to_string());
    Redirect::to(&target)
}
