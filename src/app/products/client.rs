//! 页面组件使用的网络接口
//!
//! 变更请求成功时服务端回 303 指向来源页，这里跟随重定向取回刷新后的列表。

use async_trait::async_trait;
use reqwest::{
    header::{ACCEPT, LOCATION, REFERER},
    redirect::Policy,
    Client, Response, StatusCode, Url,
};

use super::model::Product;
use super::page::{IndexProps, ProductFormData};
use crate::core::{
    error::{ErrorResponse, FieldErrors, ValidationResponse},
    response::{PagePayload, Paginated},
};

/// 页面组件看到的失败
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("the given data was invalid")]
    Validation(FieldErrors),
    #[error("{0}")]
    NotFound(String),
    #[error("unexpected status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("request failed: {0}")]
    Transport(String),
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

/// 产品资源的网络操作，变更操作返回刷新后的列表
#[async_trait]
pub trait ProductsApi: Send + Sync {
    async fn list(&self, page: u32) -> Result<Paginated<Product>, ApiError>;
    async fn create(
        &self,
        form: &ProductFormData,
        page: u32,
    ) -> Result<Paginated<Product>, ApiError>;
    async fn update(
        &self,
        id: i64,
        form: &ProductFormData,
        page: u32,
    ) -> Result<Paginated<Product>, ApiError>;
    async fn delete(&self, id: i64, page: u32) -> Result<Paginated<Product>, ApiError>;
}

/// 基于 reqwest 的实现
#[derive(Debug, Clone)]
pub struct HttpProductsApi {
    client: Client,
    base: Url,
}

impl HttpProductsApi {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base = Url::parse(base_url).map_err(|e| ApiError::Transport(e.to_string()))?;
        let client = Client::builder().redirect(Policy::none()).build()?;
        Ok(Self { client, base })
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path)
            .map_err(|e| ApiError::Transport(e.to_string()))
    }

    fn page_url(&self, page: u32) -> Result<Url, ApiError> {
        self.url(&format!("/products?page={page}"))
    }

    async fn fetch_listing(&self, url: Url) -> Result<Paginated<Product>, ApiError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .header("x-inertia", "true")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from(response).await);
        }
        let payload: PagePayload<IndexProps> = response.json().await?;
        Ok(payload.props.products)
    }

    /// 变更请求的响应：303 则跟随，否则转成错误
    async fn follow(&self, response: Response) -> Result<Paginated<Product>, ApiError> {
        if !response.status().is_redirection() {
            return Err(error_from(response).await);
        }

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Decode("redirect without a location".to_string()))?;
        let target = self.url(location)?;
        self.fetch_listing(target).await
    }
}

#[async_trait]
impl ProductsApi for HttpProductsApi {
    async fn list(&self, page: u32) -> Result<Paginated<Product>, ApiError> {
        self.fetch_listing(self.page_url(page)?).await
    }

    async fn create(
        &self,
        form: &ProductFormData,
        page: u32,
    ) -> Result<Paginated<Product>, ApiError> {
        let response = self
            .client
            .post(self.url("/products")?)
            .header(ACCEPT, "application/json")
            .header(REFERER, self.page_url(page)?.as_str())
            .json(form)
            .send()
            .await?;
        self.follow(response).await
    }

    async fn update(
        &self,
        id: i64,
        form: &ProductFormData,
        page: u32,
    ) -> Result<Paginated<Product>, ApiError> {
        let response = self
            .client
            .put(self.url(&format!("/products/{id}"))?)
            .header(ACCEPT, "application/json")
            .header(REFERER, self.page_url(page)?.as_str())
            .json(form)
            .send()
            .await?;
        self.follow(response).await
    }

    async fn delete(&self, id: i64, page: u32) -> Result<Paginated<Product>, ApiError> {
        let response = self
            .client
            .delete(self.url(&format!("/products/{id}"))?)
            .header(ACCEPT, "application/json")
            .header(REFERER, self.page_url(page)?.as_str())
            .send()
            .await?;
        self.follow(response).await
    }
}

async fn error_from(response: Response) -> ApiError {
    let status = response.status();
    let body = match response.text().await {
        Ok(body) => body,
        Err(err) => return ApiError::from(err),
    };

    match status {
        StatusCode::UNPROCESSABLE_ENTITY => match serde_json::from_str::<ValidationResponse>(&body) {
            Ok(invalid) => ApiError::Validation(invalid.errors),
            Err(err) => ApiError::Decode(err.to_string()),
        },
        StatusCode::NOT_FOUND => {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.message)
                .unwrap_or_else(|_| "Not found".to_string());
            ApiError::NotFound(message)
        }
        other => {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            ApiError::Status {
                status: other.as_u16(),
                message,
            }
        }
    }
}
