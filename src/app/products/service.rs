//! 产品业务服务

use std::sync::Arc;

use tracing::info;

use super::model::{Product, PER_PAGE};
use super::repository::ProductRepository;
use super::validation::{rejected, ProductInput};
use crate::core::{error::CoreError, response::Paginated};

#[derive(Clone)]
pub struct ProductService {
    repo: Arc<dyn ProductRepository>,
}

impl ProductService {
    pub fn new(repo: Arc<dyn ProductRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, page: u32) -> Result<Paginated<Product>, CoreError> {
        let page = page.max(1);
        let (products, total) = self.repo.page(page, PER_PAGE).await?;
        Ok(Paginated::new(products, page, PER_PAGE, total))
    }

    pub async fn create_product(&self, input: ProductInput) -> Result<Product, CoreError> {
        let fields = input.into_fields().map_err(rejected)?;
        let product = self.repo.insert(&fields).await?;

        info!("Created product: {} ({})", product.name, product.id);
        Ok(product)
    }

    /// 先校验再查存在性
    pub async fn update_product(&self, id: i64, input: ProductInput) -> Result<Product, CoreError> {
        let fields = input.into_fields().map_err(rejected)?;
        let product = self
            .repo
            .update(id, &fields)
            .await?
            .ok_or_else(|| not_found(id))?;

        info!("Updated product: {} ({})", product.name, product.id);
        Ok(product)
    }

    pub async fn delete_product(&self, id: i64) -> Result<(), CoreError> {
        if !self.repo.delete(id).await? {
            return Err(not_found(id));
        }

        info!("Deleted product: {}", id);
        Ok(())
    }

    pub async fn health(&self) -> Result<(), CoreError> {
        self.repo.ping().await
    }
}

fn not_found(id: impl std::fmt::Display) -> CoreError {
    CoreError::NotFound(format!("Product {} not found", id))
}

/// 路径中的 id 不是整数时同样视为不存在
pub fn parse_id(raw: &str) -> Result<i64, CoreError> {
    raw.parse::<i64>().map_err(|_| not_found(raw))
}
