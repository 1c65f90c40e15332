//! 产品仓储：Postgres 与内存两种实现

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::model::{Product, ProductFields};
use crate::config::{DatabaseConfig, StorageBackend};
use crate::core::error::CoreError;

/// 单表存储接口，每个操作最多触及一行
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// 按创建时间倒序取一页，同时返回总数
    async fn page(&self, page: u32, per_page: u32) -> Result<(Vec<Product>, u64), CoreError>;
    async fn insert(&self, fields: &ProductFields) -> Result<Product, CoreError>;
    /// 整体替换三个可编辑字段；记录不存在时返回 None
    async fn update(&self, id: i64, fields: &ProductFields) -> Result<Option<Product>, CoreError>;
    /// 记录不存在时返回 false
    async fn delete(&self, id: i64) -> Result<bool, CoreError>;
    async fn ping(&self) -> Result<(), CoreError>;
}

fn offset(page: u32, per_page: u32) -> u64 {
    u64::from(page.saturating_sub(1)) * u64::from(per_page)
}

#[derive(Debug, Default)]
struct MemoryTable {
    next_id: i64,
    rows: Vec<Product>,
}

/// 进程内存储，用于本地运行和测试
#[derive(Debug, Default)]
pub struct MemoryProductRepository {
    table: RwLock<MemoryTable>,
}

impl MemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for MemoryProductRepository {
    async fn page(&self, page: u32, per_page: u32) -> Result<(Vec<Product>, u64), CoreError> {
        let table = self.table.read().await;
        let mut rows: Vec<&Product> = table.rows.iter().collect();
        rows.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let skip = usize::try_from(offset(page, per_page)).unwrap_or(usize::MAX);
        let data = rows
            .into_iter()
            .skip(skip)
            .take(per_page as usize)
            .cloned()
            .collect();

        Ok((data, table.rows.len() as u64))
    }

    async fn insert(&self, fields: &ProductFields) -> Result<Product, CoreError> {
        let mut table = self.table.write().await;
        table.next_id += 1;
        let now = Utc::now();
        let product = Product {
            id: table.next_id,
            name: fields.name.clone(),
            description: fields.description.clone(),
            price: fields.price,
            created_at: now,
            updated_at: now,
        };
        table.rows.push(product.clone());
        Ok(product)
    }

    async fn update(&self, id: i64, fields: &ProductFields) -> Result<Option<Product>, CoreError> {
        let mut table = self.table.write().await;
        let Some(product) = table.rows.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        product.name = fields.name.clone();
        product.description = fields.description.clone();
        product.price = fields.price;
        product.updated_at = Utc::now();
        Ok(Some(product.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, CoreError> {
        let mut table = self.table.write().await;
        let before = table.rows.len();
        table.rows.retain(|p| p.id != id);
        Ok(table.rows.len() != before)
    }

    async fn ping(&self) -> Result<(), CoreError> {
        Ok(())
    }
}

#[cfg(feature = "database")]
pub use postgres::PgProductRepository;

#[cfg(feature = "database")]
mod postgres {
    use async_trait::async_trait;
    use sqlx::postgres::PgPool;

    use super::{offset, ProductRepository};
    use crate::app::products::model::{Product, ProductFields};
    use crate::core::error::CoreError;

    /// 基于 sqlx 连接池的实现
    #[derive(Debug, Clone)]
    pub struct PgProductRepository {
        pool: PgPool,
    }

    impl PgProductRepository {
        pub fn new(pool: PgPool) -> Self {
            Self { pool }
        }
    }

    #[async_trait]
    impl ProductRepository for PgProductRepository {
        async fn page(&self, page: u32, per_page: u32) -> Result<(Vec<Product>, u64), CoreError> {
            let products = sqlx::query_as::<_, Product>(
                "SELECT * FROM products ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
            )
            .bind(i64::from(per_page))
            .bind(i64::try_from(offset(page, per_page)).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;

            let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
                .fetch_one(&self.pool)
                .await?;

            Ok((products, u64::try_from(total.0).unwrap_or(0)))
        }

        async fn insert(&self, fields: &ProductFields) -> Result<Product, CoreError> {
            let product = sqlx::query_as::<_, Product>(
                "INSERT INTO products (name, description, price) VALUES ($1, $2, $3) RETURNING *",
            )
            .bind(&fields.name)
            .bind(&fields.description)
            .bind(fields.price)
            .fetch_one(&self.pool)
            .await?;
            Ok(product)
        }

        async fn update(
            &self,
            id: i64,
            fields: &ProductFields,
        ) -> Result<Option<Product>, CoreError> {
            let product = sqlx::query_as::<_, Product>(
                r#"
                UPDATE products
                SET name = $1, description = $2, price = $3, updated_at = NOW()
                WHERE id = $4
                RETURNING *
                "#,
            )
            .bind(&fields.name)
            .bind(&fields.description)
            .bind(fields.price)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
            Ok(product)
        }

        async fn delete(&self, id: i64) -> Result<bool, CoreError> {
            let result = sqlx::query("DELETE FROM products WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;
            Ok(result.rows_affected() > 0)
        }

        async fn ping(&self) -> Result<(), CoreError> {
            sqlx::query("SELECT 1").execute(&self.pool).await?;
            Ok(())
        }
    }
}

/// 按配置打开存储后端
pub async fn open_repository(
    config: &DatabaseConfig,
) -> Result<Arc<dyn ProductRepository>, CoreError> {
    match config.backend {
        StorageBackend::Memory => Ok(Arc::new(MemoryProductRepository::new())),
        #[cfg(feature = "database")]
        StorageBackend::Postgres => {
            use crate::infrastructure::database::DatabaseManager;

            let url = config.url.as_deref().ok_or_else(|| {
                CoreError::Internal("postgres backend requires a database url".to_string())
            })?;
            let manager = DatabaseManager::new(url, config).await?;
            manager.ensure_schema().await?;
            Ok(Arc::new(PgProductRepository::new(manager.get_pool().clone())))
        }
        #[cfg(not(feature = "database"))]
        StorageBackend::Postgres => Err(CoreError::Internal(
            "built without the `database` feature; postgres backend unavailable".to_string(),
        )),
    }
}
