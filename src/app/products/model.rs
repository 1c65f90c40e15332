//! 产品数据模型

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// 价格上限（含）
pub const MAX_PRICE: Decimal = Decimal::from_parts(49_999_999, 0, 0, false, 2);
/// 列表每页条数
pub const PER_PAGE: u32 = 10;

/// 持久化的产品记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 允许从请求写入的字段，且已经过校验
///
/// 仓储层只接受这个类型，请求里的其他键到不了存储。
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct ProductFields {
    #[validate(
        custom(function = "validate_name_present"),
        length(max = 255, message = "The name field must not be greater than 255 characters.")
    )]
    pub name: String,
    pub description: Option<String>,
    #[validate(custom(function = "validate_price_range"))]
    pub price: Decimal,
}

impl ProductFields {
    /// 存储精度为两位小数
    pub fn with_storage_scale(mut self) -> Self {
        self.price = to_storage_scale(self.price);
        self
    }
}

/// NUMERIC(8, 2) 的取值形式：四舍五入到两位并固定 scale
pub fn to_storage_scale(price: Decimal) -> Decimal {
    let mut price = price.round_dp(2);
    price.rescale(2);
    price
}

fn message_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

fn validate_name_present(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(message_error("required", "The name field is required."));
    }
    Ok(())
}

fn validate_price_range(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(message_error("min", "The price field must be at least 0."));
    }
    if *price > MAX_PRICE {
        return Err(message_error(
            "max",
            "The price field must not be greater than 499999.99.",
        ));
    }
    Ok(())
}
