//! 请求载荷 -> 已校验字段
//!
//! 创建与更新共用同一套规则。

use std::str::FromStr;

use rust_decimal::{prelude::FromPrimitive, Decimal};
use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

use super::model::ProductFields;
use crate::core::error::{CoreError, FieldErrors};

const NAME_REQUIRED: &str = "The name field is required.";
const NAME_STRING: &str = "The name field must be a string.";
const DESCRIPTION_STRING: &str = "The description field must be a string.";
const PRICE_REQUIRED: &str = "The price field is required.";
const PRICE_NUMERIC: &str = "The price field must be a number.";

/// 规则的检查顺序，422 的 message 取这个顺序里第一个出错的字段
const FIELD_ORDER: [&str; 3] = ["name", "description", "price"];

/// 原始请求载荷
///
/// 字段保持为 JSON 值，类型错误按字段报告而不是整体拒绝。
/// 只声明可编辑的三个字段，其他键在反序列化时被丢弃。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductInput {
    pub name: Option<Value>,
    pub description: Option<Value>,
    pub price: Option<Value>,
}

impl ProductInput {
    pub fn into_fields(self) -> Result<ProductFields, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = match text(self.name) {
            Ok(name) => name.unwrap_or_default(),
            Err(()) => {
                errors.insert("name".to_string(), NAME_STRING.to_string());
                String::new()
            }
        };

        let description = match text(self.description) {
            Ok(description) => description,
            Err(()) => {
                errors.insert("description".to_string(), DESCRIPTION_STRING.to_string());
                None
            }
        };

        let price = match number(self.price) {
            Ok(Some(price)) => price,
            Ok(None) => {
                errors.insert("price".to_string(), PRICE_REQUIRED.to_string());
                Decimal::ZERO
            }
            Err(()) => {
                errors.insert("price".to_string(), PRICE_NUMERIC.to_string());
                Decimal::ZERO
            }
        };

        let fields = ProductFields {
            name,
            description,
            price,
        };

        if let Err(invalid) = fields.validate() {
            for (field, field_errors) in invalid.field_errors() {
                let message = field_errors
                    .iter()
                    .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| format!("The {field} field is invalid."));
                errors.entry(field.to_string()).or_insert(message);
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(fields.with_storage_scale())
    }
}

/// 字段错误 -> 422
pub fn rejected(errors: FieldErrors) -> CoreError {
    let message = FIELD_ORDER
        .iter()
        .find_map(|field| errors.get(*field))
        .or_else(|| errors.values().next())
        .cloned()
        .unwrap_or_else(|| "The given data was invalid.".to_string());
    CoreError::Validation { message, errors }
}

/// 字符串字段：去掉首尾空白，空串视为缺失
fn text(value: Option<Value>) -> Result<Option<String>, ()> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
        }
        Some(_) => Err(()),
    }
}

/// 数值字段：接受 JSON 数字或数字字符串
fn number(value: Option<Value>) -> Result<Option<Decimal>, ()> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            parse_decimal(trimmed).map(Some)
        }
        Some(Value::Number(n)) => parse_decimal(&n.to_string()).map(Some),
        Some(_) => Err(()),
    }
}

/// 先判断是不是有限数字，再换成 Decimal
///
/// Decimal 装不下的值不算非数字：过大或过小的夹到 MAX/MIN 交给范围检查，
/// 精度过高的按 f64 近似，之后统一四舍五入到两位。
fn parse_decimal(s: &str) -> Result<Decimal, ()> {
    if s.contains('_') {
        return Err(());
    }
    let approx = s.parse::<f64>().map_err(|_| ())?;
    if !approx.is_finite() {
        return Err(());
    }

    let exact = Decimal::from_str(s).or_else(|_| Decimal::from_scientific(s));
    Ok(match exact {
        Ok(value) => value,
        Err(_) => match Decimal::from_f64(approx) {
            Some(value) => value,
            // 比 Decimal 最小精度还小，只保留符号
            None if approx.abs() < 1.0 && approx < 0.0 => Decimal::new(-1, 28),
            None if approx.abs() < 1.0 => Decimal::ZERO,
            None if approx.is_sign_negative() => Decimal::MIN,
            None => Decimal::MAX,
        },
    })
}
