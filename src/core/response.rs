//! 核心响应处理模块

use serde::{Deserialize, Serialize};

/// 页面数据载荷：组件名 + props + 当前 URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagePayload<P> {
    pub component: String,
    pub props: P,
    pub url: String,
}

impl<P> PagePayload<P> {
    pub fn new(component: impl Into<String>, props: P, url: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            props,
            url: url.into(),
        }
    }
}

/// 分页结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub current_page: u32,
    pub per_page: u32,
    pub total: u64,
    pub last_page: u32,
    /// 本页第一条记录的序号（从 1 开始），空页为 None
    pub from: Option<u64>,
    pub to: Option<u64>,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, current_page: u32, per_page: u32, total: u64) -> Self {
        let per_page = per_page.max(1);
        let last_page = total.div_ceil(u64::from(per_page)).max(1);
        let last_page = u32::try_from(last_page).unwrap_or(u32::MAX);

        let (from, to) = if data.is_empty() {
            (None, None)
        } else {
            let first = u64::from(current_page.saturating_sub(1)) * u64::from(per_page) + 1;
            (Some(first), Some(first + data.len() as u64 - 1))
        };

        Self {
            data,
            current_page,
            per_page,
            total,
            last_page,
            from,
            to,
        }
    }

    /// 空列表（尚未加载时使用）
    pub fn empty(per_page: u32) -> Self {
        Self::new(Vec::new(), 1, per_page, 0)
    }
}
