//! 产品列表页面组件
//!
//! 页面只持有当前页数据和弹窗的临时状态，所有持久化都交给 [`ProductsApi`]，
//! 成功后用服务端回传的列表整体替换本地数据。

use askama::Template;
use serde::{Deserialize, Serialize};

use super::client::{ApiError, ProductsApi};
use super::model::{to_storage_scale, Product, PER_PAGE};
use crate::core::{error::FieldErrors, response::Paginated};

/// 页面组件名，出现在页面载荷中
pub const COMPONENT: &str = "Products/Index";
pub const DELETE_CONFIRMATION: &str = "Are you sure you want to delete this product?";

/// 页面 props
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexProps {
    pub products: Paginated<Product>,
}

/// 弹窗模式：新建，或编辑某条记录
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormMode {
    #[default]
    Create,
    Edit(i64),
}

/// 表单数据，保持用户输入的原样
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFormData {
    pub name: String,
    pub description: String,
    pub price: String,
}

impl From<&Product> for ProductFormData {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone().unwrap_or_default(),
            price: to_storage_scale(product.price).to_string(),
        }
    }
}

/// 一次提交要发出的请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitRequest {
    Create(ProductFormData),
    Update(i64, ProductFormData),
}

#[derive(Debug, Clone)]
pub struct ProductsPage {
    listing: Paginated<Product>,
    dialog_open: bool,
    mode: FormMode,
    form: ProductFormData,
    errors: FieldErrors,
    submitting: bool,
    scroll_top: u32,
    flash: Option<String>,
}

impl Default for ProductsPage {
    fn default() -> Self {
        Self::new(Paginated::empty(PER_PAGE))
    }
}

impl ProductsPage {
    pub fn new(listing: Paginated<Product>) -> Self {
        Self {
            listing,
            dialog_open: false,
            mode: FormMode::Create,
            form: ProductFormData::default(),
            errors: FieldErrors::new(),
            submitting: false,
            scroll_top: 0,
            flash: None,
        }
    }

    /// 拉取指定页并构造页面
    pub async fn load<A: ProductsApi + ?Sized>(api: &A, page: u32) -> Result<Self, ApiError> {
        Ok(Self::new(api.list(page).await?))
    }

    pub fn listing(&self) -> &Paginated<Product> {
        &self.listing
    }

    pub fn is_dialog_open(&self) -> bool {
        self.dialog_open
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn form(&self) -> &ProductFormData {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ProductFormData {
        &mut self.form
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn scroll_top(&self) -> u32 {
        self.scroll_top
    }

    pub fn set_scroll_top(&mut self, offset: u32) {
        self.scroll_top = offset;
    }

    pub fn flash(&self) -> Option<&str> {
        self.flash.as_deref()
    }

    pub fn open_create(&mut self) {
        self.errors.clear();
        self.mode = FormMode::Create;
        self.form = ProductFormData::default();
        self.dialog_open = true;
    }

    pub fn open_edit(&mut self, product: &Product) {
        self.errors.clear();
        self.mode = FormMode::Edit(product.id);
        self.form = ProductFormData::from(product);
        self.dialog_open = true;
    }

    /// 取消按钮；表单内容保留
    pub fn close_dialog(&mut self) {
        self.dialog_open = false;
    }

    /// 进入提交中状态并给出要发的请求；已有请求在途时返回 None
    pub fn begin_submit(&mut self) -> Option<SubmitRequest> {
        if self.submitting {
            return None;
        }
        self.submitting = true;
        self.flash = None;

        let form = self.form.clone();
        Some(match self.mode {
            FormMode::Create => SubmitRequest::Create(form),
            FormMode::Edit(id) => SubmitRequest::Update(id, form),
        })
    }

    pub fn finish_submit(&mut self, result: Result<Paginated<Product>, ApiError>) {
        self.submitting = false;
        match result {
            Ok(listing) => {
                self.listing = listing;
                self.form = ProductFormData::default();
                self.errors.clear();
                self.dialog_open = false;
                self.mode = FormMode::Create;
                self.scroll_top = 0;
            }
            Err(ApiError::Validation(errors)) => self.errors = errors,
            Err(other) => self.flash = Some(other.to_string()),
        }
    }

    pub async fn submit<A: ProductsApi + ?Sized>(&mut self, api: &A) {
        let Some(request) = self.begin_submit() else {
            return;
        };
        let page = self.listing.current_page;
        let result = match &request {
            SubmitRequest::Create(form) => api.create(form, page).await,
            SubmitRequest::Update(id, form) => api.update(*id, form, page).await,
        };
        self.finish_submit(result);
    }

    /// 确认后删除；返回是否真的发出了请求
    ///
    /// 失败时保留当前列表，不在本地移除该行。
    pub async fn delete<A, F>(&mut self, api: &A, id: i64, confirm: F) -> bool
    where
        A: ProductsApi + ?Sized,
        F: FnOnce(&str) -> bool,
    {
        if !confirm(DELETE_CONFIRMATION) {
            return false;
        }

        match api.delete(id, self.listing.current_page).await {
            Ok(listing) => {
                self.listing = listing;
                self.flash = None;
            }
            Err(err) => self.flash = Some(err.to_string()),
        }
        true
    }

    pub async fn reload<A: ProductsApi + ?Sized>(&mut self, api: &A) -> Result<(), ApiError> {
        self.listing = api.list(self.listing.current_page).await?;
        Ok(())
    }

    pub fn render(&self) -> Result<String, askama::Error> {
        let dialog = self.dialog_open.then(|| self.dialog_view());
        let rows = self
            .listing
            .data
            .iter()
            .map(|product| RowView {
                id: product.id,
                name: &product.name,
                description: product.description.as_deref().unwrap_or(""),
                price: to_storage_scale(product.price).to_string(),
            })
            .collect();

        IndexTemplate {
            flash: self.flash.as_deref(),
            dialog,
            rows,
            confirm_message: DELETE_CONFIRMATION,
            current_page: self.listing.current_page,
            last_page: self.listing.last_page,
            total: self.listing.total,
        }
        .render()
    }

    fn dialog_view(&self) -> DialogView<'_> {
        let (mode, title, description, method, action) = match self.mode {
            FormMode::Create => (
                "create",
                "Add New Product",
                "Enter the product details below. Click save when done.",
                "post",
                "/products".to_string(),
            ),
            FormMode::Edit(id) => (
                "edit",
                "Edit Product",
                "Make changes to your product here. Click save when done.",
                "put",
                format!("/products/{id}"),
            ),
        };

        DialogView {
            mode,
            title,
            description,
            method,
            action,
            submitting: self.submitting,
            fields: vec![
                self.field_view("name", "Name", "Laptop", &self.form.name),
                self.field_view(
                    "description",
                    "Description",
                    "A powerful device",
                    &self.form.description,
                ),
                self.field_view("price", "Price", "0.00", &self.form.price),
            ],
        }
    }

    fn field_view<'a>(
        &'a self,
        id: &'static str,
        label: &'static str,
        placeholder: &'static str,
        value: &'a str,
    ) -> FieldView<'a> {
        FieldView {
            id,
            label,
            placeholder,
            value,
            error: self.errors.get(id).map(String::as_str),
        }
    }
}

struct FieldView<'a> {
    id: &'static str,
    label: &'static str,
    placeholder: &'static str,
    value: &'a str,
    error: Option<&'a str>,
}

struct DialogView<'a> {
    mode: &'static str,
    title: &'static str,
    description: &'static str,
    method: &'static str,
    action: String,
    submitting: bool,
    fields: Vec<FieldView<'a>>,
}

struct RowView<'a> {
    id: i64,
    name: &'a str,
    description: &'a str,
    price: String,
}

#[derive(Template)]
#[template(path = "products/index.html")]
struct IndexTemplate<'a> {
    flash: Option<&'a str>,
    dialog: Option<DialogView<'a>>,
    rows: Vec<RowView<'a>>,
    confirm_message: &'static str,
    current_page: u32,
    last_page: u32,
    total: u64,
}
