use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use rust_decimal::Decimal;

use crate::config::AppState;
use crate::dto::{
    ChangeProductStatusRequest, CreateProductRequest, ListProductsQuery, Paginated,
    ProductResponse, UpdateProductRequest,
};
use crate::interceptors::{ApiSuccess, AppError};
use crate::middleware::AuthUser;
use crate::models::role::PERM_VIEW_PRODUCT;
use crate::services::{role_service, ProductService};
use crate::utils::UploadedFile;

async fn ensure_can_view(state: &AppState, auth: &AuthUser) -> Result<(), AppError> {
    if role_service::has_permission(&state.db, auth.id(), PERM_VIEW_PRODUCT).await? {
        Ok(())
    } else {
        Err(AppError::Forbidden("You do not have permission to view products".to_string()))
    }
}

/// Text fields and image files collected from the multipart product form.
#[derive(Default)]
struct ProductForm {
    name: Option<String>,
    description: Option<String>,
    price: Option<String>,
    stock: Option<String>,
    active: Option<String>,
    images: Vec<UploadedFile>,
}

impl ProductForm {
    fn parsed_price(&self) -> Result<Option<Decimal>, AppError> {
        match self.price.as_deref() {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .parse::<Decimal>()
                .map(Some)
                .map_err(|_| AppError::field_validation("price", "Price must be a number")),
        }
    }

    fn parsed_stock(&self) -> Result<Option<i32>, AppError> {
        match self.stock.as_deref() {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .parse::<i32>()
                .map(Some)
                .map_err(|_| AppError::field_validation("stock", "Stock must be an integer")),
        }
    }

    fn parsed_active(&self) -> Result<Option<bool>, AppError> {
        match self.active.as_deref() {
            None | Some("") => Ok(None),
            Some("true") | Some("1") => Ok(Some(true)),
            Some("false") | Some("0") => Ok(Some(false)),
            Some(_) => Err(AppError::field_validation("active", "Active must be a boolean")),
        }
    }
}

async fn read_product_form(mut multipart: Multipart) -> Result<ProductForm, AppError> {
    let mut form = ProductForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "images" | "images[]" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let content_type = field.content_type().unwrap_or("").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read image: {}", e)))?;
                form.images.push(UploadedFile { file_name, content_type, bytes });
            }
            other => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read field {}: {}", other, e)))?;
                match other {
                    "name" => form.name = Some(text),
                    "description" => form.description = Some(text),
                    "price" => form.price = Some(text),
                    "stock" => form.stock = Some(text),
                    "active" => form.active = Some(text),
                    _ => {}
                }
            }
        }
    }

    Ok(form)
}

pub async fn list_products(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<ListProductsQuery>,
) -> Result<ApiSuccess<Paginated<ProductResponse>>, AppError> {
    ensure_can_view(&state, &auth).await?;

    let product_service = ProductService::new(state);
    let page = product_service.list(query).await?;

    Ok(ApiSuccess::from_data(page))
}

pub async fn get_product(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<ApiSuccess<ProductResponse>, AppError> {
    ensure_can_view(&state, &auth).await?;

    let product_service = ProductService::new(state);
    let product = product_service.get(id).await?;

    Ok(ApiSuccess::from_data(product))
}

pub async fn create_product(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    multipart: Multipart,
) -> Result<ApiSuccess<ProductResponse>, AppError> {
    let form = read_product_form(multipart).await?;

    let request = CreateProductRequest {
        name: form
            .name
            .clone()
            .ok_or_else(|| AppError::field_validation("name", "This field is required"))?,
        description: form.description.clone().filter(|d| !d.is_empty()),
        price: form
            .parsed_price()?
            .ok_or_else(|| AppError::field_validation("price", "This field is required"))?,
        stock: form
            .parsed_stock()?
            .ok_or_else(|| AppError::field_validation("stock", "This field is required"))?,
        active: form.parsed_active()?.unwrap_or(true),
    };

    let product_service = ProductService::new(state);
    let product = product_service.create(request, form.images, auth.id()).await?;

    Ok(ApiSuccess::new("Product created successfully", product).with_status(StatusCode::CREATED))
}

pub async fn update_product(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<ApiSuccess<ProductResponse>, AppError> {
    let form = read_product_form(multipart).await?;

    let request = UpdateProductRequest {
        name: form.name.clone().filter(|n| !n.is_empty()),
        description: form.description.clone().filter(|d| !d.is_empty()),
        price: form.parsed_price()?,
        stock: form.parsed_stock()?,
        active: form.parsed_active()?,
    };

    let product_service = ProductService::new(state);
    let product = product_service.update(id, request, form.images, auth.id()).await?;

    Ok(ApiSuccess::new("Product updated successfully", product))
}

pub async fn change_product_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(request): Json<ChangeProductStatusRequest>,
) -> Result<ApiSuccess<ProductResponse>, AppError> {
    let product_service = ProductService::new(state);
    let product = product_service.change_status(id, request, auth.id()).await?;

    Ok(ApiSuccess::new("Product status updated successfully", product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ApiSuccess<()>, AppError> {
    let product_service = ProductService::new(state);
    product_service.delete(id).await?;

    Ok(ApiSuccess::<()>::message_only("Product deleted successfully"))
}

pub async fn restore_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ApiSuccess<ProductResponse>, AppError> {
    let product_service = ProductService::new(state);
    let product = product_service.restore(id).await?;

    Ok(ApiSuccess::new("Product restored successfully", product))
}
