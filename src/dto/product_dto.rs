use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::config::AppConfig;
use crate::models::{Product, UserSummary};

/// Product wire representation with the computed fields attached at the API
/// boundary: status_label, in_stock, image_urls.
#[derive(Debug, Clone, Serialize)]
pub struct ProductResponse {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    pub active: bool,
    pub status_label: &'static str,
    pub in_stock: bool,
    pub images: Vec<String>,
    pub image_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<UserSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<UserSummary>,
}

impl ProductResponse {
    pub fn from_product(product: &Product, config: &AppConfig) -> Self {
        let images = product.images.0.clone();
        let image_urls = images.iter().map(|key| config.image_url(key)).collect();

        Self {
            id: product.id,
            name: product.name.clone(),
            slug: product.slug.clone(),
            description: product.description.clone(),
            price: product.price,
            stock: product.stock,
            active: product.active,
            status_label: product.status_label(),
            in_stock: product.in_stock(),
            images,
            image_urls,
            created_at: product.created_at,
            updated_at: product.updated_at,
            deleted_at: product.deleted_at,
            created_by: None,
            updated_by: None,
        }
    }

    pub fn with_audit(mut self, created_by: Option<UserSummary>, updated_by: Option<UserSummary>) -> Self {
        self.created_by = created_by;
        self.updated_by = updated_by;
        self
    }
}

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() {
        let mut err = ValidationError::new("min");
        err.message = Some("Price must be at least 0".into());
        return Err(err);
    }
    Ok(())
}

/// Product creation fields, parsed from the multipart form; image files are
/// handled separately by the ingestion pipeline.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    pub description: Option<String>,

    #[validate(custom(function = validate_price))]
    pub price: Decimal,

    #[validate(range(min = 0, message = "Stock must be at least 0"))]
    pub stock: i32,

    pub active: bool,
}

/// Partial product update. Absent fields keep their stored values; uploaded
/// images are appended to the existing list.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 255, message = "Name may not be empty"))]
    pub name: Option<String>,

    pub description: Option<String>,

    #[validate(custom(function = validate_price))]
    pub price: Option<Decimal>,

    #[validate(range(min = 0, message = "Stock must be at least 0"))]
    pub stock: Option<i32>,

    pub active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangeProductStatusRequest {
    pub active: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListProductsQuery {
    pub search: Option<String>,
    /// "active" or "inactive"
    pub status: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub sort: Option<String>,
    pub direction: Option<String>,
    #[serde(default)]
    pub only_trashed: bool,
    #[serde(flatten)]
    pub page: super::pagination::PageQuery,
}

/// Result of a report export: where the file landed and how to reach it.
#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub path: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::product::tests_support::sample_product;
    use crate::utils::validate_request;
    use std::str::FromStr;

    fn test_config() -> AppConfig {
        AppConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
            environment: "test".to_string(),
            app_name: "catalog-admin-api".to_string(),
            app_url: "http://localhost:3000".to_string(),
            timezone: "UTC".to_string(),
        }
    }

    #[test]
    fn negative_price_fails_validation() {
        let req = CreateProductRequest {
            name: "Widget".to_string(),
            description: None,
            price: Decimal::from_str("-1").unwrap(),
            stock: 5,
            active: true,
        };
        assert!(validate_request(&req).is_err());
    }

    #[test]
    fn zero_price_and_stock_are_valid() {
        let req = CreateProductRequest {
            name: "Widget".to_string(),
            description: None,
            price: Decimal::ZERO,
            stock: 0,
            active: false,
        };
        assert!(validate_request(&req).is_ok());
    }

    #[test]
    fn response_computes_presentation_fields() {
        let mut product = sample_product();
        product.images.0 = vec!["products/20250101_120000_a1b2c3d4.png".to_string()];
        let response = ProductResponse::from_product(&product, &test_config());

        assert_eq!(response.status_label, "INACTIVE");
        assert!(!response.in_stock);
        assert_eq!(
            response.image_urls,
            vec!["http://localhost:3000/v1/products/images/products/20250101_120000_a1b2c3d4.png"]
        );
    }

    #[test]
    fn negative_stock_fails_validation() {
        let req = UpdateProductRequest {
            stock: Some(-3),
            ..Default::default()
        };
        assert!(validate_request(&req).is_err());
    }
}
