use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use sqlx::types::Json;

/// Product model (database entity). Computed fields (status_label, in_stock,
/// image_urls) live in the dto layer, not here.
#[derive(Debug, Clone, FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    pub active: bool,
    pub images: Json<Vec<String>>,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn status_label(&self) -> &'static str {
        if self.active { "ACTIVE" } else { "INACTIVE" }
    }

    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

#[cfg(test)]
pub(crate) mod tests_support {
    use super::*;

    pub(crate) fn sample_product() -> Product {
        let now = Utc::now();
        Product {
            id: 1,
            name: "MacBook Pro 16".to_string(),
            slug: "macbook-pro-16-a1b2c".to_string(),
            description: Some("M3 Chip, 32GB RAM".to_string()),
            price: Decimal::new(349999, 2),
            stock: 0,
            active: false,
            images: Json(vec![]),
            created_by: None,
            updated_by: None,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::tests_support::sample_product;

    #[test]
    fn status_label_follows_active_flag() {
        let mut product = sample_product();
        assert_eq!(product.status_label(), "INACTIVE");
        product.active = true;
        assert_eq!(product.status_label(), "ACTIVE");
    }

    #[test]
    fn zero_stock_is_not_in_stock() {
        let mut product = sample_product();
        assert!(!product.in_stock());
        product.stock = 3;
        assert!(product.in_stock());
    }
}
