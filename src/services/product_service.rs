use sqlx::{Postgres, QueryBuilder};
use sqlx::types::Json;

use crate::config::AppState;
use crate::dto::{
    ChangeProductStatusRequest, CreateProductRequest, ListProductsQuery, Paginated,
    ProductResponse, UpdateProductRequest,
};
use crate::interceptors::{AppError, AppResult};
use crate::models::{Product, UserSummary};
use crate::utils::{generate_slug, generate_storage_key, validate_image, validate_request, UploadedFile};

/// Sort fields accepted on the listing endpoint. Anything else falls back to
/// creation time.
const SORTABLE_FIELDS: &[&str] = &["id", "name", "price", "stock", "created_at"];

fn sort_field(requested: Option<&str>) -> &'static str {
    match requested {
        Some(field) => SORTABLE_FIELDS
            .iter()
            .find(|allowed| **allowed == field)
            .copied()
            .unwrap_or("created_at"),
        None => "created_at",
    }
}

fn sort_direction(requested: Option<&str>) -> &'static str {
    match requested {
        Some("asc") => "ASC",
        _ => "DESC",
    }
}

#[derive(Clone)]
pub struct ProductService {
    state: AppState,
}

impl ProductService {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    fn to_response(&self, product: &Product) -> ProductResponse {
        ProductResponse::from_product(product, &self.state.config)
    }

    async fn find_product(&self, product_id: i64) -> AppResult<Product> {
        sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1 AND deleted_at IS NULL")
            .bind(product_id)
            .fetch_optional(&self.state.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
    }

    /// Image ingestion: validate, key, write, collect. Fail-fast: the first
    /// failing file aborts the batch; objects already written stay behind.
    async fn ingest_images(&self, files: &[UploadedFile]) -> AppResult<Vec<String>> {
        let mut keys = Vec::with_capacity(files.len());

        for file in files {
            validate_image("images", file)?;
            let ext = file.extension().unwrap_or_else(|| "bin".to_string());
            let key = generate_storage_key("products", &ext);
            self.state.storage.bucket.put(&key, &file.bytes).await?;
            keys.push(key);
        }

        Ok(keys)
    }

    pub async fn list(&self, query: ListProductsQuery) -> AppResult<Paginated<ProductResponse>> {
        let (page, per_page) = query.page.normalized();

        let apply_filters = |qb: &mut QueryBuilder<Postgres>| {
            if query.only_trashed {
                qb.push(" WHERE deleted_at IS NOT NULL");
            } else {
                qb.push(" WHERE deleted_at IS NULL");
            }
            if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
                let pattern = format!("%{}%", search);
                qb.push(" AND (name ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR description ILIKE ")
                    .push_bind(pattern)
                    .push(")");
            }
            match query.status.as_deref() {
                Some("active") => {
                    qb.push(" AND active = TRUE");
                }
                Some("inactive") => {
                    qb.push(" AND active = FALSE");
                }
                _ => {}
            }
            if let Some(min_price) = query.min_price {
                qb.push(" AND price >= ").push_bind(min_price);
            }
            if let Some(max_price) = query.max_price {
                qb.push(" AND price <= ").push_bind(max_price);
            }
        };

        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM products");
        apply_filters(&mut count_qb);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.state.db).await?;

        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM products");
        apply_filters(&mut qb);
        qb.push(format!(
            " ORDER BY {} {}",
            sort_field(query.sort.as_deref()),
            sort_direction(query.direction.as_deref())
        ));
        qb.push(" LIMIT ")
            .push_bind(per_page)
            .push(" OFFSET ")
            .push_bind(query.page.offset());

        let products: Vec<Product> = qb.build_query_as().fetch_all(&self.state.db).await?;
        let data = products.iter().map(|p| self.to_response(p)).collect();

        Ok(Paginated::new(data, total, page, per_page))
    }

    async fn audit_summary(&self, user_id: Option<i64>) -> AppResult<Option<UserSummary>> {
        let Some(id) = user_id else { return Ok(None) };

        let summary = sqlx::query_as::<_, UserSummary>(
            "SELECT id, first_name, last_name FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.state.db)
        .await?;

        Ok(summary)
    }

    pub async fn get(&self, product_id: i64) -> AppResult<ProductResponse> {
        let product = self.find_product(product_id).await?;
        let created_by = self.audit_summary(product.created_by).await?;
        let updated_by = self.audit_summary(product.updated_by).await?;

        Ok(self.to_response(&product).with_audit(created_by, updated_by))
    }

    /// Create with synchronous image ingestion; slug derived once from the
    /// name and immutable afterwards.
    pub async fn create(
        &self,
        request: CreateProductRequest,
        images: Vec<UploadedFile>,
        actor_id: i64,
    ) -> AppResult<ProductResponse> {
        validate_request(&request)?;

        let image_keys = self.ingest_images(&images).await?;
        let slug = generate_slug(&request.name);

        let product = sqlx::query_as::<_, Product>(
            "INSERT INTO products (name, slug, description, price, stock, active, images, created_by, updated_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
             RETURNING *",
        )
        .bind(&request.name)
        .bind(&slug)
        .bind(&request.description)
        .bind(request.price)
        .bind(request.stock)
        .bind(request.active)
        .bind(Json(image_keys))
        .bind(actor_id)
        .fetch_one(&self.state.db)
        .await?;

        tracing::info!("Product {} created ({})", product.id, product.slug);

        Ok(self.to_response(&product))
    }

    /// Partial update; freshly uploaded images are appended to the stored
    /// list, never replacing it.
    pub async fn update(
        &self,
        product_id: i64,
        request: UpdateProductRequest,
        images: Vec<UploadedFile>,
        actor_id: i64,
    ) -> AppResult<ProductResponse> {
        validate_request(&request)?;

        let product = self.find_product(product_id).await?;

        let mut image_keys = product.images.0.clone();
        image_keys.extend(self.ingest_images(&images).await?);

        let updated = sqlx::query_as::<_, Product>(
            "UPDATE products SET
                name = COALESCE($1, name),
                description = COALESCE($2, description),
                price = COALESCE($3, price),
                stock = COALESCE($4, stock),
                active = COALESCE($5, active),
                images = $6,
                updated_by = $7,
                updated_at = NOW()
             WHERE id = $8
             RETURNING *",
        )
        .bind(&request.name)
        .bind(&request.description)
        .bind(request.price)
        .bind(request.stock)
        .bind(request.active)
        .bind(Json(image_keys))
        .bind(actor_id)
        .bind(product.id)
        .fetch_one(&self.state.db)
        .await?;

        Ok(self.to_response(&updated))
    }

    /// Toggle `active` independent of every other field.
    pub async fn change_status(
        &self,
        product_id: i64,
        request: ChangeProductStatusRequest,
        actor_id: i64,
    ) -> AppResult<ProductResponse> {
        let product = self.find_product(product_id).await?;

        let updated = sqlx::query_as::<_, Product>(
            "UPDATE products SET active = $1, updated_by = $2, updated_at = NOW()
             WHERE id = $3
             RETURNING *",
        )
        .bind(request.active)
        .bind(actor_id)
        .bind(product.id)
        .fetch_one(&self.state.db)
        .await?;

        Ok(self.to_response(&updated))
    }

    pub async fn delete(&self, product_id: i64) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE products SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(product_id)
        .execute(&self.state.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Product not found".to_string()));
        }

        Ok(())
    }

    pub async fn restore(&self, product_id: i64) -> AppResult<ProductResponse> {
        let product = sqlx::query_as::<_, Product>(
            "UPDATE products SET deleted_at = NULL, updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NOT NULL
             RETURNING *",
        )
        .bind(product_id)
        .fetch_optional(&self.state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

        Ok(self.to_response(&product))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_sort_fields_fall_back_to_created_at() {
        assert_eq!(sort_field(Some("price")), "price");
        assert_eq!(sort_field(Some("password")), "created_at");
        assert_eq!(sort_field(Some("id; DROP TABLE products")), "created_at");
        assert_eq!(sort_field(None), "created_at");
    }

    #[test]
    fn direction_defaults_to_descending() {
        assert_eq!(sort_direction(Some("asc")), "ASC");
        assert_eq!(sort_direction(Some("desc")), "DESC");
        assert_eq!(sort_direction(Some("sideways")), "DESC");
        assert_eq!(sort_direction(None), "DESC");
    }
}
