use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, Workbook};

use crate::config::AppState;
use crate::dto::ExportResponse;
use crate::interceptors::{AppError, AppResult};
use crate::models::Product;
use crate::services::ObjectStorage;
use crate::utils::upload::generate_storage_key;

// printpdf's Mm wraps f32.
const PAGE_WIDTH_MM: f32 = 297.0;
const PAGE_HEIGHT_MM: f32 = 210.0;
const ROW_STEP_MM: f32 = 6.0;
const BOTTOM_MARGIN_MM: f32 = 12.0;

fn localized(dt: &DateTime<Utc>, tz: Tz) -> String {
    dt.with_timezone(&tz).format("%Y-%m-%d %H:%M:%S").to_string()
}

fn truncated(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str("...");
    out
}

/// Workbook with a bold header row and one row per product. An empty catalog
/// still produces a header-only file.
pub fn render_spreadsheet(products: &[Product], tz: Tz) -> AppResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let bold = Format::new().set_bold();

    let headings = ["ID", "Name", "Slug", "Price", "Stock", "Status", "Active", "Created At"];
    for (col, heading) in headings.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *heading, &bold)
            .map_err(|e| AppError::InternalError(format!("Spreadsheet rendering failed: {}", e)))?;
    }

    for (i, product) in products.iter().enumerate() {
        let row = (i + 1) as u32;
        worksheet
            .write_number(row, 0, product.id as f64)
            .and_then(|ws| ws.write_string(row, 1, product.name.as_str()))
            .and_then(|ws| ws.write_string(row, 2, product.slug.as_str()))
            .and_then(|ws| ws.write_number(row, 3, product.price.to_f64().unwrap_or(0.0)))
            .and_then(|ws| ws.write_number(row, 4, product.stock as f64))
            .and_then(|ws| ws.write_string(row, 5, product.status_label()))
            .and_then(|ws| ws.write_string(row, 6, if product.active { "Yes" } else { "No" }))
            .and_then(|ws| ws.write_string(row, 7, localized(&product.created_at, tz)))
            .map_err(|e| AppError::InternalError(format!("Spreadsheet rendering failed: {}", e)))?;
    }

    workbook
        .save_to_buffer()
        .map_err(|e| AppError::InternalError(format!("Spreadsheet rendering failed: {}", e)))
}

struct PdfTable<'a> {
    font: &'a IndirectFontRef,
    bold: &'a IndirectFontRef,
}

impl<'a> PdfTable<'a> {
    fn header(&self, layer: &PdfLayerReference, y: f32) {
        let columns = [
            (10.0, "#"),
            (20.0, "Name"),
            (70.0, "Slug"),
            (120.0, "Description"),
            (185.0, "Price"),
            (207.0, "Stock"),
            (222.0, "Status"),
            (243.0, "Active"),
            (258.0, "Created At"),
        ];
        for (x, label) in columns {
            layer.use_text(label, 9.0, Mm(x), Mm(y), self.bold);
        }
    }

    fn row(&self, layer: &PdfLayerReference, y: f32, index: usize, product: &Product, tz: Tz) {
        let price = format!("${}", product.price.round_dp(2));
        let cells = [
            (10.0, (index + 1).to_string()),
            (20.0, truncated(&product.name, 28)),
            (70.0, truncated(&product.slug, 28)),
            (120.0, truncated(product.description.as_deref().unwrap_or(""), 36)),
            (185.0, price),
            (207.0, product.stock.to_string()),
            (222.0, product.status_label().to_string()),
            (243.0, if product.active { "Yes" } else { "No" }.to_string()),
            (258.0, localized(&product.created_at, tz)),
        ];
        for (x, text) in cells {
            layer.use_text(text, 8.0, Mm(x), Mm(y), self.font);
        }
    }
}

/// Tabular PDF over the full product list. Errors if rendering produces
/// empty output instead of handing back a zero-byte document.
pub fn render_pdf(products: &[Product], tz: Tz, generated_at: DateTime<Utc>) -> AppResult<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new(
        "Products Report",
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "table",
    );

    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| AppError::InternalError(format!("PDF rendering failed: {}", e)))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| AppError::InternalError(format!("PDF rendering failed: {}", e)))?;
    let table = PdfTable { font: &font, bold: &bold };

    let mut layer_ref = doc.get_page(page).get_layer(layer);
    layer_ref.use_text("Products Report", 14.0, Mm(10.0), Mm(196.0), &bold);
    layer_ref.use_text(
        format!("Generated at {}", localized(&generated_at, tz)),
        9.0,
        Mm(10.0),
        Mm(189.0),
        &font,
    );

    let mut y = 180.0;
    table.header(&layer_ref, y);
    y -= ROW_STEP_MM;

    for (index, product) in products.iter().enumerate() {
        if y < BOTTOM_MARGIN_MM {
            let (next_page, next_layer) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "table");
            layer_ref = doc.get_page(next_page).get_layer(next_layer);
            y = 196.0;
            table.header(&layer_ref, y);
            y -= ROW_STEP_MM;
        }
        table.row(&layer_ref, y, index, product, tz);
        y -= ROW_STEP_MM;
    }

    let bytes = doc
        .save_to_bytes()
        .map_err(|e| AppError::InternalError(format!("PDF rendering failed: {}", e)))?;

    ensure_rendered(bytes)
}

/// A renderer handing back zero bytes is a failure, not an empty report.
fn ensure_rendered(bytes: Vec<u8>) -> AppResult<Vec<u8>> {
    if bytes.is_empty() {
        return Err(AppError::InternalError("PDF rendering produced empty output".to_string()));
    }
    Ok(bytes)
}

/// Post-write check: a written report must be readable back from storage.
async fn verify_persisted(storage: &dyn ObjectStorage, path: &str) -> AppResult<()> {
    if !storage.exists(path).await? {
        return Err(AppError::InternalError(format!(
            "PDF export was not persisted at {}",
            path
        )));
    }
    Ok(())
}

#[derive(Clone)]
pub struct ExportService {
    state: AppState,
}

impl ExportService {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    fn timezone(&self) -> Tz {
        self.state.config.timezone.parse().unwrap_or(chrono_tz::UTC)
    }

    /// Full unfiltered, unpaginated catalog (active and inactive alike).
    async fn fetch_catalog(&self) -> AppResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE deleted_at IS NULL ORDER BY created_at DESC",
        )
        .fetch_all(&self.state.db)
        .await?;

        Ok(products)
    }

    pub async fn export_pdf(&self) -> AppResult<ExportResponse> {
        let products = self.fetch_catalog().await?;
        let bytes = render_pdf(&products, self.timezone(), Utc::now())?;

        let path = generate_storage_key("reports", "pdf");
        self.state.storage.public.put(&path, &bytes).await?;
        verify_persisted(self.state.storage.public.as_ref(), &path).await?;

        tracing::info!("Exported {} products to {}", products.len(), path);

        Ok(ExportResponse {
            url: self.state.storage.public_url(&path),
            path,
        })
    }

    pub async fn export_spreadsheet(&self) -> AppResult<ExportResponse> {
        let products = self.fetch_catalog().await?;
        let bytes = render_spreadsheet(&products, self.timezone())?;

        let path = generate_storage_key("reports", "xlsx");
        self.state.storage.public.put(&path, &bytes).await?;

        tracing::info!("Exported {} products to {}", products.len(), path);

        Ok(ExportResponse {
            url: self.state.storage.public_url(&path),
            path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::product::tests_support::sample_product;

    #[test]
    fn empty_catalog_still_renders_a_header_only_workbook() {
        let bytes = render_spreadsheet(&[], chrono_tz::UTC).unwrap();
        assert!(!bytes.is_empty());
        // xlsx files are zip archives
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn workbook_grows_with_rows() {
        let empty = render_spreadsheet(&[], chrono_tz::UTC).unwrap();
        let products: Vec<_> = (0..20)
            .map(|i| {
                let mut p = sample_product();
                p.id = i;
                p.name = format!("Product {}", i);
                p
            })
            .collect();
        let filled = render_spreadsheet(&products, chrono_tz::UTC).unwrap();
        assert!(filled.len() > empty.len());
    }

    #[test]
    fn pdf_renders_non_empty_bytes() {
        let products = vec![sample_product()];
        let bytes = render_pdf(&products, chrono_tz::UTC, Utc::now()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn pdf_paginates_large_catalogs() {
        let products: Vec<_> = (0..120)
            .map(|i| {
                let mut p = sample_product();
                p.id = i;
                p
            })
            .collect();
        let bytes = render_pdf(&products, chrono_tz::UTC, Utc::now()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn truncation_appends_ellipsis_only_when_needed() {
        assert_eq!(truncated("short", 10), "short");
        assert_eq!(truncated("0123456789abc", 10), "0123456789...");
    }

    #[test]
    fn empty_render_output_is_an_error() {
        match ensure_rendered(vec![]) {
            Err(AppError::InternalError(msg)) => assert!(msg.contains("empty output")),
            other => panic!("expected internal error, got {:?}", other),
        }
        assert_eq!(ensure_rendered(b"%PDF".to_vec()).unwrap(), b"%PDF");
    }

    /// Storage that accepts writes but never reports the object back.
    struct LossyStorage;

    #[async_trait::async_trait]
    impl ObjectStorage for LossyStorage {
        async fn put(&self, _key: &str, _bytes: &[u8]) -> AppResult<()> {
            Ok(())
        }

        async fn get(&self, _key: &str) -> AppResult<Vec<u8>> {
            Err(AppError::NotFound("Object not found".to_string()))
        }

        async fn exists(&self, _key: &str) -> AppResult<bool> {
            Ok(false)
        }

        async fn delete(&self, _key: &str) -> AppResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn missing_report_after_write_is_an_error() {
        let storage = LossyStorage;
        match verify_persisted(&storage, "reports/20250101_120000_a1b2c3d4.pdf").await {
            Err(AppError::InternalError(msg)) => assert!(msg.contains("not persisted")),
            other => panic!("expected internal error, got {:?}", other),
        }
    }
}
