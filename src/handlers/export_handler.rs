use axum::extract::State;

use crate::config::AppState;
use crate::dto::ExportResponse;
use crate::interceptors::{ApiSuccess, AppError};
use crate::services::ExportService;

pub async fn export_products_pdf(
    State(state): State<AppState>,
) -> Result<ApiSuccess<ExportResponse>, AppError> {
    let export_service = ExportService::new(state);
    let export = export_service.export_pdf().await?;

    Ok(ApiSuccess::new("Product report generated successfully", export))
}

pub async fn export_products_excel(
    State(state): State<AppState>,
) -> Result<ApiSuccess<ExportResponse>, AppError> {
    let export_service = ExportService::new(state);
    let export = export_service.export_spreadsheet().await?;

    Ok(ApiSuccess::new("Product report generated successfully", export))
}
