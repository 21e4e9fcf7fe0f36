pub mod auth_handler;
pub mod export_handler;
pub mod health_handler;
pub mod image_handler;
pub mod product_handler;
pub mod user_handler;
