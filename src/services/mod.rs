pub mod export_service;
pub mod product_service;
pub mod redis_service;
pub mod role_service;
pub mod seed_service;
pub mod storage_service;
pub mod user_service;

pub use export_service::ExportService;
pub use product_service::ProductService;
pub use redis_service::RedisService;
pub use storage_service::{DiskStorage, ObjectStorage, StorageService};
pub use user_service::UserService;
