use serde::Deserialize;

/// Locations for the two storage disks: the public disk (avatars, generated
/// reports) and the bucket disk holding product images.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub public_root: String,
    pub bucket_root: String,
    pub public_url: String,
}

impl StorageConfig {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()?;

        Ok(Self {
            public_root: cfg
                .get_string("PUBLIC_STORAGE_ROOT")
                .unwrap_or_else(|_| "storage/public".to_string()),
            bucket_root: cfg
                .get_string("BUCKET_STORAGE_ROOT")
                .unwrap_or_else(|_| "storage/bucket".to_string()),
            public_url: cfg
                .get_string("PUBLIC_STORAGE_URL")
                .unwrap_or_else(|_| "http://localhost:3000/storage".to_string()),
        })
    }
}
