use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub app_name: String,
    pub app_url: String,
    pub timezone: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()?;

        Ok(Self {
            host: cfg.get_string("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: cfg.get_int("PORT").unwrap_or(3000) as u16,
            environment: cfg.get_string("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            app_name: cfg.get_string("APP_NAME").unwrap_or_else(|_| "catalog-admin-api".to_string()),
            app_url: cfg.get_string("APP_URL").unwrap_or_else(|_| "http://localhost:3000".to_string()),
            timezone: cfg.get_string("APP_TIMEZONE").unwrap_or_else(|_| "UTC".to_string()),
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Public URL for a product image key, routed through the CORS proxy.
    pub fn image_url(&self, key: &str) -> String {
        format!("{}/v1/products/images/{}", self.app_url.trim_end_matches('/'), key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AppConfig {
        AppConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
            environment: "test".to_string(),
            app_name: "catalog-admin-api".to_string(),
            app_url: "http://localhost:3000/".to_string(),
            timezone: "UTC".to_string(),
        }
    }

    #[test]
    fn image_url_strips_trailing_slash() {
        let cfg = test_config();
        assert_eq!(
            cfg.image_url("products/20250101_120000_a1b2c3d4.png"),
            "http://localhost:3000/v1/products/images/products/20250101_120000_a1b2c3d4.png"
        );
    }
}
