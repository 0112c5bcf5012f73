use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server configuration
    pub server_host: String,
    pub server_port: u16,
    pub environment: String,
    pub log_level: String,

    // Database configuration
    pub database_url: String,
    pub database_namespace: String,
    pub database_name: String,
    pub database_username: String,
    pub database_password: String,

    // Session configuration
    pub jwt_secret: String,
    pub session_ttl_days: i64,

    // Media storage configuration
    pub storage_url: String,
    pub storage_cloud_name: String,
    pub storage_api_key: String,
    pub storage_api_secret: String,
    pub storage_upload_preset: String,

    // CORS configuration
    pub cors_allowed_origins: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "127.0.0.1:8000".to_string()),
            database_namespace: env::var("DATABASE_NAMESPACE")
                .unwrap_or_else(|_| "rainbow".to_string()),
            database_name: env::var("DATABASE_NAME")
                .unwrap_or_else(|_| "social".to_string()),
            database_username: env::var("DATABASE_USERNAME")
                .unwrap_or_else(|_| "root".to_string()),
            database_password: env::var("DATABASE_PASSWORD")
                .unwrap_or_else(|_| "root".to_string()),

            jwt_secret: env::var("JWT_SECRET")
                .expect("JWT_SECRET must be set"),
            session_ttl_days: env::var("SESSION_TTL_DAYS")
                .unwrap_or_else(|_| "15".to_string())
                .parse()?,

            storage_url: env::var("STORAGE_URL")
                .unwrap_or_else(|_| "https://api.cloudinary.com/v1_1".to_string()),
            storage_cloud_name: env::var("STORAGE_CLOUD_NAME")
                .unwrap_or_else(|_| "rainbow-social".to_string()),
            storage_api_key: env::var("STORAGE_API_KEY").unwrap_or_default(),
            storage_api_secret: env::var("STORAGE_API_SECRET").unwrap_or_default(),
            storage_upload_preset: env::var("STORAGE_UPLOAD_PRESET")
                .unwrap_or_else(|_| "rainbow-social".to_string()),

            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3001".to_string()),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 3000,
            environment: "development".to_string(),
            log_level: "info".to_string(),
            database_url: "127.0.0.1:8000".to_string(),
            database_namespace: "rainbow".to_string(),
            database_name: "social".to_string(),
            database_username: "root".to_string(),
            database_password: "root".to_string(),
            jwt_secret: "development-secret".to_string(),
            session_ttl_days: 15,
            storage_url: "https://api.cloudinary.com/v1_1".to_string(),
            storage_cloud_name: "rainbow-social".to_string(),
            storage_api_key: String::new(),
            storage_api_secret: String::new(),
            storage_upload_preset: "rainbow-social".to_string(),
            cors_allowed_origins: "http://localhost:3001".to_string(),
        }
    }
}
