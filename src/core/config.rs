use std::env;
use std::time::Duration;

use crate::modules::media::DisplayBounds;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub swagger: SwaggerConfig,
    pub media: MediaConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
    pub statement_timeout_secs: u64,
}

/// Bearer token validation settings (HS256 shared secret)
#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub jwt_leeway: Duration,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("jwt_leeway", &self.jwt_leeway)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

/// Upload limits and display-time downscaling settings
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Largest accepted upload, in bytes
    pub max_upload_bytes: usize,
    /// Stored images at or above this size are downscaled for viewing
    pub downscale_threshold_bytes: usize,
    pub display_max_width: u32,
    pub display_max_height: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            // Only error if it's not "file not found" - that's acceptable
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            auth: AuthConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
            media: MediaConfig::from_env()?,
        })
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    // Default values for database connection pool (conservative defaults for small-medium apps)
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes
    const DEFAULT_STATEMENT_TIMEOUT_SECS: u64 = 600; // 10 minutes, large blobs

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MAX_CONNECTIONS must be a valid number".to_string())?;

        let min_connections = env::var("DB_MIN_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MIN_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MIN_CONNECTIONS must be a valid number".to_string())?;

        let acquire_timeout_secs = env::var("DB_ACQUIRE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_ACQUIRE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_ACQUIRE_TIMEOUT_SECS must be a valid number".to_string())?;

        let idle_timeout_secs = env::var("DB_IDLE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_IDLE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_IDLE_TIMEOUT_SECS must be a valid number".to_string())?;

        let max_lifetime_secs = env::var("DB_MAX_LIFETIME_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_LIFETIME_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_MAX_LIFETIME_SECS must be a valid number".to_string())?;

        let statement_timeout_secs = env::var("DB_STATEMENT_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_STATEMENT_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_STATEMENT_TIMEOUT_SECS must be a valid number".to_string())?;

        Ok(Self {
            url,
            max_connections,
            min_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
            statement_timeout_secs,
        })
    }
}

impl AuthConfig {
    const DEFAULT_JWT_LEEWAY_SECS: u64 = 60; // 1 minute

    pub fn from_env() -> Result<Self, String> {
        let secret = env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "JWT_SECRET environment variable is required".to_string())?;

        let issuer = env::var("JWT_ISSUER")
            .map_err(|_| "JWT_ISSUER environment variable is required".to_string())?;

        // Tokens are minted with the issuer as audience unless told otherwise
        let audience = env::var("JWT_AUDIENCE").unwrap_or_else(|_| issuer.clone());

        let jwt_leeway_secs = env::var("JWT_LEEWAY")
            .unwrap_or_else(|_| Self::DEFAULT_JWT_LEEWAY_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "JWT_LEEWAY must be a valid number".to_string())?;

        Ok(Self {
            secret,
            issuer,
            audience,
            jwt_leeway: Duration::from_secs(jwt_leeway_secs),
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "MediaVault API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "API documentation for MediaVault".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

impl MediaConfig {
    const DEFAULT_MAX_UPLOAD_BYTES: usize = 200_000_000; // 200 MB
    const DEFAULT_DOWNSCALE_THRESHOLD_BYTES: usize = 2_000_000; // 2 MB
    const DEFAULT_DISPLAY_MAX_WIDTH: u32 = 1280;
    const DEFAULT_DISPLAY_MAX_HEIGHT: u32 = 720;

    /// Multipart framing and JSON envelope allowance on top of the payload
    const REQUEST_OVERHEAD_BYTES: usize = 1024 * 1024;

    pub fn from_env() -> Result<Self, String> {
        let max_upload_bytes = env::var("MEDIA_MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_UPLOAD_BYTES.to_string())
            .parse::<usize>()
            .map_err(|_| "MEDIA_MAX_UPLOAD_BYTES must be a valid number".to_string())?;

        let downscale_threshold_bytes = env::var("MEDIA_DOWNSCALE_THRESHOLD_BYTES")
            .unwrap_or_else(|_| Self::DEFAULT_DOWNSCALE_THRESHOLD_BYTES.to_string())
            .parse::<usize>()
            .map_err(|_| "MEDIA_DOWNSCALE_THRESHOLD_BYTES must be a valid number".to_string())?;

        let display_max_width = parse_dimension(
            "MEDIA_DISPLAY_MAX_WIDTH",
            &env::var("MEDIA_DISPLAY_MAX_WIDTH")
                .unwrap_or_else(|_| Self::DEFAULT_DISPLAY_MAX_WIDTH.to_string()),
        )?;

        let display_max_height = parse_dimension(
            "MEDIA_DISPLAY_MAX_HEIGHT",
            &env::var("MEDIA_DISPLAY_MAX_HEIGHT")
                .unwrap_or_else(|_| Self::DEFAULT_DISPLAY_MAX_HEIGHT.to_string()),
        )?;

        Ok(Self {
            max_upload_bytes,
            downscale_threshold_bytes,
            display_max_width,
            display_max_height,
        })
    }

    pub fn display_bounds(&self) -> DisplayBounds {
        DisplayBounds {
            max_width: self.display_max_width,
            max_height: self.display_max_height,
        }
    }

    /// HTTP body limit for the upload route.
    ///
    /// Base64 uploads inflate the payload by 4/3, so the transport limit sits
    /// above `max_upload_bytes` and the exact check happens on decoded bytes.
    pub fn request_body_limit(&self) -> usize {
        self.max_upload_bytes
            .saturating_add(self.max_upload_bytes / 3 + 4)
            .saturating_add(Self::REQUEST_OVERHEAD_BYTES)
    }
}

/// Display dimensions must be positive pixel counts
fn parse_dimension(name: &str, raw: &str) -> Result<u32, String> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| format!("{} must be a positive number", name))
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: Self::DEFAULT_MAX_UPLOAD_BYTES,
            downscale_threshold_bytes: Self::DEFAULT_DOWNSCALE_THRESHOLD_BYTES,
            display_max_width: Self::DEFAULT_DISPLAY_MAX_WIDTH,
            display_max_height: Self::DEFAULT_DISPLAY_MAX_HEIGHT,
        }
    }
}
