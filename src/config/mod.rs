use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub upload: UploadConfig,
    pub filter: FilterConfig,
    pub geocoder: GeocoderConfig,
    pub email: EmailConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL URL; the in-memory store is used when unset
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expire_days: i64,
    pub cookie_expire_days: i64,
    pub secure_cookies: bool,
    /// Allowed origins; empty means permissive outside production
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub max_file_upload: usize,
    pub file_upload_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct FilterConfig {
    pub default_limit: u32,
    pub max_limit: u32,
}

#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    pub api_key: Option<String>,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub transport: EmailTransportConfig,
    pub from_email: String,
    pub from_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EmailTransportConfig {
    Smtp {
        host: String,
        port: u16,
        username: Option<String>,
        password: Option<String>,
    },
    File {
        path: String,
    },
}

const MAPQUEST_BASE_URL: &str = "https://www.mapquestapi.com/geocoding/v1";

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let environment = match lookup("APP_ENV").or_else(|| lookup("NODE_ENV")).as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_overrides(lookup)
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        // Server
        if let Some(v) = lookup("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Database
        if let Some(v) = lookup("DATABASE_URL").filter(|v| !v.is_empty()) {
            self.database.url = Some(v);
        }
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }

        // Security
        if let Some(v) = lookup("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Some(v) = lookup("JWT_EXPIRE_DAYS").or_else(|| lookup("JWT_EXPIRE")) {
            self.security.jwt_expire_days = parse_days(&v).unwrap_or(self.security.jwt_expire_days);
        }
        if let Some(v) = lookup("JWT_COOKIE_EXPIRE") {
            self.security.cookie_expire_days = v.parse().unwrap_or(self.security.cookie_expire_days);
        }
        if let Some(v) = lookup("CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Upload
        if let Some(v) = lookup("MAX_FILE_UPLOAD") {
            self.upload.max_file_upload = v.parse().unwrap_or(self.upload.max_file_upload);
        }
        if let Some(v) = lookup("FILE_UPLOAD_PATH") {
            self.upload.file_upload_path = PathBuf::from(v);
        }

        // Filter
        if let Some(v) = lookup("FILTER_MAX_LIMIT") {
            self.filter.max_limit = v.parse().unwrap_or(self.filter.max_limit);
        }

        // Geocoder
        if let Some(v) = lookup("GEOCODER_API_KEY").filter(|v| !v.is_empty()) {
            self.geocoder.api_key = Some(v);
        }
        if let Some(v) = lookup("GEOCODER_BASE_URL") {
            self.geocoder.base_url = v;
        }

        // Email
        if let Some(host) = lookup("SMTP_HOST").filter(|v| !v.is_empty()) {
            self.email.transport = EmailTransportConfig::Smtp {
                host,
                port: lookup("SMTP_PORT").and_then(|v| v.parse().ok()).unwrap_or(587),
                username: lookup("SMTP_USERNAME").or_else(|| lookup("SMTP_EMAIL")),
                password: lookup("SMTP_PASSWORD"),
            };
        } else if let Some(path) = lookup("EMAIL_FILE_PATH") {
            self.email.transport = EmailTransportConfig::File { path };
        }
        if let Some(v) = lookup("FROM_EMAIL") {
            self.email.from_email = v;
        }
        if let Some(v) = lookup("FROM_NAME") {
            self.email.from_name = v;
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 5000 },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expire_days: 30,
                cookie_expire_days: 30,
                secure_cookies: false,
                cors_origins: vec![],
            },
            upload: UploadConfig {
                max_file_upload: 1_000_000,
                file_upload_path: PathBuf::from("./public/uploads"),
            },
            filter: FilterConfig {
                default_limit: 10,
                max_limit: 100,
            },
            geocoder: GeocoderConfig {
                api_key: None,
                base_url: MAPQUEST_BASE_URL.to_string(),
            },
            email: EmailConfig {
                transport: EmailTransportConfig::File {
                    path: "./emails".to_string(),
                },
                from_email: "noreply@devcamper.io".to_string(),
                from_name: "DevCamper".to_string(),
            },
        }
    }

    fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.database.max_connections = 20;
        config.security.jwt_expire_days = 7;
        config.security.cookie_expire_days = 7;
        config
    }

    fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.database.max_connections = 50;
        config.security.secure_cookies = true;
        config
    }
}

/// Accepts `30` or the `30d` form used by token expiry settings
fn parse_days(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    trimmed.strip_suffix('d').unwrap_or(trimmed).parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_development_config() {
        let config = config_from(&[]);
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.server.port, 5000);
        assert!(config.database.url.is_none());
        assert_eq!(config.filter.default_limit, 10);
        assert!(!config.security.secure_cookies);
        assert_eq!(
            config.email.transport,
            EmailTransportConfig::File { path: "./emails".to_string() }
        );
    }

    #[test]
    fn test_default_production_config() {
        let config = config_from(&[("NODE_ENV", "production")]);
        assert!(config.is_production());
        assert!(config.security.secure_cookies);
        assert_eq!(config.database.max_connections, 50);
    }

    #[test]
    fn test_env_overrides() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("JWT_EXPIRE", "7d"),
            ("MAX_FILE_UPLOAD", "2048"),
            ("SMTP_HOST", "smtp.mailtrap.io"),
            ("SMTP_PORT", "2525"),
            ("CORS_ORIGINS", "http://a.io, http://b.io"),
        ]);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.security.jwt_expire_days, 7);
        assert_eq!(config.upload.max_file_upload, 2048);
        assert_eq!(config.security.cors_origins, vec!["http://a.io", "http://b.io"]);
        assert!(matches!(config.email.transport, EmailTransportConfig::Smtp { port: 2525, .. }));
    }
}
