use anyhow::Context;
use ipnet::IpNet;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub analytics: AnalyticsConfig,
    pub frontend: FrontendConfig,
    pub github: GitHubConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    Sqlite,
    Postgres,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for admin session tokens
    pub jwt_secret: String,
    /// Shared access code exchanged for a session token at login
    pub access_code: String,
    #[serde(default = "AuthConfig::default_token_ttl_secs")]
    pub token_ttl_secs: u64,
    /// Adds the `Secure` attribute to the session cookie
    #[serde(default)]
    pub secure_cookie: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrustedProxyMode {
    /// Use the socket peer address only
    #[default]
    None,
    /// Honour `Forwarded` / `X-Forwarded-For` from trusted hops
    Standard,
    /// Honour `CF-Connecting-IP`
    Cloudflare,
}

impl TrustedProxyMode {
    /// Parse a `TRUSTED_PROXY_MODE` value; unset or unknown values mean `None`
    pub fn from_setting(value: Option<&str>) -> Self {
        let Some(value) = value else {
            return Self::default();
        };

        match value.trim().to_lowercase().as_str() {
            "none" => Self::None,
            "standard" => Self::Standard,
            "cloudflare" => Self::Cloudflare,
            other => {
                tracing::warn!(
                    "Unknown TRUSTED_PROXY_MODE '{other}', falling back to 'none'. Supported values: none, standard, cloudflare"
                );
                Self::None
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Salt mixed into every visitor identifier hash
    pub hash_secret: String,
    pub trusted_proxy_mode: TrustedProxyMode,
    #[serde(default)]
    pub trusted_proxies: Vec<IpNet>,
    #[serde(default)]
    pub num_trusted_proxies: Option<usize>,
    #[serde(default = "AnalyticsConfig::default_query_timeout_secs")]
    pub query_timeout_secs: u64,
    /// Visits and project views older than this are pruned; unbounded when None
    #[serde(default)]
    pub retention_days: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontendConfig {
    /// Path to the built landing page
    /// If None, a placeholder page is served
    pub static_dir: Option<String>,
    /// Origin allowed to call the API with credentials
    pub allowed_origin: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    pub api_base_url: String,
    pub username: Option<String>,
    pub access_token: Option<String>,
}

impl AuthConfig {
    const fn default_token_ttl_secs() -> u64 {
        24 * 60 * 60
    }
}

impl AnalyticsConfig {
    const fn default_query_timeout_secs() -> u64 {
        10
    }
}

impl GitHubConfig {
    pub const DEFAULT_API_URL: &'static str = "https://api.github.com";
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let backend_str =
            std::env::var("DATABASE_BACKEND").unwrap_or_else(|_| "sqlite".to_string());

        let backend = match backend_str.to_lowercase().as_str() {
            "postgres" | "postgresql" => DatabaseBackend::Postgres,
            _ => DatabaseBackend::Sqlite,
        };

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./folio.db?mode=rwc".to_string());

        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()
            .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?;

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .context("PORT must be a valid port number")?;

        let jwt_secret = std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        let access_code =
            std::env::var("ADMIN_ACCESS_CODE").context("ADMIN_ACCESS_CODE must be set")?;
        let token_ttl_secs = std::env::var("AUTH_TOKEN_TTL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or_else(AuthConfig::default_token_ttl_secs);

        let hash_secret = std::env::var("VISITOR_HASH_SECRET").unwrap_or_else(|_| {
            tracing::warn!("VISITOR_HASH_SECRET not set, deriving visitor hashes from JWT_SECRET");
            jwt_secret.clone()
        });

        let trusted_proxy_mode =
            TrustedProxyMode::from_setting(std::env::var("TRUSTED_PROXY_MODE").ok().as_deref());

        let trusted_proxies = match std::env::var("TRUSTED_PROXIES") {
            Ok(list) => list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| {
                    s.parse::<IpNet>()
                        .or_else(|_| s.parse::<std::net::IpAddr>().map(IpNet::from))
                        .with_context(|| format!("invalid entry in TRUSTED_PROXIES: {s}"))
                })
                .collect::<anyhow::Result<Vec<_>>>()?,
            Err(_) => Vec::new(),
        };

        let num_trusted_proxies = std::env::var("NUM_TRUSTED_PROXIES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok());

        let query_timeout_secs = std::env::var("ANALYTICS_QUERY_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or_else(AnalyticsConfig::default_query_timeout_secs);

        let retention_days = std::env::var("ANALYTICS_RETENTION_DAYS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|days| *days > 0);

        Ok(Config {
            database: DatabaseConfig {
                backend,
                url: database_url,
                max_connections,
            },
            server: ServerConfig { host, port },
            auth: AuthConfig {
                jwt_secret,
                access_code,
                token_ttl_secs,
                secure_cookie: env_flag("AUTH_SECURE_COOKIE"),
            },
            analytics: AnalyticsConfig {
                hash_secret,
                trusted_proxy_mode,
                trusted_proxies,
                num_trusted_proxies,
                query_timeout_secs,
                retention_days,
            },
            frontend: FrontendConfig {
                static_dir: std::env::var("FRONTEND_STATIC_DIR").ok(),
                allowed_origin: std::env::var("CORS_ALLOWED_ORIGIN").ok(),
            },
            github: GitHubConfig {
                api_base_url: std::env::var("GITHUB_API_URL")
                    .unwrap_or_else(|_| GitHubConfig::DEFAULT_API_URL.to_string()),
                username: std::env::var("GITHUB_USERNAME").ok(),
                access_token: std::env::var("GITHUB_ACCESS_TOKEN").ok(),
            },
        })
    }
}
