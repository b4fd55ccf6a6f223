use std::env;
use std::time::Duration;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub jwt_secret: String,
    pub jwt_expiration_secs: u64,
    pub upstream_api_url: String,
    pub upstream_api_key: String,
    pub upstream_timeout_secs: u64,
    pub cache_ttl_secs: u64,
    pub rate_limit_window_secs: u64,
    pub rate_limit_attempts: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        Ok(Config {
            database_url: env::var("DATABASE_URL")?,
            server_host: env::var("SERVER_HOST")?,
            server_port: env::var("SERVER_PORT")?.parse().unwrap_or(3001),
            jwt_secret: env::var("JWT_SECRET")?,
            jwt_expiration_secs: env::var("JWT_EXPIRATION_SECS")
                .map(|v| v.parse().unwrap_or(3600))
                .unwrap_or(3600),
            upstream_api_url: env::var("UPSTREAM_API_URL")?,
            upstream_api_key: env::var("UPSTREAM_API_KEY")?,
            upstream_timeout_secs: env::var("UPSTREAM_TIMEOUT_SECS")
                .map(|v| v.parse().unwrap_or(8))
                .unwrap_or(8),
            cache_ttl_secs: env::var("CACHE_TTL_SECS")
                .map(|v| v.parse().unwrap_or(3600))
                .unwrap_or(3600),
            rate_limit_window_secs: env::var("RATE_LIMIT_WINDOW_SECS")
                .map(|v| v.parse().unwrap_or(900))
                .unwrap_or(900),
            rate_limit_attempts: env::var("RATE_LIMIT_ATTEMPTS")
                .map(|v| v.parse().unwrap_or(5))
                .unwrap_or(5),
        })
    }

    pub fn jwt_expiration(&self) -> Duration {
        Duration::from_secs(self.jwt_expiration_secs)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }
}
