use std::time::Duration;

/// Upper bound for BANKD_TOKEN_TTL_SECS: one year.
pub const MAX_TOKEN_TTL_SECS: i64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    /// HMAC secret used to sign and verify bearer tokens.
    pub jwt_secret: String,
    /// Lifetime of an issued token, in seconds.
    /// Set via BANKD_TOKEN_TTL_SECS. Default: 15000.
    pub token_ttl_secs: i64,
    /// Argon2 time cost (iterations) for new password hashes.
    /// Set via BANKD_PASSWORD_COST. Default: 3.
    pub password_cost: u32,
    pub request_timeout_secs: u64,
    pub log_format: LogFormat,
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Configuration for tests and local tooling: fixed secret, cheap hashing.
    pub fn for_tests(jwt_secret: &str) -> Self {
        Self {
            port: 0,
            database_url: String::new(),
            jwt_secret: jwt_secret.to_string(),
            token_ttl_secs: 15000,
            password_cost: 1,
            request_timeout_secs: 10,
            log_format: LogFormat::Text,
        }
    }
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();

    let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_default();
    if jwt_secret.trim().is_empty() {
        anyhow::bail!("JWT_SECRET is not set. Refusing to start without a token signing secret.");
    }

    let password_cost = env_or("BANKD_PASSWORD_COST", 3u32);
    if password_cost == 0 {
        anyhow::bail!("BANKD_PASSWORD_COST must be at least 1");
    }

    let token_ttl_secs = check_token_ttl(env_or("BANKD_TOKEN_TTL_SECS", 15000))?;

    let log_format = match std::env::var("BANKD_LOG_FORMAT")
        .unwrap_or_default()
        .to_lowercase()
        .as_str()
    {
        "json" => LogFormat::Json,
        _ => LogFormat::Text,
    };

    Ok(Config {
        port: env_or("BANKD_PORT", 8080),
        database_url: std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/bankaccount".into()),
        jwt_secret,
        token_ttl_secs,
        password_cost,
        request_timeout_secs: env_or("BANKD_REQUEST_TIMEOUT_SECS", 10),
        log_format,
    })
}

fn check_token_ttl(ttl: i64) -> anyhow::Result<i64> {
    if ttl <= 0 || ttl > MAX_TOKEN_TTL_SECS {
        anyhow::bail!(
            "BANKD_TOKEN_TTL_SECS must be between 1 and {} seconds, got {}",
            MAX_TOKEN_TTL_SECS,
            ttl
        );
    }
    Ok(ttl)
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
