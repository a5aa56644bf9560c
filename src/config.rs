use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// Marketplace policy values. Deployments disagree on the exact bounds,
/// so they come from the environment with sane defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    pub listing_max_price: f64,
    pub session_min_minutes: i32,
    pub session_max_minutes: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub policy: PolicyConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "skillswap".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "skillswap-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
            refresh_ttl_minutes: std::env::var("JWT_REFRESH_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 14),
        };
        let policy = PolicyConfig {
            listing_max_price: std::env::var("LISTING_MAX_PRICE")
                .ok()
                .and_then(|v| v.parse::<f64>().ok())
                .unwrap_or(999.0),
            session_min_minutes: std::env::var("SESSION_MIN_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i32>().ok())
                .unwrap_or(30),
            session_max_minutes: std::env::var("SESSION_MAX_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i32>().ok())
                .unwrap_or(480),
        };
        Ok(Self {
            database_url,
            jwt,
            policy,
        })
    }
}
