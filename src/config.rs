use serde::Deserialize;
use std::time::Duration;

/// Which lead store the service talks to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub enum StoreBackend {
    /// Hosted backend over its REST interface.
    Rest { url: String, api_key: String },
    /// Direct Postgres connection.
    Postgres { database_url: String },
    /// Process-local store; data is lost on restart.
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub store: StoreBackend,
    pub leads_table: String,
    pub scoring_delay: Duration,
    pub listing_cache_ttl: Duration,
    pub notification_history: usize,
}

fn required(lookup: &impl Fn(&str) -> Option<String>, keys: &[&str]) -> anyhow::Result<String> {
    let value = keys
        .iter()
        .find_map(|key| lookup(key))
        .ok_or_else(|| anyhow::anyhow!("{} environment variable required", keys.join(" or ")))?;
    if value.trim().is_empty() {
        anyhow::bail!("{} cannot be empty", keys[0]);
    }
    Ok(value)
}

fn parsed<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
    expected: &str,
) -> anyhow::Result<T> {
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be {}", key, expected)),
        None => Ok(default),
    }
}

fn rest_backend(lookup: &impl Fn(&str) -> Option<String>) -> anyhow::Result<StoreBackend> {
    let url = required(lookup, &["LEADS_STORE_URL"])?;
    let parsed = url::Url::parse(&url)
        .map_err(|e| anyhow::anyhow!("LEADS_STORE_URL is not a valid URL: {}", e))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        anyhow::bail!("LEADS_STORE_URL must start with http:// or https://");
    }
    let api_key = required(lookup, &["LEADS_STORE_KEY"])?;
    Ok(StoreBackend::Rest { url, api_key })
}

fn postgres_backend(lookup: &impl Fn(&str) -> Option<String>) -> anyhow::Result<StoreBackend> {
    let database_url = required(lookup, &["DATABASE_URL", "DB_URL"])?;
    if !database_url.starts_with("postgresql://") && !database_url.starts_with("postgres://") {
        anyhow::bail!("DATABASE_URL must start with postgresql:// or postgres://");
    }
    Ok(StoreBackend::Postgres { database_url })
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let store = match lookup("STORE_BACKEND").as_deref().map(str::trim) {
            Some("rest") => rest_backend(&lookup)?,
            Some("postgres") => postgres_backend(&lookup)?,
            Some("memory") => StoreBackend::Memory,
            Some(other) if !other.is_empty() => {
                anyhow::bail!("STORE_BACKEND must be one of rest, postgres, memory (got '{}')", other)
            }
            _ => {
                if lookup("LEADS_STORE_URL").is_some() {
                    rest_backend(&lookup)?
                } else if lookup("DATABASE_URL").is_some() || lookup("DB_URL").is_some() {
                    postgres_backend(&lookup)?
                } else {
                    anyhow::bail!(
                        "No lead store configured: set LEADS_STORE_URL, DATABASE_URL or STORE_BACKEND=memory"
                    );
                }
            }
        };

        let leads_table = lookup("LEADS_TABLE")
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| "leads".to_string());
        if !leads_table
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            anyhow::bail!("LEADS_TABLE may only contain letters, digits and underscores");
        }

        let notification_history = parsed(
            &lookup,
            "NOTIFICATION_HISTORY",
            100usize,
            "a positive number",
        )?;
        if notification_history == 0 {
            anyhow::bail!("NOTIFICATION_HISTORY must be a positive number");
        }

        let config = Self {
            port: parsed(&lookup, "PORT", 3000u16, "a valid number between 1-65535")?,
            store,
            leads_table,
            scoring_delay: Duration::from_millis(parsed(
                &lookup,
                "SCORING_DELAY_MS",
                1000u64,
                "a number of milliseconds",
            )?),
            listing_cache_ttl: Duration::from_secs(parsed(
                &lookup,
                "LEADS_CACHE_TTL_SECS",
                300u64,
                "a number of seconds",
            )?),
            notification_history,
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        match &config.store {
            StoreBackend::Rest { url, .. } => tracing::debug!("Lead store: REST at {}", url),
            StoreBackend::Postgres { database_url } => tracing::debug!(
                "Lead store: Postgres at {}...",
                database_url.chars().take(20).collect::<String>()
            ),
            StoreBackend::Memory => tracing::warn!("Lead store: in-memory, data will not persist"),
        }
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}
