use std::fmt::Display;
use std::str::FromStr;

use foodgram_core::pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use tracing::{info, warn};

/// Runtime settings, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    /// Absolute origin used for image URLs, pagination links and short links.
    pub public_base_url: String,
    pub short_link_prefix: String,
    pub page_size: i64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Invalid optional values fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url =
            lookup("DATABASE_URL").ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?;

        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string());

        let public_base_url = lookup("PUBLIC_BASE_URL")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();

        let short_link_prefix = lookup("SHORT_LINK_PREFIX")
            .unwrap_or_else(|| format!("{}/s/", public_base_url));

        let page_size = parse_or(&lookup, "PAGE_SIZE", DEFAULT_PAGE_SIZE);
        let page_size = if (1..=MAX_PAGE_SIZE).contains(&page_size) {
            page_size
        } else {
            warn!(
                "PAGE_SIZE {} outside 1..={}, using default {}",
                page_size, MAX_PAGE_SIZE, DEFAULT_PAGE_SIZE
            );
            DEFAULT_PAGE_SIZE
        };

        Ok(Self {
            database_url,
            bind_addr,
            public_base_url,
            short_link_prefix,
            page_size,
        })
    }

    /// Absolute URL of a stored image.
    pub fn media_url(&self, image_id: uuid::Uuid) -> String {
        format!("{}/media/{}", self.public_base_url, image_id)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display + Copy,
    T::Err: Display,
{
    match lookup(key) {
        None => {
            info!("{key} not set, using default: {default}");
            default
        }
        Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value {raw:?}: {e}, using default: {default}");
            default
        }),
    }
}
