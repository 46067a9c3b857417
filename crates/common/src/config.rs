use std::env;
use std::time::Duration;
use anyhow::Result;

pub const DEFAULT_LISTING_URL: &str = "https://www.fmkorea.com/?mid=hotdeal";
pub const DEFAULT_SITE_ORIGIN: &str = "https://www.fmkorea.com";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

#[derive(Debug, Clone)]
pub struct HotDealConfig {
    pub listing_url: String,
    /// Prefixed to every collected post path to build absolute links.
    pub site_origin: String,
    /// Number of non-empty lines scanned from the start of the deal table.
    pub window_lines: usize,
    /// Number of leading deals that get their post page analyzed.
    pub max_analyzed: usize,
    pub listing_timeout: Duration,
    pub post_timeout: Duration,
}

impl Default for HotDealConfig {
    fn default() -> Self {
        Self {
            listing_url: DEFAULT_LISTING_URL.to_string(),
            site_origin: DEFAULT_SITE_ORIGIN.to_string(),
            window_lines: 60,
            max_analyzed: 10,
            listing_timeout: Duration::from_millis(30_000),
            post_timeout: Duration::from_millis(8_000),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
}

impl OutputFormat {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => OutputFormat::Json,
            _ => OutputFormat::Markdown,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub hot_deal: HotDealConfig,
    pub user_agent: String,
    pub output: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hot_deal: HotDealConfig::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            output: OutputFormat::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let defaults = HotDealConfig::default();

        let listing_url = env::var("DEALSTOCK_LISTING_URL")
            .map(|s| s.trim().to_string())
            .unwrap_or(defaults.listing_url);
        let site_origin = env::var("DEALSTOCK_SITE_ORIGIN")
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .unwrap_or(defaults.site_origin);

        if listing_url.is_empty() {
            anyhow::bail!("DEALSTOCK_LISTING_URL must not be empty");
        }
        if site_origin.is_empty() {
            anyhow::bail!("DEALSTOCK_SITE_ORIGIN must not be empty");
        }

        let hot_deal = HotDealConfig {
            listing_url,
            site_origin,
            window_lines: env::var("DEALSTOCK_WINDOW_LINES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.window_lines),
            max_analyzed: env::var("DEALSTOCK_MAX_ANALYZED")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_analyzed),
            listing_timeout: env::var("DEALSTOCK_LISTING_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.listing_timeout),
            post_timeout: env::var("DEALSTOCK_POST_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.post_timeout),
        };

        Ok(Config {
            hot_deal,
            user_agent: env::var("DEALSTOCK_USER_AGENT")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            output: env::var("DEALSTOCK_OUTPUT")
                .map(|s| OutputFormat::parse(&s))
                .unwrap_or_default(),
        })
    }
}
