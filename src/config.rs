use std::env;
use std::time::Duration;

use url::Url;

pub const DEFAULT_ALCHEMY_BASE_URL: &str = "https://base-mainnet.g.alchemy.com/v2";
/// Largest page `alchemy_getAssetTransfers` will return.
pub const MAX_TRANSFER_PAGE_SIZE: u32 = 1000;
pub const DEFAULT_MAX_PAGES: u32 = 100;
pub const DEFAULT_RECEIPT_BATCH_SIZE: usize = 100;

#[derive(Debug, Clone)]
pub struct Config {
    pub alchemy: AlchemyConfig,
    pub pipeline: PipelineConfig,
    pub http_bind_addr: String,
}

/// Connection settings for the indexing provider.
#[derive(Debug, Clone)]
pub struct AlchemyConfig {
    pub rpc_url: Url,
    pub page_size: u32,
    pub max_pages: u32,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub receipt_batch_size: usize,
    /// Upper bound on one full aggregation run; `None` disables it.
    pub deadline: Option<Duration>,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("missing ALCHEMY_API_KEY env var")]
    MissingAlchemyApiKey,
    #[error("invalid provider url {url}: {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("invalid value for {name}: {value}")]
    InvalidNumber { name: &'static str, value: String },
}

impl AlchemyConfig {
    pub fn new(rpc_url: Url) -> Self {
        Self {
            rpc_url,
            page_size: MAX_TRANSFER_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            receipt_batch_size: DEFAULT_RECEIPT_BATCH_SIZE,
            deadline: Some(Duration::from_secs(120)),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any variable source; `lookup` returns `None`
    /// for unset names.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let rpc_url = match lookup("ALCHEMY_RPC_URL") {
            Some(full) => parse_url(&full)?,
            None => {
                let api_key = lookup("ALCHEMY_API_KEY")
                    .filter(|k| !k.trim().is_empty())
                    .ok_or(ConfigError::MissingAlchemyApiKey)?;
                let base = lookup("ALCHEMY_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_ALCHEMY_BASE_URL.to_string());
                parse_url(&format!("{}/{}", base.trim_end_matches('/'), api_key.trim()))?
            }
        };

        let page_size = number(&lookup, "ALCHEMY_PAGE_SIZE", MAX_TRANSFER_PAGE_SIZE)?
            .clamp(1, MAX_TRANSFER_PAGE_SIZE);
        let max_pages = number(&lookup, "ALCHEMY_MAX_PAGES", DEFAULT_MAX_PAGES)?.max(1);
        let request_timeout =
            Duration::from_secs(number(&lookup, "HTTP_TIMEOUT_SECS", 30u64)?.max(1));

        let receipt_batch_size =
            number(&lookup, "RECEIPT_BATCH_SIZE", DEFAULT_RECEIPT_BATCH_SIZE)?.max(1);
        let deadline = match number(&lookup, "PIPELINE_DEADLINE_SECS", 120u64)? {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        let http_bind_addr = lookup("HTTP_BIND").unwrap_or_else(|| "127.0.0.1:8080".to_string());

        Ok(Self {
            alchemy: AlchemyConfig {
                rpc_url,
                page_size,
                max_pages,
                request_timeout,
            },
            pipeline: PipelineConfig {
                receipt_batch_size,
                deadline,
            },
            http_bind_addr,
        })
    }
}

fn parse_url(raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|source| ConfigError::InvalidUrl {
        // Never echo the key-bearing path back into logs.
        url: redact_path(raw),
        source,
    })
}

fn redact_path(raw: &str) -> String {
    match raw.split_once("://") {
        Some((scheme, rest)) => {
            let host = rest.split('/').next().unwrap_or_default();
            format!("{}://{}/…", scheme, host)
        }
        None => "<unparseable>".to_string(),
    }
}

fn number<T, F>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
        None => Ok(default),
    }
}
