use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::{
    config::AlchemyConfig,
    models::{Direction, RawTransfer, ReceiptMap, TransactionReceipt, TransferPage},
    pipeline_stats::PIPELINE_STATS,
};

pub const PROVIDER: &str = "Alchemy";

/// Transfer categories requested from the provider.
const CATEGORIES: [&str; 4] = ["external", "erc20", "erc721", "erc1155"];

#[derive(thiserror::Error, Debug)]
pub enum ProviderError {
    #[error("{provider} request failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{provider} API error: HTTP {status}")]
    Status { provider: &'static str, status: u16 },
    #[error("{provider} error {code}: {message}")]
    Rpc {
        provider: &'static str,
        code: i64,
        message: String,
    },
    #[error("{provider} returned an undecodable response: {message}")]
    Decode {
        provider: &'static str,
        message: String,
    },
    #[error("{provider} pagination exceeded {limit} pages")]
    PaginationLimitExceeded { provider: &'static str, limit: u32 },
}

impl ProviderError {
    pub fn provider(&self) -> &'static str {
        match self {
            ProviderError::Transport { provider, .. }
            | ProviderError::Status { provider, .. }
            | ProviderError::Rpc { provider, .. }
            | ProviderError::Decode { provider, .. }
            | ProviderError::PaginationLimitExceeded { provider, .. } => provider,
        }
    }

    /// HTTP status of the failed call, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::Status { status, .. } => Some(*status),
            ProviderError::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RpcError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    #[serde(default)]
    id: Option<Value>,
    result: Option<T>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReceipt {
    #[serde(default)]
    transaction_hash: Option<String>,
    #[serde(default)]
    gas_used: Option<String>,
    #[serde(default)]
    effective_gas_price: Option<String>,
}

/// JSON-RPC client for Alchemy's transfer index and receipt lookups.
#[derive(Clone)]
pub struct AlchemyClient {
    http: reqwest::Client,
    config: AlchemyConfig,
}

impl AlchemyClient {
    pub fn new(config: AlchemyConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .no_proxy()
            .timeout(config.request_timeout)
            .build()
            .map_err(|source| ProviderError::Transport {
                provider: PROVIDER,
                source,
            })?;
        Ok(Self { http, config })
    }

    /// Every transfer on one side of `address`, following `pageKey` until the
    /// provider stops returning one.
    pub async fn fetch_transfers(
        &self,
        address: &str,
        direction: Direction,
    ) -> Result<Vec<RawTransfer>, ProviderError> {
        let mut all = Vec::new();
        let mut page_key: Option<String> = None;
        let mut pages = 0u32;

        loop {
            if pages >= self.config.max_pages {
                return Err(ProviderError::PaginationLimitExceeded {
                    provider: PROVIDER,
                    limit: self.config.max_pages,
                });
            }

            let page = self
                .fetch_transfer_page(address, direction, page_key.as_deref())
                .await?;
            pages += 1;
            PIPELINE_STATS.inc_transfer_pages(1);
            debug!(
                %direction,
                page = pages,
                transfers = page.transfers.len(),
                "fetched transfer page"
            );

            all.extend(page.transfers);
            match page.page_key {
                Some(next) if !next.is_empty() => page_key = Some(next),
                _ => break,
            }
        }

        Ok(all)
    }

    async fn fetch_transfer_page(
        &self,
        address: &str,
        direction: Direction,
        page_key: Option<&str>,
    ) -> Result<TransferPage, ProviderError> {
        let mut params = json!({
            "category": CATEGORIES,
            "maxCount": format!("{:#x}", self.config.page_size),
            "order": "desc",
            "withMetadata": true,
        });
        params[direction.param_key()] = json!(address);
        if let Some(key) = page_key {
            params["pageKey"] = json!(key);
        }

        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "alchemy_getAssetTransfers",
            "params": [params],
        });

        let response: RpcResponse<TransferPage> = self.post(&body).await?;
        if let Some(err) = response.error {
            return Err(ProviderError::Rpc {
                provider: PROVIDER,
                code: err.code,
                message: err.message,
            });
        }
        Ok(response.result.unwrap_or_default())
    }

    /// Looks up receipts for `hashes` in one JSON-RPC batch. Hashes the node
    /// cannot resolve are absent from the returned map.
    pub async fn fetch_receipts(&self, hashes: &[String]) -> Result<ReceiptMap, ProviderError> {
        let mut receipts = ReceiptMap::new();
        if hashes.is_empty() {
            return Ok(receipts);
        }

        let batch: Vec<Value> = hashes
            .iter()
            .enumerate()
            .map(|(id, hash)| {
                json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "method": "eth_getTransactionReceipt",
                    "params": [hash],
                })
            })
            .collect();

        let responses: Vec<RpcResponse<RawReceipt>> = self.post(&batch).await?;
        let by_id: HashMap<u64, &String> = hashes
            .iter()
            .enumerate()
            .map(|(id, hash)| (id as u64, hash))
            .collect();

        for response in responses {
            let Some(raw) = response.result else {
                continue;
            };
            let (Some(gas_used), Some(effective_gas_price)) =
                (raw.gas_used, raw.effective_gas_price)
            else {
                continue;
            };
            let hash = raw.transaction_hash.or_else(|| {
                response
                    .id
                    .as_ref()
                    .and_then(Value::as_u64)
                    .and_then(|id| by_id.get(&id))
                    .map(|hash| hash.to_string())
            });
            if let Some(hash) = hash {
                receipts.insert(
                    hash.to_lowercase(),
                    TransactionReceipt {
                        gas_used,
                        effective_gas_price,
                    },
                );
            }
        }

        Ok(receipts)
    }

    async fn post<B, T>(&self, body: &B) -> Result<T, ProviderError>
    where
        B: serde::Serialize + ?Sized,
        T: serde::de::DeserializeOwned,
    {
        let response = self
            .http
            .post(self.config.rpc_url.clone())
            .json(body)
            .send()
            .await
            .map_err(|source| ProviderError::Transport {
                provider: PROVIDER,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                provider: PROVIDER,
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| ProviderError::Transport {
                provider: PROVIDER,
                source,
            })?;
        serde_json::from_slice(&bytes).map_err(|e| ProviderError::Decode {
            provider: PROVIDER,
            message: e.to_string(),
        })
    }
}
