use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Which side of a transfer the queried address sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Outbound,
    Inbound,
}

impl Direction {
    /// Filter key used by `alchemy_getAssetTransfers`.
    pub fn param_key(self) -> &'static str {
        match self {
            Direction::Outbound => "fromAddress",
            Direction::Inbound => "toAddress",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Outbound => f.write_str("outbound"),
            Direction::Inbound => f.write_str("inbound"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum TransferCategory {
    External,
    Internal,
    Erc20,
    Erc721,
    Erc1155,
    SpecialNft,
    Other(String),
}

impl TransferCategory {
    pub fn is_native(&self) -> bool {
        matches!(self, TransferCategory::External)
    }

    pub fn as_str(&self) -> &str {
        match self {
            TransferCategory::External => "external",
            TransferCategory::Internal => "internal",
            TransferCategory::Erc20 => "erc20",
            TransferCategory::Erc721 => "erc721",
            TransferCategory::Erc1155 => "erc1155",
            TransferCategory::SpecialNft => "specialnft",
            TransferCategory::Other(raw) => raw,
        }
    }
}

impl From<String> for TransferCategory {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "external" => TransferCategory::External,
            "internal" => TransferCategory::Internal,
            "erc20" => TransferCategory::Erc20,
            "erc721" => TransferCategory::Erc721,
            "erc1155" => TransferCategory::Erc1155,
            "specialnft" => TransferCategory::SpecialNft,
            _ => TransferCategory::Other(raw),
        }
    }
}

/// A transfer as returned by the indexing provider.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransfer {
    pub hash: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: Option<String>,
    /// Whole units of the asset, exactly as the provider wrote it.
    #[serde(default)]
    pub value: Option<serde_json::Number>,
    pub category: TransferCategory,
    #[serde(default)]
    pub block_num: Option<String>,
    #[serde(default)]
    pub metadata: TransferMetadata,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferMetadata {
    #[serde(default)]
    pub block_timestamp: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferPage {
    #[serde(default)]
    pub transfers: Vec<RawTransfer>,
    #[serde(default)]
    pub page_key: Option<String>,
}

/// Gas fields of a mined transaction, as base-unit integer strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub gas_used: String,
    pub effective_gas_price: String,
}

/// Receipts keyed by lower-cased transaction hash.
pub type ReceiptMap = HashMap<String, TransactionReceipt>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedTransaction {
    pub hash: String,
    /// Unix seconds; `None` when the provider timestamp could not be parsed.
    pub timestamp: Option<i64>,
    pub from: String,
    pub to: Option<String>,
    pub value: String,
    pub is_error: bool,
    pub is_contract_interaction: bool,
    pub gas_used: Option<String>,
    pub effective_gas_price: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySummary {
    pub total_transactions: usize,
    pub unique_days_active: usize,
    pub first_tx_timestamp: Option<i64>,
    pub last_tx_timestamp: Option<i64>,
    pub contract_interactions: usize,
    pub activity_period_days: u64,
    pub gas_spent_wei: String,
    pub total_volume_wei: String,
    pub malformed_records: usize,
}

impl Default for ActivitySummary {
    fn default() -> Self {
        Self {
            total_transactions: 0,
            unique_days_active: 0,
            first_tx_timestamp: None,
            last_tx_timestamp: None,
            contract_interactions: 0,
            activity_period_days: 0,
            gas_spent_wei: "0".to_string(),
            total_volume_wei: "0".to_string(),
            malformed_records: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub date: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityResult {
    pub transactions: Vec<NormalizedTransaction>,
    pub summary: ActivitySummary,
    pub daily_counts: Vec<DailyCount>,
}

/// `0x` followed by exactly 40 hex digits.
pub fn is_valid_address(address: &str) -> bool {
    address
        .strip_prefix("0x")
        .map(|hex| hex.len() == 40 && hex.bytes().all(|b| b.is_ascii_hexdigit()))
        .unwrap_or(false)
}
