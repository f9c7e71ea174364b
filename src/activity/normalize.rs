use chrono::DateTime;

use crate::models::{NormalizedTransaction, RawTransfer, ReceiptMap};

/// Milliseconds since the epoch for an RFC 3339 block timestamp.
pub fn block_time_millis(raw: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.timestamp_millis())
}

/// Maps provider records onto [`NormalizedTransaction`], attaching receipts
/// by lower-cased hash. Missing optional fields fall back to defaults.
pub fn normalize(transfers: &[RawTransfer], receipts: &ReceiptMap) -> Vec<NormalizedTransaction> {
    transfers
        .iter()
        .map(|transfer| normalize_one(transfer, receipts))
        .collect()
}

fn normalize_one(transfer: &RawTransfer, receipts: &ReceiptMap) -> NormalizedTransaction {
    let receipt = receipts.get(&transfer.hash.to_lowercase());

    NormalizedTransaction {
        hash: transfer.hash.clone(),
        timestamp: block_time_millis(&transfer.metadata.block_timestamp)
            .map(|ms| ms.div_euclid(1000)),
        from: transfer.from.to_lowercase(),
        to: transfer
            .to
            .as_deref()
            .filter(|to| !to.is_empty())
            .map(str::to_lowercase),
        value: transfer
            .value
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_else(|| "0".to_string()),
        is_error: false,
        is_contract_interaction: !transfer.category.is_native(),
        gas_used: receipt.map(|r| r.gas_used.clone()),
        effective_gas_price: receipt.map(|r| r.effective_gas_price.clone()),
    }
}
