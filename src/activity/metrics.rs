use std::collections::BTreeMap;

use chrono::DateTime;
use ethers_core::types::U256;
use tracing::warn;

use crate::models::{ActivitySummary, DailyCount, NormalizedTransaction};

use super::units::{parse_base_units, whole_units_to_base, NATIVE_DECIMALS};

const SECONDS_PER_DAY: i64 = 86_400;

/// UTC calendar date (`YYYY-MM-DD`) of a Unix timestamp in seconds.
pub fn utc_date(timestamp: i64) -> Option<String> {
    DateTime::from_timestamp(timestamp, 0).map(|dt| dt.format("%Y-%m-%d").to_string())
}

/// Derives the summary and per-day histogram for `address` from its
/// normalized transactions. Input order does not matter.
pub fn calculate(
    transactions: &[NormalizedTransaction],
    address: &str,
) -> (ActivitySummary, Vec<DailyCount>) {
    if transactions.is_empty() {
        return (ActivitySummary::default(), Vec::new());
    }

    let address = address.to_lowercase();
    let daily_counts = daily_counts(transactions);
    let dated: usize = daily_counts.iter().map(|d| d.count).sum();

    let first = transactions.iter().filter_map(dated_timestamp).min();
    let last = transactions.iter().filter_map(dated_timestamp).max();
    let activity_period_days = match (first, last) {
        (Some(first), Some(last)) => activity_period_days(first, last),
        _ => 0,
    };

    let contract_interactions = transactions
        .iter()
        .filter(|tx| tx.is_contract_interaction)
        .count();

    let outbound: Vec<&NormalizedTransaction> =
        transactions.iter().filter(|tx| tx.from == address).collect();

    let summary = ActivitySummary {
        total_transactions: transactions.len(),
        unique_days_active: daily_counts.len(),
        first_tx_timestamp: first,
        last_tx_timestamp: last,
        contract_interactions,
        activity_period_days,
        gas_spent_wei: gas_spent(&outbound).to_string(),
        total_volume_wei: native_volume(&outbound).to_string(),
        malformed_records: transactions.len() - dated,
    };

    (summary, daily_counts)
}

/// One entry per UTC date with at least one transaction, oldest date first.
/// Transactions without a usable timestamp are left out.
pub fn daily_counts(transactions: &[NormalizedTransaction]) -> Vec<DailyCount> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for tx in transactions {
        if let Some(date) = tx.timestamp.and_then(utc_date) {
            *counts.entry(date).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .map(|(date, count)| DailyCount { date, count })
        .collect()
}

/// Inclusive number of days spanned by `[first, last]`.
pub fn activity_period_days(first: i64, last: i64) -> u64 {
    let span = (last - first).max(0);
    let days = (span + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY;
    days as u64 + 1
}

fn dated_timestamp(tx: &NormalizedTransaction) -> Option<i64> {
    tx.timestamp.filter(|ts| utc_date(*ts).is_some())
}

fn gas_spent(outbound: &[&NormalizedTransaction]) -> U256 {
    let mut total = U256::zero();
    for tx in outbound {
        let (Some(gas_used), Some(price)) = (&tx.gas_used, &tx.effective_gas_price) else {
            continue;
        };
        let fee = match (parse_base_units(gas_used), parse_base_units(price)) {
            (Some(gas_used), Some(price)) => gas_used.checked_mul(price),
            _ => None,
        };
        match fee.and_then(|fee| total.checked_add(fee)) {
            Some(sum) => total = sum,
            None => warn!(
                hash = %tx.hash,
                gas_used = %gas_used,
                price = %price,
                "skipping unusable receipt values"
            ),
        }
    }
    total
}

fn native_volume(outbound: &[&NormalizedTransaction]) -> U256 {
    let mut total = U256::zero();
    for tx in outbound.iter().filter(|tx| !tx.is_contract_interaction) {
        match whole_units_to_base(&tx.value, NATIVE_DECIMALS).and_then(|v| total.checked_add(v)) {
            Some(sum) => total = sum,
            None => warn!(hash = %tx.hash, value = %tx.value, "skipping unusable transfer value"),
        }
    }
    total
}
