use std::cmp::Ordering;

use crate::models::RawTransfer;

use super::normalize::block_time_millis;

/// Orders transfers newest first. The sort is stable, so transfers mined at
/// the same instant keep their relative order. Transfers whose timestamp does
/// not parse go last.
pub fn sort_by_time_desc(transfers: Vec<RawTransfer>) -> Vec<RawTransfer> {
    let mut keyed: Vec<(Option<i64>, RawTransfer)> = transfers
        .into_iter()
        .map(|t| (block_time_millis(&t.metadata.block_timestamp), t))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    keyed.into_iter().map(|(_, t)| t).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TransferCategory, TransferMetadata};

    fn transfer(hash: &str, ts: &str) -> RawTransfer {
        RawTransfer {
            hash: hash.to_string(),
            from: "0x1".to_string(),
            to: None,
            value: None,
            category: TransferCategory::Erc20,
            block_num: None,
            metadata: TransferMetadata {
                block_timestamp: ts.to_string(),
            },
        }
    }

    fn hashes(transfers: &[RawTransfer]) -> Vec<&str> {
        transfers.iter().map(|t| t.hash.as_str()).collect()
    }

    #[test]
    fn newest_first() {
        let sorted = sort_by_time_desc(vec![
            transfer("old", "2023-05-01T00:00:00.000Z"),
            transfer("new", "2024-02-01T10:00:00.000Z"),
            transfer("mid", "2023-12-31T23:59:59.000Z"),
        ]);
        assert_eq!(hashes(&sorted), vec!["new", "mid", "old"]);
    }

    #[test]
    fn equal_timestamps_keep_input_order() {
        let sorted = sort_by_time_desc(vec![
            transfer("a", "2024-01-01T00:00:00.000Z"),
            transfer("b", "2024-01-02T00:00:00.000Z"),
            transfer("c", "2024-01-01T00:00:00.000Z"),
            transfer("d", "2024-01-01T00:00:00.000Z"),
        ]);
        assert_eq!(hashes(&sorted), vec!["b", "a", "c", "d"]);
    }

    #[test]
    fn sub_second_precision_orders_within_a_second() {
        let sorted = sort_by_time_desc(vec![
            transfer("first", "2024-01-01T00:00:00.100Z"),
            transfer("second", "2024-01-01T00:00:00.900Z"),
        ]);
        assert_eq!(hashes(&sorted), vec!["second", "first"]);
    }

    #[test]
    fn malformed_timestamps_sink_to_the_end() {
        let sorted = sort_by_time_desc(vec![
            transfer("bad1", "not a date"),
            transfer("ok", "2024-01-01T00:00:00.000Z"),
            transfer("bad2", ""),
        ]);
        assert_eq!(hashes(&sorted), vec!["ok", "bad1", "bad2"]);
    }
}
