use std::collections::HashSet;

use crate::models::RawTransfer;

/// Keeps the first transfer seen for each hash, preserving input order.
///
/// The outbound and inbound listings overlap on self-transfers, and the
/// provider emits one record per asset movement, so a single transaction can
/// appear several times. Hashes compare case-insensitively.
pub fn deduplicate<I>(transfers: I) -> Vec<RawTransfer>
where
    I: IntoIterator<Item = RawTransfer>,
{
    let mut seen = HashSet::new();
    transfers
        .into_iter()
        .filter(|transfer| seen.insert(transfer.hash.to_ascii_lowercase()))
        .collect()
}
