use tracing::{debug, warn};

use crate::{
    alchemy::AlchemyClient,
    models::ReceiptMap,
    pipeline_stats::PIPELINE_STATS,
};

/// Fetches receipts for `hashes` in sequential batches of `batch_size`.
///
/// A failed batch is logged and contributes nothing; later batches still run.
/// Missing receipts only lower the gas figure, so this never fails.
pub async fn enrich(client: &AlchemyClient, hashes: &[String], batch_size: usize) -> ReceiptMap {
    let mut receipts = ReceiptMap::with_capacity(hashes.len());
    let batch_size = batch_size.max(1);

    for (index, batch) in hashes.chunks(batch_size).enumerate() {
        PIPELINE_STATS.inc_receipt_batches();
        match client.fetch_receipts(batch).await {
            Ok(found) => {
                debug!(
                    batch = index,
                    requested = batch.len(),
                    resolved = found.len(),
                    "receipt batch fetched"
                );
                receipts.extend(found);
            }
            Err(err) => {
                PIPELINE_STATS.inc_failed_receipt_batches();
                warn!(
                    batch = index,
                    requested = batch.len(),
                    status = ?err.status(),
                    "receipt batch failed, continuing without it: {}",
                    err
                );
            }
        }
    }

    receipts
}
