//! Wallet activity aggregation: fetch both transfer directions, collapse them
//! into one newest-first transaction list, attach gas receipts for the
//! transactions the wallet sent, and derive summary statistics.

pub mod dedup;
pub mod metrics;
pub mod normalize;
pub mod receipts;
pub mod sort;
pub mod units;

use std::time::{Duration, Instant};

use futures_util::{future::try_join, TryFutureExt};
use tracing::{info, warn};

use crate::{
    alchemy::{AlchemyClient, ProviderError},
    config::{AlchemyConfig, Config, PipelineConfig},
    models::{ActivityResult, Direction},
    pipeline_stats::PIPELINE_STATS,
};

pub use dedup::deduplicate;
pub use metrics::{calculate, daily_counts};
pub use normalize::normalize;
pub use sort::sort_by_time_desc;

#[derive(thiserror::Error, Debug)]
pub enum ActivityError {
    #[error("failed to fetch {direction} transfers: {source}")]
    Fetch {
        direction: Direction,
        #[source]
        source: ProviderError,
    },
    #[error("activity aggregation exceeded its {0:?} deadline")]
    DeadlineExceeded(Duration),
}

pub struct ActivityPipeline {
    client: AlchemyClient,
    config: PipelineConfig,
}

impl ActivityPipeline {
    pub fn new(alchemy: AlchemyConfig, config: PipelineConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: AlchemyClient::new(alchemy)?,
            config,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ProviderError> {
        Self::new(config.alchemy.clone(), config.pipeline.clone())
    }

    /// Full activity report for `address`, which must already be a valid
    /// `0x`-prefixed account address.
    ///
    /// Either transfer listing failing fails the whole call. Receipt batches
    /// that fail only leave their transactions without gas data.
    pub async fn get_activity_summary(&self, address: &str) -> Result<ActivityResult, ActivityError> {
        let started = Instant::now();
        let outcome = match self.config.deadline {
            Some(deadline) => tokio::time::timeout(deadline, self.aggregate(address))
                .await
                .unwrap_or(Err(ActivityError::DeadlineExceeded(deadline))),
            None => self.aggregate(address).await,
        };

        match &outcome {
            Ok(result) => {
                PIPELINE_STATS.inc_summaries();
                info!(
                    address,
                    transactions = result.summary.total_transactions,
                    days_active = result.summary.unique_days_active,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "activity summary built"
                );
            }
            Err(err) => {
                PIPELINE_STATS.inc_failed_summaries();
                warn!(address, "activity summary failed: {}", err);
            }
        }
        outcome
    }

    async fn aggregate(&self, address: &str) -> Result<ActivityResult, ActivityError> {
        let outbound = self
            .client
            .fetch_transfers(address, Direction::Outbound)
            .map_err(|source| ActivityError::Fetch {
                direction: Direction::Outbound,
                source,
            });
        let inbound = self
            .client
            .fetch_transfers(address, Direction::Inbound)
            .map_err(|source| ActivityError::Fetch {
                direction: Direction::Inbound,
                source,
            });
        let (outbound, inbound) = try_join(outbound, inbound).await?;

        let unique = deduplicate(outbound.into_iter().chain(inbound));
        let sorted = sort_by_time_desc(unique);

        let sent: Vec<String> = sorted
            .iter()
            .filter(|t| t.from.eq_ignore_ascii_case(address))
            .map(|t| t.hash.clone())
            .collect();
        let receipts = receipts::enrich(&self.client, &sent, self.config.receipt_batch_size).await;

        let transactions = normalize(&sorted, &receipts);
        let (summary, daily_counts) = calculate(&transactions, address);

        if summary.malformed_records > 0 {
            PIPELINE_STATS.inc_malformed_records(summary.malformed_records as u64);
            warn!(
                address,
                count = summary.malformed_records,
                "transfers with unparseable timestamps left out of the daily histogram"
            );
        }

        Ok(ActivityResult {
            transactions,
            summary,
            daily_counts,
        })
    }
}
