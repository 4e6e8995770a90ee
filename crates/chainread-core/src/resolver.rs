//! Timestamp → block resolution by binary search over block numbers.
//!
//! Assumes block timestamps never decrease with block number. Every probe is
//! a fresh failover `get_block`; nothing is cached between calls.

use chrono::Utc;

use crate::error::ReadError;
use crate::provider_set::ProviderSet;
use crate::types::Block;

/// Seconds in a day.
pub const DAY_SECS: u64 = 24 * 60 * 60;

impl ProviderSet {
    /// The block whose timestamp is closest to `target` (unix seconds),
    /// searching `[0, latest]`. Ties go to the lower block.
    pub async fn block_at_timestamp(&self, target: u64) -> Result<Block, ReadError> {
        let latest = self.get_block_number().await?;
        self.block_at_timestamp_between(target, 0, latest).await
    }

    /// Same as [`block_at_timestamp`](Self::block_at_timestamp) restricted
    /// to blocks `[lo, hi]`.
    pub async fn block_at_timestamp_between(
        &self,
        target: u64,
        mut lo: u64,
        mut hi: u64,
    ) -> Result<Block, ReadError> {
        if lo > hi {
            std::mem::swap(&mut lo, &mut hi);
        }

        while hi - lo > 1 {
            // round((lo + hi) / 2), halves rounding up
            let mid = lo + (hi - lo + 1) / 2;
            let probe = self.get_block(mid).await?;
            tracing::debug!(chain = self.name(), lo, hi, mid, timestamp = probe.timestamp, "probe");
            if probe.timestamp > target {
                hi = mid;
            } else {
                lo = mid;
            }
        }

        let (lo_block, hi_block) = tokio::try_join!(self.get_block(lo), self.get_block(hi))?;
        if target.abs_diff(lo_block.timestamp) > target.abs_diff(hi_block.timestamp) {
            Ok(hi_block)
        } else {
            Ok(lo_block)
        }
    }

    /// Blocks produced since `timestamp`: latest block number minus the
    /// number of the block closest to `timestamp`.
    ///
    /// The head is fetched alongside the search, so the count can be off by
    /// a block or two on a fast chain.
    pub async fn blocks_since(&self, timestamp: u64) -> Result<u64, ReadError> {
        let (then, latest) =
            tokio::try_join!(self.block_at_timestamp(timestamp), self.get_block_number())?;
        Ok(latest.saturating_sub(then.number))
    }

    /// Approximate number of blocks produced in the trailing 24 hours.
    pub async fn blocks_in_last_24_hours(&self) -> Result<u64, ReadError> {
        let now = u64::try_from(Utc::now().timestamp()).unwrap_or(0);
        self.blocks_since(now.saturating_sub(DAY_SECS)).await
    }
}
