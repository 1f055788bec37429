use crate::blockchain::client::NodeApi;
use crate::blockchain::models::{parse_quantity, RpcBlock};
use crate::blockchain::processor::{process_block, ProcessError};
use crate::db::checkpoint;
use crate::state::AppState;
use futures::future::join_all;
use std::cmp::min;
use std::sync::Arc;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Controller state. `Polling` waits for the timer between single-block
/// ticks; `Syncing` is the batched catch-up entered when the tip is more than
/// one block ahead. The two are never active at the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Polling,
    Syncing,
}

pub struct Crawler {
    state: Arc<AppState>,
    node: Arc<dyn NodeApi>,
    mode: Mode,
}

impl Crawler {
    pub fn new(state: Arc<AppState>, node: Arc<dyn NodeApi>) -> Self {
        Self {
            state,
            node,
            mode: Mode::Polling,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Main loop: one tick per polling interval until shutdown. A tick runs
    /// to completion before the next one can fire (catch-up included), so at
    /// most one block-processing pipeline is ever active.
    pub async fn run(mut self, shutdown: CancellationToken) {
        let polling_interval = self.state.config.polling_interval;
        info!("Starting block crawler, polling every {:?}", polling_interval);

        let mut ticker = interval(polling_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.tick().await {
                        error!("Crawl tick failed: {}", e);
                    }
                }
                _ = shutdown.cancelled() => {
                    info!("Shutting down block crawler");
                    break;
                }
            }
        }
    }

    /// One polling step: fetch the block after the checkpoint, process it,
    /// and enter catch-up if the tip has moved further ahead. A block the
    /// node has not produced yet is a no-op, retried on the next tick.
    pub async fn tick(&mut self) -> Result<(), ProcessError> {
        let next = self.next_block_number().await?;

        debug!("fetching block {}", next);
        let Some(block) = self.node.fetch_block(next).await? else {
            debug!("block {} not found", next);
            return Ok(());
        };

        process_block(
            self.node.as_ref(),
            &self.state.db_pool,
            self.state.config.chain_id,
            &block,
        )
        .await?;

        let tip = self.node.block_number().await?;
        if tip > next + 1 {
            info!(
                "Tip is {}, we're {} blocks behind, entering catch-up",
                tip,
                tip - next
            );
            self.mode = Mode::Syncing;
            let result = self.catch_up(next).await;
            self.mode = Mode::Polling;
            result?;
        } else {
            info!("Synced with chain tip {}", tip);
        }

        Ok(())
    }

    async fn next_block_number(&self) -> Result<u64, ProcessError> {
        let checkpoint =
            checkpoint::get_checkpoint(&self.state.db_pool, self.state.config.chain_id).await?;

        Ok(checkpoint.map(|c| c.number as u64 + 1).unwrap_or(1))
    }

    /// Batched catch-up: fetch up to `polling_batch_size` blocks at once,
    /// then process them strictly in ascending order so the checkpoint always
    /// covers a contiguous prefix. Repeats until the tip is within one block,
    /// or bails back to polling on an empty batch.
    async fn catch_up(&self, mut last_processed: u64) -> Result<(), ProcessError> {
        let batch_size = self.state.config.polling_batch_size;

        loop {
            let tip = self.node.block_number().await?;
            if tip <= last_processed + 1 {
                info!("Synced with chain tip {}", tip);
                return Ok(());
            }

            let batch_start = last_processed + 1;
            let batch_end = min(tip, last_processed + batch_size);

            let mut blocks = self.fetch_many(batch_start, batch_end).await?;
            if blocks.is_empty() {
                warn!(
                    "no blocks found in {}..={}, falling back to polling",
                    batch_start, batch_end
                );
                return Ok(());
            }

            info!("{} blocks fetched, processing {}..={}", blocks.len(), batch_start, batch_end);
            blocks.sort_by_key(|block| parse_quantity(&block.number).unwrap_or(0));

            for block in &blocks {
                process_block(
                    self.node.as_ref(),
                    &self.state.db_pool,
                    self.state.config.chain_id,
                    block,
                )
                .await?;
            }

            if let Some(last) = blocks.last().and_then(|b| parse_quantity(&b.number)) {
                last_processed = last;
            }
        }
    }

    /// Concurrent range fetch. Blocks the node does not have yet are simply
    /// absent from the result.
    async fn fetch_many(&self, start: u64, end: u64) -> Result<Vec<RpcBlock>, ProcessError> {
        debug!("fetching blocks {}..={}", start, end);

        let results = join_all((start..=end).map(|number| self.node.fetch_block(number))).await;

        let mut blocks = Vec::new();
        for result in results {
            if let Some(block) = result? {
                blocks.push(block);
            }
        }

        Ok(blocks)
    }
}
