//! Read-only view of MiningManager contract state.
//!
//! Pool creation and migration do not carry their parameters in the
//! observed call; the indexer reads them back through `poolLength()` and
//! `poolInfo(pid)`. This module is that seam: a live host backs it with
//! RPC, replay and tests back it with state recorded alongside the trace.

use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use async_trait::async_trait;
use num_bigint::BigUint;

/// One `poolInfo(pid)` result.
#[derive(Debug, Clone)]
pub struct PoolInfo {
    /// Staked LP token address (lowercase 0x-hex).
    pub lp_token: String,
    pub alloc_point: BigUint,
    pub last_reward_block: u64,
    pub acc_reward_per_share: BigUint,
}

/// Contract-state queries the reducer performs while applying events.
#[async_trait]
pub trait PoolRegistry: Send + Sync {
    /// Number of pools registered on the contract.
    async fn pool_length(&self) -> Result<u64>;

    /// Pool parameters by index.
    async fn pool_info(&self, pid: u64) -> Result<PoolInfo>;
}

/// Registry backed by contract state recorded alongside an event trace.
///
/// The replay worker reveals a pool right before the matching `add` call
/// is applied and swaps the LP token right before a `migrate`, so the
/// reducer observes the same contract state the live indexer saw.
#[derive(Clone, Default)]
pub struct RecordedRegistry {
    pools: Arc<Mutex<Vec<PoolInfo>>>,
}

impl RecordedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next recorded pool visible, as if `add` just executed.
    pub fn push_pool(&self, info: PoolInfo) {
        self.pools.lock().expect("registry mutex poisoned").push(info);
    }

    /// Record the LP token observed after a migration.
    pub fn set_lp_token(&self, pid: u64, lp_token: String) -> Result<()> {
        let mut pools = self.pools.lock().expect("registry mutex poisoned");
        match pools.get_mut(pid as usize) {
            Some(info) => {
                info.lp_token = lp_token;
                Ok(())
            },
            None => bail!("migration recorded for unknown pool {pid}"),
        }
    }
}

#[async_trait]
impl PoolRegistry for RecordedRegistry {
    async fn pool_length(&self) -> Result<u64> {
        Ok(self.pools.lock().expect("registry mutex poisoned").len() as u64)
    }

    async fn pool_info(&self, pid: u64) -> Result<PoolInfo> {
        let pools = self.pools.lock().expect("registry mutex poisoned");
        match pools.get(pid as usize) {
            Some(info) => Ok(info.clone()),
            None => bail!("poolInfo({pid}) out of range"),
        }
    }
}
