//! Offline replay of a recorded MiningManager event trace.
//!
//! A live host feeds the reducer from its own chain subscription; replay
//! feeds it from a JSONL trace instead, one record per line, in the order
//! the chain produced them. `add` and `migrate` records carry the contract
//! state observed at that point in the stream, which drives the
//! [`RecordedRegistry`].

use std::time::{Duration, Instant};

use alloy::primitives::U256;
use anyhow::{Context, Result};
use log::info;
use serde::Deserialize;
use tokio::{
    fs::File,
    io::{AsyncBufReadExt, BufReader},
};

use crate::{
    store::EntityStore,
    utils::u256_to_biguint,
    worker::{
        parser::ManagerEvent,
        reducer::Reducer,
        registry::{PoolInfo, RecordedRegistry},
    },
};

/// Interval for logging replay progress.
const PROGRESS_LOG_INTERVAL: Duration = Duration::from_secs(10);

/// Contract state recorded for a pool at `add` time.
#[derive(Debug, Clone, Deserialize)]
pub struct PoolInfoRecord {
    pub lp_token: String,
    pub alloc_point: U256,
    #[serde(default)]
    pub last_reward_block: u64,
    #[serde(default)]
    pub acc_reward_per_share: U256,
}

/// One line of a trace file.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraceRecord {
    Deposit {
        pid: u64,
        amount: U256,
        timestamp: u64,
    },
    Withdraw {
        pid: u64,
        amount: U256,
        timestamp: u64,
    },
    EmergencyWithdraw {
        pid: u64,
        amount: U256,
        timestamp: u64,
    },
    /// `add` call plus the pool parameters observed right after it.
    AddPool {
        timestamp: u64,
        pool: PoolInfoRecord,
    },
    SetAllocPoint {
        pid: u64,
        alloc_point: U256,
        timestamp: u64,
    },
    /// `migrate` call plus the LP token observed right after it.
    Migrate {
        pid: u64,
        lp_token: String,
        timestamp: u64,
    },
    OwnershipTransferred,
}

/// Counters reported after a replay run.
#[derive(Debug, Default, Clone)]
pub struct ReplayStats {
    pub events: u64,
    pub deposits: u64,
    pub withdraws: u64,
    pub pool_adds: u64,
    pub alloc_point_sets: u64,
    pub migrations: u64,
}

pub struct ReplayWorker {
    registry: RecordedRegistry,
    reducer: Reducer<RecordedRegistry>,
}

impl ReplayWorker {
    pub fn new(registry: RecordedRegistry, reducer: Reducer<RecordedRegistry>) -> Self {
        Self { registry, reducer }
    }

    /// Stream a trace file through the reducer, strictly in file order.
    ///
    /// Stops at the first invalid record or failed application; a partial
    /// replay would silently corrupt the aggregates.
    pub async fn run(&self, path: &str, store: &mut EntityStore) -> Result<ReplayStats> {
        let file = File::open(path)
            .await
            .with_context(|| format!("failed to open trace file {path}"))?;
        let mut lines = BufReader::new(file).lines();

        let mut stats = ReplayStats::default();
        let mut last_progress_log = Instant::now();
        let mut line_no = 0u64;

        while let Some(line) = lines.next_line().await? {
            line_no += 1;
            if line.trim().is_empty() {
                continue;
            }

            let record: TraceRecord = serde_json::from_str(&line)
                .with_context(|| format!("malformed trace record at line {line_no}"))?;

            let event = self.stage(record, &mut stats)?;
            self.reducer
                .apply(store, &event)
                .await
                .with_context(|| format!("failed to apply trace record at line {line_no}"))?;
            stats.events += 1;

            if last_progress_log.elapsed() >= PROGRESS_LOG_INTERVAL {
                info!(
                    "replayed {} events ({} pools, {} snapshot rows)",
                    stats.events,
                    store.pool_count(),
                    store.snapshot_count()
                );
                last_progress_log = Instant::now();
            }
        }

        Ok(stats)
    }

    /// Feed a record's observed-state sidecar into the recorded registry
    /// and convert the record into the reducer's event type.
    fn stage(&self, record: TraceRecord, stats: &mut ReplayStats) -> Result<ManagerEvent> {
        Ok(match record {
            TraceRecord::Deposit {
                pid,
                amount,
                timestamp,
            } => {
                stats.deposits += 1;
                ManagerEvent::Deposit {
                    pid,
                    amount,
                    timestamp,
                }
            },
            TraceRecord::Withdraw {
                pid,
                amount,
                timestamp,
            } => {
                stats.withdraws += 1;
                ManagerEvent::Withdraw {
                    pid,
                    amount,
                    timestamp,
                }
            },
            TraceRecord::EmergencyWithdraw {
                pid,
                amount,
                timestamp,
            } => {
                stats.withdraws += 1;
                ManagerEvent::EmergencyWithdraw {
                    pid,
                    amount,
                    timestamp,
                }
            },
            TraceRecord::AddPool { timestamp, pool } => {
                stats.pool_adds += 1;
                self.registry.push_pool(PoolInfo {
                    lp_token: pool.lp_token,
                    alloc_point: u256_to_biguint(pool.alloc_point),
                    last_reward_block: pool.last_reward_block,
                    acc_reward_per_share: u256_to_biguint(pool.acc_reward_per_share),
                });
                ManagerEvent::PoolAdded { timestamp }
            },
            TraceRecord::SetAllocPoint {
                pid,
                alloc_point,
                timestamp,
            } => {
                stats.alloc_point_sets += 1;
                ManagerEvent::AllocPointSet {
                    pid,
                    alloc_point,
                    timestamp,
                }
            },
            TraceRecord::Migrate {
                pid,
                lp_token,
                timestamp,
            } => {
                stats.migrations += 1;
                self.registry.set_lp_token(pid, lp_token)?;
                ManagerEvent::Migrated { pid, timestamp }
            },
            TraceRecord::OwnershipTransferred => ManagerEvent::OwnershipTransferred,
        })
    }
}
