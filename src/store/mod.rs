//! In-memory entity store.
//!
//! Stands in for the host runtime's keyed entity storage. The reducer only
//! ever goes through the primitives here (get-or-fail, get-or-create,
//! insert), so swapping in a persistent backend means reimplementing this
//! surface, not the reducer.

use anyhow::{bail, Result};
use rustc_hash::FxHashMap;

pub mod models;

use models::{ManagerState, PoolRecord, PoolSnapshot};

#[derive(Debug, Default)]
pub struct EntityStore {
    pools: FxHashMap<u64, PoolRecord>,
    manager: Option<ManagerState>,
    snapshots: FxHashMap<String, PoolSnapshot>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a pool that must already exist.
    ///
    /// A miss means the event stream violated causal order (a deposit,
    /// withdraw, set or migrate arrived before the matching add); the
    /// caller fails the event rather than reconciling.
    pub fn pool(&self, pid: u64) -> Result<&PoolRecord> {
        match self.pools.get(&pid) {
            Some(pool) => Ok(pool),
            None => bail!("pool {pid} not found; event stream out of order"),
        }
    }

    pub fn pool_mut(&mut self, pid: u64) -> Result<&mut PoolRecord> {
        match self.pools.get_mut(&pid) {
            Some(pool) => Ok(pool),
            None => bail!("pool {pid} not found; event stream out of order"),
        }
    }

    pub fn insert_pool(&mut self, pool: PoolRecord) -> Result<()> {
        let pid = pool.pid;
        if self.pools.insert(pid, pool).is_some() {
            bail!("pool {pid} already exists; duplicate add");
        }

        Ok(())
    }

    /// The singleton aggregate, created lazily at zero on first access.
    pub fn manager_mut(&mut self) -> &mut ManagerState {
        self.manager.get_or_insert_with(ManagerState::default)
    }

    pub fn manager(&self) -> Option<&ManagerState> {
        self.manager.as_ref()
    }

    /// Snapshot row for `(pid, bucket_start)`, created on first write
    /// within the bucket. Identity fields are set once on creation; value
    /// fields are the caller's to overwrite.
    pub fn snapshot_entry(&mut self, pid: u64, bucket_start: u64) -> &mut PoolSnapshot {
        self.snapshots
            .entry(PoolSnapshot::key(pid, bucket_start))
            .or_insert_with(|| PoolSnapshot::new(pid, bucket_start))
    }

    pub fn snapshot(&self, pid: u64, bucket_start: u64) -> Option<&PoolSnapshot> {
        self.snapshots.get(&PoolSnapshot::key(pid, bucket_start))
    }

    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    pub fn snapshot_count(&self) -> usize {
        self.snapshots.len()
    }

    pub fn pools(&self) -> impl Iterator<Item = &PoolRecord> {
        self.pools.values()
    }

    pub fn snapshots(&self) -> impl Iterator<Item = &PoolSnapshot> {
        self.snapshots.values()
    }
}
