//! Event application rules for MiningManager activity.
//!
//! One event is applied fully (read, mutate, write) before the next
//! begins; the caller guarantees causal delivery order, so no two events
//! ever race on a pool or the aggregate. Any invariant violation fails the
//! event and propagates to the caller; masking it would corrupt the
//! running aggregates.

use anyhow::{ensure, Context, Result};
use log::debug;
use num_bigint::BigUint;

use crate::{
    store::{
        models::{Exchange, PoolRecord},
        EntityStore,
    },
    utils::{alloc_share, bucket_start, u256_to_biguint},
    worker::{parser::ManagerEvent, registry::PoolRegistry},
};

pub struct Reducer<R> {
    registry: R,
    snapshot_interval_secs: u64,
}

impl<R: PoolRegistry> Reducer<R> {
    pub fn new(registry: R, snapshot_interval_secs: u64) -> Self {
        Self {
            registry,
            snapshot_interval_secs,
        }
    }

    /// Apply a single event to the store.
    pub async fn apply(&self, store: &mut EntityStore, event: &ManagerEvent) -> Result<()> {
        match event {
            ManagerEvent::Deposit {
                pid,
                amount,
                timestamp,
            } => {
                let pool = store.pool_mut(*pid)?;
                pool.balance += u256_to_biguint(*amount);
                pool.touch(*timestamp);

                self.write_snapshot(store, *pid, *timestamp)
            },
            ManagerEvent::Withdraw {
                pid,
                amount,
                timestamp,
            }
            | ManagerEvent::EmergencyWithdraw {
                pid,
                amount,
                timestamp,
            } => {
                let amount = u256_to_biguint(*amount);
                let pool = store.pool_mut(*pid)?;
                ensure!(
                    pool.balance >= amount,
                    "withdraw of {amount} exceeds balance {} of pool {pid}",
                    pool.balance
                );
                pool.balance -= amount;
                pool.touch(*timestamp);

                self.write_snapshot(store, *pid, *timestamp)
            },
            ManagerEvent::PoolAdded { timestamp } => {
                self.handle_pool_added(store, *timestamp).await
            },
            ManagerEvent::AllocPointSet {
                pid,
                alloc_point,
                timestamp,
            } => self.handle_alloc_point_set(store, *pid, u256_to_biguint(*alloc_point), *timestamp),
            ManagerEvent::Migrated { pid, timestamp } => {
                self.handle_migrated(store, *pid, *timestamp).await
            },
            ManagerEvent::OwnershipTransferred => Ok(()),
        }
    }

    /// `add` observed: the new pool's index is the current pool count minus
    /// one, read from the contract rather than kept as a local counter.
    async fn handle_pool_added(&self, store: &mut EntityStore, timestamp: u64) -> Result<()> {
        let length = self
            .registry
            .pool_length()
            .await
            .context("poolLength query failed")?;
        ensure!(length > 0, "add observed but poolLength() is 0");
        let pid = length - 1;

        let info = self
            .registry
            .pool_info(pid)
            .await
            .with_context(|| format!("poolInfo({pid}) query failed"))?;

        debug!(
            "pool {pid} added: lp_token={} alloc_point={}",
            info.lp_token, info.alloc_point
        );

        store.insert_pool(PoolRecord::new(
            pid,
            info.lp_token,
            info.alloc_point.clone(),
            info.last_reward_block,
            info.acc_reward_per_share,
            timestamp,
        ))?;

        store.manager_mut().total_alloc_point += info.alloc_point;
        Ok(())
    }

    fn handle_alloc_point_set(
        &self,
        store: &mut EntityStore,
        pid: u64,
        alloc_point: BigUint,
        timestamp: u64,
    ) -> Result<()> {
        let old = store.pool(pid)?.alloc_point.clone();

        // Apply the signed delta to the aggregate, then the pool itself.
        let manager = store.manager_mut();
        if alloc_point >= old {
            manager.total_alloc_point += &alloc_point - &old;
        } else {
            let decrease = &old - &alloc_point;
            ensure!(
                manager.total_alloc_point >= decrease,
                "alloc point decrease {decrease} underflows total {}",
                manager.total_alloc_point
            );
            manager.total_alloc_point -= decrease;
        }

        let pool = store.pool_mut(pid)?;
        pool.alloc_point = alloc_point;
        pool.touch(timestamp);
        Ok(())
    }

    /// `migrate` observed: the contract swapped the pool's LP token for the
    /// GoldSwap equivalent. Balance and weight carry over untouched.
    async fn handle_migrated(
        &self,
        store: &mut EntityStore,
        pid: u64,
        timestamp: u64,
    ) -> Result<()> {
        // The pool must exist before the external read.
        store.pool(pid)?;

        let info = self
            .registry
            .pool_info(pid)
            .await
            .with_context(|| format!("poolInfo({pid}) query failed"))?;

        let pool = store.pool_mut(pid)?;
        pool.lp_token = info.lp_token;
        pool.exchange = Exchange::GoldSwap;
        pool.touch(timestamp);

        self.write_snapshot(store, pid, timestamp)
    }

    /// Upsert the snapshot row for the event's time bucket. The last write
    /// within a bucket wins.
    fn write_snapshot(&self, store: &mut EntityStore, pid: u64, timestamp: u64) -> Result<()> {
        let bucket = bucket_start(timestamp, self.snapshot_interval_secs);

        let (alloc_point, balance, exchange) = {
            let pool = store.pool(pid)?;
            (pool.alloc_point.clone(), pool.balance.clone(), pool.exchange)
        };
        let total = store.manager_mut().total_alloc_point.clone();
        let share = alloc_share(&alloc_point, &total);

        let snapshot = store.snapshot_entry(pid, bucket);
        snapshot.alloc_share = share;
        snapshot.balance = balance;
        snapshot.exchange = exchange;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        utils::SNAPSHOT_INTERVAL_SECS,
        worker::registry::{PoolInfo, RecordedRegistry},
    };
    use alloy::primitives::U256;

    const LP_A: &str = "0x1111111111111111111111111111111111111111";
    const LP_B: &str = "0x2222222222222222222222222222222222222222";

    fn info(lp_token: &str, alloc_point: u64) -> PoolInfo {
        PoolInfo {
            lp_token: lp_token.to_string(),
            alloc_point: BigUint::from(alloc_point),
            last_reward_block: 0,
            acc_reward_per_share: BigUint::from(0u32),
        }
    }

    fn reducer() -> (Reducer<RecordedRegistry>, RecordedRegistry) {
        let registry = RecordedRegistry::new();
        (
            Reducer::new(registry.clone(), SNAPSHOT_INTERVAL_SECS),
            registry,
        )
    }

    async fn add_pool(
        reducer: &Reducer<RecordedRegistry>,
        registry: &RecordedRegistry,
        store: &mut EntityStore,
        lp_token: &str,
        alloc_point: u64,
        timestamp: u64,
    ) {
        registry.push_pool(info(lp_token, alloc_point));
        reducer
            .apply(store, &ManagerEvent::PoolAdded { timestamp })
            .await
            .unwrap();
    }

    fn deposit(pid: u64, amount: u64, timestamp: u64) -> ManagerEvent {
        ManagerEvent::Deposit {
            pid,
            amount: U256::from(amount),
            timestamp,
        }
    }

    fn withdraw(pid: u64, amount: u64, timestamp: u64) -> ManagerEvent {
        ManagerEvent::Withdraw {
            pid,
            amount: U256::from(amount),
            timestamp,
        }
    }

    #[tokio::test]
    async fn test_balance_replays_deposits_minus_withdraws() {
        let (reducer, registry) = reducer();
        let mut store = EntityStore::new();
        add_pool(&reducer, &registry, &mut store, LP_A, 100, 10).await;

        reducer.apply(&mut store, &deposit(0, 100, 20)).await.unwrap();
        reducer.apply(&mut store, &deposit(0, 50, 30)).await.unwrap();
        reducer.apply(&mut store, &withdraw(0, 30, 40)).await.unwrap();

        assert_eq!(store.pool(0).unwrap().balance, BigUint::from(120u32));
    }

    #[tokio::test]
    async fn test_over_withdraw_fails_and_leaves_balance() {
        let (reducer, registry) = reducer();
        let mut store = EntityStore::new();
        add_pool(&reducer, &registry, &mut store, LP_A, 100, 10).await;
        reducer.apply(&mut store, &deposit(0, 100, 20)).await.unwrap();

        assert!(reducer.apply(&mut store, &withdraw(0, 500, 30)).await.is_err());
        assert_eq!(store.pool(0).unwrap().balance, BigUint::from(100u32));
    }

    #[tokio::test]
    async fn test_emergency_withdraw_subtracts() {
        let (reducer, registry) = reducer();
        let mut store = EntityStore::new();
        add_pool(&reducer, &registry, &mut store, LP_A, 100, 10).await;
        reducer.apply(&mut store, &deposit(0, 100, 20)).await.unwrap();

        reducer
            .apply(
                &mut store,
                &ManagerEvent::EmergencyWithdraw {
                    pid: 0,
                    amount: U256::from(100u64),
                    timestamp: 30,
                },
            )
            .await
            .unwrap();

        assert_eq!(store.pool(0).unwrap().balance, BigUint::from(0u32));
    }

    #[tokio::test]
    async fn test_event_for_unknown_pool_fails() {
        let (reducer, _registry) = reducer();
        let mut store = EntityStore::new();

        assert!(reducer.apply(&mut store, &deposit(7, 100, 20)).await.is_err());
    }

    #[tokio::test]
    async fn test_total_alloc_point_tracks_pool_weights() {
        let (reducer, registry) = reducer();
        let mut store = EntityStore::new();
        add_pool(&reducer, &registry, &mut store, LP_A, 100, 10).await;
        add_pool(&reducer, &registry, &mut store, LP_B, 900, 11).await;

        assert_eq!(
            store.manager().unwrap().total_alloc_point,
            BigUint::from(1000u32)
        );

        // 100 -> 150 moves the total from 1000 to 1050
        reducer
            .apply(
                &mut store,
                &ManagerEvent::AllocPointSet {
                    pid: 0,
                    alloc_point: U256::from(150u64),
                    timestamp: 20,
                },
            )
            .await
            .unwrap();

        assert_eq!(store.pool(0).unwrap().alloc_point, BigUint::from(150u32));
        assert_eq!(
            store.manager().unwrap().total_alloc_point,
            BigUint::from(1050u32)
        );

        // downward change applies a negative delta
        reducer
            .apply(
                &mut store,
                &ManagerEvent::AllocPointSet {
                    pid: 1,
                    alloc_point: U256::from(0u64),
                    timestamp: 21,
                },
            )
            .await
            .unwrap();

        let total = store.manager().unwrap().total_alloc_point.clone();
        let sum: BigUint = store.pools().map(|p| p.alloc_point.clone()).sum();
        assert_eq!(total, sum);
        assert_eq!(total, BigUint::from(150u32));
    }

    #[tokio::test]
    async fn test_snapshot_overwrites_within_bucket() {
        let (reducer, registry) = reducer();
        let mut store = EntityStore::new();
        add_pool(&reducer, &registry, &mut store, LP_A, 100, 10).await;

        reducer.apply(&mut store, &deposit(0, 100, 100)).await.unwrap();
        reducer.apply(&mut store, &deposit(0, 50, 200)).await.unwrap();

        assert_eq!(store.snapshot_count(), 1);
        let snapshot = store.snapshot(0, 0).unwrap();
        assert_eq!(snapshot.balance, BigUint::from(150u32));
    }

    #[tokio::test]
    async fn test_snapshot_bucket_boundary() {
        let (reducer, registry) = reducer();
        let mut store = EntityStore::new();
        add_pool(&reducer, &registry, &mut store, LP_A, 100, 10).await;

        reducer.apply(&mut store, &deposit(0, 100, 899)).await.unwrap();
        reducer.apply(&mut store, &deposit(0, 50, 900)).await.unwrap();

        assert_eq!(store.snapshot_count(), 2);
        assert_eq!(store.snapshot(0, 0).unwrap().balance, BigUint::from(100u32));
        assert_eq!(
            store.snapshot(0, 900).unwrap().balance,
            BigUint::from(150u32)
        );
    }

    #[tokio::test]
    async fn test_snapshot_share_is_fixed_point() {
        let (reducer, registry) = reducer();
        let mut store = EntityStore::new();
        add_pool(&reducer, &registry, &mut store, LP_A, 300, 10).await;
        add_pool(&reducer, &registry, &mut store, LP_B, 700, 11).await;

        reducer.apply(&mut store, &deposit(0, 1, 100)).await.unwrap();

        let snapshot = store.snapshot(0, 0).unwrap();
        assert_eq!(snapshot.alloc_share, BigUint::from(300_000_000_000u64));
    }

    #[tokio::test]
    async fn test_snapshot_share_with_zero_total() {
        let (reducer, registry) = reducer();
        let mut store = EntityStore::new();
        add_pool(&reducer, &registry, &mut store, LP_A, 0, 10).await;

        reducer.apply(&mut store, &deposit(0, 40, 100)).await.unwrap();

        let snapshot = store.snapshot(0, 0).unwrap();
        assert_eq!(snapshot.alloc_share, BigUint::from(0u32));
        assert_eq!(snapshot.balance, BigUint::from(40u32));
    }

    #[tokio::test]
    async fn test_migration_swaps_venue_only() {
        let (reducer, registry) = reducer();
        let mut store = EntityStore::new();
        add_pool(&reducer, &registry, &mut store, LP_A, 100, 10).await;
        reducer.apply(&mut store, &deposit(0, 100, 20)).await.unwrap();

        registry.set_lp_token(0, LP_B.to_string()).unwrap();
        reducer
            .apply(
                &mut store,
                &ManagerEvent::Migrated {
                    pid: 0,
                    timestamp: 1000,
                },
            )
            .await
            .unwrap();

        let pool = store.pool(0).unwrap();
        assert_eq!(pool.exchange, Exchange::GoldSwap);
        assert_eq!(pool.lp_token, LP_B);
        assert_eq!(pool.balance, BigUint::from(100u32));
        assert_eq!(pool.alloc_point, BigUint::from(100u32));

        // migration writes a snapshot in its own bucket
        let snapshot = store.snapshot(0, 900).unwrap();
        assert_eq!(snapshot.exchange, Exchange::GoldSwap);
    }

    #[tokio::test]
    async fn test_ownership_transfer_is_a_noop() {
        let (reducer, _registry) = reducer();
        let mut store = EntityStore::new();

        reducer
            .apply(&mut store, &ManagerEvent::OwnershipTransferred)
            .await
            .unwrap();

        assert_eq!(store.pool_count(), 0);
        assert_eq!(store.snapshot_count(), 0);
        assert!(store.manager().is_none());
    }

    #[tokio::test]
    async fn test_pool_added_assigns_contract_index() {
        let (reducer, registry) = reducer();
        let mut store = EntityStore::new();
        add_pool(&reducer, &registry, &mut store, LP_A, 100, 10).await;
        add_pool(&reducer, &registry, &mut store, LP_B, 200, 11).await;

        assert_eq!(store.pool(0).unwrap().lp_token, LP_A);
        assert_eq!(store.pool(1).unwrap().lp_token, LP_B);
        assert_eq!(store.pool(1).unwrap().exchange, Exchange::Uniswap);
        assert_eq!(store.pool(1).unwrap().balance, BigUint::from(0u32));
    }
}
