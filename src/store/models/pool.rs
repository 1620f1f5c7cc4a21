use chrono::{DateTime, Utc};
use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

/// Venue the pool's staked LP token trades on.
///
/// Pools are created against the original venue and move to GoldSwap when
/// the migrator runs. Discriminants match the integer codes in historical
/// rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Exchange {
    Uniswap = 0,
    GoldSwap = 1,
}

/// Staking pool state, one record per pool index.
///
/// Primary Key: pid
/// Query Pattern: "Get current balance and weight for pool N"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolRecord {
    pub pid: u64,

    /// Total LP tokens currently deposited. Never negative: withdrawals
    /// only ever remove amounts previously deposited, and an underflow
    /// fails the event instead of clamping.
    #[serde(with = "crate::utils::biguint_dec")]
    pub balance: BigUint,

    /// This pool's share weight in reward emission.
    #[serde(with = "crate::utils::biguint_dec")]
    pub alloc_point: BigUint,

    /// Staked LP token address (lowercase 0x-hex). Changes on migration.
    pub lp_token: String,
    pub exchange: Exchange,

    // Reward bookkeeping copied from poolInfo at creation
    pub last_reward_block: u64,
    #[serde(with = "crate::utils::biguint_dec")]
    pub acc_reward_per_share: BigUint,

    pub added_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PoolRecord {
    pub fn new(
        pid: u64,
        lp_token: String,
        alloc_point: BigUint,
        last_reward_block: u64,
        acc_reward_per_share: BigUint,
        timestamp: u64,
    ) -> Self {
        let added_at = DateTime::from_timestamp_secs(timestamp as i64).unwrap_or_default();

        Self {
            pid,
            balance: BigUint::zero(),
            alloc_point,
            lp_token,
            exchange: Exchange::Uniswap,
            last_reward_block,
            acc_reward_per_share,
            added_at,
            updated_at: added_at,
        }
    }

    pub fn touch(&mut self, timestamp: u64) {
        self.updated_at = DateTime::from_timestamp_secs(timestamp as i64).unwrap_or_default();
    }
}
