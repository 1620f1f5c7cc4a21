use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use super::pool::Exchange;

/// Quarter-hour snapshot of pool state for historical charts.
///
/// Population: the reducer writes one on every balance- or
/// migration-affecting event; repeated writes within a bucket overwrite
/// the same row.
///
/// Query Patterns:
///   - "Get balance history for pool N over 30 days"
///   - "Get allocation share trend for pool N"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolSnapshot {
    // Identifiers, immutable once the row exists
    pub pid: u64,
    pub bucket_start: u64,

    /// Share of total allocation at write time, scaled by 10^12.
    #[serde(with = "crate::utils::biguint_dec")]
    pub alloc_share: BigUint,

    // Pool state at write time
    #[serde(with = "crate::utils::biguint_dec")]
    pub balance: BigUint,
    pub exchange: Exchange,
}

impl PoolSnapshot {
    pub fn new(pid: u64, bucket_start: u64) -> Self {
        Self {
            pid,
            bucket_start,
            alloc_share: BigUint::zero(),
            balance: BigUint::zero(),
            exchange: Exchange::Uniswap,
        }
    }

    /// Storage key: `"<pid>-<bucket_start>"`.
    pub fn key(pid: u64, bucket_start: u64) -> String {
        format!("{pid}-{bucket_start}")
    }
}
