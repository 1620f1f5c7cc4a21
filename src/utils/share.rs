//! Allocation-share math and snapshot time bucketing.

use bigdecimal::BigDecimal;
use num_bigint::{BigInt, BigUint};
use num_traits::{ToPrimitive, Zero};
use once_cell::sync::Lazy;

/// Seconds apart between stored snapshot rows.
pub const SNAPSHOT_INTERVAL_SECS: u64 = 15 * 60;

/// Decimal places of precision in the fixed-point allocation share.
pub const SHARE_DECIMALS: u32 = 12;

/// 10^12, the fixed-point scale applied before dividing by the total.
static SHARE_SCALE: Lazy<BigUint> = Lazy::new(|| BigUint::from(10u32).pow(SHARE_DECIMALS));

/// Round a timestamp down to the start of its snapshot bucket.
pub fn bucket_start(timestamp: u64, interval_secs: u64) -> u64 {
    timestamp / interval_secs * interval_secs
}

/// Fixed-point share of the total allocation held by one pool.
///
/// Computed as `alloc_point * 10^12 / total_alloc_point` with truncating
/// integer division. A zero total (no weighted pools yet) yields a zero
/// share rather than a division error, so the balance series stays
/// gap-free.
pub fn alloc_share(alloc_point: &BigUint, total_alloc_point: &BigUint) -> BigUint {
    if total_alloc_point.is_zero() {
        return BigUint::zero();
    }

    alloc_point * &*SHARE_SCALE / total_alloc_point
}

/// Convert a fixed-point share to a percentage for display.
pub fn share_to_percent(share: &BigUint) -> f64 {
    let fixed = BigDecimal::from(BigInt::from(share.clone()));
    let scale = BigDecimal::from(BigInt::from(SHARE_SCALE.clone()));

    (fixed / scale * BigDecimal::from(100)).to_f64().unwrap_or(0.0)
}
