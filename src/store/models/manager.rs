use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

/// Singleton aggregate over all pools.
///
/// `total_alloc_point` must equal the sum of every pool's `alloc_point` at
/// all times. It is maintained by applying the delta of each weight change,
/// never recomputed from scratch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManagerState {
    #[serde(with = "crate::utils::biguint_dec")]
    pub total_alloc_point: BigUint,
}
