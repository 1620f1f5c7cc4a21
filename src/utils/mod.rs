//! Utility functions for the goldmine indexer.
//!
//! This module is organized into focused submodules:
//!
//! - [`conversion`] - Type conversions (U256, BigUint, hex encoding)
//! - [`share`] - Allocation-share fixed-point math and time bucketing

mod conversion;
mod share;

// Conversion utilities
pub use conversion::{biguint_dec, hex_encode, u256_to_biguint};

// Share math and bucketing
pub use share::{
    alloc_share, bucket_start, share_to_percent, SHARE_DECIMALS, SNAPSHOT_INTERVAL_SECS,
};
