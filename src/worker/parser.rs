//! Log and calldata parsing for MiningManager activity.
//!
//! Pre-parses raw logs (events) and transaction inputs (owner calls) into
//! the typed stream the reducer consumes, so nothing downstream touches
//! ABI bytes.

use alloy::{
    primitives::{Log, U256},
    sol_types::{SolCall, SolEvent},
};

use crate::abis::MiningManager;

/// A typed MiningManager event or call, in block order.
#[derive(Debug, Clone)]
pub enum ManagerEvent {
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
    /// `add(...)` executed. The new pool's parameters are not trusted from
    /// calldata; they are read back from contract state at apply time.
    PoolAdded {
        timestamp: u64,
    },
    AllocPointSet {
        pid: u64,
        alloc_point: U256,
        timestamp: u64,
    },
    Migrated {
        pid: u64,
        timestamp: u64,
    },
    OwnershipTransferred,
}

/// Decode a raw log into a typed event.
///
/// Returns `None` for topics this indexer does not track.
pub fn parse_log(log: &Log, block_timestamp: u64) -> Option<ManagerEvent> {
    let topic0 = log.data.topics().first()?;

    match *topic0 {
        t if t == MiningManager::Deposit::SIGNATURE_HASH => {
            let event = MiningManager::Deposit::decode_log_data(&log.data).ok()?;
            Some(ManagerEvent::Deposit {
                pid: event.pid.to::<u64>(),
                amount: event.amount,
                timestamp: block_timestamp,
            })
        },
        t if t == MiningManager::Withdraw::SIGNATURE_HASH => {
            let event = MiningManager::Withdraw::decode_log_data(&log.data).ok()?;
            Some(ManagerEvent::Withdraw {
                pid: event.pid.to::<u64>(),
                amount: event.amount,
                timestamp: block_timestamp,
            })
        },
        t if t == MiningManager::EmergencyWithdraw::SIGNATURE_HASH => {
            let event = MiningManager::EmergencyWithdraw::decode_log_data(&log.data).ok()?;
            Some(ManagerEvent::EmergencyWithdraw {
                pid: event.pid.to::<u64>(),
                amount: event.amount,
                timestamp: block_timestamp,
            })
        },
        t if t == MiningManager::OwnershipTransferred::SIGNATURE_HASH => {
            Some(ManagerEvent::OwnershipTransferred)
        },
        _ => None,
    }
}

/// Decode a MiningManager transaction input into a typed call event.
///
/// Returns `None` for selectors this indexer does not track.
pub fn parse_call(input: &[u8], block_timestamp: u64) -> Option<ManagerEvent> {
    if input.len() < 4 {
        return None;
    }

    let selector: [u8; 4] = input[..4].try_into().ok()?;

    match selector {
        s if s == MiningManager::addCall::SELECTOR => {
            MiningManager::addCall::abi_decode(input).ok()?;
            Some(ManagerEvent::PoolAdded {
                timestamp: block_timestamp,
            })
        },
        s if s == MiningManager::setCall::SELECTOR => {
            let call = MiningManager::setCall::abi_decode(input).ok()?;
            Some(ManagerEvent::AllocPointSet {
                pid: call.pid.to::<u64>(),
                alloc_point: call.allocPoint,
                timestamp: block_timestamp,
            })
        },
        s if s == MiningManager::migrateCall::SELECTOR => {
            let call = MiningManager::migrateCall::abi_decode(input).ok()?;
            Some(ManagerEvent::Migrated {
                pid: call.pid.to::<u64>(),
                timestamp: block_timestamp,
            })
        },
        _ => None,
    }
}
