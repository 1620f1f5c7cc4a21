pub mod manager;
pub mod pool;
pub mod pool_snapshot;

pub use manager::ManagerState;
pub use pool::{Exchange, PoolRecord};
pub use pool_snapshot::PoolSnapshot;
