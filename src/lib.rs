pub mod abis;
pub mod config;
pub mod store;
pub mod utils;
pub mod worker;

pub use config::Settings;
pub use store::EntityStore;
pub use worker::{ManagerEvent, RecordedRegistry, Reducer, ReplayWorker};
