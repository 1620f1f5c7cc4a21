pub mod parser;
pub mod reducer;
pub mod registry;
pub mod replay;

pub use parser::{parse_call, parse_log, ManagerEvent};
pub use reducer::Reducer;
pub use registry::{PoolInfo, PoolRegistry, RecordedRegistry};
pub use replay::{PoolInfoRecord, ReplayStats, ReplayWorker, TraceRecord};
