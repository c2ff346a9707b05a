pub mod pool;

pub use pool::{BatchHandle, WorkerPool};
