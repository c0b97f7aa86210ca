//! Background job scheduler and job implementations.

mod pool_metrics;
mod scheduler;
mod tag_expiry;

pub use pool_metrics::PoolMetricsJob;
pub use scheduler::JobScheduler;
pub use tag_expiry::TagExpiryJob;
