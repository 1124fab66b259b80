//! Coordination core for a database-backed job queue.
//!
//! Why: keep workers fed without over-fetching from the shared store.
//! - [`JobCache`] buffers a small prefetched set of ready jobs and hands the
//!   most urgent match to each worker, under one lock.
//! - Demand estimation ([`JobCache::jobs_desired`]) answers "how many jobs,
//!   up to which priority ceiling" the next store fetch should request.
//! - [`Feeder`] drives the fetch/push cycle; storage policy stays behind the
//!   [`JobStore`] trait boundary. Responsibilities do not bleed across layers.
pub mod cache;
pub mod feeder;
pub mod metajob;
pub mod store;
pub mod utils;

pub use cache::{ConfigError, Demand, JobCache, JobCacheBuilder, ShiftError};
pub use feeder::{Feeder, FeederBuilder, FeederWithGracefulShutdown};
pub use metajob::{Ceiling, Metajob};
pub use store::JobStore;
