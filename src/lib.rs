pub use sakiyomi_core::{
    Ceiling, ConfigError, Demand, Feeder, FeederBuilder, JobCache, JobCacheBuilder, JobStore,
    Metajob, ShiftError,
};
pub use sakiyomi_core::{cache, feeder, metajob, store, utils};

#[cfg(feature = "postgres")]
pub use sakiyomi_sqlx::{Client, FeederListenExt, InsertJob, Listener, PgStore, Subscribe};
