//! PostgreSQL adapter for the sakiyomi job cache.
//!
//! [`PgStore`] claims ready jobs under a lease, [`Client`] enqueues them, and
//! [`Listener`] turns `NOTIFY` events into feeder wake-ups. The table layout
//! lives in `schema.sql` next to this crate.
pub use sakiyomi_core;
pub use sqlx::PgPool;

pub mod client;
pub mod store;

pub use client::{Client, InsertJob};
pub use store::{FeederListenExt, Listener, PgStore, Subscribe};

const DEFAULT_QUEUE_NAME: &str = "sakiyomi_default";
const NOTIFY_CHANNEL_NAME: &str = "sakiyomi_jobs";

/// `timestamptz` carried as a [`std::time::SystemTime`], without pulling in a
/// calendar library. Postgres represents the type as microseconds relative to
/// 2000-01-01 00:00:00 UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct PgDateTime(pub std::time::SystemTime);

/// Offset of the PostgreSQL epoch (2000-01-01) from the UNIX epoch.
const POSTGRESQL_EPOCH_DURATION: std::time::Duration = std::time::Duration::from_secs(946_684_800);

fn postgres_epoch() -> std::time::SystemTime {
    std::time::SystemTime::UNIX_EPOCH + POSTGRESQL_EPOCH_DURATION
}

const OUT_OF_RANGE_MESSAGE: &str = "timestamp out of range for PostgreSQL i64 micros";

fn to_pg_micros(time: std::time::SystemTime) -> Result<i64, &'static str> {
    match time.duration_since(postgres_epoch()) {
        Ok(after) => i64::try_from(after.as_micros()).map_err(|_| OUT_OF_RANGE_MESSAGE),
        Err(before) => i64::try_from(before.duration().as_micros())
            .map(|micros| -micros)
            .map_err(|_| OUT_OF_RANGE_MESSAGE),
    }
}

fn from_pg_micros(micros: i64) -> std::time::SystemTime {
    if micros >= 0 {
        postgres_epoch() + std::time::Duration::from_micros(micros as u64)
    } else {
        postgres_epoch() - std::time::Duration::from_micros(micros.unsigned_abs())
    }
}

impl sqlx::Type<sqlx::Postgres> for PgDateTime {
    fn type_info() -> <sqlx::Postgres as sqlx::Database>::TypeInfo {
        sqlx::postgres::PgTypeInfo::with_name("timestamptz")
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Postgres> for PgDateTime {
    fn encode_by_ref(
        &self,
        buf: &mut <sqlx::Postgres as sqlx::Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        let pg_us = to_pg_micros(self.0)?;
        sqlx::Encode::<sqlx::Postgres>::encode(pg_us, buf)
    }

    fn size_hint(&self) -> usize {
        std::mem::size_of::<i64>()
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for PgDateTime {
    fn decode(
        value: <sqlx::Postgres as sqlx::Database>::ValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let pg_us = <i64 as sqlx::Decode<'r, sqlx::Postgres>>::decode(value)?;
        Ok(PgDateTime(from_pg_micros(pg_us)))
    }
}
