//! Leased fetch from Postgres and NOTIFY-driven feeder wake-ups.
//!
//! Fetch claims rows by setting a lease before returning them, so a metajob
//! handed to one cache can never be handed to another while the lease holds.
//! Ordering matches the cache's urgency order: priority, scheduled_at, id.

use futures::{FutureExt as _, SinkExt as _, Stream, StreamExt as _, TryStreamExt as _};
use pin_project_lite::pin_project;
use serde::Deserialize;

use sakiyomi_core::feeder::TickStream;
use sakiyomi_core::{Ceiling, Feeder, JobStore, Metajob};

use crate::PgDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
/// Categorization of failures that may occur while talking to the store.
pub enum ErrorKind {
    /// Errors originating from database interactions.
    DataBase,
    /// Errors that happen while decoding notification payloads.
    Decode,
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    inner: Box<dyn std::error::Error + Send + 'static>,
}

impl Error {
    fn new_database(error: Box<dyn std::error::Error + Send + 'static>) -> Self {
        Error {
            kind: ErrorKind::DataBase,
            inner: error,
        }
    }

    /// Return the category of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl From<sqlx::Error> for Error {
    fn from(value: sqlx::Error) -> Self {
        Self::new_database(Box::new(value))
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self {
            kind: ErrorKind::Decode,
            inner: Box::new(value),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.inner.fmt(f)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.inner.as_ref())
    }
}

/// Claim up to `$3` ready jobs for queue `$1` at or below priority `$2`,
/// leasing them for `$4`. `SKIP LOCKED` keeps concurrent fetchers from
/// blocking on each other's candidate rows.
const FETCH_JOBS: &str = r#"
WITH candidates AS (
    SELECT id
    FROM sakiyomi_jobs
    WHERE queue_name = $1
      AND priority <= $2
      AND scheduled_at <= now()
      AND completed_at IS NULL
      AND (leased_until IS NULL OR leased_until < now())
    ORDER BY priority, scheduled_at, id
    LIMIT $3
    FOR UPDATE SKIP LOCKED
), claimed AS (
    UPDATE sakiyomi_jobs AS job
    SET leased_until = now() + $4
    FROM candidates
    WHERE job.id = candidates.id
    RETURNING job.id, job.queue_name, job.priority, job.scheduled_at
)
SELECT id, queue_name, priority, scheduled_at
FROM claimed
ORDER BY priority, scheduled_at, id
"#;

const COMPLETE_JOB: &str = r#"
UPDATE sakiyomi_jobs
SET completed_at = now(), leased_until = NULL
WHERE id = $1
"#;

#[derive(sqlx::FromRow)]
struct JobRow {
    id: i64,
    queue_name: String,
    priority: i16,
    scheduled_at: PgDateTime,
}

impl JobRow {
    fn into_metajob(self) -> Metajob {
        Metajob::new(self.queue_name, self.priority, self.scheduled_at.0, self.id)
    }
}

/// Store adapter for fetching and finishing jobs in Postgres.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: sqlx::PgPool,
    pub(crate) queue_name: std::borrow::Cow<'static, str>,
    lease_time: std::time::Duration,
}

impl PgStore {
    pub const fn new(pool: sqlx::PgPool) -> Self {
        Self {
            pool,
            queue_name: std::borrow::Cow::Borrowed(crate::DEFAULT_QUEUE_NAME),
            lease_time: std::time::Duration::from_secs(30),
        }
    }

    /// Override the queue this store fetches from.
    pub fn queue_name<S>(self, queue_name: S) -> Self
    where
        S: Into<std::borrow::Cow<'static, str>>,
    {
        Self {
            queue_name: queue_name.into(),
            ..self
        }
    }

    /// How long a fetched job stays claimed before other consumers may take
    /// it again.
    pub fn lease_time(self, lease_time: std::time::Duration) -> Self {
        Self { lease_time, ..self }
    }

    pub async fn listener(&self) -> Result<Listener, sqlx::Error> {
        Listener::new(self.pool.clone()).await
    }

    /// Mark a claimed job as finished and release its lease.
    pub async fn complete(&self, id: i64) -> Result<(), Error> {
        sqlx::query(COMPLETE_JOB).bind(id).execute(&self.pool).await?;
        Ok(())
    }
}

impl JobStore for PgStore {
    type Error = Error;

    async fn fetch(&mut self, limit: usize, ceiling: Ceiling) -> Result<Vec<Metajob>, Error> {
        let lease = sqlx::postgres::types::PgInterval::try_from(self.lease_time)
            .map_err(|error| Error::new_database(error))?;

        let rows: Vec<JobRow> = sqlx::query_as(FETCH_JOBS)
            .bind(self.queue_name.as_ref())
            .bind(ceiling.to_wire())
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .bind(lease)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(JobRow::into_metajob).collect())
    }
}

#[derive(Debug)]
pub struct Listener {
    inner: sqlx::postgres::PgListener,
    publishers: std::collections::HashMap<String, Publisher>,
}

impl Listener {
    async fn new(pool: sqlx::PgPool) -> Result<Self, sqlx::Error> {
        let mut listener = sqlx::postgres::PgListener::connect_with(&pool).await?;
        listener.listen(crate::NOTIFY_CHANNEL_NAME).await?;

        Ok(Self {
            inner: listener,
            publishers: Default::default(),
        })
    }

    /// Listen for notifications until the provided `signal` completes.
    ///
    /// This is a graceful variant of [`listen`](Listener::listen); it exits
    /// when either the database notification stream ends, an error occurs,
    /// or the `signal` resolves (e.g., on shutdown).
    pub async fn listen_until<Signal>(self, signal: Signal) -> Result<(), Error>
    where
        Signal: std::future::Future,
    {
        let mut stream = self.inner.into_stream().fuse();
        let mut publishers = self.publishers;
        let signal = signal.fuse();
        futures::pin_mut!(signal);

        loop {
            futures::select! {
                _ = &mut signal => {
                    break;
                }
                msg = stream.try_next() => {
                    match msg {
                        Ok(Some(notification)) => {
                            let payload = notification.payload();
                            let Ok(data) = serde_json::from_str::<ChannelData>(payload)
                                .inspect_err(|error| tracing::error!(error = %error, "malformed notify payload, skipping"))
                            else {
                                continue;
                            };

                            // Queues nobody subscribed to are simply ignored.
                            if let Some(publisher) = publishers.get_mut(&data.q) {
                                let queue_name = publisher.name.as_ref();
                                let _ = publisher.sender.send(()).await.inspect_err(
                                    |error| tracing::error!(error = %error, queue_name = queue_name, "wake-up not delivered, subscriber gone"),
                                );
                            }
                        }
                        Ok(None) => {
                            break;
                        }
                        Err(error) => {
                            tracing::error!(error = %error, "notification stream error");
                        }
                    }
                }
            }
        }

        Ok(())
    }

    pub async fn listen(self) -> Result<(), Error> {
        self.listen_until(std::future::pending::<()>()).await
    }

    fn subscribe(&mut self, queue_name: impl Into<std::borrow::Cow<'static, str>>) -> Subscribe {
        let queue_name = queue_name.into();
        let (tx, rx) = futures::channel::mpsc::channel(32);
        let publisher = Publisher {
            name: queue_name,
            sender: tx,
        };
        self.publishers
            .insert(publisher.name.to_string(), publisher);

        Subscribe { receiver: rx }
    }
}

#[derive(Deserialize)]
struct ChannelData {
    q: String,
}

#[derive(Debug)]
struct Publisher {
    sender: futures::channel::mpsc::Sender<()>,
    name: std::borrow::Cow<'static, str>,
}

pin_project! {
    /// Per-queue wake-up events fanned out by a [`Listener`].
    #[derive(Debug)]
    pub struct Subscribe {
        #[pin]
        receiver: futures::channel::mpsc::Receiver<()>,
    }
}

impl Stream for Subscribe {
    type Item = ();
    fn poll_next(
        self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        let this = self.project();
        this.receiver.poll_next(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.receiver.size_hint()
    }
}

/// Merge NOTIFY wake-ups into a feeder's tick stream so freshly enqueued
/// jobs are fetched without waiting for the next poll interval.
pub trait FeederListenExt<Tick>
where
    Tick: TickStream,
{
    fn subscribe(
        self,
        listener: &mut Listener,
    ) -> Feeder<futures::stream::Select<Tick, Subscribe>, PgStore>;
}

impl<Tick> FeederListenExt<Tick> for Feeder<Tick, PgStore>
where
    Tick: TickStream,
{
    fn subscribe(
        self,
        listener: &mut Listener,
    ) -> Feeder<futures::stream::Select<Tick, Subscribe>, PgStore> {
        let subscribe = listener.subscribe(self.store_ref().queue_name.clone());

        self.modify_stream(|tick| futures::stream::select(tick, subscribe))
    }
}
