//! Client utilities for enqueuing jobs into the queue table.

use serde::Serialize;

/// Configuration for inserting a job into the queue.
///
/// The generic `T` is the job payload that will be serialized and stored in
/// the database; the metajob fields (priority, scheduled time) are what the
/// cache later orders by.
pub struct InsertJob<T> {
    data: T,
    priority: i16,
    /// Delay before the job becomes eligible for execution.
    ///
    /// Defaults to zero (immediate scheduling). If greater than zero, the job
    /// is scheduled at `now() + delay` in the database.
    delay: std::time::Duration,
}

impl<T> InsertJob<T> {
    /// Default priority for new jobs; lower values are more urgent.
    const DEFAULT_PRIORITY: i16 = 100;

    /// Create a new `InsertJob` wrapping the provided payload.
    pub const fn new(data: T) -> Self {
        Self {
            data,
            priority: Self::DEFAULT_PRIORITY,
            delay: std::time::Duration::from_secs(0),
        }
    }

    /// Set the job's priority (lower is more urgent).
    pub fn priority(self, priority: i16) -> Self {
        Self { priority, ..self }
    }

    /// Delay the job's eligibility by the provided duration.
    pub fn delay(self, delay: std::time::Duration) -> Self {
        Self { delay, ..self }
    }
}

impl<T> From<T> for InsertJob<T> {
    fn from(value: T) -> Self {
        InsertJob::new(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
/// Categories of errors that can occur when inserting a job.
pub enum ErrorKind {
    /// An error was returned by the database layer.
    DataBase,
    /// Serialization of the job data failed.
    Encode,
}

#[derive(Debug)]
/// Error type returned by [`Client`] operations.
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
            kind: ErrorKind::Encode,
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

const INSERT_JOB: &str = r#"
INSERT INTO sakiyomi_jobs (queue_name, priority, scheduled_at, payload)
VALUES ($1, $2, now() + $3, $4)
"#;

const NOTIFY_JOB: &str = "SELECT pg_notify($1, json_build_object('q', $2::text)::text)";

/// A handle used to enqueue jobs into a PostgreSQL-backed queue.
#[derive(Debug)]
pub struct Client<T> {
    pool: sqlx::PgPool,
    queue_name: std::borrow::Cow<'static, str>,
    data_type: std::marker::PhantomData<T>,
}

impl<T> Clone for Client<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            queue_name: self.queue_name.clone(),
            data_type: std::marker::PhantomData,
        }
    }
}

impl<T> Client<T> {
    /// Create a new client bound to the given connection pool.
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self {
            pool,
            queue_name: crate::DEFAULT_QUEUE_NAME.into(),
            data_type: std::marker::PhantomData,
        }
    }

    /// Specify the queue name used when inserting jobs.
    pub fn queue_name<S>(self, queue_name: S) -> Self
    where
        S: Into<std::borrow::Cow<'static, str>>,
    {
        Self {
            queue_name: queue_name.into(),
            ..self
        }
    }
}

impl<T> Client<T>
where
    T: Serialize + Sync,
{
    /// Insert a job into the queue using the client's connection pool.
    pub async fn insert(&self, data: &InsertJob<T>) -> Result<(), Error> {
        let mut conn = self.pool.acquire().await?;
        self.insert_tx(data, &mut conn).await?;

        Ok(())
    }

    /// Insert a job using an existing transaction or connection.
    #[allow(clippy::manual_async_fn)]
    pub fn insert_tx<'a, 'c, 'data, A>(
        &self,
        data: &'data InsertJob<T>,
        tx: A,
    ) -> impl Future<Output = Result<(), Error>> + Send
    where
        A: sqlx::Acquire<'c, Database = sqlx::Postgres> + Send + 'a,
    {
        async move {
            let value = serde_json::to_value(&data.data)?;

            let mut conn = tx.acquire().await?;

            let delay = sqlx::postgres::types::PgInterval::try_from(data.delay)
                .map_err(|error| Error::new_database(error))?;

            sqlx::query(INSERT_JOB)
                .bind(self.queue_name.as_ref())
                .bind(data.priority)
                .bind(delay)
                .bind(&value)
                .execute(&mut *conn)
                .await?;

            sqlx::query(NOTIFY_JOB)
                .bind(crate::NOTIFY_CHANNEL_NAME)
                .bind(self.queue_name.as_ref())
                .execute(&mut *conn)
                .await?;

            Ok(())
        }
    }

    /// Insert multiple jobs in one transaction, emitting a single NOTIFY
    /// after all rows are inserted.
    pub async fn insert_batch<'job, I>(&self, data: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = &'job InsertJob<T>> + Send,
        I::IntoIter: Send,
        T: 'job,
    {
        let mut tx = self.pool.begin().await?;
        for job in data {
            let value = serde_json::to_value(&job.data)?;
            let delay = sqlx::postgres::types::PgInterval::try_from(job.delay)
                .map_err(|error| Error::new_database(error))?;

            sqlx::query(INSERT_JOB)
                .bind(self.queue_name.as_ref())
                .bind(job.priority)
                .bind(delay)
                .bind(&value)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query(NOTIFY_JOB)
            .bind(crate::NOTIFY_CHANNEL_NAME)
            .bind(self.queue_name.as_ref())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(())
    }
}
