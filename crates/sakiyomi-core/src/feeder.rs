//! Driving loop that keeps the cache fed from the store.
//!
//! On every tick the feeder reads the cache's current demand, fetches at most
//! that many jobs at or below the demanded ceiling, and pushes them back.
//! Fetch failures are logged and surface only as an un-refilled cache; the
//! next tick recomputes demand from scratch. On shutdown the feeder stops the
//! cache so every parked worker unblocks.

use std::sync::Arc;

use futures::{FutureExt as _, Stream, StreamExt as _};

use crate::cache::JobCache;
use crate::store::JobStore;
use crate::utils::Ticker;

/// Stream that wakes the feeder to re-evaluate demand.
pub trait TickStream: Stream<Item = ()> + Send {}

impl<St> TickStream for St where St: Stream<Item = ()> + Send {}

/// Feeder = tick stream + store + shared cache.
pub struct Feeder<Tick, Store>
where
    Tick: TickStream,
    Store: JobStore,
{
    tick: Tick,
    store: Store,
    cache: Arc<JobCache>,
}

impl<Tick, Store> Feeder<Tick, Store>
where
    Tick: TickStream,
    Store: JobStore,
{
    pub fn store_ref(&self) -> &Store {
        // Expose the store for composition (e.g., subscribing to its queue).
        &self.store
    }

    pub fn cache_ref(&self) -> &Arc<JobCache> {
        &self.cache
    }

    /// Replace the tick stream (compose with NOTIFY wake-ups, etc.).
    pub fn modify_stream<ModFn, Tick2>(self, func: ModFn) -> Feeder<Tick2, Store>
    where
        ModFn: FnOnce(Tick) -> Tick2,
        Tick2: TickStream,
    {
        let Self { tick, store, cache } = self;

        Feeder {
            tick: func(tick),
            store,
            cache,
        }
    }

    /// Add a shutdown signal; the loop exits and stops the cache when it
    /// resolves.
    pub fn with_graceful_shutdown<Signal>(
        self,
        signal: Signal,
    ) -> FeederWithGracefulShutdown<Tick, Store, Signal>
    where
        Signal: Future<Output = ()> + Send,
    {
        let Self { tick, store, cache } = self;
        FeederWithGracefulShutdown {
            tick,
            store,
            cache,
            signal,
        }
    }

    /// Run until the tick stream ends (or forever).
    pub fn run(self) -> impl Future<Output = ()> + Send {
        run_feeder(self.tick, self.store, self.cache, std::future::pending::<()>())
    }
}

/// Feeder variant that reacts to a shutdown signal.
pub struct FeederWithGracefulShutdown<Tick, Store, Signal>
where
    Tick: TickStream,
    Store: JobStore,
    Signal: Future<Output = ()> + Send,
{
    tick: Tick,
    store: Store,
    cache: Arc<JobCache>,
    signal: Signal,
}

impl<Tick, Store, Signal> FeederWithGracefulShutdown<Tick, Store, Signal>
where
    Tick: TickStream,
    Store: JobStore + 'static,
    Signal: Future<Output = ()> + Send,
{
    /// Run until shutdown, then stop the cache.
    pub fn run(self) -> impl Future<Output = ()> + Send {
        run_feeder(self.tick, self.store, self.cache, self.signal)
    }
}

/// Core loop: poll demand on tick, fetch, push; stop the cache on exit.
async fn run_feeder<Tick, Store, Signal>(
    tick: Tick,
    mut store: Store,
    cache: Arc<JobCache>,
    signal: Signal,
) where
    Tick: TickStream,
    Store: JobStore,
    Signal: Future + Send,
{
    futures::pin_mut!(tick);
    futures::pin_mut!(signal);
    let mut tick = tick.fuse();
    let mut signal = signal.fuse();

    loop {
        futures::select! {
            tick_val = tick.next() => {
                // If the tick stream ended, treat it as shutdown.
                if tick_val.is_none() { break; }

                let demand = cache.jobs_desired();
                if demand.count == 0 {
                    continue;
                }
                tracing::trace!(count = demand.count, ceiling = %demand.ceiling, "fetching jobs from store");
                match store.fetch(demand.count, demand.ceiling).await {
                    Ok(jobs) => cache.push(jobs),
                    Err(error) => {
                        tracing::error!(error = %error, "Failed to fetch jobs from store");
                    }
                }
            },
            _ = signal => {
                tracing::trace!("received graceful shutdown signal");
                break;
            }
        }
    }

    // Unblock every parked worker; the cache is always rebuilt from the
    // store on the next start.
    cache.stop();
}

/// Builder for [`Feeder`]. Prefer explicit configuration over defaults.
pub struct FeederBuilder<Tick = Ticker> {
    tick: Tick,
}

impl FeederBuilder {
    /// Re-evaluate demand every `interval`.
    pub fn new(interval: std::time::Duration) -> FeederBuilder<Ticker> {
        Self::new_with_tick(Ticker::new(interval))
    }

    /// Use a custom tick stream.
    pub fn new_with_tick<Tick>(tick: Tick) -> FeederBuilder<Tick> {
        FeederBuilder { tick }
    }
}

impl<Tick> FeederBuilder<Tick>
where
    Tick: TickStream,
{
    /// Finalize the feeder with the shared cache and a store to fetch from.
    pub fn build<Store>(self, cache: Arc<JobCache>, store: Store) -> Feeder<Tick, Store>
    where
        Store: JobStore,
    {
        Feeder {
            tick: self.tick,
            store,
            cache,
        }
    }
}
