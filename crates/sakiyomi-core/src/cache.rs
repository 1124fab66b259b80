//! The in-memory job cache: resident set, wait registry, demand estimation.
//!
//! Why: workers should almost never block on the store, and the store should
//! never be asked for more than the worker pool can absorb.
//! - One mutex guards all cache state; every operation is atomic relative to
//!   the others, and the only suspension point sits outside the lock.
//! - Wake-ups are targeted: push completes exactly the one-shot channels it
//!   hands jobs to, stop wakes everyone.
//! - Demand is recomputed fresh on every call and converges across repeated
//!   polls rather than being complete in a single call.

use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use futures::channel::oneshot;

use crate::metajob::{Ceiling, Metajob};

/// Registry key for one parked worker: its ceiling plus an arrival sequence
/// number.
///
/// The map order doubles as dispatch order: most restrictive ceiling first,
/// `Unbounded` last, FIFO within one tier.
type WaitKey = (Ceiling, u64);

#[derive(Debug, Default)]
struct CacheState {
    /// Resident set: buffered, unclaimed metajobs in urgency order. Never
    /// contains a job currently held by a worker.
    jobs: BTreeSet<Metajob>,
    /// One entry per parked `shift` call; removed exactly when the worker
    /// receives a job, the cache stops, or the caller goes away.
    waiters: BTreeMap<WaitKey, oneshot::Sender<Metajob>>,
    next_seq: u64,
    stopped: bool,
}

impl CacheState {
    /// Pop the most urgent resident job if `ceiling` admits it.
    ///
    /// Checking the front is sufficient: the set is priority-major, so a
    /// rejected front means every other resident job is rejected too.
    fn take_front(&mut self, ceiling: Ceiling) -> Option<Metajob> {
        if ceiling.admits(self.jobs.first()?.priority()) {
            self.jobs.pop_first()
        } else {
            None
        }
    }

    /// Hand resident jobs to parked workers until nothing matches.
    fn dispatch(&mut self) {
        if self.stopped {
            return;
        }
        loop {
            let Some(priority) = self.jobs.first().map(Metajob::priority) else {
                break;
            };
            // The smallest satisfied ceiling wins, so selective workers are
            // not starved by generalists; `Unbounded` sorts greatest and is
            // picked only when no finite ceiling matches.
            let eligible = (Ceiling::Priority(priority), u64::MIN)..;
            let Some(key) = self.waiters.range(eligible).next().map(|(key, _)| *key) else {
                break;
            };
            let (Some(job), Some(sender)) = (self.jobs.pop_first(), self.waiters.remove(&key))
            else {
                break;
            };
            let (ceiling, _) = key;
            tracing::trace!(job_id = job.id(), ceiling = %ceiling, "handing job to parked worker");
            if let Err(job) = sender.send(job) {
                // Waiter went away between registration and delivery; the job
                // stays resident for the next taker.
                self.jobs.insert(job);
            }
        }
    }
}

/// What the next store fetch should request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Demand {
    /// Number of jobs to request.
    pub count: usize,
    /// Highest priority value the fetch may return.
    pub ceiling: Ceiling,
}

/// Synchronous failures reported by [`JobCache::shift`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftError {
    /// The cache was stopped; no further jobs will be handed out.
    Stopped,
    /// The requested ceiling is not part of the configured set.
    UnconfiguredCeiling(Ceiling),
}

impl std::fmt::Display for ShiftError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShiftError::Stopped => f.write_str("job cache stopped"),
            ShiftError::UnconfiguredCeiling(ceiling) => {
                write!(f, "ceiling {ceiling} is not in the configured set")
            }
        }
    }
}

impl std::error::Error for ShiftError {}

/// Rejected [`JobCacheBuilder`] configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// `minimum_size` exceeds `maximum_size`.
    SizeBoundsReversed { minimum: usize, maximum: usize },
    /// The worker pool declared no ceilings.
    NoCeilings,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::SizeBoundsReversed { minimum, maximum } => write!(
                f,
                "minimum_size ({minimum}) must not exceed maximum_size ({maximum})"
            ),
            ConfigError::NoCeilings => f.write_str("at least one ceiling must be configured"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Bounded, priority-aware cache between worker tasks and the durable store.
///
/// Created once per process, shared by reference (typically an `Arc`) with
/// every worker and the feeder; all state lives behind one lock.
#[derive(Debug)]
pub struct JobCache {
    state: Mutex<CacheState>,
    maximum_size: usize,
    minimum_size: usize,
    ceilings: BTreeSet<Ceiling>,
}

/// Builder for [`JobCache`]. Defaults: high-water mark 8, low-water mark 2.
#[derive(Debug, Clone)]
pub struct JobCacheBuilder {
    maximum_size: usize,
    minimum_size: usize,
    ceilings: BTreeSet<Ceiling>,
}

impl JobCacheBuilder {
    fn new() -> Self {
        Self {
            maximum_size: 8,
            minimum_size: 2,
            ceilings: BTreeSet::new(),
        }
    }

    /// High-water mark: the refill target for the resident set.
    pub fn maximum_size(self, maximum_size: usize) -> Self {
        Self {
            maximum_size,
            ..self
        }
    }

    /// Low-water mark: resident counts below this trigger an uncapped refill.
    pub fn minimum_size(self, minimum_size: usize) -> Self {
        Self {
            minimum_size,
            ..self
        }
    }

    /// Declare the distinct ceilings the worker pool will shift with.
    pub fn ceilings<I>(mut self, ceilings: I) -> Self
    where
        I: IntoIterator<Item = Ceiling>,
    {
        self.ceilings.extend(ceilings);
        self
    }

    pub fn build(self) -> Result<JobCache, ConfigError> {
        if self.minimum_size > self.maximum_size {
            return Err(ConfigError::SizeBoundsReversed {
                minimum: self.minimum_size,
                maximum: self.maximum_size,
            });
        }
        if self.ceilings.is_empty() {
            return Err(ConfigError::NoCeilings);
        }
        Ok(JobCache {
            state: Mutex::default(),
            maximum_size: self.maximum_size,
            minimum_size: self.minimum_size,
            ceilings: self.ceilings,
        })
    }
}

impl JobCache {
    pub fn builder() -> JobCacheBuilder {
        JobCacheBuilder::new()
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        // No critical section has a panic point between state mutations, so
        // poisoned state is still consistent and safe to reuse.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a batch of metajobs and hand out everything that matches a
    /// parked worker. Atomic with respect to all other cache operations.
    ///
    /// Pushes are never capacity-rejected; the resident set may transiently
    /// exceed the high-water mark, and demand computation simply stops asking
    /// for more until it drains below the low-water mark.
    pub fn push<I>(&self, jobs: I)
    where
        I: IntoIterator<Item = Metajob>,
    {
        let mut state = self.lock();
        let before = state.jobs.len();
        state.jobs.extend(jobs);
        if state.jobs.len() == before {
            return;
        }
        tracing::trace!(resident = state.jobs.len(), "pushed jobs into cache");
        state.dispatch();
    }

    /// Take the next job this worker's ceiling admits, suspending until one
    /// arrives or the cache stops.
    ///
    /// Errors are reported synchronously for a ceiling outside the configured
    /// set and for a stopped cache. Dropping the returned future while parked
    /// deregisters the worker deterministically; a job that raced into its
    /// hand-off slot is put back for the next taker.
    pub async fn shift(&self, ceiling: Ceiling) -> Result<Metajob, ShiftError> {
        let parked = {
            let mut state = self.lock();
            if !self.ceilings.contains(&ceiling) {
                return Err(ShiftError::UnconfiguredCeiling(ceiling));
            }
            if state.stopped {
                return Err(ShiftError::Stopped);
            }
            if let Some(job) = state.take_front(ceiling) {
                return Ok(job);
            }
            let (sender, receiver) = oneshot::channel();
            let seq = state.next_seq;
            state.next_seq += 1;
            state.waiters.insert((ceiling, seq), sender);
            Parked {
                cache: self,
                key: (ceiling, seq),
                receiver,
                done: false,
            }
        };
        parked.await
    }

    /// How many jobs, up to which ceiling, the next store fetch should
    /// request. Pure read; repeated calls between mutations return the same
    /// value.
    pub fn jobs_desired(&self) -> Demand {
        let state = self.lock();
        if state.stopped {
            return Demand {
                count: 0,
                ceiling: Ceiling::Unbounded,
            };
        }
        let resident = state.jobs.len();
        if resident < self.minimum_size {
            // Under-buffered: refill to the high-water mark regardless of
            // priority, padded for idle unprioritized workers so the incoming
            // batch does not immediately re-starve them.
            let unprioritized = state
                .waiters
                .range((Ceiling::Unbounded, u64::MIN)..)
                .count();
            return Demand {
                count: self.maximum_size - resident + unprioritized,
                ceiling: Ceiling::Unbounded,
            };
        }
        // Adequately buffered: the only unmet need is specific blocked
        // workers. Request at the least restrictive blocked tier, sized to
        // that tier alone; stricter tiers tend to be satisfied by the store's
        // priority-ascending return order, and any residue by the next poll.
        let Some((&(tier, _), _)) = state.waiters.last_key_value() else {
            return Demand {
                count: 0,
                ceiling: Ceiling::Unbounded,
            };
        };
        let count = state.waiters.range((tier, u64::MIN)..).count();
        Demand {
            count,
            ceiling: tier,
        }
    }

    /// Stop the cache: wake every parked worker with [`ShiftError::Stopped`]
    /// and make all future shifts return it immediately. Resident jobs are
    /// retained; they were never claimed and the store still owns them.
    pub fn stop(&self) {
        let waiters = {
            let mut state = self.lock();
            if state.stopped {
                return;
            }
            state.stopped = true;
            std::mem::take(&mut state.waiters)
        };
        tracing::trace!(woken = waiters.len(), "job cache stopped");
        // Dropping the senders resolves every parked shift with `Stopped`.
        drop(waiters);
    }

    /// Authoritative count of buffered, unclaimed jobs.
    pub fn resident_size(&self) -> usize {
        self.lock().jobs.len()
    }

    /// Number of workers currently parked in [`JobCache::shift`].
    pub fn waiter_count(&self) -> usize {
        self.lock().waiters.len()
    }

    pub fn is_stopped(&self) -> bool {
        self.lock().stopped
    }

    pub const fn maximum_size(&self) -> usize {
        self.maximum_size
    }

    pub const fn minimum_size(&self) -> usize {
        self.minimum_size
    }
}

/// A registered wait for the next matching job.
///
/// Deregistration on drop is what keeps the registry invariant honest: a
/// cancelled worker can never leave an entry behind for push to believe in.
struct Parked<'a> {
    cache: &'a JobCache,
    key: WaitKey,
    receiver: oneshot::Receiver<Metajob>,
    done: bool,
}

impl Future for Parked<'_> {
    type Output = Result<Metajob, ShiftError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.receiver).poll(cx) {
            Poll::Ready(Ok(job)) => {
                this.done = true;
                Poll::Ready(Ok(job))
            }
            // The sender is dropped without a send only when the cache stops.
            Poll::Ready(Err(oneshot::Canceled)) => {
                this.done = true;
                Poll::Ready(Err(ShiftError::Stopped))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for Parked<'_> {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        let mut state = self.cache.lock();
        state.waiters.remove(&self.key);
        // A push may have completed the hand-off in the instant before this
        // deregistration; reclaim the job so it is neither lost nor stuck.
        if let Ok(Some(job)) = self.receiver.try_recv() {
            state.jobs.insert(job);
            state.dispatch();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::task::noop_waker;
    use std::time::{Duration, SystemTime};

    type Shift<'a> = Pin<Box<dyn Future<Output = Result<Metajob, ShiftError>> + 'a>>;

    fn job(priority: i16, id: i64) -> Metajob {
        Metajob::new(
            "default",
            priority,
            SystemTime::UNIX_EPOCH + Duration::from_secs(id.unsigned_abs()),
            id,
        )
    }

    fn cache<I>(maximum: usize, minimum: usize, ceilings: I) -> JobCache
    where
        I: IntoIterator<Item = Ceiling>,
    {
        JobCache::builder()
            .maximum_size(maximum)
            .minimum_size(minimum)
            .ceilings(ceilings)
            .build()
            .unwrap()
    }

    /// Ceiling set used by the sizing scenarios: four unprioritized workers
    /// plus ceilings 10/30/50.
    fn scenario_ceilings() -> [Ceiling; 4] {
        [
            Ceiling::Unbounded,
            Ceiling::Priority(10),
            Ceiling::Priority(30),
            Ceiling::Priority(50),
        ]
    }

    fn poll_once<'a>(fut: &mut Shift<'a>) -> Poll<Result<Metajob, ShiftError>> {
        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);
        fut.as_mut().poll(&mut cx)
    }

    /// Start a shift and drive it to its parked state.
    fn park(cache: &JobCache, ceiling: Ceiling) -> Shift<'_> {
        let mut fut: Shift<'_> = Box::pin(cache.shift(ceiling));
        assert!(poll_once(&mut fut).is_pending(), "worker should park");
        fut
    }

    fn claim(fut: &mut Shift<'_>) -> Metajob {
        match poll_once(fut) {
            Poll::Ready(Ok(job)) => job,
            other => panic!("expected a handed job, got {other:?}"),
        }
    }

    /// Park the ten scenario workers: four unprioritized, then ceilings
    /// 10, 10, 30, 30, 50, 50.
    fn park_scenario_pool(cache: &JobCache) -> Vec<Shift<'_>> {
        let mut parked = Vec::new();
        for _ in 0..4 {
            parked.push(park(cache, Ceiling::Unbounded));
        }
        for ceiling in [10, 10, 30, 30, 50, 50] {
            parked.push(park(cache, Ceiling::Priority(ceiling)));
        }
        parked
    }

    #[test]
    fn shift_fast_path_returns_most_urgent() {
        let cache = cache(8, 2, [Ceiling::Unbounded]);
        cache.push([job(9, 3), job(1, 1), job(5, 2)]);

        let first = futures::executor::block_on(cache.shift(Ceiling::Unbounded)).unwrap();
        assert_eq!(first.priority(), 1);
        let second = futures::executor::block_on(cache.shift(Ceiling::Unbounded)).unwrap();
        assert_eq!(second.priority(), 5);
        assert_eq!(cache.resident_size(), 1);
    }

    #[test]
    fn shift_parks_when_front_is_too_low_priority() {
        let cache = cache(8, 2, [Ceiling::Priority(5), Ceiling::Unbounded]);
        cache.push([job(10, 1)]);

        // Resident job exists but the ceiling rejects it.
        let mut selective = park(&cache, Ceiling::Priority(5));
        assert_eq!(cache.waiter_count(), 1);

        cache.push([job(3, 2)]);
        assert_eq!(claim(&mut selective).id(), 2);
        assert_eq!(cache.resident_size(), 1);
        assert_eq!(cache.waiter_count(), 0);
    }

    #[test]
    fn dispatch_prefers_most_restrictive_worker() {
        let cache = cache(8, 2, [Ceiling::Priority(10), Ceiling::Unbounded]);
        let mut generalist = park(&cache, Ceiling::Unbounded);
        let mut selective = park(&cache, Ceiling::Priority(10));

        cache.push([job(5, 1)]);
        assert_eq!(claim(&mut selective).id(), 1);
        assert!(poll_once(&mut generalist).is_pending());

        cache.push([job(7, 2)]);
        assert_eq!(claim(&mut generalist).id(), 2);
    }

    #[test]
    fn dispatch_is_fifo_within_a_tier() {
        let cache = cache(8, 2, [Ceiling::Priority(10)]);
        let mut first = park(&cache, Ceiling::Priority(10));
        let mut second = park(&cache, Ceiling::Priority(10));

        cache.push([job(1, 1), job(2, 2)]);
        assert_eq!(claim(&mut first).id(), 1);
        assert_eq!(claim(&mut second).id(), 2);
    }

    #[test]
    fn push_dispatches_batch_and_keeps_leftovers_resident() {
        let cache = cache(8, 2, [Ceiling::Unbounded]);
        let mut workers = vec![
            park(&cache, Ceiling::Unbounded),
            park(&cache, Ceiling::Unbounded),
        ];

        cache.push((1..=5).map(|id| job(id as i16, id)));
        assert_eq!(claim(&mut workers[0]).id(), 1);
        assert_eq!(claim(&mut workers[1]).id(), 2);
        assert_eq!(cache.resident_size(), 3);
        assert_eq!(cache.waiter_count(), 0);
    }

    #[test]
    fn dispatch_stops_when_front_satisfies_nobody() {
        let cache = cache(8, 2, [Ceiling::Priority(10)]);
        let _selective = park(&cache, Ceiling::Priority(10));

        // Front job is too low priority for the only waiter; nothing moves.
        cache.push([job(50, 1), job(60, 2)]);
        assert_eq!(cache.resident_size(), 2);
        assert_eq!(cache.waiter_count(), 1);
    }

    #[test]
    fn empty_push_is_a_no_op() {
        let cache = cache(8, 2, [Ceiling::Unbounded]);
        cache.push(std::iter::empty());
        assert_eq!(cache.resident_size(), 0);
    }

    #[test]
    fn scenario_a_empty_cache_full_pool() {
        let cache = cache(8, 2, scenario_ceilings());
        let _parked = park_scenario_pool(&cache);
        assert_eq!(
            cache.jobs_desired(),
            Demand {
                count: 12,
                ceiling: Ceiling::Unbounded
            }
        );
    }

    #[test]
    fn scenario_b_unprioritized_workers_claimed_everything() {
        let cache = cache(8, 2, scenario_ceilings());
        let mut parked = park_scenario_pool(&cache);

        cache.push((1..=4).map(|id| job(100, id)));
        for fut in &mut parked[..4] {
            assert_eq!(claim(fut).priority(), 100);
        }
        assert_eq!(cache.resident_size(), 0);
        assert_eq!(cache.waiter_count(), 6);
        assert_eq!(
            cache.jobs_desired(),
            Demand {
                count: 8,
                ceiling: Ceiling::Unbounded
            }
        );
    }

    #[test]
    fn scenario_c_buffer_adequate_selective_workers_blocked() {
        let cache = cache(8, 2, scenario_ceilings());
        let mut parked = park_scenario_pool(&cache);

        cache.push((1..=12).map(|id| job(100, id)));
        for fut in &mut parked[..4] {
            claim(fut);
        }
        assert_eq!(cache.resident_size(), 8);
        assert_eq!(cache.waiter_count(), 6);
        assert_eq!(
            cache.jobs_desired(),
            Demand {
                count: 2,
                ceiling: Ceiling::Priority(50)
            }
        );
    }

    #[test]
    fn scenario_d_everyone_fed_buffer_adequate() {
        let cache = cache(8, 2, scenario_ceilings());
        let mut parked = park_scenario_pool(&cache);

        cache.push((1..=18).map(|id| job(5, id)));
        for fut in &mut parked {
            assert_eq!(claim(fut).priority(), 5);
        }
        assert_eq!(cache.resident_size(), 8);
        assert_eq!(cache.waiter_count(), 0);
        assert_eq!(
            cache.jobs_desired(),
            Demand {
                count: 0,
                ceiling: Ceiling::Unbounded
            }
        );
    }

    #[test]
    fn scenario_e_zero_sized_cache_requests_least_restrictive_tier() {
        let cache = cache(0, 0, scenario_ceilings());
        let _parked = park_scenario_pool(&cache);
        assert_eq!(
            cache.jobs_desired(),
            Demand {
                count: 4,
                ceiling: Ceiling::Unbounded
            }
        );
    }

    #[test]
    fn scenario_f_stop_wakes_every_parked_worker() {
        let cache = cache(8, 2, scenario_ceilings());
        let mut parked = park_scenario_pool(&cache);

        cache.push([job(100, 1), job(100, 2), job(100, 3), job(100, 4), job(100, 5)]);
        for fut in &mut parked[..4] {
            claim(fut);
        }
        cache.stop();
        for fut in &mut parked[4..] {
            assert_eq!(poll_once(fut), Poll::Ready(Err(ShiftError::Stopped)));
        }
        // The unclaimed job is retained, not silently dropped.
        assert_eq!(cache.resident_size(), 1);
        assert!(cache.is_stopped());
    }

    #[test]
    fn jobs_desired_is_idempotent() {
        let cache = cache(8, 2, scenario_ceilings());
        let _parked = park_scenario_pool(&cache);
        let first = cache.jobs_desired();
        assert_eq!(cache.jobs_desired(), first);
        assert_eq!(cache.waiter_count(), 10);
        assert_eq!(cache.resident_size(), 0);
    }

    #[test]
    fn shift_after_stop_fails_synchronously() {
        let cache = cache(8, 2, [Ceiling::Unbounded]);
        cache.stop();
        let res = futures::executor::block_on(cache.shift(Ceiling::Unbounded));
        assert_eq!(res, Err(ShiftError::Stopped));
    }

    #[test]
    fn shift_rejects_unconfigured_ceiling() {
        let cache = cache(8, 2, [Ceiling::Priority(10), Ceiling::Unbounded]);
        let res = futures::executor::block_on(cache.shift(Ceiling::Priority(99)));
        assert_eq!(res, Err(ShiftError::UnconfiguredCeiling(Ceiling::Priority(99))));
    }

    #[test]
    fn push_after_stop_buffers_without_dispatch() {
        let cache = cache(8, 2, [Ceiling::Unbounded]);
        cache.stop();
        cache.push([job(1, 1)]);
        assert_eq!(cache.resident_size(), 1);
        assert_eq!(cache.waiter_count(), 0);
    }

    #[test]
    fn cancelled_waiter_deregisters() {
        let cache = cache(8, 2, [Ceiling::Unbounded]);
        {
            let _parked = park(&cache, Ceiling::Unbounded);
            assert_eq!(cache.waiter_count(), 1);
        }
        assert_eq!(cache.waiter_count(), 0);

        // A later push finds nobody waiting and keeps the job resident.
        cache.push([job(1, 1)]);
        assert_eq!(cache.resident_size(), 1);
    }

    #[test]
    fn dropped_waiter_returns_a_raced_handoff() {
        let cache = cache(8, 2, [Ceiling::Unbounded]);
        {
            let _parked = park(&cache, Ceiling::Unbounded);
            // Dispatch moves the job into the parked worker's hand-off slot.
            cache.push([job(1, 1)]);
            assert_eq!(cache.resident_size(), 0);
            assert_eq!(cache.waiter_count(), 0);
        }
        // The worker went away without ever polling; the in-flight job is
        // back in the resident set, not lost.
        assert_eq!(cache.resident_size(), 1);
        let reclaimed = futures::executor::block_on(cache.shift(Ceiling::Unbounded)).unwrap();
        assert_eq!(reclaimed.id(), 1);
    }

    #[test]
    fn stopped_cache_desires_nothing() {
        let cache = cache(8, 2, scenario_ceilings());
        cache.push([job(1, 1)]);
        cache.stop();
        // One resident job is below the low-water mark, but a stopped cache
        // will never hand it out, so refilling would only claim jobs idly.
        assert_eq!(
            cache.jobs_desired(),
            Demand {
                count: 0,
                ceiling: Ceiling::Unbounded
            }
        );
    }

    #[test]
    fn builder_rejects_bad_config() {
        let reversed = JobCache::builder()
            .maximum_size(2)
            .minimum_size(5)
            .ceilings([Ceiling::Unbounded])
            .build();
        assert_eq!(
            reversed.unwrap_err(),
            ConfigError::SizeBoundsReversed {
                minimum: 5,
                maximum: 2
            }
        );

        let no_ceilings = JobCache::builder().build();
        assert_eq!(no_ceilings.unwrap_err(), ConfigError::NoCeilings);
    }
}
