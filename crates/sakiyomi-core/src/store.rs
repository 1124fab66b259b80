//! Store-facing contract: fetch a bounded, priority-capped batch of jobs.
//!
//! Why: the cache never talks to the database. The feeder asks the cache how
//! much it wants, asks the store for exactly that, and pushes the result
//! back. Rows returned by `fetch` must already be claimed at the store, so no
//! two cache instances can ever receive the same metajob.
mod tmp {
    use crate::metajob::{Ceiling, Metajob};

    /// Source of ready-to-run metajobs, ordered by urgency.
    #[trait_variant::make(JobStore: Send)]
    pub trait LocalJobStore {
        type Error: std::error::Error + Send;

        /// Fetch up to `limit` jobs whose priority `ceiling` admits, in
        /// ascending `(priority, run_at, id)` order. May return fewer than
        /// `limit`.
        #[allow(unused)]
        async fn fetch(
            &mut self,
            limit: usize,
            ceiling: Ceiling,
        ) -> Result<Vec<Metajob>, Self::Error>;
    }
}

pub use tmp::JobStore;
