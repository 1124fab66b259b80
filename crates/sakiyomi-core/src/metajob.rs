//! Identifying records for queued work and the priority ceilings workers
//! accept.
//!
//! A metajob carries just enough to order and claim a job; the payload stays
//! in the store until a worker actually runs it.

/// Lightweight, immutable identifier for one runnable unit.
///
/// The derived ordering is the urgency order used everywhere in the cache:
/// priority ascending (lower is more urgent), then `run_at`, then `id` as the
/// deterministic tie-break. Field order matters for the derived impls.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Metajob {
    priority: i16,
    run_at: std::time::SystemTime,
    id: i64,
    queue: String,
}

impl Metajob {
    pub fn new(
        queue: impl Into<String>,
        priority: i16,
        run_at: std::time::SystemTime,
        id: i64,
    ) -> Self {
        Self {
            priority,
            run_at,
            id,
            queue: queue.into(),
        }
    }

    /// Name of the queue this job belongs to.
    pub fn queue(&self) -> &str {
        &self.queue
    }

    /// Job priority; lower values are more urgent.
    pub const fn priority(&self) -> i16 {
        self.priority
    }

    /// Earliest time the job may run.
    pub const fn run_at(&self) -> std::time::SystemTime {
        self.run_at
    }

    /// Store-assigned unique id.
    pub const fn id(&self) -> i64 {
        self.id
    }
}

/// Highest priority value (inclusive) a worker accepts.
///
/// `Unbounded` admits any job and deliberately sorts greatest, so dispatch
/// can serve the most selective workers first and the demand computation can
/// treat it as the least restrictive tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Ceiling {
    /// Accept only jobs with `priority <= value`.
    Priority(i16),
    /// Accept any job.
    Unbounded,
}

impl Ceiling {
    /// Wire sentinel for [`Ceiling::Unbounded`]: the greatest value the
    /// store's `smallint` priority column can represent.
    pub const WIRE_MAX: i16 = i16::MAX;

    /// Whether a job at `priority` satisfies this ceiling.
    pub const fn admits(self, priority: i16) -> bool {
        match self {
            Ceiling::Priority(ceiling) => priority <= ceiling,
            Ceiling::Unbounded => true,
        }
    }

    /// Value to bind against the store's priority column.
    pub const fn to_wire(self) -> i16 {
        match self {
            Ceiling::Priority(ceiling) => ceiling,
            Ceiling::Unbounded => Self::WIRE_MAX,
        }
    }

    /// Inverse of [`Ceiling::to_wire`].
    pub const fn from_wire(raw: i16) -> Self {
        if raw == Self::WIRE_MAX {
            Ceiling::Unbounded
        } else {
            Ceiling::Priority(raw)
        }
    }
}

impl std::fmt::Display for Ceiling {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Ceiling::Priority(ceiling) => write!(f, "{ceiling}"),
            Ceiling::Unbounded => f.write_str("unbounded"),
        }
    }
}
