use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::deadline::DeadlinesByDay;

/// Fetched week data is served as fresh for this long.
pub const STALE_AFTER: Duration = Duration::from_secs(5 * 60);

/// Week data is dropped entirely this long after its fetch.
pub const EVICT_AFTER: Duration = Duration::from_secs(10 * 60);

/// Lifecycle phase of one week's cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekState {
    Unrequested,
    Pending,
    Ready,
    Error,
}

/// Synchronous read of one week's entry.
///
/// `data` stays populated while a revalidation is in flight or after a failed
/// refresh, so a week keeps rendering whatever it last had.
#[derive(Debug, Clone, Default)]
pub struct WeekStatus {
    pub data: Option<Arc<DeadlinesByDay>>,
    pub is_loading: bool,
    pub is_error: bool,
    pub is_stale: bool,
}

#[derive(Debug)]
struct Entry {
    data: Option<Arc<DeadlinesByDay>>,
    error: Option<String>,
    fetched_at: Option<Instant>,
    in_flight: bool,
    last_access: Instant,
}

impl Entry {
    fn new(now: Instant) -> Self {
        Self {
            data: None,
            error: None,
            fetched_at: None,
            in_flight: false,
            last_access: now,
        }
    }

    fn is_fresh(&self, now: Instant) -> bool {
        self.data.is_some()
            && self
                .fetched_at
                .is_some_and(|fetched| now.duration_since(fetched) < STALE_AFTER)
    }
}

/// Per-week deadline store with stale-while-revalidate semantics.
///
/// The cache performs no I/O: [`request`](Self::request) is the only
/// fetch-issue gate and marks an entry in flight, the caller runs the actual
/// call, and [`complete`](Self::complete) applies the keyed outcome in
/// whatever order completions arrive. Because the gate refuses while a fetch
/// is in flight, concurrent requests for one week collapse into a single
/// underlying call.
#[derive(Debug, Default)]
pub struct WeekCache {
    entries: HashMap<usize, Entry>,
}

impl WeekCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decides whether a fetch must be issued for `index` and, if so, marks
    /// the entry in flight. Returns `false` while a fetch is already pending
    /// or fresh data is present; stale and failed entries re-issue.
    pub fn request(&mut self, index: usize, now: Instant) -> bool {
        let entry = self.entries.entry(index).or_insert_with(|| Entry::new(now));
        entry.last_access = now;
        if entry.in_flight || entry.is_fresh(now) {
            return false;
        }
        entry.in_flight = true;
        debug!(
            week = index,
            revalidate = entry.data.is_some(),
            "issuing deadlines fetch"
        );
        true
    }

    /// Applies a fetch outcome to its own keyed entry. Completions may land
    /// in any order; entries never depend on one another. A failure keeps any
    /// previously fetched data so the week can still render it.
    pub fn complete(&mut self, index: usize, result: Result<DeadlinesByDay, String>, now: Instant) {
        let entry = self.entries.entry(index).or_insert_with(|| Entry::new(now));
        entry.in_flight = false;
        match result {
            Ok(data) => {
                debug!(week = index, days = data.len(), "week data ready");
                entry.data = Some(Arc::new(data));
                entry.fetched_at = Some(now);
                entry.error = None;
            }
            Err(message) => {
                debug!(week = index, error = %message, "week fetch failed");
                entry.error = Some(message);
            }
        }
    }

    /// Current view of the entry for `index`. Stale data is still served.
    pub fn view(&mut self, index: usize, now: Instant) -> WeekStatus {
        let Some(entry) = self.entries.get_mut(&index) else {
            return WeekStatus::default();
        };
        entry.last_access = now;
        WeekStatus {
            data: entry.data.clone(),
            is_loading: entry.in_flight,
            is_error: entry.error.is_some(),
            is_stale: entry.data.is_some() && !entry.is_fresh(now),
        }
    }

    /// Lifecycle state of the entry for `index`.
    pub fn state(&self, index: usize) -> WeekState {
        match self.entries.get(&index) {
            None => WeekState::Unrequested,
            Some(entry) if entry.data.is_some() => WeekState::Ready,
            Some(entry) if entry.in_flight => WeekState::Pending,
            Some(entry) if entry.error.is_some() => WeekState::Error,
            Some(_) => WeekState::Unrequested,
        }
    }

    /// Drops entries past the garbage-collection window. Data-bearing entries
    /// age from their fetch time, error-only entries from their last access;
    /// in-flight entries are never dropped.
    pub fn evict_expired(&mut self, now: Instant) {
        self.entries.retain(|index, entry| {
            if entry.in_flight {
                return true;
            }
            let reference = entry.fetched_at.unwrap_or(entry.last_access);
            let keep = now.duration_since(reference) < EVICT_AFTER;
            if !keep {
                debug!(week = *index, "evicting expired week entry");
            }
            keep
        });
    }

    /// Number of fetches currently in flight.
    pub fn in_flight_count(&self) -> usize {
        self.entries.values().filter(|entry| entry.in_flight).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
