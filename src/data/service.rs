//! Keyed mock data service with explicit per-slot lifecycle.
//!
//! Each `(key, params)` pair owns one [`Slot`]. A request moves the slot into
//! loading and hands back a [`FetchTicket`]; the caller decides when the
//! simulated latency has elapsed and redeems the ticket with
//! [`MockDataService::complete`]. Nothing here sleeps or spawns: timing lives
//! in the dashboard runtime's scheduler.
//!
//! Tickets carry the slot generation they were issued for. Completing a ticket
//! for a disposed slot, or one superseded by a later refetch, writes nothing.

#![allow(missing_docs)]

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::core::config::fnv1a;
use crate::data::fixtures::{FixtureData, FixtureSource, Payload, StaticFixtures};

// ──────────────────── params ────────────────────

/// Parameter bag attached to a request. Compared by value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct QueryParams(BTreeMap<String, String>);

impl QueryParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.0.insert(name.to_string(), value.to_string());
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// FNV-1a of the canonical JSON encoding. Key order is fixed by the
    /// `BTreeMap`, so equal bags always hash equal.
    #[must_use]
    pub fn stable_hash(&self) -> u64 {
        let canonical = serde_json::to_string(&self.0).unwrap_or_default();
        fnv1a(canonical.as_bytes())
    }
}

// ──────────────────── slots ────────────────────

/// Identity of one state slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotKey {
    pub key: String,
    pub params_hash: u64,
}

impl SlotKey {
    #[must_use]
    pub fn new(key: &str, params: &QueryParams) -> Self {
        Self {
            key: key.to_string(),
            params_hash: params.stable_hash(),
        }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{:08x}", self.key, self.params_hash & 0xffff_ffff)
    }
}

/// Error captured from a failed fixture production.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    /// Stable error code of the underlying `NofomoError`.
    pub code: &'static str,
    pub message: String,
}

/// State held for one `(key, params)` pair.
#[derive(Debug, Clone)]
struct Slot {
    data: Option<Payload>,
    is_loading: bool,
    error: Option<FetchFailure>,
    generation: u64,
}

impl Slot {
    const fn loading(generation: u64) -> Self {
        Self {
            data: None,
            is_loading: true,
            error: None,
            generation,
        }
    }
}

/// Claim on the pending result of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub slot: SlotKey,
    pub params: QueryParams,
    pub generation: u64,
}

/// Outcome of redeeming a [`FetchTicket`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// Data stored; carries the resolved row count.
    Resolved { rows: usize },
    /// The source failed; the failure is stored as the slot error.
    Failed(FetchFailure),
    /// Slot disposed or superseded. Nothing was written.
    Stale,
}

/// Read-only view of a slot, typed to the caller's record set.
#[derive(Debug)]
pub struct QuerySnapshot<'a, T> {
    pub data: Option<&'a T>,
    pub is_loading: bool,
    pub error: Option<&'a FetchFailure>,
}

impl<T> QuerySnapshot<'_, T> {
    const fn absent() -> Self {
        Self {
            data: None,
            is_loading: false,
            error: None,
        }
    }
}

// ──────────────────── service ────────────────────

/// In-memory accessor over a [`FixtureSource`].
pub struct MockDataService {
    source: Box<dyn FixtureSource>,
    slots: HashMap<SlotKey, Slot>,
    next_generation: u64,
}

impl fmt::Debug for MockDataService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockDataService")
            .field("source", &self.source)
            .field("slots", &self.slots.len())
            .field("next_generation", &self.next_generation)
            .finish()
    }
}

impl Default for MockDataService {
    fn default() -> Self {
        Self::new(Box::new(StaticFixtures))
    }
}

impl MockDataService {
    #[must_use]
    pub fn new(source: Box<dyn FixtureSource>) -> Self {
        Self {
            source,
            slots: HashMap::new(),
            next_generation: 1,
        }
    }

    /// Start loading a slot on first request.
    ///
    /// Returns `None` when the slot already exists: repeating a request with
    /// an equal parameter bag does not refetch.
    pub fn request(&mut self, key: &str, params: &QueryParams) -> Option<FetchTicket> {
        let slot_key = SlotKey::new(key, params);
        if self.slots.contains_key(&slot_key) {
            return None;
        }
        let generation = self.bump_generation();
        self.slots.insert(slot_key.clone(), Slot::loading(generation));
        Some(FetchTicket {
            slot: slot_key,
            params: params.clone(),
            generation,
        })
    }

    /// Force a new fetch for a slot, creating it if needed.
    ///
    /// Existing data stays readable while the new fetch is in flight; any
    /// older ticket for the slot becomes stale.
    pub fn refetch(&mut self, key: &str, params: &QueryParams) -> FetchTicket {
        let slot_key = SlotKey::new(key, params);
        let generation = self.bump_generation();
        self.slots
            .entry(slot_key.clone())
            .and_modify(|slot| {
                slot.is_loading = true;
                slot.generation = generation;
            })
            .or_insert_with(|| Slot::loading(generation));
        FetchTicket {
            slot: slot_key,
            params: params.clone(),
            generation,
        }
    }

    /// Redeem a ticket: produce the fixture and store data or error.
    pub fn complete(&mut self, ticket: &FetchTicket) -> Completion {
        let Some(slot) = self.slots.get_mut(&ticket.slot) else {
            return Completion::Stale;
        };
        if slot.generation != ticket.generation {
            return Completion::Stale;
        }

        slot.is_loading = false;
        match self.source.produce(&ticket.slot.key, &ticket.params) {
            Ok(payload) => {
                let rows = payload.len();
                slot.data = Some(payload);
                slot.error = None;
                Completion::Resolved { rows }
            }
            Err(err) => {
                let failure = FetchFailure {
                    code: err.code(),
                    message: err.to_string(),
                };
                slot.error = Some(failure.clone());
                Completion::Failed(failure)
            }
        }
    }

    /// Typed snapshot of a slot. Unrequested slots read as absent and idle.
    #[must_use]
    pub fn query<T: FixtureData>(&self, key: &str, params: &QueryParams) -> QuerySnapshot<'_, T> {
        self.slots
            .get(&SlotKey::new(key, params))
            .map_or_else(QuerySnapshot::absent, |slot| QuerySnapshot {
                data: slot.data.as_ref().and_then(T::from_payload),
                is_loading: slot.is_loading,
                error: slot.error.as_ref(),
            })
    }

    /// Untyped payload of a slot, if resolved.
    #[must_use]
    pub fn payload(&self, key: &str, params: &QueryParams) -> Option<&Payload> {
        self.slots
            .get(&SlotKey::new(key, params))
            .and_then(|slot| slot.data.as_ref())
    }

    /// Apply an optimistic local update.
    ///
    /// With an updater and resolved data of type `T`, replaces the data with
    /// the updater's result synchronously and returns `true`. Loading state is
    /// left untouched. Without an updater this is a no-op: it does not refetch.
    pub fn mutate<T, F>(&mut self, key: &str, params: &QueryParams, updater: Option<F>) -> bool
    where
        T: FixtureData,
        F: FnOnce(T) -> T,
    {
        let Some(updater) = updater else {
            return false;
        };
        let Some(slot) = self.slots.get_mut(&SlotKey::new(key, params)) else {
            return false;
        };
        let Some(current) = slot.data.as_ref().and_then(T::from_payload) else {
            return false;
        };
        let next = updater(current.clone());
        slot.data = Some(next.into_payload());
        true
    }

    /// Drop one slot. In-flight tickets for it become stale.
    pub fn dispose(&mut self, key: &str, params: &QueryParams) -> bool {
        self.slots.remove(&SlotKey::new(key, params)).is_some()
    }

    /// Drop every slot.
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Number of live slots.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// True when the slot exists, is loading, and has never resolved.
    #[must_use]
    pub fn is_pending(&self, key: &str, params: &QueryParams) -> bool {
        self.slots
            .get(&SlotKey::new(key, params))
            .is_some_and(|slot| slot.is_loading && slot.data.is_none())
    }

    /// Stored failure for a slot, if any.
    #[must_use]
    pub fn error(&self, key: &str, params: &QueryParams) -> Option<&FetchFailure> {
        self.slots
            .get(&SlotKey::new(key, params))
            .and_then(|slot| slot.error.as_ref())
    }

    fn bump_generation(&mut self) -> u64 {
        let generation = self.next_generation;
        self.next_generation = self.next_generation.wrapping_add(1);
        generation
    }
}
