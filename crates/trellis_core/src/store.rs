//! Reactive, type-indexed widget state
//!
//! The store owns one table per [`StateType`]. Each table maps a widget
//! [`Key`] to that widget's value and records which widgets observe it.
//!
//! Mutation is always deferred: [`StateStore::set_state`] queues the mutator
//! and marks the widget dirty if anybody observes it. [`flush`] then drains
//! the queue and delivers one notification per observer per dirty widget,
//! repeating until a round ends with nothing dirty. Because a callback never
//! runs while another value is mid-mutation, callbacks may freely read and
//! mutate state themselves.
//!
//! The store does not own its callbacks' context. It is generic over a host
//! `H` implementing [`StoreHost`], and every queued task and observer receives
//! `&mut H`. In `trellis_app` the host is the `Ui`, so observers can also
//! reach the widget tree.
//!
//! # Example
//!
//! ```rust
//! use trellis_core::prelude::*;
//!
//! struct Host {
//!     store: StateStore<Host>,
//! }
//!
//! impl StoreHost for Host {
//!     fn store(&self) -> &StateStore<Self> {
//!         &self.store
//!     }
//!     fn store_mut(&mut self) -> &mut StateStore<Self> {
//!         &mut self.store
//!     }
//! }
//!
//! let mut host = Host { store: StateStore::new() };
//! let (source, sink) = (Key::new(), Key::new());
//!
//! host.store.create_state(source, Transform::default(), false);
//! host.store.create_state(sink, Transform::default(), false);
//!
//! // Mirror the source's scroll offset into the sink
//! host.store
//!     .observe_state::<Transform, _>(sink, source, |host, me, t| {
//!         let y = t.y;
//!         host.store_mut()
//!             .set_state::<Transform, _>(me, move |own| own.y = y);
//!         Ok(())
//!     })
//!     .unwrap();
//!
//! host.store.set_state::<Transform, _>(source, |t| t.y = 40);
//! host.flush().unwrap();
//!
//! assert_eq!(host.store.get_state::<Transform>(sink).unwrap().y, 40);
//! ```

use std::any::{Any, TypeId};
use std::collections::{BTreeSet, VecDeque};
use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashMap};
use smallvec::SmallVec;

use crate::error::{Result, TrellisError};
use crate::key::Key;
use crate::state::{OnBuildLayout, StateType, TextState, Transform, VisibleChildren, WidgetState};

/// Deferred unit of work run against the host during a flush
pub type Task<H> = Box<dyn FnOnce(&mut H) -> Result<()>>;

/// Observer callback: `(host, observer, fresh value of the observed widget)`
pub type ObserverCallback<H, T> = Rc<dyn Fn(&mut H, Key, &T) -> Result<()>>;

/// Owner of a [`StateStore`], handed to every queued task and observer.
pub trait StoreHost: Sized + 'static {
    fn store(&self) -> &StateStore<Self>;

    fn store_mut(&mut self) -> &mut StateStore<Self>;

    /// Drain all pending state changes to a fixed point. See [`flush`].
    fn flush(&mut self) -> Result<FlushStats> {
        flush(self)
    }
}

/// Store configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    /// Upper bound on flush rounds before giving up with
    /// [`TrellisError::FlushDidNotConverge`]. `None` never gives up.
    pub max_flush_rounds: Option<usize>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_flush_rounds: Some(1024),
        }
    }
}

/// What an observation refers to: a widget key, or a tag resolved once at
/// registration time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Observed<'a> {
    Key(Key),
    Tag(&'a str),
}

impl From<Key> for Observed<'_> {
    fn from(key: Key) -> Self {
        Observed::Key(key)
    }
}

impl<'a> From<&'a str> for Observed<'a> {
    fn from(tag: &'a str) -> Self {
        Observed::Tag(tag)
    }
}

struct ObserverEntry<H, T> {
    observer: Key,
    callback: ObserverCallback<H, T>,
}

/// All values of one state type, plus who observes them
struct StateTable<H, T> {
    values: FxHashMap<Key, T>,
    observers: FxHashMap<Key, SmallVec<[ObserverEntry<H, T>; 2]>>,
    /// Ordered so notification order does not depend on hashing
    dirty: BTreeSet<Key>,
    /// Widgets whose notifications are queued in the current round
    scheduled: BTreeSet<Key>,
}

impl<H, T> StateTable<H, T> {
    fn new() -> Self {
        Self {
            values: FxHashMap::default(),
            observers: FxHashMap::default(),
            dirty: BTreeSet::new(),
            scheduled: BTreeSet::new(),
        }
    }

    fn is_observed(&self, widget: Key) -> bool {
        self.observers
            .get(&widget)
            .is_some_and(|entries| !entries.is_empty())
    }
}

/// Type-erased table for the registry
trait AnyTable<H> {
    fn name(&self) -> &'static str;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn has_dirty(&self) -> bool;
    fn slot_count(&self) -> usize;
    fn observer_count(&self) -> usize;
    fn dirty_count(&self) -> usize;
    /// Queue one notification per observer of each dirty widget, then clear
    /// the dirty set. Returns the number of notifications queued.
    fn schedule_observers(&mut self, queue: &mut VecDeque<Task<H>>) -> usize;
    /// Forget the widgets scheduled this round
    fn settle(&mut self);
    /// Mark the widgets scheduled this round dirty again
    fn unsettle(&mut self);
}

impl<H: StoreHost, T: StateType> AnyTable<H> for StateTable<H, T> {
    fn name(&self) -> &'static str {
        T::NAME
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn has_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    fn slot_count(&self) -> usize {
        self.values.len()
    }

    fn observer_count(&self) -> usize {
        self.observers.values().map(|entries| entries.len()).sum()
    }

    fn dirty_count(&self) -> usize {
        self.dirty.len()
    }

    fn schedule_observers(&mut self, queue: &mut VecDeque<Task<H>>) -> usize {
        let dirty = std::mem::take(&mut self.dirty);
        let mut scheduled = 0;
        for observed in dirty {
            let Some(entries) = self.observers.get(&observed) else {
                continue;
            };
            self.scheduled.insert(observed);
            for entry in entries {
                let callback = Rc::clone(&entry.callback);
                let observer = entry.observer;
                // The value is read when the notification runs, after every
                // mutation queued ahead of it has applied.
                queue.push_back(Box::new(move |host: &mut H| {
                    let value = host.store().get_state::<T>(observed)?.clone();
                    callback(host, observer, &value)
                }));
                scheduled += 1;
            }
        }
        scheduled
    }

    fn settle(&mut self) {
        self.scheduled.clear();
    }

    fn unsettle(&mut self) {
        let scheduled = std::mem::take(&mut self.scheduled);
        self.dirty.extend(scheduled);
    }
}

/// Statistics about the store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub state_types: usize,
    pub slots: usize,
    pub observers: usize,
    pub dirty: usize,
    pub pending_tasks: usize,
    pub tags: usize,
}

/// Outcome of one [`flush`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushStats {
    /// Schedule-then-drain rounds run
    pub rounds: usize,
    /// Observer notifications queued across all rounds
    pub notifications: usize,
    /// Tasks executed (mutations, notifications, deferred work)
    pub tasks_run: usize,
}

/// Heterogeneous per-widget state, observer registry and deferred task queue.
pub struct StateStore<H> {
    /// Insertion-ordered so flushes visit types in registration order
    tables: IndexMap<TypeId, Box<dyn AnyTable<H>>, FxBuildHasher>,
    tags: FxHashMap<String, Key>,
    queue: VecDeque<Task<H>>,
    config: StoreConfig,
}

impl<H: StoreHost> StateStore<H> {
    /// Create a store with the built-in state types registered
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        let mut store = Self {
            tables: IndexMap::with_hasher(FxBuildHasher),
            tags: FxHashMap::default(),
            queue: VecDeque::new(),
            config,
        };
        store.register_type::<WidgetState>();
        store.register_type::<TextState>();
        store.register_type::<Transform>();
        store.register_type::<VisibleChildren>();
        store.register_type::<OnBuildLayout>();
        store
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Register a state type. Flushes visit types in registration order.
    ///
    /// Returns `false` if the type was already registered.
    pub fn register_type<T: StateType>(&mut self) -> bool {
        let type_id = TypeId::of::<T>();
        if self.tables.contains_key(&type_id) {
            return false;
        }
        self.tables
            .insert(type_id, Box::new(StateTable::<H, T>::new()));
        true
    }

    /// Names of the registered state types, in flush order
    pub fn state_types(&self) -> Vec<&'static str> {
        self.tables.values().map(|table| table.name()).collect()
    }

    fn table<T: StateType>(&self) -> Option<&StateTable<H, T>> {
        self.tables
            .get(&TypeId::of::<T>())
            .map(|table| {
                table
                    .as_any()
                    .downcast_ref::<StateTable<H, T>>()
                    .expect("state table type mismatch")
            })
    }

    fn table_mut<T: StateType>(&mut self) -> &mut StateTable<H, T> {
        self.register_type::<T>();
        self.tables
            .get_mut(&TypeId::of::<T>())
            .and_then(|table| table.as_any_mut().downcast_mut::<StateTable<H, T>>())
            .expect("state table type mismatch")
    }

    // =========================================================================
    // SLOTS
    // =========================================================================

    /// Create `widget`'s slot for `T`.
    ///
    /// With `mark_dirty`, observers registered before the next flush are
    /// notified of the initial value.
    pub fn create_state<T: StateType>(&mut self, widget: Key, value: T, mark_dirty: bool) {
        let table = self.table_mut::<T>();
        if table.values.insert(widget, value).is_some() {
            tracing::warn!("widget {} created {} twice; keeping the newer value", widget, T::NAME);
        }
        if mark_dirty {
            table.dirty.insert(widget);
        }
    }

    /// Current value of `widget`'s `T`
    pub fn get_state<T: StateType>(&self, widget: Key) -> Result<&T> {
        self.table::<T>()
            .and_then(|table| table.values.get(&widget))
            .ok_or(TrellisError::MissingState {
                widget,
                state: T::NAME,
            })
    }

    /// Whether `widget` created a slot for `T`
    pub fn has_state<T: StateType>(&self, widget: Key) -> bool {
        self.table::<T>()
            .is_some_and(|table| table.values.contains_key(&widget))
    }

    fn state_mut<T: StateType>(&mut self, widget: Key) -> Result<&mut T> {
        self.table_mut::<T>()
            .values
            .get_mut(&widget)
            .ok_or(TrellisError::MissingState {
                widget,
                state: T::NAME,
            })
    }

    /// Queue `mutator` to run against `widget`'s `T` during the next flush.
    ///
    /// Nothing changes immediately. If the pair is observed, the widget is
    /// marked dirty so its observers hear about the change once, however
    /// many mutations were queued.
    pub fn set_state<T, F>(&mut self, widget: Key, mutator: F)
    where
        T: StateType,
        F: FnOnce(&mut T) + 'static,
    {
        self.queue.push_back(Box::new(move |host: &mut H| {
            let value = host.store_mut().state_mut::<T>(widget)?;
            mutator(value);
            Ok(())
        }));

        let table = self.table_mut::<T>();
        if table.is_observed(widget) {
            table.dirty.insert(widget);
        }
    }

    /// Queue arbitrary work to run, in order, during the next flush
    pub fn defer<F>(&mut self, task: F)
    where
        F: FnOnce(&mut H) -> Result<()> + 'static,
    {
        self.queue.push_back(Box::new(task));
    }

    // =========================================================================
    // OBSERVERS
    // =========================================================================

    /// Observe `observed`'s `T` on behalf of `observer`.
    ///
    /// Tags are resolved here, once. Returns the current value so the
    /// observer can seed its own state. Nothing is registered on failure.
    pub fn observe_state<'a, T, F>(
        &mut self,
        observer: Key,
        observed: impl Into<Observed<'a>>,
        callback: F,
    ) -> Result<&T>
    where
        T: StateType,
        F: Fn(&mut H, Key, &T) -> Result<()> + 'static,
    {
        let observed = match observed.into() {
            Observed::Key(key) => key,
            Observed::Tag(tag) => self.resolve_tag(tag)?,
        };
        if !self.has_state::<T>(observed) {
            return Err(TrellisError::MissingState {
                widget: observed,
                state: T::NAME,
            });
        }

        tracing::trace!("widget {} observes {} of widget {}", observer, T::NAME, observed);
        self.table_mut::<T>()
            .observers
            .entry(observed)
            .or_default()
            .push(ObserverEntry {
                observer,
                callback: Rc::new(callback),
            });

        self.get_state::<T>(observed)
    }

    // =========================================================================
    // TAGS
    // =========================================================================

    /// Make `widget` observable by `tag`. Empty tags are ignored and the
    /// first registration of a tag wins.
    pub fn register_tag(&mut self, tag: &str, widget: Key) {
        if tag.is_empty() {
            return;
        }
        if let Some(existing) = self.tags.get(tag) {
            tracing::warn!(
                "Duplicate tag registered: '{}' (keeping widget {}, ignoring {})",
                tag,
                existing,
                widget
            );
            return;
        }
        self.tags.insert(tag.to_string(), widget);
    }

    /// Look up the widget registered under `tag`
    pub fn resolve_tag(&self, tag: &str) -> Result<Key> {
        self.tags
            .get(tag)
            .copied()
            .ok_or_else(|| TrellisError::UnknownTag(tag.to_string()))
    }

    // =========================================================================
    // DIRTY TRACKING
    // =========================================================================

    /// Whether `widget`'s `T` awaits notification
    pub fn is_dirty<T: StateType>(&self, widget: Key) -> bool {
        self.table::<T>()
            .is_some_and(|table| table.dirty.contains(&widget))
    }

    /// Whether any state type has dirty widgets
    pub fn has_dirty(&self) -> bool {
        self.tables.values().any(|table| table.has_dirty())
    }

    /// Number of queued tasks not yet run
    pub fn pending_tasks(&self) -> usize {
        self.queue.len()
    }

    /// Drop every queued task and re-mark the widgets whose notifications
    /// were among them. Returns the number of tasks dropped.
    fn abort_round(&mut self) -> usize {
        let dropped = self.queue.len();
        self.queue.clear();
        for table in self.tables.values_mut() {
            table.unsettle();
        }
        dropped
    }

    fn settle_round(&mut self) {
        for table in self.tables.values_mut() {
            table.settle();
        }
    }

    fn schedule_observers(&mut self) -> usize {
        let queue = &mut self.queue;
        self.tables
            .values_mut()
            .map(|table| table.schedule_observers(queue))
            .sum()
    }

    /// Get statistics about the store
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            state_types: self.tables.len(),
            slots: self.tables.values().map(|t| t.slot_count()).sum(),
            observers: self.tables.values().map(|t| t.observer_count()).sum(),
            dirty: self.tables.values().map(|t| t.dirty_count()).sum(),
            pending_tasks: self.queue.len(),
            tags: self.tags.len(),
        }
    }
}

impl<H: StoreHost> Default for StateStore<H> {
    fn default() -> Self {
        Self::new()
    }
}

/// Drain the host's store to a fixed point.
///
/// Each round queues one notification per observer of every dirty widget
/// (types in registration order, widgets in key order), clears the dirty
/// sets, then runs the queue first-in-first-out until it is empty. Tasks may
/// queue more tasks; they run in the same drain. Rounds repeat while any
/// widget is dirty after a complete drain.
///
/// Fails fast with the first error a task returns. The tasks still queued
/// behind it are discarded and every widget notified in the aborted round is
/// marked dirty again, so the next flush re-notifies its observers with the
/// values that were applied. Also fails with
/// [`TrellisError::FlushDidNotConverge`] once the configured round limit is
/// reached with dirty widgets remaining.
pub fn flush<H: StoreHost>(host: &mut H) -> Result<FlushStats> {
    let max_rounds = host.store().config.max_flush_rounds;
    let mut stats = FlushStats::default();

    loop {
        stats.rounds += 1;
        stats.notifications += host.store_mut().schedule_observers();

        while let Some(task) = host.store_mut().queue.pop_front() {
            if let Err(err) = task(host) {
                let dropped = host.store_mut().abort_round();
                tracing::warn!(dropped, "state flush aborted: {}", err);
                return Err(err);
            }
            stats.tasks_run += 1;
        }
        host.store_mut().settle_round();

        if !host.store().has_dirty() {
            break;
        }
        if let Some(max) = max_rounds {
            if stats.rounds >= max {
                tracing::warn!("state flush still dirty after {} rounds", stats.rounds);
                return Err(TrellisError::FlushDidNotConverge {
                    rounds: stats.rounds,
                });
            }
        }
    }

    tracing::debug!(
        rounds = stats.rounds,
        notifications = stats.notifications,
        tasks = stats.tasks_run,
        "state flush converged"
    );
    Ok(stats)
}
