//! Scan scheduler
//!
//! Runs one debounced, non-reentrant scan pass per host tick:
//! enumerate nearby entities, match them per objective, diff against the
//! tracked set, and emit TRACK/UNTRACK events.

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};
use std::time::{Duration, Instant};

use hashbrown::HashSet;
use markers_types::TrackingConfig;

use crate::events::{EventBus, NotificationEmitter};
use crate::matching::ObjectiveMatcher;
use crate::tracking::{
    ObjectiveSummary, ObjectiveTracker, RejectReason, Slot, TrackOutcome, TrackingRegistry,
    UntrackOutcome,
};
use crate::world::World;

use super::{Clock, SystemClock};

/// `last_run_ms` value before the first completed debounce check
const NEVER: u64 = u64::MAX;

/// Result of one `run_pass` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Another pass was already running; this trigger was dropped
    Busy,
    /// Search radius <= 0; stays disabled until `reset_all`
    Disabled,
    /// Inside the debounce window
    Debounced,
    /// Host not ready (paused, menu open, no reference entity)
    Inactive,
    Completed(ScanReport),
}

/// What a completed pass did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Entities returned by the world, origin included
    pub searched: usize,
    /// (entity, objective) matches
    pub matched: usize,
    pub tracked: usize,
    pub untracked: usize,
    /// Matches skipped because their objective was full
    pub at_capacity: usize,
    pub elapsed: Duration,
}

/// Releases the running flag on every exit path
struct RunningGuard<'a>(&'a AtomicBool);

impl<'a> RunningGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Entities matched for one objective in enumeration order, without duplicates
struct Discovered<E> {
    order: Vec<E>,
    seen: HashSet<E>,
}

impl<E: Copy + Eq + Hash> Discovered<E> {
    fn new() -> Self {
        Self {
            order: Vec::new(),
            seen: HashSet::new(),
        }
    }

    fn insert(&mut self, entity: E) -> bool {
        if self.seen.insert(entity) {
            self.order.push(entity);
            true
        } else {
            false
        }
    }

    fn contains(&self, entity: &E) -> bool {
        self.seen.contains(entity)
    }
}

/// Everything replaced wholesale by `reset_all`
struct EngineState<E> {
    registry: TrackingRegistry<E>,
    emitter: NotificationEmitter<E>,
    search_radius: f32,
    scan_interval: Duration,
}

/// The tracking engine.
///
/// One instance per host session, injected wherever ticks or interaction
/// events arrive. All entry points take `&self` and may be called from
/// different threads.
pub struct ScanScheduler<W: World, C: Clock = SystemClock> {
    world: W,
    clock: C,
    state: RwLock<EngineState<W::Entity>>,
    running: AtomicBool,
    disabled: AtomicBool,
    last_run_ms: AtomicU64,
    completed_passes: AtomicU64,
}

impl<W: World> ScanScheduler<W, SystemClock> {
    pub fn new(world: W, bus: Arc<dyn EventBus<W::Entity>>, config: &TrackingConfig) -> Self {
        Self::with_clock(world, SystemClock::new(), bus, config)
    }
}

impl<W: World, C: Clock> ScanScheduler<W, C> {
    pub fn with_clock(
        world: W,
        clock: C,
        bus: Arc<dyn EventBus<W::Entity>>,
        config: &TrackingConfig,
    ) -> Self {
        let state = EngineState {
            registry: TrackingRegistry::from_config(config),
            emitter: NotificationEmitter::new(bus, config.mod_events.clone()),
            search_radius: config.general.search_radius,
            scan_interval: Duration::from_millis(config.general.scan_interval_ms),
        };
        tracing::info!(
            objectives = state.registry.len(),
            search_radius = state.search_radius,
            interval_ms = config.general.scan_interval_ms,
            "Tracking engine initialized"
        );
        Self {
            world,
            clock,
            state: RwLock::new(state),
            running: AtomicBool::new(false),
            disabled: AtomicBool::new(false),
            last_run_ms: AtomicU64::new(NEVER),
            completed_passes: AtomicU64::new(0),
        }
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::Acquire)
    }

    /// Passes that reached the diff stage since creation
    pub fn completed_passes(&self) -> u64 {
        self.completed_passes.load(Ordering::Relaxed)
    }

    /// Catalog of the current objectives
    pub fn objectives(&self) -> Vec<ObjectiveSummary> {
        self.read_state().registry.objectives()
    }

    /// Read-only access to the registry (holds the registry read lock)
    pub fn inspect<R>(&self, f: impl FnOnce(&TrackingRegistry<W::Entity>) -> R) -> R {
        f(&self.read_state().registry)
    }

    /// Tracked entities of one objective, ordered by slot
    pub fn tracked(&self, objective_id: &str) -> Vec<(W::Entity, Slot)> {
        self.inspect(|registry| {
            let mut tracked: Vec<_> = registry
                .get(objective_id)
                .map(|t| t.lock().tracked().collect())
                .unwrap_or_default();
            tracked.sort_by_key(|(_, slot)| *slot);
            tracked
        })
    }

    /// Run one scan pass, unless another is running or the debounce
    /// window hasn't elapsed.
    pub fn run_pass(&self) -> ScanOutcome {
        let Some(_running) = RunningGuard::acquire(&self.running) else {
            return ScanOutcome::Busy;
        };

        let state = self.read_state();

        if self.disabled.load(Ordering::Acquire) {
            return ScanOutcome::Disabled;
        }
        if state.search_radius <= 0.0 {
            self.disabled.store(true, Ordering::Release);
            tracing::info!(
                search_radius = state.search_radius,
                "Search radius is 0, scanning disabled until reset"
            );
            return ScanOutcome::Disabled;
        }

        // Checked under the running guard; a dropped pass leaves the clock alone
        let now = self.clock.now_ms();
        let last = self.last_run_ms.load(Ordering::Acquire);
        if last != NEVER && now.saturating_sub(last) < state.scan_interval.as_millis() as u64 {
            return ScanOutcome::Debounced;
        }
        self.last_run_ms.store(now, Ordering::Release);

        if !self.world.is_simulation_advancing() {
            tracing::trace!("Simulation not advancing, skipping scan");
            return ScanOutcome::Inactive;
        }
        let Some(origin) = self.world.reference_entity() else {
            tracing::trace!("No reference entity, skipping scan");
            return ScanOutcome::Inactive;
        };

        let started = Instant::now();
        let mut report = ScanReport::default();

        let discovered = self.discover(&state.registry, origin, state.search_radius, &mut report);
        for (tracker, found) in state.registry.iter().zip(&discovered) {
            Self::apply(tracker, found, &state.emitter, &mut report);
        }

        report.elapsed = started.elapsed();
        self.completed_passes.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            searched = report.searched,
            matched = report.matched,
            tracked = report.tracked,
            untracked = report.untracked,
            at_capacity = report.at_capacity,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Scan pass complete"
        );
        ScanOutcome::Completed(report)
    }

    /// Permanently exclude `entity` from every objective until `reset_all`.
    ///
    /// Objectives currently tracking it release the slot and emit UNTRACK.
    pub fn disallow_entity(&self, entity: W::Entity) {
        let state = self.read_state();
        let released = state.registry.disallow(entity, |objective, slot| {
            tracing::info!(
                objective = objective.id(),
                ?entity,
                %slot,
                "Disallowed entity was tracked, untracking"
            );
            state.emitter.emit_untrack(entity, objective, slot);
        });
        tracing::debug!(?entity, released, "Disallowing object from being marked");
    }

    /// Rebuild every objective's state from `config`.
    ///
    /// Call on session start or reload. Waits for an in-flight pass to finish.
    pub fn reset_all(&self, config: &TrackingConfig) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.registry = TrackingRegistry::from_config(config);
        state.emitter.set_names(config.mod_events.clone());
        state.search_radius = config.general.search_radius;
        state.scan_interval = Duration::from_millis(config.general.scan_interval_ms);

        self.last_run_ms.store(NEVER, Ordering::Release);
        self.disabled.store(false, Ordering::Release);
        tracing::info!(objectives = state.registry.len(), "All collections reset");
    }

    fn read_state(&self) -> RwLockReadGuard<'_, EngineState<W::Entity>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn discover(
        &self,
        registry: &TrackingRegistry<W::Entity>,
        origin: W::Entity,
        radius: f32,
        report: &mut ScanReport,
    ) -> Vec<Discovered<W::Entity>> {
        let matcher = ObjectiveMatcher::new(&self.world);
        let mut discovered: Vec<_> = registry.iter().map(|_| Discovered::new()).collect();

        for entity in self.world.nearby(origin, radius) {
            report.searched += 1;
            if entity == origin {
                continue;
            }
            for (tracker, found) in registry.iter().zip(discovered.iter_mut()) {
                if matcher.matches(entity, tracker.objective()) && found.insert(entity) {
                    tracing::trace!(
                        objective = tracker.objective().id(),
                        ?entity,
                        "Found reference matching objective"
                    );
                    report.matched += 1;
                }
            }
        }

        discovered
    }

    /// Track new matches first, then untrack entities that stopped matching
    fn apply(
        tracker: &ObjectiveTracker<W::Entity>,
        found: &Discovered<W::Entity>,
        emitter: &NotificationEmitter<W::Entity>,
        report: &mut ScanReport,
    ) {
        let objective = tracker.objective();
        let mut state = tracker.lock();

        for &entity in &found.order {
            if state.is_tracked(entity) || state.is_disallowed(entity) {
                continue;
            }
            match state.try_track(entity) {
                TrackOutcome::Tracked(slot) => {
                    tracing::info!(objective = objective.id(), ?entity, %slot, "Tracking reference");
                    emitter.emit_track(entity, objective, slot);
                    report.tracked += 1;
                }
                TrackOutcome::Rejected(RejectReason::AtCapacity) => {
                    tracing::debug!(
                        objective = objective.id(),
                        ?entity,
                        capacity = state.capacity(),
                        "Already tracking max number of references, not tracking"
                    );
                    report.at_capacity += 1;
                }
                TrackOutcome::Rejected(RejectReason::Disallowed) | TrackOutcome::AlreadyTracked(_) => {}
            }
        }

        let mut stale: Vec<(W::Entity, Slot)> = state
            .tracked()
            .filter(|(entity, _)| !found.contains(entity))
            .collect();
        stale.sort_by_key(|(_, slot)| *slot);

        for (entity, _) in stale {
            match state.untrack(entity) {
                UntrackOutcome::Released(slot) => {
                    tracing::info!(objective = objective.id(), ?entity, %slot, "Untracking reference");
                    emitter.emit_untrack(entity, objective, slot);
                    report.untracked += 1;
                }
                UntrackOutcome::NotTracked => {
                    tracing::trace!(?entity, "Not tracked, not untracking");
                }
            }
        }
    }
}

impl<W: World, C: Clock> Debug for ScanScheduler<W, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanScheduler")
            .field("running", &self.is_running())
            .field("disabled", &self.is_disabled())
            .field("completed_passes", &self.completed_passes())
            .finish_non_exhaustive()
    }
}
