//! View Coordinator
//!
//! Owns which view is visible and decides, per event, which view animates
//! and which update silently.
//!
//! # Event Handling
//!
//! ```text
//! Submitted ─► business card rendered silently
//!          ├─► hidden views: silent update (ledger untouched)
//!          └─► visible view: animate the ledger delta, advance ledger
//!
//! ViewSelected ─► fade out old ─► prepare delta ─► fade in new ─► replay delta
//!
//! Reset ─► ledger cleared, every view back to its empty rendering
//! ```
//!
//! The coordinator is the only writer of the [`AnimationLedger`]. It runs as
//! one task and handles events strictly in order; it suspends only inside
//! tweens, typewriter ticks and timed waits.
//!
//! # Abort
//!
//! [`AbortHandle::trigger`] bumps an epoch and resets every typewriter on
//! the spot. Work in flight holds an [`AbortGuard`] taken when its event
//! started and stops at its next suspension point once the epoch moved.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::mpsc;

use crate::animation::{TweenEngine, TypewriterPool};
use crate::config::VisualizerConfig;
use crate::events::VisualizerEvent;
use crate::fields::FormData;
use crate::ledger::AnimationLedger;
use crate::stage::PipelineStage;
use crate::state::{SessionId, SharedState};
use crate::surfaces::{ElementSurface, ViewSurfaces, CLASS_ACTIVE};
use crate::views::{CrmView, PipelineVisualization, RecordView, ViewId};

/// Ledger shared read-only with the facade
pub type SharedLedger = Arc<RwLock<AnimationLedger>>;

// =============================================================================
// Abort
// =============================================================================

/// Interrupts in-flight animation
#[derive(Clone, Debug)]
pub struct AbortHandle {
    epoch: Arc<AtomicU64>,
    writers: TypewriterPool,
}

impl AbortHandle {
    /// Handle resetting the writers in `writers` on trigger
    #[must_use]
    pub fn new(writers: TypewriterPool) -> Self {
        Self {
            epoch: Arc::new(AtomicU64::new(0)),
            writers,
        }
    }

    /// Abort everything in flight
    ///
    /// Typewriters show the placeholder immediately; pipeline walks stop
    /// before their next hop.
    pub fn trigger(&self) {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let typing = self.writers.any_typing();
        self.writers.reset_all();
        tracing::debug!(epoch, typing, "animation aborted");
    }

    /// Guard observing aborts from now on
    #[must_use]
    pub fn guard(&self) -> AbortGuard {
        AbortGuard {
            epoch: Arc::clone(&self.epoch),
            seen: self.epoch.load(Ordering::SeqCst),
        }
    }

    /// Number of aborts so far
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }
}

/// Snapshot of the abort epoch
#[derive(Clone, Debug)]
pub struct AbortGuard {
    epoch: Arc<AtomicU64>,
    seen: u64,
}

impl AbortGuard {
    /// Whether an abort happened since this guard was taken
    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        self.epoch.load(Ordering::SeqCst) != self.seen
    }
}

// =============================================================================
// Coordinator
// =============================================================================

/// The view coordinator
pub struct ViewCoordinator {
    state: SharedState,
    ledger: SharedLedger,
    crm: CrmView,
    pipeline: PipelineVisualization,
    record: RecordView,
    tabs: HashMap<ViewId, Arc<dyn ElementSurface>>,
    contents: HashMap<ViewId, Arc<dyn ElementSurface>>,
    tween: Arc<dyn TweenEngine>,
    fade: Duration,
    abort: AbortHandle,
}

impl ViewCoordinator {
    /// Build the views over `surfaces` and show the state's active view
    pub fn new(
        state: SharedState,
        surfaces: ViewSurfaces,
        tween: Arc<dyn TweenEngine>,
        config: &VisualizerConfig,
    ) -> Self {
        let timing = &config.timing;
        let writers = TypewriterPool::new();
        let abort = AbortHandle::new(writers.clone());

        for view in ViewId::ALL {
            crate::surfaces::require(surfaces.contents.get(&view), "coordinator", view.key());
        }

        let coordinator = Self {
            crm: CrmView::new(
                surfaces.crm_fields,
                writers,
                timing.typewriter_tick(),
                timing.field_pause(),
            ),
            pipeline: PipelineVisualization::new(
                surfaces.board,
                Arc::clone(&tween),
                timing.settle_delay(),
                timing.card_move(),
            ),
            record: RecordView::new(surfaces.record),
            tabs: surfaces.tabs,
            contents: surfaces.contents,
            state,
            ledger: Arc::new(RwLock::new(AnimationLedger::new())),
            tween,
            fade: timing.fade(),
            abort,
        };
        let active = coordinator.state.read().active_view();
        coordinator.mark_active(active);
        coordinator
    }

    /// Read handle on the ledger
    #[must_use]
    pub fn ledger(&self) -> SharedLedger {
        Arc::clone(&self.ledger)
    }

    /// Handle that interrupts this coordinator's animations
    #[must_use]
    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    /// Consume events until every sender is gone
    pub async fn run(mut self, mut events: mpsc::Receiver<VisualizerEvent>) {
        tracing::info!("view coordinator started");
        while let Some(event) = events.recv().await {
            self.handle_event(event).await;
        }
        tracing::info!("view coordinator stopped");
    }

    /// Handle one event to completion
    pub async fn handle_event(&mut self, event: VisualizerEvent) {
        tracing::debug!(event = event.name(), "handling event");
        match event {
            VisualizerEvent::Submitted {
                session,
                form,
                fresh,
            } => {
                if self.is_stale(&session) {
                    tracing::debug!(session = %session, "dropping submission from cleared session");
                    return;
                }
                self.on_submitted(&form, fresh).await;
            }
            VisualizerEvent::Reset => self.on_reset().await,
            VisualizerEvent::ViewSelected { view } => self.switch_view(view).await,
            VisualizerEvent::Flush { ack } => {
                if ack.send(()).is_err() {
                    tracing::debug!("flush waiter went away");
                }
            }
        }
    }

    /// Route a snapshot: animate the visible view, update the rest silently
    pub async fn on_submitted(&mut self, form: &FormData, fresh: bool) {
        let guard = self.abort.guard();
        let active = self.state.read().active_view();

        self.record.render(form);
        if fresh {
            self.ledger.write().invalidate_played();
        }

        for view in ViewId::ALL.into_iter().filter(|view| *view != active) {
            self.render_silently(view, form).await;
        }

        let animate = fresh && self.ledger.read().should_animate(active, form);
        if animate {
            tracing::debug!(view = %active, count = form.len(), "animating submission");
            self.animate_view(active, form).await;
        } else {
            self.render_silently(active, form).await;
        }
        if guard.is_interrupted() {
            tracing::debug!(view = %active, "submission animation interrupted");
        }
    }

    /// Cross-fade to `view` and replay whatever it has not shown yet
    pub async fn switch_view(&mut self, view: ViewId) {
        let previous = self.state.read().active_view();
        if previous == view {
            tracing::debug!(view = %view, "view already active");
            return;
        }
        let guard = self.abort.guard();

        if let Some(content) = self.contents.get(&previous) {
            self.tween.fade_out(&content.id(), self.fade).await;
        }
        self.state.write().set_active_view(view);
        self.mark_active(view);

        let form = self.state.read().form().clone();
        let replay = {
            let ledger = self.ledger.read();
            ledger.should_animate(view, &form) && ledger.lags(view, &form)
        };
        if replay {
            self.prepare_replay(view, &form);
        }

        if let Some(content) = self.contents.get(&view) {
            self.tween.fade_in(&content.id(), self.fade).await;
        }
        tracing::debug!(from = %previous, to = %view, replay, "view switched");

        if replay && !guard.is_interrupted() {
            self.animate_view(view, &form).await;
        }
    }

    /// Clear the ledger and every view
    pub async fn on_reset(&mut self) {
        self.ledger.write().reset();
        self.crm.clear();
        self.pipeline.clear().await;
        self.record.clear();
        tracing::info!("views reset");
    }

    fn is_stale(&self, session: &SessionId) -> bool {
        self.state.read().session_id() != session
    }

    fn mark_active(&self, active: ViewId) {
        for view in ViewId::ALL {
            if let Some(tab) = self.tabs.get(&view) {
                tab.set_class(CLASS_ACTIVE, view == active);
            }
            if let Some(content) = self.contents.get(&view) {
                content.set_class(CLASS_ACTIVE, view == active);
            }
        }
    }

    async fn render_silently(&mut self, view: ViewId, form: &FormData) {
        match view {
            ViewId::Crm => self.crm.write_silently(form),
            ViewId::Pipeline => {
                let guard = self.abort.guard();
                self.pipeline.ingest(form, false, &guard).await;
            }
            ViewId::Card => {}
        }
    }

    /// Put lagging slots back to what the ledger says was shown
    fn prepare_replay(&mut self, view: ViewId, form: &FormData) {
        match view {
            ViewId::Crm => {
                let pending = self.ledger.read().pending_fields(view, form);
                self.crm.blank(pending.into_iter().map(|(field, _)| field));
            }
            ViewId::Pipeline => {
                let live = PipelineStage::from_field_count(form.len());
                let lagging = self.ledger.read().lagging_stage(view, live);
                if let Some(stage) = lagging {
                    self.pipeline.reseat(stage);
                }
            }
            ViewId::Card => {}
        }
    }

    /// Animate the ledger delta for `view`; returns whether it finished
    async fn animate_view(&mut self, view: ViewId, form: &FormData) -> bool {
        let guard = self.abort.guard();
        let finished = match view {
            ViewId::Crm => {
                let pending = self.ledger.read().pending_fields(view, form);
                let mut finished = true;
                for (field, value) in pending {
                    if guard.is_interrupted() {
                        finished = false;
                        break;
                    }
                    let outcome = self.crm.reveal(field, &value).await;
                    if !outcome.is_completed() || guard.is_interrupted() {
                        tracing::debug!(field = %field, "reveal interrupted");
                        finished = false;
                        break;
                    }
                    self.ledger.write().record_field(view, field, &value);
                }
                finished
            }
            ViewId::Pipeline => {
                let outcome = self.pipeline.ingest(form, true, &guard).await;
                if outcome.arrived() {
                    self.ledger.write().record_stage(view, outcome.stage());
                }
                outcome.arrived()
            }
            ViewId::Card => {
                self.record.render(form);
                true
            }
        };
        if finished {
            self.ledger.write().mark_played(view);
        }
        finished
    }
}
