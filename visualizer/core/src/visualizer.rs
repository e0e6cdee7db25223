//! Visualizer Facade
//!
//! Wires the state store, wizard and view coordinator together and exposes
//! the actions a host forwards from its UI. The coordinator runs as a
//! spawned task fed by a bounded channel; the wizard and this facade are
//! its only senders.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::animation::TweenEngine;
use crate::config::VisualizerConfig;
use crate::coordinator::{AbortHandle, SharedLedger, ViewCoordinator};
use crate::events::VisualizerEvent;
use crate::fields::FormData;
use crate::ledger::AnimationLedger;
use crate::stage::PipelineStage;
use crate::state::{SharedState, VisualizerState};
use crate::surfaces::Surfaces;
use crate::views::ViewId;
use crate::wizard::{Rejection, WizardController, WizardPhase};

/// A running visualizer session
pub struct Visualizer {
    state: SharedState,
    wizard: WizardController,
    events: mpsc::Sender<VisualizerEvent>,
    abort: AbortHandle,
    ledger: SharedLedger,
    coordinator: JoinHandle<()>,
}

impl Visualizer {
    /// Validate `config`, build every component and spawn the coordinator
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        config: VisualizerConfig,
        surfaces: Surfaces,
        tween: Arc<dyn TweenEngine>,
    ) -> Result<Self> {
        config.validate().context("invalid visualizer configuration")?;

        let state = VisualizerState::new(config.initial_view).shared();
        let (tx, rx) = mpsc::channel(config.event_buffer);

        let coordinator = ViewCoordinator::new(
            state.clone(),
            surfaces.views,
            Arc::clone(&tween),
            &config,
        );
        let abort = coordinator.abort_handle();
        let ledger = coordinator.ledger();
        let wizard =
            WizardController::new(state.clone(), surfaces.wizard, tween, tx.clone(), &config);

        let handle = tokio::spawn(coordinator.run(rx));
        tracing::info!(
            session = %state.read().session_id(),
            view = %config.initial_view,
            "visualizer started"
        );

        Ok(Self {
            state,
            wizard,
            events: tx,
            abort,
            ledger,
            coordinator: handle,
        })
    }

    /// Live-validate the email input
    pub fn email_input_changed(&self) -> bool {
        self.wizard.validate_email_input()
    }

    /// Submit the email step
    pub async fn submit_email(&mut self) -> Result<FormData, Rejection> {
        self.wizard.submit_email().await
    }

    /// Submit the current dynamic step
    pub async fn submit_dynamic(&mut self) -> Result<FormData, Rejection> {
        self.wizard.submit_dynamic().await
    }

    /// Ask the coordinator to show `view`
    pub async fn select_view(&self, view: ViewId) -> Result<()> {
        self.send(VisualizerEvent::ViewSelected { view }).await
    }

    /// Abort every animation in flight and start a new session
    ///
    /// The session id rotates before the abort lands, so a submission the
    /// coordinator picks up afterwards is already stale.
    pub async fn clear(&mut self) {
        let session = self.wizard.start_new_session();
        self.abort.trigger();
        tracing::debug!(session = %session, "session cleared");
        self.wizard.restore_email_step().await;
    }

    /// Re-render every view from the current snapshot without animating
    pub async fn redraw(&self) -> Result<()> {
        let (session, form) = {
            let state = self.state.read();
            (state.session_id().clone(), state.form().clone())
        };
        self.send(VisualizerEvent::Submitted {
            session,
            form,
            fresh: false,
        })
        .await
    }

    /// Resolve once the coordinator has handled every earlier event
    pub async fn idle(&self) -> Result<()> {
        let (ack, done) = oneshot::channel();
        self.send(VisualizerEvent::Flush { ack }).await?;
        done.await.context("view coordinator stopped before flushing")
    }

    /// Shared state handle
    #[must_use]
    pub fn state(&self) -> SharedState {
        Arc::clone(&self.state)
    }

    /// Copy of the submitted values
    #[must_use]
    pub fn form(&self) -> FormData {
        self.state.read().form().clone()
    }

    /// Pipeline stage derived from the submitted values
    #[must_use]
    pub fn derived_stage(&self) -> PipelineStage {
        self.state.read().derived_stage()
    }

    /// Whether every field is in
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state.read().is_complete()
    }

    /// View currently shown
    #[must_use]
    pub fn active_view(&self) -> ViewId {
        self.state.read().active_view()
    }

    /// Wizard phase
    #[must_use]
    pub fn phase(&self) -> WizardPhase {
        self.wizard.phase()
    }

    /// Copy of the animation ledger
    #[must_use]
    pub fn ledger(&self) -> AnimationLedger {
        self.ledger.read().clone()
    }

    /// Let the coordinator drain its queue and stop
    pub async fn shutdown(self) -> Result<()> {
        let Self {
            wizard,
            events,
            coordinator,
            ..
        } = self;
        drop(wizard);
        drop(events);
        coordinator.await.context("view coordinator task failed")?;
        tracing::info!("visualizer stopped");
        Ok(())
    }

    async fn send(&self, event: VisualizerEvent) -> Result<()> {
        let name = event.name();
        self.events.send(event).await.map_err(|_| {
            tracing::warn!(event = name, "coordinator channel closed");
            anyhow::anyhow!("view coordinator is not running, {name} event dropped")
        })
    }
}
