//! Wizard Controller
//!
//! Drives the step-by-step input flow:
//!
//! ```text
//!   Email ──valid email──► Dynamic{first} ──value──► Dynamic{last} ─► ...
//!     ▲                          │                                    │
//!     │                          └──── all five fields present ───────┴─► Complete
//!     └──────────────────────── reset ────────────────────────────────────────┘
//! ```
//!
//! The email is locked once accepted. Every accepted value is written to the
//! state store and announced to the coordinator as one
//! [`VisualizerEvent::Submitted`] carrying the full snapshot; that event is
//! the only way the views learn about changes.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::animation::{EasingFunction, PropertyMap, TweenEngine};
use crate::config::{CompletionMessage, TimingConfig, VisualizerConfig};
use crate::events::VisualizerEvent;
use crate::fields::{is_well_formed_email, Field, FormData, WizardStep};
use crate::state::{SessionId, SharedState};
use crate::surfaces::{
    require, ElementSurface, InputSurface, WizardSurfaces, CLASS_ACTIVE, CLASS_COMPLETE,
    CLASS_DISABLED, CLASS_INVALID, CLASS_VALID,
};

/// Why a submission was refused
///
/// Refusals are local: the offending input is marked and nothing else
/// changes.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Rejection {
    /// The email failed the well-formedness check
    #[error("not a well-formed email address: {0:?}")]
    InvalidEmail(String),

    /// Nothing was typed
    #[error("{field} cannot be empty")]
    EmptyValue {
        /// Field being collected
        field: Field,
    },

    /// The email was already accepted this session
    #[error("email is locked for this session")]
    EmailLocked,

    /// A dynamic value arrived before the email
    #[error("email must be submitted first")]
    EmailRequired,

    /// Every field is in; the wizard accepts nothing more
    #[error("form is already complete")]
    Complete,

    /// The input surface for this step is missing
    #[error("{0} input is not available")]
    InputUnavailable(&'static str),
}

/// Where the wizard is
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WizardPhase {
    /// Collecting the email
    Email,
    /// Collecting one of the remaining fields
    Dynamic {
        /// Step currently shown
        step: WizardStep,
    },
    /// Terminal until reset
    Complete,
}

impl WizardPhase {
    /// Whether a value for `field` may be submitted now
    pub fn admits(self, field: Field) -> Result<(), Rejection> {
        match (self, field) {
            (Self::Complete, _) => Err(Rejection::Complete),
            (Self::Email, Field::Email) => Ok(()),
            (Self::Email, _) => Err(Rejection::EmailRequired),
            (Self::Dynamic { .. }, Field::Email) => Err(Rejection::EmailLocked),
            (Self::Dynamic { .. }, _) => Ok(()),
        }
    }

    /// Phase after a value is accepted
    ///
    /// `complete` is the store's completion flag after the write and `next`
    /// the dynamic step it now points at.
    #[must_use]
    pub fn after_accept(self, complete: bool, next: WizardStep) -> Self {
        match self {
            Self::Complete => Self::Complete,
            _ if complete => Self::Complete,
            Self::Email | Self::Dynamic { .. } => Self::Dynamic { step: next },
        }
    }

    /// Whether the email can no longer change
    #[must_use]
    pub fn is_email_locked(self) -> bool {
        !matches!(self, Self::Email)
    }

    /// Whether the wizard is finished
    #[must_use]
    pub fn is_complete(self) -> bool {
        matches!(self, Self::Complete)
    }
}

/// The wizard
pub struct WizardController {
    state: SharedState,
    surfaces: WizardSurfaces,
    tween: Arc<dyn TweenEngine>,
    events: mpsc::Sender<VisualizerEvent>,
    timing: TimingConfig,
    completion: CompletionMessage,
    validate_email: bool,
    phase: WizardPhase,
}

impl WizardController {
    /// Create a wizard in the email phase
    pub fn new(
        state: SharedState,
        surfaces: WizardSurfaces,
        tween: Arc<dyn TweenEngine>,
        events: mpsc::Sender<VisualizerEvent>,
        config: &VisualizerConfig,
    ) -> Self {
        require(surfaces.email_input.as_ref(), "wizard", "email_input");
        require(surfaces.dynamic_input.as_ref(), "wizard", "dynamic_input");
        require(surfaces.email_step.as_ref(), "wizard", "email_step");
        require(surfaces.dynamic_step.as_ref(), "wizard", "dynamic_step");
        require(surfaces.panel.as_ref(), "wizard", "panel");
        require(surfaces.loading_overlay.as_ref(), "wizard", "loading_overlay");
        require(surfaces.page_flash.as_ref(), "wizard", "page_flash");
        if surfaces.progress.is_empty() {
            tracing::warn!(
                component = "wizard",
                surface = "progress",
                "surface missing, feature disabled"
            );
        }

        Self {
            state,
            surfaces,
            tween,
            events,
            timing: config.timing.clone(),
            completion: config.completion.clone(),
            validate_email: config.validate_email,
            phase: WizardPhase::Email,
        }
    }

    /// Current phase
    #[must_use]
    pub fn phase(&self) -> WizardPhase {
        self.phase
    }

    /// Live validation hook for the email input
    ///
    /// Toggles `is-valid`/`is-invalid` while the email is unlocked and
    /// returns whether the current value would be accepted.
    pub fn validate_email_input(&self) -> bool {
        let Some(input) = self.surfaces.email_input.as_ref() else {
            return false;
        };
        let valid = self.email_acceptable(input.value().trim());
        if !self.phase.is_email_locked() {
            input.set_class(CLASS_VALID, valid);
            input.set_class(CLASS_INVALID, !valid);
        }
        valid
    }

    /// Accept the email, lock it and move to the first dynamic step
    pub async fn submit_email(&mut self) -> Result<FormData, Rejection> {
        self.phase.admits(Field::Email)?;
        let input = self
            .surfaces
            .email_input
            .clone()
            .ok_or(Rejection::InputUnavailable("email"))?;

        let value = input.value().trim().to_string();
        if !self.validate_email_input() {
            tracing::debug!(value = %value, "email rejected");
            return Err(if value.is_empty() {
                Rejection::EmptyValue { field: Field::Email }
            } else {
                Rejection::InvalidEmail(value)
            });
        }

        let (session, form, complete, step) = {
            let mut state = self.state.write();
            state.submit_field(Field::Email, value.as_str());
            (
                state.session_id().clone(),
                state.form().clone(),
                state.is_complete(),
                state.current_step(),
            )
        };

        input.set_disabled(true);
        input.set_class(CLASS_DISABLED, true);
        self.phase = self.phase.after_accept(complete, step);
        tracing::info!(session = %session, "email accepted and locked");

        self.crossfade(
            self.surfaces.email_step.as_ref(),
            self.surfaces.dynamic_step.as_ref(),
        )
        .await;
        self.settle_step(&form, step);

        self.emit(VisualizerEvent::Submitted {
            session,
            form: form.clone(),
            fresh: true,
        })
        .await;
        Ok(form)
    }

    /// Accept the value for the current dynamic step
    pub async fn submit_dynamic(&mut self) -> Result<FormData, Rejection> {
        let step = match self.phase {
            WizardPhase::Dynamic { step } => step,
            WizardPhase::Email => return Err(Rejection::EmailRequired),
            WizardPhase::Complete => return Err(Rejection::Complete),
        };
        self.phase.admits(step.field)?;
        let input = self
            .surfaces
            .dynamic_input
            .clone()
            .ok_or(Rejection::InputUnavailable("dynamic"))?;

        let value = input.value().trim().to_string();
        if value.is_empty() {
            input.set_class(CLASS_INVALID, true);
            return Err(Rejection::EmptyValue { field: step.field });
        }

        let (session, form, complete, next) = {
            let mut state = self.state.write();
            state.submit_field(step.field, value.as_str());
            let next = state.advance_step();
            (
                state.session_id().clone(),
                state.form().clone(),
                state.is_complete(),
                next,
            )
        };
        tracing::debug!(field = %step.field, count = form.len(), "dynamic value accepted");

        self.refresh_effect().await;

        input.set_value("");
        input.set_class(CLASS_INVALID, false);
        self.phase = self.phase.after_accept(complete, next);

        if self.phase.is_complete() {
            self.update_progress(form.len());
            if let Some(panel) = self.surfaces.panel.as_ref() {
                panel.show_completion(&self.completion);
            }
            tracing::info!(session = %session, "form complete");
        } else {
            self.settle_step(&form, next);
        }

        self.emit(VisualizerEvent::Submitted {
            session,
            form: form.clone(),
            fresh: true,
        })
        .await;
        Ok(form)
    }

    /// Clear the session and restore the email step
    pub async fn reset(&mut self) {
        self.start_new_session();
        self.restore_email_step().await;
    }

    /// Empty the state store and rotate the session id
    ///
    /// Submissions already queued for the coordinator become stale from
    /// here on. Surfaces are untouched until [`Self::restore_email_step`].
    pub fn start_new_session(&mut self) -> SessionId {
        let session = {
            let mut state = self.state.write();
            state.reset();
            state.session_id().clone()
        };
        self.phase = WizardPhase::Email;
        session
    }

    /// Put every wizard surface back to the email step and emit `Reset`
    pub async fn restore_email_step(&mut self) {
        let (session, first) = {
            let state = self.state.read();
            (state.session_id().clone(), state.current_step())
        };

        if let Some(panel) = self.surfaces.panel.as_ref() {
            panel.restore();
        }
        if let Some(email) = self.surfaces.email_input.as_ref() {
            email.set_value("");
            email.set_disabled(false);
            for class in [CLASS_DISABLED, CLASS_VALID, CLASS_INVALID] {
                email.set_class(class, false);
            }
        }
        if let Some(dynamic) = self.surfaces.dynamic_input.as_ref() {
            dynamic.set_value("");
            dynamic.set_placeholder(first.label);
            dynamic.set_class(CLASS_INVALID, false);
        }
        if let Some(step) = self.surfaces.dynamic_step.as_ref() {
            step.set_class(CLASS_ACTIVE, false);
        }
        if let Some(step) = self.surfaces.email_step.as_ref() {
            step.set_class(CLASS_ACTIVE, true);
            self.tween
                .set(&step.id(), &PropertyMap::new().opacity(1.0))
                .await;
        }
        self.update_progress(0);
        if let Some(email) = self.surfaces.email_input.as_ref() {
            email.focus();
        }

        tracing::info!(session = %session, "wizard reset");
        self.emit(VisualizerEvent::Reset).await;
    }

    fn email_acceptable(&self, value: &str) -> bool {
        if self.validate_email {
            is_well_formed_email(value)
        } else {
            !value.is_empty()
        }
    }

    /// Placeholder, progress and focus for the step now shown
    fn settle_step(&self, form: &FormData, step: WizardStep) {
        self.update_progress(form.len());
        if let Some(dynamic) = self.surfaces.dynamic_input.as_ref() {
            dynamic.set_placeholder(step.label);
            dynamic.focus();
        }
    }

    /// Indicator `i` is complete below `count + 1` and active at it
    fn update_progress(&self, count: usize) {
        let position = count + 1;
        for (index, indicator) in self.surfaces.progress.iter().enumerate() {
            let step = index + 1;
            indicator.set_class(CLASS_COMPLETE, step < position);
            indicator.set_class(CLASS_ACTIVE, step == position);
        }
    }

    async fn crossfade(
        &self,
        from: Option<&Arc<dyn ElementSurface>>,
        to: Option<&Arc<dyn ElementSurface>>,
    ) {
        let fade = self.timing.fade();
        if let Some(from) = from {
            self.tween.fade_out(&from.id(), fade).await;
            from.set_class(CLASS_ACTIVE, false);
        }
        if let Some(to) = to {
            to.set_class(CLASS_ACTIVE, true);
            self.tween.fade_in(&to.id(), fade).await;
        }
    }

    /// Loading overlay plus a page flash, held for the refresh duration
    async fn refresh_effect(&self) {
        if let Some(overlay) = self.surfaces.loading_overlay.as_ref() {
            overlay.set_class(CLASS_ACTIVE, true);
        }

        let flash = async {
            if let Some(flash) = self.surfaces.page_flash.as_ref() {
                let id = flash.id();
                self.tween
                    .animate(
                        &id,
                        &PropertyMap::new().opacity(0.5),
                        self.timing.flash_in(),
                        EasingFunction::EaseInCubic,
                    )
                    .await;
                self.tween
                    .animate(
                        &id,
                        &PropertyMap::new().opacity(0.0),
                        self.timing.flash_out(),
                        EasingFunction::EaseOutCubic,
                    )
                    .await;
            }
        };
        tokio::join!(flash, tokio::time::sleep(self.timing.refresh()));

        if let Some(overlay) = self.surfaces.loading_overlay.as_ref() {
            overlay.set_class(CLASS_ACTIVE, false);
        }
    }

    async fn emit(&self, event: VisualizerEvent) {
        let name = event.name();
        if self.events.send(event).await.is_err() {
            tracing::warn!(event = name, "coordinator channel closed, event dropped");
        }
    }
}
