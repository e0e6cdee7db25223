//! State Store
//!
//! The single source of truth for a visualizer session: submitted values,
//! the current dynamic wizard step, the active view and the completion flag.
//! Pipeline stage is derived on demand, never stored.
//!
//! The store has no side effects beyond memory and never touches a surface.
//! Only the wizard writes form values; the coordinator reads snapshots and
//! records which view is active.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::fields::{Field, FormData, WizardStep};
use crate::stage::PipelineStage;
use crate::views::ViewId;

/// Session identifier, regenerated on every reset
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    /// Generate a fresh session ID
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("sess_{}", uuid::Uuid::new_v4().simple()))
    }

    /// Get the string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// State shared between the wizard, the coordinator and the facade
///
/// Locks are short: take a snapshot, release, then await.
pub type SharedState = Arc<RwLock<VisualizerState>>;

/// Session state
#[derive(Clone, Debug)]
pub struct VisualizerState {
    session_id: SessionId,
    form: FormData,
    /// Index into [`Field::DYNAMIC`]
    step_index: usize,
    active_view: ViewId,
    complete: bool,
}

impl VisualizerState {
    /// Create an empty session with the given view visible
    #[must_use]
    pub fn new(initial_view: ViewId) -> Self {
        Self {
            session_id: SessionId::generate(),
            form: FormData::new(),
            step_index: 0,
            active_view: initial_view,
            complete: false,
        }
    }

    /// Wrap in a shared handle
    #[must_use]
    pub fn shared(self) -> SharedState {
        Arc::new(RwLock::new(self))
    }

    /// Current session ID
    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Submitted values
    #[must_use]
    pub fn form(&self) -> &FormData {
        &self.form
    }

    /// Append or overwrite a value and recompute completion
    pub fn submit_field(&mut self, field: Field, value: impl Into<String>) -> &FormData {
        self.form.insert(field, value);
        self.complete = self.form.is_complete();
        &self.form
    }

    /// Move to the next dynamic step, wrapping after the last
    pub fn advance_step(&mut self) -> WizardStep {
        self.step_index = (self.step_index + 1) % Field::DYNAMIC.len();
        self.current_step()
    }

    /// The dynamic step currently being collected
    #[must_use]
    pub fn current_step(&self) -> WizardStep {
        WizardStep::for_field(Field::DYNAMIC[self.step_index % Field::DYNAMIC.len()])
    }

    /// Pipeline stage derived from the number of submitted fields
    #[must_use]
    pub fn derived_stage(&self) -> PipelineStage {
        PipelineStage::from_field_count(self.form.len())
    }

    /// Whether every canonical field has been submitted
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// View currently visible
    #[must_use]
    pub fn active_view(&self) -> ViewId {
        self.active_view
    }

    /// Record which view is visible
    pub fn set_active_view(&mut self, view: ViewId) -> ViewId {
        self.active_view = view;
        self.active_view
    }

    /// Clear the session; the visible view is left as is
    pub fn reset(&mut self) {
        self.session_id = SessionId::generate();
        self.form.clear();
        self.step_index = 0;
        self.complete = false;
    }
}

impl Default for VisualizerState {
    fn default() -> Self {
        Self::new(ViewId::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_submit_counts_and_stage() {
        let mut state = VisualizerState::default();
        let values = [
            (Field::Email, "a@b.com"),
            (Field::FirstName, "Ann"),
            (Field::LastName, "Lee"),
            (Field::CompanyName, "Acme"),
            (Field::JobTitle, "Eng"),
        ];

        let mut previous = state.derived_stage();
        for (n, (field, value)) in values.into_iter().enumerate() {
            let form = state.submit_field(field, value);
            assert_eq!(form.len(), n + 1);
            let stage = state.derived_stage();
            assert!(stage >= previous);
            previous = stage;
        }

        assert!(state.is_complete());
        assert_eq!(state.derived_stage(), PipelineStage::Customer);
    }

    #[test]
    fn test_advance_step_cycles_dynamic_fields_only() {
        let mut state = VisualizerState::default();
        assert_eq!(state.current_step().field, Field::FirstName);

        let visited: Vec<Field> = (0..5).map(|_| state.advance_step().field).collect();
        assert_eq!(
            visited,
            vec![
                Field::LastName,
                Field::CompanyName,
                Field::JobTitle,
                Field::FirstName,
                Field::LastName,
            ]
        );
    }

    #[test]
    fn test_reset_clears_session_but_not_view() {
        let mut state = VisualizerState::new(ViewId::Pipeline);
        let original_session = state.session_id().clone();
        state.submit_field(Field::Email, "a@b.com");
        state.advance_step();

        state.reset();

        assert!(state.form().is_empty());
        assert_eq!(state.current_step().field, Field::FirstName);
        assert_eq!(state.derived_stage(), PipelineStage::Unqualified);
        assert!(!state.is_complete());
        assert_eq!(state.active_view(), ViewId::Pipeline);
        assert_ne!(state.session_id(), &original_session);
    }
}
