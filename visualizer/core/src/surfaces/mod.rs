//! Display Surfaces
//!
//! The engine reads input values from, and writes text and structural
//! classes into, surfaces it does not own. Each trait here is the minimum a
//! host (browser bridge, terminal, test double) has to provide. All methods
//! take `&self`: surfaces are shared behind `Arc` and use interior
//! mutability.
//!
//! # Missing Collaborators
//!
//! Every surface in a bundle is optional. A component constructed without a
//! surface it needs logs a warning once and disables the affected
//! sub-feature; nothing else is affected.

pub mod memory;

use std::collections::HashMap;
use std::sync::Arc;

use crate::animation::ElementId;
use crate::config::CompletionMessage;
use crate::fields::Field;
use crate::stage::PipelineStage;
use crate::views::ViewId;

/// Marks the element currently shown or selected
pub const CLASS_ACTIVE: &str = "is-active";
/// Marks a progress step already passed
pub const CLASS_COMPLETE: &str = "is-complete";
/// Marks an input that passed validation
pub const CLASS_VALID: &str = "is-valid";
/// Marks an input that failed validation
pub const CLASS_INVALID: &str = "is-invalid";
/// Marks a locked input
pub const CLASS_DISABLED: &str = "is-disabled";

/// A display slot holding plain text
pub trait TextSurface: Send + Sync {
    /// Current text
    fn text(&self) -> String;

    /// Replace the text
    fn set_text(&self, text: &str);
}

/// An element carrying structural classes; also a tween target
pub trait ElementSurface: Send + Sync {
    /// Identifier passed to the tween engine
    fn id(&self) -> ElementId;

    /// Add or remove a class
    fn set_class(&self, class: &str, enabled: bool);

    /// Whether a class is present
    fn has_class(&self, class: &str) -> bool;
}

/// A text input the visitor types into
pub trait InputSurface: ElementSurface {
    /// Current value
    fn value(&self) -> String;

    /// Replace the value
    fn set_value(&self, value: &str);

    /// Current placeholder
    fn placeholder(&self) -> String;

    /// Replace the placeholder
    fn set_placeholder(&self, placeholder: &str);

    /// Enable or disable editing
    fn set_disabled(&self, disabled: bool);

    /// Whether editing is disabled
    fn is_disabled(&self) -> bool;

    /// Move keyboard focus here
    fn focus(&self);
}

/// Content rendered on the pipeline card
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CardContent {
    /// `first last`, trimmed
    pub name: String,
    /// Company name
    pub company: String,
    /// Email address
    pub email: String,
}

/// The staged pipeline board holding at most one card
pub trait PipelineBoard: Send + Sync {
    /// Identifier of the card element (tween target)
    fn card_id(&self) -> ElementId;

    /// Create the card in a stage column
    fn mount_card(&self, stage: PipelineStage, content: &CardContent);

    /// Re-render the card content in place
    fn update_card(&self, content: &CardContent);

    /// Re-parent the card into a stage column
    fn place_card(&self, stage: PipelineStage);

    /// Horizontal distance between two columns, if both exist
    fn column_offset(&self, from: PipelineStage, to: PipelineStage) -> Option<f32>;

    /// Remove the card from every column
    fn clear(&self);
}

/// The container holding the wizard form
pub trait WizardPanel: Send + Sync {
    /// Replace the form with the terminal completion message
    fn show_completion(&self, message: &CompletionMessage);

    /// Restore the initial form markup
    fn restore(&self);
}

/// Surfaces the wizard controller drives
#[derive(Clone, Default)]
pub struct WizardSurfaces {
    /// Email input (step 1)
    pub email_input: Option<Arc<dyn InputSurface>>,
    /// Dynamic field input (step 2)
    pub dynamic_input: Option<Arc<dyn InputSurface>>,
    /// Container of the email step
    pub email_step: Option<Arc<dyn ElementSurface>>,
    /// Container of the dynamic step
    pub dynamic_step: Option<Arc<dyn ElementSurface>>,
    /// Progress indicators, in order
    pub progress: Vec<Arc<dyn ElementSurface>>,
    /// Form container
    pub panel: Option<Arc<dyn WizardPanel>>,
    /// Loading overlay shown during the refresh effect
    pub loading_overlay: Option<Arc<dyn ElementSurface>>,
    /// Full-page flash element used by the refresh effect
    pub page_flash: Option<Arc<dyn ElementSurface>>,
}

/// Business card display slots
#[derive(Clone, Default)]
pub struct RecordSurfaces {
    /// Full name
    pub name: Option<Arc<dyn TextSurface>>,
    /// Job title
    pub title: Option<Arc<dyn TextSurface>>,
    /// Company name
    pub company: Option<Arc<dyn TextSurface>>,
    /// Email address
    pub email: Option<Arc<dyn TextSurface>>,
}

/// Surfaces the view coordinator drives
#[derive(Clone, Default)]
pub struct ViewSurfaces {
    /// Tab buttons per view
    pub tabs: HashMap<ViewId, Arc<dyn ElementSurface>>,
    /// Content containers per view (cross-fade targets)
    pub contents: HashMap<ViewId, Arc<dyn ElementSurface>>,
    /// CRM field slots
    pub crm_fields: HashMap<Field, Arc<dyn TextSurface>>,
    /// Pipeline board
    pub board: Option<Arc<dyn PipelineBoard>>,
    /// Business card
    pub record: RecordSurfaces,
}

/// Every surface the engine can drive
#[derive(Clone, Default)]
pub struct Surfaces {
    /// Wizard-side surfaces
    pub wizard: WizardSurfaces,
    /// View-side surfaces
    pub views: ViewSurfaces,
}

/// Log a missing collaborator; returns whether it is present
pub(crate) fn require<T: ?Sized>(surface: Option<&Arc<T>>, component: &str, name: &str) -> bool {
    if surface.is_none() {
        tracing::warn!(component, surface = name, "surface missing, feature disabled");
    }
    surface.is_some()
}
