//! In-Memory Surfaces
//!
//! Surface implementations that keep their state in memory. The demo binary
//! renders from them and the tests assert against them. [`MemorySurfaces`]
//! builds a complete, wired set and keeps typed handles to every piece.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::{
    CardContent, ElementSurface, InputSurface, PipelineBoard, RecordSurfaces, Surfaces,
    TextSurface, ViewSurfaces, WizardPanel, WizardSurfaces,
};
use crate::animation::{ElementId, PLACEHOLDER};
use crate::config::CompletionMessage;
use crate::fields::Field;
use crate::stage::PipelineStage;
use crate::views::ViewId;

/// Writes across several text slots in the order they happened
///
/// Entries are `(slot name, text)`.
#[derive(Clone, Debug, Default)]
pub struct WriteLog(Arc<Mutex<Vec<(String, String)>>>);

impl WriteLog {
    /// Every write so far, oldest first
    #[must_use]
    pub fn entries(&self) -> Vec<(String, String)> {
        self.0.lock().clone()
    }

    /// Number of writes so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    /// Whether nothing was written yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }

    fn push(&self, slot: &str, text: &str) {
        self.0.lock().push((slot.to_string(), text.to_string()));
    }
}

/// Text slot that remembers every value it held
#[derive(Debug, Default)]
pub struct MemoryText {
    history: Mutex<Vec<String>>,
    log: Option<(String, WriteLog)>,
}

impl MemoryText {
    /// Slot holding `initial`
    #[must_use]
    pub fn new(initial: &str) -> Self {
        Self {
            history: Mutex::new(vec![initial.to_string()]),
            log: None,
        }
    }

    /// Slot that also appends its writes to `log` under `name`
    #[must_use]
    pub fn logged(initial: &str, name: impl Into<String>, log: WriteLog) -> Self {
        Self {
            log: Some((name.into(), log)),
            ..Self::new(initial)
        }
    }

    /// Every value held, oldest first
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.history.lock().clone()
    }

    /// Number of writes since creation
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.history.lock().len().saturating_sub(1)
    }
}

impl TextSurface for MemoryText {
    fn text(&self) -> String {
        self.history.lock().last().cloned().unwrap_or_default()
    }

    fn set_text(&self, text: &str) {
        self.history.lock().push(text.to_string());
        if let Some((name, log)) = &self.log {
            log.push(name, text);
        }
    }
}

/// Element with a class list
#[derive(Debug)]
pub struct MemoryElement {
    id: ElementId,
    classes: Mutex<BTreeSet<String>>,
}

impl MemoryElement {
    /// Element with no classes
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: ElementId::new(id),
            classes: Mutex::new(BTreeSet::new()),
        }
    }

    /// Element starting with one class
    pub fn with_class(id: impl Into<String>, class: &str) -> Self {
        let element = Self::new(id);
        element.set_class(class, true);
        element
    }

    /// Current classes, sorted
    #[must_use]
    pub fn classes(&self) -> Vec<String> {
        self.classes.lock().iter().cloned().collect()
    }
}

impl ElementSurface for MemoryElement {
    fn id(&self) -> ElementId {
        self.id.clone()
    }

    fn set_class(&self, class: &str, enabled: bool) {
        let mut classes = self.classes.lock();
        if enabled {
            classes.insert(class.to_string());
        } else {
            classes.remove(class);
        }
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.lock().contains(class)
    }
}

/// Text input
#[derive(Debug)]
pub struct MemoryInput {
    element: MemoryElement,
    value: Mutex<String>,
    placeholder: Mutex<String>,
    disabled: AtomicBool,
    focus_count: AtomicUsize,
}

impl MemoryInput {
    /// Empty input with a placeholder
    pub fn new(id: impl Into<String>, placeholder: &str) -> Self {
        Self {
            element: MemoryElement::new(id),
            value: Mutex::new(String::new()),
            placeholder: Mutex::new(placeholder.to_string()),
            disabled: AtomicBool::new(false),
            focus_count: AtomicUsize::new(0),
        }
    }

    /// How many times focus was requested
    #[must_use]
    pub fn focus_count(&self) -> usize {
        self.focus_count.load(Ordering::SeqCst)
    }

    /// Current classes, sorted
    #[must_use]
    pub fn classes(&self) -> Vec<String> {
        self.element.classes()
    }
}

impl ElementSurface for MemoryInput {
    fn id(&self) -> ElementId {
        self.element.id()
    }

    fn set_class(&self, class: &str, enabled: bool) {
        self.element.set_class(class, enabled);
    }

    fn has_class(&self, class: &str) -> bool {
        self.element.has_class(class)
    }
}

impl InputSurface for MemoryInput {
    fn value(&self) -> String {
        self.value.lock().clone()
    }

    fn set_value(&self, value: &str) {
        *self.value.lock() = value.to_string();
    }

    fn placeholder(&self) -> String {
        self.placeholder.lock().clone()
    }

    fn set_placeholder(&self, placeholder: &str) {
        *self.placeholder.lock() = placeholder.to_string();
    }

    fn set_disabled(&self, disabled: bool) {
        self.disabled.store(disabled, Ordering::SeqCst);
    }

    fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::SeqCst)
    }

    fn focus(&self) {
        self.focus_count.fetch_add(1, Ordering::SeqCst);
    }
}

/// Pipeline board with evenly spaced columns
#[derive(Debug)]
pub struct MemoryBoard {
    card_id: ElementId,
    column_width: f32,
    columns: BTreeSet<PipelineStage>,
    card: Mutex<Option<(PipelineStage, CardContent)>>,
    placements: Mutex<Vec<PipelineStage>>,
}

impl MemoryBoard {
    /// Board with every column present
    #[must_use]
    pub fn new(column_width: f32) -> Self {
        Self::with_columns(column_width, &PipelineStage::ALL)
    }

    /// Board with only some columns present
    #[must_use]
    pub fn with_columns(column_width: f32, columns: &[PipelineStage]) -> Self {
        Self {
            card_id: ElementId::new("pipeline-card"),
            column_width,
            columns: columns.iter().copied().collect(),
            card: Mutex::new(None),
            placements: Mutex::new(Vec::new()),
        }
    }

    /// Column holding the card
    #[must_use]
    pub fn card_stage(&self) -> Option<PipelineStage> {
        self.card.lock().as_ref().map(|(stage, _)| *stage)
    }

    /// Content rendered on the card
    #[must_use]
    pub fn card_content(&self) -> Option<CardContent> {
        self.card.lock().as_ref().map(|(_, content)| content.clone())
    }

    /// Every column the card was mounted or placed in, in order
    #[must_use]
    pub fn placements(&self) -> Vec<PipelineStage> {
        self.placements.lock().clone()
    }
}

impl PipelineBoard for MemoryBoard {
    fn card_id(&self) -> ElementId {
        self.card_id.clone()
    }

    fn mount_card(&self, stage: PipelineStage, content: &CardContent) {
        *self.card.lock() = Some((stage, content.clone()));
        self.placements.lock().push(stage);
    }

    fn update_card(&self, content: &CardContent) {
        if let Some((_, current)) = self.card.lock().as_mut() {
            *current = content.clone();
        }
    }

    fn place_card(&self, stage: PipelineStage) {
        if let Some((current, _)) = self.card.lock().as_mut() {
            *current = stage;
            self.placements.lock().push(stage);
        }
    }

    fn column_offset(&self, from: PipelineStage, to: PipelineStage) -> Option<f32> {
        if !self.columns.contains(&from) || !self.columns.contains(&to) {
            return None;
        }
        let columns = to.index() as f32 - from.index() as f32;
        Some(columns * self.column_width)
    }

    fn clear(&self) {
        *self.card.lock() = None;
    }
}

/// What the wizard panel currently shows
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum PanelContent {
    /// The input form
    #[default]
    Form,
    /// The completion message
    Completed(CompletionMessage),
}

/// Wizard container
#[derive(Debug, Default)]
pub struct MemoryPanel {
    content: Mutex<PanelContent>,
}

impl MemoryPanel {
    /// What is shown
    #[must_use]
    pub fn content(&self) -> PanelContent {
        self.content.lock().clone()
    }
}

impl WizardPanel for MemoryPanel {
    fn show_completion(&self, message: &CompletionMessage) {
        *self.content.lock() = PanelContent::Completed(message.clone());
    }

    fn restore(&self) {
        *self.content.lock() = PanelContent::Form;
    }
}

/// Number of progress indicators in the default layout
pub const PROGRESS_STEPS: usize = 4;

/// A complete set of in-memory surfaces with typed handles
pub struct MemorySurfaces {
    /// Email input
    pub email_input: Arc<MemoryInput>,
    /// Dynamic input
    pub dynamic_input: Arc<MemoryInput>,
    /// Email step container
    pub email_step: Arc<MemoryElement>,
    /// Dynamic step container
    pub dynamic_step: Arc<MemoryElement>,
    /// Progress indicators
    pub progress: Vec<Arc<MemoryElement>>,
    /// Form container
    pub panel: Arc<MemoryPanel>,
    /// Loading overlay
    pub loading_overlay: Arc<MemoryElement>,
    /// Page flash
    pub page_flash: Arc<MemoryElement>,
    /// Tab buttons
    pub tabs: HashMap<ViewId, Arc<MemoryElement>>,
    /// View containers
    pub contents: HashMap<ViewId, Arc<MemoryElement>>,
    /// CRM field slots
    pub crm_fields: HashMap<Field, Arc<MemoryText>>,
    /// Writes to every CRM slot, keyed by field key
    pub crm_log: WriteLog,
    /// Pipeline board
    pub board: Arc<MemoryBoard>,
    /// Business card name
    pub card_name: Arc<MemoryText>,
    /// Business card title
    pub card_title: Arc<MemoryText>,
    /// Business card company
    pub card_company: Arc<MemoryText>,
    /// Business card email
    pub card_email: Arc<MemoryText>,
}

impl MemorySurfaces {
    /// Build the default layout with `initial_view` shown
    #[must_use]
    pub fn new(initial_view: ViewId) -> Self {
        let view_elements = |prefix: &str| -> HashMap<ViewId, Arc<MemoryElement>> {
            ViewId::ALL
                .into_iter()
                .map(|view| {
                    let element = MemoryElement::new(format!("{prefix}:{view}"));
                    element.set_class(super::CLASS_ACTIVE, view == initial_view);
                    (view, Arc::new(element))
                })
                .collect()
        };

        let progress = (1..=PROGRESS_STEPS)
            .map(|step| {
                let element = MemoryElement::new(format!("progress:{step}"));
                element.set_class(super::CLASS_ACTIVE, step == 1);
                Arc::new(element)
            })
            .collect();

        let crm_log = WriteLog::default();
        let crm_fields = Field::CANONICAL
            .into_iter()
            .map(|field| {
                let slot = MemoryText::logged(PLACEHOLDER, field.key(), crm_log.clone());
                (field, Arc::new(slot))
            })
            .collect();

        Self {
            email_input: Arc::new(MemoryInput::new("input:email", Field::Email.label())),
            dynamic_input: Arc::new(MemoryInput::new(
                "input:dynamic",
                Field::FirstName.label(),
            )),
            email_step: Arc::new(MemoryElement::with_class("step:email", super::CLASS_ACTIVE)),
            dynamic_step: Arc::new(MemoryElement::new("step:dynamic")),
            progress,
            panel: Arc::new(MemoryPanel::default()),
            loading_overlay: Arc::new(MemoryElement::new("loading-overlay")),
            page_flash: Arc::new(MemoryElement::new("page-refresh")),
            tabs: view_elements("tab"),
            contents: view_elements("view"),
            crm_fields,
            crm_log,
            board: Arc::new(MemoryBoard::new(240.0)),
            card_name: Arc::new(MemoryText::new(PLACEHOLDER)),
            card_title: Arc::new(MemoryText::new(PLACEHOLDER)),
            card_company: Arc::new(MemoryText::new(PLACEHOLDER)),
            card_email: Arc::new(MemoryText::new(PLACEHOLDER)),
        }
    }

    /// CRM slot for a field
    ///
    /// # Panics
    ///
    /// Never for the default layout, which has a slot per canonical field.
    #[must_use]
    pub fn crm(&self, field: Field) -> &MemoryText {
        &self.crm_fields[&field]
    }

    /// Type-erased bundle to hand to the engine
    #[must_use]
    pub fn surfaces(&self) -> Surfaces {
        Surfaces {
            wizard: WizardSurfaces {
                email_input: Some(self.email_input.clone()),
                dynamic_input: Some(self.dynamic_input.clone()),
                email_step: Some(self.email_step.clone()),
                dynamic_step: Some(self.dynamic_step.clone()),
                progress: self
                    .progress
                    .iter()
                    .map(|element| Arc::clone(element) as Arc<dyn ElementSurface>)
                    .collect(),
                panel: Some(self.panel.clone()),
                loading_overlay: Some(self.loading_overlay.clone()),
                page_flash: Some(self.page_flash.clone()),
            },
            views: ViewSurfaces {
                tabs: erase_elements(&self.tabs),
                contents: erase_elements(&self.contents),
                crm_fields: self
                    .crm_fields
                    .iter()
                    .map(|(field, slot)| (*field, Arc::clone(slot) as Arc<dyn TextSurface>))
                    .collect(),
                board: Some(self.board.clone()),
                record: RecordSurfaces {
                    name: Some(self.card_name.clone()),
                    title: Some(self.card_title.clone()),
                    company: Some(self.card_company.clone()),
                    email: Some(self.card_email.clone()),
                },
            },
        }
    }
}

impl Default for MemorySurfaces {
    fn default() -> Self {
        Self::new(ViewId::default())
    }
}

fn erase_elements(
    elements: &HashMap<ViewId, Arc<MemoryElement>>,
) -> HashMap<ViewId, Arc<dyn ElementSurface>> {
    elements
        .iter()
        .map(|(view, element)| (*view, Arc::clone(element) as Arc<dyn ElementSurface>))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surfaces::CLASS_ACTIVE;

    #[test]
    fn test_text_history() {
        let slot = MemoryText::new(PLACEHOLDER);
        slot.set_text("A");
        slot.set_text("Ann");

        assert_eq!(slot.text(), "Ann");
        assert_eq!(slot.write_count(), 2);
    }

    #[test]
    fn test_logged_slots_share_one_order() {
        let log = WriteLog::default();
        let email = MemoryText::logged(PLACEHOLDER, "email", log.clone());
        let name = MemoryText::logged(PLACEHOLDER, "firstName", log.clone());

        email.set_text("a");
        name.set_text("A");
        email.set_text("a@");

        let entries = log.entries();
        let order: Vec<(&str, &str)> = entries
            .iter()
            .map(|(slot, text)| (slot.as_str(), text.as_str()))
            .collect();
        assert_eq!(order, [("email", "a"), ("firstName", "A"), ("email", "a@")]);
        assert_eq!(email.write_count(), 2);
    }

    #[test]
    fn test_board_offsets_and_missing_columns() {
        let board = MemoryBoard::with_columns(
            100.0,
            &[PipelineStage::Unqualified, PipelineStage::Marketing],
        );

        assert_eq!(
            board.column_offset(PipelineStage::Unqualified, PipelineStage::Marketing),
            Some(100.0)
        );
        assert_eq!(
            board.column_offset(PipelineStage::Marketing, PipelineStage::Sales),
            None
        );
    }

    #[test]
    fn test_place_without_card_is_ignored() {
        let board = MemoryBoard::new(100.0);
        board.place_card(PipelineStage::Sales);

        assert_eq!(board.card_stage(), None);
        assert!(board.placements().is_empty());
    }

    #[test]
    fn test_default_layout() {
        let surfaces = MemorySurfaces::new(ViewId::Pipeline);

        assert!(surfaces.contents[&ViewId::Pipeline].has_class(CLASS_ACTIVE));
        assert!(!surfaces.contents[&ViewId::Crm].has_class(CLASS_ACTIVE));
        assert!(surfaces.progress[0].has_class(CLASS_ACTIVE));
        assert_eq!(surfaces.crm(Field::Email).text(), PLACEHOLDER);
        assert_eq!(surfaces.dynamic_input.placeholder(), "First Name");
    }
}
