//! Animation Ledger
//!
//! Per-view record of what the visitor has actually watched animate. The
//! CRM view records the last revealed string per field; the pipeline view
//! records the last stage the card was walked to. The live form may be ahead
//! of an entry whenever data landed while that view was hidden.
//!
//! # Replay Rule
//!
//! A view replays on switch iff [`AnimationLedger::should_animate`] holds and
//! [`AnimationLedger::lags`] reports a delta. `played` is cleared for every
//! view on each fresh submission and on reset, and set when a view finishes
//! an animated update.
//!
//! Only the coordinator mutates the ledger.

use std::collections::HashMap;

use crate::fields::{Field, FormData};
use crate::stage::PipelineStage;
use crate::views::ViewId;

/// What one view last animated
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LedgerEntry {
    /// Values revealed, per field
    pub fields: FormData,
    /// Stage last walked to
    pub stage: PipelineStage,
    /// Whether the view has animated the current submission
    pub played: bool,
}

/// Ledger keyed by view
#[derive(Clone, Debug, Default)]
pub struct AnimationLedger {
    entries: HashMap<ViewId, LedgerEntry>,
}

impl AnimationLedger {
    /// Empty ledger
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot for one view (default when never touched)
    #[must_use]
    pub fn entry(&self, view: ViewId) -> LedgerEntry {
        self.entries.get(&view).cloned().unwrap_or_default()
    }

    /// Fields whose live value differs from what `view` revealed, in
    /// canonical order
    #[must_use]
    pub fn pending_fields(&self, view: ViewId, live: &FormData) -> Vec<(Field, String)> {
        let recorded = self.entries.get(&view).map(|entry| &entry.fields);
        live.iter()
            .filter(|(field, value)| recorded.and_then(|r| r.get(*field)) != Some(*value))
            .map(|(field, value)| (field, value.to_string()))
            .collect()
    }

    /// Ledger stage for `view` when it is behind `live`
    #[must_use]
    pub fn lagging_stage(&self, view: ViewId, live: PipelineStage) -> Option<PipelineStage> {
        let recorded = self.entries.get(&view).map(|entry| entry.stage).unwrap_or_default();
        (recorded < live).then_some(recorded)
    }

    /// Whether `view` has something left to animate for `live`
    #[must_use]
    pub fn lags(&self, view: ViewId, live: &FormData) -> bool {
        match view {
            ViewId::Crm => !self.pending_fields(view, live).is_empty(),
            ViewId::Pipeline => self
                .lagging_stage(view, PipelineStage::from_field_count(live.len()))
                .is_some(),
            ViewId::Card => false,
        }
    }

    /// Whether `view` is fully reconciled with `live`
    #[must_use]
    pub fn is_current(&self, view: ViewId, live: &FormData) -> bool {
        !self.lags(view, live)
    }

    /// Whether `view` may animate: data exists and it has not played yet
    #[must_use]
    pub fn should_animate(&self, view: ViewId, live: &FormData) -> bool {
        !live.is_empty() && !self.entries.get(&view).is_some_and(|entry| entry.played)
    }

    /// Record a completed reveal
    pub fn record_field(&mut self, view: ViewId, field: Field, value: &str) {
        self.entries
            .entry(view)
            .or_default()
            .fields
            .insert(field, value);
    }

    /// Record a completed walk
    pub fn record_stage(&mut self, view: ViewId, stage: PipelineStage) {
        self.entries.entry(view).or_default().stage = stage;
    }

    /// Mark `view` as having animated the current submission
    pub fn mark_played(&mut self, view: ViewId) {
        self.entries.entry(view).or_default().played = true;
    }

    /// A new submission arrived: every view may animate again
    pub fn invalidate_played(&mut self) {
        for entry in self.entries.values_mut() {
            entry.played = false;
        }
    }

    /// Forget everything
    pub fn reset(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn form(pairs: &[(Field, &str)]) -> FormData {
        pairs
            .iter()
            .map(|(field, value)| (*field, (*value).to_string()))
            .collect()
    }

    #[test]
    fn test_pending_fields_in_canonical_order() {
        let mut ledger = AnimationLedger::new();
        ledger.record_field(ViewId::Crm, Field::Email, "a@b.com");
        let live = form(&[
            (Field::JobTitle, "Eng"),
            (Field::Email, "a@b.com"),
            (Field::FirstName, "Ann"),
        ]);

        assert_eq!(
            ledger.pending_fields(ViewId::Crm, &live),
            vec![
                (Field::FirstName, "Ann".to_string()),
                (Field::JobTitle, "Eng".to_string()),
            ]
        );
    }

    #[test]
    fn test_changed_value_is_pending() {
        let mut ledger = AnimationLedger::new();
        ledger.record_field(ViewId::Crm, Field::FirstName, "Ann");
        let live = form(&[(Field::FirstName, "Anne")]);

        assert_eq!(ledger.pending_fields(ViewId::Crm, &live).len(), 1);
    }

    #[test]
    fn test_lagging_stage() {
        let mut ledger = AnimationLedger::new();
        assert_eq!(
            ledger.lagging_stage(ViewId::Pipeline, PipelineStage::Marketing),
            Some(PipelineStage::Unqualified)
        );

        ledger.record_stage(ViewId::Pipeline, PipelineStage::Marketing);
        assert_eq!(
            ledger.lagging_stage(ViewId::Pipeline, PipelineStage::Marketing),
            None
        );
    }

    #[test]
    fn test_lags_per_view() {
        let mut ledger = AnimationLedger::new();
        let live = form(&[(Field::Email, "a@b.com"), (Field::FirstName, "Ann")]);

        assert!(ledger.lags(ViewId::Crm, &live));
        assert!(ledger.lags(ViewId::Pipeline, &live));
        assert!(!ledger.lags(ViewId::Card, &live));

        ledger.record_stage(ViewId::Pipeline, PipelineStage::Marketing);
        assert!(ledger.is_current(ViewId::Pipeline, &live));
    }

    #[test]
    fn test_played_flag_lifecycle() {
        let mut ledger = AnimationLedger::new();
        let live = form(&[(Field::Email, "a@b.com")]);

        assert!(!ledger.should_animate(ViewId::Crm, &FormData::new()));
        assert!(ledger.should_animate(ViewId::Crm, &live));

        ledger.mark_played(ViewId::Crm);
        assert!(!ledger.should_animate(ViewId::Crm, &live));

        ledger.invalidate_played();
        assert!(ledger.should_animate(ViewId::Crm, &live));
    }

    #[test]
    fn test_reset_clears_every_view() {
        let mut ledger = AnimationLedger::new();
        ledger.record_field(ViewId::Crm, Field::Email, "a@b.com");
        ledger.record_stage(ViewId::Pipeline, PipelineStage::Sales);
        ledger.mark_played(ViewId::Pipeline);

        ledger.reset();

        assert_eq!(ledger.entry(ViewId::Crm), LedgerEntry::default());
        assert_eq!(ledger.entry(ViewId::Pipeline), LedgerEntry::default());
    }
}
