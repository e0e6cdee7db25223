//! CRM Record View
//!
//! One text slot per canonical field. Animated updates reveal each value by
//! typewriter and pause before the next field; silent updates write values
//! directly. Typewriters come from a shared [`TypewriterPool`] so an abort
//! can reset them all at once.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::animation::{RevealOutcome, TypewriterPool, PLACEHOLDER};
use crate::fields::{Field, FormData};
use crate::surfaces::TextSurface;

/// Field-slot view
pub struct CrmView {
    slots: HashMap<Field, Arc<dyn TextSurface>>,
    writers: TypewriterPool,
    tick: Duration,
    pause: Duration,
}

impl CrmView {
    /// Bind to field slots; a field without a slot is never rendered
    pub fn new(
        slots: HashMap<Field, Arc<dyn TextSurface>>,
        writers: TypewriterPool,
        tick: Duration,
        pause: Duration,
    ) -> Self {
        for field in Field::CANONICAL {
            crate::surfaces::require(slots.get(&field), "crm_view", field.key());
        }
        Self {
            slots,
            writers,
            tick,
            pause,
        }
    }

    /// Write every submitted value directly, no reveal
    pub fn write_silently(&self, data: &FormData) {
        for (field, value) in data.iter() {
            if let Some(slot) = self.slots.get(&field) {
                slot.set_text(value);
            }
        }
    }

    /// Typewriter-reveal one value, then pause before the next field
    ///
    /// A field without a slot counts as completed.
    pub async fn reveal(&self, field: Field, value: &str) -> RevealOutcome {
        let Some(slot) = self.slots.get(&field) else {
            return RevealOutcome::Completed;
        };
        let writer = self.writers.writer_for(field, slot, self.tick);
        let outcome = writer.reveal(value).await;
        if outcome.is_completed() && !self.pause.is_zero() {
            tokio::time::sleep(self.pause).await;
        }
        outcome
    }

    /// Show the placeholder in the given slots
    pub fn blank(&self, fields: impl IntoIterator<Item = Field>) {
        for field in fields {
            if let Some(slot) = self.slots.get(&field) {
                slot.set_text(PLACEHOLDER);
            }
        }
    }

    /// Abort every reveal and blank every slot
    pub fn clear(&self) {
        self.writers.reset_all();
        self.blank(Field::CANONICAL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surfaces::memory::MemoryText;

    const TICK: Duration = Duration::from_millis(50);

    fn view(pause: Duration) -> (HashMap<Field, Arc<MemoryText>>, CrmView) {
        let slots: HashMap<Field, Arc<MemoryText>> = Field::CANONICAL
            .into_iter()
            .map(|field| (field, Arc::new(MemoryText::new(PLACEHOLDER))))
            .collect();
        let erased = slots
            .iter()
            .map(|(field, slot)| (*field, Arc::clone(slot) as Arc<dyn TextSurface>))
            .collect();
        (slots, CrmView::new(erased, TypewriterPool::new(), TICK, pause))
    }

    #[tokio::test(start_paused = true)]
    async fn test_reveal_then_pause() {
        let (slots, view) = view(Duration::from_millis(200));
        let started = tokio::time::Instant::now();

        let outcome = view.reveal(Field::FirstName, "Ann").await;

        assert_eq!(outcome, RevealOutcome::Completed);
        assert_eq!(slots[&Field::FirstName].text(), "Ann");
        assert!(started.elapsed() >= TICK * 3 + Duration::from_millis(200));
    }

    #[test]
    fn test_silent_write_touches_only_submitted_fields() {
        let (slots, view) = view(Duration::ZERO);
        let data: FormData = [(Field::Email, "a@b.com".to_string())].into_iter().collect();

        view.write_silently(&data);

        assert_eq!(slots[&Field::Email].history(), vec!["-", "a@b.com"]);
        assert_eq!(slots[&Field::FirstName].write_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_slot_reveal_is_noop() {
        let view = CrmView::new(HashMap::new(), TypewriterPool::new(), TICK, Duration::ZERO);
        assert!(view.reveal(Field::Email, "a@b.com").await.is_completed());
    }

    #[test]
    fn test_clear_blanks_everything() {
        let (slots, view) = view(Duration::ZERO);
        let data: FormData = [
            (Field::Email, "a@b.com".to_string()),
            (Field::JobTitle, "Eng".to_string()),
        ]
        .into_iter()
        .collect();
        view.write_silently(&data);

        view.clear();

        for field in Field::CANONICAL {
            assert_eq!(slots[&field].text(), PLACEHOLDER);
        }
    }
}
