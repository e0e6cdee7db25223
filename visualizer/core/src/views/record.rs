//! Record View
//!
//! The business card: a flat summary of the form, redrawn on every
//! submission and never animated. Missing values show the placeholder.

use std::sync::Arc;

use crate::animation::PLACEHOLDER;
use crate::fields::{Field, FormData};
use crate::surfaces::{RecordSurfaces, TextSurface};

/// Record view
pub struct RecordView {
    surfaces: RecordSurfaces,
}

impl RecordView {
    /// Bind to the card slots; missing slots are skipped
    pub fn new(surfaces: RecordSurfaces) -> Self {
        for (slot, name) in [
            (&surfaces.name, "name"),
            (&surfaces.title, "title"),
            (&surfaces.company, "company"),
            (&surfaces.email, "email"),
        ] {
            crate::surfaces::require(slot.as_ref(), "record_view", name);
        }
        Self { surfaces }
    }

    /// Write all four slots from `data`
    pub fn render(&self, data: &FormData) {
        write(&self.surfaces.name, &full_name(data));
        write(&self.surfaces.title, or_placeholder(data.get(Field::JobTitle)));
        write(&self.surfaces.company, or_placeholder(data.get(Field::CompanyName)));
        write(&self.surfaces.email, or_placeholder(data.get(Field::Email)));
    }

    /// Put every slot back to the placeholder
    pub fn clear(&self) {
        for slot in [
            &self.surfaces.name,
            &self.surfaces.title,
            &self.surfaces.company,
            &self.surfaces.email,
        ] {
            write(slot, PLACEHOLDER);
        }
    }
}

/// `first last`, trimmed, or the placeholder when both are absent
#[must_use]
pub fn full_name(data: &FormData) -> String {
    let first = data.get(Field::FirstName).unwrap_or_default();
    let last = data.get(Field::LastName).unwrap_or_default();
    let name = format!("{first} {last}");
    let name = name.trim();
    if name.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        name.to_string()
    }
}

fn or_placeholder(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or(PLACEHOLDER)
}

fn write(slot: &Option<Arc<dyn TextSurface>>, text: &str) {
    if let Some(slot) = slot {
        slot.set_text(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surfaces::memory::MemoryText;

    struct Card {
        name: Arc<MemoryText>,
        title: Arc<MemoryText>,
        company: Arc<MemoryText>,
        email: Arc<MemoryText>,
    }

    fn card() -> (Card, RecordView) {
        let card = Card {
            name: Arc::new(MemoryText::new(PLACEHOLDER)),
            title: Arc::new(MemoryText::new(PLACEHOLDER)),
            company: Arc::new(MemoryText::new(PLACEHOLDER)),
            email: Arc::new(MemoryText::new(PLACEHOLDER)),
        };
        let view = RecordView::new(RecordSurfaces {
            name: Some(card.name.clone()),
            title: Some(card.title.clone()),
            company: Some(card.company.clone()),
            email: Some(card.email.clone()),
        });
        (card, view)
    }

    #[test]
    fn test_render_with_fallbacks() {
        let (card, view) = card();
        let data: FormData = [
            (Field::Email, "a@b.com".to_string()),
            (Field::LastName, "Lee".to_string()),
        ]
        .into_iter()
        .collect();

        view.render(&data);

        assert_eq!(card.name.text(), "Lee");
        assert_eq!(card.title.text(), PLACEHOLDER);
        assert_eq!(card.company.text(), PLACEHOLDER);
        assert_eq!(card.email.text(), "a@b.com");
    }

    #[test]
    fn test_clear_restores_placeholders() {
        let (card, view) = card();
        let data: FormData = [
            (Field::FirstName, "Ann".to_string()),
            (Field::CompanyName, "Acme".to_string()),
        ]
        .into_iter()
        .collect();
        view.render(&data);
        assert_eq!(card.name.text(), "Ann");

        view.clear();

        assert_eq!(card.name.text(), PLACEHOLDER);
        assert_eq!(card.company.text(), PLACEHOLDER);
    }

    #[test]
    fn test_missing_slots_are_skipped() {
        let view = RecordView::new(RecordSurfaces::default());
        view.render(&FormData::new());
        view.clear();
    }

    #[test]
    fn test_full_name_placeholder() {
        assert_eq!(full_name(&FormData::new()), PLACEHOLDER);
    }
}
