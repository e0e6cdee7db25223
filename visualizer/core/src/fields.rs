//! Form Fields
//!
//! The fixed set of fields a visitor fills in, the ordered mapping that holds
//! their submitted values, and the single well-formedness rule the wizard
//! applies to the email address.
//!
//! Display order everywhere (reveals, cards, JSON output) is the canonical
//! order: email, first name, last name, company, job title. `FormData` is a
//! `BTreeMap` keyed by [`Field`], whose `Ord` follows that order, so iteration
//! is always canonical regardless of submission order.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// A canonical form field
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    /// Email address (collected first, then locked)
    Email,
    /// Given name
    FirstName,
    /// Family name
    LastName,
    /// Company name
    CompanyName,
    /// Job title
    JobTitle,
}

impl Field {
    /// Every field, in canonical order
    pub const CANONICAL: [Field; 5] = [
        Field::Email,
        Field::FirstName,
        Field::LastName,
        Field::CompanyName,
        Field::JobTitle,
    ];

    /// Fields collected by the dynamic wizard step, in cycle order
    pub const DYNAMIC: [Field; 4] = [
        Field::FirstName,
        Field::LastName,
        Field::CompanyName,
        Field::JobTitle,
    ];

    /// Stable key used in serialized output and surface lookup
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::CompanyName => "companyName",
            Self::JobTitle => "jobTitle",
        }
    }

    /// Human-readable label, shown as the input placeholder
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Email => "Email Address",
            Self::FirstName => "First Name",
            Self::LastName => "Last Name",
            Self::CompanyName => "Company Name",
            Self::JobTitle => "Job Title",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// One step of the dynamic wizard: which field it collects and its label
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct WizardStep {
    /// Field this step collects
    pub field: Field,
    /// Placeholder label for the input
    pub label: &'static str,
}

impl WizardStep {
    /// Step collecting the given field
    #[must_use]
    pub fn for_field(field: Field) -> Self {
        Self {
            field,
            label: field.label(),
        }
    }
}

/// Submitted form values keyed by field
///
/// Keys only accumulate within a session; the only way to remove them is
/// [`FormData::clear`], which the state store calls on reset.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormData(BTreeMap<Field, String>);

impl FormData {
    /// Create an empty form
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a value, returning the previous one
    pub fn insert(&mut self, field: Field, value: impl Into<String>) -> Option<String> {
        self.0.insert(field, value.into())
    }

    /// Value for a field, if submitted
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    /// Whether a field has been submitted
    #[must_use]
    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    /// Number of submitted fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing has been submitted
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether every canonical field is present
    #[must_use]
    pub fn is_complete(&self) -> bool {
        Field::CANONICAL.iter().all(|field| self.contains(*field))
    }

    /// Iterate submitted values in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, value)| (*field, value.as_str()))
    }

    /// Remove every value
    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl FromIterator<(Field, String)> for FormData {
    fn from_iter<I: IntoIterator<Item = (Field, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    // Non-whitespace local part, '@', then a dotted domain without whitespace
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

/// Check the single well-formedness rule applied to the email field
#[must_use]
pub fn is_well_formed_email(candidate: &str) -> bool {
    EMAIL_PATTERN.is_match(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_canonical_iteration_order() {
        let mut form = FormData::new();
        form.insert(Field::JobTitle, "Eng");
        form.insert(Field::Email, "a@b.com");
        form.insert(Field::CompanyName, "Acme");

        let keys: Vec<Field> = form.iter().map(|(field, _)| field).collect();
        assert_eq!(keys, vec![Field::Email, Field::CompanyName, Field::JobTitle]);
    }

    #[test]
    fn test_completion_requires_every_field() {
        let mut form = FormData::new();
        for field in Field::DYNAMIC {
            form.insert(field, "x");
        }
        assert!(!form.is_complete());

        form.insert(Field::Email, "a@b.com");
        assert!(form.is_complete());
    }

    #[test]
    fn test_overwrite_keeps_count() {
        let mut form = FormData::new();
        assert_eq!(form.insert(Field::FirstName, "Ann"), None);
        assert_eq!(form.insert(Field::FirstName, "Anne"), Some("Ann".to_string()));
        assert_eq!(form.len(), 1);
        assert_eq!(form.get(Field::FirstName), Some("Anne"));
    }

    #[test]
    fn test_json_uses_field_keys() {
        let mut form = FormData::new();
        form.insert(Field::Email, "a@b.com");
        form.insert(Field::LastName, "Lee");

        assert_eq!(
            serde_json::to_value(&form).unwrap(),
            serde_json::json!({ "email": "a@b.com", "lastName": "Lee" })
        );
    }

    #[test]
    fn test_email_well_formedness() {
        assert!(is_well_formed_email("a@b.com"));
        assert!(is_well_formed_email("first.last+tag@sub.example.org"));
        assert!(!is_well_formed_email(""));
        assert!(!is_well_formed_email("a@b"));
        assert!(!is_well_formed_email("a b@c.com"));
        assert!(!is_well_formed_email("@b.com"));
        assert!(!is_well_formed_email("a@@b.com"));
    }

    #[test]
    fn test_step_labels_follow_fields() {
        let labels: Vec<&str> = Field::DYNAMIC
            .map(WizardStep::for_field)
            .iter()
            .map(|step| step.label)
            .collect();
        assert_eq!(labels, ["First Name", "Last Name", "Company Name", "Job Title"]);
    }
}
