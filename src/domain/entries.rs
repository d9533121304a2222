use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::{Date, format_description::FormatItem, macros::format_description};

use super::error::DomainError;

/// Input format of `date` and `updated`, e.g. `04-03-2024`.
pub const ENTRY_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[day]-[month]-[year]");
/// Display format for rendered dates, e.g. `March 04, 2024`.
pub const LONG_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[month repr:long] [day], [year]");

const REQUIRED_FIELDS: [&str; 5] = ["title", "context", "explanation", "solution", "date"];

/// One catalogued error: what happened, why, and how to fix it.
///
/// Entries are read once and never mutated; rendering works on copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    pub title: String,
    pub context: String,
    pub explanation: String,
    pub solution: String,
    /// Display order is significant and part of the entry's identity.
    #[serde(default)]
    pub tags: Vec<String>,
    pub date: String,
    /// Absent means the entry was never revised. Absent and empty both render
    /// no "Updated" clause, but only absent is left out of the cache key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
}

impl ErrorEntry {
    /// Decode a single record from the entries document.
    pub fn from_value(value: Value) -> Result<Self, DomainError> {
        let Some(fields) = value.as_object() else {
            return Err(DomainError::malformed("entry must be a JSON object"));
        };

        if let Some(missing) = REQUIRED_FIELDS
            .iter()
            .find(|field| !fields.contains_key(**field))
        {
            return Err(DomainError::missing_field(*missing));
        }
        if fields.get("updated").is_some_and(Value::is_null) {
            return Err(DomainError::malformed("field `updated` must be a string"));
        }

        serde_json::from_value(value).map_err(|err| DomainError::malformed(err.to_string()))
    }

    /// Check the field-presence and date-format invariants.
    pub fn validate(&self) -> Result<(), DomainError> {
        for (field, value) in [
            ("title", &self.title),
            ("context", &self.context),
            ("explanation", &self.explanation),
            ("solution", &self.solution),
            ("date", &self.date),
        ] {
            if value.is_empty() {
                return Err(DomainError::empty_field(field));
            }
        }

        parse_entry_date("date", &self.date)?;
        if let Some(updated) = self.revision_date() {
            parse_entry_date("updated", updated)?;
        }

        Ok(())
    }

    /// The `updated` value to display, if any; an empty string shows nothing.
    pub fn revision_date(&self) -> Option<&str> {
        self.updated.as_deref().filter(|updated| !updated.is_empty())
    }

    /// Tags joined for display, in the order given.
    pub fn joined_tags(&self) -> String {
        self.tags.join(", ")
    }
}

pub fn parse_entry_date(field: &'static str, value: &str) -> Result<Date, DomainError> {
    Date::parse(value, ENTRY_DATE_FORMAT).map_err(|_| DomainError::invalid_date(field, value))
}

pub fn format_long_date(date: Date) -> Result<String, DomainError> {
    date.format(LONG_DATE_FORMAT)
        .map_err(|err| DomainError::invariant(format!("failed to format date: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> ErrorEntry {
        ErrorEntry {
            title: "E1".to_string(),
            context: "ctx".to_string(),
            explanation: "why".to_string(),
            solution: "fix".to_string(),
            tags: vec!["a".to_string(), "b".to_string()],
            date: "01-01-2024".to_string(),
            updated: None,
        }
    }

    #[test]
    fn decodes_entry_without_optional_fields() {
        let entry = ErrorEntry::from_value(json!({
            "title": "E1",
            "context": "ctx",
            "explanation": "why",
            "solution": "fix",
            "date": "01-01-2024"
        }))
        .expect("entry decodes");

        assert!(entry.tags.is_empty());
        assert_eq!(entry.updated, None);
        assert_eq!(entry.joined_tags(), "");
    }

    #[test]
    fn reports_missing_required_field_by_name() {
        let err = ErrorEntry::from_value(json!({
            "title": "E1",
            "context": "ctx",
            "solution": "fix",
            "date": "01-01-2024"
        }))
        .expect_err("explanation is required");

        match err {
            DomainError::MissingField { field } => assert_eq!(field, "explanation"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_non_object_records() {
        let err = ErrorEntry::from_value(json!(["not", "an", "entry"])).expect_err("array");
        assert!(matches!(err, DomainError::Malformed { .. }));
    }

    #[test]
    fn null_updated_is_malformed() {
        let err = ErrorEntry::from_value(json!({
            "title": "E1",
            "context": "ctx",
            "explanation": "why",
            "solution": "fix",
            "date": "01-01-2024",
            "updated": null
        }))
        .expect_err("null is not a date");
        assert!(matches!(err, DomainError::Malformed { .. }));
    }

    #[test]
    fn validate_rejects_empty_required_text() {
        let mut entry = sample();
        entry.solution = String::new();
        let err = entry.validate().expect_err("empty solution");
        assert!(matches!(err, DomainError::EmptyField { field: "solution" }));
    }

    #[test]
    fn whitespace_only_text_is_content() {
        let mut entry = sample();
        entry.title = " ".to_string();
        entry.validate().expect("whitespace is not empty");
    }

    #[test]
    fn validate_rejects_badly_formatted_dates() {
        let mut entry = sample();
        entry.date = "2024-01-01".to_string();
        assert!(matches!(
            entry.validate(),
            Err(DomainError::InvalidDate { field: "date", .. })
        ));

        let mut entry = sample();
        entry.updated = Some("2024/01/02".to_string());
        assert!(matches!(
            entry.validate(),
            Err(DomainError::InvalidDate {
                field: "updated",
                ..
            })
        ));
    }

    #[test]
    fn empty_updated_is_valid_and_not_displayed() {
        let mut entry = sample();
        entry.updated = Some(String::new());
        entry.validate().expect("empty updated is accepted");
        assert_eq!(entry.revision_date(), None);

        let value = serde_json::to_value(&entry).expect("serializes");
        assert_eq!(value["updated"], "");
    }

    #[test]
    fn long_date_pads_the_day() {
        let date = parse_entry_date("date", "04-03-2024").expect("valid date");
        assert_eq!(format_long_date(date).expect("formats"), "March 04, 2024");
    }

    #[test]
    fn absent_updated_is_not_serialized() {
        let value = serde_json::to_value(sample()).expect("serializes");
        assert!(value.get("updated").is_none());

        let mut revised = sample();
        revised.updated = Some("02-01-2024".to_string());
        let value = serde_json::to_value(revised).expect("serializes");
        assert_eq!(value["updated"], "02-01-2024");
    }
}
