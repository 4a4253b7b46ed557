use chrono::{SecondsFormat, Utc};
use common::request::{parse_json, MISSING_FIELDS};
use common::ServiceError;
use serde::{Deserialize, Serialize};

/// A person's stored color preferences, keyed by their name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorRecord {
    #[serde(rename = "pk")]
    pub key: String,
    pub colors: Vec<String>,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorSubmission {
    pub name: String,
    pub color: String,
}

#[derive(Deserialize)]
struct SubmissionBody {
    #[serde(alias = "firstName")]
    name: Option<String>,
    #[serde(alias = "favoriteColor")]
    color: Option<String>,
}

impl ColorSubmission {
    /// Parses a submission body; blank fields count as missing.
    pub fn parse(body: &str) -> Result<Self, ServiceError> {
        let body: SubmissionBody = parse_json(body)?;
        let name = non_blank(body.name);
        let color = non_blank(body.color);

        match (name, color) {
            (Some(name), Some(color)) => Ok(Self { name, color }),
            _ => Err(ServiceError::validation(MISSING_FIELDS)),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Current UTC time as `2024-01-01T00:00:00.000Z`.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_current_and_legacy_field_names() {
        let current = ColorSubmission::parse(r#"{"name":"John","color":"blue"}"#).unwrap();
        let legacy = ColorSubmission::parse(r#"{"firstName":"John","favoriteColor":"blue"}"#).unwrap();
        assert_eq!(current, legacy);
        assert_eq!(current.name, "John");
        assert_eq!(current.color, "blue");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let submission = ColorSubmission::parse(r#"{"name":"  Ada ","color":"red\n"}"#).unwrap();
        assert_eq!(submission.name, "Ada");
        assert_eq!(submission.color, "red");
    }

    #[test]
    fn missing_or_blank_fields_are_rejected() {
        for body in [
            r#"{"name":"John"}"#,
            r#"{"color":"blue"}"#,
            r#"{"name":"","color":"blue"}"#,
            r#"{"name":"John","color":"   "}"#,
            r#"{}"#,
        ] {
            match ColorSubmission::parse(body) {
                Err(ServiceError::Validation(message)) => assert_eq!(message, MISSING_FIELDS),
                other => panic!("{body}: unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn record_serializes_key_as_pk() {
        let record = ColorRecord {
            key: "John".into(),
            colors: vec!["blue".into()],
            timestamp: "2024-01-01T00:00:00.000Z".into(),
        };
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            serde_json::json!({
                "pk": "John",
                "colors": ["blue"],
                "timestamp": "2024-01-01T00:00:00.000Z"
            })
        );
    }

    #[test]
    fn timestamps_are_millisecond_utc() {
        let ts = now_timestamp();
        assert!(ts.ends_with('Z'), "{ts}");
        assert_eq!(ts.len(), "2024-01-01T00:00:00.000Z".len());
    }
}
