use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use validator::{ValidateLength, ValidationError};

/// Represents optional field semantics in update requests.
///
/// - `Unchanged` → key absent from the payload
/// - `SetToNull` → key present with `null`
/// - `SetToValue` → key present with a value
///
/// Structs using it must carry `#[serde(default)]` so absent keys stay `Unchanged`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum OptionField<T> {
    #[default]
    Unchanged,
    SetToNull,
    SetToValue(T),
}

impl<'de, T> Deserialize<'de> for OptionField<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => OptionField::SetToValue(value),
            None => OptionField::SetToNull,
        })
    }
}

/// Mirrors the wire form: unchanged and null both serialize as `null`.
impl<T> Serialize for OptionField<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            OptionField::SetToValue(value) => serializer.serialize_some(value),
            _ => serializer.serialize_none(),
        }
    }
}

// ---------------------- Validation support ----------------------

impl<T> ValidateLength<u64> for OptionField<T>
where
    T: ValidateLength<u64>
{
    fn length(&self) -> Option<u64> {
        match self {
            OptionField::SetToValue(value) => value.length(),
            _ => None,
        }
    }
    fn validate_length(&self, min: Option<u64>, max: Option<u64>, equal: Option<u64>) -> bool {
        match self {
            OptionField::SetToValue(value) => value.validate_length(min, max, equal),
            _ => true,
        }
    }
}

// ---------------------- Core helpers ----------------------

impl<T> OptionField<T> {
    pub fn value_ref(&self) -> Option<&T> {
        if let Self::SetToValue(v) = self {
            Some(v)
        } else {
            None
        }
    }
}

impl<T> From<Option<Option<T>>> for OptionField<T> {
    fn from(opt: Option<Option<T>>) -> Self {
        match opt {
            None => OptionField::Unchanged,
            Some(None) => OptionField::SetToNull,
            Some(Some(v)) => OptionField::SetToValue(v),
        }
    }
}

pub type PatchString = OptionField<String>;

// ---------------------- List & date inputs ----------------------

/// Lists are never null: an absent key or `null` both become `[]`.
/// Pair with `#[serde(default)]`.
pub fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN).and_utc())
        })
}

pub fn datetime<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_datetime(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid date `{}`, expected ISO 8601", raw)))
}

pub fn optional_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) => parse_datetime(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date `{}`, expected ISO 8601", raw))),
    }
}

// ---------------------- Shared validators ----------------------

pub(crate) fn new_validation_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

const MAX_LIST_ITEMS: usize = 50;
const MAX_LIST_ITEM_LENGTH: usize = 500;

/// Bounded list of non-blank strings.
pub fn validate_text_list(items: &[String]) -> Result<(), ValidationError> {
    if items.len() > MAX_LIST_ITEMS {
        return Err(new_validation_error("list_too_long", "Too many items (max 50)"));
    }
    if items.iter().any(|item| item.trim().is_empty()) {
        return Err(new_validation_error("list_blank_item", "List items cannot be blank"));
    }
    if items.iter().any(|item| item.chars().count() > MAX_LIST_ITEM_LENGTH) {
        return Err(new_validation_error("list_item_too_long", "List items cannot exceed 500 characters"));
    }
    Ok(())
}

pub fn validate_text_list_patch(items: &OptionField<Vec<String>>) -> Result<(), ValidationError> {
    match items {
        OptionField::SetToValue(items) => validate_text_list(items),
        _ => Ok(()),
    }
}

pub fn validate_url_patch(url: &PatchString) -> Result<(), ValidationError> {
    match url {
        OptionField::SetToValue(value) => validate_url(value),
        _ => Ok(()),
    }
}

pub fn validate_url(value: &str) -> Result<(), ValidationError> {
    match url::Url::parse(value) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        _ => Err(new_validation_error("url", "Please provide a valid URL")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, Default)]
    #[serde(default)]
    struct Patch {
        website: OptionField<String>,
        #[serde(deserialize_with = "list")]
        tags: Vec<String>,
        #[serde(deserialize_with = "optional_datetime")]
        deadline: Option<DateTime<Utc>>,
    }

    #[test]
    fn absent_null_and_value_are_distinguished() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        let null: Patch = serde_json::from_str(r#"{"website": null}"#).unwrap();
        let value: Patch = serde_json::from_str(r#"{"website": "https://a.io"}"#).unwrap();

        assert_eq!(absent.website, OptionField::Unchanged);
        assert_eq!(null.website, OptionField::SetToNull);
        assert_eq!(value.website, OptionField::SetToValue("https://a.io".to_string()));
    }

    #[test]
    fn lists_are_never_null() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        let null: Patch = serde_json::from_str(r#"{"tags": null}"#).unwrap();
        let ordered: Patch = serde_json::from_str(r#"{"tags": ["Go", "SQL"]}"#).unwrap();

        assert!(absent.tags.is_empty());
        assert!(null.tags.is_empty());
        assert_eq!(ordered.tags, vec!["Go".to_string(), "SQL".to_string()]);
    }

    #[test]
    fn plain_dates_are_midnight_utc() {
        let patch: Patch = serde_json::from_str(r#"{"deadline": "2025-03-01"}"#).unwrap();
        assert_eq!(
            patch.deadline.map(|d| d.to_rfc3339()),
            Some("2025-03-01T00:00:00+00:00".to_string())
        );
        assert!(serde_json::from_str::<Patch>(r#"{"deadline": "next week"}"#).is_err());
    }

    #[test]
    fn set_values_serialize_as_plain_values() {
        let value: OptionField<String> = OptionField::SetToValue("Acme".into());
        assert_eq!(serde_json::to_value(&value).unwrap(), serde_json::json!("Acme"));
        assert!(serde_json::to_value(OptionField::<String>::SetToNull).unwrap().is_null());
        assert!(serde_json::to_value(OptionField::<String>::Unchanged).unwrap().is_null());
    }

    #[test]
    fn list_validation_rejects_blank_items() {
        assert!(validate_text_list(&["Rust".into()]).is_ok());
        assert!(validate_text_list(&["  ".into()]).is_err());
    }
}
