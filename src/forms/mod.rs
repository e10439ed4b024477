//! Form definitions backing the portal routes.
//!
//! The same structs are deserialized from JSON bodies of the REST API and
//! from urlencoded bodies of the HTML shell.

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};
use thiserror::Error;
use validator::ValidationErrors;

pub mod auth;
pub mod client;
pub mod consumption;
pub mod document;
pub mod training;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("invalid email address")]
    InvalidEmail,

    #[error("invalid name")]
    InvalidName,

    #[error("invalid phone number")]
    InvalidPhoneNumber,

    #[error("invalid client id")]
    InvalidClientId,

    #[error("a folder must be selected")]
    MissingFolder,

    #[error("invalid folder id")]
    InvalidFolderId,

    #[error("invalid date `{0}`")]
    InvalidDate(String),

    #[error("invalid {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("file is required")]
    MissingFile,

    #[error("csv error: {0}")]
    Csv(String),
}

impl FormError {
    pub(crate) fn invalid(field: &'static str, reason: impl Display) -> Self {
        FormError::InvalidValue {
            field,
            reason: reason.to_string(),
        }
    }
}

/// Trims `value` and turns blank strings into `None`.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText<T> {
    Number(T),
    Text(String),
}

/// Accepts a number, a numeric string, an empty string or `null`.
///
/// Browser forms submit untouched numeric inputs as `""`.
pub(crate) fn optional_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: Display,
{
    match Option::<NumberOrText<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(value)) => Ok(Some(value)),
        Some(NumberOrText::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                Ok(None)
            } else {
                text.replace(',', ".")
                    .parse()
                    .map(Some)
                    .map_err(serde::de::Error::custom)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Amount {
        #[serde(default, deserialize_with = "optional_number")]
        value: Option<f64>,
    }

    #[test]
    fn optional_number_accepts_json_numbers_strings_and_blanks() {
        let amount: Amount = serde_json::from_str(r#"{"value": 12.5}"#).unwrap();
        assert_eq!(amount.value, Some(12.5));

        let amount: Amount = serde_json::from_str(r#"{"value": "7,25"}"#).unwrap();
        assert_eq!(amount.value, Some(7.25));

        let amount: Amount = serde_json::from_str(r#"{"value": ""}"#).unwrap();
        assert_eq!(amount.value, None);

        let amount: Amount = serde_json::from_str(r#"{"value": null}"#).unwrap();
        assert_eq!(amount.value, None);

        let amount: Amount = serde_json::from_str("{}").unwrap();
        assert_eq!(amount.value, None);

        assert!(serde_json::from_str::<Amount>(r#"{"value": "abc"}"#).is_err());
    }

    #[test]
    fn optional_number_reads_urlencoded_values() {
        let amount: Amount = serde_html_form::from_str("value=3").unwrap();
        assert_eq!(amount.value, Some(3.0));

        let amount: Amount = serde_html_form::from_str("value=").unwrap();
        assert_eq!(amount.value, None);
    }
}
