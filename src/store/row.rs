use serde::{Deserialize, Deserializer};

use crate::pipeline::email_domain;

/// A row read back from the store. Flags are parsed leniently so stores
/// written with `True`/`False` spellings are still understood; anything else
/// reads as `None`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StoredRow {
    pub email: String,
    #[serde(default, deserialize_with = "flag")]
    pub is_valid: Option<bool>,
    #[serde(default, deserialize_with = "flag")]
    pub has_mx_record: Option<bool>,
    #[serde(default, deserialize_with = "flag")]
    pub is_disposable: Option<bool>,
    #[serde(default, deserialize_with = "flag")]
    pub is_catchall: Option<bool>,
    #[serde(default, deserialize_with = "flag")]
    pub is_deliverable: Option<bool>,
    #[serde(default, deserialize_with = "score")]
    pub quality_score: Option<f64>,
}

impl StoredRow {
    pub fn domain(&self) -> Option<&str> {
        email_domain(&self.email)
    }
}

fn flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let value = raw.trim();
    Ok(if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    })
}

fn score<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw.trim().parse::<f64>().ok())
}
