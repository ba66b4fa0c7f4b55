//! Entity trait - common interface for all identified records

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::core::identity::{EntityKind, Uid};

/// Common trait for all records stored with their own UID
pub trait Entity: Serialize + DeserializeOwned + Clone {
    /// The collection this record lives in
    const KIND: EntityKind;

    /// Get the record's unique ID
    fn uid(&self) -> &Uid;

    /// Name shown in listings and search hits
    fn name(&self) -> &str;

    /// Multilingual label, for kinds that have one
    fn label(&self) -> Option<&Multilingual> {
        None
    }

    /// Get the creation timestamp
    fn created_at(&self) -> DateTime<Utc>;

    /// Get the last update timestamp
    fn updated_at(&self) -> DateTime<Utc>;
}

/// Text in English with optional German and Spanish translations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Multilingual {
    pub en: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub de: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub es: Option<String>,
}

impl Multilingual {
    pub fn en(text: impl Into<String>) -> Self {
        Self {
            en: text.into(),
            de: None,
            es: None,
        }
    }

    /// Case-insensitive substring match on any translation.
    /// `needle` must already be lowercase.
    pub fn contains_lowercase(&self, needle: &str) -> bool {
        std::iter::once(Some(&self.en))
            .chain([self.de.as_ref(), self.es.as_ref()])
            .flatten()
            .any(|text| text.to_lowercase().contains(needle))
    }
}

impl std::fmt::Display for Multilingual {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.en)
    }
}

/// Current time as stored in `created_at` / `updated_at`
pub fn now() -> DateTime<Utc> {
    Utc::now()
}
