use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Document metadata written to the output's information dictionary / core properties.
///
/// The pipeline never reads the clock; a missing `creation_date` is simply omitted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub author: Option<String>,
    pub creator: Option<String>,
    /// BCP 47 language tag, e.g. `en-GB`.
    pub language: Option<String>,
    pub creation_date: Option<NaiveDateTime>,
    pub creation_place: Option<String>,
}

impl DocumentInfo {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// "Place, YYYY-MM-DD" when both are known.
    pub fn place_and_date(&self) -> Option<String> {
        match (&self.creation_place, &self.creation_date) {
            (Some(place), Some(date)) => Some(format!("{}, {}", place, date.format("%Y-%m-%d"))),
            (Some(place), None) => Some(place.clone()),
            (None, Some(date)) => Some(date.format("%Y-%m-%d").to_string()),
            (None, None) => None,
        }
    }
}
