//! Source record models
//!
//! One shape per feed. Only the fields the reconciliation rules look at are
//! kept; everything else in the payloads (categories, colours, genre, image
//! paths, ...) is ignored on deserialization.

use serde::{Deserialize, Deserializer, Serialize};

use crate::time::LocalTime;

/// Event from the website's calendar feed
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct WebsiteEvent {
    pub start: LocalTime,
    pub end: LocalTime,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    /// Show page link; `#` when the editor did not set one
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
}

/// Show from the automation system's live-info feed
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AutomationShow {
    #[serde(rename = "starts")]
    pub start: LocalTime,
    #[serde(rename = "ends")]
    pub end: LocalTime,
    /// May arrive HTML-entity encoded; decoded when merged into the grid
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
}

/// Show block of the live-info payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct AutomationShows {
    /// Show on air right now, if any
    #[serde(default)]
    pub current: Option<AutomationShow>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub next: Vec<AutomationShow>,
}

/// Top level live-info payload (`/api/live-info-v2`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct AutomationSchedule {
    #[serde(default)]
    pub shows: AutomationShows,
}

impl AutomationSchedule {
    /// Flatten into one list: upcoming shows followed by the current show.
    pub fn into_shows(self) -> Vec<AutomationShow> {
        let AutomationShows { current, mut next } = self.shows;
        next.extend(current);
        next
    }
}

/// Treat an explicit JSON `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
