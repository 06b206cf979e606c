//! Local-time values shared by both schedule sources
//!
//! Neither feed carries a zone designator, so every timestamp is read as
//! wall-clock time in the offset the process is running with.

use std::fmt;

use chrono::{DateTime, FixedOffset, Local};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TimeParseError;

/// Canonical pattern after normalization, also used for grid keys
const CANONICAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Human readable format used in messages and on the dashboard
const DISPLAY_FORMAT: &str = "%d %b %Y %H:%M:%S";

const TIME_OF_DAY_FORMAT: &str = "%H:%M:%S";

/// Get the current local UTC offset of the process
pub fn local_offset() -> FixedOffset {
    *Local::now().offset()
}

/// Get the current instant in the local offset
pub fn now() -> LocalTime {
    LocalTime(Local::now().fixed_offset())
}

/// Absolute instant carrying a fixed UTC offset.
///
/// Equality, hashing and ordering are by instant, so two values parsed from
/// different textual forms of the same moment compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LocalTime(DateTime<FixedOffset>);

impl LocalTime {
    /// Parse a feed timestamp (`YYYY-MM-DD HH:MM[:SS]`) in the process's
    /// current local offset.
    pub fn parse(raw: &str) -> Result<Self, TimeParseError> {
        Self::parse_with_offset(raw, local_offset())
    }

    /// Parse a feed timestamp, attaching the given offset.
    ///
    /// Surrounding quotes are stripped, the date/time separator is replaced
    /// with `T` and missing seconds default to `:00`.
    ///
    /// # Examples
    /// ```
    /// use chrono::FixedOffset;
    /// use raster_common::time::LocalTime;
    ///
    /// let cet = FixedOffset::east_opt(3600).unwrap();
    /// let t = LocalTime::parse_with_offset("2024-01-02 08:00", cet).unwrap();
    /// assert_eq!(t.key(), "2024-01-02T08:00:00+0100");
    /// ```
    pub fn parse_with_offset(raw: &str, offset: FixedOffset) -> Result<Self, TimeParseError> {
        let trimmed = raw.trim().trim_matches('"');
        let invalid = || TimeParseError::new(raw);

        let date = trimmed.get(..10).ok_or_else(invalid)?;
        let time = trimmed.get(11..).ok_or_else(invalid)?;
        let time = if time.len() == 5 {
            format!("{time}:00")
        } else {
            time.to_string()
        };

        let canonical = format!("{date}T{time}{}", format_offset(offset));
        DateTime::parse_from_str(&canonical, CANONICAL_FORMAT)
            .map(LocalTime)
            .map_err(|_| invalid())
    }

    /// Wrap an existing instant
    pub fn from_datetime(dt: DateTime<FixedOffset>) -> Self {
        Self(dt)
    }

    /// Underlying instant
    pub fn instant(&self) -> DateTime<FixedOffset> {
        self.0
    }

    /// Normalized, locale independent key for the slot grid
    pub fn key(&self) -> String {
        self.0.format(CANONICAL_FORMAT).to_string()
    }

    /// Format as `02 Jan 2006 15:04:05`
    pub fn display(&self) -> String {
        self.0.format(DISPLAY_FORMAT).to_string()
    }

    /// Wall-clock time of day (`HH:MM:SS`)
    pub fn time_of_day(&self) -> String {
        self.0.format(TIME_OF_DAY_FORMAT).to_string()
    }

    /// Signed duration `self - earlier`
    pub fn since(&self, earlier: &LocalTime) -> chrono::Duration {
        self.0.signed_duration_since(earlier.0)
    }
}

impl fmt::Display for LocalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

impl From<DateTime<FixedOffset>> for LocalTime {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Self(dt)
    }
}

impl Serialize for LocalTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for LocalTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        LocalTime::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Render an offset as `+HHMM` / `-HHMM`
fn format_offset(offset: FixedOffset) -> String {
    let seconds = offset.local_minus_utc();
    let sign = if seconds < 0 { '-' } else { '+' };
    let minutes = seconds.abs() / 60;
    format!("{sign}{:02}{:02}", minutes / 60, minutes % 60)
}
