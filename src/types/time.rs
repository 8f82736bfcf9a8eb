//! Tolerant timestamp codec.
//!
//! Kite endpoints are not consistent about how they print instants. A
//! [`Timestamp`] accepts all four layouts seen in responses and CSV dumps:
//!
//! | layout | zone |
//! |---|---|
//! | `YYYY-MM-DD` | IST |
//! | `YYYY-MM-DD HH:MM:SS` | IST |
//! | `YYYY-MM-DDTHH:MM:SS±HHMM` | from the string |
//! | `YYYY-MM-DDTHH:MM:SS±HH:MM` | from the string |
//!
//! `""` and `"null"` decode to the zero instant rather than an error.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{KiteError, Result};

/// India Standard Time, UTC+05:30. Asia/Kolkata observes no DST.
pub const IST_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// The fixed IST offset.
pub fn ist() -> FixedOffset {
    FixedOffset::east_opt(IST_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

const DATE_LAYOUT: &str = "%Y-%m-%d";
const DATE_TIME_LAYOUT: &str = "%Y-%m-%d %H:%M:%S";
const ZONED_LAYOUT: &str = "%Y-%m-%dT%H:%M:%S%z";
const ZONED_COLON_LAYOUT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// An absolute instant, or the zero instant when the source field was empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(Option<DateTime<FixedOffset>>);

impl Timestamp {
    /// The zero instant.
    pub const ZERO: Timestamp = Timestamp(None);

    /// Wrap a concrete instant.
    pub fn new(dt: DateTime<FixedOffset>) -> Self {
        Self(Some(dt))
    }

    /// Instant from unix seconds, expressed in IST.
    pub fn from_unix(secs: i64) -> Self {
        Self(
            Utc.timestamp_opt(secs, 0)
                .single()
                .map(|dt| dt.with_timezone(&ist())),
        )
    }

    /// `true` for the zero instant.
    pub fn is_zero(&self) -> bool {
        self.0.is_none()
    }

    /// The wrapped instant, `None` for zero.
    pub fn as_datetime(&self) -> Option<&DateTime<FixedOffset>> {
        self.0.as_ref()
    }

    /// Unix seconds, `None` for zero.
    pub fn unix(&self) -> Option<i64> {
        self.0.map(|dt| dt.timestamp())
    }

    /// Decode a value as it appears in a JSON document.
    ///
    /// Surrounding whitespace and one layer of double quotes are stripped.
    /// Fails with a [`Data`](crate::error::ErrorKind::Data) error when no
    /// layout matches.
    pub fn parse(input: &str) -> Result<Self> {
        let s = input.trim();
        let s = s
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
            .unwrap_or(s);
        Self::parse_field(s.trim())
    }

    /// Decode a CSV field. Same as [`parse`](Self::parse) without the quote
    /// stripping step (the CSV reader has already unquoted the field).
    pub fn parse_csv(input: &str) -> Result<Self> {
        Self::parse_field(input.trim())
    }

    fn parse_field(s: &str) -> Result<Self> {
        if s.is_empty() || s == "null" {
            return Ok(Self::ZERO);
        }

        if let Ok(date) = NaiveDate::parse_from_str(s, DATE_LAYOUT) {
            if let Some(dt) = date.and_hms_opt(0, 0, 0) {
                if let Some(ts) = Self::in_ist(dt) {
                    return Ok(ts);
                }
            }
        }

        if let Ok(dt) = NaiveDateTime::parse_from_str(s, DATE_TIME_LAYOUT) {
            if let Some(ts) = Self::in_ist(dt) {
                return Ok(ts);
            }
        }

        for layout in [ZONED_LAYOUT, ZONED_COLON_LAYOUT] {
            if let Ok(dt) = DateTime::parse_from_str(s, layout) {
                return Ok(Self::new(dt));
            }
        }

        Err(KiteError::data(format!("unknown time format: {s:?}")))
    }

    fn in_ist(naive: NaiveDateTime) -> Option<Self> {
        ist().from_local_datetime(&naive).single().map(Self::new)
    }

    /// Lenient decode used by the serde and CSV paths: malformed input is
    /// logged and yields the zero instant.
    pub(crate) fn parse_lenient(input: &str, csv: bool) -> Self {
        let parsed = if csv {
            Self::parse_csv(input)
        } else {
            Self::parse(input)
        };
        parsed.unwrap_or_else(|e| {
            tracing::debug!(error = %e, "falling back to zero timestamp");
            Self::ZERO
        })
    }
}

impl From<DateTime<FixedOffset>> for Timestamp {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Self::new(dt)
    }
}

impl FromStr for Timestamp {
    type Err = KiteError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(dt) => write!(f, "{}", dt.format(ZONED_LAYOUT)),
            None => Ok(()),
        }
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw
            .map(|s| Self::parse_lenient(&s, false))
            .unwrap_or_default())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.0 {
            Some(_) => serializer.collect_str(self),
            None => serializer.serialize_none(),
        }
    }
}

/// Serde adapter for CSV columns: `#[serde(deserialize_with = "csv_timestamp")]`.
pub(crate) fn csv_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Timestamp, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Ok(Timestamp::parse_lenient(&raw, true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Sample {
        date: Timestamp,
    }

    fn offset(ts: &Timestamp) -> i32 {
        ts.as_datetime().map(|dt| dt.offset().local_minus_utc()).unwrap_or_default()
    }

    #[test]
    fn every_layout_decodes_to_a_non_zero_instant() {
        for input in [
            "2006-01-02",
            "2006-01-02 15:04:05",
            "2006-01-02T15:04:05-0700",
            "2006-01-02T15:04:05+05:30",
        ] {
            let ts = Timestamp::parse(input).unwrap();
            assert!(!ts.is_zero(), "{input}");
        }
    }

    #[test]
    fn zoneless_layouts_resolve_to_ist() {
        let day = Timestamp::parse("2020-01-02").unwrap();
        assert_eq!(offset(&day), IST_OFFSET_SECS);
        assert_eq!(day.to_string(), "2020-01-02T00:00:00+0530");

        let dt = Timestamp::parse("2020-01-02 09:15:00").unwrap();
        assert_eq!(offset(&dt), IST_OFFSET_SECS);
        assert_eq!(dt.unix(), Some(1_577_936_700));
    }

    #[test]
    fn zoned_layouts_keep_their_offset() {
        let ts = Timestamp::parse("2006-01-02T15:04:05-0700").unwrap();
        assert_eq!(offset(&ts), -7 * 3600);

        let ts = Timestamp::parse("2006-01-02T15:04:05+05:30").unwrap();
        assert_eq!(offset(&ts), IST_OFFSET_SECS);
    }

    #[test]
    fn sentinels_are_zero() {
        assert!(Timestamp::parse("").unwrap().is_zero());
        assert!(Timestamp::parse("null").unwrap().is_zero());
        assert!(Timestamp::parse("\"null\"").unwrap().is_zero());
        assert!(Timestamp::parse("  \"\"  ").unwrap().is_zero());
    }

    #[test]
    fn strict_parse_reports_a_data_error() {
        let err = Timestamp::parse("2006-01-02:").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Data);
        assert!(err.message().contains("2006-01-02:"));
    }

    #[test]
    fn json_fields_fall_back_to_zero() {
        let cases = [
            (r#"{"date":"2006-01-02"}"#, false),
            (r#"{"date":"2006-01-02 15:04:05"}"#, false),
            (r#"{"date":"2006-01-02T15:04:05-0700"}"#, false),
            (r#"{"date":"2006-01-02T"}"#, true),
            (r#"{"date":"2006-01-02:"}"#, true),
            (r#"{"date":null}"#, true),
            (r#"{"date":""}"#, true),
        ];
        for (input, zero) in cases {
            let s: Sample = serde_json::from_str(input).unwrap();
            assert_eq!(s.date.is_zero(), zero, "{input}");
        }
    }

    #[test]
    fn csv_fields_use_the_same_layouts() {
        assert!(!Timestamp::parse_csv(" 2006-01-02 ").unwrap().is_zero());
        assert!(Timestamp::parse_lenient("2006-01-02:", true).is_zero());
        // quotes are not stripped on the CSV path
        assert!(Timestamp::parse_csv("\"2006-01-02\"").is_err());
    }

    #[test]
    fn unix_seconds_are_presented_in_ist() {
        let ts = Timestamp::from_unix(1_625_461_887);
        assert_eq!(ts.unix(), Some(1_625_461_887));
        assert_eq!(offset(&ts), IST_OFFSET_SECS);
    }
}
