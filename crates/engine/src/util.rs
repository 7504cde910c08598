//! Internal helpers for decoding and normalizing stored records.
//!
//! These utilities are **not** part of the public API. They keep the lenient
//! decoding rules for historical rows in one place.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use unicode_normalization::UnicodeNormalization;

use crate::SplitDetails;

/// Parse a stored date.
///
/// Accepts RFC 3339 timestamps, naive timestamps (taken as UTC) and bare
/// calendar dates (midnight UTC).
pub(crate) fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(parsed.and_utc());
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub(crate) fn deserialize_date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw}")))
}

/// Decode a split blob, falling back to [`SplitDetails::Unrecognized`] for
/// missing, null or undecodable values instead of failing the whole record.
pub(crate) fn deserialize_split<'de, D>(deserializer: D) -> Result<SplitDetails, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let Some(value) = value else {
        return Ok(SplitDetails::Unrecognized);
    };
    match serde_json::from_value(value) {
        Ok(split) => Ok(split),
        Err(err) => {
            tracing::debug!("undecodable split details: {err}");
            Ok(SplitDetails::Unrecognized)
        }
    }
}

/// Trim, collapse inner whitespace and NFC-compose a label. Blank labels
/// become `None`.
pub(crate) fn normalize_label(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        return None;
    }
    let mut out = String::new();
    for token in trimmed.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.extend(token.nfc());
    }
    Some(out)
}
