//! Type mapping between driver representations and the bridge's canonical forms.
//!
//! Fetched temporal columns are rendered as text so the precision the driver reported is kept
//! exactly: `YYYY-MM-DD`, `HH:MM:SS[.ffffff]` and `YYYY-MM-DD HH:MM:SS[.ffffff]`. The fraction
//! is always six digits when present and omitted when the sub-second part is zero.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use lazy_static::lazy_static;
use regex::Regex;

use crate::types::SqlType;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

lazy_static! {
    static ref DECLARED_TYPE: Regex = Regex::new(
        r"^\s*([A-Za-z_][A-Za-z0-9_ ]*?)\s*(?:\(\s*(\d+)\s*(?:,\s*(\d+)\s*)?\))?\s*$"
    )
    .expect("declared type pattern is valid");
}

fn fraction(nanos: u32) -> String {
    let micros = nanos / 1_000;
    if micros == 0 {
        String::new()
    } else {
        format!(".{micros:06}")
    }
}

#[must_use]
pub fn format_date(d: &NaiveDate) -> String {
    d.format(DATE_FORMAT).to_string()
}

#[must_use]
pub fn format_time(t: &NaiveTime) -> String {
    // Leap-second nanos (>= 1e9) collapse into the last representable microsecond.
    let nanos = t.nanosecond().min(999_999_999);
    format!("{}{}", t.format(TIME_FORMAT), fraction(nanos))
}

#[must_use]
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    let nanos = ts.nanosecond().min(999_999_999);
    format!("{}{}", ts.format(TIMESTAMP_FORMAT), fraction(nanos))
}

/// Parse a timestamp in canonical (or ISO `T`-separated) form. Date-only text is midnight.
#[must_use]
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .or_else(|| parse_date(s).and_then(|d| d.and_hms_opt(0, 0, 0)))
}

#[must_use]
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

#[must_use]
pub fn parse_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M:%S%.f").ok()
}

/// A column type as declared in DDL, e.g. `DECIMAL(10,2)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredType {
    pub base: String,
    pub size: Option<u32>,
    pub scale: Option<u32>,
}

impl DeclaredType {
    /// Split a declared type into its base name and optional size/scale.
    /// Unrecognized shapes keep the whole text as the base name.
    #[must_use]
    pub fn parse(decl: &str) -> Self {
        match DECLARED_TYPE.captures(decl) {
            Some(caps) => DeclaredType {
                base: caps[1].to_ascii_uppercase(),
                size: caps.get(2).and_then(|m| m.as_str().parse().ok()),
                scale: caps.get(3).and_then(|m| m.as_str().parse().ok()),
            },
            None => DeclaredType {
                base: decl.trim().to_ascii_uppercase(),
                size: None,
                scale: None,
            },
        }
    }

    /// Classify by name first (temporal, boolean, json), then by `SQLite` affinity rules.
    #[must_use]
    pub fn sql_type(&self) -> SqlType {
        let base = self.base.as_str();
        match base {
            "" => return SqlType::Other,
            "DATE" => return SqlType::Date,
            "TIME" => return SqlType::Time,
            "DATETIME" | "TIMESTAMP" => return SqlType::Timestamp,
            "BOOL" | "BOOLEAN" | "BIT" => return SqlType::Boolean,
            "JSON" | "JSONB" => return SqlType::Json,
            _ => {}
        }
        if base.starts_with("TIMESTAMP") {
            SqlType::Timestamp
        } else if base.contains("INT") {
            SqlType::Integer
        } else if base.contains("CHAR") || base.contains("CLOB") || base.contains("TEXT") {
            SqlType::Varchar
        } else if base.contains("BLOB") || base.contains("BINARY") || base == "BYTEA" {
            SqlType::Binary
        } else if base.contains("REAL") || base.contains("FLOA") || base.contains("DOUB") {
            SqlType::Double
        } else {
            SqlType::Numeric
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_fraction_is_six_digits_or_absent() {
        let ts = NaiveDate::from_ymd_opt(2009, 9, 11)
            .unwrap()
            .and_hms_micro_opt(14, 15, 22, 123_450)
            .unwrap();
        assert_eq!(format_timestamp(&ts), "2009-09-11 14:15:22.123450");

        let whole = NaiveDate::from_ymd_opt(2010, 1, 26)
            .unwrap()
            .and_hms_opt(14, 31, 59)
            .unwrap();
        assert_eq!(format_timestamp(&whole), "2010-01-26 14:31:59");
    }

    #[test]
    fn canonical_text_parses_back() {
        let parsed = parse_timestamp("2009-09-10 14:15:22.123456").unwrap();
        assert_eq!(format_timestamp(&parsed), "2009-09-10 14:15:22.123456");
        assert_eq!(
            parse_timestamp("2008-02-27").map(|ts| format_timestamp(&ts)),
            Some("2008-02-27 00:00:00".to_string())
        );
        assert_eq!(
            parse_time("08:30:00").map(|t| format_time(&t)),
            Some("08:30:00".to_string())
        );
        assert!(parse_date("27/02/2008").is_none());
    }

    #[test]
    fn declared_types_follow_affinity_rules() {
        let decimal = DeclaredType::parse("decimal(10, 2)");
        assert_eq!(decimal.base, "DECIMAL");
        assert_eq!(decimal.size, Some(10));
        assert_eq!(decimal.scale, Some(2));
        assert_eq!(decimal.sql_type(), SqlType::Numeric);

        assert_eq!(DeclaredType::parse("VARCHAR(50)").sql_type(), SqlType::Varchar);
        assert_eq!(DeclaredType::parse("BIGINT").sql_type(), SqlType::Integer);
        assert_eq!(DeclaredType::parse("DOUBLE PRECISION").sql_type(), SqlType::Double);
        assert_eq!(DeclaredType::parse("TIMESTAMP").sql_type(), SqlType::Timestamp);
        assert_eq!(DeclaredType::parse("DATE").sql_type(), SqlType::Date);
        assert_eq!(DeclaredType::parse("BLOB").sql_type(), SqlType::Binary);
        assert_eq!(DeclaredType::parse("BOOLEAN").sql_type(), SqlType::Boolean);
        assert_eq!(DeclaredType::parse("").sql_type(), SqlType::Other);
    }
}
