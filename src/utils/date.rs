//! UTC datetime utilities without timezone dependencies.
//!
//! Provides a lightweight `DateTimeUtc` struct for the timestamps stored on
//! collection entries (filesystem times, git commit times).
//!
//! # Features
//!
//! - Conversion from unix milliseconds and `SystemTime`
//! - ISO 8601 formatting with milliseconds, matching what JavaScript's
//!   `Date#toISOString` produces, so the generated `new Date("...")` literals
//!   are stable
//! - Parsing back from the same formats (manifest loading)
//! - Leap year handling
//!
//! # Examples
//!
//! ```ignore
//! let dt = DateTimeUtc::from_unix_millis(1_718_461_845_123);
//! assert_eq!(dt.to_iso_string(), "2024-06-15T14:30:45.123Z");
//! assert_eq!(DateTimeUtc::parse("2024-06-15T14:30:45.123Z"), Some(dt));
//! ```

use anyhow::{Result, bail};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// UTC datetime without timezone complexity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateTimeUtc {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub millis: u16,
}

impl DateTimeUtc {
    pub const fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            millis: 0,
        }
    }

    pub const fn from_ymd(year: u16, month: u8, day: u8) -> Self {
        Self::new(year, month, day, 0, 0, 0)
    }

    pub const fn with_millis(mut self, millis: u16) -> Self {
        self.millis = millis;
        self
    }

    /// The unix epoch, used when a platform cannot report a timestamp.
    pub const fn epoch() -> Self {
        Self::from_ymd(1970, 1, 1)
    }

    /// Convert milliseconds since the unix epoch.
    ///
    /// Years outside `0..=9999` saturate, ISO strings stay four-digit.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_unix_millis(ms: i64) -> Self {
        let days = ms.div_euclid(MILLIS_PER_DAY);
        let rem = ms.rem_euclid(MILLIS_PER_DAY);

        let (year, month, day) = civil_from_days(days);
        if year < 0 {
            return Self::from_ymd(0, 1, 1);
        }
        if year > 9999 {
            return Self::new(9999, 12, 31, 23, 59, 59).with_millis(999);
        }

        Self {
            year: year as u16,
            month,
            day,
            hour: (rem / 3_600_000) as u8,
            minute: (rem / 60_000 % 60) as u8,
            second: (rem / 1000 % 60) as u8,
            millis: (rem % 1000) as u16,
        }
    }

    /// Convert seconds since the unix epoch (git commit times).
    pub fn from_unix_seconds(secs: i64) -> Self {
        Self::from_unix_millis(secs.saturating_mul(1000))
    }

    /// Convert a filesystem timestamp.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn from_system_time(time: SystemTime) -> Self {
        match time.duration_since(UNIX_EPOCH) {
            Ok(d) => Self::from_unix_millis(d.as_millis() as i64),
            Err(e) => Self::from_unix_millis(-(e.duration().as_millis() as i64)),
        }
    }

    /// Milliseconds since the unix epoch.
    pub fn to_unix_millis(self) -> i64 {
        let days = days_from_civil(i64::from(self.year), self.month, self.day);
        days * MILLIS_PER_DAY
            + i64::from(self.hour) * 3_600_000
            + i64::from(self.minute) * 60_000
            + i64::from(self.second) * 1000
            + i64::from(self.millis)
    }

    /// Parse from "YYYY-MM-DD", "YYYY-MM-DDTHH:MM:SSZ" or
    /// "YYYY-MM-DDTHH:MM:SS.sssZ"
    pub fn parse(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();

        // Minimum: "YYYY-MM-DD" (10 chars)
        if bytes.len() < 10 {
            return None;
        }

        let year = parse_u16(&bytes[0..4])?;
        if bytes[4] != b'-' {
            return None;
        }
        let month = parse_u8(&bytes[5..7])?;
        if bytes[7] != b'-' {
            return None;
        }
        let day = parse_u8(&bytes[8..10])?;

        let dt = match bytes.len() {
            10 => Self::from_ymd(year, month, day),
            20 | 24 => {
                if bytes[10] != b'T' || bytes[13] != b':' || bytes[16] != b':' {
                    return None;
                }
                if bytes[bytes.len() - 1] != b'Z' {
                    return None;
                }
                let millis = if bytes.len() == 24 {
                    if bytes[19] != b'.' {
                        return None;
                    }
                    parse_u16_digits(&bytes[20..23])?
                } else {
                    0
                };
                Self::new(
                    year,
                    month,
                    day,
                    parse_u8(&bytes[11..13])?,
                    parse_u8(&bytes[14..16])?,
                    parse_u8(&bytes[17..19])?,
                )
                .with_millis(millis)
            }
            _ => return None,
        };

        dt.validate().ok()?;
        Some(dt)
    }

    #[allow(clippy::trivially_copy_pass_by_ref)] // Method style is more idiomatic
    pub fn validate(&self) -> Result<()> {
        let Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            millis,
        } = *self;

        if !(1..=12).contains(&month) {
            bail!("month is invalid: {month}");
        }

        let max_days = Self::days_in_month(year, month);
        if day == 0 || day > max_days {
            bail!("day is invalid: {day}");
        }
        if hour > 23 {
            bail!("hour is invalid: {hour}");
        }
        if minute > 59 {
            bail!("minute is invalid: {minute}");
        }
        if second > 59 {
            bail!("second is invalid: {second}");
        }
        if millis > 999 {
            bail!("millisecond is invalid: {millis}");
        }

        Ok(())
    }

    #[inline]
    #[allow(clippy::manual_is_multiple_of)] // Manual impl for const fn
    const fn is_leap_year(year: u16) -> bool {
        year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
    }

    #[inline]
    const fn days_in_month(year: u16, month: u8) -> u8 {
        match month {
            1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
            4 | 6 | 9 | 11 => 30,
            2 if Self::is_leap_year(year) => 29,
            2 => 28,
            _ => 0,
        }
    }

    /// Format as ISO 8601 with milliseconds.
    ///
    /// Returns: `YYYY-MM-DDTHH:MM:SS.sssZ`
    pub fn to_iso_string(self) -> String {
        format!(
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}Z",
            self.year, self.month, self.day, self.hour, self.minute, self.second, self.millis
        )
    }
}

impl fmt::Display for DateTimeUtc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso_string())
    }
}

impl Serialize for DateTimeUtc {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_iso_string())
    }
}

impl<'de> Deserialize<'de> for DateTimeUtc {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp `{raw}`")))
    }
}

/// Days since 1970-01-01 → (year, month, day), proleptic Gregorian.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn civil_from_days(days: i64) -> (i64, u8, u8) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let month = if mp < 10 { mp + 3 } else { mp - 9 } as u8;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

/// (year, month, day) → days since 1970-01-01.
fn days_from_civil(year: i64, month: u8, day: u8) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = y.div_euclid(400);
    let yoe = y.rem_euclid(400);
    let m = i64::from(month);
    let mp = if m > 2 { m - 3 } else { m + 9 };
    let doy = (153 * mp + 2) / 5 + i64::from(day) - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// Parse 2-digit ASCII number
#[inline]
fn parse_u8(bytes: &[u8]) -> Option<u8> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = bytes[0].wrapping_sub(b'0');
    let d2 = bytes[1].wrapping_sub(b'0');
    if d1 > 9 || d2 > 9 {
        return None;
    }
    Some(d1 * 10 + d2)
}

/// Parse 4-digit ASCII number
#[inline]
fn parse_u16(bytes: &[u8]) -> Option<u16> {
    if bytes.len() != 4 {
        return None;
    }
    parse_u16_digits(bytes)
}

#[inline]
fn parse_u16_digits(bytes: &[u8]) -> Option<u16> {
    let mut result = 0u16;
    for &b in bytes {
        let d = b.wrapping_sub(b'0');
        if d > 9 {
            return None;
        }
        result = result * 10 + u16::from(d);
    }
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_unix_millis_epoch() {
        let dt = DateTimeUtc::from_unix_millis(0);
        assert_eq!(dt, DateTimeUtc::epoch());
        assert_eq!(dt.to_iso_string(), "1970-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_from_unix_millis_known_instant() {
        // 2024-06-15T14:30:45.123Z
        let dt = DateTimeUtc::from_unix_millis(1_718_461_845_123);
        assert_eq!(dt, DateTimeUtc::new(2024, 6, 15, 14, 30, 45).with_millis(123));
        assert_eq!(dt.to_iso_string(), "2024-06-15T14:30:45.123Z");
    }

    #[test]
    fn test_from_unix_seconds_leap_day() {
        // 2024-02-29T00:00:00Z
        let dt = DateTimeUtc::from_unix_seconds(1_709_164_800);
        assert_eq!(dt, DateTimeUtc::from_ymd(2024, 2, 29));
    }

    #[test]
    fn test_unix_millis_roundtrip() {
        for ms in [0, 86_399_999, 951_782_400_000, 1_718_461_845_123, 4_102_444_800_000] {
            assert_eq!(DateTimeUtc::from_unix_millis(ms).to_unix_millis(), ms);
        }
    }

    #[test]
    fn test_before_epoch() {
        let dt = DateTimeUtc::from_unix_millis(-1);
        assert_eq!(dt.to_iso_string(), "1969-12-31T23:59:59.999Z");
    }

    #[test]
    fn test_parse_formats() {
        assert_eq!(
            DateTimeUtc::parse("2024-06-15"),
            Some(DateTimeUtc::from_ymd(2024, 6, 15))
        );
        assert_eq!(
            DateTimeUtc::parse("2024-06-15T14:30:45Z"),
            Some(DateTimeUtc::new(2024, 6, 15, 14, 30, 45))
        );
        assert_eq!(
            DateTimeUtc::parse("2024-06-15T14:30:45.007Z"),
            Some(DateTimeUtc::new(2024, 6, 15, 14, 30, 45).with_millis(7))
        );
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(DateTimeUtc::parse("2024-06"), None);
        assert_eq!(DateTimeUtc::parse("2024-13-01"), None);
        assert_eq!(DateTimeUtc::parse("2024-06-15 14:30:45Z"), None);
        assert_eq!(DateTimeUtc::parse("2024-06-15T14:30:45.12Z"), None);
        assert_eq!(DateTimeUtc::parse("2023-02-29"), None);
    }

    #[test]
    fn test_validate_leap_year() {
        // Leap year - Feb 29 is valid
        assert!(DateTimeUtc::new(2024, 2, 29, 12, 0, 0).validate().is_ok());
        assert!(DateTimeUtc::new(2000, 2, 29, 12, 0, 0).validate().is_ok()); // divisible by 400

        // Non-leap year - Feb 29 is invalid
        assert!(DateTimeUtc::new(2023, 2, 29, 12, 0, 0).validate().is_err());
        assert!(DateTimeUtc::new(1900, 2, 29, 12, 0, 0).validate().is_err()); // divisible by 100 but not 400
    }

    #[test]
    fn test_validate_invalid_time() {
        assert!(DateTimeUtc::new(2024, 6, 15, 24, 0, 0).validate().is_err());
        assert!(DateTimeUtc::new(2024, 6, 15, 12, 60, 0).validate().is_err());
        assert!(DateTimeUtc::new(2024, 6, 15, 12, 30, 60).validate().is_err());
    }

    #[test]
    fn test_serde_as_iso_string() {
        let dt = DateTimeUtc::new(2024, 1, 2, 3, 4, 5).with_millis(60);
        let json = serde_json::to_string(&dt).unwrap();
        assert_eq!(json, "\"2024-01-02T03:04:05.060Z\"");
        let back: DateTimeUtc = serde_json::from_str(&json).unwrap();
        assert_eq!(back, dt);
    }

    #[test]
    fn test_ordering_follows_time() {
        let a = DateTimeUtc::from_unix_millis(1_000);
        let b = DateTimeUtc::from_unix_millis(2_000);
        assert!(a < b);
    }
}
