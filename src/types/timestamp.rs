// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt::Display;
use std::fmt::Formatter;

use chrono::DateTime;
use chrono::Duration;
use chrono::Local;
use chrono::NaiveDate;
use chrono::NaiveTime;
use chrono::SecondsFormat;
use chrono::TimeZone;
use chrono::Utc;
use rusqlite::ToSql;
use rusqlite::types::FromSql;
use rusqlite::types::FromSqlError;
use rusqlite::types::FromSqlResult;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;

use crate::error::ErrorReport;
use crate::error::Fallible;

/// An instant in time, with millisecond precision.
///
/// Timestamps are truncated to whole milliseconds on construction so that
/// they survive a round trip through the RFC 3339 representation used in
/// exports and in the store.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self::truncate(Utc::now())
    }

    pub fn new(ts: DateTime<Utc>) -> Self {
        Self::truncate(ts)
    }

    pub fn from_millis(millis: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(millis).map(Self)
    }

    pub fn parse(s: &str) -> Fallible<Self> {
        let ts = DateTime::parse_from_rfc3339(s.trim())
            .map_err(|_| ErrorReport::validation(format!("invalid timestamp: {s:?}")))?;
        Ok(Self::truncate(ts.with_timezone(&Utc)))
    }

    pub fn millis(self) -> i64 {
        self.0.timestamp_millis()
    }

    pub fn into_inner(self) -> DateTime<Utc> {
        self.0
    }

    pub fn to_rfc3339(self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn plus_minutes(self, minutes: i64) -> Self {
        self.plus_millis(minutes.saturating_mul(60_000))
    }

    /// Fractional hours are rounded to the nearest millisecond.
    pub fn plus_hours(self, hours: f64) -> Self {
        let millis = (hours * 3_600_000.0).round() as i64;
        self.plus_millis(millis)
    }

    /// The calendar date of this instant in the local timezone.
    pub fn local_date(self) -> NaiveDate {
        self.0.with_timezone(&Local).date_naive()
    }

    /// The last millisecond of the local calendar day containing this instant.
    pub fn end_of_local_day(self) -> Self {
        let last = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
        let naive = self.local_date().and_time(last);
        match Local.from_local_datetime(&naive).latest() {
            Some(ts) => Self(ts.with_timezone(&Utc)),
            // The local time doesn't exist (a DST gap at midnight). Fall back
            // to the UTC reading of the same wall-clock time.
            None => Self(Utc.from_utc_datetime(&naive)),
        }
    }

    /// Saturates at the earliest and latest representable instants.
    fn plus_millis(self, millis: i64) -> Self {
        let shifted = Duration::try_milliseconds(millis).and_then(|d| self.0.checked_add_signed(d));
        match shifted {
            Some(ts) => Self(ts),
            None if millis < 0 => Self::truncate(DateTime::<Utc>::MIN_UTC),
            None => Self::truncate(DateTime::<Utc>::MAX_UTC),
        }
    }

    fn truncate(ts: DateTime<Utc>) -> Self {
        let millis = ts.timestamp_millis();
        Self(DateTime::from_timestamp_millis(millis).unwrap_or(ts))
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_rfc3339())
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let string = String::deserialize(deserializer)?;
        Timestamp::parse(&string).map_err(|e| serde::de::Error::custom(e.message().to_string()))
    }
}

impl ToSql for Timestamp {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_rfc3339()))
    }
}

impl FromSql for Timestamp {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let string: String = FromSql::column_result(value)?;
        Timestamp::parse(&string).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Timelike;

    use super::*;

    #[test]
    fn test_rfc3339_round_trip() -> Fallible<()> {
        let ts = Timestamp::now();
        let parsed = Timestamp::parse(&ts.to_rfc3339())?;
        assert_eq!(ts, parsed);
        Ok(())
    }

    #[test]
    fn test_parse_offset() -> Fallible<()> {
        let a = Timestamp::parse("2025-03-01T10:00:00+02:00")?;
        let b = Timestamp::parse("2025-03-01T08:00:00.000Z")?;
        assert_eq!(a, b);
        Ok(())
    }

    #[test]
    fn test_parse_garbage() {
        assert!(Timestamp::parse("yesterday").is_err());
    }

    #[test]
    fn test_from_millis() {
        let ts = Timestamp::from_millis(1_700_000_000_123);
        assert_eq!(ts.map(|t| t.millis()), Some(1_700_000_000_123));
    }

    #[test]
    fn test_plus_hours() {
        let ts = Timestamp::from_millis(0).unwrap();
        assert_eq!(ts.plus_hours(1.5).millis(), 5_400_000);
        assert_eq!(ts.plus_minutes(10).millis(), 600_000);
    }

    #[test]
    fn test_plus_hours_saturates() {
        let ts = Timestamp::now();
        let far = ts.plus_hours(u32::MAX as f64 * 24.0 * 1.1);
        assert!(far > ts);
        assert_eq!(far.plus_hours(48.0), far);
        assert!(ts.plus_minutes(i64::MIN) < ts);
    }

    #[test]
    fn test_end_of_local_day() {
        let now = Timestamp::now();
        let end = now.end_of_local_day();
        assert!(end >= now);
        assert_eq!(end.local_date(), now.local_date());
        let local = end.into_inner().with_timezone(&Local);
        assert_eq!(local.hour(), 23);
        assert_eq!(local.minute(), 59);
        assert_eq!(local.second(), 59);
    }
}
