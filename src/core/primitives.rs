use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

pub fn decimal_to_f64(value: Decimal, field_name: &str) -> ChartResult<f64> {
    value.to_f64().ok_or_else(|| {
        ChartError::InvalidData(format!("{field_name} cannot be represented as f64"))
    })
}

/// Days between the OLE automation epoch (1899-12-30) and the Unix epoch.
const OLE_UNIX_EPOCH_OFFSET_DAYS: f64 = 25_569.0;

/// Converts a UTC timestamp into OLE automation days.
#[must_use]
pub fn datetime_to_ole_days(time: DateTime<Utc>) -> f64 {
    time.timestamp_millis() as f64 / MILLIS_PER_DAY + OLE_UNIX_EPOCH_OFFSET_DAYS
}

#[must_use]
pub fn naive_to_ole_days(time: NaiveDateTime) -> f64 {
    datetime_to_ole_days(time.and_utc())
}

/// Converts OLE automation days back to a timestamp, `None` when out of range.
#[must_use]
pub fn ole_days_to_naive(days: f64) -> Option<NaiveDateTime> {
    if !days.is_finite() {
        return None;
    }
    let millis = ((days - OLE_UNIX_EPOCH_OFFSET_DAYS) * MILLIS_PER_DAY).round();
    if millis.abs() >= i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_millis(millis as i64).map(|time| time.naive_utc())
}

#[must_use]
pub fn duration_to_millis(duration: TimeDelta) -> f64 {
    duration.num_microseconds().map_or_else(
        || duration.num_milliseconds() as f64,
        |micros| micros as f64 / 1000.0,
    )
}

#[must_use]
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    u32::try_from((next - first).num_days()).ok()
}

#[must_use]
pub fn days_in_year(year: i32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let next = NaiveDate::from_ymd_opt(year + 1, 1, 1)?;
    u32::try_from((next - first).num_days()).ok()
}

/// Calendar period an axis lays out at uniform width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CalendarPeriod {
    Month,
    Year,
}

impl CalendarPeriod {
    /// Maps OLE days to fractional periods since year zero.
    ///
    /// Each period counts as one unit regardless of its day length, so a
    /// 28-day February and a 31-day March occupy the same span.
    #[must_use]
    pub fn from_ole_days(self, days: f64) -> Option<f64> {
        let time = ole_days_to_naive(days)?;
        let date = time.date();
        match self {
            Self::Month => {
                let start = NaiveDate::from_ymd_opt(date.year(), date.month(), 1)?;
                let length = f64::from(days_in_month(date.year(), date.month())?);
                let offset = days - naive_to_ole_days(start.and_hms_opt(0, 0, 0)?);
                let whole = f64::from(date.year()) * 12.0 + f64::from(date.month0());
                Some(whole + offset / length)
            }
            Self::Year => {
                let start = NaiveDate::from_ymd_opt(date.year(), 1, 1)?;
                let length = f64::from(days_in_year(date.year())?);
                let offset = days - naive_to_ole_days(start.and_hms_opt(0, 0, 0)?);
                Some(f64::from(date.year()) + offset / length)
            }
        }
    }

    /// Inverse of [`CalendarPeriod::from_ole_days`].
    #[must_use]
    pub fn to_ole_days(self, units: f64) -> Option<f64> {
        if !units.is_finite() {
            return None;
        }
        let whole = units.floor();
        let fraction = units - whole;
        let start = match self {
            Self::Month => {
                let year = i32::try_from((whole / 12.0).floor() as i64).ok()?;
                let month0 = (whole - f64::from(year) * 12.0) as u32;
                NaiveDate::from_ymd_opt(year, month0 + 1, 1)?
            }
            Self::Year => NaiveDate::from_ymd_opt(i32::try_from(whole as i64).ok()?, 1, 1)?,
        };
        let length = match self {
            Self::Month => f64::from(days_in_month(start.year(), start.month())?),
            Self::Year => f64::from(days_in_year(start.year())?),
        };
        Some(naive_to_ole_days(start.and_hms_opt(0, 0, 0)?) + fraction * length)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn ole_days_match_known_dates() {
        let time = Utc.with_ymd_and_hms(1900, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(datetime_to_ole_days(time), 2.5);
        let back = ole_days_to_naive(2.5).unwrap();
        assert_eq!(back, time.naive_utc());
    }

    #[test]
    fn month_lengths_follow_calendar() {
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(2023, 2), Some(28));
        assert_eq!(days_in_month(2023, 12), Some(31));
        assert_eq!(days_in_year(2024), Some(366));
    }

    #[test]
    fn calendar_units_round_trip_through_ole_days() {
        let time = Utc.with_ymd_and_hms(2024, 2, 15, 0, 0, 0).unwrap();
        let days = datetime_to_ole_days(time);
        for period in [CalendarPeriod::Month, CalendarPeriod::Year] {
            let units = period.from_ole_days(days).unwrap();
            let back = period.to_ole_days(units).unwrap();
            assert!((back - days).abs() < 1e-6);
        }
        let months = CalendarPeriod::Month.from_ole_days(days).unwrap();
        assert!((months - (2024.0 * 12.0 + 1.0 + 14.0 / 29.0)).abs() < 1e-9);
    }

    #[test]
    fn durations_convert_to_milliseconds() {
        assert_eq!(duration_to_millis(TimeDelta::seconds(2)), 2000.0);
        assert_eq!(duration_to_millis(TimeDelta::microseconds(1500)), 1.5);
    }
}
