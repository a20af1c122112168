// src/extract/temporal.rs

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use std::fmt;

const MICROS_PER_SECOND: i64 = 1_000_000;

/// Day zero of the SAS calendar.
fn sas_epoch() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1960, 1, 1)
}

/// Round fractional seconds to whole microseconds; `None` for NaN, infinities
/// and magnitudes no `i64` can hold.
fn seconds_to_micros(secs: f64) -> Option<i64> {
    if !secs.is_finite() {
        return None;
    }
    let micros = (secs * MICROS_PER_SECOND as f64).round();
    if micros < i64::MIN as f64 || micros >= i64::MAX as f64 {
        return None;
    }
    Some(micros as i64)
}

/// Seconds since 1960-01-01T00:00:00. `None` is "not a date-time".
pub fn datetime_from_sas_seconds(secs: f64) -> Option<NaiveDateTime> {
    let micros = seconds_to_micros(secs)?;
    sas_epoch()?
        .and_hms_opt(0, 0, 0)?
        .checked_add_signed(TimeDelta::microseconds(micros))
}

/// Days since 1960-01-01. Fractions of a day are dropped. `None` is "not a date".
pub fn date_from_sas_days(days: f64) -> Option<NaiveDate> {
    if !days.is_finite() {
        return None;
    }
    let delta = TimeDelta::try_days(days.floor() as i64)?;
    sas_epoch()?.checked_add_signed(delta)
}

/// Seconds since midnight. `None` is "not a time".
pub fn time_from_sas_seconds(secs: f64) -> Option<TimeOfDay> {
    seconds_to_micros(secs).map(TimeOfDay::from_micros)
}

/// A signed time-of-day duration with microsecond resolution.
///
/// SAS time values are durations, so they may be negative or run past 24h.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    micros: i64,
}

impl TimeOfDay {
    pub fn from_micros(micros: i64) -> Self {
        Self { micros }
    }

    pub fn from_hms_micro(hours: i64, minutes: i64, seconds: i64, micros: i64) -> Self {
        Self::from_micros(((hours * 60 + minutes) * 60 + seconds) * MICROS_PER_SECOND + micros)
    }

    pub fn as_micros(&self) -> i64 {
        self.micros
    }

    /// The wall-clock time, when the duration falls inside a single day.
    pub fn to_naive_time(&self) -> Option<NaiveTime> {
        if self.micros < 0 {
            return None;
        }
        let secs = u32::try_from(self.micros / MICROS_PER_SECOND).ok()?;
        let nanos = (self.micros % MICROS_PER_SECOND) as u32 * 1_000;
        NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos)
    }
}

/// `YYYY-MM-DD HH:MM:SS.ffffff`
pub fn write_datetime<W: fmt::Write>(out: &mut W, dt: &NaiveDateTime) -> fmt::Result {
    write_date(out, &dt.date())?;
    let micros = dt.nanosecond() / 1_000;
    write!(
        out,
        " {:02}:{:02}:{:02}.{:06}",
        dt.hour(),
        dt.minute(),
        dt.second(),
        micros
    )
}

/// ISO extended date, `YYYY-MM-DD`.
pub fn write_date<W: fmt::Write>(out: &mut W, date: &NaiveDate) -> fmt::Result {
    write!(out, "{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

/// Simple duration text: `[-]HH:MM:SS`, with `.ffffff` only when non-zero.
pub fn write_time<W: fmt::Write>(out: &mut W, time: &TimeOfDay) -> fmt::Result {
    let abs = time.micros.unsigned_abs();
    let micros_per_second = MICROS_PER_SECOND as u64;
    let frac = abs % micros_per_second;
    let total_secs = abs / micros_per_second;
    if time.micros < 0 {
        out.write_char('-')?;
    }
    write!(
        out,
        "{:02}:{:02}:{:02}",
        total_secs / 3_600,
        (total_secs / 60) % 60,
        total_secs % 60
    )?;
    if frac != 0 {
        write!(out, ".{:06}", frac)?;
    }
    Ok(())
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_time(f, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render<F: Fn(&mut String) -> fmt::Result>(f: F) -> String {
        let mut s = String::new();
        f(&mut s).unwrap();
        s
    }

    #[test]
    fn test_datetime_epoch_and_offsets() {
        let dt = datetime_from_sas_seconds(0.0).unwrap();
        assert_eq!(render(|s| write_datetime(s, &dt)), "1960-01-01 00:00:00.000000");

        // 2016-02-29 10:27:13.5
        let secs = 1_772_360_833.5;
        let dt = datetime_from_sas_seconds(secs).unwrap();
        assert_eq!(render(|s| write_datetime(s, &dt)), "2016-02-29 10:27:13.500000");

        let before = datetime_from_sas_seconds(-1.0).unwrap();
        assert_eq!(render(|s| write_datetime(s, &before)), "1959-12-31 23:59:59.000000");
    }

    #[test]
    fn test_datetime_sentinels() {
        assert!(datetime_from_sas_seconds(f64::NAN).is_none());
        assert!(datetime_from_sas_seconds(f64::INFINITY).is_none());
        assert!(datetime_from_sas_seconds(1e300).is_none());
    }

    #[test]
    fn test_date_from_days() {
        let d = date_from_sas_days(0.0).unwrap();
        assert_eq!(render(|s| write_date(s, &d)), "1960-01-01");
        let d = date_from_sas_days(20_513.0).unwrap();
        assert_eq!(render(|s| write_date(s, &d)), "2016-02-29");
        let d = date_from_sas_days(-0.5).unwrap();
        assert_eq!(render(|s| write_date(s, &d)), "1959-12-31");
        assert!(date_from_sas_days(f64::NAN).is_none());
        assert!(date_from_sas_days(1e18).is_none());
    }

    #[test]
    fn test_time_text() {
        let t = time_from_sas_seconds(37_633.0).unwrap();
        assert_eq!(t.to_string(), "10:27:13");
        let t = time_from_sas_seconds(37_633.25).unwrap();
        assert_eq!(t.to_string(), "10:27:13.250000");
        let t = TimeOfDay::from_hms_micro(30, 0, 5, 0);
        assert_eq!(t.to_string(), "30:00:05");
        assert!(t.to_naive_time().is_none());
        let t = TimeOfDay::from_micros(-90 * 1_000_000);
        assert_eq!(t.to_string(), "-00:01:30");
        assert!(time_from_sas_seconds(f64::NAN).is_none());
    }

    #[test]
    fn test_time_to_naive() {
        let t = TimeOfDay::from_hms_micro(23, 59, 59, 999_999);
        let nt = t.to_naive_time().unwrap();
        assert_eq!(nt.hour(), 23);
        assert_eq!(nt.nanosecond(), 999_999_000);
    }
}
