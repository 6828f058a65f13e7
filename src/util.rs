//! Calendar-day bucketing shared by the resolver and the reports.
//!
//! Instants are stored in UTC; "which day" questions are answered in the
//! configured zone.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Calendar date of an instant in the given zone.
pub fn local_date(instant: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}

/// First instant of the local day after `date`.
///
/// Used as the exclusive upper bound for "everything that happened on or
/// before `date`". Zones that skip midnight (DST at 00:00) resolve to the
/// first valid hour of the day instead.
pub fn end_of_day(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let Some(next) = date.succ_opt() else {
        return DateTime::<Utc>::MAX_UTC;
    };

    // Fast path: midnight exists (ambiguous midnight takes the earlier one).
    if let Some(dt) = tz.from_local_datetime(&next.and_time(NaiveTime::MIN)).earliest() {
        return dt.with_timezone(&Utc);
    }

    // DST gap at midnight: the day starts at the first hour that exists.
    let first_hours = (1..=3).filter_map(|hour| NaiveTime::from_hms_opt(hour, 0, 0));
    for time in first_hours {
        if let Some(dt) = tz.from_local_datetime(&next.and_time(time)).earliest() {
            log::warn!("DST gap at midnight of {} in {}; day starts at {}", next, tz, time);
            return dt.with_timezone(&Utc);
        }
    }

    log::warn!("Could not resolve start of {} in {}; falling back to UTC", next, tz);
    next.and_time(NaiveTime::MIN).and_utc()
}

/// Inclusive list of dates from `from` through `to`. Empty when `from > to`.
pub fn day_range(from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
    from.iter_days().take_while(|d| *d <= to).collect()
}

/// The `days` calendar dates ending at `today`, oldest first.
///
/// Stops at the earliest representable date, so the result can be shorter
/// than `days`.
pub fn trailing_days(today: NaiveDate, days: u64) -> Vec<NaiveDate> {
    let mut out: Vec<NaiveDate> = (0..days)
        .map_while(|back| today.checked_sub_days(Days::new(back)))
        .collect();
    out.reverse();
    out
}
