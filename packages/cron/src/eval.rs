use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};

use crate::error::CronError;
use crate::expr::CronExpr;

/// Bounds the forward/backward day-walk so a schedule that can never be
/// satisfied (e.g. day-of-month 31 in a schedule also pinned to February
/// only) fails fast instead of looping forever.
const MAX_DAYS_SEARCHED: i64 = 4 * 366;

/// The smallest instant strictly greater than `base` at which every field
/// of `expr` matches. `base`'s sub-second component is floored away before
/// the search starts, which is what guarantees the result is never `base`
/// itself even when `base` already matches to the second.
pub fn next(expr: &CronExpr, base: DateTime<Utc>) -> Result<DateTime<Utc>, CronError> {
    let floored = floor_to_second(base);
    let start = floored + Duration::seconds(1);

    let mut date = start.date_naive();
    let mut time_floor = start.time();

    for _ in 0..=MAX_DAYS_SEARCHED {
        if expr.date_matches(date) {
            if let Some(time) = expr.time_at_or_after(time_floor) {
                return Ok(Utc.from_utc_datetime(&date.and_time(time)));
            }
        }
        date = date
            .succ_opt()
            .ok_or(CronError::Unsatisfiable)?;
        time_floor = NaiveTime::from_hms_opt(0, 0, 0).unwrap();
    }
    Err(CronError::Unsatisfiable)
}

/// The largest instant strictly less than `base` at which every field of
/// `expr` matches. Symmetric to [`next`].
pub fn prev(expr: &CronExpr, base: DateTime<Utc>) -> Result<DateTime<Utc>, CronError> {
    let floored = floor_to_second(base);
    let start = floored - Duration::seconds(1);

    let mut date = start.date_naive();
    let mut time_ceil = start.time();

    for _ in 0..=MAX_DAYS_SEARCHED {
        if expr.date_matches(date) {
            if let Some(time) = expr.time_at_or_before(time_ceil) {
                return Ok(Utc.from_utc_datetime(&date.and_time(time)));
            }
        }
        date = date
            .pred_opt()
            .ok_or(CronError::Unsatisfiable)?;
        time_ceil = NaiveTime::from_hms_opt(23, 59, 59).unwrap();
    }
    Err(CronError::Unsatisfiable)
}

fn floor_to_second(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant - Duration::nanoseconds(instant.timestamp_subsec_nanos() as i64)
}
