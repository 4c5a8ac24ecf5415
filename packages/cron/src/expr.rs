use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};

use crate::error::CronError;
use crate::field::{Domain, Field};

const SECOND: Domain = Domain {
    name: "second",
    min: 0,
    max: 59,
};
const MINUTE: Domain = Domain {
    name: "minute",
    min: 0,
    max: 59,
};
const HOUR: Domain = Domain {
    name: "hour",
    min: 0,
    max: 23,
};
const DAY_OF_MONTH: Domain = Domain {
    name: "day-of-month",
    min: 1,
    max: 31,
};
const MONTH: Domain = Domain {
    name: "month",
    min: 1,
    max: 12,
};
const DAY_OF_WEEK: Domain = Domain {
    name: "day-of-week",
    min: 0,
    max: 6,
};

/// A parsed 6-field CRON expression: `<sec> <min> <hour> <dom> <mon> <dow>`.
#[derive(Debug, Clone)]
pub(crate) struct CronExpr {
    second: Field,
    minute: Field,
    hour: Field,
    day_of_month: Field,
    month: Field,
    day_of_week: Field,
}

impl CronExpr {
    pub fn parse(expr: &str) -> Result<Self, CronError> {
        let fields: Vec<&str> = expr.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(CronError::WrongFieldCount(fields.len()));
        }
        Ok(CronExpr {
            second: Field::parse(fields[0], SECOND)?,
            minute: Field::parse(fields[1], MINUTE)?,
            hour: Field::parse(fields[2], HOUR)?,
            day_of_month: Field::parse(fields[3], DAY_OF_MONTH)?,
            month: Field::parse(fields[4], MONTH)?,
            day_of_week: Field::parse(fields[5], DAY_OF_WEEK)?,
        })
    }

    /// True when `date` satisfies the month and day-of-month/day-of-week fields.
    ///
    /// Conventional CRON rule: when both day-of-month and day-of-week are
    /// restricted (neither is `*`), a match requires *either* to hold.
    pub fn date_matches(&self, date: NaiveDate) -> bool {
        if !self.month.contains(date.month()) {
            return false;
        }
        let dom_restricted = !self.day_of_month.is_unrestricted();
        let dow_restricted = !self.day_of_week.is_unrestricted();
        let dom_match = self.day_of_month.contains(date.day());
        let dow_match = self.day_of_week.contains(date.weekday().num_days_from_sunday());

        match (dom_restricted, dow_restricted) {
            (true, true) => dom_match || dow_match,
            (true, false) => dom_match,
            (false, true) => dow_match,
            (false, false) => true,
        }
    }

    /// Smallest time-of-day >= `from` that matches hour/minute/second, if any.
    pub fn time_at_or_after(&self, from: NaiveTime) -> Option<NaiveTime> {
        let mut hour = from.hour();
        loop {
            let h = self.hour.first_at_or_after(hour)?;
            let mut minute = if h == from.hour() { from.minute() } else { 0 };
            loop {
                let Some(m) = self.minute.first_at_or_after(minute) else {
                    break;
                };
                let sec_floor = if h == from.hour() && m == from.minute() {
                    from.second()
                } else {
                    0
                };
                if let Some(s) = self.second.first_at_or_after(sec_floor) {
                    return Some(NaiveTime::from_hms_opt(h, m, s).unwrap());
                }
                if m == 59 {
                    break;
                }
                minute = m + 1;
            }
            if h == 23 {
                return None;
            }
            hour = h + 1;
        }
    }

    /// Largest time-of-day <= `from` that matches hour/minute/second, if any.
    pub fn time_at_or_before(&self, from: NaiveTime) -> Option<NaiveTime> {
        let mut hour = from.hour();
        loop {
            let h = self.hour.last_at_or_before(hour)?;
            let mut minute = if h == from.hour() { from.minute() } else { 59 };
            loop {
                let Some(m) = self.minute.last_at_or_before(minute) else {
                    break;
                };
                let sec_ceil = if h == from.hour() && m == from.minute() {
                    from.second()
                } else {
                    59
                };
                if let Some(s) = self.second.last_at_or_before(sec_ceil) {
                    return Some(NaiveTime::from_hms_opt(h, m, s).unwrap());
                }
                if m == 0 {
                    break;
                }
                minute = m - 1;
            }
            if h == 0 {
                return None;
            }
            hour = h - 1;
        }
    }
}
