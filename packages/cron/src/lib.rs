//! A 6-field CRON evaluator: `<sec> <min> <hour> <dom> <mon> <dow>`.
//!
//! Each field supports `*`, a literal, `a-b`, `a-b/n`, `*/n`, and
//! comma-separated unions of those forms. Day-of-month and day-of-week
//! follow conventional CRON semantics: when both are restricted, a match
//! requires either to hold.
//!
//! The evaluator operates on [`chrono::DateTime<Utc>`] throughout. Callers
//! that need a different civil time zone are expected to convert at the
//! edges; internally everything is monotonic UTC so daylight-saving
//! transitions never make `next`/`prev` go backwards.

mod error;
mod eval;
mod expr;
mod field;

use chrono::{DateTime, Utc};

pub use error::CronError;
use expr::CronExpr;

/// True iff `expr` has exactly six whitespace-separated fields and each
/// parses within its domain.
pub fn validate(expr: &str) -> bool {
    CronExpr::parse(expr).is_ok()
}

/// The smallest instant strictly greater than `base` at which every field
/// of `expr` matches. Deterministic and pure; `base`'s sub-second
/// component is floored away before the search begins.
pub fn next(expr: &str, base: DateTime<Utc>) -> Result<DateTime<Utc>, CronError> {
    let parsed = CronExpr::parse(expr)?;
    eval::next(&parsed, base)
}

/// The largest instant strictly less than `base` at which every field of
/// `expr` matches. Symmetric to [`next`].
pub fn prev(expr: &str, base: DateTime<Utc>) -> Result<DateTime<Utc>, CronError> {
    let parsed = CronExpr::parse(expr)?;
    eval::prev(&parsed, base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn validate_accepts_a_well_formed_expression() {
        assert!(validate("*/5 * * * * *"));
    }

    #[test]
    fn validate_rejects_wrong_field_count() {
        assert!(!validate("* * * * *"));
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        assert!(!validate("60 * * * * *"));
    }

    #[test]
    fn next_forward_progress_holds_for_many_bases() {
        let expr = "*/7 * * * * *";
        let mut base = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        for _ in 0..50 {
            let got = next(expr, base).unwrap();
            assert!(got > base, "next({base}) = {got} did not advance");
            base = got;
        }
    }

    #[test]
    fn invalid_expression_surfaces_as_invalid_schedule() {
        let err = next("bogus", Utc::now()).unwrap_err();
        assert!(matches!(err, CronError::WrongFieldCount(_)));
    }
}
