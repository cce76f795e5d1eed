//! Relative time formatting ("3 hours ago", "2 days from now")
//!
//! Months are 30 days and years are 12 months. Anything beyond 37 years is
//! "a long while".

use chrono::{DateTime, Utc};

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const WEEK: i64 = 7 * DAY;
const MONTH: i64 = 30 * DAY;
const YEAR: i64 = 12 * MONTH;
const LONG_TIME: i64 = 37 * YEAR;

/// One magnitude step: applies while the difference is below `limit`.
struct Magnitude {
    limit: i64,
    /// `None` renders the label as-is; `Some(d)` renders `diff / d` before the label.
    divisor: Option<i64>,
    label: &'static str,
}

const MAGNITUDES: &[Magnitude] = &[
    Magnitude { limit: 2, divisor: None, label: "1 second" },
    Magnitude { limit: MINUTE, divisor: Some(1), label: "seconds" },
    Magnitude { limit: 2 * MINUTE, divisor: None, label: "1 minute" },
    Magnitude { limit: HOUR, divisor: Some(MINUTE), label: "minutes" },
    Magnitude { limit: 2 * HOUR, divisor: None, label: "1 hour" },
    Magnitude { limit: DAY, divisor: Some(HOUR), label: "hours" },
    Magnitude { limit: 2 * DAY, divisor: None, label: "1 day" },
    Magnitude { limit: WEEK, divisor: Some(DAY), label: "days" },
    Magnitude { limit: 2 * WEEK, divisor: None, label: "1 week" },
    Magnitude { limit: MONTH, divisor: Some(WEEK), label: "weeks" },
    Magnitude { limit: 2 * MONTH, divisor: None, label: "1 month" },
    Magnitude { limit: YEAR, divisor: Some(MONTH), label: "months" },
    Magnitude { limit: 18 * MONTH, divisor: None, label: "1 year" },
    Magnitude { limit: 2 * YEAR, divisor: None, label: "2 years" },
    Magnitude { limit: LONG_TIME, divisor: Some(YEAR), label: "years" },
];

/// Format `then` relative to the current time.
pub fn humanize_time(then: DateTime<Utc>) -> String {
    humanize_between(then, Utc::now())
}

/// Format `then` relative to `now`.
pub fn humanize_between(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let (diff, suffix) = if then <= now {
        ((now - then).num_seconds(), "ago")
    } else {
        ((then - now).num_seconds(), "from now")
    };

    if diff < 1 {
        return "now".to_string();
    }

    for magnitude in MAGNITUDES {
        if diff < magnitude.limit {
            return match magnitude.divisor {
                None => format!("{} {}", magnitude.label, suffix),
                Some(divisor) => format!("{} {} {}", diff / divisor, magnitude.label, suffix),
            };
        }
    }

    format!("a long while {}", suffix)
}
