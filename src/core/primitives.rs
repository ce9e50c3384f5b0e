use chrono::{Days, NaiveDate};

/// Shifts `date` by a signed number of days, saturating at the calendar bounds.
#[must_use]
pub fn shift_days(date: NaiveDate, days: i64) -> NaiveDate {
    let magnitude = Days::new(days.unsigned_abs());
    if days >= 0 {
        date.checked_add_days(magnitude).unwrap_or(NaiveDate::MAX)
    } else {
        date.checked_sub_days(magnitude).unwrap_or(NaiveDate::MIN)
    }
}

/// Midnight UTC of `date` as unix seconds.
#[must_use]
pub fn date_to_unix_seconds(date: NaiveDate) -> f64 {
    date.and_hms_opt(0, 0, 0)
        .map_or(0.0, |datetime| datetime.and_utc().timestamp() as f64)
}
