//! Calendar-day derivation for epoch-millisecond timestamps.

use chrono::NaiveDate;

/// Milliseconds in one UTC day.
pub const MS_PER_DAY: i64 = 86_400_000;

/// `NaiveDate::num_days_from_ce` of 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Returns the UTC calendar day containing `timestamp_ms`.
///
/// Uses floor division, so exact midnight belongs to the day it starts and
/// negative timestamps fall on the preceding day. Returns `None` when the day
/// is outside the range `NaiveDate` can represent.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use daybar_transform::derive_date;
///
/// assert_eq!(
///     derive_date(1_727_740_800_000),
///     NaiveDate::from_ymd_opt(2024, 10, 1)
/// );
/// assert_eq!(derive_date(-1), NaiveDate::from_ymd_opt(1969, 12, 31));
/// ```
#[must_use]
pub fn derive_date(timestamp_ms: i64) -> Option<NaiveDate> {
    let days = i32::try_from(timestamp_ms.div_euclid(MS_PER_DAY)).ok()?;
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)?)
}
