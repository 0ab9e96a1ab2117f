//! Date-range download

use chrono::NaiveDate;

use crate::client::UsageSource;
use crate::error::{Error, Result};
use crate::retry::retry;
use crate::types::UsageSnapshot;

/// Retries per day after the first failed attempt
pub const DAY_RETRIES: u32 = 3;

/// Days in `[start, end)`, ascending
pub fn days(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |day| *day < end)
}

/// Download one snapshot per day in `[start, end)`.
///
/// Days are fetched strictly one after another. `on_progress` is called with
/// each date before its first attempt. If any day fails all of its attempts
/// the whole download fails and nothing collected so far is returned.
pub async fn download_range(
    source: &dyn UsageSource,
    start: NaiveDate,
    end: NaiveDate,
    mut on_progress: impl FnMut(NaiveDate),
) -> Result<Vec<UsageSnapshot>> {
    if start >= end {
        return Err(Error::InvalidRange { start, end });
    }

    let fetch = retry(move |date: NaiveDate| source.fetch_day(date), DAY_RETRIES);
    let mut snapshots = Vec::new();

    for date in days(start, end) {
        on_progress(date);
        match fetch.call(date).await {
            Ok(snapshot) => snapshots.push(snapshot),
            Err(exhausted) => {
                tracing::debug!("Giving up on {} after {} attempts", date, exhausted.attempts);
                return Err(Error::ExhaustedRetries {
                    date,
                    attempts: exhausted.attempts,
                    source: Box::new(exhausted.last),
                });
            }
        }
    }

    Ok(snapshots)
}
