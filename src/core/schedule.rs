use chrono::{DateTime, Duration, Utc};

/// Whether a remote call is due for a source last fetched at `last_fetched_at`.
///
/// A source that has never been fetched is always due. A negative elapsed
/// time (the wall clock moved backwards) is never due, so a clock
/// adjustment cannot turn into a burst of requests.
pub fn should_fetch(
    last_fetched_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    interval: Duration,
) -> bool {
    let Some(last) = last_fetched_at else {
        return true;
    };

    let elapsed = now.signed_duration_since(last);
    if elapsed < Duration::zero() {
        return false;
    }

    elapsed >= interval
}
