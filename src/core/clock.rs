use chrono::{DateTime, TimeZone, Utc};

/// `Sunday, January 05, 2025 3:04:05 PM`
pub fn format_clock<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("%A, %B %d, %Y %-I:%M:%S %p").to_string()
}

/// Short relative age such as `5m ago`, rounded like a person would say it.
pub fn format_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - then).num_minutes();
    if minutes < 1 {
        // Includes timestamps ahead of the local clock
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        let hours = minutes / 60;
        if minutes % 60 >= 30 {
            format!("{}h ago", hours + 1)
        } else {
            format!("{}h ago", hours)
        }
    } else {
        let days = minutes / 1440;
        if (minutes % 1440) / 60 >= 12 {
            format!("{}d ago", days + 1)
        } else {
            format!("{}d ago", days)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset};

    #[test]
    fn test_afternoon() {
        let t = Utc.with_ymd_and_hms(2025, 1, 5, 15, 4, 5).unwrap();
        assert_eq!(format_clock(&t), "Sunday, January 05, 2025 3:04:05 PM");
    }

    #[test]
    fn test_midnight_and_noon() {
        let midnight = Utc.with_ymd_and_hms(2024, 7, 4, 0, 0, 9).unwrap();
        assert_eq!(format_clock(&midnight), "Thursday, July 04, 2024 12:00:09 AM");

        let noon = Utc.with_ymd_and_hms(2024, 7, 4, 12, 30, 0).unwrap();
        assert_eq!(format_clock(&noon), "Thursday, July 04, 2024 12:30:00 PM");
    }

    #[test]
    fn test_uses_local_offset() {
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let t = offset.with_ymd_and_hms(2025, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(format_clock(&t), "Wednesday, December 31, 2025 11:59:59 PM");
    }

    #[test]
    fn test_format_age() {
        let now = Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(format_age(now, now), "just now");
        assert_eq!(format_age(now + Duration::minutes(5), now), "just now");
        assert_eq!(format_age(now - Duration::minutes(20), now), "20m ago");
        assert_eq!(format_age(now - Duration::minutes(80), now), "1h ago");
        assert_eq!(format_age(now - Duration::minutes(95), now), "2h ago");
        assert_eq!(format_age(now - Duration::hours(30), now), "1d ago");
        assert_eq!(format_age(now - Duration::hours(40), now), "2d ago");
    }
}
