use chrono::{DateTime, NaiveDate, Utc};

/// Generate a URL-safe random ID of a given length.
#[must_use]
pub fn nice_id(length: usize) -> String {
    const URL_SAFE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_";
    (0..length)
        .map(|_| {
            let idx = rand::random_range(0..URL_SAFE.len());
            URL_SAFE[idx] as char
        })
        .collect()
}

/// Logs a warning message with an 'ALERT:' prefix.
#[macro_export]
macro_rules! alert {
    ($($arg:tt)*) => {
        warn!("ALERT: {}", format_args!($($arg)*));
    };
}

/// Parses a date filter given either as RFC 3339 or as a plain `YYYY-MM-DD` date,
/// which is read as midnight UTC.
#[must_use]
pub fn parse_date_filter(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(date_time) = DateTime::parse_from_rfc3339(value) {
        return Some(date_time.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn nice_id_has_requested_length() {
        let id = nice_id(13);
        assert_eq!(id.len(), 13);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
    }

    #[test]
    fn date_filters_accept_dates_and_timestamps() {
        assert_eq!(
            parse_date_filter("2025-03-01"),
            Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).single()
        );
        assert_eq!(
            parse_date_filter("2025-03-01T12:30:00+02:00"),
            Utc.with_ymd_and_hms(2025, 3, 1, 10, 30, 0).single()
        );
        assert_eq!(parse_date_filter("yesterday"), None);
    }
}
