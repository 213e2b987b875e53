use chrono::{DateTime, SecondsFormat, Utc};

/// Current UTC time, e.g. `2024-05-01T10:00:00.123Z`.
pub fn time_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Unparsable input is returned unchanged.
pub fn format_timestamp(value: &str) -> String {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| {
            ts.with_timezone(&Utc)
                .format("%Y-%m-%d %H:%M:%S UTC")
                .to_string()
        })
        .unwrap_or_else(|_| value.to_string())
}
