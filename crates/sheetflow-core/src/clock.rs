//! Time source for timestamps and generated ids

use chrono::{DateTime, SecondsFormat, Utc};

/// Source of the current time
pub trait Clock: Send + Sync {
    /// Current instant
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// `<prefix>-<epoch millis>`, e.g. `TICKET-1718000000000`
#[must_use]
pub fn prefixed_id(prefix: &str, at: DateTime<Utc>) -> String {
    format!("{prefix}-{}", at.timestamp_millis())
}

/// ISO-8601 UTC with millisecond precision, e.g. `2024-06-10T08:00:00.000Z`
#[must_use]
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_use_epoch_millis() {
        let at = DateTime::<Utc>::from_timestamp_millis(1_718_000_000_123).unwrap();
        assert_eq!(prefixed_id("TICKET", at), "TICKET-1718000000123");
    }

    #[test]
    fn iso_timestamp_format() {
        let at = DateTime::<Utc>::from_timestamp_millis(1_718_006_400_000).unwrap();
        assert_eq!(iso_timestamp(at), "2024-06-10T08:00:00.000Z");
    }
}
