use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A UTC instant. Message ordering relies on `Ord` over this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Rehydrates a stored instant.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Millisecond-precision RFC 3339 with a `Z` suffix, as used on the wire.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn later_instants_sort_after_earlier_ones() {
        let first = Timestamp::from_datetime(Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap());
        let second = Timestamp::from_datetime(Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 1).unwrap());

        assert!(first < second);
    }

    #[test]
    fn renders_rfc3339_with_millis_and_z() {
        let ts = Timestamp::from_datetime(Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap());

        assert_eq!(ts.to_rfc3339(), "2025-03-01T09:30:00.000Z");
    }

    #[test]
    fn serde_round_trips_transparently() {
        let ts = Timestamp::now();
        let json = serde_json::to_value(ts).unwrap();

        assert!(json.is_string());
        assert_eq!(serde_json::from_value::<Timestamp>(json).unwrap(), ts);
    }
}
