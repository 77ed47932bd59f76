use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of one entity's metric at a point in time.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct MetricDocument {
    pub timestamp: DateTime<Utc>,
    pub entity: String,
    pub value: f64,
}

impl MetricDocument {
    pub fn new(
        timestamp: DateTime<Utc>,
        entity: impl Into<String>,
        value: f64,
    ) -> Self {
        Self {
            timestamp,
            entity: entity.into(),
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn serializes_timestamp_as_rfc3339() {
        let timestamp = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let document = MetricDocument::new(timestamp, "host-1", 0.25);
        let json = serde_json::to_value(&document).unwrap();

        assert_eq!(json["timestamp"], "2024-05-01T12:00:00Z");
        assert_eq!(json["entity"], "host-1");
        assert_eq!(json["value"], 0.25);
    }
}
