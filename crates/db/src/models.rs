use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A device activity as persisted and returned over the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceActivity {
    /// Storage-assigned surrogate key; never serialized
    #[serde(skip)]
    pub id: u64,
    /// External identifier, unique across all activities
    pub unique_id: String,
    #[serde(rename = "sourceIP")]
    pub source_ip: String,
    pub device_name: String,
    pub grid_name: String,
    pub action: String,
    /// Captured request headers, encoded as a JSON object string
    pub headers: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl DeviceActivity {
    /// Encode a header map into the `headers` field.
    pub fn set_headers(&mut self, headers: &BTreeMap<String, String>) -> serde_json::Result<()> {
        self.headers = serde_json::to_string(headers)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activity() -> DeviceActivity {
        DeviceActivity {
            id: 7,
            unique_id: "a1".to_string(),
            source_ip: "10.0.0.1".to_string(),
            device_name: "device-alpha".to_string(),
            grid_name: "grid-east".to_string(),
            action: "login".to_string(),
            headers: String::new(),
            timestamp: time::macros::datetime!(2024-05-01 12:00 UTC),
        }
    }

    #[test]
    fn serializes_with_api_field_names_and_hides_surrogate_key() {
        let json = serde_json::to_value(activity()).unwrap();
        assert_eq!(json["uniqueId"], "a1");
        assert_eq!(json["sourceIP"], "10.0.0.1");
        assert_eq!(json["deviceName"], "device-alpha");
        assert_eq!(json["gridName"], "grid-east");
        assert_eq!(json["timestamp"], "2024-05-01T12:00:00Z");
        assert!(json.get("id").is_none());
    }

    #[test]
    fn headers_are_stored_as_json_object_string() {
        let mut activity = activity();

        let mut headers = BTreeMap::new();
        headers.insert("user-agent".to_string(), "sensor/1.0".to_string());
        activity.set_headers(&headers).unwrap();

        assert_eq!(activity.headers, r#"{"user-agent":"sensor/1.0"}"#);
        let decoded: BTreeMap<String, String> = serde_json::from_str(&activity.headers).unwrap();
        assert_eq!(decoded, headers);
    }
}
