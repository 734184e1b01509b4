use serde::Deserialize;
use time::OffsetDateTime;

pub use gridwatch_db::DeviceActivity;

/// Request body for recording an activity.
///
/// Only client-controlled fields are read; `uniqueId`, `timestamp` and `headers` in the
/// body are ignored because the server assigns them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateActivity {
    #[serde(rename = "sourceIP")]
    pub source_ip: String,
    pub device_name: String,
    pub grid_name: String,
    pub action: String,
}

impl CreateActivity {
    pub fn into_activity(self, unique_id: String, timestamp: OffsetDateTime) -> DeviceActivity {
        DeviceActivity {
            id: 0,
            unique_id,
            source_ip: self.source_ip,
            device_name: self.device_name,
            grid_name: self.grid_name,
            action: self.action,
            headers: String::new(),
            timestamp,
        }
    }
}
