//! Device record as stored and exchanged over the API.
//!
//! Missing fields decode to their zero value and unknown fields are ignored,
//! so partial payloads (an upgrade body carrying only `firmware`) decode
//! into a full `Device`.
//!
//! Request bodies go through [`Device::from_body`], which reads only the first
//! JSON value and matches object keys case-insensitively (`"ID"`, `"Mac"`).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{DeviceMonError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Device {
    /// Caller-supplied identity. Not checked for uniqueness.
    pub id: i64,
    /// MAC address (field name is `mac` in JSON).
    #[serde(rename = "mac")]
    pub mac_address: String,
    /// Firmware version (field name is `firmware` in JSON).
    #[serde(rename = "firmware")]
    pub firmware_version: String,
}

impl Device {
    pub fn new(id: i64, mac_address: impl Into<String>, firmware_version: impl Into<String>) -> Self {
        Self {
            id,
            mac_address: mac_address.into(),
            firmware_version: firmware_version.into(),
        }
    }

    /// Decode a device from a request body.
    ///
    /// Anything after the first JSON value is ignored. `null` decodes to
    /// the zero device. An empty body is a `BadRequest("EOF")`.
    pub fn from_body(body: &[u8]) -> Result<Self> {
        let value = serde_json::Deserializer::from_slice(body)
            .into_iter::<Value>()
            .next()
            .ok_or_else(|| DeviceMonError::BadRequest("EOF".into()))??;

        match value {
            Value::Null => Ok(Self::default()),
            other => Ok(serde_json::from_value(fold_keys(other))?),
        }
    }
}

/// Lowercase top-level object keys. A key already in lowercase wins over
/// a differently-cased duplicate.
fn fold_keys(value: Value) -> Value {
    let map = match value {
        Value::Object(map) => map,
        other => return other,
    };

    let mut folded = Map::with_capacity(map.len());
    for (k, v) in map {
        let lower = k.to_lowercase();
        if k == lower || !folded.contains_key(&lower) {
            folded.insert(lower, v);
        }
    }
    Value::Object(folded)
}

/// Devices present when the process starts.
pub fn seed_devices() -> Vec<Device> {
    vec![
        Device::new(1, "AA:BB:CC:DD:EE:01", "1.0.0"),
        Device::new(2, "AA:BB:CC:DD:EE:02", "1.0.0"),
    ]
}
