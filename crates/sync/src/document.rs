use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::errors::{SyncError, SyncResult};

/// Field names a synced document must carry.
#[derive(Debug, Clone)]
pub struct DocumentShape {
    pub owner_field: String,
    pub timestamp_field: String,
}

/// A record from a synced collection, validated at the store boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncedDocument {
    pub id: String,
    pub owner_id: String,
    pub timestamp: DateTime<Utc>,
    /// Every field as stored, including the ones above
    pub fields: Map<String, Value>,
}

fn required_str<'a>(fields: &'a Map<String, Value>, name: &str) -> SyncResult<&'a str> {
    match fields.get(name) {
        Some(Value::String(value)) if !value.trim().is_empty() => Ok(value),
        Some(_) => Err(SyncError::Data(format!("field '{}' must be a non-empty string", name))),
        None => Err(SyncError::Data(format!("missing field '{}'", name))),
    }
}

/// Timestamps arrive as RFC 3339 strings or epoch milliseconds.
fn parse_timestamp(fields: &Map<String, Value>, name: &str) -> SyncResult<DateTime<Utc>> {
    match fields.get(name) {
        Some(Value::String(text)) => DateTime::parse_from_rfc3339(text)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(|e| SyncError::Data(format!("field '{}' is not a timestamp: {}", name, e))),
        Some(Value::Number(millis)) => millis
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .ok_or_else(|| SyncError::Data(format!("field '{}' is out of range", name))),
        Some(_) => Err(SyncError::Data(format!("field '{}' is not a timestamp", name))),
        None => Err(SyncError::Data(format!("missing field '{}'", name))),
    }
}

impl SyncedDocument {
    pub fn decode(value: Value, shape: &DocumentShape) -> SyncResult<Self> {
        let Value::Object(fields) = value else {
            return Err(SyncError::Data("document is not an object".to_string()));
        };

        let id = required_str(&fields, "id")?.to_string();
        let owner_id = required_str(&fields, &shape.owner_field)?.to_string();
        let timestamp = parse_timestamp(&fields, &shape.timestamp_field)?;

        Ok(Self {
            id,
            owner_id,
            timestamp,
            fields,
        })
    }

    /// Deserializes the stored fields into a typed record.
    pub fn to_record<T: DeserializeOwned>(&self) -> SyncResult<T> {
        serde_json::from_value(Value::Object(self.fields.clone()))
            .map_err(|e| SyncError::Data(format!("document {}: {}", self.id, e)))
    }
}
