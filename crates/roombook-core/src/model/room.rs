use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::table::{Table, TableRow};
use crate::error::ValidationError;

/// A bookable physical space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: i64,
    pub name: String,
    pub capacity: u32,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Insert shape: `id` and `created_at` are assigned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomInsert {
    pub name: String,
    pub capacity: u32,
    #[serde(default)]
    pub features: Vec<String>,
}

/// Partial patch of a room.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
}

impl RoomInsert {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)?;
        validate_capacity(self.capacity)
    }
}

impl RoomUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(capacity) = self.capacity {
            validate_capacity(capacity)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.capacity.is_none() && self.features.is_none()
    }
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::InvalidValue {
            field: "name".into(),
            message: "must not be empty".into(),
        });
    }
    Ok(())
}

fn validate_capacity(capacity: u32) -> Result<(), ValidationError> {
    if capacity == 0 {
        return Err(ValidationError::InvalidValue {
            field: "capacity".into(),
            message: "must be positive".into(),
        });
    }
    Ok(())
}

impl TableRow for Room {
    const TABLE: Table = Table::Rooms;
    type Insert = RoomInsert;
    type Update = RoomUpdate;

    fn id(&self) -> i64 {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_omits_absent_fields() {
        let patch = RoomUpdate {
            capacity: Some(12),
            ..Default::default()
        };
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({"capacity": 12}));
    }

    #[test]
    fn test_room_without_created_at() {
        let room: Room = serde_json::from_value(serde_json::json!({
            "id": 3,
            "name": "Aquarium",
            "capacity": 8,
            "features": ["projector", "whiteboard"]
        }))
        .unwrap();
        assert_eq!(room.created_at, None);
        assert_eq!(room.features.len(), 2);
    }

    #[test]
    fn test_insert_rejects_zero_capacity() {
        let insert = RoomInsert {
            name: "Closet".into(),
            capacity: 0,
            features: vec![],
        };
        assert!(insert.validate().is_err());
    }
}
