use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::OrderKey;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at_utc: DateTime<Utc>,
    pub updated_at_utc: Option<DateTime<Utc>>,
}

impl Tag {
    pub const ID_PREFIX: &'static str = "t_";

    pub const ORDER_PATHS: &'static [&'static str] = &["Id", "Name", "Description", "CreatedAtUtc", "UpdatedAtUtc"];

    pub fn new_id() -> String {
        format!("{}{}", Self::ID_PREFIX, Uuid::now_v7())
    }

    pub fn order_key(&self, path: &str) -> Option<OrderKey> {
        Some(match path {
            "Id" => OrderKey::Text(self.id.clone()),
            "Name" => OrderKey::Text(self.name.clone()),
            "Description" => OrderKey::OptText(self.description.clone()),
            "CreatedAtUtc" => OrderKey::Time(Some(self.created_at_utc)),
            "UpdatedAtUtc" => OrderKey::Time(self.updated_at_utc),
            _ => return None,
        })
    }
}

/// Association between a habit and one of its tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitTag {
    pub habit_id: String,
    pub tag_id: String,
    pub created_at_utc: DateTime<Utc>,
}
