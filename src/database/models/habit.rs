use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{int_enum, OrderKey};

int_enum! {
    HabitType, "habit type" {
        None = 0 => "none",
        Binary = 1 => "binary",
        Measurable = 2 => "measurable",
    }
}

int_enum! {
    HabitStatus, "habit status" {
        None = 0 => "none",
        Ongoing = 1 => "ongoing",
        Completed = 2 => "completed",
    }
}

int_enum! {
    FrequencyType, "frequency type" {
        None = 0 => "none",
        Daily = 1 => "daily",
        Weekly = 2 => "weekly",
        Monthly = 3 => "monthly",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frequency {
    #[serde(rename = "type")]
    pub frequency_type: FrequencyType,
    pub times_per_period: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub value: i32,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub target: i32,
    #[serde(default)]
    pub current: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Habit {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub habit_type: HabitType,
    pub frequency: Frequency,
    pub target: Target,
    pub status: HabitStatus,
    pub is_archived: bool,
    pub end_date: Option<NaiveDate>,
    pub milestone: Option<Milestone>,
    pub created_at_utc: DateTime<Utc>,
    pub updated_at_utc: Option<DateTime<Utc>>,
    pub last_completed_at_utc: Option<DateTime<Utc>>,
}

impl Habit {
    pub const ID_PREFIX: &'static str = "h_";

    /// Paths a sort mapping may point at for habits.
    pub const ORDER_PATHS: &'static [&'static str] = &[
        "Id",
        "Name",
        "Description",
        "Type",
        "Frequency.Type",
        "Frequency.TimesPerPeriod",
        "Target.Value",
        "Target.Unit",
        "Status",
        "IsArchived",
        "EndDate",
        "CreatedAtUtc",
        "UpdatedAtUtc",
        "LastCompletedAtUtc",
    ];

    pub fn new_id() -> String {
        format!("{}{}", Self::ID_PREFIX, Uuid::now_v7())
    }

    pub fn order_key(&self, path: &str) -> Option<OrderKey> {
        let key = match path {
            "Id" => OrderKey::Text(self.id.clone()),
            "Name" => OrderKey::Text(self.name.clone()),
            "Description" => OrderKey::OptText(self.description.clone()),
            "Type" => OrderKey::Int(self.habit_type.as_i32().into()),
            "Frequency.Type" => OrderKey::Int(self.frequency.frequency_type.as_i32().into()),
            "Frequency.TimesPerPeriod" => OrderKey::Int(self.frequency.times_per_period.into()),
            "Target.Value" => OrderKey::Int(self.target.value.into()),
            "Target.Unit" => OrderKey::Text(self.target.unit.clone()),
            "Status" => OrderKey::Int(self.status.as_i32().into()),
            "IsArchived" => OrderKey::Bool(self.is_archived),
            "EndDate" => OrderKey::Date(self.end_date),
            "CreatedAtUtc" => OrderKey::Time(Some(self.created_at_utc)),
            "UpdatedAtUtc" => OrderKey::Time(self.updated_at_utc),
            "LastCompletedAtUtc" => OrderKey::Time(self.last_completed_at_utc),
            _ => return None,
        };
        Some(key)
    }

    /// Case-insensitive match on name or description; `needle` is already lowercased.
    pub fn matches_search(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn enums_parse_by_name_or_number() {
        assert_eq!(HabitType::from_str("Measurable"), Ok(HabitType::Measurable));
        assert_eq!(HabitType::from_str("2"), Ok(HabitType::Measurable));
        assert_eq!(HabitStatus::from_str(" ongoing "), Ok(HabitStatus::Ongoing));
        assert_eq!(FrequencyType::try_from(3), Ok(FrequencyType::Monthly));

        let err = HabitStatus::from_str("paused").unwrap_err();
        assert_eq!(err.to_string(), "'paused' is not a valid habit status");
        assert!(HabitType::from_str("7").is_err());
    }

    #[test]
    fn enums_serialize_camel_case() {
        assert_eq!(serde_json::to_value(HabitType::Binary).unwrap(), "binary");
        assert_eq!(serde_json::to_value(FrequencyType::Weekly).unwrap(), "weekly");
        let parsed: HabitStatus = serde_json::from_value(serde_json::json!("completed")).unwrap();
        assert_eq!(parsed, HabitStatus::Completed);
    }

    #[test]
    fn every_order_path_has_a_key() {
        let habit = Habit {
            id: Habit::new_id(),
            name: "Read".into(),
            description: None,
            habit_type: HabitType::Binary,
            frequency: Frequency { frequency_type: FrequencyType::Daily, times_per_period: 1 },
            target: Target { value: 1, unit: "sessions".into() },
            status: HabitStatus::Ongoing,
            is_archived: false,
            end_date: None,
            milestone: None,
            created_at_utc: Utc::now(),
            updated_at_utc: None,
            last_completed_at_utc: None,
        };

        assert!(habit.id.starts_with("h_"));
        for path in Habit::ORDER_PATHS {
            assert!(habit.order_key(path).is_some(), "{}", path);
        }
        assert!(habit.order_key("name").is_none());
    }

    #[test]
    fn ids_are_prefixed_version_seven_uuids() {
        let id = Habit::new_id();
        let uuid = Uuid::parse_str(id.strip_prefix(Habit::ID_PREFIX).unwrap()).unwrap();
        assert_eq!(uuid.get_version_num(), 7);
    }
}
