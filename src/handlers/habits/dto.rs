use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;

use crate::database::models::{Frequency, Habit, HabitStatus, HabitType, Milestone, Target};
use crate::error::ApiError;
use crate::shaping::{Field, Shape};
use crate::sorting::{SortMapping, SortMappingDefinition};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitDto {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
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

impl From<&Habit> for HabitDto {
    fn from(habit: &Habit) -> Self {
        Self {
            id: habit.id.clone(),
            name: habit.name.clone(),
            description: habit.description.clone(),
            habit_type: habit.habit_type,
            frequency: habit.frequency.clone(),
            target: habit.target.clone(),
            status: habit.status,
            is_archived: habit.is_archived,
            end_date: habit.end_date,
            milestone: habit.milestone.clone(),
            created_at_utc: habit.created_at_utc,
            updated_at_utc: habit.updated_at_utc,
            last_completed_at_utc: habit.last_completed_at_utc,
        }
    }
}

impl Shape for HabitDto {
    fn fields() -> Vec<Field<Self>> {
        type F = Field<HabitDto>;
        vec![
            F::new("id", |h| json!(h.id)),
            F::new("name", |h| json!(h.name)),
            F::new("description", |h| json!(h.description)),
            F::new("type", |h| json!(h.habit_type)),
            F::new("frequency", |h| json!(h.frequency)),
            F::new("target", |h| json!(h.target)),
            F::new("status", |h| json!(h.status)),
            F::new("isArchived", |h| json!(h.is_archived)),
            F::new("endDate", |h| json!(h.end_date)),
            F::new("milestone", |h| json!(h.milestone)),
            F::new("createdAtUtc", |h| json!(h.created_at_utc)),
            F::new("updatedAtUtc", |h| json!(h.updated_at_utc)),
            F::new("lastCompletedAtUtc", |h| json!(h.last_completed_at_utc)),
        ]
    }
}

/// Single-habit view with tag names (API version 1).
#[derive(Debug, Clone, PartialEq)]
pub struct HabitWithTagsDto {
    pub habit: HabitDto,
    pub tags: Vec<String>,
}

impl Shape for HabitWithTagsDto {
    fn fields() -> Vec<Field<Self>> {
        type F = Field<HabitWithTagsDto>;
        vec![
            F::new("id", |h| json!(h.habit.id)),
            F::new("name", |h| json!(h.habit.name)),
            F::new("description", |h| json!(h.habit.description)),
            F::new("type", |h| json!(h.habit.habit_type)),
            F::new("frequency", |h| json!(h.habit.frequency)),
            F::new("target", |h| json!(h.habit.target)),
            F::new("status", |h| json!(h.habit.status)),
            F::new("isArchived", |h| json!(h.habit.is_archived)),
            F::new("endDate", |h| json!(h.habit.end_date)),
            F::new("milestone", |h| json!(h.habit.milestone)),
            F::new("createdAtUtc", |h| json!(h.habit.created_at_utc)),
            F::new("updatedAtUtc", |h| json!(h.habit.updated_at_utc)),
            F::new("lastCompletedAtUtc", |h| json!(h.habit.last_completed_at_utc)),
            F::new("tags", |h| json!(h.tags)),
        ]
    }
}

/// Version 2 of the single-habit view: timestamps lose their `Utc` suffix.
#[derive(Debug, Clone, PartialEq)]
pub struct HabitWithTagsDtoV2(pub HabitWithTagsDto);

impl Shape for HabitWithTagsDtoV2 {
    fn fields() -> Vec<Field<Self>> {
        type F = Field<HabitWithTagsDtoV2>;
        vec![
            F::new("id", |h| json!(h.0.habit.id)),
            F::new("name", |h| json!(h.0.habit.name)),
            F::new("description", |h| json!(h.0.habit.description)),
            F::new("type", |h| json!(h.0.habit.habit_type)),
            F::new("frequency", |h| json!(h.0.habit.frequency)),
            F::new("target", |h| json!(h.0.habit.target)),
            F::new("status", |h| json!(h.0.habit.status)),
            F::new("isArchived", |h| json!(h.0.habit.is_archived)),
            F::new("endDate", |h| json!(h.0.habit.end_date)),
            F::new("milestone", |h| json!(h.0.habit.milestone)),
            F::new("createdAt", |h| json!(h.0.habit.created_at_utc)),
            F::new("updatedAt", |h| json!(h.0.habit.updated_at_utc)),
            F::new("lastCompletedAt", |h| json!(h.0.habit.last_completed_at_utc)),
            F::new("tags", |h| json!(h.0.tags)),
        ]
    }
}

/// Sortable habit fields and the entity paths they order by.
pub fn sort_mappings() -> SortMappingDefinition<HabitDto, Habit> {
    SortMappingDefinition::new([
        SortMapping::new("name", "Name"),
        SortMapping::new("description", "Description"),
        SortMapping::new("type", "Type"),
        SortMapping::new("frequency.type", "Frequency.Type"),
        SortMapping::new("frequency.timesPerPeriod", "Frequency.TimesPerPeriod"),
        SortMapping::new("target.value", "Target.Value"),
        SortMapping::new("target.unit", "Target.Unit"),
        SortMapping::new("status", "Status"),
        SortMapping::new("endDate", "EndDate"),
        SortMapping::new("createdAtUtc", "CreatedAtUtc"),
        SortMapping::new("updatedAtUtc", "UpdatedAtUtc"),
        SortMapping::new("lastCompletedAtUtc", "LastCompletedAtUtc"),
    ])
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHabitDto {
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub habit_type: HabitType,
    pub frequency: Frequency,
    pub target: Target,
    pub end_date: Option<NaiveDate>,
    pub milestone: Option<Milestone>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHabitDto {
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub habit_type: HabitType,
    pub frequency: Frequency,
    pub target: Target,
    pub end_date: Option<NaiveDate>,
    pub milestone: Option<UpdateMilestoneDto>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMilestoneDto {
    pub target: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertHabitTagsDto {
    pub tag_ids: Vec<String>,
}

pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_DESCRIPTION_LENGTH: usize = 500;
pub const MAX_UNIT_LENGTH: usize = 100;

/// Field-level checks shared by create, update and patch.
pub fn validate_habit_fields(
    name: &str,
    description: Option<&str>,
    frequency: Option<&Frequency>,
    target: Option<&Target>,
) -> Result<(), ApiError> {
    let mut errors = HashMap::new();

    let name_length = name.trim().chars().count();
    if name_length < 3 || name_length > MAX_NAME_LENGTH {
        errors.insert("name".to_string(), format!("must be between 3 and {} characters", MAX_NAME_LENGTH));
    }
    if description.is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_LENGTH) {
        errors.insert(
            "description".to_string(),
            format!("must be at most {} characters", MAX_DESCRIPTION_LENGTH),
        );
    }
    if let Some(frequency) = frequency {
        if frequency.times_per_period <= 0 {
            errors.insert("frequency.timesPerPeriod".to_string(), "must be greater than 0".to_string());
        }
    }
    if let Some(target) = target {
        if target.value <= 0 {
            errors.insert("target.value".to_string(), "must be greater than 0".to_string());
        }
        let unit_length = target.unit.trim().chars().count();
        if unit_length == 0 || unit_length > MAX_UNIT_LENGTH {
            errors.insert("target.unit".to_string(), format!("must be between 1 and {} characters", MAX_UNIT_LENGTH));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation_error("One or more validation errors occurred", Some(errors)))
    }
}

impl CreateHabitDto {
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_habit_fields(&self.name, self.description.as_deref(), Some(&self.frequency), Some(&self.target))
    }

    pub fn into_entity(self, now: DateTime<Utc>) -> Habit {
        Habit {
            id: Habit::new_id(),
            name: self.name,
            description: self.description,
            habit_type: self.habit_type,
            frequency: self.frequency,
            target: self.target,
            status: HabitStatus::Ongoing,
            is_archived: false,
            end_date: self.end_date,
            milestone: self.milestone,
            created_at_utc: now,
            updated_at_utc: None,
            last_completed_at_utc: None,
        }
    }
}

impl UpdateHabitDto {
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_habit_fields(&self.name, self.description.as_deref(), Some(&self.frequency), Some(&self.target))
    }

    /// Milestone progress survives an update; only its target changes.
    pub fn apply_to(self, habit: &mut Habit, now: DateTime<Utc>) {
        habit.name = self.name;
        habit.description = self.description;
        habit.habit_type = self.habit_type;
        habit.end_date = self.end_date;
        habit.frequency = self.frequency;
        habit.target = self.target;

        if let Some(update) = self.milestone {
            match habit.milestone.as_mut() {
                Some(milestone) => milestone.target = update.target,
                None => {
                    habit.milestone = Some(Milestone {
                        target: update.target,
                        current: 0,
                    })
                }
            }
        }

        habit.updated_at_utc = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::FrequencyType;
    use crate::shaping::FieldTable;

    fn create_dto() -> CreateHabitDto {
        serde_json::from_value(json!({
            "name": "Read books",
            "type": "measurable",
            "frequency": { "type": "daily", "timesPerPeriod": 1 },
            "target": { "value": 30, "unit": "pages" },
            "milestone": { "target": 100 }
        }))
        .unwrap()
    }

    #[test]
    fn create_dto_builds_ongoing_habit() {
        let dto = create_dto();
        dto.validate().unwrap();

        let habit = dto.into_entity(Utc::now());
        assert!(habit.id.starts_with("h_"));
        assert_eq!(habit.status, HabitStatus::Ongoing);
        assert_eq!(habit.frequency.frequency_type, FrequencyType::Daily);
        assert_eq!(habit.milestone, Some(Milestone { target: 100, current: 0 }));
    }

    #[test]
    fn validation_reports_each_field() {
        let mut dto = create_dto();
        dto.name = "ab".into();
        dto.target.value = 0;

        let json = dto.validate().unwrap_err().to_json();
        assert!(json["field_errors"]["name"].is_string());
        assert!(json["field_errors"]["target.value"].is_string());
        assert!(json["field_errors"].get("frequency.timesPerPeriod").is_none());
    }

    #[test]
    fn update_keeps_milestone_progress() {
        let mut habit = create_dto().into_entity(Utc::now());
        habit.milestone = Some(Milestone { target: 100, current: 40 });

        let update: UpdateHabitDto = serde_json::from_value(json!({
            "name": "Read more books",
            "type": "measurable",
            "frequency": { "type": "weekly", "timesPerPeriod": 3 },
            "target": { "value": 50, "unit": "pages" },
            "milestone": { "target": 200 }
        }))
        .unwrap();
        update.apply_to(&mut habit, Utc::now());

        assert_eq!(habit.name, "Read more books");
        assert_eq!(habit.milestone, Some(Milestone { target: 200, current: 40 }));
        assert!(habit.updated_at_utc.is_some());
    }

    #[test]
    fn v2_view_renames_timestamps_only() {
        let v1 = FieldTable::<HabitWithTagsDto>::of().unwrap();
        let v2 = FieldTable::<HabitWithTagsDtoV2>::of().unwrap();
        assert_eq!(v1.len(), v2.len());
        assert!(v1.declared_name("createdAtUtc").is_some());
        assert!(v2.declared_name("createdAtUtc").is_none());
        assert_eq!(v2.declared_name("CREATEDAT"), Some("createdAt"));
    }

    #[test]
    fn mappings_point_at_known_entity_paths() {
        for mapping in sort_mappings().mappings() {
            assert!(Habit::ORDER_PATHS.contains(&mapping.physical_path), "{:?}", mapping);
        }
    }
}
