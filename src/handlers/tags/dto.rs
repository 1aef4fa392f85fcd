use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;

use crate::database::models::Tag;
use crate::error::ApiError;
use crate::links::LinkDto;
use crate::shaping::{Field, Shape, ShapedObject};
use crate::sorting::{SortMapping, SortMappingDefinition};

#[derive(Debug, Clone, PartialEq)]
pub struct TagDto {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at_utc: DateTime<Utc>,
    pub updated_at_utc: Option<DateTime<Utc>>,
}

impl From<&Tag> for TagDto {
    fn from(tag: &Tag) -> Self {
        Self {
            id: tag.id.clone(),
            name: tag.name.clone(),
            description: tag.description.clone(),
            created_at_utc: tag.created_at_utc,
            updated_at_utc: tag.updated_at_utc,
        }
    }
}

impl Shape for TagDto {
    fn fields() -> Vec<Field<Self>> {
        type F = Field<TagDto>;
        vec![
            F::new("id", |t| json!(t.id)),
            F::new("name", |t| json!(t.name)),
            F::new("description", |t| json!(t.description)),
            F::new("createdAtUtc", |t| json!(t.created_at_utc)),
            F::new("updatedAtUtc", |t| json!(t.updated_at_utc)),
        ]
    }
}

pub fn sort_mappings() -> SortMappingDefinition<TagDto, Tag> {
    SortMappingDefinition::new([
        SortMapping::new("name", "Name"),
        SortMapping::new("description", "Description"),
        SortMapping::new("createdAtUtc", "CreatedAtUtc"),
        SortMapping::new("updatedAtUtc", "UpdatedAtUtc"),
    ])
}

/// Unpaged tag list.
#[derive(Debug, Clone, Serialize)]
pub struct TagsCollectionDto {
    pub items: Vec<ShapedObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<LinkDto>>,
}

/// Body of both create and update.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagPayload {
    pub name: String,
    pub description: Option<String>,
}

pub type CreateTagDto = TagPayload;
pub type UpdateTagDto = TagPayload;

pub const MAX_NAME_LENGTH: usize = 50;
pub const MAX_DESCRIPTION_LENGTH: usize = 500;

impl TagPayload {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = HashMap::new();

        let name_length = self.name.trim().chars().count();
        if name_length < 3 || name_length > MAX_NAME_LENGTH {
            errors.insert("name".to_string(), format!("must be between 3 and {} characters", MAX_NAME_LENGTH));
        }
        if self.description.as_deref().is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_LENGTH) {
            errors.insert(
                "description".to_string(),
                format!("must be at most {} characters", MAX_DESCRIPTION_LENGTH),
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error("One or more validation errors occurred", Some(errors)))
        }
    }

    pub fn into_entity(self, now: DateTime<Utc>) -> Tag {
        Tag {
            id: Tag::new_id(),
            name: self.name,
            description: self.description,
            created_at_utc: now,
            updated_at_utc: None,
        }
    }

    pub fn apply_to(self, tag: &mut Tag, now: DateTime<Utc>) {
        tag.name = self.name;
        tag.description = self.description;
        tag.updated_at_utc = Some(now);
    }
}
