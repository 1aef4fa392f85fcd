use axum::extract::{Path, State};
use chrono::Utc;
use std::collections::HashSet;

use super::dto::UpsertHabitTagsDto;
use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};

/// PUT /habits/:habit_id/tags - Make the given tags the habit's tag set
pub async fn put(
    State(state): State<AppState>,
    Path(habit_id): Path<String>,
    ApiJson(payload): ApiJson<UpsertHabitTagsDto>,
) -> ApiResult<()> {
    if state.store.habit(&habit_id).await?.is_none() {
        return Err(ApiError::not_found(format!("Habit '{}' not found", habit_id)));
    }

    let mut seen = HashSet::new();
    let requested: Vec<String> = payload
        .tag_ids
        .into_iter()
        .filter(|id| seen.insert(id.clone()))
        .collect();

    let current: HashSet<String> = state.store.habit_tag_ids(&habit_id).await?.into_iter().collect();
    if current == seen {
        return Ok(ApiResponse::no_content());
    }

    if state.store.count_tags(&requested).await? != requested.len() {
        return Err(ApiError::bad_request("One or more tag ids are invalid."));
    }

    state.store.replace_habit_tags(&habit_id, &requested, Utc::now()).await?;
    tracing::info!("Habit {} now has {} tags", habit_id, requested.len());

    Ok(ApiResponse::no_content())
}

/// DELETE /habits/:habit_id/tags/:tag_id - Remove one tag from a habit
pub async fn delete(
    State(state): State<AppState>,
    Path((habit_id, tag_id)): Path<(String, String)>,
) -> ApiResult<()> {
    if !state.store.delete_habit_tag(&habit_id, &tag_id).await? {
        return Err(ApiError::not_found(format!(
            "Tag '{}' is not attached to habit '{}'",
            tag_id, habit_id
        )));
    }
    Ok(ApiResponse::no_content())
}
