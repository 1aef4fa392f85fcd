use axum::extract::{Path, Query, State};
use chrono::Utc;
use serde_json::Value;

use super::collection::FieldsQuery;
use super::dto::{validate_habit_fields, HabitDto, HabitWithTagsDto, HabitWithTagsDtoV2, UpdateHabitDto};
use super::links::habit_links;
use crate::app::AppState;
use crate::database::models::Habit;
use crate::error::ApiError;
use crate::handlers::utils::{apply_patch, PatchOperation};
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::negotiation::{ApiVersion, Negotiated};
use crate::shaping::ShapedObject;

async fn find_habit(state: &AppState, id: &str) -> Result<Habit, ApiError> {
    state
        .store
        .habit(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Habit '{}' not found", id)))
}

/// GET /habits/:id - One habit with its tag names; shape depends on the API version
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
    negotiated: Negotiated,
    Query(query): Query<FieldsQuery>,
) -> ApiResult<ShapedObject> {
    let fields = query.fields.as_deref();

    // Validate the selection against the version's table before loading
    let mut shaped = match negotiated.version {
        ApiVersion::V1 => {
            let table = state.field_tables.table_for::<HabitWithTagsDto>()?;
            table.validate(fields)?;
            let view = load_view(&state, &id).await?;
            table.shape(&view, fields)?
        }
        ApiVersion::V2 => {
            let table = state.field_tables.table_for::<HabitWithTagsDtoV2>()?;
            table.validate(fields)?;
            let view = HabitWithTagsDtoV2(load_view(&state, &id).await?);
            table.shape(&view, fields)?
        }
    };

    if negotiated.include_links {
        let links = state.links(negotiated.version);
        shaped.set_links(habit_links(&links, &id, fields));
    }

    Ok(ApiResponse::success(shaped).media_type(negotiated.response_media_type()))
}

async fn load_view(state: &AppState, id: &str) -> Result<HabitWithTagsDto, ApiError> {
    let habit = find_habit(state, id).await?;
    let tags = state.store.habit_tag_names(id).await?;
    Ok(HabitWithTagsDto {
        habit: HabitDto::from(&habit),
        tags,
    })
}

/// PUT /habits/:id - Replace a habit's editable fields
pub async fn put(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<UpdateHabitDto>,
) -> ApiResult<()> {
    payload.validate()?;

    let mut habit = find_habit(&state, &id).await?;
    payload.apply_to(&mut habit, Utc::now());
    state.store.update_habit(&habit).await?;

    Ok(ApiResponse::no_content())
}

/// PATCH /habits/:id - JSON Patch; only `name` and `description` are persisted
pub async fn patch(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(operations): ApiJson<Vec<PatchOperation>>,
) -> ApiResult<()> {
    let mut habit = find_habit(&state, &id).await?;

    let mut document = serde_json::to_value(HabitDto::from(&habit)).map_err(|e| {
        tracing::error!("Failed to serialize habit {}: {}", id, e);
        ApiError::internal_server_error("An error occurred while processing your request")
    })?;
    apply_patch(&mut document, &operations)?;

    let name = match document.get("name") {
        Some(Value::String(name)) => name.clone(),
        _ => return Err(ApiError::invalid_field("name", "must be a string")),
    };
    let description = match document.get("description") {
        None | Some(Value::Null) => None,
        Some(Value::String(description)) => Some(description.clone()),
        Some(other) => {
            return Err(ApiError::invalid_field(
                "description",
                format!("must be a string, got {}", other),
            ))
        }
    };
    validate_habit_fields(&name, description.as_deref(), None, None)?;

    habit.name = name;
    habit.description = description;
    habit.updated_at_utc = Some(Utc::now());
    state.store.update_habit(&habit).await?;

    Ok(ApiResponse::no_content())
}

/// DELETE /habits/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    if !state.store.delete_habit(&id).await? {
        return Err(ApiError::not_found(format!("Habit '{}' not found", id)));
    }
    tracing::info!("Deleted habit {}", id);
    Ok(ApiResponse::no_content())
}
