use axum::extract::{Path, Query, State};
use chrono::Utc;

use super::dto::{TagDto, UpdateTagDto};
use super::links::tag_links;
use crate::app::AppState;
use crate::database::models::Tag;
use crate::error::ApiError;
use crate::handlers::habits::collection::FieldsQuery;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::negotiation::Negotiated;
use crate::shaping::ShapedObject;

async fn find_tag(state: &AppState, id: &str) -> Result<Tag, ApiError> {
    state
        .store
        .tag(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Tag '{}' not found", id)))
}

/// GET /tags/:id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
    negotiated: Negotiated,
    Query(query): Query<FieldsQuery>,
) -> ApiResult<ShapedObject> {
    let fields = query.fields.as_deref();
    let table = state.field_tables.table_for::<TagDto>()?;
    let selection = table.select(fields)?;

    let tag = find_tag(&state, &id).await?;
    let mut shaped = selection.shape(&TagDto::from(&tag));
    if negotiated.include_links {
        shaped.set_links(tag_links(&state.links(negotiated.version), &tag.id, fields));
    }

    Ok(ApiResponse::success(shaped).media_type(negotiated.response_media_type()))
}

/// PUT /tags/:id - Rename or re-describe a tag
pub async fn put(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<UpdateTagDto>,
) -> ApiResult<()> {
    payload.validate()?;

    let mut tag = find_tag(&state, &id).await?;
    if state.store.tag_name_exists(&payload.name, Some(id.as_str())).await? {
        return Err(ApiError::conflict(format!("The tag '{}' already exists", payload.name)));
    }

    payload.apply_to(&mut tag, Utc::now());
    state.store.update_tag(&tag).await?;

    Ok(ApiResponse::no_content())
}

/// DELETE /tags/:id - Also detaches the tag from every habit
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    if !state.store.delete_tag(&id).await? {
        return Err(ApiError::not_found(format!("Tag '{}' not found", id)));
    }
    tracing::info!("Deleted tag {}", id);
    Ok(ApiResponse::no_content())
}
