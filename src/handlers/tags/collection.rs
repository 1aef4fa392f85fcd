use axum::extract::{Query, State};
use chrono::Utc;
use serde::Deserialize;

use super::dto::{CreateTagDto, TagDto, TagsCollectionDto};
use super::links::{tag_links, tags_collection_links};
use crate::app::AppState;
use crate::database::models::Tag;
use crate::error::ApiError;
use crate::handlers::habits::collection::FieldsQuery;
use crate::links::{rel, LinkDto, Operation};
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::negotiation::Negotiated;
use crate::shaping::ShapedObject;
use crate::sorting::SortOrder;

#[derive(Debug, Default, Deserialize)]
pub struct TagsQuery {
    pub sort: Option<String>,
    pub fields: Option<String>,
}

/// GET /tags - All tags, sorted and shaped
pub async fn get(
    State(state): State<AppState>,
    negotiated: Negotiated,
    Query(query): Query<TagsQuery>,
) -> ApiResult<TagsCollectionDto> {
    let order = SortOrder::translate(
        query.sort.as_deref(),
        state.sort_mappings.mappings_for::<TagDto, Tag>(),
    )?;
    let fields = query.fields.as_deref();
    let table = state.field_tables.table_for::<TagDto>()?;
    table.validate(fields)?;

    let tags = state.store.tags(&order).await?;
    let dtos: Vec<TagDto> = tags.iter().map(TagDto::from).collect();

    let links = state.links(negotiated.version);
    let inject = |dto: &TagDto| tag_links(&links, &dto.id, fields);
    let injector: Option<&dyn Fn(&TagDto) -> Vec<LinkDto>> = if negotiated.include_links {
        Some(&inject)
    } else {
        None
    };
    let items = table.shape_many(&dtos, fields, injector)?;

    let collection = TagsCollectionDto {
        items,
        links: negotiated
            .include_links
            .then(|| tags_collection_links(&links, query.sort.as_deref(), fields)),
    };

    Ok(ApiResponse::success(collection).media_type(negotiated.response_media_type()))
}

/// POST /tags - Create a tag; names are unique
pub async fn post(
    State(state): State<AppState>,
    negotiated: Negotiated,
    Query(query): Query<FieldsQuery>,
    ApiJson(payload): ApiJson<CreateTagDto>,
) -> ApiResult<ShapedObject> {
    let fields = query.fields.as_deref();
    let table = state.field_tables.table_for::<TagDto>()?;
    table.validate(fields)?;
    payload.validate()?;

    if state.store.tag_name_exists(&payload.name, None).await? {
        return Err(ApiError::conflict(format!("The tag '{}' already exists", payload.name)));
    }

    let tag = payload.into_entity(Utc::now());
    state.store.insert_tag(&tag).await?;
    tracing::info!("Created tag {} ({})", tag.id, tag.name);

    let dto = TagDto::from(&tag);
    let links = state.links(negotiated.version);
    let location = links.create(Operation::GetTag, rel::SELF, &[("id", Some(dto.id.clone()))]).href;

    let mut shaped = table.shape(&dto, fields)?;
    if negotiated.include_links {
        shaped.set_links(tag_links(&links, &dto.id, fields));
    }

    Ok(ApiResponse::created(shaped, location).media_type(negotiated.response_media_type()))
}
