use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, put},
    Router,
};
use serde_json::json;
use std::sync::Arc;
use url::Url;

use crate::database::{models::Habit, models::Tag, Store};
use crate::handlers::habits::dto::{HabitDto, HabitWithTagsDto, HabitWithTagsDtoV2};
use crate::handlers::tags::dto::TagDto;
use crate::handlers::{habits, tags};
use crate::links::LinkService;
use crate::negotiation::ApiVersion;
use crate::shaping::{FieldTableRegistry, ShapeError};
use crate::sorting::{SortError, SortMappingRegistry};

/// Everything a handler needs, built once during startup.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub sort_mappings: Arc<SortMappingRegistry>,
    pub field_tables: Arc<FieldTableRegistry>,
    pub base_url: Option<Url>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, base_url: Option<Url>) -> Result<Self, SortError> {
        Ok(Self {
            store,
            sort_mappings: Arc::new(sort_mapping_registry()?),
            field_tables: Arc::new(FieldTableRegistry::new()),
            base_url,
        })
    }

    pub fn links(&self, version: ApiVersion) -> LinkService {
        LinkService::new(self.base_url.clone(), version)
    }

    /// Build every response field table now so a bad declaration fails startup.
    pub fn warm_field_tables(&self) -> Result<(), ShapeError> {
        self.field_tables.table_for::<HabitDto>()?;
        self.field_tables.table_for::<HabitWithTagsDto>()?;
        self.field_tables.table_for::<HabitWithTagsDtoV2>()?;
        self.field_tables.table_for::<TagDto>()?;
        Ok(())
    }
}

pub fn sort_mapping_registry() -> Result<SortMappingRegistry, SortError> {
    let mut registry = SortMappingRegistry::new();
    registry
        .register::<HabitDto, Habit>(habits::dto::sort_mappings())?
        .register::<TagDto, Tag>(tags::dto::sort_mappings())?;
    Ok(registry)
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(habit_routes())
        .merge(tag_routes())
        .with_state(state)
}

fn habit_routes() -> Router<AppState> {
    Router::new()
        .route("/habits", get(habits::collection_get).post(habits::collection_post))
        .route(
            "/habits/:id",
            get(habits::record_get)
                .put(habits::record_put)
                .patch(habits::record_patch)
                .delete(habits::record_delete),
        )
        .route("/habits/:habit_id/tags", put(habits::tags_put))
        .route("/habits/:habit_id/tags/:tag_id", axum::routing::delete(habits::tags_delete))
}

fn tag_routes() -> Router<AppState> {
    Router::new()
        .route("/tags", get(tags::collection_get).post(tags::collection_post))
        .route(
            "/tags/:id",
            get(tags::record_get).put(tags::record_put).delete(tags::record_delete),
        )
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "store": state.store.backend(),
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "store": state.store.backend(),
                    "error": "store unavailable",
                })),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;

    #[test]
    fn registry_holds_both_pairs() {
        let registry = sort_mapping_registry().unwrap();
        assert_eq!(registry.len(), 2);
        assert!(!registry.mappings_for::<HabitDto, Habit>().is_empty());
        assert!(!registry.mappings_for::<TagDto, Tag>().is_empty());
    }

    #[test]
    fn field_tables_warm_up() {
        let state = AppState::new(Arc::new(MemoryStore::new()), None).unwrap();
        state.warm_field_tables().unwrap();
        assert_eq!(state.field_tables.len(), 4);
    }
}
