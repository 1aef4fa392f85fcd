use axum::extract::{Query, State};
use chrono::Utc;
use serde::Deserialize;

use super::dto::{CreateHabitDto, HabitDto};
use super::links::habit_links;
use crate::app::AppState;
use crate::database::models::Habit;
use crate::database::HabitFilter;
use crate::handlers::utils::{normalize_search, page_request, parse_filter};
use crate::links::{rel, LinkDto, Operation};
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::negotiation::Negotiated;
use crate::pagination::{compose, Navigation, PaginationResult};
use crate::shaping::ShapedObject;
use crate::sorting::SortOrder;

#[derive(Debug, Default, Deserialize)]
pub struct HabitsQuery {
    pub q: Option<String>,
    #[serde(rename = "type")]
    pub habit_type: Option<String>,
    pub status: Option<String>,
    pub sort: Option<String>,
    pub fields: Option<String>,
    pub page: Option<String>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FieldsQuery {
    pub fields: Option<String>,
}

/// GET /habits - Paged, filtered, sorted and shaped habits
pub async fn get(
    State(state): State<AppState>,
    negotiated: Negotiated,
    Query(query): Query<HabitsQuery>,
) -> ApiResult<PaginationResult<ShapedObject>> {
    // Reject bad input before the store sees anything
    let order = SortOrder::translate(
        query.sort.as_deref(),
        state.sort_mappings.mappings_for::<HabitDto, Habit>(),
    )?;
    let fields = query.fields.as_deref();
    let table = state.field_tables.table_for::<HabitDto>()?;
    table.validate(fields)?;
    let search = normalize_search(query.q.as_deref());
    let filter = HabitFilter {
        search: search.clone(),
        habit_type: parse_filter("type", query.habit_type.as_deref())?,
        status: parse_filter("status", query.status.as_deref())?,
    };
    let page = page_request(query.page.as_deref(), query.page_size.as_deref())?;

    let result = state.store.habits_page(&filter, &order, page).await?;
    let dtos: Vec<HabitDto> = result.items.iter().map(HabitDto::from).collect();

    let links = state.links(negotiated.version);
    let inject = |dto: &HabitDto| habit_links(&links, &dto.id, fields);
    let injector: Option<&dyn Fn(&HabitDto) -> Vec<LinkDto>> = if negotiated.include_links {
        Some(&inject)
    } else {
        None
    };
    let items = table.shape_many(&dtos, fields, injector)?;

    let navigation = negotiated.include_links.then(|| Navigation {
        links: &links,
        list: Operation::GetHabits,
        create: Operation::CreateHabit,
        query: vec![
            ("fields", query.fields.clone()),
            ("q", search),
            ("sort", query.sort.clone()),
            ("type", query.habit_type.clone()),
            ("status", query.status.clone()),
        ],
    });

    let envelope = compose(items, page.page, page.page_size, result.total_count, navigation.as_ref());
    Ok(ApiResponse::success(envelope).media_type(negotiated.response_media_type()))
}

/// POST /habits - Create a habit
pub async fn post(
    State(state): State<AppState>,
    negotiated: Negotiated,
    Query(query): Query<FieldsQuery>,
    ApiJson(payload): ApiJson<CreateHabitDto>,
) -> ApiResult<ShapedObject> {
    let fields = query.fields.as_deref();
    let table = state.field_tables.table_for::<HabitDto>()?;
    table.validate(fields)?;
    payload.validate()?;

    let habit = payload.into_entity(Utc::now());
    state.store.insert_habit(&habit).await?;
    tracing::info!("Created habit {}", habit.id);

    let dto = HabitDto::from(&habit);
    let links = state.links(negotiated.version);
    let location = links.create(Operation::GetHabit, rel::SELF, &[("id", Some(dto.id.clone()))]).href;

    let mut shaped = table.shape(&dto, fields)?;
    if negotiated.include_links {
        shaped.set_links(habit_links(&links, &dto.id, fields));
    }

    Ok(ApiResponse::created(shaped, location).media_type(negotiated.response_media_type()))
}
