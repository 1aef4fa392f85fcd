use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::debug;

use super::manager::{DatabaseError, DatabaseManager};
use super::models::{Frequency, Habit, Milestone, Tag, Target};
use super::store::{HabitFilter, Page, PageRequest, Store};
use crate::sorting::SortInstruction;

/// Order path -> column. The only way a sort reaches SQL.
const HABIT_COLUMNS: &[(&str, &str)] = &[
    ("Id", "id"),
    ("Name", "name"),
    ("Description", "description"),
    ("Type", "type"),
    ("Frequency.Type", "frequency_type"),
    ("Frequency.TimesPerPeriod", "frequency_times_per_period"),
    ("Target.Value", "target_value"),
    ("Target.Unit", "target_unit"),
    ("Status", "status"),
    ("IsArchived", "is_archived"),
    ("EndDate", "end_date"),
    ("CreatedAtUtc", "created_at_utc"),
    ("UpdatedAtUtc", "updated_at_utc"),
    ("LastCompletedAtUtc", "last_completed_at_utc"),
];

const TAG_COLUMNS: &[(&str, &str)] = &[
    ("Id", "id"),
    ("Name", "name"),
    ("Description", "description"),
    ("CreatedAtUtc", "created_at_utc"),
    ("UpdatedAtUtc", "updated_at_utc"),
];

#[derive(Debug, FromRow)]
struct HabitRow {
    id: String,
    name: String,
    description: Option<String>,
    #[sqlx(rename = "type")]
    habit_type: i32,
    frequency_type: i32,
    frequency_times_per_period: i32,
    target_value: i32,
    target_unit: String,
    status: i32,
    is_archived: bool,
    end_date: Option<NaiveDate>,
    milestone_target: Option<i32>,
    milestone_current: Option<i32>,
    created_at_utc: DateTime<Utc>,
    updated_at_utc: Option<DateTime<Utc>>,
    last_completed_at_utc: Option<DateTime<Utc>>,
}

impl TryFrom<HabitRow> for Habit {
    type Error = DatabaseError;

    fn try_from(row: HabitRow) -> Result<Self, Self::Error> {
        let corrupt = |e: super::models::EnumParseError| DatabaseError::QueryError(format!("habit {}: {}", row.id, e));
        Ok(Habit {
            habit_type: row.habit_type.try_into().map_err(corrupt)?,
            frequency: Frequency {
                frequency_type: row.frequency_type.try_into().map_err(corrupt)?,
                times_per_period: row.frequency_times_per_period,
            },
            status: row.status.try_into().map_err(corrupt)?,
            target: Target {
                value: row.target_value,
                unit: row.target_unit,
            },
            milestone: row.milestone_target.map(|target| Milestone {
                target,
                current: row.milestone_current.unwrap_or_default(),
            }),
            id: row.id,
            name: row.name,
            description: row.description,
            is_archived: row.is_archived,
            end_date: row.end_date,
            created_at_utc: row.created_at_utc,
            updated_at_utc: row.updated_at_utc,
            last_completed_at_utc: row.last_completed_at_utc,
        })
    }
}

#[derive(Debug, FromRow)]
struct TagRow {
    id: String,
    name: String,
    description: Option<String>,
    created_at_utc: DateTime<Utc>,
    updated_at_utc: Option<DateTime<Utc>>,
}

impl From<TagRow> for Tag {
    fn from(row: TagRow) -> Self {
        Tag {
            id: row.id,
            name: row.name,
            description: row.description,
            created_at_utc: row.created_at_utc,
            updated_at_utc: row.updated_at_utc,
        }
    }
}

fn column_for(columns: &[(&str, &'static str)], path: &str) -> Result<&'static str, DatabaseError> {
    columns
        .iter()
        .find(|(known, _)| *known == path)
        .map(|(_, column)| *column)
        .ok_or_else(|| DatabaseError::QueryError(format!("unsupported order path '{}'", path)))
}

fn push_order(
    qb: &mut QueryBuilder<'_, Postgres>,
    order: &[SortInstruction],
    columns: &[(&str, &'static str)],
) -> Result<(), DatabaseError> {
    let rendered = order
        .iter()
        .map(|i| Ok(format!("\"{}\" {}", column_for(columns, i.path)?, i.direction.to_sql())))
        .collect::<Result<Vec<_>, DatabaseError>>()?;

    if !rendered.is_empty() {
        qb.push(" ORDER BY ").push(rendered.join(", "));
    }
    Ok(())
}

fn escape_like(value: &str) -> String {
    value.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

fn push_habit_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &HabitFilter) {
    let mut keyword = " WHERE ";

    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", escape_like(search));
        qb.push(keyword)
            .push("(LOWER(name) LIKE ")
            .push_bind(pattern.clone())
            .push(" OR LOWER(description) LIKE ")
            .push_bind(pattern)
            .push(")");
        keyword = " AND ";
    }
    if let Some(habit_type) = filter.habit_type {
        qb.push(keyword).push("\"type\" = ").push_bind(habit_type.as_i32());
        keyword = " AND ";
    }
    if let Some(status) = filter.status {
        qb.push(keyword).push("status = ").push_bind(status.as_i32());
    }
}

fn conflict_or(err: sqlx::Error, message: String) -> DatabaseError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => DatabaseError::Conflict(message),
        _ => DatabaseError::Sqlx(err),
    }
}

/// PostgreSQL-backed store
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn habits_page(
        &self,
        filter: &HabitFilter,
        order: &[SortInstruction],
        page: PageRequest,
    ) -> Result<Page<Habit>, DatabaseError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM habits");
        push_habit_filter(&mut count, filter);
        let total_count: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT * FROM habits");
        push_habit_filter(&mut select, filter);
        push_order(&mut select, order, HABIT_COLUMNS)?;
        select
            .push(" LIMIT ")
            .push_bind(i64::from(page.page_size))
            .push(" OFFSET ")
            .push_bind(i64::try_from(page.offset()).unwrap_or(i64::MAX));

        debug!("habits query: {}", select.sql());
        let rows: Vec<HabitRow> = select.build_query_as().fetch_all(&self.pool).await?;
        let items = rows.into_iter().map(Habit::try_from).collect::<Result<Vec<_>, _>>()?;

        Ok(Page {
            items,
            total_count: u64::try_from(total_count).unwrap_or_default(),
        })
    }

    async fn habit(&self, id: &str) -> Result<Option<Habit>, DatabaseError> {
        let row: Option<HabitRow> = sqlx::query_as("SELECT * FROM habits WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Habit::try_from).transpose()
    }

    async fn habit_tag_names(&self, habit_id: &str) -> Result<Vec<String>, DatabaseError> {
        let names: Vec<String> = sqlx::query_scalar(
            "SELECT t.name FROM habit_tags ht JOIN tags t ON t.id = ht.tag_id \
             WHERE ht.habit_id = $1 ORDER BY ht.created_at_utc, t.name",
        )
        .bind(habit_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(names)
    }

    async fn insert_habit(&self, habit: &Habit) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO habits (id, name, description, \"type\", frequency_type, frequency_times_per_period, \
             target_value, target_unit, status, is_archived, end_date, milestone_target, milestone_current, \
             created_at_utc, updated_at_utc, last_completed_at_utc) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)",
        )
        .bind(&habit.id)
        .bind(&habit.name)
        .bind(&habit.description)
        .bind(habit.habit_type.as_i32())
        .bind(habit.frequency.frequency_type.as_i32())
        .bind(habit.frequency.times_per_period)
        .bind(habit.target.value)
        .bind(&habit.target.unit)
        .bind(habit.status.as_i32())
        .bind(habit.is_archived)
        .bind(habit.end_date)
        .bind(habit.milestone.as_ref().map(|m| m.target))
        .bind(habit.milestone.as_ref().map(|m| m.current))
        .bind(habit.created_at_utc)
        .bind(habit.updated_at_utc)
        .bind(habit.last_completed_at_utc)
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_or(e, format!("habit '{}' already exists", habit.id)))?;
        Ok(())
    }

    async fn update_habit(&self, habit: &Habit) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE habits SET name = $2, description = $3, \"type\" = $4, frequency_type = $5, \
             frequency_times_per_period = $6, target_value = $7, target_unit = $8, status = $9, \
             is_archived = $10, end_date = $11, milestone_target = $12, milestone_current = $13, \
             updated_at_utc = $14, last_completed_at_utc = $15 WHERE id = $1",
        )
        .bind(&habit.id)
        .bind(&habit.name)
        .bind(&habit.description)
        .bind(habit.habit_type.as_i32())
        .bind(habit.frequency.frequency_type.as_i32())
        .bind(habit.frequency.times_per_period)
        .bind(habit.target.value)
        .bind(&habit.target.unit)
        .bind(habit.status.as_i32())
        .bind(habit.is_archived)
        .bind(habit.end_date)
        .bind(habit.milestone.as_ref().map(|m| m.target))
        .bind(habit.milestone.as_ref().map(|m| m.current))
        .bind(habit.updated_at_utc)
        .bind(habit.last_completed_at_utc)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("habit '{}'", habit.id)));
        }
        Ok(())
    }

    async fn delete_habit(&self, id: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM habits WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn habit_tag_ids(&self, habit_id: &str) -> Result<Vec<String>, DatabaseError> {
        let ids: Vec<String> = sqlx::query_scalar("SELECT tag_id FROM habit_tags WHERE habit_id = $1 ORDER BY created_at_utc, tag_id")
            .bind(habit_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    async fn replace_habit_tags(
        &self,
        habit_id: &str,
        tag_ids: &[String],
        now: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM habit_tags WHERE habit_id = $1 AND NOT (tag_id = ANY($2))")
            .bind(habit_id)
            .bind(tag_ids.to_vec())
            .execute(&mut *tx)
            .await?;

        for tag_id in tag_ids {
            sqlx::query(
                "INSERT INTO habit_tags (habit_id, tag_id, created_at_utc) VALUES ($1, $2, $3) \
                 ON CONFLICT (habit_id, tag_id) DO NOTHING",
            )
            .bind(habit_id)
            .bind(tag_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_habit_tag(&self, habit_id: &str, tag_id: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM habit_tags WHERE habit_id = $1 AND tag_id = $2")
            .bind(habit_id)
            .bind(tag_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn tags(&self, order: &[SortInstruction]) -> Result<Vec<Tag>, DatabaseError> {
        let mut select = QueryBuilder::<Postgres>::new("SELECT * FROM tags");
        push_order(&mut select, order, TAG_COLUMNS)?;
        let rows: Vec<TagRow> = select.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Tag::from).collect())
    }

    async fn tag(&self, id: &str) -> Result<Option<Tag>, DatabaseError> {
        let row: Option<TagRow> = sqlx::query_as("SELECT * FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Tag::from))
    }

    async fn tag_name_exists(&self, name: &str, excluding_id: Option<&str>) -> Result<bool, DatabaseError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM tags WHERE name = $1 AND ($2::text IS NULL OR id <> $2))",
        )
        .bind(name)
        .bind(excluding_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn count_tags(&self, ids: &[String]) -> Result<usize, DatabaseError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tags WHERE id = ANY($1)")
            .bind(ids.to_vec())
            .fetch_one(&self.pool)
            .await?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    async fn insert_tag(&self, tag: &Tag) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO tags (id, name, description, created_at_utc, updated_at_utc) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&tag.id)
        .bind(&tag.name)
        .bind(&tag.description)
        .bind(tag.created_at_utc)
        .bind(tag.updated_at_utc)
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_or(e, format!("The tag '{}' already exists", tag.name)))?;
        Ok(())
    }

    async fn update_tag(&self, tag: &Tag) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE tags SET name = $2, description = $3, updated_at_utc = $4 WHERE id = $1")
            .bind(&tag.id)
            .bind(&tag.name)
            .bind(&tag.description)
            .bind(tag.updated_at_utc)
            .execute(&self.pool)
            .await
            .map_err(|e| conflict_or(e, format!("The tag '{}' already exists", tag.name)))?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("tag '{}'", tag.id)));
        }
        Ok(())
    }

    async fn delete_tag(&self, id: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
