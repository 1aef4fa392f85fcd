use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use tokio::sync::RwLock;
use tracing::debug;

use super::manager::DatabaseError;
use super::models::{Habit, HabitTag, OrderKey, Tag};
use super::store::{HabitFilter, Page, PageRequest, Store};
use crate::sorting::{SortDirection, SortInstruction};

#[derive(Debug, Default)]
struct Tables {
    habits: Vec<Habit>,
    tags: Vec<Tag>,
    habit_tags: Vec<HabitTag>,
}

/// Store kept in process memory. Used when no database is configured and by tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Stable sort by each instruction in turn. Unknown paths fail before anything moves.
fn sort_by_instructions<T>(
    items: &mut [T],
    order: &[SortInstruction],
    known_paths: &[&str],
    key: fn(&T, &str) -> Option<OrderKey>,
) -> Result<(), DatabaseError> {
    if let Some(unknown) = order.iter().find(|i| !known_paths.contains(&i.path)) {
        return Err(DatabaseError::QueryError(format!("unsupported order path '{}'", unknown.path)));
    }

    items.sort_by(|a, b| {
        order
            .iter()
            .map(|instruction| {
                let ordering = key(a, instruction.path).cmp(&key(b, instruction.path));
                match instruction.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            })
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
    Ok(())
}

fn page_slice<T: Clone>(items: &[T], page: PageRequest) -> Vec<T> {
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    items
        .iter()
        .skip(offset)
        .take(page.page_size as usize)
        .cloned()
        .collect()
}

#[async_trait]
impl Store for MemoryStore {
    async fn habits_page(
        &self,
        filter: &HabitFilter,
        order: &[SortInstruction],
        page: PageRequest,
    ) -> Result<Page<Habit>, DatabaseError> {
        let tables = self.tables.read().await;

        let mut matching: Vec<Habit> = tables
            .habits
            .iter()
            .filter(|h| filter.search.as_deref().map_or(true, |needle| h.matches_search(needle)))
            .filter(|h| filter.habit_type.map_or(true, |t| h.habit_type == t))
            .filter(|h| filter.status.map_or(true, |s| h.status == s))
            .cloned()
            .collect();

        sort_by_instructions(&mut matching, order, Habit::ORDER_PATHS, Habit::order_key)?;

        debug!("memory habits query matched {} rows", matching.len());
        Ok(Page {
            total_count: matching.len() as u64,
            items: page_slice(&matching, page),
        })
    }

    async fn habit(&self, id: &str) -> Result<Option<Habit>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.habits.iter().find(|h| h.id == id).cloned())
    }

    async fn habit_tag_names(&self, habit_id: &str) -> Result<Vec<String>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .habit_tags
            .iter()
            .filter(|ht| ht.habit_id == habit_id)
            .filter_map(|ht| tables.tags.iter().find(|t| t.id == ht.tag_id))
            .map(|t| t.name.clone())
            .collect())
    }

    async fn insert_habit(&self, habit: &Habit) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.habits.iter().any(|h| h.id == habit.id) {
            return Err(DatabaseError::Conflict(format!("habit '{}' already exists", habit.id)));
        }
        tables.habits.push(habit.clone());
        Ok(())
    }

    async fn update_habit(&self, habit: &Habit) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        match tables.habits.iter_mut().find(|h| h.id == habit.id) {
            Some(existing) => {
                *existing = habit.clone();
                Ok(())
            }
            None => Err(DatabaseError::NotFound(format!("habit '{}'", habit.id))),
        }
    }

    async fn delete_habit(&self, id: &str) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        let before = tables.habits.len();
        tables.habits.retain(|h| h.id != id);
        tables.habit_tags.retain(|ht| ht.habit_id != id);
        Ok(tables.habits.len() != before)
    }

    async fn habit_tag_ids(&self, habit_id: &str) -> Result<Vec<String>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .habit_tags
            .iter()
            .filter(|ht| ht.habit_id == habit_id)
            .map(|ht| ht.tag_id.clone())
            .collect())
    }

    async fn replace_habit_tags(
        &self,
        habit_id: &str,
        tag_ids: &[String],
        now: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        tables
            .habit_tags
            .retain(|ht| ht.habit_id != habit_id || tag_ids.contains(&ht.tag_id));

        for tag_id in tag_ids {
            let present = tables
                .habit_tags
                .iter()
                .any(|ht| ht.habit_id == habit_id && &ht.tag_id == tag_id);
            if !present {
                tables.habit_tags.push(HabitTag {
                    habit_id: habit_id.to_string(),
                    tag_id: tag_id.clone(),
                    created_at_utc: now,
                });
            }
        }
        Ok(())
    }

    async fn delete_habit_tag(&self, habit_id: &str, tag_id: &str) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        let before = tables.habit_tags.len();
        tables
            .habit_tags
            .retain(|ht| !(ht.habit_id == habit_id && ht.tag_id == tag_id));
        Ok(tables.habit_tags.len() != before)
    }

    async fn tags(&self, order: &[SortInstruction]) -> Result<Vec<Tag>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut tags = tables.tags.clone();
        sort_by_instructions(&mut tags, order, Tag::ORDER_PATHS, Tag::order_key)?;
        Ok(tags)
    }

    async fn tag(&self, id: &str) -> Result<Option<Tag>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.tags.iter().find(|t| t.id == id).cloned())
    }

    async fn tag_name_exists(&self, name: &str, excluding_id: Option<&str>) -> Result<bool, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .tags
            .iter()
            .any(|t| t.name == name && Some(t.id.as_str()) != excluding_id))
    }

    async fn count_tags(&self, ids: &[String]) -> Result<usize, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.tags.iter().filter(|t| ids.contains(&t.id)).count())
    }

    async fn insert_tag(&self, tag: &Tag) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.tags.iter().any(|t| t.name == tag.name) {
            return Err(DatabaseError::Conflict(format!("The tag '{}' already exists", tag.name)));
        }
        tables.tags.push(tag.clone());
        Ok(())
    }

    async fn update_tag(&self, tag: &Tag) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.tags.iter().any(|t| t.name == tag.name && t.id != tag.id) {
            return Err(DatabaseError::Conflict(format!("The tag '{}' already exists", tag.name)));
        }
        match tables.tags.iter_mut().find(|t| t.id == tag.id) {
            Some(existing) => {
                *existing = tag.clone();
                Ok(())
            }
            None => Err(DatabaseError::NotFound(format!("tag '{}'", tag.id))),
        }
    }

    async fn delete_tag(&self, id: &str) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        let before = tables.tags.len();
        tables.tags.retain(|t| t.id != id);
        tables.habit_tags.retain(|ht| ht.tag_id != id);
        Ok(tables.tags.len() != before)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
