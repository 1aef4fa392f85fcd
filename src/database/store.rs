use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::manager::DatabaseError;
use super::models::{Habit, HabitStatus, HabitType, Tag};
use crate::sorting::SortInstruction;

/// Filters for the habits collection. `search` is trimmed and lowercased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HabitFilter {
    pub search: Option<String>,
    pub habit_type: Option<HabitType>,
    pub status: Option<HabitStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }
}

#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: u64,
}

/// Query execution and persistence for habits, tags and their associations.
///
/// Ordering instructions arrive already translated: every path is one the
/// entity's sort mapping declared, and implementations reject anything else.
#[async_trait]
pub trait Store: Send + Sync {
    async fn habits_page(
        &self,
        filter: &HabitFilter,
        order: &[SortInstruction],
        page: PageRequest,
    ) -> Result<Page<Habit>, DatabaseError>;

    async fn habit(&self, id: &str) -> Result<Option<Habit>, DatabaseError>;

    /// Names of the habit's tags, in association order.
    async fn habit_tag_names(&self, habit_id: &str) -> Result<Vec<String>, DatabaseError>;

    async fn insert_habit(&self, habit: &Habit) -> Result<(), DatabaseError>;

    /// `NotFound` when the habit does not exist.
    async fn update_habit(&self, habit: &Habit) -> Result<(), DatabaseError>;

    /// Also drops the habit's tag associations. False when nothing was deleted.
    async fn delete_habit(&self, id: &str) -> Result<bool, DatabaseError>;

    async fn habit_tag_ids(&self, habit_id: &str) -> Result<Vec<String>, DatabaseError>;

    /// Makes `tag_ids` the habit's tag set: missing ones are added with `now`,
    /// the rest removed, unchanged associations keep their timestamp.
    async fn replace_habit_tags(
        &self,
        habit_id: &str,
        tag_ids: &[String],
        now: DateTime<Utc>,
    ) -> Result<(), DatabaseError>;

    async fn delete_habit_tag(&self, habit_id: &str, tag_id: &str) -> Result<bool, DatabaseError>;

    async fn tags(&self, order: &[SortInstruction]) -> Result<Vec<Tag>, DatabaseError>;

    async fn tag(&self, id: &str) -> Result<Option<Tag>, DatabaseError>;

    async fn tag_name_exists(&self, name: &str, excluding_id: Option<&str>) -> Result<bool, DatabaseError>;

    /// How many of `ids` name existing tags.
    async fn count_tags(&self, ids: &[String]) -> Result<usize, DatabaseError>;

    async fn insert_tag(&self, tag: &Tag) -> Result<(), DatabaseError>;

    async fn update_tag(&self, tag: &Tag) -> Result<(), DatabaseError>;

    async fn delete_tag(&self, id: &str) -> Result<bool, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;

    fn backend(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_is_zero_based() {
        assert_eq!(PageRequest { page: 1, page_size: 10 }.offset(), 0);
        assert_eq!(PageRequest { page: 3, page_size: 10 }.offset(), 20);
        assert_eq!(PageRequest { page: 0, page_size: 10 }.offset(), 0);
    }
}
