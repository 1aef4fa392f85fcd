//! Demo habits for a fresh database, applied on request at startup.

use chrono::{DateTime, TimeZone, Utc};
use tracing::info;

use super::manager::DatabaseError;
use super::models::{Frequency, FrequencyType, Habit, HabitStatus, HabitType, Target};
use super::store::Store;

struct SeedHabit {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    habit_type: HabitType,
    target: (i32, &'static str),
    /// Hour of 2025-02-03, UTC
    created_hour: u32,
}

const HABITS: &[SeedHabit] = &[
    SeedHabit {
        id: "h_01HNK4V8J5T6MW8X9Y0Z1A2B3C",
        name: "Daily Meditation",
        description: "Morning mindfulness practice",
        habit_type: HabitType::Measurable,
        target: (15, "minutes"),
        created_hour: 8,
    },
    SeedHabit {
        id: "h_01HNK4V8P7Q8RX9Y0Z1A2B3C4D",
        name: "Read Book",
        description: "30 pages per day",
        habit_type: HabitType::Measurable,
        target: (30, "pages"),
        created_hour: 9,
    },
    SeedHabit {
        id: "h_01HNK4V91A2B3C4D5E6F7G8H9I",
        name: "Journal",
        description: "Daily reflection",
        habit_type: HabitType::Binary,
        target: (0, ""),
        created_hour: 12,
    },
];

fn created_at(hour: u32) -> Result<DateTime<Utc>, DatabaseError> {
    Utc.with_ymd_and_hms(2025, 2, 3, hour, 0, 0)
        .single()
        .ok_or_else(|| DatabaseError::MigrationError(format!("invalid seed hour {}", hour)))
}

/// The seed habits as entities.
pub fn habits() -> Result<Vec<Habit>, DatabaseError> {
    HABITS
        .iter()
        .map(|seed| {
            Ok(Habit {
                id: seed.id.to_string(),
                name: seed.name.to_string(),
                description: Some(seed.description.to_string()),
                habit_type: seed.habit_type,
                frequency: Frequency {
                    frequency_type: FrequencyType::Daily,
                    times_per_period: 1,
                },
                target: Target {
                    value: seed.target.0,
                    unit: seed.target.1.to_string(),
                },
                status: HabitStatus::Ongoing,
                is_archived: false,
                end_date: None,
                milestone: None,
                created_at_utc: created_at(seed.created_hour)?,
                updated_at_utc: None,
                last_completed_at_utc: None,
            })
        })
        .collect()
}

/// Insert every seed habit the store does not already hold. Returns how many
/// were inserted.
pub async fn apply(store: &dyn Store) -> Result<usize, DatabaseError> {
    let mut inserted = 0;
    for habit in habits()? {
        if store.habit(&habit.id).await?.is_some() {
            continue;
        }
        store.insert_habit(&habit).await?;
        inserted += 1;
    }
    info!("Seeded {} habits", inserted);
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;

    #[tokio::test]
    async fn seeding_twice_inserts_once() {
        let store = MemoryStore::new();
        assert_eq!(apply(&store).await.unwrap(), 3);
        assert_eq!(apply(&store).await.unwrap(), 0);

        let journal = store.habit("h_01HNK4V91A2B3C4D5E6F7G8H9I").await.unwrap().unwrap();
        assert_eq!(journal.habit_type, HabitType::Binary);
        assert_eq!(journal.created_at_utc.to_rfc3339(), "2025-02-03T12:00:00+00:00");
    }
}
