use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("'{value}' is not a valid {kind}")]
pub struct EnumParseError {
    pub kind: &'static str,
    pub value: String,
}

/// Comparable value of one sortable column, used by stores that order in memory.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum OrderKey {
    Bool(bool),
    Int(i64),
    Text(String),
    OptText(Option<String>),
    Date(Option<NaiveDate>),
    Time(Option<DateTime<Utc>>),
}

/// Integer-backed enum stored as its discriminant, sent over the wire as a
/// camelCase name, parsed from either.
macro_rules! int_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal { $($variant:ident = $value:literal => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub enum $name {
            $($variant = $value),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_i32(self) -> i32 {
                self as i32
            }

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl TryFrom<i32> for $name {
            type Error = $crate::database::models::EnumParseError;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                match value {
                    $($value => Ok($name::$variant),)+
                    _ => Err($crate::database::models::EnumParseError {
                        kind: $kind,
                        value: value.to_string(),
                    }),
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::database::models::EnumParseError;

            /// Case-insensitive name or numeric discriminant.
            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                let raw = raw.trim();
                if let Ok(number) = raw.parse::<i32>() {
                    return $name::try_from(number);
                }
                $name::ALL
                    .iter()
                    .copied()
                    .find(|variant| variant.as_str().eq_ignore_ascii_case(raw))
                    .ok_or_else(|| $crate::database::models::EnumParseError {
                        kind: $kind,
                        value: raw.to_string(),
                    })
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use int_enum;

pub mod habit;
pub mod tag;

pub use habit::{Frequency, FrequencyType, Habit, HabitStatus, HabitType, Milestone, Target};
pub use tag::{HabitTag, Tag};
