pub mod error;
pub mod mapping;
pub mod sort_order;
pub mod types;

pub use error::SortError;
pub use mapping::{SortMappingDefinition, SortMappingRegistry};
pub use sort_order::{SortOrder, SortTerm, DEFAULT_SORT_PATH};
pub use types::*;
