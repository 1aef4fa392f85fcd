use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SortError {
    #[error("The provided sort parameter isn't valid: '{0}'")]
    InvalidSort(String),

    #[error("Duplicate sort field '{field}' in mapping for {response_shape}")]
    DuplicateField {
        field: String,
        response_shape: &'static str,
    },

    #[error("Sort mapping already registered for {response_shape} -> {source_shape}")]
    DuplicateDefinition {
        response_shape: &'static str,
        source_shape: &'static str,
    },
}
