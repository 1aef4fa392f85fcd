use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    #[error("The provided data shaping fields aren't valid: '{0}'")]
    InvalidFields(String),

    #[error("Duplicate field '{field}' declared on {shape}")]
    DuplicateField { field: String, shape: &'static str },

    #[error("{0} does not declare an 'id' field")]
    MissingId(&'static str),

    #[error("Cached field table for {0} has an unexpected type")]
    TableTypeMismatch(&'static str),
}
