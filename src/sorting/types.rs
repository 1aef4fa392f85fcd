use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    /// Final direction for a requested direction against a mapping that may be reversed.
    pub fn resolve(requested_descending: bool, reverse: bool) -> Self {
        match (requested_descending, reverse) {
            (false, false) => SortDirection::Asc,
            (false, true) => SortDirection::Desc,
            (true, false) => SortDirection::Desc,
            (true, true) => SortDirection::Asc,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_sql())
    }
}

/// One row of a mapping definition: the client-facing field name and the
/// path used to order the underlying source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortMapping {
    pub logical_field: &'static str,
    pub physical_path: &'static str,
    pub reverse: bool,
}

impl SortMapping {
    pub const fn new(logical_field: &'static str, physical_path: &'static str) -> Self {
        Self { logical_field, physical_path, reverse: false }
    }

    pub const fn reversed(logical_field: &'static str, physical_path: &'static str) -> Self {
        Self { logical_field, physical_path, reverse: true }
    }

    pub fn matches(&self, field: &str) -> bool {
        self.logical_field.eq_ignore_ascii_case(field)
    }
}

/// A translated ordering step. `path` always originates from a registered
/// [`SortMapping`], never from request text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortInstruction {
    pub path: &'static str,
    pub direction: SortDirection,
}

impl SortInstruction {
    pub fn asc(path: &'static str) -> Self {
        Self { path, direction: SortDirection::Asc }
    }

    pub fn desc(path: &'static str) -> Self {
        Self { path, direction: SortDirection::Desc }
    }
}

impl fmt::Display for SortInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.path, self.direction)
    }
}
