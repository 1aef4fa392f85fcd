use super::error::SortError;
use super::types::{SortDirection, SortInstruction, SortMapping};

/// Physical path used when the client does not ask for an order, so that
/// paging stays deterministic.
pub const DEFAULT_SORT_PATH: &str = "Id";

/// A parsed `<field>[ desc]` term of a sort expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortTerm<'a> {
    pub field: &'a str,
    pub descending: bool,
}

pub struct SortOrder;

impl SortOrder {
    /// Terms of a comma separated sort expression. Empty terms are skipped.
    pub fn parse(sort: &str) -> Vec<SortTerm<'_>> {
        sort.split(',')
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .filter_map(Self::parse_term)
            .collect()
    }

    fn parse_term(term: &str) -> Option<SortTerm<'_>> {
        let mut parts = term.split_whitespace();
        let field = parts.next()?;
        let descending = parts
            .next()
            .map(|dir| dir.eq_ignore_ascii_case("desc"))
            .unwrap_or(false);
        Some(SortTerm { field, descending })
    }

    /// All-or-nothing check of a sort expression against a mapping table.
    /// An absent or blank expression is always valid.
    pub fn validate(sort: Option<&str>, mappings: &[SortMapping]) -> bool {
        match sort.map(str::trim) {
            None | Some("") => true,
            Some(sort) => Self::parse(sort)
                .iter()
                .all(|term| Self::find(mappings, term.field).is_some()),
        }
    }

    /// Translate with the `Id` fallback.
    pub fn translate(
        sort: Option<&str>,
        mappings: &[SortMapping],
    ) -> Result<Vec<SortInstruction>, SortError> {
        Self::translate_or(sort, mappings, DEFAULT_SORT_PATH)
    }

    /// Translate a sort expression into physical ordering instructions.
    ///
    /// Every emitted path is copied from `mappings`; an unknown field rejects
    /// the whole expression rather than dropping the term.
    pub fn translate_or(
        sort: Option<&str>,
        mappings: &[SortMapping],
        default_path: &'static str,
    ) -> Result<Vec<SortInstruction>, SortError> {
        let raw = match sort.map(str::trim) {
            None | Some("") => return Ok(vec![SortInstruction::asc(default_path)]),
            Some(raw) => raw,
        };

        let terms = Self::parse(raw);
        if terms.is_empty() {
            return Ok(vec![SortInstruction::asc(default_path)]);
        }

        let mut instructions = Vec::with_capacity(terms.len());
        for term in terms {
            let mapping = Self::find(mappings, term.field)
                .ok_or_else(|| SortError::InvalidSort(raw.to_string()))?;
            instructions.push(SortInstruction {
                path: mapping.physical_path,
                direction: SortDirection::resolve(term.descending, mapping.reverse),
            });
        }

        tracing::debug!(
            "Translated sort '{}' into [{}]",
            raw,
            instructions.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
        );
        Ok(instructions)
    }

    fn find<'m>(mappings: &'m [SortMapping], field: &str) -> Option<&'m SortMapping> {
        mappings.iter().find(|mapping| mapping.matches(field))
    }
}
