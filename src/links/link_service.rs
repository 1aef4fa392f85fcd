use once_cell::sync::Lazy;
use serde::Serialize;
use thiserror::Error;
use url::{Position, Url};

use super::operation::Operation;
use crate::negotiation::{ApiVersion, API_VERSION_PARAM};

/// Placeholder origin for relative links; only path and query are kept.
static RELATIVE_ROOT: Lazy<Url> =
    Lazy::new(|| Url::parse("http://localhost/").expect("static URL is valid"));

/// Relation names used across the API.
pub mod rel {
    pub const SELF: &str = "self";
    pub const CREATE: &str = "create";
    pub const UPDATE: &str = "update";
    pub const PARTIAL_UPDATE: &str = "partial-update";
    pub const DELETE: &str = "delete";
    pub const UPSERT_TAGS: &str = "upsert-tags";
    pub const NEXT_PAGE: &str = "next-page";
    pub const PREVIOUS_PAGE: &str = "previous-page";
}

#[derive(Debug, Error)]
pub enum LinkBaseError {
    #[error("invalid link base URL: {0}")]
    Parse(#[from] url::ParseError),

    #[error("link base URL '{0}' must be an absolute http(s) URL")]
    NotABase(String),
}

/// Parse the public base URL links are resolved against.
pub fn parse_base_url(raw: &str) -> Result<Url, LinkBaseError> {
    let url = Url::parse(raw.trim())?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(LinkBaseError::NotABase(raw.to_string()));
    }
    Ok(url)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkDto {
    pub href: String,
    pub rel: String,
    pub method: String,
}

impl LinkDto {
    pub fn new(href: impl Into<String>, rel: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            rel: rel.into(),
            method: method.into(),
        }
    }
}

/// Named link parameters. `None` values are left out of the href.
pub type LinkParams<'a> = [(&'a str, Option<String>)];

/// Builds links for one request: fixed API version, optional absolute base.
#[derive(Debug, Clone)]
pub struct LinkService {
    base_url: Option<Url>,
    version: ApiVersion,
}

impl LinkService {
    /// `base_url` turns hrefs absolute; its path acts as a prefix. Pass it
    /// through [`parse_base_url`] first.
    pub fn new(base_url: Option<Url>, version: ApiVersion) -> Self {
        Self { base_url, version }
    }

    pub fn relative(version: ApiVersion) -> Self {
        Self::new(None, version)
    }

    pub fn version(&self) -> ApiVersion {
        self.version
    }

    /// Link to `operation`.
    ///
    /// Path placeholders are filled from `params`; every other non-null entry
    /// becomes a query parameter in the order given, followed by the API
    /// version.
    ///
    /// # Panics
    ///
    /// Panics when a path placeholder has no value, or when the base URL
    /// cannot carry a path. Links are built from fixed call sites and the
    /// base is validated at startup, so both are wiring defects.
    pub fn create(&self, operation: Operation, rel: &str, params: &LinkParams<'_>) -> LinkDto {
        let route = operation.route();
        let mut url = self.base_url.clone().unwrap_or_else(|| (*RELATIVE_ROOT).clone());
        url.set_fragment(None);

        {
            let mut segments = match url.path_segments_mut() {
                Ok(segments) => segments,
                Err(()) => panic!("link base URL cannot carry a path"),
            };
            segments.pop_if_empty();
            for segment in route.template.split('/').filter(|s| !s.is_empty()) {
                match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                    Some(name) => {
                        let value = lookup(params, name).unwrap_or_else(|| {
                            panic!(
                                "link '{}' to {:?} is missing path parameter '{}'",
                                rel, operation, name
                            )
                        });
                        segments.push(value);
                    }
                    None => {
                        segments.push(segment);
                    }
                }
            }
        }

        {
            let mut query = url.query_pairs_mut();
            query.clear();
            for (name, value) in params {
                if route.path_params.iter().any(|param| param == name) {
                    continue;
                }
                if let Some(value) = value {
                    query.append_pair(name, value);
                }
            }
            query.append_pair(API_VERSION_PARAM, &self.version.to_string());
        }

        let href = match self.base_url {
            Some(_) => url.to_string(),
            None => url[Position::BeforePath..].to_string(),
        };
        LinkDto::new(href, rel, route.method)
    }
}

fn lookup<'p>(params: &'p LinkParams<'_>, name: &str) -> Option<&'p str> {
    params
        .iter()
        .find(|(key, _)| *key == name)
        .and_then(|(_, value)| value.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links() -> LinkService {
        LinkService::relative(ApiVersion::V1)
    }

    #[test]
    fn substitutes_path_and_appends_version() {
        let link = links().create(Operation::GetHabit, rel::SELF, &[("id", Some("h_1".into()))]);
        assert_eq!(link, LinkDto::new("/habits/h_1?api-version=1.0", "self", "GET"));
    }

    #[test]
    fn null_params_are_omitted() {
        let with = links().create(
            Operation::GetHabit,
            rel::SELF,
            &[("id", Some("h_1".into())), ("fields", Some("name,status".into()))],
        );
        let without = links().create(
            Operation::GetHabit,
            rel::SELF,
            &[("id", Some("h_1".into())), ("fields", None)],
        );

        assert_eq!(with.href, "/habits/h_1?fields=name%2Cstatus&api-version=1.0");
        assert_eq!(without.href, "/habits/h_1?api-version=1.0");
    }

    #[test]
    fn query_params_keep_call_order_and_encoding() {
        let link = links().create(
            Operation::GetHabits,
            rel::NEXT_PAGE,
            &[
                ("q", Some("read books".into())),
                ("sort", Some("name desc".into())),
                ("page", Some("2".into())),
            ],
        );
        assert_eq!(link.href, "/habits?q=read+books&sort=name+desc&page=2&api-version=1.0");
        assert_eq!(link.method, "GET");
    }

    #[test]
    fn method_comes_from_the_operation() {
        let link = links().create(
            Operation::UpsertHabitTags,
            rel::UPSERT_TAGS,
            &[("habitId", Some("h 1/x".into()))],
        );
        assert_eq!(link.href, "/habits/h%201%2Fx/tags?api-version=1.0");
        assert_eq!(link.method, "PUT");
    }

    #[test]
    fn version_in_effect_is_reflected() {
        let link = LinkService::relative(ApiVersion::V2).create(Operation::GetTags, rel::SELF, &[]);
        assert_eq!(link.href, "/tags?api-version=2.0");
    }

    #[test]
    fn base_url_makes_links_absolute() {
        let base = parse_base_url("https://api.example.com/devhabit").unwrap();
        let service = LinkService::new(Some(base), ApiVersion::V1);
        let link = service.create(Operation::GetTag, rel::SELF, &[("id", Some("t_9".into()))]);
        assert_eq!(link.href, "https://api.example.com/devhabit/tags/t_9?api-version=1.0");
    }

    #[test]
    fn base_url_with_trailing_slash_keeps_one_separator() {
        let base = parse_base_url("https://api.example.com/devhabit/").unwrap();
        let link = LinkService::new(Some(base), ApiVersion::V2).create(Operation::GetHabits, rel::SELF, &[]);
        assert_eq!(link.href, "https://api.example.com/devhabit/habits?api-version=2.0");
    }

    #[test]
    fn base_url_path_segments_are_encoded() {
        let base = parse_base_url("http://localhost:8080").unwrap();
        let link = LinkService::new(Some(base), ApiVersion::V1).create(
            Operation::DeleteHabitTag,
            rel::DELETE,
            &[("habitId", Some("h_1".into())), ("tagId", Some("t 2%".into()))],
        );
        assert_eq!(link.href, "http://localhost:8080/habits/h_1/tags/t%202%25?api-version=1.0");
        assert_eq!(link.method, "DELETE");
    }

    #[test]
    fn parse_base_url_rejects_non_http_bases() {
        assert!(matches!(parse_base_url("mailto:team@example.com"), Err(LinkBaseError::NotABase(_))));
        assert!(matches!(parse_base_url("ftp://files.example.com/"), Err(LinkBaseError::NotABase(_))));
        assert!(matches!(parse_base_url("not a url"), Err(LinkBaseError::Parse(_))));
        assert!(parse_base_url(" https://api.example.com/ ").is_ok());
    }

    #[test]
    #[should_panic(expected = "missing path parameter 'id'")]
    fn missing_path_param_panics() {
        links().create(Operation::DeleteTag, rel::DELETE, &[("id", None)]);
    }
}
