//! Content negotiation: which media type the client asked for, whether that
//! means hypermedia output, and which API version is in effect.

use std::fmt;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::ACCEPT, request::Parts},
};

use crate::config::CONFIG;
use crate::error::ApiError;

pub mod media_types {
    pub const JSON: &str = "application/json";
    pub const JSON_V1: &str = "application/vnd.dev-habit.api.1+json";
    pub const JSON_V2: &str = "application/vnd.dev-habit.api.2+json";
    pub const HATEOAS_JSON: &str = "application/vnd.dev-habit.hateoas+json";
    pub const HATEOAS_JSON_V1: &str = "application/vnd.dev-habit.hateoas.1+json";
    pub const HATEOAS_JSON_V2: &str = "application/vnd.dev-habit.hateoas.2+json";

    pub const HYPERMEDIA: [&str; 3] = [HATEOAS_JSON, HATEOAS_JSON_V1, HATEOAS_JSON_V2];
    pub const VENDOR: [&str; 5] = [JSON_V1, JSON_V2, HATEOAS_JSON, HATEOAS_JSON_V1, HATEOAS_JSON_V2];
}

/// Query parameter that selects a version when the media type does not.
pub const API_VERSION_PARAM: &str = "api-version";

/// True only for an exact match on one of the hypermedia media types.
pub fn include_links(accept: Option<&str>) -> bool {
    accept.map_or(false, |value| media_types::HYPERMEDIA.contains(&value))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ApiVersion {
    V1,
    V2,
}

impl ApiVersion {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "1" | "1.0" => Some(ApiVersion::V1),
            "2" | "2.0" => Some(ApiVersion::V2),
            _ => None,
        }
    }

    pub fn from_default_number(number: u8) -> Self {
        match number {
            2 => ApiVersion::V2,
            _ => ApiVersion::V1,
        }
    }

    /// Version pinned by a versioned vendor media type, if any.
    pub fn from_media_type(accept: &str) -> Option<Self> {
        match accept {
            media_types::JSON_V1 | media_types::HATEOAS_JSON_V1 => Some(ApiVersion::V1),
            media_types::JSON_V2 | media_types::HATEOAS_JSON_V2 => Some(ApiVersion::V2),
            _ => None,
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiVersion::V1 => f.write_str("1.0"),
            ApiVersion::V2 => f.write_str("2.0"),
        }
    }
}

/// Outcome of negotiating one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Negotiated {
    pub accept: Option<String>,
    pub include_links: bool,
    pub version: ApiVersion,
}

impl Negotiated {
    pub fn resolve(
        accept: Option<&str>,
        requested_version: Option<&str>,
        default_version: ApiVersion,
    ) -> Result<Self, ApiError> {
        let version = match accept.and_then(ApiVersion::from_media_type) {
            Some(version) => version,
            None => match requested_version {
                Some(raw) => ApiVersion::parse(raw).ok_or_else(|| {
                    ApiError::bad_request(format!("The requested API version isn't supported: '{}'", raw))
                })?,
                None => default_version,
            },
        };

        Ok(Self {
            accept: accept.map(str::to_string),
            include_links: include_links(accept),
            version,
        })
    }

    /// Media type to answer with: the vendor type the client asked for, or JSON.
    pub fn response_media_type(&self) -> &'static str {
        self.accept
            .as_deref()
            .and_then(|accept| media_types::VENDOR.iter().find(|vendor| **vendor == accept))
            .copied()
            .unwrap_or(media_types::JSON)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Negotiated
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let accept = parts
            .headers
            .get(ACCEPT)
            .and_then(|value| value.to_str().ok())
            .map(str::trim);

        let requested_version = parts.uri.query().and_then(|query| {
            url::form_urlencoded::parse(query.as_bytes())
                .find(|(key, _)| key == API_VERSION_PARAM)
                .map(|(_, value)| value.into_owned())
        });

        let default_version = ApiVersion::from_default_number(CONFIG.api.default_api_version);
        Negotiated::resolve(accept, requested_version.as_deref(), default_version)
    }
}
