use axum::{
    http::{
        header::{CONTENT_TYPE, LOCATION},
        HeaderValue, StatusCode,
    },
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::negotiation::media_types;

/// Serialized body plus the status and headers the handler chose.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: Option<T>,
    pub status_code: StatusCode,
    pub location: Option<String>,
    pub content_type: &'static str,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK with a JSON body
    pub fn success(data: T) -> Self {
        Self::with_status(data, StatusCode::OK)
    }

    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self {
            data: Some(data),
            status_code,
            location: None,
            content_type: media_types::JSON,
        }
    }

    /// 201 Created pointing at the new resource
    pub fn created(data: T, location: impl Into<String>) -> Self {
        Self {
            location: Some(location.into()),
            ..Self::with_status(data, StatusCode::CREATED)
        }
    }

    /// Answer with the negotiated media type instead of plain JSON.
    pub fn media_type(mut self, content_type: &'static str) -> Self {
        self.content_type = content_type;
        self
    }
}

impl ApiResponse<()> {
    pub fn no_content() -> Self {
        Self {
            data: None,
            status_code: StatusCode::NO_CONTENT,
            location: None,
            content_type: media_types::JSON,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let mut response = match self.data {
            Some(data) if self.status_code != StatusCode::NO_CONTENT => match serde_json::to_vec(&data) {
                Ok(body) => (self.status_code, body).into_response(),
                Err(e) => {
                    tracing::error!("Failed to serialize response data: {}", e);
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({
                            "error": true,
                            "message": "Failed to serialize response data",
                            "code": "INTERNAL_SERVER_ERROR"
                        })),
                    )
                        .into_response();
                }
            },
            _ => return self.status_code.into_response(),
        };

        let headers = response.headers_mut();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(self.content_type));
        if let Some(location) = self.location {
            match HeaderValue::from_str(&location) {
                Ok(value) => {
                    headers.insert(LOCATION, value);
                }
                Err(e) => tracing::warn!("Dropping unusable Location header {:?}: {}", location, e),
            }
        }

        response
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_sets_location_and_content_type() {
        let response = ApiResponse::created(json!({"id": "t_1"}), "/tags/t_1")
            .media_type(media_types::HATEOAS_JSON)
            .into_response();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[LOCATION], "/tags/t_1");
        assert_eq!(response.headers()[CONTENT_TYPE], media_types::HATEOAS_JSON);
    }

    #[test]
    fn no_content_has_no_body_headers() {
        let response = ApiResponse::no_content().into_response();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.headers().get(CONTENT_TYPE).is_none());
    }
}
