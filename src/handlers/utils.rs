use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;

use crate::config::CONFIG;
use crate::database::models::EnumParseError;
use crate::database::PageRequest;
use crate::error::ApiError;
use crate::pagination::DEFAULT_PAGE;

/// `q` is matched case-insensitively; blank means no search.
pub fn normalize_search(q: Option<&str>) -> Option<String> {
    q.map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase)
}

/// Optional enum filter. A value that names no variant rejects the request.
pub fn parse_filter<T>(parameter: &str, raw: Option<&str>) -> Result<Option<T>, ApiError>
where
    T: FromStr<Err = EnumParseError>,
{
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(|e: EnumParseError| {
            ApiError::bad_request(format!("The provided {} filter isn't valid: '{}'", parameter, e.value))
        }),
    }
}

pub fn page_request(page: Option<&str>, page_size: Option<&str>) -> Result<PageRequest, ApiError> {
    let max_page_size = CONFIG.api.max_page_size;

    let page = parse_number("page", page)?.unwrap_or(DEFAULT_PAGE);
    let page_size = parse_number("pageSize", page_size)?.unwrap_or(CONFIG.api.default_page_size);

    if page < 1 {
        return Err(ApiError::invalid_field("page", "must be at least 1"));
    }
    if page_size < 1 || page_size > max_page_size {
        return Err(ApiError::invalid_field(
            "pageSize",
            format!("must be between 1 and {}", max_page_size),
        ));
    }
    Ok(PageRequest { page, page_size })
}

fn parse_number(parameter: &str, raw: Option<&str>) -> Result<Option<u32>, ApiError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| ApiError::invalid_field(parameter, format!("'{}' is not a valid number", raw))),
    }
}

/// One RFC 6902 operation. `copy` and `move` are not supported.
#[derive(Debug, Clone, Deserialize)]
pub struct PatchOperation {
    pub op: String,
    pub path: String,
    #[serde(default)]
    pub value: Option<Value>,
}

pub fn apply_patch(document: &mut Value, operations: &[PatchOperation]) -> Result<(), ApiError> {
    for operation in operations {
        let (parent_path, key) = split_pointer(&operation.path)?;
        let parent = document
            .pointer_mut(parent_path)
            .and_then(Value::as_object_mut)
            .ok_or_else(|| patch_error(operation, "target location does not exist"))?;

        match operation.op.as_str() {
            "add" => {
                parent.insert(key, required_value(operation)?);
            }
            "replace" => {
                let slot = parent
                    .get_mut(&key)
                    .ok_or_else(|| patch_error(operation, "target location does not exist"))?;
                *slot = required_value(operation)?;
            }
            "remove" => {
                parent
                    .remove(&key)
                    .ok_or_else(|| patch_error(operation, "target location does not exist"))?;
            }
            "test" => {
                let expected = required_value(operation)?;
                if parent.get(&key) != Some(&expected) {
                    return Err(patch_error(operation, "test failed"));
                }
            }
            other => {
                return Err(ApiError::bad_request(format!("Unsupported patch operation '{}'", other)));
            }
        }
    }
    Ok(())
}

fn split_pointer(path: &str) -> Result<(&str, String), ApiError> {
    let index = path
        .rfind('/')
        .ok_or_else(|| ApiError::bad_request(format!("Invalid patch path '{}'", path)))?;
    let key = path[index + 1..].replace("~1", "/").replace("~0", "~");
    if key.is_empty() {
        return Err(ApiError::bad_request(format!("Invalid patch path '{}'", path)));
    }
    Ok((&path[..index], key))
}

fn required_value(operation: &PatchOperation) -> Result<Value, ApiError> {
    operation
        .value
        .clone()
        .ok_or_else(|| patch_error(operation, "a value is required"))
}

fn patch_error(operation: &PatchOperation, problem: &str) -> ApiError {
    ApiError::invalid_field(&operation.path, format!("{} failed: {}", operation.op, problem))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::HabitStatus;
    use serde_json::json;

    fn ops(value: Value) -> Vec<PatchOperation> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn search_is_trimmed_and_lowercased() {
        assert_eq!(normalize_search(Some("  Read ")), Some("read".to_string()));
        assert_eq!(normalize_search(Some("   ")), None);
        assert_eq!(normalize_search(None), None);
    }

    #[test]
    fn filters_accept_name_or_number_and_reject_the_rest() {
        assert_eq!(parse_filter::<HabitStatus>("status", Some("Ongoing")).unwrap(), Some(HabitStatus::Ongoing));
        assert_eq!(parse_filter::<HabitStatus>("status", Some("2")).unwrap(), Some(HabitStatus::Completed));
        assert_eq!(parse_filter::<HabitStatus>("status", Some("")).unwrap(), None);

        let err = parse_filter::<HabitStatus>("status", Some("paused")).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.message(), "The provided status filter isn't valid: 'paused'");
    }

    #[test]
    fn page_defaults_and_bounds() {
        let request = page_request(None, None).unwrap();
        assert_eq!(request.page, 1);
        assert_eq!(request.page_size, CONFIG.api.default_page_size);

        assert!(page_request(Some("0"), None).is_err());
        assert!(page_request(None, Some("0")).is_err());
        assert!(page_request(Some("abc"), None).is_err());
        let too_large = (CONFIG.api.max_page_size + 1).to_string();
        assert!(page_request(None, Some(too_large.as_str())).is_err());
    }

    #[test]
    fn patch_replaces_and_removes() {
        let mut doc = json!({ "name": "Read", "description": "Books", "status": "ongoing" });
        apply_patch(
            &mut doc,
            &ops(json!([
                { "op": "test", "path": "/name", "value": "Read" },
                { "op": "replace", "path": "/name", "value": "Read more" },
                { "op": "remove", "path": "/description" }
            ])),
        )
        .unwrap();
        assert_eq!(doc, json!({ "name": "Read more", "status": "ongoing" }));
    }

    #[test]
    fn patch_rejects_missing_targets_and_unknown_ops() {
        let mut doc = json!({ "name": "Read" });
        let err = apply_patch(&mut doc, &ops(json!([{ "op": "replace", "path": "/nope", "value": 1 }]))).unwrap_err();
        assert_eq!(err.status_code(), 400);

        let err = apply_patch(&mut doc, &ops(json!([{ "op": "move", "path": "/name" }]))).unwrap_err();
        assert_eq!(err.message(), "Unsupported patch operation 'move'");

        let err = apply_patch(&mut doc, &ops(json!([{ "op": "test", "path": "/name", "value": "Run" }]))).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}
