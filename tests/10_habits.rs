mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{create_habit, get, habit_body, send};

#[tokio::test]
async fn create_then_fetch_habit() -> Result<()> {
    let app = common::app();

    let res = send(&app, Method::POST, "/habits", None, Some(habit_body("Read books", "measurable", 1))).await?;
    assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
    let created = res.json()?;
    let id = created["id"].as_str().unwrap().to_string();
    assert!(id.starts_with("h_"), "unexpected id {}", id);
    assert_eq!(created["status"], "ongoing");
    assert_eq!(created["isArchived"], false);

    let location = res.location.expect("Location header");
    assert_eq!(location, format!("/habits/{}?api-version=1.0", id));

    let res = get(&app, &location, None).await?;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    let body = res.json()?;
    assert_eq!(body["name"], "Read books");
    assert_eq!(body["frequency"], json!({ "type": "daily", "timesPerPeriod": 1 }));
    assert_eq!(body["tags"], json!([]));
    assert!(body.get("links").is_none(), "plain JSON must not carry links: {}", body);

    Ok(())
}

#[tokio::test]
async fn unknown_habit_is_not_found() -> Result<()> {
    let app = common::app();

    let res = get(&app, "/habits/h_missing", None).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.json()?["code"], "NOT_FOUND");

    let res = send(&app, Method::DELETE, "/habits/h_missing", None, None).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn invalid_habit_is_rejected_with_field_errors() -> Result<()> {
    let app = common::app();

    let mut body = habit_body("ab", "binary", 0);
    body["target"]["unit"] = json!("");
    let res = send(&app, Method::POST, "/habits", None, Some(body)).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST, "{}", res.body);

    let error = res.json()?;
    assert_eq!(error["code"], "VALIDATION_ERROR");
    assert!(error["field_errors"].get("name").is_some(), "{}", error);

    let res = get(&app, "/habits", None).await?;
    assert_eq!(res.json()?["totalCount"], 0);

    Ok(())
}

#[tokio::test]
async fn put_patch_and_delete_habit() -> Result<()> {
    let app = common::app();
    let id = create_habit(&app, "Morning run", "binary", 1).await?;
    let uri = format!("/habits/{}", id);

    let res = send(&app, Method::PUT, &uri, None, Some(habit_body("Evening run", "binary", 2))).await?;
    assert_eq!(res.status, StatusCode::NO_CONTENT, "{}", res.body);
    assert!(res.body.is_empty());

    let body = get(&app, &uri, None).await?.json()?;
    assert_eq!(body["name"], "Evening run");
    assert_eq!(body["frequency"]["timesPerPeriod"], 2);
    assert!(!body["updatedAtUtc"].is_null());

    let patch = json!([
        { "op": "replace", "path": "/name", "value": "Night run" },
        { "op": "remove", "path": "/description" },
    ]);
    let res = send(&app, Method::PATCH, &uri, None, Some(patch)).await?;
    assert_eq!(res.status, StatusCode::NO_CONTENT, "{}", res.body);

    let body = get(&app, &uri, None).await?.json()?;
    assert_eq!(body["name"], "Night run");
    assert!(body["description"].is_null());

    let res = send(&app, Method::DELETE, &uri, None, None).await?;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    assert_eq!(get(&app, &uri, None).await?.status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn patch_that_breaks_validation_is_rejected() -> Result<()> {
    let app = common::app();
    let id = create_habit(&app, "Stretching", "binary", 1).await?;
    let uri = format!("/habits/{}", id);

    let patch = json!([{ "op": "replace", "path": "/name", "value": "x" }]);
    let res = send(&app, Method::PATCH, &uri, None, Some(patch)).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST, "{}", res.body);

    assert_eq!(get(&app, &uri, None).await?.json()?["name"], "Stretching");

    Ok(())
}

#[tokio::test]
async fn filters_narrow_the_collection() -> Result<()> {
    let app = common::app();
    create_habit(&app, "Drink water", "binary", 8).await?;
    create_habit(&app, "Read books", "measurable", 1).await?;
    create_habit(&app, "Read news", "binary", 1).await?;

    let body = get(&app, "/habits?q=READ", None).await?.json()?;
    assert_eq!(body["totalCount"], 2, "{}", body);

    let body = get(&app, "/habits?q=read&type=binary", None).await?.json()?;
    assert_eq!(body["totalCount"], 1, "{}", body);
    assert_eq!(body["items"][0]["name"], "Read news");

    let res = get(&app, "/habits?type=sometimes", None).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.json()?["message"].as_str().unwrap().contains("sometimes"));

    Ok(())
}

#[tokio::test]
async fn malformed_body_uses_error_envelope() -> Result<()> {
    let app = common::app();

    let res = send(&app, Method::POST, "/habits", None, Some(json!({ "name": 5 }))).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST, "{}", res.body);
    let error = res.json()?;
    assert_eq!(error["code"], "INVALID_JSON");
    assert_eq!(error["error"], true);

    Ok(())
}
