mod common;

use anyhow::Result;
use axum::http::StatusCode;

use common::{create_habit, create_tag, get, HATEOAS};

#[tokio::test]
async fn selected_fields_follow_id_in_request_order() -> Result<()> {
    let app = common::app();
    let id = create_habit(&app, "Meditate", "binary", 1).await?;

    let res = get(&app, "/habits?fields=status,NAME", None).await?;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    let expected = format!(r#""items":[{{"id":"{}","status":"ongoing","name":"Meditate"}}]"#, id);
    assert!(res.body.contains(&expected), "{}", res.body);

    Ok(())
}

#[tokio::test]
async fn no_selection_keeps_declared_order() -> Result<()> {
    let app = common::app();
    let id = create_tag(&app, "focus").await?;

    let res = get(&app, &format!("/tags/{}", id), None).await?;
    assert_eq!(res.status, StatusCode::OK);
    let keys: Vec<String> = res.json()?.as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys.len(), 5);
    let positions: Vec<usize> = ["\"id\"", "\"name\"", "\"description\"", "\"createdAtUtc\"", "\"updatedAtUtc\""]
        .iter()
        .map(|key| res.body.find(key).expect("key present"))
        .collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]), "{}", res.body);

    Ok(())
}

#[tokio::test]
async fn unknown_field_rejects_request() -> Result<()> {
    let app = common::app();
    let id = create_habit(&app, "Meditate", "binary", 1).await?;

    let res = get(&app, "/habits?fields=name,mood", None).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST, "{}", res.body);
    assert!(res.json()?["message"].as_str().unwrap().contains("mood"));

    let res = get(&app, &format!("/habits/{}?fields=mood", id), None).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    // Rejected before the lookup, so an unknown id still reports the bad field
    let res = get(&app, "/habits/h_missing?fields=mood", None).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn single_habit_shapes_tags() -> Result<()> {
    let app = common::app();
    let id = create_habit(&app, "Meditate", "binary", 1).await?;

    let res = get(&app, &format!("/habits/{}?fields=tags", id), None).await?;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(res.body, format!(r#"{{"id":"{}","tags":[]}}"#, id));

    Ok(())
}

#[tokio::test]
async fn links_come_after_shaped_fields() -> Result<()> {
    let app = common::app();
    let id = create_habit(&app, "Meditate", "binary", 1).await?;

    let res = get(&app, &format!("/habits/{}?fields=name", id), Some(HATEOAS)).await?;
    assert_eq!(res.status, StatusCode::OK);
    let prefix = format!(r#"{{"id":"{}","name":"Meditate","links":["#, id);
    assert!(res.body.starts_with(&prefix), "{}", res.body);

    // `fields` is echoed on the self link
    let body = res.json()?;
    let self_href = body["links"][0]["href"].as_str().unwrap();
    assert_eq!(self_href, format!("/habits/{}?fields=name&api-version=1.0", id));

    Ok(())
}

#[tokio::test]
async fn collection_items_share_one_selection() -> Result<()> {
    let app = common::app();
    let first = create_tag(&app, "focus").await?;
    let second = create_tag(&app, "health").await?;

    let res = get(&app, "/tags?sort=name&fields=NAME", Some(HATEOAS)).await?;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    for (id, name) in [(&first, "focus"), (&second, "health")] {
        let prefix = format!(r#"{{"id":"{}","name":"{}","links":[{{"href":"/tags/{}?fields=NAME"#, id, name, id);
        assert!(res.body.contains(&prefix), "{}", res.body);
    }

    let res = get(&app, "/tags?sort=name&fields=name", None).await?;
    let expected = format!(r#"{{"items":[{{"id":"{}","name":"focus"}},{{"id":"{}","name":"health"}}]}}"#, first, second);
    assert_eq!(res.body, expected);

    let res = get(&app, "/tags?fields=colour", Some(HATEOAS)).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    Ok(())
}
