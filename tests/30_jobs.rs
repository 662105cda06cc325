mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn create_get_update_delete() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let client = reqwest::Client::new();
    let admin = common::admin_token();

    let handle = common::create_company(&server, 3).await?;
    let id = common::create_job(&server, &handle, json!({ "title": "Chef", "salary": 50, "equity": "0.5" })).await?;

    let res = client.get(server.url(&format!("/jobs/{}", id))).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["job"]["title"], "Chef");
    assert_eq!(body["job"]["companyHandle"], json!(handle));

    let res = client
        .patch(server.url(&format!("/jobs/{}", id)))
        .bearer_auth(&admin)
        .json(&json!({ "salary": 75, "equity": null }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["job"]["salary"], 75);
    assert_eq!(body["job"]["equity"], Value::Null);

    let res = client.delete(server.url(&format!("/jobs/{}", id))).bearer_auth(&admin).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["deleted"], json!(id.to_string()));

    let res = client.get(server.url(&format!("/jobs/{}", id))).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await?;
    assert_eq!(body["error"]["message"], json!(format!("No job: {}", id)));
    Ok(())
}

#[tokio::test]
async fn job_for_missing_company_is_404() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };

    let res = reqwest::Client::new()
        .post(server.url("/jobs"))
        .bearer_auth(common::admin_token())
        .json(&json!({ "title": "Ghost", "companyHandle": "no-such-company" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn search_filters() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let client = reqwest::Client::new();
    let handle = common::create_company(&server, 3).await?;
    // Titles carry the handle so the search only sees this test's jobs.
    let rich = common::create_job(&server, &handle, json!({ "title": format!("{} rich", handle), "salary": 1000, "equity": "0.2" })).await?;
    let poor = common::create_job(&server, &handle, json!({ "title": format!("{} poor", handle), "salary": 10, "equity": "0" })).await?;

    let res = client.get(server.url("/jobs")).query(&[("title", handle.as_str())]).send().await?;
    let body: Value = res.json().await?;
    let ids: Vec<i64> = body["jobs"].as_array().into_iter().flatten().filter_map(|j| j["id"].as_i64()).collect();
    assert_eq!(ids, vec![rich, poor]);

    let res = client
        .get(server.url("/jobs"))
        .query(&[("title", handle.as_str()), ("minSalary", "500")])
        .send()
        .await?;
    let body: Value = res.json().await?;
    assert_eq!(body["jobs"].as_array().map(|a| a.len()), Some(1));
    assert_eq!(body["jobs"][0]["id"], json!(rich));

    let res = client
        .get(server.url("/jobs"))
        .query(&[("title", handle.as_str()), ("hasEquity", "true")])
        .send()
        .await?;
    let body: Value = res.json().await?;
    assert_eq!(body["jobs"].as_array().map(|a| a.len()), Some(1));

    let res = client
        .get(server.url("/jobs"))
        .query(&[("title", handle.as_str()), ("hasEquity", "false")])
        .send()
        .await?;
    let body: Value = res.json().await?;
    assert_eq!(body["jobs"].as_array().map(|a| a.len()), Some(2));
    Ok(())
}

#[tokio::test]
async fn unknown_filter_is_bad_request() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };

    let res = reqwest::Client::new()
        .get(server.url("/jobs"))
        .query(&[("companyHandle", "c1")])
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn title_search_treats_wildcards_literally() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let handle = common::create_company(&server, 1).await?;
    common::create_job(&server, &handle, json!({ "title": format!("{} 100% remote", handle) })).await?;
    common::create_job(&server, &handle, json!({ "title": format!("{} 1000 remote", handle) })).await?;
    let client = reqwest::Client::new();

    let res = client
        .get(server.url("/jobs"))
        .query(&[("title", format!("{} 100%", handle))])
        .send()
        .await?;
    let body: Value = res.json().await?;
    assert_eq!(body["jobs"].as_array().map(|a| a.len()), Some(1));
    assert_eq!(body["jobs"][0]["title"], json!(format!("{} 100% remote", handle)));
    Ok(())
}
