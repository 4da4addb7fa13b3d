mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{id_of, TestServer};

const ZIPCODES: [&str; 4] = ["02215", "01854", "05405", "02881"];

async fn seed_bootcamps(server: &TestServer, token: &str, count: usize) -> Result<()> {
    for i in 0..count {
        server
            .create_bootcamp(token, &format!("Bootcamp {:02}", i), ZIPCODES[i % ZIPCODES.len()])
            .await?;
    }
    Ok(())
}

fn keys(doc: &Value) -> Vec<String> {
    let mut keys: Vec<String> = doc.as_object().map(|m| m.keys().cloned().collect()).unwrap_or_default();
    keys.sort();
    keys
}

#[tokio::test]
async fn second_page_of_fifteen() -> Result<()> {
    let server = TestServer::spawn().await?;
    let admin = server.admin_token().await?;
    seed_bootcamps(&server, &admin, 15).await?;

    let first = server.get("/bootcamps?limit=10", None).await?;
    assert_eq!(first.status, StatusCode::OK, "{}", first.body);
    assert_eq!(first.body["count"], 10);
    assert_eq!(first.body["pagination"], json!({ "next": { "page": 2, "limit": 10 } }));

    let second = server.get("/bootcamps?page=2&limit=10", None).await?;
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.body["success"], true);
    assert_eq!(second.body["count"], 5);
    assert_eq!(second.body["data"].as_array().map(Vec::len), Some(5));
    assert_eq!(second.body["pagination"], json!({ "prev": { "page": 1, "limit": 10 } }));

    let default_page = server.get("/bootcamps", None).await?;
    assert_eq!(default_page.body["count"], 10);
    Ok(())
}

#[tokio::test]
async fn comparison_filters_and_sorting() -> Result<()> {
    let server = TestServer::spawn().await?;
    let publisher = server.register("John Publisher", "john@gmail.com", "publisher").await?;
    let bootcamp = server.create_bootcamp(&publisher, "Devworks Bootcamp", "02215").await?;
    let bootcamp_id = id_of(&bootcamp);
    for (title, tuition) in [("Intro", 500.0), ("Front End", 1000.0), ("Full Stack", 1500.0)] {
        server.create_course(&publisher, &bootcamp_id, title, tuition).await?;
    }

    let expensive = server.get("/courses?tuition[gte]=1000", None).await?;
    assert_eq!(expensive.status, StatusCode::OK, "{}", expensive.body);
    assert_eq!(expensive.body["count"], 2);
    let data = expensive.body["data"].as_array().cloned().unwrap_or_default();
    assert!(data.iter().all(|c| c["tuition"].as_f64().unwrap_or(0.0) >= 1000.0));

    let cheap = server.get("/courses?tuition[lt]=1000", None).await?;
    assert_eq!(cheap.body["count"], 1);
    assert_eq!(cheap.body["data"][0]["title"], "Intro");

    let sorted = server.get("/courses?sort=-tuition", None).await?;
    assert_eq!(sorted.body["data"][0]["tuition"], 1500.0);
    assert_eq!(sorted.body["data"][2]["tuition"], 500.0);

    let exact = server.get("/courses?minimumSkill=beginner&title=Front%20End", None).await?;
    assert_eq!(exact.body["count"], 1);
    assert_eq!(exact.body["data"][0]["bootcamp"]["name"], "Devworks Bootcamp");
    Ok(())
}

#[tokio::test]
async fn select_projects_fields_and_bootcamps_embed_courses() -> Result<()> {
    let server = TestServer::spawn().await?;
    let publisher = server.register("John Publisher", "john@gmail.com", "publisher").await?;
    let bootcamp = server.create_bootcamp(&publisher, "Devworks Bootcamp", "02215").await?;
    server.create_course(&publisher, &id_of(&bootcamp), "Front End", 8000.0).await?;

    let full = server.get("/bootcamps", None).await?;
    let courses = full.body["data"][0]["courses"].as_array().cloned().unwrap_or_default();
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0]["title"], "Front End");

    let projected = server.get("/bootcamps?select=name,housing", None).await?;
    assert_eq!(projected.status, StatusCode::OK);
    assert_eq!(keys(&projected.body["data"][0]), vec!["courses", "housing", "id", "name"]);

    let by_city = server.get("/bootcamps?location.city=Boston", None).await?;
    assert_eq!(by_city.body["count"], 1);
    let elsewhere = server.get("/bootcamps?location.city=Lowell", None).await?;
    assert_eq!(elsewhere.body["count"], 0);
    assert_eq!(elsewhere.body["pagination"], json!({}));
    Ok(())
}

#[tokio::test]
async fn bad_queries_are_rejected() -> Result<()> {
    let server = TestServer::spawn().await?;

    let unknown_field = server.get("/bootcamps?color=blue", None).await?;
    assert_eq!(unknown_field.status, StatusCode::BAD_REQUEST);
    assert_eq!(unknown_field.body["success"], false);

    let unknown_operator = server.get("/courses?tuition[near]=5", None).await?;
    assert_eq!(unknown_operator.status, StatusCode::BAD_REQUEST);

    let bad_number = server.get("/courses?tuition[gte]=cheap", None).await?;
    assert_eq!(bad_number.status, StatusCode::BAD_REQUEST);

    let bad_sort = server.get("/courses?sort=-secret", None).await?;
    assert_eq!(bad_sort.status, StatusCode::BAD_REQUEST);
    Ok(())
}
