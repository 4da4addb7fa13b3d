mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::{id_of, TestServer, PASSWORD};

#[tokio::test]
async fn user_management_is_admin_only() -> Result<()> {
    let server = TestServer::spawn().await?;
    let publisher = server.register("John Publisher", "john@gmail.com", "publisher").await?;

    let refused = server.get("/users", Some(&publisher)).await?;
    assert_eq!(refused.status, StatusCode::FORBIDDEN);
    assert_eq!(refused.body["error"], "User role publisher is not authorized to access this resource");

    let anonymous = server.get("/users", None).await?;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn admins_list_users_without_secrets() -> Result<()> {
    let server = TestServer::spawn().await?;
    server.register("John Publisher", "john@gmail.com", "publisher").await?;
    server.register("Jane User", "jane@gmail.com", "user").await?;
    let admin = server.admin_token().await?;

    let all = server.get("/users", Some(&admin)).await?;
    assert_eq!(all.status, StatusCode::OK, "{}", all.body);
    assert_eq!(all.body["count"], 3);
    let users = all.body["data"].as_array().cloned().unwrap_or_default();
    assert!(users.iter().all(|u| u.get("password").is_none()));

    let publishers = server.get("/users?role=publisher", Some(&admin)).await?;
    assert_eq!(publishers.body["count"], 1);
    assert_eq!(publishers.body["data"][0]["email"], "john@gmail.com");

    let secret = server.get("/users?select=name,password", Some(&admin)).await?;
    assert_eq!(secret.status, StatusCode::BAD_REQUEST);
    let secret = server.get("/users?password=x", Some(&admin)).await?;
    assert_eq!(secret.status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn admin_crud_round_trip() -> Result<()> {
    let server = TestServer::spawn().await?;
    let admin = server.admin_token().await?;

    let created = server
        .post(
            "/users",
            Some(&admin),
            json!({ "name": "Kevin Smith", "email": "kevin@gmail.com", "password": PASSWORD, "role": "publisher" }),
        )
        .await?;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.body);
    assert!(created.body["data"].get("password").is_none());
    let path = format!("/users/{}", id_of(&created.body["data"]));

    let fetched = server.get(&path, Some(&admin)).await?;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["data"]["role"], "publisher");

    let updated = server.put(&path, Some(&admin), json!({ "name": "Kevin J. Smith" })).await?;
    assert_eq!(updated.status, StatusCode::OK, "{}", updated.body);
    assert_eq!(updated.body["data"]["name"], "Kevin J. Smith");

    let login = server
        .post("/auth/login", None, json!({ "email": "kevin@gmail.com", "password": PASSWORD }))
        .await?;
    assert_eq!(login.status, StatusCode::OK);

    let deleted = server.delete(&path, Some(&admin)).await?;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body["data"], json!({}));

    let gone = server.get(&path, Some(&admin)).await?;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    Ok(())
}
