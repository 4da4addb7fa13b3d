mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::{course_body, id_of, TestServer};

#[tokio::test]
async fn average_cost_follows_the_course_set() -> Result<()> {
    let server = TestServer::spawn().await?;
    let publisher = server.register("John Publisher", "john@gmail.com", "publisher").await?;
    let bootcamp = server.create_bootcamp(&publisher, "Devworks Bootcamp", "02215").await?;
    let bootcamp_id = id_of(&bootcamp);
    assert!(bootcamp.get("averageCost").is_none());

    let first = server.create_course(&publisher, &bootcamp_id, "Front End", 10000.0).await?;
    assert_eq!(server.bootcamp(&bootcamp_id).await?["averageCost"], 10000.0);

    let second = server.create_course(&publisher, &bootcamp_id, "Full Stack", 12005.0).await?;
    assert_eq!(server.bootcamp(&bootcamp_id).await?["averageCost"], 11010.0);

    let updated = server
        .put(&format!("/courses/{}", id_of(&second)), Some(&publisher), json!({ "tuition": 14000 }))
        .await?;
    assert_eq!(updated.status, StatusCode::OK, "{}", updated.body);
    assert_eq!(server.bootcamp(&bootcamp_id).await?["averageCost"], 12000.0);

    let deleted = server.delete(&format!("/courses/{}", id_of(&first)), Some(&publisher)).await?;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body["data"], json!({}));
    assert_eq!(server.bootcamp(&bootcamp_id).await?["averageCost"], 14000.0);

    server.delete(&format!("/courses/{}", id_of(&second)), Some(&publisher)).await?;
    assert!(server.bootcamp(&bootcamp_id).await?["averageCost"].is_null());
    Ok(())
}

#[tokio::test]
async fn courses_are_added_by_the_bootcamp_owner() -> Result<()> {
    let server = TestServer::spawn().await?;
    let owner = server.register("John Publisher", "john@gmail.com", "publisher").await?;
    let other = server.register("Mary Publisher", "mary@gmail.com", "publisher").await?;
    let user = server.register("Jane User", "jane@gmail.com", "user").await?;
    let bootcamp = server.create_bootcamp(&owner, "Devworks Bootcamp", "02215").await?;
    let path = format!("/bootcamps/{}/courses", id_of(&bootcamp));

    let by_user = server.post(&path, Some(&user), course_body("Front End", 8000.0)).await?;
    assert_eq!(by_user.status, StatusCode::FORBIDDEN);

    let by_other = server.post(&path, Some(&other), course_body("Front End", 8000.0)).await?;
    assert_eq!(by_other.status, StatusCode::FORBIDDEN);

    let missing_id = "0b4c4a5e-3b0a-4e57-9d2a-6b1f3f9f2c11";
    let missing = server
        .post(
            &format!("/bootcamps/{}/courses", missing_id),
            Some(&owner),
            course_body("Front End", 8000.0),
        )
        .await?;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["error"], format!("No bootcamp with the id of {}", missing_id));

    let mut invalid = course_body("Front End", -1.0);
    invalid["minimumSkill"] = json!("expert");
    let invalid = server.post(&path, Some(&owner), invalid).await?;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
    let message = invalid.body["error"].as_str().unwrap_or_default();
    assert!(message.contains("Minimum skill must be beginner, intermediate or advanced"), "{}", message);

    let course = server.create_course(&owner, &id_of(&bootcamp), "Front End", 8000.0).await?;
    assert_eq!(course["bootcamp"], id_of(&bootcamp).as_str());
    assert_eq!(course["weeks"], "8");
    assert_eq!(course["scholarshipAvailable"], false);
    Ok(())
}

#[tokio::test]
async fn course_reads_embed_the_bootcamp() -> Result<()> {
    let server = TestServer::spawn().await?;
    let publisher = server.register("John Publisher", "john@gmail.com", "publisher").await?;
    let bootcamp = server.create_bootcamp(&publisher, "Devworks Bootcamp", "02215").await?;
    let bootcamp_id = id_of(&bootcamp);
    let course = server.create_course(&publisher, &bootcamp_id, "Front End", 8000.0).await?;
    server.create_course(&publisher, &bootcamp_id, "Back End", 9000.0).await?;

    let one = server.get(&format!("/courses/{}", id_of(&course)), None).await?;
    assert_eq!(one.status, StatusCode::OK);
    assert_eq!(one.body["data"]["bootcamp"]["id"], bootcamp_id.as_str());
    assert_eq!(one.body["data"]["bootcamp"]["name"], "Devworks Bootcamp");
    assert!(one.body["data"]["bootcamp"].get("careers").is_none());

    let for_bootcamp = server.get(&format!("/bootcamps/{}/courses", bootcamp_id), None).await?;
    assert_eq!(for_bootcamp.status, StatusCode::OK);
    assert_eq!(for_bootcamp.body["count"], 2);

    let missing = server.get("/courses/0b4c4a5e-3b0a-4e57-9d2a-6b1f3f9f2c11", None).await?;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn only_the_owner_or_an_admin_modifies_a_course() -> Result<()> {
    let server = TestServer::spawn().await?;
    let owner = server.register("John Publisher", "john@gmail.com", "publisher").await?;
    let other = server.register("Mary Publisher", "mary@gmail.com", "publisher").await?;
    let admin = server.admin_token().await?;
    let bootcamp = server.create_bootcamp(&owner, "Devworks Bootcamp", "02215").await?;
    let course = server.create_course(&owner, &id_of(&bootcamp), "Front End", 8000.0).await?;
    let path = format!("/courses/{}", id_of(&course));

    let refused = server.put(&path, Some(&other), json!({ "weeks": 10 })).await?;
    assert_eq!(refused.status, StatusCode::FORBIDDEN);

    let by_admin = server.put(&path, Some(&admin), json!({ "weeks": 10 })).await?;
    assert_eq!(by_admin.status, StatusCode::OK);
    assert_eq!(by_admin.body["data"]["weeks"], "10");

    let refused = server.delete(&path, Some(&other)).await?;
    assert_eq!(refused.status, StatusCode::FORBIDDEN);
    Ok(())
}
