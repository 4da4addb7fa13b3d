#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use tempfile::TempDir;

use devcamper_api::auth::generate_jwt;
use devcamper_api::database::models::{User, UserInput};
use devcamper_api::database::Collection;
use devcamper_api::routes::{self, API_PREFIX};
use devcamper_api::state::AppState;
use devcamper_api::testing::{RecordingMailer, TestContext};

pub const PASSWORD: &str = "123456";

/// The real router served in-process over an in-memory store
pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
    pub state: AppState,
    pub mailer: Arc<RecordingMailer>,
    pub upload_dir: TempDir,
}

pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
    pub set_cookie: Option<String>,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        let upload_dir = tempfile::tempdir().context("failed to create upload dir")?;
        let context = TestContext::new(upload_dir.path());

        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        let app = routes::app(context.state.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            base_url: format!("http://127.0.0.1:{}", port),
            client: reqwest::Client::new(),
            state: context.state,
            mailer: context.mailer,
            upload_dir,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    pub async fn send(&self, method: Method, path: &str, token: Option<&str>, body: Option<Value>) -> Result<Reply> {
        let mut request = self.client.request(method, self.url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await.context("request failed")?;
        into_reply(response).await
    }

    /// Send `body` verbatim with the given content type
    pub async fn send_raw(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        content_type: &str,
        body: &str,
    ) -> Result<Reply> {
        let mut request = self
            .client
            .request(method, self.url(path))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(body.to_string());
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.context("request failed")?;
        into_reply(response).await
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<Reply> {
        self.send(Method::GET, path, token, None).await
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: Value) -> Result<Reply> {
        self.send(Method::POST, path, token, Some(body)).await
    }

    pub async fn put(&self, path: &str, token: Option<&str>, body: Value) -> Result<Reply> {
        self.send(Method::PUT, path, token, Some(body)).await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> Result<Reply> {
        self.send(Method::DELETE, path, token, None).await
    }

    /// Register through the API and return the session token
    pub async fn register(&self, name: &str, email: &str, role: &str) -> Result<String> {
        let reply = self
            .post(
                "/auth/register",
                None,
                json!({ "name": name, "email": email, "password": PASSWORD, "role": role }),
            )
            .await?;
        anyhow::ensure!(reply.status == StatusCode::OK, "register failed: {}", reply.body);
        token_of(&reply)
    }

    /// Admins can not self-register, so they are written straight through the repository
    pub async fn admin_token(&self) -> Result<String> {
        let input = UserInput {
            name: Some("Admin Account".to_string()),
            email: Some("admin@gmail.com".to_string()),
            password: Some(PASSWORD.to_string()),
            role: Some("admin".to_string()),
        };
        let doc = self
            .state
            .repository
            .create(Collection::Users, input.into_new_document())
            .await?;
        let user = User::from_document(&doc)?;
        Ok(generate_jwt(user.id, &self.state.config.security)?)
    }

    pub async fn create_bootcamp(&self, token: &str, name: &str, zipcode: &str) -> Result<Value> {
        let reply = self.post("/bootcamps", Some(token), bootcamp_body(name, zipcode)).await?;
        anyhow::ensure!(reply.status == StatusCode::CREATED, "create bootcamp failed: {}", reply.body);
        Ok(reply.body["data"].clone())
    }

    pub async fn create_course(&self, token: &str, bootcamp_id: &str, title: &str, tuition: f64) -> Result<Value> {
        let reply = self
            .post(
                &format!("/bootcamps/{}/courses", bootcamp_id),
                Some(token),
                course_body(title, tuition),
            )
            .await?;
        anyhow::ensure!(reply.status == StatusCode::OK, "create course failed: {}", reply.body);
        Ok(reply.body["data"].clone())
    }

    pub async fn bootcamp(&self, id: &str) -> Result<Value> {
        let reply = self.get(&format!("/bootcamps/{}", id), None).await?;
        anyhow::ensure!(reply.status == StatusCode::OK, "get bootcamp failed: {}", reply.body);
        Ok(reply.body["data"].clone())
    }
}

pub async fn into_reply(response: reqwest::Response) -> Result<Reply> {
    let status = response.status();
    let set_cookie = response
        .headers()
        .get(reqwest::header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let text = response.text().await.context("failed to read body")?;
    let body = if text.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).with_context(|| format!("body is not JSON: {}", text))?
    };
    Ok(Reply { status, body, set_cookie })
}

pub fn token_of(reply: &Reply) -> Result<String> {
    reply.body["token"]
        .as_str()
        .map(str::to_string)
        .context("response carried no token")
}

pub fn id_of(doc: &Value) -> String {
    doc["id"].as_str().unwrap_or_default().to_string()
}

pub fn bootcamp_body(name: &str, zipcode: &str) -> Value {
    json!({
        "name": name,
        "description": format!("{} is a full stack web development bootcamp", name),
        "website": "https://devworks.com",
        "phone": "(111) 111-1111",
        "email": "enroll@devworks.com",
        "address": format!("1 Main St Anytown {}", zipcode),
        "careers": ["Web Development", "UI/UX", "Business"],
        "housing": true,
        "jobAssistance": true
    })
}

pub fn course_body(title: &str, tuition: f64) -> Value {
    json!({
        "title": title,
        "description": "Learn the fundamentals of the modern web",
        "weeks": 8,
        "tuition": tuition,
        "minimumSkill": "beginner",
        "scholarshipAvailable": false
    })
}
