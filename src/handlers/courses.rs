// handlers/courses.rs - /api/v1/courses and /api/v1/bootcamps/:id/courses handlers

use axum::{
    extract::{Path, State},
    Extension,
};
use serde_json::Value;

use crate::database::models::CourseInput;
use crate::database::{Collection, Populate};
use crate::filter::Filter;
use crate::middleware::response::empty_object;
use crate::middleware::{AdvancedResults, ApiResponse, ApiResult, CurrentUser};
use crate::state::AppState;

use super::utils::{ApiJson, ensure_can_modify, load, parse_body};

fn not_found(id: &str) -> String {
    format!("No course with the id of {}", id)
}

/// GET /courses - filtered list with the bootcamp summary embedded
pub async fn list(Extension(results): Extension<AdvancedResults>) -> AdvancedResults {
    results
}

/// GET /bootcamps/:id/courses
pub async fn list_for_bootcamp(State(state): State<AppState>, Path(bootcamp_id): Path<String>) -> ApiResult<Vec<Value>> {
    let bootcamp_id = crate::database::Repository::parse_id(&bootcamp_id)?;

    let mut filter = Filter::new(Collection::Courses.schema());
    filter.where_eq("bootcamp", bootcamp_id.to_string())?;
    filter.order("createdAt")?;

    let courses = state.repository.find(Collection::Courses, &filter).await?;
    Ok(ApiResponse::list(courses.into_iter().map(Value::Object).collect()))
}

/// GET /courses/:id
pub async fn get_one(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    let (_, course) = load(&state, Collection::Courses, &id, not_found).await?;
    let mut courses = [course];
    state.repository.populate(Populate::Bootcamp, &mut courses).await?;
    let [course] = courses;
    Ok(ApiResponse::success(Value::Object(course)))
}

/// POST /bootcamps/:id/courses
pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(bootcamp_id): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Value> {
    let (bootcamp_id, bootcamp) = load(&state, Collection::Bootcamps, &bootcamp_id, |id| {
        format!("No bootcamp with the id of {}", id)
    })
    .await?;
    ensure_can_modify(&current, &bootcamp, &format!("add a course to bootcamp {}", bootcamp_id))?;

    let input: CourseInput = parse_body(body)?;
    let course = state
        .repository
        .create(
            Collection::Courses,
            input.into_new_document(&bootcamp_id.to_string(), &current.id.to_string()),
        )
        .await?;
    Ok(ApiResponse::success(Value::Object(course)))
}

/// PUT /courses/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Value> {
    let (id, existing) = load(&state, Collection::Courses, &id, not_found).await?;
    ensure_can_modify(&current, &existing, &format!("update course {}", id))?;

    let input: CourseInput = parse_body(body)?;
    let course = state
        .repository
        .update(Collection::Courses, id, input.into_changes())
        .await?;
    Ok(ApiResponse::success(Value::Object(course)))
}

/// DELETE /courses/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let (id, existing) = load(&state, Collection::Courses, &id, not_found).await?;
    ensure_can_modify(&current, &existing, &format!("delete course {}", id))?;

    state.repository.delete(Collection::Courses, id).await?;
    Ok(ApiResponse::success(empty_object()))
}
