// handlers/bootcamps.rs - /api/v1/bootcamps handlers

use std::path::Path as FsPath;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    Extension,
};
use serde_json::Value;

use crate::database::models::BootcampInput;
use crate::database::{Collection, Document};
use crate::error::ApiError;
use crate::filter::filter_where::EARTH_RADIUS_MILES;
use crate::filter::{Filter, GeoWithin};
use crate::middleware::response::empty_object;
use crate::middleware::{AdvancedResults, ApiResponse, ApiResult, CurrentUser};
use crate::state::AppState;

use super::utils::{ApiJson, ensure_can_modify, load, parse_body};

fn not_found(id: &str) -> String {
    format!("Bootcamp not found with id of {}", id)
}

/// GET /bootcamps - filtered list with courses embedded
pub async fn list(Extension(results): Extension<AdvancedResults>) -> AdvancedResults {
    results
}

/// GET /bootcamps/:id
pub async fn get_one(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    let (_, bootcamp) = load(&state, Collection::Bootcamps, &id, not_found).await?;
    Ok(ApiResponse::success(Value::Object(bootcamp)))
}

/// POST /bootcamps - publishers may own a single bootcamp, admins any number
pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Value> {
    let input: BootcampInput = parse_body(body)?;

    if !current.is_admin() {
        let mut owned = Filter::new(Collection::Bootcamps.schema());
        owned.where_eq("user", current.id.to_string())?;
        if state.repository.find_one(Collection::Bootcamps, &owned).await?.is_some() {
            return Err(ApiError::bad_request(format!(
                "The user with ID {} has already published a bootcamp",
                current.id
            )));
        }
    }

    let bootcamp = state
        .repository
        .create(Collection::Bootcamps, input.into_new_document(&current.id.to_string()))
        .await?;
    tracing::info!("User {} published bootcamp {}", current.id, bootcamp["id"]);
    Ok(ApiResponse::created(Value::Object(bootcamp)))
}

/// PUT /bootcamps/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Value> {
    let (id, existing) = load(&state, Collection::Bootcamps, &id, not_found).await?;
    ensure_can_modify(&current, &existing, "update this bootcamp")?;

    let input: BootcampInput = parse_body(body)?;
    let bootcamp = state
        .repository
        .update(Collection::Bootcamps, id, input.into_changes())
        .await?;
    Ok(ApiResponse::success(Value::Object(bootcamp)))
}

/// DELETE /bootcamps/:id - also removes the bootcamp's courses and reviews
pub async fn delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let (id, existing) = load(&state, Collection::Bootcamps, &id, not_found).await?;
    ensure_can_modify(&current, &existing, "delete this bootcamp")?;

    state.repository.delete(Collection::Bootcamps, id).await?;
    Ok(ApiResponse::success(empty_object()))
}

/// GET /bootcamps/radius/:zipcode/:distance - distance in miles
pub async fn within_radius(
    State(state): State<AppState>,
    Path((zipcode, distance)): Path<(String, String)>,
) -> ApiResult<Vec<Value>> {
    let distance: f64 = distance
        .trim()
        .parse()
        .ok()
        .filter(|d: &f64| d.is_finite() && *d >= 0.0)
        .ok_or_else(|| ApiError::bad_request(format!("Invalid distance {}", distance)))?;

    let center = state.repository.geocoder().geocode(&zipcode).await?;

    let mut filter = Filter::new(Collection::Bootcamps.schema());
    filter.geo_within(GeoWithin {
        longitude: center.longitude,
        latitude: center.latitude,
        radius: distance / EARTH_RADIUS_MILES,
    });
    filter.order("-createdAt")?;

    let bootcamps = state.repository.find(Collection::Bootcamps, &filter).await?;
    Ok(ApiResponse::list(bootcamps.into_iter().map(Value::Object).collect()))
}

/// PUT /bootcamps/:id/photo - multipart field `file`
pub async fn upload_photo(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<String> {
    let (id, existing) = load(&state, Collection::Bootcamps, &id, not_found).await?;
    ensure_can_modify(&current, &existing, "update this bootcamp")?;
    let mut multipart = multipart?;

    let max_size = state.config.upload.max_file_upload;
    let too_large = || ApiError::bad_request(format!("Please upload an image less than {}", max_size));

    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        if e.status() == axum::http::StatusCode::PAYLOAD_TOO_LARGE {
            too_large()
        } else {
            ApiError::bad_request("Please upload a file")
        }
    })? {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field.content_type().unwrap_or_default().to_string();
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(|e| {
            if e.status() == axum::http::StatusCode::PAYLOAD_TOO_LARGE {
                too_large()
            } else {
                ApiError::bad_request("Please upload a file")
            }
        })?;
        upload = Some((content_type, file_name, bytes));
        break;
    }

    let Some((content_type, file_name, bytes)) = upload else {
        return Err(ApiError::bad_request("Please upload a file"));
    };
    if !content_type.starts_with("image") {
        return Err(ApiError::bad_request("Please upload an image file"));
    }
    if bytes.len() > max_size {
        return Err(too_large());
    }

    let extension = FsPath::new(&file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default();
    let photo = format!("photo_{}{}", id, extension);

    let directory = &state.config.upload.file_upload_path;
    let write = async {
        tokio::fs::create_dir_all(directory).await?;
        tokio::fs::write(directory.join(&photo), &bytes).await
    };
    write.await.map_err(|e| {
        tracing::error!("Writing {} to {} failed: {}", photo, directory.display(), e);
        ApiError::internal_server_error("Problem with file upload")
    })?;

    let mut changes = Document::new();
    changes.insert("photo".to_string(), Value::String(photo.clone()));
    state
        .repository
        .update_unchecked(Collection::Bootcamps, id, changes)
        .await?;

    Ok(ApiResponse::success(photo))
}
