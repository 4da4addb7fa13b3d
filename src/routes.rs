use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::database::{Collection, Populate};
use crate::handlers::{auth, bootcamps, courses, health, reviews, users};
use crate::middleware::{
    admin_only, advanced_results, protect, publisher_or_admin, user_or_admin, ResultsSpec,
};
use crate::state::AppState;

pub const API_PREFIX: &str = "/api/v1";

/// Full application router
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(public_routes())
        .merge(list_routes(&state))
        .merge(session_routes(&state))
        .merge(publisher_routes(&state))
        .merge(reviewer_routes(&state))
        .merge(admin_routes(&state));

    Router::new()
        .nest(API_PREFIX, api)
        .layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/bootcamps/:id", get(bootcamps::get_one))
        .route("/bootcamps/radius/:zipcode/:distance", get(bootcamps::within_radius))
        .route("/bootcamps/:id/courses", get(courses::list_for_bootcamp))
        .route("/bootcamps/:id/reviews", get(reviews::list_for_bootcamp))
        .route("/courses/:id", get(courses::get_one))
        .route("/reviews/:id", get(reviews::get_one))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/forgotpassword", post(auth::forgot_password))
        .route("/auth/resetpassword/:resettoken", put(auth::reset_password))
}

/// Public list endpoints backed by the advanced-results middleware
fn list_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(
            Router::new()
                .route("/bootcamps", get(bootcamps::list))
                .route_layer(from_fn_with_state(
                    (state.clone(), ResultsSpec::new(Collection::Bootcamps, Some(Populate::Courses))),
                    advanced_results,
                )),
        )
        .merge(
            Router::new()
                .route("/courses", get(courses::list))
                .route_layer(from_fn_with_state(
                    (state.clone(), ResultsSpec::new(Collection::Courses, Some(Populate::Bootcamp))),
                    advanced_results,
                )),
        )
        .merge(
            Router::new()
                .route("/reviews", get(reviews::list))
                .route_layer(from_fn_with_state(
                    (state.clone(), ResultsSpec::new(Collection::Reviews, Some(Populate::Bootcamp))),
                    advanced_results,
                )),
        )
}

/// Any signed-in user
fn session_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(auth::me))
        .route("/auth/logout", get(auth::logout))
        .route("/auth/updatedetails", put(auth::update_details))
        .route("/auth/updatepassword", put(auth::update_password))
        .route_layer(from_fn_with_state(state.clone(), protect))
}

/// Publishers and admins: bootcamp and course writes
fn publisher_routes(state: &AppState) -> Router<AppState> {
    let photo_limit = state.config.upload.max_file_upload.saturating_mul(2);

    Router::new()
        .route("/bootcamps", post(bootcamps::create))
        .route("/bootcamps/:id", put(bootcamps::update).delete(bootcamps::delete))
        .route(
            "/bootcamps/:id/photo",
            put(bootcamps::upload_photo).layer(DefaultBodyLimit::max(photo_limit)),
        )
        .route("/bootcamps/:id/courses", post(courses::create))
        .route("/courses/:id", put(courses::update).delete(courses::delete))
        .route_layer(from_fn(publisher_or_admin))
        .route_layer(from_fn_with_state(state.clone(), protect))
}

/// Users and admins: review writes
fn reviewer_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/bootcamps/:id/reviews", post(reviews::create))
        .route("/reviews/:id", put(reviews::update).delete(reviews::delete))
        .route_layer(from_fn(user_or_admin))
        .route_layer(from_fn_with_state(state.clone(), protect))
}

/// Admin-only user management
fn admin_routes(state: &AppState) -> Router<AppState> {
    let list = Router::new()
        .route("/users", get(users::list))
        .route_layer(from_fn_with_state(
            (state.clone(), ResultsSpec::new(Collection::Users, None)),
            advanced_results,
        ));

    Router::new()
        .merge(list)
        .route("/users", post(users::create))
        .route("/users/:id", get(users::get_one).put(users::update).delete(users::delete))
        .route_layer(from_fn(admin_only))
        .route_layer(from_fn_with_state(state.clone(), protect))
}

/// Permissive in development when no origins are configured; otherwise only
/// the listed origins, with credentials so the session cookie travels
fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins = &config.security.cors_origins;
    if origins.is_empty() && !config.is_production() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}
