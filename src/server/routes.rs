//! Movie routes.
//!
//! Handlers only translate HTTP to coordinator calls; every cache decision
//! is made by `AccessCoordinator`.

use axum::extract::{Path, Query, State};
use axum::http::HeaderName;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::error::ApiError;
use super::AppState;
use crate::coordinator::Sourced;
use crate::database::MoviePatch;

/// Response header naming where a read was served from.
pub const CACHE_SOURCE_HEADER: HeaderName = HeaderName::from_static("x-cache-source");

/// `?bypassCache=true` skips the cache. Anything else, or nothing, does not.
#[derive(Debug, Default, Deserialize)]
pub struct CacheParams {
    #[serde(rename = "bypassCache")]
    bypass_cache: Option<String>,
}

impl CacheParams {
    pub fn bypass(&self) -> bool {
        self.bypass_cache.as_deref() == Some("true")
    }
}

pub fn movie_routes() -> Router<AppState> {
    Router::new()
        .route("/movies", get(list_movies))
        .route(
            "/movie/:id",
            get(get_movie).patch(update_movie).delete(delete_movie),
        )
}

fn sourced_json<T: Serialize>(sourced: Sourced<T>) -> Response {
    (
        [(CACHE_SOURCE_HEADER, sourced.source.as_str())],
        Json(sourced.value),
    )
        .into_response()
}

async fn list_movies(
    State(state): State<AppState>,
    Query(params): Query<CacheParams>,
) -> Result<Response, ApiError> {
    let movies = state.coordinator.movies(params.bypass()).await?;
    Ok(sourced_json(movies))
}

async fn get_movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<CacheParams>,
) -> Result<Response, ApiError> {
    let movie = state.coordinator.movie(&id, params.bypass()).await?;
    Ok(sourced_json(movie))
}

async fn update_movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<CacheParams>,
    Json(patch): Json<MoviePatch>,
) -> Result<Response, ApiError> {
    let movie = state
        .coordinator
        .update_movie(&id, &patch, params.bypass())
        .await?;
    Ok(Json(movie).into_response())
}

async fn delete_movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<CacheParams>,
) -> Result<Response, ApiError> {
    state.coordinator.delete_movie(&id, params.bypass()).await?;
    Ok(Json(json!({ "message": "Movie deleted" })).into_response())
}
