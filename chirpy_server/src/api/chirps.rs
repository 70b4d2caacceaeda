//! Chirp API handlers.

use axum::{
    Json,
    extract::{Extension, Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use chirpy::{Chirp, SortOrder, UserId};
use serde::Deserialize;
use uuid::Uuid;

use super::{ApiError, AppState, chirp_error_response, error_response, json_body};
use crate::metrics;

#[derive(Debug, Deserialize)]
pub struct CreateChirpPayload {
    pub body: String,
}

/// Query parameters for `GET /api/chirps`
#[derive(Debug, Default, Deserialize)]
pub struct ListChirpsQuery {
    pub author_id: Option<String>,
    pub sort: Option<String>,
}

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| error_response(StatusCode::BAD_REQUEST, "Invalid id format"))
}

/// Post a chirp as the authenticated user.
///
/// # Errors
///
/// - `400 Bad Request`: Empty body or more than 140 characters
pub async fn create_chirp(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    payload: Result<Json<CreateChirpPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Chirp>), ApiError> {
    let payload = json_body(payload)?;

    let chirp = state
        .chirp_manager
        .create(user_id, &payload.body)
        .await
        .map_err(|e| chirp_error_response(&e))?;

    metrics::chirps_created_total();
    Ok((StatusCode::CREATED, Json(chirp)))
}

/// List chirps, oldest first unless `sort=desc`.
pub async fn list_chirps(
    State(state): State<AppState>,
    Query(query): Query<ListChirpsQuery>,
) -> Result<Json<Vec<Chirp>>, ApiError> {
    let author = query
        .author_id
        .as_deref()
        .filter(|raw| !raw.is_empty())
        .map(parse_id)
        .transpose()?;
    let order = SortOrder::from_query(query.sort.as_deref());

    let chirps = state
        .chirp_manager
        .list(author, order)
        .await
        .map_err(|e| chirp_error_response(&e))?;

    Ok(Json(chirps))
}

/// Get a single chirp.
pub async fn get_chirp(
    State(state): State<AppState>,
    Path(chirp_id): Path<String>,
) -> Result<Json<Chirp>, ApiError> {
    let chirp_id = parse_id(&chirp_id)?;

    let chirp = state
        .chirp_manager
        .get(chirp_id)
        .await
        .map_err(|e| chirp_error_response(&e))?;

    Ok(Json(chirp))
}

/// Delete a chirp owned by the authenticated user.
///
/// # Errors
///
/// - `400 Bad Request`: Malformed ID
/// - `403 Forbidden`: Chirp belongs to someone else
/// - `404 Not Found`: No such chirp
pub async fn delete_chirp(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Path(chirp_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let chirp_id = parse_id(&chirp_id)?;

    state
        .chirp_manager
        .delete(chirp_id, user_id)
        .await
        .map_err(|e| chirp_error_response(&e))?;

    Ok(StatusCode::NO_CONTENT)
}
