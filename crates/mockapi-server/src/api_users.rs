//! User resource handlers.

use crate::api::{run_blocking, ApiError};
use crate::AppState;
use axum::{
    extract::{Extension, FromRequest, Path, Query, Request},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use mockapi_types::{NewUser, User, UserUpdate};
use std::sync::Arc;

fn user_not_found() -> ApiError {
    ApiError::NotFound("User not found".to_string())
}

/// GET /users/
pub async fn list_users_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = run_blocking("list_users", move || state.users.list_all()).await?;
    Ok(Json(users))
}

/// GET /users/{id}
pub async fn get_user_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<User>, ApiError> {
    run_blocking("get_user", move || state.users.get_by_id(id))
        .await?
        .map(Json)
        .ok_or_else(user_not_found)
}

/// Reads a [`NewUser`] from a JSON body, or from the `name`, `email` and
/// `age` query parameters when the request has no `Content-Type`.
async fn read_new_user(request: Request) -> Result<NewUser, Response> {
    if request.headers().contains_key(header::CONTENT_TYPE) {
        let Json(user) = Json::<NewUser>::from_request(request, &())
            .await
            .map_err(IntoResponse::into_response)?;
        Ok(user)
    } else {
        let Query(user) =
            Query::<NewUser>::try_from_uri(request.uri()).map_err(IntoResponse::into_response)?;
        Ok(user)
    }
}

/// POST /users/
///
/// Accepts either a JSON body or query parameters
/// (`/users/?name=Z&email=z%40example.com&age=40`). Responds `201 Created`
/// with the stored user, or `409 Conflict` if the email is already taken.
pub async fn create_user_handler(
    Extension(state): Extension<Arc<AppState>>,
    request: Request,
) -> Result<(StatusCode, Json<User>), Response> {
    let payload = read_new_user(request).await?;
    let user = run_blocking("create_user", move || state.users.create(&payload))
        .await
        .map_err(IntoResponse::into_response)?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// PATCH /users/{id}
pub async fn update_user_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<UserUpdate>,
) -> Result<Json<User>, ApiError> {
    run_blocking("update_user", move || state.users.update(id, &payload))
        .await?
        .map(Json)
        .ok_or_else(user_not_found)
}
