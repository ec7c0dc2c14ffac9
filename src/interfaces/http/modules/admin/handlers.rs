//! Admin user CRUD handlers
//!
//! Every handler requires the `admin` scope before touching the store.
//! Path, query and body extraction failures are held back until the caller
//! is authorized, so a non-admin always sees 401/403 first.

use std::sync::Arc;

use axum::{
    extract::rejection::{PathRejection, QueryRejection},
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::dto::{CreateUserParams, CreateUserRequest, UpdateUserRequest, UserDto};
use crate::application::identity::{Authorizer, UserService};
use crate::domain::Role;
use crate::infrastructure::database::UserRepository;
use crate::interfaces::http::common::{ApiError, ApiResponse, ApiResult, ValidatedJson};
use crate::interfaces::http::middleware::BearerToken;

const ADMIN: &[Role] = &[Role::Admin];

/// Admin handler state, concrete over `UserRepository` for Axum compatibility.
#[derive(Clone)]
pub struct AdminState {
    pub users: Arc<UserService<UserRepository>>,
    pub authorizer: Authorizer,
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/user",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(CreateUserParams),
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = ApiResponse<UserDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin scope required"),
        (status = 409, description = "Email already in use"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn create_user(
    State(state): State<AdminState>,
    BearerToken(token): BearerToken,
    params: Result<Query<CreateUserParams>, QueryRejection>,
    body: Result<ValidatedJson<CreateUserRequest>, ApiError>,
) -> ApiResult<(StatusCode, Json<ApiResponse<UserDto>>)> {
    state.authorizer.authorize(&token, ADMIN)?;
    let Query(params) = params?;
    let ValidatedJson(request) = body?;

    let user = state
        .users
        .create_user(request.into(), params.send_email)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(user.into()))))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/user",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All users", body = ApiResponse<Vec<UserDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin scope required")
    )
)]
pub async fn list_users(
    State(state): State<AdminState>,
    BearerToken(token): BearerToken,
) -> ApiResult<Json<ApiResponse<Vec<UserDto>>>> {
    state.authorizer.authorize(&token, ADMIN)?;

    let users = state.users.list_users().await?;
    Ok(Json(ApiResponse::success(
        users.into_iter().map(UserDto::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/user/{id}",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User details", body = ApiResponse<UserDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_user(
    State(state): State<AdminState>,
    BearerToken(token): BearerToken,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<ApiResponse<UserDto>>> {
    state.authorizer.authorize(&token, ADMIN)?;
    let Path(id) = id?;

    let user = state.users.get_user(id).await?;
    Ok(Json(ApiResponse::success(user.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/user/{id}",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = ApiResponse<UserDto>),
        (status = 404, description = "Not found"),
        (status = 409, description = "Email already in use")
    )
)]
pub async fn update_user(
    State(state): State<AdminState>,
    BearerToken(token): BearerToken,
    id: Result<Path<Uuid>, PathRejection>,
    body: Result<ValidatedJson<UpdateUserRequest>, ApiError>,
) -> ApiResult<Json<ApiResponse<UserDto>>> {
    state.authorizer.authorize(&token, ADMIN)?;
    let Path(id) = id?;
    let ValidatedJson(request) = body?;

    let user = state.users.update_user(id, request.into()).await?;
    Ok(Json(ApiResponse::success(user.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/user/{id}",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_user(
    State(state): State<AdminState>,
    BearerToken(token): BearerToken,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<StatusCode> {
    state.authorizer.authorize(&token, ADMIN)?;
    let Path(id) = id?;

    state.users.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
