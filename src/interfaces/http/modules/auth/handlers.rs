//! Authentication handlers: token issuance, profile and password reset

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Form, Json};

use super::dto::{ConfirmResetRequest, ProfileDto, ResetPasswordRequest, TokenRequest, TokenResponse};
use crate::application::identity::{Authorizer, UserService};
use crate::domain::Role;
use crate::infrastructure::database::UserRepository;
use crate::interfaces::http::common::{ApiResponse, ApiResult, MessageResponse, ValidatedJson};
use crate::interfaces::http::middleware::BearerToken;
use crate::interfaces::http::modules::admin::UserDto;

#[derive(Clone)]
pub struct AuthState {
    pub users: Arc<UserService<UserRepository>>,
    pub authorizer: Authorizer,
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/token",
    tag = "Authentication",
    request_body(content = TokenRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Access token issued", body = TokenResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Account not verified")
    )
)]
pub async fn issue_token(
    State(state): State<AuthState>,
    Form(request): Form<TokenRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let issued = state.users.login(&request.username, &request.password).await?;
    Ok(Json(issued.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller profile with posts and tags", body = ApiResponse<ProfileDto>),
        (status = 401, description = "Unauthorized"),
        (status = 429, description = "Rate limit exceeded")
    )
)]
pub async fn get_current_user(
    State(state): State<AuthState>,
    BearerToken(token): BearerToken,
) -> ApiResult<Json<ApiResponse<ProfileDto>>> {
    let caller = state.authorizer.authorize_limited(&token, &[Role::User])?;

    let profile = state.users.load_profile(caller.id).await?;
    Ok(Json(ApiResponse::success(profile.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/reset-password",
    tag = "Authentication",
    request_body = ResetPasswordRequest,
    responses(
        (status = 202, description = "Reset accepted (also for unknown emails)", body = ApiResponse<MessageResponse>)
    )
)]
pub async fn request_password_reset(
    State(state): State<AuthState>,
    ValidatedJson(request): ValidatedJson<ResetPasswordRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<MessageResponse>>)> {
    state.users.request_password_reset(&request.email).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse::success(MessageResponse::new(
            "If the account exists, a reset link has been sent",
        ))),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/reset-password/confirm",
    tag = "Authentication",
    request_body = ConfirmResetRequest,
    responses(
        (status = 200, description = "Password updated, account verified", body = ApiResponse<UserDto>),
        (status = 401, description = "Invalid or expired reset token")
    )
)]
pub async fn confirm_password_reset(
    State(state): State<AuthState>,
    ValidatedJson(request): ValidatedJson<ConfirmResetRequest>,
) -> ApiResult<Json<ApiResponse<UserDto>>> {
    let user = state
        .users
        .reset_password(&request.token, &request.new_password)
        .await?;
    Ok(Json(ApiResponse::success(user.into())))
}
