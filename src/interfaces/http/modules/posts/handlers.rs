//! Post handlers for the authenticated caller (rate limited)

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};

use super::dto::{CreatePostRequest, PostDto};
use crate::application::identity::Authorizer;
use crate::application::PostService;
use crate::domain::Role;
use crate::infrastructure::database::PostRepository;
use crate::interfaces::http::common::{ApiResponse, ApiResult, ValidatedJson};
use crate::interfaces::http::middleware::BearerToken;

#[derive(Clone)]
pub struct PostsState {
    pub posts: Arc<PostService<PostRepository>>,
    pub authorizer: Authorizer,
}

#[utoipa::path(
    get,
    path = "/api/v1/posts",
    tag = "Posts",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's posts with tags", body = ApiResponse<Vec<PostDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 429, description = "Rate limit exceeded")
    )
)]
pub async fn list_posts(
    State(state): State<PostsState>,
    BearerToken(token): BearerToken,
) -> ApiResult<Json<ApiResponse<Vec<PostDto>>>> {
    let caller = state.authorizer.authorize_limited(&token, &[Role::User])?;

    let posts = state.posts.list_posts(caller.id).await?;
    Ok(Json(ApiResponse::success(
        posts.into_iter().map(PostDto::from).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/posts",
    tag = "Posts",
    security(("bearer_auth" = [])),
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Post created", body = ApiResponse<PostDto>),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Validation error"),
        (status = 429, description = "Rate limit exceeded")
    )
)]
pub async fn create_post(
    State(state): State<PostsState>,
    BearerToken(token): BearerToken,
    ValidatedJson(request): ValidatedJson<CreatePostRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<PostDto>>)> {
    let caller = state.authorizer.authorize_limited(&token, &[Role::User])?;

    let post = state
        .posts
        .create_post(caller.id, request.title, request.content, request.tags)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(post.into()))))
}
