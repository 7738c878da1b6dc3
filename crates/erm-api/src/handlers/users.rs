//! User administration handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};

use erm_application::dto::{Actor, CreateUserCommand, UpdateProfileCommand, UpdateUserCommand};
use erm_domain::value_objects::{UserId, UserRole};

use super::parse_name;
use crate::{
    error::ApiResult,
    extract::ApiJson,
    models::{
        ChangeRoleRequest, CreateUserRequest, PageResponse, PaginationQuery, UpdateProfileRequest,
        UpdateUserRequest, UserPage, UserResponse,
    },
    state::AppState,
};

/// Users of the caller's organization
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Page of users", body = UserPage),
        (status = 403, description = "Admin role required")
    ),
    security(("bearer" = []))
)]
pub async fn list_users(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<PaginationQuery>,
) -> ApiResult<Json<PageResponse<UserResponse>>> {
    let page = state.page_request(query.page, query.page_size);
    let users = state.auth.list_users(&actor, page).await?;
    Ok(Json(PageResponse::from_page(users)))
}

/// Get a user
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "User not found")
    ),
    security(("bearer" = []))
)]
pub async fn get_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> ApiResult<Json<UserResponse>> {
    let user = state.auth.get_user(&actor, UserId::new(id)).await?;
    Ok(Json(user.into()))
}

/// Assign a role to a user
#[utoipa::path(
    patch,
    path = "/api/v1/users/{id}/role",
    params(("id" = i64, Path, description = "User ID")),
    request_body = ChangeRoleRequest,
    responses(
        (status = 200, description = "Role changed", body = UserResponse),
        (status = 400, description = "Unknown role"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "User not found")
    ),
    security(("bearer" = []))
)]
pub async fn change_role(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    ApiJson(request): ApiJson<ChangeRoleRequest>,
) -> ApiResult<Json<UserResponse>> {
    let role: UserRole = parse_name(&request.role)?;
    let user = state
        .auth
        .change_role(&actor, UserId::new(id), role)
        .await?;
    Ok(Json(user.into()))
}

/// Create a user in the caller's organization
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid email, weak password or unknown role"),
        (status = 403, description = "Admin role required"),
        (status = 409, description = "Email already registered")
    ),
    security(("bearer" = []))
)]
pub async fn create_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiJson(request): ApiJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let role: UserRole = parse_name(&request.role)?;
    let user = state
        .auth
        .create_user(
            &actor,
            CreateUserCommand {
                name: request.name,
                email: request.email,
                password: request.password,
                role,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Update a user
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Invalid field"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email already in use")
    ),
    security(("bearer" = []))
)]
pub async fn update_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    ApiJson(request): ApiJson<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let role = request
        .role
        .as_deref()
        .map(parse_name::<UserRole>)
        .transpose()?;
    let user = state
        .auth
        .update_user(
            &actor,
            UserId::new(id),
            UpdateUserCommand {
                name: request.name,
                email: request.email,
                password: request.password,
                role,
            },
        )
        .await?;
    Ok(Json(user.into()))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "User not found"),
        (status = 409, description = "User still owns risks or actions, or is the caller")
    ),
    security(("bearer" = []))
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.auth.delete_user(&actor, UserId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Current user profile
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses((status = 200, description = "Authenticated user", body = UserResponse)),
    security(("bearer" = []))
)]
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<UserResponse>> {
    let user = state.auth.current_user(&actor).await?;
    Ok(Json(user.into()))
}

/// Update the caller's own name or email
#[utoipa::path(
    put,
    path = "/api/v1/users/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, description = "Invalid name or email"),
        (status = 409, description = "Email already in use")
    ),
    security(("bearer" = []))
)]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiJson(request): ApiJson<UpdateProfileRequest>,
) -> ApiResult<Json<UserResponse>> {
    let user = state
        .auth
        .update_profile(
            &actor,
            UpdateProfileCommand {
                name: request.name,
                email: request.email,
            },
        )
        .await?;
    Ok(Json(user.into()))
}
