//! Mitigation action API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;

use erm_application::dto::{Actor, CreateMitigationCommand, UpdateMitigationCommand};
use erm_domain::repositories::MitigationFilter;
use erm_domain::value_objects::{MitigationActionId, MitigationStatus, RiskId, UserId};

use super::parse_name;
use crate::{
    error::ApiResult,
    extract::ApiJson,
    models::{
        CreateMitigationRequest, ListMitigationsQuery, MitigationPage, MitigationResponse,
        OverdueSweepResponse, PageResponse, StatusRequest, UpdateMitigationRequest,
    },
    state::AppState,
};

fn parse_status(status: Option<&str>) -> ApiResult<Option<MitigationStatus>> {
    status.map(parse_name::<MitigationStatus>).transpose()
}

/// List mitigation actions visible to the caller, earliest due first
#[utoipa::path(
    get,
    path = "/api/v1/mitigations",
    params(ListMitigationsQuery),
    responses(
        (status = 200, description = "Page of mitigation actions", body = MitigationPage),
        (status = 400, description = "Unknown status filter")
    ),
    security(("bearer" = []))
)]
pub async fn list_mitigations(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<ListMitigationsQuery>,
) -> ApiResult<Json<PageResponse<MitigationResponse>>> {
    let filter = MitigationFilter {
        risk_id: query.risk_id.map(RiskId::new),
        assigned_to: query.assigned_to.map(UserId::new),
        status: parse_status(query.status.as_deref())?,
    };
    let page = state.page_request(query.page, query.page_size);
    let actions = state
        .mitigations
        .list_mitigations(&actor, filter, page)
        .await?;
    Ok(Json(PageResponse::from_page(actions)))
}

/// Plan a mitigation action against a risk
#[utoipa::path(
    post,
    path = "/api/v1/mitigations",
    request_body = CreateMitigationRequest,
    responses(
        (status = 201, description = "Mitigation action planned", body = MitigationResponse),
        (status = 400, description = "Invalid description, status or assignee"),
        (status = 404, description = "Risk not found")
    ),
    security(("bearer" = []))
)]
pub async fn create_mitigation(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiJson(request): ApiJson<CreateMitigationRequest>,
) -> ApiResult<(StatusCode, Json<MitigationResponse>)> {
    let action = state
        .mitigations
        .create_mitigation(
            &actor,
            CreateMitigationCommand {
                risk_id: RiskId::new(request.risk_id),
                assigned_to: UserId::new(request.assigned_to),
                description: request.description,
                due_date: request.due_date,
                status: parse_status(request.status.as_deref())?,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(action.into())))
}

/// Get a mitigation action
#[utoipa::path(
    get,
    path = "/api/v1/mitigations/{id}",
    params(("id" = i64, Path, description = "Mitigation action ID")),
    responses(
        (status = 200, description = "Mitigation action", body = MitigationResponse),
        (status = 404, description = "Mitigation action not found")
    ),
    security(("bearer" = []))
)]
pub async fn get_mitigation(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MitigationResponse>> {
    let action = state
        .mitigations
        .get_mitigation(&actor, MitigationActionId::new(id))
        .await?;
    Ok(Json(action.into()))
}

/// Edit a mitigation action
#[utoipa::path(
    put,
    path = "/api/v1/mitigations/{id}",
    params(("id" = i64, Path, description = "Mitigation action ID")),
    request_body = UpdateMitigationRequest,
    responses(
        (status = 200, description = "Mitigation action updated", body = MitigationResponse),
        (status = 400, description = "Invalid field"),
        (status = 404, description = "Mitigation action not found")
    ),
    security(("bearer" = []))
)]
pub async fn update_mitigation(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    ApiJson(request): ApiJson<UpdateMitigationRequest>,
) -> ApiResult<Json<MitigationResponse>> {
    let action = state
        .mitigations
        .update_mitigation(
            &actor,
            MitigationActionId::new(id),
            UpdateMitigationCommand {
                assigned_to: request.assigned_to.map(UserId::new),
                description: request.description,
                due_date: request.due_date,
                status: parse_status(request.status.as_deref())?,
            },
        )
        .await?;
    Ok(Json(action.into()))
}

/// Set a mitigation action's status
#[utoipa::path(
    put,
    path = "/api/v1/mitigations/{id}/status",
    params(("id" = i64, Path, description = "Mitigation action ID")),
    request_body = StatusRequest,
    responses(
        (status = 200, description = "Status changed", body = MitigationResponse),
        (status = 400, description = "Unknown status"),
        (status = 404, description = "Mitigation action not found")
    ),
    security(("bearer" = []))
)]
pub async fn update_mitigation_status(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    ApiJson(request): ApiJson<StatusRequest>,
) -> ApiResult<Json<MitigationResponse>> {
    let status: MitigationStatus = parse_name(&request.status)?;
    let action = state
        .mitigations
        .update_mitigation_status(&actor, MitigationActionId::new(id), status)
        .await?;
    Ok(Json(action.into()))
}

/// Delete a mitigation action and re-derive its risk's status
#[utoipa::path(
    delete,
    path = "/api/v1/mitigations/{id}",
    params(("id" = i64, Path, description = "Mitigation action ID")),
    responses(
        (status = 204, description = "Mitigation action deleted"),
        (status = 404, description = "Mitigation action not found")
    ),
    security(("bearer" = []))
)]
pub async fn delete_mitigation(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state
        .mitigations
        .delete_mitigation(&actor, MitigationActionId::new(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Flag past-due actions of the caller's organization as overdue
#[utoipa::path(
    post,
    path = "/api/v1/mitigations/refresh-overdue",
    responses(
        (status = 200, description = "Sweep result", body = OverdueSweepResponse)
    ),
    security(("bearer" = []))
)]
pub async fn refresh_overdue(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<OverdueSweepResponse>> {
    let sweep = state
        .mitigations
        .refresh_overdue(&actor, Utc::now())
        .await?;
    Ok(Json(sweep.into()))
}
