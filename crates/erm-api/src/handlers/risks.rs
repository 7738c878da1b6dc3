//! Risk register API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};

use erm_application::dto::{Actor, CreateRiskCommand, UpdateRiskCommand};
use erm_domain::repositories::RiskFilter;
use erm_domain::value_objects::{CategoryId, RiskId, RiskStatus, UserId};

use super::parse_name;
use crate::{
    error::ApiResult,
    extract::ApiJson,
    models::{
        AssessmentResponse, CreateRiskRequest, ListRisksQuery, MitigationResponse, PageResponse,
        RiskOverviewResponse, RiskPage, RiskResponse, StatusRequest, TopRisksQuery,
        UpdateRiskRequest,
    },
    state::AppState,
};

/// List risks of the caller's organization, newest first
#[utoipa::path(
    get,
    path = "/api/v1/risks",
    params(ListRisksQuery),
    responses(
        (status = 200, description = "Page of risks", body = RiskPage),
        (status = 400, description = "Unknown status filter"),
        (status = 403, description = "Role may not read risks")
    ),
    security(("bearer" = []))
)]
pub async fn list_risks(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<ListRisksQuery>,
) -> ApiResult<Json<PageResponse<RiskResponse>>> {
    let filter = RiskFilter {
        organization_id: None,
        status: query
            .status
            .as_deref()
            .map(parse_name::<RiskStatus>)
            .transpose()?,
        category_id: query.category_id.map(CategoryId::new),
        owner_id: query.owner_id.map(UserId::new),
    };
    let page = state.page_request(query.page, query.page_size);
    let risks = state.risks.list_risks(&actor, filter, page).await?;
    Ok(Json(PageResponse::from_page(risks)))
}

/// Register a new risk
#[utoipa::path(
    post,
    path = "/api/v1/risks",
    request_body = CreateRiskRequest,
    responses(
        (status = 201, description = "Risk created", body = RiskResponse),
        (status = 400, description = "Invalid title, category or owner"),
        (status = 403, description = "Role may not create risks")
    ),
    security(("bearer" = []))
)]
pub async fn create_risk(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiJson(request): ApiJson<CreateRiskRequest>,
) -> ApiResult<(StatusCode, Json<RiskResponse>)> {
    let risk = state
        .risks
        .create_risk(
            &actor,
            CreateRiskCommand {
                title: request.title,
                description: request.description,
                category_id: CategoryId::new(request.category_id),
                owner_id: request.owner_id.map(UserId::new),
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(risk.into())))
}

/// Get a risk
#[utoipa::path(
    get,
    path = "/api/v1/risks/{id}",
    params(("id" = i64, Path, description = "Risk ID")),
    responses(
        (status = 200, description = "Risk", body = RiskResponse),
        (status = 404, description = "Risk not found")
    ),
    security(("bearer" = []))
)]
pub async fn get_risk(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> ApiResult<Json<RiskResponse>> {
    let risk = state.risks.get_risk(&actor, RiskId::new(id)).await?;
    Ok(Json(risk.into()))
}

/// Edit a risk's title, description, category or owner
#[utoipa::path(
    put,
    path = "/api/v1/risks/{id}",
    params(("id" = i64, Path, description = "Risk ID")),
    request_body = UpdateRiskRequest,
    responses(
        (status = 200, description = "Risk updated", body = RiskResponse),
        (status = 400, description = "Invalid field"),
        (status = 404, description = "Risk not found")
    ),
    security(("bearer" = []))
)]
pub async fn update_risk(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    ApiJson(request): ApiJson<UpdateRiskRequest>,
) -> ApiResult<Json<RiskResponse>> {
    let risk = state
        .risks
        .update_risk(
            &actor,
            RiskId::new(id),
            UpdateRiskCommand {
                title: request.title,
                description: request.description,
                category_id: request.category_id.map(CategoryId::new),
                owner_id: request.owner_id.map(UserId::new),
            },
        )
        .await?;
    Ok(Json(risk.into()))
}

/// Delete a risk with its assessments and mitigation actions
#[utoipa::path(
    delete,
    path = "/api/v1/risks/{id}",
    params(("id" = i64, Path, description = "Risk ID")),
    responses(
        (status = 204, description = "Risk deleted"),
        (status = 403, description = "Role may not delete risks"),
        (status = 404, description = "Risk not found")
    ),
    security(("bearer" = []))
)]
pub async fn delete_risk(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.risks.delete_risk(&actor, RiskId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Set a risk's lifecycle status
///
/// The only way to close a risk or reopen a closed one. Other statuses are
/// re-derived from the risk's assessments and actions right away.
#[utoipa::path(
    put,
    path = "/api/v1/risks/{id}/status",
    params(("id" = i64, Path, description = "Risk ID")),
    request_body = StatusRequest,
    responses(
        (status = 200, description = "Status changed", body = RiskResponse),
        (status = 400, description = "Unknown status"),
        (status = 404, description = "Risk not found")
    ),
    security(("bearer" = []))
)]
pub async fn update_risk_status(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    ApiJson(request): ApiJson<StatusRequest>,
) -> ApiResult<Json<RiskResponse>> {
    let status: RiskStatus = parse_name(&request.status)?;
    let risk = state
        .risks
        .update_risk_status(&actor, RiskId::new(id), status)
        .await?;
    Ok(Json(risk.into()))
}

/// Recompute a risk's score and status
#[utoipa::path(
    post,
    path = "/api/v1/risks/{id}/recalculate",
    params(("id" = i64, Path, description = "Risk ID")),
    responses(
        (status = 200, description = "Risk recomputed", body = RiskResponse),
        (status = 404, description = "Risk not found")
    ),
    security(("bearer" = []))
)]
pub async fn recalculate_risk(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> ApiResult<Json<RiskResponse>> {
    let risk = state.risks.recalculate(&actor, RiskId::new(id)).await?;
    Ok(Json(risk.into()))
}

/// Assessments of a risk, latest first
#[utoipa::path(
    get,
    path = "/api/v1/risks/{id}/assessments",
    params(("id" = i64, Path, description = "Risk ID")),
    responses(
        (status = 200, description = "Assessments", body = [AssessmentResponse]),
        (status = 404, description = "Risk not found")
    ),
    security(("bearer" = []))
)]
pub async fn risk_assessments(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<AssessmentResponse>>> {
    let assessments = state
        .risks
        .risk_assessments(&actor, RiskId::new(id))
        .await?;
    Ok(Json(assessments.into_iter().map(Into::into).collect()))
}

/// Mitigation actions of a risk, earliest due first
#[utoipa::path(
    get,
    path = "/api/v1/risks/{id}/mitigations",
    params(("id" = i64, Path, description = "Risk ID")),
    responses(
        (status = 200, description = "Mitigation actions", body = [MitigationResponse]),
        (status = 404, description = "Risk not found")
    ),
    security(("bearer" = []))
)]
pub async fn risk_mitigations(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<MitigationResponse>>> {
    let actions = state
        .risks
        .risk_mitigations(&actor, RiskId::new(id))
        .await?;
    Ok(Json(actions.into_iter().map(Into::into).collect()))
}

/// Counts by status and severity band
#[utoipa::path(
    get,
    path = "/api/v1/risks/overview",
    responses(
        (status = 200, description = "Risk register overview", body = RiskOverviewResponse)
    ),
    security(("bearer" = []))
)]
pub async fn overview(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<RiskOverviewResponse>> {
    let overview = state.risks.overview(&actor).await?;
    Ok(Json(overview.into()))
}

/// Highest scoring open risks
#[utoipa::path(
    get,
    path = "/api/v1/risks/top",
    params(TopRisksQuery),
    responses(
        (status = 200, description = "Top risks", body = [RiskResponse])
    ),
    security(("bearer" = []))
)]
pub async fn top_risks(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<TopRisksQuery>,
) -> ApiResult<Json<Vec<RiskResponse>>> {
    let risks = state.risks.top_risks(&actor, query.limit).await?;
    Ok(Json(risks.into_iter().map(Into::into).collect()))
}
