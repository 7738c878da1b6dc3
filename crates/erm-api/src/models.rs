//! API request and response models

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use erm_application::dto::{
    AssessmentDto, AuthTokenDto, CategoryDto, MitigationDto, OrganizationDto, OverdueSweepDto,
    Page, RiskDto, RiskOverviewDto, ScaleEntryDto, UserDto,
};

// ============================================================================
// Health
// ============================================================================

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Crate version
    pub version: String,
    /// Seconds since start
    pub uptime: u64,
}

// ============================================================================
// Authentication and users
// ============================================================================

/// Self-service registration request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// Display name
    pub name: String,
    /// Login email, unique across the platform
    pub email: String,
    /// At least 8 characters with upper, lower, digit and special character
    pub password: String,
    /// Existing organization to join; access is granted by its administrators
    pub organization_id: i64,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Email
    pub email: String,
    /// Password
    pub password: String,
}

/// Issued bearer token
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    /// JWT token
    pub token: String,
    /// Always `Bearer`
    pub token_type: String,
    /// Token expiration timestamp
    pub expires_at: i64,
    /// User information
    pub user: UserResponse,
}

/// Password change request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    /// Current password
    pub current_password: String,
    /// Replacement password
    pub new_password: String,
}

/// Role assignment request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChangeRoleRequest {
    /// One of Admin, RiskManager, DepartmentHead, RiskOwner, Auditor, ReadOnly
    pub role: String,
}

/// Account created by an administrator in their own organization
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    /// Display name
    pub name: String,
    /// Login email, unique across the platform
    pub email: String,
    /// Initial password, subject to the password policy
    pub password: String,
    /// One of Admin, RiskManager, DepartmentHead, RiskOwner, Auditor, ReadOnly
    pub role: String,
}

/// Partial user update by an administrator
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    /// New display name
    pub name: Option<String>,
    /// New email
    pub email: Option<String>,
    /// New password
    pub password: Option<String>,
    /// New role
    pub role: Option<String>,
}

/// Partial update of the caller's own profile
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    /// New display name
    pub name: Option<String>,
    /// New email
    pub email: Option<String>,
}

/// User information
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    /// User ID
    pub id: i64,
    /// Organization ID
    pub organization_id: i64,
    /// Display name
    pub name: String,
    /// Email
    pub email: String,
    /// Role
    pub role: String,
    /// Last successful login
    pub last_login: Option<DateTime<Utc>>,
}

// ============================================================================
// Risks
// ============================================================================

/// Risk registration request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateRiskRequest {
    /// Title, 1-255 characters
    pub title: String,
    /// Free-text description
    pub description: Option<String>,
    /// Category of the caller's organization
    pub category_id: i64,
    /// Owner; defaults to the caller
    pub owner_id: Option<i64>,
}

/// Partial risk update
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateRiskRequest {
    /// New title
    pub title: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New category
    pub category_id: Option<i64>,
    /// New owner
    pub owner_id: Option<i64>,
}

/// Explicit status change request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusRequest {
    /// Target status name
    pub status: String,
}

/// Risk with its derived score and status
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RiskResponse {
    /// Risk ID
    pub id: i64,
    /// Organization ID
    pub organization_id: i64,
    /// Owner ID
    pub owner_id: i64,
    /// Category ID
    pub category_id: i64,
    /// Title
    pub title: String,
    /// Description
    pub description: Option<String>,
    /// Lifecycle status
    pub status: String,
    /// Likelihood x impact of the latest assessment, 0 when unassessed
    pub risk_score: u32,
    /// Severity band of the score
    pub risk_level: String,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Last change timestamp
    pub updated_at: DateTime<Utc>,
}

/// Dashboard aggregates
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RiskOverviewResponse {
    /// Number of risks
    pub total: usize,
    /// Count per status
    pub by_status: BTreeMap<String, usize>,
    /// Count per severity band
    pub by_level: BTreeMap<String, usize>,
    /// Mean score over scored risks
    pub average_score: f64,
    /// Highest score
    pub highest_score: u32,
}

/// Risk list filters
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListRisksQuery {
    /// Page number, starting at 1
    pub page: Option<u32>,
    /// Items per page
    pub page_size: Option<u32>,
    /// Filter by status
    pub status: Option<String>,
    /// Filter by category
    pub category_id: Option<i64>,
    /// Filter by owner
    pub owner_id: Option<i64>,
}

/// Top risks query
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TopRisksQuery {
    /// Maximum number of risks, default 10
    pub limit: Option<usize>,
}

// ============================================================================
// Assessments
// ============================================================================

/// Assessment recording request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateAssessmentRequest {
    /// Assessed risk
    pub risk_id: i64,
    /// Likelihood scale entry
    pub likelihood_id: i64,
    /// Impact scale entry
    pub impact_id: i64,
    /// Defaults to now; may not lie in the future
    pub assessment_date: Option<DateTime<Utc>>,
    /// Notes
    pub notes: Option<String>,
}

/// Partial assessment update
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateAssessmentRequest {
    /// Move to another risk
    pub risk_id: Option<i64>,
    /// New likelihood
    pub likelihood_id: Option<i64>,
    /// New impact
    pub impact_id: Option<i64>,
    /// New date
    pub assessment_date: Option<DateTime<Utc>>,
    /// New notes
    pub notes: Option<String>,
}

/// Assessment with resolved scores
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssessmentResponse {
    /// Assessment ID
    pub id: i64,
    /// Risk ID
    pub risk_id: i64,
    /// Likelihood scale entry
    pub likelihood_id: i64,
    /// Impact scale entry
    pub impact_id: i64,
    /// Likelihood score, absent if the entry no longer resolves
    pub likelihood_score: Option<u8>,
    /// Impact score, absent if the entry no longer resolves
    pub impact_score: Option<u8>,
    /// Likelihood x impact
    pub score: Option<u32>,
    /// Assessment date
    pub assessment_date: DateTime<Utc>,
    /// Assessor
    pub assessor_id: i64,
    /// Notes
    pub notes: Option<String>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Last change timestamp
    pub updated_at: DateTime<Utc>,
}

/// Assessment list filters
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListAssessmentsQuery {
    /// Page number, starting at 1
    pub page: Option<u32>,
    /// Items per page
    pub page_size: Option<u32>,
    /// Filter by risk
    pub risk_id: Option<i64>,
    /// Filter by assessor
    pub assessor_id: Option<i64>,
}

// ============================================================================
// Mitigation actions
// ============================================================================

/// Mitigation action planning request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateMitigationRequest {
    /// Mitigated risk
    pub risk_id: i64,
    /// Responsible user
    pub assigned_to: i64,
    /// What will be done
    pub description: String,
    /// Due date
    pub due_date: DateTime<Utc>,
    /// Initial status, default Planned
    pub status: Option<String>,
}

/// Partial mitigation action update
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateMitigationRequest {
    /// New assignee
    pub assigned_to: Option<i64>,
    /// New description
    pub description: Option<String>,
    /// New due date
    pub due_date: Option<DateTime<Utc>>,
    /// New status
    pub status: Option<String>,
}

/// Mitigation action
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MitigationResponse {
    /// Action ID
    pub id: i64,
    /// Risk ID
    pub risk_id: i64,
    /// Responsible user
    pub assigned_to: i64,
    /// Description
    pub description: String,
    /// Due date
    pub due_date: DateTime<Utc>,
    /// Status
    pub status: String,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Last change timestamp
    pub updated_at: DateTime<Utc>,
}

/// Result of an overdue refresh
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OverdueSweepResponse {
    /// Actions newly flagged Overdue
    pub marked_overdue: Vec<i64>,
    /// Risks whose score or status changed
    pub risks_recalculated: Vec<i64>,
}

/// Mitigation action list filters
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListMitigationsQuery {
    /// Page number, starting at 1
    pub page: Option<u32>,
    /// Items per page
    pub page_size: Option<u32>,
    /// Filter by risk
    pub risk_id: Option<i64>,
    /// Filter by assignee
    pub assigned_to: Option<i64>,
    /// Filter by status
    pub status: Option<String>,
}

// ============================================================================
// Reference data and paging
// ============================================================================

/// Likelihood or impact scale entry
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScaleEntryResponse {
    /// Entry ID
    pub id: i64,
    /// Label
    pub level: String,
    /// Numeric score
    pub score: u8,
    /// Description
    pub description: String,
}

/// Risk category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponse {
    /// Category ID
    pub id: i64,
    /// Name
    pub name: String,
    /// Parent category
    pub parent_category_id: Option<i64>,
}

/// The caller's organization
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrganizationResponse {
    /// Organization ID
    pub id: i64,
    /// Name
    pub name: String,
    /// Industry
    pub industry: String,
    /// Subscription start
    pub subscription_start: DateTime<Utc>,
    /// Subscription end
    pub subscription_end: DateTime<Utc>,
    /// Whether the subscription covers the current time
    pub subscription_active: bool,
}

/// Page and page size
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationQuery {
    /// Page number, starting at 1
    pub page: Option<u32>,
    /// Items per page
    pub page_size: Option<u32>,
}

/// One page of a list
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[aliases(
    RiskPage = PageResponse<RiskResponse>,
    AssessmentPage = PageResponse<AssessmentResponse>,
    MitigationPage = PageResponse<MitigationResponse>,
    UserPage = PageResponse<UserResponse>
)]
pub struct PageResponse<T> {
    /// Items on this page
    pub items: Vec<T>,
    /// Items across all pages
    pub total: usize,
    /// Page number
    pub page: u32,
    /// Items per page
    pub page_size: u32,
    /// Number of pages
    pub total_pages: u32,
}

impl<T> PageResponse<T> {
    /// Convert a page of DTOs
    pub fn from_page<D>(page: Page<D>) -> Self
    where
        T: From<D>,
    {
        Self {
            items: page.items.into_iter().map(T::from).collect(),
            total: page.total,
            page: page.page,
            page_size: page.page_size,
            total_pages: page.total_pages,
        }
    }
}

// ============================================================================
// DTO conversions
// ============================================================================

impl From<UserDto> for UserResponse {
    fn from(user: UserDto) -> Self {
        Self {
            id: user.id.value(),
            organization_id: user.organization_id.value(),
            name: user.name,
            email: user.email,
            role: user.role.to_string(),
            last_login: user.last_login,
        }
    }
}

impl From<AuthTokenDto> for AuthResponse {
    fn from(token: AuthTokenDto) -> Self {
        Self {
            token: token.token,
            token_type: token.token_type,
            expires_at: token.expires_at,
            user: token.user.into(),
        }
    }
}

impl From<RiskDto> for RiskResponse {
    fn from(risk: RiskDto) -> Self {
        Self {
            id: risk.id.value(),
            organization_id: risk.organization_id.value(),
            owner_id: risk.owner_id.value(),
            category_id: risk.category_id.value(),
            title: risk.title,
            description: risk.description,
            status: risk.status.to_string(),
            risk_score: risk.risk_score,
            risk_level: risk.risk_level.to_string(),
            created_at: risk.created_at,
            updated_at: risk.updated_at,
        }
    }
}

impl From<RiskOverviewDto> for RiskOverviewResponse {
    fn from(overview: RiskOverviewDto) -> Self {
        Self {
            total: overview.total,
            by_status: overview.by_status,
            by_level: overview.by_level,
            average_score: overview.average_score,
            highest_score: overview.highest_score,
        }
    }
}

impl From<AssessmentDto> for AssessmentResponse {
    fn from(assessment: AssessmentDto) -> Self {
        Self {
            id: assessment.id.value(),
            risk_id: assessment.risk_id.value(),
            likelihood_id: assessment.likelihood_id.value(),
            impact_id: assessment.impact_id.value(),
            likelihood_score: assessment.likelihood_score,
            impact_score: assessment.impact_score,
            score: assessment.score,
            assessment_date: assessment.assessment_date,
            assessor_id: assessment.assessor_id.value(),
            notes: assessment.notes,
            created_at: assessment.created_at,
            updated_at: assessment.updated_at,
        }
    }
}

impl From<MitigationDto> for MitigationResponse {
    fn from(action: MitigationDto) -> Self {
        Self {
            id: action.id.value(),
            risk_id: action.risk_id.value(),
            assigned_to: action.assigned_to.value(),
            description: action.description,
            due_date: action.due_date,
            status: action.status.to_string(),
            created_at: action.created_at,
            updated_at: action.updated_at,
        }
    }
}

impl From<OverdueSweepDto> for OverdueSweepResponse {
    fn from(sweep: OverdueSweepDto) -> Self {
        Self {
            marked_overdue: sweep.marked_overdue.iter().map(|id| id.value()).collect(),
            risks_recalculated: sweep.risks_recalculated.iter().map(|id| id.value()).collect(),
        }
    }
}

impl From<ScaleEntryDto> for ScaleEntryResponse {
    fn from(entry: ScaleEntryDto) -> Self {
        Self {
            id: entry.id,
            level: entry.level,
            score: entry.score,
            description: entry.description,
        }
    }
}

impl From<CategoryDto> for CategoryResponse {
    fn from(category: CategoryDto) -> Self {
        Self {
            id: category.id.value(),
            name: category.name,
            parent_category_id: category.parent_category_id.map(|id| id.value()),
        }
    }
}

impl From<OrganizationDto> for OrganizationResponse {
    fn from(organization: OrganizationDto) -> Self {
        Self {
            id: organization.id.value(),
            name: organization.name,
            industry: organization.industry,
            subscription_start: organization.subscription_start,
            subscription_end: organization.subscription_end,
            subscription_active: organization.subscription_active,
        }
    }
}
