//! Integration tests for application services
//!
//! Services are wired to the in-memory repositories, the way the API binary
//! wires them, and driven through their public use cases.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};

use erm_application::dto::{
    Actor, ChangePasswordCommand, CreateAssessmentCommand, CreateMitigationCommand,
    CreateRiskCommand, CreateUserCommand, LoginCommand, PageRequest, RegisterCommand,
    UpdateAssessmentCommand, UpdateProfileCommand, UpdateRiskCommand, UpdateUserCommand,
};
use erm_application::errors::ApplicationError;
use erm_application::events::InMemoryEventPublisher;
use erm_application::ports::{Repositories, UnitOfWork};
use erm_application::services::{
    AssessmentService, AuthService, AuthSettings, MitigationService, RiskService, ReferenceDataService,
};

use erm_domain::entities::{Organization, Risk, RiskCategory, User};
use erm_domain::errors::{DomainError, DomainResult};
use erm_domain::repositories::{
    AssessmentFilter, AssessmentRepository, CategoryRepository, MitigationActionRepository,
    MitigationFilter, OrganizationRepository, RiskFilter, RiskRepository, UserRepository,
};
use erm_domain::value_objects::*;
use erm_persistence::{
    InMemoryAssessmentRepository, InMemoryCategoryRepository, InMemoryMitigationRepository,
    InMemoryOrganizationRepository, InMemoryRiskRepository, InMemoryScaleRepository,
    InMemoryUserRepository,
};

// ============================================================================
// Harness
// ============================================================================

struct Harness {
    repos: Repositories,
    events: Arc<InMemoryEventPublisher>,
    risks: RiskService,
    assessments: AssessmentService,
    mitigations: MitigationService,
    auth: AuthService,
    reference: ReferenceDataService,
}

const ORG: OrganizationId = OrganizationId::new(1);
const OTHER_ORG: OrganizationId = OrganizationId::new(2);
const OPERATIONS: CategoryId = CategoryId::new(1);

async fn harness() -> Harness {
    harness_with(Arc::new(InMemoryRiskRepository::new()), 4).await
}

async fn harness_with(risks: Arc<dyn RiskRepository>, bcrypt_cost: u32) -> Harness {
    let repos = Repositories {
        risks,
        assessments: Arc::new(InMemoryAssessmentRepository::new()),
        mitigations: Arc::new(InMemoryMitigationRepository::new()),
        scales: Arc::new(InMemoryScaleRepository::new()),
        categories: Arc::new(InMemoryCategoryRepository::new()),
        organizations: Arc::new(InMemoryOrganizationRepository::new()),
        users: Arc::new(InMemoryUserRepository::new()),
    };
    for (id, name) in [(ORG, "Northwind"), (OTHER_ORG, "Contoso")] {
        let start = Utc::now() - Duration::days(1);
        let organization =
            Organization::new(id, name, "Logistics", start, start + Duration::days(365)).unwrap();
        repos.organizations.save(&organization).await.unwrap();
    }
    let uow = Arc::new(UnitOfWork::new());
    let events = Arc::new(InMemoryEventPublisher::new());
    let settings = AuthSettings {
        jwt_secret: "integration-test-secret".to_string(),
        token_ttl: Duration::hours(1),
        bcrypt_cost,
    };

    Harness {
        risks: RiskService::new(repos.clone(), Arc::clone(&uow), events.clone()),
        assessments: AssessmentService::new(repos.clone(), Arc::clone(&uow), events.clone()),
        mitigations: MitigationService::new(repos.clone(), Arc::clone(&uow), events.clone()),
        auth: AuthService::new(repos.clone(), Arc::clone(&uow), events.clone(), settings),
        reference: ReferenceDataService::new(repos.clone()),
        repos,
        events,
    }
}

/// Risk store whose reads can be switched to fail
#[derive(Default)]
struct FlakyRiskRepository {
    inner: InMemoryRiskRepository,
    failing: AtomicBool,
}

impl FlakyRiskRepository {
    fn fail_reads(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> DomainResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(DomainError::StorageFailure {
                reason: "risk store unavailable".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RiskRepository for FlakyRiskRepository {
    async fn next_id(&self) -> DomainResult<RiskId> {
        self.inner.next_id().await
    }

    async fn save(&self, risk: &Risk) -> DomainResult<()> {
        self.inner.save(risk).await
    }

    async fn find_by_id(&self, id: RiskId) -> DomainResult<Option<Risk>> {
        self.check()?;
        self.inner.find_by_id(id).await
    }

    async fn find_all(&self, filter: &RiskFilter) -> DomainResult<Vec<Risk>> {
        self.check()?;
        self.inner.find_all(filter).await
    }

    async fn delete(&self, id: RiskId) -> DomainResult<()> {
        self.inner.delete(id).await
    }

    async fn exists(&self, id: RiskId) -> DomainResult<bool> {
        self.check()?;
        self.inner.exists(id).await
    }
}

impl Harness {
    async fn seed(&self) {
        let category = RiskCategory::new(OPERATIONS, ORG, "Operations", None).unwrap();
        self.repos.categories.save(&category).await.unwrap();
    }

    async fn user(&self, id: i64, org: OrganizationId, role: UserRole) -> Actor {
        let user = User::new(
            UserId::new(id),
            org,
            format!("User {}", id),
            format!("user{}@corp.example", id),
            String::new(),
            role,
        )
        .unwrap();
        self.repos.users.save(&user).await.unwrap();
        Actor::from_user(&user)
    }

    async fn manager(&self) -> Actor {
        self.user(1, ORG, UserRole::RiskManager).await
    }

    async fn risk(&self, actor: &Actor, title: &str) -> RiskId {
        self.risks
            .create_risk(
                actor,
                CreateRiskCommand {
                    title: title.to_string(),
                    description: None,
                    category_id: OPERATIONS,
                    owner_id: None,
                },
            )
            .await
            .unwrap()
            .id
    }

    async fn assess(
        &self,
        actor: &Actor,
        risk_id: RiskId,
        likelihood: i64,
        impact: i64,
        days_ago: i64,
    ) -> AssessmentId {
        self.assessments
            .create_assessment(
                actor,
                CreateAssessmentCommand {
                    risk_id,
                    likelihood_id: LikelihoodId::new(likelihood),
                    impact_id: ImpactId::new(impact),
                    assessment_date: Some(Utc::now() - Duration::days(days_ago)),
                    notes: None,
                },
            )
            .await
            .unwrap()
            .id
    }

    async fn plan(&self, actor: &Actor, risk_id: RiskId, due_in_days: i64) -> MitigationActionId {
        self.mitigations
            .create_mitigation(
                actor,
                CreateMitigationCommand {
                    risk_id,
                    assigned_to: actor.user_id,
                    description: "Add a standby supplier".to_string(),
                    due_date: Utc::now() + Duration::days(due_in_days),
                    status: None,
                },
            )
            .await
            .unwrap()
            .id
    }
}

// ============================================================================
// Risk lifecycle
// ============================================================================

#[tokio::test]
async fn test_risk_follows_assessment_and_mitigation_lifecycle() {
    let h = harness().await;
    h.seed().await;
    let manager = h.manager().await;
    let risk_id = h.risk(&manager, "Supplier insolvency").await;

    let risk = h.risks.get_risk(&manager, risk_id).await.unwrap();
    assert_eq!(risk.status, RiskStatus::Identified);
    assert_eq!(risk.risk_score, 0);

    h.assess(&manager, risk_id, 3, 4, 1).await;
    let risk = h.risks.get_risk(&manager, risk_id).await.unwrap();
    assert_eq!(risk.status, RiskStatus::Assessed);
    assert_eq!(risk.risk_score, 12);
    assert_eq!(risk.risk_level, RiskLevel::Medium);

    let action = h.plan(&manager, risk_id, 30).await;
    let risk = h.risks.get_risk(&manager, risk_id).await.unwrap();
    assert_eq!(risk.status, RiskStatus::Mitigating);

    h.mitigations
        .update_mitigation_status(&manager, action, MitigationStatus::Completed)
        .await
        .unwrap();
    let risk = h.risks.get_risk(&manager, risk_id).await.unwrap();
    assert_eq!(risk.status, RiskStatus::Monitored);

    assert!(h
        .events
        .event_types()
        .contains(&"MitigationStatusChanged"));
}

#[tokio::test]
async fn test_newer_assessment_replaces_score() {
    let h = harness().await;
    h.seed().await;
    let manager = h.manager().await;
    let risk_id = h.risk(&manager, "Data centre flood").await;

    h.assess(&manager, risk_id, 2, 2, 10).await;
    h.assess(&manager, risk_id, 5, 10, 2).await;
    // Older date recorded last does not win
    h.assess(&manager, risk_id, 1, 1, 20).await;

    let risk = h.risks.get_risk(&manager, risk_id).await.unwrap();
    assert_eq!(risk.risk_score, 50);
    assert_eq!(risk.risk_level, RiskLevel::Critical);

    let latest = h
        .assessments
        .latest_for_risk(&manager, risk_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(latest.score, Some(50));
}

#[tokio::test]
async fn test_deleting_only_assessment_returns_risk_to_identified() {
    let h = harness().await;
    h.seed().await;
    let manager = h.manager().await;
    let risk_id = h.risk(&manager, "Key person dependency").await;
    let assessment = h.assess(&manager, risk_id, 4, 5, 1).await;

    h.assessments
        .delete_assessment(&manager, assessment)
        .await
        .unwrap();

    let risk = h.risks.get_risk(&manager, risk_id).await.unwrap();
    assert_eq!(risk.status, RiskStatus::Identified);
    assert_eq!(risk.risk_score, 0);
    assert!(h
        .assessments
        .latest_for_risk(&manager, risk_id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_moving_assessment_recomputes_both_risks() {
    let h = harness().await;
    h.seed().await;
    let manager = h.manager().await;
    let first = h.risk(&manager, "Ransomware").await;
    let second = h.risk(&manager, "Phishing").await;
    let assessment = h.assess(&manager, first, 4, 8, 1).await;

    h.assessments
        .update_assessment(
            &manager,
            assessment,
            UpdateAssessmentCommand {
                risk_id: Some(second),
                ..UpdateAssessmentCommand::default()
            },
        )
        .await
        .unwrap();

    let first = h.risks.get_risk(&manager, first).await.unwrap();
    let second = h.risks.get_risk(&manager, second).await.unwrap();
    assert_eq!((first.status, first.risk_score), (RiskStatus::Identified, 0));
    assert_eq!((second.status, second.risk_score), (RiskStatus::Assessed, 32));
}

#[tokio::test]
async fn test_rescoring_assessment_updates_risk() {
    let h = harness().await;
    h.seed().await;
    let manager = h.manager().await;
    let risk_id = h.risk(&manager, "Regulatory change").await;
    let assessment = h.assess(&manager, risk_id, 2, 3, 1).await;

    let updated = h
        .assessments
        .update_assessment(
            &manager,
            assessment,
            UpdateAssessmentCommand {
                likelihood_id: Some(LikelihoodId::new(5)),
                impact_id: Some(ImpactId::new(7)),
                ..UpdateAssessmentCommand::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.score, Some(35));

    let risk = h.risks.get_risk(&manager, risk_id).await.unwrap();
    assert_eq!(risk.risk_score, 35);
}

#[tokio::test]
async fn test_unknown_scale_reference_is_rejected() {
    let h = harness().await;
    h.seed().await;
    let manager = h.manager().await;
    let risk_id = h.risk(&manager, "Currency exposure").await;

    let result = h
        .assessments
        .create_assessment(
            &manager,
            CreateAssessmentCommand {
                risk_id,
                likelihood_id: LikelihoodId::new(3),
                impact_id: ImpactId::new(42),
                assessment_date: None,
                notes: None,
            },
        )
        .await;
    assert!(matches!(result, Err(ApplicationError::ValidationFailed(_))));
}

#[tokio::test]
async fn test_closed_risk_is_sticky_until_reopened() {
    let h = harness().await;
    h.seed().await;
    let manager = h.manager().await;
    let risk_id = h.risk(&manager, "Legacy ERP outage").await;
    h.assess(&manager, risk_id, 2, 2, 5).await;

    let closed = h
        .risks
        .update_risk_status(&manager, risk_id, RiskStatus::Closed)
        .await
        .unwrap();
    assert_eq!(closed.status, RiskStatus::Closed);

    h.assess(&manager, risk_id, 4, 4, 1).await;
    h.plan(&manager, risk_id, 10).await;
    let risk = h.risks.get_risk(&manager, risk_id).await.unwrap();
    assert_eq!(risk.status, RiskStatus::Closed);
    assert_eq!(risk.risk_score, 16);

    let reopened = h
        .risks
        .update_risk_status(&manager, risk_id, RiskStatus::Identified)
        .await
        .unwrap();
    assert_eq!(reopened.status, RiskStatus::Mitigating);
}

#[tokio::test]
async fn test_delete_risk_cascades_to_children() {
    let h = harness().await;
    h.seed().await;
    let manager = h.manager().await;
    let risk_id = h.risk(&manager, "Warehouse fire").await;
    h.assess(&manager, risk_id, 2, 6, 3).await;
    h.assess(&manager, risk_id, 3, 6, 1).await;
    h.plan(&manager, risk_id, 14).await;

    h.risks.delete_risk(&manager, risk_id).await.unwrap();

    assert!(matches!(
        h.risks.get_risk(&manager, risk_id).await,
        Err(ApplicationError::NotFound { .. })
    ));
    let orphans = h
        .repos
        .assessments
        .find_all(&AssessmentFilter {
            risk_id: Some(risk_id),
            ..AssessmentFilter::default()
        })
        .await
        .unwrap();
    assert!(orphans.is_empty());
    let actions = h
        .repos
        .mitigations
        .find_all(&MitigationFilter::default())
        .await
        .unwrap();
    assert!(actions.is_empty());

    let deleted = h
        .events
        .events()
        .into_iter()
        .find(|e| e.event_type() == "RiskDeleted");
    assert!(matches!(
        deleted,
        Some(erm_application::ApplicationEvent::RiskDeleted {
            assessments_removed: 2,
            actions_removed: 1,
            ..
        })
    ));
}

#[tokio::test]
async fn test_update_risk_rejects_foreign_category() {
    let h = harness().await;
    h.seed().await;
    let manager = h.manager().await;
    let risk_id = h.risk(&manager, "Contract dispute").await;
    let foreign = RiskCategory::new(CategoryId::new(9), OTHER_ORG, "Legal", None).unwrap();
    h.repos.categories.save(&foreign).await.unwrap();

    let result = h
        .risks
        .update_risk(
            &manager,
            risk_id,
            UpdateRiskCommand {
                category_id: Some(foreign.id),
                ..UpdateRiskCommand::default()
            },
        )
        .await;
    assert!(matches!(result, Err(ApplicationError::ValidationFailed(_))));

    let renamed = h
        .risks
        .update_risk(
            &manager,
            risk_id,
            UpdateRiskCommand {
                title: Some("Major contract dispute".to_string()),
                ..UpdateRiskCommand::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.title, "Major contract dispute");
}

// ============================================================================
// Dashboard and listing
// ============================================================================

#[tokio::test]
async fn test_list_is_newest_first_and_paginated() {
    let h = harness().await;
    h.seed().await;
    let manager = h.manager().await;
    for n in 0..5 {
        h.risk(&manager, &format!("Risk {}", n)).await;
    }

    let page = h
        .risks
        .list_risks(&manager, RiskFilter::default(), PageRequest::new(Some(1), Some(2)))
        .await
        .unwrap();
    assert_eq!(page.total, 5);
    assert_eq!(page.total_pages, 3);
    let titles: Vec<_> = page.items.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Risk 4", "Risk 3"]);
}

#[tokio::test]
async fn test_overview_and_top_risks() {
    let h = harness().await;
    h.seed().await;
    let manager = h.manager().await;
    let low = h.risk(&manager, "Low").await;
    let high = h.risk(&manager, "High").await;
    let closed = h.risk(&manager, "Closed").await;
    h.risk(&manager, "Unassessed").await;
    h.assess(&manager, low, 1, 3, 1).await;
    h.assess(&manager, high, 5, 9, 1).await;
    h.assess(&manager, closed, 5, 10, 1).await;
    h.risks
        .update_risk_status(&manager, closed, RiskStatus::Closed)
        .await
        .unwrap();

    let top = h.risks.top_risks(&manager, Some(5)).await.unwrap();
    let ids: Vec<_> = top.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![high, low]);

    let overview = h.risks.overview(&manager).await.unwrap();
    assert_eq!(overview.total, 4);
    assert_eq!(overview.by_status.get("Assessed"), Some(&2));
    assert_eq!(overview.by_status.get("Closed"), Some(&1));
    assert_eq!(overview.by_status.get("Identified"), Some(&1));
    assert_eq!(overview.highest_score, 50);
}

#[tokio::test]
async fn test_scales_are_listed_in_score_order() {
    let h = harness().await;
    let manager = h.manager().await;
    let likelihoods = h.reference.list_likelihoods(&manager).await.unwrap();
    let impacts = h.reference.list_impacts(&manager).await.unwrap();
    assert_eq!(likelihoods.len(), 5);
    assert_eq!(impacts.len(), 10);
    assert!(impacts.windows(2).all(|w| w[0].score < w[1].score));
}

#[tokio::test]
async fn test_seed_categories_skips_existing_names() {
    let h = harness().await;
    h.seed().await;
    let manager = h.manager().await;
    let names = vec!["operations".to_string(), "Financial".to_string()];

    assert_eq!(h.reference.seed_categories(ORG, &names).await.unwrap(), 1);
    assert_eq!(h.reference.seed_categories(ORG, &names).await.unwrap(), 0);

    let categories = h.reference.list_categories(&manager).await.unwrap();
    let listed: Vec<_> = categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(listed, vec!["Financial", "Operations"]);
}

// ============================================================================
// Mitigation actions
// ============================================================================

#[tokio::test]
async fn test_action_created_past_due_starts_overdue() {
    let h = harness().await;
    h.seed().await;
    let manager = h.manager().await;
    let risk_id = h.risk(&manager, "Patch backlog").await;
    h.assess(&manager, risk_id, 3, 3, 1).await;

    let action = h.plan(&manager, risk_id, -2).await;
    let action = h.mitigations.get_mitigation(&manager, action).await.unwrap();
    assert_eq!(action.status, MitigationStatus::Overdue);

    let risk = h.risks.get_risk(&manager, risk_id).await.unwrap();
    assert_eq!(risk.status, RiskStatus::Mitigating);
}

#[tokio::test]
async fn test_refresh_overdue_flags_only_past_due_open_actions() {
    let h = harness().await;
    h.seed().await;
    let manager = h.manager().await;
    let risk_id = h.risk(&manager, "Audit findings").await;
    h.assess(&manager, risk_id, 2, 5, 1).await;
    let soon = h.plan(&manager, risk_id, 5).await;
    let later = h.plan(&manager, risk_id, 90).await;
    let done = h.plan(&manager, risk_id, 1).await;
    h.mitigations
        .update_mitigation_status(&manager, done, MitigationStatus::Completed)
        .await
        .unwrap();

    let sweep = h
        .mitigations
        .refresh_overdue(&manager, Utc::now() + Duration::days(30))
        .await
        .unwrap();
    assert_eq!(sweep.marked_overdue, vec![soon]);
    assert!(sweep.risks_recalculated.is_empty());

    let later = h.mitigations.get_mitigation(&manager, later).await.unwrap();
    assert_eq!(later.status, MitigationStatus::Planned);
    let done = h.mitigations.get_mitigation(&manager, done).await.unwrap();
    assert_eq!(done.status, MitigationStatus::Completed);

    let again = h
        .mitigations
        .refresh_all_overdue(Utc::now() + Duration::days(30))
        .await
        .unwrap();
    assert!(again.marked_overdue.is_empty());
}

#[tokio::test]
async fn test_assignee_must_belong_to_organization() {
    let h = harness().await;
    h.seed().await;
    let manager = h.manager().await;
    let outsider = h.user(7, OTHER_ORG, UserRole::RiskOwner).await;
    let risk_id = h.risk(&manager, "Fraud").await;

    let result = h
        .mitigations
        .create_mitigation(
            &manager,
            CreateMitigationCommand {
                risk_id,
                assigned_to: outsider.user_id,
                description: "Segregate duties".to_string(),
                due_date: Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
                status: None,
            },
        )
        .await;
    assert!(matches!(result, Err(ApplicationError::ValidationFailed(_))));
}

// ============================================================================
// Authorization and scoping
// ============================================================================

#[tokio::test]
async fn test_role_permissions_are_enforced() {
    let h = harness().await;
    h.seed().await;
    let manager = h.manager().await;
    let auditor = h.user(2, ORG, UserRole::Auditor).await;
    let owner = h.user(3, ORG, UserRole::RiskOwner).await;
    let read_only = h.user(4, ORG, UserRole::ReadOnly).await;
    let risk_id = h.risk(&manager, "Sanctions breach").await;

    let create = h
        .risks
        .create_risk(
            &auditor,
            CreateRiskCommand {
                title: "Not allowed".to_string(),
                description: None,
                category_id: OPERATIONS,
                owner_id: None,
            },
        )
        .await;
    assert!(matches!(create, Err(ApplicationError::Forbidden(_))));

    let assessment = h.assess(&owner, risk_id, 2, 2, 1).await;
    assert!(matches!(
        h.assessments.delete_assessment(&owner, assessment).await,
        Err(ApplicationError::Forbidden(_))
    ));
    assert!(matches!(
        h.risks
            .list_risks(&read_only, RiskFilter::default(), PageRequest::default())
            .await,
        Err(ApplicationError::Forbidden(_))
    ));
    assert!(h.risks.get_risk(&auditor, risk_id).await.is_ok());
}

#[tokio::test]
async fn test_other_organizations_cannot_see_risks() {
    let h = harness().await;
    h.seed().await;
    let manager = h.manager().await;
    let outsider = h.user(8, OTHER_ORG, UserRole::Admin).await;
    let risk_id = h.risk(&manager, "Trade secret leak").await;
    let assessment = h.assess(&manager, risk_id, 2, 2, 1).await;

    assert!(matches!(
        h.risks.get_risk(&outsider, risk_id).await,
        Err(ApplicationError::NotFound { .. })
    ));
    assert!(matches!(
        h.assessments.get_assessment(&outsider, assessment).await,
        Err(ApplicationError::NotFound { .. })
    ));
    let listed = h
        .risks
        .list_risks(&outsider, RiskFilter::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(listed.total, 0);
}

// ============================================================================
// Authentication
// ============================================================================

fn registration(email: &str, password: &str) -> RegisterCommand {
    RegisterCommand {
        name: "Grace".to_string(),
        email: email.to_string(),
        password: password.to_string(),
        organization_id: ORG,
    }
}

#[tokio::test]
async fn test_register_login_and_token_round_trip() {
    let h = harness().await;
    let user = h
        .auth
        .register(registration("Grace@Corp.example", "Sup3r!secret"))
        .await
        .unwrap();
    assert_eq!(user.role, UserRole::ReadOnly);
    assert_eq!(user.email, "grace@corp.example");

    let token = h
        .auth
        .login(LoginCommand {
            email: "grace@corp.example".to_string(),
            password: "Sup3r!secret".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(token.token_type, "Bearer");

    let claims = h.auth.verify_token(&token.token).unwrap();
    assert_eq!(claims.user_id(), user.id);
    assert_eq!(claims.organization_id(), ORG);
    assert_eq!(claims.role, UserRole::ReadOnly);

    let actor = h.auth.authenticate(&token.token).await.unwrap();
    let me = h.auth.current_user(&actor).await.unwrap();
    assert!(me.last_login.is_some());
    assert_eq!(
        h.events.event_types(),
        vec!["UserRegistered", "UserLoggedIn"]
    );
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let h = harness().await;
    h.auth
        .register(registration("ada@corp.example", "Sup3r!secret"))
        .await
        .unwrap();

    let wrong_password = h
        .auth
        .login(LoginCommand {
            email: "ada@corp.example".to_string(),
            password: "Wr0ng!secret".to_string(),
        })
        .await;
    let unknown_email = h
        .auth
        .login(LoginCommand {
            email: "nobody@corp.example".to_string(),
            password: "Sup3r!secret".to_string(),
        })
        .await;
    assert_eq!(wrong_password.unwrap_err(), unknown_email.unwrap_err());
}

#[tokio::test]
async fn test_registration_rules() {
    let h = harness().await;
    h.auth
        .register(registration("ada@corp.example", "Sup3r!secret"))
        .await
        .unwrap();

    assert!(matches!(
        h.auth
            .register(registration("ADA@corp.example", "Sup3r!secret"))
            .await,
        Err(ApplicationError::Conflict(_))
    ));
    assert!(matches!(
        h.auth.register(registration("bob@corp.example", "weak")).await,
        Err(ApplicationError::ValidationFailed(_))
    ));
}

#[tokio::test]
async fn test_tampered_token_is_rejected() {
    let h = harness().await;
    h.auth
        .register(registration("eve@corp.example", "Sup3r!secret"))
        .await
        .unwrap();
    let token = h
        .auth
        .login(LoginCommand {
            email: "eve@corp.example".to_string(),
            password: "Sup3r!secret".to_string(),
        })
        .await
        .unwrap();

    let mut tampered = token.token.clone();
    tampered.push('x');
    assert!(matches!(
        h.auth.verify_token(&tampered),
        Err(ApplicationError::Unauthorized(_))
    ));
    assert!(h.auth.verify_token("not-a-jwt").is_err());
}

#[tokio::test]
async fn test_role_change_applies_to_existing_tokens() {
    let h = harness().await;
    let admin = h.user(1, ORG, UserRole::Admin).await;
    let user = h
        .auth
        .register(registration("sam@corp.example", "Sup3r!secret"))
        .await
        .unwrap();
    let token = h
        .auth
        .login(LoginCommand {
            email: "sam@corp.example".to_string(),
            password: "Sup3r!secret".to_string(),
        })
        .await
        .unwrap();

    let owner = h.auth.authenticate(&token.token).await.unwrap();
    assert!(matches!(
        h.auth.change_role(&owner, user.id, UserRole::Admin).await,
        Err(ApplicationError::Forbidden(_))
    ));

    h.auth
        .change_role(&admin, user.id, UserRole::RiskManager)
        .await
        .unwrap();
    let actor = h.auth.authenticate(&token.token).await.unwrap();
    assert_eq!(actor.role, UserRole::RiskManager);
}

#[tokio::test]
async fn test_change_password() {
    let h = harness().await;
    h.auth
        .register(registration("kim@corp.example", "Sup3r!secret"))
        .await
        .unwrap();
    let token = h
        .auth
        .login(LoginCommand {
            email: "kim@corp.example".to_string(),
            password: "Sup3r!secret".to_string(),
        })
        .await
        .unwrap();
    let actor = h.auth.authenticate(&token.token).await.unwrap();

    let wrong_current = h
        .auth
        .change_password(
            &actor,
            ChangePasswordCommand {
                current_password: "nope".to_string(),
                new_password: "N3w!secret".to_string(),
            },
        )
        .await;
    assert!(matches!(wrong_current, Err(ApplicationError::Unauthorized(_))));

    h.auth
        .change_password(
            &actor,
            ChangePasswordCommand {
                current_password: "Sup3r!secret".to_string(),
                new_password: "N3w!secret".to_string(),
            },
        )
        .await
        .unwrap();
    assert!(h
        .auth
        .login(LoginCommand {
            email: "kim@corp.example".to_string(),
            password: "N3w!secret".to_string(),
        })
        .await
        .is_ok());
}

#[tokio::test]
async fn test_bootstrap_admin_is_idempotent_and_lists_users() {
    let h = harness().await;
    let created = h
        .auth
        .bootstrap_admin(
            ORG,
            "Administrator".to_string(),
            "admin@corp.example".to_string(),
            "Adm1n!secret".to_string(),
        )
        .await
        .unwrap();
    assert!(created);
    let again = h
        .auth
        .bootstrap_admin(
            ORG,
            "Administrator".to_string(),
            "admin@corp.example".to_string(),
            "Adm1n!secret".to_string(),
        )
        .await
        .unwrap();
    assert!(!again);

    let token = h
        .auth
        .login(LoginCommand {
            email: "admin@corp.example".to_string(),
            password: "Adm1n!secret".to_string(),
        })
        .await
        .unwrap();
    let admin = h.auth.authenticate(&token.token).await.unwrap();
    assert_eq!(admin.role, UserRole::Admin);

    h.user(20, OTHER_ORG, UserRole::RiskOwner).await;
    let users = h
        .auth
        .list_users(&admin, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(users.total, 1);
    assert!(matches!(
        h.auth.get_user(&admin, UserId::new(20)).await,
        Err(ApplicationError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_registration_requires_existing_organization() {
    let h = harness().await;
    let mut cmd = registration("ghost@corp.example", "Sup3r!secret");
    cmd.organization_id = OrganizationId::new(987654);

    assert!(matches!(
        h.auth.register(cmd).await,
        Err(ApplicationError::NotFound { .. })
    ));
    assert!(h
        .repos
        .users
        .find_by_email("ghost@corp.example")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_login_does_not_undo_concurrent_role_change() {
    // A real bcrypt cost keeps the password check running while the role changes.
    let h = harness_with(Arc::new(InMemoryRiskRepository::new()), 10).await;
    let admin = h.user(1, ORG, UserRole::Admin).await;
    let user = h
        .auth
        .register(registration("lee@corp.example", "Sup3r!secret"))
        .await
        .unwrap();
    h.auth
        .change_role(&admin, user.id, UserRole::RiskManager)
        .await
        .unwrap();

    let login = h.auth.login(LoginCommand {
        email: "lee@corp.example".to_string(),
        password: "Sup3r!secret".to_string(),
    });
    let demote = async {
        tokio::time::sleep(StdDuration::from_millis(10)).await;
        h.auth
            .change_role(&admin, user.id, UserRole::ReadOnly)
            .await
    };
    let (token, demoted) = tokio::join!(login, demote);
    token.unwrap();
    demoted.unwrap();

    let stored = h.repos.users.find_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(stored.role(), UserRole::ReadOnly);
    assert!(stored.last_login().is_some());
}

#[tokio::test]
async fn test_password_change_does_not_undo_concurrent_login() {
    let h = harness().await;
    h.auth
        .register(registration("kai@corp.example", "Sup3r!secret"))
        .await
        .unwrap();
    let credentials = || LoginCommand {
        email: "kai@corp.example".to_string(),
        password: "Sup3r!secret".to_string(),
    };
    let token = h.auth.login(credentials()).await.unwrap();
    let actor = h.auth.authenticate(&token.token).await.unwrap();

    let (changed, logged_in) = tokio::join!(
        h.auth.change_password(
            &actor,
            ChangePasswordCommand {
                current_password: "Sup3r!secret".to_string(),
                new_password: "N3w!secret".to_string(),
            },
        ),
        h.auth.login(credentials()),
    );
    changed.unwrap();
    // A login that verified the old password after the change is refused.
    if let Err(err) = logged_in {
        assert!(matches!(err, ApplicationError::Unauthorized(_)));
    }

    assert!(h.auth.login(credentials()).await.is_err());
    assert!(h
        .auth
        .login(LoginCommand {
            email: "kai@corp.example".to_string(),
            password: "N3w!secret".to_string(),
        })
        .await
        .is_ok());
}

// ============================================================================
// User administration
// ============================================================================

fn staff(email: &str, role: UserRole) -> CreateUserCommand {
    CreateUserCommand {
        name: "Robin".to_string(),
        email: email.to_string(),
        password: "Sup3r!secret".to_string(),
        role,
    }
}

#[tokio::test]
async fn test_admin_creates_and_updates_users() {
    let h = harness().await;
    let admin = h.user(1, ORG, UserRole::Admin).await;

    let created = h
        .auth
        .create_user(&admin, staff("Robin@Corp.example", UserRole::RiskManager))
        .await
        .unwrap();
    assert_eq!(created.role, UserRole::RiskManager);
    assert_eq!(created.organization_id, ORG);
    assert_eq!(created.email, "robin@corp.example");
    assert!(matches!(
        h.auth
            .create_user(&admin, staff("robin@corp.example", UserRole::ReadOnly))
            .await,
        Err(ApplicationError::Conflict(_))
    ));

    assert!(matches!(
        h.auth
            .update_user(
                &admin,
                created.id,
                UpdateUserCommand {
                    email: Some("user1@corp.example".to_string()),
                    ..UpdateUserCommand::default()
                },
            )
            .await,
        Err(ApplicationError::Conflict(_))
    ));

    let updated = h
        .auth
        .update_user(
            &admin,
            created.id,
            UpdateUserCommand {
                name: Some("Robin Hill".to_string()),
                email: Some("robin@corp.example".to_string()),
                password: Some("An0ther!secret".to_string()),
                role: Some(UserRole::RiskOwner),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Robin Hill");
    assert_eq!(updated.role, UserRole::RiskOwner);
    assert!(h
        .auth
        .login(LoginCommand {
            email: "robin@corp.example".to_string(),
            password: "An0ther!secret".to_string(),
        })
        .await
        .is_ok());

    assert_eq!(
        h.events.event_types(),
        vec!["UserRegistered", "UserUpdated", "UserLoggedIn"]
    );
}

#[tokio::test]
async fn test_user_administration_requires_admin() {
    let h = harness().await;
    let manager = h.manager().await;
    let owner = h.user(3, ORG, UserRole::RiskOwner).await;

    assert!(matches!(
        h.auth
            .create_user(&manager, staff("x@corp.example", UserRole::Admin))
            .await,
        Err(ApplicationError::Forbidden(_))
    ));
    assert!(matches!(
        h.auth
            .update_user(
                &manager,
                owner.user_id,
                UpdateUserCommand {
                    role: Some(UserRole::Admin),
                    ..UpdateUserCommand::default()
                },
            )
            .await,
        Err(ApplicationError::Forbidden(_))
    ));
    assert!(matches!(
        h.auth.delete_user(&manager, owner.user_id).await,
        Err(ApplicationError::Forbidden(_))
    ));
}

#[tokio::test]
async fn test_admin_cannot_edit_other_organizations() {
    let h = harness().await;
    let admin = h.user(1, ORG, UserRole::Admin).await;
    let outsider = h.user(9, OTHER_ORG, UserRole::RiskOwner).await;

    assert!(matches!(
        h.auth
            .update_user(&admin, outsider.user_id, UpdateUserCommand::default())
            .await,
        Err(ApplicationError::NotFound { .. })
    ));
    assert!(matches!(
        h.auth.delete_user(&admin, outsider.user_id).await,
        Err(ApplicationError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_delete_user_keeps_users_with_open_work() {
    let h = harness().await;
    h.seed().await;
    let admin = h.user(1, ORG, UserRole::Admin).await;
    let manager = h.user(2, ORG, UserRole::RiskManager).await;
    let owner = h.user(3, ORG, UserRole::RiskOwner).await;

    assert!(matches!(
        h.auth.delete_user(&admin, admin.user_id).await,
        Err(ApplicationError::Conflict(_))
    ));

    let risk_id = h
        .risks
        .create_risk(
            &manager,
            CreateRiskCommand {
                title: "Data centre outage".to_string(),
                description: None,
                category_id: OPERATIONS,
                owner_id: Some(owner.user_id),
            },
        )
        .await
        .unwrap()
        .id;
    assert!(matches!(
        h.auth.delete_user(&admin, owner.user_id).await,
        Err(ApplicationError::Conflict(_))
    ));

    h.plan(&manager, risk_id, 10).await;
    h.risks
        .update_risk(
            &manager,
            risk_id,
            UpdateRiskCommand {
                owner_id: Some(manager.user_id),
                ..UpdateRiskCommand::default()
            },
        )
        .await
        .unwrap();
    h.auth.delete_user(&admin, owner.user_id).await.unwrap();
    assert!(matches!(
        h.auth.get_user(&admin, owner.user_id).await,
        Err(ApplicationError::NotFound { .. })
    ));

    assert!(matches!(
        h.auth.delete_user(&admin, manager.user_id).await,
        Err(ApplicationError::Conflict(_))
    ));
    assert!(h.events.event_types().contains(&"UserDeleted"));
}

#[tokio::test]
async fn test_update_profile() {
    let h = harness().await;
    let owner = h.user(3, ORG, UserRole::RiskOwner).await;
    h.user(4, ORG, UserRole::RiskOwner).await;

    let renamed = h
        .auth
        .update_profile(
            &owner,
            UpdateProfileCommand {
                name: Some("Jordan".to_string()),
                email: Some("USER3@corp.example".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Jordan");
    assert_eq!(renamed.email, "user3@corp.example");
    assert_eq!(renamed.role, UserRole::RiskOwner);

    assert!(matches!(
        h.auth
            .update_profile(
                &owner,
                UpdateProfileCommand {
                    email: Some("user4@corp.example".to_string()),
                    ..UpdateProfileCommand::default()
                },
            )
            .await,
        Err(ApplicationError::Conflict(_))
    ));
    assert!(matches!(
        h.auth
            .update_profile(
                &owner,
                UpdateProfileCommand {
                    email: Some("not-an-email".to_string()),
                    ..UpdateProfileCommand::default()
                },
            )
            .await,
        Err(ApplicationError::ValidationFailed(_))
    ));
}

#[tokio::test]
async fn test_current_organization() {
    let h = harness().await;
    let owner = h.user(3, ORG, UserRole::ReadOnly).await;

    let organization = h.reference.current_organization(&owner).await.unwrap();
    assert_eq!(organization.id, ORG);
    assert_eq!(organization.name, "Northwind");
    assert!(organization.subscription_active);
}

// ============================================================================
// Status changes and storage failures
// ============================================================================

#[tokio::test]
async fn test_status_request_that_recomputes_to_same_status_is_silent() {
    let h = harness().await;
    h.seed().await;
    let manager = h.manager().await;
    let risk_id = h.risk(&manager, "Key supplier exit").await;
    h.events.clear();

    let risk = h
        .risks
        .update_risk_status(&manager, risk_id, RiskStatus::Assessed)
        .await
        .unwrap();
    assert_eq!(risk.status, RiskStatus::Identified);
    assert!(!h.events.event_types().contains(&"RiskStatusChanged"));

    h.events.clear();
    let closed = h
        .risks
        .update_risk_status(&manager, risk_id, RiskStatus::Closed)
        .await
        .unwrap();
    assert_eq!(closed.status, RiskStatus::Closed);
    assert_eq!(h.events.event_types(), vec!["RiskStatusChanged"]);
}

#[tokio::test]
async fn test_storage_failures_are_not_reported_as_missing() {
    let risks = Arc::new(FlakyRiskRepository::default());
    let h = harness_with(risks.clone(), 4).await;
    h.seed().await;
    let manager = h.manager().await;
    let risk_id = h.risk(&manager, "Port strike").await;
    let assessment_id = h.assess(&manager, risk_id, 2, 3, 1).await;
    let action_id = h.plan(&manager, risk_id, 5).await;

    risks.fail_reads(true);
    assert!(matches!(
        h.assessments.get_assessment(&manager, assessment_id).await,
        Err(ApplicationError::RepositoryError(_))
    ));
    assert!(matches!(
        h.mitigations.get_mitigation(&manager, action_id).await,
        Err(ApplicationError::RepositoryError(_))
    ));

    risks.fail_reads(false);
    assert!(h.assessments.get_assessment(&manager, assessment_id).await.is_ok());
    assert!(h.mitigations.get_mitigation(&manager, action_id).await.is_ok());
}
