//! Lifecycle walkthroughs across the domain entities and the scoring engine

use chrono::{DateTime, Duration, TimeZone, Utc};
use erm_domain::*;

fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

fn scales() -> (Vec<Likelihood>, Vec<Impact>) {
    (Likelihood::standard_scale(), Impact::standard_scale())
}

/// Resolve an assessment against the standard scales like the services do
fn resolve(assessment: Assessment) -> ScoredAssessment {
    let (likelihoods, impacts) = scales();
    let likelihood = likelihoods.iter().find(|l| l.id == assessment.likelihood_id);
    let impact = impacts.iter().find(|i| i.id == assessment.impact_id);
    ScoredAssessment::resolve(assessment, likelihood, impact)
}

fn new_risk() -> Risk {
    Risk::new(
        RiskId::new(1),
        OrganizationId::new(1),
        UserId::new(7),
        CategoryId::new(2),
        "Data centre outage".to_string(),
        Some("Loss of primary hosting facility".to_string()),
    )
    .unwrap()
}

fn assessment(id: i64, date: DateTime<Utc>, likelihood: i64, impact: i64) -> Assessment {
    Assessment::new(
        AssessmentId::new(id),
        RiskId::new(1),
        LikelihoodId::new(likelihood),
        ImpactId::new(impact),
        date,
        UserId::new(7),
        None,
    )
    .unwrap()
}

fn recalc(risk: &mut Risk, assessments: &[Assessment], actions: &[MitigationAction]) -> bool {
    let scored: Vec<_> = assessments.iter().cloned().map(resolve).collect();
    let evaluation = RiskScoringEngine::evaluate(risk, &scored, actions);
    risk.apply_evaluation(&evaluation)
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn test_full_risk_lifecycle() {
    let mut risk = new_risk();
    assert_eq!(risk.status(), RiskStatus::Identified);
    assert_eq!(risk.risk_score(), 0);

    let assessments = vec![assessment(1, day(2024, 1, 1), 3, 4)];
    assert!(recalc(&mut risk, &assessments, &[]));
    assert_eq!(risk.risk_score(), 12);
    assert_eq!(risk.status(), RiskStatus::Assessed);
    assert_eq!(risk.level(), RiskLevel::Medium);

    let mut actions = vec![MitigationAction::new(
        MitigationActionId::new(1),
        risk.id(),
        UserId::new(8),
        "Fail over to secondary site".to_string(),
        Utc::now() + Duration::days(30),
        MitigationStatus::Planned,
    )
    .unwrap()];
    recalc(&mut risk, &assessments, &actions);
    assert_eq!(risk.status(), RiskStatus::Mitigating);

    actions[0].set_status(MitigationStatus::Completed);
    recalc(&mut risk, &assessments, &actions);
    assert_eq!(risk.status(), RiskStatus::Monitored);

    // nothing changed, nothing to persist
    assert!(!recalc(&mut risk, &assessments, &actions));
}

#[test]
fn test_newer_assessment_replaces_score() {
    let mut risk = new_risk();
    let assessments = vec![
        assessment(1, day(2024, 1, 1), 2, 2),
        assessment(2, day(2024, 3, 1), 5, 10),
    ];
    recalc(&mut risk, &assessments, &[]);
    assert_eq!(risk.risk_score(), 50);
    assert_eq!(risk.level(), RiskLevel::Critical);
}

#[test]
fn test_unknown_scale_reference_is_ignored() {
    let mut risk = new_risk();
    let assessments = vec![
        assessment(1, day(2024, 1, 1), 2, 3),
        // impact 42 does not exist on the scale
        assessment(2, day(2024, 5, 1), 4, 42),
    ];
    recalc(&mut risk, &assessments, &[]);
    assert_eq!(risk.risk_score(), 6);
}

#[test]
fn test_removing_last_assessment_returns_to_identified() {
    let mut risk = new_risk();
    let assessments = vec![assessment(1, day(2024, 1, 1), 3, 3)];
    recalc(&mut risk, &assessments, &[]);
    assert_eq!(risk.status(), RiskStatus::Assessed);

    recalc(&mut risk, &[], &[]);
    assert_eq!(risk.status(), RiskStatus::Identified);
    assert_eq!(risk.risk_score(), 0);
}

#[test]
fn test_closed_risk_keeps_score_current_but_stays_closed() {
    let mut risk = new_risk();
    risk.set_status(RiskStatus::Closed);

    let assessments = vec![assessment(1, day(2024, 2, 1), 4, 5)];
    recalc(&mut risk, &assessments, &[]);
    assert_eq!(risk.status(), RiskStatus::Closed);
    assert_eq!(risk.risk_score(), 20);

    // reopening is explicit and the next evaluation takes over again
    risk.set_status(RiskStatus::Identified);
    recalc(&mut risk, &assessments, &[]);
    assert_eq!(risk.status(), RiskStatus::Assessed);
}

// ============================================================================
// Overdue sweep
// ============================================================================

#[test]
fn test_refresh_marks_past_due_action_overdue() {
    let now = Utc::now();
    let actions = vec![MitigationAction::new(
        MitigationActionId::new(3),
        RiskId::new(1),
        UserId::new(8),
        "Patch firewall firmware".to_string(),
        now - Duration::days(2),
        MitigationStatus::InProgress,
    )
    .unwrap()];

    let refresh = RiskScoringEngine::refresh_overdue_actions(&actions, now);
    assert!(refresh.has_changes());
    assert_eq!(refresh.actions[0].status, MitigationStatus::Overdue);

    // an overdue action keeps the risk in mitigation
    let mut risk = new_risk();
    let assessments = vec![assessment(1, day(2024, 1, 1), 1, 1)];
    recalc(&mut risk, &assessments, &refresh.actions);
    assert_eq!(risk.status(), RiskStatus::Mitigating);
}

// ============================================================================
// Users and roles
// ============================================================================

#[test]
fn test_role_permissions() {
    let admin = UserRole::Admin;
    assert!(admin.has_permission(Permission::Delete));

    assert!(UserRole::RiskManager.has_permission(Permission::Delete));
    assert!(UserRole::DepartmentHead.has_permission(Permission::Create));
    assert!(!UserRole::DepartmentHead.has_permission(Permission::Delete));
    assert!(UserRole::RiskOwner.has_permission(Permission::Update));
    assert!(!UserRole::RiskOwner.has_permission(Permission::Create));
    assert!(UserRole::Auditor.has_permission(Permission::Read));
    assert!(!UserRole::Auditor.has_permission(Permission::Update));
    assert!(!UserRole::ReadOnly.has_permission(Permission::Read));
}

#[test]
fn test_user_email_is_normalized() {
    let user = User::new(
        UserId::new(1),
        OrganizationId::new(1),
        "Dana Reyes".to_string(),
        "  Dana.Reyes@Example.COM ".to_string(),
        "hash".to_string(),
        UserRole::RiskOwner,
    )
    .unwrap();
    assert_eq!(user.email(), "dana.reyes@example.com");
    assert!(user.can(Permission::Update));
}
