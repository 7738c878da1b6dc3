//! Mitigation Action Application Service
//!
//! Every mutation recomputes the owning risk before returning. Actions that
//! are open and past their due date are flagged `Overdue` whenever they are
//! written, and by the periodic sweep.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use erm_domain::entities::MitigationAction;
use erm_domain::repositories::{MitigationFilter, RiskFilter};
use erm_domain::scoring::RiskScoringEngine;
use erm_domain::value_objects::{
    MitigationActionId, MitigationStatus, OrganizationId, Permission, RiskId, UserId,
};

use super::recalculation::RiskRecalculator;
use crate::dto::{
    Actor, CreateMitigationCommand, MitigationDto, OverdueSweepDto, Page, PageRequest,
    UpdateMitigationCommand,
};
use crate::errors::{ApplicationError, ApplicationResult};
use crate::events::{ApplicationEvent, EventPublisher};
use crate::ports::{Repositories, UnitOfWork};

/// Mitigation Action Application Service
pub struct MitigationService {
    repos: Repositories,
    uow: Arc<UnitOfWork>,
    events: Arc<dyn EventPublisher>,
    recalculator: RiskRecalculator,
}

impl MitigationService {
    pub fn new(repos: Repositories, uow: Arc<UnitOfWork>, events: Arc<dyn EventPublisher>) -> Self {
        let recalculator = RiskRecalculator::new(repos.clone(), Arc::clone(&events));
        Self {
            repos,
            uow,
            events,
            recalculator,
        }
    }

    /// Actions on risks of the caller's organization, earliest due first
    pub async fn list_mitigations(
        &self,
        actor: &Actor,
        filter: MitigationFilter,
        page: PageRequest,
    ) -> ApplicationResult<Page<MitigationDto>> {
        actor.require(Permission::Read)?;
        let visible = self.visible_risks(actor.organization_id).await?;
        let mut actions: Vec<MitigationAction> = self
            .repos
            .mitigations
            .find_all(&filter)
            .await?
            .into_iter()
            .filter(|action| visible.contains(&action.risk_id))
            .collect();
        actions.sort_by_key(|action| (action.due_date, action.id));
        Ok(Page::paginate(actions, page).map(|action| MitigationDto::from_domain(&action)))
    }

    pub async fn get_mitigation(
        &self,
        actor: &Actor,
        id: MitigationActionId,
    ) -> ApplicationResult<MitigationDto> {
        actor.require(Permission::Read)?;
        let action = self.load(actor, id).await?;
        Ok(MitigationDto::from_domain(&action))
    }

    /// Plan a new action; one created past its due date starts `Overdue`
    #[instrument(skip(self, cmd), fields(user = %actor.user_id, risk_id = %cmd.risk_id))]
    pub async fn create_mitigation(
        &self,
        actor: &Actor,
        cmd: CreateMitigationCommand,
    ) -> ApplicationResult<MitigationDto> {
        actor.require(Permission::Update)?;

        let action = self
            .uow
            .execute(async {
                self.recalculator
                    .load_risk(actor.organization_id, cmd.risk_id)
                    .await?;
                self.check_assignee(actor.organization_id, cmd.assigned_to)
                    .await?;

                let mut action = MitigationAction::new(
                    self.repos.mitigations.next_id().await?,
                    cmd.risk_id,
                    cmd.assigned_to,
                    cmd.description,
                    cmd.due_date,
                    cmd.status.unwrap_or_default(),
                )?;
                action.mark_overdue_if_due(Utc::now());
                self.repos.mitigations.save(&action).await?;
                self.recalculator.recalculate(action.risk_id).await?;
                Ok(action)
            })
            .await?;

        info!(action_id = %action.id, status = %action.status, "Mitigation action planned");
        self.events
            .publish(ApplicationEvent::MitigationPlanned {
                action_id: action.id,
                risk_id: action.risk_id,
                timestamp: Utc::now(),
            })
            .await;

        Ok(MitigationDto::from_domain(&action))
    }

    /// Edit an action's assignee, description, due date or status
    pub async fn update_mitigation(
        &self,
        actor: &Actor,
        id: MitigationActionId,
        cmd: UpdateMitigationCommand,
    ) -> ApplicationResult<MitigationDto> {
        actor.require(Permission::Update)?;

        let (action, status_changed) = self
            .uow
            .execute(async {
                let mut action = self.load(actor, id).await?;
                let previous_status = action.status;

                if let Some(assigned_to) = cmd.assigned_to {
                    self.check_assignee(actor.organization_id, assigned_to)
                        .await?;
                    action.reassign(assigned_to);
                }
                if let Some(description) = cmd.description {
                    action.update_description(description)?;
                }
                if let Some(due_date) = cmd.due_date {
                    action.reschedule(due_date);
                }
                if let Some(status) = cmd.status {
                    action.set_status(status);
                }
                action.mark_overdue_if_due(Utc::now());

                self.repos.mitigations.save(&action).await?;
                self.recalculator.recalculate(action.risk_id).await?;
                let status_changed = action.status != previous_status;
                Ok((action, status_changed))
            })
            .await?;

        if status_changed {
            self.publish_status_change(&action).await;
        }

        Ok(MitigationDto::from_domain(&action))
    }

    /// Change only the status of an action
    #[instrument(skip(self), fields(user = %actor.user_id))]
    pub async fn update_mitigation_status(
        &self,
        actor: &Actor,
        id: MitigationActionId,
        status: MitigationStatus,
    ) -> ApplicationResult<MitigationDto> {
        self.update_mitigation(
            actor,
            id,
            UpdateMitigationCommand {
                status: Some(status),
                ..UpdateMitigationCommand::default()
            },
        )
        .await
    }

    /// Remove an action and recompute its risk
    #[instrument(skip(self), fields(user = %actor.user_id))]
    pub async fn delete_mitigation(
        &self,
        actor: &Actor,
        id: MitigationActionId,
    ) -> ApplicationResult<()> {
        actor.require(Permission::Delete)?;

        let risk_id = self
            .uow
            .execute(async {
                let action = self.load(actor, id).await?;
                self.repos.mitigations.delete(id).await?;
                self.recalculator.recalculate(action.risk_id).await?;
                Ok(action.risk_id)
            })
            .await?;

        self.events
            .publish(ApplicationEvent::MitigationDeleted {
                action_id: id,
                risk_id,
                timestamp: Utc::now(),
            })
            .await;

        Ok(())
    }

    /// Flag past-due actions of the caller's organization as `Overdue`
    pub async fn refresh_overdue(
        &self,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> ApplicationResult<OverdueSweepDto> {
        actor.require(Permission::Update)?;
        let visible = self.visible_risks(actor.organization_id).await?;
        self.sweep(now, |action| visible.contains(&action.risk_id))
            .await
    }

    /// Flag past-due actions of every organization as `Overdue`
    ///
    /// Used by the background sweep; no caller permissions apply.
    pub async fn refresh_all_overdue(&self, now: DateTime<Utc>) -> ApplicationResult<OverdueSweepDto> {
        self.sweep(now, |_| true).await
    }

    async fn sweep(
        &self,
        now: DateTime<Utc>,
        include: impl Fn(&MitigationAction) -> bool,
    ) -> ApplicationResult<OverdueSweepDto> {
        let (refresh, risks_recalculated) = self
            .uow
            .execute(async {
                let candidates: Vec<MitigationAction> = self
                    .repos
                    .mitigations
                    .find_all(&MitigationFilter::default())
                    .await?
                    .into_iter()
                    .filter(|action| include(action))
                    .collect();

                let refresh = RiskScoringEngine::refresh_overdue_actions(&candidates, now);
                let mut affected = BTreeSet::new();
                for action in refresh.changed_actions() {
                    self.repos.mitigations.save(action).await?;
                    affected.insert(action.risk_id);
                }

                let mut risks_recalculated = Vec::new();
                for risk_id in affected {
                    let before = self.repos.risks.find_by_id(risk_id).await?;
                    match self.recalculator.recalculate(risk_id).await {
                        Ok(after) => {
                            let changed = before.map_or(true, |before| {
                                before.status() != after.status()
                                    || before.risk_score() != after.risk_score()
                            });
                            if changed {
                                risks_recalculated.push(risk_id);
                            }
                        }
                        Err(ApplicationError::NotFound { .. }) => {
                            warn!(risk_id = %risk_id, "Overdue action belongs to a missing risk");
                        }
                        Err(err) => return Err(err),
                    }
                }

                Ok((refresh, risks_recalculated))
            })
            .await?;

        for action in refresh.changed_actions() {
            self.publish_status_change(action).await;
        }
        if refresh.has_changes() {
            info!(
                marked_overdue = refresh.changed.len(),
                risks = risks_recalculated.len(),
                "Overdue sweep flagged actions"
            );
        }

        Ok(OverdueSweepDto {
            marked_overdue: refresh.changed,
            risks_recalculated,
        })
    }

    /// Load an action whose risk belongs to the caller's organization
    async fn load(&self, actor: &Actor, id: MitigationActionId) -> ApplicationResult<MitigationAction> {
        let action = self
            .repos
            .mitigations
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("MitigationAction", id))?;
        self.recalculator
            .load_risk(actor.organization_id, action.risk_id)
            .await
            .map_err(|err| match err {
                ApplicationError::NotFound { .. } => ApplicationError::not_found("MitigationAction", id),
                other => other,
            })?;
        Ok(action)
    }

    async fn visible_risks(&self, organization_id: OrganizationId) -> ApplicationResult<HashSet<RiskId>> {
        Ok(self
            .repos
            .risks
            .find_all(&RiskFilter::for_organization(organization_id))
            .await?
            .iter()
            .map(|risk| risk.id())
            .collect())
    }

    async fn check_assignee(
        &self,
        organization_id: OrganizationId,
        user_id: UserId,
    ) -> ApplicationResult<()> {
        match self.repos.users.find_by_id(user_id).await? {
            Some(user) if user.organization_id() == organization_id => Ok(()),
            _ => Err(ApplicationError::ValidationFailed(format!(
                "Invalid assignee: {}",
                user_id
            ))),
        }
    }

    async fn publish_status_change(&self, action: &MitigationAction) {
        self.events
            .publish(ApplicationEvent::MitigationStatusChanged {
                action_id: action.id,
                status: action.status,
                timestamp: Utc::now(),
            })
            .await;
    }
}
