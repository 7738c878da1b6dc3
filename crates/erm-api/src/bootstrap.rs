//! Startup seeding of the organization, its reference data and the first
//! administrator

use chrono::{Duration, Utc};
use tracing::{info, warn};

use erm_application::ApplicationResult;
use erm_config::BootstrapConfig;
use erm_domain::value_objects::OrganizationId;

use crate::state::AppState;

/// Seed the configured organization and categories and, if a password is set,
/// an admin account
///
/// Safe to run on every start: existing organizations, categories and
/// accounts are kept.
pub async fn bootstrap(state: &AppState, config: &BootstrapConfig) -> ApplicationResult<()> {
    let organization_id = OrganizationId::new(config.organization_id);

    let now = Utc::now();
    let created = state
        .reference
        .ensure_organization(
            organization_id,
            &config.organization_name,
            &config.organization_industry,
            now,
            now + Duration::days(i64::from(config.subscription_days)),
        )
        .await?;
    if created {
        info!(%organization_id, name = %config.organization_name, "Created bootstrap organization");
    }

    let seeded = state
        .reference
        .seed_categories(organization_id, &config.categories)
        .await?;
    info!(%organization_id, seeded, "Risk categories ready");

    match config.admin_password.as_deref() {
        Some(password) => {
            let created = state
                .auth
                .bootstrap_admin(
                    organization_id,
                    config.admin_name.clone(),
                    config.admin_email.clone(),
                    password.to_string(),
                )
                .await?;
            if created {
                info!(email = %config.admin_email, "Created bootstrap administrator");
            }
        }
        None => warn!("No bootstrap admin password configured; no administrator account created"),
    }

    Ok(())
}
