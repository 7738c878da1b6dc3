//! Authentication Application Service
//!
//! Registration, login, bearer-token verification and user administration.
//! Passwords are hashed with bcrypt on the blocking pool; tokens are HS256
//! JWTs carrying the user's id, email, role and organization.
//!
//! bcrypt runs outside the unit of work. Writes that follow a hash or verify
//! reload the user inside the unit of work and apply only their own change,
//! so a role or profile edit committed meanwhile is never overwritten.

use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::{info, instrument, warn};

use erm_domain::entities::User;
use erm_domain::repositories::{MitigationFilter, RiskFilter};
use erm_domain::services::ValidationService;
use erm_domain::value_objects::{OrganizationId, Permission, UserId, UserRole};

use crate::dto::{
    Actor, AuthTokenDto, ChangePasswordCommand, Claims, CreateUserCommand, LoginCommand, Page,
    PageRequest, RegisterCommand, UpdateProfileCommand, UpdateUserCommand, UserDto,
};
use crate::errors::{ApplicationError, ApplicationResult};
use crate::events::{ApplicationEvent, EventPublisher};
use crate::ports::{Repositories, UnitOfWork};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Role of self-registered accounts; grants nothing until an admin steps in
pub const SELF_REGISTERED_ROLE: UserRole = UserRole::ReadOnly;

/// Token signing and password hashing parameters
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub bcrypt_cost: u32,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl: Duration::hours(24),
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

/// Authentication Application Service
pub struct AuthService {
    repos: Repositories,
    uow: Arc<UnitOfWork>,
    events: Arc<dyn EventPublisher>,
    settings: AuthSettings,
}

impl AuthService {
    pub fn new(
        repos: Repositories,
        uow: Arc<UnitOfWork>,
        events: Arc<dyn EventPublisher>,
        settings: AuthSettings,
    ) -> Self {
        Self {
            repos,
            uow,
            events,
            settings,
        }
    }

    /// Create an account in an existing organization
    ///
    /// Self-registered accounts get [`SELF_REGISTERED_ROLE`]; an administrator
    /// of the organization grants the working role.
    #[instrument(skip(self, cmd), fields(email = %cmd.email))]
    pub async fn register(&self, cmd: RegisterCommand) -> ApplicationResult<UserDto> {
        let RegisterCommand {
            name,
            email,
            password,
            organization_id,
        } = cmd;
        Self::check_password_policy(&password)?;
        self.check_organization(organization_id).await?;
        let password_hash = self.hash_password(password).await?;

        let user = self
            .uow
            .execute(async {
                self.check_email_free(&email, None).await?;
                let user = User::new(
                    self.repos.users.next_id().await?,
                    organization_id,
                    name,
                    email,
                    password_hash,
                    SELF_REGISTERED_ROLE,
                )?;
                self.repos.users.save(&user).await?;
                Ok(user)
            })
            .await?;

        info!(user_id = %user.id(), organization_id = %user.organization_id(), "User registered");
        self.events
            .publish(ApplicationEvent::UserRegistered {
                user_id: user.id(),
                timestamp: Utc::now(),
            })
            .await;

        Ok(UserDto::from_domain(&user))
    }

    /// Create the initial administrator unless the email is already taken
    ///
    /// Returns `false` when the account already existed.
    pub async fn bootstrap_admin(
        &self,
        organization_id: OrganizationId,
        name: String,
        email: String,
        password: String,
    ) -> ApplicationResult<bool> {
        if self.repos.users.find_by_email(&email).await?.is_some() {
            return Ok(false);
        }
        Self::check_password_policy(&password)?;
        let password_hash = self.hash_password(password).await?;

        self.uow
            .execute(async {
                let user = User::new(
                    self.repos.users.next_id().await?,
                    organization_id,
                    name,
                    email,
                    password_hash,
                    UserRole::Admin,
                )?;
                self.repos.users.save(&user).await?;
                info!(user_id = %user.id(), "Bootstrap administrator created");
                Ok(true)
            })
            .await
    }

    /// Verify credentials and issue a token
    ///
    /// Unknown email and wrong password fail identically.
    #[instrument(skip(self, cmd))]
    pub async fn login(&self, cmd: LoginCommand) -> ApplicationResult<AuthTokenDto> {
        let Some(candidate) = self.repos.users.find_by_email(&cmd.email).await? else {
            warn!("Login attempt for unknown email");
            return Err(ApplicationError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };
        let verified_hash = candidate.password_hash().to_string();
        if !self
            .verify_password(cmd.password, verified_hash.clone())
            .await?
        {
            warn!(user_id = %candidate.id(), "Login attempt with wrong password");
            return Err(ApplicationError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let now = Utc::now();
        let user = self
            .uow
            .execute(async {
                let mut user = self.reload_verified(candidate.id(), &verified_hash).await?;
                user.record_login(now);
                self.repos.users.save(&user).await?;
                Ok(user)
            })
            .await?;

        let token = self.issue_token(&user)?;
        info!(user_id = %user.id(), "User logged in");
        self.events
            .publish(ApplicationEvent::UserLoggedIn {
                user_id: user.id(),
                timestamp: now,
            })
            .await;

        Ok(token)
    }

    /// Sign a token for a user
    pub fn issue_token(&self, user: &User) -> ApplicationResult<AuthTokenDto> {
        let issued_at = Utc::now();
        let expires_at = issued_at + self.settings.token_ttl;
        let claims = Claims {
            sub: user.id().value(),
            email: user.email().to_string(),
            role: user.role(),
            org: user.organization_id().value(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.settings.jwt_secret.as_bytes()),
        )
        .map_err(|e| ApplicationError::CredentialError(e.to_string()))?;

        Ok(AuthTokenDto {
            token,
            token_type: "Bearer".to_string(),
            expires_at: claims.exp,
            user: UserDto::from_domain(user),
        })
    }

    /// Check signature and expiry of a token
    pub fn verify_token(&self, token: &str) -> ApplicationResult<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.settings.jwt_secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| ApplicationError::Unauthorized(format!("Invalid token: {}", e)))
    }

    /// Resolve a bearer token to the calling user
    ///
    /// The user must still exist; role and organization come from the stored
    /// user rather than the token so role changes apply immediately.
    pub async fn authenticate(&self, token: &str) -> ApplicationResult<Actor> {
        let claims = self.verify_token(token)?;
        let user = self
            .repos
            .users
            .find_by_id(claims.user_id())
            .await?
            .ok_or_else(|| ApplicationError::Unauthorized("User no longer exists".to_string()))?;
        Ok(Actor::from_user(&user))
    }

    pub async fn current_user(&self, actor: &Actor) -> ApplicationResult<UserDto> {
        let user = self.load_user(actor.user_id).await?;
        Ok(UserDto::from_domain(&user))
    }

    /// Replace the caller's password after checking the current one
    #[instrument(skip(self, cmd), fields(user = %actor.user_id))]
    pub async fn change_password(
        &self,
        actor: &Actor,
        cmd: ChangePasswordCommand,
    ) -> ApplicationResult<()> {
        let verified_hash = self.load_user(actor.user_id).await?.password_hash().to_string();
        if !self
            .verify_password(cmd.current_password, verified_hash.clone())
            .await?
        {
            return Err(ApplicationError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }
        Self::check_password_policy(&cmd.new_password)?;
        let new_hash = self.hash_password(cmd.new_password).await?;

        self.uow
            .execute(async {
                let mut user = self.reload_verified(actor.user_id, &verified_hash).await?;
                user.set_password_hash(new_hash);
                self.repos.users.save(&user).await?;
                Ok(())
            })
            .await?;

        info!("Password changed");
        self.publish_user_updated(actor.user_id).await;
        Ok(())
    }

    /// Edit the caller's own name and email
    #[instrument(skip(self, cmd), fields(user = %actor.user_id))]
    pub async fn update_profile(
        &self,
        actor: &Actor,
        cmd: UpdateProfileCommand,
    ) -> ApplicationResult<UserDto> {
        let user = self
            .uow
            .execute(async {
                let mut user = self.load_user(actor.user_id).await?;
                self.apply_profile(&mut user, cmd.name.as_deref(), cmd.email.as_deref())
                    .await?;
                self.repos.users.save(&user).await?;
                Ok(user)
            })
            .await?;

        info!("Profile updated");
        self.publish_user_updated(user.id()).await;
        Ok(UserDto::from_domain(&user))
    }

    /// Users of the caller's organization, in id order
    pub async fn list_users(&self, actor: &Actor, page: PageRequest) -> ApplicationResult<Page<UserDto>> {
        actor.require(Permission::Admin)?;
        let users = self
            .repos
            .users
            .find_by_organization(actor.organization_id)
            .await?;
        Ok(Page::paginate(users, page).map(|user| UserDto::from_domain(&user)))
    }

    pub async fn get_user(&self, actor: &Actor, user_id: UserId) -> ApplicationResult<UserDto> {
        actor.require(Permission::Admin)?;
        let user = self.load_org_user(actor, user_id).await?;
        Ok(UserDto::from_domain(&user))
    }

    /// Create an account with any role in the caller's organization
    #[instrument(skip(self, cmd), fields(user = %actor.user_id, email = %cmd.email))]
    pub async fn create_user(
        &self,
        actor: &Actor,
        cmd: CreateUserCommand,
    ) -> ApplicationResult<UserDto> {
        actor.require(Permission::Admin)?;
        let CreateUserCommand {
            name,
            email,
            password,
            role,
        } = cmd;
        Self::check_password_policy(&password)?;
        let password_hash = self.hash_password(password).await?;

        let user = self
            .uow
            .execute(async {
                self.check_email_free(&email, None).await?;
                let user = User::new(
                    self.repos.users.next_id().await?,
                    actor.organization_id,
                    name,
                    email,
                    password_hash,
                    role,
                )?;
                self.repos.users.save(&user).await?;
                Ok(user)
            })
            .await?;

        info!(target_user = %user.id(), role = %user.role(), "User created");
        self.events
            .publish(ApplicationEvent::UserRegistered {
                user_id: user.id(),
                timestamp: Utc::now(),
            })
            .await;

        Ok(UserDto::from_domain(&user))
    }

    /// Edit a user of the caller's organization
    #[instrument(skip(self, cmd), fields(user = %actor.user_id))]
    pub async fn update_user(
        &self,
        actor: &Actor,
        user_id: UserId,
        cmd: UpdateUserCommand,
    ) -> ApplicationResult<UserDto> {
        actor.require(Permission::Admin)?;
        let UpdateUserCommand {
            name,
            email,
            password,
            role,
        } = cmd;
        let password_hash = match password {
            Some(password) => {
                Self::check_password_policy(&password)?;
                Some(self.hash_password(password).await?)
            }
            None => None,
        };

        let user = self
            .uow
            .execute(async {
                let mut user = self.load_org_user(actor, user_id).await?;
                self.apply_profile(&mut user, name.as_deref(), email.as_deref())
                    .await?;
                if let Some(role) = role {
                    user.change_role(role);
                }
                if let Some(hash) = password_hash {
                    user.set_password_hash(hash);
                }
                self.repos.users.save(&user).await?;
                Ok(user)
            })
            .await?;

        info!(target_user = %user_id, "User updated");
        self.publish_user_updated(user_id).await;
        Ok(UserDto::from_domain(&user))
    }

    /// Remove a user of the caller's organization
    ///
    /// Users that still own risks or hold mitigation actions are kept; their
    /// work has to be reassigned first.
    #[instrument(skip(self), fields(user = %actor.user_id))]
    pub async fn delete_user(&self, actor: &Actor, user_id: UserId) -> ApplicationResult<()> {
        actor.require(Permission::Admin)?;
        if user_id == actor.user_id {
            return Err(ApplicationError::Conflict(
                "Administrators cannot delete their own account".to_string(),
            ));
        }

        self.uow
            .execute(async {
                self.load_org_user(actor, user_id).await?;
                let owned = self
                    .repos
                    .risks
                    .find_all(&RiskFilter {
                        organization_id: Some(actor.organization_id),
                        owner_id: Some(user_id),
                        ..RiskFilter::default()
                    })
                    .await?;
                if !owned.is_empty() {
                    return Err(ApplicationError::Conflict(format!(
                        "User still owns {} risk(s)",
                        owned.len()
                    )));
                }
                let assigned = self
                    .repos
                    .mitigations
                    .find_all(&MitigationFilter {
                        assigned_to: Some(user_id),
                        ..MitigationFilter::default()
                    })
                    .await?;
                if !assigned.is_empty() {
                    return Err(ApplicationError::Conflict(format!(
                        "User is still assigned {} mitigation action(s)",
                        assigned.len()
                    )));
                }
                Ok(self.repos.users.delete(user_id).await?)
            })
            .await?;

        info!(target_user = %user_id, "User deleted");
        self.events
            .publish(ApplicationEvent::UserDeleted {
                user_id,
                timestamp: Utc::now(),
            })
            .await;
        Ok(())
    }

    /// Assign a role to a user of the caller's organization
    #[instrument(skip(self), fields(user = %actor.user_id))]
    pub async fn change_role(
        &self,
        actor: &Actor,
        user_id: UserId,
        role: UserRole,
    ) -> ApplicationResult<UserDto> {
        actor.require(Permission::Admin)?;

        let user = self
            .uow
            .execute(async {
                let mut user = self.load_org_user(actor, user_id).await?;
                user.change_role(role);
                self.repos.users.save(&user).await?;
                Ok(user)
            })
            .await?;

        info!(target_user = %user_id, role = %role, "User role changed");
        self.publish_user_updated(user_id).await;
        Ok(UserDto::from_domain(&user))
    }

    /// Current copy of a user whose password was just verified
    ///
    /// Fails like a wrong password when the account was removed or its
    /// password replaced while bcrypt was running.
    async fn reload_verified(
        &self,
        user_id: UserId,
        verified_hash: &str,
    ) -> ApplicationResult<User> {
        self.repos
            .users
            .find_by_id(user_id)
            .await?
            .filter(|user| user.password_hash() == verified_hash)
            .ok_or_else(|| ApplicationError::Unauthorized(INVALID_CREDENTIALS.to_string()))
    }

    async fn apply_profile(
        &self,
        user: &mut User,
        name: Option<&str>,
        email: Option<&str>,
    ) -> ApplicationResult<()> {
        if let Some(name) = name {
            user.rename(name)?;
        }
        if let Some(email) = email {
            self.check_email_free(email, Some(user.id())).await?;
            user.change_email(email)?;
        }
        Ok(())
    }

    async fn check_email_free(&self, email: &str, owner: Option<UserId>) -> ApplicationResult<()> {
        match self.repos.users.find_by_email(email).await? {
            Some(existing) if Some(existing.id()) != owner => Err(ApplicationError::Conflict(
                "Email already registered".to_string(),
            )),
            _ => Ok(()),
        }
    }

    async fn check_organization(&self, organization_id: OrganizationId) -> ApplicationResult<()> {
        self.repos
            .organizations
            .find_by_id(organization_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| ApplicationError::not_found("Organization", organization_id))
    }

    async fn publish_user_updated(&self, user_id: UserId) {
        self.events
            .publish(ApplicationEvent::UserUpdated {
                user_id,
                timestamp: Utc::now(),
            })
            .await;
    }

    async fn load_user(&self, user_id: UserId) -> ApplicationResult<User> {
        self.repos
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("User", user_id))
    }

    async fn load_org_user(&self, actor: &Actor, user_id: UserId) -> ApplicationResult<User> {
        self.repos
            .users
            .find_by_id(user_id)
            .await?
            .filter(|user| user.organization_id() == actor.organization_id)
            .ok_or_else(|| ApplicationError::not_found("User", user_id))
    }

    fn check_password_policy(password: &str) -> ApplicationResult<()> {
        let policy = ValidationService::validate_password(password);
        if policy.is_valid {
            Ok(())
        } else {
            Err(ApplicationError::ValidationFailed(policy.errors.join("; ")))
        }
    }

    async fn hash_password(&self, password: String) -> ApplicationResult<String> {
        let cost = self.settings.bcrypt_cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| ApplicationError::CredentialError(e.to_string()))?
            .map_err(|e| ApplicationError::CredentialError(e.to_string()))
    }

    /// A malformed stored hash counts as a mismatch
    async fn verify_password(&self, password: String, hash: String) -> ApplicationResult<bool> {
        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash).unwrap_or(false))
            .await
            .map_err(|e| ApplicationError::CredentialError(e.to_string()))
    }
}
