//! User entity representing a platform user

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};
use crate::services::ValidationService;
use crate::value_objects::{OrganizationId, Permission, UserId, UserRole};

/// User entity representing a platform user
///
/// Only the password hash is ever stored; hashing happens in the
/// application layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    organization_id: OrganizationId,
    name: String,
    email: String,
    #[serde(skip_serializing, default)]
    password_hash: String,
    role: UserRole,
    last_login: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// Create a user with email validation
    pub fn new(
        id: UserId,
        organization_id: OrganizationId,
        name: String,
        email: String,
        password_hash: String,
        role: UserRole,
    ) -> DomainResult<Self> {
        let email = Self::validate_email(&email)?;
        let name = Self::validate_name(&name)?;

        let now = Utc::now();
        Ok(Self {
            id,
            organization_id,
            name,
            email,
            password_hash,
            role,
            last_login: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn role(&self) -> UserRole {
        self.role
    }

    pub fn last_login(&self) -> Option<DateTime<Utc>> {
        self.last_login
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Check whether the user's role grants a permission
    pub fn can(&self, permission: Permission) -> bool {
        self.role.has_permission(permission)
    }

    /// Record a successful login
    pub fn record_login(&mut self, at: DateTime<Utc>) {
        self.last_login = Some(at);
        self.updated_at = at;
    }

    /// Replace the stored password hash
    pub fn set_password_hash(&mut self, password_hash: String) {
        self.password_hash = password_hash;
        self.updated_at = Utc::now();
    }

    /// Change the user's role
    pub fn change_role(&mut self, role: UserRole) {
        self.role = role;
        self.updated_at = Utc::now();
    }

    pub fn rename(&mut self, name: &str) -> DomainResult<()> {
        self.name = Self::validate_name(name)?;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Replace the login email; uniqueness is checked by the repository
    pub fn change_email(&mut self, email: &str) -> DomainResult<()> {
        self.email = Self::validate_email(email)?;
        self.updated_at = Utc::now();
        Ok(())
    }

    fn validate_email(email: &str) -> DomainResult<String> {
        let email = email.trim().to_lowercase();
        if !ValidationService::is_valid_email(&email) {
            return Err(DomainError::validation("email", "Invalid email format"));
        }
        Ok(email)
    }

    fn validate_name(name: &str) -> DomainResult<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("name", "Name cannot be empty"));
        }
        Ok(name.to_string())
    }
}
