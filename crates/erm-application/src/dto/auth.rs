//! Authentication DTOs, commands and token claims

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use erm_domain::entities::User;
use erm_domain::value_objects::{OrganizationId, Permission, UserId, UserRole};

use crate::errors::{ApplicationError, ApplicationResult};

/// Self-service registration into an existing organization
///
/// The account starts without permissions until an administrator of that
/// organization assigns a role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterCommand {
    pub name: String,
    pub email: String,
    pub password: String,
    pub organization_id: OrganizationId,
}

/// Account created by an administrator inside their own organization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserCommand {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

/// Administrative edit of a user; `None` fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserCommand {
    pub name: Option<String>,
    pub email: Option<String>,
    /// Replacement password, subject to the password policy
    pub password: Option<String>,
    pub role: Option<UserRole>,
}

/// Edit of the caller's own profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileCommand {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Email/password login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginCommand {
    pub email: String,
    pub password: String,
}

/// Password change for the calling user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordCommand {
    pub current_password: String,
    pub new_password: String,
}

/// User as exposed to clients; never carries the password hash
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDto {
    pub id: UserId,
    pub organization_id: OrganizationId,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub last_login: Option<DateTime<Utc>>,
}

impl UserDto {
    pub fn from_domain(user: &User) -> Self {
        Self {
            id: user.id(),
            organization_id: user.organization_id(),
            name: user.name().to_string(),
            email: user.email().to_string(),
            role: user.role(),
            last_login: user.last_login(),
        }
    }
}

/// JWT claims issued at login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: i64,
    pub email: String,
    pub role: UserRole,
    pub org: i64,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> UserId {
        UserId::new(self.sub)
    }

    pub fn organization_id(&self) -> OrganizationId {
        OrganizationId::new(self.org)
    }
}

/// Signed token plus the user it was issued to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthTokenDto {
    pub token: String,
    pub token_type: String,
    pub expires_at: i64,
    pub user: UserDto,
}

/// The authenticated caller of a use case
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub organization_id: OrganizationId,
    pub role: UserRole,
}

impl Actor {
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id(),
            organization_id: user.organization_id(),
            role: user.role(),
        }
    }

    /// Fail with `Forbidden` unless the role grants the permission
    pub fn require(&self, permission: Permission) -> ApplicationResult<()> {
        if self.role.has_permission(permission) {
            Ok(())
        } else {
            Err(ApplicationError::Forbidden(format!(
                "role {} lacks {} permission",
                self.role, permission
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(role: UserRole) -> Actor {
        Actor {
            user_id: UserId::new(1),
            organization_id: OrganizationId::new(1),
            role,
        }
    }

    #[test]
    fn test_require_follows_role_permissions() {
        assert!(actor(UserRole::Admin).require(Permission::Admin).is_ok());
        assert!(actor(UserRole::RiskOwner).require(Permission::Update).is_ok());
        assert!(matches!(
            actor(UserRole::Auditor).require(Permission::Create),
            Err(ApplicationError::Forbidden(_))
        ));
        assert!(actor(UserRole::ReadOnly).require(Permission::Read).is_err());
    }
}
