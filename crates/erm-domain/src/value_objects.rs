//! Value objects representing immutable domain concepts

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Declares an integer identifier newtype.
///
/// Identifiers are allocated by the owning store in creation order, so for
/// two ids of the same kind the larger one was created later.
macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw identifier
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Raw identifier value
            pub const fn value(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }
    };
}

entity_id!(
    /// Risk identifier
    RiskId
);
entity_id!(
    /// Assessment identifier
    AssessmentId
);
entity_id!(
    /// Mitigation action identifier
    MitigationActionId
);
entity_id!(
    /// Organization identifier
    OrganizationId
);
entity_id!(
    /// User identifier
    UserId
);
entity_id!(
    /// Risk category identifier
    CategoryId
);
entity_id!(
    /// Likelihood scale entry identifier
    LikelihoodId
);
entity_id!(
    /// Impact scale entry identifier
    ImpactId
);

/// Lifecycle stage of a risk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RiskStatus {
    #[default]
    Identified,
    Assessed,
    Mitigating,
    Monitored,
    Closed,
}

impl RiskStatus {
    /// All statuses in lifecycle order
    pub const ALL: [RiskStatus; 5] = [
        RiskStatus::Identified,
        RiskStatus::Assessed,
        RiskStatus::Mitigating,
        RiskStatus::Monitored,
        RiskStatus::Closed,
    ];

    /// Whether the risk has been closed by a user
    pub fn is_terminal(&self) -> bool {
        matches!(self, RiskStatus::Closed)
    }
}

impl fmt::Display for RiskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskStatus::Identified => write!(f, "Identified"),
            RiskStatus::Assessed => write!(f, "Assessed"),
            RiskStatus::Mitigating => write!(f, "Mitigating"),
            RiskStatus::Monitored => write!(f, "Monitored"),
            RiskStatus::Closed => write!(f, "Closed"),
        }
    }
}

impl FromStr for RiskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RiskStatus::ALL
            .into_iter()
            .find(|status| status.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown risk status '{}'", s))
    }
}

/// Status of a mitigation action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MitigationStatus {
    #[default]
    Planned,
    InProgress,
    Completed,
    Overdue,
}

impl MitigationStatus {
    /// All mitigation statuses
    pub const ALL: [MitigationStatus; 4] = [
        MitigationStatus::Planned,
        MitigationStatus::InProgress,
        MitigationStatus::Completed,
        MitigationStatus::Overdue,
    ];

    /// An open action still requires work on the risk
    pub fn is_open(&self) -> bool {
        !matches!(self, MitigationStatus::Completed)
    }
}

impl fmt::Display for MitigationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MitigationStatus::Planned => write!(f, "Planned"),
            MitigationStatus::InProgress => write!(f, "InProgress"),
            MitigationStatus::Completed => write!(f, "Completed"),
            MitigationStatus::Overdue => write!(f, "Overdue"),
        }
    }
}

impl FromStr for MitigationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MitigationStatus::ALL
            .into_iter()
            .find(|status| status.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown mitigation status '{}'", s))
    }
}

/// Severity band derived from a numeric risk score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    /// No assessment yet
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 5] = [
        RiskLevel::None,
        RiskLevel::Low,
        RiskLevel::Medium,
        RiskLevel::High,
        RiskLevel::Critical,
    ];

    /// Band a score from the 0..=50 range
    pub fn from_score(score: u32) -> Self {
        match score {
            0 => RiskLevel::None,
            1..=9 => RiskLevel::Low,
            10..=19 => RiskLevel::Medium,
            20..=34 => RiskLevel::High,
            _ => RiskLevel::Critical,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::None => write!(f, "None"),
            RiskLevel::Low => write!(f, "Low"),
            RiskLevel::Medium => write!(f, "Medium"),
            RiskLevel::High => write!(f, "High"),
            RiskLevel::Critical => write!(f, "Critical"),
        }
    }
}

/// User roles for access control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UserRole {
    Admin,
    RiskManager,
    DepartmentHead,
    #[default]
    RiskOwner,
    Auditor,
    ReadOnly,
}

impl UserRole {
    /// All roles
    pub const ALL: [UserRole; 6] = [
        UserRole::Admin,
        UserRole::RiskManager,
        UserRole::DepartmentHead,
        UserRole::RiskOwner,
        UserRole::Auditor,
        UserRole::ReadOnly,
    ];

    /// Get default permissions for this role
    pub fn default_permissions(&self) -> Vec<Permission> {
        match self {
            UserRole::Admin => vec![
                Permission::Read,
                Permission::Create,
                Permission::Update,
                Permission::Delete,
                Permission::Admin,
            ],
            UserRole::RiskManager => vec![
                Permission::Read,
                Permission::Create,
                Permission::Update,
                Permission::Delete,
            ],
            UserRole::DepartmentHead => {
                vec![Permission::Read, Permission::Create, Permission::Update]
            }
            UserRole::RiskOwner => vec![Permission::Read, Permission::Update],
            UserRole::Auditor => vec![Permission::Read],
            UserRole::ReadOnly => Vec::new(),
        }
    }

    /// Check whether this role grants a permission
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.default_permissions()
            .iter()
            .any(|granted| granted.implies(&permission))
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Admin => write!(f, "Admin"),
            UserRole::RiskManager => write!(f, "RiskManager"),
            UserRole::DepartmentHead => write!(f, "DepartmentHead"),
            UserRole::RiskOwner => write!(f, "RiskOwner"),
            UserRole::Auditor => write!(f, "Auditor"),
            UserRole::ReadOnly => write!(f, "ReadOnly"),
        }
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UserRole::ALL
            .into_iter()
            .find(|role| role.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown user role '{}'", s))
    }
}

/// Permissions for access control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Permission {
    /// View risks, assessments and mitigation actions
    Read,
    /// Register risks and change their lifecycle status
    Create,
    /// Edit risks, record assessments and mitigation actions
    Update,
    /// Remove records
    Delete,
    Admin,
}

impl Permission {
    /// Check if this permission implies another
    pub fn implies(&self, other: &Permission) -> bool {
        match (self, other) {
            (Permission::Admin, _) => true,
            _ => self == other,
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Permission::Read => write!(f, "read"),
            Permission::Create => write!(f, "create"),
            Permission::Update => write!(f, "update"),
            Permission::Delete => write!(f, "delete"),
            Permission::Admin => write!(f, "admin"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_parse_and_display() {
        let id: RiskId = " 42 ".parse().unwrap();
        assert_eq!(id, RiskId::new(42));
        assert_eq!(id.to_string(), "42");
        assert!("abc".parse::<RiskId>().is_err());
    }

    #[test]
    fn test_id_ordering_follows_creation_order() {
        assert!(AssessmentId::new(7) > AssessmentId::new(3));
    }

    #[test]
    fn test_status_parse_is_case_insensitive() {
        assert_eq!("closed".parse::<RiskStatus>().unwrap(), RiskStatus::Closed);
        assert_eq!(
            "inprogress".parse::<MitigationStatus>().unwrap(),
            MitigationStatus::InProgress
        );
        assert!("archived".parse::<RiskStatus>().is_err());
    }

    #[test]
    fn test_risk_level_bands() {
        assert_eq!(RiskLevel::from_score(0), RiskLevel::None);
        assert_eq!(RiskLevel::from_score(1), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(9), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(12), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(20), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(50), RiskLevel::Critical);
    }

    #[test]
    fn test_role_permissions() {
        assert!(UserRole::Admin.has_permission(Permission::Delete));
        assert!(UserRole::RiskManager.has_permission(Permission::Delete));
        assert!(!UserRole::DepartmentHead.has_permission(Permission::Delete));
        assert!(UserRole::RiskOwner.has_permission(Permission::Update));
        assert!(!UserRole::RiskOwner.has_permission(Permission::Create));
        assert!(UserRole::Auditor.has_permission(Permission::Read));
        assert!(!UserRole::ReadOnly.has_permission(Permission::Read));
    }
}
