use crate::domain::access::models::Permission;
use crate::domain::principal::models::AccountId;
use crate::domain::principal::models::AdminIdentity;
use crate::domain::principal::models::AdminRole;
use crate::domain::principal::models::Principal;
use crate::domain::principal::models::UserIdentity;

/// Minimum level for any admin route.
pub const ADMIN_PANEL_LEVEL: u8 = 1;

/// Authorization requirement declared by a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessRule {
    /// Caller is an admin whose role is in the set.
    AdminRoleIn(Vec<AdminRole>),
    /// Caller is an admin at or above the level.
    MinimumLevel(u8),
    /// Caller is an admin whose level covers the permission.
    Permission(Permission),
    /// Caller is an admin allowed into the admin panel at all.
    AdminPanel,
}

/// Why a request was turned away.
///
/// The first two variants are authentication failures (401); the rest
/// are authorization failures (403).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDenied {
    UserRequired,
    AdminRequired,
    RoleNotAllowed,
    InsufficientLevel {
        current_role: String,
        current_level: u8,
        required_level: u8,
    },
    MissingPermission {
        permission: Permission,
        current_level: u8,
    },
    PanelAccess,
    NotOwner,
}

impl AccessDenied {
    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, AccessDenied::UserRequired | AccessDenied::AdminRequired)
    }

    pub fn message(&self) -> &'static str {
        match self {
            AccessDenied::UserRequired => "Authentication required",
            AccessDenied::AdminRequired => "Admin authentication required",
            AccessDenied::RoleNotAllowed => "Insufficient admin permissions",
            AccessDenied::InsufficientLevel { .. } => "Insufficient admin role level",
            AccessDenied::MissingPermission { .. } => "Insufficient permissions",
            AccessDenied::PanelAccess => "Insufficient role level for admin panel access",
            AccessDenied::NotOwner => "Access denied: You can only access your own data",
        }
    }
}

impl AccessRule {
    pub fn admin_roles(roles: &[AdminRole]) -> Self {
        AccessRule::AdminRoleIn(roles.to_vec())
    }

    /// Check the principal attached to a request against this rule.
    ///
    /// `None` means no principal of the kind the rule wants was attached.
    pub fn evaluate(&self, principal: Option<&Principal>) -> Result<(), AccessDenied> {
        match self {
            AccessRule::AdminRoleIn(roles) => {
                let admin = require_admin(principal)?;
                if roles.contains(&admin.role) {
                    Ok(())
                } else {
                    Err(AccessDenied::RoleNotAllowed)
                }
            }
            AccessRule::MinimumLevel(required_level) => {
                let admin = require_admin(principal)?;
                let current_level = admin.role.level();
                if current_level >= *required_level {
                    Ok(())
                } else {
                    Err(AccessDenied::InsufficientLevel {
                        current_role: admin.role.as_str().to_string(),
                        current_level,
                        required_level: *required_level,
                    })
                }
            }
            AccessRule::Permission(permission) => {
                let admin = require_admin(principal)?;
                let current_level = admin.role.level();
                if current_level >= permission.required_level() {
                    Ok(())
                } else {
                    Err(AccessDenied::MissingPermission {
                        permission: *permission,
                        current_level,
                    })
                }
            }
            AccessRule::AdminPanel => {
                let admin = require_admin(principal)?;
                if admin.role.level() >= ADMIN_PANEL_LEVEL {
                    Ok(())
                } else {
                    Err(AccessDenied::PanelAccess)
                }
            }
        }
    }
}

/// A user may only reach records that carry their own id.
pub fn check_ownership(principal: Option<&Principal>, owner: &AccountId) -> Result<(), AccessDenied> {
    let user = require_user(principal)?;
    if &user.id == owner {
        Ok(())
    } else {
        Err(AccessDenied::NotOwner)
    }
}

fn require_user(principal: Option<&Principal>) -> Result<&UserIdentity, AccessDenied> {
    match principal {
        Some(Principal::User(user)) => Ok(user),
        _ => Err(AccessDenied::UserRequired),
    }
}

fn require_admin(principal: Option<&Principal>) -> Result<&AdminIdentity, AccessDenied> {
    match principal {
        Some(Principal::Admin(admin)) => Ok(admin),
        _ => Err(AccessDenied::AdminRequired),
    }
}
