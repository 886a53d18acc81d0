//! Store roles and the static role → permission matrix.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Role of a merchant account within a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreRole {
    /// Store owner. Full access, including user management.
    #[serde(alias = "owner")]
    Admin,
    /// Day-to-day operations: menu, orders, analytics.
    Staff,
    /// Read-only analytics access.
    Viewer,
}

impl StoreRole {
    /// All known roles.
    pub const ALL: [Self; 3] = [Self::Admin, Self::Staff, Self::Viewer];

    /// Database / wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Staff => "staff",
            Self::Viewer => "viewer",
        }
    }
}

impl fmt::Display for StoreRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StoreRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" | "owner" => Ok(Self::Admin),
            "staff" => Ok(Self::Staff),
            "viewer" => Ok(Self::Viewer),
            _ => Err(format!("invalid store role: {s}")),
        }
    }
}

/// A single gated dashboard capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ManageUsers,
    ManageMenu,
    ManageOrders,
    ViewAnalytics,
    ManageSettings,
    ManagePayments,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ManageUsers => "manage users",
            Self::ManageMenu => "manage menu",
            Self::ManageOrders => "manage orders",
            Self::ViewAnalytics => "view analytics",
            Self::ManageSettings => "manage settings",
            Self::ManagePayments => "manage payments",
        };
        f.write_str(name)
    }
}

/// The fixed capability set of a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct Permissions {
    pub can_manage_users: bool,
    pub can_manage_menu: bool,
    pub can_manage_orders: bool,
    pub can_view_analytics: bool,
    pub can_manage_settings: bool,
    pub can_manage_payments: bool,
}

impl Permissions {
    /// The most restrictive set: every capability denied.
    pub const NONE: Self = Self {
        can_manage_users: false,
        can_manage_menu: false,
        can_manage_orders: false,
        can_view_analytics: false,
        can_manage_settings: false,
        can_manage_payments: false,
    };

    const ADMIN: Self = Self {
        can_manage_users: true,
        can_manage_menu: true,
        can_manage_orders: true,
        can_view_analytics: true,
        can_manage_settings: true,
        can_manage_payments: true,
    };

    const STAFF: Self = Self {
        can_manage_users: false,
        can_manage_menu: true,
        can_manage_orders: true,
        can_view_analytics: true,
        can_manage_settings: false,
        can_manage_payments: false,
    };

    const VIEWER: Self = Self {
        can_view_analytics: true,
        ..Self::NONE
    };

    /// Permissions for an optional role. A missing role gets [`Self::NONE`].
    #[must_use]
    pub const fn for_role(role: Option<StoreRole>) -> Self {
        match role {
            Some(StoreRole::Admin) => Self::ADMIN,
            Some(StoreRole::Staff) => Self::STAFF,
            Some(StoreRole::Viewer) => Self::VIEWER,
            None => Self::NONE,
        }
    }

    /// Whether the capability is granted.
    #[must_use]
    pub const fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::ManageUsers => self.can_manage_users,
            Capability::ManageMenu => self.can_manage_menu,
            Capability::ManageOrders => self.can_manage_orders,
            Capability::ViewAnalytics => self.can_view_analytics,
            Capability::ManageSettings => self.can_manage_settings,
            Capability::ManagePayments => self.can_manage_payments,
        }
    }
}

/// Look up permissions by raw role name.
///
/// Total over all strings: anything that is not a known role name maps to
/// [`Permissions::NONE`].
#[must_use]
pub fn permissions_for(role: &str) -> Permissions {
    Permissions::for_role(role.parse().ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_roles_have_no_permissions() {
        for role in ["", "Admin", "ADMIN", "superuser", "staff ", "guest", "null"] {
            assert_eq!(permissions_for(role), Permissions::NONE, "role {role:?}");
        }
        assert_eq!(Permissions::for_role(None), Permissions::NONE);
        assert_eq!(Permissions::default(), Permissions::NONE);
    }

    #[test]
    fn test_admin_has_everything() {
        let perms = permissions_for("admin");
        assert!(perms.can_manage_users);
        assert!(perms.can_manage_menu);
        assert!(perms.can_manage_orders);
        assert!(perms.can_view_analytics);
        assert!(perms.can_manage_settings);
        assert!(perms.can_manage_payments);
        assert_eq!(permissions_for("owner"), perms);
    }

    #[test]
    fn test_staff_matrix() {
        let perms = permissions_for("staff");
        assert!(!perms.can_manage_users);
        assert!(perms.can_manage_menu);
        assert!(perms.can_manage_orders);
        assert!(perms.can_view_analytics);
        assert!(!perms.can_manage_settings);
        assert!(!perms.can_manage_payments);
    }

    #[test]
    fn test_viewer_matrix() {
        let perms = permissions_for("viewer");
        assert_eq!(
            perms,
            Permissions {
                can_view_analytics: true,
                ..Permissions::NONE
            }
        );
    }

    #[test]
    fn test_allows_matches_fields() {
        let staff = Permissions::for_role(Some(StoreRole::Staff));
        assert!(staff.allows(Capability::ManageMenu));
        assert!(!staff.allows(Capability::ManageUsers));
        assert!(!Permissions::NONE.allows(Capability::ViewAnalytics));
    }

    #[test]
    fn test_role_serde_accepts_owner_alias() {
        let role: StoreRole = serde_json::from_str("\"owner\"").unwrap();
        assert_eq!(role, StoreRole::Admin);
        assert_eq!(serde_json::to_string(&StoreRole::Staff).unwrap(), "\"staff\"");
    }
}
