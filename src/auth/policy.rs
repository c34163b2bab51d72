//! Single authorization policy consulted by every command.

use std::fmt;

use super::session::{Session, User};
use crate::error::{AppError, Result};

/// Areas of the admin portal a user can be granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Dashboard,
    Attendance,
    EmployeeShift,
    Sales,
    Inventory,
    Expenses,
    Buyers,
    CompanySettings,
    Roles,
    Backup,
}

impl Resource {
    pub const ALL: [Resource; 10] = [
        Resource::Dashboard,
        Resource::Attendance,
        Resource::EmployeeShift,
        Resource::Sales,
        Resource::Inventory,
        Resource::Expenses,
        Resource::Buyers,
        Resource::CompanySettings,
        Resource::Roles,
        Resource::Backup,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Resource::Dashboard => "dashboard",
            Resource::Attendance => "attendance",
            Resource::EmployeeShift => "employee shift",
            Resource::Sales => "sales",
            Resource::Inventory => "inventory",
            Resource::Expenses => "expenses",
            Resource::Buyers => "buyers",
            Resource::CompanySettings => "company settings",
            Resource::Roles => "roles",
            Resource::Backup => "backup",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Known user groups. Group names from the API are matched case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group {
    Admin,
    Manager,
    Staff,
}

impl Group {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "admin" | "administrator" => Some(Group::Admin),
            "manager" => Some(Group::Manager),
            "staff" => Some(Group::Staff),
            _ => None,
        }
    }

    fn allows(self, resource: Resource) -> bool {
        match self {
            Group::Admin => true,
            Group::Manager => !matches!(
                resource,
                Resource::Roles | Resource::Backup | Resource::CompanySettings
            ),
            Group::Staff => matches!(
                resource,
                Resource::Dashboard | Resource::Attendance | Resource::Sales | Resource::Buyers
            ),
        }
    }
}

/// Whether `user` may open `resource`.
pub fn can_access(user: &User, resource: Resource) -> bool {
    if user.is_superuser || resource == Resource::Dashboard {
        return true;
    }

    user.groups
        .iter()
        .filter_map(|g| Group::from_name(g))
        .any(|g| g.allows(resource))
}

/// Fail with [`AppError::Forbidden`] unless the session user may open `resource`.
pub fn require_access(session: &Session, resource: Resource) -> Result<()> {
    if can_access(&session.user, resource) {
        Ok(())
    } else {
        tracing::warn!("User '{}' denied access to {}", session.user.username, resource);
        Err(AppError::Forbidden(resource.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(groups: &[&str], is_superuser: bool) -> User {
        User {
            id: 1,
            username: "tester".to_string(),
            groups: groups.iter().map(|g| g.to_string()).collect(),
            is_superuser,
        }
    }

    #[test]
    fn test_superuser_sees_everything() {
        let u = user(&[], true);
        assert!(Resource::ALL.iter().all(|r| can_access(&u, *r)));
    }

    #[test]
    fn test_admin_group_case_insensitive() {
        let u = user(&["ADMIN"], false);
        assert!(can_access(&u, Resource::Roles));
        assert!(can_access(&u, Resource::Backup));
    }

    #[test]
    fn test_manager_excludes_admin_areas() {
        let u = user(&["Manager"], false);
        assert!(can_access(&u, Resource::EmployeeShift));
        assert!(can_access(&u, Resource::Expenses));
        assert!(!can_access(&u, Resource::Roles));
        assert!(!can_access(&u, Resource::Backup));
        assert!(!can_access(&u, Resource::CompanySettings));
    }

    #[test]
    fn test_staff_limited() {
        let u = user(&["staff"], false);
        assert!(can_access(&u, Resource::Attendance));
        assert!(can_access(&u, Resource::Sales));
        assert!(!can_access(&u, Resource::EmployeeShift));
        assert!(!can_access(&u, Resource::Inventory));
    }

    #[test]
    fn test_unknown_group_only_dashboard() {
        let u = user(&["Drivers"], false);
        assert!(can_access(&u, Resource::Dashboard));
        assert!(!can_access(&u, Resource::Attendance));
    }

    #[test]
    fn test_groups_union() {
        let u = user(&["Staff", "Manager"], false);
        assert!(can_access(&u, Resource::Inventory));
    }

    #[test]
    fn test_require_access() {
        let session = Session::new("tok".to_string(), user(&["staff"], false));
        assert!(require_access(&session, Resource::Attendance).is_ok());
        assert!(matches!(
            require_access(&session, Resource::Backup),
            Err(AppError::Forbidden(r)) if r == "backup"
        ));
    }
}
