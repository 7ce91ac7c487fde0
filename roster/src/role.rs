use serde::{Deserialize, Serialize};
use snafu::Snafu;

/// Built-in organization roles, ordered from least to most privileged.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Serialize, Deserialize)]
pub enum Role {
    Viewer,
    Editor,
    Admin,
}

#[derive(Debug, Snafu)]
#[snafu(display("Invalid role: {role}"))]
pub struct InvalidRoleError {
    role: String,
}

impl TryFrom<&str> for Role {
    type Error = InvalidRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "Viewer" => Ok(Role::Viewer),
            "Editor" => Ok(Role::Editor),
            "Admin" => Ok(Role::Admin),
            _ => Err(InvalidRoleError {
                role: value.to_string(),
            }),
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Role::Viewer => write!(f, "Viewer"),
            Role::Editor => write!(f, "Editor"),
            Role::Admin => write!(f, "Admin"),
        }
    }
}

/// Access-control actions that can be performed on org users.
#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy, Serialize, Deserialize)]
pub enum Permission {
    OrgUsersRead,
    OrgUsersAdd,
    OrgUsersWrite,
    OrgUsersRemove,
}

impl TryFrom<&str> for Permission {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "org.users:read" => Ok(Permission::OrgUsersRead),
            "org.users:add" => Ok(Permission::OrgUsersAdd),
            "org.users:write" => Ok(Permission::OrgUsersWrite),
            "org.users:remove" => Ok(Permission::OrgUsersRemove),
            _ => Err(format!("Invalid permission: {value}")),
        }
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Permission::OrgUsersRead => write!(f, "org.users:read"),
            Permission::OrgUsersAdd => write!(f, "org.users:add"),
            Permission::OrgUsersWrite => write!(f, "org.users:write"),
            Permission::OrgUsersRemove => write!(f, "org.users:remove"),
        }
    }
}

/// Role to permissions mapping
pub fn role_permissions(role: Role) -> Vec<Permission> {
    match role {
        Role::Admin => vec![
            Permission::OrgUsersRead,
            Permission::OrgUsersAdd,
            Permission::OrgUsersWrite,
            Permission::OrgUsersRemove,
        ],
        Role::Editor => vec![Permission::OrgUsersRead],
        Role::Viewer => vec![Permission::OrgUsersRead],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_str_valid() {
        assert_eq!(Role::try_from("Viewer").unwrap(), Role::Viewer);
        assert_eq!(Role::try_from("Editor").unwrap(), Role::Editor);
        assert_eq!(Role::try_from("Admin").unwrap(), Role::Admin);
    }

    #[test]
    fn test_role_from_str_invalid() {
        let role = Role::try_from("Overlord");
        assert!(role.is_err());
        if let Err(e) = role {
            assert_eq!(e.to_string(), "Invalid role: Overlord");
        }
    }

    #[test]
    fn test_role_round_trip() {
        for role in [Role::Viewer, Role::Editor, Role::Admin] {
            assert_eq!(Role::try_from(role.to_string().as_str()).unwrap(), role);
        }
    }

    #[test]
    fn test_permission_round_trip() {
        for permission in [
            Permission::OrgUsersRead,
            Permission::OrgUsersAdd,
            Permission::OrgUsersWrite,
            Permission::OrgUsersRemove,
        ] {
            assert_eq!(
                Permission::try_from(permission.to_string().as_str()).unwrap(),
                permission
            );
        }
    }

    #[test]
    fn test_admin_has_all_org_user_permissions() {
        let permissions = role_permissions(Role::Admin);
        assert_eq!(permissions.len(), 4);
        assert!(permissions.contains(&Permission::OrgUsersRemove));
    }

    #[test]
    fn test_viewer_is_read_only() {
        let permissions = role_permissions(Role::Viewer);
        assert_eq!(permissions, vec![Permission::OrgUsersRead]);
    }
}
