//! Well-known role name constants.
//!
//! These must match the `ck_users_role` check constraint in the users
//! migration. Role strings are stored and compared verbatim.

pub const ROLE_ADMIN: &str = "Admin";
pub const ROLE_PROJECT_MANAGER: &str = "ProjectManager";
pub const ROLE_CONTRACTOR: &str = "Contractor";
pub const ROLE_CLIENT: &str = "Client";

/// All valid role names.
pub const VALID_ROLES: &[&str] = &[
    ROLE_ADMIN,
    ROLE_PROJECT_MANAGER,
    ROLE_CONTRACTOR,
    ROLE_CLIENT,
];

/// Roles a user may pick for themselves at self-registration.
pub const SELF_REGISTER_ROLES: &[&str] = &[ROLE_CLIENT, ROLE_CONTRACTOR];

/// Role assigned when registration does not name one.
pub const DEFAULT_ROLE: &str = ROLE_CLIENT;

/// Validate that a role string is one of the known roles.
pub fn validate_role(role: &str) -> Result<(), String> {
    if VALID_ROLES.contains(&role) {
        Ok(())
    } else {
        Err(format!(
            "Invalid role '{role}'. Must be one of: {}",
            VALID_ROLES.join(", ")
        ))
    }
}

/// Staff are administrators and project managers.
pub fn is_staff(role: &str) -> bool {
    role == ROLE_ADMIN || role == ROLE_PROJECT_MANAGER
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_roles_accepted() {
        for role in VALID_ROLES {
            assert!(validate_role(role).is_ok());
        }
    }

    #[test]
    fn role_names_are_case_sensitive() {
        let err = validate_role("admin").unwrap_err();
        assert!(err.contains("Invalid role 'admin'"));
    }

    #[test]
    fn staff_covers_admin_and_manager_only() {
        assert!(is_staff(ROLE_ADMIN));
        assert!(is_staff(ROLE_PROJECT_MANAGER));
        assert!(!is_staff(ROLE_CONTRACTOR));
        assert!(!is_staff(ROLE_CLIENT));
    }

    #[test]
    fn self_registration_excludes_staff_roles() {
        assert!(SELF_REGISTER_ROLES.iter().all(|r| !is_staff(r)));
        assert!(SELF_REGISTER_ROLES.contains(&DEFAULT_ROLE));
    }
}
