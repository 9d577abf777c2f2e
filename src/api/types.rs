//! Shared types for the API layer.

use std::sync::Arc;

use crate::api::error::ApiError;
use crate::models::enums::Role;
use crate::state::AppState;

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub state: Arc<AppState>,
}

impl ApiContext {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }
}

/// Authenticated session context, injected into request extensions by
/// the session middleware after token validation.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub token: String,
    pub username: String,
    pub role: Role,
}

impl SessionContext {
    /// Gate a page on an explicit role list, the way every legacy page
    /// opened with a role check.
    pub fn require_role(&self, allowed: &[Role]) -> Result<(), ApiError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(ApiError::Forbidden(
                "Access restricted to authorized professionals".into(),
            ))
        }
    }

    /// Gate on any clinical role (everything except clerks).
    pub fn require_clinical(&self) -> Result<(), ApiError> {
        if self.role.is_clinical() {
            Ok(())
        } else {
            Err(ApiError::Forbidden(
                "Access restricted to clinical staff".into(),
            ))
        }
    }

    /// Gate on the admin role.
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Access restricted to administrators".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(role: Role) -> SessionContext {
        SessionContext {
            token: "t".into(),
            username: "klessard".into(),
            role,
        }
    }

    #[test]
    fn role_list_gating() {
        let midwife = session(Role::Midwife);
        assert!(midwife.require_role(&[Role::Admin, Role::Midwife]).is_ok());
        assert!(midwife.require_role(&[Role::Admin]).is_err());
    }

    #[test]
    fn clinical_gating_excludes_clerks() {
        assert!(session(Role::Nurse).require_clinical().is_ok());
        assert!(session(Role::Clerk).require_clinical().is_err());
    }

    #[test]
    fn admin_gating() {
        assert!(session(Role::Admin).require_admin().is_ok());
        assert!(session(Role::Midwife).require_admin().is_err());
    }
}
