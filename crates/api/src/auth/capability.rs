//! Capability-based authorization
//!
//! Every permission check goes through [`authorize`] with an explicit
//! [`Capability`]. Handlers never branch on role strings directly.

use humantic_shared::types::UserRole;

use crate::auth::middleware::AuthUser;
use crate::error::ApiError;

/// Actions a principal may be allowed to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// List, update, and delete platform users
    ManageUsers,
    /// View payment records of any user
    ViewAllPayments,
    /// Initiate checkouts and view one's own billing state
    ManageOwnBilling,
    /// Open client requests
    SubmitRequests,
    /// Update the status of any client request
    ManageRequests,
    /// View platform-wide reports
    ViewReports,
}

/// Whether the principal holds a capability, without treating absence as a
/// violation. Used where behavior merely widens for privileged roles.
pub fn has_capability(user: &AuthUser, capability: Capability) -> bool {
    match user.role {
        UserRole::Admin => true,
        UserRole::Client => matches!(
            capability,
            Capability::ManageOwnBilling | Capability::SubmitRequests
        ),
    }
}

/// Check that the principal holds a capability.
/// Denial never touches the database.
pub fn authorize(user: &AuthUser, capability: Capability) -> Result<(), ApiError> {
    if has_capability(user, capability) {
        Ok(())
    } else {
        tracing::warn!(
            user_id = %user.id,
            capability = ?capability,
            "Authorization denied"
        );
        Err(ApiError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user(role: UserRole) -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            email: "test@example.com".to_string(),
            role,
        }
    }

    #[test]
    fn test_admin_holds_every_capability() {
        let admin = user(UserRole::Admin);
        for capability in [
            Capability::ManageUsers,
            Capability::ViewAllPayments,
            Capability::ManageOwnBilling,
            Capability::SubmitRequests,
            Capability::ManageRequests,
            Capability::ViewReports,
        ] {
            assert!(authorize(&admin, capability).is_ok(), "{:?}", capability);
        }
    }

    #[test]
    fn test_client_capability_matrix() {
        let client = user(UserRole::Client);

        assert!(authorize(&client, Capability::ManageOwnBilling).is_ok());
        assert!(authorize(&client, Capability::SubmitRequests).is_ok());

        for denied in [
            Capability::ManageUsers,
            Capability::ViewAllPayments,
            Capability::ManageRequests,
            Capability::ViewReports,
        ] {
            assert!(
                matches!(authorize(&client, denied), Err(ApiError::Forbidden)),
                "{:?}",
                denied
            );
        }
    }
}
