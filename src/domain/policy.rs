//! Role and ownership checks shared by every use case.

use uuid::Uuid;

use crate::{entities::user::UserRole, errors::AppError};

/// The acting principal of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl Identity {
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Identity { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    Unauthenticated,
    Forbidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn into_result(self) -> Result<(), AppError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(DenyReason::Unauthenticated) => Err(AppError::unauthorized()),
            Decision::Deny(DenyReason::Forbidden) => Err(AppError::forbidden()),
        }
    }
}

/// Decides whether `identity` may act on a resource.
///
/// Admins pass every check. Otherwise a required role must match and, when the
/// resource has an owner, the identity must be that owner.
pub fn authorize(
    identity: Option<&Identity>,
    owner_id: Option<Uuid>,
    required_role: Option<UserRole>,
) -> Decision {
    let Some(identity) = identity else {
        return Decision::Deny(DenyReason::Unauthenticated);
    };

    if identity.is_admin() {
        return Decision::Allow;
    }

    if let Some(role) = required_role {
        if identity.role != role {
            return Decision::Deny(DenyReason::Forbidden);
        }
    }

    match owner_id {
        Some(owner) if owner != identity.user_id => Decision::Deny(DenyReason::Forbidden),
        _ => Decision::Allow,
    }
}

/// Owner-or-admin check for a resource owned by `owner_id`.
pub fn ensure_owner_or_admin(identity: &Identity, owner_id: Uuid) -> Result<(), AppError> {
    authorize(Some(identity), Some(owner_id), None).into_result()
}

/// True when the caller may see data hidden from the public (owner or admin).
pub fn is_privileged(identity: Option<&Identity>, owner_id: Uuid) -> bool {
    identity.is_some() && authorize(identity, Some(owner_id), None).is_allowed()
}
