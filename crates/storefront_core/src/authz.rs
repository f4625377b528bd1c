//! crates/storefront_core/src/authz.rs
//!
//! The admin gate. It is evaluated against the store on every call; nothing is
//! cached between requests because a role can change at any time.

use tracing::{debug, warn};

use crate::domain::User;
use crate::error::{ServiceError, ServiceResult};
use crate::ports::{DatabaseService, PortError};

/// Returns the caller's record when it holds the admin role.
///
/// Any store failure is treated as "not an admin".
async fn lookup_admin(db: &dyn DatabaseService, caller: Option<&str>) -> Option<User> {
    let subject = caller.map(str::trim).filter(|s| !s.is_empty())?;

    match db.get_user_by_subject(subject).await {
        Ok(user) if user.is_admin() => Some(user),
        Ok(_) => {
            debug!(subject, "Caller is not an admin");
            None
        }
        Err(PortError::NotFound(_)) => {
            debug!(subject, "Caller is not a known user");
            None
        }
        Err(e) => {
            warn!(subject, error = %e, "Admin lookup failed; denying access");
            None
        }
    }
}

pub async fn is_admin(db: &dyn DatabaseService, caller: Option<&str>) -> bool {
    lookup_admin(db, caller).await.is_some()
}

/// Fails with `Forbidden` unless the caller is an admin.
pub async fn require_admin(db: &dyn DatabaseService, caller: Option<&str>) -> ServiceResult<User> {
    lookup_admin(db, caller).await.ok_or(ServiceError::Forbidden)
}
