//! crates/storefront_core/src/users.rs
//!
//! Admin management of other users' accounts. An admin can never change their
//! own role or delete their own account through these operations.

use tracing::info;
use uuid::Uuid;

use crate::authz;
use crate::domain::{ExternalIdentity, Role, User};
use crate::identity;
use crate::error::{ServiceError, ServiceResult};
use crate::ports::DatabaseService;
use crate::validation;

/// Ensures `identity` exists and holds the admin role.
///
/// This bypasses the gate and is only meant for operator-driven startup, to seed
/// the first admin of an empty store.
pub async fn bootstrap_admin(
    db: &dyn DatabaseService,
    identity: ExternalIdentity,
) -> ServiceResult<User> {
    let (user, _) = identity::resolve(db, identity).await?;
    if user.is_admin() {
        return Ok(user);
    }
    let user = db.update_user_role(&user.subject, Role::Admin).await?;
    info!(subject = %user.subject, "Bootstrapped admin account");
    Ok(user)
}

pub async fn list(db: &dyn DatabaseService, caller: Option<&str>) -> ServiceResult<Vec<User>> {
    authz::require_admin(db, caller).await?;
    Ok(db.list_users().await?)
}

/// Changes `target_subject`'s role.
pub async fn set_role(
    db: &dyn DatabaseService,
    caller: Option<&str>,
    target_subject: &str,
    role: Role,
) -> ServiceResult<User> {
    let admin = authz::require_admin(db, caller).await?;
    let target_subject = validation::required("subject", target_subject)?;
    if target_subject == admin.subject {
        return Err(ServiceError::Forbidden);
    }

    let user = db.update_user_role(&target_subject, role).await?;
    info!(admin = %admin.subject, target = %user.subject, role = %role, "User role changed");
    Ok(user)
}

/// Deletes the user with record id `target_id`. Deleting twice reports `NotFound`.
pub async fn delete(
    db: &dyn DatabaseService,
    caller: Option<&str>,
    target_id: Uuid,
) -> ServiceResult<()> {
    let admin = authz::require_admin(db, caller).await?;
    if target_id == admin.id {
        return Err(ServiceError::Forbidden);
    }

    db.delete_user(target_id).await?;
    info!(admin = %admin.subject, user_id = %target_id, "User deleted");
    Ok(())
}
