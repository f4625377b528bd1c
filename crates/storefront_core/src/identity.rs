//! crates/storefront_core/src/identity.rs
//!
//! Maps an identity handed over by the external provider to a local user.

use tracing::info;

use crate::domain::{ExternalIdentity, User};
use crate::error::{ServiceError, ServiceResult};
use crate::ports::DatabaseService;
use crate::validation;

/// Returns the local user for `identity`, creating it as a student on first sight.
///
/// An existing record is returned untouched: neither the role nor the profile is
/// rewritten. The flag is `true` when this call created the record.
pub async fn resolve(
    db: &dyn DatabaseService,
    identity: ExternalIdentity,
) -> ServiceResult<(User, bool)> {
    let identity = ExternalIdentity {
        subject: validation::required("subject", &identity.subject)?,
        name: validation::required("name", &identity.name)?,
        email: validation::email("email", &identity.email)?,
        avatar_url: validation::optional(identity.avatar_url),
    };

    let (user, created) = db.get_or_create_user(&identity).await.map_err(|e| {
        ServiceError::StoreUnavailable(e.to_string())
    })?;

    if created {
        info!(subject = %user.subject, user_id = %user.id, "Registered new user");
    }
    Ok((user, created))
}
