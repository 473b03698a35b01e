//! Admin credential check.

use bcrypt::BcryptError;
use tracing::{info, warn};

use super::{ResourceError, ResourceRouter};
use crate::store::ADMIN_TABLE;

/// Work factor for stored credentials.
pub const HASH_COST: u32 = 10;

/// Salted bcrypt hash of a password, the form stored in the `admin` table.
pub fn hash_password(password: &str) -> Result<String, BcryptError> {
    bcrypt::hash(password, HASH_COST)
}

impl ResourceRouter {
    /// Check a username and password against the stored credential.
    pub fn login(&self, username: &str, password: &str) -> Result<(), ResourceError> {
        let Some(admin) = self.store().find_by(ADMIN_TABLE, "username", username)? else {
            warn!(%username, "login for unknown user");
            return Err(ResourceError::Unauthorized);
        };

        let stored = admin.text("password").unwrap_or_default();
        match bcrypt::verify(password, stored) {
            Ok(true) => {}
            Ok(false) => {
                warn!(%username, "login with wrong password");
                return Err(ResourceError::Unauthorized);
            }
            Err(e) => {
                warn!(%username, error = %e, "stored credential is not a bcrypt hash");
                return Err(ResourceError::Unauthorized);
            }
        }

        info!(%username, "login");
        Ok(())
    }
}
