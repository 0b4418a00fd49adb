//! Capability-token authentication.
//!
//! Every worker and manager request carries the instance secret. The gate
//! answers the same way for a wrong token, an unknown suffix and an
//! unreadable record, so a caller learns nothing about which instances exist.

use std::sync::Arc;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::{debug, warn};

use nocron_protocols::{InstanceStore, StoreError, TaskDefinition, is_valid_suffix};

use crate::error::AuthError;

type HmacSha256 = Hmac<Sha256>;

/// Fixed key both sides are digested under before comparison.
const COMPARE_KEY: &[u8] = b"nocron-token-compare";

/// A task definition whose secret matched the presented token.
///
/// Only [`AuthGate`] can build one, so holding it is proof of authentication.
#[derive(Debug, Clone)]
pub struct AuthorizedInstance(TaskDefinition);

impl AuthorizedInstance {
    pub fn task(&self) -> &TaskDefinition {
        &self.0
    }

    pub fn suffix(&self) -> &str {
        &self.0.suffix
    }

    pub fn into_task(self) -> TaskDefinition {
        self.0
    }
}

/// Looks up an instance and checks its token.
#[derive(Clone)]
pub struct AuthGate {
    store: Arc<dyn InstanceStore>,
}

impl AuthGate {
    pub fn new(store: Arc<dyn InstanceStore>) -> Self {
        Self { store }
    }

    /// Authorize `token` against the instance `suffix`.
    pub async fn authorize(
        &self,
        suffix: &str,
        token: Option<&str>,
    ) -> Result<AuthorizedInstance, AuthError> {
        let token = token.ok_or(AuthError::Unauthorized)?;
        if !is_valid_suffix(suffix) {
            return Err(AuthError::Unauthorized);
        }

        let task = match self.store.load_task(suffix).await {
            Ok(Some(task)) => task,
            Ok(None) => {
                debug!(suffix, "Rejecting request for unknown instance");
                return Err(AuthError::Unauthorized);
            }
            Err(StoreError::Corrupt { reason, .. }) => {
                warn!(suffix, %reason, "Rejecting request for unreadable task record");
                return Err(AuthError::Unauthorized);
            }
            Err(e) => {
                warn!(suffix, error = %e, "Task lookup failed during authorization");
                return Err(AuthError::Unauthorized);
            }
        };

        if tokens_match(&task.secret, token) {
            Ok(AuthorizedInstance(task))
        } else {
            Err(AuthError::Unauthorized)
        }
    }

    /// Boolean form of [`authorize`](Self::authorize).
    pub async fn authenticate(&self, suffix: &str, token: Option<&str>) -> bool {
        self.authorize(suffix, token).await.is_ok()
    }
}

/// Constant-time token comparison.
///
/// Both values are digested first, so the comparison time depends on neither
/// the length nor the content of the stored secret.
pub fn tokens_match(stored: &str, presented: &str) -> bool {
    if stored.is_empty() {
        return false;
    }

    let Ok(mut expected) = HmacSha256::new_from_slice(COMPARE_KEY) else {
        return false;
    };
    expected.update(stored.as_bytes());
    let expected = expected.finalize().into_bytes();

    let Ok(mut candidate) = HmacSha256::new_from_slice(COMPARE_KEY) else {
        return false;
    };
    candidate.update(presented.as_bytes());
    candidate.verify_slice(&expected).is_ok()
}
