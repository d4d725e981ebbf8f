//! Two-phase delete: the first delete revokes a resource, the second purges it.

use super::{AccessClient, ApiError, DeleteSupport, Mutation, ResourceRef};
use strum::{Display, EnumString};
use tracing::{debug, error};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteMode {
    /// One lifecycle step per call.
    Soft,
    /// Revoke and purge within one call.
    Hard,
}

impl DeleteMode {
    pub fn from_soft(soft: bool) -> Self {
        if soft {
            DeleteMode::Soft
        } else {
            DeleteMode::Hard
        }
    }
}

/// Result of one client-level delete. Resource state is tracked by the server, so
/// `Revoked` only means one lifecycle step succeeded. It may have been the purge of
/// an already revoked resource, hence the neutral display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum DeleteOutcome {
    Failed,
    #[strum(to_string = "deleted")]
    Revoked,
    Purged,
}

impl DeleteOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, DeleteOutcome::Failed)
    }
}

impl AccessClient {
    /// Deletes `resource` and reports the outcome, logging any failure.
    pub async fn delete(&mut self, resource: &ResourceRef, mode: DeleteMode, auth: bool) -> DeleteOutcome {
        match self.try_delete(resource, mode, auth).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Failed to delete {}: {}", resource.path, e);
                DeleteOutcome::Failed
            }
        }
    }

    /// Like [`AccessClient::delete`], but returns the underlying error.
    pub async fn try_delete(
        &mut self,
        resource: &ResourceRef,
        mode: DeleteMode,
        auth: bool,
    ) -> Result<DeleteOutcome, ApiError> {
        match resource.delete {
            DeleteSupport::Unsupported => Err(ApiError::Unsupported(format!(
                "{} does not support delete",
                resource.path
            ))),
            DeleteSupport::Immediate => {
                self.delete_once(resource, auth).await?;
                Ok(DeleteOutcome::Purged)
            }
            DeleteSupport::Lifecycle => {
                self.delete_once(resource, auth).await?;
                match mode {
                    DeleteMode::Soft => Ok(DeleteOutcome::Revoked),
                    DeleteMode::Hard => {
                        // exactly one extra phase, even if the resource was already revoked
                        debug!("Purging {}", resource.path);
                        self.delete_once(resource, auth).await?;
                        Ok(DeleteOutcome::Purged)
                    }
                }
            }
        }
    }

    async fn delete_once(&mut self, resource: &ResourceRef, auth: bool) -> Result<(), ApiError> {
        let headers = self.headers(auth, None).await?;
        self.mutate_with_precondition(resource, Mutation::Delete, headers)
            .await?;
        Ok(())
    }
}
