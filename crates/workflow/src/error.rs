use crate::state::RunId;
use opposition_backend::{BackendError, BackendErrorCategory};
use opposition_pairing::{PairingError, ReconcileError};
use opposition_request::FormError;
use serde::Serialize;
use thiserror::Error;

/// What kind of failure ended a run, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Configuration,
    Authentication,
    Validation,
    Api,
    Superseded,
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Validation(#[from] FormError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Reconciliation(#[from] ReconcileError),

    #[error("Run {run_id} was superseded by a newer submission")]
    Superseded { run_id: RunId },
}

impl From<PairingError> for WorkflowError {
    fn from(e: PairingError) -> Self {
        match e {
            PairingError::Backend(e) => Self::Backend(e),
            PairingError::Reconcile(e) => Self::Reconciliation(e),
        }
    }
}

impl WorkflowError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(_) => ErrorCategory::Validation,
            Self::Backend(e) => match e.category() {
                BackendErrorCategory::Configuration => ErrorCategory::Configuration,
                BackendErrorCategory::Authentication => ErrorCategory::Authentication,
                BackendErrorCategory::Api => ErrorCategory::Api,
            },
            // Reconciliation failures are reported as API errors.
            Self::Reconciliation(_) => ErrorCategory::Api,
            Self::Superseded { .. } => ErrorCategory::Superseded,
        }
    }
}
