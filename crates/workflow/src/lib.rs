//! Opposition prediction workflow.
//!
//! Drives the three dependent remote stages for one form:
//!
//! 1. mark similarity
//! 2. batched goods/services similarity, reconciled against the local pairs
//! 3. case prediction
//!
//! Each stage's output feeds the next. The first failure ends the run. State
//! lives behind a mutex that is only taken between awaits, and every write is
//! tagged with the run id so late answers from a cleared or resubmitted run
//! are dropped.

pub mod error;
pub mod state;

pub use error::{ErrorCategory, WorkflowError};
pub use state::{RunFailure, RunId, Stage, WorkflowState};

use opposition_backend::OppositionBackend;
use opposition_model::{CasePredictionRequest, CasePredictionResult};
use opposition_pairing::compare_goods;
use opposition_request::{FormState, OppositionInput};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Runs predictions for one form against a backend.
pub struct Orchestrator<B> {
    backend: B,
    state: Mutex<WorkflowState>,
}

impl<B: OppositionBackend> Orchestrator<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: Mutex::new(WorkflowState::default()),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> WorkflowState {
        self.lock().clone()
    }

    /// Discard all outputs and go back to `Idle`, even mid-run.
    pub fn clear(&self) {
        let run = self.lock().reset();
        tracing::info!(run, "Workflow cleared");
    }

    /// Validate the form and, if it passes, run all three stages.
    ///
    /// An invalid form leaves the current state as it is and makes no
    /// remote call.
    pub async fn submit(&self, form: &FormState) -> Result<CasePredictionResult, WorkflowError> {
        let input = form.build().inspect_err(|e| {
            tracing::info!(error = %e, "Form rejected");
        })?;
        self.run(&input).await
    }

    /// Run all three stages for already-validated input.
    pub async fn run(&self, input: &OppositionInput) -> Result<CasePredictionResult, WorkflowError> {
        let run = self.lock().begin();
        tracing::info!(
            run,
            backend = self.backend.name(),
            applicant = %input.applicant.wordmark,
            opponent = %input.opponent.wordmark,
            "Starting opposition prediction"
        );

        // Stage 1: mark similarity
        let mark_similarity = match self
            .backend
            .mark_similarity(&input.mark_similarity_request())
            .await
        {
            Ok(output) => output,
            Err(e) => return Err(self.fail(run, e.into())),
        };
        self.commit(run, |s| s.record_mark_similarity(run, mark_similarity.clone()))?;
        tracing::info!(run, overall = %mark_similarity.overall, "Mark similarity assessed");

        // Stage 2: goods/services, one batch call
        let likelihoods = match compare_goods(
            &self.backend,
            &input.applicant_goods,
            &input.opponent_goods,
            &mark_similarity,
        )
        .await
        {
            Ok(likelihoods) => likelihoods,
            Err(e) => return Err(self.fail(run, e.into())),
        };
        self.commit(run, |s| s.record_likelihoods(run, likelihoods.clone()))?;
        tracing::info!(run, pairs = likelihoods.len(), "Goods/services compared");

        // Stage 3: case prediction
        let request = CasePredictionRequest {
            mark_similarity,
            goods_services_likelihoods: likelihoods,
        };
        let mut result = match self.backend.case_prediction(&request).await {
            Ok(result) => result,
            Err(e) => return Err(self.fail(run, e.into())),
        };
        // The reconciled list is authoritative over whatever the service echoes.
        result.goods_services_likelihoods = request.goods_services_likelihoods;

        self.commit(run, |s| s.record_result(run, result.clone()))?;
        tracing::info!(
            run,
            outcome = %result.opposition_outcome.result,
            confidence = result.opposition_outcome.confidence,
            "Opposition prediction complete"
        );

        Ok(result)
    }

    fn lock(&self) -> MutexGuard<'_, WorkflowState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply a stage transition, or report the run as superseded.
    fn commit(
        &self,
        run: RunId,
        apply: impl FnOnce(&mut WorkflowState) -> bool,
    ) -> Result<(), WorkflowError> {
        if apply(&mut self.lock()) {
            Ok(())
        } else {
            tracing::warn!(run, "Discarding response for superseded run");
            Err(WorkflowError::Superseded { run_id: run })
        }
    }

    /// Record a stage failure. A superseded run leaves the state alone.
    fn fail(&self, run: RunId, error: WorkflowError) -> WorkflowError {
        let recorded = self.lock().record_failure(run, RunFailure::from(&error));
        if recorded {
            tracing::error!(run, category = ?error.category(), error = %error, "Run failed");
            error
        } else {
            tracing::warn!(run, error = %error, "Ignoring failure from superseded run");
            WorkflowError::Superseded { run_id: run }
        }
    }
}
