//! Run state for one opposition form.
//!
//! Transitions are plain synchronous methods. Each one takes the id of the
//! run that produced the value and returns `false` without touching anything
//! when that run is no longer current or the stage does not match.

use crate::error::{ErrorCategory, WorkflowError};
use opposition_model::{CasePredictionResult, GoodServiceLikelihoodOutput, MarkSimilarityOutput};
use serde::Serialize;

/// Monotonic identifier of one orchestration run.
pub type RunId = u64;

/// Number of remote stages in a run.
pub const STAGE_COUNT: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Idle,
    MarkSimilarity,
    GoodsServicesSimilarity,
    CasePrediction,
    Done,
    Error,
}

impl Stage {
    pub fn is_in_progress(&self) -> bool {
        matches!(
            self,
            Self::MarkSimilarity | Self::GoodsServicesSimilarity | Self::CasePrediction
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::MarkSimilarity => "mark_similarity",
            Self::GoodsServicesSimilarity => "goods_services_similarity",
            Self::CasePrediction => "case_prediction",
            Self::Done => "done",
            Self::Error => "error",
        }
    }
}

/// The failure captured when a run enters `Stage::Error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunFailure {
    pub category: ErrorCategory,
    pub message: String,
}

impl From<&WorkflowError> for RunFailure {
    fn from(e: &WorkflowError) -> Self {
        Self {
            category: e.category(),
            message: e.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorkflowState {
    run_id: RunId,
    stage: Stage,
    progress: u8,
    mark_similarity: Option<MarkSimilarityOutput>,
    goods_services_likelihoods: Option<Vec<GoodServiceLikelihoodOutput>>,
    result: Option<CasePredictionResult>,
    failure: Option<RunFailure>,
}

impl WorkflowState {
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Completed stages, 0 to 3.
    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn percent_complete(&self) -> u8 {
        (u16::from(self.progress) * 100 / u16::from(STAGE_COUNT)) as u8
    }

    pub fn is_running(&self) -> bool {
        self.stage.is_in_progress()
    }

    pub fn mark_similarity(&self) -> Option<&MarkSimilarityOutput> {
        self.mark_similarity.as_ref()
    }

    pub fn goods_services_likelihoods(&self) -> Option<&[GoodServiceLikelihoodOutput]> {
        self.goods_services_likelihoods.as_deref()
    }

    pub fn result(&self) -> Option<&CasePredictionResult> {
        self.result.as_ref()
    }

    pub fn failure(&self) -> Option<&RunFailure> {
        self.failure.as_ref()
    }

    pub fn is_current(&self, run: RunId) -> bool {
        self.run_id == run
    }

    /// Drop every stored output and return to `Idle` under a fresh run id.
    ///
    /// Anything still in flight for the old id is discarded on arrival.
    pub fn reset(&mut self) -> RunId {
        *self = Self {
            run_id: self.run_id + 1,
            ..Self::default()
        };
        self.run_id
    }

    /// Start a new run at the mark similarity stage.
    pub fn begin(&mut self) -> RunId {
        let run = self.reset();
        self.stage = Stage::MarkSimilarity;
        run
    }

    fn accepts(&self, run: RunId, stage: Stage) -> bool {
        self.is_current(run) && self.stage == stage
    }

    pub fn record_mark_similarity(&mut self, run: RunId, output: MarkSimilarityOutput) -> bool {
        if !self.accepts(run, Stage::MarkSimilarity) {
            return false;
        }
        self.mark_similarity = Some(output);
        self.stage = Stage::GoodsServicesSimilarity;
        self.progress = 1;
        true
    }

    pub fn record_likelihoods(
        &mut self,
        run: RunId,
        likelihoods: Vec<GoodServiceLikelihoodOutput>,
    ) -> bool {
        if !self.accepts(run, Stage::GoodsServicesSimilarity) {
            return false;
        }
        self.goods_services_likelihoods = Some(likelihoods);
        self.stage = Stage::CasePrediction;
        self.progress = 2;
        true
    }

    pub fn record_result(&mut self, run: RunId, result: CasePredictionResult) -> bool {
        if !self.accepts(run, Stage::CasePrediction) {
            return false;
        }
        self.result = Some(result);
        self.stage = Stage::Done;
        self.progress = STAGE_COUNT;
        true
    }

    /// Move an in-progress run to `Error`. Earlier stage outputs are kept.
    pub fn record_failure(&mut self, run: RunId, failure: RunFailure) -> bool {
        if !self.is_current(run) || !self.stage.is_in_progress() {
            return false;
        }
        self.failure = Some(failure);
        self.stage = Stage::Error;
        true
    }
}
