//! Goods/services pairing and batch reconciliation.
//!
//! Every applicant good is compared against every opponent good in a single
//! batch call. The service may normalise the terms it echoes back, so the
//! caller's own entries are written back onto each result by position.

use opposition_backend::{BackendError, OppositionBackend};
use opposition_model::{
    BatchGsSimilarityRequest, GoodOrService, GoodServiceLikelihoodOutput, MarkSimilarityOutput,
};
use thiserror::Error;

/// One (applicant good, opponent good) comparison slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoodsPair {
    pub applicant: GoodOrService,
    pub opponent: GoodOrService,
}

#[derive(Debug, Error, PartialEq)]
pub enum ReconcileError {
    #[error("Batch comparison returned {actual} results; expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Comparison #{} reports likely confusion without a confusion type", .index + 1)]
    MissingConfusionType { index: usize },

    #[error("Comparison #{} has similarity score {score} outside 0..=1", .index + 1)]
    ScoreOutOfRange { index: usize, score: f64 },
}

#[derive(Debug, Error)]
pub enum PairingError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}

/// Cross product ordered outer-applicant, inner-opponent: `pairs[i * M + j]`.
pub fn cross_pairs(applicant: &[GoodOrService], opponent: &[GoodOrService]) -> Vec<GoodsPair> {
    applicant
        .iter()
        .flat_map(|a| {
            opponent.iter().map(move |o| GoodsPair {
                applicant: a.clone(),
                opponent: o.clone(),
            })
        })
        .collect()
}

/// Re-attach the local pair entries to the batch results, by index.
///
/// The result count must match the pair count exactly. A stray
/// `confusion_type` on a non-confusing entry is dropped.
pub fn reconcile(
    pairs: &[GoodsPair],
    results: Vec<GoodServiceLikelihoodOutput>,
) -> Result<Vec<GoodServiceLikelihoodOutput>, ReconcileError> {
    if results.len() != pairs.len() {
        return Err(ReconcileError::LengthMismatch {
            expected: pairs.len(),
            actual: results.len(),
        });
    }

    pairs
        .iter()
        .zip(results)
        .enumerate()
        .map(|(index, (pair, mut result))| {
            if !result.score_in_range() {
                return Err(ReconcileError::ScoreOutOfRange {
                    index,
                    score: result.similarity_score,
                });
            }

            if result.likelihood_of_confusion {
                if result.confusion_type.is_none() {
                    return Err(ReconcileError::MissingConfusionType { index });
                }
            } else if result.confusion_type.take().is_some() {
                tracing::debug!(index, "Dropping confusion type on non-confusing pair");
            }

            result.applicant_good = pair.applicant.clone();
            result.opponent_good = pair.opponent.clone();
            Ok(result)
        })
        .collect()
}

/// Compare all goods pairs with one batch call and reconcile the results.
pub async fn compare_goods<B: OppositionBackend>(
    backend: &B,
    applicant_goods: &[GoodOrService],
    opponent_goods: &[GoodOrService],
    mark_similarity: &MarkSimilarityOutput,
) -> Result<Vec<GoodServiceLikelihoodOutput>, PairingError> {
    let pairs = cross_pairs(applicant_goods, opponent_goods);

    let request = BatchGsSimilarityRequest {
        applicant_goods: applicant_goods.to_vec(),
        opponent_goods: opponent_goods.to_vec(),
        mark_similarity: mark_similarity.clone(),
    };

    tracing::debug!(
        backend = backend.name(),
        pairs = pairs.len(),
        "Requesting batch goods/services comparison"
    );
    let results = backend.batch_gs_similarity(&request).await?;

    Ok(reconcile(&pairs, results)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use opposition_model::{
        CasePredictionRequest, CasePredictionResult, ConfusionType, GsSimilarityRequest,
        HealthStatus, MarkSimilarityRequest, SimilarityLevel,
    };
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Answers the batch call with a canned list, echoing altered terms.
    struct BatchStub {
        results: Vec<GoodServiceLikelihoodOutput>,
        calls: AtomicUsize,
    }

    impl BatchStub {
        fn new(results: Vec<GoodServiceLikelihoodOutput>) -> Self {
            Self {
                results,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl OppositionBackend for BatchStub {
        async fn mark_similarity(
            &self,
            _request: &MarkSimilarityRequest,
        ) -> Result<MarkSimilarityOutput, BackendError> {
            unreachable!("pairing never compares marks")
        }

        async fn gs_similarity(
            &self,
            _request: &GsSimilarityRequest,
        ) -> Result<GoodServiceLikelihoodOutput, BackendError> {
            unreachable!("pairing only uses the batch endpoint")
        }

        async fn batch_gs_similarity(
            &self,
            _request: &BatchGsSimilarityRequest,
        ) -> Result<Vec<GoodServiceLikelihoodOutput>, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.results.clone())
        }

        async fn case_prediction(
            &self,
            _request: &CasePredictionRequest,
        ) -> Result<CasePredictionResult, BackendError> {
            unreachable!("pairing never predicts")
        }

        async fn health_check(&self) -> Result<HealthStatus, BackendError> {
            unreachable!("pairing never checks health")
        }

        fn name(&self) -> &'static str {
            "batch-stub"
        }
    }

    fn mark() -> MarkSimilarityOutput {
        MarkSimilarityOutput {
            visual: SimilarityLevel::High,
            aural: SimilarityLevel::Moderate,
            conceptual: SimilarityLevel::Low,
            overall: SimilarityLevel::High,
            reasoning: Some("Shared dominant element.".to_string()),
        }
    }

    fn server_result(score: f64, confusing: bool) -> GoodServiceLikelihoodOutput {
        GoodServiceLikelihoodOutput {
            applicant_good: GoodOrService::new("normalised applicant", 1),
            opponent_good: GoodOrService::new("normalised opponent", 1),
            are_competitive: confusing,
            are_complementary: false,
            similarity_score: score,
            likelihood_of_confusion: confusing,
            confusion_type: confusing.then_some(ConfusionType::Indirect),
        }
    }

    fn applicant_goods() -> Vec<GoodOrService> {
        vec![
            GoodOrService::new("T-shirts", 25),
            GoodOrService::new("Hats", 25),
        ]
    }

    fn opponent_goods() -> Vec<GoodOrService> {
        vec![
            GoodOrService::new("Clothing, namely shirts", 25),
            GoodOrService::new("Leather bags", 18),
            GoodOrService::new("Retail services for clothing", 35),
        ]
    }

    #[test]
    fn test_cross_pairs_order() {
        let pairs = cross_pairs(&applicant_goods(), &opponent_goods());

        assert_eq!(pairs.len(), 6);
        for (i, a) in applicant_goods().iter().enumerate() {
            for (j, o) in opponent_goods().iter().enumerate() {
                assert_eq!(&pairs[i * 3 + j].applicant, a);
                assert_eq!(&pairs[i * 3 + j].opponent, o);
            }
        }
    }

    #[test]
    fn test_cross_pairs_empty_side() {
        assert!(cross_pairs(&[], &opponent_goods()).is_empty());
        assert!(cross_pairs(&applicant_goods(), &[]).is_empty());
    }

    #[test]
    fn test_reconcile_restores_local_terms() {
        let pairs = cross_pairs(&applicant_goods(), &opponent_goods());
        let results = (0..6).map(|k| server_result(k as f64 / 10.0, k % 2 == 0)).collect();

        let reconciled = reconcile(&pairs, results).unwrap();

        assert_eq!(reconciled.len(), 6);
        for (k, entry) in reconciled.iter().enumerate() {
            assert_eq!(entry.applicant_good, pairs[k].applicant);
            assert_eq!(entry.opponent_good, pairs[k].opponent);
            assert_eq!(entry.similarity_score, k as f64 / 10.0);
            assert!(entry.is_consistent());
        }
    }

    #[test]
    fn test_reconcile_length_mismatch() {
        let pairs = cross_pairs(&applicant_goods()[..1], &opponent_goods()[..2]);

        assert_eq!(
            reconcile(&pairs, vec![]),
            Err(ReconcileError::LengthMismatch {
                expected: 2,
                actual: 0
            })
        );

        let too_many = vec![server_result(0.5, false); 3];
        assert!(matches!(
            reconcile(&pairs, too_many),
            Err(ReconcileError::LengthMismatch { expected: 2, actual: 3 })
        ));
    }

    #[test]
    fn test_reconcile_drops_stray_confusion_type() {
        let pairs = cross_pairs(&applicant_goods()[..1], &opponent_goods()[..1]);
        let mut result = server_result(0.1, false);
        result.confusion_type = Some(ConfusionType::Direct);

        let reconciled = reconcile(&pairs, vec![result]).unwrap();
        assert_eq!(reconciled[0].confusion_type, None);
    }

    #[test]
    fn test_reconcile_rejects_untyped_confusion() {
        let pairs = cross_pairs(&applicant_goods()[..1], &opponent_goods()[..1]);
        let mut result = server_result(0.9, true);
        result.confusion_type = None;

        assert_eq!(
            reconcile(&pairs, vec![result]),
            Err(ReconcileError::MissingConfusionType { index: 0 })
        );
    }

    #[test]
    fn test_reconcile_rejects_score_out_of_range() {
        let pairs = cross_pairs(&applicant_goods()[..1], &opponent_goods()[..1]);

        assert!(matches!(
            reconcile(&pairs, vec![server_result(1.5, false)]),
            Err(ReconcileError::ScoreOutOfRange { index: 0, .. })
        ));
    }

    #[tokio::test]
    async fn test_compare_goods_single_batch_call() {
        let stub = BatchStub::new((0..6).map(|_| server_result(0.85, true)).collect());

        let reconciled = compare_goods(&stub, &applicant_goods(), &opponent_goods(), &mark())
            .await
            .unwrap();

        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
        assert_eq!(reconciled.len(), 6);
        assert_eq!(reconciled[5].applicant_good.term, "Hats");
        assert_eq!(reconciled[5].opponent_good.term, "Retail services for clothing");
    }

    #[tokio::test]
    async fn test_compare_goods_surfaces_mismatch() {
        let stub = BatchStub::new(vec![]);

        let err = compare_goods(&stub, &applicant_goods()[..1], &opponent_goods()[..2], &mark())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PairingError::Reconcile(ReconcileError::LengthMismatch { expected: 2, actual: 0 })
        ));
        assert_eq!(
            err.to_string(),
            "Batch comparison returned 0 results; expected 2"
        );
    }
}
