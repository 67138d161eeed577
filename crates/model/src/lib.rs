//! Core domain model for opposition outcome prediction.
//!
//! This crate defines the value types exchanged with the prediction service:
//! - `TrademarkMark` / `GoodOrService`: the user's inputs
//! - `MarkSimilarityOutput`: stage 1 result
//! - `GoodServiceLikelihoodOutput`: stage 2 result, one per goods pair
//! - `CasePredictionResult`: the terminal artifact of one run
//!
//! Request payloads for each endpoint live here too so that every crate
//! agrees on the wire shape.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Lowest valid Nice classification number.
pub const NICE_CLASS_MIN: u16 = 1;
/// Highest valid Nice classification number.
pub const NICE_CLASS_MAX: u16 = 45;

/// A single wordmark with its registration metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrademarkMark {
    /// The mark text
    pub wordmark: String,

    /// Whether the mark is registered
    #[serde(default)]
    pub is_registered: bool,

    /// Registration number, only ever set for a registered opponent mark
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_number: Option<String>,
}

impl TrademarkMark {
    /// An applicant mark. Applicants are unregistered for opposition purposes.
    pub fn applicant(wordmark: impl Into<String>) -> Self {
        Self {
            wordmark: wordmark.into(),
            is_registered: false,
            registration_number: None,
        }
    }

    /// An opponent mark. Passing a registration number marks it registered.
    pub fn opponent(wordmark: impl Into<String>, registration_number: Option<String>) -> Self {
        Self {
            wordmark: wordmark.into(),
            is_registered: registration_number.is_some(),
            registration_number,
        }
    }
}

/// One goods/services entry under the Nice Classification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GoodOrService {
    pub term: String,
    pub nice_class: u16,
}

impl GoodOrService {
    pub fn new(term: impl Into<String>, nice_class: u16) -> Self {
        Self {
            term: term.into(),
            nice_class,
        }
    }
}

/// Ordered similarity scale used for every mark comparison axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityLevel {
    Dissimilar,
    Low,
    Moderate,
    High,
    Identical,
}

impl SimilarityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dissimilar => "dissimilar",
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::Identical => "identical",
        }
    }
}

impl fmt::Display for SimilarityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown similarity level: {0}")]
pub struct ParseLevelError(pub String);

impl FromStr for SimilarityLevel {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dissimilar" => Ok(Self::Dissimilar),
            "low" => Ok(Self::Low),
            "moderate" => Ok(Self::Moderate),
            "high" => Ok(Self::High),
            "identical" => Ok(Self::Identical),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

/// Multi-axis mark comparison returned by `/mark_similarity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkSimilarityOutput {
    pub visual: SimilarityLevel,
    pub aural: SimilarityLevel,
    pub conceptual: SimilarityLevel,
    pub overall: SimilarityLevel,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

/// Kind of confusion found for a goods pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfusionType {
    Direct,
    Indirect,
}

impl ConfusionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Indirect => "indirect",
        }
    }
}

/// Likelihood assessment for one (applicant good, opponent good) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoodServiceLikelihoodOutput {
    pub applicant_good: GoodOrService,
    pub opponent_good: GoodOrService,
    pub are_competitive: bool,
    pub are_complementary: bool,

    /// Similarity of the two goods (0.0 - 1.0)
    pub similarity_score: f64,

    pub likelihood_of_confusion: bool,

    /// Present only when `likelihood_of_confusion` is true
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confusion_type: Option<ConfusionType>,
}

impl GoodServiceLikelihoodOutput {
    /// `confusion_type` is set if and only if confusion is likely.
    pub fn is_consistent(&self) -> bool {
        self.likelihood_of_confusion == self.confusion_type.is_some()
    }

    pub fn score_in_range(&self) -> bool {
        (0.0..=1.0).contains(&self.similarity_score)
    }
}

/// The three possible predicted outcomes of an opposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutcomeLabel {
    #[serde(rename = "Opposition likely to succeed")]
    LikelyToSucceed,
    #[serde(rename = "Opposition may partially succeed")]
    MayPartiallySucceed,
    #[serde(rename = "Opposition likely to fail")]
    LikelyToFail,
}

impl OutcomeLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LikelyToSucceed => "Opposition likely to succeed",
            Self::MayPartiallySucceed => "Opposition may partially succeed",
            Self::LikelyToFail => "Opposition likely to fail",
        }
    }
}

impl fmt::Display for OutcomeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Predicted opposition outcome with confidence and rationale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OppositionOutcome {
    pub result: OutcomeLabel,

    /// Confidence (0.0 - 1.0)
    pub confidence: f64,

    pub reasoning: String,
}

impl OppositionOutcome {
    pub fn is_confident(&self, threshold: f64) -> bool {
        self.confidence >= threshold
    }
}

/// Final result of one orchestration run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CasePredictionResult {
    pub mark_similarity: MarkSimilarityOutput,
    pub goods_services_likelihoods: Vec<GoodServiceLikelihoodOutput>,
    pub opposition_outcome: OppositionOutcome,
}

/// Body of `POST /mark_similarity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkSimilarityRequest {
    pub applicant: TrademarkMark,
    pub opponent: TrademarkMark,
}

/// Body of `POST /gs_similarity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GsSimilarityRequest {
    pub applicant_good: GoodOrService,
    pub opponent_good: GoodOrService,
    pub mark_similarity: MarkSimilarityOutput,
}

/// Body of `POST /batch_gs_similarity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchGsSimilarityRequest {
    pub applicant_goods: Vec<GoodOrService>,
    pub opponent_goods: Vec<GoodOrService>,
    pub mark_similarity: MarkSimilarityOutput,
}

/// Body of `POST /case_prediction`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CasePredictionRequest {
    pub mark_similarity: MarkSimilarityOutput,
    pub goods_services_likelihoods: Vec<GoodServiceLikelihoodOutput>,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}
