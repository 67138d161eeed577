//! Presentation of opposition prediction results.
//!
//! Pure mappings from results to display values:
//! - severity buckets for similarity scores
//! - filter predicates over goods/services comparisons
//! - summary counts
//! - plain-text reports (see [`report`])

pub mod report;

pub use report::{describe_pair, format_score, progress_label, render_report};

use opposition_model::GoodServiceLikelihoodOutput;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Scores at or above this count as high similarity.
pub const HIGH_SIMILARITY_THRESHOLD: f64 = 0.8;

/// Severity band of a similarity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeverityBucket {
    High,
    ModerateHigh,
    Moderate,
    Low,
    VeryLow,
}

impl SeverityBucket {
    pub fn from_score(score: f64) -> Self {
        if score >= HIGH_SIMILARITY_THRESHOLD {
            Self::High
        } else if score >= 0.6 {
            Self::ModerateHigh
        } else if score >= 0.4 {
            Self::Moderate
        } else if score >= 0.2 {
            Self::Low
        } else {
            Self::VeryLow
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::ModerateHigh => "moderate-high",
            Self::Moderate => "moderate",
            Self::Low => "low",
            Self::VeryLow => "very-low",
        }
    }

    /// One-sentence reading of the band for a goods pair.
    pub fn description(&self) -> &'static str {
        match self {
            Self::High => {
                "These goods/services are highly similar, creating a strong risk of consumer confusion."
            }
            Self::ModerateHigh => {
                "These goods/services have substantial similarity, posing a moderate to high risk of confusion."
            }
            Self::Moderate => {
                "These goods/services have moderate similarity, with some potential for confusion."
            }
            Self::Low => {
                "These goods/services have low similarity, with limited potential for confusion."
            }
            Self::VeryLow => {
                "These goods/services are dissimilar, with minimal risk of confusion."
            }
        }
    }
}

impl fmt::Display for SeverityBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown filter '{0}' (expected all, confusing, competitive, complementary or high-similarity)")]
pub struct ParseFilterError(String);

/// Which comparisons to show. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LikelihoodFilter {
    #[default]
    All,
    Confusing,
    Competitive,
    Complementary,
    HighSimilarity,
}

impl LikelihoodFilter {
    pub const ALL: [Self; 5] = [
        Self::All,
        Self::Confusing,
        Self::Competitive,
        Self::Complementary,
        Self::HighSimilarity,
    ];

    pub fn matches(&self, entry: &GoodServiceLikelihoodOutput) -> bool {
        match self {
            Self::All => true,
            Self::Confusing => entry.likelihood_of_confusion,
            Self::Competitive => entry.are_competitive,
            Self::Complementary => entry.are_complementary,
            Self::HighSimilarity => entry.similarity_score >= HIGH_SIMILARITY_THRESHOLD,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Confusing => "confusing",
            Self::Competitive => "competitive",
            Self::Complementary => "complementary",
            Self::HighSimilarity => "high-similarity",
        }
    }
}

impl fmt::Display for LikelihoodFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LikelihoodFilter {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseFilterError(s.to_string()))
    }
}

/// Active filter plus the independent "confusing only" toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterState {
    pub filter: LikelihoodFilter,
    pub confusing_only: bool,
}

impl FilterState {
    pub fn new(filter: LikelihoodFilter, confusing_only: bool) -> Self {
        Self {
            filter,
            confusing_only,
        }
    }

    pub fn matches(&self, entry: &GoodServiceLikelihoodOutput) -> bool {
        self.filter.matches(entry) && (!self.confusing_only || entry.likelihood_of_confusion)
    }

    /// Matching entries with their position in the full list.
    pub fn apply<'a>(
        &self,
        entries: &'a [GoodServiceLikelihoodOutput],
    ) -> Vec<(usize, &'a GoodServiceLikelihoodOutput)> {
        entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| self.matches(entry))
            .collect()
    }
}

/// Counts shown above the comparison list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Summary {
    pub total: usize,
    pub confusing: usize,
    pub high_similarity: usize,
    pub competitive: usize,
    pub complementary: usize,
}

impl Summary {
    pub fn from_likelihoods(entries: &[GoodServiceLikelihoodOutput]) -> Self {
        let count = |filter: LikelihoodFilter| entries.iter().filter(|e| filter.matches(e)).count();

        Self {
            total: count(LikelihoodFilter::All),
            confusing: count(LikelihoodFilter::Confusing),
            high_similarity: count(LikelihoodFilter::HighSimilarity),
            competitive: count(LikelihoodFilter::Competitive),
            complementary: count(LikelihoodFilter::Complementary),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opposition_model::{ConfusionType, GoodOrService};
    use pretty_assertions::assert_eq;

    fn entry(
        score: f64,
        confusing: bool,
        competitive: bool,
        complementary: bool,
    ) -> GoodServiceLikelihoodOutput {
        GoodServiceLikelihoodOutput {
            applicant_good: GoodOrService::new("T-shirts", 25),
            opponent_good: GoodOrService::new("Clothing", 25),
            are_competitive: competitive,
            are_complementary: complementary,
            similarity_score: score,
            likelihood_of_confusion: confusing,
            confusion_type: confusing.then_some(ConfusionType::Direct),
        }
    }

    fn sample() -> Vec<GoodServiceLikelihoodOutput> {
        vec![
            entry(0.85, true, true, false),
            entry(0.75, true, false, true),
            entry(0.45, false, false, true),
            entry(0.10, false, false, false),
        ]
    }

    #[test]
    fn test_severity_boundaries() {
        assert_eq!(SeverityBucket::from_score(1.0), SeverityBucket::High);
        assert_eq!(SeverityBucket::from_score(0.8), SeverityBucket::High);
        assert_eq!(SeverityBucket::from_score(0.79), SeverityBucket::ModerateHigh);
        assert_eq!(SeverityBucket::from_score(0.6), SeverityBucket::ModerateHigh);
        assert_eq!(SeverityBucket::from_score(0.4), SeverityBucket::Moderate);
        assert_eq!(SeverityBucket::from_score(0.2), SeverityBucket::Low);
        assert_eq!(SeverityBucket::from_score(0.19), SeverityBucket::VeryLow);
        assert_eq!(SeverityBucket::from_score(0.0), SeverityBucket::VeryLow);
    }

    #[test]
    fn test_severity_wire_names() {
        assert_eq!(
            serde_json::to_value(SeverityBucket::ModerateHigh).unwrap(),
            "moderate-high"
        );
        assert_eq!(SeverityBucket::VeryLow.to_string(), "very-low");
    }

    #[test]
    fn test_filter_parse() {
        assert_eq!(
            "high-similarity".parse::<LikelihoodFilter>(),
            Ok(LikelihoodFilter::HighSimilarity)
        );
        assert_eq!("Confusing".parse::<LikelihoodFilter>(), Ok(LikelihoodFilter::Confusing));
        assert!("risky".parse::<LikelihoodFilter>().is_err());
    }

    #[test]
    fn test_filter_predicates() {
        let entries = sample();
        let positions = |state: FilterState| -> Vec<usize> {
            state.apply(&entries).into_iter().map(|(i, _)| i).collect()
        };

        assert_eq!(positions(FilterState::default()), vec![0, 1, 2, 3]);
        assert_eq!(
            positions(FilterState::new(LikelihoodFilter::Complementary, false)),
            vec![1, 2]
        );
        assert_eq!(
            positions(FilterState::new(LikelihoodFilter::HighSimilarity, false)),
            vec![0]
        );
    }

    #[test]
    fn test_confusing_only_combines_with_filter() {
        let entries = sample();
        let state = FilterState::new(LikelihoodFilter::Complementary, true);

        let shown: Vec<usize> = state.apply(&entries).into_iter().map(|(i, _)| i).collect();
        assert_eq!(shown, vec![1]);
    }

    #[test]
    fn test_summary_matches_filtered_subsets() {
        let entries = sample();
        let summary = Summary::from_likelihoods(&entries);

        assert_eq!(
            summary,
            Summary {
                total: 4,
                confusing: 2,
                high_similarity: 1,
                competitive: 1,
                complementary: 2,
            }
        );

        for filter in LikelihoodFilter::ALL {
            let expected = FilterState::new(filter, false).apply(&entries).len();
            let counted = match filter {
                LikelihoodFilter::All => summary.total,
                LikelihoodFilter::Confusing => summary.confusing,
                LikelihoodFilter::Competitive => summary.competitive,
                LikelihoodFilter::Complementary => summary.complementary,
                LikelihoodFilter::HighSimilarity => summary.high_similarity,
            };
            assert_eq!(counted, expected, "filter {}", filter);
        }
    }

    #[test]
    fn test_summary_of_empty_list() {
        assert_eq!(Summary::from_likelihoods(&[]), Summary::default());
    }
}
