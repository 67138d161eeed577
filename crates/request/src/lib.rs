//! Request building and form validation.
//!
//! Converts raw form state (free text, class numbers typed as strings or
//! numbers) into the typed payloads the prediction service accepts. The
//! first failing rule is reported; nothing is sent until every rule passes.

use opposition_model::{
    GoodOrService, MarkSimilarityRequest, TrademarkMark, NICE_CLASS_MAX, NICE_CLASS_MIN,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Maximum goods/services entries accepted per side.
pub const MAX_GOODS_PER_SIDE: usize = 3;

/// Which party a form field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Applicant,
    Opponent,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Applicant => f.write_str("applicant"),
            Self::Opponent => f.write_str("opponent"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("Please enter a trademark for the {0}.")]
    MissingWordmark(Side),

    #[error("Please enter the opponent's registration number, or mark it as unregistered.")]
    MissingRegistrationNumber,

    #[error("The {0} must have at least one good/service.")]
    NoGoods(Side),

    #[error("The {side} may list at most {max} goods/services.")]
    TooManyGoods { side: Side, max: usize },

    #[error("The {side}'s good/service #{} needs a description.", .index + 1)]
    EmptyTerm { side: Side, index: usize },

    #[error(
        "The {side}'s good/service #{} has class '{value}'; expected a whole number between 1 and 45.",
        .index + 1
    )]
    InvalidClass {
        side: Side,
        index: usize,
        value: String,
    },
}

/// A Nice class as typed into the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClassInput {
    Number(i64),
    Text(String),
}

impl Default for ClassInput {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl From<i64> for ClassInput {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for ClassInput {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl ClassInput {
    /// Parse into a class number in [1, 45].
    pub fn parse(&self) -> Option<u16> {
        let n = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse::<i64>().ok()?,
        };
        let class = u16::try_from(n).ok()?;
        (NICE_CLASS_MIN..=NICE_CLASS_MAX)
            .contains(&class)
            .then_some(class)
    }

    fn raw(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

/// One goods/services row of the form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoodsEntry {
    #[serde(default)]
    pub term: String,
    #[serde(default)]
    pub nice_class: ClassInput,
}

impl GoodsEntry {
    pub fn new(term: impl Into<String>, nice_class: impl Into<ClassInput>) -> Self {
        Self {
            term: term.into(),
            nice_class: nice_class.into(),
        }
    }
}

/// Mark fields of the form. Registration fields are ignored for the applicant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkInput {
    #[serde(default)]
    pub wordmark: String,
    #[serde(default)]
    pub is_registered: bool,
    #[serde(default)]
    pub registration_number: String,
}

/// Raw state of the opposition form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormState {
    #[serde(default)]
    pub applicant: MarkInput,
    #[serde(default)]
    pub opponent: MarkInput,
    #[serde(default)]
    pub applicant_goods: Vec<GoodsEntry>,
    #[serde(default)]
    pub opponent_goods: Vec<GoodsEntry>,
}

/// Validated, typed inputs for one prediction run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OppositionInput {
    pub applicant: TrademarkMark,
    pub opponent: TrademarkMark,
    pub applicant_goods: Vec<GoodOrService>,
    pub opponent_goods: Vec<GoodOrService>,
}

impl OppositionInput {
    pub fn mark_similarity_request(&self) -> MarkSimilarityRequest {
        MarkSimilarityRequest {
            applicant: self.applicant.clone(),
            opponent: self.opponent.clone(),
        }
    }
}

impl FormState {
    /// Validate and convert into typed payloads.
    pub fn build(&self) -> Result<OppositionInput, FormError> {
        let applicant_wordmark = self.applicant.wordmark.trim();
        if applicant_wordmark.is_empty() {
            return Err(FormError::MissingWordmark(Side::Applicant));
        }

        let opponent_wordmark = self.opponent.wordmark.trim();
        if opponent_wordmark.is_empty() {
            return Err(FormError::MissingWordmark(Side::Opponent));
        }

        let registration_number = if self.opponent.is_registered {
            let number = self.opponent.registration_number.trim();
            if number.is_empty() {
                return Err(FormError::MissingRegistrationNumber);
            }
            Some(number.to_string())
        } else {
            None
        };

        let applicant_goods = build_goods(Side::Applicant, &self.applicant_goods)?;
        let opponent_goods = build_goods(Side::Opponent, &self.opponent_goods)?;

        Ok(OppositionInput {
            applicant: TrademarkMark::applicant(applicant_wordmark),
            opponent: TrademarkMark::opponent(opponent_wordmark, registration_number),
            applicant_goods,
            opponent_goods,
        })
    }

    pub fn validate(&self) -> Result<(), FormError> {
        self.build().map(|_| ())
    }
}

/// Every entry must be fully filled; a single blank row fails the list.
pub fn build_goods(side: Side, entries: &[GoodsEntry]) -> Result<Vec<GoodOrService>, FormError> {
    if entries.is_empty() {
        return Err(FormError::NoGoods(side));
    }
    if entries.len() > MAX_GOODS_PER_SIDE {
        return Err(FormError::TooManyGoods {
            side,
            max: MAX_GOODS_PER_SIDE,
        });
    }

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let term = entry.term.trim();
            if term.is_empty() {
                return Err(FormError::EmptyTerm { side, index });
            }
            let nice_class = entry.nice_class.parse().ok_or_else(|| FormError::InvalidClass {
                side,
                index,
                value: entry.nice_class.raw(),
            })?;
            Ok(GoodOrService::new(term, nice_class))
        })
        .collect()
}
