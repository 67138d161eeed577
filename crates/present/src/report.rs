//! Plain-text rendering for terminals.

use crate::{FilterState, SeverityBucket, Summary};
use opposition_model::{CasePredictionResult, GoodServiceLikelihoodOutput, MarkSimilarityOutput};
use opposition_workflow::{Stage, WorkflowState};

/// `0.85` -> `"85%"`.
pub fn format_score(score: f64) -> String {
    format!("{:.0}%", score * 100.0)
}

pub fn describe_pair(entry: &GoodServiceLikelihoodOutput) -> String {
    format!(
        "Applicant: {} (Class {}) | Opponent: {} (Class {})",
        entry.applicant_good.term,
        entry.applicant_good.nice_class,
        entry.opponent_good.term,
        entry.opponent_good.nice_class
    )
}

/// Human label for where a run currently is.
pub fn progress_label(state: &WorkflowState) -> String {
    match state.stage() {
        Stage::Idle => "Ready".to_string(),
        Stage::MarkSimilarity => {
            format!("Analyzing mark similarity ({}%)", state.percent_complete())
        }
        Stage::GoodsServicesSimilarity => {
            format!("Comparing goods and services ({}%)", state.percent_complete())
        }
        Stage::CasePrediction => {
            format!("Predicting opposition outcome ({}%)", state.percent_complete())
        }
        Stage::Done => "Prediction complete".to_string(),
        Stage::Error => match state.failure() {
            Some(failure) => format!("Prediction failed: {}", failure.message),
            None => "Prediction failed".to_string(),
        },
    }
}

fn mark_lines(mark: &MarkSimilarityOutput, lines: &mut Vec<String>) {
    lines.push("Mark similarity".to_string());
    lines.push(format!("  Visual:     {}", mark.visual));
    lines.push(format!("  Aural:      {}", mark.aural));
    lines.push(format!("  Conceptual: {}", mark.conceptual));
    lines.push(format!("  Overall:    {}", mark.overall));
    if let Some(reasoning) = &mark.reasoning {
        lines.push(format!("  {}", reasoning));
    }
}

fn entry_lines(position: usize, entry: &GoodServiceLikelihoodOutput, lines: &mut Vec<String>) {
    let severity = SeverityBucket::from_score(entry.similarity_score);

    let mut tags = Vec::new();
    if entry.likelihood_of_confusion {
        match entry.confusion_type {
            Some(kind) => tags.push(format!("confusing ({})", kind.as_str())),
            None => tags.push("confusing".to_string()),
        }
    }
    if entry.are_competitive {
        tags.push("competitive".to_string());
    }
    if entry.are_complementary {
        tags.push("complementary".to_string());
    }

    lines.push(format!("  #{} {}", position + 1, describe_pair(entry)));
    let mut detail = format!(
        "     Score: {} ({})",
        format_score(entry.similarity_score),
        severity
    );
    if !tags.is_empty() {
        detail.push_str(&format!(" [{}]", tags.join(", ")));
    }
    lines.push(detail);
    lines.push(format!("     {}", severity.description()));
}

/// Multi-line report of a finished prediction, with comparisons filtered.
pub fn render_report(result: &CasePredictionResult, filter: &FilterState) -> String {
    let outcome = &result.opposition_outcome;
    let mut lines = vec![
        format!(
            "Outcome: {} (confidence {})",
            outcome.result,
            format_score(outcome.confidence)
        ),
        outcome.reasoning.clone(),
        String::new(),
    ];

    mark_lines(&result.mark_similarity, &mut lines);
    lines.push(String::new());

    let entries = &result.goods_services_likelihoods;
    let summary = Summary::from_likelihoods(entries);
    let shown = filter.apply(entries);

    lines.push(format!(
        "Goods/services comparisons: {} of {} shown (filter: {}{})",
        shown.len(),
        summary.total,
        filter.filter,
        if filter.confusing_only { ", confusing only" } else { "" }
    ));
    lines.push(format!(
        "  {} confusing, {} high similarity, {} competitive, {} complementary",
        summary.confusing, summary.high_similarity, summary.competitive, summary.complementary
    ));

    if shown.is_empty() {
        lines.push("  No matching comparisons found.".to_string());
    }
    for (position, entry) in shown {
        entry_lines(position, entry, &mut lines);
    }

    lines.join("\n")
}
