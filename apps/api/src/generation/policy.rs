//! Deliverable content policy.
//!
//! A deliverable must name something concrete to produce. Phrasing that
//! signals passive learning or exploration is rejected. The policy runs over
//! the fixed plan templates, so a violation is a template defect and never a
//! user input error.

use thiserror::Error;
use tracing::info;

use crate::generation::plan::MONTH_TEMPLATES;

/// Case-folded terms that may not appear anywhere in a deliverable.
pub const FORBIDDEN_DELIVERABLE_TERMS: &[&str] = &[
    "learn",
    "explore",
    "get familiar",
    "apprendre",
    "explorer",
    "se familiariser",
    "se familiarise",
    "prise en main",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Deliverables cannot include learning/exploration phrasing ('{deliverable}' contains '{term}')")]
pub struct ContentPolicyViolation {
    pub deliverable: String,
    pub term: &'static str,
}

/// Unicode full case folding for the characters where it differs from
/// lowercasing (`ß` → `ss`, long s, final sigma). Everything else is
/// lowercased.
pub fn case_fold(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            'ß' | 'ẞ' => folded.push_str("ss"),
            'ſ' => folded.push('s'),
            'ς' => folded.push('σ'),
            other => folded.extend(other.to_lowercase()),
        }
    }
    folded
}

/// Returns the first forbidden term found in `text`, if any. Matching runs
/// on the case-folded text.
pub fn find_forbidden_term(text: &str) -> Option<&'static str> {
    let normalized = case_fold(text);
    FORBIDDEN_DELIVERABLE_TERMS
        .iter()
        .copied()
        .find(|term| normalized.contains(term))
}

pub fn contains_forbidden_terms(text: &str) -> bool {
    find_forbidden_term(text).is_some()
}

/// Fails on the first deliverable that breaks the policy.
pub fn validate_deliverables<S: AsRef<str>>(
    deliverables: &[S],
) -> Result<(), ContentPolicyViolation> {
    for deliverable in deliverables {
        let deliverable = deliverable.as_ref();
        if let Some(term) = find_forbidden_term(deliverable) {
            return Err(ContentPolicyViolation {
                deliverable: deliverable.to_string(),
                term,
            });
        }
    }
    Ok(())
}

/// Checks every fixed month template. Called once at startup; an error here
/// must abort the process.
pub fn verify_templates() -> Result<(), ContentPolicyViolation> {
    for template in MONTH_TEMPLATES.iter() {
        validate_deliverables(template.deliverables)?;
    }
    info!(
        "Content policy verified over {} month templates",
        MONTH_TEMPLATES.len()
    );
    Ok(())
}
