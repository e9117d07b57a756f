//! Decision engine: constraint checking, option generation and the forced tradeoff.
//!
//! Pure functions. The constraint check reports failure as data; the tradeoff
//! rules are hard invariants and fail with a `TradeoffError`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::models::context::CareerContext;

/// Hard cap on the number of options offered or recorded for one decision.
pub const MAX_OPTIONS: usize = 3;

/// Longest planning horizon the workflow accepts.
pub const MAX_HORIZON_DAYS: i32 = 90;

const DEFAULT_GOAL: &str = "objectif";

// ────────────────────────────────────────────────────────────────────────────
// Constraint check
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintCheck {
    pub ok: bool,
    pub issue: String,
    pub suggested_adjustment: Option<String>,
}

impl ConstraintCheck {
    pub fn passed() -> Self {
        Self {
            ok: true,
            issue: String::new(),
            suggested_adjustment: None,
        }
    }

    pub fn failed(issue: &str, suggested_adjustment: &str) -> Self {
        Self {
            ok: false,
            issue: issue.to_string(),
            suggested_adjustment: Some(suggested_adjustment.to_string()),
        }
    }
}

/// Checks a context for completeness. The first failing rule wins:
/// goal, success definition, constraints, horizon.
pub fn check_constraints(context: &CareerContext) -> ConstraintCheck {
    if context.primary_goal.trim().is_empty() {
        return ConstraintCheck::failed(
            "Le champ `primary_goal` est requis.",
            "Renseigner un objectif principal clair.",
        );
    }

    if context.success_definition.trim().is_empty() {
        return ConstraintCheck::failed(
            "Le champ `success_definition` est requis.",
            "Définir un critère de succès mesurable.",
        );
    }

    if !has_constraints(&context.constraints) {
        return ConstraintCheck::failed(
            "Le champ `constraints` doit contenir au moins une contrainte.",
            "Ajouter une contrainte (temps, budget, énergie, etc.).",
        );
    }

    if context
        .horizon_days
        .is_some_and(|days| days > MAX_HORIZON_DAYS)
    {
        return ConstraintCheck::failed(
            "`horizon_days` ne peut pas dépasser 90.",
            "Réduire l'horizon ou diviser l'objectif en phases.",
        );
    }

    ConstraintCheck::passed()
}

/// A constraint set must be a non-empty JSON object.
pub fn has_constraints(constraints: &Value) -> bool {
    constraints.as_object().is_some_and(|map| !map.is_empty())
}

// ────────────────────────────────────────────────────────────────────────────
// Options
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionOption {
    pub title: String,
    pub value: String,
    pub effort: String,
    pub risk: String,
}

/// The three strategic archetypes: cautious, balanced, aggressive.
pub fn generate_options(context: &CareerContext) -> Vec<DecisionOption> {
    let goal = match context.primary_goal.trim() {
        "" => DEFAULT_GOAL,
        goal => goal,
    };

    let options = vec![
        DecisionOption {
            title: "Trajectoire prudente".to_string(),
            value: format!("Consolider les bases sur 4 semaines pour avancer vers: {goal}"),
            effort: "modéré".to_string(),
            risk: "faible".to_string(),
        },
        DecisionOption {
            title: "Trajectoire équilibrée".to_string(),
            value: format!(
                "Lancer un plan d'exécution hebdomadaire orienté résultats pour: {goal}"
            ),
            effort: "élevé".to_string(),
            risk: "moyen".to_string(),
        },
        DecisionOption {
            title: "Trajectoire offensive".to_string(),
            value: format!("Accélérer avec des paris à fort impact pour: {goal}"),
            effort: "très élevé".to_string(),
            risk: "élevé".to_string(),
        },
    ];

    options.into_iter().take(MAX_OPTIONS).collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Forced tradeoff
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TradeoffError {
    #[error("Le choix doit être renseigné.")]
    MissingChoice,

    #[error("Impossible de choisir sans justification.")]
    MissingJustification,

    #[error("L'arbitrage forcé exige au moins une option abandonnée.")]
    NothingAbandoned,

    #[error("L'option choisie ne peut pas faire partie des options abandonnées.")]
    ChosenAbandoned,
}

/// A validated tradeoff. `validated` is always `true`: there is no
/// partially validated state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tradeoff {
    pub validated: bool,
    pub chosen_option: String,
    pub justification: String,
    pub abandoned_options: Vec<String>,
}

/// Validates a commitment to `chosen` over the `abandoned` alternatives.
///
/// Rules, checked in order: a choice is given, a justification is given,
/// at least one option is abandoned, the choice is not itself abandoned.
pub fn force_tradeoff(
    chosen: &str,
    justification: &str,
    abandoned: &[String],
) -> Result<Tradeoff, TradeoffError> {
    let chosen = chosen.trim();
    if chosen.is_empty() {
        return Err(TradeoffError::MissingChoice);
    }

    let justification = justification.trim();
    if justification.is_empty() {
        return Err(TradeoffError::MissingJustification);
    }

    if abandoned.is_empty() {
        return Err(TradeoffError::NothingAbandoned);
    }

    if abandoned.iter().any(|option| option.trim() == chosen) {
        return Err(TradeoffError::ChosenAbandoned);
    }

    Ok(Tradeoff {
        validated: true,
        chosen_option: chosen.to_string(),
        justification: justification.to_string(),
        abandoned_options: abandoned.to_vec(),
    })
}
