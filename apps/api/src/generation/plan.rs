//! 90-day plan generation.
//!
//! Output schema (exactly these four keys):
//! - objective
//! - monthly_objectives (exactly 3 months, each with 1–2 deliverables)
//! - kpis (3 entries, the last bound to the success definition)
//! - risks (3 risk/mitigation pairs)
//!
//! Month order is a rotation of the fixed templates picked by the stable
//! index over goal|option|success. Month numbers always run 1..=3.

use serde::{Deserialize, Serialize};

use crate::generation::input::{normalize_text, GenerationContext};
use crate::generation::policy::{validate_deliverables, ContentPolicyViolation};
use crate::generation::stable_index::{rotated, stable_index};

const DEFAULT_GOAL: &str = "Atteindre un objectif professionnel prioritaire";
const DEFAULT_SUCCESS: &str = "un résultat mesurable";
const DEFAULT_OPTION: &str = "la trajectoire prioritaire";

// ────────────────────────────────────────────────────────────────────────────
// Plan document
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanDocument {
    pub objective: String,
    pub monthly_objectives: Vec<MonthlyObjective>,
    pub kpis: Vec<Kpi>,
    pub risks: Vec<RiskEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyObjective {
    pub month: u8,
    pub objective: String,
    pub deliverables: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kpi {
    pub name: String,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskEntry {
    pub risk: String,
    pub mitigation: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Month templates
// ────────────────────────────────────────────────────────────────────────────

/// Normalized text fields a month objective may interpolate.
pub struct PlanSeed {
    pub goal: String,
    pub success: String,
    pub option: String,
}

/// A month template: an objective builder plus fixed deliverables.
pub struct MonthTemplate {
    pub objective: fn(&PlanSeed) -> String,
    pub deliverables: &'static [&'static str],
}

pub static MONTH_TEMPLATES: [MonthTemplate; 3] = [
    MonthTemplate {
        objective: scoping_objective,
        deliverables: &[
            "Document de périmètre validé avec priorités, jalons et critères de décision.",
            "Backlog priorisé des actions des 4 prochaines semaines avec responsables et échéances.",
        ],
    },
    MonthTemplate {
        objective: results_objective,
        deliverables: &[
            "Deux livrables métier publiables démontrant une progression concrète.",
            "Revue mi-parcours avec ajustements formalisés, impacts et nouvelles priorités.",
        ],
    },
    MonthTemplate {
        objective: traction_objective,
        deliverables: &[
            "Dossier de preuves d'impact comprenant résultats, métriques et retours actionnables.",
            "Plan de continuation 90 jours avec séquencement des prochaines exécutions.",
        ],
    },
];

fn scoping_objective(seed: &PlanSeed) -> String {
    format!(
        "Valider le cadrage opérationnel de '{}' avec un périmètre réaliste.",
        seed.option
    )
}

fn results_objective(seed: &PlanSeed) -> String {
    format!("Produire des résultats tangibles alignés sur {}.", seed.goal)
}

fn traction_objective(seed: &PlanSeed) -> String {
    format!("Consolider la traction et démontrer {}.", seed.success)
}

// ────────────────────────────────────────────────────────────────────────────
// Generation
// ────────────────────────────────────────────────────────────────────────────

/// Generates the canonical 90-day plan for a context and chosen option.
///
/// Deterministic: identical input serializes to byte-identical JSON. Returns
/// `ContentPolicyViolation` only if a fixed template regresses.
pub fn generate_plan(
    context: &GenerationContext,
    chosen_option: &str,
) -> Result<PlanDocument, ContentPolicyViolation> {
    let seed = PlanSeed {
        goal: normalize_text(context.primary_goal.as_deref(), DEFAULT_GOAL),
        success: normalize_text(context.success_definition.as_deref(), DEFAULT_SUCCESS),
        option: normalize_text(Some(chosen_option), DEFAULT_OPTION),
    };

    let objective = format!(
        "Exécuter '{}' pour progresser vers : {}.",
        seed.option, seed.goal
    );

    let order: Vec<usize> = (0..MONTH_TEMPLATES.len()).collect();
    let offset = stable_index(
        &[&seed.goal, &seed.option, &seed.success],
        MONTH_TEMPLATES.len(),
    );

    let monthly_objectives = rotated(&order, offset)
        .into_iter()
        .enumerate()
        .map(|(position, template_index)| {
            let template = &MONTH_TEMPLATES[template_index];
            MonthlyObjective {
                month: (position + 1) as u8,
                objective: (template.objective)(&seed),
                deliverables: template.deliverables.iter().map(|d| d.to_string()).collect(),
            }
        })
        .collect::<Vec<_>>();

    for month in &monthly_objectives {
        validate_deliverables(&month.deliverables)?;
    }

    Ok(PlanDocument {
        objective,
        monthly_objectives,
        kpis: build_kpis(&seed.success),
        risks: build_risks(),
    })
}

fn build_kpis(success: &str) -> Vec<Kpi> {
    vec![
        Kpi {
            name: "Livrables critiques produits".to_string(),
            target: ">= 4 livrables validés sur 90 jours".to_string(),
        },
        Kpi {
            name: "Cadence hebdomadaire".to_string(),
            target: ">= 10 sessions d'exécution par mois".to_string(),
        },
        Kpi {
            name: "Signal de succès principal".to_string(),
            target: success.to_string(),
        },
    ]
}

fn build_risks() -> Vec<RiskEntry> {
    vec![
        RiskEntry {
            risk: "Dispersion des efforts sur des actions à faible impact".to_string(),
            mitigation: "Limiter le WIP à 3 priorités et faire une revue hebdomadaire."
                .to_string(),
        },
        RiskEntry {
            risk: "Sous-estimation de la charge disponible".to_string(),
            mitigation:
                "Bloquer des créneaux fixes et réduire le périmètre en cas de dérive.".to_string(),
        },
        RiskEntry {
            risk: "Absence de feedback exploitable".to_string(),
            mitigation:
                "Planifier des points de revue récurrents et collecter des retours actionnables."
                    .to_string(),
        },
    ]
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::policy::contains_forbidden_terms;

    fn freelance() -> GenerationContext {
        GenerationContext {
            primary_goal: Some("Lancer une activité freelance".to_string()),
            success_definition: Some("Signer 2 clients".to_string()),
        }
    }

    #[test]
    fn test_scenario_shape() {
        let plan = generate_plan(&freelance(), "Trajectoire offensive").unwrap();
        assert_eq!(plan.monthly_objectives.len(), 3);
        assert_eq!(plan.kpis.len(), 3);
        assert_eq!(plan.risks.len(), 3);
        assert_eq!(
            plan.objective,
            "Exécuter 'Trajectoire offensive' pour progresser vers : Lancer une activité freelance."
        );
    }

    #[test]
    fn test_regeneration_is_byte_identical() {
        let first = serde_json::to_string(&generate_plan(&freelance(), "Trajectoire offensive").unwrap())
            .unwrap();
        let second = serde_json::to_string(&generate_plan(&freelance(), "Trajectoire offensive").unwrap())
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_document_has_exactly_four_keys() {
        let value = serde_json::to_value(generate_plan(&freelance(), "Trajectoire offensive").unwrap())
            .unwrap();
        let mut keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["kpis", "monthly_objectives", "objective", "risks"]);
        for month in value["monthly_objectives"].as_array().unwrap() {
            assert_eq!(month.as_object().unwrap().len(), 3);
        }
    }

    #[test]
    fn test_months_are_rotated_but_numbered_in_order() {
        // stable_index("Lancer une activité freelance|Trajectoire offensive|Signer 2 clients", 3) = 2
        let plan = generate_plan(&freelance(), "Trajectoire offensive").unwrap();
        let numbers: Vec<u8> = plan.monthly_objectives.iter().map(|m| m.month).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(
            plan.monthly_objectives[0].objective,
            "Consolider la traction et démontrer Signer 2 clients."
        );
        assert!(plan.monthly_objectives[1]
            .objective
            .contains("'Trajectoire offensive'"));
    }

    #[test]
    fn test_deliverables_respect_policy_and_size() {
        let plan = generate_plan(&freelance(), "Trajectoire équilibrée").unwrap();
        for month in &plan.monthly_objectives {
            assert!((1..=2).contains(&month.deliverables.len()));
            for deliverable in &month.deliverables {
                assert!(!contains_forbidden_terms(deliverable), "{deliverable}");
            }
        }
    }

    #[test]
    fn test_success_kpi_bound_to_success_definition() {
        let plan = generate_plan(&freelance(), "Trajectoire offensive").unwrap();
        assert_eq!(plan.kpis[2].target, "Signer 2 clients");
    }

    #[test]
    fn test_blank_input_uses_defaults() {
        let plan = generate_plan(&GenerationContext::default(), "   ").unwrap();
        assert_eq!(
            plan.objective,
            "Exécuter 'la trajectoire prioritaire' pour progresser vers : Atteindre un objectif professionnel prioritaire."
        );
        assert_eq!(plan.kpis[2].target, "un résultat mesurable");
    }
}
