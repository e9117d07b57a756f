//! Plan checklist: six structural criteria and a binary verdict.
//!
//! Evaluation is total: any JSON value is accepted. Missing keys, wrong types
//! and non-string text count as zero words, which turns the affected
//! criteria `false` instead of failing.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::plan::Verdict;

const MIN_OBJECTIVE_WORDS: usize = 6;
const REQUIRED_MONTHS: usize = 3;
const MIN_MONTH_OBJECTIVE_WORDS: usize = 3;
const MIN_DELIVERABLE_WORDS: usize = 2;
const MAX_DELIVERABLES_PER_MONTH: usize = 5;
const MIN_RISK_WORDS: usize = 3;
const MIN_KPIS: usize = 2;
const MIN_KPI_WORDS: usize = 2;

pub const APPROVED_FEEDBACK: &str = "Plan validé : checklist complète et cohérente.";
pub const REMEDIATION_HINT: &str = "Recommandé : préciser l'objectif, détailler des livrables actionnables, ajouter KPI et risques explicites.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    Clarity,
    Focus,
    Actionability,
    Feasibility,
    RiskAwareness,
    Coherence,
}

impl Criterion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Criterion::Clarity => "clarity",
            Criterion::Focus => "focus",
            Criterion::Actionability => "actionability",
            Criterion::Feasibility => "feasibility",
            Criterion::RiskAwareness => "risk_awareness",
            Criterion::Coherence => "coherence",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistEvaluation {
    pub clarity: bool,
    pub focus: bool,
    pub actionability: bool,
    pub feasibility: bool,
    pub risk_awareness: bool,
    pub coherence: bool,
    pub verdict: Verdict,
    pub feedback: String,
}

impl ChecklistEvaluation {
    /// Criteria in reporting order, paired with their outcome.
    pub fn criteria(&self) -> [(Criterion, bool); 6] {
        [
            (Criterion::Clarity, self.clarity),
            (Criterion::Focus, self.focus),
            (Criterion::Actionability, self.actionability),
            (Criterion::Feasibility, self.feasibility),
            (Criterion::RiskAwareness, self.risk_awareness),
            (Criterion::Coherence, self.coherence),
        ]
    }

    pub fn failed(&self) -> Vec<Criterion> {
        self.criteria()
            .into_iter()
            .filter(|(_, passed)| !passed)
            .map(|(criterion, _)| criterion)
            .collect()
    }
}

/// Whitespace-delimited word count. Non-strings and absent values count 0.
fn words_count(value: Option<&Value>) -> usize {
    value
        .and_then(Value::as_str)
        .map(|s| s.split_whitespace().count())
        .unwrap_or(0)
}

/// Evaluates a plan document against the six criteria.
pub fn evaluate(plan: &Value) -> ChecklistEvaluation {
    let objective = plan.get("objective");
    let months = plan
        .get("monthly_objectives")
        .and_then(Value::as_array)
        .filter(|months| months.len() == REQUIRED_MONTHS);
    let kpis = plan.get("kpis").and_then(Value::as_array);
    let risks = plan.get("risks").and_then(Value::as_array);

    let clarity = words_count(objective) >= MIN_OBJECTIVE_WORDS;

    let focus = months.is_some_and(|months| {
        months.iter().all(|month| {
            month.is_object() && words_count(month.get("objective")) >= MIN_MONTH_OBJECTIVE_WORDS
        })
    });

    let actionability = months.is_some_and(|months| {
        months.iter().all(|month| {
            month
                .get("deliverables")
                .and_then(Value::as_array)
                .is_some_and(|deliverables| {
                    !deliverables.is_empty()
                        && deliverables
                            .iter()
                            .all(|d| words_count(Some(d)) >= MIN_DELIVERABLE_WORDS)
                })
        })
    });

    let feasibility = months.is_some_and(|months| {
        months.iter().all(|month| {
            month
                .get("deliverables")
                .and_then(Value::as_array)
                .is_some_and(|deliverables| deliverables.len() <= MAX_DELIVERABLES_PER_MONTH)
        })
    });

    let risk_awareness = risks.is_some_and(|risks| {
        !risks.is_empty()
            && risks
                .iter()
                .all(|risk| words_count(Some(risk)) >= MIN_RISK_WORDS)
    });

    let coherence = focus
        && clarity
        && kpis.is_some_and(|kpis| {
            kpis.len() >= MIN_KPIS && kpis.iter().all(|kpi| words_count(Some(kpi)) >= MIN_KPI_WORDS)
        });

    let mut evaluation = ChecklistEvaluation {
        clarity,
        focus,
        actionability,
        feasibility,
        risk_awareness,
        coherence,
        verdict: Verdict::Rejected,
        feedback: String::new(),
    };

    let failed = evaluation.failed();
    if failed.is_empty() {
        evaluation.verdict = Verdict::Approved;
        evaluation.feedback = APPROVED_FEEDBACK.to_string();
    } else {
        let names = failed.iter().map(Criterion::as_str).collect::<Vec<_>>();
        evaluation.feedback = format!(
            "Plan rejeté : corriger {}. {}",
            names.join(", "),
            REMEDIATION_HINT
        );
    }

    evaluation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::input::GenerationContext;
    use crate::generation::plan::generate_plan;
    use serde_json::json;

    fn good_plan() -> Value {
        json!({
            "objective": "Décrocher trois entretiens qualifiés en data d'ici 90 jours",
            "monthly_objectives": [
                {"month": 1, "objective": "Repositionner le profil data", "deliverables": ["CV data publié", "Profil LinkedIn réécrit"]},
                {"month": 2, "objective": "Lancer les candidatures ciblées", "deliverables": ["20 candidatures envoyées"]},
                {"month": 3, "objective": "Transformer les entretiens obtenus", "deliverables": ["3 simulations d'entretien"]}
            ],
            "kpis": ["3 entretiens qualifiés", "20 candidatures ciblées"],
            "risks": ["Manque de temps disponible", "Marché data saturé localement"]
        })
    }

    #[test]
    fn test_good_plan_is_approved() {
        let evaluation = evaluate(&good_plan());
        assert_eq!(evaluation.verdict, Verdict::Approved);
        assert_eq!(evaluation.feedback, APPROVED_FEEDBACK);
        assert!(evaluation.failed().is_empty());
    }

    #[test]
    fn test_generated_plan_records_fail_text_criteria() {
        let context = GenerationContext {
            primary_goal: Some("Lancer une activité freelance".to_string()),
            success_definition: Some("Signer 2 clients".to_string()),
        };
        let plan = serde_json::to_value(generate_plan(&context, "Trajectoire offensive").unwrap())
            .unwrap();
        let evaluation = evaluate(&plan);
        assert!(evaluation.clarity && evaluation.focus);
        assert!(evaluation.actionability && evaluation.feasibility);
        assert!(!evaluation.risk_awareness);
        assert!(!evaluation.coherence);
        assert_eq!(evaluation.verdict, Verdict::Rejected);
    }

    #[test]
    fn test_bad_plan_scenario() {
        let plan = json!({
            "objective": "Trouver mieux",
            "monthly_objectives": [{"month": 1, "objective": "vite", "deliverables": []}],
            "kpis": [],
            "risks": []
        });
        let evaluation = evaluate(&plan);
        assert_eq!(evaluation.verdict, Verdict::Rejected);
        assert!(!evaluation.clarity);
        assert!(!evaluation.focus);
        assert!(!evaluation.actionability);
        assert!(!evaluation.coherence);
        assert!(!evaluation.risk_awareness);
        assert!(evaluation.feedback.starts_with("Plan rejeté : corriger clarity, focus"));
        assert!(evaluation.feedback.ends_with(REMEDIATION_HINT));
    }

    #[test]
    fn test_malformed_inputs_never_panic() {
        for plan in [
            json!(null),
            json!(42),
            json!("plan"),
            json!([]),
            json!({}),
            json!({"objective": 12, "monthly_objectives": "trois", "kpis": {}, "risks": 1}),
            json!({"monthly_objectives": [1, 2, 3]}),
            json!({"monthly_objectives": [{"deliverables": "x"}, null, []]}),
        ] {
            let evaluation = evaluate(&plan);
            assert_eq!(evaluation.verdict, Verdict::Rejected, "{plan}");
        }
    }

    #[test]
    fn test_non_record_months_fail_every_month_criterion() {
        let mut plan = good_plan();
        plan["monthly_objectives"] = json!([1, 2, 3]);
        let evaluation = evaluate(&plan);
        assert!(!evaluation.focus);
        assert!(!evaluation.actionability);
        assert!(!evaluation.feasibility);
    }

    #[test]
    fn test_too_many_deliverables_breaks_feasibility_only() {
        let mut plan = good_plan();
        plan["monthly_objectives"][0]["deliverables"] = json!([
            "Livrable numéro un", "Livrable numéro deux", "Livrable numéro trois",
            "Livrable numéro quatre", "Livrable numéro cinq", "Livrable numéro six"
        ]);
        let evaluation = evaluate(&plan);
        assert!(!evaluation.feasibility);
        assert!(evaluation.actionability);
        assert_eq!(evaluation.failed(), vec![Criterion::Feasibility]);
    }

    #[test]
    fn test_one_word_deliverable_breaks_actionability() {
        let mut plan = good_plan();
        plan["monthly_objectives"][1]["deliverables"] = json!(["Candidatures"]);
        assert!(!evaluate(&plan).actionability);
    }

    #[test]
    fn test_short_risk_breaks_risk_awareness() {
        let mut plan = good_plan();
        plan["risks"] = json!(["Temps", "Marché data saturé localement"]);
        assert!(!evaluate(&plan).risk_awareness);
    }

    #[test]
    fn test_record_risks_and_kpis_count_zero_words() {
        let mut plan = good_plan();
        plan["risks"] = json!([
            {"risk": "Sous-estimation de la charge disponible", "mitigation": "Bloquer des créneaux"}
        ]);
        plan["kpis"] = json!([
            {"name": "Livrables critiques produits", "target": ">= 4"},
            {"name": "Cadence hebdomadaire", "target": ">= 10"}
        ]);
        let evaluation = evaluate(&plan);
        assert!(!evaluation.risk_awareness);
        assert!(!evaluation.coherence);
        assert_eq!(evaluation.verdict, Verdict::Rejected);
    }

    #[test]
    fn test_coherence_requires_clarity() {
        let mut plan = good_plan();
        plan["objective"] = json!("Trop court");
        let evaluation = evaluate(&plan);
        assert!(!evaluation.clarity);
        assert!(!evaluation.coherence);
        assert!(evaluation.focus);
    }

    #[test]
    fn test_single_kpi_breaks_coherence() {
        let mut plan = good_plan();
        plan["kpis"] = json!(["3 entretiens qualifiés"]);
        assert!(!evaluate(&plan).coherence);
    }
}
