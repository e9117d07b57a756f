//! Strategic bets: deterministic hypothesis/signal/risk/fallback quadruples.
//!
//! No LLM call. The same (context, option) always yields the same bets in the
//! same order: the stable index picks both the rotation offset and the count.

use serde::{Deserialize, Serialize};

use crate::generation::input::{normalize_text, GenerationContext};
use crate::generation::stable_index::{rotated, stable_index};

pub const MIN_BETS: usize = 2;
pub const MAX_BETS: usize = 3;

const DEFAULT_GOAL: &str = "votre objectif prioritaire";
const DEFAULT_SUCCESS: &str = "un signal de progression mesurable";
const DEFAULT_OPTION: &str = "option prioritaire";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategicBet {
    pub hypothesis: String,
    pub success_signal: String,
    pub main_risk: String,
    pub fallback: String,
}

/// Generates between [`MIN_BETS`] and [`MAX_BETS`] bets. Never empty.
///
/// Seeds (preserved as-is for reproducibility):
/// - count  = MIN_BETS + stable_index(goal|option, MAX_BETS - MIN_BETS + 1)
/// - offset = stable_index(option|success, templates.len())
pub fn generate_strategic_bets(
    context: &GenerationContext,
    chosen_option: &str,
) -> Vec<StrategicBet> {
    let goal = normalize_text(context.primary_goal.as_deref(), DEFAULT_GOAL);
    let success = normalize_text(context.success_definition.as_deref(), DEFAULT_SUCCESS);
    let option = normalize_text(Some(chosen_option), DEFAULT_OPTION);

    let templates = bet_templates(&goal, &option, &success);

    let selected_size = MIN_BETS + stable_index(&[&goal, &option], MAX_BETS - MIN_BETS + 1);
    let offset = stable_index(&[&option, &success], templates.len());

    let mut bets = rotated(&templates, offset);
    bets.truncate(selected_size);

    if bets.is_empty() {
        bets.push(templates[0].clone());
    }
    bets
}

fn bet_templates(goal: &str, option: &str, success: &str) -> [StrategicBet; 3] {
    [
        StrategicBet {
            hypothesis: format!(
                "En exécutant '{option}' de manière focus 2 semaines, nous accélérons vers {goal}."
            ),
            success_signal: format!("Un livrable concret est produit et valide {success}."),
            main_risk: "Dispersion opérationnelle qui ralentit l'exécution.".to_string(),
            fallback: "Réduire le périmètre à une seule action critique et replanifier sur 7 jours."
                .to_string(),
        },
        StrategicBet {
            hypothesis: format!(
                "Une routine hebdomadaire orientée résultats rend '{option}' soutenable pour atteindre {goal}."
            ),
            success_signal: "Deux itérations complètes sont terminées sans rupture de rythme."
                .to_string(),
            main_risk: "Charge personnelle imprévue qui casse la cadence.".to_string(),
            fallback:
                "Passer en mode minimum viable (30 minutes/jour) jusqu'au retour à la normale."
                    .to_string(),
        },
        StrategicBet {
            hypothesis: format!(
                "En obtenant du feedback externe tôt, '{option}' augmente ses chances de succès sur {goal}."
            ),
            success_signal: "Au moins un retour externe actionnable est intégré au plan."
                .to_string(),
            main_risk: "Feedback tardif ou non exploitable.".to_string(),
            fallback:
                "Utiliser une auto-revue structurée avec checklist en attendant un retour externe."
                    .to_string(),
        },
    ]
}
