//! Format-neutral outline of an exported plan.
//!
//! Payloads are read leniently: a missing or mistyped section renders as
//! `-` so any stored plan can be exported.

use serde_json::Value;

use crate::models::plan::ChecklistResult;

pub const TITLE: &str = "Plan d'exécution à 90 jours";
const MISSING: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Title(String),
    Heading(String),
    Paragraph(String),
    Bullet(String),
    Spacer,
}

/// Renders a scalar as text. Containers and null count as missing.
fn text_of(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => MISSING.to_string(),
    }
}

fn kpi_line(entry: &Value) -> String {
    match entry {
        Value::Object(kpi) => match kpi.get("target") {
            Some(_) => format!(
                "{} : {}",
                text_of(kpi.get("name")),
                text_of(kpi.get("target"))
            ),
            None => text_of(kpi.get("name")),
        },
        other => text_of(Some(other)),
    }
}

fn risk_line(entry: &Value) -> String {
    match entry {
        Value::Object(risk) => match risk.get("mitigation") {
            Some(_) => format!(
                "{} (mitigation : {})",
                text_of(risk.get("risk")),
                text_of(risk.get("mitigation"))
            ),
            None => text_of(risk.get("risk")),
        },
        other => text_of(Some(other)),
    }
}

fn list<'a>(plan: &'a Value, key: &str) -> &'a [Value] {
    plan.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn push_list(blocks: &mut Vec<Block>, entries: &[Value], line: fn(&Value) -> String) {
    if entries.is_empty() {
        blocks.push(Block::Paragraph(MISSING.to_string()));
    }
    blocks.extend(entries.iter().map(|e| Block::Bullet(line(e))));
}

fn ok_ko(passed: bool) -> &'static str {
    if passed {
        "OK"
    } else {
        "KO"
    }
}

/// Builds the outline: title, objective, months, KPIs, risks, checklist.
pub fn outline(plan: &Value, checklist: Option<&ChecklistResult>) -> Vec<Block> {
    let mut blocks = vec![Block::Title(TITLE.to_string()), Block::Spacer];

    blocks.push(Block::Heading("Objectif".to_string()));
    blocks.push(Block::Paragraph(text_of(plan.get("objective"))));
    blocks.push(Block::Spacer);

    blocks.push(Block::Heading("Objectifs mensuels".to_string()));
    let months = list(plan, "monthly_objectives");
    if months.is_empty() {
        blocks.push(Block::Paragraph(MISSING.to_string()));
    }
    for (position, month) in months.iter().enumerate() {
        let number = month
            .get("month")
            .and_then(Value::as_u64)
            .unwrap_or(position as u64 + 1);
        blocks.push(Block::Paragraph(format!(
            "Mois {number} : {}",
            text_of(month.get("objective"))
        )));
        let deliverables = month
            .get("deliverables")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        push_list(&mut blocks, deliverables, |d| text_of(Some(d)));
    }
    blocks.push(Block::Spacer);

    blocks.push(Block::Heading("KPI".to_string()));
    push_list(&mut blocks, list(plan, "kpis"), kpi_line);
    blocks.push(Block::Spacer);

    blocks.push(Block::Heading("Risques".to_string()));
    push_list(&mut blocks, list(plan, "risks"), risk_line);
    blocks.push(Block::Spacer);

    blocks.push(Block::Heading("Checklist".to_string()));
    match checklist {
        Some(result) => {
            let rows = [
                ("Clarté", result.clarity),
                ("Focus", result.focus),
                ("Actionnabilité", result.actionability),
                ("Faisabilité", result.feasibility),
                ("Conscience des risques", result.risk_awareness),
                ("Cohérence", result.coherence),
            ];
            for (label, passed) in rows {
                blocks.push(Block::Bullet(format!("{label} : {}", ok_ko(passed))));
            }
            blocks.push(Block::Paragraph(format!("Verdict : {}", result.verdict)));
            blocks.push(Block::Paragraph(result.feedback.clone()));
        }
        None => blocks.push(Block::Paragraph(
            "Aucun résultat de checklist.".to_string(),
        )),
    }

    blocks
}
