use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Plan lifecycle. Plans are created as `Draft`; every evaluation sets
/// `Approved` or `Rejected`, and a later evaluation may flip it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    Draft,
    Approved,
    Rejected,
}

impl PlanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::Draft => "draft",
            PlanStatus::Approved => "approved",
            PlanStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PlanStatus::Draft),
            "approved" => Ok(PlanStatus::Approved),
            "rejected" => Ok(PlanStatus::Rejected),
            other => Err(format!("unknown plan status '{other}'")),
        }
    }
}

/// Binary checklist outcome. There is no partial verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Approved,
    Rejected,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Approved => "approved",
            Verdict::Rejected => "rejected",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verdict {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approved" => Ok(Verdict::Approved),
            "rejected" => Ok(Verdict::Rejected),
            other => Err(format!("unknown verdict '{other}'")),
        }
    }
}

impl From<Verdict> for PlanStatus {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Approved => PlanStatus::Approved,
            Verdict::Rejected => PlanStatus::Rejected,
        }
    }
}

/// A stored plan. `plan_json` holds either a generated plan document or, for
/// the draft produced by the bets step, `{context, chosen_option, bets}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_json: Value,
    pub status: PlanStatus,
    pub created_at: DateTime<Utc>,
}

/// Append-only evaluation record. A plan accumulates one per evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistResult {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub clarity: bool,
    pub focus: bool,
    pub actionability: bool,
    pub feasibility: bool,
    pub risk_awareness: bool,
    pub coherence: bool,
    pub verdict: Verdict,
    pub feedback: String,
    pub created_at: DateTime<Utc>,
}
