use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::LimitsConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Free,
    Pro,
    Max,
}

impl PlanTier {
    /// Unrecognized names fall back to the free tier.
    pub fn from_name(name: &str) -> Self {
        match name {
            "pro" => PlanTier::Pro,
            "max" => PlanTier::Max,
            _ => PlanTier::Free,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Free => "free",
            PlanTier::Pro => "pro",
            PlanTier::Max => "max",
        }
    }

    /// Daily request allowance for this tier; -1 means unlimited.
    pub fn daily_limit(&self, limits: &LimitsConfig) -> i64 {
        match self {
            PlanTier::Free => limits.free,
            PlanTier::Pro => limits.pro,
            PlanTier::Max => limits.max,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub user_id: String,
    pub plan: PlanTier,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UsageStatus {
    pub user_id: String,
    pub plan: PlanTier,
    pub day: String,
    pub count: i64,
    pub limit: i64,
    pub remaining: i64,
    pub can_proceed: bool,
}
