use crate::domain::buyer::BuyerProfile;
use crate::domain::property::Property;
use crate::domain::validation::ValidationErrors;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScenarioKind {
    MinCash,
    #[serde(rename = "BALANCED_10")]
    Balanced10,
    #[serde(rename = "AGGRESSIVE_15")]
    Aggressive15,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 3] = [Self::MinCash, Self::Balanced10, Self::Aggressive15];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub name: ScenarioKind,
    pub down_payment: Decimal,
    /// Zero until an amortization model exists.
    pub monthly_payment: Decimal,
    pub programs: Vec<serde_json::Value>,
}

/// Share of cash on hand each scenario puts down.
///
/// These are product placeholders rather than financial rules, so they are read from
/// the environment with the historical values as defaults.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenarioPolicy {
    pub min_cash_fraction: Decimal,
    pub balanced_fraction: Decimal,
    pub aggressive_fraction: Decimal,
}

impl Default for ScenarioPolicy {
    fn default() -> Self {
        Self {
            min_cash_fraction: Decimal::new(8, 1),
            balanced_fraction: Decimal::new(6, 1),
            aggressive_fraction: Decimal::new(9, 1),
        }
    }
}

impl ScenarioPolicy {
    pub fn from_env() -> Self {
        let mut out = Self::default();
        read_fraction("SCENARIO_MIN_CASH_FRACTION", &mut out.min_cash_fraction);
        read_fraction("SCENARIO_BALANCED_FRACTION", &mut out.balanced_fraction);
        read_fraction("SCENARIO_AGGRESSIVE_FRACTION", &mut out.aggressive_fraction);
        out
    }

    pub fn fraction(&self, kind: ScenarioKind) -> Decimal {
        match kind {
            ScenarioKind::MinCash => self.min_cash_fraction,
            ScenarioKind::Balanced10 => self.balanced_fraction,
            ScenarioKind::Aggressive15 => self.aggressive_fraction,
        }
    }

    /// `min(cash * fraction, cash)`, exact. Never exceeds `cash_on_hand`.
    pub fn down_payment(&self, kind: ScenarioKind, cash: Decimal) -> Decimal {
        // Only a product far above `cash` can overflow.
        cash.checked_mul(self.fraction(kind))
            .map_or(cash, |amount| amount.min(cash))
            .normalize()
    }

    pub fn generate(&self, profile: &BuyerProfile) -> Vec<Scenario> {
        ScenarioKind::ALL
            .iter()
            .map(|&kind| Scenario {
                name: kind,
                down_payment: self.down_payment(kind, profile.cash_on_hand),
                monthly_payment: Decimal::ZERO,
                programs: Vec::new(),
            })
            .collect()
    }
}

fn read_fraction(var: &str, slot: &mut Decimal) {
    let Ok(raw) = std::env::var(var) else {
        return;
    };
    match Decimal::from_str(raw.trim()) {
        Ok(v) if v >= Decimal::ZERO => *slot = v,
        _ => tracing::warn!(var, value = %raw, default = %slot, "ignoring invalid scenario fraction"),
    }
}

/// Input of `analysis.create`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAnalysis {
    pub property_id: Uuid,
    #[serde(flatten)]
    pub profile: BuyerProfile,
}

impl NewAnalysis {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        self.profile.validate()
    }
}

/// What the generator hands to storage: everything except ids and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisDraft {
    pub property_id: Uuid,
    pub user_id: Option<String>,
    pub profile: BuyerProfile,
    pub scenarios: Vec<Scenario>,
    pub programs: Vec<serde_json::Value>,
}

impl AnalysisDraft {
    pub fn generate(input: NewAnalysis, user_id: Option<String>, policy: &ScenarioPolicy) -> Self {
        let scenarios = policy.generate(&input.profile);
        Self {
            property_id: input.property_id,
            user_id,
            profile: input.profile,
            scenarios,
            programs: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub id: Uuid,
    pub property_id: Uuid,
    pub user_id: Option<String>,
    #[serde(flatten)]
    pub profile: BuyerProfile,
    pub scenarios: Vec<Scenario>,
    pub programs: Vec<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisWithProperty {
    #[serde(flatten)]
    pub analysis: Analysis,
    pub property: Property,
}
