use crate::domain::decimal::NumericBounds;
use crate::domain::validation::ValidationErrors;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const MIN_ANNUAL_INCOME: Decimal = Decimal::ONE_THOUSAND;
pub const HOUSEHOLD_SIZE_RANGE: std::ops::RangeInclusive<i32> = 1..=20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreditBand {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl CreditBand {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "excellent" => Some(Self::Excellent),
            "good" => Some(Self::Good),
            "fair" => Some(Self::Fair),
            "poor" => Some(Self::Poor),
            _ => None,
        }
    }
}

/// Questionnaire answers. Not stored on its own; each analysis keeps a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerProfile {
    pub first_time_home: bool,
    pub annual_income: Decimal,
    pub household_size: i32,
    pub credit_band: CreditBand,
    pub is_veteran: bool,
    pub is_frontline: bool,
    pub cash_on_hand: Decimal,
    pub occupation: String,
}

impl BuyerProfile {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errs = ValidationErrors::new();
        if self.annual_income < MIN_ANNUAL_INCOME {
            errs.push("annualIncome", format!("must be at least {MIN_ANNUAL_INCOME}"));
        } else if let Err(msg) = NumericBounds::MONEY.check(self.annual_income) {
            errs.push("annualIncome", msg);
        }
        errs.check(
            HOUSEHOLD_SIZE_RANGE.contains(&self.household_size),
            "householdSize",
            format!(
                "must be between {} and {}",
                HOUSEHOLD_SIZE_RANGE.start(),
                HOUSEHOLD_SIZE_RANGE.end()
            ),
        );
        if let Err(msg) = NumericBounds::MONEY.check(self.cash_on_hand) {
            errs.push("cashOnHand", msg);
        }
        errs.check(
            !self.occupation.trim().is_empty(),
            "occupation",
            "must be non-empty",
        );
        errs.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nurse() -> BuyerProfile {
        BuyerProfile {
            first_time_home: true,
            annual_income: Decimal::from(75_000),
            household_size: 2,
            credit_band: CreditBand::Good,
            is_veteran: false,
            is_frontline: false,
            cash_on_hand: Decimal::from(25_000),
            occupation: "Nurse".to_string(),
        }
    }

    #[test]
    fn accepts_typical_profile() {
        assert!(nurse().validate().is_ok());
    }

    #[test]
    fn rejects_low_income() {
        let mut p = nurse();
        p.annual_income = Decimal::new(99999, 2);
        assert!(p.validate().unwrap_err().has_field("annualIncome"));
        p.annual_income = MIN_ANNUAL_INCOME;
        assert!(p.validate().is_ok());
    }

    #[test]
    fn rejects_household_size_out_of_range() {
        for size in [0, 21, -3] {
            let mut p = nurse();
            p.household_size = size;
            assert!(p.validate().unwrap_err().has_field("householdSize"));
        }
        let mut p = nurse();
        p.household_size = 20;
        assert!(p.validate().is_ok());
    }

    #[test]
    fn rejects_blank_occupation_and_negative_cash() {
        let mut p = nurse();
        p.occupation = "   ".to_string();
        p.cash_on_hand = Decimal::NEGATIVE_ONE;
        let errs = p.validate().unwrap_err();
        assert!(errs.has_field("occupation"));
        assert!(errs.has_field("cashOnHand"));
    }

    #[test]
    fn rejects_amounts_too_large_or_too_precise_to_store() {
        let mut p = nurse();
        p.annual_income = Decimal::from(10_000_000_000i64);
        p.cash_on_hand = Decimal::new(250001, 3);
        let errs = p.validate().unwrap_err();
        assert!(errs.has_field("annualIncome"));
        assert!(errs.has_field("cashOnHand"));
        assert_eq!(errs.errors().len(), 2);
    }

    #[test]
    fn deserializes_questionnaire_json() {
        let p: BuyerProfile = serde_json::from_value(serde_json::json!({
            "firstTimeHome": true,
            "annualIncome": 75000,
            "householdSize": 2,
            "creditBand": "good",
            "isVeteran": false,
            "isFrontline": false,
            "cashOnHand": 25000,
            "occupation": "Nurse",
        }))
        .unwrap();
        assert_eq!(p, nurse());
        assert!(serde_json::from_value::<CreditBand>(serde_json::json!("stellar")).is_err());
    }
}
