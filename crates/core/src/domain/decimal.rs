use anyhow::{ensure, Context};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Shape of a `NUMERIC(precision, scale)` column, used to reject values Postgres would
/// overflow or silently round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumericBounds {
    pub precision: u32,
    pub scale: u32,
}

impl NumericBounds {
    /// Prices, income, cash on hand.
    pub const MONEY: Self = Self::new(12, 2);
    /// Monthly HOA fee.
    pub const FEE: Self = Self::new(8, 2);
    pub const BATHROOMS: Self = Self::new(3, 1);

    pub const fn new(precision: u32, scale: u32) -> Self {
        Self { precision, scale }
    }

    /// Exclusive upper bound: `10^(precision - scale)`.
    pub fn limit(self) -> Decimal {
        Decimal::from(10u64.pow(self.precision - self.scale))
    }

    pub fn check(self, value: Decimal) -> Result<(), String> {
        if value < Decimal::ZERO {
            return Err("must be >= 0".to_string());
        }
        if value.normalize().scale() > self.scale {
            return Err(format!("must have at most {} fraction digits", self.scale));
        }
        if value >= self.limit() {
            return Err(format!("must be less than {}", self.limit()));
        }
        Ok(())
    }
}

/// Parses listing text such as "$650,000" into an amount that fits `bounds`.
pub fn parse_amount(raw: &str, bounds: NumericBounds) -> anyhow::Result<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
        .collect();
    ensure!(
        !cleaned.is_empty() && cleaned.bytes().all(|b| b.is_ascii_digit() || b == b'.'),
        "amount {raw:?} is not a plain decimal"
    );
    let value =
        Decimal::from_str(&cleaned).with_context(|| format!("amount {raw:?} is not a decimal"))?;
    checked(value, bounds).with_context(|| format!("amount {raw:?} out of range"))
}

/// Same as [`parse_amount`] for a JSON number, read through its exact text form.
pub fn amount_from_number(n: &serde_json::Number, bounds: NumericBounds) -> anyhow::Result<Decimal> {
    let text = n.to_string();
    let value = Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .with_context(|| format!("amount {text} is not a decimal"))?;
    checked(value, bounds).with_context(|| format!("amount {text} out of range"))
}

fn checked(value: Decimal, bounds: NumericBounds) -> anyhow::Result<Decimal> {
    bounds.check(value).map_err(anyhow::Error::msg)?;
    Ok(value.normalize())
}
