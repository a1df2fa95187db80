use crate::domain::decimal::{amount_from_number, parse_amount, NumericBounds};
use crate::domain::property::{year_built_range, ParsedProperty, SourceSite, MIN_ZIP_CODE_LEN};
use anyhow::{ensure, Context};
use chrono::Datelike;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use url::Url;

/// Field values the model may send either as a string or as a JSON number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseValue {
    Text(String),
    Number(serde_json::Number),
}

/// Arguments of the `extractPropertyData` tool call, before normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmListing {
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: LooseValue,
    pub price: LooseValue,
    #[serde(default)]
    pub bedrooms: Option<f64>,
    #[serde(default)]
    pub bathrooms: Option<LooseValue>,
    #[serde(default)]
    pub hoa: Option<LooseValue>,
    #[serde(default)]
    pub sqft: Option<f64>,
    #[serde(default)]
    pub year_built: Option<f64>,
    #[serde(default)]
    pub lot_size: Option<String>,
    #[serde(default)]
    pub property_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl LlmListing {
    /// Required fields must normalize cleanly; optional fields that don't are dropped.
    /// The result satisfies the same rules as `property.create` input.
    pub fn validate_and_into_parsed(self, source_url: &Url) -> anyhow::Result<ParsedProperty> {
        self.validate_and_into_parsed_at(source_url, chrono::Utc::now().year())
    }

    pub fn validate_and_into_parsed_at(
        self,
        source_url: &Url,
        current_year: i32,
    ) -> anyhow::Result<ParsedProperty> {
        let address = self.address.trim().to_string();
        ensure!(!address.is_empty(), "address must be non-empty");

        let city = self.city.trim().to_string();
        ensure!(!city.is_empty(), "city must be non-empty");

        let state = self.state.trim().to_ascii_uppercase();
        ensure!(
            state.len() == 2 && state.bytes().all(|b| b.is_ascii_alphabetic()),
            "state must be a 2-letter code (got {:?})",
            self.state
        );

        let zip_code = match self.zip_code {
            LooseValue::Text(s) => s.trim().to_string(),
            LooseValue::Number(n) => {
                let n = n
                    .as_u64()
                    .with_context(|| format!("zipCode must be a whole number (got {n})"))?;
                format!("{n:05}")
            }
        };
        ensure!(
            zip_code.len() >= MIN_ZIP_CODE_LEN,
            "zipCode must be at least {MIN_ZIP_CODE_LEN} characters (got {zip_code:?})"
        );

        let price = amount(self.price, NumericBounds::MONEY).context("invalid price")?;
        let hoa = optional_amount("hoa", self.hoa, NumericBounds::FEE);
        let bathrooms = optional_amount("bathrooms", self.bathrooms, NumericBounds::BATHROOMS);

        let years = year_built_range(current_year);
        let year_built = whole_number("yearBuilt", self.year_built).filter(|y| {
            let ok = years.contains(y);
            if !ok {
                tracing::debug!(year_built = *y, "dropping out-of-range yearBuilt");
            }
            ok
        });

        Ok(ParsedProperty {
            address,
            city,
            state,
            zip_code,
            price,
            bedrooms: whole_number("bedrooms", self.bedrooms),
            bathrooms,
            hoa,
            sqft: whole_number("sqft", self.sqft),
            year_built,
            lot_size: non_blank(self.lot_size),
            property_type: non_blank(self.property_type),
            description: non_blank(self.description),
            source_url: source_url.to_string(),
            source_logo: SourceSite::from_url(source_url),
            degraded: false,
            fallback_reason: None,
        })
    }
}

fn amount(v: LooseValue, bounds: NumericBounds) -> anyhow::Result<Decimal> {
    match v {
        LooseValue::Text(s) => parse_amount(&s, bounds),
        LooseValue::Number(n) => amount_from_number(&n, bounds),
    }
}

fn optional_amount(
    field: &'static str,
    v: Option<LooseValue>,
    bounds: NumericBounds,
) -> Option<Decimal> {
    match amount(v?, bounds) {
        Ok(d) => Some(d),
        Err(err) => {
            tracing::debug!(field, error = %format!("{err:#}"), "dropping invalid amount");
            None
        }
    }
}

fn whole_number(field: &'static str, v: Option<f64>) -> Option<i32> {
    let n = v?;
    if n.is_finite() && n >= 0.0 && n.fract() == 0.0 && n <= i32::MAX as f64 {
        Some(n as i32)
    } else {
        tracing::debug!(field, value = n, "dropping invalid count");
        None
    }
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::property::NewProperty;
    use serde_json::json;

    fn listing_url() -> Url {
        Url::parse("https://www.redfin.com/CO/Denver/123-Main-St/home/1").unwrap()
    }

    fn parse(v: serde_json::Value) -> anyhow::Result<ParsedProperty> {
        serde_json::from_value::<LlmListing>(v)?.validate_and_into_parsed_at(&listing_url(), 2026)
    }

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn normalizes_complete_listing() {
        let p = parse(json!({
            "address": " 123 Main St ",
            "city": "Denver",
            "state": "co",
            "zipCode": "80205",
            "price": "$650,000",
            "bedrooms": 4,
            "bathrooms": 2.5,
            "hoa": "$45",
            "sqft": 2400,
            "yearBuilt": 1999,
            "lotSize": "0.25 acres",
            "propertyType": "Single Family",
            "description": "Corner lot",
        }))
        .unwrap();
        assert_eq!(p.address, "123 Main St");
        assert_eq!(p.state, "CO");
        assert_eq!(p.price, d("650000"));
        assert_eq!(p.hoa, Some(d("45")));
        assert_eq!(p.bedrooms, Some(4));
        assert_eq!(p.bathrooms, Some(d("2.5")));
        assert_eq!(p.year_built, Some(1999));
        assert_eq!(p.source_logo, SourceSite::Redfin);
        assert!(!p.degraded);
        assert_eq!(p.fallback_reason, None);
    }

    #[test]
    fn accepts_numeric_price_and_zip_with_nulls() {
        let p = parse(json!({
            "address": "9 Pine Rd",
            "city": "Boston",
            "state": "MA",
            "zipCode": 2134,
            "price": 799000.5,
            "bedrooms": null,
            "hoa": null,
        }))
        .unwrap();
        assert_eq!(p.zip_code, "02134");
        assert_eq!(p.price, d("799000.5"));
        assert_eq!(p.bedrooms, None);
        assert_eq!(p.hoa, None);
    }

    #[test]
    fn drops_invalid_optional_fields() {
        let p = parse(json!({
            "address": "9 Pine Rd",
            "city": "Boston",
            "state": "MA",
            "zipCode": "02134",
            "price": "500000",
            "bedrooms": 2.5,
            "bathrooms": 2.25,
            "hoa": "N/A",
            "sqft": -20,
            "yearBuilt": 1700,
            "lotSize": "  ",
        }))
        .unwrap();
        assert_eq!(p.bedrooms, None);
        assert_eq!(p.year_built, None);
        assert_eq!(p.bathrooms, None);
        assert_eq!(p.hoa, None);
        assert_eq!(p.sqft, None);
        assert_eq!(p.lot_size, None);
    }

    #[test]
    fn rejects_bad_required_fields() {
        let base = json!({
            "address": "9 Pine Rd",
            "city": "Boston",
            "state": "MA",
            "zipCode": "02134",
            "price": "500000",
        });

        let mut v = base.clone();
        v["price"] = json!("Call for price");
        assert!(parse(v).is_err());

        let mut v = base.clone();
        v["state"] = json!("Massachusetts");
        assert!(parse(v).is_err());

        let mut v = base.clone();
        v["address"] = json!("   ");
        assert!(parse(v).is_err());

        let mut v = base.clone();
        v["zipCode"] = json!("802");
        assert!(parse(v).is_err());

        let mut v = base.clone();
        v["price"] = json!(123456789012345u64);
        assert!(parse(v).is_err());

        let mut v = base;
        v.as_object_mut().unwrap().remove("city");
        assert!(parse(v).is_err());
    }

    #[test]
    fn drops_optional_values_the_columns_cannot_hold() {
        let p = parse(json!({
            "address": "9 Pine Rd",
            "city": "Boston",
            "state": "MA",
            "zipCode": "02134",
            "price": "500000",
            "bathrooms": 150,
            "hoa": "$2,000,000",
            "yearBuilt": 2040,
        }))
        .unwrap();
        assert_eq!(p.bathrooms, None);
        assert_eq!(p.hoa, None);
        assert_eq!(p.year_built, None);
    }

    #[test]
    fn extracted_listing_can_be_posted_back() {
        let p = parse(json!({
            "address": "9 Pine Rd",
            "city": "Boston",
            "state": "ma",
            "zipCode": 2134,
            "price": 799000.5,
            "bedrooms": 3,
            "bathrooms": "2.5",
            "hoa": 310.25,
            "sqft": 1800,
            "yearBuilt": 2031,
        }))
        .unwrap();
        assert_eq!(p.year_built, Some(2031));
        assert!(NewProperty::from(p).validate(2026).is_ok());
    }
}
