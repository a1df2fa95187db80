use crate::domain::decimal::NumericBounds;
use crate::domain::validation::ValidationErrors;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

pub const MIN_YEAR_BUILT: i32 = 1800;

/// Years accepted for `yearBuilt`, allowing for announced new construction.
pub fn year_built_range(current_year: i32) -> std::ops::RangeInclusive<i32> {
    MIN_YEAR_BUILT..=current_year + 5
}

pub const MIN_ZIP_CODE_LEN: usize = 5;

/// Listing marketplace a URL belongs to, recognized by hostname.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceSite {
    Zillow,
    Redfin,
    Realtor,
    Other,
}

impl SourceSite {
    pub fn from_url(url: &Url) -> Self {
        let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
        if host.contains("zillow") {
            Self::Zillow
        } else if host.contains("redfin") {
            Self::Redfin
        } else if host.contains("realtor") {
            Self::Realtor
        } else {
            Self::Other
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Zillow => "zillow",
            Self::Redfin => "redfin",
            Self::Realtor => "realtor",
            Self::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "zillow" => Some(Self::Zillow),
            "redfin" => Some(Self::Redfin),
            "realtor" => Some(Self::Realtor),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

/// Why a parsed record holds placeholder data instead of extracted data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    CredentialMissing,
    ExtractionFailed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedProperty {
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub price: Decimal,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<Decimal>,
    pub hoa: Option<Decimal>,
    pub sqft: Option<i32>,
    pub year_built: Option<i32>,
    pub lot_size: Option<String>,
    pub property_type: Option<String>,
    pub description: Option<String>,
    pub source_url: String,
    pub source_logo: SourceSite,
    pub degraded: bool,
    pub fallback_reason: Option<FallbackReason>,
}

/// Accepts absolute http(s) URLs with a host.
pub fn validate_listing_url(raw: &str) -> Result<Url, ValidationErrors> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ValidationErrors::single("url", format!("must be a valid URL ({e})")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ValidationErrors::single("url", "must use http or https"));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(ValidationErrors::single("url", "must include a host"));
    }
    Ok(url)
}

/// Input of `property.create`. Extra keys of a [`ParsedProperty`] are ignored, so a
/// parse result can be posted back as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProperty {
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub price: Decimal,
    #[serde(default)]
    pub bedrooms: Option<i32>,
    #[serde(default)]
    pub bathrooms: Option<Decimal>,
    #[serde(default)]
    pub hoa: Option<Decimal>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub source_logo: Option<SourceSite>,
    #[serde(default)]
    pub sqft: Option<i32>,
    #[serde(default)]
    pub year_built: Option<i32>,
    #[serde(default)]
    pub lot_size: Option<String>,
    #[serde(default)]
    pub property_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewProperty {
    pub fn validate(&self, current_year: i32) -> Result<(), ValidationErrors> {
        let mut errs = ValidationErrors::new();
        errs.check(!self.address.trim().is_empty(), "address", "must be non-empty");
        errs.check(!self.city.trim().is_empty(), "city", "must be non-empty");
        errs.check(
            self.state.len() == 2 && self.state.bytes().all(|b| b.is_ascii_alphabetic()),
            "state",
            "must be a 2-letter code",
        );
        errs.check(
            self.zip_code.trim().len() >= MIN_ZIP_CODE_LEN,
            "zipCode",
            format!("must be at least {MIN_ZIP_CODE_LEN} characters"),
        );
        check_numeric(&mut errs, "price", Some(self.price), NumericBounds::MONEY);
        check_numeric(&mut errs, "hoa", self.hoa, NumericBounds::FEE);
        check_numeric(&mut errs, "bathrooms", self.bathrooms, NumericBounds::BATHROOMS);
        if let Some(bedrooms) = self.bedrooms {
            errs.check(bedrooms >= 0, "bedrooms", "must be >= 0");
        }
        if let Some(sqft) = self.sqft {
            errs.check(sqft >= 0, "sqft", "must be >= 0");
        }
        if let Some(year) = self.year_built {
            let range = year_built_range(current_year);
            errs.check(
                range.contains(&year),
                "yearBuilt",
                format!("must be between {} and {}", range.start(), range.end()),
            );
        }
        if let Some(source_url) = &self.source_url {
            errs.check(
                Url::parse(source_url).is_ok(),
                "sourceUrl",
                "must be a valid URL",
            );
        }
        errs.into_result()
    }
}

fn check_numeric(
    errs: &mut ValidationErrors,
    field: &'static str,
    value: Option<Decimal>,
    bounds: NumericBounds,
) {
    if let Some(Err(msg)) = value.map(|v| bounds.check(v)) {
        errs.push(field, msg);
    }
}

impl From<ParsedProperty> for NewProperty {
    fn from(p: ParsedProperty) -> Self {
        Self {
            address: p.address,
            city: p.city,
            state: p.state,
            zip_code: p.zip_code,
            price: p.price,
            bedrooms: p.bedrooms,
            bathrooms: p.bathrooms,
            hoa: p.hoa,
            source_url: Some(p.source_url),
            source_logo: Some(p.source_logo),
            sqft: p.sqft,
            year_built: p.year_built,
            lot_size: p.lot_size,
            property_type: p.property_type,
            description: p.description,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: Uuid,
    pub user_id: Option<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub price: Decimal,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<Decimal>,
    pub hoa: Option<Decimal>,
    pub sqft: Option<i32>,
    pub year_built: Option<i32>,
    pub lot_size: Option<String>,
    pub property_type: Option<String>,
    pub description: Option<String>,
    pub source_url: Option<String>,
    pub source_logo: Option<SourceSite>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(raw: &str) -> SourceSite {
        SourceSite::from_url(&Url::parse(raw).unwrap())
    }

    fn valid_new_property() -> NewProperty {
        NewProperty {
            address: "42 Elm St".to_string(),
            city: "Boulder".to_string(),
            state: "CO".to_string(),
            zip_code: "80302".to_string(),
            price: Decimal::from(540_000),
            bedrooms: Some(3),
            bathrooms: Some(Decimal::new(15, 1)),
            hoa: Some(Decimal::new(12550, 2)),
            source_url: Some("https://www.redfin.com/CO/Boulder/42-Elm".to_string()),
            source_logo: Some(SourceSite::Redfin),
            sqft: Some(1600),
            year_built: Some(1998),
            lot_size: None,
            property_type: Some("Townhouse".to_string()),
            description: None,
        }
    }

    #[test]
    fn tags_source_by_hostname() {
        assert_eq!(site("https://www.zillow.com/homedetails/1"), SourceSite::Zillow);
        assert_eq!(site("https://WWW.REDFIN.COM/x"), SourceSite::Redfin);
        assert_eq!(site("https://www.realtor.com/realestateandhomes-detail/x"), SourceSite::Realtor);
        assert_eq!(site("https://homes.example.com/zillow/redfin"), SourceSite::Other);
        assert_eq!(site("http://localhost:8080/listing"), SourceSite::Other);
    }

    #[test]
    fn source_site_round_trips_through_storage_tag() {
        for s in [SourceSite::Zillow, SourceSite::Redfin, SourceSite::Realtor, SourceSite::Other] {
            assert_eq!(SourceSite::parse(s.as_str()), Some(s));
        }
        assert_eq!(SourceSite::parse("trulia"), None);
    }

    #[test]
    fn rejects_malformed_listing_urls() {
        assert!(validate_listing_url("not a url").is_err());
        assert!(validate_listing_url("ftp://zillow.com/x").is_err());
        assert!(validate_listing_url("mailto:agent@zillow.com").is_err());
        let url = validate_listing_url(" https://www.zillow.com/homedetails/123 ").unwrap();
        assert_eq!(url.host_str(), Some("www.zillow.com"));
    }

    #[test]
    fn accepts_valid_new_property() {
        assert!(valid_new_property().validate(2026).is_ok());
    }

    #[test]
    fn reports_each_invalid_field() {
        let mut p = valid_new_property();
        p.state = "Colorado".to_string();
        p.price = Decimal::new(-1, 0);
        p.zip_code = "803".to_string();
        p.bedrooms = Some(-1);
        p.year_built = Some(2040);
        let errs = p.validate(2026).unwrap_err();
        for field in ["state", "price", "zipCode", "bedrooms", "yearBuilt"] {
            assert!(errs.has_field(field), "missing {field}: {errs}");
        }
        assert_eq!(errs.errors().len(), 5);
    }

    #[test]
    fn rejects_values_the_columns_cannot_hold() {
        let mut p = valid_new_property();
        p.price = Decimal::from(123_456_789_012_345i64);
        p.bathrooms = Some(Decimal::from(150));
        p.hoa = Some(Decimal::from(2_000_000));
        let errs = p.validate(2026).unwrap_err();
        for field in ["price", "bathrooms", "hoa"] {
            assert!(errs.has_field(field), "missing {field}: {errs}");
        }

        let mut p = valid_new_property();
        p.bathrooms = Some(Decimal::new(225, 2));
        p.price = Decimal::new(5400001, 3);
        let errs = p.validate(2026).unwrap_err();
        assert!(errs.has_field("bathrooms"));
        assert!(errs.has_field("price"));

        let mut p = valid_new_property();
        p.price = Decimal::new(999_999_999_999, 2);
        p.bathrooms = Some(Decimal::new(250, 2));
        assert!(p.validate(2026).is_ok());
    }

    #[test]
    fn deserializes_amounts_from_strings_and_numbers() {
        let p: NewProperty = serde_json::from_value(serde_json::json!({
            "address": "42 Elm St",
            "city": "Boulder",
            "state": "CO",
            "zipCode": "80302",
            "price": "540000.50",
            "bathrooms": 2.5,
            "hoa": 125,
        }))
        .unwrap();
        assert_eq!(p.price, Decimal::new(54000050, 2));
        assert_eq!(p.bathrooms, Some(Decimal::new(25, 1)));
        assert_eq!(p.hoa, Some(Decimal::from(125)));

        let bad = serde_json::json!({
            "address": "42 Elm St",
            "city": "Boulder",
            "state": "CO",
            "zipCode": "80302",
            "price": "$540,000",
        });
        assert!(serde_json::from_value::<NewProperty>(bad).is_err());
    }

    #[test]
    fn parsed_property_serializes_camel_case() {
        let parsed = ParsedProperty {
            address: "1 Main".to_string(),
            city: "Denver".to_string(),
            state: "CO".to_string(),
            zip_code: "80205".to_string(),
            price: Decimal::new(62500050, 2),
            bedrooms: None,
            bathrooms: None,
            hoa: None,
            sqft: None,
            year_built: Some(2000),
            lot_size: None,
            property_type: None,
            description: None,
            source_url: "https://zillow.com/x".to_string(),
            source_logo: SourceSite::Zillow,
            degraded: true,
            fallback_reason: Some(FallbackReason::CredentialMissing),
        };
        let v = serde_json::to_value(&parsed).unwrap();
        assert_eq!(v["zipCode"], "80205");
        assert_eq!(v["price"], "625000.50");
        assert_eq!(v["yearBuilt"], 2000);
        assert_eq!(v["sourceLogo"], "zillow");
        assert_eq!(v["fallbackReason"], "credential_missing");

        // A parse result posted back to `property.create` deserializes directly.
        let new: NewProperty = serde_json::from_value(v).unwrap();
        assert_eq!(new.source_logo, Some(SourceSite::Zillow));
    }
}
