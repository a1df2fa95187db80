use crate::domain::property::{FallbackReason, ParsedProperty, SourceSite};
use rust_decimal::Decimal;
use url::Url;

pub const DEMO_DESCRIPTION: &str = "Demo property data (OpenAI API key not configured)";

/// Fixed record served when no extraction credential is configured.
pub fn demo_listing(url: &Url) -> ParsedProperty {
    ParsedProperty {
        address: "123 Demo Street".to_string(),
        city: "Denver".to_string(),
        state: "CO".to_string(),
        zip_code: "80205".to_string(),
        price: Decimal::from(625_000),
        bedrooms: Some(3),
        bathrooms: Some(Decimal::new(25, 1)),
        hoa: Some(Decimal::ZERO),
        sqft: Some(2100),
        year_built: Some(2015),
        lot_size: None,
        property_type: Some("Single Family".to_string()),
        description: Some(DEMO_DESCRIPTION.to_string()),
        source_url: url.to_string(),
        source_logo: SourceSite::from_url(url),
        degraded: true,
        fallback_reason: Some(FallbackReason::CredentialMissing),
    }
}

/// Placeholder served when extraction was attempted and failed.
pub fn failed_listing(url: &Url, reason: &str) -> ParsedProperty {
    ParsedProperty {
        address: "123 Example Street (Error)".to_string(),
        city: "Denver".to_string(),
        state: "CO".to_string(),
        zip_code: "80205".to_string(),
        price: Decimal::from(625_000),
        bedrooms: Some(3),
        bathrooms: Some(Decimal::new(25, 1)),
        hoa: Some(Decimal::ZERO),
        sqft: Some(2100),
        year_built: None,
        lot_size: None,
        property_type: Some("Unknown".to_string()),
        description: Some(format!("Failed to parse listing: {reason}")),
        source_url: url.to_string(),
        source_logo: SourceSite::from_url(url),
        degraded: true,
        fallback_reason: Some(FallbackReason::ExtractionFailed),
    }
}
