pub mod fallback;

use crate::config::Settings;
use crate::domain::property::ParsedProperty;
use crate::llm::openai::OpenAiClient;
use crate::llm::ListingLlm;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 45;

/// Turns a listing URL into a [`ParsedProperty`]. Never fails: without a credential it
/// serves the demo record, and any extraction failure degrades to a fallback record.
#[derive(Clone)]
pub struct ListingExtractor {
    llm: Option<Arc<dyn ListingLlm>>,
    timeout: Duration,
}

impl ListingExtractor {
    pub fn new(llm: Option<Arc<dyn ListingLlm>>, timeout: Duration) -> Self {
        Self { llm, timeout }
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let timeout_secs = std::env::var("EXTRACTION_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|s| *s > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let llm: Option<Arc<dyn ListingLlm>> = match settings.extraction_credential() {
            Some(_) => Some(Arc::new(OpenAiClient::from_settings(settings)?)),
            None => {
                tracing::warn!("OPENAI_API_KEY not configured; listing extraction serves demo data");
                None
            }
        };

        Ok(Self::new(llm, Duration::from_secs(timeout_secs)))
    }

    pub fn is_configured(&self) -> bool {
        self.llm.is_some()
    }

    pub async fn parse_url(&self, url: &Url) -> ParsedProperty {
        let Some(llm) = &self.llm else {
            return fallback::demo_listing(url);
        };

        let t0 = std::time::Instant::now();
        let result = match tokio::time::timeout(self.timeout, llm.extract_listing(url)).await {
            Ok(Ok(listing)) => listing.validate_and_into_parsed(url),
            Ok(Err(err)) => Err(err),
            Err(_) => Err(anyhow::anyhow!(
                "extraction timed out after {}s",
                self.timeout.as_secs_f64()
            )),
        };

        match result {
            Ok(parsed) => {
                tracing::info!(
                    %url,
                    provider = llm.provider_name(),
                    source = parsed.source_logo.as_str(),
                    elapsed_ms = t0.elapsed().as_millis(),
                    "listing extracted"
                );
                parsed
            }
            Err(err) => {
                tracing::error!(
                    %url,
                    provider = llm.provider_name(),
                    elapsed_ms = t0.elapsed().as_millis(),
                    error = %format!("{err:#}"),
                    "listing extraction failed; serving fallback record"
                );
                fallback::failed_listing(url, &format!("{err:#}"))
            }
        }
    }
}
