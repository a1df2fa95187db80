pub mod error;
pub mod json;
pub mod openai;

use crate::domain::contract::LlmListing;
use url::Url;

/// A completion service that can read a listing page and return its fields.
#[async_trait::async_trait]
pub trait ListingLlm: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn extract_listing(&self, url: &Url) -> anyhow::Result<LlmListing>;
}
