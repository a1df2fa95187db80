use crate::domain::contract::LlmListing;
use anyhow::Context;

pub fn extract_json(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.starts_with("```") {
        // Remove Markdown fences (```json ... ``` or ``` ... ```).
        let mut inner = trimmed;
        if let Some(after_first) = inner.splitn(2, '\n').nth(1) {
            inner = after_first;
        }
        if let Some(end) = inner.rfind("```") {
            inner = &inner[..end];
        }
        return Some(inner.trim().to_string());
    }

    // Best-effort extraction: first '{' to last '}'.
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(trimmed[start..=end].trim().to_string())
}

/// Decodes tool-call arguments. Some models wrap them in fences or prose.
pub fn parse_listing(text: &str) -> anyhow::Result<LlmListing> {
    let json_str = extract_json(text).unwrap_or_else(|| text.trim().to_string());
    serde_json::from_str::<LlmListing>(&json_str)
        .with_context(|| format!("tool arguments are not valid JSON for the listing schema: {json_str}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARGS: &str = r#"{"address":"1 Main St","city":"Denver","state":"CO","zipCode":"80205","price":"625000"}"#;

    #[test]
    fn extract_json_handles_fenced_blocks() {
        let body = "{\"a\":1}";
        let fenced = format!("```json\n{body}\n```\n");
        assert_eq!(extract_json(&fenced), Some(body.to_string()));
    }

    #[test]
    fn extract_json_falls_back_to_braces() {
        let s = "prefix {\"a\":1} suffix";
        assert_eq!(extract_json(s), Some("{\"a\":1}".to_string()));
    }

    #[test]
    fn parse_listing_accepts_plain_and_fenced_arguments() {
        assert_eq!(parse_listing(ARGS).unwrap().city, "Denver");
        let fenced = format!("```json\n{ARGS}\n```");
        assert_eq!(parse_listing(&fenced).unwrap().address, "1 Main St");
    }

    #[test]
    fn parse_listing_rejects_missing_required_keys() {
        assert!(parse_listing(r#"{"address":"1 Main St"}"#).is_err());
        assert!(parse_listing("no json here").is_err());
    }
}
