use crate::config::Settings;
use crate::domain::contract::LlmListing;
use crate::llm::error::LlmDiagnosticsError;
use crate::llm::json;
use crate::llm::ListingLlm;
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

const PROVIDER: &str = "openai";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_MAX_TOKENS: u32 = 1024;
const DEFAULT_TIMEOUT_SECS: u64 = 60;

const TOOL_NAME_EXTRACT: &str = "extractPropertyData";

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl OpenAiClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_openai_api_key()?.to_string();
        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let max_tokens = std::env::var("OPENAI_MAX_TOKENS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DEFAULT_MAX_TOKENS);

        let timeout_secs = std::env::var("OPENAI_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            http,
            api_key,
            base_url,
            model,
            max_tokens,
        })
    }

    async fn create_completion(
        &self,
        req: ChatCompletionRequest,
    ) -> anyhow::Result<(serde_json::Value, ChatCompletionResponse)> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))?,
        );

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let res = self
            .http
            .post(url)
            .headers(headers)
            .json(&req)
            .send()
            .await
            .context("OpenAI request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read OpenAI response body")?;
        if !status.is_success() {
            let raw_response_json = serde_json::from_str::<serde_json::Value>(&text).ok();
            return Err(LlmDiagnosticsError {
                provider: PROVIDER,
                stage: "http",
                detail: format!("status={status}"),
                raw_output: Some(text),
                raw_response_json,
            }
            .into());
        }

        let raw_json = serde_json::from_str::<serde_json::Value>(&text)
            .with_context(|| format!("failed to parse OpenAI response JSON: {text}"))?;
        let parsed = serde_json::from_value::<ChatCompletionResponse>(raw_json.clone())
            .context("failed to decode OpenAI response into ChatCompletionResponse")?;
        Ok((raw_json, parsed))
    }

    fn tools() -> Vec<Tool> {
        let schema = serde_json::json!({
            "type": "object",
            "required": ["address", "city", "state", "zipCode", "price"],
            "properties": {
                "address": {"type": "string", "description": "Street address of the property"},
                "city": {"type": "string", "description": "City name"},
                "state": {"type": "string", "description": "State abbreviation (e.g., CO, CA, TX)"},
                "zipCode": {"type": "string", "description": "ZIP code"},
                "price": {"type": "string", "description": "Listing price as number string without $ or commas"},
                "bedrooms": {"type": "integer", "description": "Number of bedrooms"},
                "bathrooms": {"type": "number", "description": "Number of bathrooms (can be decimal like 2.5)"},
                "hoa": {"type": "string", "description": "Monthly HOA fee as number string, or '0' if none"},
                "sqft": {"type": "integer", "description": "Square footage of the property"},
                "yearBuilt": {"type": "integer", "description": "Year the property was built"},
                "lotSize": {"type": "string", "description": "Lot size (e.g., '0.25 acres', '7,200 sq ft')"},
                "propertyType": {"type": "string", "description": "Type of property (e.g., 'Single Family', 'Condo', 'Townhouse')"},
                "description": {"type": "string", "description": "Brief description or key features of the property"}
            }
        });

        vec![Tool {
            kind: "function",
            function: FunctionDefinition {
                name: TOOL_NAME_EXTRACT,
                description: "Extract structured property data from a real estate listing",
                parameters: schema,
            },
        }]
    }

    fn tool_choice() -> ToolChoice {
        ToolChoice::Function {
            function: NamedFunction {
                name: TOOL_NAME_EXTRACT,
            },
        }
    }

    fn system_prompt() -> String {
        [
            "You are a real estate data extraction assistant.",
            "Given a property listing URL, extract the listing details and return them",
            "through the extractPropertyData function call only.",
            "Rules:",
            "- If a value is not available, omit it or use null",
            "- price: digits only, no $ or commas (\"$650,000\" becomes \"650000\")",
            "- bedrooms and bathrooms are numbers (3, 2.5)",
            "- hoa: monthly fee as a digit string, \"0\" if none",
            "- state: two-letter abbreviation",
            "- Be precise with the address components (street, city, state, zip)",
        ]
        .join("\n")
    }

    fn user_prompt(url: &Url) -> String {
        format!(
            "Extract property information from this listing URL: {url}\n\n\
Include the full address (street, city, state, zip code), listing price, bedrooms, \
bathrooms, square footage, year built, HOA fees, property type, lot size and a brief \
description when available."
        )
    }

    fn response_tool_listing(res: &CreateResult) -> anyhow::Result<LlmListing> {
        let (raw_json, res) = res;
        let message = res.choices.first().map(|c| &c.message);
        let call = message
            .and_then(|m| m.tool_calls.as_deref())
            .and_then(|calls| {
                calls
                    .iter()
                    .find(|c| c.kind == "function" && c.function.name == TOOL_NAME_EXTRACT)
            });

        let Some(call) = call else {
            return Err(LlmDiagnosticsError {
                provider: PROVIDER,
                stage: "tool_call",
                detail: "response contained no extractPropertyData tool call".to_string(),
                raw_output: message.and_then(|m| m.content.clone()),
                raw_response_json: Some(raw_json.clone()),
            }
            .into());
        };

        json::parse_listing(&call.function.arguments).map_err(|err| {
            LlmDiagnosticsError {
                provider: PROVIDER,
                stage: "arguments",
                detail: format!("{err:#}"),
                raw_output: Some(call.function.arguments.clone()),
                raw_response_json: Some(raw_json.clone()),
            }
            .into()
        })
    }
}

type CreateResult = (serde_json::Value, ChatCompletionResponse);

#[async_trait::async_trait]
impl ListingLlm for OpenAiClient {
    fn provider_name(&self) -> &'static str {
        PROVIDER
    }

    async fn extract_listing(&self, url: &Url) -> anyhow::Result<LlmListing> {
        let req = ChatCompletionRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            messages: vec![
                Message {
                    role: "system",
                    content: Self::system_prompt(),
                },
                Message {
                    role: "user",
                    content: Self::user_prompt(url),
                },
            ],
            tools: Self::tools(),
            tool_choice: Self::tool_choice(),
        };

        let res = self.create_completion(req).await?;
        if let Some(reason) = res.1.choices.first().and_then(|c| c.finish_reason.as_deref()) {
            tracing::debug!(%url, finish_reason = reason, "OpenAI completion finished");
        }
        Self::response_tool_listing(&res)
    }
}

#[derive(Debug, Clone, Serialize)]
struct ChatCompletionRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
    tools: Vec<Tool>,
    tool_choice: ToolChoice,
}

#[derive(Debug, Clone, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Clone, Serialize)]
struct Tool {
    #[serde(rename = "type")]
    kind: &'static str,
    function: FunctionDefinition,
}

#[derive(Debug, Clone, Serialize)]
struct FunctionDefinition {
    name: &'static str,
    description: &'static str,
    parameters: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ToolChoice {
    Function { function: NamedFunction },
}

#[derive(Debug, Clone, Serialize)]
struct NamedFunction {
    name: &'static str,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
struct Choice {
    message: AssistantMessage,

    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,

    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Debug, Clone, Deserialize)]
struct ToolCall {
    #[serde(rename = "type", default)]
    kind: String,
    function: FunctionCall,
}

#[derive(Debug, Clone, Deserialize)]
struct FunctionCall {
    #[serde(default)]
    name: String,
    #[serde(default)]
    arguments: String,
}
