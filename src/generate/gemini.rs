//! Google Gemini streaming client.
//!
//! Uses `streamGenerateContent` with server-sent events and hands every text
//! fragment to the caller as it arrives.

use std::io::{BufRead, BufReader};
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::{debug, error, info};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::{prompts, GenerationRequest, Generator};
use crate::config::Config;
use crate::error::GenerationError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StreamRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: &'static str,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StreamChunk {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: Option<u32>,
    #[serde(default)]
    candidates_token_count: Option<u32>,
}

impl StreamChunk {
    fn text(&self) -> String {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|c| c.parts.iter())
            .filter_map(|p| p.text.as_deref())
            .collect()
    }
}

// No Debug derive: the key must never end up in a log line
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    /// Build a client from `config`, reading the key from the environment
    pub fn new(config: &Config) -> Result<Self, GenerationError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| GenerationError::MissingApiKey(config.api_key_env.clone()))?;
        Self::with_key(config, api_key)
    }

    pub fn with_key(config: &Config, api_key: String) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.base_url, self.model
        )
    }

    fn build_request(request: &GenerationRequest) -> StreamRequest {
        let kind = request.kind;
        StreamRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: Some(prompts::system_prompt(kind)),
                    ..Default::default()
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![
                    Part {
                        text: Some(prompts::user_prompt(kind)),
                        ..Default::default()
                    },
                    Part {
                        inline_data: Some(InlineData {
                            mime_type: "application/pdf",
                            data: STANDARD.encode(&request.document.bytes),
                        }),
                        ..Default::default()
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        }
    }
}

/// Parse one SSE line; `None` for anything that is not a data line
fn parse_sse_line(line: &str) -> Option<Result<StreamChunk, serde_json::Error>> {
    let data = line.strip_prefix("data:")?.trim();
    if data.is_empty() || data == "[DONE]" {
        return None;
    }
    Some(serde_json::from_str(data))
}

impl Generator for GeminiClient {
    fn stream(
        &self,
        request: &GenerationRequest,
        on_text: &mut dyn FnMut(&str) -> bool,
    ) -> Result<(), GenerationError> {
        info!(
            "requesting {} from {} for {:?}",
            request.kind, self.model, request.document
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&Self::build_request(request))
            .send()?;

        let status = response.status();
        debug!("gemini responded with {status}");
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            error!("gemini error: {status} - {body}");
            return Err(GenerationError::Backend {
                status: status.as_u16(),
                body,
            });
        }

        for line in BufReader::new(response).lines() {
            let line = line.map_err(GenerationError::Stream)?;
            let Some(chunk) = parse_sse_line(&line) else {
                continue;
            };
            let chunk = chunk?;

            if let Some(usage) = &chunk.usage_metadata {
                debug!(
                    "gemini usage so far - prompt: {:?}, response: {:?}",
                    usage.prompt_token_count, usage.candidates_token_count
                );
            }
            if let Some(reason) = chunk.candidates.iter().find_map(|c| c.finish_reason.as_deref()) {
                debug!("gemini finish reason: {reason}");
            }

            let text = chunk.text();
            if !text.is_empty() && !on_text(&text) {
                return Err(GenerationError::Cancelled);
            }
        }

        Ok(())
    }
}
