//! OpenAI speech provider
//!
//! Calls `POST {base_url}/audio/speech`; the response body is the raw audio.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SpeechError};
use crate::provider::SpeechProvider;
use crate::request::Provider;
use crate::voice::VoiceSpec;

const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com/v1";

/// Provider for the OpenAI text-to-speech API
pub struct OpenAIProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider
    pub fn new(api_key: String, base_url: Option<&str>) -> Self {
        let base_url = base_url.unwrap_or(DEFAULT_OPENAI_API_URL);

        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[async_trait]
impl SpeechProvider for OpenAIProvider {
    async fn synthesize(&self, text: &str, voice: &VoiceSpec) -> Result<Vec<u8>> {
        let VoiceSpec::OpenAI {
            model,
            voice,
            language,
        } = voice
        else {
            return Err(SpeechError::InvalidRequest(format!(
                "OpenAI cannot use a {} voice",
                voice.provider()
            )));
        };

        log::debug!(
            "OpenAI TTS request: model={}, voice={}, lang={}, input_len={}",
            model,
            voice,
            language,
            text.len()
        );

        let body = SpeechRequest {
            model,
            input: text,
            voice,
            response_format: "mp3",
        };

        let url = format!("{}/audio/speech", self.base_url);

        let response = self
            .client
            .post(&url)
            .query(&[("lang", language.as_str())])
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| SpeechError::ProviderApiError {
                provider: Provider::OpenAI,
                message: format!("Request failed: {}", e),
                status_code: None,
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message =
                if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&error_text) {
                    error_response.error.message
                } else {
                    error_text
                };

            if status.as_u16() == 401 {
                return Err(SpeechError::AuthenticationFailed {
                    provider: Provider::OpenAI,
                    message,
                });
            }

            return Err(SpeechError::ProviderApiError {
                provider: Provider::OpenAI,
                message,
                status_code: Some(status.as_u16()),
            });
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| SpeechError::ProviderApiError {
                provider: Provider::OpenAI,
                message: format!("Failed to read response body: {}", e),
                status_code: Some(status.as_u16()),
            })?;

        log::debug!("OpenAI TTS synthesis complete, {} bytes", audio.len());

        Ok(audio.to_vec())
    }

    fn provider(&self) -> Provider {
        Provider::OpenAI
    }
}
