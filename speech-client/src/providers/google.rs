//! Google Cloud Text-to-Speech provider
//!
//! Calls `POST {base_url}/text:synthesize` with a bearer token and decodes
//! the base64 `audioContent` of the response.

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::google_auth::TokenProvider;
use crate::error::{Result, SpeechError};
use crate::provider::SpeechProvider;
use crate::request::Provider;
use crate::voice::VoiceSpec;

const DEFAULT_GOOGLE_TTS_URL: &str = "https://texttospeech.googleapis.com/v1";

/// Provider for Google Cloud Text-to-Speech
pub struct GoogleProvider {
    client: Client,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl GoogleProvider {
    pub fn new(tokens: Arc<dyn TokenProvider>, base_url: Option<&str>) -> Self {
        let base_url = base_url.unwrap_or(DEFAULT_GOOGLE_TTS_URL);

        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest<'a> {
    input: SynthesisInput<'a>,
    voice: VoiceSelectionParams<'a>,
    audio_config: AudioConfig,
}

#[derive(Debug, Serialize)]
struct SynthesisInput<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelectionParams<'a> {
    language_code: &'a str,
    name: &'a str,
    ssml_gender: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
    #[serde(default)]
    status: Option<String>,
}

fn api_error(message: String, status_code: Option<u16>) -> SpeechError {
    SpeechError::ProviderApiError {
        provider: Provider::Google,
        message,
        status_code,
    }
}

#[async_trait]
impl SpeechProvider for GoogleProvider {
    async fn synthesize(&self, text: &str, voice: &VoiceSpec) -> Result<Vec<u8>> {
        let VoiceSpec::Google {
            language_code,
            voice_name,
            gender,
        } = voice
        else {
            return Err(SpeechError::InvalidRequest(format!(
                "Google cannot use a {} voice",
                voice.provider()
            )));
        };

        let token = self.tokens.access_token().await?;

        log::debug!(
            "Google TTS request: language={}, voice={}, gender={}, input_len={}",
            language_code,
            voice_name,
            gender,
            text.len()
        );

        let body = SynthesizeRequest {
            input: SynthesisInput { text },
            voice: VoiceSelectionParams {
                language_code,
                name: voice_name,
                ssml_gender: gender.as_str(),
            },
            audio_config: AudioConfig {
                audio_encoding: "MP3",
            },
        };

        let url = format!("{}/text:synthesize", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .map_err(|e| api_error(format!("Request failed: {}", e), None))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message =
                if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&error_text) {
                    match error_response.error.status {
                        Some(code) => format!("{}: {}", code, error_response.error.message),
                        None => error_response.error.message,
                    }
                } else {
                    error_text
                };

            if status.as_u16() == 401 || status.as_u16() == 403 {
                return Err(SpeechError::AuthenticationFailed {
                    provider: Provider::Google,
                    message,
                });
            }

            return Err(api_error(message, Some(status.as_u16())));
        }

        let parsed: SynthesizeResponse = response.json().await.map_err(|e| {
            api_error(
                format!("Failed to parse response: {}", e),
                Some(status.as_u16()),
            )
        })?;

        let audio = BASE64.decode(parsed.audio_content.as_bytes()).map_err(|e| {
            api_error(
                format!("Invalid audioContent encoding: {}", e),
                Some(status.as_u16()),
            )
        })?;

        log::debug!("Google TTS synthesis complete, {} bytes", audio.len());

        Ok(audio)
    }

    fn provider(&self) -> Provider {
        Provider::Google
    }
}
