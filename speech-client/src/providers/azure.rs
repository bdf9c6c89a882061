//! Azure Cognitive Services Speech provider
//!
//! Uses the REST synthesis endpoint:
//! `POST https://{region}.tts.speech.microsoft.com/cognitiveservices/v1`
//! with an SSML body selecting the neural voice.
//!
//! The service's answer is first folded into an [`AzureSynthesisResult`]
//! carrying one of two terminal reasons (completed or canceled), which is
//! then interpreted into audio bytes or an error.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::fmt;

use crate::error::{Result, SpeechError};
use crate::provider::SpeechProvider;
use crate::request::Provider;
use crate::voice::VoiceSpec;

const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const OUTPUT_FORMAT_HEADER: &str = "X-Microsoft-OutputFormat";
const MP3_OUTPUT_FORMAT: &str = "audio-24khz-96kbitrate-mono-mp3";
const USER_AGENT: &str = "tts-bench";

/// Provider for Azure neural voices
pub struct AzureProvider {
    client: Client,
    subscription_key: String,
    endpoint: String,
}

impl AzureProvider {
    /// Create a provider for the given subscription key and region
    pub fn new(subscription_key: String, region: &str) -> Self {
        let endpoint = format!(
            "https://{}.tts.speech.microsoft.com/cognitiveservices/v1",
            region.trim().to_lowercase()
        );
        Self::with_endpoint(subscription_key, &endpoint)
    }

    /// Create a provider against an explicit endpoint URL
    pub fn with_endpoint(subscription_key: String, endpoint: &str) -> Self {
        Self {
            client: Client::new(),
            subscription_key,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Terminal reason of a synthesis call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultReason {
    SynthesizingAudioCompleted,
    Canceled,
}

/// Why a synthesis was canceled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancellationReason {
    Error,
    AuthenticationFailure,
    EndOfStream,
    CancelledByUser,
}

impl fmt::Display for CancellationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CancellationReason::Error => "Error",
            CancellationReason::AuthenticationFailure => "AuthenticationFailure",
            CancellationReason::EndOfStream => "EndOfStream",
            CancellationReason::CancelledByUser => "CancelledByUser",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancellationDetails {
    pub reason: CancellationReason,
    pub error_details: Option<String>,
}

/// Result of one Azure synthesis call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AzureSynthesisResult {
    pub reason: ResultReason,
    pub audio: Vec<u8>,
    pub cancellation: Option<CancellationDetails>,
}

impl AzureSynthesisResult {
    pub fn completed(audio: Vec<u8>) -> Self {
        Self {
            reason: ResultReason::SynthesizingAudioCompleted,
            audio,
            cancellation: None,
        }
    }

    pub fn canceled(reason: CancellationReason, error_details: Option<String>) -> Self {
        Self {
            reason: ResultReason::Canceled,
            audio: Vec::new(),
            cancellation: Some(CancellationDetails {
                reason,
                error_details,
            }),
        }
    }

    /// Fold an HTTP status and body into a synthesis result
    pub fn from_response(status: StatusCode, body: Vec<u8>) -> Self {
        if status.is_success() {
            return Self::completed(body);
        }

        let text = String::from_utf8_lossy(&body).trim().to_string();
        let details = if text.is_empty() {
            Some(format!("HTTP {}", status.as_u16()))
        } else {
            Some(format!("HTTP {}: {}", status.as_u16(), text))
        };

        let reason = match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                CancellationReason::AuthenticationFailure
            }
            _ => CancellationReason::Error,
        };

        Self::canceled(reason, details)
    }

    /// Turn the result into audio bytes or an error
    pub fn into_audio(self) -> Result<Vec<u8>> {
        match (self.reason, self.cancellation) {
            (ResultReason::SynthesizingAudioCompleted, _) if !self.audio.is_empty() => {
                Ok(self.audio)
            }
            (ResultReason::SynthesizingAudioCompleted, _) => Err(SpeechError::UnexpectedState {
                provider: Provider::Azure,
                detail: "synthesis completed without audio data".to_string(),
            }),
            (ResultReason::Canceled, Some(details)) => match details.reason {
                CancellationReason::AuthenticationFailure => {
                    Err(SpeechError::AuthenticationFailed {
                        provider: Provider::Azure,
                        message: details
                            .error_details
                            .unwrap_or_else(|| details.reason.to_string()),
                    })
                }
                reason => Err(SpeechError::Canceled {
                    provider: Provider::Azure,
                    reason: reason.to_string(),
                    details: details.error_details,
                }),
            },
            (ResultReason::Canceled, None) => Err(SpeechError::UnexpectedState {
                provider: Provider::Azure,
                detail: "synthesis canceled without cancellation details".to_string(),
            }),
        }
    }
}

/// Escape text for inclusion in an SSML document
pub fn escape_xml(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&apos;"),
            _ => result.push(c),
        }
    }
    result
}

/// Locale of an Azure voice name (`pt-BR-FranciscaNeural` -> `pt-BR`)
fn voice_language(voice_name: &str) -> String {
    let mut parts = voice_name.splitn(3, '-');
    match (parts.next(), parts.next()) {
        (Some(lang), Some(region)) if !lang.is_empty() && !region.is_empty() => {
            format!("{}-{}", lang, region)
        }
        _ => "en-US".to_string(),
    }
}

/// Build the SSML body selecting `voice_name`
pub fn build_ssml(text: &str, voice_name: &str) -> String {
    format!(
        "<speak version='1.0' xmlns='http://www.w3.org/2001/10/synthesis' xml:lang='{}'><voice name='{}'>{}</voice></speak>",
        voice_language(voice_name),
        escape_xml(voice_name),
        escape_xml(text)
    )
}

#[async_trait]
impl SpeechProvider for AzureProvider {
    async fn synthesize(&self, text: &str, voice: &VoiceSpec) -> Result<Vec<u8>> {
        let VoiceSpec::Azure { voice_name } = voice else {
            return Err(SpeechError::InvalidRequest(format!(
                "Azure cannot use a {} voice",
                voice.provider()
            )));
        };

        log::debug!(
            "Azure TTS request: voice={}, input_len={}",
            voice_name,
            text.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(SUBSCRIPTION_KEY_HEADER, &self.subscription_key)
            .header("Content-Type", "application/ssml+xml")
            .header(OUTPUT_FORMAT_HEADER, MP3_OUTPUT_FORMAT)
            .header("User-Agent", USER_AGENT)
            .body(build_ssml(text, voice_name))
            .send()
            .await
            .map_err(|e| SpeechError::ProviderApiError {
                provider: Provider::Azure,
                message: format!("Request failed: {}", e),
                status_code: None,
            })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| SpeechError::ProviderApiError {
                provider: Provider::Azure,
                message: format!("Failed to read response body: {}", e),
                status_code: Some(status.as_u16()),
            })?;

        AzureSynthesisResult::from_response(status, body.to_vec()).into_audio()
    }

    fn provider(&self) -> Provider {
        Provider::Azure
    }
}
