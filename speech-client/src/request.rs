use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{FailureKind, Result, SpeechError};
use crate::voice::VoiceSpec;

/// External speech-synthesis services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Azure,
    OpenAI,
    Google,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::Azure, Provider::OpenAI, Provider::Google];

    /// Name used in file names and report lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Azure => "Azure",
            Provider::OpenAI => "OpenAI",
            Provider::Google => "Google",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Provider {
    type Err = SpeechError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "azure" => Ok(Provider::Azure),
            "openai" => Ok(Provider::OpenAI),
            "google" => Ok(Provider::Google),
            other => Err(SpeechError::InvalidRequest(format!(
                "Unknown provider: {}. Available: azure, openai, google",
                other
            ))),
        }
    }
}

/// One unit of work: text plus voice plus destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisRequest {
    provider: Provider,
    text: String,
    voice: VoiceSpec,
    output_path: PathBuf,
}

impl SynthesisRequest {
    /// Build a request, rejecting empty text and mismatched voices
    pub fn new(
        provider: Provider,
        text: impl Into<String>,
        voice: VoiceSpec,
        output_path: impl Into<PathBuf>,
    ) -> Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(SpeechError::InvalidRequest(
                "Text to synthesize must not be empty".to_string(),
            ));
        }

        if voice.provider() != provider {
            return Err(SpeechError::InvalidRequest(format!(
                "Voice for {} cannot be used with provider {}",
                voice.provider(),
                provider
            )));
        }

        Ok(Self {
            provider,
            text,
            voice,
            output_path: output_path.into(),
        })
    }

    /// Build a request whose file name is derived from the voice, inside `output_dir`
    pub fn in_dir(text: impl Into<String>, voice: VoiceSpec, output_dir: &Path) -> Result<Self> {
        let output_path = output_dir.join(voice.file_name());
        Self::new(voice.provider(), text, voice, output_path)
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn voice(&self) -> &VoiceSpec {
        &self.voice
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }
}

/// How a synthesis call ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success { bytes_written: u64 },
    Failure { kind: FailureKind, message: String },
}

/// Outcome of one request plus its wall-clock duration
#[derive(Debug, Clone)]
pub struct SynthesisResult {
    pub provider: Provider,
    pub output_path: PathBuf,
    pub outcome: Outcome,
    pub elapsed: Duration,
}

impl SynthesisResult {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success { .. })
    }

    /// Failure kind, if the call failed
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match &self.outcome {
            Outcome::Success { .. } => None,
            Outcome::Failure { kind, .. } => Some(*kind),
        }
    }
}
