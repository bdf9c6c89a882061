//! Provider-specific voice selection

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, SpeechError};
use crate::request::Provider;

/// Output encoding requested from every provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AudioEncoding {
    #[default]
    Mp3,
}

impl AudioEncoding {
    pub fn extension(&self) -> &'static str {
        match self {
            AudioEncoding::Mp3 => "mp3",
        }
    }
}

/// SSML voice gender understood by Google Cloud Text-to-Speech
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SsmlGender {
    #[default]
    Female,
    Male,
    Neutral,
    SsmlVoiceGenderUnspecified,
}

impl SsmlGender {
    pub fn as_str(&self) -> &'static str {
        match self {
            SsmlGender::Female => "FEMALE",
            SsmlGender::Male => "MALE",
            SsmlGender::Neutral => "NEUTRAL",
            SsmlGender::SsmlVoiceGenderUnspecified => "SSML_VOICE_GENDER_UNSPECIFIED",
        }
    }
}

impl fmt::Display for SsmlGender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SsmlGender {
    type Err = SpeechError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FEMALE" => Ok(SsmlGender::Female),
            "MALE" => Ok(SsmlGender::Male),
            "NEUTRAL" => Ok(SsmlGender::Neutral),
            "" | "SSML_VOICE_GENDER_UNSPECIFIED" => Ok(SsmlGender::SsmlVoiceGenderUnspecified),
            other => Err(SpeechError::InvalidRequest(format!(
                "Unknown voice gender: {}. Available: FEMALE, MALE, NEUTRAL",
                other
            ))),
        }
    }
}

/// Voice configuration, one variant per provider.
///
/// Values are opaque to this crate and validated by the remote service;
/// the constructors only reject empty fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceSpec {
    Azure {
        /// Neural voice name, e.g. `pt-BR-FranciscaNeural`
        voice_name: String,
    },
    OpenAI {
        /// Model identifier, e.g. `tts-1`
        model: String,
        /// Voice name, e.g. `nova`
        voice: String,
        /// Language hint, e.g. `pt-br`
        language: String,
    },
    Google {
        /// BCP-47 language code, e.g. `pt-BR`
        language_code: String,
        /// Voice name, e.g. `pt-BR-Wavenet-A`
        voice_name: String,
        gender: SsmlGender,
    },
}

fn require(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SpeechError::InvalidRequest(format!(
            "Voice field '{}' must not be empty",
            field
        )));
    }
    Ok(trimmed.to_string())
}

impl VoiceSpec {
    pub fn azure(voice_name: &str) -> Result<Self> {
        Ok(VoiceSpec::Azure {
            voice_name: require("voice_name", voice_name)?,
        })
    }

    pub fn openai(model: &str, voice: &str, language: &str) -> Result<Self> {
        Ok(VoiceSpec::OpenAI {
            model: require("model", model)?,
            voice: require("voice", voice)?,
            language: require("language", language)?,
        })
    }

    pub fn google(language_code: &str, voice_name: &str, gender: SsmlGender) -> Result<Self> {
        Ok(VoiceSpec::Google {
            language_code: require("language_code", language_code)?,
            voice_name: require("voice_name", voice_name)?,
            gender,
        })
    }

    /// The provider this voice belongs to
    pub fn provider(&self) -> Provider {
        match self {
            VoiceSpec::Azure { .. } => Provider::Azure,
            VoiceSpec::OpenAI { .. } => Provider::OpenAI,
            VoiceSpec::Google { .. } => Provider::Google,
        }
    }

    /// Encoding of the audio produced for this voice
    pub fn encoding(&self) -> AudioEncoding {
        AudioEncoding::Mp3
    }

    /// Short speaker label used in output file names
    ///
    /// - Azure: `pt-BR-FranciscaNeural` -> `Francisca`
    /// - OpenAI: `nova` -> `Nova`
    /// - Google: `pt-BR-Wavenet-A` -> `Wavenet-A`
    pub fn file_label(&self) -> String {
        match self {
            VoiceSpec::Azure { voice_name } => {
                let speaker = strip_locale(voice_name);
                speaker
                    .strip_suffix("Neural")
                    .filter(|s| !s.is_empty())
                    .unwrap_or(speaker)
                    .to_string()
            }
            VoiceSpec::OpenAI { voice, .. } => capitalize(voice),
            VoiceSpec::Google { voice_name, .. } => strip_locale(voice_name).to_string(),
        }
    }

    /// Default file name: `<Provider>_<label>.<ext>`
    pub fn file_name(&self) -> String {
        format!(
            "{}_{}.{}",
            self.provider(),
            self.file_label(),
            self.encoding().extension()
        )
    }
}

/// Drop a leading `ll-CC-` locale prefix if present
fn strip_locale(name: &str) -> &str {
    let mut parts = name.splitn(3, '-');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(lang), Some(region), Some(rest))
            if lang.len() == 2 && (2..=4).contains(&region.len()) && !rest.is_empty() =>
        {
            rest
        }
        _ => name,
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
