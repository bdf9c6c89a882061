// tts-bench configuration management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use speech_client::credentials::{
    DEFAULT_AZURE_KEY_ENV, DEFAULT_AZURE_REGION_ENV, DEFAULT_GOOGLE_CREDENTIALS_PATH,
    DEFAULT_OPENAI_KEY_ENV,
};
use speech_client::{CredentialSources, Provider, SsmlGender, VoiceSpec};
use std::fs;
use std::path::PathBuf;

/// Sample text synthesized when none is given
pub const DEFAULT_TEXT: &str = "\nSíntese de fala é o processo de produção artificial de fala humana. \n\
Um sistema informático utilizado para este propósito é denominado sintetizador de fala, \
e pode ser implementado em software ou hardware.\n";

const DEFAULT_OUTPUT_DIR: &str = "Audios";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Keys accepted by `config set`
pub const KEYS: &[&str] = &[
    "output_dir",
    "timeout_secs",
    "text",
    "azure.voice",
    "azure.key_env",
    "azure.region_env",
    "openai.model",
    "openai.voice",
    "openai.language",
    "openai.api_key_env",
    "google.language_code",
    "google.voice",
    "google.gender",
    "google.credentials_path",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsBenchConfig {
    /// Directory the MP3 files are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Per-provider timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Text to synthesize
    #[serde(default = "default_text")]
    pub text: String,

    #[serde(default)]
    pub azure: AzureConfig,

    #[serde(default)]
    pub openai: OpenAIConfig,

    #[serde(default)]
    pub google: GoogleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzureConfig {
    #[serde(default = "default_azure_voice")]
    pub voice: String,

    /// Environment variable holding the subscription key
    #[serde(default = "default_azure_key_env")]
    pub key_env: String,

    /// Environment variable holding the region, e.g. brazilsouth
    #[serde(default = "default_azure_region_env")]
    pub region_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIConfig {
    #[serde(default = "default_openai_model")]
    pub model: String,

    #[serde(default = "default_openai_voice")]
    pub voice: String,

    /// Sent as the `lang` query parameter
    #[serde(default = "default_openai_language")]
    pub language: String,

    #[serde(default = "default_openai_api_key_env")]
    pub api_key_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    #[serde(default = "default_google_language_code")]
    pub language_code: String,

    #[serde(default = "default_google_voice")]
    pub voice: String,

    #[serde(default = "default_google_gender")]
    pub gender: SsmlGender,

    /// Service-account JSON key file
    #[serde(default = "default_google_credentials_path")]
    pub credentials_path: String,
}

fn default_output_dir() -> String {
    DEFAULT_OUTPUT_DIR.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_text() -> String {
    DEFAULT_TEXT.to_string()
}

fn default_azure_voice() -> String {
    "pt-BR-FranciscaNeural".to_string()
}

fn default_azure_key_env() -> String {
    DEFAULT_AZURE_KEY_ENV.to_string()
}

fn default_azure_region_env() -> String {
    DEFAULT_AZURE_REGION_ENV.to_string()
}

fn default_openai_model() -> String {
    "tts-1".to_string()
}

fn default_openai_voice() -> String {
    "nova".to_string()
}

fn default_openai_language() -> String {
    "pt-br".to_string()
}

fn default_openai_api_key_env() -> String {
    DEFAULT_OPENAI_KEY_ENV.to_string()
}

fn default_google_language_code() -> String {
    "pt-BR".to_string()
}

fn default_google_voice() -> String {
    "pt-BR-Wavenet-A".to_string()
}

fn default_google_gender() -> SsmlGender {
    SsmlGender::Female
}

fn default_google_credentials_path() -> String {
    DEFAULT_GOOGLE_CREDENTIALS_PATH.to_string()
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            voice: default_azure_voice(),
            key_env: default_azure_key_env(),
            region_env: default_azure_region_env(),
        }
    }
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            model: default_openai_model(),
            voice: default_openai_voice(),
            language: default_openai_language(),
            api_key_env: default_openai_api_key_env(),
        }
    }
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            language_code: default_google_language_code(),
            voice: default_google_voice(),
            gender: default_google_gender(),
            credentials_path: default_google_credentials_path(),
        }
    }
}

impl Default for TtsBenchConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            timeout_secs: default_timeout_secs(),
            text: default_text(),
            azure: AzureConfig::default(),
            openai: OpenAIConfig::default(),
            google: GoogleConfig::default(),
        }
    }
}

impl TtsBenchConfig {
    /// Get the config file path: ~/.config/cli-programs/tts-bench.toml
    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("cli-programs")
            .join("tts-bench.toml"))
    }

    /// Load config from file, returning default if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: TtsBenchConfig =
            toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Update one dotted key, e.g. `openai.voice`
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if value.trim().is_empty() {
            anyhow::bail!("Value for {} must not be empty", key);
        }

        let value_string = value.to_string();
        match key {
            "output_dir" => self.output_dir = value_string,
            "timeout_secs" => {
                let secs: u64 = value
                    .parse()
                    .with_context(|| format!("Invalid timeout: {}", value))?;
                if secs == 0 {
                    anyhow::bail!("timeout_secs must be greater than zero");
                }
                self.timeout_secs = secs;
            }
            "text" => self.text = value_string,
            "azure.voice" => self.azure.voice = value_string,
            "azure.key_env" => self.azure.key_env = value_string,
            "azure.region_env" => self.azure.region_env = value_string,
            "openai.model" => self.openai.model = value_string,
            "openai.voice" => self.openai.voice = value_string,
            "openai.language" => self.openai.language = value_string,
            "openai.api_key_env" => self.openai.api_key_env = value_string,
            "google.language_code" => self.google.language_code = value_string,
            "google.voice" => self.google.voice = value_string,
            "google.gender" => self.google.gender = value.parse()?,
            "google.credentials_path" => self.google.credentials_path = value_string,
            _ => anyhow::bail!("Unknown config key: {}. Available: {}", key, KEYS.join(", ")),
        }
        Ok(())
    }

    /// Where each provider's credentials come from
    pub fn credential_sources(&self) -> CredentialSources {
        CredentialSources {
            azure_key_env: self.azure.key_env.clone(),
            azure_region_env: self.azure.region_env.clone(),
            openai_key_env: self.openai.api_key_env.clone(),
            google_credentials_path: PathBuf::from(&self.google.credentials_path),
        }
    }

    /// Voice configured for `provider`
    pub fn voice(&self, provider: Provider) -> speech_client::Result<VoiceSpec> {
        match provider {
            Provider::Azure => VoiceSpec::azure(&self.azure.voice),
            Provider::OpenAI => VoiceSpec::openai(
                &self.openai.model,
                &self.openai.voice,
                &self.openai.language,
            ),
            Provider::Google => VoiceSpec::google(
                &self.google.language_code,
                &self.google.voice,
                self.google.gender,
            ),
        }
    }
}
