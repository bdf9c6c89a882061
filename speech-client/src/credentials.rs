//! Credential lookup from the environment and key files

use std::fmt;
use std::path::PathBuf;

use crate::error::{Result, SpeechError};
use crate::request::Provider;

pub const DEFAULT_AZURE_KEY_ENV: &str = "Azure_Key";
pub const DEFAULT_AZURE_REGION_ENV: &str = "Azure_Region";
pub const DEFAULT_OPENAI_KEY_ENV: &str = "OPENAI_API_KEY";
pub const DEFAULT_GOOGLE_CREDENTIALS_PATH: &str = "client_google.json";

/// Where each provider's credentials come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialSources {
    pub azure_key_env: String,
    pub azure_region_env: String,
    pub openai_key_env: String,
    pub google_credentials_path: PathBuf,
}

impl Default for CredentialSources {
    fn default() -> Self {
        Self {
            azure_key_env: DEFAULT_AZURE_KEY_ENV.to_string(),
            azure_region_env: DEFAULT_AZURE_REGION_ENV.to_string(),
            openai_key_env: DEFAULT_OPENAI_KEY_ENV.to_string(),
            google_credentials_path: PathBuf::from(DEFAULT_GOOGLE_CREDENTIALS_PATH),
        }
    }
}

/// Provider-specific secret bundle
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    Azure { key: String, region: String },
    OpenAI { api_key: String },
    Google { key_file: PathBuf },
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Azure { region, .. } => f
                .debug_struct("Azure")
                .field("key", &"<redacted>")
                .field("region", region)
                .finish(),
            Credentials::OpenAI { .. } => f
                .debug_struct("OpenAI")
                .field("api_key", &"<redacted>")
                .finish(),
            Credentials::Google { key_file } => f
                .debug_struct("Google")
                .field("key_file", key_file)
                .finish(),
        }
    }
}

fn read_env(provider: Provider, env_var: &str) -> Result<String> {
    match std::env::var(env_var) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(SpeechError::MissingCredentials {
            provider,
            env_var: env_var.to_string(),
        }),
    }
}

impl CredentialSources {
    /// Read the credentials for `provider`.
    ///
    /// For Google only the key file's presence is checked here; its
    /// content is parsed when a token is requested.
    pub fn load(&self, provider: Provider) -> Result<Credentials> {
        match provider {
            Provider::Azure => Ok(Credentials::Azure {
                key: read_env(provider, &self.azure_key_env)?,
                region: read_env(provider, &self.azure_region_env)?,
            }),
            Provider::OpenAI => Ok(Credentials::OpenAI {
                api_key: read_env(provider, &self.openai_key_env)?,
            }),
            Provider::Google => {
                if !self.google_credentials_path.is_file() {
                    return Err(SpeechError::AuthenticationFailed {
                        provider,
                        message: format!(
                            "Service account key file not found: {}",
                            self.google_credentials_path.display()
                        ),
                    });
                }
                Ok(Credentials::Google {
                    key_file: self.google_credentials_path.clone(),
                })
            }
        }
    }
}
