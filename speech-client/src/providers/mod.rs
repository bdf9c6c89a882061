//! Provider implementations

pub mod azure;
pub mod google;
pub mod google_auth;
#[cfg(test)]
pub mod mock;
pub mod openai;

pub use azure::AzureProvider;
pub use google::GoogleProvider;
pub use google_auth::{ServiceAccountTokenProvider, StaticTokenProvider, TokenProvider};
#[cfg(test)]
pub use mock::{MockProvider, MockResolver};
pub use openai::OpenAIProvider;

use std::sync::Arc;

use crate::credentials::{CredentialSources, Credentials};
use crate::error::Result;
use crate::provider::{ProviderResolver, SpeechProvider};
use crate::request::Provider;

/// Optional endpoint overrides, mainly for pointing providers at test servers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Endpoints {
    pub azure: Option<String>,
    pub openai: Option<String>,
    pub google: Option<String>,
}

/// Create a provider from already loaded credentials
pub fn get_provider(credentials: Credentials, endpoints: &Endpoints) -> Result<Box<dyn SpeechProvider>> {
    match credentials {
        Credentials::Azure { key, region } => Ok(match &endpoints.azure {
            Some(endpoint) => Box::new(AzureProvider::with_endpoint(key, endpoint)),
            None => Box::new(AzureProvider::new(key, &region)),
        }),
        Credentials::OpenAI { api_key } => Ok(Box::new(OpenAIProvider::new(
            api_key,
            endpoints.openai.as_deref(),
        ))),
        Credentials::Google { key_file } => {
            let tokens = ServiceAccountTokenProvider::from_file(&key_file)?;
            Ok(Box::new(GoogleProvider::new(
                Arc::new(tokens),
                endpoints.google.as_deref(),
            )))
        }
    }
}

/// Resolver that reads credentials from the environment on every call
#[derive(Debug, Clone, Default)]
pub struct EnvResolver {
    sources: CredentialSources,
    endpoints: Endpoints,
}

impl EnvResolver {
    pub fn new(sources: CredentialSources) -> Self {
        Self {
            sources,
            endpoints: Endpoints::default(),
        }
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }
}

impl ProviderResolver for EnvResolver {
    fn resolve(&self, provider: Provider) -> Result<Box<dyn SpeechProvider>> {
        let credentials = self.sources.load(provider)?;
        log::debug!("Loaded {} credentials: {:?}", provider, credentials);
        get_provider(credentials, &self.endpoints)
    }
}
