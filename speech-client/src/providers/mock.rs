//! Stub provider for tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::error::{Result, SpeechError};
use crate::provider::{ProviderResolver, SpeechProvider};
use crate::request::Provider;
use crate::voice::VoiceSpec;

type ErrorFactory = Box<dyn Fn() -> SpeechError + Send + Sync>;

enum MockBehavior {
    Succeed(Vec<u8>),
    Fail(ErrorFactory),
}

/// Provider that returns a fixed payload or error without touching the network
pub struct MockProvider {
    provider: Provider,
    behavior: MockBehavior,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl MockProvider {
    pub fn always_succeeds(provider: Provider, audio: impl Into<Vec<u8>>) -> Self {
        Self {
            provider,
            behavior: MockBehavior::Succeed(audio.into()),
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn always_fails<F>(provider: Provider, error: F) -> Self
    where
        F: Fn() -> SpeechError + Send + Sync + 'static,
    {
        Self {
            provider,
            behavior: MockBehavior::Fail(Box::new(error)),
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Sleep before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Shared counter of `synthesize` calls
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl SpeechProvider for MockProvider {
    async fn synthesize(&self, _text: &str, _voice: &VoiceSpec) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.behavior {
            MockBehavior::Succeed(audio) => Ok(audio.clone()),
            MockBehavior::Fail(error) => Err(error()),
        }
    }

    fn provider(&self) -> Provider {
        self.provider
    }
}

/// Resolver handing out registered mock providers.
///
/// Providers that were not registered resolve to a missing-credentials error.
#[derive(Default)]
pub struct MockResolver {
    providers: HashMap<Provider, Arc<MockProvider>>,
}

impl MockResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, mock: MockProvider) -> Self {
        self.providers.insert(mock.provider, Arc::new(mock));
        self
    }
}

impl ProviderResolver for MockResolver {
    fn resolve(&self, provider: Provider) -> Result<Box<dyn SpeechProvider>> {
        match self.providers.get(&provider) {
            Some(mock) => Ok(Box::new(Arc::clone(mock))),
            None => Err(SpeechError::MissingCredentials {
                provider,
                env_var: format!("<mock {}>", provider),
            }),
        }
    }
}
