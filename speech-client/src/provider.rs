//! Core provider trait

use async_trait::async_trait;

use crate::error::Result;
use crate::request::Provider;
use crate::voice::VoiceSpec;

/// Trait for speech synthesis providers.
///
/// One implementation per external service; the dispatcher only sees this trait.
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Synthesize `text` with `voice`, returning the complete audio payload
    async fn synthesize(&self, text: &str, voice: &VoiceSpec) -> Result<Vec<u8>>;

    /// Which service this provider talks to
    fn provider(&self) -> Provider;

    /// Get the provider name for display
    fn name(&self) -> &'static str {
        self.provider().as_str()
    }
}

/// Resolves a ready-to-use provider client for each call.
///
/// Implementations read credentials at resolve time so that every call
/// sees the current environment.
pub trait ProviderResolver: Send + Sync {
    fn resolve(&self, provider: Provider) -> Result<Box<dyn SpeechProvider>>;
}

#[async_trait]
impl<T: SpeechProvider + ?Sized> SpeechProvider for std::sync::Arc<T> {
    async fn synthesize(&self, text: &str, voice: &VoiceSpec) -> Result<Vec<u8>> {
        (**self).synthesize(text, voice).await
    }

    fn provider(&self) -> Provider {
        (**self).provider()
    }
}
