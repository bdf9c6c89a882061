//! Shared text-to-speech client library
//!
//! Sends one piece of text to a named cloud speech service (Azure, OpenAI or
//! Google), writes the returned MP3 audio to disk and reports how long the
//! round trip took.
//!
//! ```no_run
//! use std::path::Path;
//! use speech_client::{CredentialSources, Dispatcher, EnvResolver, SynthesisRequest, VoiceSpec};
//!
//! # async fn run() -> speech_client::Result<()> {
//! let dispatcher = Dispatcher::new(EnvResolver::new(CredentialSources::default()));
//! let voice = VoiceSpec::openai("tts-1", "nova", "pt-br")?;
//! let request = SynthesisRequest::in_dir("Olá mundo", voice, Path::new("Audios"))?;
//! let result = dispatcher.synthesize(&request).await;
//! println!("{:?} in {:?}", result.outcome, result.elapsed);
//! # Ok(())
//! # }
//! ```

pub mod credentials;
pub mod dispatcher;
pub mod error;
pub mod provider;
pub mod providers;
pub mod request;
pub mod voice;

pub use credentials::{CredentialSources, Credentials};
pub use dispatcher::{DEFAULT_TIMEOUT, Dispatcher};
pub use error::{FailureKind, Result, SpeechError};
pub use provider::{ProviderResolver, SpeechProvider};
pub use providers::{Endpoints, EnvResolver, get_provider};
pub use request::{Outcome, Provider, SynthesisRequest, SynthesisResult};
pub use voice::{AudioEncoding, SsmlGender, VoiceSpec};
