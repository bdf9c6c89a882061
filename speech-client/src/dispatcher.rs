//! Speech synthesis dispatcher
//!
//! Runs one synthesis request end to end: resolve the provider client,
//! perform a single round trip under a timeout, persist the audio and
//! report the outcome with its elapsed time. Nothing is retried.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use futures::future::join_all;

use crate::error::{Result, SpeechError};
use crate::provider::ProviderResolver;
use crate::request::{Outcome, SynthesisRequest, SynthesisResult};

/// Applied to every provider call when no other timeout is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

pub struct Dispatcher {
    resolver: Box<dyn ProviderResolver>,
    timeout: Duration,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub fn new(resolver: impl ProviderResolver + 'static) -> Self {
        Self {
            resolver: Box::new(resolver),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Perform one synthesis round trip and write the audio to the request's path.
    ///
    /// Never returns an error: failures are folded into the result so that
    /// callers can keep going with the remaining requests.
    pub async fn synthesize(&self, request: &SynthesisRequest) -> SynthesisResult {
        let provider = request.provider();
        let start = Instant::now();

        let outcome = match self.run(request).await {
            Ok(bytes_written) => Outcome::Success { bytes_written },
            Err(e) => Outcome::Failure {
                kind: e.kind(),
                message: e.to_string(),
            },
        };

        let elapsed = start.elapsed();

        match &outcome {
            Outcome::Success { bytes_written } => log::info!(
                "{} wrote {} bytes to {} in {:.3}s",
                provider,
                bytes_written,
                request.output_path().display(),
                elapsed.as_secs_f64()
            ),
            Outcome::Failure { kind, message } => log::warn!(
                "{} failed after {:.3}s ({}): {}",
                provider,
                elapsed.as_secs_f64(),
                kind,
                message
            ),
        }

        SynthesisResult {
            provider,
            output_path: request.output_path().to_path_buf(),
            outcome,
            elapsed,
        }
    }

    /// Run every request, sequentially or concurrently.
    ///
    /// Results come back in request order. A failed request does not stop
    /// the others.
    pub async fn synthesize_all(
        &self,
        requests: &[SynthesisRequest],
        parallel: bool,
    ) -> Vec<SynthesisResult> {
        self.synthesize_all_with(requests, parallel, |_| {}).await
    }

    /// Like [`Dispatcher::synthesize_all`], handing each result to `on_result`.
    ///
    /// When sequential, `on_result` runs as soon as each call ends and before
    /// the next one starts. When parallel, it runs in request order once all
    /// calls are done.
    pub async fn synthesize_all_with<F>(
        &self,
        requests: &[SynthesisRequest],
        parallel: bool,
        mut on_result: F,
    ) -> Vec<SynthesisResult>
    where
        F: FnMut(&SynthesisResult),
    {
        if parallel {
            let results =
                join_all(requests.iter().map(|request| self.synthesize(request))).await;
            results.iter().for_each(&mut on_result);
            return results;
        }

        let mut results = Vec::with_capacity(requests.len());
        for request in requests {
            let result = self.synthesize(request).await;
            on_result(&result);
            results.push(result);
        }
        results
    }

    async fn run(&self, request: &SynthesisRequest) -> Result<u64> {
        let provider = self.resolver.resolve(request.provider())?;

        log::debug!(
            "Synthesizing {} chars with {}",
            request.text().chars().count(),
            provider.name()
        );

        let audio = tokio::time::timeout(
            self.timeout,
            provider.synthesize(request.text(), request.voice()),
        )
        .await
        .map_err(|_| SpeechError::Timeout {
            provider: request.provider(),
            after: self.timeout,
        })??;

        if audio.is_empty() {
            return Err(SpeechError::UnexpectedState {
                provider: request.provider(),
                detail: "provider returned an empty audio payload".to_string(),
            });
        }

        let path = request.output_path().to_path_buf();
        tokio::task::spawn_blocking(move || write_audio(&path, &audio))
            .await
            .map_err(|e| SpeechError::Io(std::io::Error::other(e)))?
    }
}

/// Write `audio` to `path` atomically.
///
/// The bytes go to a temporary file next to `path` which is renamed over it
/// once fully written, so a failed write leaves `path` untouched. The parent
/// directory must already exist.
pub fn write_audio(path: &Path, audio: &[u8]) -> Result<u64> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut file = tempfile::Builder::new()
        .prefix(".tts-")
        .suffix(".part")
        .tempfile_in(&dir)?;

    file.write_all(audio)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| SpeechError::Io(e.error))?;

    Ok(audio.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use crate::providers::{MockProvider, MockResolver};
    use crate::request::Provider;
    use crate::voice::{SsmlGender, VoiceSpec};
    use std::sync::atomic::Ordering;
    use tempfile::TempDir;

    const ID3_STUB: [u8; 4] = [0x49, 0x44, 0x33, 0x04];

    fn requests_in(dir: &Path, text: &str) -> Vec<SynthesisRequest> {
        vec![
            SynthesisRequest::in_dir(text, VoiceSpec::azure("pt-BR-FranciscaNeural").unwrap(), dir)
                .unwrap(),
            SynthesisRequest::in_dir(text, VoiceSpec::openai("tts-1", "nova", "pt-br").unwrap(), dir)
                .unwrap(),
            SynthesisRequest::in_dir(
                text,
                VoiceSpec::google("pt-BR", "pt-BR-Wavenet-A", SsmlGender::Female).unwrap(),
                dir,
            )
            .unwrap(),
        ]
    }

    fn all_succeed() -> MockResolver {
        MockResolver::new()
            .with(MockProvider::always_succeeds(Provider::Azure, b"azure-mp3".to_vec()))
            .with(MockProvider::always_succeeds(Provider::OpenAI, b"openai-mp3".to_vec()))
            .with(MockProvider::always_succeeds(Provider::Google, b"google-mp3".to_vec()))
    }

    #[tokio::test]
    async fn test_all_providers_write_stub_payload() {
        let dir = TempDir::new().unwrap();
        let dispatcher = Dispatcher::new(all_succeed());

        let results = dispatcher
            .synthesize_all(&requests_in(dir.path(), "Olá mundo"), false)
            .await;

        let expected: [(&str, &[u8]); 3] = [
            ("Azure_Francisca.mp3", b"azure-mp3"),
            ("OpenAI_Nova.mp3", b"openai-mp3"),
            ("Google_Wavenet-A.mp3", b"google-mp3"),
        ];

        for (result, (file_name, payload)) in results.iter().zip(expected) {
            assert_eq!(
                result.outcome,
                Outcome::Success {
                    bytes_written: payload.len() as u64
                }
            );
            let on_disk = std::fs::read(dir.path().join(file_name)).unwrap();
            assert_eq!(on_disk, payload);
        }
    }

    #[tokio::test]
    async fn test_openai_scenario_writes_exact_bytes() {
        let dir = TempDir::new().unwrap();
        let output_path = dir.path().join("Audios").join("OpenAI_Nova.mp3");
        std::fs::create_dir_all(output_path.parent().unwrap()).unwrap();

        let dispatcher = Dispatcher::new(
            MockResolver::new().with(MockProvider::always_succeeds(Provider::OpenAI, ID3_STUB)),
        );
        let request = SynthesisRequest::new(
            Provider::OpenAI,
            "Olá mundo",
            VoiceSpec::openai("tts-1", "nova", "pt-br").unwrap(),
            &output_path,
        )
        .unwrap();

        let result = dispatcher.synthesize(&request).await;

        assert_eq!(result.outcome, Outcome::Success { bytes_written: 4 });
        assert_eq!(std::fs::read(&output_path).unwrap(), ID3_STUB);
    }

    #[tokio::test]
    async fn test_missing_credentials_is_auth_error_without_file() {
        let dir = TempDir::new().unwrap();
        let dispatcher = Dispatcher::new(MockResolver::new());

        for request in requests_in(dir.path(), "Olá") {
            let result = dispatcher.synthesize(&request).await;
            assert_eq!(result.failure_kind(), Some(FailureKind::AuthError));
            assert!(!request.output_path().exists());
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_azure_cancellation_is_provider_error_without_file() {
        let dir = TempDir::new().unwrap();
        let dispatcher = Dispatcher::new(MockResolver::new().with(MockProvider::always_fails(
            Provider::Azure,
            || SpeechError::Canceled {
                provider: Provider::Azure,
                reason: "Error".to_string(),
                details: Some("bad key".to_string()),
            },
        )));
        let request = &requests_in(dir.path(), "Olá")[0];

        let result = dispatcher.synthesize(request).await;

        match &result.outcome {
            Outcome::Failure { kind, message } => {
                assert_eq!(*kind, FailureKind::ProviderError);
                assert!(message.contains("bad key"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert!(!request.output_path().exists());
    }

    #[tokio::test]
    async fn test_provider_reason_is_passed_through_unmodified() {
        let dir = TempDir::new().unwrap();
        let reason = "Voice 'pt-BR-Wavenet-Z' does not exist.";
        let dispatcher = Dispatcher::new(MockResolver::new().with(MockProvider::always_fails(
            Provider::Google,
            move || SpeechError::ProviderApiError {
                provider: Provider::Google,
                message: reason.to_string(),
                status_code: Some(400),
            },
        )));
        let request = &requests_in(dir.path(), "Olá")[2];

        let result = dispatcher.synthesize(request).await;

        match result.outcome {
            Outcome::Failure { kind, message } => {
                assert_eq!(kind, FailureKind::ProviderError);
                assert!(message.contains(reason));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_repeated_call_overwrites_with_identical_content() {
        let dir = TempDir::new().unwrap();
        let dispatcher = Dispatcher::new(all_succeed());
        let request = &requests_in(dir.path(), "Olá")[1];

        dispatcher.synthesize(request).await;
        let first = std::fs::read(request.output_path()).unwrap();

        dispatcher.synthesize(request).await;
        let second = std::fs::read(request.output_path()).unwrap();

        assert_eq!(first, second);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_google_failure_does_not_stop_others() {
        let dir = TempDir::new().unwrap();
        let resolver = MockResolver::new()
            .with(MockProvider::always_succeeds(Provider::Azure, b"azure".to_vec()))
            .with(MockProvider::always_succeeds(Provider::OpenAI, b"openai".to_vec()))
            .with(MockProvider::always_fails(Provider::Google, || {
                SpeechError::ProviderApiError {
                    provider: Provider::Google,
                    message: "quota exceeded".to_string(),
                    status_code: Some(429),
                }
            }));
        let dispatcher = Dispatcher::new(resolver);

        for parallel in [false, true] {
            let results = dispatcher
                .synthesize_all(&requests_in(dir.path(), "Olá"), parallel)
                .await;

            assert!(results[0].is_success());
            assert!(results[1].is_success());
            assert_eq!(results[2].failure_kind(), Some(FailureKind::ProviderError));
            assert!(dir.path().join("Azure_Francisca.mp3").exists());
            assert!(dir.path().join("OpenAI_Nova.mp3").exists());
            assert!(!dir.path().join("Google_Wavenet-A.mp3").exists());
        }
    }

    #[tokio::test]
    async fn test_parallel_results_keep_request_order() {
        let dir = TempDir::new().unwrap();
        let resolver = MockResolver::new()
            .with(
                MockProvider::always_succeeds(Provider::Azure, b"a".to_vec())
                    .with_delay(Duration::from_millis(50)),
            )
            .with(MockProvider::always_succeeds(Provider::OpenAI, b"o".to_vec()))
            .with(MockProvider::always_succeeds(Provider::Google, b"g".to_vec()));
        let dispatcher = Dispatcher::new(resolver);

        let results = dispatcher
            .synthesize_all(&requests_in(dir.path(), "Olá"), true)
            .await;

        let providers: Vec<Provider> = results.iter().map(|r| r.provider).collect();
        assert_eq!(providers, Provider::ALL.to_vec());
    }

    #[tokio::test]
    async fn test_slow_provider_times_out() {
        let dir = TempDir::new().unwrap();
        let mock = MockProvider::always_succeeds(Provider::OpenAI, ID3_STUB)
            .with_delay(Duration::from_secs(5));
        let calls = mock.call_counter();
        let dispatcher = Dispatcher::new(MockResolver::new().with(mock))
            .with_timeout(Duration::from_millis(50));
        let request = &requests_in(dir.path(), "Olá")[1];

        let result = dispatcher.synthesize(request).await;

        assert_eq!(result.failure_kind(), Some(FailureKind::Timeout));
        assert!(result.elapsed >= Duration::from_millis(50));
        assert!(!request.output_path().exists());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_calls_leave_existing_file_untouched() {
        let dir = TempDir::new().unwrap();
        let request = &requests_in(dir.path(), "Olá")[1];
        std::fs::write(request.output_path(), b"old").unwrap();

        let rejecting = Dispatcher::new(MockResolver::new().with(MockProvider::always_fails(
            Provider::OpenAI,
            || SpeechError::ProviderApiError {
                provider: Provider::OpenAI,
                message: "model overloaded".to_string(),
                status_code: Some(503),
            },
        )));
        let slow = Dispatcher::new(MockResolver::new().with(
            MockProvider::always_succeeds(Provider::OpenAI, ID3_STUB)
                .with_delay(Duration::from_secs(5)),
        ))
        .with_timeout(Duration::from_millis(20));
        let unauthenticated = Dispatcher::new(MockResolver::new());

        let cases = [
            (rejecting, FailureKind::ProviderError),
            (slow, FailureKind::Timeout),
            (unauthenticated, FailureKind::AuthError),
        ];

        for (dispatcher, expected) in cases {
            let result = dispatcher.synthesize(request).await;
            assert_eq!(result.failure_kind(), Some(expected));
            assert_eq!(std::fs::read(request.output_path()).unwrap(), b"old");
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_sequential_results_are_reported_as_each_call_ends() {
        let dir = TempDir::new().unwrap();
        let azure = MockProvider::always_succeeds(Provider::Azure, b"a".to_vec());
        let openai = MockProvider::always_succeeds(Provider::OpenAI, b"o".to_vec());
        let google = MockProvider::always_fails(Provider::Google, || SpeechError::Timeout {
            provider: Provider::Google,
            after: Duration::from_secs(1),
        });
        let later_calls = [openai.call_counter(), google.call_counter()];
        let dispatcher =
            Dispatcher::new(MockResolver::new().with(azure).with(openai).with(google));

        let mut reported = Vec::new();
        let results = dispatcher
            .synthesize_all_with(&requests_in(dir.path(), "Olá"), false, |result| {
                let started: usize = later_calls.iter().map(|c| c.load(Ordering::SeqCst)).sum();
                reported.push((result.provider, started));
            })
            .await;

        assert_eq!(
            reported,
            vec![
                (Provider::Azure, 0),
                (Provider::OpenAI, 1),
                (Provider::Google, 2)
            ]
        );
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn test_parallel_results_are_reported_in_request_order() {
        let dir = TempDir::new().unwrap();
        let dispatcher = Dispatcher::new(all_succeed());

        let mut reported = Vec::new();
        dispatcher
            .synthesize_all_with(&requests_in(dir.path(), "Olá"), true, |result| {
                reported.push(result.provider)
            })
            .await;

        assert_eq!(reported, Provider::ALL.to_vec());
    }

    #[tokio::test]
    async fn test_missing_output_directory_is_io_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("does-not-exist");
        let dispatcher = Dispatcher::new(all_succeed());
        let request = &requests_in(&missing, "Olá")[0];

        let result = dispatcher.synthesize(request).await;

        assert_eq!(result.failure_kind(), Some(FailureKind::IoError));
        assert!(!missing.exists());
    }

    #[tokio::test]
    async fn test_empty_payload_is_provider_error() {
        let dir = TempDir::new().unwrap();
        let dispatcher = Dispatcher::new(
            MockResolver::new().with(MockProvider::always_succeeds(Provider::OpenAI, Vec::new())),
        );
        let request = &requests_in(dir.path(), "Olá")[1];

        let result = dispatcher.synthesize(request).await;

        assert_eq!(result.failure_kind(), Some(FailureKind::ProviderError));
        assert!(!request.output_path().exists());
    }

    #[test]
    fn test_write_audio_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.mp3");

        assert_eq!(write_audio(&path, &ID3_STUB).unwrap(), 4);

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("out.mp3")]);
    }
}
