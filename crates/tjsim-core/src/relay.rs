//! `Relay` trait definition.
//!
//! The relay is the credential-bearing proxy to the facilitator server:
//! every cloud-backed facade operation serializes its parameters into a
//! relay request and normalizes the raw response into a success value or a
//! [`RelayError`]. Uses RPITIT async methods; `recognize` returns a boxed
//! stream (the one persistent-stream exchange).

use std::pin::Pin;

use futures_util::Stream;
use serde_json::Value;

use tjsim_types::error::RelayError;
use tjsim_types::relay::{
    AudioClip, ConverseRequest, DiscoveryQueryRequest, IdentifyLanguageRequest, RelayCreds,
    SeeRequest, SttTokenResponse, ToneRequest, TranslateRequest, TtsTokenResponse,
};

/// Live transcript chunks from a microphone capture stream.
pub type TranscriptStream = Pin<Box<dyn Stream<Item = Result<String, RelayError>> + Send + 'static>>;

/// Port to the facilitator.
///
/// Every method is a single request/response exchange with no retry.
/// Normalization contract: a decoded body carrying an `err` field yields
/// `RelayError::Service` with that value; transport failures yield
/// `RelayError::Transport`. The concrete implementation lives in
/// tjsim-infra (`HttpRelay`).
pub trait Relay: Send + Sync {
    /// Fetch an ephemeral text-to-speech token plus the voice catalog.
    fn tts_token(
        &self,
        creds: RelayCreds,
    ) -> impl std::future::Future<Output = Result<TtsTokenResponse, RelayError>> + Send;

    /// Fetch an ephemeral speech-to-text token.
    fn stt_token(
        &self,
        creds: RelayCreds,
    ) -> impl std::future::Future<Output = Result<SttTokenResponse, RelayError>> + Send;

    fn analyze_tone(
        &self,
        request: ToneRequest,
    ) -> impl std::future::Future<Output = Result<Value, RelayError>> + Send;

    fn translate(
        &self,
        request: TranslateRequest,
    ) -> impl std::future::Future<Output = Result<Value, RelayError>> + Send;

    fn identify_language(
        &self,
        request: IdentifyLanguageRequest,
    ) -> impl std::future::Future<Output = Result<Value, RelayError>> + Send;

    fn converse(
        &self,
        request: ConverseRequest,
    ) -> impl std::future::Future<Output = Result<Value, RelayError>> + Send;

    fn see(
        &self,
        request: SeeRequest,
    ) -> impl std::future::Future<Output = Result<Value, RelayError>> + Send;

    fn discovery_query(
        &self,
        request: DiscoveryQueryRequest,
    ) -> impl std::future::Future<Output = Result<Value, RelayError>> + Send;

    /// Token-gated speech synthesis. Returns the rendered audio clip.
    fn synthesize(
        &self,
        token: &str,
        voice: &str,
        text: &str,
    ) -> impl std::future::Future<Output = Result<AudioClip, RelayError>> + Send;

    /// Token-gated microphone recognition. Opens a persistent transcript
    /// stream; returned as a boxed stream so it can cross the `BoxBot`
    /// object-safety boundary.
    fn recognize(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<TranscriptStream, RelayError>> + Send;
}
