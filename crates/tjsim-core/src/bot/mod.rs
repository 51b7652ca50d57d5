//! The capability facade: the bot API a user script drives.
//!
//! `TjBot` is the single source of truth for "can operation X run given the
//! declared hardware and credentials". Every public operation checks its
//! capability synchronously before any network or hardware side effect, so
//! a failed check is atomic. Cloud-backed operations delegate to the
//! [`Relay`] port; arm/LED/camera/speaker side effects delegate to the
//! hardware collaborator ports.

pub mod boxed;
pub mod capability;
mod listen;
mod speech;

#[cfg(test)]
pub(crate) mod testutil;

pub use capability::Capability;

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::Mutex as AsyncMutex;
use tokio::sync::OnceCell;

use tjsim_types::config::BotConfiguration;
use tjsim_types::credentials::{Credentials, Service};
use tjsim_types::error::{BotError, CapabilityError};
use tjsim_types::hardware::{ArmPosition, Hardware};
use tjsim_types::relay::{
    ConverseInput, ConverseRequest, IdentifyLanguageRequest, RelayApiKey, RelayCreds, SeeRequest,
    ToneRequest, TranslateRequest,
};

use crate::hardware::{Camera, Renderer, Speaker};
use crate::relay::Relay;

use listen::ListenState;
use speech::TtsSession;

/// Receives live transcript chunks (or the stream's fatal error) from the
/// microphone capture stream.
pub type TranscriptSink = Arc<dyn Fn(Result<String, BotError>) + Send + Sync>;

/// Result of a `converse` call: the raw conversation response plus the
/// first response text pulled out for convenience.
#[derive(Debug, Clone, PartialEq)]
pub struct ConverseReply {
    pub object: Value,
    pub description: String,
}

/// The bot's public operation set.
///
/// `TjBot` is the primary implementation; the interception layer provides a
/// second, decorating implementation (`InstrumentedBot`) that behaves
/// identically from the caller's point of view and additionally publishes
/// one event per invocation.
pub trait BotApi: Send + Sync {
    fn wave(&self) -> Result<(), CapabilityError>;

    fn raise_arm(&self) -> Result<(), CapabilityError>;

    fn lower_arm(&self) -> Result<(), CapabilityError>;

    /// Set the LED color. The sentinel `"off"` is normalized to `"grey"`
    /// before being forwarded to the renderer -- a contract of the facade,
    /// not the interception layer.
    fn shine(&self, color: &str) -> Result<(), CapabilityError>;

    /// Colors the simulated LED understands.
    fn shine_colors(&self) -> Vec<&'static str>;

    fn analyze_tone(
        &self,
        text: &str,
    ) -> impl std::future::Future<Output = Result<Value, BotError>> + Send;

    fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> impl std::future::Future<Output = Result<Value, BotError>> + Send;

    fn identify_language(
        &self,
        text: &str,
    ) -> impl std::future::Future<Output = Result<Value, BotError>> + Send;

    /// Send one message to a conversation workspace, threading the stored
    /// per-workspace context through the exchange.
    fn converse(
        &self,
        workspace_id: &str,
        message: &str,
    ) -> impl std::future::Future<Output = Result<ConverseReply, BotError>> + Send;

    /// Synthesize and play `text`; resolves when playback completes.
    fn speak(&self, text: &str)
    -> impl std::future::Future<Output = Result<(), BotError>> + Send;

    /// Start the microphone capture stream, replacing any previous one.
    fn listen(
        &self,
        sink: TranscriptSink,
    ) -> impl std::future::Future<Output = Result<(), BotError>> + Send;

    /// Stop the active capture stream. No-op when none is active.
    fn stop_listening(&self) -> Result<(), CapabilityError>;

    /// Capture a frame and classify it.
    fn see(&self) -> impl std::future::Future<Output = Result<Value, BotError>> + Send;

    /// Capture a frame and return it as a base64 PNG data URL.
    fn take_photo(&self) -> impl std::future::Future<Output = Result<String, BotError>> + Send;
}

/// One simulated bot instance.
///
/// Created once per script execution. Holds the declared hardware set, the
/// nested configuration, the mutable credentials (speech tokens are written
/// back after first acquisition), the per-workspace conversation contexts,
/// and the at-most-one active listen stream.
pub struct TjBot<R, C, S>
where
    R: Relay,
    C: Camera,
    S: Speaker,
{
    hardware: HashSet<Hardware>,
    configuration: BotConfiguration,
    credentials: Mutex<Credentials>,
    contexts: DashMap<String, Value>,
    /// Serializes in-flight `converse` calls per workspace so interleaved
    /// completions cannot reorder context writes.
    workspace_locks: DashMap<String, Arc<AsyncMutex<()>>>,
    tts_session: OnceCell<TtsSession>,
    stt_token: OnceCell<String>,
    listen_state: Arc<Mutex<ListenState>>,
    relay: Arc<R>,
    camera: C,
    speaker: S,
    renderer: Arc<dyn Renderer>,
}

impl<R, C, S> TjBot<R, C, S>
where
    R: Relay,
    C: Camera,
    S: Speaker,
{
    pub fn new(
        hardware: impl IntoIterator<Item = Hardware>,
        configuration: BotConfiguration,
        credentials: Credentials,
        relay: Arc<R>,
        camera: C,
        speaker: S,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        // A token already present on a credentials record seeds the cache
        // and suppresses the fetch for the instance's life.
        let tts_session = OnceCell::new_with(credentials.text_to_speech.as_ref().and_then(|c| {
            c.token.clone().map(|token| TtsSession {
                token,
                voices: c.voices.clone(),
            })
        }));
        let stt_token =
            OnceCell::new_with(credentials.speech_to_text.as_ref().and_then(|c| c.token.clone()));

        Self {
            hardware: hardware.into_iter().collect(),
            configuration,
            credentials: Mutex::new(credentials),
            contexts: DashMap::new(),
            workspace_locks: DashMap::new(),
            tts_session,
            stt_token,
            listen_state: Arc::new(Mutex::new(ListenState::default())),
            relay,
            camera,
            speaker,
            renderer,
        }
    }

    /// Whether a microphone capture stream is currently active.
    pub fn is_listening(&self) -> bool {
        self.listen_state
            .lock()
            .expect("listen state poisoned")
            .is_active()
    }

    /// The stored conversation context for a workspace, if any.
    pub fn conversation_context(&self, workspace_id: &str) -> Option<Value> {
        self.contexts.get(workspace_id).map(|v| v.clone())
    }

    pub(crate) fn with_credentials<T>(&self, f: impl FnOnce(&Credentials) -> T) -> T {
        let creds = self.credentials.lock().expect("credentials poisoned");
        f(&creds)
    }

    pub(crate) fn with_credentials_mut<T>(&self, f: impl FnOnce(&mut Credentials) -> T) -> T {
        let mut creds = self.credentials.lock().expect("credentials poisoned");
        f(&mut creds)
    }

    pub(crate) fn configuration(&self) -> &BotConfiguration {
        &self.configuration
    }

    fn check(&self, capability: Capability) -> Result<(), CapabilityError> {
        self.with_credentials(|creds| {
            capability::assert_capability(capability, &self.hardware, creds)
        })
    }

    /// Build the wire credentials for a username/password service.
    ///
    /// Runs after `check`, so absence only occurs if credentials were
    /// concurrently mutated; it degrades to the same capability error.
    fn require_userpass(
        &self,
        capability: Capability,
        service: Service,
        select: fn(&Credentials) -> Option<&tjsim_types::credentials::UserPassCredentials>,
    ) -> Result<RelayCreds, CapabilityError> {
        self.with_credentials(|creds| select(creds).map(RelayCreds::from_userpass))
            .ok_or(CapabilityError::MissingCredentials {
                op: capability.op(),
                service,
            })
    }
}

impl<R, C, S> BotApi for TjBot<R, C, S>
where
    R: Relay,
    C: Camera,
    S: Speaker,
{
    fn wave(&self) -> Result<(), CapabilityError> {
        self.check(Capability::Wave)?;
        self.renderer.set_arm(ArmPosition::Raised);
        Ok(())
    }

    fn raise_arm(&self) -> Result<(), CapabilityError> {
        self.check(Capability::Wave)?;
        self.renderer.set_arm(ArmPosition::Raised);
        Ok(())
    }

    fn lower_arm(&self) -> Result<(), CapabilityError> {
        self.check(Capability::Wave)?;
        self.renderer.set_arm(ArmPosition::Lowered);
        Ok(())
    }

    fn shine(&self, color: &str) -> Result<(), CapabilityError> {
        self.check(Capability::Shine)?;
        let normalized = if color == "off" { "grey" } else { color };
        self.renderer.set_led(normalized);
        Ok(())
    }

    fn shine_colors(&self) -> Vec<&'static str> {
        vec!["red", "green", "blue"]
    }

    async fn analyze_tone(&self, text: &str) -> Result<Value, BotError> {
        self.check(Capability::AnalyzeTone)?;
        let creds = self.require_userpass(
            Capability::AnalyzeTone,
            Service::ToneAnalyzer,
            |c| c.tone_analyzer.as_ref(),
        )?;
        let response = self
            .relay
            .analyze_tone(ToneRequest {
                creds,
                text: text.to_string(),
            })
            .await?;
        Ok(response)
    }

    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<Value, BotError> {
        self.check(Capability::Translate)?;
        let creds = self.require_userpass(
            Capability::Translate,
            Service::LanguageTranslator,
            |c| c.language_translator.as_ref(),
        )?;
        let response = self
            .relay
            .translate(TranslateRequest {
                creds,
                text: text.to_string(),
                source_language: source_language.to_string(),
                target_language: target_language.to_string(),
            })
            .await?;
        Ok(response)
    }

    async fn identify_language(&self, text: &str) -> Result<Value, BotError> {
        self.check(Capability::Translate)?;
        let creds = self.require_userpass(
            Capability::Translate,
            Service::LanguageTranslator,
            |c| c.language_translator.as_ref(),
        )?;
        let response = self
            .relay
            .identify_language(IdentifyLanguageRequest {
                creds,
                text: text.to_string(),
            })
            .await?;
        Ok(response)
    }

    async fn converse(&self, workspace_id: &str, message: &str) -> Result<ConverseReply, BotError> {
        self.check(Capability::Converse)?;
        let creds = self.require_userpass(
            Capability::Converse,
            Service::Conversation,
            |c| c.conversation.as_ref(),
        )?;

        let workspace_lock = {
            let entry = self
                .workspace_locks
                .entry(workspace_id.to_string())
                .or_default();
            Arc::clone(entry.value())
        };
        let _guard = workspace_lock.lock().await;

        let context = self
            .contexts
            .get(workspace_id)
            .map(|v| v.clone())
            .unwrap_or_else(|| Value::Object(serde_json::Map::new()));

        let result = self
            .relay
            .converse(ConverseRequest {
                creds,
                workspace_id: workspace_id.to_string(),
                input: ConverseInput {
                    text: message.to_string(),
                },
                context,
            })
            .await;

        // The stored context is overwritten from the response regardless of
        // error status; a body without a context clears the entry so the
        // next call starts from an empty context again.
        match &result {
            Ok(body) => match body.get("context") {
                Some(ctx) => {
                    self.contexts.insert(workspace_id.to_string(), ctx.clone());
                }
                None => {
                    self.contexts.remove(workspace_id);
                }
            },
            Err(tjsim_types::error::RelayError::Service(_)) => {
                self.contexts.remove(workspace_id);
            }
            Err(_) => {}
        }

        let object = result?;
        let description = object
            .pointer("/output/text/0")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        Ok(ConverseReply {
            object,
            description,
        })
    }

    async fn speak(&self, text: &str) -> Result<(), BotError> {
        self.check(Capability::Speak)?;
        let session = self.ensure_tts_session().await?;
        let voice = speech::select_voice(&self.configuration, &session.voices);
        let clip = self.relay.synthesize(&session.token, &voice, text).await?;
        self.speaker.play(clip).await;
        Ok(())
    }

    async fn listen(&self, sink: TranscriptSink) -> Result<(), BotError> {
        self.check(Capability::Listen)?;
        let token = self.ensure_stt_token().await?;
        self.start_listen_stream(&token, sink).await
    }

    fn stop_listening(&self) -> Result<(), CapabilityError> {
        self.check(Capability::Listen)?;
        self.stop_listen_stream();
        Ok(())
    }

    async fn see(&self) -> Result<Value, BotError> {
        self.check(Capability::See)?;
        let creds = self
            .with_credentials(|c| c.visual_recognition.as_ref().map(RelayApiKey::from_api_key))
            .ok_or(CapabilityError::MissingCredentials {
                op: Capability::See.op(),
                service: Service::VisualRecognition,
            })?;
        self.camera.ensure_setup().await.map_err(BotError::Camera)?;
        let image = self.camera.capture().await.map_err(BotError::Camera)?;
        let response = self.relay.see(SeeRequest { creds, image }).await?;
        Ok(response)
    }

    async fn take_photo(&self) -> Result<String, BotError> {
        self.check(Capability::TakePhoto)?;
        self.camera.ensure_setup().await.map_err(BotError::Camera)?;
        self.camera.capture().await.map_err(BotError::Camera)
    }
}

#[cfg(test)]
mod tests {
    use super::testutil::*;
    use super::*;
    use serde_json::json;
    use std::sync::atomic::Ordering;

    use tjsim_types::error::RelayError;

    #[tokio::test]
    async fn capability_failure_performs_no_relay_call() {
        let relay = Arc::new(MockRelay::default());
        let bot = bare_bot(Arc::clone(&relay));

        let err = bot.analyze_tone("hello").await.unwrap_err();
        assert!(matches!(
            err,
            BotError::Capability(CapabilityError::MissingCredentials {
                service: Service::ToneAnalyzer,
                ..
            })
        ));
        assert_eq!(relay.calls.load(Ordering::SeqCst), 0);

        let err = bot.see().await.unwrap_err();
        assert!(matches!(err, BotError::Capability(_)));
        assert_eq!(relay.calls.load(Ordering::SeqCst), 0);

        assert!(bot.wave().is_err());
        assert!(bot.shine("red").is_err());
    }

    #[tokio::test]
    async fn shine_off_forwards_grey() {
        let relay = Arc::new(MockRelay::default());
        let (bot, fixtures) = full_bot(Arc::clone(&relay));

        bot.shine("off").unwrap();
        let off_forwarded = fixtures.renderer.led();

        bot.shine("grey").unwrap();
        assert_eq!(fixtures.renderer.led(), off_forwarded);

        bot.shine("red").unwrap();
        assert_eq!(fixtures.renderer.led(), Some("red".to_string()));
    }

    #[tokio::test]
    async fn arm_operations_drive_the_renderer() {
        let relay = Arc::new(MockRelay::default());
        let (bot, fixtures) = full_bot(relay);

        bot.raise_arm().unwrap();
        assert_eq!(fixtures.renderer.arm(), Some(ArmPosition::Raised));
        bot.lower_arm().unwrap();
        assert_eq!(fixtures.renderer.arm(), Some(ArmPosition::Lowered));
        bot.wave().unwrap();
        assert_eq!(fixtures.renderer.arm(), Some(ArmPosition::Raised));
    }

    #[tokio::test]
    async fn converse_threads_context_between_calls() {
        let relay = Arc::new(MockRelay::default());
        relay.set_response(
            "converse",
            Ok(json!({
                "output": {"text": ["hi there"]},
                "context": {"x": 1}
            })),
        );
        let (bot, _fixtures) = full_bot(Arc::clone(&relay));

        let reply = bot.converse("w1", "hello").await.unwrap();
        assert_eq!(reply.description, "hi there");

        bot.converse("w1", "again").await.unwrap();

        let sent = relay.sent_converse.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].context, json!({}));
        assert_eq!(sent[1].context, json!({"x": 1}));
        assert_eq!(sent[1].workspace_id, "w1");
    }

    #[tokio::test]
    async fn converse_service_error_clears_context_and_rejects() {
        let relay = Arc::new(MockRelay::default());
        relay.set_response(
            "converse",
            Ok(json!({"output": {"text": ["ok"]}, "context": {"x": 1}})),
        );
        let (bot, _fixtures) = full_bot(Arc::clone(&relay));

        bot.converse("w1", "hello").await.unwrap();
        assert_eq!(bot.conversation_context("w1"), Some(json!({"x": 1})));

        relay.set_response("converse", Err(RelayError::Service("workspace gone".to_string())));
        let err = bot.converse("w1", "again").await.unwrap_err();
        assert_eq!(err.service_err(), Some("workspace gone"));
        assert_eq!(bot.conversation_context("w1"), None);

        // Next call starts from an empty context again.
        relay.set_response(
            "converse",
            Ok(json!({"output": {"text": ["ok"]}, "context": {}})),
        );
        bot.converse("w1", "retry").await.unwrap();
        let sent = relay.sent_converse.lock().unwrap();
        assert_eq!(sent[2].context, json!({}));
    }

    #[tokio::test]
    async fn contexts_are_isolated_per_workspace() {
        let relay = Arc::new(MockRelay::default());
        relay.set_response(
            "converse",
            Ok(json!({"output": {"text": []}, "context": {"w": "one"}})),
        );
        let (bot, _fixtures) = full_bot(Arc::clone(&relay));

        bot.converse("w1", "a").await.unwrap();
        bot.converse("w2", "b").await.unwrap();

        let sent = relay.sent_converse.lock().unwrap();
        assert_eq!(sent[1].context, json!({}));
    }

    #[tokio::test]
    async fn see_captures_then_relays() {
        let relay = Arc::new(MockRelay::default());
        relay.set_response("see", Ok(json!([{"class": "cat", "score": 0.9}])));
        let (bot, fixtures) = full_bot(Arc::clone(&relay));

        let response = bot.see().await.unwrap();
        assert_eq!(response[0]["class"], "cat");
        // Setup runs before every capture; the camera makes it idempotent.
        assert_eq!(fixtures.camera.setup_calls.load(Ordering::SeqCst), 1);
        assert_eq!(relay.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn take_photo_returns_the_data_url() {
        let relay = Arc::new(MockRelay::default());
        let (bot, _fixtures) = full_bot(Arc::clone(&relay));

        let uri = bot.take_photo().await.unwrap();
        assert!(uri.starts_with("data:image/png;base64,"));
        // No relay exchange for a local capture.
        assert_eq!(relay.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn service_error_propagates_verbatim() {
        let relay = Arc::new(MockRelay::default());
        relay.set_response("analyze_tone", Err(RelayError::Service("Unauthorized".to_string())));
        let (bot, _fixtures) = full_bot(relay);

        let err = bot.analyze_tone("hello").await.unwrap_err();
        assert_eq!(err.service_err(), Some("Unauthorized"));
    }
}
