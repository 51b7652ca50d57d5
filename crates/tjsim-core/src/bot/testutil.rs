//! Shared mock collaborators for facade and interception tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};
use tokio::sync::mpsc;

use tjsim_types::config::BotConfiguration;
use tjsim_types::credentials::Credentials;
use tjsim_types::error::RelayError;
use tjsim_types::hardware::{ArmPosition, Hardware};
use tjsim_types::relay::{
    AudioClip, ConverseRequest, DiscoveryQueryRequest, IdentifyLanguageRequest, RelayCreds,
    SeeRequest, SttTokenResponse, ToneRequest, TranslateRequest, TtsTokenResponse, VoiceCatalog,
};

use super::TjBot;
use crate::hardware::{Camera, Renderer, Speaker};
use crate::relay::{Relay, TranscriptStream};

type Canned = Result<Value, RelayError>;

/// In-memory relay double: canned responses keyed by method name, atomic
/// call counters, and a queue of pre-built transcript streams.
#[derive(Default)]
pub(crate) struct MockRelay {
    pub calls: AtomicUsize,
    pub tts_token_calls: AtomicUsize,
    pub stt_token_calls: AtomicUsize,
    pub synthesize_calls: AtomicUsize,
    pub fail_next_tts_token: AtomicBool,
    pub fail_next_recognize: AtomicBool,
    pub token_delay: Mutex<Option<Duration>>,
    pub voices: Mutex<Vec<tjsim_types::credentials::Voice>>,
    pub last_voice: Mutex<Option<String>>,
    pub last_token: Mutex<Option<String>>,
    pub sent_converse: Mutex<Vec<ConverseRequest>>,
    pub sent_discovery: Mutex<Vec<DiscoveryQueryRequest>>,
    responses: Mutex<HashMap<&'static str, Canned>>,
    transcript_streams: Mutex<VecDeque<TranscriptStream>>,
}

impl MockRelay {
    pub fn set_response(&self, method: &'static str, response: Canned) {
        self.responses.lock().unwrap().insert(method, response);
    }

    pub fn push_transcript_stream(&self, stream: TranscriptStream) {
        self.transcript_streams.lock().unwrap().push_back(stream);
    }

    fn respond(&self, method: &'static str) -> Canned {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .get(method)
            .cloned()
            .unwrap_or_else(|| Ok(json!({ "method": method })))
    }

    async fn token_pause(&self) {
        let delay = *self.token_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

impl Relay for MockRelay {
    async fn tts_token(&self, _creds: RelayCreds) -> Result<TtsTokenResponse, RelayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.tts_token_calls.fetch_add(1, Ordering::SeqCst);
        self.token_pause().await;
        if self.fail_next_tts_token.swap(false, Ordering::SeqCst) {
            return Err(RelayError::Transport("token endpoint down".to_string()));
        }
        Ok(TtsTokenResponse {
            tts: "tts-token".to_string(),
            voices: VoiceCatalog {
                voices: self.voices.lock().unwrap().clone(),
            },
        })
    }

    async fn stt_token(&self, _creds: RelayCreds) -> Result<SttTokenResponse, RelayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.stt_token_calls.fetch_add(1, Ordering::SeqCst);
        self.token_pause().await;
        Ok(SttTokenResponse {
            stt: "stt-token".to_string(),
        })
    }

    async fn analyze_tone(&self, _request: ToneRequest) -> Canned {
        self.respond("analyze_tone")
    }

    async fn translate(&self, _request: TranslateRequest) -> Canned {
        self.respond("translate")
    }

    async fn identify_language(&self, _request: IdentifyLanguageRequest) -> Canned {
        self.respond("identify_language")
    }

    async fn converse(&self, request: ConverseRequest) -> Canned {
        self.sent_converse.lock().unwrap().push(request);
        self.respond("converse")
    }

    async fn see(&self, _request: SeeRequest) -> Canned {
        self.respond("see")
    }

    async fn discovery_query(&self, request: DiscoveryQueryRequest) -> Canned {
        self.sent_discovery.lock().unwrap().push(request);
        self.respond("discovery_query")
    }

    async fn synthesize(
        &self,
        token: &str,
        voice: &str,
        text: &str,
    ) -> Result<AudioClip, RelayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.synthesize_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_token.lock().unwrap() = Some(token.to_string());
        *self.last_voice.lock().unwrap() = Some(voice.to_string());
        Ok(AudioClip {
            data: text.as_bytes().to_vec(),
        })
    }

    async fn recognize(&self, token: &str) -> Result<TranscriptStream, RelayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_token.lock().unwrap() = Some(token.to_string());
        if self.fail_next_recognize.swap(false, Ordering::SeqCst) {
            return Err(RelayError::Transport("recognize refused".to_string()));
        }
        let stream = self.transcript_streams.lock().unwrap().pop_front();
        Ok(stream.unwrap_or_else(|| Box::pin(futures_util::stream::pending())))
    }
}

/// A transcript stream fed by hand from a test.
pub(crate) fn transcript_channel() -> (
    mpsc::UnboundedSender<Result<String, RelayError>>,
    TranscriptStream,
) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let stream = Box::pin(async_stream::stream! {
        while let Some(item) = rx.recv().await {
            yield item;
        }
    });
    (tx, stream)
}

#[derive(Default)]
pub(crate) struct MockRenderer {
    arm: Mutex<Option<ArmPosition>>,
    led: Mutex<Option<String>>,
}

impl MockRenderer {
    pub fn arm(&self) -> Option<ArmPosition> {
        *self.arm.lock().unwrap()
    }

    pub fn led(&self) -> Option<String> {
        self.led.lock().unwrap().clone()
    }
}

impl Renderer for MockRenderer {
    fn set_arm(&self, position: ArmPosition) {
        *self.arm.lock().unwrap() = Some(position);
    }

    fn set_led(&self, color: &str) {
        *self.led.lock().unwrap() = Some(color.to_string());
    }
}

#[derive(Clone, Default)]
pub(crate) struct MockCamera {
    pub setup_calls: Arc<AtomicUsize>,
    pub fail_setup: Arc<AtomicBool>,
}

impl Camera for MockCamera {
    async fn ensure_setup(&self) -> Result<(), String> {
        if self.fail_setup.load(Ordering::SeqCst) {
            return Err("no camera device".to_string());
        }
        self.setup_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn capture(&self) -> Result<String, String> {
        Ok("data:image/png;base64,iVBORw0KGgo=".to_string())
    }
}

#[derive(Clone, Default)]
pub(crate) struct MockSpeaker {
    pub played: Arc<Mutex<Vec<AudioClip>>>,
}

impl Speaker for MockSpeaker {
    async fn play(&self, clip: AudioClip) {
        self.played.lock().unwrap().push(clip);
    }
}

/// Shared handles to the hardware doubles inside a test bot.
pub(crate) struct Fixtures {
    pub renderer: Arc<MockRenderer>,
    pub camera: MockCamera,
    pub speaker: MockSpeaker,
}

pub(crate) fn full_credentials() -> Credentials {
    serde_json::from_value(json!({
        "tone_analyzer": {"username": "tone-user", "password": "tone-pass"},
        "conversation": {"username": "conv-user", "password": "conv-pass"},
        "language_translator": {"username": "lt-user", "password": "lt-pass"},
        "speech_to_text": {"username": "stt-user", "password": "stt-pass"},
        "text_to_speech": {"username": "tts-user", "password": "tts-pass"},
        "visual_recognition": {"api_key": "vr-key"},
        "discovery": {"username": "disc-user", "password": "disc-pass"},
    }))
    .unwrap()
}

/// A bot with every hardware tag and every credential block.
pub(crate) fn full_bot(
    relay: Arc<MockRelay>,
) -> (TjBot<MockRelay, MockCamera, MockSpeaker>, Fixtures) {
    full_bot_with(relay, |_| {})
}

/// Like [`full_bot`], with a hook to adjust credentials before construction.
pub(crate) fn full_bot_with(
    relay: Arc<MockRelay>,
    adjust: impl FnOnce(&mut Credentials),
) -> (TjBot<MockRelay, MockCamera, MockSpeaker>, Fixtures) {
    let mut credentials = full_credentials();
    adjust(&mut credentials);

    let renderer = Arc::new(MockRenderer::default());
    let camera = MockCamera::default();
    let speaker = MockSpeaker::default();
    let fixtures = Fixtures {
        renderer: Arc::clone(&renderer),
        camera: camera.clone(),
        speaker: speaker.clone(),
    };

    let bot = TjBot::new(
        Hardware::ALL.iter().copied(),
        BotConfiguration::default(),
        credentials,
        relay,
        camera,
        speaker,
        renderer,
    );
    (bot, fixtures)
}

/// A bot with no hardware and no credentials: every capability check fails.
pub(crate) fn bare_bot(relay: Arc<MockRelay>) -> TjBot<MockRelay, MockCamera, MockSpeaker> {
    TjBot::new(
        std::iter::empty(),
        BotConfiguration::default(),
        Credentials::default(),
        relay,
        MockCamera::default(),
        MockSpeaker::default(),
        Arc::new(MockRenderer::default()),
    )
}
