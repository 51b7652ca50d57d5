use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use std::fmt;

/// A cloud service the bot may hold credentials for.
///
/// The display form matches the credential block name a script uses
/// (`credentials.speech_to_text`, ...), which is also how missing-credential
/// errors identify the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Service {
    ToneAnalyzer,
    Conversation,
    LanguageTranslator,
    SpeechToText,
    TextToSpeech,
    VisualRecognition,
    Discovery,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Service::ToneAnalyzer => write!(f, "tone_analyzer"),
            Service::Conversation => write!(f, "conversation"),
            Service::LanguageTranslator => write!(f, "language_translator"),
            Service::SpeechToText => write!(f, "speech_to_text"),
            Service::TextToSpeech => write!(f, "text_to_speech"),
            Service::VisualRecognition => write!(f, "visual_recognition"),
            Service::Discovery => write!(f, "discovery"),
        }
    }
}

/// Username/password credentials for a Watson-style service.
///
/// The password is held in a [`SecretString`]: it never appears in `Debug`
/// output and is only exposed at the point a relay request body is built.
#[derive(Debug, Deserialize)]
pub struct UserPassCredentials {
    pub username: String,
    pub password: SecretString,
}

/// API-key credentials (visual recognition).
#[derive(Debug, Deserialize)]
pub struct ApiKeyCredentials {
    pub api_key: SecretString,
}

/// A text-to-speech voice entry from the cached voice catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub name: String,
    pub language: String,
    pub gender: String,
}

/// Credentials for a speech service (speech-to-text or text-to-speech).
///
/// `token` is absent until first successfully fetched, then present for the
/// remainder of the instance's life -- there is no TTL or refresh path.
/// `voices` is only ever populated for the text-to-speech block.
#[derive(Debug, Deserialize)]
pub struct SpeechCredentials {
    pub username: String,
    pub password: SecretString,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub voices: Vec<Voice>,
}

/// Per-service structured secrets for one bot instance.
///
/// Mutable over the instance's life: ephemeral speech tokens (and the TTS
/// voice catalog) are written back into the relevant block after first
/// acquisition.
#[derive(Debug, Default, Deserialize)]
pub struct Credentials {
    pub tone_analyzer: Option<UserPassCredentials>,
    pub conversation: Option<UserPassCredentials>,
    pub language_translator: Option<UserPassCredentials>,
    pub speech_to_text: Option<SpeechCredentials>,
    pub text_to_speech: Option<SpeechCredentials>,
    pub visual_recognition: Option<ApiKeyCredentials>,
    pub discovery: Option<UserPassCredentials>,
}

impl Credentials {
    /// Whether a credential block for the given service is present.
    pub fn has(&self, service: Service) -> bool {
        match service {
            Service::ToneAnalyzer => self.tone_analyzer.is_some(),
            Service::Conversation => self.conversation.is_some(),
            Service::LanguageTranslator => self.language_translator.is_some(),
            Service::SpeechToText => self.speech_to_text.is_some(),
            Service::TextToSpeech => self.text_to_speech.is_some(),
            Service::VisualRecognition => self.visual_recognition.is_some(),
            Service::Discovery => self.discovery.is_some(),
        }
    }
}
