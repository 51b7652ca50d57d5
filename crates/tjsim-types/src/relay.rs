//! Wire protocol types for the facilitator boundary.
//!
//! Every exchange is a JSON POST. A response body is either the success
//! payload or `{"err": "..."}` -- never both. The literal presence of the
//! `err` key is the sole error discriminator across the protocol; HTTP
//! status codes are not authoritative.

use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::credentials::{ApiKeyCredentials, SpeechCredentials, UserPassCredentials, Voice};
use crate::error::RelayError;

/// The response-body key that marks a service-level failure.
pub const ERR_KEY: &str = "err";

/// Apply the `err`-key discriminator to a decoded response body.
pub fn from_relay_body(body: Value) -> Result<Value, RelayError> {
    match body.get(ERR_KEY) {
        Some(Value::String(msg)) => Err(RelayError::Service(msg.clone())),
        Some(other) => Err(RelayError::Service(other.to_string())),
        None => Ok(body),
    }
}

/// Username/password pair as sent on the wire.
///
/// Built at the last moment from a credentials block (exposing the
/// `SecretString` password only here).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayCreds {
    pub username: String,
    pub password: String,
}

impl RelayCreds {
    pub fn from_userpass(creds: &UserPassCredentials) -> Self {
        Self {
            username: creds.username.clone(),
            password: creds.password.expose_secret().to_string(),
        }
    }

    pub fn from_speech(creds: &SpeechCredentials) -> Self {
        Self {
            username: creds.username.clone(),
            password: creds.password.expose_secret().to_string(),
        }
    }
}

/// API-key pair as sent on the wire (visual recognition).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayApiKey {
    pub api_key: String,
}

impl RelayApiKey {
    pub fn from_api_key(creds: &ApiKeyCredentials) -> Self {
        Self {
            api_key: creds.api_key.expose_secret().to_string(),
        }
    }
}

/// Which speech service a token is requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Tts,
    Stt,
}

/// POST /api/get_token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRequest {
    #[serde(rename = "type")]
    pub kind: TokenKind,
    pub creds: RelayCreds,
}

/// Success payload for a text-to-speech token request.
#[derive(Debug, Deserialize)]
pub struct TtsTokenResponse {
    pub tts: String,
    #[serde(default)]
    pub voices: VoiceCatalog,
}

/// The voice catalog as returned by the token facilitator.
#[derive(Debug, Default, Deserialize)]
pub struct VoiceCatalog {
    #[serde(default)]
    pub voices: Vec<Voice>,
}

/// Success payload for a speech-to-text token request.
#[derive(Debug, Deserialize)]
pub struct SttTokenResponse {
    pub stt: String,
}

/// POST /api/analyze_tone
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToneRequest {
    pub creds: RelayCreds,
    pub text: String,
}

/// POST /api/translate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateRequest {
    pub creds: RelayCreds,
    pub text: String,
    #[serde(rename = "sourceLanguage")]
    pub source_language: String,
    #[serde(rename = "targetLanguage")]
    pub target_language: String,
}

/// POST /api/identifyLanguage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyLanguageRequest {
    pub creds: RelayCreds,
    pub text: String,
}

/// POST /api/converse
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConverseRequest {
    pub creds: RelayCreds,
    pub workspace_id: String,
    pub input: ConverseInput,
    /// Opaque context blob threaded across calls for one workspace.
    pub context: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConverseInput {
    pub text: String,
}

/// POST /api/see
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeeRequest {
    pub creds: RelayApiKey,
    /// Base64 PNG data URL (`data:image/png;base64,...`).
    pub image: String,
}

/// POST /api/discovery/query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryQueryRequest {
    pub creds: RelayCreds,
    pub params: Value,
}

/// Synthesized audio returned by a token-gated speech call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub data: Vec<u8>,
}

impl AudioClip {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
