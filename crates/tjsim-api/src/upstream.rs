//! The vendor service port.
//!
//! The facilitator's only job is validation plus forwarding: each endpoint
//! hands its validated parameters to one [`Upstream`] method. Two
//! implementations exist: [`WatsonUpstream`] (thin HTTP pass-throughs to the
//! real services) and [`CannedUpstream`] (deterministic offline responses
//! for the simulator and for tests).

use std::time::Duration;

use futures_util::future::BoxFuture;
use serde_json::{json, Value};
use thiserror::Error;

use tjsim_types::relay::{RelayCreds, TokenKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    /// The vendor rejected the request; the message is forwarded verbatim
    /// into the response's `err` field.
    #[error("{0}")]
    Vendor(String),

    #[error("upstream transport error: {0}")]
    Transport(String),
}

type UpstreamResult = Result<Value, UpstreamError>;

/// One async method per facilitator endpoint.
pub trait Upstream: Send + Sync {
    fn token(
        &self,
        kind: TokenKind,
        creds: RelayCreds,
    ) -> impl std::future::Future<Output = UpstreamResult> + Send;

    fn analyze_tone(
        &self,
        creds: RelayCreds,
        text: String,
    ) -> impl std::future::Future<Output = UpstreamResult> + Send;

    fn translate(
        &self,
        creds: RelayCreds,
        text: String,
        source_language: String,
        target_language: String,
    ) -> impl std::future::Future<Output = UpstreamResult> + Send;

    fn identify_language(
        &self,
        creds: RelayCreds,
        text: String,
    ) -> impl std::future::Future<Output = UpstreamResult> + Send;

    fn converse(
        &self,
        creds: RelayCreds,
        workspace_id: String,
        input_text: String,
        context: Value,
    ) -> impl std::future::Future<Output = UpstreamResult> + Send;

    fn see(
        &self,
        api_key: String,
        image: String,
    ) -> impl std::future::Future<Output = UpstreamResult> + Send;

    fn discovery_query(
        &self,
        creds: RelayCreds,
        params: Value,
    ) -> impl std::future::Future<Output = UpstreamResult> + Send;
}

/// Object-safe mirror of [`Upstream`], bridged by a blanket impl.
pub trait DynUpstream: Send + Sync {
    fn token(&self, kind: TokenKind, creds: RelayCreds) -> BoxFuture<'_, UpstreamResult>;
    fn analyze_tone(&self, creds: RelayCreds, text: String) -> BoxFuture<'_, UpstreamResult>;
    fn translate(
        &self,
        creds: RelayCreds,
        text: String,
        source_language: String,
        target_language: String,
    ) -> BoxFuture<'_, UpstreamResult>;
    fn identify_language(&self, creds: RelayCreds, text: String) -> BoxFuture<'_, UpstreamResult>;
    fn converse(
        &self,
        creds: RelayCreds,
        workspace_id: String,
        input_text: String,
        context: Value,
    ) -> BoxFuture<'_, UpstreamResult>;
    fn see(&self, api_key: String, image: String) -> BoxFuture<'_, UpstreamResult>;
    fn discovery_query(&self, creds: RelayCreds, params: Value) -> BoxFuture<'_, UpstreamResult>;
}

impl<T: Upstream> DynUpstream for T {
    fn token(&self, kind: TokenKind, creds: RelayCreds) -> BoxFuture<'_, UpstreamResult> {
        Box::pin(Upstream::token(self, kind, creds))
    }

    fn analyze_tone(&self, creds: RelayCreds, text: String) -> BoxFuture<'_, UpstreamResult> {
        Box::pin(Upstream::analyze_tone(self, creds, text))
    }

    fn translate(
        &self,
        creds: RelayCreds,
        text: String,
        source_language: String,
        target_language: String,
    ) -> BoxFuture<'_, UpstreamResult> {
        Box::pin(Upstream::translate(
            self,
            creds,
            text,
            source_language,
            target_language,
        ))
    }

    fn identify_language(&self, creds: RelayCreds, text: String) -> BoxFuture<'_, UpstreamResult> {
        Box::pin(Upstream::identify_language(self, creds, text))
    }

    fn converse(
        &self,
        creds: RelayCreds,
        workspace_id: String,
        input_text: String,
        context: Value,
    ) -> BoxFuture<'_, UpstreamResult> {
        Box::pin(Upstream::converse(
            self,
            creds,
            workspace_id,
            input_text,
            context,
        ))
    }

    fn see(&self, api_key: String, image: String) -> BoxFuture<'_, UpstreamResult> {
        Box::pin(Upstream::see(self, api_key, image))
    }

    fn discovery_query(&self, creds: RelayCreds, params: Value) -> BoxFuture<'_, UpstreamResult> {
        Box::pin(Upstream::discovery_query(self, creds, params))
    }
}

/// An upstream of erased concrete type, as held by the app state.
pub struct BoxUpstream(Box<dyn DynUpstream>);

impl BoxUpstream {
    pub fn new(upstream: impl Upstream + 'static) -> Self {
        Self(Box::new(upstream))
    }
}

impl std::ops::Deref for BoxUpstream {
    type Target = dyn DynUpstream;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

const WATSON_GATEWAY: &str = "https://gateway.watsonplatform.net";
const WATSON_VR_GATEWAY: &str = "https://gateway-a.watsonplatform.net";
const WATSON_STREAM: &str = "https://stream.watsonplatform.net";

/// Thin pass-throughs to the hosted Watson services. Glue only: parameter
/// shaping, basic auth, and error-body forwarding.
pub struct WatsonUpstream {
    client: reqwest::Client,
    gateway: String,
    vr_gateway: String,
    stream: String,
}

impl WatsonUpstream {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to create reqwest client");
        Self {
            client,
            gateway: WATSON_GATEWAY.to_string(),
            vr_gateway: WATSON_VR_GATEWAY.to_string(),
            stream: WATSON_STREAM.to_string(),
        }
    }

    /// Point every service at one host (tests).
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        let host = host.into();
        self.gateway = host.clone();
        self.vr_gateway = host.clone();
        self.stream = host;
        self
    }

    async fn decode(response: reqwest::Response) -> UpstreamResult {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|_| status.to_string());
            return Err(UpstreamError::Vendor(message));
        }
        response
            .json()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))
    }

    async fn post_json(
        &self,
        url: String,
        creds: &RelayCreds,
        body: Value,
    ) -> UpstreamResult {
        let response = self
            .client
            .post(url)
            .basic_auth(&creds.username, Some(&creds.password))
            .json(&body)
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;
        Self::decode(response).await
    }
}

impl Default for WatsonUpstream {
    fn default() -> Self {
        Self::new()
    }
}

impl Upstream for WatsonUpstream {
    async fn token(&self, kind: TokenKind, creds: RelayCreds) -> UpstreamResult {
        let service_url = match kind {
            TokenKind::Tts => format!("{}/text-to-speech/api", self.stream),
            TokenKind::Stt => format!("{}/speech-to-text/api", self.stream),
        };
        let response = self
            .client
            .get(format!("{}/authorization/api/v1/token", self.stream))
            .query(&[("url", service_url.as_str())])
            .basic_auth(&creds.username, Some(&creds.password))
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|_| status.to_string());
            return Err(UpstreamError::Vendor(message));
        }
        let token = response
            .text()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        match kind {
            TokenKind::Stt => Ok(json!({ "stt": token })),
            TokenKind::Tts => {
                // The voice catalog rides along with the TTS token so the
                // client can select a voice without a second round trip.
                let voices = self
                    .client
                    .get(format!("{}/text-to-speech/api/v1/voices", self.stream))
                    .basic_auth(&creds.username, Some(&creds.password))
                    .send()
                    .await
                    .map_err(|e| UpstreamError::Transport(e.to_string()))?;
                let voices = Self::decode(voices).await?;
                Ok(json!({ "tts": token, "voices": voices }))
            }
        }
    }

    async fn analyze_tone(&self, creds: RelayCreds, text: String) -> UpstreamResult {
        self.post_json(
            format!("{}/tone-analyzer/api/v3/tone?version=2016-05-19", self.gateway),
            &creds,
            json!({ "text": text }),
        )
        .await
    }

    async fn translate(
        &self,
        creds: RelayCreds,
        text: String,
        source_language: String,
        target_language: String,
    ) -> UpstreamResult {
        self.post_json(
            format!("{}/language-translator/api/v2/translate", self.gateway),
            &creds,
            json!({
                "text": text,
                "source": source_language,
                "target": target_language,
            }),
        )
        .await
    }

    async fn identify_language(&self, creds: RelayCreds, text: String) -> UpstreamResult {
        self.post_json(
            format!("{}/language-translator/api/v2/identify", self.gateway),
            &creds,
            json!({ "text": text }),
        )
        .await
    }

    async fn converse(
        &self,
        creds: RelayCreds,
        workspace_id: String,
        input_text: String,
        context: Value,
    ) -> UpstreamResult {
        self.post_json(
            format!(
                "{}/conversation/api/v1/workspaces/{}/message?version=2016-07-11",
                self.gateway, workspace_id
            ),
            &creds,
            json!({
                "input": { "text": input_text },
                "context": context,
            }),
        )
        .await
    }

    async fn see(&self, api_key: String, image: String) -> UpstreamResult {
        let response = self
            .client
            .post(format!(
                "{}/visual-recognition/api/v3/classify?version=2016-05-20",
                self.vr_gateway
            ))
            .query(&[("api_key", api_key.as_str())])
            .json(&json!({ "images_file": image }))
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;
        Self::decode(response).await
    }

    async fn discovery_query(&self, creds: RelayCreds, params: Value) -> UpstreamResult {
        self.post_json(
            format!("{}/discovery/api/v1/query?version=2017-11-07", self.gateway),
            &creds,
            params,
        )
        .await
    }
}

/// Deterministic offline responses: the simulator without vendor accounts.
#[derive(Debug, Default, Clone, Copy)]
pub struct CannedUpstream;

impl Upstream for CannedUpstream {
    async fn token(&self, kind: TokenKind, _creds: RelayCreds) -> UpstreamResult {
        match kind {
            TokenKind::Stt => Ok(json!({ "stt": "sim-stt-token" })),
            TokenKind::Tts => Ok(json!({
                "tts": "sim-tts-token",
                "voices": { "voices": [
                    { "name": "en-US_MichaelVoice", "language": "en-US", "gender": "male" },
                    { "name": "en-US_AllisonVoice", "language": "en-US", "gender": "female" },
                    { "name": "es-ES_EnriqueVoice", "language": "es-ES", "gender": "male" },
                ]},
            })),
        }
    }

    async fn analyze_tone(&self, _creds: RelayCreds, text: String) -> UpstreamResult {
        Ok(json!({
            "document_tone": {
                "tone_categories": [{
                    "category_id": "emotion_tone",
                    "tones": [
                        { "tone_id": "joy", "score": 0.61 },
                        { "tone_id": "analytical", "score": 0.42 },
                    ],
                }],
            },
            "text": text,
        }))
    }

    async fn translate(
        &self,
        _creds: RelayCreds,
        text: String,
        source_language: String,
        target_language: String,
    ) -> UpstreamResult {
        Ok(json!({
            "translations": [{
                "translation": format!("[{source_language}->{target_language}] {text}"),
            }],
            "word_count": text.split_whitespace().count(),
        }))
    }

    async fn identify_language(&self, _creds: RelayCreds, _text: String) -> UpstreamResult {
        Ok(json!({
            "languages": [
                { "language": "en", "confidence": 0.92 },
                { "language": "fr", "confidence": 0.03 },
            ],
        }))
    }

    async fn converse(
        &self,
        _creds: RelayCreds,
        workspace_id: String,
        input_text: String,
        context: Value,
    ) -> UpstreamResult {
        // Threads a turn counter through the context so context round-trip
        // behavior is observable offline.
        let turn = context.get("turn_count").and_then(Value::as_i64).unwrap_or(0) + 1;
        Ok(json!({
            "input": { "text": input_text },
            "output": { "text": [format!("Turn {turn}: you said \"{input_text}\"")] },
            "context": { "workspace_id": workspace_id, "turn_count": turn },
        }))
    }

    async fn see(&self, _api_key: String, _image: String) -> UpstreamResult {
        Ok(json!({
            "images": [{
                "classifiers": [{
                    "classifier_id": "default",
                    "classes": [
                        { "class": "simulated scene", "score": 0.87 },
                        { "class": "indoor", "score": 0.64 },
                    ],
                }],
            }],
        }))
    }

    async fn discovery_query(&self, _creds: RelayCreds, params: Value) -> UpstreamResult {
        Ok(json!({
            "matching_results": 0,
            "results": [],
            "query": params.get("query").cloned().unwrap_or(Value::Null),
        }))
    }
}
