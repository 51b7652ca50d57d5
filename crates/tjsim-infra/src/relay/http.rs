//! `HttpRelay`: the reqwest-backed implementation of the relay port.
//!
//! Facilitator exchanges are JSON POSTs; speech synthesis and recognition
//! are token-gated calls against the speech service host. Every facilitator
//! response body goes through the `err`-key discriminator, so a service
//! failure surfaces as [`RelayError::Service`] even on HTTP 200.

use std::time::Duration;

use futures_util::StreamExt;
use serde::Serialize;
use serde_json::Value;

use tjsim_types::error::RelayError;
use tjsim_types::relay::{
    from_relay_body, AudioClip, ConverseRequest, DiscoveryQueryRequest, IdentifyLanguageRequest,
    RelayCreds, SeeRequest, SttTokenResponse, TokenKind, TokenRequest, ToneRequest,
    TranslateRequest, TtsTokenResponse, ERR_KEY,
};

use tjsim_core::relay::{Relay, TranscriptStream};

const DEFAULT_SPEECH_URL: &str = "https://stream.watsonplatform.net";

pub struct HttpRelay {
    client: reqwest::Client,
    base_url: String,
    speech_url: String,
}

impl HttpRelay {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            base_url: base_url.into(),
            speech_url: DEFAULT_SPEECH_URL.to_string(),
        }
    }

    /// Override the facilitator base URL (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the speech service host (tests, on-prem deployments).
    pub fn with_speech_url(mut self, speech_url: impl Into<String>) -> Self {
        self.speech_url = speech_url.into();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn speech_endpoint(&self, path: &str) -> String {
        format!("{}{}", self.speech_url, path)
    }

    /// One facilitator exchange: POST JSON, decode JSON, apply the
    /// `err`-key discriminator.
    async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Value, RelayError> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| RelayError::Transport(e.to_string()))?;
        let body: Value = response
            .json()
            .await
            .map_err(|e| RelayError::Decode(e.to_string()))?;
        from_relay_body(body)
    }
}

impl Relay for HttpRelay {
    async fn tts_token(&self, creds: RelayCreds) -> Result<TtsTokenResponse, RelayError> {
        let body = self
            .post(
                "/api/get_token",
                &TokenRequest {
                    kind: TokenKind::Tts,
                    creds,
                },
            )
            .await?;
        serde_json::from_value(body).map_err(|e| RelayError::Decode(e.to_string()))
    }

    async fn stt_token(&self, creds: RelayCreds) -> Result<SttTokenResponse, RelayError> {
        let body = self
            .post(
                "/api/get_token",
                &TokenRequest {
                    kind: TokenKind::Stt,
                    creds,
                },
            )
            .await?;
        serde_json::from_value(body).map_err(|e| RelayError::Decode(e.to_string()))
    }

    async fn analyze_tone(&self, request: ToneRequest) -> Result<Value, RelayError> {
        self.post("/api/analyze_tone", &request).await
    }

    async fn translate(&self, request: TranslateRequest) -> Result<Value, RelayError> {
        self.post("/api/translate", &request).await
    }

    async fn identify_language(
        &self,
        request: IdentifyLanguageRequest,
    ) -> Result<Value, RelayError> {
        self.post("/api/identifyLanguage", &request).await
    }

    async fn converse(&self, request: ConverseRequest) -> Result<Value, RelayError> {
        self.post("/api/converse", &request).await
    }

    async fn see(&self, request: SeeRequest) -> Result<Value, RelayError> {
        self.post("/api/see", &request).await
    }

    async fn discovery_query(&self, request: DiscoveryQueryRequest) -> Result<Value, RelayError> {
        self.post("/api/discovery/query", &request).await
    }

    async fn synthesize(
        &self,
        token: &str,
        voice: &str,
        text: &str,
    ) -> Result<AudioClip, RelayError> {
        let response = self
            .client
            .get(self.speech_endpoint("/text-to-speech/api/v1/synthesize"))
            .query(&[
                ("voice", voice),
                ("text", text),
                ("accept", "audio/wav"),
                ("watson-token", token),
            ])
            .send()
            .await
            .map_err(|e| RelayError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RelayError::Service(message));
        }
        let data = response
            .bytes()
            .await
            .map_err(|e| RelayError::Transport(e.to_string()))?;
        Ok(AudioClip {
            data: data.to_vec(),
        })
    }

    async fn recognize(&self, token: &str) -> Result<TranscriptStream, RelayError> {
        let response = self
            .client
            .get(self.speech_endpoint("/speech-to-text/api/v1/recognize"))
            .query(&[("watson-token", token), ("interim_results", "true")])
            .send()
            .await
            .map_err(|e| RelayError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RelayError::Service(message));
        }

        // Newline-delimited JSON over a chunked body. Each line carries one
        // recognition result; lines without a transcript are skipped.
        let mut bytes = response.bytes_stream();
        let stream = async_stream::stream! {
            let mut buffer: Vec<u8> = Vec::new();
            while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        yield Err(RelayError::Transport(e.to_string()));
                        break;
                    }
                };
                buffer.extend_from_slice(&chunk);
                while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
                    let line: Vec<u8> = buffer.drain(..=pos).collect();
                    let line = String::from_utf8_lossy(&line[..line.len() - 1]);
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<Value>(line) {
                        Ok(body) => {
                            if let Some(err) = body.get(ERR_KEY) {
                                let message = err
                                    .as_str()
                                    .map(str::to_string)
                                    .unwrap_or_else(|| err.to_string());
                                yield Err(RelayError::Service(message));
                            } else if let Some(transcript) = body
                                .pointer("/results/0/alternatives/0/transcript")
                                .and_then(Value::as_str)
                            {
                                yield Ok(transcript.to_string());
                            }
                        }
                        Err(e) => yield Err(RelayError::Decode(e.to_string())),
                    }
                }
            }
        };
        Ok(Box::pin(stream))
    }
}
