//! POST /api/get_token

use axum::extract::State;
use axum::Json;
use serde_json::Value;

use tjsim_types::relay::TokenKind;

use super::{forward, reply};
use crate::http::validate;
use crate::state::AppState;

pub async fn get_token(State(state): State<AppState>, Json(body): Json<Value>) -> Json<Value> {
    reply(inner(&state, &body).await)
}

async fn inner(state: &AppState, body: &Value) -> Result<Value, String> {
    let creds = validate::userpass(body)?;
    // Anything that is not an explicit "tts" request is a speech-to-text
    // token request.
    let kind = match body.get("type").and_then(Value::as_str) {
        Some("tts") => TokenKind::Tts,
        _ => TokenKind::Stt,
    };
    forward(state.upstream.token(kind, creds).await)
}
