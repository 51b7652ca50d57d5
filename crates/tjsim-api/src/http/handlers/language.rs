//! POST /api/analyze_tone, /api/translate, /api/identifyLanguage

use axum::extract::State;
use axum::Json;
use serde_json::Value;

use super::{forward, reply};
use crate::http::validate;
use crate::state::AppState;

pub async fn analyze_tone(State(state): State<AppState>, Json(body): Json<Value>) -> Json<Value> {
    reply(analyze_tone_inner(&state, &body).await)
}

async fn analyze_tone_inner(state: &AppState, body: &Value) -> Result<Value, String> {
    let creds = validate::userpass(body)?;
    let text = validate::require_str(body, "text")?;
    forward(state.upstream.analyze_tone(creds, text.to_string()).await)
}

pub async fn translate(State(state): State<AppState>, Json(body): Json<Value>) -> Json<Value> {
    reply(translate_inner(&state, &body).await)
}

async fn translate_inner(state: &AppState, body: &Value) -> Result<Value, String> {
    let creds = validate::userpass(body)?;
    let text = validate::require_str(body, "text")?;
    let source_language = validate::require_str(body, "sourceLanguage")?;
    let target_language = validate::require_str(body, "targetLanguage")?;
    forward(
        state
            .upstream
            .translate(
                creds,
                text.to_string(),
                source_language.to_string(),
                target_language.to_string(),
            )
            .await,
    )
}

pub async fn identify_language(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Json<Value> {
    reply(identify_language_inner(&state, &body).await)
}

async fn identify_language_inner(state: &AppState, body: &Value) -> Result<Value, String> {
    let creds = validate::userpass(body)?;
    // This endpoint alone pluralizes its missing-text message.
    let text = validate::require_str(body, "text")
        .map_err(|_| "Missing required parameters: text".to_string())?;
    forward(state.upstream.identify_language(creds, text.to_string()).await)
}

#[cfg(test)]
mod tests {
    use super::super::testutil::canned_state;
    use super::*;
    use serde_json::json;

    fn creds() -> Value {
        json!({"username": "u", "password": "p"})
    }

    #[tokio::test]
    async fn analyze_tone_requires_text_after_creds() {
        let Json(body) = analyze_tone(State(canned_state()), Json(json!({}))).await;
        assert_eq!(body["err"], "Missing required parameters: creds");

        let Json(body) =
            analyze_tone(State(canned_state()), Json(json!({"creds": creds()}))).await;
        assert_eq!(body["err"], "Missing required parameter: text");
    }

    #[tokio::test]
    async fn translate_checks_languages_in_order() {
        let Json(body) = translate(
            State(canned_state()),
            Json(json!({"creds": creds(), "text": "hi"})),
        )
        .await;
        assert_eq!(body["err"], "Missing required parameter: sourceLanguage");

        let Json(body) = translate(
            State(canned_state()),
            Json(json!({"creds": creds(), "text": "hi", "sourceLanguage": "en"})),
        )
        .await;
        assert_eq!(body["err"], "Missing required parameter: targetLanguage");
    }

    #[tokio::test]
    async fn translate_forwards_to_the_upstream() {
        let Json(body) = translate(
            State(canned_state()),
            Json(json!({
                "creds": creds(),
                "text": "hello",
                "sourceLanguage": "en",
                "targetLanguage": "es",
            })),
        )
        .await;
        assert_eq!(body["translations"][0]["translation"], "[en->es] hello");
    }

    #[tokio::test]
    async fn identify_language_pluralizes_missing_text() {
        let Json(body) =
            identify_language(State(canned_state()), Json(json!({"creds": creds()}))).await;
        assert_eq!(body["err"], "Missing required parameters: text");
    }

    #[tokio::test]
    async fn identify_language_success() {
        let Json(body) = identify_language(
            State(canned_state()),
            Json(json!({"creds": creds(), "text": "bonjour"})),
        )
        .await;
        assert_eq!(body["languages"][0]["language"], "en");
        assert!(body.get("err").is_none());
    }
}
