//! POST /api/converse

use axum::extract::State;
use axum::Json;
use serde_json::Value;

use super::{forward, reply};
use crate::http::validate;
use crate::state::AppState;

pub async fn converse(State(state): State<AppState>, Json(body): Json<Value>) -> Json<Value> {
    reply(inner(&state, &body).await)
}

async fn inner(state: &AppState, body: &Value) -> Result<Value, String> {
    let creds = validate::userpass(body)?;
    let workspace_id = validate::require_str(body, "workspace_id")?;
    // The field lives at input.text but the message names the leaf only.
    let input_text = body
        .pointer("/input/text")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| "Missing required parameter: text".to_string())?;
    let context = validate::require_object(body, "context")?.clone();
    forward(
        state
            .upstream
            .converse(creds, workspace_id.to_string(), input_text.to_string(), context)
            .await,
    )
}

#[cfg(test)]
mod tests {
    use super::super::testutil::canned_state;
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn validation_runs_in_contract_order() {
        let Json(body) = converse(State(canned_state()), Json(json!({}))).await;
        assert_eq!(body["err"], "Missing required parameters: creds");

        let Json(body) = converse(
            State(canned_state()),
            Json(json!({"creds": {"username": "u", "password": "p"}})),
        )
        .await;
        assert_eq!(body["err"], "Missing required parameter: workspace_id");

        let Json(body) = converse(
            State(canned_state()),
            Json(json!({
                "creds": {"username": "u", "password": "p"},
                "workspace_id": "w1",
            })),
        )
        .await;
        assert_eq!(body["err"], "Missing required parameter: text");

        let Json(body) = converse(
            State(canned_state()),
            Json(json!({
                "creds": {"username": "u", "password": "p"},
                "workspace_id": "w1",
                "input": {"text": "hello"},
            })),
        )
        .await;
        assert_eq!(body["err"], "Missing parameter object: context");
    }

    #[tokio::test]
    async fn empty_input_text_counts_as_missing() {
        let Json(body) = converse(
            State(canned_state()),
            Json(json!({
                "creds": {"username": "u", "password": "p"},
                "workspace_id": "w1",
                "input": {"text": ""},
                "context": {},
            })),
        )
        .await;
        assert_eq!(body["err"], "Missing required parameter: text");
    }

    #[tokio::test]
    async fn valid_request_reaches_the_upstream() {
        let Json(body) = converse(
            State(canned_state()),
            Json(json!({
                "creds": {"username": "u", "password": "p"},
                "workspace_id": "w1",
                "input": {"text": "hello"},
                "context": {},
            })),
        )
        .await;
        assert_eq!(body["context"]["turn_count"], 1);
        assert_eq!(body["output"]["text"][0], "Turn 1: you said \"hello\"");
    }
}
