//! POST /api/see

use axum::extract::State;
use axum::Json;
use serde_json::Value;

use super::{forward, reply};
use crate::http::validate;
use crate::state::AppState;

pub async fn see(State(state): State<AppState>, Json(body): Json<Value>) -> Json<Value> {
    reply(inner(&state, &body).await)
}

async fn inner(state: &AppState, body: &Value) -> Result<Value, String> {
    let api_key = validate::api_key(body)?;
    let image = body
        .get("image")
        .and_then(Value::as_str)
        .unwrap_or_default();
    forward(state.upstream.see(api_key, image.to_string()).await)
}

#[cfg(test)]
mod tests {
    use super::super::testutil::canned_state;
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn api_key_is_required_inside_creds() {
        let Json(body) = see(State(canned_state()), Json(json!({}))).await;
        assert_eq!(body["err"], "Missing required parameters: creds");

        let Json(body) = see(State(canned_state()), Json(json!({"creds": {}}))).await;
        assert_eq!(body["err"], "Missing required parameter: api_key");
    }

    #[tokio::test]
    async fn classification_comes_back_on_success() {
        let Json(body) = see(
            State(canned_state()),
            Json(json!({
                "creds": {"api_key": "k"},
                "image": "data:image/png;base64,AAAA",
            })),
        )
        .await;
        assert_eq!(body["images"][0]["classifiers"][0]["classes"][0]["class"], "simulated scene");
    }
}
