//! POST /api/discovery/query

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use super::{forward, reply};
use crate::http::validate;
use crate::state::AppState;

pub async fn query(State(state): State<AppState>, Json(body): Json<Value>) -> Json<Value> {
    reply(inner(&state, &body).await)
}

async fn inner(state: &AppState, body: &Value) -> Result<Value, String> {
    let creds = validate::userpass(body)?;
    let params = body.get("params").cloned().unwrap_or_else(|| json!({}));
    forward(state.upstream.discovery_query(creds, params).await)
}

#[cfg(test)]
mod tests {
    use super::super::testutil::canned_state;
    use super::*;

    #[tokio::test]
    async fn creds_are_validated_first() {
        let Json(body) = query(State(canned_state()), Json(json!({"params": {}}))).await;
        assert_eq!(body["err"], "Missing required parameters: creds");
    }

    #[tokio::test]
    async fn params_pass_through() {
        let Json(body) = query(
            State(canned_state()),
            Json(json!({
                "creds": {"username": "u", "password": "p"},
                "params": {"query": "safety"},
            })),
        )
        .await;
        assert_eq!(body["query"], "safety");
        assert_eq!(body["matching_results"], 0);
    }
}
