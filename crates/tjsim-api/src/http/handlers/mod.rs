//! Endpoint handlers.
//!
//! Every endpoint replies HTTP 200 with either the vendor's success payload
//! or `{"err": "<message>"}`. The `err` key is the wire contract; clients
//! never branch on status codes.

pub mod converse;
pub mod discovery;
pub mod language;
pub mod token;
pub mod vision;

use axum::Json;
use serde_json::{json, Value};

use crate::upstream::UpstreamError;

pub(crate) fn reply(result: Result<Value, String>) -> Json<Value> {
    match result {
        Ok(value) => Json(value),
        Err(message) => Json(json!({ "err": message })),
    }
}

pub(crate) fn forward(result: Result<Value, UpstreamError>) -> Result<Value, String> {
    result.map_err(|err| err.to_string())
}

#[cfg(test)]
pub(crate) mod testutil {
    use crate::state::AppState;
    use crate::upstream::{BoxUpstream, CannedUpstream};

    pub fn canned_state() -> AppState {
        AppState::new(BoxUpstream::new(CannedUpstream))
    }
}
