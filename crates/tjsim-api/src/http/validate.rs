//! Fast-fail request validation.
//!
//! Runs before any outbound vendor call. The message strings are part of
//! the wire contract ("Missing required parameters: creds" and friends) and
//! checks run in a fixed order per endpoint, so clients see reproducible
//! failures.

use serde_json::Value;

use tjsim_types::relay::RelayCreds;

/// The `creds` object must be present before any field inside it is
/// checked. Note the plural in this one message.
pub fn require_creds(body: &Value) -> Result<&Value, String> {
    body.get("creds")
        .filter(|c| c.is_object())
        .ok_or_else(|| "Missing required parameters: creds".to_string())
}

/// A non-empty string field.
pub fn require_str<'a>(source: &'a Value, key: &str) -> Result<&'a str, String> {
    source
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required parameter: {key}"))
}

/// A field that must be a JSON object.
pub fn require_object<'a>(source: &'a Value, key: &str) -> Result<&'a Value, String> {
    source
        .get(key)
        .filter(|v| v.is_object())
        .ok_or_else(|| format!("Missing parameter object: {key}"))
}

/// creds -> username -> password, in that order.
pub fn userpass(body: &Value) -> Result<RelayCreds, String> {
    let creds = require_creds(body)?;
    let username = require_str(creds, "username")?;
    let password = require_str(creds, "password")?;
    Ok(RelayCreds {
        username: username.to_string(),
        password: password.to_string(),
    })
}

/// creds -> api_key (visual recognition).
pub fn api_key(body: &Value) -> Result<String, String> {
    let creds = require_creds(body)?;
    Ok(require_str(creds, "api_key")?.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_creds_uses_the_plural_message() {
        let err = userpass(&json!({})).unwrap_err();
        assert_eq!(err, "Missing required parameters: creds");

        // A non-object creds value counts as missing.
        let err = userpass(&json!({"creds": "nope"})).unwrap_err();
        assert_eq!(err, "Missing required parameters: creds");
    }

    #[test]
    fn username_is_checked_before_password() {
        let err = userpass(&json!({"creds": {}})).unwrap_err();
        assert_eq!(err, "Missing required parameter: username");

        let err = userpass(&json!({"creds": {"username": "u"}})).unwrap_err();
        assert_eq!(err, "Missing required parameter: password");
    }

    #[test]
    fn empty_strings_count_as_missing() {
        let err = require_str(&json!({"text": ""}), "text").unwrap_err();
        assert_eq!(err, "Missing required parameter: text");
    }

    #[test]
    fn api_key_is_checked_inside_creds() {
        let err = api_key(&json!({"creds": {}})).unwrap_err();
        assert_eq!(err, "Missing required parameter: api_key");

        let key = api_key(&json!({"creds": {"api_key": "k"}})).unwrap();
        assert_eq!(key, "k");
    }

    #[test]
    fn context_must_be_an_object() {
        let err = require_object(&json!({"context": "x"}), "context").unwrap_err();
        assert_eq!(err, "Missing parameter object: context");
        assert!(require_object(&json!({"context": {}}), "context").is_ok());
    }
}
