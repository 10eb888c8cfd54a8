//! Wire types for the line-delimited JSON protocol.
//!
//! One request per input line, one response per non-blank request line.
//! Field names and their order are frozen; in particular `sentenes_count`
//! is spelled exactly as existing clients expect it.

use serde::Serialize;
use serde_json::Value;

use crate::consts::FORMAT_VERSION;
use crate::engine::TextAnalysis;

/// A decoded request line. `cmd` selects the handler and is kept as raw
/// JSON so an unrecognized value can be echoed back in the error message;
/// the other fields are command-specific. Unknown fields are ignored.
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub cmd: Option<Value>,
    pub token: Option<String>,
    pub text: Option<String>,
}

impl Request {
    /// Extract a request from a parsed JSON value. Only objects are
    /// requests; anything else is a decode failure.
    pub fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        Some(Self {
            cmd: map.get("cmd").cloned(),
            token: map.get("token").and_then(Value::as_str).map(str::to_string),
            text: map.get("text").and_then(Value::as_str).map(str::to_string),
        })
    }

    /// The command name, when `cmd` carries a string.
    pub fn cmd_str(&self) -> Option<&str> {
        self.cmd.as_ref().and_then(Value::as_str)
    }
}

/// One response shape per command. Serialized untagged so each variant
/// emits exactly the frozen wire object.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Response {
    Version {
        version: String,
    },
    Token {
        token: String,
        tag: Value,
        morphan_version: String,
        format: u32,
    },
    Text {
        tokens_count: usize,
        unique_tokens_count: usize,
        #[serde(rename = "sentenes_count")]
        sentences_count: usize,
        sentences: Vec<Value>,
        morphan_version: String,
        format: u32,
    },
    Stopped {
        status: String,
    },
    Error {
        error: String,
        message: String,
    },
}

impl Response {
    pub fn version(version: &str) -> Self {
        Self::Version {
            version: version.to_string(),
        }
    }

    pub fn token(token: &str, tag: Value, engine_version: &str) -> Self {
        Self::Token {
            token: token.to_string(),
            tag,
            morphan_version: engine_version.to_string(),
            format: FORMAT_VERSION,
        }
    }

    pub fn text(analysis: TextAnalysis, engine_version: &str) -> Self {
        Self::Text {
            tokens_count: analysis.tokens_count,
            unique_tokens_count: analysis.unique_tokens_count,
            sentences_count: analysis.sentences_count,
            sentences: analysis.sentences,
            morphan_version: engine_version.to_string(),
            format: FORMAT_VERSION,
        }
    }

    pub fn stopped() -> Self {
        Self::Stopped {
            status: "stopped".to_string(),
        }
    }

    pub fn invalid_json() -> Self {
        Self::Error {
            error: "invalid_json".to_string(),
            message: "Unable to decode request".to_string(),
        }
    }

    pub fn unknown_command(cmd: Option<&Value>) -> Self {
        // Frozen message format: bare text for strings, `None` for an
        // absent or null command, JSON for anything else.
        let rendered = match cmd {
            Some(Value::String(name)) => name.clone(),
            Some(Value::Null) | None => "None".to_string(),
            Some(other) => other.to_string(),
        };
        Self::Error {
            error: "unknown_command".to_string(),
            message: format!("Unsupported command: {rendered}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(line: &str) -> Option<Request> {
        serde_json::from_str::<Value>(line)
            .ok()
            .as_ref()
            .and_then(Request::from_value)
    }

    #[test]
    fn request_decodes_with_optional_fields() {
        let request = decode(r#"{"cmd":"token","token":"kit"}"#).unwrap();
        assert_eq!(request.cmd_str(), Some("token"));
        assert_eq!(request.token.as_deref(), Some("kit"));
        assert!(request.text.is_none());
    }

    #[test]
    fn request_tolerates_missing_cmd_and_extra_fields() {
        let request = decode(r#"{"noise":true}"#).unwrap();
        assert!(request.cmd.is_none());
        assert!(request.cmd_str().is_none());
    }

    #[test]
    fn non_string_cmd_still_decodes() {
        let request = decode(r#"{"cmd":5}"#).unwrap();
        assert_eq!(request.cmd, Some(json!(5)));
        assert!(request.cmd_str().is_none());
    }

    #[test]
    fn non_string_token_is_treated_as_absent() {
        let request = decode(r#"{"cmd":"token","token":5}"#).unwrap();
        assert_eq!(request.cmd_str(), Some("token"));
        assert!(request.token.is_none());
    }

    #[test]
    fn non_object_lines_do_not_decode() {
        assert!(decode("42").is_none());
        assert!(decode("\"version\"").is_none());
        assert!(decode("[1,2]").is_none());
    }

    #[test]
    fn version_response_has_exactly_one_key() {
        let line = serde_json::to_string(&Response::version("1.2.10")).unwrap();
        assert_eq!(line, r#"{"version":"1.2.10"}"#);
    }

    #[test]
    fn token_response_field_order_is_frozen() {
        let response = Response::token("kit", json!("kit+N+Sg+Nom"), "1.2.10");
        let line = serde_json::to_string(&response).unwrap();
        assert_eq!(
            line,
            r#"{"token":"kit","tag":"kit+N+Sg+Nom","morphan_version":"1.2.10","format":1}"#
        );
    }

    #[test]
    fn text_response_keeps_misspelled_sentence_count() {
        let analysis = TextAnalysis {
            tokens_count: 3,
            unique_tokens_count: 2,
            sentences_count: 1,
            sentences: vec![json!([["Сүз", "NR"]])],
        };
        let line = serde_json::to_string(&Response::text(analysis, "1.2.10")).unwrap();
        assert!(line.contains(r#""sentenes_count":1"#));
        assert!(!line.contains("sentences_count"));
    }

    #[test]
    fn non_ascii_is_not_escaped() {
        let response = Response::token("сүз", json!("сүз+N+Sg+Nom"), "1.2.10");
        let line = serde_json::to_string(&response).unwrap();
        assert!(line.contains("сүз"));
        assert!(!line.contains("\\u"));
    }

    #[test]
    fn stopped_response_shape() {
        let line = serde_json::to_string(&Response::stopped()).unwrap();
        assert_eq!(line, r#"{"status":"stopped"}"#);
    }

    #[test]
    fn error_responses() {
        let line = serde_json::to_string(&Response::invalid_json()).unwrap();
        assert_eq!(
            line,
            r#"{"error":"invalid_json","message":"Unable to decode request"}"#
        );

        let bogus = json!("bogus");
        let line = serde_json::to_string(&Response::unknown_command(Some(&bogus))).unwrap();
        assert_eq!(
            line,
            r#"{"error":"unknown_command","message":"Unsupported command: bogus"}"#
        );
    }

    #[test]
    fn unknown_command_renders_the_raw_value() {
        let five = json!(5);
        let line = serde_json::to_string(&Response::unknown_command(Some(&five))).unwrap();
        assert!(line.contains("Unsupported command: 5"));

        let line = serde_json::to_string(&Response::unknown_command(None)).unwrap();
        assert!(line.contains("Unsupported command: None"));

        let line = serde_json::to_string(&Response::unknown_command(Some(&Value::Null))).unwrap();
        assert!(line.contains("Unsupported command: None"));
    }
}
