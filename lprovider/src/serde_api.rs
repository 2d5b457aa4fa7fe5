//! Upstream response serde models and parsing helpers.

use serde::Deserialize;

use crate::UpstreamError;

pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body).ok()?;
    match parsed.error {
        ErrorBody::Detailed { message } => Some(message),
        ErrorBody::Plain(message) => Some(message),
    }
}

/// Extracts the first choice's message content from a blocking completion body.
///
/// A missing choice or missing content yields an empty string; the retry policy
/// decides what an empty reply means.
pub fn parse_completion_content(body: &str) -> Result<String, UpstreamError> {
    let parsed: CompletionResponse = serde_json::from_str(body)
        .map_err(|err| UpstreamError::decode(format!("invalid completion body: {err}")))?;

    Ok(parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .unwrap_or_default())
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Detailed { message: String },
    Plain(String),
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    #[serde(default)]
    message: CompletionMessage,
}

#[derive(Debug, Default, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StreamChunk {
    #[serde(default)]
    pub choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StreamChoice {
    #[serde(default)]
    pub delta: StreamDelta,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct StreamDelta {
    pub content: Option<String>,
}

impl StreamChunk {
    pub(crate) fn into_first_content(self) -> Option<String> {
        self.choices.into_iter().next().and_then(|choice| choice.delta.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UpstreamErrorKind;

    #[test]
    fn extract_error_message_supports_object_and_string_forms() {
        assert_eq!(
            extract_error_message(r#"{"error":{"message":"invalid key","type":"auth"}}"#),
            Some("invalid key".to_string())
        );
        assert_eq!(
            extract_error_message(r#"{"error":"model overloaded"}"#),
            Some("model overloaded".to_string())
        );
        assert_eq!(extract_error_message("<html>bad gateway</html>"), None);
    }

    #[test]
    fn parse_completion_content_reads_first_choice() {
        let body = r#"{"model":"m","choices":[{"message":{"role":"assistant","content":"hi"}},{"message":{"content":"ignored"}}]}"#;
        assert_eq!(parse_completion_content(body).expect("parse"), "hi");
    }

    #[test]
    fn parse_completion_content_treats_missing_content_as_empty() {
        assert_eq!(parse_completion_content(r#"{"choices":[]}"#).expect("parse"), "");
        assert_eq!(
            parse_completion_content(r#"{"choices":[{"message":{"content":null}}]}"#)
                .expect("parse"),
            ""
        );
    }

    #[test]
    fn parse_completion_content_rejects_non_json() {
        let error = parse_completion_content("not json").expect_err("should fail");
        assert_eq!(error.kind, UpstreamErrorKind::Decode);
        assert!(error.retryable);
    }
}
