//! Synthetic assistant replies used when the upstream never answered.

use lprovider::{UpstreamError, UpstreamErrorKind};

/// Text logged and returned in place of a real reply after retries ran out
/// or a fatal upstream error short-circuited them.
pub fn degraded_reply(error: &UpstreamError) -> String {
    format!(
        "Sorry, {}. Please try again later. (details: {error})",
        reason(error.kind)
    )
}

fn reason(kind: UpstreamErrorKind) -> &'static str {
    match kind {
        UpstreamErrorKind::Authentication => {
            "the AI service rejected our credentials (authentication failed)"
        }
        UpstreamErrorKind::Unavailable => "the AI service is overloaded right now",
        UpstreamErrorKind::Timeout => "the AI service took too long to respond",
        UpstreamErrorKind::Connect | UpstreamErrorKind::Transport => {
            "the AI service could not be reached"
        }
        UpstreamErrorKind::EmptyReply => "the AI service returned an empty reply",
        UpstreamErrorKind::HttpStatus => "the AI service returned an error",
        UpstreamErrorKind::InvalidPayload => "the request could not be sent to the AI service",
        UpstreamErrorKind::Decode => "the AI service sent a reply we could not read",
    }
}

/// Splits text into words that keep their trailing whitespace, so joining
/// the pieces reproduces the input exactly.
pub(crate) fn split_words(text: &str) -> Vec<String> {
    text.split_inclusive(char::is_whitespace)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_failures_say_so() {
        let reply = degraded_reply(&UpstreamError::from_status(401, r#"{"error":"bad key"}"#));
        assert!(reply.contains("authentication"));
        assert!(reply.contains("bad key"));
    }

    #[test]
    fn exhausted_overload_embeds_last_reason() {
        let reply = degraded_reply(&UpstreamError::from_status(503, r#"{"error":{"message":"busy"}}"#));
        assert!(reply.starts_with("Sorry, the AI service is overloaded"));
        assert!(reply.contains("busy"));
    }

    #[test]
    fn split_words_is_lossless() {
        let text = "Sorry,  the service\nis down.";
        let words = split_words(text);
        assert_eq!(words, vec!["Sorry, ", " ", "the ", "service\n", "is ", "down."]);
        assert_eq!(words.concat(), text);
        assert!(split_words("").is_empty());
    }
}
