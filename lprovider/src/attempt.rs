//! Single blocking and streaming attempts against an [`UpstreamTransport`].
//!
//! Attempts never retry; wrap them in [`crate::execute_with_retry`].

use futures_util::StreamExt;

use crate::serde_api::parse_completion_content;
use crate::{
    LineStream, StreamEvent, UpstreamError, UpstreamOperationHooks, UpstreamPayload,
    UpstreamTransport, decode_lines,
};

const SUCCESS_STATUS: u16 = 200;

/// One request/response call. Returns the first choice's message content.
pub async fn blocking_attempt(
    transport: &dyn UpstreamTransport,
    payload: UpstreamPayload,
) -> Result<String, UpstreamError> {
    let response = transport.call_blocking(payload.blocking()).await?;
    if response.status != SUCCESS_STATUS {
        return Err(UpstreamError::from_status(response.status, &response.body));
    }

    parse_completion_content(&response.body)
}

/// One streaming call. Each content fragment is handed to `on_delta` as soon
/// as it is decoded; the accumulated reply is returned at `Done` or end of body.
///
/// A failure after some content was forwarded ends the attempt with the
/// partial reply, because the fragments already reached the caller.
pub async fn streaming_attempt<F>(
    transport: &dyn UpstreamTransport,
    payload: UpstreamPayload,
    operation: &str,
    hooks: &dyn UpstreamOperationHooks,
    mut on_delta: F,
) -> Result<String, UpstreamError>
where
    F: FnMut(String),
{
    let response = transport.call_streaming(payload.streaming()).await?;
    if response.status != SUCCESS_STATUS {
        let body = collect_body(response.lines).await;
        return Err(UpstreamError::from_status(response.status, &body));
    }

    let mut events = decode_lines(response.lines);
    let mut reply = String::new();

    while let Some(event) = events.next().await {
        match event {
            Ok(StreamEvent::ContentDelta(delta)) => {
                reply.push_str(&delta);
                on_delta(delta);
            }
            Ok(StreamEvent::Done) => break,
            Ok(StreamEvent::Malformed(raw_line)) => hooks.on_decode_noise(operation, &raw_line),
            Err(error) if reply.is_empty() => return Err(error),
            Err(error) => {
                hooks.on_stream_truncated(operation, reply.chars().count(), &error);
                break;
            }
        }
    }

    Ok(reply)
}

async fn collect_body(mut lines: LineStream<'_>) -> String {
    let mut body = Vec::new();
    while let Some(Ok(line)) = lines.next().await {
        body.push(line);
    }

    body.join("\n")
}
