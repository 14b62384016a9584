//! Wire codec for the crackwatch SockJS/DDP protocol.
//!
//! Pure functions, no I/O. Every application message travels double-encoded:
//! the DDP message is serialized to a JSON string, and that string is the only
//! element of a JSON array which forms the SockJS frame.
//!
//! # Frame shapes
//!
//! ```text
//! client → server   ["{\"msg\":\"method\",\"method\":\"games.page\",...}"]
//! server → client   a["{\"msg\":\"result\",\"id\":\"1\",\"result\":{...}}"]
//!                   h                      (heartbeat)
//!                   o                      (session open)
//! ```
//!
//! Both layers go through `serde_json`, never through string substitution. A
//! `"` in a search term therefore ends up as `\\\"` on the wire and a `\` as
//! `\\\\`, which is what the server needs to recover the original term.

use serde::{Deserialize, Serialize};

use crate::constants::{
    BAD_REQUEST_FRAME, DDP_SUPPORTED_VERSIONS, DDP_VERSION, GAMES_PAGE_METHOD, REQUEST_ID,
    RESULT_FRAME_PREFIX, SOCKJS_ARRAY_PREFIX,
};
use crate::error::ProtocolError;
use crate::query::SearchQuery;
use crate::types::SearchResults;

/// Disposition of an incoming frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame<'a> {
    /// A DDP `result` message; the payload is the whole frame.
    Result(&'a str),
    /// The server rejected the method call as a bad request.
    ErrorResponse,
    /// Heartbeats, session-open frames, and any unrelated message.
    Other,
}

/// DDP connect message.
#[derive(Debug, Serialize)]
struct ConnectMessage {
    msg: &'static str,
    version: &'static str,
    support: &'static [&'static str],
}

/// DDP method call with a single positional parameter object.
#[derive(Debug, Serialize)]
struct MethodMessage<'a> {
    msg: &'static str,
    method: &'static str,
    params: [GamesPageParams<'a>; 1],
    id: &'static str,
}

/// Parameter object of `games.page`. Field order is the wire order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GamesPageParams<'a> {
    page: u32,
    order_type: &'static str,
    order_down: bool,
    search: &'a str,
    unset: u8,
    released: u8,
    cracked: u8,
    #[serde(rename = "isAAA")]
    is_aaa: u8,
}

/// DDP result message, as produced by the server.
#[derive(Debug, Serialize)]
struct ResultMessage<'a> {
    msg: &'static str,
    id: &'static str,
    result: &'a SearchResults,
}

/// Message types that always serialize.
///
/// `serde_json` only fails on maps with non-string keys or on a `Serialize`
/// impl that reports an error. Implementors are built from strings, integers,
/// booleans, [`chrono::NaiveDate`]s, and structs or sequences of those, so
/// neither case can arise. New fields must keep to those shapes.
trait WireMessage: Serialize {}

impl WireMessage for ConnectMessage {}
impl WireMessage for MethodMessage<'_> {}
impl WireMessage for ResultMessage<'_> {}

/// Serialize a message and wrap it in the one-element SockJS array.
fn envelope<T: WireMessage>(message: &T) -> String {
    let inner = to_json(message);
    to_json(&[inner])
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).expect("WireMessage types and string arrays always serialize")
}

/// Transport negotiation frame sent right after the socket opens.
#[must_use]
pub fn handshake_frame() -> String {
    envelope(&ConnectMessage {
        msg: "connect",
        version: DDP_VERSION,
        support: DDP_SUPPORTED_VERSIONS,
    })
}

/// Encode a `games.page` call for `query`.
///
/// Surrounding whitespace is trimmed from the term before encoding.
#[must_use]
pub fn encode_query(query: &SearchQuery) -> String {
    envelope(&MethodMessage {
        msg: "method",
        method: GAMES_PAGE_METHOD,
        params: [GamesPageParams {
            page: query.page(),
            order_type: query.order_type().wire_value(),
            order_down: query.sort_order().order_down(),
            search: query.term().trim(),
            unset: 0,
            released: query.release_status().wire_value(),
            cracked: query.crack_status().wire_value(),
            is_aaa: query.studio_type().wire_value(),
        }],
        id: REQUEST_ID,
    })
}

/// Build the frame a server sends for a successful `games.page` call.
///
/// Inverse of [`decode_result`]; used to script servers in tests and tools.
#[must_use]
pub fn encode_result_frame(results: &SearchResults) -> String {
    let body = envelope(&ResultMessage {
        msg: "result",
        id: REQUEST_ID,
        result: results,
    });
    format!("{SOCKJS_ARRAY_PREFIX}{body}")
}

/// Classify a frame by its leading bytes without parsing it.
#[must_use]
pub fn classify(frame: &str) -> Frame<'_> {
    if frame == BAD_REQUEST_FRAME {
        Frame::ErrorResponse
    } else if frame.starts_with(RESULT_FRAME_PREFIX) {
        Frame::Result(frame)
    } else {
        Frame::Other
    }
}

/// Decode a result frame into [`SearchResults`].
///
/// Any failure, whether in the SockJS array, the DDP message, or the result
/// schema, is logged with the offending text and reported as [`ProtocolError`].
pub fn decode_result(frame: &str) -> Result<SearchResults, ProtocolError> {
    let message = unwrap_envelope(frame)?;

    let mut fields: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&message)
        .map_err(|e| {
            log::warn!("[Codec] Unable to decode response into a map: {}: {}", e, message);
            ProtocolError
        })?;

    let Some(result) = fields.remove("result") else {
        log::warn!(
            "[Codec] Response has no result field (error: {}): {}",
            fields.get("error").map_or_else(|| "none".to_string(), ToString::to_string),
            message
        );
        return Err(ProtocolError);
    };

    if result.is_null() {
        return Ok(SearchResults::default());
    }

    SearchResults::deserialize(&result).map_err(|e| {
        log::warn!("[Codec] Unable to decode search results: {}: {}", e, message);
        ProtocolError
    })
}

/// Strip the SockJS `a` marker and outer array, returning the inner message.
fn unwrap_envelope(frame: &str) -> Result<String, ProtocolError> {
    let Some(array) = frame.strip_prefix(SOCKJS_ARRAY_PREFIX) else {
        log::warn!("[Codec] Frame is not a SockJS array: {}", frame);
        return Err(ProtocolError);
    };

    let messages: Vec<String> = serde_json::from_str(array).map_err(|e| {
        log::warn!("[Codec] Unable to decode SockJS array: {}: {}", e, frame);
        ProtocolError
    })?;

    if messages.len() > 1 {
        log::debug!("[Codec] Ignoring {} trailing messages in frame", messages.len() - 1);
    }

    messages.into_iter().next().ok_or_else(|| {
        log::warn!("[Codec] Empty SockJS array frame");
        ProtocolError
    })
}
