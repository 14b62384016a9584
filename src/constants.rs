//! Protocol literals and limits for the crackwatch client.
//!
//! This module centralizes the fixed strings the remote service expects
//! and the numeric limits the client enforces. Constants are grouped
//! by domain.
//!
//! # Categories
//!
//! - **Endpoint**: where the SockJS websocket lives
//! - **Frames**: literal frame prefixes used for classification
//! - **Limits**: query bounds and page size
//! - **Timeouts**: connection and receive deadlines

use std::time::Duration;

// ============================================================================
// Endpoint
// ============================================================================

/// Default SockJS websocket endpoint.
///
/// The two segments between `sockjs/` and `/websocket` are a server id and a
/// session id. The server accepts almost anything there, so they are fixed.
pub const DEFAULT_ENDPOINT: &str = "wss://crackwatch.com/sockjs/crackwatch/discord_bot/websocket";

/// Public games page offered to users when a response cannot be handled.
pub const GAMES_PAGE_URL: &str = "https://crackwatch.com/games";

// ============================================================================
// Frames
// ============================================================================

/// DDP protocol version requested in the connect message.
pub const DDP_VERSION: &str = "1";

/// DDP protocol versions advertised as supported, newest first.
pub const DDP_SUPPORTED_VERSIONS: &[&str] = &["1", "pre2", "pre1"];

/// Remote method that returns one page of games.
pub const GAMES_PAGE_METHOD: &str = "games.page";

/// Request id sent with every method call. Only one call is made per session.
pub const REQUEST_ID: &str = "1";

/// Leading bytes of a SockJS array frame carrying a DDP `result` message.
pub const RESULT_FRAME_PREFIX: &str = r#"a["{\"msg\":\"result\""#;

/// Exact frame the server sends when it rejects a method call.
pub const BAD_REQUEST_FRAME: &str = r#"a["{\"msg\":\"error\",\"reason\":\"Bad request\"}"]"#;

/// Prefix marking a SockJS frame that carries an array of messages.
pub const SOCKJS_ARRAY_PREFIX: char = 'a';

// ============================================================================
// Limits
// ============================================================================

/// Longest search term accepted before anything is sent.
pub const MAX_SEARCH_TERM_LENGTH: usize = 100;

/// Number of games the service returns per page.
pub const RESULTS_PER_PAGE: u64 = 30;

// ============================================================================
// Timeouts
// ============================================================================

/// Default deadline for the websocket handshake.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default deadline for a matching response frame after the query is sent.
///
/// Heartbeats and unrelated frames do not extend it.
pub const DEFAULT_RECEIVE_TIMEOUT: Duration = Duration::from_secs(30);
