//! Error types for crackwatch searches.
//!
//! Every error renders as one short sentence that can be shown to an end
//! user as-is. Underlying causes (I/O errors, serde errors) are logged where
//! they happen and never carried outward.

use thiserror::Error;

use crate::constants::MAX_SEARCH_TERM_LENGTH;

/// Caller input rejected before any network I/O.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The search term exceeds [`MAX_SEARCH_TERM_LENGTH`] characters.
    #[error("Search term was >{max} characters.")]
    TermTooLong {
        /// Maximum accepted length.
        max: usize,
        /// Length of the rejected term.
        len: usize,
    },
    /// Page numbers at the public boundary start at 1.
    #[error("Page numbers start at 1.")]
    InvalidPage,
}

impl ValidationError {
    pub(crate) fn term_too_long(len: usize) -> Self {
        Self::TermTooLong {
            max: MAX_SEARCH_TERM_LENGTH,
            len,
        }
    }
}

/// The service could not be reached, or the connection failed mid-exchange.
///
/// The cause is logged at the failure site; callers only learn that the
/// service was unreachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("crackwatch.com could not be reached.")]
pub struct ConnectionError;

/// A result frame arrived but did not match the expected schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error(
    "We received a response from crackwatch.com we weren't expecting, and couldn't handle. \
     Sorry about that, perhaps try it directly from <https://crackwatch.com/games> until we \
     fix this issue?"
)]
pub struct ProtocolError;

/// Terminal outcome of a failed search, one variant per failure class.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// Input violated a precondition; retry with corrected input.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Socket, handshake, write, read, or deadline failure.
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    /// The result payload could not be decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    /// The service understood the query and rejected it.
    #[error("Received a \"Bad request\" response from crackwatch.com.")]
    RemoteRejection,
}

/// Result type alias using [`SearchError`].
pub type Result<T> = std::result::Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_too_long_message() {
        let err = ValidationError::term_too_long(150);
        assert_eq!(err.to_string(), "Search term was >100 characters.");
    }

    #[test]
    fn test_protocol_error_points_at_games_page() {
        let msg = ProtocolError.to_string();
        assert!(msg.contains(crate::constants::GAMES_PAGE_URL));
        assert!(!msg.contains('\n'));
    }

    #[test]
    fn test_search_error_messages_are_single_line() {
        let errors = [
            SearchError::from(ValidationError::InvalidPage),
            SearchError::from(ConnectionError),
            SearchError::from(ProtocolError),
            SearchError::RemoteRejection,
        ];
        for err in errors {
            let msg = err.to_string();
            assert!(!msg.is_empty());
            assert!(!msg.contains('\n'), "multi-line message: {msg}");
        }
    }

    #[test]
    fn test_connection_error_is_transparent() {
        assert_eq!(
            SearchError::from(ConnectionError).to_string(),
            "crackwatch.com could not be reached."
        );
    }
}
