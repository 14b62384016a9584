//! Search orchestration: one query, one fresh session, one result.
//!
//! [`CrackwatchClient`] composes a [`Connector`] with the wire codec. Every
//! call opens its own session, so concurrent calls share nothing and need no
//! locking. The session is closed on every exit path.

use std::time::Duration;

use crate::codec::{self, Frame};
use crate::config::Config;
use crate::error::{ConnectionError, Result, SearchError, ValidationError};
use crate::query::SearchQuery;
use crate::session::{Connector, FrameTransport, WebSocketConnector};
use crate::types::SearchResults;

/// Search `term` on the given 1-based `page` with default filters.
///
/// Uses the built-in [`Config`] defaults and never reads configuration files
/// or the environment. Callers that want those build a client from
/// [`Config::load`]. See [`CrackwatchClient::search`].
pub async fn search(term: &str, page: u32) -> Result<SearchResults> {
    CrackwatchClient::default().search(term, page).await
}

/// Client for the crackwatch search method.
#[derive(Debug)]
pub struct CrackwatchClient<C = WebSocketConnector> {
    connector: C,
    endpoint: String,
    receive_timeout: Duration,
}

impl CrackwatchClient<WebSocketConnector> {
    /// Build a client that connects over real websockets.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let connector = WebSocketConnector::new(config.connect_timeout());
        Self::with_connector(config, connector)
    }
}

impl Default for CrackwatchClient<WebSocketConnector> {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl<C: Connector> CrackwatchClient<C> {
    /// Build a client on top of an arbitrary [`Connector`].
    pub fn with_connector(config: Config, connector: C) -> Self {
        Self {
            connector,
            receive_timeout: config.receive_timeout(),
            endpoint: config.endpoint,
        }
    }

    /// Endpoint every session of this client dials.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Receive deadline applied to each exchange.
    pub fn receive_timeout(&self) -> Duration {
        self.receive_timeout
    }

    /// Search `term` on the given 1-based `page` with default filters
    /// (all statuses, title ascending).
    ///
    /// Input is validated before any connection is opened.
    pub async fn search(&self, term: &str, page: u32) -> Result<SearchResults> {
        let page_index = page.checked_sub(1).ok_or(ValidationError::InvalidPage)?;
        let query = SearchQuery::new(term)?.with_page(page_index);
        self.search_query(&query).await
    }

    /// Run an already-built query.
    pub async fn search_query(&self, query: &SearchQuery) -> Result<SearchResults> {
        let mut session = self.connector.open(&self.endpoint).await?;
        let result = self.exchange(session.as_mut(), query).await;
        session.close().await;
        result
    }

    async fn exchange(
        &self,
        session: &mut dyn FrameTransport,
        query: &SearchQuery,
    ) -> Result<SearchResults> {
        session.send_frame(&codec::encode_query(query)).await?;

        if let Ok(result) = tokio::time::timeout(self.receive_timeout, wait_for_results(session)).await {
            result
        } else {
            log::warn!(
                "[Search] No response for {:?} within {:?}",
                query.term(),
                self.receive_timeout
            );
            Err(ConnectionError.into())
        }
    }
}

/// Read frames until a result or a rejection arrives.
///
/// Every other frame is protocol noise and is skipped.
async fn wait_for_results(session: &mut dyn FrameTransport) -> Result<SearchResults> {
    loop {
        let frame = session.receive_frame().await?;

        match codec::classify(&frame) {
            Frame::Result(payload) => return Ok(codec::decode_result(payload)?),
            Frame::ErrorResponse => {
                log::warn!("[Search] Received a \"Bad request\" response");
                return Err(SearchError::RemoteRejection);
            }
            Frame::Other => {
                log::trace!("[Search] Skipping frame: {}", frame);
            }
        }
    }
}
