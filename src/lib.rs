//! Crackwatch - protocol client for crackwatch.com game searches.
//!
//! This crate talks to the crackwatch SockJS/DDP websocket, sends one
//! `games.page` query per call, and turns the loosely-typed, user-submitted
//! response into a typed [`SearchResults`].
//!
//! # Architecture
//!
//! Data flows one way per call:
//!
//! - **Search** - validates input, owns the session for one exchange
//! - **Session** - websocket transport and handshake, frames in and out
//! - **Codec** - double-encoded JSON frames, classification, decoding
//! - **Date** / **DRM** - tolerant field cleanup for dirty upstream data
//!
//! # Modules
//!
//! - [`search`] - public entry points
//! - [`session`] - connection session and transport traits
//! - [`codec`] - wire encoding and decoding
//! - [`drm`] - protection tag normalization
//! - [`config`] - configuration loading

pub mod codec;
pub mod config;
pub mod constants;
pub mod date;
pub mod drm;
pub mod error;
pub mod query;
pub mod search;
pub mod session;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use drm::normalize_drm_names;
pub use error::{ConnectionError, ProtocolError, SearchError, ValidationError};
pub use query::{CrackStatus, OrderType, ReleaseStatus, SearchQuery, SortOrder, StudioType};
pub use search::{search, CrackwatchClient};
pub use types::{GameRecord, SearchResults};
