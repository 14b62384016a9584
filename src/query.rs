//! Search query model.
//!
//! A [`SearchQuery`] can only be built through [`SearchQuery::new`], which
//! enforces the term length limit, so an over-long term can never reach the
//! wire. Filter enums map onto the literal tokens the `games.page` method
//! expects.

use std::fmt;
use std::str::FromStr;

use crate::constants::MAX_SEARCH_TERM_LENGTH;
use crate::error::ValidationError;

/// Filter on whether a game has been cracked. Wire parameter `cracked`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CrackStatus {
    /// Cracked and uncracked games.
    #[default]
    All,
    /// Only cracked games.
    Cracked,
    /// Only uncracked games.
    Uncracked,
}

/// Filter on whether a game has been released. Wire parameter `released`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ReleaseStatus {
    /// Released and unreleased games.
    #[default]
    All,
    /// Only released games.
    Released,
    /// Only unreleased games.
    Unreleased,
}

/// Filter on studio size. Wire parameter `isAAA`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum StudioType {
    /// Every studio.
    #[default]
    All,
    /// AAA studios only.
    Aaa,
    /// Independent studios only.
    Indie,
}

/// Sort key. Wire parameter `orderType`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OrderType {
    /// Game title.
    #[default]
    Title,
    /// Release date.
    ReleaseDate,
    /// Crack date.
    CrackDate,
    /// Protection scheme.
    Drm,
    /// Cracking group.
    Group,
    /// Number of NFOs.
    NumNfos,
    /// Store price.
    Price,
    /// User ratings.
    Ratings,
    /// Comment count.
    Comments,
    /// Follower count.
    Followers,
}

/// Sort direction. Wire parameter `orderDown`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortOrder {
    /// Smallest first.
    #[default]
    Ascending,
    /// Largest first.
    Descending,
}

impl CrackStatus {
    /// Integer token sent on the wire.
    #[must_use]
    pub const fn wire_value(self) -> u8 {
        match self {
            Self::All => 0,
            Self::Cracked => 1,
            Self::Uncracked => 2,
        }
    }
}

impl ReleaseStatus {
    /// Integer token sent on the wire.
    #[must_use]
    pub const fn wire_value(self) -> u8 {
        match self {
            Self::All => 0,
            Self::Released => 1,
            Self::Unreleased => 2,
        }
    }
}

impl StudioType {
    /// Integer token sent on the wire.
    #[must_use]
    pub const fn wire_value(self) -> u8 {
        match self {
            Self::All => 0,
            Self::Aaa => 1,
            Self::Indie => 2,
        }
    }
}

impl OrderType {
    /// Every sort key, in the order the site lists them.
    pub const ALL: [Self; 10] = [
        Self::Title,
        Self::ReleaseDate,
        Self::CrackDate,
        Self::Drm,
        Self::Group,
        Self::NumNfos,
        Self::Price,
        Self::Ratings,
        Self::Comments,
        Self::Followers,
    ];

    /// String token sent on the wire.
    #[must_use]
    pub const fn wire_value(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::ReleaseDate => "releaseDate",
            Self::CrackDate => "crackDate",
            Self::Drm => "protection",
            Self::Group => "group",
            Self::NumNfos => "nfo",
            Self::Price => "price",
            Self::Ratings => "ratings",
            Self::Comments => "comments",
            Self::Followers => "followers",
        }
    }
}

impl SortOrder {
    /// Boolean token sent on the wire (`true` sorts descending).
    #[must_use]
    pub const fn order_down(self) -> bool {
        matches!(self, Self::Descending)
    }
}

impl FromStr for CrackStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "cracked" => Ok(Self::Cracked),
            "uncracked" => Ok(Self::Uncracked),
            other => Err(format!("unknown crack status '{other}' (all, cracked, uncracked)")),
        }
    }
}

impl FromStr for ReleaseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "released" => Ok(Self::Released),
            "unreleased" => Ok(Self::Unreleased),
            other => Err(format!(
                "unknown release status '{other}' (all, released, unreleased)"
            )),
        }
    }
}

impl FromStr for StudioType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "aaa" => Ok(Self::Aaa),
            "indie" => Ok(Self::Indie),
            other => Err(format!("unknown studio type '{other}' (all, aaa, indie)")),
        }
    }
}

impl FromStr for OrderType {
    type Err = String;

    /// Accepts the wire token case-insensitively (`releaseDate`, `releasedate`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|order| order.wire_value().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let keys: Vec<&str> = Self::ALL.iter().map(|o| o.wire_value()).collect();
                format!("unknown sort key '{s}' ({})", keys.join(", "))
            })
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_value())
    }
}

/// One `games.page` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    term: String,
    page: u32,
    crack_status: CrackStatus,
    release_status: ReleaseStatus,
    studio_type: StudioType,
    order_type: OrderType,
    sort_order: SortOrder,
}

impl SearchQuery {
    /// Build a query for the first page with default filters.
    ///
    /// Fails if `term` is longer than [`MAX_SEARCH_TERM_LENGTH`] characters.
    pub fn new(term: impl Into<String>) -> Result<Self, ValidationError> {
        let term = term.into();
        let len = term.chars().count();
        if len > MAX_SEARCH_TERM_LENGTH {
            return Err(ValidationError::term_too_long(len));
        }

        Ok(Self {
            term,
            page: 0,
            crack_status: CrackStatus::default(),
            release_status: ReleaseStatus::default(),
            studio_type: StudioType::default(),
            order_type: OrderType::default(),
            sort_order: SortOrder::default(),
        })
    }

    /// Set the zero-based page index.
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Set the crack status filter.
    pub fn with_crack_status(mut self, status: CrackStatus) -> Self {
        self.crack_status = status;
        self
    }

    /// Set the release status filter.
    pub fn with_release_status(mut self, status: ReleaseStatus) -> Self {
        self.release_status = status;
        self
    }

    /// Set the studio filter.
    pub fn with_studio_type(mut self, studio: StudioType) -> Self {
        self.studio_type = studio;
        self
    }

    /// Set the sort key and direction.
    pub fn with_order(mut self, order_type: OrderType, sort_order: SortOrder) -> Self {
        self.order_type = order_type;
        self.sort_order = sort_order;
        self
    }

    /// Raw search term as given.
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Zero-based page index.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Crack status filter.
    pub fn crack_status(&self) -> CrackStatus {
        self.crack_status
    }

    /// Release status filter.
    pub fn release_status(&self) -> ReleaseStatus {
        self.release_status
    }

    /// Studio filter.
    pub fn studio_type(&self) -> StudioType {
        self.studio_type
    }

    /// Sort key.
    pub fn order_type(&self) -> OrderType {
        self.order_type
    }

    /// Sort direction.
    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }
}
