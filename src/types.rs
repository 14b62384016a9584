//! Decoded search results.
//!
//! Mirrors the `result` object of a `games.page` response. Every field is
//! optional on the wire; missing or null values decode to empty or zero so
//! that a sparse record never fails the page it is on.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::RESULTS_PER_PAGE;
use crate::date::deserialize_lenient_date;
use crate::drm::normalize_drm_names;

/// One page of search results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResults {
    /// Total number of matching games across all pages.
    #[serde(rename = "gameCount", default, deserialize_with = "null_as_default")]
    pub total_count: u64,
    /// Games on this page, in the order the service returned them.
    #[serde(default, deserialize_with = "null_as_default")]
    pub games: Vec<GameRecord>,
}

impl SearchResults {
    /// Number of pages needed to show every match.
    #[must_use]
    pub fn page_count(&self) -> u64 {
        self.total_count.div_ceil(RESULTS_PER_PAGE)
    }

    /// Whether this page holds no games.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

/// A single game entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    /// Game title.
    #[serde(rename = "title", default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Release date, `None` when unknown or unparseable.
    #[serde(rename = "releaseDate", default, deserialize_with = "deserialize_lenient_date")]
    pub release_date: Option<NaiveDate>,
    /// Raw user-submitted protection tags.
    #[serde(rename = "protections", default, deserialize_with = "null_as_default")]
    pub drm: Vec<String>,
    /// Groups credited with the crack.
    #[serde(rename = "groups", default, deserialize_with = "null_as_default")]
    pub cracked_by: Vec<String>,
    /// Crack date. `None` means the game has not been cracked.
    #[serde(rename = "crackDate", default, deserialize_with = "deserialize_lenient_date")]
    pub crack_date: Option<NaiveDate>,
    /// Number of users following the game.
    #[serde(rename = "followersCount", default, deserialize_with = "null_as_default")]
    pub followers: u64,
}

impl GameRecord {
    /// Whether the game has a crack date.
    #[must_use]
    pub fn is_cracked(&self) -> bool {
        self.crack_date.is_some()
    }

    /// Canonical protection label derived from [`Self::drm`].
    #[must_use]
    pub fn canonical_drm(&self) -> String {
        normalize_drm_names(self.drm.as_slice())
    }

    /// Cracking groups joined with `+`.
    #[must_use]
    pub fn cracked_by_label(&self) -> String {
        self.cracked_by.join("+")
    }
}

/// Treat an explicit JSON null like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_full_record() {
        let json = r#"{
            "title": "Hitman 3",
            "releaseDate": "2021-01-20T00:00:00.000Z",
            "protections": ["Denuvo", "Steam"],
            "groups": ["EMPRESS"],
            "crackDate": "2021-06-19T12:00:00.000Z",
            "followersCount": 4312,
            "image": "ignored.jpg"
        }"#;
        let game: GameRecord = serde_json::from_str(json).expect("record should decode");
        assert_eq!(game.name, "Hitman 3");
        assert_eq!(game.release_date, NaiveDate::from_ymd_opt(2021, 1, 20));
        assert_eq!(game.drm, vec!["Denuvo", "Steam"]);
        assert_eq!(game.cracked_by, vec!["EMPRESS"]);
        assert!(game.is_cracked());
        assert_eq!(game.followers, 4312);
        assert_eq!(game.canonical_drm(), "Denuvo+Steam");
        assert_eq!(game.cracked_by_label(), "EMPRESS");
    }

    #[test]
    fn test_sparse_record_uses_defaults() {
        let json = r#"{"title":"Unreleased Thing","protections":null,"groups":null,"crackDate":null,"followersCount":null}"#;
        let game: GameRecord = serde_json::from_str(json).expect("sparse record should decode");
        assert!(game.drm.is_empty());
        assert!(game.cracked_by.is_empty());
        assert!(!game.is_cracked());
        assert_eq!(game.release_date, None);
        assert_eq!(game.followers, 0);
        assert_eq!(game.canonical_drm(), "Unknown");
    }

    #[test]
    fn test_zero_crack_date_means_not_cracked() {
        let json = r#"{"title":"Pending","crackDate":"0001-01-01T00:00:00Z","releaseDate":"0001-01-01"}"#;
        let game: GameRecord = serde_json::from_str(json).expect("record should decode");
        assert!(!game.is_cracked());
        assert_eq!(game.release_date, None);
    }

    #[test]
    fn test_page_count_rounds_up() {
        let results = |total_count| SearchResults {
            total_count,
            games: Vec::new(),
        };
        assert_eq!(results(0).page_count(), 0);
        assert_eq!(results(30).page_count(), 1);
        assert_eq!(results(31).page_count(), 2);
        assert_eq!(results(95).page_count(), 4);
    }

    #[test]
    fn test_serializes_dates_as_plain_dates() {
        let game = GameRecord {
            name: "Celeste".to_string(),
            release_date: NaiveDate::from_ymd_opt(2018, 1, 25),
            ..GameRecord::default()
        };
        let value = serde_json::to_value(&game).expect("record should serialize");
        assert_eq!(value["releaseDate"], "2018-01-25");
        assert!(value["crackDate"].is_null());
    }
}
