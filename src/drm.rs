//! DRM name normalization.
//!
//! Protection names on crackwatch are user-submitted with every spelling and
//! capitalization imaginable, when they are correct at all. This maps the
//! known raw tags onto a small set of display names and folds everything
//! else into [`DRM_UNKNOWN`]. It is best-effort; there is no attempt to
//! classify every tag.

use std::collections::{HashMap, HashSet};
use std::sync::{LazyLock, Mutex};

/// Display name for a protection scheme that cannot be identified.
pub const DRM_UNKNOWN: &str = "Unknown";
/// Display name for CD/DVD presence checks.
pub const DRM_DISC_CHECK: &str = "Disc Check";
/// Display name for DRM-free releases.
pub const DRM_NONE: &str = "None";
/// Display name for console-only releases.
pub const DRM_CONSOLE: &str = "Console";

/// Lower-cased raw tag to display name.
///
/// Tags that name a publisher, platform, or store without saying anything
/// about protection map to [`DRM_UNKNOWN`].
static DRM_NAME_TABLE: &[(&str, &str)] = &[
    ("", DRM_UNKNOWN),
    ("-", DRM_UNKNOWN),
    ("activation", DRM_UNKNOWN),
    ("activision", DRM_UNKNOWN),
    ("amazon", "Amazon"),
    ("andmicrosoftwindows", DRM_UNKNOWN),
    ("arcade", DRM_UNKNOWN),
    ("arcsystemworks", DRM_UNKNOWN),
    ("armadillo", "Armadillo"),
    ("arxan", "Arxan"),
    ("ascgames", DRM_UNKNOWN),
    ("atarisa", DRM_UNKNOWN),
    ("battleeye", DRM_UNKNOWN),
    ("battle.net", "Battle.net"),
    ("battlenet", "Battle.net"),
    ("battlenet-arxan", "Battle.net/Arxan"),
    ("bethesda", DRM_UNKNOWN),
    ("bigfish", DRM_UNKNOWN),
    ("blitsgames", DRM_UNKNOWN),
    ("catalyst", "Catalyst"),
    ("cdautokey", DRM_DISC_CHECK),
    ("cd-check", DRM_DISC_CHECK),
    ("cdcheck", DRM_DISC_CHECK),
    ("cdcheck/re-index", DRM_DISC_CHECK),
    ("cd-checks", DRM_DISC_CHECK),
    ("cdchecks", DRM_DISC_CHECK),
    ("cd-cops", "CD-Cops"),
    ("cddilla", "C-Dilla"),
    ("cdilla", "C-Dilla"),
    ("cd-key", "Serial"),
    ("cd rom", DRM_DISC_CHECK),
    ("cd-rom", DRM_DISC_CHECK),
    ("codecheck", "Code Check"),
    ("codewheel", "Code Wheel"),
    ("colorcodes", "Color Codes"),
    ("copylock", "CopyLok"),
    ("copylok", "CopyLok"),
    ("coredesign", DRM_UNKNOWN),
    ("denuvo", "Denuvo"),
    ("denuvo+origin", "Denuvo/Origin"),
    ("denuvo+uplay", "Denuvo/Uplay"),
    ("denuvo+vmpotect", "Denuvo/VMProtect"),
    ("deutschland-spielt", DRM_UNKNOWN),
    ("disc check", DRM_DISC_CHECK),
    ("disccheck", DRM_DISC_CHECK),
    ("doccheck", DRM_UNKNOWN),
    ("dos", DRM_UNKNOWN),
    ("dreamcast", DRM_CONSOLE),
    ("dreamforgeintertainment", DRM_UNKNOWN),
    ("drm", DRM_UNKNOWN),
    ("drm free", DRM_NONE),
    ("drm-free", DRM_NONE),
    ("drmfree", DRM_NONE),
    ("drmfreegog", DRM_NONE),
    ("dvd drm", DRM_UNKNOWN),
    ("dvddrm", DRM_UNKNOWN),
    ("dvd-rom", DRM_UNKNOWN),
    ("eac", DRM_UNKNOWN),
    ("eappx", "EAppX"),
    ("eidosinteractive", DRM_UNKNOWN),
    ("electronicarts", DRM_UNKNOWN),
    ("e-license", "eLicense"),
    ("epic", "Epic Games"),
    ("epicgames", "Epic Games"),
    ("false", DRM_UNKNOWN),
    ("fileintegrity", "File Integrity"),
    ("free", DRM_UNKNOWN),
    ("free2play", DRM_UNKNOWN),
    ("free-to-play", DRM_UNKNOWN),
    ("gamejolt", DRM_NONE),
    ("games for windows", "Games for Windows Live"),
    ("gameshield", "GameShield"),
    ("gog", DRM_NONE),
    ("gog.com", DRM_NONE),
    ("gog/steam", DRM_NONE),
    ("icantfindthisgameonanygamestoreplatform", DRM_UNKNOWN),
    ("igc-dvd", DRM_UNKNOWN),
    ("interactivision a/s", DRM_UNKNOWN),
    ("ios/android", "Mobile"),
    ("ironwrap", "GameShield"),
    ("jowood", DRM_UNKNOWN),
    ("konami", DRM_UNKNOWN),
    ("laserlock", "LaserLock"),
    ("magnussoft", DRM_UNKNOWN),
    ("microids", DRM_UNKNOWN),
    ("microsoft", DRM_UNKNOWN),
    ("microsoftslps", "Microsoft SLPS"),
    ("microsoftstore", "Microsoft Store"),
    ("microsoftwindows", DRM_UNKNOWN),
    ("mmo", DRM_UNKNOWN),
    ("moby", DRM_UNKNOWN),
    ("ms-dos", DRM_UNKNOWN),
    ("myswooop", DRM_UNKNOWN),
    ("n/a", DRM_UNKNOWN),
    ("nes", DRM_CONSOLE),
    ("nintendo", DRM_CONSOLE),
    ("nintendo exclusive", DRM_CONSOLE),
    ("nintendoswitch", DRM_CONSOLE),
    ("no-drm", DRM_NONE),
    ("nodrm", DRM_NONE),
    ("none", DRM_NONE),
    ("nothing", DRM_NONE),
    ("notspecified", DRM_UNKNOWN),
    ("novalogic", DRM_UNKNOWN),
    ("oculus", DRM_UNKNOWN),
    ("origin", "Origin"),
    ("patreon", DRM_UNKNOWN),
    ("pc", DRM_UNKNOWN),
    ("pc-dos", DRM_UNKNOWN),
    ("pc-spiel", DRM_UNKNOWN),
    ("play+smile", DRM_UNKNOWN),
    ("playstation3/xbox360", DRM_CONSOLE),
    ("playstation/ios", DRM_CONSOLE),
    ("popcap", DRM_UNKNOWN),
    ("protectcd", "ProtectDISC CD"),
    ("protectcd8", "ProtectDISC CD"),
    ("protectdvd", "ProtectDISC DVD"),
    ("reroute", DRM_UNKNOWN),
    ("re-route/size", DRM_UNKNOWN),
    ("retail", DRM_UNKNOWN),
    ("ring", DRM_UNKNOWN),
    ("rockstar", "Rockstar Social Club"),
    ("safedisc", "SafeDisc"),
    ("safedisc2", "SafeDisc v2"),
    ("safedisc4", "SafeDisc v4"),
    ("safedisk", "SafeDisc"),
    ("securom", "SecuROM"),
    ("serial", "Serial"),
    ("serialnumber", "Serial"),
    ("solidshield", "Solidshield"),
    ("stadia", "Google Stadia"),
    ("starforce", "StarForce"),
    ("steam", "Steam"),
    ("steam/arc", "Steam"),
    ("steam/free", "Steam"),
    ("steam/origin", "Steam/Origin"),
    ("steam+uplay", "Steam/Uplay"),
    ("tlgames", DRM_UNKNOWN),
    ("tages", "Tagès"),
    ("tbd", DRM_UNKNOWN),
    ("themida", "Themida"),
    ("ubisoft", DRM_UNKNOWN),
    ("ump", DRM_UNKNOWN),
    ("unknown", DRM_UNKNOWN),
    ("uplay", "Uplay"),
    ("uplay/denuvo", "Uplay/Denuvo"),
    ("uwp", "UWP"),
    ("uwp-arxan", "UWP/Arxan"),
    ("uwp/steam", "UWP/Steam"),
    ("valeroa", "Valeroa"),
    ("vista", DRM_UNKNOWN),
    ("vmprotect", "VMProtect"),
    ("vob/protectcd", "ProtectDISC CD"),
    ("wildgames", DRM_UNKNOWN),
    ("wildtangent", "WildTangent"),
    ("windows", DRM_UNKNOWN),
    ("xbox", DRM_CONSOLE),
    ("xboxlive", DRM_CONSOLE),
    ("ysiphus", DRM_UNKNOWN),
    ("zagravagames", DRM_UNKNOWN),
];

static DRM_NAMES: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| DRM_NAME_TABLE.iter().copied().collect());

static DEFAULT_NORMALIZER: LazyLock<DrmNormalizer> = LazyLock::new(DrmNormalizer::new);

/// Look up the display name for a single raw tag.
///
/// Returns `None` when the tag is not in the table at all.
#[must_use]
pub fn canonical_name(raw: &str) -> Option<&'static str> {
    DRM_NAMES.get(raw.to_lowercase().as_str()).copied()
}

/// Normalize raw tags with the process-wide normalizer.
///
/// See [`DrmNormalizer::normalize`].
#[must_use]
pub fn normalize_drm_names<S: AsRef<str>>(raw_tags: &[S]) -> String {
    DEFAULT_NORMALIZER.normalize(raw_tags)
}

/// Default number of distinct unrecognized tags a normalizer remembers.
pub const MAX_TRACKED_UNRECOGNIZED: usize = 1024;

/// Reduces a list of raw tags to one display string.
///
/// Tracks tags missing from the table so each one is logged once. The record
/// lives as long as the normalizer (for [`normalize_drm_names`], the process)
/// and holds at most `limit` tags. Once full, further new tags are still
/// dropped but logged at debug level on every sighting.
#[derive(Debug)]
pub struct DrmNormalizer {
    unrecognized: Mutex<HashSet<String>>,
    limit: usize,
}

impl Default for DrmNormalizer {
    fn default() -> Self {
        Self::with_limit(MAX_TRACKED_UNRECOGNIZED)
    }
}

impl DrmNormalizer {
    /// Create a normalizer with an empty unrecognized-tag record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a normalizer that remembers at most `limit` unrecognized tags.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            unrecognized: Mutex::new(HashSet::new()),
            limit,
        }
    }

    /// Map each tag to its display name and join the results with `+`.
    ///
    /// Tags that resolve to [`DRM_UNKNOWN`], including tags missing from the
    /// table, are dropped. If nothing is left the result is [`DRM_UNKNOWN`].
    /// Input order is preserved and duplicates are kept.
    pub fn normalize<S: AsRef<str>>(&self, raw_tags: &[S]) -> String {
        let names: Vec<&'static str> = raw_tags
            .iter()
            .map(|tag| self.resolve(tag.as_ref()))
            .filter(|name| *name != DRM_UNKNOWN)
            .collect();

        if names.is_empty() {
            return DRM_UNKNOWN.to_string();
        }

        names.join("+")
    }

    /// Tags seen so far that are not in the table, sorted.
    #[must_use]
    pub fn unrecognized_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.lock_unrecognized().iter().cloned().collect();
        tags.sort();
        tags
    }

    fn resolve(&self, raw: &str) -> &'static str {
        let tag = raw.to_lowercase();
        if let Some(name) = DRM_NAMES.get(tag.as_str()).copied() {
            return name;
        }

        let mut unrecognized = self.lock_unrecognized();
        if unrecognized.contains(&tag) {
            return DRM_UNKNOWN;
        }
        if unrecognized.len() < self.limit {
            log::info!("[Drm] First time coming across the DRM name {:?}", tag);
            unrecognized.insert(tag);
        } else {
            log::debug!("[Drm] Unrecognized DRM name {:?} (record full)", tag);
        }
        DRM_UNKNOWN
    }

    fn lock_unrecognized(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        // The set only feeds logging; a poisoned lock still holds usable data.
        self.unrecognized
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
