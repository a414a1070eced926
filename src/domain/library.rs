use std::fmt;
use std::str::FromStr;

/// Upper bound on each seed list accepted by the recommendations endpoint.
pub const MAX_SEEDS: usize = 5;

/// Genres used when neither the caller nor the listening history yields a seed.
pub const FALLBACK_GENRES: [&str; 3] = ["pop", "rock", "indie"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeRange {
    ShortTerm,
    #[default]
    MediumTerm,
    LongTerm,
}

impl TimeRange {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ShortTerm => "short_term",
            Self::MediumTerm => "medium_term",
            Self::LongTerm => "long_term",
        }
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "short_term" => Ok(Self::ShortTerm),
            "medium_term" => Ok(Self::MediumTerm),
            "long_term" => Ok(Self::LongTerm),
            other => Err(format!("Invalid time_range '{other}': expected short_term, medium_term or long_term")),
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Page size for upstream list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit(u8);

impl Limit {
    pub const MAX_PAGE: u8 = 50;
    pub const MAX_RECOMMENDATIONS: u8 = 100;

    /// Parses an optional query value, falling back to `default` when absent.
    ///
    /// # Errors
    /// Returns a message suitable for the client if the value is not an integer in `1..=max`.
    pub fn parse(raw: Option<&str>, default: u8, max: u8) -> Result<Self, String> {
        let Some(raw) = raw else {
            return Ok(Self(default));
        };

        match raw.trim().parse::<u8>() {
            Ok(value) if (1..=max).contains(&value) => Ok(Self(value)),
            _ => Err(format!("Invalid limit '{raw}': expected an integer between 1 and {max}")),
        }
    }

    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: String,
    pub name: Option<String>,
    pub followers: u64,
    pub image: Option<String>,
}

/// A track flattened for display: artists joined, first album image picked.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub artist: String,
    pub album: String,
    pub popularity: u32,
    pub duration_ms: u64,
    pub image: Option<String>,
    pub external_url: Option<String>,
    pub preview_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Artist {
    pub id: String,
    pub name: String,
    pub genres: Vec<String>,
    pub popularity: u32,
    pub followers: u64,
    pub image: Option<String>,
    pub external_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentTrack {
    pub played_at: String,
    pub track: Track,
}

/// Seeds for a recommendations request. Every list is cleaned on construction:
/// entries are trimmed, blanks dropped and the list cut to [`MAX_SEEDS`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedSet {
    pub tracks: Vec<String>,
    pub artists: Vec<String>,
    pub genres: Vec<String>,
}

impl SeedSet {
    /// Builds a seed set from comma-separated query values.
    #[must_use]
    pub fn from_params(tracks: Option<&str>, artists: Option<&str>, genres: Option<&str>) -> Self {
        let split = |raw: Option<&str>| {
            clean(raw.map(|s| s.split(',').map(str::to_string).collect()).unwrap_or_default())
        };
        Self { tracks: split(tracks), artists: split(artists), genres: split(genres) }
    }

    #[must_use]
    pub fn with_tracks(ids: Vec<String>) -> Self {
        Self { tracks: clean(ids), ..Self::default() }
    }

    #[must_use]
    pub fn with_artists(ids: Vec<String>) -> Self {
        Self { artists: clean(ids), ..Self::default() }
    }

    #[must_use]
    pub fn with_genres(genres: Vec<String>) -> Self {
        Self { genres: clean(genres), ..Self::default() }
    }

    #[must_use]
    pub fn fallback() -> Self {
        Self::with_genres(FALLBACK_GENRES.iter().map(|g| (*g).to_string()).collect())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty() && self.artists.is_empty() && self.genres.is_empty()
    }
}

fn clean(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .take(MAX_SEEDS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_range_parsing() {
        assert_eq!("short_term".parse::<TimeRange>().unwrap(), TimeRange::ShortTerm);
        assert_eq!("long_term".parse::<TimeRange>().unwrap(), TimeRange::LongTerm);
        assert!("forever".parse::<TimeRange>().is_err());
        assert_eq!(TimeRange::default().as_str(), "medium_term");
    }

    #[test]
    fn test_limit_parsing() {
        assert_eq!(Limit::parse(None, 50, Limit::MAX_PAGE).unwrap().get(), 50);
        assert_eq!(Limit::parse(Some("20"), 50, Limit::MAX_PAGE).unwrap().get(), 20);
        assert!(Limit::parse(Some("0"), 50, Limit::MAX_PAGE).is_err());
        assert!(Limit::parse(Some("51"), 50, Limit::MAX_PAGE).is_err());
        assert!(Limit::parse(Some("ten"), 50, Limit::MAX_PAGE).is_err());
        assert_eq!(Limit::parse(Some("100"), 20, Limit::MAX_RECOMMENDATIONS).unwrap().get(), 100);
    }

    #[test]
    fn test_seed_lists_are_truncated() {
        let seeds = SeedSet::from_params(Some("a,b,c,d,e,f,g"), None, None);
        assert_eq!(seeds.tracks, vec!["a", "b", "c", "d", "e"]);
        assert!(seeds.artists.is_empty());
    }

    #[test]
    fn test_seed_lists_drop_empty_entries() {
        let seeds = SeedSet::from_params(Some(",,"), Some("x,, y ,"), Some(""));
        assert!(seeds.tracks.is_empty());
        assert_eq!(seeds.artists, vec!["x", "y"]);
        assert!(seeds.genres.is_empty());
        assert!(!seeds.is_empty());

        assert!(SeedSet::from_params(Some(" , "), None, Some(",")).is_empty());
    }

    #[test]
    fn test_empty_entries_do_not_count_towards_the_cap() {
        let ids = ["", "1", "2", "3", "4", "5", "6"].map(str::to_string);
        let seeds = SeedSet::with_tracks(ids.to_vec());
        assert_eq!(seeds.tracks, vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn test_fallback_genres() {
        assert_eq!(SeedSet::fallback().genres, vec!["pop", "rock", "indie"]);
    }
}
