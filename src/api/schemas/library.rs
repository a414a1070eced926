use crate::domain::library::{Artist, RecentTrack, Track, UserProfile};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct TopItemsQuery {
    pub time_range: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecentTracksQuery {
    pub limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecommendationsQuery {
    pub seed_tracks: Option<String>,
    pub seed_artists: Option<String>,
    pub seed_genres: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: Option<String>,
    pub followers: u64,
    pub image: Option<String>,
}

impl From<UserProfile> for User {
    fn from(profile: UserProfile) -> Self {
        Self { id: profile.id, name: profile.name, followers: profile.followers, image: profile.image }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TopTrack {
    pub id: String,
    pub name: String,
    pub artist: String,
    pub album: String,
    pub popularity: u32,
    pub duration_ms: u64,
    pub image: Option<String>,
    pub external_url: Option<String>,
}

impl From<Track> for TopTrack {
    fn from(track: Track) -> Self {
        Self {
            id: track.id,
            name: track.name,
            artist: track.artist,
            album: track.album,
            popularity: track.popularity,
            duration_ms: track.duration_ms,
            image: track.image,
            external_url: track.external_url,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TopArtist {
    pub id: String,
    pub name: String,
    pub genres: Vec<String>,
    pub popularity: u32,
    pub followers: u64,
    pub image: Option<String>,
    pub external_url: Option<String>,
}

impl From<Artist> for TopArtist {
    fn from(artist: Artist) -> Self {
        Self {
            id: artist.id,
            name: artist.name,
            genres: artist.genres,
            popularity: artist.popularity,
            followers: artist.followers,
            image: artist.image,
            external_url: artist.external_url,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlayedTrack {
    pub played_at: String,
    pub id: String,
    pub name: String,
    pub artist: String,
    pub album: String,
    pub duration_ms: u64,
    pub image: Option<String>,
    pub external_url: Option<String>,
}

impl From<RecentTrack> for PlayedTrack {
    fn from(recent: RecentTrack) -> Self {
        let track = recent.track;
        Self {
            played_at: recent.played_at,
            id: track.id,
            name: track.name,
            artist: track.artist,
            album: track.album,
            duration_ms: track.duration_ms,
            image: track.image,
            external_url: track.external_url,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Recommendation {
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

impl From<Track> for Recommendation {
    fn from(track: Track) -> Self {
        Self {
            id: track.id,
            name: track.name,
            artist: track.artist,
            album: track.album,
            popularity: track.popularity,
            duration_ms: track.duration_ms,
            image: track.image,
            external_url: track.external_url,
            preview_url: track.preview_url,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TopTracks {
    pub tracks: Vec<TopTrack>,
    pub time_range: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TopArtists {
    pub artists: Vec<TopArtist>,
    pub time_range: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecentTracks {
    pub tracks: Vec<PlayedTrack>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Recommendations {
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Genres {
    pub genres: Vec<String>,
}
