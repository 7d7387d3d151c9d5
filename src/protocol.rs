//! Value types shared by the playlist, knowledge-graph, and page layers.
//!
//! Every type here lives for a single request. Nothing is cached or persisted;
//! each lookup re-issues its upstream queries.

/// Free-text track reference built from a playlist row or CLI arguments.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize)]
pub struct TrackQuery {
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    /// Cover already known from the playlist, used when the graph has no image.
    pub cover_image_url: Option<String>,
}

impl TrackQuery {
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            album: None,
            cover_image_url: None,
        }
    }
}

/// Knowledge-graph identifiers produced by the resolver.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ResolvedEntityRef {
    pub entity_url: String,
    pub artist_entity_url: Option<String>,
}

/// One credited performer of a work.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ArtistCredit {
    pub name: String,
    /// Empty when the credit is a placeholder for the query artist.
    pub entity_url: String,
}

/// Attribute bundle extracted for a musical work.
///
/// When `found` is false every other field holds its default. When `found`
/// is true, `artists` always has at least one entry.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize)]
pub struct TrackDetails {
    pub found: bool,
    pub entity_url: String,
    pub title: String,
    pub image: Option<String>,
    /// ISO date at day precision.
    pub release_date: Option<String>,
    pub genres: Vec<String>,
    pub producers: Vec<String>,
    pub awards: Vec<String>,
    pub artists: Vec<ArtistCredit>,
}

impl TrackDetails {
    pub fn not_found() -> Self {
        Self::default()
    }
}

/// Source category of a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationCategory {
    /// Another work by the same performer.
    SameArtist,
    /// A genre/date neighbour by a different performer.
    Discovery,
}

/// Recommended work carrying enough identifiers to deep-link without re-resolving.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RecommendationItem {
    pub title: String,
    pub artist_name: String,
    pub category: RecommendationCategory,
    pub image: Option<String>,
    pub track_entity_url: String,
    pub artist_entity_url: String,
}

/// Biography bundle for a performer entity.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize)]
pub struct ArtistDetails {
    pub found: bool,
    pub entity_url: String,
    pub name: String,
    pub image: Option<String>,
    pub bio: Option<String>,
    pub birth_date: Option<String>,
    pub death_date: Option<String>,
    pub origin_place: Option<String>,
    pub genres: Vec<String>,
}

impl ArtistDetails {
    pub fn not_found() -> Self {
        Self::default()
    }
}

/// Flat playlist row normalized from the streaming API or the backup dataset.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PlaylistTrack {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub cover_url: String,
    pub external_url: String,
}

/// Result of loading a playlist, flagged when the backup dataset was served.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PlaylistLoad {
    pub playlist_id: String,
    pub tracks: Vec<PlaylistTrack>,
    pub is_demo: bool,
}
