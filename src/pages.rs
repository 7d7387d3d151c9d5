//! Page assembly for the playlist, track, and artist views.
//!
//! Pages are plain serializable values. Absent data is rendered with display
//! defaults here so the presentation layer never sees a missing field.

use std::thread;

use log::debug;
use serde::Serialize;

use crate::config::DisplayConfig;
use crate::knowledge_graph::KnowledgeGraphService;
use crate::playlist_link::extract_playlist_id;
use crate::playlist_source::PlaylistSource;
use crate::protocol::{
    ArtistCredit, ArtistDetails, PlaylistLoad, RecommendationItem, ResolvedEntityRef,
    TrackDetails, TrackQuery,
};

pub const NOT_AVAILABLE: &str = "N/A";

/// Comma-joined list, or `N/A` when empty.
pub fn display_list(values: &[String]) -> String {
    if values.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        values.join(", ")
    }
}

/// Trimmed text, or `N/A` when absent or blank.
pub fn display_text(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(NOT_AVAILABLE)
        .to_string()
}

pub fn display_date(date: Option<&str>) -> String {
    display_text(date)
}

#[derive(Debug, Clone, Serialize)]
pub struct PlaylistPage {
    pub source_link: String,
    #[serde(flatten)]
    pub load: PlaylistLoad,
}

pub fn build_playlist_page(source: &PlaylistSource, link: &str) -> PlaylistPage {
    let playlist_id = extract_playlist_id(link);
    PlaylistPage {
        source_link: link.trim().to_string(),
        load: source.load(&playlist_id),
    }
}

/// Artist card on the track page. `details` is `None` for placeholder credits.
#[derive(Debug, Clone, Serialize)]
pub struct ArtistCard {
    pub name: String,
    pub entity_url: String,
    pub found: bool,
    pub details: Option<ArtistPage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArtistPage {
    #[serde(flatten)]
    pub details: ArtistDetails,
    pub image_display: String,
    pub birth_date_display: String,
    pub death_date_display: String,
    pub origin_display: String,
    pub genres_display: String,
}

impl ArtistPage {
    fn new(details: ArtistDetails, display: &DisplayConfig) -> Self {
        Self {
            image_display: details
                .image
                .clone()
                .unwrap_or_else(|| display.placeholder_image_url.clone()),
            birth_date_display: display_date(details.birth_date.as_deref()),
            death_date_display: display_date(details.death_date.as_deref()),
            origin_display: display_text(details.origin_place.as_deref()),
            genres_display: display_list(&details.genres),
            details,
        }
    }
}

pub fn build_artist_page(
    graph: &KnowledgeGraphService,
    display: &DisplayConfig,
    artist_entity_url: &str,
) -> ArtistPage {
    ArtistPage::new(graph.artist_details(artist_entity_url), display)
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackPage {
    pub query: TrackQuery,
    pub resolved: Option<ResolvedEntityRef>,
    pub details: TrackDetails,
    pub image: String,
    pub release_date_display: String,
    pub genres_display: String,
    pub producers_display: String,
    pub awards_display: String,
    pub artist_cards: Vec<ArtistCard>,
    pub recommendations: Vec<RecommendationItem>,
}

fn artist_card(
    graph: &KnowledgeGraphService,
    display: &DisplayConfig,
    credit: &ArtistCredit,
) -> ArtistCard {
    if credit.entity_url.is_empty() {
        return ArtistCard {
            name: credit.name.clone(),
            entity_url: String::new(),
            found: false,
            details: None,
        };
    }
    let page = build_artist_page(graph, display, &credit.entity_url);
    ArtistCard {
        name: credit.name.clone(),
        entity_url: credit.entity_url.clone(),
        found: page.details.found,
        details: Some(page),
    }
}

/// Credits shown on the page: the graph's performers, or the query artist alone.
fn page_credits(details: &TrackDetails, query: &TrackQuery) -> Vec<ArtistCredit> {
    if details.artists.is_empty() {
        vec![ArtistCredit {
            name: query.artist.trim().to_string(),
            entity_url: String::new(),
        }]
    } else {
        details.artists.clone()
    }
}

fn with_placeholder_images(
    items: Vec<RecommendationItem>,
    display: &DisplayConfig,
) -> Vec<RecommendationItem> {
    items
        .into_iter()
        .map(|mut item| {
            if item.image.is_none() {
                item.image = Some(display.recommendation_placeholder_image_url.clone());
            }
            item
        })
        .collect()
}

/// Resolves the query, extracts details, then fetches artist cards and
/// recommendations concurrently.
pub fn build_track_page(
    graph: &KnowledgeGraphService,
    display: &DisplayConfig,
    query: TrackQuery,
) -> TrackPage {
    let resolved = graph.resolve(&query.title, &query.artist);
    let details = match &resolved {
        Some(entity_ref) => graph.extract_details(
            entity_ref,
            &query.artist,
            query.cover_image_url.as_deref(),
        ),
        None => TrackDetails::not_found(),
    };
    let credits = page_credits(&details, &query);

    let track_url = resolved
        .as_ref()
        .filter(|_| details.found)
        .map(|entity_ref| entity_ref.entity_url.as_str());
    let artist_url = resolved
        .as_ref()
        .and_then(|entity_ref| entity_ref.artist_entity_url.as_deref())
        .or_else(|| {
            credits
                .iter()
                .map(|credit| credit.entity_url.as_str())
                .find(|url| !url.is_empty())
        });

    let (artist_cards, recommendations) = thread::scope(|scope| {
        let card_handles: Vec<_> = credits
            .iter()
            .map(|credit| scope.spawn(move || artist_card(graph, display, credit)))
            .collect();
        let recommendations = graph.recommend(track_url, artist_url);
        let cards = card_handles
            .into_iter()
            .zip(credits.iter())
            .map(|(handle, credit)| {
                handle.join().unwrap_or_else(|_| ArtistCard {
                    name: credit.name.clone(),
                    entity_url: credit.entity_url.clone(),
                    found: false,
                    details: None,
                })
            })
            .collect::<Vec<_>>();
        (cards, recommendations)
    });
    debug!(
        "Page[track]: '{}' found={} cards={} recommendations={}",
        query.title,
        details.found,
        artist_cards.len(),
        recommendations.len()
    );

    let image = details
        .image
        .clone()
        .or_else(|| {
            query
                .cover_image_url
                .clone()
                .filter(|url| !url.trim().is_empty())
        })
        .unwrap_or_else(|| display.placeholder_image_url.clone());

    TrackPage {
        release_date_display: display_date(details.release_date.as_deref()),
        genres_display: display_list(&details.genres),
        producers_display: display_list(&details.producers),
        awards_display: display_list(&details.awards),
        image,
        artist_cards,
        recommendations: with_placeholder_images(recommendations, display),
        query,
        resolved,
        details,
    }
}
