//! Attribute extraction for a resolved work.

use super::packing::{unpack_entities, unpack_labels};
use super::queries::{details_query, entity_id_from_url};
use super::sparql_client::{SparqlExecutor, SparqlRow};
use super::LookupOutcome;
use crate::protocol::{ArtistCredit, ResolvedEntityRef, TrackDetails};

/// Values used when the graph leaves a field empty.
pub struct DetailFallbacks<'a> {
    /// Credited as the sole artist when the work links no performer.
    pub query_artist: &'a str,
    /// Typically the playlist cover.
    pub image_override: Option<&'a str>,
    pub placeholder_image_url: &'a str,
}

/// Cuts an xsd:dateTime down to its day (`1975-10-31T00:00:00Z` -> `1975-10-31`).
pub fn truncate_to_day(raw: &str) -> Option<String> {
    let day = raw.trim().split('T').next().unwrap_or_default().trim();
    (!day.is_empty()).then(|| day.to_string())
}

fn pick_image(graph_image: Option<&str>, fallbacks: &DetailFallbacks<'_>) -> String {
    graph_image
        .or(fallbacks
            .image_override
            .map(str::trim)
            .filter(|url| !url.is_empty()))
        .unwrap_or(fallbacks.placeholder_image_url)
        .to_string()
}

fn artist_credits(row: &SparqlRow, query_artist: &str) -> Vec<ArtistCredit> {
    let credits: Vec<ArtistCredit> = unpack_entities(row.text("artists").unwrap_or_default())
        .into_iter()
        .map(|entity| ArtistCredit {
            name: entity.label,
            entity_url: entity.entity_url,
        })
        .collect();
    if credits.is_empty() {
        return vec![ArtistCredit {
            name: query_artist.trim().to_string(),
            entity_url: String::new(),
        }];
    }
    credits
}

fn details_from_row(
    entity_url: &str,
    row: &SparqlRow,
    fallbacks: &DetailFallbacks<'_>,
) -> TrackDetails {
    TrackDetails {
        found: true,
        entity_url: entity_url.to_string(),
        title: row.text("title").unwrap_or(entity_url).to_string(),
        image: Some(pick_image(row.text("image"), fallbacks)),
        release_date: row.text("releaseDate").and_then(truncate_to_day),
        genres: unpack_labels(row.text("genres").unwrap_or_default()),
        producers: unpack_labels(row.text("producers").unwrap_or_default()),
        awards: unpack_labels(row.text("awards").unwrap_or_default()),
        artists: artist_credits(row, fallbacks.query_artist),
    }
}

/// Runs the aggregate query for `entity_ref` and decodes its single row.
pub fn extract_details(
    executor: &dyn SparqlExecutor,
    languages: &[String],
    entity_ref: &ResolvedEntityRef,
    fallbacks: &DetailFallbacks<'_>,
) -> LookupOutcome<TrackDetails> {
    let Some(song_id) = entity_id_from_url(&entity_ref.entity_url) else {
        return LookupOutcome::NotFound;
    };
    let query = details_query(song_id, languages);
    executor
        .select("details", &query)
        .map(|rows| {
            rows.first()
                .map(|row| details_from_row(&entity_ref.entity_url, row, fallbacks))
        })
        .into()
}
