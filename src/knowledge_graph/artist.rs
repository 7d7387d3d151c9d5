//! Biography lookup for a performer entity.

use super::details::truncate_to_day;
use super::packing::unpack_labels;
use super::queries::{artist_query, entity_id_from_url};
use super::sparql_client::{SparqlExecutor, SparqlRow};
use super::LookupOutcome;
use crate::protocol::ArtistDetails;

fn artist_from_row(entity_url: &str, row: &SparqlRow) -> ArtistDetails {
    ArtistDetails {
        found: true,
        entity_url: entity_url.to_string(),
        name: row.text("name").unwrap_or(entity_url).to_string(),
        image: row.text("image").map(str::to_string),
        bio: row.text("description").map(str::to_string),
        birth_date: row.text("birthDate").and_then(truncate_to_day),
        death_date: row.text("deathDate").and_then(truncate_to_day),
        origin_place: row.text("origin").map(str::to_string),
        genres: unpack_labels(row.text("genres").unwrap_or_default()),
    }
}

pub fn artist_details(
    executor: &dyn SparqlExecutor,
    languages: &[String],
    artist_entity_url: &str,
) -> LookupOutcome<ArtistDetails> {
    let Some(artist_id) = entity_id_from_url(artist_entity_url) else {
        return LookupOutcome::NotFound;
    };
    let query = artist_query(artist_id, languages);
    executor
        .select("artist", &query)
        .map(|rows| {
            rows.first()
                .map(|row| artist_from_row(artist_entity_url.trim(), row))
        })
        .into()
}
