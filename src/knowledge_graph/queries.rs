//! SPARQL text for every lookup.
//!
//! Free text is only ever interpolated inside string literals after
//! [`sanitize_literal`]; entity references only after [`entity_id_from_url`]
//! has reduced them to a bare `Q<digits>` identifier.

use super::labels::{description_chain_clause, label_chain_clause};
use super::packing::{group_concat_projection, pack_expression};

/// "musical work/composition"; resolved works must be an instance of it or of a subclass.
pub const MUSICAL_WORK_CLASS: &str = "Q2188189";
/// "song"; recommendation candidates are direct instances of it.
pub const SONG_CLASS: &str = "Q7366";
pub const RECOMMENDATION_LIMIT: usize = 5;
pub const DISCOVERY_YEAR_WINDOW: i32 = 4;

/// Removes characters that would terminate or corrupt a SPARQL string literal.
/// Everything else, including whitespace, case, and diacritics, is kept verbatim.
pub fn sanitize_literal(text: &str) -> String {
    text.chars()
        .filter(|ch| !matches!(ch, '"' | '\\' | '\n' | '\r'))
        .collect()
}

/// Extracts `Q<digits>` from an entity url (http or https) or a bare identifier.
pub fn entity_id_from_url(entity_url: &str) -> Option<&str> {
    let trimmed = entity_url
        .trim()
        .trim_start_matches('<')
        .trim_end_matches('>');
    let id = trimmed.rsplit('/').next()?;
    let digits = id.strip_prefix('Q')?;
    let is_entity_path = trimmed == id
        || trimmed.starts_with("http://www.wikidata.org/entity/")
        || trimmed.starts_with("https://www.wikidata.org/entity/")
        || trimmed.starts_with("https://www.wikidata.org/wiki/");
    (is_entity_path && !digits.is_empty() && digits.chars().all(|ch| ch.is_ascii_digit()))
        .then_some(id)
}

fn entity_search_service(search: &str, language: &str, output_var: &str) -> String {
    format!(
        "SERVICE wikibase:mwapi {{
    bd:serviceParam wikibase:api \"EntitySearch\" .
    bd:serviceParam wikibase:endpoint \"www.wikidata.org\" .
    bd:serviceParam mwapi:search \"{search}\" .
    bd:serviceParam mwapi:language \"{language}\" .
    ?{output_var} wikibase:apiOutputItem mwapi:item .
  }}"
    )
}

/// Free-text search for a musical work performed by a matching artist. First match only.
pub fn resolve_query(title: &str, artist: &str, search_language: &str) -> String {
    format!(
        "SELECT ?song ?artist WHERE {{
  {artist_search}
  {title_search}
  ?song wdt:P175 ?artist .
  ?song wdt:P31/wdt:P279* wd:{MUSICAL_WORK_CLASS} .
}}
LIMIT 1",
        artist_search = entity_search_service(artist, search_language, "artist"),
        title_search = entity_search_service(title, search_language, "song"),
    )
}

fn packed_optional(
    subject_var: &str,
    property: &str,
    entity_var: &str,
    languages: &[String],
) -> String {
    let name_var = format!("{entity_var}Name");
    let pack_var = format!("{entity_var}Pack");
    format!(
        "OPTIONAL {{
  ?{subject_var} wdt:{property} ?{entity_var} .
{chain}  BIND({pack} AS ?{pack_var})
}}",
        chain = label_chain_clause(entity_var, &name_var, languages),
        pack = pack_expression(&name_var, entity_var),
    )
}

/// Aggregate attribute query for one work.
pub fn details_query(song_id: &str, languages: &[String]) -> String {
    format!(
        "SELECT ?song
  (SAMPLE(?songName) AS ?title)
  (SAMPLE(?img) AS ?image)
  (MIN(?date) AS ?releaseDate)
  {genres}
  {producers}
  {awards}
  {artists}
WHERE {{
BIND(wd:{song_id} AS ?song)
FILTER EXISTS {{ ?song wdt:P31 ?anyType . }}
{song_chain}OPTIONAL {{ ?song wdt:P18 ?img . }}
OPTIONAL {{ ?song wdt:P577 ?date . }}
{genre_block}
{producer_block}
{award_block}
{artist_block}
}}
GROUP BY ?song",
        genres = group_concat_projection("genrePack", "genres"),
        producers = group_concat_projection("producerPack", "producers"),
        awards = group_concat_projection("awardPack", "awards"),
        artists = group_concat_projection("performerPack", "artists"),
        song_chain = label_chain_clause("song", "songName", languages),
        genre_block = packed_optional("song", "P136", "genre", languages),
        producer_block = packed_optional("song", "P162", "producer", languages),
        award_block = packed_optional("song", "P166", "award", languages),
        artist_block = packed_optional("song", "P175", "performer", languages),
    )
}

/// Aggregate biography query for one performer.
pub fn artist_query(artist_id: &str, languages: &[String]) -> String {
    format!(
        "SELECT ?artist
  (SAMPLE(?artistName) AS ?name)
  (SAMPLE(?img) AS ?image)
  (SAMPLE(?bio) AS ?description)
  (MIN(?birth) AS ?birthDate)
  (MIN(?death) AS ?deathDate)
  (SAMPLE(?placeName) AS ?origin)
  {genres}
WHERE {{
BIND(wd:{artist_id} AS ?artist)
FILTER EXISTS {{ ?artist rdfs:label ?anyLabel . }}
{name_chain}{bio_chain}OPTIONAL {{ ?artist wdt:P18 ?img . }}
OPTIONAL {{ ?artist wdt:P569 ?birth . }}
OPTIONAL {{ ?artist wdt:P570 ?death . }}
OPTIONAL {{
  ?artist wdt:P19|wdt:P740 ?place .
{place_chain}}}
{genre_block}
}}
GROUP BY ?artist",
        genres = group_concat_projection("genrePack", "genres"),
        name_chain = label_chain_clause("artist", "artistName", languages),
        bio_chain = description_chain_clause("artist", "bio", languages),
        place_chain = label_chain_clause("place", "placeName", languages),
        genre_block = packed_optional("artist", "P136", "genre", languages),
    )
}

fn recommendation_query(candidates: &str, languages: &[String]) -> String {
    format!(
        "SELECT ?song ?artist
  (SAMPLE(?songName) AS ?title)
  (SAMPLE(?artistName) AS ?artistLabel)
  (SAMPLE(?img) AS ?image)
WHERE {{
{{
{candidates}
}}
{song_chain}{artist_chain}OPTIONAL {{ ?song wdt:P18 ?img . }}
}}
GROUP BY ?song ?artist",
        song_chain = label_chain_clause("song", "songName", languages),
        artist_chain = label_chain_clause("artist", "artistName", languages),
    )
}

/// Other songs by the same performer, excluding the input.
pub fn same_artist_query(song_id: &str, artist_id: &str, languages: &[String]) -> String {
    let candidates = format!(
        "SELECT DISTINCT ?song ?artist WHERE {{
  BIND(wd:{artist_id} AS ?artist)
  ?song wdt:P31 wd:{SONG_CLASS} ;
        wdt:P175 ?artist .
  FILTER(?song != wd:{song_id})
}}
LIMIT {RECOMMENDATION_LIMIT}"
    );
    recommendation_query(&candidates, languages)
}

/// Songs sharing a genre with the input by other performers.
///
/// When the input has a release date, candidates must fall within the year
/// window; candidates without a date always pass.
pub fn discovery_query(song_id: &str, artist_id: &str, languages: &[String]) -> String {
    let candidates = format!(
        "SELECT DISTINCT ?song ?artist WHERE {{
  wd:{song_id} wdt:P136 ?sharedGenre .
  OPTIONAL {{ wd:{song_id} wdt:P577 ?inputDate . }}
  ?song wdt:P136 ?sharedGenre ;
        wdt:P31 wd:{SONG_CLASS} ;
        wdt:P175 ?artist .
  FILTER(?song != wd:{song_id})
  FILTER(?artist != wd:{artist_id})
  OPTIONAL {{ ?song wdt:P577 ?songDate . }}
  FILTER(
    !BOUND(?songDate) ||
    !BOUND(?inputDate) ||
    (YEAR(?songDate) >= YEAR(?inputDate) - {DISCOVERY_YEAR_WINDOW} &&
     YEAR(?songDate) <= YEAR(?inputDate) + {DISCOVERY_YEAR_WINDOW})
  )
}}
LIMIT {RECOMMENDATION_LIMIT}"
    );
    recommendation_query(&candidates, languages)
}

/// Description of the entity carrying exactly `label` in `language`.
pub fn describe_query(label: &str, language: &str) -> String {
    format!(
        "SELECT ?desc WHERE {{
  ?item rdfs:label \"{label}\"@{language} .
  ?item schema:description ?desc .
  FILTER(LANG(?desc) = \"{language}\")
}}
LIMIT 1"
    )
}
