//! Free-text title/artist resolution to graph entities.

use super::queries::{describe_query, resolve_query, sanitize_literal};
use super::sparql_client::SparqlExecutor;
use super::LookupOutcome;
use crate::protocol::ResolvedEntityRef;

const FALLBACK_SEARCH_LANGUAGE: &str = "en";

fn search_language(languages: &[String]) -> &str {
    languages
        .first()
        .map(String::as_str)
        .unwrap_or(FALLBACK_SEARCH_LANGUAGE)
}

/// Searches for a musical work linked to a performer matching `artist`.
///
/// Blank inputs never reach the endpoint.
pub fn resolve(
    executor: &dyn SparqlExecutor,
    languages: &[String],
    title: &str,
    artist: &str,
) -> LookupOutcome<ResolvedEntityRef> {
    let title = sanitize_literal(title);
    let artist = sanitize_literal(artist);
    if title.trim().is_empty() || artist.trim().is_empty() {
        return LookupOutcome::NotFound;
    }

    let query = resolve_query(&title, &artist, search_language(languages));
    let result = executor.select("resolve", &query).map(|rows| {
        rows.into_iter().find_map(|row| {
            let entity_url = row.text("song")?.to_string();
            Some(ResolvedEntityRef {
                entity_url,
                artist_entity_url: row.text("artist").map(str::to_string),
            })
        })
    });
    result.into()
}

/// Short description of the entity labelled exactly `label` in the first preferred language.
pub fn describe(
    executor: &dyn SparqlExecutor,
    languages: &[String],
    label: &str,
) -> LookupOutcome<String> {
    let label = sanitize_literal(label);
    if label.trim().is_empty() {
        return LookupOutcome::NotFound;
    }
    let query = describe_query(&label, search_language(languages));
    executor
        .select("describe", &query)
        .map(|rows| {
            rows.into_iter()
                .find_map(|row| row.text("desc").map(str::to_string))
        })
        .into()
}

#[cfg(test)]
mod tests {
    use super::{describe, resolve};
    use crate::knowledge_graph::test_support::{row, FakeExecutor};
    use crate::knowledge_graph::{LookupOutcome, QueryError};

    fn languages() -> Vec<String> {
        vec!["it".to_string(), "en".to_string()]
    }

    #[test]
    fn test_resolve_returns_first_match_with_artist() {
        let executor = FakeExecutor::new().with_rows(
            "resolve",
            vec![
                row(&[
                    ("song", "http://www.wikidata.org/entity/Q187745"),
                    ("artist", "http://www.wikidata.org/entity/Q15862"),
                ]),
                row(&[("song", "http://www.wikidata.org/entity/Q1")]),
            ],
        );
        let outcome = resolve(&executor, &languages(), "Bohemian Rhapsody", "Queen");
        let LookupOutcome::Found(entity_ref) = outcome else {
            panic!("expected a match");
        };
        assert_eq!(entity_ref.entity_url, "http://www.wikidata.org/entity/Q187745");
        assert_eq!(
            entity_ref.artist_entity_url.as_deref(),
            Some("http://www.wikidata.org/entity/Q15862")
        );
    }

    #[test]
    fn test_resolve_sanitizes_quotes_and_searches_in_first_language() {
        let executor = FakeExecutor::new();
        let outcome = resolve(&executor, &languages(), "Say \"Hello\"", "Adele");
        assert!(matches!(outcome, LookupOutcome::NotFound));
        let query = executor.query_for("resolve").expect("resolve query should run");
        assert!(query.contains("mwapi:search \"Say Hello\""));
        assert!(query.contains("mwapi:language \"it\""));
    }

    #[test]
    fn test_resolve_keeps_surrounding_whitespace_verbatim() {
        let executor = FakeExecutor::new();
        let _ = resolve(&executor, &languages(), " Yesterday ", "The Beatles");
        let query = executor.query_for("resolve").expect("resolve query should run");
        assert!(query.contains("mwapi:search \" Yesterday \""));
    }

    #[test]
    fn test_resolve_blank_input_skips_query() {
        let executor = FakeExecutor::new();
        assert!(matches!(
            resolve(&executor, &languages(), "  ", "Queen"),
            LookupOutcome::NotFound
        ));
        assert!(matches!(
            resolve(&executor, &languages(), "\"\"", "Queen"),
            LookupOutcome::NotFound
        ));
        assert!(executor.call_labels().is_empty());
    }

    #[test]
    fn test_resolve_upstream_error_is_kept_distinct() {
        let executor =
            FakeExecutor::new().with_error("resolve", || QueryError::Decode("html".to_string()));
        assert!(matches!(
            resolve(&executor, &languages(), "Bohemian Rhapsody", "Queen"),
            LookupOutcome::UpstreamError(_)
        ));
    }

    #[test]
    fn test_resolve_without_languages_searches_english() {
        let executor = FakeExecutor::new();
        let _ = resolve(&executor, &[], "Yesterday", "The Beatles");
        let query = executor.query_for("resolve").expect("resolve query should run");
        assert!(query.contains("mwapi:language \"en\""));
    }

    #[test]
    fn test_describe_skips_unbound_rows() {
        let executor = FakeExecutor::new().with_rows(
            "describe",
            vec![row(&[]), row(&[("desc", "British rock band")])],
        );
        assert!(matches!(
            describe(&executor, &languages(), "Queen"),
            LookupOutcome::Found(desc) if desc == "British rock band"
        ));
    }
}
