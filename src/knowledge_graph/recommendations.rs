//! Same-artist and discovery recommendations for a resolved work.

use std::collections::HashSet;
use std::thread;

use log::warn;

use super::queries::{discovery_query, entity_id_from_url, same_artist_query};
use super::sparql_client::{SparqlExecutor, SparqlRow};
use super::{LookupOutcome, QueryError};
use crate::protocol::{RecommendationCategory, RecommendationItem};

fn item_from_row(row: &SparqlRow, category: RecommendationCategory) -> Option<RecommendationItem> {
    let track_entity_url = row.text("song")?.to_string();
    let artist_entity_url = row.text("artist")?.to_string();
    Some(RecommendationItem {
        title: row.text("title").unwrap_or(&track_entity_url).to_string(),
        artist_name: row
            .text("artistLabel")
            .unwrap_or(&artist_entity_url)
            .to_string(),
        category,
        image: row.text("image").map(str::to_string),
        track_entity_url,
        artist_entity_url,
    })
}

fn category_items(
    result: Result<Vec<SparqlRow>, QueryError>,
    category: RecommendationCategory,
) -> Result<Vec<RecommendationItem>, QueryError> {
    result.map(|rows| {
        rows.iter()
            .filter_map(|row| item_from_row(row, category))
            .collect()
    })
}

/// Concatenates categories in order and keeps the first item per title.
pub fn merge_recommendations(
    categories: impl IntoIterator<Item = Vec<RecommendationItem>>,
) -> Vec<RecommendationItem> {
    let mut seen_titles = HashSet::new();
    categories
        .into_iter()
        .flatten()
        .filter(|item| seen_titles.insert(item.title.clone()))
        .collect()
}

/// Issues both category queries concurrently and merges them, same-artist first.
///
/// A failure in one category still returns the other; both failing is an
/// upstream error.
pub fn recommend(
    executor: &dyn SparqlExecutor,
    languages: &[String],
    track_entity_url: &str,
    artist_entity_url: &str,
) -> LookupOutcome<Vec<RecommendationItem>> {
    let (Some(song_id), Some(artist_id)) = (
        entity_id_from_url(track_entity_url),
        entity_id_from_url(artist_entity_url),
    ) else {
        return LookupOutcome::NotFound;
    };

    let same_artist_sparql = same_artist_query(song_id, artist_id, languages);
    let discovery_sparql = discovery_query(song_id, artist_id, languages);
    let (same_artist, discovery) = thread::scope(|scope| {
        let discovery_handle = scope.spawn(|| executor.select("discovery", &discovery_sparql));
        let same_artist = executor.select("same_artist", &same_artist_sparql);
        let discovery = discovery_handle.join().unwrap_or_else(|_| {
            Err(QueryError::Decode(
                "discovery lookup thread panicked".to_string(),
            ))
        });
        (same_artist, discovery)
    });

    let same_artist = category_items(same_artist, RecommendationCategory::SameArtist);
    let discovery = category_items(discovery, RecommendationCategory::Discovery);
    let merged = match (same_artist, discovery) {
        (Err(error), Err(_)) => return LookupOutcome::UpstreamError(error),
        (Ok(same_artist), Err(error)) => {
            warn!("Graph[discovery]: keeping same-artist results only: {error}");
            merge_recommendations([same_artist])
        }
        (Err(error), Ok(discovery)) => {
            warn!("Graph[same_artist]: keeping discovery results only: {error}");
            merge_recommendations([discovery])
        }
        (Ok(same_artist), Ok(discovery)) => merge_recommendations([same_artist, discovery]),
    };
    if merged.is_empty() {
        LookupOutcome::NotFound
    } else {
        LookupOutcome::Found(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::{merge_recommendations, recommend};
    use crate::knowledge_graph::sparql_client::SparqlRow;
    use crate::knowledge_graph::test_support::{row, FakeExecutor};
    use crate::knowledge_graph::{LookupOutcome, QueryError};
    use crate::protocol::{RecommendationCategory, RecommendationItem};

    const TRACK: &str = "http://www.wikidata.org/entity/Q187745";
    const ARTIST: &str = "http://www.wikidata.org/entity/Q15862";

    fn languages() -> Vec<String> {
        vec!["it".to_string(), "en".to_string()]
    }

    fn song_row(song: &str, title: &str, artist: &str, artist_label: &str) -> SparqlRow {
        row(&[
            ("song", song),
            ("title", title),
            ("artist", artist),
            ("artistLabel", artist_label),
        ])
    }

    fn item(title: &str, category: RecommendationCategory) -> RecommendationItem {
        RecommendationItem {
            title: title.to_string(),
            artist_name: "Oasis".to_string(),
            category,
            image: None,
            track_entity_url: format!("http://www.wikidata.org/entity/Q{}", title.len()),
            artist_entity_url: "http://www.wikidata.org/entity/Q42".to_string(),
        }
    }

    #[test]
    fn test_merge_keeps_same_artist_entry_for_duplicate_title() {
        let merged = merge_recommendations([
            vec![item("Live Forever", RecommendationCategory::SameArtist)],
            vec![
                item("Live Forever", RecommendationCategory::Discovery),
                item("Common People", RecommendationCategory::Discovery),
            ],
        ]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].title, "Live Forever");
        assert_eq!(merged[0].category, RecommendationCategory::SameArtist);
        assert_eq!(merged[1].title, "Common People");
    }

    #[test]
    fn test_recommend_keeps_same_artist_live_forever_over_discovery_duplicate() {
        let oasis = "http://www.wikidata.org/entity/Q483718";
        let executor = FakeExecutor::new()
            .with_rows(
                "same_artist",
                vec![song_row(
                    "http://www.wikidata.org/entity/Q1545040",
                    "Live Forever",
                    oasis,
                    "Oasis",
                )],
            )
            .with_rows(
                "discovery",
                vec![
                    song_row(
                        "http://www.wikidata.org/entity/Q1545040",
                        "Live Forever",
                        oasis,
                        "Oasis",
                    ),
                    song_row(
                        "http://www.wikidata.org/entity/Q1129946",
                        "Common People",
                        "http://www.wikidata.org/entity/Q1142533",
                        "Pulp",
                    ),
                ],
            );
        let LookupOutcome::Found(items) = recommend(
            &executor,
            &languages(),
            "http://www.wikidata.org/entity/Q1191426",
            oasis,
        ) else {
            panic!("expected recommendations");
        };
        let live_forever: Vec<_> = items
            .iter()
            .filter(|item| item.title == "Live Forever")
            .collect();
        assert_eq!(live_forever.len(), 1);
        assert_eq!(live_forever[0].category, RecommendationCategory::SameArtist);
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].title, "Common People");
    }

    #[test]
    fn test_recommend_orders_same_artist_before_discovery() {
        let executor = FakeExecutor::new()
            .with_rows(
                "same_artist",
                vec![
                    song_row("http://www.wikidata.org/entity/Q2", "Somebody to Love", ARTIST, "Queen"),
                    song_row("http://www.wikidata.org/entity/Q3", "Innuendo", ARTIST, "Queen"),
                ],
            )
            .with_rows(
                "discovery",
                vec![song_row(
                    "http://www.wikidata.org/entity/Q4",
                    "Stairway to Heaven",
                    "http://www.wikidata.org/entity/Q2331",
                    "Led Zeppelin",
                )],
            );
        let LookupOutcome::Found(items) = recommend(&executor, &languages(), TRACK, ARTIST) else {
            panic!("expected recommendations");
        };
        let categories: Vec<_> = items.iter().map(|item| item.category).collect();
        assert_eq!(
            categories,
            vec![
                RecommendationCategory::SameArtist,
                RecommendationCategory::SameArtist,
                RecommendationCategory::Discovery,
            ]
        );
        assert!(items
            .iter()
            .all(|item| !item.track_entity_url.is_empty() && !item.artist_entity_url.is_empty()));
        assert_eq!(items[2].artist_name, "Led Zeppelin");
    }

    #[test]
    fn test_recommend_drops_rows_without_entity_urls() {
        let executor = FakeExecutor::new().with_rows(
            "same_artist",
            vec![
                row(&[("title", "Orphan")]),
                song_row("http://www.wikidata.org/entity/Q2", "", ARTIST, ""),
            ],
        );
        let LookupOutcome::Found(items) = recommend(&executor, &languages(), TRACK, ARTIST) else {
            panic!("expected recommendations");
        };
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "http://www.wikidata.org/entity/Q2");
        assert_eq!(items[0].artist_name, ARTIST);
    }

    #[test]
    fn test_recommend_keeps_one_category_when_other_fails() {
        let executor = FakeExecutor::new()
            .with_rows(
                "same_artist",
                vec![song_row("http://www.wikidata.org/entity/Q2", "Innuendo", ARTIST, "Queen")],
            )
            .with_error("discovery", || QueryError::Decode("timeout page".to_string()));
        let LookupOutcome::Found(items) = recommend(&executor, &languages(), TRACK, ARTIST) else {
            panic!("expected same-artist results");
        };
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].category, RecommendationCategory::SameArtist);
    }

    #[test]
    fn test_recommend_issues_both_queries_with_input_excluded() {
        let executor = FakeExecutor::new();
        assert!(matches!(
            recommend(&executor, &languages(), TRACK, ARTIST),
            LookupOutcome::NotFound
        ));
        let mut labels = executor.call_labels();
        labels.sort();
        assert_eq!(labels, vec!["discovery", "same_artist"]);
        let discovery = executor
            .query_for("discovery")
            .expect("discovery query should run");
        assert!(discovery.contains("FILTER(?song != wd:Q187745)"));
        assert!(discovery.contains("!BOUND(?inputDate)"));
    }

    #[test]
    fn test_recommend_invalid_refs_skip_queries() {
        let executor = FakeExecutor::new();
        assert!(matches!(
            recommend(&executor, &languages(), "not-an-entity", ARTIST),
            LookupOutcome::NotFound
        ));
        assert!(executor.call_labels().is_empty());
    }
}
