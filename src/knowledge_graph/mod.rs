//! Knowledge-graph (Wikidata) lookups for tracks, artists, and recommendations.
//!
//! Each lookup module returns a [`LookupOutcome`] so that "nothing matched" and
//! "upstream failed" stay distinguishable in logs. [`KnowledgeGraphService`]
//! collapses both into plain values for callers, which render partial data
//! instead of errors.

pub mod artist;
pub mod details;
pub mod labels;
pub mod packing;
pub mod queries;
pub mod recommendations;
pub mod resolver;
pub mod sparql_client;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use thiserror::Error;

use crate::http_failure::HttpFailureKind;
use crate::protocol::{ArtistDetails, RecommendationItem, ResolvedEntityRef, TrackDetails};
use sparql_client::SparqlExecutor;

/// Failure while talking to the knowledge-graph endpoint.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("{kind} from knowledge graph: {message}")]
    Http {
        kind: HttpFailureKind,
        message: String,
    },
    #[error("malformed knowledge graph response: {0}")]
    Decode(String),
    #[error("rate limiter slot not available within {0:?}")]
    RateLimited(Duration),
}

/// Result of a single lookup before it is collapsed for callers.
#[derive(Debug)]
pub enum LookupOutcome<T> {
    Found(T),
    NotFound,
    UpstreamError(QueryError),
}

impl<T> LookupOutcome<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::NotFound | Self::UpstreamError(_) => None,
        }
    }

    fn log_miss(&self, operation: &str, subject: &str) {
        match self {
            Self::Found(_) => {}
            Self::NotFound => info!("Graph[{operation}]: no match for {subject}"),
            Self::UpstreamError(error) => {
                warn!("Graph[{operation}]: upstream failure for {subject}: {error}")
            }
        }
    }
}

impl<T> From<Result<Option<T>, QueryError>> for LookupOutcome<T> {
    fn from(result: Result<Option<T>, QueryError>) -> Self {
        match result {
            Ok(Some(value)) => Self::Found(value),
            Ok(None) => Self::NotFound,
            Err(error) => Self::UpstreamError(error),
        }
    }
}

/// Entry point used by the page layer. Every method returns a plain value and never fails.
pub struct KnowledgeGraphService {
    executor: Arc<dyn SparqlExecutor>,
    languages: Vec<String>,
    placeholder_image_url: String,
}

impl KnowledgeGraphService {
    pub fn new(
        executor: Arc<dyn SparqlExecutor>,
        languages: Vec<String>,
        placeholder_image_url: String,
    ) -> Self {
        Self {
            executor,
            languages,
            placeholder_image_url,
        }
    }

    /// Finds the work entity for a free-text title/artist pair.
    pub fn resolve(&self, title: &str, artist: &str) -> Option<ResolvedEntityRef> {
        let outcome = resolver::resolve(self.executor.as_ref(), &self.languages, title, artist);
        outcome.log_miss("resolve", &format!("'{title}' by '{artist}'"));
        outcome.found()
    }

    /// Extracts the attribute bundle of a resolved work.
    ///
    /// `query_artist` names the placeholder credit used when the graph links no
    /// performer; `image_override` is used when the graph has no image.
    pub fn extract_details(
        &self,
        entity_ref: &ResolvedEntityRef,
        query_artist: &str,
        image_override: Option<&str>,
    ) -> TrackDetails {
        let fallbacks = details::DetailFallbacks {
            query_artist,
            image_override,
            placeholder_image_url: &self.placeholder_image_url,
        };
        let outcome = details::extract_details(
            self.executor.as_ref(),
            &self.languages,
            entity_ref,
            &fallbacks,
        );
        outcome.log_miss("details", &entity_ref.entity_url);
        outcome.found().unwrap_or_else(TrackDetails::not_found)
    }

    /// Same-artist and discovery recommendations. Empty when either ref is missing.
    pub fn recommend(
        &self,
        track_entity_url: Option<&str>,
        artist_entity_url: Option<&str>,
    ) -> Vec<RecommendationItem> {
        let (Some(track_url), Some(artist_url)) = (track_entity_url, artist_entity_url) else {
            return Vec::new();
        };
        let outcome = recommendations::recommend(
            self.executor.as_ref(),
            &self.languages,
            track_url,
            artist_url,
        );
        outcome.log_miss("recommend", track_url);
        outcome.found().unwrap_or_default()
    }

    /// Biography bundle for a performer entity.
    pub fn artist_details(&self, artist_entity_url: &str) -> ArtistDetails {
        let outcome =
            artist::artist_details(self.executor.as_ref(), &self.languages, artist_entity_url);
        outcome.log_miss("artist", artist_entity_url);
        outcome.found().unwrap_or_else(ArtistDetails::not_found)
    }

    /// Short description of the entity carrying exactly `label` in the preferred language.
    pub fn describe(&self, label: &str) -> Option<String> {
        let outcome = resolver::describe(self.executor.as_ref(), &self.languages, label);
        outcome.log_miss("describe", &format!("'{label}'"));
        outcome.found()
    }
}
