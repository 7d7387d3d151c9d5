//! SPARQL endpoint client and the typed result-set boundary.

use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use log::debug;
use serde::Deserialize;

use super::QueryError;
use crate::config::KnowledgeGraphConfig;
use crate::http_failure::{classify_io_failure, classify_ureq_failure};

const SPARQL_RESULTS_MIME: &str = "application/sparql-results+json";
const RATE_LIMIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// One bound value of a result row. Only the lexical value is kept.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SparqlTerm {
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Deserialize)]
struct SparqlResponse {
    #[serde(default)]
    results: Option<SparqlResults>,
}

#[derive(Debug, Deserialize)]
struct SparqlResults {
    #[serde(default)]
    bindings: Vec<HashMap<String, SparqlTerm>>,
}

/// A result row. Every binding is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SparqlRow {
    bindings: HashMap<String, SparqlTerm>,
}

impl SparqlRow {
    pub fn new(bindings: HashMap<String, SparqlTerm>) -> Self {
        Self { bindings }
    }

    /// Trimmed value of `name`, or `None` when unbound or blank.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.bindings
            .get(name)
            .map(|term| term.value.trim())
            .filter(|value| !value.is_empty())
    }
}

/// Decodes a `application/sparql-results+json` body.
pub fn parse_results(body: &str) -> Result<Vec<SparqlRow>, QueryError> {
    let response: SparqlResponse = serde_json::from_str(body.trim()).map_err(|error| {
        let snippet: String = body.trim().chars().take(120).collect();
        QueryError::Decode(format!("{error}; prefix={snippet}"))
    })?;
    Ok(response
        .results
        .map(|results| results.bindings.into_iter().map(SparqlRow::new).collect())
        .unwrap_or_default())
}

/// Runs SELECT queries. `label` names the lookup for logs and test fakes.
pub trait SparqlExecutor: Send + Sync {
    fn select(&self, label: &str, query: &str) -> Result<Vec<SparqlRow>, QueryError>;
}

/// Blocking client for a public SPARQL endpoint, paced by a shared rate limiter.
pub struct SparqlClient {
    http_client: ureq::Agent,
    endpoint: String,
    user_agent: String,
    request_timeout: Duration,
    rate_limit_wait: Duration,
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    /// Held by the one caller currently polling the limiter; the rest queue behind it.
    limiter_turn: Mutex<()>,
}

impl SparqlClient {
    pub fn new(config: &KnowledgeGraphConfig) -> Self {
        let http_client = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_millis(config.connect_timeout_ms))
            .timeout_read(Duration::from_millis(config.read_timeout_ms))
            .timeout_write(Duration::from_millis(config.read_timeout_ms))
            .build();
        let per_second = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        Self {
            http_client,
            endpoint: config.endpoint.clone(),
            user_agent: config.user_agent.clone(),
            request_timeout: Duration::from_millis(config.request_timeout_ms),
            rate_limit_wait: Duration::from_millis(config.rate_limit_wait_ms),
            limiter: RateLimiter::direct(Quota::per_second(per_second)),
            limiter_turn: Mutex::new(()),
        }
    }

    /// Waits for a limiter slot. Concurrent callers are served one at a time;
    /// the wait cap counts only from the moment a caller reaches the head of the queue.
    fn wait_for_rate_limit_slot(&self) -> Result<(), QueryError> {
        let _turn = self
            .limiter_turn
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let deadline = Instant::now() + self.rate_limit_wait;
        loop {
            if self.limiter.check().is_ok() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(QueryError::RateLimited(self.rate_limit_wait));
            }
            std::thread::sleep(RATE_LIMIT_POLL_INTERVAL);
        }
    }
}

impl SparqlExecutor for SparqlClient {
    fn select(&self, label: &str, query: &str) -> Result<Vec<SparqlRow>, QueryError> {
        self.wait_for_rate_limit_slot()?;
        let started = Instant::now();
        let response = self
            .http_client
            .post(&self.endpoint)
            .set("User-Agent", &self.user_agent)
            .set("Accept", SPARQL_RESULTS_MIME)
            .timeout(self.request_timeout)
            .send_form(&[("query", query), ("format", "json")])
            .map_err(|error| QueryError::Http {
                kind: classify_ureq_failure(&error),
                message: format!("Request failed: {error}"),
            })?;
        let body = response.into_string().map_err(|error| QueryError::Http {
            kind: classify_io_failure(&error),
            message: format!("Failed to read response: {error}"),
        })?;
        let rows = parse_results(&body)?;
        debug!(
            "Graph[{label}]: {} rows in {:?}",
            rows.len(),
            started.elapsed()
        );
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_results, SparqlClient};
    use crate::config::KnowledgeGraphConfig;
    use crate::knowledge_graph::QueryError;

    #[test]
    fn test_parse_results_reads_values_and_ignores_term_metadata() {
        let rows = parse_results(
            r#"{
                "head": {"vars": ["song", "title", "image"]},
                "results": {"bindings": [
                    {
                        "song": {"type": "uri", "value": "http://www.wikidata.org/entity/Q187745"},
                        "title": {"type": "literal", "value": "Bohemian Rhapsody", "xml:lang": "it"}
                    }
                ]}
            }"#,
        )
        .expect("results should parse");

        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].text("song"),
            Some("http://www.wikidata.org/entity/Q187745")
        );
        assert_eq!(rows[0].text("title"), Some("Bohemian Rhapsody"));
        assert_eq!(rows[0].text("image"), None);
    }

    #[test]
    fn test_parse_results_treats_blank_values_as_unbound() {
        let rows = parse_results(
            r#"{"results": {"bindings": [{"genres": {"type": "literal", "value": "  "}}]}}"#,
        )
        .expect("results should parse");
        assert_eq!(rows[0].text("genres"), None);
    }

    #[test]
    fn test_parse_results_missing_results_is_empty() {
        let rows = parse_results(r#"{"head": {"vars": []}}"#).expect("head-only should parse");
        assert!(rows.is_empty());
    }

    #[test]
    fn test_parse_results_rejects_html_error_page() {
        let error = parse_results("<html>Query timeout</html>").expect_err("html should fail");
        assert!(matches!(error, QueryError::Decode(message) if message.contains("<html>")));
    }

    #[test]
    fn test_concurrent_lookups_queue_for_slots_instead_of_failing() {
        let client = SparqlClient::new(&KnowledgeGraphConfig {
            requests_per_second: 20,
            rate_limit_wait_ms: 500,
            ..KnowledgeGraphConfig::default()
        });
        let limited = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..40)
                .map(|_| scope.spawn(|| client.wait_for_rate_limit_slot()))
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().expect("lookup thread should not panic"))
                .filter(|result| matches!(result, Err(QueryError::RateLimited(_))))
                .count()
        });
        assert_eq!(limited, 0);
    }

    #[test]
    fn test_rate_limiter_fails_fast_when_wait_is_zero() {
        let client = SparqlClient::new(&KnowledgeGraphConfig {
            requests_per_second: 1,
            rate_limit_wait_ms: 0,
            ..KnowledgeGraphConfig::default()
        });
        assert!(client.wait_for_rate_limit_slot().is_ok());
        assert!(matches!(
            client.wait_for_rate_limit_slot(),
            Err(QueryError::RateLimited(_))
        ));
    }
}
