//! Persistent application configuration model and defaults.

/// Root configuration persisted to `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Config {
    #[serde(default)]
    /// Knowledge-graph endpoint and query preferences.
    pub knowledge_graph: KnowledgeGraphConfig,
    #[serde(default)]
    /// Streaming playlist API settings (non-secret fields only).
    pub streaming: StreamingConfig,
    #[serde(default)]
    /// Placeholder values used when upstream data is missing.
    pub display: DisplayConfig,
    #[serde(default)]
    /// Log output preferences.
    pub logging: LoggingConfig,
}

/// Knowledge-graph endpoint settings.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct KnowledgeGraphConfig {
    #[serde(default = "default_sparql_endpoint")]
    pub endpoint: String,
    /// Sent on every request; the public endpoint rejects anonymous agents.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Label languages in preference order. Any-language and raw-id fallbacks follow.
    #[serde(default = "default_preferred_languages")]
    pub preferred_languages: Vec<String>,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
    /// Overall per-request deadline.
    #[serde(default = "default_graph_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
    /// How long a request may wait for a rate-limiter slot before failing.
    #[serde(default = "default_rate_limit_wait_ms")]
    pub rate_limit_wait_ms: u64,
}

/// Streaming playlist API settings.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct StreamingConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub client_id: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_streaming_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

/// Placeholder values rendered for absent fields.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct DisplayConfig {
    #[serde(default = "default_placeholder_image_url")]
    pub placeholder_image_url: String,
    #[serde(default = "default_recommendation_placeholder_image_url")]
    pub recommendation_placeholder_image_url: String,
}

/// Log output preferences.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct LoggingConfig {
    /// One of `off`, `error`, `warn`, `info`, `debug`, `trace`.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for KnowledgeGraphConfig {
    fn default() -> Self {
        Self {
            endpoint: default_sparql_endpoint(),
            user_agent: default_user_agent(),
            preferred_languages: default_preferred_languages(),
            connect_timeout_ms: default_connect_timeout_ms(),
            read_timeout_ms: default_read_timeout_ms(),
            request_timeout_ms: default_graph_request_timeout_ms(),
            requests_per_second: default_requests_per_second(),
            rate_limit_wait_ms: default_rate_limit_wait_ms(),
        }
    }
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            client_id: String::new(),
            token_url: default_token_url(),
            api_base_url: default_api_base_url(),
            page_size: default_page_size(),
            connect_timeout_ms: default_connect_timeout_ms(),
            request_timeout_ms: default_streaming_request_timeout_ms(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            placeholder_image_url: default_placeholder_image_url(),
            recommendation_placeholder_image_url: default_recommendation_placeholder_image_url(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_sparql_endpoint() -> String {
    "https://query.wikidata.org/sparql".to_string()
}

fn default_user_agent() -> String {
    "trackscope/0.1.0 (https://github.com/trackscope/trackscope; contact: metadata lookup)"
        .to_string()
}

fn default_preferred_languages() -> Vec<String> {
    vec!["it".to_string(), "en".to_string()]
}

fn default_connect_timeout_ms() -> u64 {
    5_000
}

fn default_read_timeout_ms() -> u64 {
    20_000
}

fn default_graph_request_timeout_ms() -> u64 {
    30_000
}

fn default_requests_per_second() -> u32 {
    5
}

fn default_rate_limit_wait_ms() -> u64 {
    3_000
}

fn default_token_url() -> String {
    "https://accounts.spotify.com/api/token".to_string()
}

fn default_api_base_url() -> String {
    "https://api.spotify.com/v1".to_string()
}

fn default_page_size() -> u32 {
    100
}

fn default_streaming_request_timeout_ms() -> u64 {
    15_000
}

fn default_placeholder_image_url() -> String {
    "https://images.unsplash.com/photo-1614613535308-eb5fbd3d2c17?q=80&w=500&auto=format&fit=crop"
        .to_string()
}

fn default_recommendation_placeholder_image_url() -> String {
    "https://via.placeholder.com/150".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Clamps out-of-range values and fills empty required fields with defaults.
pub fn sanitize_config(config: Config) -> Config {
    let graph_defaults = KnowledgeGraphConfig::default();
    let streaming_defaults = StreamingConfig::default();

    let preferred_languages: Vec<String> = config
        .knowledge_graph
        .preferred_languages
        .iter()
        .map(|language| language.trim().to_ascii_lowercase())
        .filter(|language| {
            !language.is_empty()
                && language
                    .chars()
                    .all(|ch| ch.is_ascii_alphanumeric() || ch == '-')
        })
        .collect();

    let non_empty_or = |value: String, fallback: String| {
        if value.trim().is_empty() {
            fallback
        } else {
            value.trim().to_string()
        }
    };

    let logging_level = match config.logging.level.trim().parse::<log::LevelFilter>() {
        Ok(level) => level.to_string().to_ascii_lowercase(),
        Err(_) => default_log_level(),
    };

    Config {
        knowledge_graph: KnowledgeGraphConfig {
            endpoint: non_empty_or(config.knowledge_graph.endpoint, graph_defaults.endpoint),
            user_agent: non_empty_or(config.knowledge_graph.user_agent, graph_defaults.user_agent),
            preferred_languages: if preferred_languages.is_empty() {
                graph_defaults.preferred_languages
            } else {
                preferred_languages
            },
            connect_timeout_ms: config.knowledge_graph.connect_timeout_ms.clamp(500, 60_000),
            read_timeout_ms: config.knowledge_graph.read_timeout_ms.clamp(1_000, 120_000),
            request_timeout_ms: config.knowledge_graph.request_timeout_ms.clamp(1_000, 120_000),
            requests_per_second: config.knowledge_graph.requests_per_second.clamp(1, 50),
            rate_limit_wait_ms: config.knowledge_graph.rate_limit_wait_ms.min(30_000),
        },
        streaming: StreamingConfig {
            enabled: config.streaming.enabled,
            client_id: config.streaming.client_id.trim().to_string(),
            token_url: non_empty_or(config.streaming.token_url, streaming_defaults.token_url),
            api_base_url: non_empty_or(
                config.streaming.api_base_url,
                streaming_defaults.api_base_url,
            ),
            page_size: config.streaming.page_size.clamp(1, 100),
            connect_timeout_ms: config.streaming.connect_timeout_ms.clamp(500, 60_000),
            request_timeout_ms: config.streaming.request_timeout_ms.clamp(1_000, 120_000),
        },
        display: config.display,
        logging: LoggingConfig {
            level: logging_level,
        },
    }
}
