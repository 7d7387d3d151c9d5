mod backends;
mod config;
mod credentials;
mod http_failure;
mod knowledge_graph;
mod pages;
mod playlist_link;
mod playlist_source;
mod protocol;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use log::{info, warn};
use serde::Serialize;

use backends::spotify::SpotifyAdapter;
use backends::PlaylistBackendAdapter;
use config::{sanitize_config, Config};
use knowledge_graph::sparql_client::SparqlClient;
use knowledge_graph::KnowledgeGraphService;
use playlist_source::PlaylistSource;
use protocol::TrackQuery;

const CONFIG_DIR_NAME: &str = "trackscope";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Playlist browser with knowledge-graph track metadata.
#[derive(Parser)]
#[command(name = "trackscope", version)]
struct Args {
    /// Read configuration from this file instead of the user config directory.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load a playlist from a web link or `spotify:playlist:` URI.
    Playlist { link: String },
    /// Resolve a track and show its metadata, artist cards, and recommendations.
    Track {
        title: String,
        artist: String,
        #[arg(long)]
        album: Option<String>,
        /// Cover image used when the knowledge graph has none.
        #[arg(long)]
        image: Option<String>,
    },
    /// Show the biography of a performer entity.
    Artist { entity_url: String },
    /// Recommendations for a resolved track/artist entity pair.
    Recommend {
        track_url: String,
        artist_url: String,
    },
    /// Short description of the entity carrying exactly this label.
    Describe { label: String },
    /// Store the streaming client secret in the OS keyring.
    SetSecret { secret: String },
    /// Remove the streaming client secret from the OS keyring.
    ClearSecret,
}

enum ConfigOrigin {
    Existing,
    Created,
    Unreadable(String),
}

fn config_file_path(
    override_path: Option<PathBuf>,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(path) = override_path {
        return Ok(path);
    }
    let config_dir = dirs::config_dir().ok_or("no user config directory available")?;
    Ok(config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

fn load_config(
    config_file: &Path,
) -> Result<(Config, ConfigOrigin), Box<dyn std::error::Error>> {
    let mut origin = ConfigOrigin::Existing;
    if !config_file.exists() {
        if let Some(parent) = config_file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(config_file, toml::to_string(&Config::default())?)?;
        origin = ConfigOrigin::Created;
    }

    let config_content = std::fs::read_to_string(config_file)?;
    let config = match toml::from_str::<Config>(&config_content) {
        Ok(config) => config,
        Err(err) => {
            origin = ConfigOrigin::Unreadable(err.to_string());
            Config::default()
        }
    };
    Ok((sanitize_config(config), origin))
}

fn init_logging(config: &Config) {
    let level = config
        .logging
        .level
        .parse::<log::LevelFilter>()
        .unwrap_or(log::LevelFilter::Info);
    let mut clog = colog::default_builder();
    clog.filter(None, level);
    clog.init();

    std::panic::set_hook(Box::new(|panic_info| {
        let current_thread = std::thread::current();
        let thread_name = current_thread.name().unwrap_or("unnamed");
        log::error!("panic in thread '{}': {}", thread_name, panic_info);
    }));
}

fn build_knowledge_graph(config: &Config) -> KnowledgeGraphService {
    let client = SparqlClient::new(&config.knowledge_graph);
    KnowledgeGraphService::new(
        Arc::new(client),
        config.knowledge_graph.preferred_languages.clone(),
        config.display.placeholder_image_url.clone(),
    )
}

fn build_playlist_source(config: &Config) -> PlaylistSource {
    if !config.streaming.enabled {
        info!("Playlist: streaming backend disabled in config");
        return PlaylistSource::offline();
    }
    let secret = match credentials::resolve_client_secret(&config.streaming.client_id) {
        Ok(Some(secret)) => secret,
        Ok(None) => {
            info!("Playlist: no streaming client secret stored; using backup dataset");
            return PlaylistSource::offline();
        }
        Err(err) => {
            warn!("Playlist: {err}");
            return PlaylistSource::offline();
        }
    };
    match SpotifyAdapter::new(&config.streaming, secret) {
        Ok(adapter) => {
            let backend: Box<dyn PlaylistBackendAdapter> = Box::new(adapter);
            PlaylistSource::new(Some(backend))
        }
        Err(err) => {
            warn!("Playlist: streaming backend unavailable: {err}");
            PlaylistSource::offline()
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config_file = config_file_path(args.config)?;
    let (config, origin) = load_config(&config_file)?;
    init_logging(&config);
    match origin {
        ConfigOrigin::Existing => {}
        ConfigOrigin::Created => info!(
            "Config file not found. Created default config. path={}",
            config_file.display()
        ),
        ConfigOrigin::Unreadable(err) => warn!(
            "Config file could not be parsed, using defaults. path={} error={}",
            config_file.display(),
            err
        ),
    }

    match args.command {
        Command::Playlist { link } => {
            let source = build_playlist_source(&config);
            log::debug!("Playlist: live backend configured={}", source.has_backend());
            print_json(&pages::build_playlist_page(&source, &link))?;
        }
        Command::Track {
            title,
            artist,
            album,
            image,
        } => {
            let graph = build_knowledge_graph(&config);
            let mut query = TrackQuery::new(title, artist);
            query.album = album;
            query.cover_image_url = image;
            print_json(&pages::build_track_page(&graph, &config.display, query))?;
        }
        Command::Artist { entity_url } => {
            let graph = build_knowledge_graph(&config);
            print_json(&pages::build_artist_page(
                &graph,
                &config.display,
                &entity_url,
            ))?;
        }
        Command::Recommend {
            track_url,
            artist_url,
        } => {
            let graph = build_knowledge_graph(&config);
            print_json(&graph.recommend(Some(&track_url), Some(&artist_url)))?;
        }
        Command::Describe { label } => {
            let graph = build_knowledge_graph(&config);
            print_json(&graph.describe(&label))?;
        }
        Command::SetSecret { secret } => {
            if config.streaming.client_id.is_empty() {
                return Err("set streaming.client_id in the config file first".into());
            }
            credentials::set_client_secret(&config.streaming.client_id, secret.trim())?;
            info!("Stored streaming client secret in the OS keyring");
        }
        Command::ClearSecret => {
            if config.streaming.client_id.is_empty() {
                return Err("set streaming.client_id in the config file first".into());
            }
            credentials::delete_client_secret(&config.streaming.client_id)?;
            info!("Removed streaming client secret from the OS keyring");
        }
    }
    Ok(())
}
