//! Playlist loading with a fixed backup dataset.
//!
//! The streaming backend is optional. Whenever it is absent, fails, or returns
//! nothing, the backup list is served and the load is flagged as demo data.

use log::{info, warn};

use crate::backends::{BackendTrack, PlaylistBackendAdapter};
use crate::playlist_link::is_demo_playlist_id;
use crate::protocol::{PlaylistLoad, PlaylistTrack};

/// Loads playlist rows from a backend, falling back to [`backup_tracks`].
pub struct PlaylistSource {
    backend: Option<Box<dyn PlaylistBackendAdapter>>,
}

impl PlaylistSource {
    pub fn new(backend: Option<Box<dyn PlaylistBackendAdapter>>) -> Self {
        Self { backend }
    }

    /// Source that only ever serves the backup dataset.
    pub fn offline() -> Self {
        Self { backend: None }
    }

    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    /// Returns the playlist rows for `playlist_id`, never failing.
    pub fn load(&self, playlist_id: &str) -> PlaylistLoad {
        let live_tracks = match &self.backend {
            _ if is_demo_playlist_id(playlist_id) => None,
            None => {
                info!("Playlist[{playlist_id}]: no streaming backend configured");
                None
            }
            Some(backend) => match backend.fetch_playlist_tracks(playlist_id) {
                Ok(tracks) if tracks.is_empty() => {
                    info!(
                        "Playlist[{playlist_id}]: {} returned no playable tracks",
                        backend.name()
                    );
                    None
                }
                Ok(tracks) => Some(tracks),
                Err(error) => {
                    warn!("Playlist[{playlist_id}]: {} failed: {error}", backend.name());
                    None
                }
            },
        };

        match live_tracks {
            Some(tracks) => PlaylistLoad {
                playlist_id: playlist_id.to_string(),
                tracks: tracks.into_iter().map(PlaylistTrack::from).collect(),
                is_demo: false,
            },
            None => {
                info!("Playlist[{playlist_id}]: serving backup dataset");
                PlaylistLoad {
                    playlist_id: playlist_id.to_string(),
                    tracks: backup_tracks(),
                    is_demo: true,
                }
            }
        }
    }
}

impl From<BackendTrack> for PlaylistTrack {
    fn from(track: BackendTrack) -> Self {
        Self {
            id: track.item_id,
            title: track.title,
            artist: track.artist,
            album: track.album,
            cover_url: track.cover_url,
            external_url: track.external_url,
        }
    }
}

fn backup_track(id: &str, title: &str, artist: &str, album: &str, cover_url: &str) -> PlaylistTrack {
    PlaylistTrack {
        id: id.to_string(),
        title: title.to_string(),
        artist: artist.to_string(),
        album: album.to_string(),
        cover_url: cover_url.to_string(),
        external_url: "#".to_string(),
    }
}

/// Fixed sample playlist spanning eras, regions, and genres.
pub fn backup_tracks() -> Vec<PlaylistTrack> {
    vec![
        backup_track(
            "bk1",
            "Bohemian Rhapsody",
            "Queen",
            "A Night at the Opera",
            "https://upload.wikimedia.org/wikipedia/en/4/42/Queen_A_Night_At_The_Opera.png",
        ),
        backup_track(
            "bk2",
            "Smells Like Teen Spirit",
            "Nirvana",
            "Nevermind",
            "https://upload.wikimedia.org/wikipedia/en/b/b7/NirvanaNevermindalbum.jpg",
        ),
        backup_track(
            "bk3",
            "Symphony No. 40",
            "Wolfgang Amadeus Mozart",
            "Best of Classics",
            "https://upload.wikimedia.org/wikipedia/commons/1/1e/Wolfgang-amadeus-mozart_1.jpg",
        ),
        backup_track(
            "bk4",
            "Dynamite",
            "BTS",
            "BE",
            "https://upload.wikimedia.org/wikipedia/en/d/d4/BTS_-_Dynamite.png",
        ),
        backup_track(
            "bk5",
            "No Woman, No Cry",
            "Bob Marley",
            "Live!",
            "https://upload.wikimedia.org/wikipedia/en/3/36/Bob_Marley_-_Live%21.jpg",
        ),
        backup_track(
            "bk6",
            "Get Lucky",
            "Daft Punk",
            "Random Access Memories",
            "https://upload.wikimedia.org/wikipedia/en/a/a7/Random_Access_Memories.jpg",
        ),
        backup_track(
            "bk7",
            "So What",
            "Miles Davis",
            "Kind of Blue",
            "https://upload.wikimedia.org/wikipedia/en/9/9c/MilesDavisKindofBlue.jpg",
        ),
        backup_track(
            "bk8",
            "Zitti e Buoni",
            "Måneskin",
            "Teatro d'ira: Vol. I",
            "https://upload.wikimedia.org/wikipedia/en/1/1b/M%C3%A5neskin_-_Teatro_d%27ira_-_Vol._I.png",
        ),
        backup_track(
            "bk9",
            "Bad Guy",
            "Billie Eilish",
            "When We All Fall Asleep...",
            "https://upload.wikimedia.org/wikipedia/en/3/36/Billie_Eilish_-_When_We_All_Fall_Asleep%2C_Where_Do_We_Go%3F.png",
        ),
        backup_track(
            "bk10",
            "Hips Don't Lie",
            "Shakira",
            "Oral Fixation, Vol. 2",
            "https://upload.wikimedia.org/wikipedia/en/6/66/Shakira_-_Hips_Don%27t_Lie_%28featuring_Wyclef_Jean%29.png",
        ),
        backup_track(
            "bk11",
            "God's Plan",
            "Drake",
            "Scorpion",
            "https://upload.wikimedia.org/wikipedia/en/9/90/Scorpion_by_Drake.jpg",
        ),
        backup_track(
            "bk12",
            "Für Elise",
            "Ludwig van Beethoven",
            "Masterpieces",
            "https://upload.wikimedia.org/wikipedia/commons/6/6f/Beethoven.jpg",
        ),
    ]
}
