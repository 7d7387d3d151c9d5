//! Playlist link parsing.

/// Identifier returned when a link cannot be parsed. Loading it serves the backup dataset.
pub const DEMO_PLAYLIST_ID: &str = "demo";

const WEB_MARKER: &str = "playlist/";
const URI_MARKER: &str = "playlist:";

fn leading_identifier(rest: &str) -> Option<String> {
    let id: String = rest
        .chars()
        .take_while(|ch| ch.is_ascii_alphanumeric())
        .collect();
    (!id.is_empty()).then_some(id)
}

/// Extracts the playlist identifier from a web link or `spotify:playlist:` URI.
///
/// Returns [`DEMO_PLAYLIST_ID`] when no identifier can be found.
pub fn extract_playlist_id(link: &str) -> String {
    let trimmed = link.trim();
    let parsed = trimmed
        .find(WEB_MARKER)
        .and_then(|index| leading_identifier(&trimmed[index + WEB_MARKER.len()..]))
        .or_else(|| {
            trimmed
                .find(URI_MARKER)
                .and_then(|index| leading_identifier(&trimmed[index + URI_MARKER.len()..]))
        });
    match parsed {
        Some(id) => id,
        None => {
            log::info!("Playlist[link]: no identifier in '{trimmed}', using demo dataset");
            DEMO_PLAYLIST_ID.to_string()
        }
    }
}

/// Returns true for the sentinel produced by [`extract_playlist_id`] on failure.
pub fn is_demo_playlist_id(id: &str) -> bool {
    id == DEMO_PLAYLIST_ID
}

#[cfg(test)]
mod tests {
    use super::{extract_playlist_id, is_demo_playlist_id, DEMO_PLAYLIST_ID};

    #[test]
    fn test_extracts_id_from_web_link_with_query() {
        assert_eq!(
            extract_playlist_id("https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M?si=abc"),
            "37i9dQZF1DXcBWIGoYBM5M"
        );
    }

    #[test]
    fn test_extracts_id_from_localized_web_link() {
        assert_eq!(
            extract_playlist_id("  https://open.spotify.com/intl-it/playlist/5ABHKGoOzxkaa28ttQV9sE  "),
            "5ABHKGoOzxkaa28ttQV9sE"
        );
    }

    #[test]
    fn test_extracts_id_from_uri() {
        assert_eq!(
            extract_playlist_id("spotify:playlist:37i9dQZF1DXcBWIGoYBM5M"),
            "37i9dQZF1DXcBWIGoYBM5M"
        );
    }

    #[test]
    fn test_malformed_link_yields_demo_sentinel() {
        assert_eq!(extract_playlist_id("not a link"), DEMO_PLAYLIST_ID);
        assert_eq!(extract_playlist_id("https://open.spotify.com/playlist/"), DEMO_PLAYLIST_ID);
        assert_eq!(extract_playlist_id(""), DEMO_PLAYLIST_ID);
        assert!(is_demo_playlist_id(&extract_playlist_id("https://example.com/album/xyz")));
    }
}
