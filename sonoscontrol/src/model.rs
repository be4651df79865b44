use serde::{Deserialize, Serialize};

/// Sentinel used for track fields the renderer did not report.
pub const UNKNOWN: &str = "Unknown";

/// A speaker that answered the latest discovery.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Device {
    pub name: String,
    pub address: String,
}

impl Device {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }
}

/// Track currently loaded on a renderer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackInfo {
    pub title: String,
    pub artist: String,
    pub album: String,
}

impl TrackInfo {
    /// Missing or blank fields become [`UNKNOWN`].
    pub fn from_fields(
        title: Option<String>,
        artist: Option<String>,
        album: Option<String>,
    ) -> Self {
        fn or_unknown(value: Option<String>) -> String {
            value
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN.to_string())
        }

        Self {
            title: or_unknown(title),
            artist: or_unknown(artist),
            album: or_unknown(album),
        }
    }
}

impl Default for TrackInfo {
    fn default() -> Self {
        Self::from_fields(None, None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_default_to_unknown() {
        let info = TrackInfo::from_fields(Some("Song A".into()), None, Some("   ".into()));
        assert_eq!(info.title, "Song A");
        assert_eq!(info.artist, UNKNOWN);
        assert_eq!(info.album, UNKNOWN);
    }

    #[test]
    fn default_track_is_all_unknown() {
        let info = TrackInfo::default();
        assert_eq!(info.title, UNKNOWN);
        assert_eq!(info.artist, UNKNOWN);
        assert_eq!(info.album, UNKNOWN);
    }
}
