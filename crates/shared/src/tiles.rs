//! Basemap tile providers.
//!
//! The provider is chosen once at widget initialization and not revisited:
//! Mapbox styled tiles when an access token is configured, the public
//! OpenStreetMap source otherwise.

const DEFAULT_MAPBOX_STYLE: &str = "mapbox/streets-v11";

const OSM_ATTRIBUTION: &str =
    "Map data © OpenStreetMap contributors, CC-BY-SA";
const MAPBOX_ATTRIBUTION: &str =
    "Map data © OpenStreetMap contributors, Imagery © Mapbox";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileProvider {
    OpenStreetMap,
    Mapbox {
        access_token: String,
        style: String,
        retina: bool,
    },
}

impl TileProvider {
    /// Select the provider from the configured Mapbox credentials.
    /// `retina` doubles the Mapbox tile resolution on high-density screens.
    pub fn select(access_token: Option<&str>, style: Option<&str>, retina: bool) -> Self {
        match access_token {
            Some(token) if !token.is_empty() => TileProvider::Mapbox {
                access_token: token.to_string(),
                style: match style {
                    Some(style) if !style.is_empty() => style.to_string(),
                    _ => DEFAULT_MAPBOX_STYLE.to_string(),
                },
                retina,
            },
            _ => TileProvider::OpenStreetMap,
        }
    }

    /// Rendered tile edge in CSS pixels.
    pub fn tile_size(&self) -> u32 {
        match self {
            TileProvider::OpenStreetMap => 256,
            TileProvider::Mapbox { .. } => 512,
        }
    }

    /// Mapbox serves 512px tiles, so tile indices lag the view zoom by one.
    pub fn zoom_offset(&self) -> i8 {
        match self {
            TileProvider::OpenStreetMap => 0,
            TileProvider::Mapbox { .. } => -1,
        }
    }

    pub fn max_zoom(&self) -> u8 {
        18
    }

    pub fn tile_url(&self, x: u32, y: u32, z: u8) -> String {
        match self {
            TileProvider::OpenStreetMap => {
                format!("https://tile.openstreetmap.org/{z}/{x}/{y}.png")
            }
            TileProvider::Mapbox {
                access_token,
                style,
                retina,
            } => {
                let retina_part = if *retina { "@2x" } else { "" };
                format!(
                    "https://api.mapbox.com/styles/v1/{style}/tiles/{z}/{x}/{y}{retina_part}?access_token={access_token}"
                )
            }
        }
    }

    pub fn attribution(&self) -> &'static str {
        match self {
            TileProvider::OpenStreetMap => OSM_ATTRIBUTION,
            TileProvider::Mapbox { .. } => MAPBOX_ATTRIBUTION,
        }
    }
}
