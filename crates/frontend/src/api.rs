//! Data-source resolution and the data fetch.
//!
//! The widget is embeddable: served next to its data folder during local
//! development, from the CDN copy of the repository in production. The
//! derivations are pure so the wiring is testable.

use cypher_shared::error::MapError;

use crate::loader;

/// Published copy of this repository, used when not running locally.
pub const REPOSITORY_BASE_URL: &str = "https://cdn.jsdelivr.net/gh/rapscript/cypher-map@master/";

/// Data folder relative to the locally served site.
const LOCAL_DATA_FOLDER: &str = "/assets/data/";

/// Icon font used by the dropdown chevron, loaded through the resource
/// loader like the rest of the external styling.
pub const ICON_FONT_CSS: &str = "https://use.fontawesome.com/releases/v5.8.1/css/all.css";

/// Site-level wiring, passed in explicitly instead of sniffed from ambient
/// globals.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteConfig {
    /// Id of the DOM element the widget mounts into.
    pub container_id: String,
    pub is_local: bool,
    /// GeoJSON file name inside the data folder.
    pub data_file: String,
    /// Cache-busting tag appended to data requests.
    pub version_tag: String,
    /// Companion add-on scripts the embedding site wants loaded alongside
    /// the widget (the original deployment pulled its locate-control add-on
    /// in this way).
    pub extra_scripts: Vec<String>,
}

impl SiteConfig {
    /// Folder holding the GeoJSON file and the marker images.
    pub fn data_folder(&self) -> String {
        if self.is_local {
            LOCAL_DATA_FOLDER.to_string()
        } else {
            format!("{REPOSITORY_BASE_URL}data/")
        }
    }

    /// Cache-busted URL of the GeoJSON payload.
    pub fn data_url(&self) -> String {
        format!(
            "{}{}?v={}",
            self.data_folder(),
            self.data_file,
            self.version_tag
        )
    }
}

pub async fn fetch_geo_data(url: &str) -> Result<String, MapError> {
    loader::fetch_text(url).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(is_local: bool) -> SiteConfig {
        SiteConfig {
            container_id: "cypher-map".to_string(),
            is_local,
            data_file: "italy.geojson".to_string(),
            version_tag: "202006120".to_string(),
            extra_scripts: Vec::new(),
        }
    }

    #[test]
    fn test_local_data_folder() {
        assert_eq!(config(true).data_folder(), "/assets/data/");
    }

    #[test]
    fn test_cdn_data_folder() {
        assert_eq!(
            config(false).data_folder(),
            "https://cdn.jsdelivr.net/gh/rapscript/cypher-map@master/data/"
        );
    }

    #[test]
    fn test_data_url_appends_version_tag() {
        assert_eq!(
            config(true).data_url(),
            "/assets/data/italy.geojson?v=202006120"
        );
        assert_eq!(
            config(false).data_url(),
            "https://cdn.jsdelivr.net/gh/rapscript/cypher-map@master/data/italy.geojson?v=202006120"
        );
    }
}
