use thiserror::Error;

use crate::location::LocationError;

/// Errors surfaced by the map core and its resource-loading boundary.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("map container \"{0}\" does not exist in the document")]
    ContainerNotFound(String),

    #[error("malformed GeoJSON: {0}")]
    MalformedGeoJson(#[from] serde_json::Error),

    /// A feature failed required-field validation. The whole load aborts;
    /// partially accepted data would leave popups and the category list
    /// working from features that were never validated.
    #[error("feature {index}: {source}")]
    InvalidFeature {
        index: usize,
        #[source]
        source: LocationError,
    },

    #[error("request for {url} failed: {reason}")]
    Network { url: String, reason: String },

    #[error("external resource failed to load: {url}")]
    Load { url: String },
}
