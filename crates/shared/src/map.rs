//! The filterable map controller.
//!
//! Owns the feature collection, the category set, the active filter, and
//! the marker-layer lifecycle. It only describes desired state (which
//! markers, which icons, where to fit the view); drawing is the renderer's
//! job.

use serde::{Deserialize, Serialize};

use crate::error::MapError;
use crate::geo::{LatLng, LatLngBounds};
use crate::geojson::{self, Feature};
use crate::popup::PopupContent;
use crate::tiles::TileProvider;

/// Category value that matches every feature.
pub const ALL_CATEGORIES: &str = "all";

/// Icon shipped with the widget assets, used unless custom markers are on.
pub const DEFAULT_MARKER_ICON: &str = "marker_mic.svg";
const MARKER_SHADOW: &str = "shadow.svg";

/// How the active category is matched against a feature.
///
/// The historical widget variants differed here: the early ones compared a
/// single category value, the converged one tests membership in the
/// feature's category list. Both survive as one strategy switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterMode {
    /// The feature's category list contains the selected category.
    #[default]
    Membership,
    /// The feature's primary (first) category equals the selected category.
    Exact,
}

/// Construction-time configuration. Unknown keys in a serialized config are
/// ignored; absent keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MapOptions {
    pub show_locate_button: bool,
    pub show_category_selection: bool,
    /// Enables clustering when set: views zoomed below this level group
    /// markers into clusters.
    pub cluster_below_zoom: Option<u8>,
    /// Use the per-feature `image` property as the marker icon.
    pub use_custom_markers: bool,
    pub is_full_screen: bool,
    pub map_box_key: Option<String>,
    pub map_box_style: Option<String>,
    pub filter_mode: FilterMode,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            show_locate_button: false,
            show_category_selection: true,
            cluster_below_zoom: None,
            use_custom_markers: false,
            is_full_screen: false,
            map_box_key: None,
            map_box_style: None,
            filter_mode: FilterMode::Membership,
        }
    }
}

impl MapOptions {
    pub fn clustering_enabled(&self) -> bool {
        self.cluster_below_zoom.is_some()
    }

    /// Whether a view at `zoom` renders clusters instead of single markers.
    pub fn clustered_at(&self, zoom: u8) -> bool {
        matches!(self.cluster_below_zoom, Some(threshold) if zoom < threshold)
    }
}

/// Marker icon geometry, mirroring the shipped image assets.
#[derive(Debug, Clone, PartialEq)]
pub struct IconSpec {
    pub icon_url: String,
    pub icon_size: (f64, f64),
    pub icon_anchor: (f64, f64),
    pub shadow_url: String,
    pub shadow_size: (f64, f64),
    pub shadow_anchor: (f64, f64),
}

/// One renderable marker.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub feature_index: usize,
    pub position: LatLng,
    pub icon: IconSpec,
    pub tooltip: String,
    pub popup: PopupContent,
}

/// The displayed marker set. Replaced wholesale on every filter change so
/// the visible markers always match the active filter exactly; it is never
/// mutated in place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MarkerLayer {
    pub markers: Vec<MarkerSpec>,
}

impl MarkerLayer {
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn bounds(&self) -> Option<LatLngBounds> {
        LatLngBounds::from_points(self.markers.iter().map(|m| m.position))
    }
}

pub struct MapController {
    options: MapOptions,
    provider: TileProvider,
    data_folder: String,
    features: Vec<Feature>,
    categories: Vec<String>,
    active_category: String,
    marker_layer: Option<MarkerLayer>,
    fit_request: Option<LatLngBounds>,
    loaded: bool,
}

impl MapController {
    /// `data_folder` locates the marker image assets; `retina` is the
    /// host's pixel-density flag, passed in explicitly so the controller
    /// stays headless.
    pub fn new(options: MapOptions, data_folder: &str, retina: bool) -> Self {
        let provider = TileProvider::select(
            options.map_box_key.as_deref(),
            options.map_box_style.as_deref(),
            retina,
        );
        Self {
            options,
            provider,
            data_folder: data_folder.to_string(),
            features: Vec::new(),
            categories: Vec::new(),
            active_category: ALL_CATEGORIES.to_string(),
            marker_layer: None,
            fit_request: None,
            loaded: false,
        }
    }

    pub fn options(&self) -> &MapOptions {
        &self.options
    }

    pub fn provider(&self) -> &TileProvider {
        &self.provider
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn active_category(&self) -> &str {
        &self.active_category
    }

    pub fn marker_layer(&self) -> Option<&MarkerLayer> {
        self.marker_layer.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Parse and validate the GeoJSON payload, rebuild the category set,
    /// and apply the initial "all" filter with a fit-to-bounds request.
    ///
    /// Errors unwind without touching controller state; the caller presents
    /// the failure. One load per controller lifetime, no retry.
    pub fn load_data(&mut self, raw: &str) -> Result<(), MapError> {
        let collection = geojson::parse_feature_collection(raw)?;
        self.features = collection.features;
        self.categories = geojson::collect_categories(&self.features);
        self.loaded = true;
        tracing::info!(
            features = self.features.len(),
            categories = ?self.categories,
            "geo data loaded"
        );
        self.apply_filter(ALL_CATEGORIES, true);
        Ok(())
    }

    /// Re-filter with a fit-to-bounds request and record the selection.
    /// A category outside the aggregated set is accepted verbatim and
    /// simply yields an empty layer.
    pub fn select_category(&mut self, category: &str) {
        self.apply_filter(category, true);
        self.active_category = category.to_string();
    }

    /// Rebuild the marker layer for `category`. The previous layer is
    /// dropped before the replacement is stored; at most one layer exists
    /// at any time.
    pub fn apply_filter(&mut self, category: &str, zoom_to_selection: bool) {
        let mode = self.options.filter_mode;
        let markers: Vec<MarkerSpec> = self
            .features
            .iter()
            .enumerate()
            .filter(|(_, feature)| matches_filter(mode, feature, category))
            .filter_map(|(index, feature)| self.build_marker(index, feature))
            .collect();

        let layer = MarkerLayer { markers };
        self.fit_request = if zoom_to_selection {
            layer.bounds()
        } else {
            None
        };
        self.marker_layer = Some(layer);
    }

    /// The pending fit-to-bounds request, if the last filter change asked
    /// for one and produced a non-empty layer. Consumed by the renderer.
    pub fn take_fit_request(&mut self) -> Option<LatLngBounds> {
        self.fit_request.take()
    }

    fn build_marker(&self, feature_index: usize, feature: &Feature) -> Option<MarkerSpec> {
        let position = feature.lat_lng()?;
        let info = feature.info()?;
        Some(MarkerSpec {
            feature_index,
            position,
            icon: self.marker_icon(feature),
            tooltip: info.name.clone(),
            popup: PopupContent::for_location(info),
        })
    }

    fn marker_icon(&self, feature: &Feature) -> IconSpec {
        let custom_image = if self.options.use_custom_markers {
            feature
                .properties
                .get("image")
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
        } else {
            None
        };

        // Custom icons ship a larger shadow than the default microphone.
        let (file, shadow_size, shadow_anchor) = match custom_image {
            Some(file) => (file, (50.0, 50.0), (25.0, 22.0)),
            None => (DEFAULT_MARKER_ICON, (7.0, 7.0), (3.5, 5.0)),
        };

        IconSpec {
            icon_url: format!("{}images/{}", self.data_folder, file),
            icon_size: (38.0, 38.0),
            icon_anchor: (19.0, 38.0),
            shadow_url: format!("{}images/{}", self.data_folder, MARKER_SHADOW),
            shadow_size,
            shadow_anchor,
        }
    }
}

fn matches_filter(mode: FilterMode, feature: &Feature, category: &str) -> bool {
    if category == ALL_CATEGORIES {
        return true;
    }
    let Some(info) = feature.info() else {
        return false;
    };
    match mode {
        FilterMode::Membership => info.categories().iter().any(|c| c == category),
        FilterMode::Exact => info.categories().first().map(String::as_str) == Some(category),
    }
}
