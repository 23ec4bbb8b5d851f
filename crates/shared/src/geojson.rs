//! serde models for the GeoJSON input file plus per-feature validation.
//!
//! The file shape is modelled directly instead of going through a generic
//! GeoJSON crate: the widget only ever reads point coordinates and the
//! validated `properties` view.

use serde::Deserialize;
use serde_json::Value;

use crate::error::MapError;
use crate::geo::LatLng;
use crate::location::LocationInfo;

#[derive(Debug, Clone, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub properties: Value,
    /// The validated view over `properties`, populated once by
    /// [`parse_feature_collection`].
    #[serde(skip)]
    info: Option<LocationInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

impl Geometry {
    /// GeoJSON point coordinates are `[lon, lat]`.
    pub fn lat_lng(&self) -> Option<LatLng> {
        if self.kind != "Point" || self.coordinates.len() < 2 {
            return None;
        }
        Some(LatLng::new(self.coordinates[1], self.coordinates[0]))
    }
}

impl Feature {
    pub fn lat_lng(&self) -> Option<LatLng> {
        self.geometry.as_ref().and_then(Geometry::lat_lng)
    }

    pub fn info(&self) -> Option<&LocationInfo> {
        self.info.as_ref()
    }
}

/// Parse the raw GeoJSON text and validate every feature's properties.
///
/// The first invalid feature aborts the whole load; the category list and
/// the popups assume every rendered feature carries a valid info view.
pub fn parse_feature_collection(raw: &str) -> Result<FeatureCollection, MapError> {
    let mut collection: FeatureCollection = serde_json::from_str(raw)?;
    for (index, feature) in collection.features.iter_mut().enumerate() {
        let info = LocationInfo::parse(&feature.properties)
            .map_err(|source| MapError::InvalidFeature { index, source })?;
        feature.info = Some(info);
    }
    Ok(collection)
}

/// Category labels across all features, first-seen order, unique.
pub fn collect_categories(features: &[Feature]) -> Vec<String> {
    let mut categories: Vec<String> = Vec::new();
    for feature in features {
        let Some(info) = feature.info() else { continue };
        for category in info.categories() {
            if !categories.iter().any(|known| known == category) {
                categories.push(category.clone());
            }
        }
    }
    categories
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::LocationError;

    fn sample_geojson() -> &'static str {
        r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "geometry": {"type": "Point", "coordinates": [12.37, 51.34]},
                    "properties": {
                        "city": "Leipzig",
                        "name": "Cypher am See",
                        "url": "https://instagram.com/cypheramsee",
                        "weekdays": ["mo", "wed"]
                    }
                },
                {
                    "type": "Feature",
                    "geometry": {"type": "Point", "coordinates": [13.40, 52.52]},
                    "properties": {
                        "city": "Berlin",
                        "name": "Open Cypher",
                        "url": "https://opencypher.test",
                        "weekdays": []
                    }
                }
            ]
        }"#
    }

    #[test]
    fn test_parse_valid_collection() {
        let collection = parse_feature_collection(sample_geojson()).unwrap();
        assert_eq!(collection.features.len(), 2);
        let info = collection.features[0].info().unwrap();
        assert_eq!(info.name, "Cypher am See");
        let position = collection.features[0].lat_lng().unwrap();
        assert!((position.lat - 51.34).abs() < 1e-9);
        assert!((position.lng - 12.37).abs() < 1e-9);
    }

    #[test]
    fn test_parse_malformed_json() {
        let err = parse_feature_collection("{not json").unwrap_err();
        assert!(matches!(err, MapError::MalformedGeoJson(_)));
    }

    #[test]
    fn test_parse_invalid_feature_reports_index_and_field() {
        let raw = r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "geometry": {"type": "Point", "coordinates": [12.5, 41.9]},
                    "properties": {"city": "Rome", "name": "Cypher", "url": "http://x.test"}
                },
                {
                    "type": "Feature",
                    "geometry": {"type": "Point", "coordinates": [9.19, 45.46]},
                    "properties": {"city": "Milan", "name": "", "url": "http://y.test"}
                }
            ]
        }"#;
        let err = parse_feature_collection(raw).unwrap_err();
        match err {
            MapError::InvalidFeature { index, source } => {
                assert_eq!(index, 1);
                assert_eq!(source, LocationError::MissingRequiredField("name"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_collect_categories_first_seen_order() {
        let collection = parse_feature_collection(sample_geojson()).unwrap();
        assert_eq!(collect_categories(&collection.features), ["mo", "wed"]);
    }

    #[test]
    fn test_collect_categories_idempotent() {
        let first = collect_categories(&parse_feature_collection(sample_geojson()).unwrap().features);
        let second = collect_categories(&parse_feature_collection(sample_geojson()).unwrap().features);
        assert_eq!(first, second);
    }

    #[test]
    fn test_collect_categories_deduplicates_across_features() {
        let raw = r#"{
            "features": [
                {
                    "geometry": {"type": "Point", "coordinates": [1.0, 2.0]},
                    "properties": {"city": "A", "name": "a", "url": "http://a.test", "weekdays": ["wed", "mo"]}
                },
                {
                    "geometry": {"type": "Point", "coordinates": [3.0, 4.0]},
                    "properties": {"city": "B", "name": "b", "url": "http://b.test", "weekdays": ["mo", "fri"]}
                }
            ]
        }"#;
        let collection = parse_feature_collection(raw).unwrap();
        assert_eq!(collect_categories(&collection.features), ["wed", "mo", "fri"]);
    }

    #[test]
    fn test_non_point_geometry_has_no_position() {
        let raw = r#"{
            "features": [
                {
                    "geometry": {"type": "LineString", "coordinates": [1.0, 2.0]},
                    "properties": {"city": "A", "name": "a", "url": "http://a.test"}
                }
            ]
        }"#;
        let collection = parse_feature_collection(raw).unwrap();
        assert!(collection.features[0].lat_lng().is_none());
        // The feature still validates and still counts for categories.
        assert!(collection.features[0].info().is_some());
    }
}
