//! Web-Mercator math shared by the controller and the renderer.
//!
//! The projected world is a square of `TILE_SIZE * 2^zoom` pixels; all
//! screen placement, bounds fitting, and clustering work in that space.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

pub const TILE_SIZE: f64 = 256.0;
pub const MIN_ZOOM: u8 = 0;
pub const MAX_ZOOM: u8 = 18;

/// Latitude limit of the Web-Mercator projection.
const MAX_MERCATOR_LAT: f64 = 85.051_128_78;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Axis-aligned geographic bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLngBounds {
    min_lat: f64,
    max_lat: f64,
    min_lng: f64,
    max_lng: f64,
}

impl LatLngBounds {
    pub fn of(point: LatLng) -> Self {
        Self {
            min_lat: point.lat,
            max_lat: point.lat,
            min_lng: point.lng,
            max_lng: point.lng,
        }
    }

    /// Bounds covering all points; `None` for an empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = LatLng>) -> Option<Self> {
        let mut points = points.into_iter();
        let mut bounds = Self::of(points.next()?);
        for point in points {
            bounds.extend(point);
        }
        Some(bounds)
    }

    pub fn extend(&mut self, point: LatLng) {
        self.min_lat = self.min_lat.min(point.lat);
        self.max_lat = self.max_lat.max(point.lat);
        self.min_lng = self.min_lng.min(point.lng);
        self.max_lng = self.max_lng.max(point.lng);
    }

    pub fn south_west(&self) -> LatLng {
        LatLng::new(self.min_lat, self.min_lng)
    }

    pub fn north_east(&self) -> LatLng {
        LatLng::new(self.max_lat, self.max_lng)
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}

/// Pixel span of the projected world at an integer zoom level.
pub fn world_size(zoom: u8) -> f64 {
    TILE_SIZE * (1u32 << zoom.min(MAX_ZOOM)) as f64
}

/// Project a geographic point to world pixels at the given zoom.
pub fn project(point: LatLng, zoom: u8) -> (f64, f64) {
    let size = world_size(zoom);
    let x = (point.lng + 180.0) / 360.0 * size;
    let lat = point.lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
    let sin = lat.to_radians().sin();
    let y = (0.5 - ((1.0 + sin) / (1.0 - sin)).ln() / (4.0 * PI)) * size;
    (x, y)
}

/// Inverse of [`project`].
pub fn unproject(x: f64, y: f64, zoom: u8) -> LatLng {
    let size = world_size(zoom);
    let lng = x / size * 360.0 - 180.0;
    let n = PI - 2.0 * PI * y / size;
    let lat = (0.5 * (n.exp() - (-n).exp())).atan().to_degrees();
    LatLng::new(lat, lng)
}

/// Center and the largest integer zoom at which `bounds` fits the padded
/// viewport. Degenerate (single-point) bounds fit at `max_zoom`.
pub fn fit_bounds(
    bounds: LatLngBounds,
    viewport_w: f64,
    viewport_h: f64,
    padding: f64,
    max_zoom: u8,
) -> (LatLng, u8) {
    let usable_w = (viewport_w - 2.0 * padding).max(1.0);
    let usable_h = (viewport_h - 2.0 * padding).max(1.0);

    let mut zoom = MIN_ZOOM;
    for candidate in (MIN_ZOOM..=max_zoom.min(MAX_ZOOM)).rev() {
        let (x0, y0) = project(bounds.south_west(), candidate);
        let (x1, y1) = project(bounds.north_east(), candidate);
        if (x1 - x0).abs() <= usable_w && (y1 - y0).abs() <= usable_h {
            zoom = candidate;
            break;
        }
    }
    (bounds.center(), zoom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_world_center() {
        let (x, y) = project(LatLng::new(0.0, 0.0), 0);
        assert!((x - 128.0).abs() < 1e-9);
        assert!((y - 128.0).abs() < 1e-6);
    }

    #[test]
    fn test_project_scales_with_zoom() {
        let point = LatLng::new(51.34, 12.37);
        let (x1, y1) = project(point, 5);
        let (x2, y2) = project(point, 6);
        assert!((x2 - x1 * 2.0).abs() < 1e-6);
        assert!((y2 - y1 * 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_unproject_roundtrip() {
        let point = LatLng::new(51.3396955, 12.3730747);
        for zoom in [3, 10, 18] {
            let (x, y) = project(point, zoom);
            let back = unproject(x, y, zoom);
            assert!((back.lat - point.lat).abs() < 1e-6);
            assert!((back.lng - point.lng).abs() < 1e-6);
        }
    }

    #[test]
    fn test_project_clamps_polar_latitudes() {
        let (_, y) = project(LatLng::new(89.9, 0.0), 2);
        assert!(y >= 0.0);
        let (_, y) = project(LatLng::new(-89.9, 0.0), 2);
        assert!(y <= world_size(2));
    }

    #[test]
    fn test_bounds_from_points() {
        let bounds = LatLngBounds::from_points([
            LatLng::new(45.0, 9.0),
            LatLng::new(41.9, 12.5),
            LatLng::new(43.7, 10.4),
        ])
        .unwrap();
        assert_eq!(bounds.south_west(), LatLng::new(41.9, 9.0));
        assert_eq!(bounds.north_east(), LatLng::new(45.0, 12.5));
        let center = bounds.center();
        assert!((center.lat - 43.45).abs() < 1e-9);
        assert!((center.lng - 10.75).abs() < 1e-9);
    }

    #[test]
    fn test_bounds_from_no_points() {
        assert!(LatLngBounds::from_points([]).is_none());
    }

    #[test]
    fn test_fit_bounds_single_point_uses_max_zoom() {
        let bounds = LatLngBounds::of(LatLng::new(51.34, 12.37));
        let (center, zoom) = fit_bounds(bounds, 800.0, 600.0, 40.0, 16);
        assert_eq!(zoom, 16);
        assert!((center.lat - 51.34).abs() < 1e-9);
    }

    #[test]
    fn test_fit_bounds_wide_area_zooms_out() {
        // Roughly all of Italy should not fit at street-level zooms.
        let bounds = LatLngBounds::from_points([
            LatLng::new(36.9, 6.6),
            LatLng::new(47.1, 18.5),
        ])
        .unwrap();
        let (_, zoom) = fit_bounds(bounds, 800.0, 600.0, 40.0, 18);
        assert!(zoom <= 6, "expected a country-level zoom, got {zoom}");
        // The fitted bounds actually fit the padded viewport.
        let (x0, y0) = project(bounds.south_west(), zoom);
        let (x1, y1) = project(bounds.north_east(), zoom);
        assert!((x1 - x0).abs() <= 800.0 - 80.0);
        assert!((y1 - y0).abs() <= 600.0 - 80.0);
    }

    #[test]
    fn test_fit_bounds_monotonic_in_viewport() {
        let bounds = LatLngBounds::from_points([
            LatLng::new(51.0, 12.0),
            LatLng::new(52.0, 13.0),
        ])
        .unwrap();
        let (_, small) = fit_bounds(bounds, 400.0, 300.0, 40.0, 18);
        let (_, large) = fit_bounds(bounds, 1600.0, 1200.0, 40.0, 18);
        assert!(large >= small);
    }
}
