//! View math for the map widget.
//!
//! Pure functions over the shared Web-Mercator projection: geo to screen
//! placement, panning, zoom-around-cursor, and visible-tile enumeration.
//! Nothing here touches the DOM, so all of it runs in native unit tests.

use cypher_shared::geo::{self, LatLng};

/// Screen position of a geographic point for a view centered on `center`.
pub fn latlng_to_screen(
    point: LatLng,
    center: LatLng,
    zoom: u8,
    viewport_w: f64,
    viewport_h: f64,
) -> (f64, f64) {
    let (cx, cy) = geo::project(center, zoom);
    let (x, y) = geo::project(point, zoom);
    (x - cx + viewport_w / 2.0, y - cy + viewport_h / 2.0)
}

/// Geographic point under a screen position.
pub fn screen_to_latlng(
    screen_x: f64,
    screen_y: f64,
    center: LatLng,
    zoom: u8,
    viewport_w: f64,
    viewport_h: f64,
) -> LatLng {
    let (cx, cy) = geo::project(center, zoom);
    geo::unproject(
        cx + screen_x - viewport_w / 2.0,
        cy + screen_y - viewport_h / 2.0,
        zoom,
    )
}

/// New center after dragging the map by a screen-pixel delta.
pub fn pan_center(center: LatLng, dx: f64, dy: f64, zoom: u8) -> LatLng {
    let (cx, cy) = geo::project(center, zoom);
    geo::unproject(cx - dx, cy - dy, zoom)
}

/// New center so that the point under the cursor stays under the cursor
/// across a zoom change.
pub fn zoom_around(
    cursor_x: f64,
    cursor_y: f64,
    center: LatLng,
    old_zoom: u8,
    new_zoom: u8,
    viewport_w: f64,
    viewport_h: f64,
) -> LatLng {
    let anchor = screen_to_latlng(cursor_x, cursor_y, center, old_zoom, viewport_w, viewport_h);
    let (ax, ay) = geo::project(anchor, new_zoom);
    geo::unproject(
        ax - (cursor_x - viewport_w / 2.0),
        ay - (cursor_y - viewport_h / 2.0),
        new_zoom,
    )
}

/// The embedded widget only captures the wheel when it does not dominate
/// the window; full-screen maps always do.
pub fn scroll_wheel_zoom_enabled(
    is_full_screen: bool,
    widget_height: f64,
    window_height: f64,
) -> bool {
    if is_full_screen {
        return true;
    }
    window_height > 0.0 && widget_height / window_height < 0.85
}

/// One basemap tile positioned in the viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct TileSpec {
    pub x: u32,
    pub y: u32,
    pub z: u8,
    pub left: f64,
    pub top: f64,
}

/// Enumerate the tiles covering the viewport for the current view.
///
/// `zoom_offset` shifts tile indices for providers serving oversized tiles
/// (Mapbox 512px tiles lag the view zoom by one). Columns wrap around the
/// antimeridian; rows outside the projected world are dropped.
pub fn visible_tiles(
    center: LatLng,
    zoom: u8,
    viewport_w: f64,
    viewport_h: f64,
    tile_size: u32,
    zoom_offset: i8,
) -> Vec<TileSpec> {
    let tile_zoom = zoom as i16 + zoom_offset as i16;
    if tile_zoom < 0 {
        return Vec::new();
    }
    let tile_zoom = tile_zoom as u8;
    let tiles_across = 1i64 << tile_zoom;
    let size = tile_size as f64;

    let (cx, cy) = geo::project(center, zoom);
    let left_world = cx - viewport_w / 2.0;
    let top_world = cy - viewport_h / 2.0;

    let first_col = (left_world / size).floor() as i64;
    let last_col = ((left_world + viewport_w) / size).ceil() as i64 - 1;
    let first_row = (top_world / size).floor() as i64;
    let last_row = ((top_world + viewport_h) / size).ceil() as i64 - 1;

    let mut tiles = Vec::new();
    for row in first_row..=last_row {
        if row < 0 || row >= tiles_across {
            continue;
        }
        for col in first_col..=last_col {
            tiles.push(TileSpec {
                x: col.rem_euclid(tiles_across) as u32,
                y: row as u32,
                z: tile_zoom,
                left: col as f64 * size - left_world,
                top: row as f64 * size - top_world,
            });
        }
    }
    tiles
}
