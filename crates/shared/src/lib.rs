//! Headless core of the cypher map widget.
//!
//! Everything here is plain Rust with no DOM or wasm dependency: the
//! validated location model, GeoJSON parsing, category filtering, popup
//! content, tile-provider selection, and the geographic math the renderer
//! draws from.

pub mod cluster;
pub mod error;
pub mod geo;
pub mod geojson;
pub mod location;
pub mod map;
pub mod popup;
pub mod tiles;
