use dioxus::html::geometry::WheelDelta;
use dioxus::html::input_data::MouseButton;
use dioxus::prelude::*;

use cypher_shared::cluster::{self, Cluster};
use cypher_shared::geo::{self, LatLng};
use cypher_shared::map::{MapController, MapOptions};
use cypher_shared::popup::PopupContent;

use crate::api;
use crate::components::category_selector::CategorySelector;
use crate::components::popup_panel::PopupPanel;
use crate::coords;
use crate::loader;

const WIDGET_ID: &str = "cypher-map-widget";

/// Pre-data view: Leipzig, where the first cypher map went live.
const DEFAULT_CENTER: LatLng = LatLng {
    lat: 51.3396955,
    lng: 12.3730747,
};
const DEFAULT_ZOOM: u8 = 13;

/// Mouse movement below this is treated as a click, not a drag.
const DRAG_THRESHOLD: f64 = 3.0;

/// Bucket size for marker clustering, in projected pixels.
const CLUSTER_RADIUS_PX: f64 = 80.0;

/// Viewport padding applied when fitting to the marker bounds.
const FIT_PADDING_PX: f64 = 40.0;

/// Used until the container has been laid out.
const FALLBACK_VIEWPORT: (f64, f64) = (800.0, 600.0);

// ---------------------------------------------------------------------------
// DOM measurement helpers
// ---------------------------------------------------------------------------

fn container_rect() -> Option<web_sys::DomRect> {
    let document = web_sys::window()?.document()?;
    let element = document.get_element_by_id(WIDGET_ID)?;
    Some(element.get_bounding_client_rect())
}

fn viewport_size() -> (f64, f64) {
    container_rect()
        .map(|rect| (rect.width(), rect.height()))
        .filter(|(w, h)| *w > 0.0 && *h > 0.0)
        .unwrap_or(FALLBACK_VIEWPORT)
}

fn window_height() -> f64 {
    web_sys::window()
        .and_then(|window| window.inner_height().ok())
        .and_then(|value| value.as_f64())
        .unwrap_or(0.0)
}

fn device_pixel_ratio() -> f64 {
    web_sys::window()
        .map(|window| window.device_pixel_ratio())
        .unwrap_or(1.0)
}

/// Convert a wheel delta (pixels / lines / pages) to a uniform pixel-like value.
fn wheel_delta_y(delta: WheelDelta) -> f64 {
    match delta {
        WheelDelta::Pixels(d) => d.y,
        WheelDelta::Lines(d) => d.y * 40.0,
        WheelDelta::Pages(d) => d.y * 400.0,
    }
}

/// Recenter on the browser's geolocation fix.
fn locate(mut center: Signal<LatLng>, mut zoom: Signal<u8>) {
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;

    let Some(geolocation) = web_sys::window().and_then(|w| w.navigator().geolocation().ok())
    else {
        return;
    };
    let on_position = Closure::<dyn FnMut(web_sys::Position)>::new(
        move |position: web_sys::Position| {
            let coordinates = position.coords();
            center.set(LatLng::new(coordinates.latitude(), coordinates.longitude()));
            if *zoom.peek() < DEFAULT_ZOOM {
                zoom.set(DEFAULT_ZOOM);
            }
        },
    );
    if geolocation
        .get_current_position(on_position.as_ref().unchecked_ref())
        .is_ok()
    {
        on_position.forget();
    }
}

/// Apply the controller's pending fit-to-bounds request to the view signals.
fn apply_fit_request(
    mut controller: Signal<MapController>,
    mut center: Signal<LatLng>,
    mut zoom: Signal<u8>,
) {
    let Some(bounds) = controller.write().take_fit_request() else {
        return;
    };
    let (viewport_w, viewport_h) = viewport_size();
    let max_zoom = controller.read().provider().max_zoom();
    let (new_center, new_zoom) =
        geo::fit_bounds(bounds, viewport_w, viewport_h, FIT_PADDING_PX, max_zoom);
    center.set(new_center);
    zoom.set(new_zoom);
}

// ---------------------------------------------------------------------------
// Per-render view structs
// ---------------------------------------------------------------------------

struct TileView {
    url: String,
    left: f64,
    top: f64,
}

struct MarkerView {
    layer_index: usize,
    tooltip: String,
    icon_url: String,
    icon_left: f64,
    icon_top: f64,
    icon_w: f64,
    icon_h: f64,
    shadow_url: String,
    shadow_left: f64,
    shadow_top: f64,
    shadow_w: f64,
    shadow_h: f64,
}

struct ClusterView {
    count: usize,
    left: f64,
    top: f64,
    lat: f64,
    lng: f64,
}

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

#[component]
pub fn CypherMap(
    options: MapOptions,
    data_url: String,
    data_folder: String,
    on_data_ready: Option<EventHandler<Vec<String>>>,
) -> Element {
    let controller = use_signal({
        let options = options.clone();
        let data_folder = data_folder.clone();
        move || MapController::new(options.clone(), &data_folder, device_pixel_ratio() > 1.0)
    });
    let mut center = use_signal(|| DEFAULT_CENTER);
    let mut zoom = use_signal(|| DEFAULT_ZOOM);
    let mut loading = use_signal(|| true);
    let mut open_popup = use_signal(|| None::<usize>);

    // Drag state (mouse)
    let mut is_dragging = use_signal(|| false);
    let mut did_drag = use_signal(|| false);
    let mut drag_start = use_signal(|| (0.0_f64, 0.0_f64));
    let mut drag_start_center = use_signal(|| DEFAULT_CENTER);

    // One data load per widget lifetime. A failed load keeps the spinner;
    // there is no retry.
    let _data_load = use_resource({
        let data_url = data_url.clone();
        move || {
            let data_url = data_url.clone();
            let mut controller = controller;
            async move {
                loader::ensure_stylesheet(api::ICON_FONT_CSS);
                let raw = match api::fetch_geo_data(&data_url).await {
                    Ok(raw) => raw,
                    Err(error) => {
                        tracing::warn!(%error, "geo data fetch failed");
                        return;
                    }
                };
                let load_result = controller.write().load_data(&raw);
                match load_result {
                    Ok(()) => {
                        apply_fit_request(controller, center, zoom);
                        loading.set(false);
                        let categories = controller.read().categories().to_vec();
                        if let Some(handler) = on_data_ready {
                            handler.call(categories);
                        }
                    }
                    Err(error) => tracing::warn!(%error, "geo data rejected"),
                }
            }
        }
    });

    // Cluster index, computed lazily on first clustered render and reused
    // until the marker layer or the zoom changes.
    let clusters = use_memo(move || {
        let controller = controller.read();
        let current_zoom = *zoom.read();
        let Some(layer) = controller.marker_layer() else {
            return Vec::new();
        };
        if controller.options().clustered_at(current_zoom) {
            let points: Vec<(usize, LatLng)> = layer
                .markers
                .iter()
                .enumerate()
                .map(|(index, marker)| (index, marker.position))
                .collect();
            cluster::cluster_markers(&points, current_zoom, CLUSTER_RADIUS_PX)
        } else {
            layer
                .markers
                .iter()
                .enumerate()
                .map(|(index, marker)| Cluster::single(index, marker.position))
                .collect()
        }
    });

    // --- Per-render view data ---

    let (viewport_w, viewport_h) = viewport_size();
    let cur_center = *center.read();
    let cur_zoom = *zoom.read();

    let ctrl = controller.read();
    let provider = ctrl.provider();
    let max_zoom = provider.max_zoom();
    let tile_size = provider.tile_size();
    let attribution = provider.attribution();
    let full_screen = ctrl.options().is_full_screen;
    let show_locate = ctrl.options().show_locate_button;
    let show_selector = ctrl.options().show_category_selection && !ctrl.categories().is_empty();
    let categories = ctrl.categories().to_vec();
    let active_category = ctrl.active_category().to_string();

    let tiles: Vec<TileView> = coords::visible_tiles(
        cur_center,
        cur_zoom,
        viewport_w,
        viewport_h,
        tile_size,
        provider.zoom_offset(),
    )
    .into_iter()
    .map(|tile| TileView {
        url: provider.tile_url(tile.x, tile.y, tile.z),
        left: tile.left,
        top: tile.top,
    })
    .collect();

    let mut marker_views: Vec<MarkerView> = Vec::new();
    let mut cluster_views: Vec<ClusterView> = Vec::new();
    let mut popup_view: Option<(PopupContent, f64, f64)> = None;

    if let Some(layer) = ctrl.marker_layer() {
        for cluster in clusters.read().iter() {
            if cluster.len() == 1 {
                let index = cluster.members()[0];
                let Some(marker) = layer.markers.get(index) else {
                    continue;
                };
                let (x, y) = coords::latlng_to_screen(
                    marker.position,
                    cur_center,
                    cur_zoom,
                    viewport_w,
                    viewport_h,
                );
                let icon = &marker.icon;
                marker_views.push(MarkerView {
                    layer_index: index,
                    tooltip: marker.tooltip.clone(),
                    icon_url: icon.icon_url.clone(),
                    icon_left: x - icon.icon_anchor.0,
                    icon_top: y - icon.icon_anchor.1,
                    icon_w: icon.icon_size.0,
                    icon_h: icon.icon_size.1,
                    shadow_url: icon.shadow_url.clone(),
                    shadow_left: x - icon.shadow_anchor.0,
                    shadow_top: y - icon.shadow_anchor.1,
                    shadow_w: icon.shadow_size.0,
                    shadow_h: icon.shadow_size.1,
                });
            } else {
                let position = cluster.lat_lng();
                let (x, y) = coords::latlng_to_screen(
                    position,
                    cur_center,
                    cur_zoom,
                    viewport_w,
                    viewport_h,
                );
                cluster_views.push(ClusterView {
                    count: cluster.len(),
                    left: x,
                    top: y,
                    lat: position.lat,
                    lng: position.lng,
                });
            }
        }

        let selected = *open_popup.read();
        popup_view = selected.and_then(|index| {
            layer.markers.get(index).map(|marker| {
                let (x, y) = coords::latlng_to_screen(
                    marker.position,
                    cur_center,
                    cur_zoom,
                    viewport_w,
                    viewport_h,
                );
                (marker.popup.clone(), x, y - marker.icon.icon_size.1 - 8.0)
            })
        });
    }
    drop(ctrl);

    let is_loading = *loading.read();
    let container_class = if full_screen {
        "cypher-map full-screen"
    } else {
        "cypher-map"
    };

    rsx! {
        div {
            id: WIDGET_ID,
            class: "{container_class}",

            onwheel: move |evt: Event<WheelData>| {
                let (viewport_w, viewport_h) = viewport_size();
                if !coords::scroll_wheel_zoom_enabled(full_screen, viewport_h, window_height()) {
                    return;
                }
                evt.prevent_default();
                let delta_y = wheel_delta_y(evt.data().delta());
                let old_zoom = *zoom.read();
                let new_zoom = if delta_y < 0.0 {
                    (old_zoom + 1).min(max_zoom)
                } else {
                    old_zoom.saturating_sub(1)
                };
                if new_zoom == old_zoom {
                    return;
                }
                let Some(rect) = container_rect() else { return };
                let client = evt.data().client_coordinates();
                let cursor_x = client.x - rect.left();
                let cursor_y = client.y - rect.top();
                let cur_center = *center.read();
                center.set(coords::zoom_around(
                    cursor_x, cursor_y, cur_center,
                    old_zoom, new_zoom, viewport_w, viewport_h,
                ));
                zoom.set(new_zoom);
            },

            onmousedown: move |evt: Event<MouseData>| {
                if evt.trigger_button() != Some(MouseButton::Primary) {
                    return;
                }
                let client = evt.client_coordinates();
                is_dragging.set(true);
                did_drag.set(false);
                drag_start.set((client.x, client.y));
                drag_start_center.set(*center.read());
            },

            onmousemove: move |evt: Event<MouseData>| {
                if !*is_dragging.read() {
                    return;
                }
                let client = evt.client_coordinates();
                let (start_x, start_y) = *drag_start.read();
                let dx = client.x - start_x;
                let dy = client.y - start_y;
                if !*did_drag.read() && (dx.abs() > DRAG_THRESHOLD || dy.abs() > DRAG_THRESHOLD) {
                    did_drag.set(true);
                }
                if *did_drag.read() {
                    center.set(coords::pan_center(
                        *drag_start_center.read(), dx, dy, *zoom.read(),
                    ));
                }
            },

            onmouseup: move |_| {
                is_dragging.set(false);
            },

            onmouseleave: move |_| {
                is_dragging.set(false);
            },

            onclick: move |_| {
                // A click that ends a drag keeps the popup open.
                if *did_drag.read() {
                    did_drag.set(false);
                    return;
                }
                open_popup.set(None);
            },

            ondoubleclick: move |evt: Event<MouseData>| {
                evt.prevent_default();
                let old_zoom = *zoom.read();
                let new_zoom = (old_zoom + 1).min(max_zoom);
                if new_zoom == old_zoom {
                    return;
                }
                let Some(rect) = container_rect() else { return };
                let (viewport_w, viewport_h) = viewport_size();
                let client = evt.client_coordinates();
                let cur_center = *center.read();
                center.set(coords::zoom_around(
                    client.x - rect.left(), client.y - rect.top(), cur_center,
                    old_zoom, new_zoom, viewport_w, viewport_h,
                ));
                zoom.set(new_zoom);
            },

            div { class: "tile-layer",
                for tile in tiles {
                    img {
                        class: "tile",
                        src: "{tile.url}",
                        style: "left: {tile.left}px; top: {tile.top}px; width: {tile_size}px; height: {tile_size}px;",
                        draggable: "false",
                        alt: "",
                    }
                }
            }

            div { class: "marker-layer",
                for marker in marker_views {
                    img {
                        class: "marker-shadow",
                        src: "{marker.shadow_url}",
                        style: "left: {marker.shadow_left}px; top: {marker.shadow_top}px; width: {marker.shadow_w}px; height: {marker.shadow_h}px;",
                        draggable: "false",
                        alt: "",
                    }
                    img {
                        class: "marker",
                        src: "{marker.icon_url}",
                        title: "{marker.tooltip}",
                        style: "left: {marker.icon_left}px; top: {marker.icon_top}px; width: {marker.icon_w}px; height: {marker.icon_h}px;",
                        draggable: "false",
                        alt: "{marker.tooltip}",
                        onclick: move |evt: Event<MouseData>| {
                            evt.stop_propagation();
                            open_popup.set(Some(marker.layer_index));
                        },
                    }
                }
                for cluster in cluster_views {
                    div {
                        class: "cluster",
                        style: "left: {cluster.left}px; top: {cluster.top}px;",
                        onclick: move |evt: Event<MouseData>| {
                            evt.stop_propagation();
                            center.set(LatLng::new(cluster.lat, cluster.lng));
                            let new_zoom = (*zoom.read() + 1).min(max_zoom);
                            zoom.set(new_zoom);
                        },
                        span { "{cluster.count}" }
                    }
                }
            }

            if let Some((content, x, y)) = popup_view {
                PopupPanel {
                    content,
                    x,
                    y,
                    on_close: move |_| open_popup.set(None),
                }
            }

            if show_selector {
                CategorySelector {
                    categories,
                    active: active_category,
                    on_select: move |category: String| {
                        let mut controller = controller;
                        controller.write().select_category(&category);
                        open_popup.set(None);
                        apply_fit_request(controller, center, zoom);
                    },
                }
            }

            div { class: "zoom-control",
                button {
                    "aria-label": "Zoom in",
                    onclick: move |evt: Event<MouseData>| {
                        evt.stop_propagation();
                        let new_zoom = (*zoom.read() + 1).min(max_zoom);
                        zoom.set(new_zoom);
                    },
                    "+"
                }
                button {
                    "aria-label": "Zoom out",
                    onclick: move |evt: Event<MouseData>| {
                        evt.stop_propagation();
                        let new_zoom = zoom.read().saturating_sub(1);
                        zoom.set(new_zoom);
                    },
                    "−"
                }
            }

            if show_locate {
                button {
                    class: "locate-control fa fa-location-arrow",
                    "aria-label": "Show my location",
                    onclick: move |evt: Event<MouseData>| {
                        evt.stop_propagation();
                        locate(center, zoom);
                    },
                }
            }

            div { class: "attribution", "{attribution}" }

            if is_loading {
                div { id: "loading",
                    svg { height: "100", width: "100", class: "spinner",
                        circle { cx: "50", cy: "50", r: "20", class: "inner-circle" }
                    }
                }
            }
        }
    }
}
