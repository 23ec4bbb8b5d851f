mod api;
mod components;
mod coords;
mod loader;

use dioxus::prelude::*;

use cypher_shared::error::MapError;
use cypher_shared::map::MapOptions;

use crate::api::SiteConfig;
use crate::components::map_widget::CypherMap;

const CSS: Asset = asset!("/assets/main.css");

/// Demo site wiring: the Italy cypher map with clustering enabled.
fn demo_site() -> SiteConfig {
    SiteConfig {
        container_id: "cypher-map".to_string(),
        is_local: true,
        data_file: "italy.geojson".to_string(),
        version_tag: "202006120".to_string(),
        extra_scripts: Vec::new(),
    }
}

fn demo_options() -> MapOptions {
    MapOptions {
        cluster_below_zoom: Some(9),
        show_locate_button: true,
        ..MapOptions::default()
    }
}

#[allow(non_snake_case)]
fn App() -> Element {
    let site = demo_site();
    rsx! {
        document::Stylesheet { href: CSS }
        CypherMap {
            options: demo_options(),
            data_url: site.data_url(),
            data_folder: site.data_folder(),
            on_data_ready: move |categories: Vec<String>| {
                tracing::info!(?categories, "cypher map ready");
            },
        }
    }
}

/// The widget cannot exist without its mount element.
fn mount_point(container_id: &str) -> Result<(), MapError> {
    let found = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.get_element_by_id(container_id))
        .is_some();
    if found {
        Ok(())
    } else {
        Err(MapError::ContainerNotFound(container_id.to_string()))
    }
}

/// Fire-and-forget load of the site's companion scripts.
fn load_extra_scripts(site: &SiteConfig) {
    for url in site.extra_scripts.clone() {
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(error) = loader::ensure_script(&url).await {
                tracing::warn!(%error, "companion script failed to load");
            }
        });
    }
}

fn main() {
    let site = demo_site();
    match mount_point(&site.container_id) {
        Ok(()) => {
            load_extra_scripts(&site);
            dioxus::LaunchBuilder::new()
                .with_cfg(dioxus::web::Config::new().rootname(site.container_id))
                .launch(App)
        }
        Err(error) => tracing::error!(%error, "cannot start the cypher map"),
    }
}
