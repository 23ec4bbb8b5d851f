//! External resource loading.
//!
//! The widget's only asynchronous dependencies: a text fetch for the
//! GeoJSON payload, and idempotent script/stylesheet injection into the
//! document head. Loads run at most once; there is no retry and no timeout.

use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::Document;

use cypher_shared::error::MapError;

/// Fetch a text resource. Non-success HTTP statuses are failures.
pub async fn fetch_text(url: &str) -> Result<String, MapError> {
    let response = reqwest::get(url).await.map_err(|e| MapError::Network {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    if !response.status().is_success() {
        return Err(MapError::Network {
            url: url.to_string(),
            reason: format!("unexpected HTTP status {}", response.status()),
        });
    }
    response.text().await.map_err(|e| MapError::Network {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

/// Inject a stylesheet link, once per URL. Fire-and-forget: stylesheets
/// degrade gracefully, so nothing awaits them.
pub fn ensure_stylesheet(url: &str) {
    let Some(document) = document() else { return };
    if resource_present(&document, &format!("link[href=\"{url}\"]")) {
        return;
    }
    let Ok(link) = document.create_element("link") else {
        return;
    };
    let _ = link.set_attribute("rel", "stylesheet");
    let _ = link.set_attribute("href", url);
    append_to_head(&document, &link);
}

/// Inject a script element, once per URL, and await its completion signal.
/// A script already present in the document resolves immediately.
pub async fn ensure_script(url: &str) -> Result<(), MapError> {
    let document = document().ok_or_else(|| load_error(url))?;
    if resource_present(&document, &format!("script[src=\"{url}\"]")) {
        return Ok(());
    }

    let element = document
        .create_element("script")
        .map_err(|_| load_error(url))?;
    element
        .set_attribute("src", url)
        .map_err(|_| load_error(url))?;
    let script: web_sys::HtmlElement = element.dyn_into().map_err(|_| load_error(url))?;

    let completion = js_sys::Promise::new(&mut |resolve, reject| {
        script.set_onload(Some(&resolve));
        script.set_onerror(Some(&reject));
    });
    append_to_head(&document, &script);

    JsFuture::from(completion)
        .await
        .map_err(|_| load_error(url))?;
    Ok(())
}

fn document() -> Option<Document> {
    web_sys::window()?.document()
}

fn resource_present(document: &Document, selector: &str) -> bool {
    matches!(document.query_selector(selector), Ok(Some(_)))
}

fn append_to_head(document: &Document, node: &web_sys::Element) {
    if let Some(head) = document.head() {
        let _ = head.append_child(node);
    }
}

fn load_error(url: &str) -> MapError {
    MapError::Load {
        url: url.to_string(),
    }
}
