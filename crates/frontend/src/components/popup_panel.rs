use dioxus::prelude::*;

use cypher_shared::popup::{LinkLine, PopupContent};

/// Marker popup, anchored above the marker icon. Renders the structured
/// popup content in its fixed order: title, weekdays, address, link.
#[component]
pub fn PopupPanel(content: PopupContent, x: f64, y: f64, on_close: EventHandler<()>) -> Element {
    let link = match &content.link {
        LinkLine::Social {
            service,
            account,
            href,
        } => rsx! {
            "{service}: "
            a { href: "{href}", target: "_blank", "@{account}" }
        },
        LinkLine::Plain { href, label } => rsx! {
            a { href: "{href}", target: "_blank", "{label}" }
        },
    };

    rsx! {
        div {
            class: "popup",
            style: "left: {x}px; top: {y}px;",
            onclick: move |evt: Event<MouseData>| evt.stop_propagation(),

            button {
                class: "popup-close",
                "aria-label": "Close popup",
                onclick: move |_| on_close.call(()),
                "×"
            }

            h3 { "{content.title}" }

            if let Some(weekdays) = &content.weekday_line {
                p { class: "weekdays", "{weekdays}" }
            }

            p { class: "address",
                for (i, line) in content.address_lines.iter().enumerate() {
                    if i > 0 {
                        br {}
                    }
                    "{line}"
                }
            }

            p { class: "link", {link} }
        }
    }
}
