use dioxus::prelude::*;

use cypher_shared::map::ALL_CATEGORIES;
use cypher_shared::popup;

/// The category dropdown overlayed on the map: "all" plus every aggregated
/// category, labelled with the weekday display names.
#[component]
pub fn CategorySelector(
    categories: Vec<String>,
    active: String,
    on_select: EventHandler<String>,
) -> Element {
    let labelled: Vec<(String, String)> = categories
        .iter()
        .map(|category| (category.clone(), popup::weekday_name(category).to_string()))
        .collect();

    rsx! {
        div { class: "map-command",
            form {
                div { class: "select-wrapper fa fa-angle-down",
                    select {
                        name: "category",
                        "aria-label": "Filter by weekday",
                        value: "{active}",
                        onchange: move |evt: Event<FormData>| {
                            on_select.call(evt.value().to_string());
                        },
                        option {
                            value: ALL_CATEGORIES,
                            selected: active == ALL_CATEGORIES,
                            "tutti"
                        }
                        for (value, label) in labelled {
                            option {
                                value: "{value}",
                                selected: active == value,
                                "{label}"
                            }
                        }
                    }
                }
            }
        }
    }
}
