use campsite_shared::config::BookingConfig;
use campsite_shared::selection::PitchMap;
use dioxus::prelude::*;

#[component]
pub fn LayerToggles(map: Signal<PitchMap>, opacity: Signal<f64>) -> Element {
    let config = use_context::<BookingConfig>();

    let layers: Vec<(String, String, bool)> = {
        let map = map.read();
        map.layers()
            .into_iter()
            .map(|name| {
                (
                    name.to_string(),
                    config.layer_label(name).to_string(),
                    map.is_layer_visible(name),
                )
            })
            .collect()
    };
    let names: Vec<String> = layers.iter().map(|(name, _, _)| name.clone()).collect();
    let all_names = names.clone();
    let current_opacity = *opacity.read();
    let opacity_pct = (current_opacity * 100.0).round();

    rsx! {
        div { class: "panel layers",
            h3 { "Layers" }
            for (name, label, visible) in layers {
                label { class: "layer-toggle",
                    input {
                        r#type: "checkbox",
                        checked: visible,
                        onchange: move |_| {
                            map.write().toggle_layer(&name);
                        },
                    }
                    " {label}"
                }
            }
            div { class: "layer-actions",
                button {
                    class: "secondary",
                    onclick: move |_| {
                        map.write().set_all_layers_visible(names.iter().map(String::as_str), true);
                    },
                    "Show all"
                }
                button {
                    class: "secondary",
                    onclick: move |_| {
                        map.write().set_all_layers_visible(all_names.iter().map(String::as_str), false);
                    },
                    "Hide all"
                }
            }
            div { class: "opacity-row",
                label { "Opacity:" }
                input {
                    r#type: "range",
                    min: "0.1",
                    max: "1",
                    step: "0.05",
                    value: "{current_opacity}",
                    oninput: move |evt: Event<FormData>| {
                        if let Ok(v) = evt.value().parse::<f64>() {
                            opacity.set(v.clamp(0.1, 1.0));
                        }
                    },
                }
                span { class: "value", "{opacity_pct}%" }
            }
        }
    }
}
