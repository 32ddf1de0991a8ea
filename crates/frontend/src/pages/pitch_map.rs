use campsite_shared::codec::ParamSet;
use campsite_shared::config::BookingConfig;
use campsite_shared::handoff::{hand_back, HandoffRoute};
use campsite_shared::selection::{PitchMap, SelectionPhase};
use campsite_shared::summary::params_summary;
use campsite_shared::svg::PreparedPlan;
use dioxus::prelude::*;

use crate::components::confirm_panel::ConfirmPanel;
use crate::components::layer_toggles::LayerToggles;
use crate::components::map_view::MapView;
use crate::{location, site_plan, AppHost};

const DEFAULT_OPACITY: f64 = 0.9;

/// Selection state for a freshly loaded plan, with the configured layers
/// hidden.
fn initial_map(plan: &PreparedPlan, config: &BookingConfig) -> PitchMap {
    let mut map = PitchMap::new(plan.shapes.clone());
    for layer in config.layers.iter().filter(|l| !l.visible) {
        map.set_layer_visible(&layer.name, false);
    }
    map
}

#[component]
pub fn PitchMapPage() -> Element {
    let config = use_context::<BookingConfig>();
    let incoming = use_hook(location::current_params);
    let plan = use_resource(move || {
        let config = config.clone();
        async move { site_plan::load(&config).await }
    });

    let summary = params_summary(&incoming);

    rsx! {
        div { class: "app map-page",
            div { class: "header",
                h1 { "Choose your pitch" }
                p { class: "summary", "{summary}" }
            }
            match &*plan.read() {
                None => rsx! { div { class: "status", "Loading site plan…" } },
                Some(Err(e)) => rsx! {
                    div { class: "status error", "Could not load the site plan: {e}" }
                },
                Some(Ok(p)) => rsx! {
                    PitchPicker { plan: p.clone(), incoming: incoming.clone() }
                },
            }
        }
    }
}

#[component]
fn PitchPicker(plan: PreparedPlan, incoming: ParamSet) -> Element {
    let config = use_context::<BookingConfig>();
    let AppHost(host) = use_context::<AppHost>();

    let mut map = use_signal(|| initial_map(&plan, &config));
    let opacity = use_signal(|| DEFAULT_OPACITY);
    let mut message = use_signal(|| None::<String>);

    let on_confirm = move |_| {
        let confirmed = map.write().confirm();
        let selection = match confirmed {
            Ok(selection) => selection,
            Err(e) => {
                message.set(Some(e.to_string()));
                return;
            }
        };
        match hand_back(host.as_ref(), &incoming, &selection, &config.form_path) {
            Ok(HandoffRoute::Navigate(url)) => location::navigate(&url),
            Ok(HandoffRoute::Host) => {
                message.set(Some(format!("{} sent", selection.display_name)));
            }
            Err(e) => {
                tracing::warn!(error = %e, "Hand-off failed");
                map.write().reopen();
                message.set(Some(format!("Could not send the selection: {}", e)));
            }
        }
    };

    let status = message.read().clone().unwrap_or_else(|| {
        format!(
            "Site plan {}×{} · {} pitches",
            plan.width.round(),
            plan.height.round(),
            plan.shapes.len()
        )
    });

    let pending = {
        let map = map.read();
        match map.phase() {
            SelectionPhase::OneSelected(_) => map
                .selected()
                .map(|s| (s.display_name.clone(), s.bookable)),
            _ => None,
        }
    };

    rsx! {
        div { class: "map-layout",
            div { class: "sidebar",
                LayerToggles { map, opacity }
                div { class: "status", "{status}" }
            }
            MapView { plan: plan.clone(), map, opacity }
            if let Some((name, bookable)) = pending {
                ConfirmPanel {
                    name,
                    bookable,
                    on_cancel: move |_| {
                        map.write().cancel();
                        message.set(None);
                    },
                    on_confirm,
                }
            }
        }
    }
}
