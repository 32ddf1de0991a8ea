mod api;
mod components;
mod host;
mod location;
mod pages;
mod site_plan;
mod storage;

use std::rc::Rc;

use campsite_shared::config::BookingConfig;
use campsite_shared::host::HostBridge;
use dioxus::prelude::*;

#[derive(Routable, Clone, PartialEq)]
enum Route {
    #[route("/")]
    Booking {},
    #[route("/map")]
    SiteMap {},
}

#[component]
fn Booking() -> Element {
    rsx! {
        pages::booking_form::BookingPage {}
    }
}

#[component]
fn SiteMap() -> Element {
    rsx! {
        pages::pitch_map::PitchMapPage {}
    }
}

/// Host bridge chosen once at startup and shared through context.
#[derive(Clone)]
pub struct AppHost(pub Rc<dyn HostBridge>);

const CSS: Asset = asset!("/assets/main.css");
const FAVICON: Asset = asset!("/assets/favicon.svg");

#[component]
fn Shell(config: BookingConfig) -> Element {
    use_context_provider(|| config.clone());
    use_context_provider(|| {
        let bridge = host::detect();
        bridge.ready();
        bridge.expand();
        AppHost(bridge)
    });

    rsx! {
        Router::<Route> {}
    }
}

#[allow(non_snake_case)]
fn App() -> Element {
    let config = use_resource(api::load_config);

    rsx! {
        document::Link { rel: "icon", r#type: "image/svg+xml", href: FAVICON }
        document::Stylesheet { href: CSS }
        match &*config.read() {
            Some(config) => rsx! { Shell { config: config.clone() } },
            None => rsx! { div { class: "loading", "Loading…" } },
        }
    }
}

fn main() {
    dioxus::logger::init(tracing::Level::INFO).ok();
    launch(App);
}
