//! Reading and changing the page URL.

use campsite_shared::codec::ParamSet;
use wasm_bindgen::JsValue;

/// Query parameters of the current page.
pub fn current_params() -> ParamSet {
    web_sys::window()
        .and_then(|w| w.location().search().ok())
        .map(|search| ParamSet::from_query(&search))
        .unwrap_or_default()
}

/// Drop the query string without reloading, so a refresh does not apply the
/// same parameters twice.
pub fn clear_params() {
    let Some(window) = web_sys::window() else {
        return;
    };
    let Ok(path) = window.location().pathname() else {
        return;
    };
    if let Ok(history) = window.history() {
        if let Err(e) = history.replace_state_with_url(&JsValue::NULL, "", Some(&path)) {
            tracing::warn!(error = ?e, "Could not clear query parameters");
        }
    }
}

/// Full page navigation.
pub fn navigate(url: &str) {
    let Some(window) = web_sys::window() else {
        return;
    };
    tracing::debug!(url, "Navigating");
    if let Err(e) = window.location().set_href(url) {
        tracing::warn!(error = ?e, url, "Navigation failed");
    }
}

pub fn origin() -> Option<String> {
    web_sys::window()?.location().origin().ok()
}
