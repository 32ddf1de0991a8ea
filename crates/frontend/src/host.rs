//! Telegram WebApp bridge, plus the plain-browser fallback.

use std::rc::Rc;

use campsite_shared::host::{HapticStyle, HostBridge, HostError, HostIdentity};
use js_sys::{Array, Function, Reflect};
use wasm_bindgen::{JsCast, JsValue};

fn js_error(e: JsValue) -> HostError {
    HostError::Rejected(e.as_string().unwrap_or_else(|| format!("{:?}", e)))
}

fn get(target: &JsValue, key: &str) -> Option<JsValue> {
    Reflect::get(target, &JsValue::from_str(key))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
}

fn call(target: &JsValue, method: &str, args: &[JsValue]) -> Result<JsValue, HostError> {
    let func: Function = get(target, method)
        .ok_or(HostError::Unavailable)?
        .dyn_into()
        .map_err(|_| HostError::Rejected(format!("{} is not a function", method)))?;
    let args: Array = args.iter().collect();
    func.apply(target, &args).map_err(js_error)
}

pub struct TelegramHost {
    webapp: JsValue,
}

impl TelegramHost {
    /// `window.Telegram.WebApp`, but only when it carries launch data. The
    /// SDK script defines the object in any browser.
    pub fn connect() -> Option<Self> {
        let window: JsValue = web_sys::window()?.into();
        let webapp = get(&get(&window, "Telegram")?, "WebApp")?;
        let init_data = get(&webapp, "initData")?.as_string()?;
        if init_data.is_empty() {
            return None;
        }
        Some(TelegramHost { webapp })
    }

    fn call_quietly(&self, method: &str, args: &[JsValue]) {
        if let Err(e) = call(&self.webapp, method, args) {
            tracing::warn!(method, error = %e, "Host call failed");
        }
    }
}

impl HostBridge for TelegramHost {
    fn is_present(&self) -> bool {
        true
    }

    fn ready(&self) {
        self.call_quietly("ready", &[]);
    }

    fn expand(&self) {
        self.call_quietly("expand", &[]);
    }

    fn send_data(&self, data: &str) -> Result<(), HostError> {
        call(&self.webapp, "sendData", &[JsValue::from_str(data)]).map(|_| ())
    }

    fn close(&self) {
        self.call_quietly("close", &[]);
    }

    fn show_alert(&self, message: &str) {
        self.call_quietly("showAlert", &[JsValue::from_str(message)]);
    }

    fn haptic_impact(&self, style: HapticStyle) {
        let Some(haptics) = get(&self.webapp, "HapticFeedback") else {
            return;
        };
        if let Err(e) = call(&haptics, "impactOccurred", &[JsValue::from_str(style.as_str())]) {
            tracing::debug!(error = %e, "Haptic feedback unavailable");
        }
    }

    fn identity(&self) -> Option<HostIdentity> {
        let user_id = get(&self.webapp, "initDataUnsafe")
            .and_then(|unsafe_data| get(&unsafe_data, "user"))
            .and_then(|user| get(&user, "id"))
            .and_then(|id| {
                id.as_f64()
                    .map(|n| format!("{}", n as i64))
                    .or_else(|| id.as_string())
            });
        let platform = get(&self.webapp, "platform").and_then(|p| p.as_string());
        Some(HostIdentity { user_id, platform })
    }
}

/// Running in an ordinary browser tab.
pub struct BrowserHost;

impl HostBridge for BrowserHost {
    fn is_present(&self) -> bool {
        false
    }

    fn ready(&self) {}

    fn expand(&self) {}

    fn send_data(&self, _data: &str) -> Result<(), HostError> {
        Err(HostError::Unavailable)
    }

    fn close(&self) {}

    fn show_alert(&self, message: &str) {
        if let Some(window) = web_sys::window() {
            window.alert_with_message(message).ok();
        }
    }

    fn haptic_impact(&self, _style: HapticStyle) {}

    fn identity(&self) -> Option<HostIdentity> {
        None
    }
}

pub fn detect() -> Rc<dyn HostBridge> {
    match TelegramHost::connect() {
        Some(host) => {
            let platform = host.identity().and_then(|i| i.platform);
            tracing::info!(platform = ?platform, "Running inside Telegram");
            Rc::new(host)
        }
        None => {
            tracing::info!("No host SDK, running standalone");
            Rc::new(BrowserHost)
        }
    }
}
