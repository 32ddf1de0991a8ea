//! Capability interface over the chat platform's WebView SDK.
//!
//! The app picks one implementation at startup. Running outside the host is
//! a normal mode: [`NullHost`] (or a browser fallback in the frontend) takes
//! over and nothing branches on host presence at call sites.

use serde::Serialize;

use crate::models::SubmissionPayload;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticStyle {
    Light,
    Medium,
    Heavy,
}

impl HapticStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            HapticStyle::Light => "light",
            HapticStyle::Medium => "medium",
            HapticStyle::Heavy => "heavy",
        }
    }
}

/// Who the host says is using the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostIdentity {
    pub user_id: Option<String>,
    pub platform: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("host bridge is not available")]
    Unavailable,
    #[error("host rejected the call: {0}")]
    Rejected(String),
    #[error("could not serialize payload: {0}")]
    Payload(String),
}

pub trait HostBridge {
    /// True when running inside the chat platform.
    fn is_present(&self) -> bool;
    fn ready(&self);
    fn expand(&self);
    fn send_data(&self, data: &str) -> Result<(), HostError>;
    fn close(&self);
    fn show_alert(&self, message: &str);
    fn haptic_impact(&self, style: HapticStyle);
    fn identity(&self) -> Option<HostIdentity>;
}

/// Stand-in used when no host SDK is loaded. Every call is a no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHost;

impl HostBridge for NullHost {
    fn is_present(&self) -> bool {
        false
    }

    fn ready(&self) {}

    fn expand(&self) {}

    fn send_data(&self, _data: &str) -> Result<(), HostError> {
        Err(HostError::Unavailable)
    }

    fn close(&self) {}

    fn show_alert(&self, _message: &str) {}

    fn haptic_impact(&self, _style: HapticStyle) {}

    fn identity(&self) -> Option<HostIdentity> {
        None
    }
}

/// How a submission left the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The host accepted the payload.
    Delivered,
    /// No host: the payload was shown to the user instead.
    ShownLocally,
    Failed(String),
}

pub fn to_json<T: Serialize>(value: &T) -> Result<String, HostError> {
    serde_json::to_string(value).map_err(|e| HostError::Payload(e.to_string()))
}

/// Hand a confirmed booking to the host, or show it when there is none.
pub fn deliver(
    host: &dyn HostBridge,
    payload: &SubmissionPayload,
    close_after: bool,
) -> SubmitOutcome {
    let json = match to_json(payload) {
        Ok(json) => json,
        Err(e) => return SubmitOutcome::Failed(e.to_string()),
    };

    if !host.is_present() {
        tracing::info!("No host bridge, showing booking locally");
        let pretty = serde_json::to_string_pretty(payload).unwrap_or(json);
        host.show_alert(&format!("Booking details:\n{}", pretty));
        return SubmitOutcome::ShownLocally;
    }

    match host.send_data(&json) {
        Ok(()) => {
            host.haptic_impact(HapticStyle::Light);
            if close_after {
                host.close();
            }
            SubmitOutcome::Delivered
        }
        Err(e) => {
            tracing::warn!(error = %e, "Host refused booking payload");
            SubmitOutcome::Failed(e.to_string())
        }
    }
}
