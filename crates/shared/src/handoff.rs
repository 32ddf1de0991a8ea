//! Returning a confirmed pitch from the map screen to the booking form.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::codec::{encode_pitch, with_query, ParamSet, KEY_BACK};
use crate::host::{to_json, HapticStyle, HostBridge, HostError};
use crate::models::PitchSelection;
use crate::svg::trailing_number;

pub const HANDOFF_TYPE: &str = "pitch_selection";

/// Message sent to the host when the map screen runs on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapHandoff {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub id: String,
    pub name: String,
    pub layer: String,
    pub number: Option<String>,
    pub params: BTreeMap<String, String>,
}

impl MapHandoff {
    pub fn new(selection: &PitchSelection, incoming: &ParamSet) -> Self {
        MapHandoff {
            kind: HANDOFF_TYPE,
            id: selection.id.clone(),
            name: selection.display_name.clone(),
            layer: selection.layer_name.clone(),
            number: trailing_number(&selection.id).map(str::to_string),
            params: incoming.without(&[KEY_BACK]).to_btree(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandoffRoute {
    /// The host received the selection and was asked to close.
    Host,
    /// Open this URL to get back to the form.
    Navigate(String),
}

/// Parameters the form receives: everything the map was opened with, minus
/// the return address, plus the pitch keys.
pub fn return_params(incoming: &ParamSet, selection: &PitchSelection) -> ParamSet {
    let mut params = incoming.without(&[KEY_BACK]);
    params.extend_from(&encode_pitch(selection));
    params
}

pub fn return_url(incoming: &ParamSet, selection: &PitchSelection, default_back: &str) -> String {
    let back = incoming
        .get(KEY_BACK)
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .unwrap_or(default_back);
    with_query(back, &return_params(incoming, selection))
}

pub fn hand_back(
    host: &dyn HostBridge,
    incoming: &ParamSet,
    selection: &PitchSelection,
    default_back: &str,
) -> Result<HandoffRoute, HostError> {
    if !host.is_present() {
        let url = return_url(incoming, selection, default_back);
        tracing::info!(id = %selection.id, url = %url, "Returning pitch to the form");
        return Ok(HandoffRoute::Navigate(url));
    }

    let json = to_json(&MapHandoff::new(selection, incoming))?;
    host.haptic_impact(HapticStyle::Light);
    host.send_data(&json)?;
    tracing::info!(id = %selection.id, "Pitch sent to host");
    host.close();
    Ok(HandoffRoute::Host)
}
