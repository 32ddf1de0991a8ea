//! Pitch selection on the site plan.
//!
//! [`PitchMap`] owns every clickable shape, the per-layer visibility flags and
//! the single current selection. The view turns clicks into [`PitchMap::click`]
//! calls and renders highlights from [`PitchMap::selected`].

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::models::PitchSelection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Touch,
}

/// A press/release pair counts as a tap when the pointer moved no further
/// than `tolerance` pixels. Anything longer is a pan.
pub fn point_distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    (dx * dx + dy * dy).sqrt()
}

pub fn is_tap(press: (f64, f64), release: (f64, f64), tolerance: f64) -> bool {
    point_distance(press, release) <= tolerance
}

/// One selectable shape on the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchShape {
    pub id: String,
    pub display_name: String,
    pub layer: String,
    /// False for pitches that are already taken.
    pub bookable: bool,
    /// Set for shapes with neither fill nor stroke; they get a hit-proxy.
    pub needs_hit_proxy: bool,
}

/// Invisible wide-stroke copy of a shape, used only to enlarge its click
/// target. It has no identity of its own: clicks resolve to `source`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitProxy {
    pub source: String,
    pub layer: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionPhase {
    NoneSelected,
    OneSelected(String),
    HandedOff(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickResult {
    Selected {
        id: String,
        replaced: Option<String>,
    },
    Deselected(String),
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("no pitch is selected")]
    NothingSelected,
    #[error("{0} is not available for booking")]
    Unavailable(String),
    #[error("the selection was already confirmed")]
    AlreadyHandedOff,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PitchMap {
    shapes: Vec<PitchShape>,
    index: HashMap<String, usize>,
    proxies: Vec<HitProxy>,
    hidden_layers: BTreeSet<String>,
    phase: SelectionPhase,
}

impl PitchMap {
    pub fn new(shapes: Vec<PitchShape>) -> Self {
        let mut map = PitchMap {
            shapes: Vec::with_capacity(shapes.len()),
            index: HashMap::new(),
            proxies: Vec::new(),
            hidden_layers: BTreeSet::new(),
            phase: SelectionPhase::NoneSelected,
        };
        for shape in shapes {
            if map.index.contains_key(&shape.id) {
                tracing::warn!(id = %shape.id, "Duplicate shape id, keeping the first");
                continue;
            }
            if shape.needs_hit_proxy {
                map.proxies.push(HitProxy {
                    source: shape.id.clone(),
                    layer: shape.layer.clone(),
                });
            }
            map.index.insert(shape.id.clone(), map.shapes.len());
            map.shapes.push(shape);
        }
        tracing::debug!(
            shapes = map.shapes.len(),
            proxies = map.proxies.len(),
            "Pitch map ready"
        );
        map
    }

    pub fn shapes(&self) -> &[PitchShape] {
        &self.shapes
    }

    pub fn shape(&self, id: &str) -> Option<&PitchShape> {
        self.index.get(id).map(|&i| &self.shapes[i])
    }

    pub fn proxies(&self) -> &[HitProxy] {
        &self.proxies
    }

    pub fn proxy_for(&self, id: &str) -> Option<&HitProxy> {
        self.proxies.iter().find(|p| p.source == id)
    }

    /// Distinct layer names in order of first appearance.
    pub fn layers(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.shapes
            .iter()
            .map(|s| s.layer.as_str())
            .filter(|l| seen.insert(*l))
            .collect()
    }

    pub fn phase(&self) -> &SelectionPhase {
        &self.phase
    }

    pub fn selected_id(&self) -> Option<&str> {
        match &self.phase {
            SelectionPhase::OneSelected(id) | SelectionPhase::HandedOff(id) => Some(id),
            SelectionPhase::NoneSelected => None,
        }
    }

    pub fn selected(&self) -> Option<&PitchShape> {
        self.selected_id().and_then(|id| self.shape(id))
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected_id() == Some(id)
    }

    pub fn is_layer_visible(&self, layer: &str) -> bool {
        !self.hidden_layers.contains(layer)
    }

    pub fn hidden_layers(&self) -> impl Iterator<Item = &str> {
        self.hidden_layers.iter().map(String::as_str)
    }

    pub fn set_layer_visible(&mut self, layer: &str, visible: bool) {
        if visible {
            self.hidden_layers.remove(layer);
        } else {
            self.hidden_layers.insert(layer.to_string());
        }
    }

    pub fn toggle_layer(&mut self, layer: &str) -> bool {
        let visible = !self.is_layer_visible(layer);
        self.set_layer_visible(layer, visible);
        visible
    }

    pub fn set_all_layers_visible<'a>(
        &mut self,
        layers: impl IntoIterator<Item = &'a str>,
        visible: bool,
    ) {
        for layer in layers {
            self.set_layer_visible(layer, visible);
        }
    }

    pub fn is_shape_visible(&self, id: &str) -> bool {
        self.shape(id)
            .is_some_and(|s| self.is_layer_visible(&s.layer))
    }

    /// Hit-proxies that may currently receive clicks.
    pub fn visible_proxies(&self) -> impl Iterator<Item = &HitProxy> {
        self.proxies
            .iter()
            .filter(|p| self.is_layer_visible(&p.layer))
    }

    /// A tap landed on `id` (a shape id, or the source id of a hit-proxy).
    pub fn click(&mut self, id: &str) -> ClickResult {
        if matches!(self.phase, SelectionPhase::HandedOff(_)) {
            return ClickResult::Ignored;
        }
        let Some(shape) = self.shape(id) else {
            return ClickResult::Ignored;
        };
        if !self.is_layer_visible(&shape.layer) {
            return ClickResult::Ignored;
        }

        if self.is_selected(id) {
            self.phase = SelectionPhase::NoneSelected;
            tracing::debug!(id, "Pitch deselected");
            return ClickResult::Deselected(id.to_string());
        }

        let replaced = self.selected_id().map(str::to_string);
        self.phase = SelectionPhase::OneSelected(id.to_string());
        tracing::debug!(id, replaced = ?replaced, "Pitch selected");
        ClickResult::Selected {
            id: id.to_string(),
            replaced,
        }
    }

    /// Drop the current selection, returning what was selected.
    pub fn cancel(&mut self) -> Option<String> {
        match std::mem::replace(&mut self.phase, SelectionPhase::NoneSelected) {
            SelectionPhase::OneSelected(id) => Some(id),
            other => {
                self.phase = other;
                None
            }
        }
    }

    pub fn can_confirm(&self) -> bool {
        match &self.phase {
            SelectionPhase::OneSelected(id) => self.shape(id).is_some_and(|s| s.bookable),
            _ => false,
        }
    }

    /// Lock in the current selection for hand-off back to the form.
    pub fn confirm(&mut self) -> Result<PitchSelection, SelectionError> {
        let id = match &self.phase {
            SelectionPhase::NoneSelected => return Err(SelectionError::NothingSelected),
            SelectionPhase::HandedOff(_) => return Err(SelectionError::AlreadyHandedOff),
            SelectionPhase::OneSelected(id) => id.clone(),
        };
        let shape = self
            .shape(&id)
            .ok_or(SelectionError::NothingSelected)?;
        if !shape.bookable {
            return Err(SelectionError::Unavailable(shape.display_name.clone()));
        }
        let selection = PitchSelection {
            id: shape.id.clone(),
            display_name: shape.display_name.clone(),
            layer_name: shape.layer.clone(),
        };
        self.phase = SelectionPhase::HandedOff(id);
        Ok(selection)
    }

    /// Return to browsing after a hand-off that could not be delivered.
    pub fn reopen(&mut self) {
        if let SelectionPhase::HandedOff(id) = &self.phase {
            self.phase = SelectionPhase::OneSelected(id.clone());
        }
    }
}
