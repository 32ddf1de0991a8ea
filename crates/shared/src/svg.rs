//! Helpers for reading a layered SVG master plan.
//!
//! The DOM walk itself happens in the browser; these functions decide which
//! groups are layers, which shapes need a hit-proxy and how shapes are named.

use std::collections::BTreeMap;

use crate::selection::PitchShape;

/// Elements inside a layer group that become clickable.
pub const SHAPE_SELECTOR: &str = "path,rect,polygon,polyline,circle,ellipse,use";

/// Attributes that may carry a group's layer name, in lookup order.
pub const LABEL_ATTRIBUTES: [&str; 3] = ["inkscape:label", "sodipodi:label", "id"];

/// Stroke width below which a stroke is treated as invisible.
const MIN_VISIBLE_STROKE: f64 = 0.01;

/// Attributes applied to a hit-proxy clone.
pub const HIT_PROXY_ATTRIBUTES: [(&str, &str); 6] = [
    ("fill", "none"),
    ("stroke", "#000"),
    ("stroke-opacity", "0.001"),
    ("stroke-width", "12"),
    ("vector-effect", "non-scaling-stroke"),
    ("pointer-events", "all"),
];

/// A site plan ready to be placed in the page: SVG markup whose pitch shapes
/// carry `data-shape`/`data-layer` attributes, plus the shapes themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedPlan {
    pub markup: String,
    pub width: f64,
    pub height: f64,
    pub shapes: Vec<PitchShape>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SitePlanError {
    #[error("site plan could not be parsed")]
    Malformed,
    #[error("site plan has no viewBox")]
    MissingViewBox,
    #[error("invalid viewBox '{0}'")]
    BadViewBox(String),
    #[error("pitch dataset could not be read: {0}")]
    Dataset(String),
}

/// Does a group label name one of the wanted layers? Matches exactly or as a
/// prefix followed by a space, `_` or `-`, ignoring case.
pub fn matching_layer<'a>(label: &str, wanted: &[&'a str]) -> Option<&'a str> {
    let label = label.trim().to_lowercase();
    wanted.iter().copied().find(|layer| {
        let layer = layer.to_lowercase();
        match label.strip_prefix(&layer) {
            Some("") => true,
            Some(rest) => rest.starts_with([' ', '_', '-']),
            None => false,
        }
    })
}

/// Split an inline `style` attribute into property/value pairs.
pub fn parse_style(style: &str) -> BTreeMap<String, String> {
    style
        .split(';')
        .filter_map(|decl| {
            let (k, v) = decl.split_once(':')?;
            let k = k.trim();
            if k.is_empty() {
                None
            } else {
                Some((k.to_string(), v.trim().to_string()))
            }
        })
        .collect()
}

/// Paint of a shape, attributes first and inline style as fallback.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paint {
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: Option<String>,
}

impl Paint {
    pub fn resolve(
        fill: Option<String>,
        stroke: Option<String>,
        stroke_width: Option<String>,
        style: Option<&str>,
    ) -> Self {
        let style = style.map(parse_style).unwrap_or_default();
        Paint {
            fill: fill.or_else(|| style.get("fill").cloned()),
            stroke: stroke.or_else(|| style.get("stroke").cloned()),
            stroke_width: stroke_width.or_else(|| style.get("stroke-width").cloned()),
        }
    }

    fn has_fill(&self) -> bool {
        self.fill
            .as_deref()
            .is_some_and(|f| !f.is_empty() && f != "none")
    }

    fn has_stroke(&self) -> bool {
        let Some(stroke) = self.stroke.as_deref() else {
            return false;
        };
        if stroke.is_empty() || stroke == "none" {
            return false;
        }
        self.stroke_width
            .as_deref()
            .map(leading_number)
            .unwrap_or(Some(0.0))
            .is_some_and(|w| w > MIN_VISIBLE_STROKE)
    }

    /// Neither fill nor a visible stroke: only a proxy makes it clickable.
    pub fn needs_hit_proxy(&self) -> bool {
        !self.has_fill() && !self.has_stroke()
    }
}

/// Numeric prefix of a CSS length such as `0.5px`.
fn leading_number(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let end = raw
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_digit() || *c == '.' || *c == '-'))
        .map(|(i, _)| i)
        .unwrap_or(raw.len());
    raw[..end].parse().ok()
}

/// Last run of digits in an id, e.g. `"pitch-60-12"` -> `"12"`.
pub fn trailing_number(id: &str) -> Option<&str> {
    id.trim_end_matches(|c: char| !c.is_ascii_digit())
        .rsplit(|c: char| !c.is_ascii_digit())
        .next()
        .filter(|digits| !digits.is_empty())
}

/// Human name of a shape: `data-name`, then id, then the parent layer label.
pub fn display_name(id: &str, data_name: Option<&str>, parent_label: Option<&str>) -> String {
    let base = [data_name, Some(id), parent_label]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or("Pitch");
    match trailing_number(id) {
        Some(num) if base != id => format!("{} #{}", base, num),
        _ => base.to_string(),
    }
}

/// Escape text for use inside a double-quoted XML attribute.
pub fn escape_attr(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Width and height from a `viewBox` attribute.
pub fn parse_view_box(view_box: Option<&str>) -> Result<(f64, f64), SitePlanError> {
    let raw = view_box.ok_or(SitePlanError::MissingViewBox)?;
    let parts: Vec<f64> = raw
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|p| !p.is_empty())
        .map(|p| p.parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|_| SitePlanError::BadViewBox(raw.to_string()))?;
    match parts.as_slice() {
        [_, _, w, h] if *w > 0.0 && *h > 0.0 => Ok((*w, *h)),
        _ => Err(SitePlanError::BadViewBox(raw.to_string())),
    }
}
