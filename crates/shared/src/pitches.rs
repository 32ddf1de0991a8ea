//! Raster site plans: a background image with pitch polygons from GeoJSON.
//!
//! Coordinates are image pixels with the y axis pointing up, so every point
//! is flipped against the image height when drawn in SVG.

use serde::Deserialize;
use serde_json::Value;

use crate::selection::PitchShape;
use crate::svg::{escape_attr, PreparedPlan, SitePlanError};

pub const FREE_COLOR: &str = "#22c55e";
pub const TAKEN_COLOR: &str = "#9ca3af";
const DEFAULT_LAYER: &str = "pitches";

#[derive(Debug, Clone, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub properties: PitchProperties,
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PitchProperties {
    #[serde(default)]
    pub id: Option<Value>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub capacity: Option<u32>,
    pub price: Option<f64>,
    #[serde(default)]
    pub is_free: bool,
    pub label: Option<String>,
    pub layer: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Polygon {
        coordinates: Vec<Vec<Vec<f64>>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Vec<f64>>>>,
    },
    #[serde(other)]
    Unsupported,
}

impl Geometry {
    fn rings(&self) -> Vec<&Vec<Vec<f64>>> {
        match self {
            Geometry::Polygon { coordinates } => coordinates.iter().collect(),
            Geometry::MultiPolygon { coordinates } => coordinates.iter().flatten().collect(),
            Geometry::Unsupported => Vec::new(),
        }
    }
}

/// A string id is used as is, a numeric one is printed.
fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl Feature {
    fn pitch_id(&self, index: usize) -> String {
        self.properties
            .id
            .as_ref()
            .or(self.id.as_ref())
            .and_then(id_text)
            .unwrap_or_else(|| format!("pitch-{}", index + 1))
    }

    fn layer(&self) -> &str {
        let p = &self.properties;
        non_empty(&p.layer)
            .or_else(|| non_empty(&p.kind))
            .unwrap_or(DEFAULT_LAYER)
    }

    fn display_name(&self, id: &str) -> String {
        let p = &self.properties;
        non_empty(&p.label)
            .or_else(|| non_empty(&p.name))
            .unwrap_or(id)
            .to_string()
    }
}

/// SVG path data for all rings, y flipped against `height`.
fn path_data(rings: &[&Vec<Vec<f64>>], height: f64) -> String {
    let mut d = String::new();
    for ring in rings {
        let points: Vec<String> = ring
            .iter()
            .filter_map(|pos| match pos.as_slice() {
                [x, y, ..] => Some(format!("{},{}", x, height - y)),
                _ => None,
            })
            .collect();
        if points.len() < 3 {
            continue;
        }
        if !d.is_empty() {
            d.push(' ');
        }
        d.push('M');
        d.push_str(&points.join(" L"));
        d.push_str(" Z");
    }
    d
}

pub fn parse_collection(json: &str) -> Result<FeatureCollection, SitePlanError> {
    serde_json::from_str(json).map_err(|e| SitePlanError::Dataset(e.to_string()))
}

/// Build the overlay for a raster plan.
pub fn prepare_raster(
    collection: &FeatureCollection,
    image_url: &str,
    width: f64,
    height: f64,
) -> PreparedPlan {
    let mut shapes = Vec::new();
    let mut body = String::new();

    for (index, feature) in collection.features.iter().enumerate() {
        let id = feature.pitch_id(index);
        let rings = feature
            .geometry
            .as_ref()
            .map(Geometry::rings)
            .unwrap_or_default();
        let d = path_data(&rings, height);
        if d.is_empty() {
            tracing::warn!(id = %id, "Skipping pitch without polygon geometry");
            continue;
        }

        let layer = feature.layer().to_string();
        let bookable = feature.properties.is_free;
        let color = if bookable { FREE_COLOR } else { TAKEN_COLOR };
        body.push_str(&format!(
            r#"<path data-shape="{}" data-layer="{}" d="{}" fill="{}" fill-opacity="0.35" stroke="{}" stroke-width="2" fill-rule="evenodd"/>"#,
            escape_attr(&id),
            escape_attr(&layer),
            d,
            color,
            color,
        ));

        shapes.push(PitchShape {
            display_name: feature.display_name(&id),
            id,
            layer,
            bookable,
            needs_hit_proxy: false,
        });
    }

    tracing::info!(pitches = shapes.len(), "Loaded raster site plan");

    let markup = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="{w}" height="{h}"><image href="{}" x="0" y="0" width="{w}" height="{h}"/><g class="pitches">{}</g></svg>"#,
        escape_attr(image_url),
        body,
        w = width,
        h = height,
    );

    PreparedPlan {
        markup,
        width,
        height,
        shapes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"id": "P1", "name": "Lakeside", "type": "pitches_60", "is_free": true, "capacity": 4},
                "geometry": {"type": "Polygon", "coordinates": [[[10,10],[50,10],[50,40],[10,40],[10,10]]]}
            },
            {
                "type": "Feature",
                "id": 7,
                "properties": {"label": "Pitch 7", "layer": "pitches_80", "is_free": false},
                "geometry": {"type": "Polygon", "coordinates": [[[100,100],[120,100],[120,120]]]}
            },
            {
                "type": "Feature",
                "properties": {"name": "Gate"},
                "geometry": {"type": "Point", "coordinates": [1, 2]}
            }
        ]
    }"#;

    fn plan() -> PreparedPlan {
        let collection = parse_collection(SAMPLE).unwrap();
        prepare_raster(&collection, "/masterplan.png", 1254.0, 843.0)
    }

    #[test]
    fn test_features_become_shapes() {
        let plan = plan();
        assert_eq!(plan.shapes.len(), 2);
        let first = &plan.shapes[0];
        assert_eq!(first.id, "P1");
        assert_eq!(first.display_name, "Lakeside");
        assert_eq!(first.layer, "pitches_60");
        assert!(first.bookable);
    }

    #[test]
    fn test_numeric_feature_id_and_layer_property() {
        let plan = plan();
        let second = &plan.shapes[1];
        assert_eq!(second.id, "7");
        assert_eq!(second.display_name, "Pitch 7");
        assert_eq!(second.layer, "pitches_80");
        assert!(!second.bookable);
    }

    #[test]
    fn test_missing_is_free_means_taken() {
        let json = r#"{"features":[{"properties":{},"geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1]]]}}]}"#;
        let plan = prepare_raster(&parse_collection(json).unwrap(), "/a.png", 10.0, 10.0);
        assert!(!plan.shapes[0].bookable);
        assert_eq!(plan.shapes[0].id, "pitch-1");
        assert_eq!(plan.shapes[0].layer, "pitches");
    }

    #[test]
    fn test_y_axis_is_flipped() {
        let markup = plan().markup;
        assert!(markup.contains("M10,833 L50,833 L50,803"));
    }

    #[test]
    fn test_markup_colors_by_availability() {
        let markup = plan().markup;
        assert!(markup.contains(r#"data-shape="P1" data-layer="pitches_60""#));
        assert!(markup.contains(FREE_COLOR));
        assert!(markup.contains(TAKEN_COLOR));
        assert!(markup.contains(r#"viewBox="0 0 1254 843""#));
    }

    #[test]
    fn test_multipolygon_rings() {
        let geometry = Geometry::MultiPolygon {
            coordinates: vec![
                vec![vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![1.0, 1.0]]],
                vec![vec![vec![5.0, 5.0], vec![6.0, 5.0], vec![6.0, 6.0]]],
            ],
        };
        let d = path_data(&geometry.rings(), 10.0);
        assert_eq!(d.matches('M').count(), 2);
    }

    #[test]
    fn test_bad_dataset_is_error() {
        assert!(matches!(
            parse_collection("[1,2"),
            Err(SitePlanError::Dataset(_))
        ));
    }
}
