use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::selection::PointerKind;

/// Where the site plan comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SitePlanSource {
    /// Layered SVG master plan; pitches are shapes inside labelled groups.
    Vector { svg_url: String },
    /// Raster image with a GeoJSON collection of pitch polygons on top.
    Raster {
        image_url: String,
        width: f64,
        height: f64,
        pitches_url: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    pub name: String,
    pub label: String,
    #[serde(default = "default_true")]
    pub visible: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingConfig {
    pub site_plan: SitePlanSource,
    pub layers: Vec<LayerConfig>,
    /// Hours a cached draft stays usable. `None` keeps it forever.
    pub cache_ttl_hours: Option<i64>,
    pub mouse_tap_tolerance_px: f64,
    pub touch_tap_tolerance_px: f64,
    pub close_after_submit: bool,
    pub form_path: String,
    pub map_path: String,
}

const DEFAULT_LAYERS: [(&str, &str); 8] = [
    ("pitches_60", "Pitches 60 m²"),
    ("pitches_80", "Pitches 80 m²"),
    ("pitches_100", "Pitches 100 m²"),
    ("sanitary", "Sanitary"),
    ("admin", "Reception"),
    ("playground", "Playground"),
    ("roads", "Roads"),
    ("border", "Border"),
];

impl Default for BookingConfig {
    fn default() -> Self {
        BookingConfig {
            site_plan: SitePlanSource::Vector {
                svg_url: "/masterplan.svg".to_string(),
            },
            layers: DEFAULT_LAYERS
                .iter()
                .map(|(name, label)| LayerConfig {
                    name: name.to_string(),
                    label: label.to_string(),
                    visible: true,
                })
                .collect(),
            cache_ttl_hours: Some(24),
            mouse_tap_tolerance_px: 3.0,
            touch_tap_tolerance_px: 8.0,
            close_after_submit: true,
            form_path: "/".to_string(),
            map_path: "/map".to_string(),
        }
    }
}

impl BookingConfig {
    pub fn from_json(json: &str) -> Result<Self, String> {
        let config: BookingConfig =
            serde_json::from_str(json).map_err(|e| format!("Failed to parse config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.mouse_tap_tolerance_px < 0.0 || self.touch_tap_tolerance_px < 0.0 {
            return Err("Tap tolerances must not be negative".to_string());
        }
        if let Some(hours) = self.cache_ttl_hours {
            if hours <= 0 {
                return Err(format!("cache_ttl_hours must be positive, got {}", hours));
            }
            if Duration::try_hours(hours).is_none() {
                return Err(format!("cache_ttl_hours is out of range, got {}", hours));
            }
        }
        if let Some(layer) = self.layers.iter().find(|l| l.name.trim().is_empty()) {
            return Err(format!("Layer '{}' has an empty name", layer.label));
        }
        if let SitePlanSource::Raster { width, height, .. } = &self.site_plan {
            if *width <= 0.0 || *height <= 0.0 {
                return Err(format!("Invalid raster size {}x{}", width, height));
            }
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl_hours.and_then(Duration::try_hours)
    }

    pub fn tap_tolerance(&self, kind: PointerKind) -> f64 {
        match kind {
            PointerKind::Mouse => self.mouse_tap_tolerance_px,
            PointerKind::Touch => self.touch_tap_tolerance_px,
        }
    }

    pub fn layer_names(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.name.as_str()).collect()
    }

    pub fn layer_label<'a>(&'a self, name: &'a str) -> &'a str {
        self.layers
            .iter()
            .find(|l| l.name == name)
            .map(|l| l.label.as_str())
            .unwrap_or(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layers() {
        let config = BookingConfig::default();
        assert_eq!(config.layers.len(), 8);
        assert_eq!(config.layer_names()[0], "pitches_60");
        assert_eq!(config.cache_ttl(), Some(Duration::hours(24)));
    }

    #[test]
    fn test_empty_json_gives_defaults() {
        let config = BookingConfig::from_json("{}").unwrap();
        assert_eq!(config, BookingConfig::default());
    }

    #[test]
    fn test_raster_plan_parses() {
        let json = r#"{
            "site_plan": {
                "kind": "raster",
                "image_url": "/masterplan.png",
                "width": 1254,
                "height": 843,
                "pitches_url": "/pitches.geo.json"
            },
            "cache_ttl_hours": null
        }"#;
        let config = BookingConfig::from_json(json).unwrap();
        assert!(matches!(config.site_plan, SitePlanSource::Raster { .. }));
        assert_eq!(config.cache_ttl(), None);
        assert_eq!(config.layers.len(), 8);
    }

    #[test]
    fn test_layer_visible_defaults_true() {
        let json = r#"{"layers":[{"name":"roads","label":"Roads"}]}"#;
        let config = BookingConfig::from_json(json).unwrap();
        assert!(config.layers[0].visible);
    }

    #[test]
    fn test_rejects_zero_ttl() {
        assert!(BookingConfig::from_json(r#"{"cache_ttl_hours":0}"#).is_err());
    }

    #[test]
    fn test_rejects_huge_ttl() {
        let err = BookingConfig::from_json(r#"{"cache_ttl_hours":9000000000000000}"#).unwrap_err();
        assert!(err.contains("out of range"));
    }

    #[test]
    fn test_rejects_negative_tolerance() {
        assert!(BookingConfig::from_json(r#"{"touch_tap_tolerance_px":-1}"#).is_err());
    }

    #[test]
    fn test_rejects_bad_raster_size() {
        let json = r#"{"site_plan":{"kind":"raster","image_url":"a","width":0,"height":10,"pitches_url":"b"}}"#;
        assert!(BookingConfig::from_json(json).is_err());
    }

    #[test]
    fn test_malformed_json_is_error() {
        let err = BookingConfig::from_json("{").unwrap_err();
        assert!(err.starts_with("Failed to parse config"));
    }

    #[test]
    fn test_tap_tolerance_by_pointer() {
        let config = BookingConfig::default();
        assert_eq!(config.tap_tolerance(PointerKind::Mouse), 3.0);
        assert_eq!(config.tap_tolerance(PointerKind::Touch), 8.0);
    }

    #[test]
    fn test_layer_label_falls_back_to_name() {
        let config = BookingConfig::default();
        assert_eq!(config.layer_label("roads"), "Roads");
        assert_eq!(config.layer_label("parking"), "parking");
    }
}
