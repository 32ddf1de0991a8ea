//! Stylesheet for the site plan: hidden layers, selection and hover.
//!
//! Highlights are CSS rules keyed on `data-shape`, so the plan markup itself
//! never changes after it is prepared.

use campsite_shared::selection::PitchMap;

pub const PLAN_ID: &str = "site-plan";
pub const SELECTED_COLOR: &str = "#ff9800";
pub const HOVER_COLOR: &str = "#ffb74d";

/// Quote a value for use in a CSS attribute selector.
fn css_string(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    out.push('"');
    for c in raw.chars() {
        match c {
            '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\a "),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

fn highlight_rule(id: &str, color: &str, width: u32) -> String {
    format!(
        "#{plan} [data-shape={id}] {{ stroke: {color} !important; stroke-width: {width}px !important; stroke-opacity: 1 !important; vector-effect: non-scaling-stroke; }}\n",
        plan = PLAN_ID,
        id = css_string(id),
        color = color,
        width = width,
    )
}

pub fn overlay_css(map: &PitchMap, hovered: Option<&str>) -> String {
    let mut css = String::new();
    for layer in map.hidden_layers() {
        css.push_str(&format!(
            "#{} [data-layer={}] {{ display: none; }}\n",
            PLAN_ID,
            css_string(layer)
        ));
    }
    if let Some(id) = map.selected_id() {
        css.push_str(&highlight_rule(id, SELECTED_COLOR, 4));
    }
    if let Some(id) = hovered.filter(|id| !map.is_selected(id) && map.is_shape_visible(id)) {
        css.push_str(&highlight_rule(id, HOVER_COLOR, 3));
    }
    css
}

#[cfg(test)]
mod tests {
    use campsite_shared::selection::PitchShape;

    use super::*;

    fn map() -> PitchMap {
        let shape = |id: &str, layer: &str| PitchShape {
            id: id.to_string(),
            display_name: id.to_string(),
            layer: layer.to_string(),
            bookable: true,
            needs_hit_proxy: false,
        };
        PitchMap::new(vec![shape("P1", "pitches_60"), shape("R1", "roads")])
    }

    #[test]
    fn test_nothing_to_style() {
        assert!(overlay_css(&map(), None).is_empty());
    }

    #[test]
    fn test_hidden_layer_rule() {
        let mut map = map();
        map.set_layer_visible("roads", false);
        let css = overlay_css(&map, None);
        assert!(css.contains(r#"#site-plan [data-layer="roads"] { display: none; }"#));
    }

    #[test]
    fn test_selected_shape_highlight() {
        let mut map = map();
        map.click("P1");
        let css = overlay_css(&map, None);
        assert!(css.contains(r#"[data-shape="P1"]"#));
        assert!(css.contains(SELECTED_COLOR));
    }

    #[test]
    fn test_hover_never_overrides_selection() {
        let mut map = map();
        map.click("P1");
        let css = overlay_css(&map, Some("P1"));
        assert!(!css.contains(HOVER_COLOR));
        let css = overlay_css(&map, Some("R1"));
        assert!(css.contains(HOVER_COLOR));
    }

    #[test]
    fn test_hover_on_hidden_layer_is_ignored() {
        let mut map = map();
        map.set_layer_visible("roads", false);
        assert!(!overlay_css(&map, Some("R1")).contains(HOVER_COLOR));
    }

    #[test]
    fn test_css_string_escapes_quotes() {
        assert_eq!(css_string(r#"a"b\c"#), r#""a\"b\\c""#);
    }
}
