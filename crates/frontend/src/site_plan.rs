//! Turning the configured site plan into markup the map view can render.
//!
//! Vector plans are parsed with the browser's `DOMParser`: layer groups are
//! tagged, each shape gets `data-shape`/`data-layer`, and unpainted shapes get
//! an invisible wide-stroke copy in a `__hit__` group.

use campsite_shared::config::{BookingConfig, SitePlanSource};
use campsite_shared::pitches;
use campsite_shared::selection::PitchShape;
use campsite_shared::svg::{
    display_name, matching_layer, parse_view_box, Paint, PreparedPlan, SitePlanError,
    HIT_PROXY_ATTRIBUTES, LABEL_ATTRIBUTES, SHAPE_SELECTOR,
};
use wasm_bindgen::JsCast;
use web_sys::{DomParser, Element, SupportedType};

use crate::api;

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const HIT_GROUP_ID: &str = "__hit__";

pub async fn load(config: &BookingConfig) -> Result<PreparedPlan, String> {
    match &config.site_plan {
        SitePlanSource::Vector { svg_url } => {
            let text = api::fetch_text(svg_url).await?;
            prepare_vector(&text, &config.layer_names()).map_err(|e| e.to_string())
        }
        SitePlanSource::Raster {
            image_url,
            width,
            height,
            pitches_url,
        } => {
            let collection = api::fetch_pitches(pitches_url).await?;
            Ok(pitches::prepare_raster(&collection, image_url, *width, *height))
        }
    }
}

fn elements(root: &Element, selector: &str) -> Result<Vec<Element>, SitePlanError> {
    let list = root
        .query_selector_all(selector)
        .map_err(|_| SitePlanError::Malformed)?;
    Ok((0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect())
}

fn group_label(group: &Element) -> Option<String> {
    LABEL_ATTRIBUTES
        .iter()
        .filter_map(|attr| group.get_attribute(attr))
        .find(|label| !label.trim().is_empty())
}

fn make_hit_proxy(shape: &Element, id: &str, layer: &str) -> Result<Element, SitePlanError> {
    let proxy: Element = shape
        .clone_node()
        .map_err(|_| SitePlanError::Malformed)?
        .dyn_into()
        .map_err(|_| SitePlanError::Malformed)?;
    let set = |name: &str, value: &str| {
        proxy
            .set_attribute(name, value)
            .map_err(|_| SitePlanError::Malformed)
    };
    proxy.remove_attribute("id").ok();
    proxy.remove_attribute("style").ok();
    proxy.remove_attribute("data-shape").ok();
    for (name, value) in HIT_PROXY_ATTRIBUTES {
        set(name, value)?;
    }
    set("data-hit-for", id)?;
    set("data-layer", layer)?;
    Ok(proxy)
}

pub fn prepare_vector(text: &str, wanted: &[&str]) -> Result<PreparedPlan, SitePlanError> {
    let parser = DomParser::new().map_err(|_| SitePlanError::Malformed)?;
    let doc = parser
        .parse_from_string(text, SupportedType::ImageSvgXml)
        .map_err(|_| SitePlanError::Malformed)?;
    if doc.query_selector("parsererror").ok().flatten().is_some() {
        return Err(SitePlanError::Malformed);
    }
    let root = doc.document_element().ok_or(SitePlanError::Malformed)?;
    let (width, height) = parse_view_box(root.get_attribute("viewBox").as_deref())?;

    let hit_group = doc
        .create_element_ns(Some(SVG_NS), "g")
        .map_err(|_| SitePlanError::Malformed)?;
    hit_group
        .set_attribute("id", HIT_GROUP_ID)
        .map_err(|_| SitePlanError::Malformed)?;

    let mut shapes: Vec<PitchShape> = Vec::new();
    for group in elements(&root, "g")? {
        let Some(label) = group_label(&group) else {
            continue;
        };
        let Some(layer) = matching_layer(&label, wanted) else {
            continue;
        };
        group
            .set_attribute("data-layer", layer)
            .map_err(|_| SitePlanError::Malformed)?;

        for (n, shape) in elements(&group, SHAPE_SELECTOR)?.into_iter().enumerate() {
            if shape.has_attribute("data-shape") {
                continue;
            }
            let id = shape
                .get_attribute("id")
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| format!("{}-{}", layer, n + 1));
            shape
                .set_attribute("data-shape", &id)
                .and_then(|_| shape.set_attribute("data-layer", layer))
                .map_err(|_| SitePlanError::Malformed)?;

            let paint = Paint::resolve(
                shape.get_attribute("fill"),
                shape.get_attribute("stroke"),
                shape.get_attribute("stroke-width"),
                shape.get_attribute("style").as_deref(),
            );
            let needs_hit_proxy = paint.needs_hit_proxy();
            if needs_hit_proxy {
                let proxy = make_hit_proxy(&shape, &id, layer)?;
                hit_group
                    .append_child(&proxy)
                    .map_err(|_| SitePlanError::Malformed)?;
            }

            shapes.push(PitchShape {
                display_name: display_name(
                    &id,
                    shape.get_attribute("data-name").as_deref(),
                    Some(&label),
                ),
                id,
                layer: layer.to_string(),
                bookable: true,
                needs_hit_proxy,
            });
        }
    }

    root.append_child(&hit_group)
        .map_err(|_| SitePlanError::Malformed)?;
    tracing::info!(
        shapes = shapes.len(),
        width,
        height,
        "Prepared vector site plan"
    );

    Ok(PreparedPlan {
        markup: root.outer_html(),
        width,
        height,
        shapes,
    })
}
