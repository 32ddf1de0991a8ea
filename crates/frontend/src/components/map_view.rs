use campsite_shared::config::BookingConfig;
use campsite_shared::selection::{is_tap, point_distance, PitchMap, PointerKind};
use campsite_shared::svg::PreparedPlan;
use dioxus::html::geometry::{ClientPoint, WheelDelta};
use dioxus::html::input_data::MouseButton;
use dioxus::prelude::*;

use super::overlay_style::{overlay_css, PLAN_ID};

const MAP_CONTAINER_ID: &str = "site-map-container";

const ZOOM_MIN: f64 = 1.0;
const ZOOM_MAX: f64 = 10.0;
const ZOOM_STEP: f64 = 1.1;

/// Offset of the tooltip from the pointer.
const TOOLTIP_OFFSET: f64 = 12.0;

// ---------------------------------------------------------------------------
// DOM helpers
// ---------------------------------------------------------------------------

fn container_rect() -> Option<web_sys::DomRect> {
    let document = web_sys::window()?.document()?;
    let element = document.get_element_by_id(MAP_CONTAINER_ID)?;
    Some(element.get_bounding_client_rect())
}

/// Id of the pitch shape under a viewport point. A hit-proxy resolves to the
/// shape it stands in for.
fn shape_at(client_x: f64, client_y: f64) -> Option<String> {
    let document = web_sys::window()?.document()?;
    let element = document.element_from_point(client_x as f32, client_y as f32)?;
    let target = element
        .closest("[data-shape],[data-hit-for]")
        .ok()
        .flatten()?;
    target
        .get_attribute("data-shape")
        .or_else(|| target.get_attribute("data-hit-for"))
}

// ---------------------------------------------------------------------------
// Zoom / pan math
// ---------------------------------------------------------------------------

/// Compute new pan offsets so that `cursor` stays over the same content point
/// when zooming from `old_zoom` to `new_zoom`.
fn zoom_pan_at_cursor(
    cursor_x: f64,
    cursor_y: f64,
    old_zoom: f64,
    new_zoom: f64,
    old_pan_x: f64,
    old_pan_y: f64,
) -> (f64, f64) {
    let content_x = (cursor_x - old_pan_x) / old_zoom;
    let content_y = (cursor_y - old_pan_y) / old_zoom;
    (
        cursor_x - content_x * new_zoom,
        cursor_y - content_y * new_zoom,
    )
}

/// Clamp pan values so the plan can't be dragged off-screen.
///
/// The plan is rendered at `width: 100%`, so its height is
/// `container_w * aspect` and may exceed the container.
fn clamp_pan(
    pan_x: f64,
    pan_y: f64,
    zoom: f64,
    aspect: f64,
    container_w: f64,
    container_h: f64,
) -> (f64, f64) {
    let content_w = container_w * zoom;
    let content_h = container_w * aspect * zoom;
    let min_pan_x = -(content_w - container_w).max(0.0);
    let min_pan_y = -(content_h - container_h).max(0.0);
    (pan_x.clamp(min_pan_x, 0.0), pan_y.clamp(min_pan_y, 0.0))
}

fn clamp_pan_to_container(pan_x: f64, pan_y: f64, zoom: f64, aspect: f64) -> (f64, f64) {
    match container_rect() {
        Some(rect) => clamp_pan(pan_x, pan_y, zoom, aspect, rect.width(), rect.height()),
        None => (pan_x, pan_y),
    }
}

fn wheel_delta_y(delta: WheelDelta) -> f64 {
    match delta {
        WheelDelta::Pixels(d) => d.y,
        WheelDelta::Lines(d) => d.y * 40.0,
        WheelDelta::Pages(d) => d.y * 400.0,
    }
}

fn xy(point: ClientPoint) -> (f64, f64) {
    (point.x, point.y)
}

/// Two-finger gesture as it stood when the second finger landed.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Pinch {
    spread: f64,
    zoom: f64,
    midpoint: (f64, f64),
    pan: (f64, f64),
}

impl Pinch {
    /// Zoom for the current finger positions. `None` when the fingers
    /// started too close together to measure.
    fn zoom_for(&self, p0: (f64, f64), p1: (f64, f64)) -> Option<f64> {
        if self.spread < 1.0 {
            return None;
        }
        Some((self.zoom * point_distance(p0, p1) / self.spread).clamp(ZOOM_MIN, ZOOM_MAX))
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Hover {
    id: String,
    x: f64,
    y: f64,
}

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

#[component]
pub fn MapView(plan: PreparedPlan, map: Signal<PitchMap>, opacity: Signal<f64>) -> Element {
    let config = use_context::<BookingConfig>();
    let mouse_tolerance = config.tap_tolerance(PointerKind::Mouse);
    let touch_tolerance = config.tap_tolerance(PointerKind::Touch);
    let aspect = plan.height / plan.width;

    let mut zoom = use_signal(|| 1.0_f64);
    let mut pan_x = use_signal(|| 0.0_f64);
    let mut pan_y = use_signal(|| 0.0_f64);
    let mut hover = use_signal(|| None::<Hover>);

    // Mouse
    let mut press = use_signal(|| None::<(f64, f64)>);
    let mut did_drag = use_signal(|| false);
    let mut drag_start_pan = use_signal(|| (0.0_f64, 0.0_f64));

    // Touch
    let mut touch_start_pos = use_signal(|| None::<(f64, f64)>);
    let mut touch_did_pan = use_signal(|| false);
    let mut touch_start_pan = use_signal(|| (0.0_f64, 0.0_f64));
    let mut pinch = use_signal(|| None::<Pinch>);

    let overlay = use_memo(move || {
        let hovered = hover.read().as_ref().map(|h| h.id.clone());
        overlay_css(&map.read(), hovered.as_deref())
    });

    let mut tap = move |client_x: f64, client_y: f64| {
        if let Some(id) = shape_at(client_x, client_y) {
            let result = map.write().click(&id);
            tracing::debug!(?result, "Tap on site plan");
        }
    };

    let cur_zoom = *zoom.read();
    let cur_pan_x = *pan_x.read();
    let cur_pan_y = *pan_y.read();
    let transform_style = format!(
        "transform: translate({cur_pan_x}px, {cur_pan_y}px) scale({cur_zoom}); transform-origin: 0 0;"
    );
    let container_class = if press.read().is_some() && *did_drag.read() {
        "map-container dragging"
    } else {
        "map-container"
    };
    let plan_style = format!("opacity: {};", *opacity.read());

    let tooltip = hover.read().as_ref().and_then(|h| {
        let map = map.read();
        let shape = map.shape(&h.id)?;
        let text = if shape.bookable {
            shape.display_name.clone()
        } else {
            format!("{} (taken)", shape.display_name)
        };
        Some((text, h.x + TOOLTIP_OFFSET, h.y + TOOLTIP_OFFSET))
    });

    rsx! {
        style { "{overlay}" }
        div {
            id: MAP_CONTAINER_ID,
            class: "{container_class}",

            onwheel: move |evt: Event<WheelData>| {
                evt.prevent_default();

                let delta_y = wheel_delta_y(evt.data().delta());
                let factor = if delta_y < 0.0 { ZOOM_STEP } else { 1.0 / ZOOM_STEP };
                let old_z = *zoom.read();
                let new_z = (old_z * factor).clamp(ZOOM_MIN, ZOOM_MAX);
                if (new_z - old_z).abs() < 1e-9 {
                    return;
                }

                let Some(rect) = container_rect() else { return };
                let client = evt.data().client_coordinates();
                let cx = client.x - rect.left();
                let cy = client.y - rect.top();

                let (new_px, new_py) =
                    zoom_pan_at_cursor(cx, cy, old_z, new_z, *pan_x.read(), *pan_y.read());
                let (px, py) =
                    clamp_pan(new_px, new_py, new_z, aspect, rect.width(), rect.height());

                zoom.set(new_z);
                pan_x.set(px);
                pan_y.set(py);
            },

            onmousedown: move |evt: Event<MouseData>| {
                if evt.trigger_button() != Some(MouseButton::Primary) {
                    return;
                }
                let client = evt.client_coordinates();
                press.set(Some((client.x, client.y)));
                did_drag.set(false);
                drag_start_pan.set((*pan_x.read(), *pan_y.read()));
            },

            onmousemove: move |evt: Event<MouseData>| {
                let client = evt.client_coordinates();
                let cur = (client.x, client.y);

                let Some(start) = *press.read() else {
                    // Not pressed: hover feedback only.
                    let next = shape_at(cur.0, cur.1).and_then(|id| {
                        let rect = container_rect()?;
                        Some(Hover { id, x: cur.0 - rect.left(), y: cur.1 - rect.top() })
                    });
                    if *hover.read() != next {
                        hover.set(next);
                    }
                    return;
                };

                if !*did_drag.read() && !is_tap(start, cur, mouse_tolerance) {
                    did_drag.set(true);
                    hover.set(None);
                }
                if *did_drag.read() {
                    let (start_px, start_py) = *drag_start_pan.read();
                    let (px, py) = clamp_pan_to_container(
                        start_px + cur.0 - start.0,
                        start_py + cur.1 - start.1,
                        *zoom.read(),
                        aspect,
                    );
                    pan_x.set(px);
                    pan_y.set(py);
                }
            },

            onmouseup: move |evt: Event<MouseData>| {
                let started = press.write().take();
                let dragged = *did_drag.read();
                did_drag.set(false);

                // Press and release close together is a click.
                if let Some(start) = started {
                    let client = evt.client_coordinates();
                    if !dragged && is_tap(start, (client.x, client.y), mouse_tolerance) {
                        tap(client.x, client.y);
                    }
                }
            },

            onmouseleave: move |_| {
                press.set(None);
                did_drag.set(false);
                hover.set(None);
            },

            ondoubleclick: move |evt: Event<MouseData>| {
                evt.prevent_default();
                zoom.set(1.0);
                pan_x.set(0.0);
                pan_y.set(0.0);
            },

            ontouchstart: move |evt: Event<TouchData>| {
                evt.prevent_default();
                let touches = evt.data().touches();
                let pan = (*pan_x.read(), *pan_y.read());
                match touches.as_slice() {
                    [one] => {
                        touch_start_pos.set(Some(xy(one.client_coordinates())));
                        touch_did_pan.set(false);
                        touch_start_pan.set(pan);
                    }
                    [first, second, ..] => {
                        let p0 = xy(first.client_coordinates());
                        let p1 = xy(second.client_coordinates());
                        pinch.set(Some(Pinch {
                            spread: point_distance(p0, p1),
                            zoom: *zoom.read(),
                            midpoint: ((p0.0 + p1.0) / 2.0, (p0.1 + p1.1) / 2.0),
                            pan,
                        }));
                        touch_start_pos.set(None);
                        touch_did_pan.set(true);
                    }
                    [] => {}
                }
            },

            ontouchmove: move |evt: Event<TouchData>| {
                evt.prevent_default();
                let touches = evt.data().touches();

                let gesture = *pinch.read();
                match (gesture, touches.as_slice()) {
                    (Some(gesture), [first, second, ..]) => {
                        let Some(new_z) = gesture.zoom_for(
                            xy(first.client_coordinates()),
                            xy(second.client_coordinates()),
                        ) else {
                            return;
                        };
                        let Some(rect) = container_rect() else { return };
                        let (new_px, new_py) = zoom_pan_at_cursor(
                            gesture.midpoint.0 - rect.left(),
                            gesture.midpoint.1 - rect.top(),
                            gesture.zoom,
                            new_z,
                            gesture.pan.0,
                            gesture.pan.1,
                        );
                        let (px, py) =
                            clamp_pan(new_px, new_py, new_z, aspect, rect.width(), rect.height());
                        zoom.set(new_z);
                        pan_x.set(px);
                        pan_y.set(py);
                    }
                    (None, [one]) => {
                        let Some(start) = *touch_start_pos.read() else { return };
                        let cur = xy(one.client_coordinates());
                        if !*touch_did_pan.read() && !is_tap(start, cur, touch_tolerance) {
                            touch_did_pan.set(true);
                        }
                        if *touch_did_pan.read() {
                            let (start_px, start_py) = *touch_start_pan.read();
                            let (px, py) = clamp_pan_to_container(
                                start_px + cur.0 - start.0,
                                start_py + cur.1 - start.1,
                                *zoom.read(),
                                aspect,
                            );
                            pan_x.set(px);
                            pan_y.set(py);
                        }
                    }
                    _ => {}
                }
            },

            ontouchend: move |evt: Event<TouchData>| {
                evt.prevent_default();
                if !evt.data().touches().is_empty() {
                    return;
                }
                // Lifting the last finger of a pinch never counts as a tap.
                let was_pinch = pinch.write().take().is_some();
                let start = touch_start_pos.write().take();
                let panned = was_pinch || *touch_did_pan.read();
                if let (false, Some(start)) = (panned, start) {
                    tap(start.0, start.1);
                }
            },

            ontouchcancel: move |_evt: Event<TouchData>| {
                touch_start_pos.set(None);
                touch_did_pan.set(false);
                pinch.set(None);
            },

            div {
                class: "map-inner",
                style: "{transform_style}",
                div {
                    id: PLAN_ID,
                    style: "{plan_style}",
                    dangerous_inner_html: "{plan.markup}",
                }
            }

            if let Some((text, x, y)) = tooltip {
                div {
                    class: "map-tooltip",
                    style: "left: {x}px; top: {y}px;",
                    "{text}"
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_pan_keeps_cursor_point() {
        let (px, py) = zoom_pan_at_cursor(100.0, 50.0, 1.0, 2.0, 0.0, 0.0);
        assert!((px + 100.0).abs() < 1e-9);
        assert!((py + 50.0).abs() < 1e-9);
        // Content under the cursor is unchanged.
        let content_before = (100.0 - 0.0) / 1.0;
        let content_after = (100.0 - px) / 2.0;
        assert!((content_before - content_after).abs() < 1e-9);
    }

    #[test]
    fn test_clamp_pan_zoom1_plan_fits_in_container() {
        // 800 wide container, plan aspect 0.5 renders 400 tall in a 600 tall box.
        let (px, py) = clamp_pan(-50.0, -50.0, 1.0, 0.5, 800.0, 600.0);
        assert_eq!(px, 0.0);
        assert_eq!(py, 0.0);
    }

    #[test]
    fn test_clamp_pan_zoom1_plan_taller_than_container() {
        // Aspect 1.0 renders 800 tall in a 600 tall box: 200px of vertical room.
        let (_, py) = clamp_pan(0.0, -500.0, 1.0, 1.0, 800.0, 600.0);
        assert!((py + 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_clamp_pan_prevents_positive_pan() {
        let (px, py) = clamp_pan(30.0, 40.0, 2.0, 0.67, 800.0, 600.0);
        assert_eq!(px, 0.0);
        assert_eq!(py, 0.0);
    }

    #[test]
    fn test_pinch_zoom_follows_finger_spread() {
        let pinch = Pinch {
            spread: 100.0,
            zoom: 2.0,
            midpoint: (50.0, 50.0),
            pan: (0.0, 0.0),
        };
        let zoomed = pinch.zoom_for((0.0, 0.0), (150.0, 0.0)).unwrap();
        assert!((zoomed - 3.0).abs() < 1e-9);
        assert_eq!(pinch.zoom_for((0.0, 0.0), (0.0, 0.0)), Some(ZOOM_MIN));
        let collapsed = Pinch { spread: 0.5, ..pinch };
        assert_eq!(collapsed.zoom_for((0.0, 0.0), (100.0, 0.0)), None);
    }

    #[test]
    fn test_clamp_pan_zoomed_limits() {
        let (px, _) = clamp_pan(-5000.0, 0.0, 2.0, 0.67, 800.0, 600.0);
        assert!((px + 800.0).abs() < 1e-9);
    }
}
