//! Props every control-backed widget understands.
//!
//! Top-level props: `tooltip`, `onMouseEnter`, `onMouseExit`, `onGuiInput`,
//! `onClick` (plain controls only; buttons route clicks through `Pressed`).
//!
//! Style keys: `visible`, `modulate`, `zIndex`, `minWidth`, `minHeight`,
//! `width`, `height`, `expandBehaviorH`, `expandBehaviorV`, `stretchRatio`,
//! `clipContents`, `mouseFilter`, anchors and offsets, and absolute
//! `top`/`right`/`bottom`/`left` positioning.

use crate::props::{PropValue, StyleObject};
use crate::scene::{InputEvent, MouseButton, NativeClass, NodeId, Scene, SceneSignal, SignalArgs};
use crate::types::Vec2;

use super::handlers::bind_callback;
use super::proxy::UpdateContext;

/// Style key → native property for plain numeric properties.
const FLOAT_PROPS: [(&str, &str); 9] = [
    ("stretchRatio", "size_flags_stretch_ratio"),
    ("anchorLeft", "anchor_left"),
    ("anchorTop", "anchor_top"),
    ("anchorRight", "anchor_right"),
    ("anchorBottom", "anchor_bottom"),
    ("offsetLeft", "offset_left"),
    ("offsetTop", "offset_top"),
    ("offsetRight", "offset_right"),
    ("offsetBottom", "offset_bottom"),
];

const INT_PROPS: [(&str, &str); 4] = [
    ("zIndex", "z_index"),
    ("expandBehaviorH", "size_flags_horizontal"),
    ("expandBehaviorV", "size_flags_vertical"),
    ("mouseFilter", "mouse_filter"),
];

const POSITION_KEYS: [&str; 6] = ["top", "right", "bottom", "left", "width", "minWidth"];

/// Apply the shared control props of one update.
pub fn apply_control_props(ctx: &mut UpdateContext<'_>, class: &NativeClass) {
    let (scene, node) = (ctx.scene, ctx.node);

    if let Some(tooltip) = ctx.changed("tooltip") {
        match tooltip.as_str() {
            Some(text) => scene.set(node, "tooltip_text", text),
            None => scene.unset(node, "tooltip_text"),
        }
    }

    bind_callback(ctx.handlers, scene, node, "onMouseEnter", ctx.payload.get("onMouseEnter"), SceneSignal::MouseEntered, |_| {
        Some(Vec::new())
    });
    bind_callback(ctx.handlers, scene, node, "onMouseExit", ctx.payload.get("onMouseExit"), SceneSignal::MouseExited, |_| {
        Some(Vec::new())
    });
    bind_callback(ctx.handlers, scene, node, "onGuiInput", ctx.payload.get("onGuiInput"), SceneSignal::GuiInput, |args| {
        match args {
            SignalArgs::Input(event) => Some(vec![input_event_value(event)]),
            _ => None,
        }
    });
    if !matches!(class, NativeClass::Button) {
        bind_callback(ctx.handlers, scene, node, "onClick", ctx.payload.get("onClick"), SceneSignal::GuiInput, |args| {
            match args {
                SignalArgs::Input(event) if event.is_left_release() => Some(Vec::new()),
                _ => None,
            }
        });
    }

    apply_control_style(scene, node, ctx.style, ctx.style_changes);
}

fn apply_control_style(scene: &Scene, node: NodeId, style: &StyleObject, changes: &StyleObject) {
    if let Some(visible) = changes.get("visible") {
        scene.set(node, "visible", visible.as_bool().unwrap_or(true));
    }
    if let Some(modulate) = changes.get("modulate") {
        match modulate.as_color() {
            Some(color) => scene.set(node, "modulate", color),
            None => scene.unset(node, "modulate"),
        }
    }
    if let Some(clip) = changes.get("clipContents") {
        scene.set(node, "clip_contents", clip.as_bool().unwrap_or(false));
    }

    for (key, native) in INT_PROPS {
        if let Some(value) = changes.get(key) {
            match value.as_i64() {
                Some(n) => scene.set(node, native, n),
                None => scene.unset(node, native),
            }
        }
    }
    for (key, native) in FLOAT_PROPS {
        if let Some(value) = changes.get(key) {
            match value.as_f64() {
                Some(n) => scene.set(node, native, n),
                None => scene.unset(node, native),
            }
        }
    }

    if changes.contains_key("minWidth") || changes.contains_key("minHeight") {
        let min = Vec2::new(
            number(style, "minWidth").unwrap_or(0.0) as f32,
            number(style, "minHeight").unwrap_or(0.0) as f32,
        );
        scene.set_min_size(node, min);
    }
    if changes.contains_key("width") || changes.contains_key("height") {
        let current = scene.size(node);
        let size = Vec2::new(
            number(style, "width").map_or(current.x, |w| w as f32),
            number(style, "height").map_or(current.y, |h| h as f32),
        );
        scene.set_size(node, size);
    }

    let position_changed = POSITION_KEYS.iter().any(|k| changes.contains_key(*k))
        || changes.contains_key("height")
        || changes.contains_key("minHeight");
    if position_changed {
        apply_positioning(scene, node, style);
    }
}

/// Absolute positioning from `top`/`right`/`bottom`/`left`.
///
/// Both sides on an axis stretch between them; one side pins to that edge
/// and sizes from `width`/`minWidth` (or `height`/`minHeight`).
fn apply_positioning(scene: &Scene, node: NodeId, style: &StyleObject) {
    let extent_x = number(style, "width").or_else(|| number(style, "minWidth")).unwrap_or(0.0);
    let extent_y = number(style, "height").or_else(|| number(style, "minHeight")).unwrap_or(0.0);

    let horizontal = axis_anchors(number(style, "left"), number(style, "right"), extent_x);
    let vertical = axis_anchors(number(style, "top"), number(style, "bottom"), extent_y);

    if let Some([anchor_start, anchor_end, offset_start, offset_end]) = horizontal {
        scene.set(node, "anchor_left", anchor_start);
        scene.set(node, "anchor_right", anchor_end);
        scene.set(node, "offset_left", offset_start);
        scene.set(node, "offset_right", offset_end);
    }
    if let Some([anchor_start, anchor_end, offset_start, offset_end]) = vertical {
        scene.set(node, "anchor_top", anchor_start);
        scene.set(node, "anchor_bottom", anchor_end);
        scene.set(node, "offset_top", offset_start);
        scene.set(node, "offset_bottom", offset_end);
    }
}

/// `[anchor_start, anchor_end, offset_start, offset_end]` for one axis.
fn axis_anchors(start: Option<f64>, end: Option<f64>, extent: f64) -> Option<[f64; 4]> {
    match (start, end) {
        (Some(s), Some(e)) => Some([0.0, 1.0, s, -e]),
        (Some(s), None) => Some([0.0, 0.0, s, s + extent]),
        (None, Some(e)) => Some([1.0, 1.0, -e - extent, -e]),
        (None, None) => None,
    }
}

fn number(style: &StyleObject, key: &str) -> Option<f64> {
    style.get(key).and_then(PropValue::as_f64)
}

/// Input event as a callback argument.
fn input_event_value(event: &InputEvent) -> PropValue {
    let mut map = crate::props::PropMap::new();
    match event {
        InputEvent::MouseButton { button, pressed, position } => {
            let button = match button {
                MouseButton::Left => "left",
                MouseButton::Right => "right",
                MouseButton::Middle => "middle",
            };
            map.insert("type".into(), "mouseButton".into());
            map.insert("button".into(), button.into());
            map.insert("pressed".into(), (*pressed).into());
            map.insert("x".into(), position.x.into());
            map.insert("y".into(), position.y.into());
        }
        InputEvent::MouseMotion { position } => {
            map.insert("type".into(), "mouseMotion".into());
            map.insert("x".into(), position.x.into());
            map.insert("y".into(), position.y.into());
        }
    }
    map.into()
}
