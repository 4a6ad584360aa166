//! Built-in widgets, one per element kind family.

use std::cell::Cell;
use std::rc::Rc;

use tracing::warn;

use crate::props::{PropMap, PropValue, StyleObject};
use crate::scene::{NativeClass, NodeId, Scene, SceneSignal, SignalArgs, StyleBox};
use crate::types::{LayoutAxis, Rgba, SizeFlags};

use super::control::apply_control_props;
use super::handlers::bind_callback;
use super::layout::apply_box_layout;
use super::proxy::{UpdateContext, Widget};

// =============================================================================
// Shared helpers
// =============================================================================

fn set_or_unset_str(scene: &Scene, node: NodeId, native: &str, value: &PropValue) {
    match value.to_text() {
        Some(text) => scene.set(node, native, text),
        None => scene.unset(node, native),
    }
}

fn set_or_unset_bool(scene: &Scene, node: NodeId, native: &str, value: &PropValue) {
    match value.as_bool() {
        Some(b) => scene.set(node, native, b),
        None => scene.unset(node, native),
    }
}

/// `text` wins over all-text `children`.
fn apply_text(ctx: &UpdateContext<'_>) {
    if ctx.changed("text").is_none() && ctx.changed("children").is_none() {
        return;
    }
    let text = ctx
        .props
        .get("text")
        .and_then(PropValue::to_text)
        .or_else(|| ctx.props.get("children").and_then(PropValue::to_text))
        .unwrap_or_default();
    ctx.scene.set(ctx.node, "text", text);
}

fn apply_font(ctx: &UpdateContext<'_>, size_name: &str, color_name: &str) {
    let (scene, node) = (ctx.scene, ctx.node);
    if let Some(size) = ctx.style_changed("fontSize") {
        match size.as_i64() {
            Some(px) => scene.set_theme_font_size(node, size_name, px),
            None => scene.clear_theme_font_size(node, size_name),
        }
    }
    if let Some(color) = ctx.style_changed("fontColor") {
        match color.as_color() {
            Some(c) => scene.set_theme_color(node, color_name, c),
            None => scene.clear_theme_color(node, color_name),
        }
    }
}

fn expand_fill(scene: &Scene, node: NodeId) {
    let bits = i64::from(SizeFlags::EXPAND_FILL.bits());
    scene.set(node, "size_flags_horizontal", bits);
    scene.set(node, "size_flags_vertical", bits);
}

// =============================================================================
// Container / Control / Raw
// =============================================================================

/// Plain control with only the shared control props.
pub struct ContainerWidget {
    class: NativeClass,
}

impl ContainerWidget {
    pub fn new(class: NativeClass) -> Self {
        Self { class }
    }

    /// Passthrough for the engine class named by the `type` prop.
    pub fn raw(props: &PropMap) -> Self {
        let class = props
            .get("type")
            .and_then(PropValue::as_str)
            .map(NativeClass::from_name)
            .unwrap_or(NativeClass::Control);
        Self { class }
    }
}

impl Widget for ContainerWidget {
    fn class(&self) -> NativeClass {
        self.class.clone()
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        apply_control_props(ctx, &self.class);
    }
}

// =============================================================================
// Panel
// =============================================================================

const STYLEBOX_KEYS: [&str; 9] = [
    "bgColor",
    "borderWidth",
    "borderColor",
    "cornerRadius",
    "padding",
    "paddingLeft",
    "paddingRight",
    "paddingTop",
    "paddingBottom",
];

/// Container with a background style box.
///
/// An explicit `backgroundStyle` resource wins. Otherwise the box is built
/// from the class-derived style keys; updates that touch neither `class`
/// nor any style-box key leave the current box alone.
#[derive(Default)]
pub struct PanelWidget {
    class_box_active: bool,
}

impl PanelWidget {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Widget for PanelWidget {
    fn class(&self) -> NativeClass {
        NativeClass::Panel
    }

    fn init(&mut self, scene: &Scene, node: NodeId) {
        expand_fill(scene, node);
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        apply_control_props(ctx, &NativeClass::Panel);
        let (scene, node) = (ctx.scene, ctx.node);

        if let Some(background) = ctx.style_value("backgroundStyle") {
            if ctx.style_changed("backgroundStyle").is_some() {
                match background.as_resource().and_then(|r| r.downcast_ref::<StyleBox>()) {
                    Some(style_box) => scene.set_theme_stylebox(node, "panel", style_box.clone()),
                    None => warn!(%node, "backgroundStyle is not a style box resource"),
                }
            }
            self.class_box_active = false;
            return;
        }

        let background_removed = ctx.style_changed("backgroundStyle").is_some();
        if background_removed {
            scene.clear_theme_stylebox(node, "panel");
        }
        if !ctx.class_update && !background_removed && !ctx.any_style_changed(&STYLEBOX_KEYS) {
            return;
        }

        if STYLEBOX_KEYS.iter().all(|k| ctx.style_value(k).is_none()) {
            if self.class_box_active {
                scene.clear_theme_stylebox(node, "panel");
                self.class_box_active = false;
            }
            return;
        }

        scene.set_theme_stylebox(node, "panel", style_box_from(ctx.style));
        self.class_box_active = true;
    }
}

/// Build a style box from style keys. Later, more specific padding keys
/// override broader ones.
fn style_box_from(style: &StyleObject) -> StyleBox {
    let num = |key: &str| style.get(key).and_then(PropValue::as_f64).map(|n| n.max(0.0) as f32);
    let color = |key: &str| style.get(key).and_then(PropValue::as_color);

    let mut style_box = StyleBox {
        bg_color: color("bgColor").unwrap_or(Rgba::TRANSPARENT),
        border_color: color("borderColor").unwrap_or(Rgba::TRANSPARENT),
        ..StyleBox::default()
    };
    if let Some(width) = num("borderWidth") {
        style_box.set_border_width_all(width.round());
    }
    if let Some(radius) = num("cornerRadius") {
        style_box.set_corner_radius_all(radius.round());
    }

    // [left, top, right, bottom]
    let margin = &mut style_box.content_margin;
    if let Some(p) = num("padding") {
        *margin = [p; 4];
    }
    for (key, side) in [("paddingLeft", 0), ("paddingTop", 1), ("paddingRight", 2), ("paddingBottom", 3)] {
        if let Some(p) = num(key) {
            margin[side] = p;
        }
    }
    style_box
}

// =============================================================================
// Margin
// =============================================================================

/// Side constants, in application order; later keys win.
const MARGIN_SOURCES: [(&str, &[usize]); 10] = [
    ("padding", &[0, 1, 2, 3]),
    ("paddingTop", &[0]),
    ("paddingLeft", &[1]),
    ("paddingRight", &[2]),
    ("paddingBottom", &[3]),
    ("margin", &[0, 1, 2, 3]),
    ("marginTop", &[0]),
    ("marginLeft", &[1]),
    ("marginRight", &[2]),
    ("marginBottom", &[3]),
];

const MARGIN_CONSTANTS: [&str; 4] = ["margin_top", "margin_left", "margin_right", "margin_bottom"];

/// Container whose padding keys become margin theme constants.
pub struct MarginWidget;

impl Widget for MarginWidget {
    fn class(&self) -> NativeClass {
        NativeClass::Margin
    }

    fn init(&mut self, scene: &Scene, node: NodeId) {
        expand_fill(scene, node);
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        apply_control_props(ctx, &NativeClass::Margin);
        if !MARGIN_SOURCES.iter().any(|(key, _)| ctx.style_changed(key).is_some()) {
            return;
        }

        let mut sides: [Option<i64>; 4] = [None; 4];
        for (key, targets) in MARGIN_SOURCES {
            if let Some(value) = ctx.style_value(key).and_then(PropValue::as_i64) {
                for side in targets {
                    sides[*side] = Some(value);
                }
            }
        }
        for (constant, value) in MARGIN_CONSTANTS.iter().zip(sides) {
            match value {
                Some(v) => ctx.scene.set_theme_constant(ctx.node, constant, v),
                None => ctx.scene.clear_theme_constant(ctx.node, constant),
            }
        }
    }
}

// =============================================================================
// Box
// =============================================================================

/// Horizontal or vertical box with main-axis alignment and gap.
pub struct BoxWidget {
    axis: LayoutAxis,
}

impl BoxWidget {
    pub fn new(axis: LayoutAxis) -> Self {
        Self { axis }
    }
}

impl Widget for BoxWidget {
    fn class(&self) -> NativeClass {
        match self.axis {
            LayoutAxis::Horizontal => NativeClass::HBox,
            LayoutAxis::Vertical => NativeClass::VBox,
        }
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        apply_control_props(ctx, &self.class());
        apply_box_layout(ctx, self.axis);
    }
}

// =============================================================================
// Label
// =============================================================================

pub struct LabelWidget {
    rich: bool,
}

impl LabelWidget {
    /// Rich text when the `rich` prop is set.
    pub fn from_props(props: &PropMap) -> Self {
        let rich = props.get("rich").and_then(PropValue::as_bool).unwrap_or(false);
        Self { rich }
    }
}

impl Widget for LabelWidget {
    fn class(&self) -> NativeClass {
        if self.rich {
            NativeClass::RichLabel
        } else {
            NativeClass::Label
        }
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        apply_control_props(ctx, &self.class());
        apply_text(ctx);
        if self.rich {
            apply_font(ctx, "normal_font_size", "default_color");
        } else {
            apply_font(ctx, "font_size", "font_color");
        }
        if let Some(autowrap) = ctx.changed("autowrap") {
            set_or_unset_bool(ctx.scene, ctx.node, "autowrap", autowrap);
        }
    }
}

// =============================================================================
// Button
// =============================================================================

pub struct ButtonWidget;

impl Widget for ButtonWidget {
    fn class(&self) -> NativeClass {
        NativeClass::Button
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        apply_control_props(ctx, &NativeClass::Button);
        apply_text(ctx);
        apply_font(ctx, "font_size", "font_color");

        let (scene, node) = (ctx.scene, ctx.node);
        if let Some(disabled) = ctx.changed("disabled") {
            set_or_unset_bool(scene, node, "disabled", disabled);
        }
        for key in ["onPress", "onClick"] {
            bind_callback(ctx.handlers, scene, node, key, ctx.payload.get(key), SceneSignal::Pressed, |_| {
                Some(Vec::new())
            });
        }
    }
}

// =============================================================================
// Slider
// =============================================================================

/// Horizontal slider. Values written from props never re-fire `onChange`.
#[derive(Default)]
pub struct SliderWidget {
    syncing: Rc<Cell<bool>>,
}

impl SliderWidget {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Widget for SliderWidget {
    fn class(&self) -> NativeClass {
        NativeClass::Slider
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        apply_control_props(ctx, &NativeClass::Slider);
        let (scene, node) = (ctx.scene, ctx.node);

        for (key, native) in [("min", "min_value"), ("max", "max_value"), ("step", "step")] {
            if let Some(value) = ctx.changed(key) {
                match value.as_f64() {
                    Some(n) => scene.set(node, native, n),
                    None => scene.unset(node, native),
                }
            }
        }
        if let Some(editable) = ctx.changed("editable") {
            set_or_unset_bool(scene, node, "editable", editable);
        }

        let syncing = Rc::clone(&self.syncing);
        bind_callback(ctx.handlers, scene, node, "onChange", ctx.payload.get("onChange"), SceneSignal::ValueChanged, move |args| {
            match args {
                SignalArgs::Float(v) if !syncing.get() => Some(vec![PropValue::from(*v)]),
                _ => None,
            }
        });

        if let Some(value) = ctx.changed("value").and_then(PropValue::as_f64) {
            self.syncing.set(true);
            scene.set_value(node, value);
            self.syncing.set(false);
        }
    }
}

// =============================================================================
// Text Input
// =============================================================================

/// Single-line text field.
pub struct TextInputWidget;

impl Widget for TextInputWidget {
    fn class(&self) -> NativeClass {
        NativeClass::LineEdit
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        apply_control_props(ctx, &NativeClass::LineEdit);
        let (scene, node) = (ctx.scene, ctx.node);

        if ctx.changed("value").is_some() || ctx.changed("text").is_some() {
            let text = ctx
                .props
                .get("value")
                .or_else(|| ctx.props.get("text"))
                .and_then(PropValue::to_text)
                .unwrap_or_default();
            scene.set(node, "text", text);
        }
        if let Some(placeholder) = ctx.changed("placeholder") {
            set_or_unset_str(scene, node, "placeholder_text", placeholder);
        }
        if let Some(editable) = ctx.changed("editable") {
            set_or_unset_bool(scene, node, "editable", editable);
        }
        if let Some(secret) = ctx.changed("secret") {
            set_or_unset_bool(scene, node, "secret", secret);
        }
        if let Some(max) = ctx.changed("maxLength") {
            match max.as_i64() {
                Some(n) => scene.set(node, "max_length", n.max(0)),
                None => scene.unset(node, "max_length"),
            }
        }

        let text_arg = |args: &SignalArgs| match args {
            SignalArgs::Text(text) => Some(vec![PropValue::from(text.as_str())]),
            _ => None,
        };
        bind_callback(ctx.handlers, scene, node, "onChange", ctx.payload.get("onChange"), SceneSignal::TextChanged, text_arg);
        bind_callback(ctx.handlers, scene, node, "onSubmit", ctx.payload.get("onSubmit"), SceneSignal::TextSubmitted, text_arg);
    }
}

// =============================================================================
// Texture
// =============================================================================

/// Image backed by a texture rect. `src` is a resource path or a loaded
/// texture resource.
pub struct TextureWidget;

impl Widget for TextureWidget {
    fn class(&self) -> NativeClass {
        NativeClass::TextureRect
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        apply_control_props(ctx, &NativeClass::TextureRect);
        let (scene, node) = (ctx.scene, ctx.node);

        if let Some(src) = ctx.changed("src") {
            scene.unset(node, "texture");
            scene.unset(node, "texture_path");
            match src {
                PropValue::Str(path) => scene.set(node, "texture_path", path.as_str()),
                PropValue::Resource(texture) => {
                    scene.set(node, "texture", crate::scene::Variant::Resource(texture.clone()))
                }
                PropValue::Null => {}
                other => warn!(%node, ?other, "unsupported texture source"),
            }
        }
        if let Some(mode) = ctx.changed("stretchMode") {
            match mode.as_i64() {
                Some(n) => scene.set(node, "stretch_mode", n),
                None => scene.unset(node, "stretch_mode"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prop_map;

    #[test]
    fn test_style_box_padding_precedence() {
        let style = prop_map! {
            "bgColor" => Rgba::rgb(1, 2, 3),
            "padding" => 4,
            "paddingLeft" => 8,
            "paddingRight" => 8,
            "paddingTop" => 2,
            "cornerRadius" => 6,
        };
        let style_box = style_box_from(&style);
        assert_eq!(style_box.bg_color, Rgba::rgb(1, 2, 3));
        assert_eq!(style_box.content_margin, [8.0, 2.0, 8.0, 4.0]);
        assert_eq!(style_box.corner_radius, [6.0; 4]);
        assert_eq!(style_box.border_width, [0.0; 4]);
        assert_eq!(style_box.border_color, Rgba::TRANSPARENT);
    }

    #[test]
    fn test_raw_class_from_type_prop() {
        let raw = ContainerWidget::raw(&prop_map! { "type" => "ColorRect" });
        assert_eq!(raw.class(), NativeClass::Raw("ColorRect".into()));
        let known = ContainerWidget::raw(&prop_map! { "type" => "HBoxContainer" });
        assert_eq!(known.class(), NativeClass::HBox);
        assert_eq!(ContainerWidget::raw(&PropMap::new()).class(), NativeClass::Control);
    }

    #[test]
    fn test_label_rich_selection() {
        assert_eq!(LabelWidget::from_props(&prop_map! { "rich" => true }).class(), NativeClass::RichLabel);
        assert_eq!(LabelWidget::from_props(&PropMap::new()).class(), NativeClass::Label);
    }
}
