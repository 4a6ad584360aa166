//! Widget registry - element kind → widget factory.
//!
//! Kinds are matched case-insensitively. The registry is open: hosts can
//! register their own kinds at any time, and a later registration for a
//! kind replaces the earlier one (built-ins included). Unknown kinds fall
//! back to the configured fallback kind, and to a plain container if even
//! that is missing, so an element always renders as something.

use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use crate::props::{PropMap, PropValue};
use crate::scene::NativeClass;
use crate::types::LayoutAxis;

use super::proxy::Widget;
use super::widgets::{
    BoxWidget, ButtonWidget, ContainerWidget, LabelWidget, MarginWidget, PanelWidget, SliderWidget,
    TextInputWidget, TextureWidget,
};

/// Builds the widget for one element from its initial props.
pub type WidgetFactory = Rc<dyn Fn(&PropMap) -> Box<dyn Widget>>;

#[derive(Clone)]
pub struct WidgetRegistry {
    factories: HashMap<String, WidgetFactory>,
    fallback: String,
}

impl Default for WidgetRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl WidgetRegistry {
    /// Registry with no kinds at all. Everything renders as a container.
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
            fallback: "div".into(),
        }
    }

    /// Registry with every built-in kind.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register("div", |props| -> Box<dyn Widget> {
            if wants_panel(props) {
                Box::new(PanelWidget::new())
            } else {
                Box::new(ContainerWidget::new(NativeClass::Container))
            }
        });
        registry.register("panel", |_| Box::new(PanelWidget::new()));
        registry.register("control", |_| Box::new(ContainerWidget::new(NativeClass::Control)));
        registry.register("raw", |props| Box::new(ContainerWidget::raw(props)));
        registry.register("margin", |_| Box::new(MarginWidget));
        registry.register("hbox", |_| Box::new(BoxWidget::new(LayoutAxis::Horizontal)));
        registry.register("vbox", |_| Box::new(BoxWidget::new(LayoutAxis::Vertical)));
        registry.register("label", |props| Box::new(LabelWidget::from_props(props)));
        registry.register("button", |_| Box::new(ButtonWidget));
        registry.register("slider", |_| Box::new(SliderWidget::new()));
        registry.register("hslider", |_| Box::new(SliderWidget::new()));
        registry.register("textedit", |_| Box::new(TextInputWidget));
        registry.register("input", |_| Box::new(TextInputWidget));
        registry.register("image", |_| Box::new(TextureWidget));
        registry.register("texture", |_| Box::new(TextureWidget));
        registry
    }

    pub fn register(&mut self, kind: &str, factory: impl Fn(&PropMap) -> Box<dyn Widget> + 'static) {
        self.factories.insert(kind.to_ascii_lowercase(), Rc::new(factory));
    }

    pub fn set_fallback(&mut self, kind: &str) {
        self.fallback = kind.to_ascii_lowercase();
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(&kind.to_ascii_lowercase())
    }

    /// Build the widget for `kind`.
    pub fn create(&self, kind: &str, props: &PropMap) -> Box<dyn Widget> {
        let kind = kind.to_ascii_lowercase();
        if let Some(factory) = self.factories.get(&kind) {
            return factory(props);
        }
        debug!(kind = %kind, fallback = %self.fallback, "unknown element kind");
        match self.factories.get(&self.fallback) {
            Some(factory) => factory(props),
            None => Box::new(ContainerWidget::new(NativeClass::Container)),
        }
    }
}

/// A `div` becomes a panel when it carries a background: an inline
/// `backgroundStyle` or any `bg-*` class.
fn wants_panel(props: &PropMap) -> bool {
    let inline_background = props
        .get("style")
        .and_then(PropValue::as_map)
        .is_some_and(|style| style.contains_key("backgroundStyle"));
    let bg_class = props
        .get("class")
        .and_then(PropValue::as_str)
        .is_some_and(|class| class.split_whitespace().any(|t| t.starts_with("bg-")));
    inline_background || bg_class
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prop_map;

    #[test]
    fn test_builtin_kinds() {
        let registry = WidgetRegistry::with_builtins();
        let cases = [
            ("hbox", NativeClass::HBox),
            ("VBox", NativeClass::VBox),
            ("hslider", NativeClass::Slider),
            ("textedit", NativeClass::LineEdit),
            ("image", NativeClass::TextureRect),
            ("margin", NativeClass::Margin),
        ];
        for (kind, class) in cases {
            assert_eq!(registry.create(kind, &PropMap::new()).class(), class, "{kind}");
        }
    }

    #[test]
    fn test_div_becomes_panel_with_background() {
        let registry = WidgetRegistry::with_builtins();
        let plain = registry.create("div", &prop_map! { "class" => "p-4" });
        let panel = registry.create("div", &prop_map! { "class" => "p-4 bg-slate-800" });
        assert_eq!(plain.class(), NativeClass::Container);
        assert_eq!(panel.class(), NativeClass::Panel);
    }

    #[test]
    fn test_unknown_kind_falls_back() {
        let registry = WidgetRegistry::with_builtins();
        assert_eq!(registry.create("marquee", &PropMap::new()).class(), NativeClass::Container);

        let empty = WidgetRegistry::empty();
        assert_eq!(empty.create("label", &PropMap::new()).class(), NativeClass::Container);
    }

    #[test]
    fn test_late_registration_wins() {
        let mut registry = WidgetRegistry::with_builtins();
        registry.register("Label", |_| Box::new(ButtonWidget));
        assert!(registry.contains("label"));
        assert_eq!(registry.create("label", &PropMap::new()).class(), NativeClass::Button);

        registry.register("gauge", |_| Box::new(SliderWidget::new()));
        assert_eq!(registry.create("GAUGE", &PropMap::new()).class(), NativeClass::Slider);
    }
}
