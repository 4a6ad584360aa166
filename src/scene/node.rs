//! Native node data: ids, classes, property values and theme overrides.

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;

use crate::props::Resource;
use crate::types::{LayoutAxis, Rgba, Vec2};

use super::signal::{ConnectionId, SceneSignal, SignalHandler};

// =============================================================================
// Node Id
// =============================================================================

/// Handle of a native node.
///
/// Slots are reused after a node is freed; the generation tells a stale
/// handle apart from the node that now occupies its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

// =============================================================================
// Native Class
// =============================================================================

/// Concrete native widget class.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NativeClass {
    /// Scene root. Holds the document's top-level nodes.
    Root,
    Control,
    Container,
    Panel,
    Margin,
    HBox,
    VBox,
    Label,
    RichLabel,
    Button,
    Slider,
    LineEdit,
    TextureRect,
    /// Any other engine class, by name.
    Raw(String),
}

impl NativeClass {
    /// Engine class name.
    pub fn name(&self) -> &str {
        match self {
            Self::Root => "Root",
            Self::Control => "Control",
            Self::Container => "Container",
            Self::Panel => "PanelContainer",
            Self::Margin => "MarginContainer",
            Self::HBox => "HBoxContainer",
            Self::VBox => "VBoxContainer",
            Self::Label => "Label",
            Self::RichLabel => "RichTextLabel",
            Self::Button => "Button",
            Self::Slider => "HSlider",
            Self::LineEdit => "LineEdit",
            Self::TextureRect => "TextureRect",
            Self::Raw(name) => name,
        }
    }

    /// Class for an engine class name. Unknown names stay raw.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Control" => Self::Control,
            "Container" => Self::Container,
            "PanelContainer" => Self::Panel,
            "MarginContainer" => Self::Margin,
            "HBoxContainer" => Self::HBox,
            "VBoxContainer" => Self::VBox,
            "Label" => Self::Label,
            "RichTextLabel" => Self::RichLabel,
            "Button" => Self::Button,
            "HSlider" => Self::Slider,
            "LineEdit" => Self::LineEdit,
            "TextureRect" => Self::TextureRect,
            other => Self::Raw(other.to_string()),
        }
    }

    /// Main axis for box containers.
    pub fn box_axis(&self) -> Option<LayoutAxis> {
        match self {
            Self::HBox => Some(LayoutAxis::Horizontal),
            Self::VBox => Some(LayoutAxis::Vertical),
            _ => None,
        }
    }
}

impl fmt::Display for NativeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Variant
// =============================================================================

/// Native property value.
#[derive(Debug, Clone, PartialEq)]
pub enum Variant {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Color(Rgba),
    Vec2(Vec2),
    Resource(Resource),
}

impl Variant {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(n) => Some(*n),
            Self::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Rgba> {
        match self {
            Self::Color(c) => Some(*c),
            _ => None,
        }
    }
}

impl From<bool> for Variant {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Variant {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Variant {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Variant {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Variant {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Rgba> for Variant {
    fn from(value: Rgba) -> Self {
        Self::Color(value)
    }
}

impl From<Vec2> for Variant {
    fn from(value: Vec2) -> Self {
        Self::Vec2(value)
    }
}

// =============================================================================
// Style Box
// =============================================================================

/// Flat background style: fill, border, corner radius and content margins.
///
/// Side arrays are ordered left, top, right, bottom. Corner arrays are
/// ordered top-left, top-right, bottom-right, bottom-left.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StyleBox {
    pub bg_color: Rgba,
    pub border_color: Rgba,
    pub border_width: [f32; 4],
    pub corner_radius: [f32; 4],
    pub content_margin: [f32; 4],
}

impl StyleBox {
    pub fn set_border_width_all(&mut self, width: f32) {
        self.border_width = [width; 4];
    }

    pub fn set_corner_radius_all(&mut self, radius: f32) {
        self.corner_radius = [radius; 4];
    }

    pub fn set_content_margin_all(&mut self, margin: f32) {
        self.content_margin = [margin; 4];
    }
}

// =============================================================================
// Theme Overrides
// =============================================================================

/// Per-node theme overrides.
#[derive(Debug, Clone, Default)]
pub struct ThemeOverrides {
    pub constants: HashMap<String, i64>,
    pub colors: HashMap<String, Rgba>,
    pub font_sizes: HashMap<String, i64>,
    pub styleboxes: HashMap<String, StyleBox>,
}

// =============================================================================
// Native Node
// =============================================================================

pub(crate) struct Connection {
    pub(crate) id: ConnectionId,
    pub(crate) signal: SceneSignal,
    pub(crate) handler: SignalHandler,
}

pub(crate) struct NativeNode {
    pub(crate) class: NativeClass,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) properties: IndexMap<String, Variant>,
    pub(crate) theme: ThemeOverrides,
    pub(crate) size: Vec2,
    pub(crate) min_size: Vec2,
    pub(crate) connections: Vec<Connection>,
}

impl NativeNode {
    pub(crate) fn new(class: NativeClass) -> Self {
        Self {
            class,
            parent: None,
            children: Vec::new(),
            properties: IndexMap::new(),
            theme: ThemeOverrides::default(),
            size: Vec2::ZERO,
            min_size: Vec2::ZERO,
            connections: Vec::new(),
        }
    }
}
