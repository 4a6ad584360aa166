//! Native signals - notifications a scene node emits to connected handlers.

use std::rc::Rc;

use crate::types::Vec2;

use super::node::{NativeClass, NodeId};
use super::Scene;

/// Signals a native node can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneSignal {
    Resized,
    ChildEnteredTree,
    ChildExitingTree,
    MouseEntered,
    MouseExited,
    GuiInput,
    Pressed,
    ValueChanged,
    TextChanged,
    TextSubmitted,
}

impl SceneSignal {
    /// Whether nodes of `class` emit this signal.
    pub fn is_supported_by(&self, class: &NativeClass) -> bool {
        match self {
            Self::Resized | Self::ChildEnteredTree | Self::ChildExitingTree => true,
            Self::MouseEntered | Self::MouseExited | Self::GuiInput => {
                !matches!(class, NativeClass::Root)
            }
            Self::Pressed => matches!(class, NativeClass::Button),
            Self::ValueChanged => matches!(class, NativeClass::Slider),
            Self::TextChanged | Self::TextSubmitted => matches!(class, NativeClass::LineEdit),
        }
    }
}

/// Mouse button of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Raw input delivered through [`SceneSignal::GuiInput`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    MouseButton {
        button: MouseButton,
        pressed: bool,
        position: Vec2,
    },
    MouseMotion {
        position: Vec2,
    },
}

impl InputEvent {
    /// Left button released: what counts as a click on plain controls.
    pub fn is_left_release(&self) -> bool {
        matches!(
            self,
            Self::MouseButton {
                button: MouseButton::Left,
                pressed: false,
                ..
            }
        )
    }
}

/// Arguments carried by an emitted signal.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalArgs {
    None,
    Node(NodeId),
    Input(InputEvent),
    Float(f64),
    Text(String),
}

/// Handle of one signal connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(pub(crate) u64);

/// Connected signal handler. Receives the scene so it can mutate it.
pub type SignalHandler = Rc<dyn Fn(&Scene, &SignalArgs)>;
