//! Layout helper for box containers.
//!
//! Executes the `justifyContent` / `alignItems` directives the style
//! compiler produces. `justify-between` has no native equivalent, so the
//! helper computes a separation that spreads children across the box and
//! re-applies it whenever the box resizes or gains or loses a child.

use tracing::trace;

use crate::props::PropValue;
use crate::scene::{NodeId, Scene, SceneSignal, SignalArgs};
use crate::types::{AlignItems, JustifyContent, LayoutAxis};

use super::handlers::connect;
use super::proxy::UpdateContext;

const SLOT_RESIZED: &str = "layout:resized";
const SLOT_CHILD_ENTERED: &str = "layout:childEntered";
const SLOT_CHILD_EXITING: &str = "layout:childExiting";

const LAYOUT_KEYS: [&str; 3] = ["justifyContent", "alignItems", "separation"];

#[derive(Debug, Clone, Copy)]
struct BoxLayout {
    axis: LayoutAxis,
    align_items: Option<AlignItems>,
    between: bool,
    base_gap: i64,
}

/// Apply alignment, separation and layout subscriptions for a box.
pub fn apply_box_layout(ctx: &mut UpdateContext<'_>, axis: LayoutAxis) {
    let (scene, node) = (ctx.scene, ctx.node);

    // An explicit `alignment` prop wins over the justify directive.
    if ctx.changed("alignment").is_some() || ctx.style_changed("justifyContent").is_some() {
        let explicit = ctx.props.get("alignment").and_then(PropValue::as_i64);
        let alignment = explicit.map(|a| a.clamp(0, 2)).unwrap_or_else(|| {
            let justify = ctx.style_value("justifyContent").and_then(PropValue::as_str);
            justify
                .and_then(JustifyContent::parse)
                .map(|j| j.alignment())
                .unwrap_or_default() as i64
        });
        scene.set(node, "alignment", alignment);
    }

    if !ctx.any_style_changed(&LAYOUT_KEYS) {
        return;
    }

    let separation = ctx.style_value("separation").and_then(PropValue::as_i64);
    let base_gap = separation.unwrap_or(0).max(0);
    match separation {
        Some(_) => scene.set_theme_constant(node, "separation", base_gap),
        None => scene.clear_theme_constant(node, "separation"),
    }

    let layout = BoxLayout {
        axis,
        align_items: ctx
            .style_value("alignItems")
            .and_then(PropValue::as_str)
            .and_then(AlignItems::parse),
        between: ctx
            .style_value("justifyContent")
            .and_then(PropValue::as_str)
            .and_then(JustifyContent::parse)
            == Some(JustifyContent::Between),
        base_gap,
    };

    for slot in [SLOT_RESIZED, SLOT_CHILD_ENTERED, SLOT_CHILD_EXITING] {
        ctx.handlers.detach(slot);
    }
    if !layout.between && layout.align_items.is_none() {
        return;
    }

    ctx.handlers.replace(
        SLOT_RESIZED,
        connect(scene, node, SceneSignal::Resized, move |scene, _| {
            relayout(scene, node, layout, None)
        }),
    );
    ctx.handlers.replace(
        SLOT_CHILD_ENTERED,
        connect(scene, node, SceneSignal::ChildEnteredTree, move |scene, _| {
            relayout(scene, node, layout, None)
        }),
    );
    ctx.handlers.replace(
        SLOT_CHILD_EXITING,
        connect(scene, node, SceneSignal::ChildExitingTree, move |scene, args| {
            let leaving = match args {
                SignalArgs::Node(child) => Some(*child),
                _ => None,
            };
            relayout(scene, node, layout, leaving)
        }),
    );

    relayout(scene, node, layout, None);
}

/// Children that take part in layout: every child except one that is
/// about to leave the tree.
fn laid_out_children(scene: &Scene, node: NodeId, leaving: Option<NodeId>) -> Vec<NodeId> {
    scene
        .children(node)
        .into_iter()
        .filter(|child| Some(*child) != leaving)
        .collect()
}

fn relayout(scene: &Scene, node: NodeId, layout: BoxLayout, leaving: Option<NodeId>) {
    let children = laid_out_children(scene, node, leaving);

    if let Some(align) = layout.align_items {
        let cross_key = match layout.axis {
            LayoutAxis::Horizontal => "size_flags_vertical",
            LayoutAxis::Vertical => "size_flags_horizontal",
        };
        let flags = i64::from(align.size_flags().bits());
        for child in &children {
            scene.set(*child, cross_key, flags);
        }
    }

    if layout.between {
        apply_justify_between(scene, node, &children, layout);
    }
}

fn apply_justify_between(scene: &Scene, node: NodeId, children: &[NodeId], layout: BoxLayout) {
    let size = scene.size(node).along(layout.axis);
    if size <= 0.0 {
        trace!(%node, "justify-between skipped for unsized box");
        return;
    }

    let visible: Vec<NodeId> = children
        .iter()
        .copied()
        .filter(|child| scene.get(*child, "visible").and_then(|v| v.as_bool()) != Some(false))
        .collect();
    let separation = between_separation(
        size,
        visible.iter().map(|child| scene.min_size(*child).along(layout.axis)),
        layout.base_gap,
    );
    scene.set_theme_constant(node, "separation", separation);
}

/// Separation that spreads `children` (minimum extents) across `size`.
///
/// `base + max(0, size - sum - base * (n - 1)) / (n - 1)`, or `base` when
/// there is at most one child.
fn between_separation(size: f32, children: impl Iterator<Item = f32>, base_gap: i64) -> i64 {
    let (total, count) = children.fold((0.0f32, 0i64), |(total, count), extent| {
        (total + extent, count + 1)
    });
    if count <= 1 {
        return base_gap;
    }
    let gaps = (count - 1) as f32;
    let remaining = (size - total - base_gap as f32 * gaps).max(0.0);
    (base_gap as f32 + remaining / gaps).round() as i64
}
