//! Utility-class token compiler.
//!
//! Turns one class token (`p-4`, `bg-slate-500/50`, `justify-between`) into a
//! [`StyleObject`] fragment, or `None` when the token is not recognized.
//! Malformed tokens (bad numbers, unknown palette entries, wrong arity) are
//! simply "not recognized"; the compiler never fails.
//!
//! # Token families
//!
//! | Tokens | Style keys |
//! |---|---|
//! | `hidden`, `block`/`flex`/`inline` | `visible` |
//! | `opacity-N` | `modulate` (white with alpha `round(N% * 255)`) |
//! | `text-{xs..9xl}`, `text-<color>` | `fontSize`, `fontColor` |
//! | `bg-<color>` | `bgColor` |
//! | `rounded[-*]` | `cornerRadius` |
//! | `border[-N]`, `border-<color>` | `borderWidth`, `borderColor` |
//! | `p-`, `px-`, `py-`, `pt-`, `pr-`, `pb-`, `pl-` | `padding*` |
//! | `m-`, `mx-`, `my-`, `mt-`, `mr-`, `mb-`, `ml-` | `margin*` |
//! | `gap-N` | `separation`, `hSeparation`, `vSeparation` |
//! | `z-N`, `-z-N` | `zIndex` |
//! | `justify-*`, `items-*` | `justifyContent`, `alignItems` directives |
//! | `w-full`, `h-full` | expand-fill flag plus full anchors |
//! | `w-a/b`, `h-a/b` | `stretchRatio` plus expand-fill flag |
//! | `w-N`, `h-N`, `size-N` | `minWidth`, `minHeight` |
//!
//! Colors take an optional `/<alpha-percent>` modifier.

use crate::props::{PropValue, StyleObject};
use crate::types::{AlignItems, JustifyContent, Rgba, SizeFlags, alpha_byte};

use super::palette::resolve_color;

/// Default pixels per spacing step.
pub const DEFAULT_SPACING_SCALE: f64 = 4.0;

const TEXT_SIZES: [(&str, f64); 13] = [
    ("xs", 12.0),
    ("sm", 14.0),
    ("base", 16.0),
    ("lg", 18.0),
    ("xl", 20.0),
    ("2xl", 24.0),
    ("3xl", 30.0),
    ("4xl", 36.0),
    ("5xl", 48.0),
    ("6xl", 60.0),
    ("7xl", 72.0),
    ("8xl", 96.0),
    ("9xl", 128.0),
];

const RADII: [(&str, f64); 8] = [
    ("none", 0.0),
    ("sm", 2.0),
    ("md", 6.0),
    ("lg", 8.0),
    ("xl", 12.0),
    ("2xl", 16.0),
    ("3xl", 24.0),
    ("full", 9999.0),
];

const PADDING: [(&str, &[&str]); 7] = [
    ("p-", &["padding"]),
    ("px-", &["paddingLeft", "paddingRight"]),
    ("py-", &["paddingTop", "paddingBottom"]),
    ("pt-", &["paddingTop"]),
    ("pr-", &["paddingRight"]),
    ("pb-", &["paddingBottom"]),
    ("pl-", &["paddingLeft"]),
];

const MARGIN: [(&str, &[&str]); 7] = [
    ("m-", &["margin"]),
    ("mx-", &["marginLeft", "marginRight"]),
    ("my-", &["marginTop", "marginBottom"]),
    ("mt-", &["marginTop"]),
    ("mr-", &["marginRight"]),
    ("mb-", &["marginBottom"]),
    ("ml-", &["marginLeft"]),
];

// =============================================================================
// Compiler
// =============================================================================

/// Token compiler with a configurable spacing scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Compiler {
    spacing_scale: f64,
}

impl Default for Compiler {
    fn default() -> Self {
        Self {
            spacing_scale: DEFAULT_SPACING_SCALE,
        }
    }
}

impl Compiler {
    pub fn new(spacing_scale: f64) -> Self {
        if spacing_scale.is_finite() && spacing_scale > 0.0 {
            Self { spacing_scale }
        } else {
            Self::default()
        }
    }

    pub fn spacing_scale(&self) -> f64 {
        self.spacing_scale
    }

    /// Compile one token. `None` means "not recognized".
    pub fn compile(&self, token: &str) -> Option<StyleObject> {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }

        match token {
            "hidden" => return Some(single("visible", false)),
            "block" | "flex" | "inline" => return Some(single("visible", true)),
            "w-full" => return Some(full_axis(Axis::Width)),
            "h-full" => return Some(full_axis(Axis::Height)),
            "rounded" => return Some(single("cornerRadius", 4.0)),
            "border" => return Some(single("borderWidth", 1.0)),
            _ => {}
        }

        if let Some(raw) = token.strip_prefix("opacity-") {
            let pct = parse_number(raw)?.clamp(0.0, 100.0);
            return Some(single("modulate", Rgba::new(255, 255, 255, alpha_byte(pct))));
        }

        if let Some(rest) = token.strip_prefix("text-") {
            if let Some((_, size)) = TEXT_SIZES.iter().find(|(name, _)| *name == rest) {
                return Some(single("fontSize", *size));
            }
            return parse_color(rest).map(|c| single("fontColor", c));
        }

        if let Some(rest) = token.strip_prefix("bg-") {
            return parse_color(rest).map(|c| single("bgColor", c));
        }

        if let Some(rest) = token.strip_prefix("rounded-") {
            let radius = match RADII.iter().find(|(name, _)| *name == rest) {
                Some((_, r)) => *r,
                None => parse_bracket_px(rest)?,
            };
            return Some(single("cornerRadius", radius));
        }

        if let Some(rest) = token.strip_prefix("border-") {
            if let Some(width) = parse_bracket_px(rest).or_else(|| parse_count(rest)) {
                return Some(single("borderWidth", width));
            }
            return parse_color(rest).map(|c| single("borderColor", c));
        }

        for (prefix, keys) in PADDING.iter().chain(MARGIN.iter()) {
            if let Some(rest) = token.strip_prefix(prefix) {
                let px = self.spacing(rest)?;
                return Some(keys.iter().map(|k| (k.to_string(), PropValue::from(px))).collect());
            }
        }

        if let Some(rest) = token.strip_prefix("gap-") {
            let px = self.spacing(rest)?;
            let mut style = StyleObject::new();
            style.insert("separation".into(), px.into());
            style.insert("hSeparation".into(), px.into());
            style.insert("vSeparation".into(), px.into());
            return Some(style);
        }

        if let Some(rest) = token.strip_prefix("-z-") {
            return parse_count(rest).map(|z| single("zIndex", -z));
        }
        if let Some(rest) = token.strip_prefix("z-") {
            return parse_count(rest).map(|z| single("zIndex", z));
        }

        if let Some(rest) = token.strip_prefix("justify-") {
            let directive = JustifyContent::parse(rest)?;
            return Some(single("justifyContent", directive.as_str()));
        }
        if let Some(rest) = token.strip_prefix("items-") {
            let directive = AlignItems::parse(rest)?;
            return Some(single("alignItems", directive.as_str()));
        }

        if let Some(rest) = token.strip_prefix("size-") {
            let px = self.spacing(rest)?;
            let mut style = StyleObject::new();
            style.insert("minWidth".into(), px.into());
            style.insert("minHeight".into(), px.into());
            return Some(style);
        }
        if let Some(rest) = token.strip_prefix("w-") {
            return self.sizing(rest, Axis::Width);
        }
        if let Some(rest) = token.strip_prefix("h-") {
            return self.sizing(rest, Axis::Height);
        }

        None
    }

    /// Spacing value: `px`, `[Npx]`, or a step count on the spacing scale.
    fn spacing(&self, raw: &str) -> Option<f64> {
        if raw == "px" {
            return Some(1.0);
        }
        if let Some(px) = parse_bracket_px(raw) {
            return Some(px);
        }
        let steps = parse_number(raw)?;
        (steps >= 0.0).then_some(steps * self.spacing_scale)
    }

    fn sizing(&self, raw: &str, axis: Axis) -> Option<StyleObject> {
        if let Some((num, den)) = raw.split_once('/') {
            let num = parse_number(num)?;
            let den = parse_number(den)?;
            if den == 0.0 || num < 0.0 {
                return None;
            }
            let mut style = StyleObject::new();
            style.insert("stretchRatio".into(), (num / den).into());
            style.insert(axis.expand_key().into(), SizeFlags::EXPAND_FILL.into());
            return Some(style);
        }
        let px = self.spacing(raw)?;
        Some(single(axis.min_key(), px))
    }
}

/// Compile a token with the default spacing scale.
///
/// ```
/// use spark_bridge::style::compile_class_token;
///
/// let gap = compile_class_token("gap-4").unwrap();
/// assert_eq!(gap["separation"].as_f64(), Some(16.0));
///
/// assert!(compile_class_token("gap-x").is_none());
/// ```
pub fn compile_class_token(token: &str) -> Option<StyleObject> {
    Compiler::default().compile(token)
}

// =============================================================================
// Helpers
// =============================================================================

#[derive(Clone, Copy)]
enum Axis {
    Width,
    Height,
}

impl Axis {
    fn min_key(self) -> &'static str {
        match self {
            Self::Width => "minWidth",
            Self::Height => "minHeight",
        }
    }

    fn expand_key(self) -> &'static str {
        match self {
            Self::Width => "expandBehaviorH",
            Self::Height => "expandBehaviorV",
        }
    }
}

fn single(key: &str, value: impl Into<PropValue>) -> StyleObject {
    let mut style = StyleObject::new();
    style.insert(key.to_string(), value.into());
    style
}

fn full_axis(axis: Axis) -> StyleObject {
    let (start, end) = match axis {
        Axis::Width => ("Left", "Right"),
        Axis::Height => ("Top", "Bottom"),
    };
    let mut style = StyleObject::new();
    style.insert(axis.expand_key().into(), SizeFlags::EXPAND_FILL.into());
    style.insert(format!("anchor{start}"), 0.0.into());
    style.insert(format!("anchor{end}"), 1.0.into());
    style.insert(format!("offset{start}"), 0.0.into());
    style.insert(format!("offset{end}"), 0.0.into());
    style
}

/// Finite decimal number. Rejects `inf`, `NaN` and empty input.
fn parse_number(raw: &str) -> Option<f64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        return None;
    }
    raw.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Whole, non-negative count (border widths, z-index).
fn parse_count(raw: &str) -> Option<f64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse::<u32>().ok().map(f64::from)
}

/// Arbitrary-pixel escape `[<number>px]`.
fn parse_bracket_px(raw: &str) -> Option<f64> {
    let inner = raw.strip_prefix('[')?.strip_suffix(']')?;
    parse_number(inner.strip_suffix("px")?)
}

/// Color token with optional `/<alpha-percent>` modifier.
fn parse_color(raw: &str) -> Option<Rgba> {
    match raw.rsplit_once('/') {
        Some((base, alpha)) => {
            let pct = parse_number(alpha)?;
            Some(resolve_color(base)?.with_alpha_percent(pct))
        }
        None => resolve_color(raw),
    }
}
