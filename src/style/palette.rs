//! Named color palette for color tokens (`bg-slate-500`, `text-yellow-300`).
//!
//! Families are keyed by name, shades by the usual 50..950 scale.

use crate::types::Rgba;

const SHADES: [&str; 11] = [
    "50", "100", "200", "300", "400", "500", "600", "700", "800", "900", "950",
];

// =============================================================================
// Families
// =============================================================================

const SLATE: [u32; 11] = [
    0xf8fafc, 0xf1f5f9, 0xe2e8f0, 0xcbd5e1, 0x94a3b8, 0x64748b, 0x475569, 0x334155, 0x1e293b,
    0x0f172a, 0x020617,
];

const GRAY: [u32; 11] = [
    0xf9fafb, 0xf3f4f6, 0xe5e7eb, 0xd1d5db, 0x9ca3af, 0x6b7280, 0x4b5563, 0x374151, 0x1f2937,
    0x111827, 0x030712,
];

const ZINC: [u32; 11] = [
    0xfafafa, 0xf4f4f5, 0xe4e4e7, 0xd4d4d8, 0xa1a1aa, 0x71717a, 0x52525b, 0x3f3f46, 0x27272a,
    0x18181b, 0x09090b,
];

const RED: [u32; 11] = [
    0xfef2f2, 0xfee2e2, 0xfecaca, 0xfca5a5, 0xf87171, 0xef4444, 0xdc2626, 0xb91c1c, 0x991b1b,
    0x7f1d1d, 0x450a0a,
];

const AMBER: [u32; 11] = [
    0xfffbeb, 0xfef3c7, 0xfde68a, 0xfcd34d, 0xfbbf24, 0xf59e0b, 0xd97706, 0xb45309, 0x92400e,
    0x78350f, 0x451a03,
];

const YELLOW: [u32; 11] = [
    0xfefce8, 0xfef9c3, 0xfef08a, 0xfde047, 0xfacc15, 0xeab308, 0xca8a04, 0xa16207, 0x854d0e,
    0x713f12, 0x422006,
];

const GREEN: [u32; 11] = [
    0xf0fdf4, 0xdcfce7, 0xbbf7d0, 0x86efac, 0x4ade80, 0x22c55e, 0x16a34a, 0x15803d, 0x166534,
    0x14532d, 0x052e16,
];

const SKY: [u32; 11] = [
    0xf0f9ff, 0xe0f2fe, 0xbae6fd, 0x7dd3fc, 0x38bdf8, 0x0ea5e9, 0x0284c7, 0x0369a1, 0x075985,
    0x0c4a6e, 0x082f49,
];

const BLUE: [u32; 11] = [
    0xeff6ff, 0xdbeafe, 0xbfdbfe, 0x93c5fd, 0x60a5fa, 0x3b82f6, 0x2563eb, 0x1d4ed8, 0x1e40af,
    0x1e3a8a, 0x172554,
];

const VIOLET: [u32; 11] = [
    0xf5f3ff, 0xede9fe, 0xddd6fe, 0xc4b5fd, 0xa78bfa, 0x8b5cf6, 0x7c3aed, 0x6d28d9, 0x5b21b6,
    0x4c1d95, 0x2e1065,
];

const FAMILIES: [(&str, &[u32; 11]); 10] = [
    ("slate", &SLATE),
    ("gray", &GRAY),
    ("zinc", &ZINC),
    ("red", &RED),
    ("amber", &AMBER),
    ("yellow", &YELLOW),
    ("green", &GREEN),
    ("sky", &SKY),
    ("blue", &BLUE),
    ("violet", &VIOLET),
];

/// Look up a palette entry by family name and shade.
///
/// ```
/// use spark_bridge::style::palette_color;
/// use spark_bridge::types::Rgba;
///
/// assert_eq!(palette_color("slate", "500"), Some(Rgba::from_rgb_int(0x64748b)));
/// assert_eq!(palette_color("slate", "550"), None);
/// assert_eq!(palette_color("mauve", "500"), None);
/// ```
pub fn palette_color(name: &str, shade: &str) -> Option<Rgba> {
    let (_, family) = FAMILIES.iter().find(|(family, _)| *family == name)?;
    let index = SHADES.iter().position(|s| *s == shade)?;
    Some(Rgba::from_rgb_int(family[index]))
}

/// Resolve a bare color token (no alpha modifier).
///
/// Accepts `white`, `black`, `transparent`, a palette `name-shade` pair, or
/// the bracketed hex escape `[#RGB]`, `[#RGBA]`, `[#RRGGBB]`, `[#RRGGBBAA]`.
pub fn resolve_color(token: &str) -> Option<Rgba> {
    match token {
        "" => return None,
        "white" => return Some(Rgba::WHITE),
        "black" => return Some(Rgba::BLACK),
        "transparent" => return Some(Rgba::TRANSPARENT),
        _ => {}
    }

    if let Some(inner) = token.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        if !inner.starts_with('#') {
            return None;
        }
        return Rgba::from_hex(inner);
    }

    let (name, shade) = token.rsplit_once('-')?;
    palette_color(name, shade)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords() {
        assert_eq!(resolve_color("white"), Some(Rgba::WHITE));
        assert_eq!(resolve_color("transparent"), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn test_palette_lookup() {
        assert_eq!(resolve_color("yellow-400"), Some(Rgba::from_rgb_int(0xfacc15)));
        assert_eq!(resolve_color("slate-950"), Some(Rgba::from_rgb_int(0x020617)));
    }

    #[test]
    fn test_unknown_names_and_shades() {
        assert!(resolve_color("red").is_none());
        assert!(resolve_color("crimson-500").is_none());
        assert!(resolve_color("slate-").is_none());
        assert!(resolve_color("slate-501").is_none());
    }

    #[test]
    fn test_bracketed_hex() {
        assert_eq!(resolve_color("[#abc]"), resolve_color("[#aabbccff]"));
        assert_eq!(resolve_color("[#0008]"), Some(Rgba::new(0, 0, 0, 0x88)));
        assert!(resolve_color("[abc]").is_none());
        assert!(resolve_color("[#abcde]").is_none());
    }
}
