//! Core types for spark-bridge.
//!
//! These are the value types shared by the style compiler, the node proxies
//! and the native scene graph: colors, size flags and layout directives.

use bitflags::bitflags;

// =============================================================================
// Color
// =============================================================================

/// RGBA color with 8-bit channels (0-255).
///
/// Using integers for exact comparison - no floating point epsilon needed.
/// Alpha 255 = fully opaque, 0 = fully transparent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Create a new RGBA color.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque RGB color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Transparent color.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Check if color is fully opaque.
    #[inline]
    pub const fn is_opaque(&self) -> bool {
        self.a == 255
    }

    /// Check if color is fully transparent.
    #[inline]
    pub const fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Create from 0xRRGGBB integer format.
    ///
    /// # Examples
    ///
    /// ```
    /// use spark_bridge::types::Rgba;
    ///
    /// let slate = Rgba::from_rgb_int(0x64748b);
    /// assert_eq!(slate, Rgba::rgb(100, 116, 139));
    /// ```
    pub const fn from_rgb_int(rgb: u32) -> Self {
        Self::rgb(
            ((rgb >> 16) & 0xFF) as u8,
            ((rgb >> 8) & 0xFF) as u8,
            (rgb & 0xFF) as u8,
        )
    }

    /// Parse hex color string (#RGB, #RGBA, #RRGGBB, #RRGGBBAA).
    ///
    /// Short forms expand each digit; missing alpha means opaque.
    /// Returns None for invalid format.
    ///
    /// # Examples
    ///
    /// ```
    /// use spark_bridge::types::Rgba;
    ///
    /// let short = Rgba::from_hex("#abc").unwrap();
    /// let long = Rgba::from_hex("#aabbccff").unwrap();
    /// assert_eq!(short, long);
    ///
    /// let semi = Rgba::from_hex("#f008").unwrap();
    /// assert_eq!(semi, Rgba::new(255, 0, 0, 0x88));
    ///
    /// assert!(Rgba::from_hex("#gg0000").is_none());
    /// ```
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');

        fn hex_digit(c: u8) -> Option<u8> {
            match c {
                b'0'..=b'9' => Some(c - b'0'),
                b'a'..=b'f' => Some(c - b'a' + 10),
                b'A'..=b'F' => Some(c - b'A' + 10),
                _ => None,
            }
        }

        fn short(c: u8) -> Option<u8> {
            let d = hex_digit(c)?;
            Some((d << 4) | d)
        }

        fn byte(s: &[u8], i: usize) -> Option<u8> {
            let high = hex_digit(s[i])?;
            let low = hex_digit(s[i + 1])?;
            Some((high << 4) | low)
        }

        let bytes = hex.as_bytes();
        match bytes.len() {
            3 => Some(Self::rgb(short(bytes[0])?, short(bytes[1])?, short(bytes[2])?)),
            4 => Some(Self::new(
                short(bytes[0])?,
                short(bytes[1])?,
                short(bytes[2])?,
                short(bytes[3])?,
            )),
            6 => Some(Self::rgb(byte(bytes, 0)?, byte(bytes, 2)?, byte(bytes, 4)?)),
            8 => Some(Self::new(
                byte(bytes, 0)?,
                byte(bytes, 2)?,
                byte(bytes, 4)?,
                byte(bytes, 6)?,
            )),
            _ => None,
        }
    }

    /// Parse any supported color string: hex forms or the `white`, `black`
    /// and `transparent` keywords.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }
        match input.to_ascii_lowercase().as_str() {
            "white" => Some(Self::WHITE),
            "black" => Some(Self::BLACK),
            "transparent" => Some(Self::TRANSPARENT),
            _ => Self::from_hex(input),
        }
    }

    /// Normalized 8-digit form, `#RRGGBBAA` in upper case.
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
    }

    /// Compose a percentage (0-100, clamped) onto the alpha channel.
    ///
    /// The RGB channels are preserved; the resulting alpha is
    /// `round(a * pct / 100)`.
    pub fn with_alpha_percent(self, pct: f64) -> Self {
        let pct = pct.clamp(0.0, 100.0);
        Self {
            a: alpha_byte(self.a as f64 / 255.0 * pct),
            ..self
        }
    }
}

/// Convert a 0-100 percentage into an alpha byte with rounding and clamping.
///
/// ```
/// use spark_bridge::types::alpha_byte;
///
/// assert_eq!(alpha_byte(25.0), 64);
/// assert_eq!(alpha_byte(50.0), 128);
/// assert_eq!(alpha_byte(150.0), 255);
/// ```
pub fn alpha_byte(pct: f64) -> u8 {
    (pct / 100.0 * 255.0).round().clamp(0.0, 255.0) as u8
}

// =============================================================================
// Size Flags
// =============================================================================

bitflags! {
    /// Container sizing behavior of a native control along one axis.
    ///
    /// An empty set means "shrink to the beginning".
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SizeFlags: u8 {
        const FILL = 1 << 0;
        const EXPAND = 1 << 1;
        const SHRINK_CENTER = 1 << 2;
        const SHRINK_END = 1 << 3;

        const SHRINK_BEGIN = 0;
        const EXPAND_FILL = Self::FILL.bits() | Self::EXPAND.bits();
    }
}

// =============================================================================
// Layout Directives
// =============================================================================

/// Main-axis alignment of a box container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlignmentMode {
    #[default]
    Begin,
    Center,
    End,
}

impl From<i64> for AlignmentMode {
    fn from(value: i64) -> Self {
        match value {
            1 => Self::Center,
            2 => Self::End,
            _ => Self::Begin,
        }
    }
}

/// Main axis of a box container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutAxis {
    Horizontal,
    Vertical,
}

/// `justify-*` directive: how children are distributed along the main axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JustifyContent {
    Start,
    Center,
    End,
    Between,
}

impl JustifyContent {
    /// Parse the directive name produced by the style compiler.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "start" => Some(Self::Start),
            "center" => Some(Self::Center),
            "end" => Some(Self::End),
            "between" => Some(Self::Between),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Center => "center",
            Self::End => "end",
            Self::Between => "between",
        }
    }

    /// Native alignment used as the base for this directive.
    ///
    /// `Between` starts from `Begin` and is corrected by the layout helper.
    pub fn alignment(&self) -> AlignmentMode {
        match self {
            Self::Start | Self::Between => AlignmentMode::Begin,
            Self::Center => AlignmentMode::Center,
            Self::End => AlignmentMode::End,
        }
    }
}

/// `items-*` directive: cross-axis placement of children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignItems {
    Start,
    Center,
    End,
    Stretch,
}

impl AlignItems {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "start" => Some(Self::Start),
            "center" => Some(Self::Center),
            "end" => Some(Self::End),
            "stretch" => Some(Self::Stretch),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Center => "center",
            Self::End => "end",
            Self::Stretch => "stretch",
        }
    }

    /// Cross-axis size flags applied to every child.
    pub fn size_flags(&self) -> SizeFlags {
        match self {
            Self::Start => SizeFlags::SHRINK_BEGIN,
            Self::Center => SizeFlags::SHRINK_CENTER,
            Self::End => SizeFlags::SHRINK_END,
            Self::Stretch => SizeFlags::FILL,
        }
    }
}

// =============================================================================
// Geometry
// =============================================================================

/// Two-component vector used for sizes and positions.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Component along the given axis.
    pub fn along(&self, axis: LayoutAxis) -> f32 {
        match axis {
            LayoutAxis::Horizontal => self.x,
            LayoutAxis::Vertical => self.y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Rgba::from_hex tests
    // =========================================================================

    #[test]
    fn test_rgba_from_hex_all_lengths() {
        assert_eq!(Rgba::from_hex("#f00"), Some(Rgba::rgb(255, 0, 0)));
        assert_eq!(Rgba::from_hex("#f008"), Some(Rgba::new(255, 0, 0, 0x88)));
        assert_eq!(Rgba::from_hex("#ff0000"), Some(Rgba::rgb(255, 0, 0)));
        assert_eq!(Rgba::from_hex("#ff000080"), Some(Rgba::new(255, 0, 0, 128)));
    }

    #[test]
    fn test_rgba_short_form_matches_long_form() {
        let short = Rgba::from_hex("#abc").unwrap();
        let long = Rgba::from_hex("#aabbccff").unwrap();
        assert_eq!(short, long);
        assert_eq!(short.to_hex(), "#AABBCCFF");
    }

    #[test]
    fn test_rgba_from_hex_invalid() {
        assert!(Rgba::from_hex("#gg0000").is_none());
        assert!(Rgba::from_hex("#ff").is_none());
        assert!(Rgba::from_hex("#fffff").is_none());
        assert!(Rgba::from_hex("#fffffff").is_none());
        assert!(Rgba::from_hex("").is_none());
    }

    #[test]
    fn test_rgba_parse_keywords() {
        assert_eq!(Rgba::parse("white"), Some(Rgba::WHITE));
        assert_eq!(Rgba::parse("Transparent"), Some(Rgba::TRANSPARENT));
        assert_eq!(Rgba::parse("#000"), Some(Rgba::BLACK));
        assert!(Rgba::parse("red").is_none());
    }

    // =========================================================================
    // Alpha composition
    // =========================================================================

    #[test]
    fn test_alpha_byte_rounding() {
        assert_eq!(alpha_byte(0.0), 0);
        assert_eq!(alpha_byte(25.0), 64);
        assert_eq!(alpha_byte(50.0), 128);
        assert_eq!(alpha_byte(100.0), 255);
        assert_eq!(alpha_byte(-10.0), 0);
    }

    #[test]
    fn test_with_alpha_percent_preserves_rgb() {
        let base = Rgba::from_rgb_int(0x64748b);
        let half = base.with_alpha_percent(50.0);
        assert_eq!((half.r, half.g, half.b), (base.r, base.g, base.b));
        assert_eq!(half.a, 0x80);
    }

    #[test]
    fn test_with_alpha_percent_composes_existing_alpha() {
        let base = Rgba::new(10, 20, 30, 128);
        assert_eq!(base.with_alpha_percent(50.0).a, 64);
        assert_eq!(base.with_alpha_percent(200.0).a, 128);
    }

    // =========================================================================
    // Directives
    // =========================================================================

    #[test]
    fn test_directive_parsing() {
        assert_eq!(JustifyContent::parse("between"), Some(JustifyContent::Between));
        assert_eq!(JustifyContent::Between.alignment(), AlignmentMode::Begin);
        assert_eq!(AlignItems::parse("center").map(|a| a.size_flags()), Some(SizeFlags::SHRINK_CENTER));
        assert!(AlignItems::parse("baseline").is_none());
    }

    #[test]
    fn test_size_flags_expand_fill() {
        assert_eq!(SizeFlags::EXPAND_FILL.bits(), 3);
        assert!(SizeFlags::EXPAND_FILL.contains(SizeFlags::FILL));
    }
}
