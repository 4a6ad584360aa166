//! Prop values - the dynamic data carried by virtual nodes.
//!
//! A prop set is a flat, insertion-ordered mapping of prop name to
//! [`PropValue`]. Values are primitives, nested mappings (usually the inline
//! `style` object), lists (text children), callbacks or opaque native
//! resources.
//!
//! Nested mappings and lists live behind `Rc`, so "the same object" is
//! observable with [`PropValue::same`]. That is the equality the diff engine
//! uses below the first level.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::types::{Rgba, SizeFlags};

/// Flat prop (or style) mapping, in insertion order.
pub type PropMap = IndexMap<String, PropValue>;

/// A committed prop set. Shared so identity between two sets is cheap to test.
pub type Props = Rc<PropMap>;

/// Resolved style mapping (style property name → value).
pub type StyleObject = PropMap;

// =============================================================================
// Callback
// =============================================================================

/// A callback reference passed down as a prop (e.g. `onClick`).
///
/// Equality is identity: two callbacks are the same only if they share the
/// same allocation.
#[derive(Clone)]
pub struct Callback(Rc<dyn Fn(&[PropValue])>);

impl Callback {
    pub fn new(f: impl Fn(&[PropValue]) + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Invoke the callback with positional arguments.
    pub fn call(&self, args: &[PropValue]) {
        (self.0)(args)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

// =============================================================================
// Resource
// =============================================================================

/// Opaque native resource (a style box, a texture, ...).
///
/// Never compared structurally; two resources are equal only if they are
/// the same instance.
#[derive(Clone)]
pub struct Resource(Rc<dyn Any>);

impl Resource {
    pub fn new<T: Any>(value: T) -> Self {
        Self(Rc::new(value))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Resource {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Resource({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

// =============================================================================
// Prop Value
// =============================================================================

/// A single prop value.
#[derive(Clone, Debug, Default)]
pub enum PropValue {
    /// Absent / explicitly unset.
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    Color(Rgba),
    /// Plain structured mapping (e.g. an inline style object).
    Map(Rc<PropMap>),
    /// Plain list (e.g. mixed text children).
    List(Rc<Vec<PropValue>>),
    Callback(Callback),
    Resource(Resource),
}

impl PropValue {
    /// Reference-style equality.
    ///
    /// Primitives compare by value (NaN equals NaN); maps, lists, callbacks
    /// and resources compare by identity.
    pub fn same(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Color(a), Self::Color(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => Rc::ptr_eq(a, b),
            (Self::List(a), Self::List(b)) => Rc::ptr_eq(a, b),
            (Self::Callback(a), Self::Callback(b)) => a.ptr_eq(b),
            (Self::Resource(a), Self::Resource(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// One-level structural equality.
    ///
    /// Maps and lists compare entry by entry with [`same`](Self::same);
    /// everything else falls back to [`same`](Self::same).
    pub fn shallow_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Map(a), Self::Map(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).is_some_and(|other| v.same(other)))
            }
            (Self::List(a), Self::List(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.same(y))
            }
            _ => self.same(other),
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// True for mappings and lists (values the diff compares shallowly).
    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Map(_) | Self::List(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Number(n) => Some(*n != 0.0),
            _ => None,
        }
    }

    /// Numeric view. Finite numbers only; numeric strings are accepted.
    pub fn as_f64(&self) -> Option<f64> {
        let n = match self {
            Self::Number(n) => *n,
            Self::Bool(b) => f64::from(u8::from(*b)),
            Self::Str(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        n.is_finite().then_some(n)
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_f64().map(|n| n as i64)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Color view: colors directly, or strings in any form `Rgba::parse` takes.
    pub fn as_color(&self) -> Option<Rgba> {
        match self {
            Self::Color(c) => Some(*c),
            Self::Str(s) => Rgba::parse(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&PropMap> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_callback(&self) -> Option<&Callback> {
        match self {
            Self::Callback(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_resource(&self) -> Option<&Resource> {
        match self {
            Self::Resource(r) => Some(r),
            _ => None,
        }
    }

    /// Size flags encoded as a number (or given directly as flag bits).
    pub fn as_size_flags(&self) -> Option<SizeFlags> {
        let bits = self.as_i64()?;
        u8::try_from(bits).ok().map(SizeFlags::from_bits_truncate)
    }

    /// Text rendering of a text-like value.
    ///
    /// Strings and numbers render directly; a list renders when every entry
    /// is text-like. Anything else is not text.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::Str(s) => Some(s.clone()),
            Self::Number(n) => Some(format_number(*n)),
            Self::List(items) => items.iter().map(|item| match item {
                Self::Str(_) | Self::Number(_) => item.to_text(),
                _ => None,
            }).collect(),
            _ => None,
        }
    }

    /// True when the value is a string, a number, or a non-empty list of those.
    pub fn is_all_text(&self) -> bool {
        match self {
            Self::Str(_) | Self::Number(_) => true,
            Self::List(items) => {
                !items.is_empty()
                    && items.iter().all(|c| matches!(c, Self::Str(_) | Self::Number(_)))
            }
            _ => false,
        }
    }

    /// Convert a JSON value (configuration, initial style sheets).
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => n.as_f64().map(Self::Number).unwrap_or(Self::Null),
            Value::String(s) => Self::Str(s.clone()),
            Value::Array(items) => Self::List(Rc::new(items.iter().map(Self::from_json).collect())),
            Value::Object(map) => Self::Map(Rc::new(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from_json(v)))
                    .collect(),
            )),
        }
    }
}

/// Integers render without a fractional part (`3`, not `3.0`).
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<f32> for PropValue {
    fn from(value: f32) -> Self {
        Self::Number(value as f64)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        Self::Number(value as f64)
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Rgba> for PropValue {
    fn from(value: Rgba) -> Self {
        Self::Color(value)
    }
}

impl From<SizeFlags> for PropValue {
    fn from(value: SizeFlags) -> Self {
        Self::Number(value.bits() as f64)
    }
}

impl From<PropMap> for PropValue {
    fn from(value: PropMap) -> Self {
        Self::Map(Rc::new(value))
    }
}

impl From<Rc<PropMap>> for PropValue {
    fn from(value: Rc<PropMap>) -> Self {
        Self::Map(value)
    }
}

impl From<Vec<PropValue>> for PropValue {
    fn from(value: Vec<PropValue>) -> Self {
        Self::List(Rc::new(value))
    }
}

impl From<Callback> for PropValue {
    fn from(value: Callback) -> Self {
        Self::Callback(value)
    }
}

impl From<Resource> for PropValue {
    fn from(value: Resource) -> Self {
        Self::Resource(value)
    }
}

/// Build a [`PropMap`] from `key => value` pairs.
///
/// ```
/// use spark_bridge::prop_map;
///
/// let style = prop_map! { "minWidth" => 16, "visible" => true };
/// assert_eq!(style.len(), 2);
/// ```
#[macro_export]
macro_rules! prop_map {
    () => { $crate::props::PropMap::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::props::PropMap::new();
        $( map.insert(::std::string::String::from($key), $crate::props::PropValue::from($value)); )+
        map
    }};
}

/// Build shared [`Props`] from `key => value` pairs.
#[macro_export]
macro_rules! props {
    ($($tt:tt)*) => { ::std::rc::Rc::new($crate::prop_map!($($tt)*)) };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_same_is_identity_for_maps() {
        let a: PropValue = prop_map! { "x" => 1 }.into();
        let b: PropValue = prop_map! { "x" => 1 }.into();
        assert!(a.same(&a.clone()));
        assert!(!a.same(&b));
        assert!(a.shallow_eq(&b));
    }

    #[test]
    fn test_nan_numbers_are_same() {
        let nan = PropValue::Number(f64::NAN);
        assert!(nan.same(&PropValue::Number(f64::NAN)));
        assert!(!nan.same(&PropValue::Number(0.0)));
        assert!(PropValue::Number(0.0).same(&PropValue::Number(-0.0)));
    }

    #[test]
    fn test_shallow_eq_stops_at_one_level() {
        let inner: PropValue = prop_map! { "y" => 2 }.into();
        let a: PropValue = prop_map! { "nested" => inner.clone() }.into();
        let b: PropValue = prop_map! { "nested" => inner }.into();
        let c: PropValue = prop_map! { "nested" => prop_map! { "y" => 2 } }.into();
        assert!(a.shallow_eq(&b));
        assert!(!a.shallow_eq(&c));
    }

    #[test]
    fn test_callback_identity() {
        let cb = Callback::new(|_| {});
        let same = PropValue::Callback(cb.clone());
        let other = PropValue::Callback(Callback::new(|_| {}));
        assert!(PropValue::Callback(cb).same(&same));
        assert!(!same.same(&other));
    }

    #[test]
    fn test_to_text() {
        assert_eq!(PropValue::from("hi").to_text().as_deref(), Some("hi"));
        assert_eq!(PropValue::from(3).to_text().as_deref(), Some("3"));
        assert_eq!(PropValue::from(2.5).to_text().as_deref(), Some("2.5"));
        let mixed = PropValue::from(vec![PropValue::from("HP: "), PropValue::from(40)]);
        assert_eq!(mixed.to_text().as_deref(), Some("HP: 40"));
        assert!(PropValue::Bool(true).to_text().is_none());
    }

    #[test]
    fn test_is_all_text() {
        assert!(PropValue::from("a").is_all_text());
        assert!(!PropValue::from(Vec::new()).is_all_text());
        let with_cb = PropValue::from(vec![PropValue::from("a"), Callback::new(|_| {}).into()]);
        assert!(!with_cb.is_all_text());
    }

    #[test]
    fn test_numeric_views() {
        assert_eq!(PropValue::from("12").as_f64(), Some(12.0));
        assert_eq!(PropValue::Number(f64::NAN).as_f64(), None);
        assert_eq!(PropValue::from(3).as_size_flags(), Some(SizeFlags::EXPAND_FILL));
    }

    #[test]
    fn test_from_json() {
        let value = PropValue::from_json(&json!({ "bgColor": "#fff", "minWidth": 8 }));
        let map = value.as_map().unwrap();
        assert_eq!(map["bgColor"].as_color(), Some(Rgba::WHITE));
        assert_eq!(map["minWidth"].as_f64(), Some(8.0));
    }
}
