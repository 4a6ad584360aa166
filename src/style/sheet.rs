//! Memoized style sheet shared by every node of a document.
//!
//! Lookup order for a class token:
//!
//! 1. the sheet itself (initial entries, then everything memoized so far)
//! 2. the token compiler
//! 3. an optional custom resolver
//!
//! A successful lookup from (2) or (3) is written back, so each distinct
//! token is compiled at most once and repeat lookups return the same `Rc`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::props::{PropValue, StyleObject};

use super::token::Compiler;

/// Custom class resolver consulted after the compiler.
pub type ClassResolver = Rc<dyn Fn(&str) -> Option<StyleObject>>;

struct SheetInner {
    classes: HashMap<String, Rc<StyleObject>>,
    compiler: Compiler,
    resolver: Option<ClassResolver>,
}

/// Shared, memoizing class → style lookup. Cloning shares the sheet.
#[derive(Clone)]
pub struct StyleSheet {
    inner: Rc<RefCell<SheetInner>>,
}

impl Default for StyleSheet {
    fn default() -> Self {
        Self::new(Compiler::default())
    }
}

impl fmt::Debug for StyleSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("StyleSheet")
            .field("classes", &inner.classes.len())
            .field("compiler", &inner.compiler)
            .field("resolver", &inner.resolver.is_some())
            .finish()
    }
}

impl StyleSheet {
    pub fn new(compiler: Compiler) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SheetInner {
                classes: HashMap::new(),
                compiler,
                resolver: None,
            })),
        }
    }

    /// Sheet pre-seeded with entries. Initial entries win over the compiler.
    pub fn with_initial<I>(compiler: Compiler, initial: I) -> Self
    where
        I: IntoIterator<Item = (String, StyleObject)>,
    {
        let sheet = Self::new(compiler);
        {
            let mut inner = sheet.inner.borrow_mut();
            for (class, style) in initial {
                inner.classes.insert(class, Rc::new(style));
            }
        }
        sheet
    }

    /// Install (or clear) the custom resolver.
    pub fn set_resolver(&self, resolver: Option<ClassResolver>) {
        self.inner.borrow_mut().resolver = resolver;
    }

    /// Add or replace a sheet entry.
    pub fn insert(&self, class: impl Into<String>, style: StyleObject) {
        self.inner
            .borrow_mut()
            .classes
            .insert(class.into(), Rc::new(style));
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, class: &str) -> bool {
        self.inner.borrow().classes.contains_key(class)
    }

    /// Resolve one class token.
    ///
    /// ```
    /// use spark_bridge::style::StyleSheet;
    /// use std::rc::Rc;
    ///
    /// let sheet = StyleSheet::default();
    /// let first = sheet.resolve("p-4").unwrap();
    /// let again = sheet.resolve("p-4").unwrap();
    /// assert!(Rc::ptr_eq(&first, &again));
    /// assert!(sheet.resolve("not-a-class").is_none());
    /// ```
    pub fn resolve(&self, class: &str) -> Option<Rc<StyleObject>> {
        let (compiler, resolver) = {
            let inner = self.inner.borrow();
            if let Some(style) = inner.classes.get(class) {
                return Some(Rc::clone(style));
            }
            (inner.compiler, inner.resolver.clone())
        };

        // The borrow is released before calling out; a resolver may consult
        // the sheet itself.
        let style = compiler
            .compile(class)
            .or_else(|| resolver.and_then(|resolve| resolve(class)))?;

        let style = Rc::new(style);
        self.inner
            .borrow_mut()
            .classes
            .insert(class.to_string(), Rc::clone(&style));
        Some(style)
    }

    /// Merge every class of a whitespace-separated class string, left to
    /// right. Later classes override earlier keys; unknown classes are
    /// skipped.
    pub fn class_style(&self, classes: &str) -> StyleObject {
        let mut merged = StyleObject::new();
        for class in classes.split_whitespace() {
            match self.resolve(class) {
                Some(style) => {
                    for (key, value) in style.iter() {
                        merged.insert(key.clone(), value.clone());
                    }
                }
                None => debug!(class, "unknown style class skipped"),
            }
        }
        merged
    }

    /// Resolver callable handed to hosts that look up classes themselves.
    pub fn resolver_fn(&self) -> impl Fn(&str) -> Option<Rc<StyleObject>> + 'static {
        let sheet = self.clone();
        move |class| sheet.resolve(class)
    }
}

/// Effective style of a node: class styles merged left to right, then the
/// inline `style` mapping on top.
pub fn effective_style(sheet: &StyleSheet, class: Option<&str>, inline: Option<&PropValue>) -> StyleObject {
    let mut style = class.map(|c| sheet.class_style(c)).unwrap_or_default();
    if let Some(inline) = inline.and_then(PropValue::as_map) {
        for (key, value) in inline {
            style.insert(key.clone(), value.clone());
        }
    }
    style
}
