//! Style - utility-class compiler and the memoized style sheet.
//!
//! - [`compile_class_token`] / [`Compiler`] - one token to a style fragment
//! - [`StyleSheet`] - shared cache with initial entries and a custom resolver
//! - [`palette_color`] / [`resolve_color`] - color tokens
//!
//! Style objects use a fixed vocabulary of keys (`padding`, `bgColor`,
//! `separation`, `justifyContent`, ...) that node proxies translate into
//! native properties.

mod palette;
mod sheet;
mod token;

pub use palette::{palette_color, resolve_color};
pub use sheet::{effective_style, ClassResolver, StyleSheet};
pub use token::{compile_class_token, Compiler, DEFAULT_SPACING_SCALE};
