//! Relative naming of type references.
//!
//! Declarations are emitted nested inside their namespaces, so a reference to
//! `Ember.Foo` written inside `namespace Ember { ... }` can be shortened to
//! `Foo`. Shortening must never produce a name that TypeScript would resolve
//! to a built-in instead.

use crate::context::Context;
use crate::types::{ALIASES, NameScope, is_promise_like};

/// Shortest reference to `name` that resolves correctly when written inside
/// the declaration of `base` (a full dotted class name).
pub fn relative_name(ctx: &Context, name: &str, base: &str) -> String {
    let mut name = name.to_string();

    // Repair references to a class by its local name.
    if !is_builtin(&name) && name.starts_with(|c: char| c.is_ascii_uppercase()) {
        for prefix in prefixes(base) {
            if let Some(id) = ctx.find_class(&format!("{}.{}", prefix, name)) {
                name = ctx.class(id).full_name.clone();
                break;
            }
        }
    }

    if let Some(absolute) = ctx.config().absolute_names.get(&name) {
        return absolute.clone();
    }

    for prefix in prefixes(base) {
        if let Some(stripped) = name
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix('.'))
        {
            if is_builtin(stripped) {
                return name;
            }
            return stripped.to_string();
        }
    }
    name
}

/// `A.B.C` yields `A.B.C`, `A.B`, `A`.
fn prefixes(base: &str) -> impl Iterator<Item = &str> {
    let mut next = (!base.is_empty()).then_some(base);
    std::iter::from_fn(move || {
        let current = next?;
        next = current.rsplit_once('.').map(|(head, _)| head);
        Some(current)
    })
}

/// Names TypeScript (or the alias table) already gives a meaning to.
pub fn is_builtin(name: &str) -> bool {
    ALIASES.contains(&name)
        || is_promise_like(name)
        || matches!(
            name,
            "Function"
                | "Error"
                | "Date"
                | "RegExp"
                | "Map"
                | "Set"
                | "WeakMap"
                | "Symbol"
                | "JSON"
                | "Math"
                | "Element"
                | "HTMLElement"
                | "Event"
                | "Window"
                | "Document"
                | "never"
                | "unknown"
                | "this"
        )
}

/// A [`NameScope`] that relativizes against one referencing class.
pub struct RelativeNamer<'a> {
    ctx: &'a Context,
    base: &'a str,
}

impl<'a> RelativeNamer<'a> {
    pub fn new(ctx: &'a Context, base: &'a str) -> Self {
        Self { ctx, base }
    }
}

impl NameScope for RelativeNamer<'_> {
    fn relativize(&self, name: &str) -> String {
        relative_name(self.ctx, name, self.base)
    }
}
