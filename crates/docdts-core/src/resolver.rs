//! Inheritance and mixin resolution.
//!
//! TypeScript has no mixins, so every class ends up with a flattened member
//! set: public members of its `extends` parent and of every `uses` mixin are
//! copied in and attributed to the class itself.
//!
//! Each class moves through [`ResolveState`] exactly once. Reaching a class
//! that is still `Resolving` through an `extends` edge means the chain loops,
//! which is a fatal input error; through a `uses` edge it only skips that
//! merge.

use crate::context::Context;
use crate::diagnostics::DiagnosticCategory;
use crate::error::{GenerateError, GenerateResult};
use crate::model::{ClassId, MemberOrigin, MixinRef, ResolveState, member_key};
use crate::types::TypeExpr;

/// Resolve every class in registration order.
pub fn resolve_all(ctx: &mut Context) -> GenerateResult<()> {
    let ids: Vec<ClassId> = ctx.class_ids().collect();
    for id in ids {
        resolve_class(ctx, id)?;
    }
    tracing::debug!(classes = ctx.classes().count(), "resolution complete");
    Ok(())
}

/// Resolve one class and, first, everything it depends on.
///
/// Calling this on a resolved class is a no-op.
pub fn resolve_class(ctx: &mut Context, id: ClassId) -> GenerateResult<()> {
    let mut stack = Vec::new();
    resolve(ctx, id, Edge::Root, &mut stack).map(|_| ())
}

/// How a class was reached on the resolution stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Root,
    Extends,
    Uses,
}

/// Returns `false` when `id` is still resolving further up the stack through
/// at least one `uses` edge; the caller must not rely on its merged members.
fn resolve(
    ctx: &mut Context,
    id: ClassId,
    edge: Edge,
    stack: &mut Vec<(ClassId, Edge)>,
) -> GenerateResult<bool> {
    match ctx.class(id).state {
        ResolveState::Resolved => return Ok(true),
        ResolveState::Resolving => return cycle(ctx, id, edge, stack),
        ResolveState::Unresolved => {}
    }

    ctx.class_mut(id).state = ResolveState::Resolving;
    stack.push((id, edge));
    tracing::trace!(class = %ctx.class(id).full_name, "resolving");

    let is_namespace = ctx.namespaces().find(&ctx.class(id).full_name).is_some();
    ctx.class_mut(id).is_namespace = is_namespace;

    resolve_parent(ctx, id, stack)?;
    resolve_mixins(ctx, id, stack)?;

    stack.pop();
    ctx.class_mut(id).state = ResolveState::Resolved;
    Ok(true)
}

/// Re-entry into a class that is still resolving. Fatal only when the loop
/// consists of `extends` edges alone.
fn cycle(
    ctx: &mut Context,
    id: ClassId,
    edge: Edge,
    stack: &[(ClassId, Edge)],
) -> GenerateResult<bool> {
    let start = stack.iter().position(|&(c, _)| c == id).unwrap_or(0);
    let path = &stack[start..];
    let names = || -> Vec<String> {
        path.iter()
            .map(|&(c, _)| ctx.class(c).full_name.clone())
            .chain(std::iter::once(ctx.class(id).full_name.clone()))
            .collect()
    };

    let extends_only =
        edge == Edge::Extends && path[1..].iter().all(|&(_, e)| e == Edge::Extends);
    if extends_only {
        return Err(GenerateError::CyclicExtends(names()));
    }

    let message = format!(
        "mixin cycle {}; `{}` was not merged",
        names().join(" -> "),
        ctx.class(id).full_name
    );
    let from = stack.last().map_or(id, |&(c, _)| c);
    let from_name = ctx.class(from).full_name.clone();
    let location = ctx.class(from).location.clone();
    ctx.diagnostics_mut().warning_at(
        &from_name,
        DiagnosticCategory::UnresolvedMixin,
        &message,
        None,
        location,
    );
    Ok(false)
}

fn resolve_parent(
    ctx: &mut Context,
    id: ClassId,
    stack: &mut Vec<(ClassId, Edge)>,
) -> GenerateResult<()> {
    let Some(parent_name) = ctx.class(id).extends_name.clone() else {
        return Ok(());
    };
    let full_name = ctx.class(id).full_name.clone();

    let Some(parent) = ctx.find_class(&parent_name) else {
        let location = ctx.class(id).location.clone();
        ctx.diagnostics_mut().warning_at(
            &full_name,
            DiagnosticCategory::UnresolvedExtends,
            &format!("parent class `{}` is not documented", parent_name),
            Some("the class is emitted without an `extends` clause"),
            location,
        );
        return Ok(());
    };

    // A parent caught in a mixin cycle still contributes its own members.
    resolve(ctx, parent, Edge::Extends, stack)?;
    ctx.class_mut(id).extends = Some(parent);

    let inherited: Vec<_> = ctx
        .class(parent)
        .members
        .values()
        .filter(|m| !m.private && !m.is_static)
        .filter(|m| !ctx.class(id).members.contains_key(&m.key()))
        .map(|m| m.copy_for(id, MemberOrigin::Inherited(parent)))
        .collect();
    let count = inherited.len();
    for member in inherited {
        ctx.class_mut(id).members.insert(member.key(), member);
    }
    ctx.diagnostics_mut().stats_mut().inherited_members += count;

    // Inherit the factory shape, not the other statics.
    let create_key = member_key("create", true);
    let factory = match ctx.class(parent).members.get(&create_key) {
        Some(create) if !ctx.class(id).members.contains_key(&create_key) => {
            let mut factory = create.copy_for(id, MemberOrigin::Factory(parent));
            if factory.returns_owner {
                factory.return_type = Some(TypeExpr::named(full_name.as_str()));
            }
            Some(factory)
        }
        _ => None,
    };
    if let Some(factory) = factory {
        ctx.class_mut(id).members.insert(create_key, factory);
        ctx.diagnostics_mut().stats_mut().factories += 1;
    }
    Ok(())
}

fn resolve_mixins(
    ctx: &mut Context,
    id: ClassId,
    stack: &mut Vec<(ClassId, Edge)>,
) -> GenerateResult<()> {
    let full_name = ctx.class(id).full_name.clone();
    let location = ctx.class(id).location.clone();
    let uses = ctx.class(id).uses_names.clone();

    let mut mixins = Vec::new();
    for name in &uses {
        match ctx.find_class(name) {
            Some(mixin) if mixin == id => {
                ctx.diagnostics_mut().warning_at(
                    &full_name,
                    DiagnosticCategory::UnresolvedMixin,
                    "class lists itself as a mixin",
                    None,
                    location.clone(),
                );
            }
            Some(mixin) => mixins.push(mixin),
            None => {
                ctx.diagnostics_mut().warning_at(
                    &full_name,
                    DiagnosticCategory::UnresolvedMixin,
                    &format!("mixin `{}` is not documented and was dropped", name),
                    None,
                    location.clone(),
                );
            }
        }
    }

    let mut refs: Vec<MixinRef> = mixins.iter().copied().map(MixinRef::Resolved).collect();
    if let Some(extra) = ctx.config().extra_implements.get(&full_name) {
        refs.extend(extra.iter().cloned().map(MixinRef::Named));
    }
    ctx.class_mut(id).mixins = refs;

    for mixin in mixins {
        if !resolve(ctx, mixin, Edge::Uses, stack)? {
            continue;
        }
        merge_mixin(ctx, id, mixin);
    }
    Ok(())
}

fn merge_mixin(ctx: &mut Context, id: ClassId, mixin: ClassId) {
    let members: Vec<_> = ctx
        .class(mixin)
        .members
        .values()
        .filter(|m| !m.private)
        .cloned()
        .collect();
    let mixin_name = ctx.class(mixin).full_name.clone();
    let full_name = ctx.class(id).full_name.clone();

    let mut merged = 0;
    for member in members {
        let key = member.key();
        let existing_private = ctx.class(id).members.get(&key).map(|m| m.private);
        match existing_private {
            Some(true) => {
                if let Some(existing) = ctx.class_mut(id).members.get_mut(&key) {
                    existing.private = false;
                }
                ctx.diagnostics_mut().warning(
                    &format!("{}.{}", full_name, member.name),
                    DiagnosticCategory::PrivacyOverride,
                    &format!("private member is public in mixin `{}`; emitting it as public", mixin_name),
                    Some("drop the private marker or the mixin"),
                );
            }
            Some(false) => {}
            None => {
                let copy = member.copy_for(id, MemberOrigin::Mixin(mixin));
                ctx.class_mut(id).members.insert(key, copy);
                merged += 1;
            }
        }
    }
    ctx.diagnostics_mut().stats_mut().mixin_members += merged;
}
