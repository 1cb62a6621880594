//! Class and member model.

use indexmap::IndexMap;

use crate::diagnostics::{DiagnosticCategory, DiagnosticCollector};
use crate::error::{GenerateError, GenerateResult};
use crate::input::{ItemRecord, ParamRecord};
use crate::types::{Annotation, TypeExpr, parse_annotation};

/// Index of a class inside its [`Context`](crate::Context).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KlassKind {
    Class,
    /// Built-in or ambient type.
    Interface,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolveState {
    #[default]
    Unresolved,
    Resolving,
    Resolved,
}

/// One entry of a class's `implements` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MixinRef {
    /// A documented class.
    Resolved(ClassId),
    /// A literal type name, rendered as written.
    Named(String),
}

/// A class, mixin or namespace-as-class.
#[derive(Debug, Clone)]
pub struct Klass {
    pub simple_name: String,
    pub full_name: String,
    pub kind: KlassKind,
    /// The record declared `extends` or `uses`.
    pub is_true_class: bool,
    /// A namespace with the same full name exists. Set during resolution.
    pub is_namespace: bool,
    pub extends_name: Option<String>,
    pub extends: Option<ClassId>,
    pub uses_names: Vec<String>,
    pub mixins: Vec<MixinRef>,
    /// Keyed by [`member_key`].
    pub members: IndexMap<String, Member>,
    pub generics: Vec<String>,
    pub private: bool,
    pub deprecated: bool,
    pub deprecation_message: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub state: ResolveState,
}

impl Klass {
    /// A namespace represented as a class purely for documentation.
    pub fn is_namespace_shadow(&self) -> bool {
        self.is_namespace && !self.is_true_class
    }

    pub fn member(&self, name: &str, is_static: bool) -> Option<&Member> {
        self.members.get(&member_key(name, is_static))
    }
}

/// Registration input for a class.
#[derive(Debug, Clone, Default)]
pub struct KlassData {
    pub extends: Option<String>,
    pub uses: Vec<String>,
    pub ambient: bool,
    pub private: bool,
    pub deprecated: bool,
    pub deprecation_message: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
}

/// Key of a member inside [`Klass::members`]; statics and instance members
/// with the same name are distinct entries.
pub fn member_key(name: &str, is_static: bool) -> String {
    if is_static {
        format!("static:{}", name)
    } else {
        name.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Method,
    Property,
}

/// Where a member attributed to a class came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberOrigin {
    Own,
    /// Copied from the `extends` parent.
    Inherited(ClassId),
    /// Copied from a `uses` mixin.
    Mixin(ClassId),
    /// Static `create` synthesized from the parent's factory.
    Factory(ClassId),
}

#[derive(Debug, Clone)]
pub struct Member {
    pub name: String,
    pub is_static: bool,
    pub kind: MemberKind,
    /// Property type; `Any` when undocumented.
    pub ty: TypeExpr,
    pub params: Vec<Param>,
    /// `None` renders as `any` (or `this` for chainable methods).
    pub return_type: Option<TypeExpr>,
    /// The return type was inferred as the declaring class.
    pub returns_owner: bool,
    pub chainable: bool,
    pub private: bool,
    pub deprecated: bool,
    pub deprecation_message: Option<String>,
    pub description: Option<String>,
    pub owner: ClassId,
    pub origin: MemberOrigin,
}

impl Member {
    pub fn key(&self) -> String {
        member_key(&self.name, self.is_static)
    }

    pub fn is_method(&self) -> bool {
        self.kind == MemberKind::Method
    }

    /// A copy attributed to another class.
    pub fn copy_for(&self, owner: ClassId, origin: MemberOrigin) -> Member {
        Member {
            owner,
            origin,
            ..self.clone()
        }
    }

    /// Build a member from an item record.
    ///
    /// Fails when the record carries parameters but is not a method. Malformed
    /// type annotations and surplus rest markers are reported and recovered.
    pub fn from_item(
        item: &ItemRecord,
        name: &str,
        owner: ClassId,
        owner_full_name: &str,
        diagnostics: &mut DiagnosticCollector,
    ) -> GenerateResult<Member> {
        let itemtype = item.itemtype.as_deref().unwrap_or("property");
        let kind = match itemtype {
            "method" | "event" => MemberKind::Method,
            _ => MemberKind::Property,
        };
        let qualified = format!("{}.{}", owner_full_name, name);

        let params = match &item.params {
            Some(records) if kind != MemberKind::Method => {
                if !records.is_empty() {
                    return Err(GenerateError::ParamsOnNonMethod {
                        class: owner_full_name.to_string(),
                        item: name.to_string(),
                        itemtype: itemtype.to_string(),
                    });
                }
                Vec::new()
            }
            Some(records) => build_params(records, &qualified, diagnostics),
            None => Vec::new(),
        };

        let ty = match kind {
            MemberKind::Property => {
                annotate(item.ty.as_deref().unwrap_or(""), &qualified, diagnostics).expr
            }
            MemberKind::Method => TypeExpr::Any,
        };

        let documented_return = item
            .returns
            .as_ref()
            .and_then(|r| r.ty.as_deref())
            .filter(|t| !t.trim().is_empty());
        let mut returns_owner = false;
        let return_type = match documented_return {
            Some(src) => Some(annotate(src, &qualified, diagnostics).expr),
            None if kind == MemberKind::Method && item.is_static && name == "create" => {
                returns_owner = true;
                Some(TypeExpr::named(owner_full_name))
            }
            None => None,
        };

        Ok(Member {
            name: name.to_string(),
            is_static: item.is_static,
            kind,
            ty,
            params,
            return_type,
            returns_owner,
            chainable: item.chainable,
            private: item.is_private(),
            deprecated: item.deprecated,
            deprecation_message: item.deprecation_message.clone(),
            description: item.description.clone(),
            owner,
            origin: MemberOrigin::Own,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub ty: TypeExpr,
    pub is_rest: bool,
    pub optional: bool,
}

impl Param {
    /// Build a parameter, decoding `name*`, `[name]` and `[name=default]`.
    pub fn from_record(
        record: &ParamRecord,
        qualified: &str,
        diagnostics: &mut DiagnosticCollector,
    ) -> Param {
        let mut name = record.name.trim();
        let mut optional = record.optional;

        if let Some(inner) = name.strip_prefix('[').and_then(|n| n.strip_suffix(']')) {
            optional = true;
            name = inner.split('=').next().unwrap_or(inner).trim();
        }

        let mut is_rest = false;
        if let Some(stripped) = name.strip_suffix('*') {
            is_rest = true;
            name = stripped;
        }
        if let Some(stripped) = name.strip_prefix("...") {
            is_rest = true;
            name = stripped;
        }

        let annotation = annotate(record.ty.as_deref().unwrap_or(""), qualified, diagnostics);
        Param {
            name: escape_reserved(name),
            ty: annotation.expr,
            is_rest: is_rest || annotation.rest,
            optional,
        }
    }
}

fn build_params(
    records: &[ParamRecord],
    qualified: &str,
    diagnostics: &mut DiagnosticCollector,
) -> Vec<Param> {
    let mut params: Vec<Param> = records
        .iter()
        .map(|r| Param::from_record(r, qualified, diagnostics))
        .collect();

    let mut seen_rest = false;
    for param in &mut params {
        if !param.is_rest {
            continue;
        }
        if seen_rest {
            diagnostics.warning(
                qualified,
                DiagnosticCategory::Signature,
                &format!("extra rest parameter `{}` treated as a plain parameter", param.name),
                None,
            );
            param.is_rest = false;
        }
        seen_rest = true;
    }
    params
}

fn annotate(src: &str, qualified: &str, diagnostics: &mut DiagnosticCollector) -> Annotation {
    match parse_annotation(src) {
        Ok(annotation) => annotation,
        Err(err) => {
            diagnostics.warning(
                qualified,
                DiagnosticCategory::TypeSyntax,
                &err.to_string(),
                Some("the type is emitted as `any`"),
            );
            Annotation::any()
        }
    }
}

/// Append `_` to names TypeScript reserves for itself.
pub(crate) fn escape_reserved(name: &str) -> String {
    if is_reserved(name) {
        format!("{}_", name)
    } else {
        name.to_string()
    }
}

pub(crate) fn is_reserved(name: &str) -> bool {
    matches!(
        name,
        "break"
            | "case"
            | "catch"
            | "class"
            | "const"
            | "continue"
            | "debugger"
            | "default"
            | "delete"
            | "do"
            | "else"
            | "enum"
            | "export"
            | "extends"
            | "false"
            | "finally"
            | "for"
            | "function"
            | "if"
            | "import"
            | "in"
            | "instanceof"
            | "new"
            | "null"
            | "return"
            | "super"
            | "switch"
            | "this"
            | "throw"
            | "true"
            | "try"
            | "typeof"
            | "var"
            | "void"
            | "while"
            | "with"
            | "implements"
            | "interface"
            | "let"
            | "package"
            | "private"
            | "protected"
            | "public"
            | "static"
            | "yield"
            | "arguments"
            | "eval"
    )
}
