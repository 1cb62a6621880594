//! Render a resolved [`Context`] as a TypeScript declaration file.

use std::collections::HashSet;
use std::fmt::Write;

use crate::config::GenerateConfig;
use crate::context::Context;
use crate::diagnostics::Severity;
use crate::model::{ClassId, KlassKind, Member, MemberOrigin, MixinRef, Param, is_reserved};
use crate::namespace::NamespaceId;
use crate::naming::{RelativeNamer, relative_name};
use crate::types::{NameScope, TsType, convert};

/// Options for code generation.
#[derive(Debug, Clone)]
pub struct CodegenOptions {
    /// Spaces per nesting level.
    pub indent: usize,
    /// Name in the trailing `export default` statement.
    pub export_name: String,
    /// Include warnings and diagnostics as comments.
    pub verbose: bool,
    /// Doc comment summaries longer than this are abbreviated. `0` disables it.
    pub description_width: usize,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            indent: 4,
            export_name: "Ember".to_string(),
            verbose: false,
            description_width: 120,
        }
    }
}

impl From<&GenerateConfig> for CodegenOptions {
    fn from(config: &GenerateConfig) -> Self {
        Self {
            indent: config.indent,
            export_name: config.export_name.clone(),
            verbose: config.verbose,
            description_width: config.description_width,
        }
    }
}

/// Warnings generated during code generation.
#[derive(Debug, Clone)]
pub struct Warning {
    pub message: String,
    pub kind: WarningKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    Unsupported,
    Simplified,
    Skipped,
}

/// Result of code generation.
#[derive(Debug, Clone)]
pub struct CodegenResult {
    pub code: String,
    pub warnings: Vec<Warning>,
}

/// Generate declarations for every namespace and class in `ctx`.
///
/// Expects `ctx` to be resolved; emission never mutates it.
pub fn generate(ctx: &Context, options: &CodegenOptions) -> CodegenResult {
    let mut codegen = Codegen::new(ctx, options);
    codegen.generate_file();
    CodegenResult {
        code: codegen.output,
        warnings: codegen.warnings,
    }
}

struct Codegen<'a> {
    ctx: &'a Context,
    options: &'a CodegenOptions,
    output: String,
    warnings: Vec<Warning>,
}

impl<'a> Codegen<'a> {
    fn new(ctx: &'a Context, options: &'a CodegenOptions) -> Self {
        Self {
            ctx,
            options,
            output: String::new(),
            warnings: Vec::new(),
        }
    }

    fn warn(&mut self, kind: WarningKind, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(?kind, "{}", message);
        self.warnings.push(Warning { message, kind });
    }

    fn line(&mut self, depth: usize, text: &str) {
        let pad = " ".repeat(self.options.indent * depth);
        writeln!(self.output, "{}{}", pad, text).unwrap();
    }

    fn generate_file(&mut self) {
        self.emit_header();
        let root = self.ctx.namespaces().root();
        self.emit_contents(root, 0);
        self.emit_warnings();
        writeln!(self.output, "export default {};", self.options.export_name).unwrap();
    }

    fn emit_header(&mut self) {
        writeln!(self.output, "// Type definitions generated by docdts").unwrap();
        writeln!(self.output).unwrap();
    }

    /// Child namespaces first, then the classes registered directly here.
    fn emit_contents(&mut self, id: NamespaceId, depth: usize) {
        let ctx = self.ctx;
        let namespace = ctx.namespaces().get(id);
        for &child in namespace.children().values() {
            self.emit_namespace(child, depth);
            if depth == 0 {
                writeln!(self.output).unwrap();
            }
        }
        for &class in namespace.classes().values() {
            if ctx.class(class).is_namespace_shadow() {
                continue;
            }
            self.emit_class(class, depth);
            if depth == 0 {
                writeln!(self.output).unwrap();
            }
        }
    }

    fn emit_namespace(&mut self, id: NamespaceId, depth: usize) {
        let ctx = self.ctx;
        let tree = ctx.namespaces();
        let name = tree.get(id).name().unwrap_or_default();
        let keyword = if depth == 0 {
            "declare namespace"
        } else {
            "namespace"
        };
        self.line(depth, &format!("{} {} {{", keyword, name));

        let full_name = tree.full_name(id);
        if let Some(shadow) = ctx
            .find_class(&full_name)
            .filter(|&c| ctx.class(c).is_namespace_shadow())
        {
            self.emit_namespace_members(shadow, depth + 1);
        }
        self.emit_contents(id, depth + 1);

        self.line(depth, "}");
    }

    /// Members of a namespace shadow become `function` and `let` declarations.
    fn emit_namespace_members(&mut self, id: ClassId, depth: usize) {
        let ctx = self.ctx;
        let klass = ctx.class(id);
        let namer = RelativeNamer::new(ctx, &klass.full_name);
        let mut declared = HashSet::new();

        for member in klass.members.values() {
            if member.private {
                continue;
            }
            let qualified = format!("{}.{}", klass.full_name, member.name);
            if !is_identifier(&member.name) || is_reserved(&member.name) {
                self.warn(
                    WarningKind::Skipped,
                    format!("`{}` is not a valid namespace-level name", qualified),
                );
                continue;
            }
            if !declared.insert(member.name.as_str()) {
                self.warn(
                    WarningKind::Skipped,
                    format!("`{}` is declared both static and instance; kept the first", qualified),
                );
                continue;
            }

            self.emit_member_doc(member, depth);
            if member.is_method() {
                let ret = return_type(member, &namer, false);
                for params in signatures(&member.params, &namer) {
                    self.line(
                        depth,
                        &format!("function {}({}): {};", member.name, params, ret),
                    );
                }
            } else {
                let ty = convert(&member.ty, Some(&namer));
                self.line(depth, &format!("let {}: {};", member.name, ty));
            }
        }
    }

    fn emit_class(&mut self, id: ClassId, depth: usize) {
        let ctx = self.ctx;
        let klass = ctx.class(id);

        let summary = self.summary(klass.description.as_deref());
        let mut doc = Vec::new();
        doc.extend(summary);
        if klass.deprecated {
            doc.push(deprecation_tag(klass.deprecation_message.as_deref()));
        }
        if klass.private {
            doc.push("@private".to_string());
        }
        self.emit_doc(depth, &doc);

        let mut header = String::new();
        if depth == 0 {
            header.push_str("declare ");
        }
        header.push_str(match klass.kind {
            KlassKind::Class => "class ",
            KlassKind::Interface => "interface ",
        });
        header.push_str(&klass.simple_name);
        if !klass.generics.is_empty() {
            header.push_str(&format!("<{}>", klass.generics.join(", ")));
        }

        let (extends, implements) = self.heritage(id);
        match klass.kind {
            KlassKind::Class => {
                if let Some(parent) = extends {
                    header.push_str(&format!(" extends {}", parent));
                }
                if !implements.is_empty() {
                    header.push_str(&format!(" implements {}", implements.join(", ")));
                }
            }
            KlassKind::Interface => {
                let all: Vec<String> = extends.into_iter().chain(implements).collect();
                if !all.is_empty() {
                    header.push_str(&format!(" extends {}", all.join(", ")));
                }
            }
        }
        header.push_str(" {");
        self.line(depth, &header);

        // Inherited copies are only implied when the parent made it into a
        // heritage clause.
        let parent_listed = klass
            .extends
            .is_some_and(|parent| !ctx.class(parent).is_namespace_shadow());
        let namer = RelativeNamer::new(ctx, &klass.full_name);
        for member in klass.members.values() {
            if member.private {
                continue;
            }
            if parent_listed && matches!(member.origin, MemberOrigin::Inherited(_)) {
                continue;
            }
            if klass.kind == KlassKind::Interface && member.is_static {
                self.warn(
                    WarningKind::Unsupported,
                    format!(
                        "static member `{}` on interface `{}` was dropped",
                        member.name, klass.full_name
                    ),
                );
                continue;
            }
            self.emit_class_member(member, &namer, depth + 1);
        }

        self.line(depth, "}");
    }

    /// The `extends` target and `implements` list, as relative references.
    fn heritage(&mut self, id: ClassId) -> (Option<String>, Vec<String>) {
        let ctx = self.ctx;
        let klass = ctx.class(id);
        let mut extends = None;
        let mut implements = Vec::new();

        if let Some(parent) = klass.extends {
            let parent = ctx.class(parent);
            if parent.is_namespace_shadow() {
                self.warn(
                    WarningKind::Simplified,
                    format!(
                        "`{}` extends namespace `{}`; the clause was omitted",
                        klass.full_name, parent.full_name
                    ),
                );
            } else {
                let name = relative_name(ctx, &parent.full_name, &klass.full_name);
                match parent.kind {
                    KlassKind::Class => extends = Some(name),
                    KlassKind::Interface => implements.push(name),
                }
            }
        }

        for mixin in &klass.mixins {
            match mixin {
                MixinRef::Resolved(mixin) => {
                    let mixin = ctx.class(*mixin);
                    if mixin.is_namespace_shadow() {
                        self.warn(
                            WarningKind::Simplified,
                            format!(
                                "`{}` uses namespace `{}`; only its members were merged",
                                klass.full_name, mixin.full_name
                            ),
                        );
                        continue;
                    }
                    implements.push(relative_name(ctx, &mixin.full_name, &klass.full_name));
                }
                MixinRef::Named(name) => implements.push(name.clone()),
            }
        }
        (extends, implements)
    }

    fn emit_class_member(&mut self, member: &Member, namer: &RelativeNamer<'_>, depth: usize) {
        self.emit_member_doc(member, depth);
        let name = property_name(&member.name);
        let prefix = if member.is_static { "static " } else { "" };

        if member.is_method() {
            let ret = return_type(member, namer, true);
            for params in signatures(&member.params, namer) {
                self.line(depth, &format!("{}{}({}): {};", prefix, name, params, ret));
            }
        } else {
            let ty = convert(&member.ty, Some(namer));
            self.line(depth, &format!("{}{}: {};", prefix, name, ty));
        }
    }

    fn emit_member_doc(&mut self, member: &Member, depth: usize) {
        let mut doc: Vec<String> = self.summary(member.description.as_deref()).into_iter().collect();
        if member.deprecated {
            doc.push(deprecation_tag(member.deprecation_message.as_deref()));
        }
        self.emit_doc(depth, &doc);
    }

    fn emit_doc(&mut self, depth: usize, lines: &[String]) {
        match lines {
            [] => {}
            [only] => self.line(depth, &format!("/** {} */", only)),
            _ => {
                self.line(depth, "/**");
                for line in lines {
                    self.line(depth, &format!(" * {}", line));
                }
                self.line(depth, " */");
            }
        }
    }

    /// First paragraph of a description, on one line and abbreviated.
    fn summary(&self, description: Option<&str>) -> Option<String> {
        let paragraph = first_paragraph(description?);
        if paragraph.is_empty() {
            return None;
        }
        Some(abbreviate(&paragraph, self.options.description_width))
    }

    fn emit_warnings(&mut self) {
        if !self.options.verbose {
            return;
        }
        let diagnostics: Vec<_> = self
            .ctx
            .diagnostics()
            .diagnostics()
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .collect();
        if self.warnings.is_empty() && diagnostics.is_empty() {
            return;
        }

        writeln!(self.output, "// WARNINGS:").unwrap();
        for d in diagnostics {
            writeln!(
                self.output,
                "// {}: {}: {}",
                d.severity.label().to_uppercase(),
                d.name,
                comment_safe(&d.message)
            )
            .unwrap();
        }
        for w in &self.warnings {
            let prefix = match w.kind {
                WarningKind::Unsupported => "UNSUPPORTED",
                WarningKind::Simplified => "SIMPLIFIED",
                WarningKind::Skipped => "SKIPPED",
            };
            writeln!(self.output, "// {}: {}", prefix, comment_safe(&w.message)).unwrap();
        }
        writeln!(self.output).unwrap();
    }
}

fn return_type(member: &Member, scope: &dyn NameScope, in_class: bool) -> String {
    match &member.return_type {
        Some(ty) => convert(ty, Some(scope)).to_string(),
        None if member.chainable && in_class => "this".to_string(),
        None => "any".to_string(),
    }
}

/// Rendered parameter lists, one per emitted overload.
///
/// A rest parameter followed by more parameters cannot be expressed, so the
/// list is split in two: everything up to and including the rest parameter,
/// and everything before it.
fn signatures(params: &[Param], scope: &dyn NameScope) -> Vec<String> {
    let mut rendered = Vec::with_capacity(params.len());
    let mut seen_optional = false;
    for param in params {
        let ty = convert(&param.ty, Some(scope));
        if param.is_rest {
            let element = match ty.first_branch() {
                array @ TsType::Array(_) => array.to_string(),
                other => other.array_of(),
            };
            rendered.push(format!("...{}: {}", param.name, element));
            continue;
        }
        seen_optional |= param.optional;
        let mark = if seen_optional { "?" } else { "" };
        rendered.push(format!("{}{}: {}", param.name, mark, ty));
    }

    let rest = params.iter().position(|p| p.is_rest);
    match rest {
        Some(i) if i + 1 < params.len() => {
            vec![rendered[..=i].join(", "), rendered[..i].join(", ")]
        }
        _ => vec![rendered.join(", ")],
    }
}

fn deprecation_tag(message: Option<&str>) -> String {
    match message.map(collapse_whitespace).filter(|m| !m.is_empty()) {
        Some(message) => format!("@deprecated {}", comment_safe(&message)),
        None => "@deprecated".to_string(),
    }
}

fn first_paragraph(text: &str) -> String {
    let paragraph: Vec<&str> = text
        .trim()
        .lines()
        .take_while(|line| !line.trim().is_empty())
        .collect();
    comment_safe(&collapse_whitespace(&paragraph.join(" ")))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn abbreviate(text: &str, width: usize) -> String {
    if width == 0 || text.chars().count() <= width {
        return text.to_string();
    }
    let keep = width.saturating_sub(3);
    let cut: String = text.chars().take(keep).collect();
    format!("{}...", cut.trim_end())
}

/// Doc text must not close the surrounding comment.
fn comment_safe(text: &str) -> String {
    text.replace("*/", "*\\/")
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Class members may use any name, quoted when it is not an identifier.
fn property_name(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('\\', "\\\\").replace('"', "\\\""))
    }
}
