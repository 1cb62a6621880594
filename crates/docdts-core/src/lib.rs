//! Documentation-to-declaration pipeline for docdts.
//!
//! This crate turns a flat YUIDoc-style record set (classes plus class items
//! with string type annotations) into a resolved namespace/class model and
//! renders it as a TypeScript declaration file.
//!
//! The pipeline runs in three strictly ordered passes over an explicit
//! [`Context`]:
//!
//! 1. registration: namespaces, classes and members are created in input order
//! 2. resolution: `extends` and `uses` edges are resolved and members merged
//! 3. emission: the namespace tree is rendered as nested declarations
//!
//! ```ignore
//! let doc = DocFile::from_json(&json)?;
//! let output = docdts_core::generate(&doc, &GenerateConfig::default())?;
//! println!("{}", output.code);
//! ```

#![allow(clippy::collapsible_if, clippy::collapsible_else_if)]

mod codegen;
mod config;
mod context;
mod diagnostics;
mod error;
mod input;
mod lexer;
mod model;
mod namespace;
mod naming;
mod resolver;
mod types;

pub use codegen::{CodegenOptions, CodegenResult, Warning, WarningKind, generate as emit};
pub use config::GenerateConfig;
pub use context::Context;
pub use diagnostics::{
    ConversionStats, Diagnostic, DiagnosticCategory, DiagnosticCollector, Severity,
};
pub use error::{GenerateError, GenerateResult};
pub use input::{ClassRecord, DocFile, ItemRecord, ParamRecord, ReturnRecord};
pub use lexer::{Lexer, Token, TokenKind};
pub use model::{
    ClassId, Klass, KlassData, KlassKind, Member, MemberKind, MemberOrigin, MixinRef, Param,
    ResolveState, member_key,
};
pub use namespace::{Namespace, NamespaceId, NamespaceTree};
pub use naming::{RelativeNamer, is_builtin, relative_name};
pub use resolver::{resolve_all, resolve_class};
pub use types::{
    Annotation, NameScope, TsType, TypeExpr, TypeSyntaxError, convert, convert_annotation,
    parse_annotation,
};

/// Everything a generation run produces.
#[derive(Debug)]
pub struct Generated {
    /// The rendered declaration file.
    pub code: String,
    /// Constructs the emitter could not express.
    pub warnings: Vec<Warning>,
    /// Registration and resolution diagnostics.
    pub diagnostics: DiagnosticCollector,
}

/// Run the full pipeline over an in-memory document.
pub fn generate(doc: &DocFile, config: &GenerateConfig) -> GenerateResult<Generated> {
    let mut ctx = Context::new(config.clone());
    ctx.load(doc)?;
    resolve_all(&mut ctx)?;

    let result = emit(&ctx, &CodegenOptions::from(config));
    Ok(Generated {
        code: result.code,
        warnings: result.warnings,
        diagnostics: ctx.into_diagnostics(),
    })
}
