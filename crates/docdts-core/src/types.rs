//! Documentation type annotations and their TypeScript lowering.
//!
//! An annotation is parsed into a [`TypeExpr`] once, at registration time,
//! with names left exactly as documented. Lowering to a [`TsType`] happens at
//! emission time, because relative naming depends on the class that finally
//! declares the member (which may differ from the documented owner after
//! mixin merging).
//!
//! ## Grammar
//!
//! ```text
//! annotation := '{' type '}' | type (WS description)?
//! type       := postfix ('|' postfix)*
//! postfix    := primary ('[]')*
//! primary    := '...'? (NAME generic? | '(' type ')') '...'?
//! generic    := '<' type (',' type)* '>'
//! ```
//!
//! Whitespace is insignificant inside `<>` and `()` and around `|`; anywhere
//! else it ends the type. Commas inside a generic argument list are read as
//! union separators, since documentation uses them for both. An ellipsis in
//! any position marks the annotation as variadic.

use std::fmt;

use thiserror::Error;

use crate::lexer::{Lexer, Token, TokenKind};

/// A parsed, unresolved documentation type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// No annotation at all.
    Any,
    /// A documented name, optionally with a single (union) generic argument.
    Named {
        name: String,
        arg: Option<Box<TypeExpr>>,
    },
    /// `T[]`
    Array(Box<TypeExpr>),
    /// `A|B|C`
    Union(Vec<TypeExpr>),
}

impl TypeExpr {
    pub fn named(name: impl Into<String>) -> Self {
        TypeExpr::Named {
            name: name.into(),
            arg: None,
        }
    }

    fn union(mut branches: Vec<TypeExpr>) -> Self {
        if branches.len() == 1 {
            return branches.remove(0);
        }
        let mut flat = Vec::with_capacity(branches.len());
        for branch in branches {
            match branch {
                TypeExpr::Union(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        TypeExpr::Union(flat)
    }
}

/// Result of parsing one annotation string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub expr: TypeExpr,
    /// An ellipsis appeared somewhere in the annotation.
    pub rest: bool,
}

impl Annotation {
    pub fn any() -> Self {
        Self {
            expr: TypeExpr::Any,
            rest: false,
        }
    }
}

/// A malformed annotation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed type `{text}` at offset {pos}: {message}")]
pub struct TypeSyntaxError {
    pub text: String,
    pub pos: usize,
    pub message: String,
}

/// Parse an annotation string.
///
/// Empty annotations parse to [`TypeExpr::Any`].
pub fn parse_annotation(src: &str) -> Result<Annotation, TypeSyntaxError> {
    let trimmed = src.trim();
    let inner = match trimmed.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
        Some(inner) => inner.trim(),
        None => trimmed,
    };
    if inner.is_empty() {
        return Ok(Annotation::any());
    }

    let mut parser = Parser::new(inner);
    let expr = parser.parse_type()?;
    match parser.peek() {
        TokenKind::Whitespace | TokenKind::Eof => {}
        other => {
            let message = format!("unexpected {:?} after type", other);
            return Err(parser.error(message));
        }
    }
    Ok(Annotation {
        expr,
        rest: parser.rest,
    })
}

struct Parser<'src> {
    src: &'src str,
    tokens: Vec<Token>,
    pos: usize,
    /// Nesting depth of `<>` and `()`.
    depth: usize,
    rest: bool,
}

impl<'src> Parser<'src> {
    fn new(src: &'src str) -> Self {
        Self {
            src,
            tokens: Lexer::new(src).tokenize(),
            pos: 0,
            depth: 0,
            rest: false,
        }
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &TokenKind {
        &self.current().kind
    }

    fn peek_nth(&self, n: usize) -> &TokenKind {
        let idx = (self.pos + n).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn matches(&mut self, kind: &TokenKind) -> bool {
        if self.peek() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while *self.peek() == TokenKind::Whitespace {
            self.advance();
        }
    }

    /// Skip whitespace that cannot end the type here.
    fn skip_insignificant(&mut self) {
        if self.depth > 0 {
            self.skip_whitespace();
        }
    }

    fn error(&self, message: impl Into<String>) -> TypeSyntaxError {
        TypeSyntaxError {
            text: self.src.to_string(),
            pos: self.current().start,
            message: message.into(),
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<(), TypeSyntaxError> {
        self.skip_insignificant();
        if self.matches(&kind) {
            Ok(())
        } else {
            Err(self.error(format!("expected {}", what)))
        }
    }

    fn parse_type(&mut self) -> Result<TypeExpr, TypeSyntaxError> {
        let mut branches = vec![self.parse_postfix()?];
        loop {
            if self.depth > 0 {
                self.skip_whitespace();
            } else if *self.peek() == TokenKind::Whitespace && *self.peek_nth(1) == TokenKind::Pipe
            {
                self.advance();
            }
            if !self.matches(&TokenKind::Pipe) {
                break;
            }
            self.skip_whitespace();
            branches.push(self.parse_postfix()?);
        }
        Ok(TypeExpr::union(branches))
    }

    fn parse_postfix(&mut self) -> Result<TypeExpr, TypeSyntaxError> {
        let mut ty = self.parse_primary()?;
        while *self.peek() == TokenKind::LBracket && *self.peek_nth(1) == TokenKind::RBracket {
            self.advance();
            self.advance();
            ty = TypeExpr::Array(Box::new(ty));
            if self.matches(&TokenKind::Ellipsis) {
                self.rest = true;
            }
        }
        Ok(ty)
    }

    fn parse_primary(&mut self) -> Result<TypeExpr, TypeSyntaxError> {
        self.skip_insignificant();
        if self.matches(&TokenKind::Ellipsis) {
            self.rest = true;
        }

        let ty = match self.peek().clone() {
            TokenKind::Name(name) => {
                self.advance();
                let arg = if *self.peek() == TokenKind::LAngle {
                    Some(Box::new(self.parse_generic_args()?))
                } else {
                    None
                };
                TypeExpr::Named { name, arg }
            }
            TokenKind::LParen => {
                self.advance();
                self.depth += 1;
                let inner = self.parse_type()?;
                self.expect(TokenKind::RParen, "`)`")?;
                self.depth -= 1;
                inner
            }
            other => return Err(self.error(format!("expected a type, found {:?}", other))),
        };

        if self.matches(&TokenKind::Ellipsis) {
            self.rest = true;
        }
        Ok(ty)
    }

    fn parse_generic_args(&mut self) -> Result<TypeExpr, TypeSyntaxError> {
        self.advance();
        self.depth += 1;
        let mut args = vec![self.parse_type()?];
        loop {
            self.skip_insignificant();
            if !self.matches(&TokenKind::Comma) {
                break;
            }
            args.push(self.parse_type()?);
        }
        self.expect(TokenKind::RAngle, "`>`")?;
        self.depth -= 1;
        Ok(TypeExpr::union(args))
    }
}

/// A lowered TypeScript type expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TsType {
    /// A primitive, a type reference or an inline literal such as `{}`.
    Ref(String),
    /// `Base<Arg>`
    Generic { base: String, arg: Box<TsType> },
    /// `T[]`
    Array(Box<TsType>),
    /// `{ [key: string]: T }`
    Index(Box<TsType>),
    /// `A | B`
    Union(Vec<TsType>),
}

impl TsType {
    pub fn any() -> Self {
        TsType::Ref("any".to_string())
    }

    pub fn reference(name: impl Into<String>) -> Self {
        TsType::Ref(name.into())
    }

    /// The first branch of a union, or the type itself.
    pub fn first_branch(&self) -> &TsType {
        match self {
            TsType::Union(branches) if !branches.is_empty() => &branches[0],
            other => other,
        }
    }

    /// Render as the element type of an array.
    pub fn array_of(&self) -> String {
        match self {
            TsType::Union(_) => format!("({})[]", self),
            other => format!("{}[]", other),
        }
    }
}

impl fmt::Display for TsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TsType::Ref(name) => write!(f, "{}", name),
            TsType::Generic { base, arg } => write!(f, "{}<{}>", base, arg),
            TsType::Array(inner) => write!(f, "{}", inner.array_of()),
            TsType::Index(inner) => write!(f, "{{ [key: string]: {} }}", inner),
            TsType::Union(branches) => {
                for (i, branch) in branches.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{}", branch)?;
                }
                Ok(())
            }
        }
    }
}

/// Rewrites documented names into references valid at the emission site.
pub trait NameScope {
    fn relativize(&self, name: &str) -> String;
}

/// Lower a parsed type, relativizing names through `scope` when given.
pub fn convert(expr: &TypeExpr, scope: Option<&dyn NameScope>) -> TsType {
    match expr {
        TypeExpr::Any => TsType::any(),
        TypeExpr::Named { name, arg: None } => {
            let name = relativize(name, scope);
            alias(&name).unwrap_or(TsType::Ref(name))
        }
        TypeExpr::Named {
            name,
            arg: Some(arg),
        } => {
            let base = relativize(name, scope);
            let arg = Box::new(convert(arg, scope));
            match base.as_str() {
                "Array" | "array" | "Tuple" => TsType::Generic {
                    base: "Array".to_string(),
                    arg,
                },
                "Object" | "object" | "Hash" => TsType::Index(arg),
                name if is_promise_like(name) => TsType::Generic {
                    base: "Promise".to_string(),
                    arg,
                },
                _ => TsType::Generic { base, arg },
            }
        }
        TypeExpr::Array(inner) => TsType::Array(Box::new(convert(inner, scope))),
        TypeExpr::Union(branches) => {
            let mut flat = Vec::with_capacity(branches.len());
            for branch in branches {
                match convert(branch, scope) {
                    TsType::Union(inner) => flat.extend(inner),
                    other => flat.push(other),
                }
            }
            TsType::Union(flat)
        }
    }
}

/// Parse and lower an annotation in one step. Returns the lowered type and the
/// rest flag.
pub fn convert_annotation(
    src: &str,
    scope: Option<&dyn NameScope>,
) -> Result<(TsType, bool), TypeSyntaxError> {
    let annotation = parse_annotation(src)?;
    Ok((convert(&annotation.expr, scope), annotation.rest))
}

fn relativize(name: &str, scope: Option<&dyn NameScope>) -> String {
    match scope {
        Some(scope) => scope.relativize(name),
        None => name.to_string(),
    }
}

pub(crate) fn is_promise_like(name: &str) -> bool {
    matches!(
        name,
        "Promise" | "RSVP.Promise" | "Ember.RSVP.Promise" | "Thenable" | "PromiseLike"
    )
}

/// Documentation vocabulary that maps onto fixed TypeScript types.
pub(crate) const ALIASES: &[&str] = &[
    "", "any", "Any", "*", "Mixed", "mixed", "Array", "array", "Tuple", "Boolean", "boolean",
    "Bool", "String", "string", "Number", "number", "Integer", "Int", "Float", "Object", "object",
    "Hash", "Void", "void", "Null", "null", "Undefined", "undefined",
];

fn alias(name: &str) -> Option<TsType> {
    let ty = match name {
        "" | "any" | "Any" | "*" | "Mixed" | "mixed" => TsType::any(),
        "Array" | "array" | "Tuple" => TsType::Generic {
            base: "Array".to_string(),
            arg: Box::new(TsType::any()),
        },
        "Boolean" | "boolean" | "Bool" => TsType::reference("boolean"),
        "String" | "string" => TsType::reference("string"),
        "Number" | "number" | "Integer" | "Int" | "Float" => TsType::reference("number"),
        "Object" | "object" | "Hash" => TsType::reference("{}"),
        "Void" | "void" => TsType::reference("void"),
        "Null" | "null" => TsType::reference("null"),
        "Undefined" | "undefined" => TsType::reference("undefined"),
        name if is_promise_like(name) => TsType::Generic {
            base: "Promise".to_string(),
            arg: Box::new(TsType::any()),
        },
        _ => return None,
    };
    Some(ty)
}
