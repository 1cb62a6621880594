//! Lexer for documentation type annotations.
//!
//! Annotations are short strings such as `String|Number`,
//! `Array<Ember.Object>` or `Object... extra description`. Whitespace is kept
//! as a token because at the top level it separates the type from a trailing
//! free-text description.

use std::iter::Peekable;
use std::str::CharIndices;

/// Token kinds for type annotations.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// A (possibly dotted) type name, or `*`.
    Name(String),

    LAngle,    // <
    RAngle,    // >
    LParen,    // (
    RParen,    // )
    LBrace,    // {
    RBrace,    // }
    LBracket,  // [
    RBracket,  // ]
    Comma,     // ,
    Pipe,      // |
    Ellipsis,  // ...
    /// A character that cannot start or continue a name, such as `:`.
    Unknown(char),

    /// One or more whitespace characters.
    Whitespace,
    Eof,
}

/// A token with its kind and byte range.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn new(kind: TokenKind, start: usize, end: usize) -> Self {
        Self { kind, start, end }
    }
}

/// Lexer for type annotations.
pub struct Lexer<'src> {
    src: &'src str,
    chars: Peekable<CharIndices<'src>>,
    pos: usize,
}

impl<'src> Lexer<'src> {
    pub fn new(src: &'src str) -> Self {
        Self {
            src,
            chars: src.char_indices().peekable(),
            pos: 0,
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn advance(&mut self) -> Option<char> {
        if let Some((pos, ch)) = self.chars.next() {
            self.pos = pos + ch.len_utf8();
            Some(ch)
        } else {
            None
        }
    }

    fn at_ellipsis(&self) -> bool {
        self.src[self.pos..].starts_with("...")
    }

    /// Produce the next token.
    pub fn next_token(&mut self) -> Token {
        let start = self.pos;

        let Some(ch) = self.peek() else {
            return Token::new(TokenKind::Eof, start, start);
        };

        if ch.is_whitespace() {
            while self.peek().is_some_and(char::is_whitespace) {
                self.advance();
            }
            return Token::new(TokenKind::Whitespace, start, self.pos);
        }

        if self.at_ellipsis() {
            for _ in 0..3 {
                self.advance();
            }
            return Token::new(TokenKind::Ellipsis, start, self.pos);
        }

        let punct = match ch {
            '<' => Some(TokenKind::LAngle),
            '>' => Some(TokenKind::RAngle),
            '(' => Some(TokenKind::LParen),
            ')' => Some(TokenKind::RParen),
            '{' => Some(TokenKind::LBrace),
            '}' => Some(TokenKind::RBrace),
            '[' => Some(TokenKind::LBracket),
            ']' => Some(TokenKind::RBracket),
            ',' => Some(TokenKind::Comma),
            '|' => Some(TokenKind::Pipe),
            _ => None,
        };
        if let Some(kind) = punct {
            self.advance();
            return Token::new(kind, start, self.pos);
        }
        if !is_name_char(ch) {
            self.advance();
            return Token::new(TokenKind::Unknown(ch), start, self.pos);
        }

        self.lex_name(start)
    }

    fn lex_name(&mut self, start: usize) -> Token {
        while let Some(ch) = self.peek() {
            if !is_name_char(ch) || self.at_ellipsis() {
                break;
            }
            self.advance();
        }
        let name = self.src[start..self.pos].to_string();
        Token::new(TokenKind::Name(name), start, self.pos)
    }

    /// Tokenize the whole input. The last token is always [`TokenKind::Eof`].
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }
        tokens
    }
}

/// Characters allowed in a (dotted) type name.
fn is_name_char(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '_' | '$' | '.' | '*')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src).tokenize().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_object_shape_punctuation() {
        assert_eq!(
            kinds("foo: String"),
            vec![
                TokenKind::Name("foo".into()),
                TokenKind::Unknown(':'),
                TokenKind::Whitespace,
                TokenKind::Name("String".into()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_dotted_name() {
        assert_eq!(
            kinds("Ember.Object"),
            vec![TokenKind::Name("Ember.Object".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn test_trailing_ellipsis_splits_from_name() {
        assert_eq!(
            kinds("String..."),
            vec![
                TokenKind::Name("String".into()),
                TokenKind::Ellipsis,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_generic_and_union() {
        assert_eq!(
            kinds("Array<String, Number>|Foo"),
            vec![
                TokenKind::Name("Array".into()),
                TokenKind::LAngle,
                TokenKind::Name("String".into()),
                TokenKind::Comma,
                TokenKind::Whitespace,
                TokenKind::Name("Number".into()),
                TokenKind::RAngle,
                TokenKind::Pipe,
                TokenKind::Name("Foo".into()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_whitespace_runs_collapse() {
        let tokens = Lexer::new("Foo   bar").tokenize();
        assert_eq!(tokens[1].kind, TokenKind::Whitespace);
        assert_eq!((tokens[1].start, tokens[1].end), (3, 6));
    }

    #[test]
    fn test_star_is_a_name() {
        assert_eq!(kinds("*"), vec![TokenKind::Name("*".into()), TokenKind::Eof]);
    }
}
