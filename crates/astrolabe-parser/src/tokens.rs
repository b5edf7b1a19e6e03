//! Tokens of the model text format.

use std::fmt;

use crate::span::Span;

#[derive(Debug, Clone, PartialEq)]
pub enum Token<'src> {
    // Keywords
    Model,
    Class,
    Interface,
    Enum,
    Datatype,
    Attribute,
    Operation,
    Template,
    Extends,
    Association,
    Role,

    // Literals
    StringLiteral(String),
    Identifier(&'src str),

    // Punctuation
    At,           // @
    Equals,       // =
    Colon,        // :
    LeftBrace,    // {
    RightBrace,   // }
    LeftBracket,  // [
    RightBracket, // ]
    LeftParen,    // (
    RightParen,   // )
    Semicolon,    // ;
    Comma,        // ,

    LineComment(&'src str),

    Whitespace,
    Newline,
}

impl Token<'_> {
    /// Returns `true` for whitespace, newlines and comments.
    pub fn is_trivia(&self) -> bool {
        matches!(
            self,
            Token::Whitespace | Token::Newline | Token::LineComment(_)
        )
    }
}

/// Words reserved by the format. Names and ids that collide with one of these
/// must be written as string literals.
pub const KEYWORDS: &[&str] = &[
    "model",
    "class",
    "interface",
    "enum",
    "datatype",
    "attribute",
    "operation",
    "template",
    "extends",
    "association",
    "role",
];

/// A token with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedToken<'src> {
    pub token: Token<'src>,
    pub span: Span,
}

impl<'src> PositionedToken<'src> {
    pub fn new(token: Token<'src>, span: Span) -> Self {
        Self { token, span }
    }
}

impl<'src> std::ops::Deref for PositionedToken<'src> {
    type Target = Token<'src>;

    fn deref(&self) -> &Self::Target {
        &self.token
    }
}

impl<'src> AsRef<Token<'src>> for PositionedToken<'src> {
    fn as_ref(&self) -> &Token<'src> {
        &self.token
    }
}

impl<'src> From<(Token<'src>, Span)> for PositionedToken<'src> {
    fn from((token, span): (Token<'src>, Span)) -> Self {
        Self::new(token, span)
    }
}

impl fmt::Display for PositionedToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.token.fmt(f)
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Model => write!(f, "model"),
            Token::Class => write!(f, "class"),
            Token::Interface => write!(f, "interface"),
            Token::Enum => write!(f, "enum"),
            Token::Datatype => write!(f, "datatype"),
            Token::Attribute => write!(f, "attribute"),
            Token::Operation => write!(f, "operation"),
            Token::Template => write!(f, "template"),
            Token::Extends => write!(f, "extends"),
            Token::Association => write!(f, "association"),
            Token::Role => write!(f, "role"),

            Token::StringLiteral(s) => write!(f, "\"{s}\""),
            Token::Identifier(name) => write!(f, "{name}"),

            Token::At => write!(f, "@"),
            Token::Equals => write!(f, "="),
            Token::Colon => write!(f, ":"),
            Token::LeftBrace => write!(f, "{{"),
            Token::RightBrace => write!(f, "}}"),
            Token::LeftBracket => write!(f, "["),
            Token::RightBracket => write!(f, "]"),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::Semicolon => write!(f, ";"),
            Token::Comma => write!(f, ","),

            Token::LineComment(comment) => write!(f, "//{comment}"),
            Token::Whitespace => write!(f, " "),
            Token::Newline => write!(f, "\\n"),
        }
    }
}
