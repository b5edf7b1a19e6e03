//! Error codes for the Astrolabe diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Lexer errors
//! - `E1xx` - Parser errors
//! - `E2xx` - Document building errors

use std::fmt;

/// Error codes for categorizing diagnostic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Lexer Errors (E0xx)
    // =========================================================================
    /// Unterminated string literal.
    ///
    /// A string was opened with a quote but never closed on the same line.
    E001,

    /// Unexpected character.
    E002,

    /// Invalid escape sequence.
    ///
    /// Valid escapes are: `\n`, `\r`, `\t`, `\\`, `\"`, `\0`, `\u{...}`.
    E003,

    /// Invalid unicode escape.
    ///
    /// Unicode escapes use `\u{XXXX}` with 1-6 hexadecimal digits naming a
    /// valid codepoint.
    E004,

    // =========================================================================
    // Parser Errors (E1xx)
    // =========================================================================
    /// Unexpected token.
    E100,

    /// Incomplete input.
    E101,

    // =========================================================================
    // Document Errors (E2xx)
    // =========================================================================
    /// Duplicate id.
    ///
    /// Two objects of one model were given the same id.
    E200,

    /// Unknown attribute.
    ///
    /// A bracketed attribute key is not recognised for this kind of element.
    E201,

    /// Invalid attribute value.
    E202,

    /// Duplicate role end.
    ///
    /// An association declares the same end (`a` or `b`) twice.
    E203,

    /// Missing role end.
    ///
    /// An association must declare exactly one `a` role and one `b` role.
    E204,

    /// Invalid association kind.
    E205,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E004 => "E004",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
            ErrorCode::E204 => "E204",
            ErrorCode::E205 => "E205",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "unterminated string literal",
            ErrorCode::E002 => "unexpected character",
            ErrorCode::E003 => "invalid escape sequence",
            ErrorCode::E004 => "invalid unicode escape",
            ErrorCode::E100 => "unexpected token",
            ErrorCode::E101 => "incomplete input",
            ErrorCode::E200 => "duplicate id",
            ErrorCode::E201 => "unknown attribute",
            ErrorCode::E202 => "invalid attribute value",
            ErrorCode::E203 => "duplicate role end",
            ErrorCode::E204 => "missing role end",
            ErrorCode::E205 => "invalid association kind",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
