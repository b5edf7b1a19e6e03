//! Parser for model source tokens.
//!
//! This module transforms a token stream from the [`lexer`](super::lexer) into
//! the AST defined in [`parser_types`](super::parser_types). The public entry
//! point is [`build_model`].

use winnow::{
    Parser as _,
    combinator::{alt, delimited, opt, preceded, repeat, separated},
    error::{ContextError, ErrMode},
    stream::{Stream, TokenSlice},
    token::any,
};

use astrolabe_core::model::ClassifierKind;

use crate::{
    error::{Diagnostic, ErrorCode, Result},
    parser_types as types,
    span::{Span, Spanned},
    tokens::{PositionedToken, Token},
};

/// Context type for parser errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Context {
    /// Description of what is currently being parsed
    Label(&'static str),
    /// Remaining token count (`eof_offset()`) at error start position
    ///
    /// Used to calculate start_offset as: `tokens.len() - start_offset_value`
    StartOffset(usize),
}

type Input<'src> = ModelTokenSlice<'src>;
type IResult<O> = std::result::Result<O, ErrMode<ContextError<Context>>>;
type ModelTokenSlice<'src> = TokenSlice<'src, PositionedToken<'src>>;

/// Run `f`, turning any failure into a Cut error that remembers where `f`
/// started.
fn cut_err<'src, O, F>(input: &mut Input<'src>, f: F) -> IResult<O>
where
    F: FnOnce(&mut Input<'src>) -> IResult<O>,
{
    let start_remaining = input.eof_offset();

    match f(input) {
        Ok(o) => Ok(o),
        Err(ErrMode::Backtrack(mut e)) | Err(ErrMode::Cut(mut e)) => {
            e.push(Context::StartOffset(start_remaining));
            Err(ErrMode::Cut(e))
        }
        Err(e) => Err(e),
    }
}

fn cut_error_with_offset(input: &Input<'_>) -> ErrMode<ContextError<Context>> {
    cut_error_from_offset(input.eof_offset())
}

fn cut_error_from_offset(start_offset: usize) -> ErrMode<ContextError<Context>> {
    let mut e = ContextError::new();
    e.push(Context::StartOffset(start_offset));
    ErrMode::Cut(e)
}

fn backtrack_error_from_offset(start_offset: usize) -> ErrMode<ContextError<Context>> {
    let mut e = ContextError::new();
    e.push(Context::StartOffset(start_offset));
    ErrMode::Backtrack(e)
}

/// Parse whitespace and comments
fn ws_comment(input: &mut Input<'_>) -> IResult<()> {
    any.verify(|token: &PositionedToken<'_>| token.is_trivia())
        .void()
        .parse_next(input)
}

/// Parse zero or more whitespace/comments
fn ws_comments0(input: &mut Input<'_>) -> IResult<()> {
    repeat(0.., ws_comment).parse_next(input)
}

/// Parse one or more whitespace/comments
fn ws_comments1(input: &mut Input<'_>) -> IResult<()> {
    repeat(1.., ws_comment).parse_next(input)
}

/// Match one punctuation or keyword token and return its span.
fn punct<'src>(
    expected: Token<'static>,
    label: &'static str,
) -> impl FnMut(&mut Input<'src>) -> IResult<Span> {
    move |input: &mut Input<'src>| {
        any.verify(|token: &PositionedToken<'_>| token.token == expected)
            .map(|token: &PositionedToken<'_>| token.span)
            .context(Context::Label(label))
            .parse_next(input)
    }
}

/// Parse semicolon with optional whitespace
fn semicolon(input: &mut Input<'_>) -> IResult<()> {
    preceded(ws_comments0, punct(Token::Semicolon, "semicolon"))
        .void()
        .parse_next(input)
}

/// Parse a bare word (identifier token)
fn word<'src>(input: &mut Input<'src>) -> IResult<Spanned<&'src str>> {
    any.verify_map(|token: &PositionedToken<'_>| match &token.token {
        Token::Identifier(name) => Some(Spanned::new(*name, token.span)),
        _ => None,
    })
    .context(Context::Label("identifier"))
    .parse_next(input)
}

/// Parse string literal
fn string_literal(input: &mut Input<'_>) -> IResult<Spanned<String>> {
    any.verify_map(|token: &PositionedToken<'_>| match &token.token {
        Token::StringLiteral(s) => Some(Spanned::new(s.clone(), token.span)),
        _ => None,
    })
    .context(Context::Label("string literal"))
    .parse_next(input)
}

/// Parse an id or a name: either a bare word or a string literal
fn name_text(input: &mut Input<'_>) -> IResult<Spanned<String>> {
    alt((
        word.map(|w| w.map(|s| s.to_string())),
        string_literal,
    ))
    .parse_next(input)
}

/// Parse a placeholder reference: `@id`
fn reference(input: &mut Input<'_>) -> IResult<Spanned<String>> {
    preceded(punct(Token::At, "`@`"), name_text)
        .context(Context::Label("reference"))
        .parse_next(input)
}

/// Parse a type position: `@id` or `"literal"`
fn type_expr(input: &mut Input<'_>) -> IResult<types::TypeExpr> {
    alt((
        reference.map(types::TypeExpr::Reference),
        string_literal.map(types::TypeExpr::Literal),
    ))
    .context(Context::Label("type"))
    .parse_next(input)
}

/// Parse `: type` with surrounding whitespace
fn type_annotation(input: &mut Input<'_>) -> IResult<types::TypeExpr> {
    preceded(
        (ws_comments0, punct(Token::Colon, "`:`"), ws_comments0),
        type_expr,
    )
    .parse_next(input)
}

/// Parse an attribute value (string literal or word)
fn attr_value<'src>(input: &mut Input<'src>) -> IResult<Spanned<types::AttrValue<'src>>> {
    any.verify_map(|token: &PositionedToken<'_>| match &token.token {
        Token::StringLiteral(s) => Some(Spanned::new(
            types::AttrValue::String(s.clone()),
            token.span,
        )),
        Token::Identifier(w) => Some(Spanned::new(types::AttrValue::Word(*w), token.span)),
        _ => None,
    })
    .context(Context::Label("attribute value"))
    .parse_next(input)
}

/// Parse a single attribute: `key=value` or a bare `flag`
fn attr<'src>(input: &mut Input<'src>) -> IResult<types::Attr<'src>> {
    let key = word.parse_next(input)?;

    let value = opt(preceded(
        (ws_comments0, punct(Token::Equals, "`=`"), ws_comments0),
        attr_value,
    ))
    .parse_next(input)?;

    Ok(types::Attr { key, value })
}

/// Parse attributes wrapped in brackets
fn attr_list<'src>(input: &mut Input<'src>) -> IResult<Vec<types::Attr<'src>>> {
    delimited(
        (punct(Token::LeftBracket, "`[`"), ws_comments0),
        separated(
            0..,
            attr,
            (ws_comments0, punct(Token::Comma, "`,`"), ws_comments0),
        ),
        (ws_comments0, punct(Token::RightBracket, "`]`")),
    )
    .context(Context::Label("attribute list"))
    .parse_next(input)
}

/// Parse an optional bracketed attribute list
fn opt_attrs<'src>(input: &mut Input<'src>) -> IResult<Vec<types::Attr<'src>>> {
    opt(preceded(ws_comments0, attr_list))
        .map(Option::unwrap_or_default)
        .parse_next(input)
}

/// Parse `model "Name";`
fn model_header(input: &mut Input<'_>) -> IResult<Spanned<String>> {
    punct(Token::Model, "`model`").parse_next(input)?;

    cut_err(input, |input| {
        ws_comments1.parse_next(input)?;
        let name = name_text
            .context(Context::Label("model name"))
            .parse_next(input)?;
        semicolon.parse_next(input)?;
        Ok(name)
    })
}

fn classifier_keyword(input: &mut Input<'_>) -> IResult<Spanned<ClassifierKind>> {
    any.verify_map(|token: &PositionedToken<'_>| {
        let kind = match &token.token {
            Token::Class => ClassifierKind::Class,
            Token::Interface => ClassifierKind::Interface,
            Token::Enum => ClassifierKind::Enumeration,
            Token::Datatype => ClassifierKind::Datatype,
            _ => return None,
        };
        Some(Spanned::new(kind, token.span))
    })
    .context(Context::Label("classifier keyword"))
    .parse_next(input)
}

/// Parse `id name` after a declaration keyword
fn id_and_name(input: &mut Input<'_>) -> IResult<(Spanned<String>, Spanned<String>)> {
    ws_comments1.parse_next(input)?;
    let id = name_text.context(Context::Label("id")).parse_next(input)?;
    ws_comments0.parse_next(input)?;
    let name = name_text.context(Context::Label("name")).parse_next(input)?;
    Ok((id, name))
}

/// Parse a classifier declaration
///
/// Syntax: `class id Name [attrs] { members }` or `class id Name [attrs];`
fn classifier<'src>(input: &mut Input<'src>) -> IResult<types::Item<'src>> {
    let kind = classifier_keyword.parse_next(input)?;

    cut_err(input, |input| {
        let (id, name) = id_and_name(input)?;
        let attrs = opt_attrs.parse_next(input)?;
        ws_comments0.parse_next(input)?;

        let members = alt((
            punct(Token::Semicolon, "semicolon").map(|_| Vec::new()),
            delimited(
                (punct(Token::LeftBrace, "`{`"), ws_comments0),
                members,
                (ws_comments0, punct(Token::RightBrace, "`}`")),
            ),
        ))
        .context(Context::Label("classifier body"))
        .parse_next(input)?;

        Ok(types::Item::Classifier(types::ClassifierDecl {
            kind,
            id,
            name,
            attrs,
            members,
        }))
    })
}

/// Parse `attribute id name: type [attrs];`
fn attribute_decl<'src>(input: &mut Input<'src>) -> IResult<types::MemberDecl<'src>> {
    punct(Token::Attribute, "`attribute`").parse_next(input)?;

    cut_err(input, |input| {
        let (id, name) = id_and_name(input)?;
        let type_expr = type_annotation
            .context(Context::Label("attribute type"))
            .parse_next(input)?;
        let attrs = opt_attrs.parse_next(input)?;
        semicolon.parse_next(input)?;

        Ok(types::MemberDecl::Attribute(types::AttributeDecl {
            id,
            name,
            type_expr,
            attrs,
        }))
    })
}

/// Parse `id name: type [attrs]` inside an operation's parentheses
fn parameter_decl<'src>(input: &mut Input<'src>) -> IResult<types::ParameterDecl<'src>> {
    let id = name_text
        .context(Context::Label("parameter id"))
        .parse_next(input)?;
    ws_comments0.parse_next(input)?;
    let name = name_text
        .context(Context::Label("parameter name"))
        .parse_next(input)?;
    let type_expr = type_annotation
        .context(Context::Label("parameter type"))
        .parse_next(input)?;
    let attrs = opt_attrs.parse_next(input)?;

    Ok(types::ParameterDecl {
        id,
        name,
        type_expr,
        attrs,
    })
}

/// Parse `operation id name(params): type [attrs];`
fn operation_decl<'src>(input: &mut Input<'src>) -> IResult<types::MemberDecl<'src>> {
    punct(Token::Operation, "`operation`").parse_next(input)?;

    cut_err(input, |input| {
        let (id, name) = id_and_name(input)?;
        ws_comments0.parse_next(input)?;

        let parameters = delimited(
            (punct(Token::LeftParen, "`(`"), ws_comments0),
            separated(
                0..,
                parameter_decl,
                (ws_comments0, punct(Token::Comma, "`,`"), ws_comments0),
            ),
            (ws_comments0, punct(Token::RightParen, "`)`")),
        )
        .context(Context::Label("parameter list"))
        .parse_next(input)?;

        let return_type = opt(type_annotation).parse_next(input)?;
        let attrs = opt_attrs.parse_next(input)?;
        semicolon.parse_next(input)?;

        Ok(types::MemberDecl::Operation(types::OperationDecl {
            id,
            name,
            parameters,
            return_type,
            attrs,
        }))
    })
}

/// Parse `template id name [: type] [attrs];`
fn template_decl<'src>(input: &mut Input<'src>) -> IResult<types::MemberDecl<'src>> {
    punct(Token::Template, "`template`").parse_next(input)?;

    cut_err(input, |input| {
        let (id, name) = id_and_name(input)?;
        let type_expr = opt(type_annotation).parse_next(input)?;
        let attrs = opt_attrs.parse_next(input)?;
        semicolon.parse_next(input)?;

        Ok(types::MemberDecl::Template(types::TemplateDecl {
            id,
            name,
            type_expr,
            attrs,
        }))
    })
}

/// Parse `extends @id;`
fn extends_decl<'src>(input: &mut Input<'src>) -> IResult<types::MemberDecl<'src>> {
    punct(Token::Extends, "`extends`").parse_next(input)?;

    cut_err(input, |input| {
        ws_comments0.parse_next(input)?;
        let target = reference
            .context(Context::Label("superclassifier reference"))
            .parse_next(input)?;
        semicolon.parse_next(input)?;
        Ok(types::MemberDecl::Extends(target))
    })
}

fn members<'src>(input: &mut Input<'src>) -> IResult<Vec<types::MemberDecl<'src>>> {
    repeat(
        0..,
        preceded(
            ws_comments0,
            alt((
                attribute_decl,
                operation_decl,
                template_decl,
                extends_decl,
                invalid_statement_with_semicolon,
            )),
        ),
    )
    .parse_next(input)
}

/// Parse `role end @target [attrs];`
fn role_decl<'src>(input: &mut Input<'src>) -> IResult<types::RoleDecl<'src>> {
    punct(Token::Role, "`role`").parse_next(input)?;

    cut_err(input, |input| {
        ws_comments1.parse_next(input)?;
        let end = word.context(Context::Label("role end")).parse_next(input)?;
        ws_comments0.parse_next(input)?;
        let target = reference
            .context(Context::Label("role object reference"))
            .parse_next(input)?;
        let attrs = opt_attrs.parse_next(input)?;
        semicolon.parse_next(input)?;

        Ok(types::RoleDecl { end, target, attrs })
    })
}

/// Parse the kind word of an association.
///
/// `association` is a keyword, so the plain kind needs its own match.
fn association_kind<'src>(input: &mut Input<'src>) -> IResult<Spanned<&'src str>> {
    any.verify_map(|token: &PositionedToken<'_>| match &token.token {
        Token::Identifier(name) => Some(Spanned::new(*name, token.span)),
        Token::Association => Some(Spanned::new("association", token.span)),
        _ => None,
    })
    .parse_next(input)
}

/// Parse an association declaration
///
/// Syntax: `association id kind [attrs] { role a @x [...]; role b @y [...]; }`
fn association<'src>(input: &mut Input<'src>) -> IResult<types::Item<'src>> {
    punct(Token::Association, "`association`").parse_next(input)?;

    cut_err(input, |input| {
        ws_comments1.parse_next(input)?;
        let id = name_text.context(Context::Label("id")).parse_next(input)?;
        ws_comments1.parse_next(input)?;
        let kind = association_kind
            .context(Context::Label("association kind"))
            .parse_next(input)?;
        let attrs = opt_attrs.parse_next(input)?;
        ws_comments0.parse_next(input)?;

        let roles = delimited(
            (punct(Token::LeftBrace, "`{`"), ws_comments0),
            repeat(
                0..,
                preceded(
                    ws_comments0,
                    alt((role_decl, invalid_statement_with_semicolon)),
                ),
            ),
            (ws_comments0, punct(Token::RightBrace, "`}`")),
        )
        .context(Context::Label("association body"))
        .parse_next(input)?;

        Ok(types::Item::Association(types::AssociationDecl {
            id,
            kind,
            attrs,
            roles,
        }))
    })
}

fn items<'src>(input: &mut Input<'src>) -> IResult<Vec<types::Item<'src>>> {
    repeat(
        0..,
        preceded(
            ws_comments0,
            alt((classifier, association, invalid_statement_with_semicolon)),
        ),
    )
    .parse_next(input)
}

/// Catch-all parser for invalid syntax.
///
/// Consumes tokens up to a semicolon or a closing delimiter. Returns a Cut
/// error if a semicolon was found or meaningful tokens were consumed before the
/// delimiter, a Backtrack error otherwise.
fn invalid_statement_with_semicolon<O>(input: &mut Input<'_>) -> IResult<O> {
    let mut consumed_meaningful_tokens = false;
    let start_offset = input.eof_offset();

    loop {
        let checkpoint = input.checkpoint();
        match any::<_, ErrMode<ContextError>>.parse_next(input) {
            Ok(token) => {
                if !token.is_trivia()
                    && !matches!(token.token, Token::RightBrace | Token::RightBracket)
                {
                    consumed_meaningful_tokens = true;
                }

                if matches!(token.token, Token::RightBrace | Token::RightBracket) {
                    input.reset(&checkpoint);
                    if consumed_meaningful_tokens {
                        return Err(cut_error_from_offset(start_offset));
                    }
                    break;
                }

                if matches!(token.token, Token::Semicolon) {
                    return Err(cut_error_from_offset(start_offset));
                }
            }
            Err(_) => {
                input.reset(&checkpoint);
                break;
            }
        }
    }

    Err(backtrack_error_from_offset(start_offset))
}

/// Parse a complete model file
fn model_file<'src>(input: &mut Input<'src>) -> IResult<types::ModelFile<'src>> {
    ws_comments0.parse_next(input)?;
    let name = opt(model_header).parse_next(input)?;
    let items = items.parse_next(input)?;
    ws_comments0.parse_next(input)?;

    if !input.is_empty() {
        return Err(cut_error_with_offset(input));
    }

    Ok(types::ModelFile { name, items })
}

/// Convert winnow errors to a diagnostic.
///
/// Extracts position information from error context (StartOffset) and
/// calculates the error span from the token array.
fn convert_error(
    error: ErrMode<ContextError<Context>>,
    tokens: &[PositionedToken],
    current_remaining: usize,
) -> Diagnostic {
    let start_remaining = match &error {
        ErrMode::Backtrack(e) | ErrMode::Cut(e) => e.context().find_map(|ctx| match ctx {
            Context::StartOffset(n) => Some(*n),
            _ => None,
        }),
        _ => None,
    };

    let end_offset = tokens.len() - current_remaining;
    let start_offset = start_remaining.map(|r| tokens.len() - r).unwrap_or(0);

    let meaningful_span = |range: std::ops::Range<usize>| -> Span {
        let slice = &tokens[range];
        let first = slice.iter().find(|t| !t.is_trivia()).or(slice.first());
        let last = slice.iter().rev().find(|t| !t.is_trivia()).or(slice.last());
        match (first, last) {
            (Some(first), Some(last)) => first.span.union(last.span),
            _ => Span::default(),
        }
    };

    match error {
        ErrMode::Backtrack(e) | ErrMode::Cut(e) => {
            let contexts: Vec<String> = e
                .context()
                .filter_map(|ctx| match ctx {
                    Context::Label(label) => Some(format!("expected {label}")),
                    _ => None,
                })
                .collect();

            let message = if contexts.is_empty() {
                "unexpected token or end of input".to_string()
            } else {
                contexts.join(" → ")
            };

            let examine_range = if start_offset < end_offset {
                start_offset..end_offset
            } else if end_offset < tokens.len() {
                if matches!(
                    tokens[end_offset].token,
                    Token::RightBrace | Token::RightBracket
                ) {
                    // Missing semicolon before a closing delimiter
                    0..end_offset
                } else {
                    end_offset..end_offset + 1
                }
            } else {
                0..tokens.len()
            };

            Diagnostic::error(format!("unexpected token: {message}"))
                .with_code(ErrorCode::E100)
                .with_label(meaningful_span(examine_range), "unexpected token")
                .with_help("check syntax and token positioning")
        }
        ErrMode::Incomplete(_) => {
            let error_span = if end_offset < tokens.len() {
                tokens[end_offset].span
            } else {
                meaningful_span(0..tokens.len())
            };

            Diagnostic::error("incomplete input, more tokens expected")
                .with_code(ErrorCode::E101)
                .with_label(error_span, "incomplete")
                .with_help("ensure input is complete")
        }
    }
}

/// Build a model AST from tokens
pub fn build_model<'src>(
    tokens: &'src [PositionedToken<'src>],
) -> Result<types::ModelFile<'src>> {
    let mut token_slice = TokenSlice::new(tokens);

    match model_file.parse_next(&mut token_slice) {
        Ok(model) => Ok(model),
        Err(e) => {
            let current_remaining = token_slice.eof_offset();
            Err(convert_error(e, tokens, current_remaining))
        }
    }
}
