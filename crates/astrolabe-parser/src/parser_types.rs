//! Parser AST types.
//!
//! The AST mirrors the text format one-to-one. Ids, names and bracketed
//! attributes are kept as text with their spans; the builder turns them into
//! model objects and reports semantic problems.

use astrolabe_core::model::ClassifierKind;

use crate::span::{Span, Spanned};

/// Value of a bracketed attribute: `key="text"` or `key=word`.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue<'src> {
    String(String),
    Word(&'src str),
}

impl AttrValue<'_> {
    pub fn as_str(&self) -> &str {
        match self {
            AttrValue::String(s) => s,
            AttrValue::Word(w) => w,
        }
    }
}

/// A bracketed attribute. `value` is `None` for bare flags such as `abstract`.
#[derive(Debug, Clone, PartialEq)]
pub struct Attr<'src> {
    pub key: Spanned<&'src str>,
    pub value: Option<Spanned<AttrValue<'src>>>,
}

impl Attr<'_> {
    pub fn span(&self) -> Span {
        match &self.value {
            Some(value) => self.key.span().union(value.span()),
            None => self.key.span(),
        }
    }
}

/// A type position: `@id` or a literal type name.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    Reference(Spanned<String>),
    Literal(Spanned<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelFile<'src> {
    pub name: Option<Spanned<String>>,
    pub items: Vec<Item<'src>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item<'src> {
    Classifier(ClassifierDecl<'src>),
    Association(AssociationDecl<'src>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierDecl<'src> {
    pub kind: Spanned<ClassifierKind>,
    pub id: Spanned<String>,
    pub name: Spanned<String>,
    pub attrs: Vec<Attr<'src>>,
    pub members: Vec<MemberDecl<'src>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MemberDecl<'src> {
    Attribute(AttributeDecl<'src>),
    Operation(OperationDecl<'src>),
    Template(TemplateDecl<'src>),
    /// `extends @id;`
    Extends(Spanned<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDecl<'src> {
    pub id: Spanned<String>,
    pub name: Spanned<String>,
    pub type_expr: TypeExpr,
    pub attrs: Vec<Attr<'src>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OperationDecl<'src> {
    pub id: Spanned<String>,
    pub name: Spanned<String>,
    pub parameters: Vec<ParameterDecl<'src>>,
    pub return_type: Option<TypeExpr>,
    pub attrs: Vec<Attr<'src>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDecl<'src> {
    pub id: Spanned<String>,
    pub name: Spanned<String>,
    pub type_expr: TypeExpr,
    pub attrs: Vec<Attr<'src>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateDecl<'src> {
    pub id: Spanned<String>,
    pub name: Spanned<String>,
    pub type_expr: Option<TypeExpr>,
    pub attrs: Vec<Attr<'src>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssociationDecl<'src> {
    pub id: Spanned<String>,
    /// Kind word, validated by the builder.
    pub kind: Spanned<&'src str>,
    pub attrs: Vec<Attr<'src>>,
    pub roles: Vec<RoleDecl<'src>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoleDecl<'src> {
    /// End word, `a` or `b`, validated by the builder.
    pub end: Spanned<&'src str>,
    pub target: Spanned<String>,
    pub attrs: Vec<Attr<'src>>,
}
