//! Builds a model document from the parsed AST.
//!
//! Every cross-reference in the AST becomes a pending [`Reference`] and every
//! id is registered in a [`ResolutionContext`], so forward references need no
//! special handling here. Semantic problems (unknown attribute keys, bad
//! values, malformed associations, duplicate ids) are collected and reported
//! together.

use std::{collections::HashMap, str::FromStr};

use indexmap::IndexMap;
use log::{debug, info, trace};

use astrolabe_core::{
    identifier::Id,
    model::{
        Association, AssociationKind, Attribute, Changeability, Classifier, Document, ObjectInfo,
        Operation, Parameter, Reference, Role, RoleEnd, Template, TypeRef, Visibility,
    },
    resolve::{ObjectHandle, ResolutionContext},
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    parser_types as types,
    span::{Span, Spanned},
};

const CLASSIFIER_KEYS: &[&str] = &["visibility", "doc", "abstract"];
const ATTRIBUTE_KEYS: &[&str] = &["visibility", "doc", "initial", "static", "const"];
const OPERATION_KEYS: &[&str] = &["visibility", "doc", "abstract", "static"];
const PARAMETER_KEYS: &[&str] = &["doc", "initial"];
const TEMPLATE_KEYS: &[&str] = &["doc"];
const ASSOCIATION_KEYS: &[&str] = &["name", "visibility", "doc"];
const ROLE_KEYS: &[&str] = &["name", "multiplicity", "visibility", "changeability", "doc"];

type AttrMap<'a, 'src> = IndexMap<&'src str, &'a types::Attr<'src>>;

/// A document straight out of the parser, references still pending.
#[derive(Debug)]
pub struct ParsedModel {
    pub document: Document,
    /// Index of every id defined by the source.
    pub context: ResolutionContext,
}

pub(crate) struct Builder {
    document: Document,
    context: ResolutionContext,
    definitions: HashMap<Id, Span>,
    diagnostics: DiagnosticCollector,
}

impl Builder {
    pub fn new() -> Self {
        Self {
            document: Document::new(),
            context: ResolutionContext::new(),
            definitions: HashMap::new(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    pub fn build(mut self, model: &types::ModelFile<'_>) -> Result<ParsedModel, ParseError> {
        info!(items = model.items.len(); "Building model document");

        if let Some(name) = &model.name {
            self.document = self.document.with_name(name.as_str());
        }

        for item in &model.items {
            match item {
                types::Item::Classifier(decl) => self.build_classifier(decl),
                types::Item::Association(decl) => self.build_association(decl),
            }
        }

        self.diagnostics.finish()?;

        debug!(
            classifiers = self.document.classifiers().count(),
            associations = self.document.associations().count(),
            ids = self.context.len();
            "Model document built"
        );
        trace!(document:? = self.document; "Built document");

        Ok(ParsedModel {
            document: self.document,
            context: self.context,
        })
    }

    // ============================================================================
    // Classifiers
    // ============================================================================

    fn build_classifier(&mut self, decl: &types::ClassifierDecl<'_>) {
        let attrs = self.attribute_map(&decl.attrs, CLASSIFIER_KEYS, "classifier");
        let info = self.object_info(&decl.id, decl.name.as_str(), &attrs);
        let is_abstract = attrs.get("abstract").is_some_and(|attr| self.flag(attr));

        let mut classifier = Classifier::new(info, *decl.kind.inner()).with_abstract(is_abstract);

        for member in &decl.members {
            classifier = match member {
                types::MemberDecl::Attribute(attr) => {
                    classifier.with_attribute(self.build_attribute(attr))
                }
                types::MemberDecl::Operation(op) => {
                    classifier.with_operation(self.build_operation(op))
                }
                types::MemberDecl::Template(template) => {
                    classifier.with_template(self.build_template(template))
                }
                types::MemberDecl::Extends(target) => classifier
                    .with_superclassifier(Reference::pending_object(Id::new(target.as_str()))),
            };
        }

        let owner = match self.document.add_classifier(classifier) {
            Ok(idx) => idx,
            Err(err) => {
                self.diagnostics.emit(
                    Diagnostic::error(err.to_string())
                        .with_label(decl.id.span(), "cannot add classifier"),
                );
                return;
            }
        };

        self.register(&decl.id, ObjectHandle::Classifier(owner));
        for member in &decl.members {
            match member {
                types::MemberDecl::Attribute(attr) => {
                    self.register(&attr.id, ObjectHandle::Attribute { owner })
                }
                types::MemberDecl::Operation(op) => {
                    self.register(&op.id, ObjectHandle::Operation { owner });
                    for param in &op.parameters {
                        self.register(&param.id, ObjectHandle::Parameter { owner });
                    }
                }
                types::MemberDecl::Template(template) => {
                    self.register(&template.id, ObjectHandle::Template { owner })
                }
                types::MemberDecl::Extends(_) => {}
            }
        }
    }

    fn build_attribute(&mut self, decl: &types::AttributeDecl<'_>) -> Attribute {
        let attrs = self.attribute_map(&decl.attrs, ATTRIBUTE_KEYS, "attribute");
        let info = self.object_info(&decl.id, decl.name.as_str(), &attrs);

        let mut attribute = Attribute::new(info, type_ref(&decl.type_expr));
        attribute.initial_value = attrs.get("initial").and_then(|attr| self.text(attr));
        attribute.is_static = attrs.get("static").is_some_and(|attr| self.flag(attr));
        attribute.is_constant = attrs.get("const").is_some_and(|attr| self.flag(attr));
        attribute
    }

    fn build_operation(&mut self, decl: &types::OperationDecl<'_>) -> Operation {
        let attrs = self.attribute_map(&decl.attrs, OPERATION_KEYS, "operation");
        let info = self.object_info(&decl.id, decl.name.as_str(), &attrs);
        let is_abstract = attrs.get("abstract").is_some_and(|attr| self.flag(attr));

        let mut operation = Operation::new(info).with_abstract(is_abstract);
        operation.is_static = attrs.get("static").is_some_and(|attr| self.flag(attr));

        for param in &decl.parameters {
            let param_attrs = self.attribute_map(&param.attrs, PARAMETER_KEYS, "parameter");
            let info = self.object_info(&param.id, param.name.as_str(), &param_attrs);
            let mut parameter = Parameter::new(info, type_ref(&param.type_expr));
            parameter.initial_value = param_attrs.get("initial").and_then(|attr| self.text(attr));
            operation = operation.with_parameter(parameter);
        }

        if let Some(return_type) = &decl.return_type {
            operation = operation.with_return_type(type_ref(return_type));
        }
        operation
    }

    fn build_template(&mut self, decl: &types::TemplateDecl<'_>) -> Template {
        let attrs = self.attribute_map(&decl.attrs, TEMPLATE_KEYS, "template");
        let info = self.object_info(&decl.id, decl.name.as_str(), &attrs);

        let mut template = Template::new(info);
        template.type_ref = decl.type_expr.as_ref().map(type_ref);
        template
    }

    // ============================================================================
    // Associations
    // ============================================================================

    fn build_association(&mut self, decl: &types::AssociationDecl<'_>) {
        let attrs = self.attribute_map(&decl.attrs, ASSOCIATION_KEYS, "association");
        let name = attrs
            .get("name")
            .and_then(|attr| self.text(attr))
            .unwrap_or_default();
        let info = self.object_info(&decl.id, &name, &attrs);

        let kind = match AssociationKind::from_str(decl.kind.inner()) {
            Ok(kind) => Some(kind),
            Err(_) => {
                self.diagnostics.emit(
                    Diagnostic::error(format!("invalid association kind `{}`", decl.kind.inner()))
                        .with_code(ErrorCode::E205)
                        .with_label(decl.kind.span(), "unknown kind")
                        .with_help(
                            "expected one of: generalization, aggregation, composition, \
                             association, realization",
                        ),
                );
                None
            }
        };

        let mut role_a: Option<(Span, Role)> = None;
        let mut role_b: Option<(Span, Role)> = None;
        for role_decl in &decl.roles {
            let Ok(end) = RoleEnd::from_str(role_decl.end.inner()) else {
                self.diagnostics.emit(
                    Diagnostic::error(format!("invalid role end `{}`", role_decl.end.inner()))
                        .with_code(ErrorCode::E202)
                        .with_label(role_decl.end.span(), "expected `a` or `b`"),
                );
                continue;
            };
            let role = self.build_role(role_decl);
            let slot = match end {
                RoleEnd::A => &mut role_a,
                RoleEnd::B => &mut role_b,
            };
            match slot {
                Some((first, _)) => {
                    let first = *first;
                    self.diagnostics.emit(
                        Diagnostic::error(format!(
                            "association `{}` declares role {end} more than once",
                            decl.id.inner()
                        ))
                        .with_code(ErrorCode::E203)
                        .with_label(role_decl.end.span(), "duplicate role")
                        .with_secondary_label(first, "first declared here"),
                    );
                }
                None => *slot = Some((role_decl.end.span(), role)),
            }
        }

        for (end, role) in [(RoleEnd::A, &role_a), (RoleEnd::B, &role_b)] {
            if role.is_none() {
                self.diagnostics.emit(
                    Diagnostic::error(format!(
                        "association `{}` has no role {end}",
                        decl.id.inner()
                    ))
                    .with_code(ErrorCode::E204)
                    .with_label(decl.id.span(), "incomplete association")
                    .with_help("declare exactly one `role a` and one `role b`"),
                );
            }
        }

        let (Some(kind), Some((_, role_a)), Some((_, role_b))) = (kind, role_a, role_b) else {
            return;
        };

        match self
            .document
            .add_association(Association::new(info, kind, role_a, role_b))
        {
            Ok(idx) => self.register(&decl.id, ObjectHandle::Association(idx)),
            Err(err) => self.diagnostics.emit(
                Diagnostic::error(err.to_string())
                    .with_label(decl.id.span(), "cannot add association"),
            ),
        }
    }

    fn build_role(&mut self, decl: &types::RoleDecl<'_>) -> Role {
        let attrs = self.attribute_map(&decl.attrs, ROLE_KEYS, "role");

        let mut role = Role::new(Reference::pending_object(Id::new(decl.target.as_str())));
        if let Some(name) = attrs.get("name").and_then(|attr| self.text(attr)) {
            role = role.with_name(name);
        }
        if let Some(multiplicity) = attrs.get("multiplicity").and_then(|attr| self.text(attr)) {
            role = role.with_multiplicity(multiplicity);
        }
        if let Some(visibility) = attrs.get("visibility").and_then(|attr| {
            self.parsed::<Visibility>(attr, "public, protected, private, implementation")
        }) {
            role = role.with_visibility(visibility);
        }
        if let Some(changeability) = attrs
            .get("changeability")
            .and_then(|attr| self.parsed::<Changeability>(attr, "changeable, frozen, addonly"))
        {
            role = role.with_changeability(changeability);
        }
        if let Some(doc) = attrs.get("doc").and_then(|attr| self.text(attr)) {
            role = role.with_documentation(doc);
        }
        role
    }

    // ============================================================================
    // Ids
    // ============================================================================

    fn register(&mut self, id: &Spanned<String>, handle: ObjectHandle) {
        let key = Id::new(id.as_str());
        if self.context.register(key, handle).is_ok() {
            self.definitions.insert(key, id.span());
            return;
        }

        let mut diag = Diagnostic::error(format!("id `{key}` is defined more than once"))
            .with_code(ErrorCode::E200)
            .with_label(id.span(), "duplicate definition");
        if let Some(first) = self.definitions.get(&key) {
            diag = diag.with_secondary_label(*first, "first defined here");
        }
        self.diagnostics
            .emit(diag.with_help("ids must be unique within a model"));
    }

    // ============================================================================
    // Attribute Extraction Helpers
    // ============================================================================

    /// Index `attrs` by key, reporting unknown and repeated keys.
    fn attribute_map<'a, 'src>(
        &mut self,
        attrs: &'a [types::Attr<'src>],
        allowed: &[&str],
        element: &str,
    ) -> AttrMap<'a, 'src> {
        let mut map = AttrMap::with_capacity(attrs.len());
        for attr in attrs {
            let key = *attr.key.inner();
            if !allowed.contains(&key) {
                self.diagnostics.emit(
                    Diagnostic::error(format!("unknown attribute `{key}` for {element}"))
                        .with_code(ErrorCode::E201)
                        .with_label(attr.key.span(), "unknown attribute")
                        .with_help(format!("supported attributes: {}", allowed.join(", "))),
                );
                continue;
            }
            if let Some(first) = map.insert(key, attr) {
                self.diagnostics.emit(
                    Diagnostic::error(format!("attribute `{key}` is given more than once"))
                        .with_code(ErrorCode::E202)
                        .with_label(attr.span(), "repeated attribute")
                        .with_secondary_label(first.span(), "first given here"),
                );
            }
        }
        map
    }

    fn object_info(&mut self, id: &Spanned<String>, name: &str, attrs: &AttrMap<'_, '_>) -> ObjectInfo {
        let mut info = ObjectInfo::new(Id::new(id.as_str()), name);
        if let Some(visibility) = attrs.get("visibility").and_then(|attr| {
            self.parsed::<Visibility>(attr, "public, protected, private, implementation")
        }) {
            info = info.with_visibility(visibility);
        }
        if let Some(doc) = attrs.get("doc").and_then(|attr| self.text(attr)) {
            info = info.with_documentation(doc);
        }
        info
    }

    /// Value of a `key=value` attribute.
    fn text(&mut self, attr: &types::Attr<'_>) -> Option<String> {
        match &attr.value {
            Some(value) => Some(value.inner().as_str().to_string()),
            None => {
                self.diagnostics.emit(
                    Diagnostic::error(format!("attribute `{}` requires a value", attr.key.inner()))
                        .with_code(ErrorCode::E202)
                        .with_label(attr.key.span(), "missing value")
                        .with_help(format!("write `{}=\"...\"`", attr.key.inner())),
                );
                None
            }
        }
    }

    fn parsed<T: FromStr>(&mut self, attr: &types::Attr<'_>, expected: &str) -> Option<T> {
        let value = self.text(attr)?;
        match value.parse() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                self.diagnostics.emit(
                    Diagnostic::error(format!(
                        "invalid value `{value}` for attribute `{}`",
                        attr.key.inner()
                    ))
                    .with_code(ErrorCode::E202)
                    .with_label(attr.span(), "invalid value")
                    .with_help(format!("expected one of: {expected}")),
                );
                None
            }
        }
    }

    /// A bare flag is `true`; `flag=true` and `flag=false` are also accepted.
    fn flag(&mut self, attr: &types::Attr<'_>) -> bool {
        let Some(value) = &attr.value else {
            return true;
        };
        match value.inner().as_str() {
            "true" => true,
            "false" => false,
            other => {
                self.diagnostics.emit(
                    Diagnostic::error(format!(
                        "invalid value `{other}` for flag `{}`",
                        attr.key.inner()
                    ))
                    .with_code(ErrorCode::E202)
                    .with_label(value.span(), "expected `true` or `false`"),
                );
                false
            }
        }
    }
}

fn type_ref(expr: &types::TypeExpr) -> TypeRef {
    match expr {
        types::TypeExpr::Reference(id) => TypeRef::pending(Id::new(id.as_str())),
        types::TypeExpr::Literal(name) => TypeRef::named(name.as_str()),
    }
}
