//! Writes a document back out in the model text format.
//!
//! Parsing the output and resolving it again reproduces a document with the
//! same ids, names, members and association endpoints. Resolved references are
//! written as `@id` of their target; unresolved ones keep the id they expected.

use std::fmt;

use astrolabe_core::model::{
    Association, Attribute, Changeability, Classifier, Document, Operation, Reference, Role,
    RoleEnd, Template, TypeRef, Visibility,
};

use crate::tokens::KEYWORDS;

/// Renders `doc` in the model text format.
pub fn write(doc: &Document) -> String {
    ModelText(doc).to_string()
}

/// Display adapter producing the model text of a document.
pub struct ModelText<'a>(pub &'a Document);

impl fmt::Display for ModelText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let doc = self.0;
        let mut first = true;
        let mut separate = |f: &mut fmt::Formatter<'_>| -> fmt::Result {
            if !std::mem::take(&mut first) {
                writeln!(f)?;
            }
            Ok(())
        };

        if let Some(name) = doc.name() {
            separate(f)?;
            writeln!(f, "model {};", Word(name))?;
        }

        for (_, classifier) in doc.classifiers() {
            separate(f)?;
            write_classifier(f, doc, classifier)?;
        }

        for (_, association) in doc.associations() {
            separate(f)?;
            write_association(f, doc, association)?;
        }
        Ok(())
    }
}

fn write_classifier(f: &mut fmt::Formatter<'_>, doc: &Document, classifier: &Classifier) -> fmt::Result {
    let info = classifier.info();
    write!(
        f,
        "{} {} {}",
        classifier.kind(),
        Word(&info.id.as_string()),
        Word(&info.name)
    )?;

    let mut attrs = Attrs::default();
    attrs.flag("abstract", classifier.is_abstract());
    attrs.visibility(info.visibility);
    attrs.text("doc", &info.documentation);
    write!(f, "{attrs}")?;

    let empty = classifier.attributes().is_empty()
        && classifier.operations().is_empty()
        && classifier.templates().is_empty()
        && classifier.superclassifiers().is_empty();
    if empty {
        return writeln!(f, ";");
    }

    writeln!(f, " {{")?;
    for attribute in classifier.attributes() {
        write_attribute(f, doc, attribute)?;
    }
    for operation in classifier.operations() {
        write_operation(f, doc, operation)?;
    }
    for template in classifier.templates() {
        write_template(f, doc, template)?;
    }
    for superclassifier in classifier.superclassifiers() {
        writeln!(f, "    extends {};", Ref(doc, superclassifier))?;
    }
    writeln!(f, "}}")
}

fn write_attribute(f: &mut fmt::Formatter<'_>, doc: &Document, attribute: &Attribute) -> fmt::Result {
    let info = &attribute.info;
    let mut attrs = Attrs::default();
    attrs.visibility(info.visibility);
    attrs.text("doc", &info.documentation);
    if let Some(initial) = &attribute.initial_value {
        attrs.quoted("initial", initial);
    }
    attrs.flag("static", attribute.is_static);
    attrs.flag("const", attribute.is_constant);

    writeln!(
        f,
        "    attribute {} {}: {}{attrs};",
        Word(&info.id.as_string()),
        Word(&info.name),
        Type(doc, &attribute.type_ref)
    )
}

fn write_operation(f: &mut fmt::Formatter<'_>, doc: &Document, operation: &Operation) -> fmt::Result {
    let info = &operation.info;
    write!(
        f,
        "    operation {} {}(",
        Word(&info.id.as_string()),
        Word(&info.name)
    )?;

    for (i, parameter) in operation.parameters.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        let mut attrs = Attrs::default();
        attrs.text("doc", &parameter.info.documentation);
        if let Some(initial) = &parameter.initial_value {
            attrs.quoted("initial", initial);
        }
        write!(
            f,
            "{} {}: {}{attrs}",
            Word(&parameter.info.id.as_string()),
            Word(&parameter.info.name),
            Type(doc, &parameter.type_ref)
        )?;
    }
    write!(f, ")")?;

    if let Some(return_type) = &operation.return_type {
        write!(f, ": {}", Type(doc, return_type))?;
    }

    let mut attrs = Attrs::default();
    attrs.visibility(info.visibility);
    attrs.text("doc", &info.documentation);
    attrs.flag("abstract", operation.is_abstract);
    attrs.flag("static", operation.is_static);
    writeln!(f, "{attrs};")
}

fn write_template(f: &mut fmt::Formatter<'_>, doc: &Document, template: &Template) -> fmt::Result {
    let info = &template.info;
    write!(
        f,
        "    template {} {}",
        Word(&info.id.as_string()),
        Word(&info.name)
    )?;
    if let Some(type_ref) = &template.type_ref {
        write!(f, ": {}", Type(doc, type_ref))?;
    }

    let mut attrs = Attrs::default();
    attrs.text("doc", &info.documentation);
    writeln!(f, "{attrs};")
}

fn write_association(
    f: &mut fmt::Formatter<'_>,
    doc: &Document,
    association: &Association,
) -> fmt::Result {
    let info = association.info();
    let mut attrs = Attrs::default();
    attrs.text("name", &info.name);
    attrs.visibility(info.visibility);
    attrs.text("doc", &info.documentation);

    writeln!(
        f,
        "association {} {}{attrs} {{",
        Word(&info.id.as_string()),
        association.kind()
    )?;
    for end in [RoleEnd::A, RoleEnd::B] {
        write_role(f, doc, end, association.role(end))?;
    }
    writeln!(f, "}}")
}

fn write_role(f: &mut fmt::Formatter<'_>, doc: &Document, end: RoleEnd, role: &Role) -> fmt::Result {
    let end = match end {
        RoleEnd::A => "a",
        RoleEnd::B => "b",
    };

    let mut attrs = Attrs::default();
    attrs.text("name", &role.name);
    attrs.text("multiplicity", &role.multiplicity);
    attrs.visibility(role.visibility);
    if role.changeability != Changeability::default() {
        attrs.word("changeability", role.changeability.into());
    }
    attrs.text("doc", &role.documentation);

    writeln!(f, "    role {end} {}{attrs};", Ref(doc, &role.object))
}

/// Bracketed attribute list; prints nothing when empty.
#[derive(Default)]
struct Attrs(Vec<String>);

impl Attrs {
    fn flag(&mut self, key: &str, set: bool) {
        if set {
            self.0.push(key.to_string());
        }
    }

    fn word(&mut self, key: &str, value: &str) {
        self.0.push(format!("{key}={value}"));
    }

    /// Quoted value, always written.
    fn quoted(&mut self, key: &str, value: &str) {
        self.0.push(format!("{key}={}", Quoted(value)));
    }

    /// Quoted value, skipped when empty.
    fn text(&mut self, key: &str, value: &str) {
        if !value.is_empty() {
            self.quoted(key, value);
        }
    }

    fn visibility(&mut self, visibility: Visibility) {
        if visibility != Visibility::default() {
            self.word("visibility", visibility.into());
        }
    }
}

impl fmt::Display for Attrs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return Ok(());
        }
        write!(f, " [{}]", self.0.join(", "))
    }
}

/// An id or name, quoted unless it lexes as a plain identifier.
struct Word<'a>(&'a str);

impl fmt::Display for Word<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if is_plain_identifier(self.0) {
            write!(f, "{}", self.0)
        } else {
            write!(f, "{}", Quoted(self.0))
        }
    }
}

fn is_plain_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !KEYWORDS.contains(&text)
}

/// A string literal with the escapes the lexer understands.
struct Quoted<'a>(&'a str);

impl fmt::Display for Quoted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"")?;
        for c in self.0.chars() {
            match c {
                '"' => write!(f, "\\\"")?,
                '\\' => write!(f, "\\\\")?,
                '\n' => write!(f, "\\n")?,
                '\r' => write!(f, "\\r")?,
                '\t' => write!(f, "\\t")?,
                '\0' => write!(f, "\\0")?,
                c if c.is_control() => write!(f, "\\u{{{:x}}}", c as u32)?,
                c => write!(f, "{c}")?,
            }
        }
        write!(f, "\"")
    }
}

/// A classifier reference as `@id`.
struct Ref<'a>(&'a Document, &'a Reference);

impl fmt::Display for Ref<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Ref(doc, reference) = *self;
        let id = match reference {
            Reference::Pending(pending) => pending.id(),
            Reference::Unresolved(id) => *id,
            Reference::Resolved(idx) => match doc.classifier(*idx) {
                Some(target) => target.id(),
                None => return Err(fmt::Error),
            },
        };
        write!(f, "@{}", Word(&id.as_string()))
    }
}

/// A type position: `@id` or a literal type name.
struct Type<'a>(&'a Document, &'a TypeRef);

impl fmt::Display for Type<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.1 {
            TypeRef::Named(name) => write!(f, "{}", Quoted(name)),
            TypeRef::Classifier(reference) => write!(f, "{}", Ref(self.0, reference)),
        }
    }
}
