//! Class plans: everything a code emitter needs for one classifier.

use serde::Serialize;

use astrolabe_core::{
    ModelError,
    identifier::Id,
    model::{Classifier, ClassifierIdx, ClassifierKind, Document, Visibility},
};

use crate::{
    cache::DerivationCache,
    synthesis::{MemberSpec, ObligationSet},
};

/// Identity of the classifier a plan is for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifierSummary {
    pub id: Id,
    pub name: String,
    pub kind: ClassifierKind,
    pub is_abstract: bool,
    pub visibility: Visibility,
    pub documentation: String,
    /// Names of the template parameters, in declaration order.
    pub templates: Vec<String>,
}

impl From<&Classifier> for ClassifierSummary {
    fn from(classifier: &Classifier) -> Self {
        Self {
            id: classifier.id(),
            name: classifier.name().to_string(),
            kind: classifier.kind(),
            is_abstract: classifier.is_abstract(),
            visibility: classifier.info().visibility,
            documentation: classifier.info().documentation.clone(),
            templates: classifier
                .templates()
                .iter()
                .map(|template| template.info.name.clone())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassPlan {
    pub classifier: ClassifierSummary,
    pub members: Vec<MemberSpec>,
    pub obligations: ObligationSet,
}

impl ClassPlan {
    /// Builds the plan of the classifier at `idx` through `cache`.
    pub fn build(
        doc: &Document,
        idx: ClassifierIdx,
        cache: &mut DerivationCache,
    ) -> Result<Self, ModelError> {
        let classifier = doc
            .classifier(idx)
            .ok_or(ModelError::UnknownClassifier(idx))?;
        Ok(Self {
            classifier: classifier.into(),
            members: cache.members(doc, idx)?.to_vec(),
            obligations: cache.obligations(doc, idx)?.clone(),
        })
    }

    pub fn member(&self, field_name: &str) -> Option<&MemberSpec> {
        self.members.iter().find(|m| m.field_name == field_name)
    }
}

/// The plans of a whole document, in classifier order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlanFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub classes: Vec<ClassPlan>,
}

impl PlanFile {
    pub fn class(&self, id: &str) -> Option<&ClassPlan> {
        self.classes.iter().find(|plan| plan.classifier.id == id)
    }
}
