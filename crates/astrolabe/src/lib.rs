//! Astrolabe - association-aware member synthesis for class models
//!
//! This library loads a class model, resolves its cross-references and derives
//! what a code emitter needs for each classifier: the fields and accessors
//! implied by attributes and association roles, and the abstract operations it
//! inherits and must implement.

pub mod cache;
pub mod config;
pub mod plan;
pub mod synthesis;

mod error;

pub use astrolabe_core::{ModelError, identifier, model, multiplicity, resolve};
pub use astrolabe_parser::LoadedModel;

pub use error::AstrolabeError;

use log::{debug, info, trace, warn};

use cache::DerivationCache;
use config::AppConfig;
use model::Document;
use plan::{ClassPlan, PlanFile};

/// Builder for loading models and deriving their class plans.
///
/// # Examples
///
/// ```rust
/// use astrolabe::{ModelBuilder, config::AppConfig};
///
/// let source = r#"
///     class c_node Node;
///     association as_tree aggregation {
///         role a @c_node [name="parent", multiplicity="0..1"];
///         role b @c_node [name="children", multiplicity="*"];
///     }
/// "#;
///
/// let builder = ModelBuilder::new(AppConfig::default());
/// let loaded = builder.parse(source).expect("Failed to parse");
/// let plans = builder.plan(&loaded.document).expect("Failed to plan");
///
/// let node = plans.class("c_node").unwrap();
/// assert!(node.member("parent").is_some());
/// assert!(node.member("children").unwrap().is_collection);
/// ```
#[derive(Default)]
pub struct ModelBuilder {
    config: AppConfig,
}

impl ModelBuilder {
    /// Create a new model builder with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse model text and resolve its references.
    ///
    /// Dangling references do not fail the load. They are listed in the
    /// returned report and the fields keep the id they expected.
    ///
    /// # Errors
    ///
    /// Returns [`AstrolabeError::Parse`] for lexer, syntax and builder errors.
    pub fn parse(&self, source: &str) -> Result<LoadedModel, AstrolabeError> {
        info!("Loading model");
        let loaded = astrolabe_parser::load(source)
            .map_err(|err| AstrolabeError::new_parse_error(err, source))?;

        if loaded.report.is_clean() {
            debug!(resolved = loaded.report.resolved; "Model loaded");
        } else {
            warn!(
                resolved = loaded.report.resolved,
                unresolved = loaded.report.unresolved.len();
                "Model loaded with dangling references"
            );
        }
        trace!(document:? = loaded.document; "Loaded document");
        Ok(loaded)
    }

    /// Create a derivation cache using this builder's configuration.
    pub fn cache(&self) -> DerivationCache {
        DerivationCache::new(self.config.synthesis.unnamed_roles.clone())
    }

    /// Derive the class plan of every classifier in `doc`.
    ///
    /// # Errors
    ///
    /// Returns [`AstrolabeError::Model`] if `doc` has not been resolved.
    pub fn plan(&self, doc: &Document) -> Result<PlanFile, AstrolabeError> {
        self.plan_with(doc, &mut self.cache())
    }

    /// Like [`plan`](Self::plan), reusing the values already in `cache`.
    pub fn plan_with(
        &self,
        doc: &Document,
        cache: &mut DerivationCache,
    ) -> Result<PlanFile, AstrolabeError> {
        info!(classifiers = doc.classifiers().count(); "Deriving class plans");
        let classes = doc
            .classifiers()
            .map(|(idx, _)| ClassPlan::build(doc, idx, cache))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(hits = cache.hits(), misses = cache.misses(); "Class plans derived");
        Ok(PlanFile {
            model: doc.name().map(str::to_string),
            classes,
        })
    }
}
