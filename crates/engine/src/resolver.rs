//! Integration-path selection and instruction assembly.
//!
//! Each [`PercyMode`] maps to an ordered plan of integration paths. The
//! resolver walks the plan, keeps the first path the catalog supports, and
//! reports when it had to step down from the preferred one.

use std::fmt;
use std::sync::Arc;

use bstack_types::{InstructionSet, IntegrationPath, PercyMode, ResolutionError};
use tracing::{debug, info};

use crate::catalog::{ConfigurationCatalog, ProjectDescriptor, Template, TemplateContext, TemplateSet};

/// Separates individual steps inside rendered template output.
pub const STEP_DELIMITER: &str = "---STEP---";

/// Integration paths to try for `mode`, preferred first.
pub fn strategy_plan(mode: PercyMode) -> &'static [IntegrationPath] {
    match mode {
        PercyMode::Disabled => &[IntegrationPath::Sdk],
        PercyMode::WithSdk => &[IntegrationPath::PercyWithSdk, IntegrationPath::PercyStandalone],
        PercyMode::Web => &[IntegrationPath::PercyStandalone],
    }
}

/// The outcome of path selection, ready to be rendered.
#[derive(Clone)]
pub struct Selection<'c> {
    pub path: IntegrationPath,
    /// The preferred path, when `path` is a step-down from it.
    pub fallback_from: Option<IntegrationPath>,
    framing: Vec<&'c Template>,
    templates: Vec<&'c TemplateSet>,
}

impl Selection<'_> {
    pub fn used_fallback(&self) -> bool {
        self.fallback_from.is_some()
    }
}

impl fmt::Debug for Selection<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selection")
            .field("path", &self.path)
            .field("fallback_from", &self.fallback_from)
            .field("templates", &self.templates)
            .finish_non_exhaustive()
    }
}

/// Picks an integration path for a project and assembles its steps.
#[derive(Debug, Clone)]
pub struct ConfigurationResolver {
    catalog: Arc<ConfigurationCatalog>,
}

impl ConfigurationResolver {
    pub fn new(catalog: Arc<ConfigurationCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &ConfigurationCatalog {
        &self.catalog
    }

    /// Walks the plan for the descriptor's Percy mode.
    ///
    /// If no path in the plan is supported, the error from the last path tried
    /// is returned.
    pub fn select(&self, descriptor: &ProjectDescriptor) -> Result<Selection<'_>, ResolutionError> {
        let plan = strategy_plan(descriptor.percy_mode);
        let Some((&preferred, fallbacks)) = plan.split_first() else {
            return Err(ResolutionError::not_found(descriptor.percy_mode.as_str(), PercyMode::names()));
        };

        let mut last_error = match self.selection(preferred, None, descriptor) {
            Ok(selection) => return Ok(selection),
            Err(error) => error,
        };
        for &path in fallbacks {
            debug!(preferred = %preferred, reason = %last_error, "preferred integration path unsupported");
            match self.selection(path, Some(preferred), descriptor) {
                Ok(selection) => {
                    info!(path = %path, preferred = %preferred, "stepped down to fallback integration path");
                    return Ok(selection);
                }
                Err(error) => last_error = error,
            }
        }
        Err(last_error)
    }

    /// Renders a selection into numbered steps.
    pub fn assemble(&self, selection: &Selection<'_>, context: &TemplateContext) -> InstructionSet {
        let mut outputs: Vec<String> = selection.framing.iter().map(|template| template(context)).collect();
        for set in &selection.templates {
            outputs.extend(set.render(context));
        }

        InstructionSet {
            path: selection.path,
            fallback_from: selection.fallback_from,
            steps: number_steps(&outputs),
        }
    }

    /// [`Self::select`] followed by [`Self::assemble`].
    pub fn resolve(&self, descriptor: &ProjectDescriptor, context: &TemplateContext) -> Result<InstructionSet, ResolutionError> {
        let selection = self.select(descriptor)?;
        Ok(self.assemble(&selection, context))
    }

    fn selection(
        &self,
        path: IntegrationPath,
        fallback_from: Option<IntegrationPath>,
        descriptor: &ProjectDescriptor,
    ) -> Result<Selection<'_>, ResolutionError> {
        let catalog = self.catalog.as_ref();
        let common = &catalog.common;
        let (framing, templates) = match path {
            IntegrationPath::Sdk => (vec![&common.credentials], vec![catalog.sdk.lookup(descriptor)?]),
            IntegrationPath::PercyWithSdk => {
                let sdk = catalog.sdk.lookup(descriptor)?;
                let percy = catalog.percy_with_sdk.lookup(descriptor)?;
                (vec![&common.credentials, &common.percy_token], vec![sdk, percy])
            }
            IntegrationPath::PercyStandalone => (vec![&common.percy_token], vec![catalog.percy_standalone.lookup(descriptor)?]),
        };
        Ok(Selection {
            path,
            fallback_from,
            framing,
            templates,
        })
    }
}

/// Joins template outputs, splits them on [`STEP_DELIMITER`], drops blank
/// steps and numbers the rest from 1. Step bodies are only trimmed.
pub fn number_steps<S: AsRef<str>>(outputs: &[S]) -> Vec<String> {
    let joined = outputs
        .iter()
        .map(AsRef::as_ref)
        .filter(|output| !output.trim().is_empty())
        .collect::<Vec<_>>()
        .join(STEP_DELIMITER);

    joined
        .split(STEP_DELIMITER)
        .map(str::trim)
        .filter(|step| !step.is_empty())
        .enumerate()
        .map(|(index, step)| format!("Step {}: {step}", index + 1))
        .collect()
}
