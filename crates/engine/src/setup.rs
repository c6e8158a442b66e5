//! End-to-end setup instructions: path selection, Percy token, assembly.

use bstack_types::{Credentials, InstructionSet, ResolutionError};
use tracing::debug;

use crate::catalog::{ProjectDescriptor, TemplateContext};
use crate::percy::{PercyProjectKind, PercyTokenClient};
use crate::resolver::ConfigurationResolver;
use crate::token::TokenCache;

/// Produces setup instructions, fetching a Percy token only when the
/// selected path needs one.
pub struct SetupService {
    resolver: ConfigurationResolver,
    percy: PercyTokenClient,
    tokens: TokenCache<String>,
}

impl SetupService {
    pub fn new(resolver: ConfigurationResolver, percy: PercyTokenClient) -> Self {
        Self {
            resolver,
            percy,
            tokens: TokenCache::new(),
        }
    }

    pub fn resolver(&self) -> &ConfigurationResolver {
        &self.resolver
    }

    pub fn token_cache(&self) -> &TokenCache<String> {
        &self.tokens
    }

    /// Selects the integration path for `descriptor` and renders its steps.
    ///
    /// Unsupported descriptors fail before any network call. The Percy token
    /// is cached per project and kind.
    pub async fn instructions(
        &self,
        descriptor: &ProjectDescriptor,
        project_name: &str,
        credentials: &Credentials,
    ) -> Result<InstructionSet, ResolutionError> {
        let selection = self.resolver.select(descriptor)?;

        let percy_token = match PercyProjectKind::for_path(selection.path) {
            Some(kind) => {
                let scope = format!("{project_name}::{kind}");
                let token = self
                    .tokens
                    .get_token(&scope, || self.percy.fetch(project_name, kind, credentials))
                    .await?;
                Some(token)
            }
            None => None,
        };
        debug!(path = %selection.path, project = project_name, has_token = percy_token.is_some(), "assembling setup instructions");

        let context = TemplateContext::new(credentials.clone())
            .with_percy_token(percy_token)
            .with_project_name(project_name);
        Ok(self.resolver.assemble(&selection, &context))
    }
}
