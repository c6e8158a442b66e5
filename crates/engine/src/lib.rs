//! # Bstack Engine
//!
//! Fail-fast resolution of the values a test-cloud integration needs before
//! it can run: which OS version to target, which device a loose name refers
//! to, which regional API endpoint answers, which Percy token belongs to a
//! project, and which setup instructions fit a language/framework/test
//! framework combination.
//!
//! ## Architecture
//!
//! - **`version`**: total OS-version resolution with major-version and nearest fallbacks
//! - **`fuzzy`** / **`device`**: ranked fuzzy search and device lookup with ambiguity errors
//! - **`endpoint`**: one-shot regional endpoint probing with a never-failing fallback
//! - **`token`** / **`percy`**: scope-aware token caching and Percy token retrieval
//! - **`catalog`** / **`resolver`** / **`builtin`**: configuration tables, integration-path
//!   selection, and instruction assembly
//! - **`setup`**: the end-to-end setup flow that ties the above together
//!
//! Every failure is a [`ResolutionError`] carrying the attempted value and the
//! alternatives that would have worked.

pub mod builtin;
pub mod catalog;
pub mod device;
pub mod endpoint;
pub mod fuzzy;
pub mod percy;
pub mod resolver;
pub mod setup;
pub mod token;
pub mod version;

pub use builtin::builtin_catalog;
pub use catalog::{
    CatalogError, CatalogKey, CommonTemplates, ConfigurationCatalog, ProjectDescriptor, Template, TemplateContext, TemplateSet,
    TemplateTable, static_template, template,
};
pub use device::{DeviceCatalogClient, DeviceSelection, find_by_name, select_device};
pub use endpoint::{DEFAULT_ENDPOINT_CANDIDATES, DEFAULT_PROBE_PATH, EmptyEndpointSet, EndpointProbe, EndpointSet, ResolvedEndpoint};
pub use fuzzy::{CandidateRecord, EXACT_SCORE, MatchResult, search};
pub use percy::{DEFAULT_PERCY_API_BASE, PercyProjectKind, PercyTokenClient};
pub use resolver::{ConfigurationResolver, STEP_DELIMITER, Selection, number_steps, strategy_plan};
pub use setup::SetupService;
pub use token::TokenCache;
pub use version::{LATEST, OLDEST, resolve_version};

pub use bstack_types::{InstructionSet, IntegrationPath, ResolutionError};
