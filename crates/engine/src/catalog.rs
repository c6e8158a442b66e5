//! Configuration catalogs keyed by language, framework and test framework.
//!
//! A catalog is a flat table from [`CatalogKey`] to a [`TemplateSet`]. A key
//! with no test framework applies to every test framework of its
//! language/framework pair. Lookups fail at the first dimension that has no
//! entry, listing what the table does support at that level.

use std::fmt;
use std::sync::Arc;

use bstack_types::{AutomationFramework, Credentials, Language, PercyMode, ResolutionError, TestFramework};
use indexmap::{IndexMap, IndexSet};
use thiserror::Error;

/// Values a template may render.
#[derive(Debug, Clone)]
pub struct TemplateContext {
    pub credentials: Credentials,
    pub percy_token: Option<String>,
    pub project_name: Option<String>,
}

impl TemplateContext {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            percy_token: None,
            project_name: None,
        }
    }

    pub fn with_percy_token(mut self, token: Option<String>) -> Self {
        self.percy_token = token;
        self
    }

    pub fn with_project_name(mut self, project_name: impl Into<String>) -> Self {
        self.project_name = Some(project_name.into());
        self
    }

    pub fn username(&self) -> &str {
        &self.credentials.username
    }

    pub fn access_key(&self) -> &str {
        &self.credentials.access_key
    }
}

/// Renders one chunk of instruction text. The output may hold several steps
/// separated by [`crate::STEP_DELIMITER`].
pub type Template = Arc<dyn Fn(&TemplateContext) -> String + Send + Sync>;

/// Wraps a closure as a [`Template`].
pub fn template(render: impl Fn(&TemplateContext) -> String + Send + Sync + 'static) -> Template {
    Arc::new(render)
}

/// A template that ignores its context.
pub fn static_template(text: impl Into<String>) -> Template {
    let text = text.into();
    Arc::new(move |_| text.clone())
}

/// Ordered templates stored under one catalog key.
#[derive(Clone, Default)]
pub struct TemplateSet {
    templates: Vec<Template>,
}

impl TemplateSet {
    pub fn new(templates: Vec<Template>) -> Self {
        Self { templates }
    }

    pub fn render(&self, context: &TemplateContext) -> Vec<String> {
        self.templates.iter().map(|template| template(context)).collect()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl fmt::Debug for TemplateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateSet").field("templates", &self.templates.len()).finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CatalogKey {
    pub language: Language,
    pub framework: AutomationFramework,
    /// `None` matches any test framework.
    pub test_framework: Option<TestFramework>,
}

impl CatalogKey {
    pub fn new(language: Language, framework: AutomationFramework, test_framework: Option<TestFramework>) -> Self {
        Self {
            language,
            framework,
            test_framework,
        }
    }
}

impl fmt::Display for CatalogKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.test_framework {
            Some(test_framework) => write!(f, "{}/{}/{}", self.language, self.framework, test_framework),
            None => write!(f, "{}/{}/*", self.language, self.framework),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("duplicate catalog entry for {table}: {key}")]
    Duplicate { table: &'static str, key: String },

    #[error("catalog entry {key} in {table} has no templates")]
    Empty { table: &'static str, key: String },
}

/// One lookup table, e.g. the SDK table or the standalone Percy table.
#[derive(Debug, Clone)]
pub struct TemplateTable {
    name: &'static str,
    entries: IndexMap<CatalogKey, TemplateSet>,
}

impl TemplateTable {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Adds an entry, rejecting duplicate keys and empty template sets.
    pub fn insert(&mut self, key: CatalogKey, templates: TemplateSet) -> Result<(), CatalogError> {
        if templates.is_empty() {
            return Err(CatalogError::Empty {
                table: self.name,
                key: key.to_string(),
            });
        }
        if self.entries.contains_key(&key) {
            return Err(CatalogError::Duplicate {
                table: self.name,
                key: key.to_string(),
            });
        }
        self.entries.insert(key, templates);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Languages with at least one entry, in insertion order.
    pub fn languages(&self) -> Vec<String> {
        distinct(self.entries.keys().map(|key| key.language.as_str()))
    }

    pub fn frameworks(&self, language: Language) -> Vec<String> {
        distinct(
            self.entries
                .keys()
                .filter(|key| key.language == language)
                .map(|key| key.framework.as_str()),
        )
    }

    pub fn test_frameworks(&self, language: Language, framework: AutomationFramework) -> Vec<String> {
        distinct(
            self.entries
                .keys()
                .filter(|key| key.language == language && key.framework == framework)
                .filter_map(|key| key.test_framework.map(|test_framework| test_framework.as_str())),
        )
    }

    /// Exact key first, then the language/framework wildcard.
    pub fn lookup(&self, descriptor: &ProjectDescriptor) -> Result<&TemplateSet, ResolutionError> {
        let ProjectDescriptor {
            language,
            framework,
            test_framework,
            ..
        } = *descriptor;

        if !self.entries.keys().any(|key| key.language == language) {
            return Err(ResolutionError::UnsupportedLanguage {
                language: language.to_string(),
                supported: self.languages(),
            });
        }
        if !self.entries.keys().any(|key| key.language == language && key.framework == framework) {
            return Err(ResolutionError::UnsupportedFramework {
                language: language.to_string(),
                framework: framework.to_string(),
                supported: self.frameworks(language),
            });
        }

        self.entries
            .get(&CatalogKey::new(language, framework, Some(test_framework)))
            .or_else(|| self.entries.get(&CatalogKey::new(language, framework, None)))
            .ok_or_else(|| ResolutionError::UnsupportedTestFramework {
                language: language.to_string(),
                framework: framework.to_string(),
                test_framework: test_framework.to_string(),
                supported: self.test_frameworks(language, framework),
            })
    }

    pub fn supports(&self, descriptor: &ProjectDescriptor) -> bool {
        self.lookup(descriptor).is_ok()
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let unique: IndexSet<&str> = values.collect();
    unique.into_iter().map(str::to_string).collect()
}

/// Shared steps that frame every instruction set.
#[derive(Clone)]
pub struct CommonTemplates {
    /// Exports the cloud credentials. Used by SDK-based paths.
    pub credentials: Template,
    /// Exports the Percy token. Used by Percy paths.
    pub percy_token: Template,
}

impl fmt::Debug for CommonTemplates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommonTemplates").finish_non_exhaustive()
    }
}

/// The three lookup tables plus the shared framing steps.
#[derive(Debug, Clone)]
pub struct ConfigurationCatalog {
    pub sdk: TemplateTable,
    pub percy_with_sdk: TemplateTable,
    pub percy_standalone: TemplateTable,
    pub common: CommonTemplates,
}

impl ConfigurationCatalog {
    pub fn new(common: CommonTemplates) -> Self {
        Self {
            sdk: TemplateTable::new("sdk"),
            percy_with_sdk: TemplateTable::new("percy_with_sdk"),
            percy_standalone: TemplateTable::new("percy_standalone"),
            common,
        }
    }

    /// Every language any table knows, in first-seen order.
    pub fn languages(&self) -> Vec<String> {
        let mut all = self.sdk.languages();
        all.extend(self.percy_standalone.languages());
        all.extend(self.percy_with_sdk.languages());
        distinct(all.iter().map(String::as_str))
    }

    fn frameworks(&self, language: Language) -> Vec<String> {
        let mut all = self.sdk.frameworks(language);
        all.extend(self.percy_standalone.frameworks(language));
        all.extend(self.percy_with_sdk.frameworks(language));
        distinct(all.iter().map(String::as_str))
    }

    fn test_frameworks(&self, language: Language, framework: AutomationFramework) -> Vec<String> {
        let mut all = self.sdk.test_frameworks(language, framework);
        all.extend(self.percy_with_sdk.test_frameworks(language, framework));
        distinct(all.iter().map(String::as_str))
    }
}

/// The four dimensions a setup request is resolved on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProjectDescriptor {
    pub language: Language,
    pub framework: AutomationFramework,
    pub test_framework: TestFramework,
    pub percy_mode: PercyMode,
}

impl ProjectDescriptor {
    pub fn new(language: Language, framework: AutomationFramework, test_framework: TestFramework, percy_mode: PercyMode) -> Self {
        Self {
            language,
            framework,
            test_framework,
            percy_mode,
        }
    }

    /// Parses raw caller input.
    ///
    /// Unknown values fail with the same error a lookup would raise, listing
    /// what `catalog` supports at that level. A blank `percy_mode` means
    /// disabled.
    pub fn parse(
        catalog: &ConfigurationCatalog,
        language: &str,
        framework: &str,
        test_framework: &str,
        percy_mode: Option<&str>,
    ) -> Result<Self, ResolutionError> {
        let parsed_language = Language::parse(language).ok_or_else(|| ResolutionError::UnsupportedLanguage {
            language: language.trim().to_string(),
            supported: catalog.languages(),
        })?;
        let parsed_framework =
            AutomationFramework::parse(framework).ok_or_else(|| ResolutionError::UnsupportedFramework {
                language: parsed_language.to_string(),
                framework: framework.trim().to_string(),
                supported: catalog.frameworks(parsed_language),
            })?;
        let parsed_test_framework =
            TestFramework::parse(test_framework).ok_or_else(|| ResolutionError::UnsupportedTestFramework {
                language: parsed_language.to_string(),
                framework: parsed_framework.to_string(),
                test_framework: test_framework.trim().to_string(),
                supported: catalog.test_frameworks(parsed_language, parsed_framework),
            })?;
        let parsed_mode = match percy_mode.map(str::trim).filter(|mode| !mode.is_empty()) {
            None => PercyMode::Disabled,
            Some(mode) => PercyMode::parse(mode).ok_or_else(|| ResolutionError::not_found(mode, PercyMode::names()))?,
        };

        Ok(Self::new(parsed_language, parsed_framework, parsed_test_framework, parsed_mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> TemplateTable {
        let mut table = TemplateTable::new("sdk");
        let set = || TemplateSet::new(vec![static_template("step")]);
        table
            .insert(
                CatalogKey::new(Language::Nodejs, AutomationFramework::Selenium, Some(TestFramework::Jest)),
                set(),
            )
            .expect("insert");
        table
            .insert(
                CatalogKey::new(Language::Nodejs, AutomationFramework::Selenium, Some(TestFramework::Mocha)),
                set(),
            )
            .expect("insert");
        table
            .insert(CatalogKey::new(Language::Nodejs, AutomationFramework::Cypress, None), set())
            .expect("insert");
        table
            .insert(
                CatalogKey::new(Language::Python, AutomationFramework::Selenium, Some(TestFramework::Pytest)),
                set(),
            )
            .expect("insert");
        table
    }

    fn descriptor(language: Language, framework: AutomationFramework, test_framework: TestFramework) -> ProjectDescriptor {
        ProjectDescriptor::new(language, framework, test_framework, PercyMode::Disabled)
    }

    #[test]
    fn lookup_fails_at_the_first_missing_dimension() {
        let table = table();

        let error = table
            .lookup(&descriptor(Language::Ruby, AutomationFramework::Selenium, TestFramework::Jest))
            .expect_err("ruby missing");
        assert_eq!(
            error,
            ResolutionError::UnsupportedLanguage {
                language: "ruby".into(),
                supported: vec!["nodejs".into(), "python".into()],
            }
        );

        let error = table
            .lookup(&descriptor(Language::Python, AutomationFramework::Cypress, TestFramework::Pytest))
            .expect_err("python cypress missing");
        assert_eq!(error.kind(), "unsupported_framework");
        assert_eq!(error.alternatives(), ["selenium".to_string()]);

        let error = table
            .lookup(&descriptor(Language::Nodejs, AutomationFramework::Selenium, TestFramework::Pytest))
            .expect_err("pytest missing");
        assert_eq!(error.kind(), "unsupported_test_framework");
        assert_eq!(error.alternatives(), ["jest".to_string(), "mocha".to_string()]);
    }

    #[test]
    fn wildcard_entry_covers_any_test_framework() {
        let table = table();
        assert!(table.supports(&descriptor(Language::Nodejs, AutomationFramework::Cypress, TestFramework::Cypress)));
        assert!(table.supports(&descriptor(Language::Nodejs, AutomationFramework::Cypress, TestFramework::Mocha)));
    }

    #[test]
    fn duplicate_and_empty_entries_are_rejected() {
        let mut table = table();
        let key = CatalogKey::new(Language::Nodejs, AutomationFramework::Selenium, Some(TestFramework::Jest));
        let error = table
            .insert(key, TemplateSet::new(vec![static_template("again")]))
            .expect_err("duplicate");
        assert!(matches!(error, CatalogError::Duplicate { table: "sdk", .. }));

        let key = CatalogKey::new(Language::Java, AutomationFramework::Selenium, None);
        assert!(matches!(table.insert(key, TemplateSet::default()), Err(CatalogError::Empty { .. })));
    }

    #[test]
    fn parse_maps_unknown_values_onto_catalog_errors() {
        let mut catalog = ConfigurationCatalog::new(CommonTemplates {
            credentials: static_template(""),
            percy_token: static_template(""),
        });
        catalog.sdk = table();

        let error = ProjectDescriptor::parse(&catalog, "cobol", "selenium", "jest", None).expect_err("unknown language");
        assert_eq!(error.kind(), "unsupported_language");
        assert_eq!(error.alternatives(), ["nodejs".to_string(), "python".to_string()]);

        let error = ProjectDescriptor::parse(&catalog, "node", "selenium", "ava", None).expect_err("unknown runner");
        assert_eq!(error.alternatives(), ["jest".to_string(), "mocha".to_string()]);

        let parsed = ProjectDescriptor::parse(&catalog, "JS", "wdio", "junit", Some("percy-web")).expect("aliases");
        assert_eq!(
            parsed,
            ProjectDescriptor::new(Language::Nodejs, AutomationFramework::Webdriverio, TestFramework::Junit5, PercyMode::Web)
        );

        let error = ProjectDescriptor::parse(&catalog, "node", "selenium", "jest", Some("sometimes")).expect_err("mode");
        assert_eq!(error.kind(), "not_found");
    }
}
