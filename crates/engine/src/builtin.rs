//! The catalog shipped with the binary.

use bstack_types::{AutomationFramework as Fw, Language, TestFramework as Tf};

use crate::catalog::{CatalogError, CatalogKey, CommonTemplates, ConfigurationCatalog, TemplateSet, static_template, template};

const SDK_CONFIG_FILE: &str = "browserstack.yml";
const PERCY_TOKEN_PLACEHOLDER: &str = "<your-percy-token>";

/// Install/run commands for one SDK-supported combination.
struct SdkRecipe {
    key: CatalogKey,
    install: &'static str,
    run: &'static str,
}

/// How Percy hooks into one language/framework pair.
struct PercyRecipe {
    key: CatalogKey,
    install: &'static str,
    snapshot: &'static str,
    run: &'static str,
}

fn key(language: Language, framework: Fw, test_framework: Option<Tf>) -> CatalogKey {
    CatalogKey::new(language, framework, test_framework)
}

const NODE_SDK_INSTALL: &str = "npm i -D browserstack-node-sdk@latest";
const PYTHON_SDK_INSTALL: &str = "python3 -m pip install browserstack-sdk\nbrowserstack-sdk setup --framework \"{framework}\"";
const JAVA_SDK_INSTALL: &str = "Add com.browserstack:browserstack-java-sdk:LATEST to your pom.xml dependencies and the SDK javaagent to the surefire argLine.";
const DOTNET_SDK_INSTALL: &str = "dotnet add package BrowserStack.TestAdapter\ndotnet build\ndotnet browserstack-sdk setup";

fn sdk_recipes() -> Vec<SdkRecipe> {
    vec![
        SdkRecipe {
            key: key(Language::Nodejs, Fw::Selenium, Some(Tf::Jest)),
            install: NODE_SDK_INSTALL,
            run: "npx browserstack-node-sdk jest",
        },
        SdkRecipe {
            key: key(Language::Nodejs, Fw::Selenium, Some(Tf::Mocha)),
            install: NODE_SDK_INSTALL,
            run: "npx browserstack-node-sdk mocha",
        },
        SdkRecipe {
            key: key(Language::Nodejs, Fw::Selenium, Some(Tf::Cucumberjs)),
            install: NODE_SDK_INSTALL,
            run: "npx browserstack-node-sdk cucumber-js",
        },
        SdkRecipe {
            key: key(Language::Nodejs, Fw::Playwright, Some(Tf::Jest)),
            install: NODE_SDK_INSTALL,
            run: "npx browserstack-node-sdk jest",
        },
        SdkRecipe {
            key: key(Language::Nodejs, Fw::Webdriverio, Some(Tf::Mocha)),
            install: "npm i -D @wdio/browserstack-service",
            run: "npx wdio run ./wdio.conf.js",
        },
        SdkRecipe {
            key: key(Language::Nodejs, Fw::Webdriverio, Some(Tf::Cucumberjs)),
            install: "npm i -D @wdio/browserstack-service",
            run: "npx wdio run ./wdio.conf.js",
        },
        SdkRecipe {
            key: key(Language::Nodejs, Fw::Cypress, Some(Tf::Cypress)),
            install: "npm i -g browserstack-cypress-cli\nbrowserstack-cypress init",
            run: "browserstack-cypress run --sync",
        },
        SdkRecipe {
            key: key(Language::Python, Fw::Selenium, Some(Tf::Pytest)),
            install: PYTHON_SDK_INSTALL,
            run: "browserstack-sdk pytest -s tests",
        },
        SdkRecipe {
            key: key(Language::Python, Fw::Selenium, Some(Tf::Behave)),
            install: PYTHON_SDK_INSTALL,
            run: "browserstack-sdk behave features",
        },
        SdkRecipe {
            key: key(Language::Python, Fw::Selenium, Some(Tf::Robot)),
            install: PYTHON_SDK_INSTALL,
            run: "browserstack-sdk robot tests",
        },
        SdkRecipe {
            key: key(Language::Python, Fw::Playwright, Some(Tf::Pytest)),
            install: PYTHON_SDK_INSTALL,
            run: "browserstack-sdk pytest -s tests",
        },
        SdkRecipe {
            key: key(Language::Java, Fw::Selenium, Some(Tf::Testng)),
            install: JAVA_SDK_INSTALL,
            run: "mvn test -P sample-test",
        },
        SdkRecipe {
            key: key(Language::Java, Fw::Selenium, Some(Tf::Junit4)),
            install: JAVA_SDK_INSTALL,
            run: "mvn test",
        },
        SdkRecipe {
            key: key(Language::Java, Fw::Selenium, Some(Tf::Junit5)),
            install: JAVA_SDK_INSTALL,
            run: "mvn test",
        },
        SdkRecipe {
            key: key(Language::CSharp, Fw::Selenium, Some(Tf::Nunit)),
            install: DOTNET_SDK_INSTALL,
            run: "dotnet test",
        },
        SdkRecipe {
            key: key(Language::CSharp, Fw::Selenium, Some(Tf::Xunit)),
            install: DOTNET_SDK_INSTALL,
            run: "dotnet test",
        },
        SdkRecipe {
            key: key(Language::CSharp, Fw::Selenium, Some(Tf::Mstest)),
            install: DOTNET_SDK_INSTALL,
            run: "dotnet test",
        },
    ]
}

fn percy_with_sdk_keys() -> Vec<CatalogKey> {
    vec![
        key(Language::Nodejs, Fw::Selenium, Some(Tf::Jest)),
        key(Language::Nodejs, Fw::Selenium, Some(Tf::Mocha)),
        key(Language::Nodejs, Fw::Webdriverio, Some(Tf::Mocha)),
        key(Language::Python, Fw::Selenium, Some(Tf::Pytest)),
        key(Language::Java, Fw::Selenium, Some(Tf::Testng)),
    ]
}

fn percy_standalone_recipes() -> Vec<PercyRecipe> {
    vec![
        PercyRecipe {
            key: key(Language::Nodejs, Fw::Selenium, None),
            install: "npm i -D @percy/cli @percy/selenium-webdriver",
            snapshot: "const percySnapshot = require('@percy/selenium-webdriver');\nawait percySnapshot(driver, 'Home page');",
            run: "npx percy exec -- <your test command>",
        },
        PercyRecipe {
            key: key(Language::Nodejs, Fw::Playwright, None),
            install: "npm i -D @percy/cli @percy/playwright",
            snapshot: "const percySnapshot = require('@percy/playwright');\nawait percySnapshot(page, 'Home page');",
            run: "npx percy exec -- npx playwright test",
        },
        PercyRecipe {
            key: key(Language::Nodejs, Fw::Cypress, None),
            install: "npm i -D @percy/cli @percy/cypress",
            snapshot: "import '@percy/cypress';\ncy.percySnapshot('Home page');",
            run: "npx percy exec -- cypress run",
        },
        PercyRecipe {
            key: key(Language::Nodejs, Fw::Webdriverio, None),
            install: "npm i -D @percy/cli @percy/webdriverio",
            snapshot: "const percySnapshot = require('@percy/webdriverio');\nawait percySnapshot('Home page');",
            run: "npx percy exec -- wdio wdio.conf.js",
        },
        PercyRecipe {
            key: key(Language::Python, Fw::Selenium, None),
            install: "npm i -D @percy/cli\npip install percy-selenium",
            snapshot: "from percy import percy_snapshot\npercy_snapshot(driver, 'Home page')",
            run: "npx percy exec -- python -m pytest",
        },
        PercyRecipe {
            key: key(Language::Python, Fw::Playwright, None),
            install: "npm i -D @percy/cli\npip install percy-playwright",
            snapshot: "from percy import percy_snapshot\npercy_snapshot(page, name='Home page')",
            run: "npx percy exec -- python -m pytest",
        },
        PercyRecipe {
            key: key(Language::Java, Fw::Selenium, None),
            install: "npm i -D @percy/cli\nAdd io.percy:percy-java-selenium to your pom.xml dependencies.",
            snapshot: "Percy percy = new Percy(driver);\npercy.snapshot(\"Home page\");",
            run: "npx percy exec -- mvn test",
        },
    ]
}

fn sdk_templates(recipe: &SdkRecipe) -> TemplateSet {
    let framework = recipe.key.framework.as_str();
    let install = recipe.install.replace("{framework}", framework);
    let run = recipe.run;
    TemplateSet::new(vec![
        static_template(format!("Install the BrowserStack SDK:\n```bash\n{install}\n```")),
        template(move |context| {
            format!(
                "Create {SDK_CONFIG_FILE} in the project root:\n```yaml\nuserName: {}\naccessKey: {}\nframework: {framework}\nprojectName: {}\nplatforms:\n  - os: Windows\n    osVersion: 11\n    browserName: chrome\n    browserVersion: latest\nparallelsPerPlatform: 1\nbrowserstackLocal: true\n```",
                context.username(),
                context.access_key(),
                context.project_name.as_deref().unwrap_or("tests"),
            )
        }),
        static_template(format!("Run your tests on BrowserStack:\n```bash\n{run}\n```")),
    ])
}

fn percy_with_sdk_templates() -> TemplateSet {
    TemplateSet::new(vec![template(|context| {
        format!(
            "Enable Percy in {SDK_CONFIG_FILE}:\n```yaml\npercy: true\npercyCaptureMode: auto\nprojectName: {}\n```",
            context.project_name.as_deref().unwrap_or("my-project"),
        )
    })])
}

fn percy_standalone_templates(recipe: &PercyRecipe) -> TemplateSet {
    let (install, snapshot, run) = (recipe.install, recipe.snapshot, recipe.run);
    TemplateSet::new(vec![static_template(format!(
        "Install the Percy CLI and SDK:\n```bash\n{install}\n```\n---STEP---\nCapture snapshots where visual coverage matters:\n```\n{snapshot}\n```\n---STEP---\nRun your tests through Percy:\n```bash\n{run}\n```"
    ))])
}

fn common_templates() -> CommonTemplates {
    CommonTemplates {
        credentials: template(|context| {
            format!(
                "Export your BrowserStack credentials:\n```bash\nexport BROWSERSTACK_USERNAME=\"{}\"\nexport BROWSERSTACK_ACCESS_KEY=\"{}\"\n```",
                context.username(),
                context.access_key(),
            )
        }),
        percy_token: template(|context| {
            format!(
                "Export the Percy token:\n```bash\nexport PERCY_TOKEN=\"{}\"\n```",
                context.percy_token.as_deref().unwrap_or(PERCY_TOKEN_PLACEHOLDER),
            )
        }),
    }
}

/// Builds the built-in catalog, validating every key on the way.
pub fn builtin_catalog() -> Result<ConfigurationCatalog, CatalogError> {
    let mut catalog = ConfigurationCatalog::new(common_templates());
    for recipe in sdk_recipes() {
        catalog.sdk.insert(recipe.key, sdk_templates(&recipe))?;
    }
    for key in percy_with_sdk_keys() {
        catalog.percy_with_sdk.insert(key, percy_with_sdk_templates())?;
    }
    for recipe in percy_standalone_recipes() {
        catalog.percy_standalone.insert(recipe.key, percy_standalone_templates(&recipe))?;
    }
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bstack_types::{Credentials, IntegrationPath, PercyMode};

    use super::*;
    use crate::{ConfigurationResolver, ProjectDescriptor, TemplateContext};

    fn resolver() -> ConfigurationResolver {
        ConfigurationResolver::new(Arc::new(builtin_catalog().expect("builtin catalog is valid")))
    }

    #[test]
    fn builtin_catalog_is_valid_and_populated() {
        let catalog = builtin_catalog().expect("valid");
        assert_eq!(catalog.sdk.len(), sdk_recipes().len());
        assert_eq!(catalog.sdk.languages(), vec!["nodejs", "python", "java", "csharp"]);
        assert!(catalog.percy_standalone.len() >= 5);
    }

    #[test]
    fn sdk_steps_embed_credentials() {
        let descriptor = ProjectDescriptor::new(Language::Python, Fw::Selenium, Tf::Pytest, PercyMode::Disabled);
        let context = TemplateContext::new(Credentials::new("alice", "s3cret"));
        let instructions = resolver().resolve(&descriptor, &context).expect("supported");

        assert_eq!(instructions.path, IntegrationPath::Sdk);
        assert_eq!(instructions.steps.len(), 4);
        assert!(instructions.steps[0].starts_with("Step 1: Export your BrowserStack credentials"));
        assert!(instructions.steps[2].contains("accessKey: s3cret"));
        assert!(instructions.steps[1].contains("--framework \"selenium\""));
    }

    #[test]
    fn csharp_percy_falls_back_and_then_fails() {
        let descriptor = ProjectDescriptor::new(Language::CSharp, Fw::Selenium, Tf::Nunit, PercyMode::WithSdk);
        let error = resolver().select(&descriptor).expect_err("no percy for csharp");
        assert_eq!(error.kind(), "unsupported_language");
    }

    #[test]
    fn cypress_with_sdk_steps_down_to_standalone() {
        let descriptor = ProjectDescriptor::new(Language::Nodejs, Fw::Cypress, Tf::Cypress, PercyMode::WithSdk);
        let context = TemplateContext::new(Credentials::new("alice", "key")).with_percy_token(Some("web_tok".into()));
        let instructions = resolver().resolve(&descriptor, &context).expect("standalone");

        assert_eq!(instructions.path, IntegrationPath::PercyStandalone);
        assert_eq!(instructions.fallback_from, Some(IntegrationPath::PercyWithSdk));
        assert_eq!(instructions.steps.len(), 4);
        assert!(instructions.steps[0].contains("PERCY_TOKEN=\"web_tok\""));
        assert!(instructions.steps[3].starts_with("Step 4: Run your tests through Percy"));
    }
}
