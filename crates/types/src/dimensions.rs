//! Closed enumerations for the dimensions a project descriptor is keyed on.
//!
//! Every enumeration parses case-insensitively and accepts a handful of
//! aliases (`node` for `nodejs`, `c#` for `csharp`, ...). Serialization
//! always uses the canonical spelling.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A raw value that is not a member of the requested enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {dimension} '{value}'; expected one of: {}", .supported.join(", "))]
pub struct UnknownDimensionValue {
    pub dimension: &'static str,
    pub value: String,
    pub supported: Vec<String>,
}

macro_rules! closed_dimension {
    (
        $(#[$meta:meta])*
        $name:ident, $dimension:literal {
            $($variant:ident => $canonical:literal $(| $alias:literal)*),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every member in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Human-readable name of the dimension, used in error messages.
            pub const DIMENSION: &'static str = $dimension;

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $canonical),+
                }
            }

            /// Case-insensitive lookup that also accepts aliases.
            pub fn parse(value: &str) -> Option<Self> {
                let normalized = value.trim().to_ascii_lowercase();
                match normalized.as_str() {
                    $($canonical $(| $alias)* => Some($name::$variant),)+
                    _ => None,
                }
            }

            pub fn names() -> Vec<String> {
                Self::ALL.iter().map(|member| member.as_str().to_string()).collect()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownDimensionValue;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                Self::parse(value).ok_or_else(|| UnknownDimensionValue {
                    dimension: Self::DIMENSION,
                    value: value.trim().to_string(),
                    supported: Self::names(),
                })
            }
        }

        impl TryFrom<String> for $name {
            type Error = UnknownDimensionValue;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }
    };
}

closed_dimension! {
    /// Programming language of the project under test.
    Language, "language" {
        Nodejs => "nodejs" | "node" | "javascript" | "js" | "typescript" | "ts",
        Python => "python" | "py",
        Java => "java",
        CSharp => "csharp" | "c#" | "dotnet" | ".net",
        Ruby => "ruby" | "rb",
    }
}

closed_dimension! {
    /// Browser automation framework driving the tests.
    AutomationFramework, "framework" {
        Selenium => "selenium",
        Playwright => "playwright",
        Cypress => "cypress",
        Webdriverio => "webdriverio" | "wdio",
    }
}

closed_dimension! {
    /// Test runner the project uses on top of the automation framework.
    TestFramework, "test framework" {
        Jest => "jest",
        Mocha => "mocha",
        Cucumberjs => "cucumberjs" | "cucumber-js",
        Cypress => "cypress",
        Pytest => "pytest",
        Behave => "behave",
        Robot => "robot" | "robotframework",
        Testng => "testng",
        Junit4 => "junit4",
        Junit5 => "junit5" | "junit",
        Nunit => "nunit",
        Xunit => "xunit",
        Mstest => "mstest",
    }
}

closed_dimension! {
    /// Device platform family.
    Platform, "platform" {
        Android => "android",
        Ios => "ios",
        Windows => "windows",
        Macos => "macos" | "osx" | "os x" | "mac",
    }
}

closed_dimension! {
    /// Visual-testing mode a caller may request.
    ///
    /// The standalone step-down used when `with-sdk` is unsupported is not
    /// selectable through this enumeration's `WithSdk` member; callers who
    /// want standalone directly ask for `Web`.
    PercyMode, "percy mode" {
        Disabled => "disabled" | "percy-disabled" | "none" | "off",
        WithSdk => "with-sdk" | "percy-on-automate" | "automate" | "sdk",
        Web => "web" | "percy-web" | "standalone",
    }
}

impl Default for PercyMode {
    fn default() -> Self {
        PercyMode::Disabled
    }
}

impl Platform {
    /// Whether entries for this platform are real mobile devices.
    pub fn is_mobile(&self) -> bool {
        matches!(self, Platform::Android | Platform::Ios)
    }
}

/// The integration path that actually produced an instruction set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationPath {
    /// Plain SDK instructions, no visual testing.
    Sdk,
    /// Percy layered on the SDK.
    PercyWithSdk,
    /// Percy integrated directly, bypassing the SDK.
    PercyStandalone,
}

impl IntegrationPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntegrationPath::Sdk => "sdk",
            IntegrationPath::PercyWithSdk => "percy_with_sdk",
            IntegrationPath::PercyStandalone => "percy_standalone",
        }
    }

    /// Whether assembling this path needs a Percy project token.
    pub fn needs_percy_token(&self) -> bool {
        !matches!(self, IntegrationPath::Sdk)
    }
}

impl fmt::Display for IntegrationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
