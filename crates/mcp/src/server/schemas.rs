use bstack_types::DeviceEntry;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for OS version resolution.
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ResolveVersionRequest {
    /// Requested version or one of the sentinels `latest` / `oldest`.
    #[schemars(description = "Requested OS version, for example '14', '16.4', 'latest' or 'oldest'.")]
    pub requested: String,
    /// Versions the target actually publishes.
    #[schemars(description = "Available versions in catalog order.")]
    pub available: Vec<String>,
}

/// One device entry supplied inline instead of fetching the published catalog.
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DeviceParam {
    #[schemars(description = "Device or browser display name, for example 'iPhone 14'.")]
    pub display_name: String,
    #[schemars(description = "Operating system family, for example 'ios' or 'android'.")]
    pub os: String,
    #[schemars(description = "Operating system version string.")]
    pub os_version: String,
    pub browser: Option<String>,
}

impl From<DeviceParam> for DeviceEntry {
    fn from(param: DeviceParam) -> Self {
        Self {
            display_name: param.display_name,
            os: param.os,
            os_version: param.os_version,
            browser: param.browser,
        }
    }
}

/// Parameters for device lookup.
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FindDeviceRequest {
    #[schemars(description = "Loose device name. Exact names win; otherwise the best fuzzy match is used.")]
    pub name: String,
    #[schemars(description = "Optional platform filter: android, ios, windows or macos.")]
    pub platform: Option<String>,
    #[schemars(description = "Optional OS version; defaults to 'latest'. Unavailable versions fall back to the closest one.")]
    pub os_version: Option<String>,
    /// When omitted the published device catalog is fetched with the configured credentials.
    #[schemars(description = "Optional inline device list. Omit to search the published catalog.")]
    pub devices: Option<Vec<DeviceParam>>,
}

/// Parameters for regional endpoint resolution.
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveEndpointRequest {
    #[schemars(description = "Discard the cached endpoint and probe the candidates again.")]
    pub refresh: Option<bool>,
}

/// Parameters for setup instruction generation.
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SetupInstructionsRequest {
    #[schemars(description = "Project language, for example 'nodejs', 'python', 'java' or 'csharp'.")]
    pub language: String,
    #[schemars(description = "Automation framework, for example 'selenium', 'playwright', 'cypress' or 'webdriverio'.")]
    pub framework: String,
    #[schemars(description = "Test framework, for example 'jest', 'pytest', 'testng' or 'nunit'.")]
    pub test_framework: String,
    #[schemars(description = "Visual testing mode: 'disabled' (default), 'with-sdk' or 'web'.")]
    pub percy_mode: Option<String>,
    /// Used as the Percy project and the build name in rendered steps.
    #[schemars(description = "Project name used for the Percy project and build naming.")]
    pub project_name: Option<String>,
}
