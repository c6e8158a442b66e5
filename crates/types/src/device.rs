use serde::{Deserialize, Serialize};

use crate::Platform;

/// One device/browser entry as published by the testing cloud.
///
/// The same `display_name` appears once per supported OS version, so a
/// catalog usually holds several entries per physical device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceEntry {
    /// Name shown to users, e.g. "iPhone 14" or "Chrome".
    #[serde(alias = "device", alias = "displayName")]
    pub display_name: String,
    /// Operating system family as published ("ios", "android", "Windows", ...).
    pub os: String,
    /// OS version string, kept verbatim ("16", "16.0", "11").
    #[serde(alias = "osVersion")]
    pub os_version: String,
    /// Browser for desktop entries.
    #[serde(default)]
    pub browser: Option<String>,
}

impl DeviceEntry {
    pub fn new(display_name: impl Into<String>, os: impl Into<String>, os_version: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            os: os.into(),
            os_version: os_version.into(),
            browser: None,
        }
    }

    /// Platform of this entry, when the published OS name maps onto one.
    pub fn platform(&self) -> Option<Platform> {
        Platform::parse(&self.os)
    }
}
