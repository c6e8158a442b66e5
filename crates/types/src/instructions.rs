use serde::{Deserialize, Serialize};

use crate::IntegrationPath;

/// Ordered, numbered setup steps for one resolved project descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionSet {
    /// The integration path that produced these steps.
    pub path: IntegrationPath,
    /// Set when the preferred path was unsupported and the resolver stepped down.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_from: Option<IntegrationPath>,
    /// Step bodies, already prefixed with "Step N:".
    pub steps: Vec<String>,
}

impl InstructionSet {
    /// Joins the numbered steps into a single presentable document.
    pub fn render(&self) -> String {
        self.steps.join("\n\n")
    }

    pub fn used_fallback(&self) -> bool {
        self.fallback_from.is_some()
    }
}
