//! Gate Configuration

use serde::Deserialize;

use crate::SecurityError;

/// Settings used to build a [`PolicyGate`](crate::PolicyGate)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GateConfig {
    /// Initial document location used to resolve relative URLs
    pub document_url: Option<String>,
    /// Emit a tracing event for every decision
    pub audit: bool,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            document_url: None,
            audit: true,
        }
    }
}

impl GateConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, SecurityError> {
        serde_json::from_str(json).map_err(|e| SecurityError::InvalidConfig(e.to_string()))
    }

    pub fn document_url(mut self, href: &str) -> Self {
        self.document_url = Some(href.to_string());
        self
    }

    pub fn audit(mut self, enabled: bool) -> Self {
        self.audit = enabled;
        self
    }
}
