//! Project Manifest
//!
//! The slice of a project's `project.json` the extension coordinator needs.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::SecurityError;

/// Extension declarations of a project
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProjectManifest {
    /// Extension ids used by the project, in declaration order
    #[serde(default)]
    pub extensions: Vec<String>,
    /// Remote extension id to URL
    #[serde(default, rename = "extensionURLs")]
    pub extension_urls: BTreeMap<String, String>,
}

impl ProjectManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `project.json` text
    pub fn from_json(json: &str) -> Result<Self, SecurityError> {
        serde_json::from_str(json).map_err(|e| SecurityError::InvalidProject(e.to_string()))
    }

    /// Declare a built-in extension
    pub fn with_builtin(mut self, id: &str) -> Self {
        self.extensions.push(id.to_string());
        self
    }

    /// Declare a remote extension
    pub fn with_remote(mut self, id: &str, url: &str) -> Self {
        self.extensions.push(id.to_string());
        self.extension_urls.insert(id.to_string(), url.to_string());
        self
    }
}

/// Distinct extension URLs a single project requires, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionLoadSet {
    urls: Vec<String>,
}

impl ExtensionLoadSet {
    /// Collect the URLs of every declared extension that has one.
    ///
    /// Ids without a URL are built-ins. URL entries for ids the project does
    /// not declare are ignored.
    pub fn from_manifest(manifest: &ProjectManifest) -> Self {
        let mut urls: Vec<String> = Vec::new();
        for id in &manifest.extensions {
            if let Some(url) = manifest.extension_urls.get(id) {
                if !urls.contains(url) {
                    urls.push(url.clone());
                }
            }
        }
        Self { urls }
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.urls.iter().map(String::as_str)
    }
}
