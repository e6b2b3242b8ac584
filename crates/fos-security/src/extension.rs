//! Extension Load Coordination
//!
//! Gates every remote extension a project declares as one unit. Loads start
//! only after every URL has been approved; a single denial or policy fault
//! fails the whole project and nothing is loaded.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::join_all;
use smol::future::{Boxed, FutureExt};

use crate::gate::PolicyGate;
use crate::project::{ExtensionLoadSet, ProjectManifest};
use crate::SecurityError;

/// Failure reported by the real extension loader
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ExtensionLoadError {
    message: String,
}

impl ExtensionLoadError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Loads extension code once the gate has approved it
pub trait ExtensionLoader: Send + Sync {
    fn load_extension_url(&self, url: &str) -> Boxed<Result<(), ExtensionLoadError>>;
}

impl<L: ExtensionLoader + ?Sized> ExtensionLoader for Arc<L> {
    fn load_extension_url(&self, url: &str) -> Boxed<Result<(), ExtensionLoadError>> {
        (**self).load_extension_url(url)
    }
}

impl<F, Fut> ExtensionLoader for F
where
    F: Fn(&str) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), ExtensionLoadError>> + Send + 'static,
{
    fn load_extension_url(&self, url: &str) -> Boxed<Result<(), ExtensionLoadError>> {
        (self)(url).boxed()
    }
}

/// Stage of a project's extension load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    /// Deriving the extension URL set
    Collecting,
    /// Waiting on every gate decision
    Gating,
    /// All approved, loads triggered
    Loading,
    /// Something was denied or faulted, nothing loaded
    Aborted,
}

impl fmt::Display for LoadPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Collecting => "collecting",
            Self::Gating => "gating",
            Self::Loading => "loading",
            Self::Aborted => "aborted",
        })
    }
}

/// Outcome of a successful project load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Extension URLs handed to the loader
    pub loaded: Vec<String>,
}

/// All-or-nothing extension gate for project loads
pub struct ExtensionLoadCoordinator<L> {
    gate: PolicyGate,
    loader: L,
}

impl<L: ExtensionLoader> ExtensionLoadCoordinator<L> {
    pub fn new(gate: PolicyGate, loader: L) -> Self {
        Self { gate, loader }
    }

    pub fn gate(&self) -> &PolicyGate {
        &self.gate
    }

    /// Parse `project.json` text and load its extensions
    pub async fn load_project_json(&self, json: &str) -> Result<LoadReport, SecurityError> {
        let manifest = ProjectManifest::from_json(json)?;
        self.load_project(&manifest).await
    }

    /// Gate and load every remote extension `manifest` declares
    pub async fn load_project(&self, manifest: &ProjectManifest) -> Result<LoadReport, SecurityError> {
        let set = ExtensionLoadSet::from_manifest(manifest);
        tracing::debug!(phase = %LoadPhase::Collecting, count = set.len(), "Collected project extensions");

        // Issue every check before awaiting any, so the security manager sees
        // them in declaration order.
        let pending: Vec<_> = set.iter().map(|url| self.gate.can_load_extension(url)).collect();
        tracing::debug!(phase = %LoadPhase::Gating, count = pending.len(), "Awaiting extension decisions");

        let mut denied = Vec::new();
        let mut fault = None;
        for decision in pending {
            let url = decision.request().raw_url.clone();
            match decision.await {
                Ok(decision) if decision.allowed => {}
                Ok(_) => denied.push(url),
                Err(err) => {
                    fault.get_or_insert(err);
                }
            }
        }

        if let Some(err) = fault {
            tracing::warn!(phase = %LoadPhase::Aborted, "Extension gate failed: {}", err);
            return Err(err);
        }
        if !denied.is_empty() {
            tracing::warn!(phase = %LoadPhase::Aborted, "Extensions denied: {}", denied.join(", "));
            return Err(SecurityError::ExtensionDenied { urls: denied });
        }

        tracing::debug!(phase = %LoadPhase::Loading, count = set.len(), "Loading approved extensions");
        // Every load runs to completion before the first failure is reported.
        let results = join_all(set.iter().map(|url| self.loader.load_extension_url(url))).await;
        for (url, result) in set.iter().zip(results) {
            result.map_err(|source| SecurityError::ExtensionLoad { url: url.to_string(), source })?;
        }

        Ok(LoadReport { loaded: set.urls().to_vec() })
    }
}

impl<L> fmt::Debug for ExtensionLoadCoordinator<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionLoadCoordinator").field("gate", &self.gate).finish_non_exhaustive()
    }
}
