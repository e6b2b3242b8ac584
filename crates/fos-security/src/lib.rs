//! fOS Security
//!
//! Resource access gate for the fOS runtime.
//!
//! Guest content (projects and the extensions they pull in) can ask the host
//! to load an extension, fetch a resource, open a window, or redirect the
//! page. Each request goes through the [`PolicyGate`], which applies fixed
//! protocol rules first and otherwise asks the host's [`SecurityManager`].
//!
//! Features:
//! - Protocol short-circuits (`data:`/`blob:` fetches, `javascript:` redirects)
//! - Relative URL resolution against the current document
//! - Sync or async policy callbacks, hot-swappable at runtime
//! - Issue-ordered policy consultation with audit sequence numbers
//! - All-or-nothing extension loading for projects

pub mod protocol;
pub mod resolver;
pub mod normalize;
pub mod manager;
pub mod gate;
pub mod project;
pub mod extension;
pub mod config;

pub use protocol::ProtocolClass;
pub use resolver::{resolve, DocumentContext};
pub use normalize::{normalize, is_truthy, DeferredBool, PolicyAnswer, PolicyFault};
pub use manager::{callback, fallible_callback, PolicyCallback, SecurityManager, SecurityManagerHandle};
pub use gate::{GatedAction, PendingDecision, PolicyDecision, PolicyGate, Provenance, Request};
pub use project::{ExtensionLoadSet, ProjectManifest};
pub use extension::{ExtensionLoadCoordinator, ExtensionLoadError, ExtensionLoader, LoadPhase, LoadReport};
pub use config::GateConfig;

/// Security error
#[derive(Debug, Clone, thiserror::Error)]
pub enum SecurityError {
    #[error("Security manager failed on {action} for {url}: {fault}")]
    PolicyFault {
        action: GatedAction,
        url: String,
        #[source]
        fault: PolicyFault,
    },

    #[error("Extension load denied: {}", .urls.join(", "))]
    ExtensionDenied { urls: Vec<String> },

    #[error("Extension {url} failed to load: {source}")]
    ExtensionLoad {
        url: String,
        source: ExtensionLoadError,
    },

    #[error("Invalid project: {0}")]
    InvalidProject(String),

    #[error("Invalid document URL: {0}")]
    InvalidDocumentUrl(String),

    #[error("Invalid gate config: {0}")]
    InvalidConfig(String),
}
