//! Policy Gate
//!
//! Decides whether guest content may load an extension, fetch a resource,
//! open a window, or redirect the page.
//!
//! Each check runs in two halves. Issuing the check classifies the URL,
//! resolves it against the current document, and invokes the security
//! manager right away. Only the collaborator's answer is awaited later. This
//! keeps collaborator invocation order equal to issue order no matter how the
//! returned futures are polled or how long each answer takes.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};

use smol::future::{self, Boxed, FutureExt};

use crate::config::GateConfig;
use crate::manager::SecurityManagerHandle;
use crate::normalize::normalize;
use crate::protocol::ProtocolClass;
use crate::resolver::DocumentContext;
use crate::SecurityError;

/// Sensitive action requested by guest content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatedAction {
    LoadExtension,
    FetchResource,
    OpenWindow,
    Redirect,
}

impl GatedAction {
    pub const ALL: [GatedAction; 4] = [
        GatedAction::LoadExtension,
        GatedAction::FetchResource,
        GatedAction::OpenWindow,
        GatedAction::Redirect,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::LoadExtension => "load-extension",
            Self::FetchResource => "fetch-resource",
            Self::OpenWindow => "open-window",
            Self::Redirect => "redirect",
        }
    }

    /// Extension URLs are opaque identifiers and are never resolved
    pub fn resolves_url(self) -> bool {
        !matches!(self, Self::LoadExtension)
    }

    /// Fixed outcome for this protocol class, if any
    pub fn short_circuit(self, class: ProtocolClass) -> Option<bool> {
        match (self, class) {
            (Self::FetchResource, class) if class.is_local_content() => Some(true),
            (Self::Redirect, ProtocolClass::Javascript) => Some(false),
            _ => None,
        }
    }
}

impl fmt::Display for GatedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a decision came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// Fixed by protocol; the security manager was not consulted
    ShortCircuited,
    /// Answered by the security manager
    Delegated,
}

/// Final answer for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyDecision {
    pub allowed: bool,
    pub provenance: Provenance,
}

impl PolicyDecision {
    pub fn short_circuited(allowed: bool) -> Self {
        Self { allowed, provenance: Provenance::ShortCircuited }
    }

    pub fn delegated(allowed: bool) -> Self {
        Self { allowed, provenance: Provenance::Delegated }
    }
}

/// A single gated request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub action: GatedAction,
    /// URL as supplied by guest content
    pub raw_url: String,
    /// URL handed to the security manager
    pub resolved_url: String,
    pub class: ProtocolClass,
    /// Issue order across the gate and all of its clones
    pub sequence: u64,
}

/// Decision that may still be waiting on the security manager
pub struct PendingDecision {
    request: Request,
    decision: Boxed<Result<PolicyDecision, SecurityError>>,
}

impl PendingDecision {
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Await the decision and keep only the verdict
    pub async fn allowed(self) -> Result<bool, SecurityError> {
        Ok(self.await?.allowed)
    }
}

impl Future for PendingDecision {
    type Output = Result<PolicyDecision, SecurityError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.get_mut().decision.as_mut().poll(cx)
    }
}

impl fmt::Debug for PendingDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingDecision").field("request", &self.request).finish_non_exhaustive()
    }
}

/// The policy gate
#[derive(Debug, Clone)]
pub struct PolicyGate {
    security_manager: SecurityManagerHandle,
    document: DocumentContext,
    sequence: Arc<AtomicU64>,
    audit: bool,
}

impl PolicyGate {
    pub fn new(security_manager: SecurityManagerHandle, document: DocumentContext) -> Self {
        Self {
            security_manager,
            document,
            sequence: Arc::new(AtomicU64::new(0)),
            audit: true,
        }
    }

    /// Gate with an empty security manager and a document placed per `config`
    pub fn with_config(config: &GateConfig) -> Result<Self, SecurityError> {
        let document = match &config.document_url {
            Some(href) => DocumentContext::at(href)?,
            None => DocumentContext::new(),
        };
        let mut gate = Self::new(SecurityManagerHandle::default(), document);
        gate.audit = config.audit;
        Ok(gate)
    }

    pub fn security_manager(&self) -> &SecurityManagerHandle {
        &self.security_manager
    }

    pub fn document(&self) -> &DocumentContext {
        &self.document
    }

    /// Issue a check for `action` on `url`.
    ///
    /// The security manager, if consulted at all, has been invoked by the
    /// time this returns.
    pub fn check(&self, action: GatedAction, url: &str) -> PendingDecision {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
        let class = ProtocolClass::classify(url);

        if let Some(allowed) = action.short_circuit(class) {
            let request = Request {
                action,
                raw_url: url.to_string(),
                resolved_url: url.to_string(),
                class,
                sequence,
            };
            if self.audit {
                tracing::debug!(
                    sequence,
                    action = action.as_str(),
                    url,
                    allowed,
                    "{} URL short-circuited",
                    class.as_str()
                );
            }
            return PendingDecision {
                request,
                decision: future::ready(Ok(PolicyDecision::short_circuited(allowed))).boxed(),
            };
        }

        let resolved_url = if action.resolves_url() {
            self.document.resolve(url)
        } else {
            url.to_string()
        };
        let request = Request {
            action,
            raw_url: url.to_string(),
            resolved_url,
            class,
            sequence,
        };

        let callback = self.security_manager.callback(action);
        if callback.is_none() && self.audit {
            tracing::info!(sequence, action = action.as_str(), "No security policy installed, denying");
        }
        let answer = normalize(callback.map(|callback| callback(request.resolved_url.as_str())));

        let audit = self.audit;
        let resolved_url = request.resolved_url.clone();
        let decision = async move {
            match answer.await {
                Ok(allowed) => {
                    if audit {
                        if allowed {
                            tracing::debug!(sequence, action = action.as_str(), url = %resolved_url, "Allowed");
                        } else {
                            tracing::info!(sequence, action = action.as_str(), url = %resolved_url, "Denied");
                        }
                    }
                    Ok(PolicyDecision::delegated(allowed))
                }
                Err(fault) => {
                    tracing::warn!(sequence, action = action.as_str(), url = %resolved_url, "Security manager failed: {}", fault);
                    Err(SecurityError::PolicyFault { action, url: resolved_url, fault })
                }
            }
        }
        .boxed();

        PendingDecision { request, decision }
    }

    /// May the project load the extension at `url`?
    pub fn can_load_extension(&self, url: &str) -> PendingDecision {
        self.check(GatedAction::LoadExtension, url)
    }

    /// May guest content fetch `url`?
    pub fn can_fetch_resource(&self, url: &str) -> PendingDecision {
        self.check(GatedAction::FetchResource, url)
    }

    /// May guest content open `url` in a new window?
    pub fn can_open_window(&self, url: &str) -> PendingDecision {
        self.check(GatedAction::OpenWindow, url)
    }

    /// May guest content navigate the page to `url`?
    pub fn can_redirect(&self, url: &str) -> PendingDecision {
        self.check(GatedAction::Redirect, url)
    }
}
