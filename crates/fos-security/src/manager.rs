//! Security Manager
//!
//! The host-supplied policy collaborator. It holds one optional callback per
//! gated action; the gate never assumes any slot is filled.

use std::fmt;
use std::sync::{Arc, RwLock};

use crate::gate::GatedAction;
use crate::normalize::{PolicyAnswer, PolicyFault};

/// Policy callback for a single action
pub type PolicyCallback = Arc<dyn Fn(&str) -> Result<PolicyAnswer, PolicyFault> + Send + Sync>;

/// Wrap an infallible callback
pub fn callback<F, A>(f: F) -> PolicyCallback
where
    F: Fn(&str) -> A + Send + Sync + 'static,
    A: Into<PolicyAnswer>,
{
    Arc::new(move |url: &str| -> Result<PolicyAnswer, PolicyFault> { Ok(f(url).into()) })
}

/// Wrap a callback that may fault before answering
pub fn fallible_callback<F>(f: F) -> PolicyCallback
where
    F: Fn(&str) -> Result<PolicyAnswer, PolicyFault> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Policy callbacks, one slot per action
#[derive(Clone, Default)]
pub struct SecurityManager {
    pub can_load_extension_from_project: Option<PolicyCallback>,
    pub can_fetch_resource: Option<PolicyCallback>,
    pub can_open_window: Option<PolicyCallback>,
    pub can_redirect: Option<PolicyCallback>,
}

impl SecurityManager {
    /// Manager with every slot empty; every delegated request is denied
    pub fn new() -> Self {
        Self::default()
    }

    /// Manager that explicitly allows everything
    pub fn allow_all() -> Self {
        let allow = callback(|_| true);
        Self {
            can_load_extension_from_project: Some(allow.clone()),
            can_fetch_resource: Some(allow.clone()),
            can_open_window: Some(allow.clone()),
            can_redirect: Some(allow),
        }
    }

    /// Builder-style slot assignment
    pub fn with<F, A>(mut self, action: GatedAction, f: F) -> Self
    where
        F: Fn(&str) -> A + Send + Sync + 'static,
        A: Into<PolicyAnswer>,
    {
        *self.slot_mut(action) = Some(callback(f));
        self
    }

    pub fn slot(&self, action: GatedAction) -> Option<&PolicyCallback> {
        match action {
            GatedAction::LoadExtension => self.can_load_extension_from_project.as_ref(),
            GatedAction::FetchResource => self.can_fetch_resource.as_ref(),
            GatedAction::OpenWindow => self.can_open_window.as_ref(),
            GatedAction::Redirect => self.can_redirect.as_ref(),
        }
    }

    pub fn slot_mut(&mut self, action: GatedAction) -> &mut Option<PolicyCallback> {
        match action {
            GatedAction::LoadExtension => &mut self.can_load_extension_from_project,
            GatedAction::FetchResource => &mut self.can_fetch_resource,
            GatedAction::OpenWindow => &mut self.can_open_window,
            GatedAction::Redirect => &mut self.can_redirect,
        }
    }
}

impl fmt::Debug for SecurityManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityManager")
            .field("can_load_extension_from_project", &self.can_load_extension_from_project.is_some())
            .field("can_fetch_resource", &self.can_fetch_resource.is_some())
            .field("can_open_window", &self.can_open_window.is_some())
            .field("can_redirect", &self.can_redirect.is_some())
            .finish()
    }
}

/// Shared, swappable reference to the active security manager.
///
/// The host may replace the manager, or any single slot, at any time.
/// Callbacks are looked up at call time, never cached.
#[derive(Clone, Default)]
pub struct SecurityManagerHandle {
    inner: Arc<RwLock<SecurityManager>>,
}

impl SecurityManagerHandle {
    pub fn new(manager: SecurityManager) -> Self {
        Self { inner: Arc::new(RwLock::new(manager)) }
    }

    /// Swap in a whole new manager
    pub fn replace(&self, manager: SecurityManager) {
        *self.inner.write().unwrap_or_else(|e| e.into_inner()) = manager;
    }

    /// Copy of the current manager
    pub fn snapshot(&self) -> SecurityManager {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Replace one slot
    pub fn set_slot(&self, action: GatedAction, callback: Option<PolicyCallback>) {
        *self.inner.write().unwrap_or_else(|e| e.into_inner()).slot_mut(action) = callback;
    }

    /// Empty one slot
    pub fn clear(&self, action: GatedAction) {
        self.set_slot(action, None);
    }

    pub fn set_can_load_extension_from_project<F, A>(&self, f: F)
    where
        F: Fn(&str) -> A + Send + Sync + 'static,
        A: Into<PolicyAnswer>,
    {
        self.set_slot(GatedAction::LoadExtension, Some(callback(f)));
    }

    pub fn set_can_fetch_resource<F, A>(&self, f: F)
    where
        F: Fn(&str) -> A + Send + Sync + 'static,
        A: Into<PolicyAnswer>,
    {
        self.set_slot(GatedAction::FetchResource, Some(callback(f)));
    }

    pub fn set_can_open_window<F, A>(&self, f: F)
    where
        F: Fn(&str) -> A + Send + Sync + 'static,
        A: Into<PolicyAnswer>,
    {
        self.set_slot(GatedAction::OpenWindow, Some(callback(f)));
    }

    pub fn set_can_redirect<F, A>(&self, f: F)
    where
        F: Fn(&str) -> A + Send + Sync + 'static,
        A: Into<PolicyAnswer>,
    {
        self.set_slot(GatedAction::Redirect, Some(callback(f)));
    }

    /// Current callback for `action`.
    ///
    /// The lock is released before returning so a callback may itself swap
    /// the manager.
    pub fn callback(&self, action: GatedAction) -> Option<PolicyCallback> {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).slot(action).cloned()
    }
}

impl From<SecurityManager> for SecurityManagerHandle {
    fn from(manager: SecurityManager) -> Self {
        Self::new(manager)
    }
}

impl fmt::Debug for SecurityManagerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SecurityManagerHandle").field(&self.snapshot()).finish()
    }
}
