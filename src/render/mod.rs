//! Render-host abstraction and the session-to-host binding.
//!
//! This module defines the trait through which the adapter drives the
//! rendering engine's per-view handle, and [`RenderSessionBinding`], which
//! owns the 1:1 association between a window session and exactly one live
//! render host at a time. Cross-origin navigations can require a fresh
//! rendering process, so the binding supports swapping hosts mid-session
//! without losing or misdirecting notifications.
//!
//! A [`MockRenderHost`] is provided for tests and for embedders that want to
//! exercise the coordination layer without a real engine.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::{debug, trace};
use url::Url;

use crate::geometry::Size;
use crate::input::InputEvent;

/// Identity of one live render-host instance.
///
/// Issued by the rendering engine's process manager; the adapter only
/// compares these to detect callbacks that raced against a host swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostId(pub u64);

impl std::fmt::Display for HostId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "host:{}", self.0)
    }
}

/// Engine-side handle for one live rendering process/session of a view.
///
/// All methods are fire-and-forget: they post a request to the engine and
/// return immediately. Outcomes arrive later through the session's delegate
/// callbacks. The handle is owned by the engine's process manager; the
/// adapter holds it weakly and re-fetches it per call.
pub trait RenderHost: Send + Sync {
    /// Identity of this host instance.
    fn id(&self) -> HostId;

    /// Requests a navigation. `reload` asks the engine to bypass its cache
    /// and re-fetch the current document.
    fn navigate(&self, url: &Url, referrer: Option<&Url>, reload: bool);

    /// Delivers a translated input message.
    fn forward_input(&self, event: &InputEvent);

    /// Notifies the host that the container was resized.
    fn was_resized(&self, new_size: Size);

    /// Requests a renderable surface sized to the container.
    ///
    /// Returns false if the engine cannot create one yet; the binding will
    /// retry on the next bounds change.
    fn create_view(&self, size: Size) -> bool;
}

/// Owns the association between a window session and its active render host.
///
/// Holds the host weakly plus its identity and a generation counter bumped on
/// every swap. Components consulting the host go through [`active`]
/// (upgrading per call) rather than caching the handle, because a navigation
/// can swap it between any two calls.
///
/// [`active`]: RenderSessionBinding::active
#[derive(Clone, Default)]
pub struct RenderSessionBinding {
    active: Option<Weak<dyn RenderHost>>,
    active_id: Option<HostId>,
    generation: u64,
    view_created: bool,
}

impl RenderSessionBinding {
    /// Creates an unbound binding.
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically swaps the active render host.
    ///
    /// The previous host is detached but not destroyed; its lifecycle belongs
    /// to the engine's process manager. Any lazily created surface belongs to
    /// the old host, so the surface flag resets and the next
    /// [`create_view_if_needed`](Self::create_view_if_needed) call requests a
    /// fresh one.
    ///
    /// Returns the identity of the detached host, if one was bound.
    pub fn bind(&mut self, host: &Arc<dyn RenderHost>) -> Option<HostId> {
        let previous = self.active_id;
        self.active = Some(Arc::downgrade(host));
        self.active_id = Some(host.id());
        self.generation += 1;
        self.view_created = false;
        debug!(
            new = %host.id(),
            previous = ?previous,
            generation = self.generation,
            "render host bound"
        );
        previous
    }

    /// Returns the active host if it is still alive.
    ///
    /// Upgrades the weak handle on every call; a host torn down by the
    /// process manager simply stops being returned.
    pub fn active(&self) -> Option<Arc<dyn RenderHost>> {
        self.active.as_ref()?.upgrade()
    }

    /// Identity of the currently bound host, if any.
    pub fn active_id(&self) -> Option<HostId> {
        self.active_id
    }

    /// Number of times a host has been bound.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns true if `id` names the currently bound host.
    ///
    /// Every inbound callback that carries a host identity must pass this
    /// check before it is allowed to touch session state.
    pub fn is_current(&self, id: HostId) -> bool {
        self.active_id == Some(id)
    }

    /// Returns true once a surface has been created for the current host.
    pub fn has_view(&self) -> bool {
        self.view_created
    }

    /// Lazily requests a renderable surface sized to `size`.
    ///
    /// Returns true if a surface exists (or was just created). Returns false
    /// without error when the container bounds are still empty, no host is
    /// bound, or the engine refused: the caller retries once bounds become
    /// available or after the next bind.
    pub fn create_view_if_needed(&mut self, size: Size) -> bool {
        if self.view_created {
            return true;
        }
        if size.is_empty() {
            trace!("surface unavailable: container bounds not set");
            return false;
        }
        let Some(host) = self.active() else {
            trace!("surface unavailable: no live render host");
            return false;
        };
        if host.create_view(size) {
            self.view_created = true;
            debug!(host = %host.id(), %size, "render surface created");
            true
        } else {
            debug!(host = %host.id(), %size, "surface unavailable: engine refused, will retry");
            false
        }
    }
}

impl std::fmt::Debug for RenderSessionBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderSessionBinding")
            .field("active_id", &self.active_id)
            .field("generation", &self.generation)
            .field("view_created", &self.view_created)
            .finish()
    }
}

/// One call recorded by [`MockRenderHost`].
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    /// A navigation request.
    Navigate {
        url: Url,
        referrer: Option<Url>,
        reload: bool,
    },
    /// A forwarded input message.
    Input(InputEvent),
    /// A resize notification.
    Resized(Size),
    /// A surface-creation request.
    CreateView(Size),
}

/// Recording render host for tests and engine-less embedding.
///
/// Captures every call in order so assertions can check exactly what the
/// session forwarded (and, as importantly, what it did not).
pub struct MockRenderHost {
    id: HostId,
    accept_view: Mutex<bool>,
    calls: Mutex<Vec<HostCall>>,
}

impl MockRenderHost {
    /// Creates a mock host with the given identity, accepting surface
    /// requests.
    pub fn new(id: HostId) -> Arc<Self> {
        Arc::new(Self {
            id,
            accept_view: Mutex::new(true),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Controls whether `create_view` succeeds.
    pub fn set_accept_view(&self, accept: bool) {
        *self.accept_view.lock() = accept;
    }

    /// Returns all recorded calls in delivery order.
    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().clone()
    }

    /// Clears the recorded calls.
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    /// Number of recorded calls.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl RenderHost for MockRenderHost {
    fn id(&self) -> HostId {
        self.id
    }

    fn navigate(&self, url: &Url, referrer: Option<&Url>, reload: bool) {
        self.calls.lock().push(HostCall::Navigate {
            url: url.clone(),
            referrer: referrer.cloned(),
            reload,
        });
    }

    fn forward_input(&self, event: &InputEvent) {
        self.calls.lock().push(HostCall::Input(event.clone()));
    }

    fn was_resized(&self, new_size: Size) {
        self.calls.lock().push(HostCall::Resized(new_size));
    }

    fn create_view(&self, size: Size) -> bool {
        self.calls.lock().push(HostCall::CreateView(size));
        *self.accept_view.lock()
    }
}
