//! Window/session coordination for one embedded view.
//!
//! [`WindowSession`] is the root entity: it composes the navigation history,
//! the render-host binding, the input router, and the viewport, exposes the
//! embedder-facing API, and implements the three engine-facing delegate
//! traits. Embedder calls and engine callbacks are expected to arrive
//! serialized on one control thread (the session is not reentrant-safe
//! across threads); nothing here blocks: every call posts a request and
//! returns, with outcomes arriving later through delegate callbacks.
//!
//! # Submodules
//!
//! - [`delegate`] - capability traits and UI-intent payload types
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use webview_embed::render::{HostId, MockRenderHost, RenderHost};
//! use webview_embed::session::delegate::NoopDelegate;
//! use webview_embed::session::WindowSession;
//! use webview_embed::config::SessionSettings;
//!
//! let mut session = WindowSession::new(SessionSettings::default(), Box::new(NoopDelegate));
//! let host: Arc<dyn RenderHost> = MockRenderHost::new(HostId(1));
//! session.bind(&host);
//! session.navigate_to("https://example.com").unwrap();
//! ```

pub mod delegate;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, trace, warn};
use url::Url;
use uuid::Uuid;

use crate::config::SessionSettings;
use crate::geometry::{Rect, Size};
use crate::input::{InputEvent, InputRouter, Modifiers};
use crate::navigation::{
    AbortReason, NavigationError, NavigationHistory, PageId, Transition,
};
use crate::render::{HostId, RenderHost, RenderSessionBinding};
use crate::viewport::ViewportState;

use delegate::{
    ContextMenuInfo, DragData, DragOperations, LoadDelegate, NoopDelegate, ResourceDelegate,
    ResourceRequestInfo, RouteId, ViewDelegate, WindowDelegate, WindowDisposition,
};

/// Lifecycle state of a window session.
///
/// Navigation is not a state of its own: a session is "navigating" whenever
/// its history has a pending entry, and that never blocks input delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created, no render host bound yet.
    Constructing,
    /// Bound to a live render host and accepting calls.
    Active,
    /// Shutting down; no further calls accepted.
    Closing,
    /// Fully torn down.
    Destroyed,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Constructing => write!(f, "constructing"),
            SessionState::Active => write!(f, "active"),
            SessionState::Closing => write!(f, "closing"),
            SessionState::Destroyed => write!(f, "destroyed"),
        }
    }
}

/// Errors surfaced synchronously from embedder-facing session calls.
///
/// Everything that originates from the engine's asynchronous protocol is
/// recovered internally and reported through [`WindowDelegate`]; only
/// malformed embedder input and calls against a closed session fail here.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A navigation target failed to parse, or a navigation operation had no
    /// entry to act on.
    #[error(transparent)]
    Navigation(#[from] NavigationError),

    /// The session has been closed and no longer accepts calls.
    #[error("session is {state} and no longer accepts calls")]
    SessionClosed {
        /// State the session was in when the call arrived.
        state: SessionState,
    },
}

/// One embedded, off-screen, fully interactive web page view.
pub struct WindowSession {
    id: Uuid,
    state: SessionState,
    viewport: ViewportState,
    history: NavigationHistory,
    binding: RenderSessionBinding,
    input: InputRouter,
    delegate: Box<dyn WindowDelegate>,
    settings: SessionSettings,
    pending_windows: HashMap<RouteId, WindowSession>,
    pending_widgets: HashMap<RouteId, bool>,
    is_loading: bool,
    created_at: DateTime<Utc>,
}

impl WindowSession {
    /// Creates a session in the `Constructing` state.
    ///
    /// The session accepts geometry and input calls immediately (input is
    /// dropped until a host is bound); [`bind`](Self::bind) must establish
    /// the initial render-host binding before navigation can reach the
    /// engine.
    pub fn new(settings: SessionSettings, delegate: Box<dyn WindowDelegate>) -> Self {
        let session = Self {
            id: Uuid::new_v4(),
            state: SessionState::Constructing,
            viewport: ViewportState::new(settings.initial_bounds),
            history: NavigationHistory::new(),
            binding: RenderSessionBinding::new(),
            input: InputRouter::new(),
            delegate,
            settings,
            pending_windows: HashMap::new(),
            pending_widgets: HashMap::new(),
            is_loading: false,
            created_at: Utc::now(),
        };
        info!(session = %session.id, "window session created");
        session
    }

    /// Replaces the embedder delegate.
    ///
    /// Useful for sessions synthesized by `window.open`, which start with a
    /// no-op delegate until the embedder adopts them.
    pub fn set_delegate(&mut self, delegate: Box<dyn WindowDelegate>) {
        self.delegate = delegate;
    }

    // ------------------------------------------------------------------
    // Render-host binding
    // ------------------------------------------------------------------

    /// Binds (or swaps in) the active render host.
    ///
    /// Called once during construction and again whenever a cross-process
    /// navigation produces a fresh host. The new host immediately receives a
    /// surface request sized to the current viewport, and any outstanding
    /// navigation command is re-issued against it so the swap cannot lose
    /// the in-flight navigation.
    pub fn bind(&mut self, host: &Arc<dyn RenderHost>) {
        let previous = self.binding.bind(host);
        if let Some(previous) = previous {
            debug!(session = %self.id, %previous, "render host swapped");
        }
        if self.state == SessionState::Constructing {
            self.state = SessionState::Active;
            info!(session = %self.id, host = %host.id(), "session active");
        }
        if self.settings.eager_surface {
            self.binding.create_view_if_needed(self.viewport.size());
        }
        let outstanding = self.history.pending().map(|entry| {
            (
                entry.url().clone(),
                entry.referrer().cloned(),
                entry.transition() == Transition::Reload,
            )
        });
        if let Some((url, referrer, reload)) = outstanding {
            debug!(session = %self.id, %url, "re-issuing pending navigation to new host");
            self.issue_navigation(&url, referrer.as_ref(), reload);
        }
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Requests a navigation to `url`.
    ///
    /// Fails synchronously only if the URL cannot be parsed or the session
    /// is closed; nothing is mutated in either case. A navigation already
    /// pending is superseded: its abort notification fires before the new
    /// entry can commit. Navigating to the URL of the current entry still
    /// starts a new pending navigation.
    pub fn navigate_to(&mut self, url: &str) -> Result<(), SessionError> {
        self.ensure_open()?;
        // Parse before touching the pending slot so an invalid target
        // cannot abort the navigation already in flight.
        let target = crate::navigation::parse_target(url)?;
        self.abort_pending(AbortReason::Superseded);
        self.history.begin_parsed(target.clone(), Transition::Typed);
        self.issue_navigation(&target, None, false);
        Ok(())
    }

    /// Re-fetches the current page, bypassing the engine cache.
    pub fn reload(&mut self) -> Result<(), SessionError> {
        self.ensure_open()?;
        let (url, referrer) = match self.history.current() {
            Some(entry) => (entry.url().clone(), entry.referrer().cloned()),
            None => return Err(NavigationError::NoCurrentEntry.into()),
        };
        self.abort_pending(AbortReason::Superseded);
        self.history.begin_parsed(url.clone(), Transition::Reload);
        self.issue_navigation(&url, referrer.as_ref(), true);
        Ok(())
    }

    fn issue_navigation(&self, url: &Url, referrer: Option<&Url>, reload: bool) {
        match self.binding.active() {
            Some(host) => host.navigate(url, referrer, reload),
            None => {
                debug!(session = %self.id, %url, "no live render host; navigation deferred until bind")
            }
        }
    }

    fn abort_pending(&mut self, reason: AbortReason) {
        if let Some(entry) = self.history.abort(&reason) {
            self.delegate.on_navigation_aborted(entry.url(), &reason);
        }
    }

    // ------------------------------------------------------------------
    // Geometry
    // ------------------------------------------------------------------

    /// Replaces the container bounds.
    ///
    /// Idempotent: re-applying the current rectangle notifies nobody. A real
    /// change is pushed to the active render host and retries surface
    /// creation if it was previously refused for lack of bounds.
    pub fn set_container_bounds(&mut self, bounds: Rect) {
        if !self.viewport.set_bounds(bounds) {
            return;
        }
        let size = self.viewport.size();
        self.binding.create_view_if_needed(size);
        if let Some(host) = self.binding.active() {
            host.was_resized(size);
        }
    }

    /// Resizes the container, preserving the existing origin.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.set_container_bounds(self.viewport.bounds().with_size(width, height));
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    /// Injects a mouse move. The cursor position is tracked even when no
    /// host is bound, so later button/wheel events carry it.
    pub fn mouse_moved(&mut self, x: i32, y: i32) {
        let event = self.input.mouse_moved(x, y);
        self.forward_input(&event);
    }

    /// Injects a mouse button transition at the last known cursor position.
    ///
    /// Unknown button ids are logged and dropped, never surfaced as errors.
    pub fn mouse_button(&mut self, button_id: u32, down: bool) {
        match self.input.mouse_button(button_id, down) {
            Ok(event) => self.forward_input(&event),
            Err(err) => warn!(session = %self.id, %err, "malformed input dropped"),
        }
    }

    /// Injects a scroll wheel movement at the last known cursor position.
    pub fn mouse_wheel(&mut self, delta_x: i32, delta_y: i32) {
        let event = self.input.mouse_wheel(delta_x, delta_y);
        self.forward_input(&event);
    }

    /// Injects committed (post-IME) text.
    pub fn text_event(&mut self, text: impl Into<String>) {
        let event = self.input.text_event(text);
        self.forward_input(&event);
    }

    /// Injects a raw key transition, updating the tracked modifier mask.
    pub fn key_event(
        &mut self,
        pressed: bool,
        modifiers: Modifiers,
        virtual_key: i32,
        scan_code: i32,
    ) {
        let event = self.input.key_event(pressed, modifiers, virtual_key, scan_code);
        self.forward_input(&event);
    }

    fn forward_input(&self, event: &InputEvent) {
        if !self.is_open() {
            trace!(session = %self.id, "session closed; input dropped");
            return;
        }
        // Embedders may legitimately send input before the engine has
        // produced a host/surface; that is a no-op, not an error.
        match self.binding.active() {
            Some(host) => host.forward_input(event),
            None => trace!(session = %self.id, "no live render host; input dropped"),
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Closes the session: aborts any pending navigation, discards pending
    /// child windows/widgets, and stops accepting calls.
    ///
    /// Destruction of the render host itself belongs to the engine's process
    /// manager.
    pub fn close(&mut self) {
        if !self.is_open() {
            return;
        }
        self.state = SessionState::Closing;
        self.abort_pending(AbortReason::SessionClosed);
        if self.is_loading {
            self.is_loading = false;
            self.delegate.on_load_stopped();
        }
        self.pending_windows.clear();
        self.pending_widgets.clear();
        self.state = SessionState::Destroyed;
        info!(session = %self.id, "window session destroyed");
    }

    fn is_open(&self) -> bool {
        matches!(self.state, SessionState::Constructing | SessionState::Active)
    }

    fn ensure_open(&self) -> Result<(), SessionError> {
        if self.is_open() {
            Ok(())
        } else {
            Err(SessionError::SessionClosed { state: self.state })
        }
    }

    /// Drops a callback whose host identity no longer matches the binding.
    fn check_host(&self, host: HostId, what: &str) -> bool {
        if !self.is_open() {
            debug!(session = %self.id, %host, what, "callback on closed session dropped");
            return false;
        }
        if self.binding.is_current(host) {
            true
        } else {
            debug!(
                session = %self.id,
                %host,
                current = ?self.binding.active_id(),
                what,
                "stale callback dropped"
            );
            false
        }
    }

    // ------------------------------------------------------------------
    // Read accessors
    // ------------------------------------------------------------------

    /// Unique identifier of this session.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// When this session was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// URL of the committed entry, if any navigation has committed.
    pub fn current_url(&self) -> Option<&Url> {
        self.history.current().map(|entry| entry.url())
    }

    /// Navigation history (current/last/pending entries).
    pub fn history(&self) -> &NavigationHistory {
        &self.history
    }

    /// True while the engine reports the view as loading.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// True while a navigation is pending (requested but neither committed
    /// nor aborted).
    pub fn is_navigating(&self) -> bool {
        self.history.has_pending()
    }

    /// Identity of the bound render host, if any.
    pub fn active_host(&self) -> Option<HostId> {
        self.binding.active_id()
    }

    /// Settings this session was created with.
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Number of engine-created child windows not yet offered to the
    /// embedder.
    pub fn pending_window_count(&self) -> usize {
        self.pending_windows.len()
    }

    /// Number of engine-created widgets not yet offered to the embedder.
    pub fn pending_widget_count(&self) -> usize {
        self.pending_widgets.len()
    }
}

impl std::fmt::Debug for WindowSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowSession")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("viewport", &self.viewport)
            .field("binding", &self.binding)
            .field("is_loading", &self.is_loading)
            .finish()
    }
}

impl LoadDelegate for WindowSession {
    fn on_load_started(&mut self, host: HostId) {
        if !self.check_host(host, "load started") {
            return;
        }
        if !self.is_loading {
            self.is_loading = true;
            self.delegate.on_load_started();
        }
    }

    fn on_load_stopped(&mut self, host: HostId) {
        if !self.check_host(host, "load stopped") {
            return;
        }
        if self.is_loading {
            self.is_loading = false;
            self.delegate.on_load_stopped();
        }
    }

    fn on_provisional_load_started(&mut self, host: HostId, is_main_frame: bool, url: &Url) {
        if !self.check_host(host, "provisional load") || !is_main_frame {
            return;
        }
        let diverged = self
            .history
            .pending()
            .map(|pending| pending.url() != url);
        match diverged {
            Some(true) => {
                debug!(session = %self.id, %url, "pending entry retargeted before commit");
                self.history.retarget(url.clone());
            }
            Some(false) => {}
            None => {
                // The page navigated itself (link click, script); synthesize
                // the pending entry the embedder never requested.
                debug!(session = %self.id, %url, "engine-initiated navigation");
                self.history.begin_parsed(url.clone(), Transition::Link);
            }
        }
    }

    fn on_provisional_load_failed(
        &mut self,
        host: HostId,
        is_main_frame: bool,
        error_code: i32,
        url: &Url,
        showing_interstitial: bool,
    ) {
        if !self.check_host(host, "provisional load failure") || !is_main_frame {
            return;
        }
        let matches_pending = self
            .history
            .pending()
            .map(|pending| pending.url() == url)
            .unwrap_or(false);
        if !matches_pending {
            debug!(session = %self.id, %url, "stale provisional load failure dropped");
            return;
        }
        debug!(
            session = %self.id,
            %url,
            error_code,
            showing_interstitial,
            "provisional load failed"
        );
        self.abort_pending(AbortReason::LoadFailed { error_code });
    }

    fn on_redirect(&mut self, page_id: PageId, source: &Url, target: &Url) {
        // Not a new navigation: the pending entry keeps its identity and no
        // listener-visible event fires.
        if self.history.redirect(source, target.clone()) {
            debug!(session = %self.id, %page_id, %source, %target, "pending navigation redirected");
        } else {
            debug!(session = %self.id, %page_id, %source, "stale redirect dropped");
        }
    }

    fn on_navigation_committed(&mut self, host: HostId, page_id: PageId) {
        if !self.check_host(host, "navigation commit") {
            return;
        }
        match self.history.commit(page_id) {
            Ok(entry) => {
                let url = entry.url().clone();
                info!(session = %self.id, %page_id, %url, "navigation committed");
                self.delegate.on_navigation_committed(&url, page_id);
            }
            Err(_) => {
                debug!(session = %self.id, %page_id, "stale commit dropped (nothing pending)")
            }
        }
    }
}

impl ResourceDelegate for WindowSession {
    fn on_resource_redirect(&mut self, details: &ResourceRequestInfo) {
        self.delegate.on_resource_redirect(details);
    }

    fn on_resource_response_started(&mut self, details: &ResourceRequestInfo) {
        self.delegate.on_resource_response_started(details);
    }

    fn on_resource_loaded_from_cache(&mut self, url: &Url) {
        self.delegate.on_resource_loaded_from_cache(url);
    }

    fn on_document_loaded_in_frame(&mut self) {
        self.delegate.on_document_loaded_in_frame();
    }
}

impl ViewDelegate for WindowSession {
    fn on_create_new_window(&mut self, route_id: RouteId) {
        if !self.is_open() {
            debug!(session = %self.id, %route_id, "create-window on closed session dropped");
            return;
        }
        if self.pending_windows.contains_key(&route_id) {
            debug!(session = %self.id, %route_id, "duplicate create-window dropped");
            return;
        }
        let cap = self.settings.max_pending_windows;
        if cap > 0 && self.pending_windows.len() >= cap {
            warn!(session = %self.id, %route_id, cap, "pending window table full; request dropped");
            return;
        }
        let child = WindowSession::new(self.settings.clone(), Box::new(NoopDelegate));
        debug!(session = %self.id, %route_id, child = %child.id(), "child window session created");
        self.pending_windows.insert(route_id, child);
    }

    fn on_create_new_widget(&mut self, route_id: RouteId, activatable: bool) {
        if !self.is_open() {
            debug!(session = %self.id, %route_id, "create-widget on closed session dropped");
            return;
        }
        if self.pending_widgets.insert(route_id, activatable).is_some() {
            debug!(session = %self.id, %route_id, "duplicate create-widget replaced");
        }
    }

    fn on_show_created_window(
        &mut self,
        route_id: RouteId,
        disposition: WindowDisposition,
        initial_rect: Rect,
        user_gesture: bool,
        creator_url: &Url,
    ) {
        let Some(mut child) = self.pending_windows.remove(&route_id) else {
            debug!(session = %self.id, %route_id, "stale show-window dropped");
            return;
        };
        // Seed the child with the engine's placement hint; whether and where
        // it is actually shown is the embedder's decision.
        if !initial_rect.is_empty() {
            child.set_container_bounds(initial_rect);
        }
        self.delegate
            .on_window_offered(child, disposition, initial_rect, user_gesture, creator_url);
    }

    fn on_show_created_widget(&mut self, route_id: RouteId, initial_rect: Rect) {
        let Some(activatable) = self.pending_widgets.remove(&route_id) else {
            debug!(session = %self.id, %route_id, "stale show-widget dropped");
            return;
        };
        self.delegate
            .on_widget_offered(route_id, activatable, initial_rect);
    }

    fn on_context_menu(&mut self, params: &ContextMenuInfo) {
        self.delegate.on_context_menu(params);
    }

    fn on_drag_start(&mut self, data: &DragData, allowed_ops: DragOperations) {
        self.delegate.on_drag_start(data, allowed_ops);
    }

    fn on_drag_cursor_update(&mut self, operation: DragOperations) {
        self.delegate.on_drag_cursor_update(operation);
    }

    fn on_focus_gained(&mut self) {
        self.delegate.on_focus_gained();
    }

    fn on_focus_lost(&mut self, reverse: bool) {
        self.delegate.on_focus_lost(reverse);
    }

    fn on_preferred_width_changed(&mut self, width_px: u32) {
        self.delegate.on_preferred_width_changed(width_px);
    }

    fn container_bounds(&self) -> Rect {
        self.viewport.bounds()
    }

    fn container_size(&self) -> Size {
        self.viewport.size()
    }
}
