//! Delegate contracts between the engine, the session, and the embedder.
//!
//! The rendering engine talks to a session through three disjoint capability
//! traits rather than one wide interface: [`LoadDelegate`] for the load
//! lifecycle, [`ResourceDelegate`] for resource-level informational
//! callbacks, and [`ViewDelegate`] for UI-intent requests and geometry
//! queries. [`WindowSession`](super::WindowSession) implements all three.
//!
//! The session talks back to the embedding application through
//! [`WindowDelegate`], whose methods all default to no-ops so embedders only
//! override what they care about.

use url::Url;

use crate::geometry::{Rect, Size};
use crate::navigation::{AbortReason, PageId};
use crate::render::HostId;

use super::WindowSession;

/// Engine-issued identifier correlating a "create new window/widget" request
/// with its later "show" request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RouteId(pub i32);

impl std::fmt::Display for RouteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "route:{}", self.0)
    }
}

/// Where the page asked a newly created window to go.
///
/// Placement is a hint; the embedder decides final disposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowDisposition {
    /// Replace the content of the creating window.
    CurrentTab,
    /// Open as a focused sibling view.
    NewForegroundTab,
    /// Open as an unfocused sibling view.
    NewBackgroundTab,
    /// Open as a popup (no browser chrome requested).
    NewPopup,
    /// Open as an independent top-level window.
    NewWindow,
}

/// Drag operation mask negotiated between the page and the embedder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DragOperations(u32);

impl DragOperations {
    /// No operation permitted.
    pub const NONE: DragOperations = DragOperations(0);
    /// Copy the dragged data.
    pub const COPY: DragOperations = DragOperations(1 << 0);
    /// Link to the dragged data.
    pub const LINK: DragOperations = DragOperations(1 << 1);
    /// Move the dragged data.
    pub const MOVE: DragOperations = DragOperations(1 << 2);
    /// Every operation permitted.
    pub const EVERY: DragOperations = DragOperations(0b111);

    /// Builds a mask from raw bits, dropping unknown bits.
    pub fn from_bits_truncate(bits: u32) -> Self {
        DragOperations(bits & Self::EVERY.0)
    }

    /// Returns the raw bitmask.
    pub fn bits(&self) -> u32 {
        self.0
    }

    /// Returns true if every bit of `other` is set in this mask.
    pub fn contains(&self, other: DragOperations) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for DragOperations {
    type Output = DragOperations;

    fn bitor(self, rhs: DragOperations) -> DragOperations {
        DragOperations(self.0 | rhs.0)
    }
}

/// Payload of a drag operation started by the page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DragData {
    /// Dragged link target, if a link is being dragged.
    pub url: Option<Url>,
    /// Plain-text form of the dragged content.
    pub text: Option<String>,
    /// HTML fragment form of the dragged content.
    pub html: Option<String>,
    /// Paths of dragged files, if any.
    pub file_paths: Vec<String>,
}

/// Context menu request parameters reported by the page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextMenuInfo {
    /// Cursor position in container coordinates.
    pub x: i32,
    /// Cursor position in container coordinates.
    pub y: i32,
    /// Link under the cursor, if any.
    pub link_url: Option<Url>,
    /// Media/image source under the cursor, if any.
    pub src_url: Option<Url>,
    /// URL of the page that requested the menu.
    pub page_url: Option<Url>,
    /// Currently selected text.
    pub selection_text: String,
    /// True when the cursor is over an editable field.
    pub is_editable: bool,
}

/// Informational details about one resource request.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceRequestInfo {
    /// Current URL of the request.
    pub url: Url,
    /// URL before the most recent redirect, if the request was redirected.
    pub original_url: Option<Url>,
    /// HTTP status, once a response has started.
    pub http_status: Option<u16>,
}

/// Load-lifecycle callbacks the engine delivers to a session.
///
/// All methods are non-blocking and side-effect-bounded. Callbacks carrying
/// the identity of a host that has since been superseded are dropped
/// silently (logged for diagnostics only).
pub trait LoadDelegate {
    /// The engine started loading in `host`. Idempotent per load.
    fn on_load_started(&mut self, host: HostId);

    /// The engine stopped loading in `host`. Idempotent per load.
    fn on_load_stopped(&mut self, host: HostId);

    /// A provisional (not yet committed) load began for a frame.
    fn on_provisional_load_started(&mut self, host: HostId, is_main_frame: bool, url: &Url);

    /// A provisional load failed or was cancelled by the engine.
    fn on_provisional_load_failed(
        &mut self,
        host: HostId,
        is_main_frame: bool,
        error_code: i32,
        url: &Url,
        showing_interstitial: bool,
    );

    /// The pending navigation was redirected server-side before commit.
    fn on_redirect(&mut self, page_id: PageId, source: &Url, target: &Url);

    /// The pending navigation committed under the engine-issued page id.
    fn on_navigation_committed(&mut self, host: HostId, page_id: PageId);
}

/// Resource-lifecycle callbacks. Informational only: none of these may
/// mutate navigation state.
pub trait ResourceDelegate {
    /// A resource request was redirected.
    fn on_resource_redirect(&mut self, details: &ResourceRequestInfo);

    /// A resource response started arriving.
    fn on_resource_response_started(&mut self, details: &ResourceRequestInfo);

    /// A resource was served from the memory cache.
    fn on_resource_loaded_from_cache(&mut self, url: &Url);

    /// A frame finished loading its document.
    fn on_document_loaded_in_frame(&mut self);
}

/// UI-intent callbacks and geometry queries.
///
/// The create/show pairs are correlated by [`RouteId`]: the engine first
/// announces the new surface, then asks for it to be shown with placement
/// hints. Everything else is forwarded verbatim to the embedder; the session
/// applies no policy of its own here.
pub trait ViewDelegate {
    /// The page requested a new top-level window (e.g. `window.open`).
    fn on_create_new_window(&mut self, route_id: RouteId);

    /// The page requested a new widget surface (e.g. a select popup).
    fn on_create_new_widget(&mut self, route_id: RouteId, activatable: bool);

    /// The engine asks for a previously created window to be shown.
    fn on_show_created_window(
        &mut self,
        route_id: RouteId,
        disposition: WindowDisposition,
        initial_rect: Rect,
        user_gesture: bool,
        creator_url: &Url,
    );

    /// The engine asks for a previously created widget to be shown.
    fn on_show_created_widget(&mut self, route_id: RouteId, initial_rect: Rect);

    /// The page requested a context menu.
    fn on_context_menu(&mut self, params: &ContextMenuInfo);

    /// The page started a drag operation.
    fn on_drag_start(&mut self, data: &DragData, allowed_ops: DragOperations);

    /// The engine updated the feedback operation during a drag.
    fn on_drag_cursor_update(&mut self, operation: DragOperations);

    /// The view gained focus.
    fn on_focus_gained(&mut self);

    /// The view lost focus. `reverse` reports backwards traversal order.
    fn on_focus_lost(&mut self, reverse: bool);

    /// The page's preferred width changed.
    fn on_preferred_width_changed(&mut self, width_px: u32);

    /// Pull query: current container bounds. Always reflects the latest
    /// viewport state, even mid-navigation.
    fn container_bounds(&self) -> Rect;

    /// Pull query: current container size.
    fn container_size(&self) -> Size;
}

/// Notifications a session delivers to its embedding application.
///
/// Every method defaults to a no-op. Visibility and placement policy for
/// offered windows/widgets belongs entirely to the embedder.
#[allow(unused_variables)]
pub trait WindowDelegate {
    /// The view started loading.
    fn on_load_started(&mut self) {}

    /// The view stopped loading.
    fn on_load_stopped(&mut self) {}

    /// A navigation committed; `url` is now the current page.
    fn on_navigation_committed(&mut self, url: &Url, page_id: PageId) {}

    /// A pending navigation went away without committing.
    fn on_navigation_aborted(&mut self, url: &Url, reason: &AbortReason) {}

    /// The page opened a new window; the embedder decides whether and where
    /// to show it. `initial_rect` and `disposition` are placement hints.
    fn on_window_offered(
        &mut self,
        window: WindowSession,
        disposition: WindowDisposition,
        initial_rect: Rect,
        user_gesture: bool,
        creator_url: &Url,
    ) {
    }

    /// The page opened a new widget surface.
    fn on_widget_offered(&mut self, route_id: RouteId, activatable: bool, initial_rect: Rect) {}

    /// The page requested a context menu.
    fn on_context_menu(&mut self, params: &ContextMenuInfo) {}

    /// The page started a drag operation.
    fn on_drag_start(&mut self, data: &DragData, allowed_ops: DragOperations) {}

    /// The drag feedback operation changed.
    fn on_drag_cursor_update(&mut self, operation: DragOperations) {}

    /// The view gained focus.
    fn on_focus_gained(&mut self) {}

    /// The view lost focus.
    fn on_focus_lost(&mut self, reverse: bool) {}

    /// The page's preferred width changed.
    fn on_preferred_width_changed(&mut self, width_px: u32) {}

    /// A resource request was redirected.
    fn on_resource_redirect(&mut self, details: &ResourceRequestInfo) {}

    /// A resource response started arriving.
    fn on_resource_response_started(&mut self, details: &ResourceRequestInfo) {}

    /// A resource was served from the memory cache.
    fn on_resource_loaded_from_cache(&mut self, url: &Url) {}

    /// A frame finished loading its document.
    fn on_document_loaded_in_frame(&mut self) {}
}

/// Delegate that ignores every notification.
///
/// Used for synthesized child sessions until the embedder installs its own
/// delegate.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDelegate;

impl WindowDelegate for NoopDelegate {}
