//! # webview-embed
//!
//! An embedding adapter for hosting an off-screen, fully interactive web
//! page view backed by a multi-process browser rendering engine.
//!
//! The crate owns no rendering or layout logic. It is the window/session
//! coordination layer between two independent lifecycles: an embedding
//! application's simple window API (navigate, resize, inject input) and the
//! rendering engine's asynchronous delegate protocol (render view creation,
//! load progress, popups, drag-and-drop, focus).
//!
//! ## What lives here
//!
//! - **Navigation state**: current/last/pending entries, commit/abort/redirect
//!   handling, supersede-on-new-navigation semantics
//! - **Render-host binding**: one live host per session, swap-on-navigation
//!   for cross-process navigations, stale-callback detection
//! - **Input translation**: embedder input calls to engine wire messages,
//!   with modifier and cursor tracking
//! - **Viewport**: authoritative container geometry, idempotent updates
//! - **Delegate contract**: the load/resource/UI-intent callbacks the engine
//!   delivers, and the notifications the embedder receives
//!
//! Rendering, JavaScript execution, network fetching, and GPU compositing
//! belong to the external engine behind the [`render::RenderHost`] trait.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use webview_embed::prelude::*;
//!
//! let settings = SessionSettings::default();
//! let mut session = WindowSession::new(settings, Box::new(NoopDelegate));
//!
//! // The engine's process manager supplies the render host. A mock stands
//! // in here.
//! let host: Arc<dyn RenderHost> = MockRenderHost::new(HostId(1));
//! session.bind(&host);
//!
//! session.resize(1280, 720);
//! session.navigate_to("https://example.com").unwrap();
//! session.mouse_moved(640, 360);
//! session.mouse_button(0, true);
//! ```
//!
//! ## Threading model
//!
//! The adapter is single-threaded from the embedder's viewpoint: embedder
//! calls and engine delegate callbacks must be serialized onto one control
//! thread. No call blocks; outcomes arrive later via delegate callbacks.

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Full version string with name
pub const FULL_VERSION: &str = concat!(env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Module Exports
// ============================================================================

/// Session settings with file/env/builder precedence.
pub mod config;

/// Rectangle and size value types.
pub mod geometry;

/// Embedder input translation into engine wire messages.
pub mod input;

/// Navigation entries and history.
pub mod navigation;

/// Render-host trait, session binding, and the recording mock host.
pub mod render;

/// The window session and its delegate contracts.
pub mod session;

/// Authoritative container geometry.
pub mod viewport;

// ============================================================================
// Re-exports for Convenience
// ============================================================================

pub use config::{ConfigError, SessionSettings};
pub use geometry::{Rect, Size};
pub use input::{InputError, InputEvent, InputRouter, Modifiers, MouseButton};
pub use navigation::{
    AbortReason, NavigationEntry, NavigationError, NavigationHistory, PageId, Transition,
};
pub use render::{HostCall, HostId, MockRenderHost, RenderHost, RenderSessionBinding};
pub use session::delegate::{
    ContextMenuInfo, DragData, DragOperations, LoadDelegate, NoopDelegate, ResourceDelegate,
    ResourceRequestInfo, RouteId, ViewDelegate, WindowDelegate, WindowDisposition,
};
pub use session::{SessionError, SessionState, WindowSession};
pub use viewport::ViewportState;

// ============================================================================
// Prelude Module
// ============================================================================

/// Prelude module for convenient imports.
///
/// ```rust
/// use webview_embed::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::SessionSettings;
    pub use crate::geometry::{Rect, Size};
    pub use crate::input::{Modifiers, MouseButton};
    pub use crate::navigation::{PageId, Transition};
    pub use crate::render::{HostId, MockRenderHost, RenderHost};
    pub use crate::session::delegate::{
        LoadDelegate, NoopDelegate, ResourceDelegate, RouteId, ViewDelegate, WindowDelegate,
    };
    pub use crate::session::{SessionState, WindowSession};
    pub use crate::{FULL_VERSION, NAME, VERSION};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constants() {
        assert!(!VERSION.is_empty());
        assert!(!NAME.is_empty());
        assert!(FULL_VERSION.contains(VERSION));
        assert!(FULL_VERSION.contains(NAME));
    }
}
