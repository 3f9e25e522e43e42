//! Integration tests for the window session coordination layer.
//!
//! Drives a `WindowSession` end to end with the recording mock render host
//! and a recording embedder delegate: navigation supersede/commit/abort,
//! geometry idempotence, pre-bind input, host swaps, stale-callback
//! rejection, and the new-window/new-widget offer flow.

use std::sync::Arc;

use parking_lot::Mutex;
use url::Url;

use webview_embed::config::SessionSettings;
use webview_embed::geometry::{Rect, Size};
use webview_embed::navigation::{AbortReason, PageId};
use webview_embed::render::{HostCall, HostId, MockRenderHost, RenderHost};
use webview_embed::session::delegate::{
    ContextMenuInfo, DragData, DragOperations, LoadDelegate, ResourceDelegate,
    ResourceRequestInfo, RouteId, ViewDelegate, WindowDelegate, WindowDisposition,
};
use webview_embed::session::WindowSession;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Embedder-visible notifications, recorded in delivery order.
#[derive(Debug, Clone, PartialEq)]
enum Event {
    LoadStarted,
    LoadStopped,
    Committed(String, PageId),
    Aborted(String, AbortReason),
    WidgetOffered(RouteId, bool, Rect),
    ContextMenu(String),
    DragStart(DragOperations),
    DragCursor(DragOperations),
    FocusGained,
    FocusLost(bool),
    PreferredWidth(u32),
    ResourceResponse(String),
    DocumentLoaded,
}

#[derive(Clone, Default)]
struct Recorder {
    events: Arc<Mutex<Vec<Event>>>,
    offered_windows: Arc<Mutex<Vec<(WindowSession, WindowDisposition, Rect)>>>,
}

impl Recorder {
    fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    fn push(&self, event: Event) {
        self.events.lock().push(event);
    }

    fn offered_window_count(&self) -> usize {
        self.offered_windows.lock().len()
    }
}

struct RecordingDelegate(Recorder);

impl WindowDelegate for RecordingDelegate {
    fn on_load_started(&mut self) {
        self.0.push(Event::LoadStarted);
    }

    fn on_load_stopped(&mut self) {
        self.0.push(Event::LoadStopped);
    }

    fn on_navigation_committed(&mut self, url: &Url, page_id: PageId) {
        self.0.push(Event::Committed(url.to_string(), page_id));
    }

    fn on_navigation_aborted(&mut self, url: &Url, reason: &AbortReason) {
        self.0.push(Event::Aborted(url.to_string(), reason.clone()));
    }

    fn on_window_offered(
        &mut self,
        window: WindowSession,
        disposition: WindowDisposition,
        initial_rect: Rect,
        _user_gesture: bool,
        _creator_url: &Url,
    ) {
        self.0
            .offered_windows
            .lock()
            .push((window, disposition, initial_rect));
    }

    fn on_widget_offered(&mut self, route_id: RouteId, activatable: bool, initial_rect: Rect) {
        self.0
            .push(Event::WidgetOffered(route_id, activatable, initial_rect));
    }

    fn on_context_menu(&mut self, params: &ContextMenuInfo) {
        self.0.push(Event::ContextMenu(params.selection_text.clone()));
    }

    fn on_drag_start(&mut self, _data: &DragData, allowed_ops: DragOperations) {
        self.0.push(Event::DragStart(allowed_ops));
    }

    fn on_drag_cursor_update(&mut self, operation: DragOperations) {
        self.0.push(Event::DragCursor(operation));
    }

    fn on_focus_gained(&mut self) {
        self.0.push(Event::FocusGained);
    }

    fn on_focus_lost(&mut self, reverse: bool) {
        self.0.push(Event::FocusLost(reverse));
    }

    fn on_preferred_width_changed(&mut self, width_px: u32) {
        self.0.push(Event::PreferredWidth(width_px));
    }

    fn on_resource_response_started(&mut self, details: &ResourceRequestInfo) {
        self.0.push(Event::ResourceResponse(details.url.to_string()));
    }

    fn on_document_loaded_in_frame(&mut self) {
        self.0.push(Event::DocumentLoaded);
    }
}

fn setup() -> (WindowSession, Arc<MockRenderHost>, Recorder) {
    init_tracing();
    let recorder = Recorder::default();
    let mut session = WindowSession::new(
        SessionSettings::default(),
        Box::new(RecordingDelegate(recorder.clone())),
    );
    let mock = MockRenderHost::new(HostId(1));
    let host: Arc<dyn RenderHost> = mock.clone();
    session.bind(&host);
    mock.clear_calls();
    (session, mock, recorder)
}

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

fn resize_count(calls: &[HostCall]) -> usize {
    calls
        .iter()
        .filter(|call| matches!(call, HostCall::Resized(_)))
        .count()
}

#[test]
fn test_navigate_forwards_to_host() {
    let (mut session, mock, _recorder) = setup();

    session.navigate_to("https://a.example").unwrap();

    assert!(session.is_navigating());
    assert_eq!(
        mock.calls(),
        vec![HostCall::Navigate {
            url: url("https://a.example"),
            referrer: None,
            reload: false,
        }]
    );
}

#[test]
fn test_commit_scenario() {
    let (mut session, _mock, recorder) = setup();

    session.navigate_to("https://a.example").unwrap();
    session.on_provisional_load_started(HostId(1), true, &url("https://a.example"));
    session.on_navigation_committed(HostId(1), PageId(1));

    assert_eq!(session.current_url(), Some(&url("https://a.example")));
    assert!(session.history().last().is_none());
    assert!(!session.is_navigating());
    assert_eq!(
        recorder.events(),
        vec![Event::Committed("https://a.example/".to_string(), PageId(1))]
    );
}

#[test]
fn test_new_navigation_supersedes_pending() {
    let (mut session, _mock, recorder) = setup();

    session.navigate_to("https://a.example").unwrap();
    session.navigate_to("https://b.example").unwrap();

    // Only one entry is pending; the first was aborted before anything
    // could commit.
    assert_eq!(
        session.history().pending().unwrap().url(),
        &url("https://b.example")
    );
    assert_eq!(
        recorder.events(),
        vec![Event::Aborted(
            "https://a.example/".to_string(),
            AbortReason::Superseded
        )]
    );

    session.on_navigation_committed(HostId(1), PageId(1));
    assert_eq!(session.current_url(), Some(&url("https://b.example")));
}

#[test]
fn test_failed_load_keeps_current_entry() {
    let (mut session, _mock, recorder) = setup();

    session.navigate_to("https://a.example").unwrap();
    session.on_navigation_committed(HostId(1), PageId(1));

    session.navigate_to("https://b.example").unwrap();
    session.on_provisional_load_failed(
        HostId(1),
        true,
        -105,
        &url("https://b.example"),
        false,
    );

    assert_eq!(session.current_url(), Some(&url("https://a.example")));
    assert!(!session.is_navigating());
    assert_eq!(
        recorder.events(),
        vec![
            Event::Committed("https://a.example/".to_string(), PageId(1)),
            Event::Aborted(
                "https://b.example/".to_string(),
                AbortReason::LoadFailed { error_code: -105 }
            ),
        ]
    );
}

#[test]
fn test_redirect_changes_target_without_notifications() {
    let (mut session, _mock, recorder) = setup();

    session.navigate_to("https://a.example").unwrap();
    session.on_navigation_committed(HostId(1), PageId(1));
    session.navigate_to("https://b.example").unwrap();
    let before = recorder.events();

    session.on_redirect(
        PageId(0),
        &url("https://b.example"),
        &url("https://b.example/landing"),
    );

    assert_eq!(
        session.history().pending().unwrap().url(),
        &url("https://b.example/landing")
    );
    // Current and last entries are untouched and no abort/commit fired.
    assert_eq!(session.current_url(), Some(&url("https://a.example")));
    assert!(session.history().last().is_none());
    assert_eq!(recorder.events(), before);
}

#[test]
fn test_bounds_update_is_idempotent() {
    let (mut session, mock, _recorder) = setup();
    let rect = Rect::new(0, 0, 1024, 768);

    session.set_container_bounds(rect);
    session.set_container_bounds(rect);

    assert_eq!(resize_count(&mock.calls()), 1);
    assert_eq!(session.container_bounds(), rect);
}

#[test]
fn test_input_before_bind_is_accepted_and_dropped() {
    init_tracing();
    let recorder = Recorder::default();
    let mut session = WindowSession::new(
        SessionSettings::default(),
        Box::new(RecordingDelegate(recorder.clone())),
    );

    session.mouse_moved(10, 10);
    session.mouse_button(0, true);
    session.mouse_button(0, false);
    session.mouse_wheel(0, -120);
    session.text_event("hello");

    let mock = MockRenderHost::new(HostId(1));
    let host: Arc<dyn RenderHost> = mock.clone();
    session.bind(&host);

    // Nothing was queued for the host; only the surface request arrives.
    assert!(mock
        .calls()
        .iter()
        .all(|call| matches!(call, HostCall::CreateView(_))));
}

#[test]
fn test_input_forwards_at_last_cursor_position() {
    let (mut session, mock, _recorder) = setup();

    session.mouse_moved(50, 60);
    session.mouse_wheel(0, 120);

    let calls = mock.calls();
    assert_eq!(calls.len(), 2);
    assert!(matches!(
        &calls[1],
        HostCall::Input(webview_embed::input::InputEvent::MouseWheel { x: 50, y: 60, .. })
    ));
}

#[test]
fn test_unknown_mouse_button_dropped_without_error() {
    let (mut session, mock, _recorder) = setup();
    session.mouse_button(99, true);
    assert_eq!(mock.call_count(), 0);
}

#[test]
fn test_resize_before_bind_reaches_new_host() {
    init_tracing();
    let settings = SessionSettings::default().with_initial_bounds(Rect::default());
    let mut session = WindowSession::new(settings, Box::new(RecordingDelegate(Recorder::default())));

    session.resize(800, 600);

    let mock = MockRenderHost::new(HostId(7));
    let host: Arc<dyn RenderHost> = mock.clone();
    session.bind(&host);

    assert_eq!(
        mock.calls(),
        vec![HostCall::CreateView(Size::new(800, 600))]
    );
}

#[test]
fn test_host_swap_reissues_pending_navigation() {
    let (mut session, mock_a, _recorder) = setup();

    session.navigate_to("https://b.example").unwrap();
    assert_eq!(mock_a.call_count(), 1);

    // Cross-process navigation: the engine produces a fresh host.
    let mock_b = MockRenderHost::new(HostId(2));
    let host_b: Arc<dyn RenderHost> = mock_b.clone();
    session.bind(&host_b);

    let navigations: Vec<_> = mock_b
        .calls()
        .into_iter()
        .filter(|call| matches!(call, HostCall::Navigate { .. }))
        .collect();
    assert_eq!(
        navigations,
        vec![HostCall::Navigate {
            url: url("https://b.example"),
            referrer: None,
            reload: false,
        }]
    );

    // The superseded host's callbacks are now stale.
    session.on_navigation_committed(HostId(1), PageId(4));
    assert!(session.current_url().is_none());

    session.on_navigation_committed(HostId(2), PageId(4));
    assert_eq!(session.current_url(), Some(&url("https://b.example")));
}

#[test]
fn test_stale_host_callbacks_drop_without_state_changes() {
    let (mut session, _mock, recorder) = setup();
    let bounds = session.container_bounds();

    session.on_load_started(HostId(99));
    session.on_navigation_committed(HostId(99), PageId(5));
    session.on_provisional_load_failed(HostId(99), true, -2, &url("https://a.example"), false);

    assert!(recorder.events().is_empty());
    assert!(!session.is_loading());
    assert!(session.current_url().is_none());
    assert_eq!(session.container_bounds(), bounds);
}

#[test]
fn test_load_notifications_are_idempotent() {
    let (mut session, _mock, recorder) = setup();

    session.on_load_started(HostId(1));
    session.on_load_started(HostId(1));
    assert!(session.is_loading());

    session.on_load_stopped(HostId(1));
    session.on_load_stopped(HostId(1));
    assert!(!session.is_loading());

    assert_eq!(recorder.events(), vec![Event::LoadStarted, Event::LoadStopped]);
}

#[test]
fn test_engine_initiated_navigation_synthesizes_pending_entry() {
    let (mut session, _mock, _recorder) = setup();

    // A link click inside the page: no embedder navigate_to happened.
    session.on_provisional_load_started(HostId(1), true, &url("https://linked.example"));
    assert!(session.is_navigating());

    session.on_navigation_committed(HostId(1), PageId(3));
    assert_eq!(session.current_url(), Some(&url("https://linked.example")));
}

#[test]
fn test_subframe_provisional_load_is_ignored() {
    let (mut session, _mock, _recorder) = setup();
    session.on_provisional_load_started(HostId(1), false, &url("https://iframe.example"));
    assert!(!session.is_navigating());
}

#[test]
fn test_new_window_offer_flow() {
    let (mut session, _mock, recorder) = setup();

    session.on_create_new_window(RouteId(42));
    assert_eq!(session.pending_window_count(), 1);
    assert_eq!(recorder.offered_window_count(), 0);

    let rect = Rect::new(20, 30, 400, 300);
    session.on_show_created_window(
        RouteId(42),
        WindowDisposition::NewPopup,
        rect,
        true,
        &url("https://creator.example"),
    );

    assert_eq!(session.pending_window_count(), 0);
    assert_eq!(recorder.offered_window_count(), 1);

    let offered = recorder.offered_windows.lock();
    let (window, disposition, initial_rect) = &offered[0];
    assert_eq!(*disposition, WindowDisposition::NewPopup);
    assert_eq!(*initial_rect, rect);
    // The child was seeded with the placement hint.
    assert_eq!(window.container_bounds(), rect);
}

#[test]
fn test_stale_route_id_show_is_dropped() {
    let (mut session, _mock, recorder) = setup();

    session.on_show_created_window(
        RouteId(7),
        WindowDisposition::NewWindow,
        Rect::from_size(100, 100),
        false,
        &url("https://creator.example"),
    );
    session.on_show_created_widget(RouteId(8), Rect::from_size(50, 50));

    assert_eq!(recorder.offered_window_count(), 0);
    assert!(recorder.events().is_empty());
}

#[test]
fn test_widget_offer_flow() {
    let (mut session, _mock, recorder) = setup();

    session.on_create_new_widget(RouteId(5), true);
    let rect = Rect::new(0, 0, 200, 80);
    session.on_show_created_widget(RouteId(5), rect);

    assert_eq!(
        recorder.events(),
        vec![Event::WidgetOffered(RouteId(5), true, rect)]
    );
    assert_eq!(session.pending_widget_count(), 0);
}

#[test]
fn test_ui_intents_forward_verbatim() {
    let (mut session, _mock, recorder) = setup();

    session.on_context_menu(&ContextMenuInfo {
        x: 10,
        y: 20,
        selection_text: "pick me".to_string(),
        ..ContextMenuInfo::default()
    });
    session.on_drag_start(&DragData::default(), DragOperations::COPY | DragOperations::MOVE);
    session.on_drag_cursor_update(DragOperations::COPY);
    session.on_focus_gained();
    session.on_focus_lost(true);
    session.on_preferred_width_changed(960);
    session.on_resource_response_started(&ResourceRequestInfo {
        url: url("https://a.example/style.css"),
        original_url: None,
        http_status: Some(200),
    });
    session.on_document_loaded_in_frame();

    assert_eq!(
        recorder.events(),
        vec![
            Event::ContextMenu("pick me".to_string()),
            Event::DragStart(DragOperations::COPY | DragOperations::MOVE),
            Event::DragCursor(DragOperations::COPY),
            Event::FocusGained,
            Event::FocusLost(true),
            Event::PreferredWidth(960),
            Event::ResourceResponse("https://a.example/style.css".to_string()),
            Event::DocumentLoaded,
        ]
    );
}

#[test]
fn test_resource_callbacks_do_not_touch_navigation_state() {
    let (mut session, _mock, _recorder) = setup();

    session.navigate_to("https://a.example").unwrap();
    session.on_resource_response_started(&ResourceRequestInfo {
        url: url("https://a.example/app.js"),
        original_url: None,
        http_status: Some(200),
    });
    session.on_resource_loaded_from_cache(&url("https://a.example/cached.png"));

    assert_eq!(
        session.history().pending().unwrap().url(),
        &url("https://a.example")
    );
    assert!(session.current_url().is_none());
}

#[test]
fn test_close_aborts_pending_and_notifies() {
    let (mut session, _mock, recorder) = setup();

    session.navigate_to("https://a.example").unwrap();
    session.on_load_started(HostId(1));
    session.close();

    assert_eq!(
        recorder.events(),
        vec![
            Event::LoadStarted,
            Event::Aborted(
                "https://a.example/".to_string(),
                AbortReason::SessionClosed
            ),
            Event::LoadStopped,
        ]
    );

    // Callbacks after destruction are dropped.
    session.on_load_started(HostId(1));
    assert_eq!(recorder.events().len(), 3);
}

#[test]
fn test_pull_queries_reflect_viewport_mid_navigation() {
    let (mut session, _mock, _recorder) = setup();

    session.navigate_to("https://a.example").unwrap();
    session.set_container_bounds(Rect::new(5, 5, 320, 240));

    assert_eq!(session.container_bounds(), Rect::new(5, 5, 320, 240));
    assert_eq!(session.container_size(), Size::new(320, 240));
}
