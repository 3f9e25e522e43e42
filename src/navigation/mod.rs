//! Navigation history for an embedded window session.
//!
//! Tracks the committed entry, the previously committed entry, and at most
//! one pending entry at a time. The pending entry is created when the
//! embedder requests a navigation (or when the engine reports a main-frame
//! provisional load the embedder did not initiate) and resolves to either a
//! commit or an abort reported by the rendering engine.
//!
//! # Example
//!
//! ```rust
//! use webview_embed::navigation::{NavigationHistory, PageId, Transition};
//!
//! let mut history = NavigationHistory::new();
//! history.begin("https://example.com", None, Transition::Typed).unwrap();
//! history.commit(PageId(1)).unwrap();
//! assert_eq!(history.current().unwrap().url().as_str(), "https://example.com/");
//! ```

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Opaque page identifier issued by the rendering engine when a navigation
/// commits. The adapter never allocates these; it only compares them to
/// detect stale callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageId(pub i64);

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "page:{}", self.0)
    }
}

/// How a navigation was initiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The embedder supplied the URL directly (address bar equivalent).
    Typed,
    /// The engine followed a link inside the page.
    Link,
    /// The current page was reloaded.
    Reload,
    /// A form submission navigated the frame.
    FormSubmit,
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transition::Typed => write!(f, "typed"),
            Transition::Link => write!(f, "link"),
            Transition::Reload => write!(f, "reload"),
            Transition::FormSubmit => write!(f, "form-submit"),
        }
    }
}

/// Why a pending navigation went away without committing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    /// A newer navigation superseded it.
    Superseded,
    /// The engine reported a provisional load failure.
    LoadFailed {
        /// Engine-defined error code.
        error_code: i32,
    },
    /// The session was closed while the navigation was in flight.
    SessionClosed,
}

impl std::fmt::Display for AbortReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AbortReason::Superseded => write!(f, "superseded by a newer navigation"),
            AbortReason::LoadFailed { error_code } => {
                write!(f, "provisional load failed (error {})", error_code)
            }
            AbortReason::SessionClosed => write!(f, "session closed"),
        }
    }
}

/// Errors surfaced synchronously from navigation operations.
#[derive(Debug, Error)]
pub enum NavigationError {
    /// The navigation target could not be parsed as a URL.
    #[error("invalid navigation target '{url}': {source}")]
    InvalidUrl {
        /// The string that failed to parse.
        url: String,
        /// Parser diagnostic.
        source: url::ParseError,
    },

    /// An operation required a pending entry but none exists.
    #[error("no navigation is pending")]
    NothingPending,

    /// An operation required a committed entry but none exists.
    #[error("no navigation has committed yet")]
    NoCurrentEntry,
}

/// Parses and normalizes a navigation target.
pub fn parse_target(url: &str) -> Result<Url, NavigationError> {
    Url::parse(url).map_err(|source| NavigationError::InvalidUrl {
        url: url.to_string(),
        source,
    })
}

/// One committed or pending navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationEntry {
    url: Url,
    referrer: Option<Url>,
    transition: Transition,
    page_id: Option<PageId>,
    created_at: DateTime<Utc>,
}

impl NavigationEntry {
    fn new(url: Url, referrer: Option<Url>, transition: Transition) -> Self {
        Self {
            url,
            referrer,
            transition,
            page_id: None,
            created_at: Utc::now(),
        }
    }

    /// Target URL of this navigation.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Referrer URL, if one was supplied.
    pub fn referrer(&self) -> Option<&Url> {
        self.referrer.as_ref()
    }

    /// How this navigation was initiated.
    pub fn transition(&self) -> Transition {
        self.transition
    }

    /// Engine-issued page identifier; `None` until the entry commits.
    pub fn page_id(&self) -> Option<PageId> {
        self.page_id
    }

    /// When this entry was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Ordered navigation state: current, last, and at most one pending entry.
#[derive(Debug, Clone, Default)]
pub struct NavigationHistory {
    current: Option<NavigationEntry>,
    last: Option<NavigationEntry>,
    pending: Option<NavigationEntry>,
}

impl NavigationHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a pending navigation toward `url`.
    ///
    /// Parses and normalizes the target (and referrer, if given) up front;
    /// nothing is mutated on parse failure. Any previously pending entry is
    /// replaced; callers that need an abort notification for it must call
    /// [`abort`](Self::abort) first.
    pub fn begin(
        &mut self,
        url: &str,
        referrer: Option<&str>,
        transition: Transition,
    ) -> Result<&NavigationEntry, NavigationError> {
        let target = parse_target(url)?;
        let referrer = referrer.map(parse_target).transpose()?;

        Ok(self
            .pending
            .insert(NavigationEntry::new(target, referrer, transition)))
    }

    /// Starts a pending navigation from an already-parsed URL (engine-
    /// initiated navigations report parsed targets).
    pub fn begin_parsed(&mut self, url: Url, transition: Transition) -> &NavigationEntry {
        self.pending.insert(NavigationEntry::new(url, None, transition))
    }

    /// Commits the pending entry with the engine-issued page id.
    ///
    /// The previously current entry becomes the last entry.
    pub fn commit(&mut self, page_id: PageId) -> Result<&NavigationEntry, NavigationError> {
        let mut entry = self.pending.take().ok_or(NavigationError::NothingPending)?;
        entry.page_id = Some(page_id);
        self.last = self.current.take();
        Ok(self.current.insert(entry))
    }

    /// Discards the pending entry. Current and last entries are untouched.
    ///
    /// Returns the discarded entry, or `None` if nothing was pending.
    pub fn abort(&mut self, reason: &AbortReason) -> Option<NavigationEntry> {
        let entry = self.pending.take();
        if let Some(entry) = &entry {
            debug!(url = %entry.url, %reason, "pending navigation aborted");
        }
        entry
    }

    /// Retargets the pending entry in place if its URL matches `source`.
    ///
    /// This is the server-redirect path: identity and ownership of the entry
    /// are unchanged and no listener-visible navigation event occurs.
    /// Returns false (stale) when no pending entry matches.
    pub fn redirect(&mut self, source: &Url, target: Url) -> bool {
        match &mut self.pending {
            Some(entry) if entry.url == *source => {
                entry.url = target;
                true
            }
            _ => false,
        }
    }

    /// Overwrites the pending entry's target unconditionally.
    ///
    /// Used when a provisional load reports a main-frame URL that diverged
    /// from the pending target before any redirect callback (redirect-before-
    /// commit). Returns false when nothing is pending.
    pub fn retarget(&mut self, target: Url) -> bool {
        match &mut self.pending {
            Some(entry) => {
                entry.url = target;
                true
            }
            None => false,
        }
    }

    /// The committed entry, if any navigation has committed.
    pub fn current(&self) -> Option<&NavigationEntry> {
        self.current.as_ref()
    }

    /// The entry that was current before the latest commit.
    pub fn last(&self) -> Option<&NavigationEntry> {
        self.last.as_ref()
    }

    /// The in-flight entry, if a navigation is pending.
    pub fn pending(&self) -> Option<&NavigationEntry> {
        self.pending.as_ref()
    }

    /// Returns true while a navigation is in flight.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_rejects_invalid_url() {
        let mut history = NavigationHistory::new();
        let result = history.begin("not a url", None, Transition::Typed);
        assert!(matches!(result, Err(NavigationError::InvalidUrl { .. })));
        assert!(!history.has_pending());
        assert!(history.current().is_none());
    }

    #[test]
    fn test_commit_moves_current_to_last() {
        let mut history = NavigationHistory::new();

        history
            .begin("https://a.example", None, Transition::Typed)
            .unwrap();
        history.commit(PageId(1)).unwrap();
        assert_eq!(history.current().unwrap().url().as_str(), "https://a.example/");
        assert!(history.last().is_none());

        history
            .begin("https://b.example", None, Transition::Link)
            .unwrap();
        history.commit(PageId(2)).unwrap();
        assert_eq!(history.current().unwrap().url().as_str(), "https://b.example/");
        assert_eq!(history.last().unwrap().url().as_str(), "https://a.example/");
        assert_eq!(history.current().unwrap().page_id(), Some(PageId(2)));
    }

    #[test]
    fn test_commit_without_pending_fails() {
        let mut history = NavigationHistory::new();
        assert!(matches!(
            history.commit(PageId(1)),
            Err(NavigationError::NothingPending)
        ));
    }

    #[test]
    fn test_abort_leaves_current_untouched() {
        let mut history = NavigationHistory::new();
        history
            .begin("https://a.example", None, Transition::Typed)
            .unwrap();
        history.commit(PageId(1)).unwrap();

        history
            .begin("https://b.example", None, Transition::Typed)
            .unwrap();
        let aborted = history.abort(&AbortReason::LoadFailed { error_code: -105 });

        assert_eq!(aborted.unwrap().url().as_str(), "https://b.example/");
        assert_eq!(history.current().unwrap().url().as_str(), "https://a.example/");
        assert!(!history.has_pending());
    }

    #[test]
    fn test_redirect_retargets_matching_pending() {
        let mut history = NavigationHistory::new();
        history
            .begin("https://a.example", None, Transition::Typed)
            .unwrap();

        let source = Url::parse("https://a.example").unwrap();
        let target = Url::parse("https://a.example/landing").unwrap();
        assert!(history.redirect(&source, target.clone()));
        assert_eq!(history.pending().unwrap().url(), &target);

        // Stale source URL is refused.
        let stale = Url::parse("https://elsewhere.example").unwrap();
        assert!(!history.redirect(&stale, source));
        assert_eq!(history.pending().unwrap().url(), &target);
    }

    #[test]
    fn test_redirect_does_not_touch_committed_entries() {
        let mut history = NavigationHistory::new();
        history
            .begin("https://a.example", None, Transition::Typed)
            .unwrap();
        history.commit(PageId(1)).unwrap();

        let source = Url::parse("https://a.example").unwrap();
        let target = Url::parse("https://b.example").unwrap();
        assert!(!history.redirect(&source, target));
        assert_eq!(history.current().unwrap().url().as_str(), "https://a.example/");
    }

    #[test]
    fn test_retarget_requires_pending() {
        let mut history = NavigationHistory::new();
        let url = Url::parse("https://a.example").unwrap();
        assert!(!history.retarget(url.clone()));

        history
            .begin("https://b.example", None, Transition::Typed)
            .unwrap();
        assert!(history.retarget(url.clone()));
        assert_eq!(history.pending().unwrap().url(), &url);
    }

    #[test]
    fn test_single_pending_invariant() {
        let mut history = NavigationHistory::new();
        history
            .begin("https://a.example", None, Transition::Typed)
            .unwrap();
        history
            .begin("https://b.example", None, Transition::Typed)
            .unwrap();

        assert_eq!(history.pending().unwrap().url().as_str(), "https://b.example/");
        // Committing resolves to the newest pending entry only.
        history.commit(PageId(1)).unwrap();
        assert_eq!(history.current().unwrap().url().as_str(), "https://b.example/");
        assert!(history.last().is_none());
    }
}
