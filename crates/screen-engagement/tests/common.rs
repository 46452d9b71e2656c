//! Test utilities for screen-engagement integration tests
#![allow(dead_code, unused_imports)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::Level;

// Re-export useful types
pub use screen_engagement::ankurah_signals::{Read, Subscribe, SubscriptionGuard};
pub use screen_engagement::{
    Accumulator, AppState, ElementObserver, EngagementError, ListPosition, ManualClock, PageGeometry,
    Rect, ScreenSummary, ScreenTracker, SegmentView, Timestamp, TrackerConfig, TrackerState,
};

// Initialize tracing for tests
#[ctor::ctor]
fn init_tracing() {
    if let Ok(level) = std::env::var("LOG_LEVEL") {
        let level = level.parse::<Level>().unwrap_or(Level::INFO);
        let _ = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_test_writer()
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_max_level(Level::INFO)
            .with_test_writer()
            .try_init();
    }
}

/// Screen load time used by every test
pub const T0: Timestamp = 1_700_000_000_000;

/// Timestamp `secs` seconds after [`T0`]
pub fn at(secs: i64) -> Timestamp {
    T0 + secs * 1000
}

/// Timestamp `ms` milliseconds after [`T0`]
pub fn at_ms(ms: i64) -> Timestamp {
    T0 + ms
}

// ============================================================================
// Page geometry
// ============================================================================

/// Scroll view of the simulated phone: 300x550 at viewport top 100
pub const VIEW_TOP: f64 = 100.0;
pub const VIEW_HEIGHT: f64 = 550.0;
pub const VIEW_WIDTH: f64 = 300.0;
pub const BORDER: f64 = 30.0;

/// Page geometry for a view scrolled `y` pixels into content `content_height` tall
pub fn page_scrolled(y: f64, content_height: f64) -> PageGeometry {
    let content_top = VIEW_TOP + BORDER - y;
    PageGeometry::new(
        VIEW_TOP,
        content_top,
        content_top + content_height,
        VIEW_TOP + VIEW_HEIGHT,
        0.0,
        VIEW_WIDTH,
    )
}

// ============================================================================
// RecordingObserver
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ObserverCall {
    Observe(String),
    Disconnect(String),
}

/// Observer that records every call; clones share the log so it outlives the tracker
#[derive(Clone, Default)]
pub struct RecordingObserver {
    calls: Arc<Mutex<Vec<ObserverCall>>>,
}

impl RecordingObserver {
    pub fn calls(&self) -> Vec<ObserverCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn observed(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ObserverCall::Observe(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn disconnected(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ObserverCall::Disconnect(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    fn push(&self, call: ObserverCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl ElementObserver for RecordingObserver {
    fn observe(&mut self, element_id: &str) {
        self.push(ObserverCall::Observe(element_id.to_owned()));
    }

    fn disconnect(&mut self, element_id: &str) {
        self.push(ObserverCall::Disconnect(element_id.to_owned()));
    }
}

/// Tracker loaded at [`T0`] with default configuration
pub fn tracker_setup() -> (ScreenTracker<RecordingObserver, ManualClock>, RecordingObserver, ManualClock) {
    let observer = RecordingObserver::default();
    let clock = ManualClock::new(T0);
    let tracker = ScreenTracker::new(TrackerConfig::default(), observer.clone(), clock.clone())
        .expect("default config is valid");
    (tracker, observer, clock)
}

// ============================================================================
// MockDisplay
// ============================================================================

/// Simulates the JSON viewer that re-renders whenever the summary signal changes
pub struct MockDisplay {
    rx: mpsc::UnboundedReceiver<ScreenSummary>,
    _guard: SubscriptionGuard,
}

#[derive(Debug)]
pub enum MockDisplayError {
    Timeout,
    ChannelClosed,
}

impl std::fmt::Display for MockDisplayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MockDisplayError::Timeout => write!(f, "timed out waiting for render"),
            MockDisplayError::ChannelClosed => write!(f, "summary channel closed"),
        }
    }
}

impl std::error::Error for MockDisplayError {}

impl MockDisplay {
    pub fn new(summary: Read<ScreenSummary>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let guard = summary.subscribe(move |s: ScreenSummary| {
            let _ = tx.send(s);
        });
        Self { rx, _guard: guard }
    }

    /// Wait until a render shows `expected`, skipping earlier renders
    pub async fn wait_for(&mut self, expected: &ScreenSummary) -> Result<ScreenSummary, MockDisplayError> {
        let rx = &mut self.rx;
        tokio::time::timeout(Duration::from_secs(1), async {
            loop {
                match rx.recv().await {
                    Some(s) if &s == expected => return Ok(s),
                    Some(_) => continue,
                    None => return Err(MockDisplayError::ChannelClosed),
                }
            }
        })
        .await
        .map_err(|_| MockDisplayError::Timeout)?
    }
}
