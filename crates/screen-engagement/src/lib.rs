//! Screen Engagement - platform-agnostic screen engagement tracker
//!
//! Accumulates foreground/background time, per-element visible time and scroll
//! depth, and page scroll extrema for one screen view, and publishes the
//! `screen_summary` entity through signals for the renderer.

extern crate self as screen_engagement;

pub mod accumulator;
pub mod clock;
pub mod config;
pub mod error;
pub mod geometry;
pub mod observer;
pub mod warehouse;

use std::collections::BTreeMap;

use ankurah_signals::{Mut, Peek, Read};
use serde::{Deserialize, Serialize};

// Re-export key types
pub use accumulator::{
    Accumulator, AppState, EngagementSegment, ListPosition, ScreenSummary, SegmentView, Timestamp,
};
pub use ankurah_signals;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::TrackerConfig;
pub use error::EngagementError;
pub use geometry::{PageGeometry, PageOffsets, Rect};
pub use observer::{ElementObserver, NoopObserver, Tracked};
pub use screen_engagement_derive::Tracked;
pub use warehouse::{ScreenEntity, WarehouseConfig, WarehouseTables};

// ============================================================================
// Core Types
// ============================================================================

/// Lifecycle of the screen view as a whole
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackerState {
    /// Accepting notifications
    Active,
    /// Screen was left; all updates are rejected
    Flushed,
}

/// Final payload produced when the screen is left
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenEnd {
    pub screen: ScreenEntity,
    /// RFC 3339 time of the `screen_view` event
    pub screen_view_at: String,
    /// RFC 3339 time of the `screen_end` event
    pub screen_end_at: String,
    pub screen_summary: ScreenSummary,
    pub segments: Vec<SegmentView>,
}

/// Per-element data captured at registration
#[derive(Clone, Debug)]
struct Registration {
    description: String,
    position: ListPosition,
}

// ============================================================================
// ScreenTracker
// ============================================================================

/// Engagement tracker owned by the view of one screen
///
/// Wraps an [`Accumulator`] with an injected clock and an [`ElementObserver`]
/// capability. Registered elements are disconnected when the tracker is dropped.
pub struct ScreenTracker<O: ElementObserver, C: Clock> {
    config: TrackerConfig,
    observer: O,
    clock: C,
    accumulator: Accumulator,
    registrations: BTreeMap<String, Registration>,
    flushed_at: Option<Timestamp>,
    summary: Mut<ScreenSummary>,
    segments: Mut<Vec<SegmentView>>,
}

impl<O: ElementObserver, C: Clock> ScreenTracker<O, C> {
    /// Create a tracker; the screen view starts at `clock.now_ms()`
    ///
    /// # Arguments
    /// * `config` - Validated before use
    /// * `observer` - Intersection observation capability of the host
    /// * `clock` - Time source for every notification
    pub fn new(config: TrackerConfig, observer: O, clock: C) -> Result<Self, EngagementError> {
        config.validate()?;
        let loaded_at = clock.now_ms();
        tracing::debug!("screen_view: screen={}, loaded_at={}", config.screen.id, loaded_at);

        Ok(Self {
            config,
            observer,
            clock,
            accumulator: Accumulator::new(loaded_at),
            registrations: BTreeMap::new(),
            flushed_at: None,
            summary: Mut::new(ScreenSummary::default()),
            segments: Mut::new(Vec::new()),
        })
    }

    // Accessors
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn accumulator(&self) -> &Accumulator {
        &self.accumulator
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn state(&self) -> TrackerState {
        if self.flushed_at.is_some() {
            TrackerState::Flushed
        } else {
            TrackerState::Active
        }
    }

    pub fn is_registered(&self, element_id: &str) -> bool {
        self.registrations.contains_key(element_id)
    }

    /// Summary signal, updated by [`refresh`](Self::refresh)
    pub fn summary(&self) -> Read<ScreenSummary> {
        self.summary.read()
    }

    /// Segment list signal, updated by [`refresh`](Self::refresh)
    pub fn segments(&self) -> Read<Vec<SegmentView>> {
        self.segments.read()
    }

    /// Last published summary without recomputing
    pub fn published_summary(&self) -> ScreenSummary {
        self.summary.peek()
    }

    /// Time queries are evaluated at; frozen once flushed
    fn now(&self) -> Timestamp {
        self.flushed_at.unwrap_or_else(|| self.clock.now_ms())
    }

    fn ensure_active(&self) -> Result<(), EngagementError> {
        match self.state() {
            TrackerState::Active => Ok(()),
            TrackerState::Flushed => {
                tracing::warn!("update rejected: screen {} already flushed", self.config.screen.id);
                Err(EngagementError::Flushed)
            }
        }
    }

    // ------------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------------

    /// Register a tracked list item and start observing it
    ///
    /// Returns false if the element was already registered; it is not observed twice.
    pub fn register(&mut self, element: &impl Tracked, position: ListPosition) -> Result<bool, EngagementError> {
        self.register_element(&element.tracking_id(), &element.tracking_description(), position)
    }

    pub fn register_element(
        &mut self,
        element_id: &str,
        description: &str,
        position: ListPosition,
    ) -> Result<bool, EngagementError> {
        self.ensure_active()?;
        if self.registrations.contains_key(element_id) {
            tracing::debug!("register: {} already observed", element_id);
            return Ok(false);
        }

        self.registrations.insert(
            element_id.to_owned(),
            Registration {
                description: description.to_owned(),
                position,
            },
        );
        self.observer.observe(element_id);
        tracing::debug!(
            "register: id={}, index={}, collection_size={}",
            element_id,
            position.index,
            position.collection_size
        );
        Ok(true)
    }

    /// Stop observing an element, closing its open visible interval
    pub fn unregister(&mut self, element_id: &str) -> Result<bool, EngagementError> {
        self.ensure_active()?;
        let Some(registration) = self.registrations.remove(element_id) else {
            return Ok(false);
        };

        self.observer.disconnect(element_id);
        let now = self.clock.now_ms();
        self.accumulator
            .on_visibility_change(element_id, &registration.description, false, None, now);
        Ok(true)
    }

    // ------------------------------------------------------------------------
    // Notifications
    // ------------------------------------------------------------------------

    /// Intersection change reported by the observer for a registered element
    pub fn on_intersection(&mut self, element_id: &str, is_intersecting: bool) -> Result<(), EngagementError> {
        self.ensure_active()?;
        let Some(registration) = self.registrations.get(element_id) else {
            tracing::debug!("on_intersection: ignoring unregistered element {}", element_id);
            return Ok(());
        };

        let now = self.clock.now_ms();
        self.accumulator.on_visibility_change(
            element_id,
            &registration.description,
            is_intersecting,
            Some(registration.position),
            now,
        );
        Ok(())
    }

    /// Element and scroll container rectangles captured with an intersection change
    ///
    /// Returns the maximum scroll depth reached so far for the element.
    pub fn on_element_geometry(
        &mut self,
        element_id: &str,
        element: &Rect,
        container: &Rect,
    ) -> Result<u8, EngagementError> {
        self.ensure_active()?;
        let depth = geometry::scroll_depth_percent(element, container);
        Ok(self.accumulator.on_scroll_depth(element_id, depth))
    }

    /// Scroll depth computed by the host
    pub fn on_scroll_depth(&mut self, element_id: &str, depth_percent: u8) -> Result<u8, EngagementError> {
        self.ensure_active()?;
        Ok(self.accumulator.on_scroll_depth(element_id, depth_percent))
    }

    pub fn on_page_scroll(&mut self, page: &PageGeometry) -> Result<PageOffsets, EngagementError> {
        self.ensure_active()?;
        let offsets = self.accumulator.on_page_scroll(page, self.config.border_correction_px);
        tracing::debug!(
            "on_page_scroll: y_offset={}, view_height={}, content={}x{}",
            offsets.y_offset,
            offsets.view_height,
            offsets.content_width,
            offsets.content_height
        );
        Ok(offsets)
    }

    /// Move the app between foreground and background
    pub fn toggle_background(&mut self) -> Result<AppState, EngagementError> {
        self.ensure_active()?;
        let now = self.clock.now_ms();
        Ok(self.accumulator.toggle_background(now))
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Recompute the summary and segments and publish them to subscribers
    ///
    /// Intended to be called on the host's display cadence
    /// ([`TrackerConfig::refresh_interval`]). Reads state only.
    pub fn refresh(&self) -> ScreenSummary {
        let now = self.now();
        let summary = self.accumulator.summarize(now);
        self.summary.set(summary.clone());
        self.segments.set(self.accumulator.list_segments(now));
        summary
    }

    pub fn current_summary(&self) -> ScreenSummary {
        self.accumulator.summarize(self.now())
    }

    pub fn current_segments(&self) -> Vec<SegmentView> {
        self.accumulator.list_segments(self.now())
    }

    pub fn summary_json(&self) -> Result<String, EngagementError> {
        Ok(serde_json::to_string_pretty(&self.current_summary())?)
    }

    pub fn segments_json(&self) -> Result<String, EngagementError> {
        Ok(serde_json::to_string_pretty(&self.current_segments())?)
    }

    /// Warehouse tables as they would look with the data collected so far
    pub fn warehouse(&self) -> WarehouseTables {
        let now = self.now();
        warehouse::project(
            &self.accumulator.summarize(now),
            &self.config.screen,
            &self.config.warehouse,
            self.accumulator.loaded_at(),
            now,
        )
    }

    // ------------------------------------------------------------------------
    // Screen exit
    // ------------------------------------------------------------------------

    /// Leave the screen: close open intervals and produce the final payload
    ///
    /// After this every update returns [`EngagementError::Flushed`] and queries
    /// stay frozen at the flush time.
    pub fn flush(&mut self) -> Result<ScreenEnd, EngagementError> {
        self.ensure_active()?;
        let now = self.clock.now_ms();
        self.accumulator.close(now);
        self.flushed_at = Some(now);

        let screen_summary = self.refresh();
        tracing::debug!(
            "screen_end: screen={}, foreground_sec={}, background_sec={}",
            self.config.screen.id,
            screen_summary.foreground_sec,
            screen_summary.background_sec
        );

        Ok(ScreenEnd {
            screen: self.config.screen.clone(),
            screen_view_at: warehouse::iso_timestamp(self.accumulator.loaded_at()),
            screen_end_at: warehouse::iso_timestamp(now),
            screen_summary,
            segments: self.accumulator.list_segments(now),
        })
    }
}

impl<O: ElementObserver, C: Clock> Drop for ScreenTracker<O, C> {
    fn drop(&mut self) {
        for element_id in self.registrations.keys() {
            self.observer.disconnect(element_id);
        }
    }
}
