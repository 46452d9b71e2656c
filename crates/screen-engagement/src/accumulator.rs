//! Engagement accumulator for a single screen view
//!
//! Folds timestamped visibility, background and scroll notifications into the
//! counters behind the `screen_summary` entity and the per-element segments.
//! Every query is a pure function of the stored state and the supplied `now`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::geometry::{self, PageGeometry, PageOffsets};

/// Milliseconds since the Unix epoch
pub type Timestamp = i64;

// ============================================================================
// Core Types
// ============================================================================

/// Position of a tracked element within its list
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListPosition {
    pub index: u32,
    pub collection_size: u32,
}

impl ListPosition {
    pub fn new(index: u32, collection_size: u32) -> Self {
        Self { index, collection_size }
    }
}

/// Whether the simulated app is currently active
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppState {
    Foreground,
    Background,
}

/// Point-in-time `screen_summary` entity
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenSummary {
    /// Time on the screen while the app was in foreground
    pub foreground_sec: u64,
    /// Time on the screen while the app was in background
    pub background_sec: u64,
    /// Index of the last viewed item in the list
    pub last_item_index: u32,
    /// Total number of items in the list
    pub items_count: u32,
    /// Minimum vertical scroll offset in pixels
    pub min_y_offset: u32,
    /// Maximum vertical scroll offset in pixels
    pub max_y_offset: u32,
    /// Width of the scroll view content in pixels
    pub content_width: u32,
    /// Height of the scroll view content in pixels
    pub content_height: u32,
}

/// Display row for one engagement segment
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentView {
    pub id: String,
    pub description: String,
    /// Rounded seconds the element has been visible, open interval included
    pub visible: u64,
    pub y_percent_reached: u8,
}

/// Engagement record of one tracked element
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngagementSegment {
    identifier: String,
    description: String,
    total_visible_ms: u64,
    visible_since: Option<Timestamp>,
    max_scroll_depth_percent: u8,
}

impl EngagementSegment {
    fn new(identifier: &str, description: &str) -> Self {
        Self {
            identifier: identifier.to_owned(),
            description: description.to_owned(),
            total_visible_ms: 0,
            visible_since: None,
            max_scroll_depth_percent: 0,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// True while a visible interval is open
    pub fn is_visible(&self) -> bool {
        self.visible_since.is_some()
    }

    pub fn visible_since(&self) -> Option<Timestamp> {
        self.visible_since
    }

    /// Visible time across closed intervals only
    pub fn total_visible_seconds(&self) -> f64 {
        self.total_visible_ms as f64 / 1000.0
    }

    pub fn max_scroll_depth_percent(&self) -> u8 {
        self.max_scroll_depth_percent
    }

    fn visible_ms_at(&self, now: Timestamp) -> u64 {
        let open = self.visible_since.map(|since| elapsed_ms(since, now)).unwrap_or(0);
        self.total_visible_ms.saturating_add(open)
    }

    fn close_interval(&mut self, now: Timestamp) {
        if let Some(since) = self.visible_since.take() {
            self.total_visible_ms = self.total_visible_ms.saturating_add(elapsed_ms(since, now));
        }
    }

    fn view(&self, now: Timestamp) -> SegmentView {
        SegmentView {
            id: self.identifier.clone(),
            description: self.description.clone(),
            visible: round_secs(self.visible_ms_at(now)),
            y_percent_reached: self.max_scroll_depth_percent,
        }
    }
}

// ============================================================================
// Accumulator
// ============================================================================

/// Counters for one screen view, from load until the screen is left
#[derive(Clone, Debug)]
pub struct Accumulator {
    loaded_at: Timestamp,
    background_accumulated_secs: u64,
    background_since: Option<Timestamp>,
    last_item_index: Option<u32>,
    items_count: u32,
    /// (min, max) vertical offset; None until the first page scroll
    y_offsets: Option<(u32, u32)>,
    content_width: u32,
    content_height: u32,
    /// Keyed by identifier so iteration is already in display order
    segments: BTreeMap<String, EngagementSegment>,
}

impl Accumulator {
    pub fn new(loaded_at: Timestamp) -> Self {
        Self {
            loaded_at,
            background_accumulated_secs: 0,
            background_since: None,
            last_item_index: None,
            items_count: 0,
            y_offsets: None,
            content_width: 0,
            content_height: 0,
            segments: BTreeMap::new(),
        }
    }

    pub fn loaded_at(&self) -> Timestamp {
        self.loaded_at
    }

    pub fn app_state(&self) -> AppState {
        if self.background_since.is_some() {
            AppState::Background
        } else {
            AppState::Foreground
        }
    }

    /// Whole seconds spent in background across closed intervals
    pub fn background_accumulated_secs(&self) -> u64 {
        self.background_accumulated_secs
    }

    pub fn segment(&self, identifier: &str) -> Option<&EngagementSegment> {
        self.segments.get(identifier)
    }

    /// Segments ordered by identifier
    pub fn segments(&self) -> impl Iterator<Item = &EngagementSegment> {
        self.segments.values()
    }

    // ------------------------------------------------------------------------
    // Background / foreground
    // ------------------------------------------------------------------------

    /// Flip between foreground and background, returning the new state
    pub fn toggle_background(&mut self, now: Timestamp) -> AppState {
        match self.app_state() {
            AppState::Foreground => self.enter_background(now),
            AppState::Background => self.enter_foreground(now),
        };
        self.app_state()
    }

    /// Open a background interval. Returns false if already backgrounded.
    pub fn enter_background(&mut self, now: Timestamp) -> bool {
        if self.background_since.is_some() {
            return false;
        }
        tracing::debug!("enter_background: at={}", now);
        self.background_since = Some(now);
        true
    }

    /// Close the background interval. Returns false if already in foreground.
    pub fn enter_foreground(&mut self, now: Timestamp) -> bool {
        let Some(since) = self.background_since.take() else {
            return false;
        };
        let secs = round_secs(elapsed_ms(since, now));
        self.background_accumulated_secs = self.background_accumulated_secs.saturating_add(secs);
        tracing::debug!(
            "enter_foreground: at={}, interval_sec={}, background_total_sec={}",
            now,
            secs,
            self.background_accumulated_secs
        );
        true
    }

    // ------------------------------------------------------------------------
    // Element notifications
    // ------------------------------------------------------------------------

    /// Record an intersection change for a tracked element
    ///
    /// Returns true if the element changed state. Repeated notifications of the
    /// current state are ignored. A hidden notification for an element never seen
    /// visible does not create a segment.
    pub fn on_visibility_change(
        &mut self,
        element_id: &str,
        description: &str,
        is_visible: bool,
        position: Option<ListPosition>,
        now: Timestamp,
    ) -> bool {
        if is_visible {
            if let Some(position) = position {
                self.record_list_position(position);
            }
        }

        if !is_visible && !self.segments.contains_key(element_id) {
            return false;
        }

        let segment = self
            .segments
            .entry(element_id.to_owned())
            .or_insert_with(|| EngagementSegment::new(element_id, description));
        if !description.is_empty() && segment.description != description {
            segment.description = description.to_owned();
        }

        match (is_visible, segment.visible_since) {
            (true, None) => {
                segment.visible_since = Some(now);
                tracing::debug!("segment visible: id={}, at={}", element_id, now);
                true
            }
            (false, Some(_)) => {
                segment.close_interval(now);
                tracing::debug!(
                    "segment hidden: id={}, at={}, total_ms={}",
                    element_id,
                    now,
                    segment.total_visible_ms
                );
                true
            }
            _ => false,
        }
    }

    /// Record a scroll depth measurement, keeping the maximum. Returns the new maximum.
    pub fn on_scroll_depth(&mut self, element_id: &str, depth_percent: u8) -> u8 {
        let segment = self
            .segments
            .entry(element_id.to_owned())
            .or_insert_with(|| EngagementSegment::new(element_id, ""));
        segment.max_scroll_depth_percent = segment.max_scroll_depth_percent.max(depth_percent.min(100));
        segment.max_scroll_depth_percent
    }

    /// Keeps `last_item_index < items_count`; an index past the reported
    /// collection size grows the count to cover it.
    fn record_list_position(&mut self, position: ListPosition) {
        let last = self
            .last_item_index
            .map_or(position.index, |last| last.max(position.index));
        self.last_item_index = Some(last);
        self.items_count = self
            .items_count
            .max(position.collection_size)
            .max(last.saturating_add(1));
    }

    // ------------------------------------------------------------------------
    // Page scroll
    // ------------------------------------------------------------------------

    /// Measure the page geometry and fold it into the offset extrema
    pub fn on_page_scroll(&mut self, page: &PageGeometry, border_correction: f64) -> PageOffsets {
        let offsets = geometry::page_offsets(page, border_correction);
        self.record_page_offsets(offsets);
        offsets
    }

    /// Fold already-computed offsets into the extrema and content dimensions
    pub fn record_page_offsets(&mut self, offsets: PageOffsets) {
        let y = offsets.y_offset;
        self.y_offsets = Some(match self.y_offsets {
            Some((min, max)) => (min.min(y), max.max(y)),
            None => (y, y),
        });
        self.content_width = offsets.content_width;
        self.content_height = offsets.content_height;
    }

    // ------------------------------------------------------------------------
    // Snapshots
    // ------------------------------------------------------------------------

    /// Summary at `now`; open background interval included, state untouched
    pub fn summarize(&self, now: Timestamp) -> ScreenSummary {
        let open_background = self
            .background_since
            .map(|since| round_secs(elapsed_ms(since, now)))
            .unwrap_or(0);
        let background_sec = self.background_accumulated_secs.saturating_add(open_background);
        let foreground_sec = round_secs(elapsed_ms(self.loaded_at, now)).saturating_sub(background_sec);
        let (min_y_offset, max_y_offset) = self.y_offsets.unwrap_or((0, 0));

        ScreenSummary {
            foreground_sec,
            background_sec,
            last_item_index: self.last_item_index.unwrap_or(0),
            items_count: self.items_count,
            min_y_offset,
            max_y_offset,
            content_width: self.content_width,
            content_height: self.content_height,
        }
    }

    /// Segment rows at `now`, sorted by id ascending
    pub fn list_segments(&self, now: Timestamp) -> Vec<SegmentView> {
        self.segments.values().map(|segment| segment.view(now)).collect()
    }

    /// Fold every open visible interval and an open background interval at `now`
    pub fn close(&mut self, now: Timestamp) {
        for segment in self.segments.values_mut() {
            segment.close_interval(now);
        }
        self.enter_foreground(now);
    }
}

// ============================================================================
// Time Helpers
// ============================================================================

/// Elapsed milliseconds; a clock moving backwards counts as zero
fn elapsed_ms(since: Timestamp, now: Timestamp) -> u64 {
    now.saturating_sub(since).max(0) as u64
}

/// Milliseconds to whole seconds, rounding half up
fn round_secs(ms: u64) -> u64 {
    ms.saturating_add(500) / 1000
}
