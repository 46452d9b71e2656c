//! Warehouse-style projections of a screen summary
//!
//! Mirrors the rows the modeled tables would hold for this single screen view:
//! raw atomic events, then per-view, per-session and per-user aggregates. The
//! session and user rows add configured totals from earlier (simulated) views.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::accumulator::{ScreenSummary, Timestamp};

// ============================================================================
// Inputs
// ============================================================================

/// The `screen` entity attached to screen events
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenEntity {
    pub id: String,
    pub name: String,
}

impl Default for ScreenEntity {
    fn default() -> Self {
        Self {
            id: "2c7f8c5d-6b8b-4a9b-8c3a-0b9c9a1f0b0e".to_owned(),
            name: "Snow App – Scroll Down".to_owned(),
        }
    }
}

/// Identifiers and prior totals for the session and user aggregates
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarehouseConfig {
    pub session_id: String,
    pub session_prior_engaged_sec: u64,
    pub session_prior_absolute_sec: u64,
    pub user_id: String,
    pub user_prior_engaged_sec: u64,
    pub user_prior_absolute_sec: u64,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            session_id: "98c47c5e-d45d-47ba-a30b-b98d42e820db".to_owned(),
            session_prior_engaged_sec: 412,
            session_prior_absolute_sec: 935,
            user_id: "b2476e05-172f-49a4-98a1-ef5e1dccf70d".to_owned(),
            user_prior_engaged_sec: 1342,
            user_prior_absolute_sec: 5398,
        }
    }
}

// ============================================================================
// Rows
// ============================================================================

/// One row of the atomic events table
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtomicEventRow {
    pub event_name: String,
    pub dvce_created_tstamp: String,
    pub screen: Vec<ScreenEntity>,
    pub screen_summary: Vec<ScreenSummary>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewsRow {
    pub view_id: String,
    pub engaged_time_in_s: u64,
    pub absolute_time_in_s: u64,
    pub vertical_pixels_scrolled: u32,
    pub vertical_percentage_scrolled: u64,
    pub last_list_item_index: u32,
    pub list_items_count: u32,
    pub list_items_percentage_scrolled: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionsRow {
    pub session_identifier: String,
    pub engaged_time_in_s: u64,
    pub absolute_time_in_s: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsersRow {
    pub user_identifier: String,
    pub engaged_time_in_s: u64,
    pub absolute_time_in_s: u64,
}

/// All projected tables for the current screen view
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseTables {
    pub atomic_events: Vec<AtomicEventRow>,
    pub views: ViewsRow,
    pub sessions: SessionsRow,
    pub users: UsersRow,
}

// ============================================================================
// Projections
// ============================================================================

pub fn project(
    summary: &ScreenSummary,
    screen: &ScreenEntity,
    config: &WarehouseConfig,
    loaded_at: Timestamp,
    now: Timestamp,
) -> WarehouseTables {
    WarehouseTables {
        atomic_events: atomic_events(summary, screen, loaded_at, now),
        views: views_row(summary, screen),
        sessions: sessions_row(summary, config),
        users: users_row(summary, config),
    }
}

/// `screen_end` carrying the summary, followed by the original `screen_view`
pub fn atomic_events(
    summary: &ScreenSummary,
    screen: &ScreenEntity,
    loaded_at: Timestamp,
    now: Timestamp,
) -> Vec<AtomicEventRow> {
    vec![
        AtomicEventRow {
            event_name: "screen_end".to_owned(),
            dvce_created_tstamp: iso_timestamp(now),
            screen: vec![screen.clone()],
            screen_summary: vec![summary.clone()],
        },
        AtomicEventRow {
            event_name: "screen_view".to_owned(),
            dvce_created_tstamp: iso_timestamp(loaded_at),
            screen: vec![screen.clone()],
            screen_summary: Vec::new(),
        },
    ]
}

pub fn views_row(summary: &ScreenSummary, screen: &ScreenEntity) -> ViewsRow {
    ViewsRow {
        view_id: screen.id.clone(),
        engaged_time_in_s: summary.foreground_sec,
        absolute_time_in_s: absolute_sec(summary),
        vertical_pixels_scrolled: summary.max_y_offset,
        vertical_percentage_scrolled: percent(
            u64::from(summary.max_y_offset),
            u64::from(summary.content_height),
        ),
        last_list_item_index: summary.last_item_index,
        list_items_count: summary.items_count,
        list_items_percentage_scrolled: percent(
            u64::from(summary.last_item_index) + 1,
            u64::from(summary.items_count),
        ),
    }
}

pub fn sessions_row(summary: &ScreenSummary, config: &WarehouseConfig) -> SessionsRow {
    SessionsRow {
        session_identifier: config.session_id.clone(),
        engaged_time_in_s: summary.foreground_sec + config.session_prior_engaged_sec,
        absolute_time_in_s: absolute_sec(summary) + config.session_prior_absolute_sec,
    }
}

pub fn users_row(summary: &ScreenSummary, config: &WarehouseConfig) -> UsersRow {
    UsersRow {
        user_identifier: config.user_id.clone(),
        engaged_time_in_s: summary.foreground_sec + config.user_prior_engaged_sec,
        absolute_time_in_s: absolute_sec(summary) + config.user_prior_absolute_sec,
    }
}

fn absolute_sec(summary: &ScreenSummary) -> u64 {
    summary.foreground_sec + summary.background_sec
}

/// Rounded percentage; an empty denominator reports 0
fn percent(numerator: u64, denominator: u64) -> u64 {
    if denominator == 0 {
        return 0;
    }
    (numerator as f64 / denominator as f64 * 100.0).round() as u64
}

/// RFC 3339 with milliseconds and a `Z` suffix, e.g. `2024-01-01T00:00:00.000Z`
pub fn iso_timestamp(ts: Timestamp) -> String {
    DateTime::<Utc>::from_timestamp_millis(ts)
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_default()
}
