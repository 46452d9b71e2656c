//! Warehouse projection tests

mod common;

use common::*;
use screen_engagement::warehouse::{self, ScreenEntity, WarehouseConfig};

fn summary() -> ScreenSummary {
    ScreenSummary {
        foreground_sec: 42,
        background_sec: 8,
        last_item_index: 4,
        items_count: 20,
        min_y_offset: 0,
        max_y_offset: 600,
        content_width: 300,
        content_height: 2400,
    }
}

#[test]
fn test_views_row() {
    let row = warehouse::views_row(&summary(), &ScreenEntity::default());

    assert_eq!(row.view_id, "2c7f8c5d-6b8b-4a9b-8c3a-0b9c9a1f0b0e");
    assert_eq!(row.engaged_time_in_s, 42);
    assert_eq!(row.absolute_time_in_s, 50);
    assert_eq!(row.vertical_pixels_scrolled, 600);
    assert_eq!(row.vertical_percentage_scrolled, 25);
    assert_eq!(row.last_list_item_index, 4);
    assert_eq!(row.list_items_count, 20);
    assert_eq!(row.list_items_percentage_scrolled, 25);
}

#[test]
fn test_views_row_empty_screen_has_zero_percentages() {
    let row = warehouse::views_row(&ScreenSummary::default(), &ScreenEntity::default());

    assert_eq!(row.vertical_percentage_scrolled, 0);
    assert_eq!(row.list_items_percentage_scrolled, 0);
}

#[test]
fn test_sessions_and_users_add_prior_totals() {
    let config = WarehouseConfig::default();

    let session = warehouse::sessions_row(&summary(), &config);
    assert_eq!(session.session_identifier, "98c47c5e-d45d-47ba-a30b-b98d42e820db");
    assert_eq!(session.engaged_time_in_s, 42 + 412);
    assert_eq!(session.absolute_time_in_s, 50 + 935);

    let user = warehouse::users_row(&summary(), &config);
    assert_eq!(user.user_identifier, "b2476e05-172f-49a4-98a1-ef5e1dccf70d");
    assert_eq!(user.engaged_time_in_s, 42 + 1342);
    assert_eq!(user.absolute_time_in_s, 50 + 5398);
}

#[test]
fn test_atomic_events_order_and_payload() {
    let screen = ScreenEntity::default();
    let rows = warehouse::atomic_events(&summary(), &screen, at(0), at_ms(50_250));

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].event_name, "screen_end");
    assert_eq!(rows[0].dvce_created_tstamp, "2023-11-14T22:14:10.250Z");
    assert_eq!(rows[0].screen, vec![screen.clone()]);
    assert_eq!(rows[0].screen_summary, vec![summary()]);

    assert_eq!(rows[1].event_name, "screen_view");
    assert_eq!(rows[1].dvce_created_tstamp, "2023-11-14T22:13:20.000Z");
    assert!(rows[1].screen_summary.is_empty());
}

#[test]
fn test_tracker_projection_matches_summary() -> Result<(), anyhow::Error> {
    let (mut tracker, _observer, clock) = tracker_setup();
    tracker.register_element("product_9", "Digital Drawing Tablet", ListPosition::new(9, 20))?;
    tracker.on_intersection("product_9", true)?;
    clock.advance_secs(12);

    let tables = tracker.warehouse();
    assert_eq!(tables.atomic_events[0].screen_summary[0], tracker.current_summary());
    assert_eq!(tables.views.engaged_time_in_s, 12);
    assert_eq!(tables.views.list_items_percentage_scrolled, 50);
    assert_eq!(tables.sessions.engaged_time_in_s, 12 + 412);

    let json = serde_json::to_value(&tables)?;
    assert_eq!(json["atomic_events"][1]["event_name"], "screen_view");
    Ok(())
}
