//! Tests for virtual/real scroll paging.

use sdigrid::pager::{DEFAULT_MAX_HEIGHT, ScrollDirection, ViewportPager};

fn pager(row_count: usize) -> ViewportPager {
    let mut pager = ViewportPager::new();
    pager.configure(25.0, row_count, 500.0, DEFAULT_MAX_HEIGHT);
    pager
}

#[test]
fn test_million_rows_are_paged() {
    let mut pager = pager(1_000_000);
    assert_eq!(pager.virtual_height(), 25_000_000.0);
    assert!(pager.page_count() > 1);

    let change = pager.scroll_to(12_500_000.0);
    assert!(change.scroll_top < DEFAULT_MAX_HEIGHT);
    assert!(change.scroll_top >= 0.0);
    assert!(pager.page() > 0);
}

#[test]
fn test_scroll_round_trip() {
    let mut pager = pager(1_000_000);
    let max = pager.virtual_height() - pager.viewport_height();
    let positions = [0.0, 1.0, 9_999.0, 10_000.0, 123_456.0, 12_500_000.0, max - 1.0, max];
    for y in positions {
        pager.scroll_to(y);
        let back = pager.scroll_top() + pager.offset();
        assert!((back - y).abs() < 1.0, "scroll_to({y}) read back as {back}");
        assert!(pager.scroll_top() <= pager.real_height());
    }
}

#[test]
fn test_round_trip_on_single_page() {
    let mut pager = pager(1_000);
    for y in [0.0, 250.0, 12_345.0, 24_500.0] {
        pager.scroll_to(y);
        assert_eq!(pager.offset(), 0.0);
        assert_eq!(pager.scroll_top(), y);
    }
}

#[test]
fn test_rendered_range_contains_visible_range() {
    for row_count in [1usize, 7, 20, 1_000, 1_000_000] {
        let mut pager = pager(row_count);
        let max = (pager.virtual_height() - pager.viewport_height()).max(0.0);
        let mut y = 0.0;
        while y <= max {
            pager.scroll_to(y);
            let scroll_top = pager.scroll_top();
            for direction in [ScrollDirection::Up, ScrollDirection::Unknown, ScrollDirection::Down] {
                let visible = pager.visible_range(scroll_top).clamp_to(row_count).unwrap();
                let rendered = pager.rendered_range(scroll_top, direction).unwrap();
                assert!(rendered.top <= visible.top);
                assert!(rendered.bottom >= visible.bottom);
                assert!(rendered.bottom < row_count);
            }
            y += (max / 37.0).max(13.0);
        }
    }
}

#[test]
fn test_page_jump_recomputes_page_from_scrollbar() {
    let mut pager = pager(1_000_000);
    let outcome = pager.handle_scroll(DEFAULT_MAX_HEIGHT - 500.0);
    assert!(outcome.invalidate_all);
    assert_eq!(pager.page(), pager.page_count() - 1);
}
