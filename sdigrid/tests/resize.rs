//! Tests for interactive column resizing.

use std::cell::RefCell;
use std::rc::Rc;

use sdigrid::prelude::*;

fn widths(grid: &VirtualGrid<VecData>) -> Vec<u32> {
    grid.columns().iter().map(|c| c.width).collect()
}

fn grid(columns: Vec<Column>, options: GridOptions) -> VirtualGrid<VecData> {
    let mut grid = VirtualGrid::new(VecData::new(), columns, options);
    grid.resize_viewport(300, 200.0);
    grid
}

#[test]
fn test_shrink_is_clamped_to_min_width() {
    let columns = vec![
        Column::new("a", "A").with_width(100).with_min_width(50),
        Column::new("b", "B").with_width(100),
        Column::new("c", "C").with_width(100),
    ];
    let mut grid = grid(columns, GridOptions::default());
    assert!(grid.set_column_width(0, 40));
    assert_eq!(widths(&grid), vec![50, 100, 100]);
}

#[test]
fn test_force_fit_gives_freed_width_to_right_columns() {
    let columns = vec![
        Column::new("a", "A").with_width(100).with_min_width(50),
        Column::new("b", "B").with_width(100).with_max_width(120),
        Column::new("c", "C").with_width(100).with_max_width(200),
    ];
    let mut grid = grid(columns, GridOptions::default().with_force_fit_columns(true));
    assert_eq!(widths(&grid), vec![100, 100, 100]);

    assert!(grid.set_column_width(0, 40));
    assert_eq!(widths(&grid), vec![50, 120, 130]);
    assert_eq!(widths(&grid).iter().sum::<u32>(), 300);
    assert_eq!(grid.canvas().column_widths(), &[50, 120, 130]);
}

#[test]
fn test_force_fit_shrink_limited_by_max_widths() {
    let columns = vec![
        Column::new("a", "A").with_width(100).with_min_width(50),
        Column::new("b", "B").with_width(100).with_max_width(110),
        Column::new("c", "C").with_width(100).with_max_width(120),
    ];
    let mut grid = grid(columns, GridOptions::default().with_force_fit_columns(true));
    grid.set_column_width(0, 40);
    // the right columns can only absorb 30px
    assert_eq!(widths(&grid), vec![70, 110, 120]);
}

#[test]
fn test_drag_session_publishes_resized() {
    let columns = vec![
        Column::new("a", "A").with_width(100),
        Column::new("b", "B").with_width(100),
    ];
    let mut grid = grid(columns, GridOptions::default());
    let resized = Rc::new(RefCell::new(Vec::new()));
    let seen = resized.clone();
    grid.events.on_columns_resized.subscribe(move |args| {
        seen.borrow_mut().push(args.column_ids.clone());
        Propagation::Continue
    });

    assert!(grid.begin_column_resize(1, 200));
    grid.drag_column_resize(230);
    assert_eq!(widths(&grid), vec![100, 130]);
    grid.drag_column_resize(260);
    grid.end_column_resize();

    assert_eq!(widths(&grid), vec![100, 160]);
    assert_eq!(*resized.borrow(), vec![vec!["a".to_string(), "b".to_string()]]);
}

#[test]
fn test_fixed_column_cannot_be_resized() {
    let columns = vec![
        Column::new("a", "A").with_width(100).with_resizable(false),
        Column::new("b", "B").with_width(100),
    ];
    let mut grid = grid(columns, GridOptions::default());
    assert!(!grid.begin_column_resize(0, 100));
    assert!(!grid.set_column_width(0, 150));
    assert_eq!(widths(&grid), vec![100, 100]);
}

#[test]
fn test_reorder_columns() {
    let columns = vec![
        Column::new("a", "A").with_width(100),
        Column::new("b", "B").with_width(100),
    ];
    let mut grid = grid(columns, GridOptions::default());
    assert!(grid.reorder_columns(&["b", "a"]).unwrap());
    assert_eq!(grid.column_index("b"), Some(0));

    assert_eq!(grid.reorder_columns(&["b"]), Err(GridError::InvalidColumnOrder));
    assert_eq!(grid.reorder_columns(&["b", "b"]), Err(GridError::InvalidColumnOrder));
    assert_eq!(
        grid.reorder_columns(&["b", "x"]),
        Err(GridError::UnknownColumn("x".to_string()))
    );
}
