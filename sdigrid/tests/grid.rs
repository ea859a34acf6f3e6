//! Tests for rendering, editing, navigation and cell overlays.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::json;
use simplelog::{Config, LevelFilter, TestLogger};

use sdigrid::grid::CssHash;
use sdigrid::prelude::*;

fn records(count: usize) -> Vec<Record> {
    (0..count)
        .map(|i| {
            Record::new()
                .with("id", i)
                .with("title", format!("row {i}"))
                .with("done", i % 2 == 0)
        })
        .collect()
}

fn columns() -> Vec<Column> {
    vec![
        Column::new("title", "Title")
            .with_editor("text")
            .with_validator("required"),
        Column::new("done", "Done").with_editor("checkbox"),
        Column::new("owner", "Owner").with_focusable(false),
    ]
}

fn grid_with(count: usize, options: GridOptions) -> VirtualGrid<VecData> {
    let mut data = VecData::new();
    data.set_items(records(count)).unwrap();
    let mut grid = VirtualGrid::new(data, columns(), options);
    grid.resize_viewport(600, 250.0);
    grid
}

fn editable() -> GridOptions {
    GridOptions::default().with_editable(true).with_auto_edit(false)
}

// =============================================================================
// Rendering
// =============================================================================

#[test]
fn test_rows_arrive_in_one_insert() {
    let _ = TestLogger::init(LevelFilter::Trace, Config::default());
    let grid = grid_with(100, GridOptions::default());
    assert_eq!(grid.canvas().insert_batches(), 1);
    // 10 visible rows plus the trailing buffer
    assert_eq!(grid.rendered_rows(), (0..=13).collect::<Vec<_>>());
}

#[test]
fn test_scroll_drops_rows_outside_range() {
    let mut grid = grid_with(1_000, GridOptions::default());
    grid.scroll_row_to_top(500);
    let range = grid.rendered_range().unwrap();
    assert!(range.contains(500));
    assert!(grid.rendered_rows().iter().all(|row| range.contains(*row)));
    assert!(!grid.is_row_rendered(0));
    assert_eq!(grid.canvas().rows().len(), grid.rendered_rows().len());
}

/// A remote-sized source with nothing loaded yet.
struct Unloaded(usize);

impl DataSource for Unloaded {
    fn len(&self) -> usize {
        self.0
    }

    fn item(&self, _index: usize) -> Option<&Record> {
        None
    }

    fn item_mut(&mut self, _index: usize) -> Option<&mut Record> {
        None
    }
}

#[test]
fn test_small_scrolls_across_a_page_reposition_rows() {
    let mut grid = VirtualGrid::new(Unloaded(1_000_000), columns(), GridOptions::default());
    grid.resize_viewport(600, 500.0);
    assert_eq!(grid.pager().offset(), 0.0);

    let mut real = 0.0;
    while grid.pager().offset() == 0.0 {
        real += 300.0;
        grid.handle_scroll(real);
    }

    let offset = grid.pager().offset();
    assert!(offset > 0.0);
    assert!(grid.pager().scroll_top() < real);
    assert_eq!(grid.canvas().scroll_top(), grid.pager().scroll_top());

    let visible = grid.visible_range().unwrap();
    assert!(grid.is_row_rendered(visible.top));
    for (row, markup) in grid.canvas().rows() {
        assert_eq!(markup.top, *row as f64 * 25.0 - offset, "row {row}");
    }
}

#[test]
fn test_row_and_cell_classes() {
    let grid = grid_with(3, GridOptions::default());
    let row = grid.canvas().row(1).unwrap();
    assert!(row.has_class("slick-row"));
    assert!(row.has_class("odd"));
    let cell = row.cell(2).unwrap();
    assert!(cell.has_class("l2"));
    assert!(cell.has_class("r2"));
    assert_eq!(row.cell(0).unwrap().html, "row 1");
}

#[test]
fn test_unloaded_rows_render_as_loading() {
    struct Partial(VecData, usize);

    impl DataSource for Partial {
        fn len(&self) -> usize {
            self.1
        }

        fn item(&self, index: usize) -> Option<&Record> {
            self.0.item(index)
        }

        fn item_mut(&mut self, index: usize) -> Option<&mut Record> {
            self.0.item_mut(index)
        }
    }

    let mut loaded = VecData::new();
    loaded.set_items(records(2)).unwrap();
    let mut grid = VirtualGrid::new(Partial(loaded, 5), columns(), GridOptions::default());
    grid.resize_viewport(600, 250.0);

    assert!(!grid.canvas().row(1).unwrap().has_class("loading"));
    let pending = grid.canvas().row(3).unwrap();
    assert!(pending.has_class("loading"));
    assert_eq!(pending.cell(0).unwrap().html, "");
}

// =============================================================================
// Editing
// =============================================================================

#[test]
fn test_edit_commit_updates_row() {
    let mut grid = grid_with(5, editable());
    let changes = Rc::new(RefCell::new(Vec::new()));
    let seen = changes.clone();
    grid.events.on_cell_change.subscribe(move |args| {
        seen.borrow_mut().push((args.row, args.cell));
        Propagation::Continue
    });

    grid.set_active_cell(2, 0);
    grid.make_active_cell_editable().unwrap();
    assert!(grid.is_editing());
    assert!(grid.edit_lock().is_active());

    grid.active_editor_mut().unwrap().set_value(json!("renamed"));
    assert!(grid.commit_current_edit());

    assert!(!grid.is_editing());
    assert!(!grid.edit_lock().is_active());
    assert_eq!(grid.item(2).unwrap().get("title"), Some(&json!("renamed")));
    assert_eq!(grid.canvas().row(2).unwrap().cell(0).unwrap().html, "renamed");
    assert_eq!(*changes.borrow(), vec![(2, 0)]);
}

#[test]
fn test_invalid_value_keeps_editor_open() {
    let mut grid = grid_with(5, editable());
    let errors = Rc::new(RefCell::new(Vec::new()));
    let seen = errors.clone();
    grid.events.on_validation_error.subscribe(move |args| {
        seen.borrow_mut().push(args.message.clone());
        Propagation::Continue
    });

    grid.set_active_cell(1, 0);
    grid.make_active_cell_editable().unwrap();
    grid.active_editor_mut().unwrap().set_value(json!(""));
    assert!(!grid.commit_current_edit());

    assert!(grid.is_editing());
    assert!(grid.canvas().row(1).unwrap().cell(0).unwrap().has_class("invalid"));
    assert_eq!(*errors.borrow(), vec![Some("This is a required field".to_string())]);

    assert!(grid.cancel_current_edit());
    assert!(!grid.edit_lock().is_active());
    let cell = grid.canvas().row(1).unwrap().cell(0).unwrap();
    assert!(!cell.has_class("invalid"));
    assert_eq!(cell.html, "row 1");
}

#[test]
fn test_invalidating_edited_row_leaves_edit_mode() {
    let mut grid = grid_with(5, editable());
    grid.set_active_cell(2, 0);
    grid.make_active_cell_editable().unwrap();
    assert!(grid.is_editing());

    grid.invalidate_rows(&[2]);

    assert!(!grid.is_editing());
    assert!(!grid.edit_lock().is_active());
}

#[test]
fn test_read_only_grid_refuses_edit() {
    let mut grid = grid_with(5, GridOptions::default());
    grid.set_active_cell(0, 0);
    assert_eq!(grid.make_active_cell_editable(), Err(GridError::NotEditable));
}

#[test]
fn test_before_edit_veto() {
    let mut grid = grid_with(5, editable());
    grid.events
        .on_before_edit_cell
        .subscribe(|args| if args.row == 0 { Propagation::StopPropagation } else { Propagation::Continue });
    grid.set_active_cell(0, 0);
    grid.make_active_cell_editable().unwrap();
    assert!(!grid.is_editing());
}

#[test]
fn test_edit_command_handler_defers_and_undo() {
    let commands = Rc::new(RefCell::new(Vec::new()));
    let seen = commands.clone();
    let mut data = VecData::new();
    data.set_items(records(3)).unwrap();
    let mut grid = VirtualGrid::new(data, columns(), editable())
        .with_edit_command_handler(move |_item, _column, command| seen.borrow_mut().push(command));
    grid.resize_viewport(600, 250.0);

    grid.set_active_cell(0, 0);
    grid.make_active_cell_editable().unwrap();
    grid.active_editor_mut().unwrap().set_value(json!("later"));
    assert!(grid.commit_current_edit());
    assert_eq!(grid.item(0).unwrap().get("title"), Some(&json!("row 0")));

    let command = commands.borrow_mut().remove(0);
    assert!(grid.execute_edit_command(&command));
    assert_eq!(grid.item(0).unwrap().get("title"), Some(&json!("later")));
    assert!(grid.undo_edit_command(&command));
    assert_eq!(grid.item(0).unwrap().get("title"), Some(&json!("row 0")));
}

#[test]
fn test_shared_lock_blocks_second_grid() {
    let lock = EditLock::new();
    let mut data = VecData::new();
    data.set_items(records(3)).unwrap();
    let mut first = VirtualGrid::new(data, columns(), editable()).with_edit_lock(lock.clone());
    let mut data = VecData::new();
    data.set_items(records(3)).unwrap();
    let mut second = VirtualGrid::new(data, columns(), editable()).with_edit_lock(lock.clone());
    first.resize_viewport(600, 250.0);
    second.resize_viewport(600, 250.0);

    first.set_active_cell(0, 0);
    first.make_active_cell_editable().unwrap();
    second.set_active_cell(0, 0);
    assert_eq!(second.make_active_cell_editable(), Err(GridError::LockHeld));
    assert!(!second.navigate_down());

    assert!(first.cancel_current_edit());
    assert!(!lock.is_active());
    assert!(second.navigate_down());
}

#[test]
fn test_enter_commits_and_moves_down() {
    let mut grid = grid_with(5, GridOptions::default().with_editable(true));
    grid.goto_cell(1, 0, true);
    assert!(grid.is_editing());
    grid.active_editor_mut().unwrap().set_value(json!("typed"));
    assert!(grid.handle_key_down(KeyEvent::plain(Key::Enter)));
    assert_eq!(grid.item(1).unwrap().get("title"), Some(&json!("typed")));
    assert_eq!(grid.active_cell(), Some(CellPos::new(2, 0)));
}

// =============================================================================
// Navigation
// =============================================================================

#[test]
fn test_arrow_navigation_skips_unfocusable_cells() {
    let mut grid = grid_with(5, GridOptions::default());
    grid.set_active_cell(0, 0);
    assert!(grid.handle_key_down(KeyEvent::plain(Key::Right)));
    assert_eq!(grid.active_cell(), Some(CellPos::new(0, 1)));
    // "owner" is not focusable
    assert!(!grid.navigate_right());
    assert_eq!(grid.active_cell(), Some(CellPos::new(0, 1)));

    assert!(grid.navigate_next());
    assert_eq!(grid.active_cell(), Some(CellPos::new(1, 0)));
    assert!(grid.navigate_prev());
    assert_eq!(grid.active_cell(), Some(CellPos::new(0, 1)));
    assert!(!grid.navigate_up());
}

#[test]
fn test_active_class_follows_active_cell() {
    let mut grid = grid_with(5, GridOptions::default());
    grid.set_active_cell(1, 0);
    assert!(grid.canvas().row(1).unwrap().has_class("active"));
    grid.navigate_down();
    assert!(!grid.canvas().row(1).unwrap().has_class("active"));
    assert!(grid.canvas().row(2).unwrap().cell(0).unwrap().has_class("active"));
}

#[test]
fn test_key_handler_can_suppress_navigation() {
    let mut grid = grid_with(5, GridOptions::default());
    grid.events
        .on_key_down
        .subscribe(|_| Propagation::StopImmediate);
    grid.set_active_cell(0, 0);
    assert!(grid.handle_key_down(KeyEvent::plain(Key::Down)));
    assert_eq!(grid.active_cell(), Some(CellPos::new(0, 0)));
}

#[test]
fn test_page_down_moves_active_row() {
    let mut grid = grid_with(100, GridOptions::default());
    grid.set_active_cell(0, 0);
    assert!(grid.handle_key_down(KeyEvent::plain(Key::PageDown)));
    assert_eq!(grid.active_cell(), Some(CellPos::new(10, 0)));
    assert!(grid.is_row_rendered(10));
}

// =============================================================================
// Overlays and selection
// =============================================================================

fn hash(row: usize, column: &str, class: &str) -> CssHash {
    let mut cells = HashMap::new();
    cells.insert(column.to_string(), class.to_string());
    let mut hash = HashMap::new();
    hash.insert(row, cells);
    hash
}

#[test]
fn test_css_overlays() {
    let mut grid = grid_with(5, GridOptions::default());
    grid.add_cell_css_styles("highlight", hash(1, "title", "hot")).unwrap();
    assert!(grid.canvas().row(1).unwrap().cell(0).unwrap().has_class("hot"));
    assert_eq!(
        grid.add_cell_css_styles("highlight", hash(2, "title", "hot")),
        Err(GridError::CssKeyExists("highlight".to_string()))
    );

    grid.set_cell_css_styles("highlight", hash(2, "title", "hot"));
    assert!(!grid.canvas().row(1).unwrap().cell(0).unwrap().has_class("hot"));
    assert!(grid.canvas().row(2).unwrap().cell(0).unwrap().has_class("hot"));

    grid.remove_cell_css_styles("highlight");
    assert!(!grid.canvas().row(2).unwrap().cell(0).unwrap().has_class("hot"));
    assert!(grid.cell_css_styles("highlight").is_none());
}

#[test]
fn test_overlay_applies_to_rows_rendered_later() {
    let mut grid = grid_with(1_000, GridOptions::default());
    grid.add_cell_css_styles("highlight", hash(700, "done", "hot")).unwrap();
    grid.scroll_row_to_top(700);
    assert!(grid.canvas().row(700).unwrap().cell(1).unwrap().has_class("hot"));
}

#[test]
fn test_selection_requires_model() {
    let mut grid = grid_with(5, GridOptions::default());
    assert_eq!(grid.selected_rows(), Err(GridError::NoSelectionModel));
    assert_eq!(grid.set_selected_rows(&[1]), Err(GridError::NoSelectionModel));
}

#[test]
fn test_selection_overlay_and_event() {
    let mut grid = grid_with(5, GridOptions::default());
    grid.set_selection_model(RowSelectionModel::new());
    let published = Rc::new(RefCell::new(Vec::new()));
    let seen = published.clone();
    grid.events.on_selected_rows_changed.subscribe(move |args| {
        seen.borrow_mut().push(args.rows.clone());
        Propagation::Continue
    });

    grid.set_selected_rows(&[3, 1]).unwrap();
    assert_eq!(grid.selected_rows().unwrap(), &[1, 3]);
    assert!(grid.canvas().row(3).unwrap().cell(0).unwrap().has_class("selected"));
    assert!(!grid.canvas().row(2).unwrap().cell(0).unwrap().has_class("selected"));

    // the same rows again still publish
    grid.set_selected_rows(&[3, 1]).unwrap();
    assert_eq!(published.borrow().len(), 2);
}

#[test]
fn test_click_selects_active_row() {
    let mut grid = grid_with(5, GridOptions::default());
    grid.set_selection_model(RowSelectionModel::new());
    assert!(grid.handle_click(2, 0, Modifiers::NONE));
    assert_eq!(grid.active_cell(), Some(CellPos::new(2, 0)));
    assert_eq!(grid.selected_rows().unwrap(), &[2]);

    assert!(grid.handle_click(4, 0, Modifiers::CTRL));
    assert_eq!(grid.selected_rows().unwrap(), &[2, 4]);
}

#[test]
fn test_flash_cell_toggles_class() {
    let mut grid = grid_with(5, GridOptions::default());
    let mut flash = grid.flash_cell(1, 0).unwrap();
    let mut states = Vec::new();
    loop {
        let more = grid.advance_flash(&mut flash);
        states.push(grid.canvas().row(1).unwrap().cell(0).unwrap().has_class("flashing"));
        if !more {
            break;
        }
    }
    assert_eq!(states, vec![true, false, true, false]);
    assert!(grid.flash_cell(900, 0).is_none());
}

#[test]
fn test_add_row_publishes_new_item() {
    let mut grid = grid_with(2, editable().with_enable_add_row(true));
    let added = Rc::new(RefCell::new(None));
    let seen = added.clone();
    grid.events.on_add_new_row.subscribe(move |args| {
        *seen.borrow_mut() = Some(args.item.clone());
        Propagation::Continue
    });
    assert_eq!(grid.row_count(), 3);

    grid.goto_cell(2, 0, true);
    grid.active_editor_mut().unwrap().set_value(json!("fresh"));
    assert!(grid.commit_current_edit());
    let item = added.borrow_mut().take().unwrap();
    assert_eq!(item.get("title"), Some(&json!("fresh")));
    assert_eq!(grid.data_len(), 2);
}
