//! Column definitions and width management.

use serde::Deserialize;

/// Default minimum column width.
pub const DEFAULT_MIN_WIDTH: u32 = 30;

/// Leeway used when a column has no maximum width.
const UNBOUNDED_LEEWAY: i64 = 100_000;

/// A grid column.
///
/// Deserializes from the camelCase column objects the server marshals:
///
/// ```json
/// { "id": "title", "name": "Title", "field": "title", "width": 120,
///   "minWidth": 120, "cssClass": "cell-title", "sortable": true,
///   "formatterName": "icon_label_url" }
/// ```
///
/// `id` defaults to `field` and a zero `width` to the grid's default width
/// once the column is handed to the grid.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Column {
    pub id: String,
    pub name: String,
    pub field: String,
    pub width: u32,
    pub min_width: u32,
    pub max_width: Option<u32>,
    pub resizable: bool,
    pub sortable: bool,
    pub default_sort_asc: bool,
    pub focusable: bool,
    pub selectable: bool,
    pub css_class: Option<String>,
    pub header_css_class: Option<String>,
    pub tooltip: Option<String>,
    /// Registered formatter name.
    #[serde(alias = "formatterName")]
    pub formatter: Option<String>,
    /// Registered editor name.
    pub editor: Option<String>,
    /// Registered validator name.
    pub validator: Option<String>,
    /// Re-render every row when this column's width changes.
    pub rerender_on_resize: bool,
    /// Interaction behavior, e.g. `"move"` or `"selectAndMove"` for drag handles.
    pub behavior: Option<String>,
    /// Typing into this column on the add row does not create a row.
    pub cannot_trigger_insert: bool,
}

impl Default for Column {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            field: String::new(),
            width: 0,
            min_width: DEFAULT_MIN_WIDTH,
            max_width: None,
            resizable: true,
            sortable: false,
            default_sort_asc: true,
            focusable: true,
            selectable: true,
            css_class: None,
            header_css_class: None,
            tooltip: None,
            formatter: None,
            editor: None,
            validator: None,
            rerender_on_resize: false,
            behavior: None,
            cannot_trigger_insert: false,
        }
    }
}

impl Column {
    /// Creates a column whose id and field are both `field`.
    pub fn new(field: impl Into<String>, name: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            id: field.clone(),
            field,
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    pub fn with_min_width(mut self, min_width: u32) -> Self {
        self.min_width = min_width;
        self
    }

    pub fn with_max_width(mut self, max_width: u32) -> Self {
        self.max_width = Some(max_width);
        self
    }

    pub fn with_resizable(mut self, resizable: bool) -> Self {
        self.resizable = resizable;
        self
    }

    pub fn with_sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    pub fn with_focusable(mut self, focusable: bool) -> Self {
        self.focusable = focusable;
        self
    }

    pub fn with_selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    pub fn with_css_class(mut self, class: impl Into<String>) -> Self {
        self.css_class = Some(class.into());
        self
    }

    pub fn with_formatter(mut self, name: impl Into<String>) -> Self {
        self.formatter = Some(name.into());
        self
    }

    pub fn with_editor(mut self, name: impl Into<String>) -> Self {
        self.editor = Some(name.into());
        self
    }

    pub fn with_validator(mut self, name: impl Into<String>) -> Self {
        self.validator = Some(name.into());
        self
    }

    pub fn with_behavior(mut self, behavior: impl Into<String>) -> Self {
        self.behavior = Some(behavior.into());
        self
    }

    pub fn with_rerender_on_resize(mut self, rerender: bool) -> Self {
        self.rerender_on_resize = rerender;
        self
    }

    /// Fills in the id and width defaults.
    pub(crate) fn normalize(&mut self, default_width: u32) {
        if self.id.is_empty() {
            self.id = self.field.clone();
        }
        if self.width == 0 {
            self.width = default_width;
        }
    }

    /// Smallest width this column may shrink to.
    pub fn effective_min_width(&self, absolute_min: u32) -> u32 {
        self.min_width.max(absolute_min)
    }

    /// Whether this column is a row drag handle.
    pub fn is_move_handle(&self) -> bool {
        matches!(self.behavior.as_deref(), Some("move") | Some("selectAndMove"))
    }
}

// =============================================================================
// Autosize
// =============================================================================

/// Fits column widths into `available` pixels.
///
/// Resizable columns shrink proportionally to their leeway above the minimum,
/// then grow proportionally to their width below the maximum. Both loops stop
/// as soon as an iteration leaves the total unchanged.
pub fn autosize_widths(columns: &[Column], available: u32, absolute_min: u32) -> Vec<u32> {
    let available = available as i64;
    let mut widths: Vec<i64> = columns.iter().map(|c| c.width as i64).collect();
    let mut total: i64 = widths.iter().sum();
    let mut shrink_leeway: i64 = columns
        .iter()
        .filter(|c| c.resizable)
        .map(|c| c.width as i64 - c.effective_min_width(absolute_min) as i64)
        .sum();

    // shrink
    let mut prev_total = total;
    while total > available && shrink_leeway > 0 {
        let proportion = (total - available) as f64 / shrink_leeway as f64;
        for (i, column) in columns.iter().enumerate() {
            if total <= available {
                break;
            }
            let width = widths[i];
            let min = column.effective_min_width(absolute_min) as i64;
            if !column.resizable || width <= min {
                continue;
            }
            let mut shrink = (proportion * (width - min) as f64).floor() as i64;
            if shrink == 0 {
                shrink = 1;
            }
            shrink = shrink.min(width - min);
            total -= shrink;
            shrink_leeway -= shrink;
            widths[i] -= shrink;
        }
        if prev_total <= total {
            break;
        }
        prev_total = total;
    }

    // grow
    prev_total = total;
    while total < available && total > 0 {
        let proportion = available as f64 / total as f64;
        for (i, column) in columns.iter().enumerate() {
            if total >= available {
                break;
            }
            let width = widths[i];
            let capped = column.max_width.is_some_and(|max| max as i64 <= width);
            let grow = if !column.resizable || capped {
                0
            } else {
                let room = column
                    .max_width
                    .map(|max| max as i64 - width)
                    .unwrap_or(1_000_000);
                let grow = ((proportion * width as f64).floor() as i64 - width).min(room);
                if grow == 0 { 1 } else { grow }
            };
            total += grow;
            if total <= available {
                widths[i] += grow;
            }
        }
        if prev_total >= total {
            break;
        }
        prev_total = total;
    }

    widths.into_iter().map(|w| w.max(0) as u32).collect()
}

// =============================================================================
// Interactive resize
// =============================================================================

/// An in-progress drag of a column's right edge.
///
/// Dragging left shrinks the column and, when it reaches its minimum, the
/// resizable columns to its left. Dragging right stretches it up to the
/// maximum widths. With force-fit the columns to the right absorb the
/// difference so the total width stays constant.
#[derive(Debug, Clone)]
pub struct ColumnResize {
    column: usize,
    start_x: i64,
    min_x: i64,
    max_x: i64,
    previous: Vec<u32>,
    force_fit: bool,
    absolute_min: u32,
}

impl ColumnResize {
    /// Starts a drag of column `index` at pointer position `start_x`.
    ///
    /// Returns `None` for unknown or non-resizable columns.
    pub fn begin(
        columns: &[Column],
        index: usize,
        start_x: i64,
        force_fit: bool,
        absolute_min: u32,
    ) -> Option<Self> {
        if !columns.get(index)?.resizable {
            return None;
        }

        let previous: Vec<u32> = columns.iter().map(|c| c.width).collect();
        let leeway = |range: &[Column], prev: &[u32]| {
            let mut shrink = 0i64;
            let mut stretch = Some(0i64);
            for (c, &w) in range.iter().zip(prev).filter(|(c, _)| c.resizable) {
                stretch = match (stretch, c.max_width) {
                    (Some(total), Some(max)) => Some(total + max as i64 - w as i64),
                    _ => None,
                };
                shrink += w as i64 - c.effective_min_width(absolute_min) as i64;
            }
            (shrink, stretch.unwrap_or(UNBOUNDED_LEEWAY))
        };

        let (shrink_left, stretch_left) = leeway(&columns[..=index], &previous[..=index]);
        let (shrink_right, stretch_right) = if force_fit {
            leeway(&columns[index + 1..], &previous[index + 1..])
        } else {
            (UNBOUNDED_LEEWAY, UNBOUNDED_LEEWAY)
        };

        Some(Self {
            column: index,
            start_x,
            max_x: start_x + shrink_right.min(stretch_left),
            min_x: start_x - shrink_left.min(stretch_right),
            previous,
            force_fit,
            absolute_min,
        })
    }

    pub fn column(&self) -> usize {
        self.column
    }

    /// Applies the pointer position `x` to the column widths.
    pub fn drag(&self, columns: &mut [Column], x: i64) {
        let delta = x.clamp(self.min_x, self.max_x) - self.start_x;
        let left = (0..=self.column).rev();
        let right = self.column + 1..columns.len().min(self.previous.len());

        if delta < 0 {
            self.shrink(columns, left, delta);
            if self.force_fit {
                self.stretch(columns, right, -delta);
            }
        } else {
            self.stretch(columns, left, delta);
            if self.force_fit {
                self.shrink(columns, right, -delta);
            }
        }
    }

    /// Widths before the drag started.
    pub fn previous_widths(&self) -> &[u32] {
        &self.previous
    }

    fn shrink(&self, columns: &mut [Column], order: impl Iterator<Item = usize>, mut x: i64) {
        for j in order {
            let column = &mut columns[j];
            if !column.resizable {
                continue;
            }
            let prev = self.previous[j] as i64;
            let min = column.effective_min_width(self.absolute_min) as i64;
            if x != 0 && prev + x < min {
                x += prev - min;
                column.width = min as u32;
            } else {
                column.width = (prev + x).max(0) as u32;
                x = 0;
            }
        }
    }

    fn stretch(&self, columns: &mut [Column], order: impl Iterator<Item = usize>, mut x: i64) {
        for j in order {
            let column = &mut columns[j];
            if !column.resizable {
                continue;
            }
            let prev = self.previous[j] as i64;
            match column.max_width {
                Some(max) if x != 0 && (max as i64 - prev) < x => {
                    x -= max as i64 - prev;
                    column.width = max;
                }
                _ => {
                    column.width = (prev + x).max(0) as u32;
                    x = 0;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(id: &str, width: u32) -> Column {
        Column::new(id, id).with_width(width)
    }

    #[test]
    fn test_deserialize_server_column() {
        let column: Column = serde_json::from_str(
            r#"{"id": "title", "name": "Title", "field": "title", "width": 120,
                "minWidth": 120, "cssClass": "cell-title", "sortable": true,
                "formatterName": "icon_label_url"}"#,
        )
        .unwrap();
        assert_eq!(column.min_width, 120);
        assert_eq!(column.css_class.as_deref(), Some("cell-title"));
        assert_eq!(column.formatter.as_deref(), Some("icon_label_url"));
        assert!(column.resizable);
    }

    #[test]
    fn test_normalize_fills_defaults() {
        let mut column: Column = serde_json::from_str(r#"{"field": "name"}"#).unwrap();
        column.normalize(80);
        assert_eq!(column.id, "name");
        assert_eq!(column.width, 80);
    }

    #[test]
    fn test_autosize_shrinks_to_fit() {
        let columns = vec![col("a", 200), col("b", 200), col("c", 200)];
        let widths = autosize_widths(&columns, 300, 10);
        assert_eq!(widths.iter().sum::<u32>(), 300);
        assert!(widths.iter().all(|&w| w >= DEFAULT_MIN_WIDTH));
    }

    #[test]
    fn test_autosize_honors_min_width() {
        let columns = vec![col("a", 100).with_min_width(90), col("b", 100)];
        let widths = autosize_widths(&columns, 100, 10);
        assert_eq!(widths[0], 90);
        assert_eq!(widths[1], 30);
    }

    #[test]
    fn test_autosize_grows_to_fit() {
        let columns = vec![col("a", 100), col("b", 100).with_max_width(120)];
        let widths = autosize_widths(&columns, 400, 10);
        assert_eq!(widths[1], 120);
        assert!(widths[0] > 100);
        assert!(widths.iter().sum::<u32>() <= 400);
    }

    #[test]
    fn test_autosize_skips_fixed_columns() {
        let columns = vec![col("a", 100).with_resizable(false), col("b", 100)];
        let widths = autosize_widths(&columns, 150, 10);
        assert_eq!(widths, vec![100, 50]);
    }

    #[test]
    fn test_autosize_terminates_without_leeway() {
        let columns = vec![col("a", 100).with_resizable(false)];
        assert_eq!(autosize_widths(&columns, 50, 10), vec![100]);
        assert_eq!(autosize_widths(&columns, 500, 10), vec![100]);
    }

    #[test]
    fn test_resize_non_resizable_column() {
        let columns = vec![col("a", 100).with_resizable(false)];
        assert!(ColumnResize::begin(&columns, 0, 0, false, 10).is_none());
        assert!(ColumnResize::begin(&columns, 5, 0, false, 10).is_none());
    }

    #[test]
    fn test_resize_stretch_without_force_fit() {
        let mut columns = vec![col("a", 100), col("b", 100)];
        let drag = ColumnResize::begin(&columns, 0, 500, false, 10).unwrap();
        drag.drag(&mut columns, 530);
        assert_eq!(columns[0].width, 130);
        assert_eq!(columns[1].width, 100);
    }

    #[test]
    fn test_resize_shrink_spills_to_left_columns() {
        let mut columns = vec![col("a", 100), col("b", 100).with_min_width(80)];
        let drag = ColumnResize::begin(&columns, 1, 0, false, 10).unwrap();
        drag.drag(&mut columns, -50);
        assert_eq!(columns[1].width, 80);
        assert_eq!(columns[0].width, 70);
    }

    #[test]
    fn test_resize_stretch_capped_by_max_width() {
        let mut columns = vec![col("a", 100).with_max_width(150)];
        let drag = ColumnResize::begin(&columns, 0, 0, false, 10).unwrap();
        drag.drag(&mut columns, 500);
        assert_eq!(columns[0].width, 150);
    }
}
