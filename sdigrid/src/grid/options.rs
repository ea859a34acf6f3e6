//! Grid configuration.

use serde::Deserialize;

use crate::pager::DEFAULT_MAX_HEIGHT;

/// Grid options, deserializable from the camelCase option objects the
/// server marshals (`slickgridOptions`).
///
/// # Example
///
/// ```ignore
/// let options = GridOptions::default()
///     .with_row_height(34.0)
///     .with_force_fit_columns(true);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridOptions {
    pub row_height: f64,
    pub default_column_width: u32,
    /// Keep an empty row after the data for appending items.
    pub enable_add_row: bool,
    pub editable: bool,
    /// Open the editor as soon as a cell becomes active.
    pub auto_edit: bool,
    pub enable_cell_navigation: bool,
    pub enable_column_reorder: bool,
    /// Keep the total column width equal to the viewport width.
    pub force_fit_columns: bool,
    pub multi_select: bool,
    pub multi_column_sort: bool,
    pub selected_cell_css_class: String,
    pub cell_flashing_css_class: String,
    /// Floor for every column's minimum width.
    pub absolute_column_min_width: u32,
    /// Tallest canvas the rendering substrate can show.
    pub max_supported_css_height: f64,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            row_height: 25.0,
            default_column_width: 80,
            enable_add_row: false,
            editable: false,
            auto_edit: true,
            enable_cell_navigation: true,
            enable_column_reorder: true,
            force_fit_columns: false,
            multi_select: true,
            multi_column_sort: false,
            selected_cell_css_class: "selected".to_string(),
            cell_flashing_css_class: "flashing".to_string(),
            absolute_column_min_width: 10,
            max_supported_css_height: DEFAULT_MAX_HEIGHT,
        }
    }
}

impl GridOptions {
    pub fn with_row_height(mut self, row_height: f64) -> Self {
        self.row_height = row_height;
        self
    }

    pub fn with_editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    pub fn with_auto_edit(mut self, auto_edit: bool) -> Self {
        self.auto_edit = auto_edit;
        self
    }

    pub fn with_enable_add_row(mut self, enable: bool) -> Self {
        self.enable_add_row = enable;
        self
    }

    pub fn with_force_fit_columns(mut self, force_fit: bool) -> Self {
        self.force_fit_columns = force_fit;
        self
    }

    pub fn with_multi_column_sort(mut self, multi: bool) -> Self {
        self.multi_column_sort = multi;
        self
    }

    pub fn with_max_supported_css_height(mut self, height: f64) -> Self {
        self.max_supported_css_height = height;
        self
    }

    pub fn with_absolute_column_min_width(mut self, width: u32) -> Self {
        self.absolute_column_min_width = width;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_server_options() {
        let options: GridOptions = serde_json::from_str(
            r#"{"editable": false, "enableAddRow": false, "enableCellNavigation": true,
                "asyncEditorLoading": true, "forceFitColumns": true, "rowHeight": 34}"#,
        )
        .unwrap();
        assert_eq!(options.row_height, 34.0);
        assert!(options.force_fit_columns);
        assert!(options.auto_edit);
        assert_eq!(options.selected_cell_css_class, "selected");
    }
}
