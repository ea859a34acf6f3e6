//! Plain-text rendering of the grid's viewport.

use std::fmt::Write;

use sdigrid::prelude::*;
use sdigrid_remote::SparseRows;
use sdigrid_remote::status::StatusBoard;

const LOADING: &str = "...";
const MIN_CELL_WIDTH: usize = 4;
/// Pixels per terminal column when sizing cells from column widths.
const PX_PER_CHAR: u32 = 8;

/// Removes markup from formatted cell content.
pub fn plain_text(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => text.push(c),
            _ => {}
        }
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn fit(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count <= width {
        format!("{text:width$}")
    } else {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('~');
        cut
    }
}

/// Renders the visible rows, loaded or not, under a header line.
pub fn render_viewport(grid: &VirtualGrid<SparseRows>) -> String {
    let widths: Vec<usize> = grid
        .columns()
        .iter()
        .map(|c| ((c.width / PX_PER_CHAR) as usize).max(MIN_CELL_WIDTH))
        .collect();

    let mut out = String::new();
    let header: Vec<String> = grid
        .columns()
        .iter()
        .zip(&widths)
        .map(|(c, w)| fit(&c.name, *w))
        .collect();
    let _ = writeln!(out, "      {}", header.join(" | ").trim_end());

    let Some(visible) = grid.visible_range() else {
        return out;
    };
    let selected = grid.selected_rows().unwrap_or(&[]);
    let end = (visible.bottom + 1).min(grid.data_len());
    for row in visible.top..end {
        let marker = if selected.contains(&row) { '*' } else { ' ' };
        let line = match grid.canvas().row(row) {
            Some(markup) if grid.data().is_loaded(row) => widths
                .iter()
                .enumerate()
                .map(|(cell, w)| {
                    let text = markup.cell(cell).map(|c| plain_text(&c.html)).unwrap_or_default();
                    fit(&text, *w)
                })
                .collect::<Vec<_>>()
                .join(" | "),
            _ => LOADING.to_string(),
        };
        let _ = writeln!(out, "{marker}{row:>5} {}", line.trim_end());
    }
    out
}

/// Renders banners and the flash message.
pub fn render_status(status: &StatusBoard) -> String {
    let mut out = String::new();
    for banner in status.banners() {
        let _ = writeln!(out, "!! {}", banner.message());
    }
    if let Some(flash) = status.flash() {
        let _ = writeln!(out, "[{}] {}", flash.queue, flash.message);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_strips_tags_and_entities() {
        assert_eq!(
            plain_text("<a href=\"/x\"><i class=\"icon\"></i> Tom &amp; Jerry</a>"),
            " Tom & Jerry"
        );
        assert_eq!(plain_text("1 &lt; 2"), "1 < 2");
    }

    #[test]
    fn test_fit_pads_and_truncates() {
        assert_eq!(fit("ab", 4), "ab  ");
        assert_eq!(fit("abcdef", 4), "abc~");
    }

    #[test]
    fn test_render_unloaded_rows() {
        let mut grid = VirtualGrid::new(
            SparseRows::new(),
            vec![Column::new("name", "Name").with_width(80)],
            GridOptions::default(),
        );
        grid.data_mut().set_len(3);
        grid.update_row_count();
        grid.resize_viewport(200, 100.0);

        let text = render_viewport(&grid);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0].trim(), "Name");
        assert_eq!(lines[1], "     0 ...");
        assert_eq!(lines.len(), 4);
    }
}
