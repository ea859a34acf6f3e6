//! Cell formatters.
//!
//! A formatter turns a cell value into the HTML placed inside the cell.
//! Formatters are registered by name on the grid and referenced by name from
//! columns and row metadata.

use std::collections::HashMap;
use std::rc::Rc;

use chrono::Datelike;
use serde_json::Value;

use crate::column::Column;
use crate::data::Record;

/// `formatter(row, cell, value, column, item) -> html`
pub type Formatter = Rc<dyn Fn(usize, usize, &Value, &Column, &Record) -> String>;

/// Fallback formatter lookup used when a column names no formatter.
pub type FormatterFactory = Rc<dyn Fn(&Column) -> Option<Formatter>>;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Escapes `&`, `<` and `>`.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Plain text form of a value. Null renders as nothing.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Escaped text of the value.
pub fn default_formatter(_row: usize, _cell: usize, value: &Value, _column: &Column, _item: &Record) -> String {
    escape_html(&value_text(value))
}

/// Icon plus label, linked when the row has a `<field>_url`.
pub fn icon_label_url(_row: usize, _cell: usize, value: &Value, column: &Column, item: &Record) -> String {
    let icon = item
        .get(&format!("{}_icon", column.field))
        .map(value_text)
        .unwrap_or_default();
    let label = escape_html(&value_text(value));
    let mut html = format!("<i class=\"{}\"> </i> ", escape_html(&icon));
    match item.get(&format!("{}_url", column.field)).map(value_text) {
        Some(url) if !url.is_empty() => {
            html.push_str(&format!("<a href=\"{}\">{}</a>", escape_html(&url), label));
        }
        _ => html.push_str(&label),
    }
    html
}

/// `"2024-03-05..."` as `"March 5"`, with the year appended unless it is
/// `current_year`.
pub fn format_iso_date(value: &str, current_year: i32) -> String {
    let year = value.get(0..4).unwrap_or_default();
    let month: usize = value.get(5..7).and_then(|m| m.parse().ok()).unwrap_or(0);
    let day = value.get(8..10).unwrap_or_default();
    let day = day.strip_prefix('0').unwrap_or(day);

    let Some(month_name) = month.checked_sub(1).and_then(|m| MONTHS.get(m)) else {
        return escape_html(value);
    };

    let mut text = format!("{month_name} {day}");
    if year != current_year.to_string() {
        text.push_str(", ");
        text.push_str(year);
    }
    text
}

/// Formatter for ISO date strings relative to `current_year`.
pub fn date_formatter(current_year: i32) -> Formatter {
    Rc::new(move |_, _, value, _, _| match value {
        Value::String(s) => format_iso_date(s, current_year),
        other => escape_html(&value_text(other)),
    })
}

/// A checkmark for truthy values.
pub fn checkmark(_row: usize, _cell: usize, value: &Value, _column: &Column, _item: &Record) -> String {
    match value {
        Value::Bool(true) => "<span class=\"checkmark\">&#10003;</span>".to_string(),
        _ => String::new(),
    }
}

/// The formatters every grid knows by name.
pub fn builtin_formatters() -> HashMap<String, Formatter> {
    let mut formatters: HashMap<String, Formatter> = HashMap::new();
    formatters.insert("icon_label_url".into(), Rc::new(icon_label_url));
    formatters.insert("date".into(), date_formatter(chrono::Local::now().year()));
    formatters.insert("checkmark".into(), Rc::new(checkmark));
    formatters
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_default_formatter_escapes() {
        let column = Column::new("title", "Title");
        let html = default_formatter(0, 0, &json!("a < b & c > d"), &column, &Record::new());
        assert_eq!(html, "a &lt; b &amp; c &gt; d");
    }

    #[test]
    fn test_default_formatter_null_is_empty() {
        let column = Column::new("title", "Title");
        assert_eq!(default_formatter(0, 0, &Value::Null, &column, &Record::new()), "");
        assert_eq!(default_formatter(0, 0, &json!(3), &column, &Record::new()), "3");
    }

    #[test]
    fn test_icon_label_url_with_link() {
        let column = Column::new("name", "Name");
        let item = Record::new()
            .with("name", "doc")
            .with("name_icon", "icon-file")
            .with("name_url", "/doc/");
        let html = icon_label_url(0, 0, &json!("doc"), &column, &item);
        assert_eq!(html, "<i class=\"icon-file\"> </i> <a href=\"/doc/\">doc</a>");
    }

    #[test]
    fn test_icon_label_url_without_link() {
        let column = Column::new("name", "Name");
        let item = Record::new().with("name", "doc");
        let html = icon_label_url(0, 0, &json!("doc"), &column, &item);
        assert_eq!(html, "<i class=\"\"> </i> doc");
    }

    #[test]
    fn test_format_iso_date() {
        assert_eq!(format_iso_date("2024-03-05T10:00:00", 2024), "March 5");
        assert_eq!(format_iso_date("2023-11-25", 2024), "November 25, 2023");
        assert_eq!(format_iso_date("garbage", 2024), "garbage");
    }
}
