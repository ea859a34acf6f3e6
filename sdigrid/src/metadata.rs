//! Per-row rendering overrides.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer};

/// How many cells a cell spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colspan {
    /// A fixed number of cells.
    Cells(usize),
    /// Everything up to the last column (`"*"`).
    Rest,
}

impl Colspan {
    /// Number of cells covered when starting at `cell` in a row of `columns`.
    pub fn resolve(self, cell: usize, columns: usize) -> usize {
        let remaining = columns.saturating_sub(cell);
        match self {
            Self::Cells(n) => n.max(1).min(remaining.max(1)),
            Self::Rest => remaining.max(1),
        }
    }
}

impl<'de> Deserialize<'de> for Colspan {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(usize),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(Self::Cells(n)),
            Raw::Text(s) if s == "*" => Ok(Self::Rest),
            Raw::Text(s) => s
                .parse()
                .map(Self::Cells)
                .map_err(|_| serde::de::Error::custom(format!("invalid colspan: {s}"))),
        }
    }
}

/// Overrides for one cell of a row.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColumnMetadata {
    pub colspan: Option<Colspan>,
    /// Registered formatter name.
    pub formatter: Option<String>,
    /// Registered editor name.
    pub editor: Option<String>,
    pub focusable: Option<bool>,
    pub selectable: Option<bool>,
}

/// Key of a per-cell override: a column id or a column position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnKey {
    Id(String),
    Index(usize),
}

/// Overrides for a whole row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemMetadata {
    /// Extra row classes, space separated.
    pub css_classes: Option<String>,
    pub focusable: Option<bool>,
    pub selectable: Option<bool>,
    /// Formatter applied to every cell of the row.
    pub formatter: Option<String>,
    pub columns: HashMap<ColumnKey, ColumnMetadata>,
}

impl ItemMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_css_classes(mut self, classes: impl Into<String>) -> Self {
        self.css_classes = Some(classes.into());
        self
    }

    pub fn with_focusable(mut self, focusable: bool) -> Self {
        self.focusable = Some(focusable);
        self
    }

    pub fn with_selectable(mut self, selectable: bool) -> Self {
        self.selectable = Some(selectable);
        self
    }

    pub fn with_formatter(mut self, name: impl Into<String>) -> Self {
        self.formatter = Some(name.into());
        self
    }

    pub fn with_column(mut self, key: ColumnKey, meta: ColumnMetadata) -> Self {
        self.columns.insert(key, meta);
        self
    }

    /// Overrides for a column, looked up by id first and position second.
    pub fn column(&self, id: &str, index: usize) -> Option<&ColumnMetadata> {
        self.columns
            .get(&ColumnKey::Id(id.to_string()))
            .or_else(|| self.columns.get(&ColumnKey::Index(index)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colspan_resolve() {
        assert_eq!(Colspan::Cells(2).resolve(1, 5), 2);
        assert_eq!(Colspan::Cells(9).resolve(3, 5), 2);
        assert_eq!(Colspan::Rest.resolve(1, 5), 4);
        assert_eq!(Colspan::Cells(0).resolve(0, 5), 1);
    }

    #[test]
    fn test_colspan_deserialize() {
        let meta: ColumnMetadata = serde_json::from_str(r#"{"colspan": "*"}"#).unwrap();
        assert_eq!(meta.colspan, Some(Colspan::Rest));
        let meta: ColumnMetadata = serde_json::from_str(r#"{"colspan": 3}"#).unwrap();
        assert_eq!(meta.colspan, Some(Colspan::Cells(3)));
    }

    #[test]
    fn test_column_lookup_prefers_id() {
        let meta = ItemMetadata::new()
            .with_column(
                ColumnKey::Index(0),
                ColumnMetadata {
                    focusable: Some(true),
                    ..Default::default()
                },
            )
            .with_column(
                ColumnKey::Id("title".into()),
                ColumnMetadata {
                    focusable: Some(false),
                    ..Default::default()
                },
            );
        assert_eq!(meta.column("title", 0).and_then(|c| c.focusable), Some(false));
        assert_eq!(meta.column("other", 0).and_then(|c| c.focusable), Some(true));
        assert!(meta.column("other", 1).is_none());
    }
}
