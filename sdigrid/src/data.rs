//! Row data access.
//!
//! The grid reads rows through [`DataSource`]. Rows are [`Record`]s, JSON
//! objects addressed by absolute index. A source may report a length larger
//! than the number of rows it holds; missing rows are "not loaded yet".

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{GridError, Result};
use crate::metadata::ItemMetadata;

/// Default name of the stable id field.
pub const ID_FIELD: &str = "id";

// =============================================================================
// Record
// =============================================================================

/// A single row: a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(pub Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field setter.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.0.insert(field.into(), value);
    }

    /// Stable id stored under `field`, as a string.
    ///
    /// Numbers are accepted and stringified; anything else counts as missing.
    pub fn id_in(&self, field: &str) -> Option<String> {
        match self.0.get(field)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Stable id stored under `id`.
    pub fn id(&self) -> Option<String> {
        self.id_in(ID_FIELD)
    }

    /// Boolean flag, false when absent.
    pub fn flag(&self, field: &str) -> bool {
        self.0.get(field).and_then(Value::as_bool).unwrap_or(false)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

// =============================================================================
// DataSource
// =============================================================================

/// Row accessor used by the grid.
pub trait DataSource {
    /// Number of rows, including rows that are not loaded.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Row at `index`, `None` when not loaded.
    fn item(&self, index: usize) -> Option<&Record>;

    fn item_mut(&mut self, index: usize) -> Option<&mut Record>;

    /// Per-row rendering overrides.
    fn item_metadata(&self, _index: usize) -> Option<ItemMetadata> {
        None
    }
}

type MetadataFn = Box<dyn Fn(usize, &Record) -> Option<ItemMetadata>>;

// =============================================================================
// VecData
// =============================================================================

/// Fully loaded in-memory rows with a unique id per row.
///
/// # Example
///
/// ```ignore
/// let mut data = VecData::new();
/// data.set_items(records)?;
/// data.sort_by(field_comparer("title"), true);
/// grid.invalidate();
/// ```
pub struct VecData {
    items: Vec<Record>,
    id_field: String,
    index: HashMap<String, usize>,
    metadata: Option<MetadataFn>,
}

impl Default for VecData {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            id_field: ID_FIELD.to_string(),
            index: HashMap::new(),
            metadata: None,
        }
    }
}

impl std::fmt::Debug for VecData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VecData")
            .field("items", &self.items.len())
            .field("id_field", &self.id_field)
            .finish()
    }
}

impl VecData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses another field as the stable id.
    pub fn with_id_field(mut self, field: impl Into<String>) -> Self {
        self.id_field = field.into();
        self
    }

    /// Installs a per-row metadata provider.
    pub fn with_metadata<F>(mut self, provider: F) -> Self
    where
        F: Fn(usize, &Record) -> Option<ItemMetadata> + 'static,
    {
        self.metadata = Some(Box::new(provider));
        self
    }

    /// Replaces all rows. Fails, leaving the old rows in place, when an id is
    /// missing or duplicated.
    pub fn set_items(&mut self, items: Vec<Record>) -> Result<()> {
        let index = build_index(&items, &self.id_field)?;
        self.items = items;
        self.index = index;
        Ok(())
    }

    pub fn items(&self) -> &[Record] {
        &self.items
    }

    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    /// Row index of a stable id.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn item_by_id(&self, id: &str) -> Option<&Record> {
        self.index_of(id).and_then(|i| self.items.get(i))
    }

    /// Appends a row.
    pub fn add_item(&mut self, item: Record) -> Result<()> {
        let id = item
            .id_in(&self.id_field)
            .ok_or(GridError::MissingId(self.items.len()))?;
        if self.index.contains_key(&id) {
            return Err(GridError::DuplicateId(id));
        }
        self.index.insert(id, self.items.len());
        self.items.push(item);
        Ok(())
    }

    /// Replaces the row with the given id.
    pub fn update_item(&mut self, id: &str, item: Record) -> Result<()> {
        let index = self
            .index_of(id)
            .ok_or_else(|| GridError::UnknownId(id.to_string()))?;
        let new_id = item.id_in(&self.id_field).ok_or(GridError::MissingId(index))?;
        if new_id != id && self.index.contains_key(&new_id) {
            return Err(GridError::DuplicateId(new_id));
        }
        self.index.remove(id);
        self.index.insert(new_id, index);
        self.items[index] = item;
        Ok(())
    }

    /// Removes the row with the given id.
    pub fn delete_item(&mut self, id: &str) -> Option<Record> {
        let index = self.index_of(id)?;
        let removed = self.items.remove(index);
        self.reindex();
        Some(removed)
    }

    /// Stable sort. Descending order keeps ties in their original order too.
    pub fn sort_by<F>(&mut self, mut comparer: F, ascending: bool)
    where
        F: FnMut(&Record, &Record) -> Ordering,
    {
        if !ascending {
            self.items.reverse();
        }
        self.items.sort_by(&mut comparer);
        if !ascending {
            self.items.reverse();
        }
        self.reindex();
    }

    fn reindex(&mut self) {
        self.index = self
            .items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| item.id_in(&self.id_field).map(|id| (id, i)))
            .collect();
    }
}

fn build_index(items: &[Record], id_field: &str) -> Result<HashMap<String, usize>> {
    let mut index = HashMap::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let id = item.id_in(id_field).ok_or(GridError::MissingId(i))?;
        if index.insert(id.clone(), i).is_some() {
            return Err(GridError::DuplicateId(id));
        }
    }
    Ok(index)
}

impl DataSource for VecData {
    fn len(&self) -> usize {
        self.items.len()
    }

    fn item(&self, index: usize) -> Option<&Record> {
        self.items.get(index)
    }

    fn item_mut(&mut self, index: usize) -> Option<&mut Record> {
        self.items.get_mut(index)
    }

    fn item_metadata(&self, index: usize) -> Option<ItemMetadata> {
        let provider = self.metadata.as_ref()?;
        provider(index, self.items.get(index)?)
    }
}

// =============================================================================
// Comparers
// =============================================================================

/// Orders JSON values: null, then booleans, numbers, strings, anything else.
///
/// Equal keys compare `Equal` so stable sorts keep ties in place.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Comparer on one field, treating a missing field as null.
pub fn field_comparer(field: impl Into<String>) -> impl FnMut(&Record, &Record) -> Ordering {
    let field = field.into();
    move |a, b| {
        compare_values(
            a.get(&field).unwrap_or(&Value::Null),
            b.get(&field).unwrap_or(&Value::Null),
        )
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn row(id: &str, title: &str) -> Record {
        Record::new().with("id", id).with("title", title)
    }

    #[test]
    fn test_set_items_rejects_duplicates() {
        let mut data = VecData::new();
        let err = data
            .set_items(vec![row("a", "x"), row("a", "y")])
            .unwrap_err();
        assert_eq!(err, GridError::DuplicateId("a".into()));
        assert!(data.is_empty());
    }

    #[test]
    fn test_set_items_rejects_missing_id() {
        let mut data = VecData::new();
        let err = data
            .set_items(vec![row("a", "x"), Record::new().with("title", "y")])
            .unwrap_err();
        assert_eq!(err, GridError::MissingId(1));
    }

    #[test]
    fn test_numeric_ids() {
        let record = Record::new().with("id", 42);
        assert_eq!(record.id(), Some("42".to_string()));
    }

    #[test]
    fn test_add_and_delete_keep_index() {
        let mut data = VecData::new();
        data.set_items(vec![row("a", "1"), row("b", "2"), row("c", "3")])
            .unwrap();
        data.delete_item("a");
        assert_eq!(data.index_of("c"), Some(1));
        data.add_item(row("d", "4")).unwrap();
        assert_eq!(data.index_of("d"), Some(2));
        assert!(data.add_item(row("b", "5")).is_err());
    }

    #[test]
    fn test_compare_values_mixed() {
        assert_eq!(compare_values(&json!(null), &json!("a")), Ordering::Less);
        assert_eq!(compare_values(&json!(2), &json!(10)), Ordering::Less);
        assert_eq!(compare_values(&json!("b"), &json!("a")), Ordering::Greater);
        assert_eq!(compare_values(&json!("a"), &json!("a")), Ordering::Equal);
    }
}
