use super::EntityKind;
use crate::hash_set_with_capacity;
use crate::layout::{Layout, Value};

/// Values of one record, aligned with the fields of its layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct DecodedRow(Vec<Value>);

impl DecodedRow {
    #[must_use]
    pub const fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.0
    }

    #[must_use]
    pub fn get(&self, index: usize) -> &Value {
        self.0.get(index).unwrap_or(&Value::Null)
    }
}

impl From<Vec<Value>> for DecodedRow {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

/// The deduplicated rows of one entity kind.
#[derive(Debug, Clone)]
pub struct EntityTable {
    kind: EntityKind,
    rows: Vec<DecodedRow>,
}

impl EntityTable {
    /// Builds a table, dropping every row equal to an earlier one.
    ///
    /// Returns the table and the number of rows removed.
    #[must_use]
    pub fn deduplicated(kind: EntityKind, mut rows: Vec<DecodedRow>) -> (Self, u64) {
        let before = rows.len();

        let keep: Vec<bool> = {
            let mut seen = hash_set_with_capacity(rows.len());
            rows.iter().map(|row| seen.insert(row)).collect()
        };

        let mut keep = keep.into_iter();
        rows.retain(|_| keep.next().unwrap_or(false));

        let removed = (before - rows.len()) as u64;
        (Self { kind, rows }, removed)
    }

    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.kind
    }

    #[must_use]
    pub const fn layout(&self) -> &'static Layout {
        self.kind.layout()
    }

    #[must_use]
    pub fn rows(&self) -> &[DecodedRow] {
        &self.rows
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates the values of the named column, or `None` if the layout has no such field.
    pub fn column<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = &'a Value> + 'a> {
        let index = self.layout().field_index(name)?;
        Some(self.rows.iter().map(move |row| row.get(index)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cpro: i64, name: &str) -> DecodedRow {
        DecodedRow::new(vec![Value::Int(cpro), Value::Int(79), Value::Int(5), Value::from("CALLE"), Value::from(name)])
    }

    #[test]
    fn test_exact_duplicates_are_removed() {
        let rows = vec![row(28, "MAYOR"), row(28, "MAYOR"), row(28, "PAZ"), row(28, "MAYOR")];
        let (table, removed) = EntityTable::deduplicated(EntityKind::Streets, rows);
        assert_eq!(removed, 2);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_first_occurrence_order_is_kept() {
        let rows = vec![row(1, "B"), row(2, "A"), row(1, "B"), row(3, "C"), row(2, "A")];
        let (table, _) = EntityTable::deduplicated(EntityKind::Streets, rows);
        assert_eq!(table.rows(), &[row(1, "B"), row(2, "A"), row(3, "C")]);
    }

    #[test]
    fn test_rows_differing_only_in_null_are_distinct() {
        let mut with_null = row(28, "MAYOR").values().to_vec();
        with_null[2] = Value::Null;
        let rows = vec![row(28, "MAYOR"), DecodedRow::new(with_null)];
        let (table, removed) = EntityTable::deduplicated(EntityKind::Streets, rows);
        assert_eq!(removed, 0);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_column_access() {
        let (table, _) = EntityTable::deduplicated(EntityKind::Streets, vec![row(28, "MAYOR"), row(8, "PAZ")]);
        let names: Vec<_> = table.column("nvia").unwrap().filter_map(Value::as_str).collect();
        assert_eq!(names, vec!["MAYOR", "PAZ"]);
        assert!(table.column("missing").is_none());
    }

    #[test]
    fn test_empty_table() {
        let (table, removed) = EntityTable::deduplicated(EntityKind::AddressTracts, Vec::new());
        assert!(table.is_empty());
        assert_eq!(removed, 0);
        assert_eq!(table.kind(), EntityKind::AddressTracts);
    }
}
