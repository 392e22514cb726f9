/// One table definition: name, optional integer primary key, and columns in
/// source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub primary_key: Option<String>,
    pub columns: Vec<String>,
}

impl Table {
    /// True if `column` is a declared column or the primary key.
    pub fn has_column(&self, column: &str) -> bool {
        self.primary_key.as_deref() == Some(column) || self.columns.iter().any(|c| c == column)
    }
}

/// The extracted schema: tables in first-seen order, names unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaModel {
    tables: Vec<Table>,
}

impl SchemaModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a table; returns false and leaves the model unchanged if a
    /// table with the same name already exists.
    pub fn insert(&mut self, table: Table) -> bool {
        if self.contains(&table.name) {
            return false;
        }
        self.tables.push(table);
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// A foreign-key clause as written in the source, not yet validated against
/// the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceDeclaration {
    pub source_table: String,
    pub source_column: String,
    pub target_table: String,
    pub target_column: String,
}
