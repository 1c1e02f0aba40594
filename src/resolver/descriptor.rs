//! Dataset and table descriptors

use crate::error::{Error, Result};
use crate::metadata::{ExternalTableRef, TableListEntry, TableSchema};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identifies one dataset of a connection
///
/// For SQL-family connectors this is `server,database`; single-dataset
/// connectors use `default`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetDescriptor(String);

impl DatasetDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// `server,database`
    pub fn from_parts(server: &str, database: &str) -> Self {
        Self(format!("{server},{database}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DatasetDescriptor {
    fn default() -> Self {
        Self::new("default")
    }
}

impl fmt::Display for DatasetDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One table of a dataset
///
/// Created uninitialized by a listing. A successful
/// [`TableResolver::init`](super::TableResolver::init) attaches the schema.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDescriptor {
    /// Wire name used in routes
    pub name: String,
    pub display_name: String,
    schema: Option<Arc<TableSchema>>,
}

impl TableDescriptor {
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            schema: None,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.schema.is_some()
    }

    pub fn schema(&self) -> Option<&Arc<TableSchema>> {
        self.schema.as_ref()
    }

    /// Schema, or `NotInitialized`
    pub fn require_schema(&self) -> Result<&Arc<TableSchema>> {
        self.schema
            .as_ref()
            .ok_or_else(|| Error::not_initialized(&self.name))
    }

    pub(crate) fn attach(&mut self, schema: Arc<TableSchema>) {
        self.schema = Some(schema);
    }

    /// Table referenced by a column, from the schema already resolved
    ///
    /// Never fetches. The referenced table needs its own `init` before it
    /// can be queried.
    pub fn resolve_external_table(&self, column: &str) -> Result<Option<&ExternalTableRef>> {
        let schema = self.require_schema()?;
        let column = schema
            .column(column)
            .ok_or_else(|| Error::column_not_found(&self.name, column))?;
        Ok(column.external_table.as_ref())
    }
}

impl From<TableListEntry> for TableDescriptor {
    fn from(entry: TableListEntry) -> Self {
        Self::new(entry.name, entry.display_name)
    }
}

/// First table whose display name matches, in listing order
pub fn find_table_by_display_name<'a>(
    tables: &'a [TableDescriptor],
    display_name: &str,
) -> Option<&'a TableDescriptor> {
    tables.iter().find(|t| t.display_name == display_name)
}
